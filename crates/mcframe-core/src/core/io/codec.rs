//! Fixed-width rendering of values into record lines.
//!
//! All render operations are pure mutations of the target [`RecordLine`]
//! restricted to the column range of the supplied [`FieldSpec`]; they never
//! touch columns outside the range and never change the line length. Values
//! that cannot fit their range are reported as a [`CodecError`] and leave the
//! line untouched, rather than silently corrupting adjacent columns.
//!
//! Fixed-point rendering rounds half-to-even (the rule implemented by Rust's
//! float formatter); the choice is pinned by tests because downstream
//! consumers of the legacy formats may be sensitive to it.

use super::layout::{Align, FieldSpec};
use std::io::{self, Write};
use thiserror::Error;

/// Rendering failures for values that do not fit their column range.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("integer {value} does not fit field '{field}' ({width} columns)")]
    IntegerOverflow {
        field: &'static str,
        width: usize,
        value: i64,
    },
    #[error("rendered value '{rendered}' does not fit field '{field}' ({width} columns)")]
    FloatOverflow {
        field: &'static str,
        width: usize,
        rendered: String,
    },
}

/// A fixed-length mutable line buffer for one structured record.
///
/// The buffer is blank-filled on creation and mutated in place by the render
/// operations; it is never resized. Content is ASCII by construction for all
/// values this crate renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLine {
    buf: Vec<u8>,
}

impl RecordLine {
    /// Creates a blank line of exactly `width` space characters.
    pub fn blank(width: usize) -> Self {
        Self {
            buf: vec![b' '; width],
        }
    }

    /// Length of the line in characters. Constant for the lifetime of the
    /// line.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Writes the line followed by a line terminator.
    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        writer.write_all(&self.buf)?;
        writer.write_all(b"\n")
    }

    /// Overlays `text` onto the field's column range, blank-filling the rest
    /// of the range. `text` must already fit the range.
    fn patch(&mut self, spec: &FieldSpec, text: &str) {
        let field = &mut self.buf[spec.start..spec.start + spec.width];
        field.fill(b' ');
        let bytes = text.as_bytes();
        let n = bytes.len().min(spec.width);
        match spec.align {
            Align::Left => field[..n].copy_from_slice(&bytes[..n]),
            Align::Right => field[spec.width - n..].copy_from_slice(&bytes[..n]),
        }
    }
}

/// Renders the decimal representation of `value`, right-aligned within the
/// field's range.
///
/// # Errors
///
/// Returns [`CodecError::IntegerOverflow`] when the representation exceeds
/// the field width; the line is left unmodified.
pub fn render_integer(line: &mut RecordLine, value: i64, spec: &FieldSpec) -> Result<(), CodecError> {
    let text = value.to_string();
    if text.len() > spec.width {
        return Err(CodecError::IntegerOverflow {
            field: spec.name,
            width: spec.width,
            value,
        });
    }
    line.patch(spec, &text);
    Ok(())
}

/// Renders `value` in fixed-point notation with the field's precision,
/// right-aligned and blank-padded to the field width.
///
/// Rounding is half-to-even. A field without a declared precision renders
/// with zero decimal digits.
///
/// # Errors
///
/// Returns [`CodecError::FloatOverflow`] when the rendered text exceeds the
/// field width; the line is left unmodified.
pub fn render_float(line: &mut RecordLine, value: f64, spec: &FieldSpec) -> Result<(), CodecError> {
    let text = format!("{:.*}", spec.precision.unwrap_or(0), value);
    if text.len() > spec.width {
        return Err(CodecError::FloatOverflow {
            field: spec.name,
            width: spec.width,
            rendered: text,
        });
    }
    line.patch(spec, &text);
    Ok(())
}

/// Copies at most `spec.width` characters of `text` into the field's range,
/// honoring the field's alignment.
///
/// Over-width text is truncated to its leading `spec.width` characters; for
/// left-aligned fields this drops trailing characters, which is the
/// documented truncation rule of the formats.
pub fn render_string(line: &mut RecordLine, text: &str, spec: &FieldSpec) {
    line.patch(spec, text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::layout::{Align, FieldSpec};

    fn field(width: usize, align: Align) -> FieldSpec {
        FieldSpec::new("test", 2, width, align)
    }

    fn as_str(line: &RecordLine) -> &str {
        std::str::from_utf8(line.as_bytes()).unwrap()
    }

    #[test]
    fn render_integer_right_aligns_within_the_field() {
        let mut line = RecordLine::blank(12);
        render_integer(&mut line, 42, &field(5, Align::Right)).unwrap();
        assert_eq!(as_str(&line), "     42     ");
    }

    #[test]
    fn render_integer_preserves_line_length() {
        let mut line = RecordLine::blank(12);
        let before = line.len();
        render_integer(&mut line, -1234, &field(5, Align::Right)).unwrap();
        assert_eq!(line.len(), before);
    }

    #[test]
    fn render_integer_reports_overflow_and_leaves_the_line_untouched() {
        let mut line = RecordLine::blank(12);
        let err = render_integer(&mut line, 123_456, &field(5, Align::Right)).unwrap_err();
        assert_eq!(
            err,
            CodecError::IntegerOverflow {
                field: "test",
                width: 5,
                value: 123_456,
            }
        );
        assert_eq!(as_str(&line), "            ");
    }

    #[test]
    fn render_float_pads_to_the_field_width() {
        let mut line = RecordLine::blank(16);
        let spec = FieldSpec::fixed("test", 2, 12, 4);
        render_float(&mut line, 12.3456, &spec).unwrap();
        assert_eq!(as_str(&line), "       12.3456  ");
        assert_eq!(&as_str(&line)[2..14], "     12.3456");
    }

    #[test]
    fn render_float_rounds_half_to_even() {
        // Exact binary fractions, so the tie-breaking rule is observable.
        let spec = FieldSpec::fixed("test", 0, 6, 2);
        let mut line = RecordLine::blank(6);
        render_float(&mut line, 0.125, &spec).unwrap();
        assert_eq!(as_str(&line), "  0.12");
        render_float(&mut line, 0.375, &spec).unwrap();
        assert_eq!(as_str(&line), "  0.38");
    }

    #[test]
    fn render_float_reports_overflow_and_leaves_the_line_untouched() {
        let spec = FieldSpec::fixed("test", 0, 6, 3);
        let mut line = RecordLine::blank(6);
        let err = render_float(&mut line, 12345.0, &spec).unwrap_err();
        assert!(matches!(err, CodecError::FloatOverflow { field: "test", width: 6, .. }));
        assert_eq!(as_str(&line), "      ");
    }

    #[test]
    fn render_string_left_aligns_and_blank_fills() {
        let mut line = RecordLine::blank(10);
        render_string(&mut line, "OW", &field(4, Align::Left));
        assert_eq!(as_str(&line), "  OW      ");
    }

    #[test]
    fn render_string_truncates_trailing_characters() {
        let mut line = RecordLine::blank(10);
        render_string(&mut line, "ABCDEFG", &field(4, Align::Left));
        assert_eq!(as_str(&line), "  ABCD    ");
    }

    #[test]
    fn render_string_right_aligns_when_requested() {
        let mut line = RecordLine::blank(10);
        render_string(&mut line, "1.00", &field(6, Align::Right));
        assert_eq!(as_str(&line), "    1.00  ");
    }

    #[test]
    fn render_string_never_touches_columns_outside_the_range() {
        let mut line = RecordLine::blank(10);
        render_string(&mut line, "XXXXXXXXXX", &field(4, Align::Left));
        assert_eq!(as_str(&line), "  XXXX    ");
    }

    #[test]
    fn write_to_appends_a_line_terminator() {
        let mut out = Vec::new();
        let line = RecordLine::blank(3);
        line.write_to(&mut out).unwrap();
        assert_eq!(out, b"   \n");
    }
}
