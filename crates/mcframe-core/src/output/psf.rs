//! The topology aggregator: one PSF-style file for the whole system.
//!
//! Walks the molecule instances in global order, renumbers every kind-local
//! atom index into the global serial space, and emits the atom section plus
//! the wrapped bond/angle/dihedral sections. The count declared in each
//! section header always equals the number of entries subsequently written.

use crate::core::io::codec::{RecordLine, render_float, render_integer, render_string};
use crate::core::io::layout::psf;
use crate::core::models::molecules::MoleculeTable;
use crate::output::error::OutputError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Section totals for the whole system, computed before any line is
/// emitted so the header counts can be declared up front.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct SectionTotals {
    atoms: usize,
    bonds: usize,
    angles: usize,
    dihedrals: usize,
}

fn count_sections(molecules: &MoleculeTable) -> SectionTotals {
    let mut totals = SectionTotals::default();
    for m in 0..molecules.count() {
        let kind = molecules.kind(molecules.kind_of(m));
        totals.atoms += kind.atom_count();
        totals.bonds += kind.bonds.len();
        totals.angles += kind.angles.len();
        totals.dihedrals += kind.dihedrals.len();
    }
    totals
}

fn section_header(
    writer: &mut impl Write,
    count: usize,
    header: &str,
) -> Result<(), std::io::Error> {
    writeln!(writer, "{:>width$} {} ", count, header, width = psf::HEADER_COUNT_WIDTH)
}

/// Writer for the topology format.
///
/// The topology of a run is fixed, so this file is written once per session,
/// with truncate semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct PsfOutput {
    remarks: Vec<String>,
}

impl Default for PsfOutput {
    fn default() -> Self {
        Self {
            remarks: vec![
                "Combined topology produced by mcframe".to_string(),
                "Contains connectivity for molecules in all boxes in the system".to_string(),
            ],
        }
    }
}

impl PsfOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the default remark block.
    pub fn with_remarks(remarks: Vec<String>) -> Self {
        Self { remarks }
    }

    /// Writes the full topology file to `path`, overwriting any previous
    /// content.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the destination identity when the file
    /// cannot be created or written, or a layout fault when a value does not
    /// fit its column range.
    pub fn write_to_path(&self, molecules: &MoleculeTable, path: &Path) -> Result<(), OutputError> {
        let file = File::create(path).map_err(|e| OutputError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);
        self.write_to(molecules, &mut writer)
            .and_then(|()| writer.flush().map_err(OutputError::from))
            .map_err(|e| e.for_destination(path))?;
        info!(path = %path.display(), "wrote topology file");
        Ok(())
    }

    /// Writes the full topology file to `writer`.
    ///
    /// # Errors
    ///
    /// Returns a bare stream error (no destination attached) or a layout
    /// fault.
    pub fn write_to(
        &self,
        molecules: &MoleculeTable,
        writer: &mut impl Write,
    ) -> Result<(), OutputError> {
        let totals = count_sections(molecules);
        writer.write_all(b"PSF\n\n")?;
        self.write_remarks(writer)?;
        write_atoms(molecules, writer, totals.atoms)?;
        write_bonds(molecules, writer, totals.bonds)?;
        write_angles(molecules, writer, totals.angles)?;
        write_dihedrals(molecules, writer, totals.dihedrals)?;
        Ok(())
    }

    fn write_remarks(&self, writer: &mut impl Write) -> Result<(), OutputError> {
        section_header(writer, self.remarks.len(), psf::TITLE_HEADER)?;
        for remark in &self.remarks {
            writer.write_all(psf::REMARK_TAG.as_bytes())?;
            writer.write_all(remark.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.write_all(b"\n")?;
        Ok(())
    }
}

fn write_atoms(
    molecules: &MoleculeTable,
    writer: &mut impl Write,
    total: usize,
) -> Result<(), OutputError> {
    section_header(writer, total, psf::ATOM_HEADER)?;
    // The format indexes from 1.
    let mut atom_serial: i64 = 1;
    for m in 0..molecules.count() {
        let kind = molecules.kind(molecules.kind_of(m));
        for atom in &kind.atoms {
            let mut line = RecordLine::blank(psf::ATOM_LINE_WIDTH);
            render_integer(&mut line, atom_serial, &psf::atom::SERIAL)?;
            render_string(&mut line, &kind.name, &psf::atom::SEGMENT);
            render_integer(&mut line, (m + 1) as i64, &psf::atom::RES_SERIAL)?;
            render_string(&mut line, &kind.name, &psf::atom::RES_NAME);
            render_string(&mut line, &atom.name, &psf::atom::NAME);
            render_string(&mut line, &atom.type_name, &psf::atom::TYPE);
            render_float(&mut line, atom.charge, &psf::atom::CHARGE)?;
            render_float(&mut line, atom.mass, &psf::atom::MASS)?;
            render_integer(&mut line, 0, &psf::atom::UNUSED)?;
            line.write_to(writer)?;
            atom_serial += 1;
        }
    }
    writer.write_all(b"\n")?;
    Ok(())
}

fn write_bonds(
    molecules: &MoleculeTable,
    writer: &mut impl Write,
    total: usize,
) -> Result<(), OutputError> {
    section_header(writer, total, psf::BOND_HEADER)?;
    let mut offset: i64 = 1;
    let mut entries_on_line = 0;
    for m in 0..molecules.count() {
        let kind = molecules.kind(molecules.kind_of(m));
        for bond in &kind.bonds {
            let mut cells = RecordLine::blank(2 * psf::TERM_INDEX_WIDTH);
            render_integer(&mut cells, bond.a as i64 + offset, &psf::term_cell(0))?;
            render_integer(&mut cells, bond.b as i64 + offset, &psf::term_cell(1))?;
            writer.write_all(cells.as_bytes())?;
            entries_on_line += 1;
            if entries_on_line == psf::BONDS_PER_LINE {
                entries_on_line = 0;
                writer.write_all(b"\n")?;
            }
        }
        offset += kind.atom_count() as i64;
    }
    writer.write_all(b"\n\n")?;
    Ok(())
}

fn write_angles(
    molecules: &MoleculeTable,
    writer: &mut impl Write,
    total: usize,
) -> Result<(), OutputError> {
    section_header(writer, total, psf::ANGLE_HEADER)?;
    let mut offset: i64 = 1;
    let mut entries_on_line = 0;
    for m in 0..molecules.count() {
        let kind = molecules.kind(molecules.kind_of(m));
        for angle in &kind.angles {
            let mut cells = RecordLine::blank(3 * psf::TERM_INDEX_WIDTH);
            render_integer(&mut cells, angle.a as i64 + offset, &psf::term_cell(0))?;
            render_integer(&mut cells, angle.b as i64 + offset, &psf::term_cell(1))?;
            render_integer(&mut cells, angle.c as i64 + offset, &psf::term_cell(2))?;
            writer.write_all(cells.as_bytes())?;
            entries_on_line += 1;
            if entries_on_line == psf::ANGLES_PER_LINE {
                entries_on_line = 0;
                writer.write_all(b"\n")?;
            }
        }
        offset += kind.atom_count() as i64;
    }
    writer.write_all(b"\n\n")?;
    Ok(())
}

fn write_dihedrals(
    molecules: &MoleculeTable,
    writer: &mut impl Write,
    total: usize,
) -> Result<(), OutputError> {
    section_header(writer, total, psf::DIHEDRAL_HEADER)?;
    let mut offset: i64 = 1;
    let mut entries_on_line = 0;
    for m in 0..molecules.count() {
        let kind = molecules.kind(molecules.kind_of(m));
        for dihedral in &kind.dihedrals {
            let mut cells = RecordLine::blank(4 * psf::TERM_INDEX_WIDTH);
            render_integer(&mut cells, dihedral.a as i64 + offset, &psf::term_cell(0))?;
            render_integer(&mut cells, dihedral.b as i64 + offset, &psf::term_cell(1))?;
            render_integer(&mut cells, dihedral.c as i64 + offset, &psf::term_cell(2))?;
            render_integer(&mut cells, dihedral.d as i64 + offset, &psf::term_cell(3))?;
            writer.write_all(cells.as_bytes())?;
            entries_on_line += 1;
            if entries_on_line == psf::DIHEDRALS_PER_LINE {
                entries_on_line = 0;
                writer.write_all(b"\n")?;
            }
        }
        offset += kind.atom_count() as i64;
    }
    writer.write_all(b"\n\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::kind::{Angle, Bond, KindAtom, MoleculeKind};
    use crate::core::models::molecules::MoleculeInstance;

    fn three_atom_kind() -> MoleculeKind {
        let mut kind = MoleculeKind::new("WAT");
        kind.atoms.push(KindAtom::new("O1", "OT", -0.8476, 15.9994));
        kind.atoms.push(KindAtom::new("H1", "HT", 0.4238, 1.008));
        kind.atoms.push(KindAtom::new("H2", "HT", 0.4238, 1.008));
        kind.bonds.push(Bond { a: 0, b: 1 });
        kind.bonds.push(Bond { a: 1, b: 2 });
        kind.angles.push(Angle { a: 0, b: 1, c: 2 });
        kind
    }

    fn two_instances() -> MoleculeTable {
        MoleculeTable::new(
            vec![three_atom_kind()],
            vec![
                MoleculeInstance::new(0, 'A', "WAT"),
                MoleculeInstance::new(0, 'A', "WAT"),
            ],
            vec!["O", "H", "H", "O", "H", "H"]
                .into_iter()
                .map(String::from)
                .collect(),
        )
        .unwrap()
    }

    fn rendered(molecules: &MoleculeTable) -> String {
        let mut out = Vec::new();
        PsfOutput::new().write_to(molecules, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn section_lines<'a>(text: &'a str, header: &str) -> Vec<&'a str> {
        let start = text
            .lines()
            .position(|l| l.contains(header))
            .unwrap_or_else(|| panic!("missing section header {header}"));
        text.lines()
            .skip(start + 1)
            .take_while(|l| !l.trim().is_empty())
            .collect()
    }

    #[test]
    fn file_starts_with_the_format_tag_and_remark_block() {
        let text = rendered(&two_instances());
        assert!(text.starts_with("PSF\n\n"));
        assert!(text.contains("       2 !NTITLE \n"));
        assert!(text.contains(" REMARKS Combined topology produced by mcframe\n"));
    }

    #[test]
    fn custom_remarks_replace_the_defaults() {
        let molecules = two_instances();
        let mut out = Vec::new();
        PsfOutput::with_remarks(vec!["first".to_string()])
            .write_to(&molecules, &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("       1 !NTITLE \n"));
        assert!(text.contains(" REMARKS first\n"));
    }

    #[test]
    fn atom_section_renumbers_globally_across_instances() {
        let text = rendered(&two_instances());
        let lines = section_lines(&text, "!NATOM");
        assert_eq!(lines.len(), 6);

        let serials: Vec<i64> = lines.iter().map(|l| l[0..8].trim().parse().unwrap()).collect();
        assert_eq!(serials, vec![1, 2, 3, 4, 5, 6]);

        let molecule_serials: Vec<i64> =
            lines.iter().map(|l| l[12..15].trim().parse().unwrap()).collect();
        assert_eq!(molecule_serials, vec![1, 1, 1, 2, 2, 2]);
    }

    #[test]
    fn atom_lines_match_the_fixed_layout() {
        let text = rendered(&two_instances());
        let lines = section_lines(&text, "!NATOM");
        let expected = format!(
            "{:>8}{:>4}{:>3}{:>7}{:>4}{:>6}{:>12.6}{:>14.4}{:>12}",
            1, "WAT", 1, "WAT", "O1", "OT", -0.8476, 15.9994, 0
        );
        assert_eq!(lines[0], expected);
        assert!(lines.iter().all(|l| l.len() == psf::ATOM_LINE_WIDTH));
    }

    #[test]
    fn bond_section_offsets_each_instance_by_its_atom_count() {
        let text = rendered(&two_instances());
        assert!(text.contains("       4 !NBOND: bonds \n"));
        let lines = section_lines(&text, "!NBOND");
        // Four tuples fit one full line.
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0],
            "       1       2       2       3       4       5       5       6"
        );
    }

    #[test]
    fn angle_section_offsets_each_instance_by_its_atom_count() {
        let text = rendered(&two_instances());
        assert!(text.contains("       2 !NTHETA: angles \n"));
        let lines = section_lines(&text, "!NTHETA");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0], "       1       2       3       4       5       6");
    }

    #[test]
    fn empty_sections_declare_a_zero_count() {
        let text = rendered(&two_instances());
        assert!(text.contains("       0 !NPHI: dihedrals \n"));
        assert!(section_lines(&text, "!NPHI").is_empty());
    }

    #[test]
    fn bond_lines_wrap_after_four_tuples() {
        let mut kind = MoleculeKind::new("HEX");
        for i in 0..6 {
            kind.atoms
                .push(KindAtom::new(&format!("C{i}"), "CT", 0.0, 12.011));
        }
        for i in 0..5 {
            kind.bonds.push(Bond { a: i, b: i + 1 });
        }
        let molecules = MoleculeTable::new(
            vec![kind],
            vec![MoleculeInstance::new(0, 'A', "HEX")],
            vec!["C"; 6].into_iter().map(String::from).collect(),
        )
        .unwrap();

        let text = rendered(&molecules);
        let lines = section_lines(&text, "!NBOND");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 4 * 2 * psf::TERM_INDEX_WIDTH);
        assert_eq!(lines[1], "       5       6");
    }

    #[test]
    fn header_counts_match_the_emitted_entries() {
        let text = rendered(&two_instances());
        let atom_lines = section_lines(&text, "!NATOM").len();
        assert_eq!(atom_lines, 6);

        let bond_entries: usize = section_lines(&text, "!NBOND")
            .iter()
            .map(|l| l.len() / (2 * psf::TERM_INDEX_WIDTH))
            .sum();
        assert_eq!(bond_entries, 4);

        let angle_entries: usize = section_lines(&text, "!NTHETA")
            .iter()
            .map(|l| l.len() / (3 * psf::TERM_INDEX_WIDTH))
            .sum();
        assert_eq!(angle_entries, 2);
    }

    #[test]
    fn term_sections_end_with_a_blank_line() {
        let text = rendered(&two_instances());
        // Partial or full, every term section appends a terminating newline
        // plus one blank line.
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn molecule_serial_overflowing_its_column_is_a_layout_fault() {
        let mut kind = MoleculeKind::new("ION");
        kind.atoms.push(KindAtom::new("NA", "SOD", 1.0, 22.9898));
        let instances = (0..1000)
            .map(|_| MoleculeInstance::new(0, 'A', "ION"))
            .collect();
        let molecules = MoleculeTable::new(
            vec![kind],
            instances,
            vec!["N"; 1000].into_iter().map(String::from).collect(),
        )
        .unwrap();

        let mut out = Vec::new();
        let err = PsfOutput::new().write_to(&molecules, &mut out).unwrap_err();
        assert!(matches!(err, OutputError::Codec(_)));
    }
}
