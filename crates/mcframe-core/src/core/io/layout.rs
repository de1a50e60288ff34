//! Field-layout registry for the two supported record families.
//!
//! Every named field of the coordinate (PDB) and topology (PSF) formats is
//! declared here as an immutable [`FieldSpec`] constant, grouped by record
//! kind. The registry is exhaustively populated at definition time; there is
//! no runtime lookup that can fail, and no runtime mutation. Column starts
//! are zero-based.

/// Horizontal alignment of a rendered value within its column range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// An immutable description of one named field: its column range, alignment,
/// and (for fixed-point fields) decimal precision.
///
/// Rendering a field never changes the total length of the record line it is
/// patched into; a field only describes *where* and *how* a value lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, used to identify the column range in error reports.
    pub name: &'static str,
    /// Zero-based start column.
    pub start: usize,
    /// Width of the column range in characters.
    pub width: usize,
    /// Alignment of the rendered value within the range.
    pub align: Align,
    /// Decimal digits for fixed-point rendering; `None` for non-numeric or
    /// integer fields.
    pub precision: Option<usize>,
}

impl FieldSpec {
    /// Declares a text or integer field.
    pub const fn new(name: &'static str, start: usize, width: usize, align: Align) -> Self {
        Self {
            name,
            start,
            width,
            align,
            precision: None,
        }
    }

    /// Declares a right-aligned fixed-point field with the given decimal
    /// precision.
    pub const fn fixed(name: &'static str, start: usize, width: usize, precision: usize) -> Self {
        Self {
            name,
            start,
            width,
            align: Align::Right,
            precision: Some(precision),
        }
    }

    /// One past the last column of the range.
    pub const fn end(&self) -> usize {
        self.start + self.width
    }

    /// The same field moved `offset` columns to the right.
    ///
    /// Used for the one-character atom-alias quirk of the coordinate format,
    /// where a single-letter element symbol starts one column further in.
    pub const fn shifted(&self, offset: usize) -> Self {
        Self {
            name: self.name,
            start: self.start + offset,
            width: self.width,
            align: self.align,
            precision: self.precision,
        }
    }
}

/// Column layout of the coordinate (PDB-style) format.
pub mod pdb {
    use super::{Align, FieldSpec};

    /// Total width of every record line in this format.
    pub const LINE_WIDTH: usize = 80;

    /// Record-type labels occupying the leading tag columns.
    pub mod label {
        use super::{Align, FieldSpec};

        pub const POS: FieldSpec = FieldSpec::new("label", 0, 6, Align::Left);

        pub const ATOM: &str = "ATOM  ";
        pub const CRYST1: &str = "CRYST1";
        pub const REMARK: &str = "REMARK";
        pub const END: &str = "END";
    }

    /// Fields of one atom record line.
    pub mod atom {
        use super::{Align, FieldSpec};

        pub const SERIAL: FieldSpec = FieldSpec::new("serial", 6, 5, Align::Right);
        /// Atom alias (element symbol). A one-character alias is rendered
        /// through `ALIAS.shifted(1)`.
        pub const ALIAS: FieldSpec = FieldSpec::new("alias", 12, 4, Align::Left);
        pub const RES_NAME: FieldSpec = FieldSpec::new("res_name", 17, 4, Align::Left);
        pub const CHAIN: FieldSpec = FieldSpec::new("chain", 21, 1, Align::Left);
        pub const RES_SERIAL: FieldSpec = FieldSpec::new("res_serial", 22, 4, Align::Right);
        pub const X: FieldSpec = FieldSpec::fixed("x", 30, 8, 3);
        pub const Y: FieldSpec = FieldSpec::fixed("y", 38, 8, 3);
        pub const Z: FieldSpec = FieldSpec::fixed("z", 46, 8, 3);
        pub const OCCUPANCY: FieldSpec = FieldSpec::new("occupancy", 54, 6, Align::Right);
        pub const BETA: FieldSpec = FieldSpec::fixed("beta", 60, 6, 2);

        pub const BETA_DEFAULT: f64 = 0.0;
    }

    /// Fields of the cell-geometry record line.
    pub mod cryst1 {
        use super::{Align, FieldSpec};

        pub const A: FieldSpec = FieldSpec::fixed("a", 6, 9, 3);
        pub const B: FieldSpec = FieldSpec::fixed("b", 15, 9, 3);
        pub const C: FieldSpec = FieldSpec::fixed("c", 24, 9, 3);
        pub const ALPHA: FieldSpec = FieldSpec::fixed("alpha", 33, 7, 2);
        pub const BETA: FieldSpec = FieldSpec::fixed("beta", 40, 7, 2);
        pub const GAMMA: FieldSpec = FieldSpec::fixed("gamma", 47, 7, 2);
        pub const SPACE_GROUP: FieldSpec = FieldSpec::new("space_group", 55, 11, Align::Left);
        pub const Z_VALUE: FieldSpec = FieldSpec::new("z_value", 66, 4, Align::Right);

        /// Only rectangular cells are modeled for this record; the slots for
        /// non-90 degree angles exist in the format but always carry this
        /// value.
        pub const ANGLE_DEFAULT: f64 = 90.0;
        pub const SPACE_GROUP_DEFAULT: &str = "P 1";
        pub const Z_VALUE_DEFAULT: &str = "1";
    }

    /// Fields of the restart-file remark line, which replaces the angle block
    /// of the cell-geometry record with a step counter.
    pub mod remark {
        use super::{Align, FieldSpec};

        pub const STEP_TAG: FieldSpec = FieldSpec::new("step_tag", 34, 4, Align::Left);
        pub const STEP: FieldSpec = FieldSpec::new("step", 39, 12, Align::Right);

        pub const STEP_TAG_TEXT: &str = "STEP";
    }
}

/// Column layout of the topology (PSF-style) format.
pub mod psf {
    use super::{Align, FieldSpec};

    /// Total width of one atom record line; the fields are contiguous.
    pub const ATOM_LINE_WIDTH: usize = 70;

    /// Fields of one atom record line.
    pub mod atom {
        use super::{Align, FieldSpec};

        pub const SERIAL: FieldSpec = FieldSpec::new("serial", 0, 8, Align::Right);
        pub const SEGMENT: FieldSpec = FieldSpec::new("segment", 8, 4, Align::Right);
        pub const RES_SERIAL: FieldSpec = FieldSpec::new("res_serial", 12, 3, Align::Right);
        pub const RES_NAME: FieldSpec = FieldSpec::new("res_name", 15, 7, Align::Right);
        pub const NAME: FieldSpec = FieldSpec::new("name", 22, 4, Align::Right);
        pub const TYPE: FieldSpec = FieldSpec::new("type", 26, 6, Align::Right);
        pub const CHARGE: FieldSpec = FieldSpec::fixed("charge", 32, 12, 6);
        pub const MASS: FieldSpec = FieldSpec::fixed("mass", 44, 14, 4);
        pub const UNUSED: FieldSpec = FieldSpec::new("unused", 58, 12, Align::Right);
    }

    /// Width of one renumbered atom index in the bonded-term sections.
    pub const TERM_INDEX_WIDTH: usize = 8;

    /// Width of the count column in every section header line.
    pub const HEADER_COUNT_WIDTH: usize = 8;

    /// Bonded-term tuples written per line, by section.
    pub const BONDS_PER_LINE: usize = 4;
    pub const ANGLES_PER_LINE: usize = 3;
    pub const DIHEDRALS_PER_LINE: usize = 2;

    pub const TITLE_HEADER: &str = "!NTITLE";
    pub const ATOM_HEADER: &str = "!NATOM";
    pub const BOND_HEADER: &str = "!NBOND: bonds";
    pub const ANGLE_HEADER: &str = "!NTHETA: angles";
    pub const DIHEDRAL_HEADER: &str = "!NPHI: dihedrals";
    pub const REMARK_TAG: &str = " REMARKS ";

    /// The `FieldSpec` for the `slot`-th index cell of a bonded-term line.
    pub const fn term_cell(slot: usize) -> FieldSpec {
        FieldSpec::new("term_index", slot * TERM_INDEX_WIDTH, TERM_INDEX_WIDTH, Align::Right)
    }
}
