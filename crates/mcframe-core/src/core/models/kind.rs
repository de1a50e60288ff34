//! One molecule species and its bonded connectivity.

use thiserror::Error;

/// Errors raised while building a kind's bonded-term lists.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("{section} index array length {len} is not divisible by {arity}")]
    UnevenTermArray {
        section: &'static str,
        len: usize,
        arity: usize,
    },
}

/// Identity of one atom slot within a molecule kind.
#[derive(Debug, Clone, PartialEq)]
pub struct KindAtom {
    /// Atom name within the kind (e.g., "O1", "C2").
    pub name: String,
    /// Force-field atom type (e.g., "OT", "CT3").
    pub type_name: String,
    /// Partial charge in elementary charge units.
    pub charge: f64,
    /// Atomic mass in unified atomic mass units.
    pub mass: f64,
}

impl KindAtom {
    pub fn new(name: &str, type_name: &str, charge: f64, mass: f64) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            charge,
            mass,
        }
    }
}

/// A bond between two atom slots, in kind-local index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bond {
    pub a: usize,
    pub b: usize,
}

/// An angle over three atom slots, in kind-local index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Angle {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

/// A dihedral over four atom slots, in kind-local index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dihedral {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub d: usize,
}

/// One distinct molecule species: its atom identity rows and bonded-term
/// lists, expressed in local atom-slot indices.
///
/// Immutable after load and shared read-only across all instances of the
/// kind. The typed per-arity containers make the tuple arity a structural
/// guarantee; the `set_flat_*` constructors exist for callers holding the
/// legacy flat index arrays and validate divisibility by the arity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoleculeKind {
    pub name: String,
    pub atoms: Vec<KindAtom>,
    pub bonds: Vec<Bond>,
    pub angles: Vec<Angle>,
    pub dihedrals: Vec<Dihedral>,
}

impl MoleculeKind {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Number of atom slots per instance of this kind.
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Replaces the bond list from a flat index array laid out as
    /// consecutive pairs.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnevenTermArray`] when the array length is
    /// not divisible by two; the existing list is left unchanged.
    pub fn set_flat_bonds(&mut self, indices: &[usize]) -> Result<(), TopologyError> {
        if !indices.len().is_multiple_of(2) {
            return Err(TopologyError::UnevenTermArray {
                section: "bond",
                len: indices.len(),
                arity: 2,
            });
        }
        self.bonds = indices
            .chunks_exact(2)
            .map(|pair| Bond {
                a: pair[0],
                b: pair[1],
            })
            .collect();
        Ok(())
    }

    /// Replaces the angle list from a flat index array laid out as
    /// consecutive triples.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnevenTermArray`] when the array length is
    /// not divisible by three; the existing list is left unchanged.
    pub fn set_flat_angles(&mut self, indices: &[usize]) -> Result<(), TopologyError> {
        if !indices.len().is_multiple_of(3) {
            return Err(TopologyError::UnevenTermArray {
                section: "angle",
                len: indices.len(),
                arity: 3,
            });
        }
        self.angles = indices
            .chunks_exact(3)
            .map(|triple| Angle {
                a: triple[0],
                b: triple[1],
                c: triple[2],
            })
            .collect();
        Ok(())
    }

    /// Replaces the dihedral list from a flat index array laid out as
    /// consecutive quadruples.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnevenTermArray`] when the array length is
    /// not divisible by four; the existing list is left unchanged.
    pub fn set_flat_dihedrals(&mut self, indices: &[usize]) -> Result<(), TopologyError> {
        if !indices.len().is_multiple_of(4) {
            return Err(TopologyError::UnevenTermArray {
                section: "dihedral",
                len: indices.len(),
                arity: 4,
            });
        }
        self.dihedrals = indices
            .chunks_exact(4)
            .map(|quad| Dihedral {
                a: quad[0],
                b: quad[1],
                c: quad[2],
                d: quad[3],
            })
            .collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_flat_bonds_builds_typed_pairs() {
        let mut kind = MoleculeKind::new("WAT");
        kind.set_flat_bonds(&[0, 1, 0, 2]).unwrap();
        assert_eq!(kind.bonds, vec![Bond { a: 0, b: 1 }, Bond { a: 0, b: 2 }]);
    }

    #[test]
    fn set_flat_bonds_rejects_uneven_arrays() {
        let mut kind = MoleculeKind::new("WAT");
        kind.set_flat_bonds(&[0, 1]).unwrap();
        let err = kind.set_flat_bonds(&[0, 1, 2]).unwrap_err();
        assert_eq!(
            err,
            TopologyError::UnevenTermArray {
                section: "bond",
                len: 3,
                arity: 2,
            }
        );
        // The previous list survives a rejected replacement.
        assert_eq!(kind.bonds, vec![Bond { a: 0, b: 1 }]);
    }

    #[test]
    fn set_flat_angles_builds_typed_triples() {
        let mut kind = MoleculeKind::new("WAT");
        kind.set_flat_angles(&[1, 0, 2]).unwrap();
        assert_eq!(kind.angles, vec![Angle { a: 1, b: 0, c: 2 }]);
    }

    #[test]
    fn set_flat_angles_rejects_uneven_arrays() {
        let mut kind = MoleculeKind::new("WAT");
        assert!(kind.set_flat_angles(&[1, 0, 2, 3]).is_err());
    }

    #[test]
    fn set_flat_dihedrals_builds_typed_quadruples() {
        let mut kind = MoleculeKind::new("BUT");
        kind.set_flat_dihedrals(&[0, 1, 2, 3]).unwrap();
        assert_eq!(
            kind.dihedrals,
            vec![Dihedral {
                a: 0,
                b: 1,
                c: 2,
                d: 3,
            }]
        );
    }

    #[test]
    fn set_flat_dihedrals_rejects_uneven_arrays() {
        let mut kind = MoleculeKind::new("BUT");
        let err = kind.set_flat_dihedrals(&[0, 1, 2]).unwrap_err();
        assert_eq!(
            err,
            TopologyError::UnevenTermArray {
                section: "dihedral",
                len: 3,
                arity: 4,
            }
        );
    }

    #[test]
    fn atom_count_matches_the_atom_list() {
        let mut kind = MoleculeKind::new("WAT");
        kind.atoms.push(KindAtom::new("O1", "OT", -0.8476, 15.9994));
        kind.atoms.push(KindAtom::new("H1", "HT", 0.4238, 1.008));
        assert_eq!(kind.atom_count(), 2);
    }
}
