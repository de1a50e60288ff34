//! The ordered set of molecule instances and the global particle layout.

use super::kind::MoleculeKind;
use std::ops::Range;
use thiserror::Error;

/// Errors raised while assembling a [`MoleculeTable`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoleculeTableError {
    #[error("molecule {molecule} references unknown kind index {kind}")]
    UnknownKind { molecule: usize, kind: usize },
    #[error("alias table holds {found} entries, expected one per particle ({expected})")]
    AliasCountMismatch { expected: usize, found: usize },
}

/// One molecule instance: which kind it is, and the identity fields written
/// into its coordinate records.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeInstance {
    /// Index into the kind list.
    pub kind: usize,
    /// Chain letter assigned to this molecule.
    pub chain: char,
    /// Residue name written for this molecule's atoms.
    pub res_name: String,
}

impl MoleculeInstance {
    pub fn new(kind: usize, chain: char, res_name: &str) -> Self {
        Self {
            kind,
            chain,
            res_name: res_name.to_string(),
        }
    }
}

/// The immutable molecule layout of one simulation: kinds, instances in
/// global iteration order, and the dense particle index space derived from
/// them.
///
/// Particle indices are assigned contiguously per molecule, in instance
/// order; they are the stable per-slot indices the coordinate templates are
/// keyed by.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeTable {
    kinds: Vec<MoleculeKind>,
    instances: Vec<MoleculeInstance>,
    /// Per-particle atom alias (element symbol) used by the trajectory
    /// output; distinct from the kind's atom names.
    aliases: Vec<String>,
    /// Prefix offsets into the particle index space, one per molecule plus a
    /// final total.
    starts: Vec<usize>,
}

impl MoleculeTable {
    /// Assembles the table, deriving the particle layout from the instances'
    /// kinds.
    ///
    /// `aliases` holds one entry per particle, in the same global order the
    /// particle indices are assigned in.
    ///
    /// # Errors
    ///
    /// Returns an error when an instance references a kind index outside the
    /// kind list, or when the alias table length does not match the total
    /// particle count.
    pub fn new(
        kinds: Vec<MoleculeKind>,
        instances: Vec<MoleculeInstance>,
        aliases: Vec<String>,
    ) -> Result<Self, MoleculeTableError> {
        let mut starts = Vec::with_capacity(instances.len() + 1);
        let mut total = 0;
        starts.push(0);
        for (m, instance) in instances.iter().enumerate() {
            let kind = kinds
                .get(instance.kind)
                .ok_or(MoleculeTableError::UnknownKind {
                    molecule: m,
                    kind: instance.kind,
                })?;
            total += kind.atom_count();
            starts.push(total);
        }
        if aliases.len() != total {
            return Err(MoleculeTableError::AliasCountMismatch {
                expected: total,
                found: aliases.len(),
            });
        }
        Ok(Self {
            kinds,
            instances,
            aliases,
            starts,
        })
    }

    /// Number of molecule instances.
    pub fn count(&self) -> usize {
        self.instances.len()
    }

    /// Number of distinct molecule kinds.
    pub fn kind_count(&self) -> usize {
        self.kinds.len()
    }

    /// Total number of particles across all molecules.
    pub fn particle_count(&self) -> usize {
        *self.starts.last().unwrap_or(&0)
    }

    pub fn kind(&self, k: usize) -> &MoleculeKind {
        &self.kinds[k]
    }

    /// Kind index of molecule `m`.
    pub fn kind_of(&self, m: usize) -> usize {
        self.instances[m].kind
    }

    pub fn chain(&self, m: usize) -> char {
        self.instances[m].chain
    }

    pub fn res_name(&self, m: usize) -> &str {
        &self.instances[m].res_name
    }

    /// Particle index range of molecule `m`.
    pub fn range(&self, m: usize) -> Range<usize> {
        self.starts[m]..self.starts[m + 1]
    }

    /// Atom alias of particle `p`.
    pub fn alias(&self, p: usize) -> &str {
        &self.aliases[p]
    }
}
