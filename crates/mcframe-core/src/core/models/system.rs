//! The narrow read interface over external simulation state.

use nalgebra::{Point3, Vector3};

/// Read-only view of the simulation state an output pass consults.
///
/// The writers never own this state; they read it fresh on every output
/// event, between simulation moves (the surrounding engine guarantees output
/// happens at a quiescent point, so no locking is involved). Molecules
/// migrate between boxes across steps, which is why box membership is
/// re-read every pass while the particle index space itself stays fixed.
///
/// Implementations must partition every molecule index into exactly one
/// box's membership list.
pub trait SystemSnapshot {
    /// Number of simulation boxes.
    fn box_count(&self) -> usize;

    /// Current position of particle `p` in Angstroms.
    fn position(&self, p: usize) -> Point3<f64>;

    /// Cell axis lengths of box `b` in Angstroms.
    fn box_axes(&self, b: usize) -> Vector3<f64>;

    /// Molecule indices currently resident in box `b`, in membership
    /// iteration order.
    fn molecules_in_box(&self, b: usize) -> &[usize];

    /// The owning box of every molecule, indexed by molecule.
    ///
    /// Derived from the membership lists; `molecule_count` is the total
    /// instance count of the molecule table.
    fn owning_boxes(&self, molecule_count: usize) -> Vec<usize> {
        let mut owners = vec![0; molecule_count];
        for b in 0..self.box_count() {
            for &m in self.molecules_in_box(b) {
                owners[m] = b;
            }
        }
        owners
    }
}
