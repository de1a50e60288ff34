//! # Core Models Module
//!
//! Data structures describing what the output writers serialize: molecule
//! kinds with their bonded connectivity, the per-instance molecule table,
//! and the read-only snapshot view of the running simulation.
//!
//! - [`kind`] - One molecule species: atom identity rows and typed
//!   bonded-term lists shared by all instances of the kind
//! - [`molecules`] - The ordered set of molecule instances and the global
//!   particle layout derived from it
//! - [`system`] - The narrow read interface over external simulation state
//!   (positions, cell geometry, box membership)

pub mod kind;
pub mod molecules;
pub mod system;
