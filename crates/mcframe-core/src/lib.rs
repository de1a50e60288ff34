//! # mcframe Core Library
//!
//! A library for writing the legacy fixed-column output formats of multi-box
//! Monte Carlo simulations: a PDB-style coordinate/trajectory format and a
//! PSF-style topology format. Both formats pack values into exact character
//! column ranges, and correctness means byte-identical column layout, not
//! merely "reasonable" text.
//!
//! ## Architectural Philosophy
//!
//! The library is split into two layers with a strict dependency direction:
//!
//! - **[`core`]: The Foundation.** Contains stateless data models
//!   (molecule kinds, instance tables, snapshot views of the running
//!   simulation) and the text machinery (the field-layout registry and the
//!   fixed-width field codec) that every record line is rendered through.
//!
//! - **[`output`]: The Writer Layer.** This stateful layer owns the retained
//!   per-atom record templates, the open trajectory streams, and the
//!   coordination of state/restart/topology writes against the configured
//!   output policy. It consumes the simulation only through the narrow read
//!   interfaces defined in [`core`].

pub mod core;
pub mod output;
