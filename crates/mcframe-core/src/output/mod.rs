//! # Output Module
//!
//! The stateful writer layer: it owns the retained coordinate templates and
//! open trajectory streams, and applies the configured output policy to each
//! simulation step. The simulation itself is only consulted through the
//! narrow read interfaces of [`crate::core::models`].
//!
//! - [`settings`] - The TOML-loadable output policy
//! - [`pdb`] - Coordinate-format writers (state trajectory, restart
//!   snapshots)
//! - [`psf`] - The topology aggregator
//! - [`error`] - The layered error taxonomy of the writer layer

pub mod error;
pub mod pdb;
pub mod psf;
pub mod settings;

use crate::core::models::molecules::MoleculeTable;
use crate::core::models::system::SystemSnapshot;
use error::{InitError, OutputError, StepError};
use pdb::PdbOutput;
use psf::PsfOutput;
use settings::OutputSettings;
use tracing::instrument;

/// Drives all configured outputs for one simulation run.
///
/// Construction emits the one-shot topology file and, when state output is
/// enabled, the initial coordinate frame. Afterwards the engine reports each
/// finished step through [`on_step`](Self::on_step), and the coordinator
/// applies the configured step frequencies.
#[derive(Debug)]
pub struct OutputCoordinator {
    pdb: Option<PdbOutput>,
    state_enabled: bool,
    state_frequency: u64,
    restart_enabled: bool,
    restart_frequency: u64,
}

impl OutputCoordinator {
    /// Brings up the output session for one run.
    ///
    /// # Errors
    ///
    /// Returns an error when the policy is inconsistent (zero frequency,
    /// per-box lists not covering every box), when a destination cannot be
    /// created, or when the initial frame fails to write.
    pub fn new(
        settings: &OutputSettings,
        molecules: &MoleculeTable,
        snapshot: &impl SystemSnapshot,
    ) -> Result<Self, InitError> {
        if settings.state.enable && settings.state.frequency == 0 {
            return Err(OutputError::ZeroFrequency { section: "state" }.into());
        }
        if settings.restart.enable && settings.restart.frequency == 0 {
            return Err(OutputError::ZeroFrequency { section: "restart" }.into());
        }

        // The topology of a run is fixed, so its file is written exactly
        // once, up front.
        if settings.topology.enable {
            PsfOutput::new().write_to_path(molecules, &settings.topology.file)?;
        }

        let pdb = if settings.state.enable || settings.restart.enable {
            Some(PdbOutput::new(settings, molecules, snapshot)?)
        } else {
            None
        };

        let mut coordinator = Self {
            pdb,
            state_enabled: settings.state.enable,
            state_frequency: settings.state.frequency,
            restart_enabled: settings.restart.enable,
            restart_frequency: settings.restart.frequency,
        };
        if coordinator.state_enabled
            && let Some(pdb) = coordinator.pdb.as_mut()
        {
            pdb.write_state(molecules, snapshot, 0)?;
        }
        Ok(coordinator)
    }

    /// Reports one finished simulation step, writing whichever outputs are
    /// due at this step per their configured frequencies.
    ///
    /// # Errors
    ///
    /// Failed destinations do not block the remaining ones; every failure of
    /// the pass is collected into the returned [`StepError`].
    #[instrument(skip(self, molecules, snapshot))]
    pub fn on_step(
        &mut self,
        molecules: &MoleculeTable,
        snapshot: &impl SystemSnapshot,
        step: u64,
    ) -> Result<(), StepError> {
        let mut failures = Vec::new();
        if let Some(pdb) = self.pdb.as_mut() {
            if self.state_enabled && (step + 1).is_multiple_of(self.state_frequency) {
                if let Err(e) = pdb.write_state(molecules, snapshot, step) {
                    failures.extend(e.failures);
                }
            }
            if self.restart_enabled && (step + 1).is_multiple_of(self.restart_frequency) {
                if let Err(e) = pdb.write_restart(molecules, snapshot, step) {
                    failures.extend(e.failures);
                }
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(StepError { step, failures })
        }
    }
}
