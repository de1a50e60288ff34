//! The coordinate-format writers: per-step state trajectories and
//! full-overwrite restart snapshots.
//!
//! The state writer keeps one record template per particle slot for the
//! lifetime of the output session. Identity columns (serial, alias, residue
//! name, chain, residue serial) are rendered once at initialization and
//! never revisited; the mutable columns (coordinates, occupancy) are
//! unconditionally re-patched on every frame. Restart snapshots do not use
//! the templates; they rebuild every line from scratch because their
//! numbering restarts per box.

use crate::core::io::codec::{self, CodecError, RecordLine};
use crate::core::io::layout::pdb::{LINE_WIDTH, atom, cryst1, label, remark};
use crate::core::models::molecules::MoleculeTable;
use crate::core::models::system::SystemSnapshot;
use crate::output::error::{OutputError, StepError};
use crate::output::settings::{self, OutputSettings};
use nalgebra::{Point3, Vector3};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug)]
struct StateFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

/// A blank coordinate record line carrying only the atom tag.
fn default_atom_line() -> RecordLine {
    let mut line = RecordLine::blank(LINE_WIDTH);
    codec::render_string(&mut line, label::ATOM, &label::POS);
    line
}

/// Renders the identity columns of one atom record.
///
/// `particle_index` and `molecule_index` are zero-based; the format counts
/// from one. A one-character alias is shifted one column right so
/// single-letter element symbols sit visually centered in the alias range.
fn format_atom(
    line: &mut RecordLine,
    particle_index: usize,
    molecule_index: usize,
    chain: char,
    alias: &str,
    res_name: &str,
) -> Result<(), CodecError> {
    codec::render_integer(line, particle_index as i64 + 1, &atom::SERIAL)?;
    let alias_spec = if alias.chars().count() == 1 {
        atom::ALIAS.shifted(1)
    } else {
        atom::ALIAS
    };
    codec::render_string(line, alias, &alias_spec);
    codec::render_string(line, res_name, &atom::RES_NAME);
    let mut chain_buf = [0u8; 4];
    codec::render_string(line, chain.encode_utf8(&mut chain_buf), &atom::CHAIN);
    codec::render_integer(line, molecule_index as i64 + 1, &atom::RES_SERIAL)?;
    codec::render_float(line, atom::BETA_DEFAULT, &atom::BETA)?;
    Ok(())
}

/// Re-patches the mutable columns of one atom record.
fn patch_coordinates(
    line: &mut RecordLine,
    position: &Point3<f64>,
    occupancy: &str,
) -> Result<(), CodecError> {
    codec::render_float(line, position.x, &atom::X)?;
    codec::render_float(line, position.y, &atom::Y)?;
    codec::render_float(line, position.z, &atom::Z)?;
    codec::render_string(line, occupancy, &atom::OCCUPANCY);
    Ok(())
}

/// Renders the cell-geometry line for one box.
///
/// Only rectangular cells are modeled; the angle slots carry their constant
/// default.
fn cryst1_line(axes: Vector3<f64>) -> Result<RecordLine, CodecError> {
    let mut line = RecordLine::blank(LINE_WIDTH);
    codec::render_string(&mut line, label::CRYST1, &label::POS);
    codec::render_float(&mut line, axes.x, &cryst1::A)?;
    codec::render_float(&mut line, axes.y, &cryst1::B)?;
    codec::render_float(&mut line, axes.z, &cryst1::C)?;
    codec::render_float(&mut line, cryst1::ANGLE_DEFAULT, &cryst1::ALPHA)?;
    codec::render_float(&mut line, cryst1::ANGLE_DEFAULT, &cryst1::BETA)?;
    codec::render_float(&mut line, cryst1::ANGLE_DEFAULT, &cryst1::GAMMA)?;
    codec::render_string(&mut line, cryst1::SPACE_GROUP_DEFAULT, &cryst1::SPACE_GROUP);
    codec::render_string(&mut line, cryst1::Z_VALUE_DEFAULT, &cryst1::Z_VALUE);
    Ok(line)
}

/// Renders the restart-file header: a remark line carrying the cell axes and
/// the step counter in place of the angle block.
fn restart_header_line(axes: Vector3<f64>, step: u64) -> Result<RecordLine, CodecError> {
    let mut line = RecordLine::blank(LINE_WIDTH);
    codec::render_string(&mut line, label::REMARK, &label::POS);
    codec::render_float(&mut line, axes.x, &cryst1::A)?;
    codec::render_float(&mut line, axes.y, &cryst1::B)?;
    codec::render_float(&mut line, axes.z, &cryst1::C)?;
    codec::render_string(&mut line, remark::STEP_TAG_TEXT, &remark::STEP_TAG);
    let step_value = i64::try_from(step).unwrap_or(i64::MAX);
    codec::render_integer(&mut line, step_value, &remark::STEP)?;
    Ok(line)
}

fn build_templates(
    molecules: &MoleculeTable,
    snapshot: &impl SystemSnapshot,
) -> Result<Vec<RecordLine>, CodecError> {
    let mut templates = vec![default_atom_line(); molecules.particle_count()];
    for b in 0..snapshot.box_count() {
        for &m in snapshot.molecules_in_box(b) {
            for p in molecules.range(m) {
                format_atom(
                    &mut templates[p],
                    p,
                    m,
                    molecules.chain(m),
                    molecules.alias(p),
                    molecules.res_name(m),
                )?;
            }
        }
    }
    Ok(templates)
}

/// Writer for the coordinate format, covering both the per-step state
/// trajectory and the restart snapshots.
///
/// One instance owns one output session: the retained record templates and
/// the open trajectory streams. State files are created (truncated) at
/// construction and appended to per frame; restart files are rewritten from
/// scratch on every restart event.
#[derive(Debug)]
pub struct PdbOutput {
    templates: Vec<RecordLine>,
    state_files: Vec<StateFile>,
    restart_paths: Vec<PathBuf>,
    occupancy_codes: Vec<String>,
    occupancy_default: String,
}

impl PdbOutput {
    /// Opens the session: validates the policy against the box count, opens
    /// the state destinations, and builds the per-particle record templates.
    ///
    /// # Errors
    ///
    /// Returns an error when the per-box file list or occupancy table does
    /// not cover every box, or when a state destination cannot be created.
    pub fn new(
        settings: &OutputSettings,
        molecules: &MoleculeTable,
        snapshot: &impl SystemSnapshot,
    ) -> Result<Self, OutputError> {
        let boxes = snapshot.box_count();
        if settings.occupancy.codes.len() < boxes {
            return Err(OutputError::MissingOccupancyCode {
                codes: settings.occupancy.codes.len(),
                boxes,
            });
        }
        if (settings.state.enable || settings.restart.enable)
            && settings.state.files.len() != boxes
        {
            return Err(OutputError::BoxCountMismatch {
                declared: settings.state.files.len(),
                boxes,
            });
        }

        let mut state_files = Vec::new();
        if settings.state.enable {
            for path in &settings.state.files {
                let file = File::create(path).map_err(|e| OutputError::Io {
                    path: path.clone(),
                    source: e,
                })?;
                state_files.push(StateFile {
                    path: path.clone(),
                    writer: BufWriter::new(file),
                });
            }
        }

        let restart_paths = if settings.restart.enable {
            settings.state.files.iter().map(|p| settings::restart_path(p)).collect()
        } else {
            Vec::new()
        };

        let templates = if settings.state.enable {
            build_templates(molecules, snapshot)?
        } else {
            Vec::new()
        };

        info!(
            boxes,
            particles = templates.len(),
            state = settings.state.enable,
            restart = settings.restart.enable,
            "initialized coordinate output session"
        );
        Ok(Self {
            templates,
            state_files,
            restart_paths,
            occupancy_codes: settings.occupancy.codes.clone(),
            occupancy_default: settings.occupancy.default.clone(),
        })
    }

    /// Appends one frame to every box's state file.
    ///
    /// Box membership is re-read from the snapshot because molecules migrate
    /// between boxes; atoms are emitted in fixed global order regardless, so
    /// the file layout is stable across frames. Every atom appears in every
    /// box's file; atoms resident elsewhere carry zero coordinates and the
    /// occupancy code of their owning box.
    ///
    /// # Errors
    ///
    /// A failure on one box's file does not block the other boxes; all
    /// failed destinations are collected into the returned [`StepError`].
    pub fn write_state(
        &mut self,
        molecules: &MoleculeTable,
        snapshot: &impl SystemSnapshot,
        step: u64,
    ) -> Result<(), StepError> {
        let owners = snapshot.owning_boxes(molecules.count());
        let mut failures = Vec::new();
        let Self {
            templates,
            state_files,
            occupancy_codes,
            ..
        } = self;
        for (b, file) in state_files.iter_mut().enumerate() {
            let result =
                write_state_frame(file, templates, molecules, snapshot, &owners, occupancy_codes, b);
            if let Err(e) = result {
                failures.push((b, e.for_destination(&file.path)));
            }
        }
        if failures.is_empty() {
            debug!(step, "wrote state frame");
            Ok(())
        } else {
            Err(StepError { step, failures })
        }
    }

    /// Rewrites every box's restart snapshot from scratch (truncate
    /// semantics), containing only the molecules currently resident in that
    /// box, grouped by kind.
    ///
    /// Within a file: the segment letter starts at `'A'` and advances per
    /// kind, the molecule serial restarts at one per kind, and the atom
    /// serial runs continuously from one. Atom names come from the kind's
    /// atom list, not the per-particle alias table.
    ///
    /// # Errors
    ///
    /// As for [`write_state`](Self::write_state), failures are collected per
    /// destination.
    pub fn write_restart(
        &self,
        molecules: &MoleculeTable,
        snapshot: &impl SystemSnapshot,
        step: u64,
    ) -> Result<(), StepError> {
        let mut failures = Vec::new();
        for (b, path) in self.restart_paths.iter().enumerate() {
            if let Err(e) = self.write_restart_file(path, molecules, snapshot, b, step) {
                failures.push((b, e.for_destination(path)));
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(StepError { step, failures })
        }
    }

    fn write_restart_file(
        &self,
        path: &Path,
        molecules: &MoleculeTable,
        snapshot: &impl SystemSnapshot,
        box_index: usize,
        step: u64,
    ) -> Result<(), OutputError> {
        let file = File::create(path).map_err(|e| OutputError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);
        restart_header_line(snapshot.box_axes(box_index), step)?.write_to(&mut writer)?;

        let members = snapshot.molecules_in_box(box_index);
        let mut segment = 'A';
        let mut atom_index = 0usize;
        for k in 0..molecules.kind_count() {
            let kind = molecules.kind(k);
            let mut molecule_index = 0usize;
            for &m in members.iter().filter(|&&m| molecules.kind_of(m) == k) {
                for (slot, p) in molecules.range(m).enumerate() {
                    let mut line = default_atom_line();
                    format_atom(
                        &mut line,
                        atom_index,
                        molecule_index,
                        segment,
                        &kind.atoms[slot].name,
                        &kind.name,
                    )?;
                    patch_coordinates(&mut line, &snapshot.position(p), &self.occupancy_default)?;
                    line.write_to(&mut writer)?;
                    atom_index += 1;
                }
                molecule_index += 1;
            }
            segment = (segment as u8).wrapping_add(1) as char;
        }

        writer.write_all(label::END.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        info!(path = %path.display(), step, "wrote restart snapshot");
        Ok(())
    }
}

fn write_state_frame(
    file: &mut StateFile,
    templates: &mut [RecordLine],
    molecules: &MoleculeTable,
    snapshot: &impl SystemSnapshot,
    owners: &[usize],
    occupancy_codes: &[String],
    box_index: usize,
) -> Result<(), OutputError> {
    cryst1_line(snapshot.box_axes(box_index))?.write_to(&mut file.writer)?;
    for m in 0..molecules.count() {
        let owner = owners[m];
        let resident = owner == box_index;
        let code = &occupancy_codes[owner];
        for p in molecules.range(m) {
            let position = if resident {
                snapshot.position(p)
            } else {
                Point3::origin()
            };
            patch_coordinates(&mut templates[p], &position, code)?;
            templates[p].write_to(&mut file.writer)?;
        }
    }
    file.writer.write_all(label::END.as_bytes())?;
    file.writer.write_all(b"\n")?;
    file.writer.flush()?;
    Ok(())
}
