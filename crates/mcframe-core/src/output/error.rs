//! Error taxonomy of the writer layer.

use crate::core::io::codec::CodecError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A failure while producing one output file.
///
/// Layout faults ([`Codec`](OutputError::Codec)) and resource faults
/// ([`Io`](OutputError::Io)) both abort only the file being written; the
/// caller decides whether other destinations proceed.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error writing '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// An I/O failure not yet attached to a destination; converted to
    /// [`Io`](OutputError::Io) at the per-file boundary.
    #[error("I/O error: {0}")]
    Stream(#[from] io::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("settings declare {declared} state file(s) but the system has {boxes} box(es)")]
    BoxCountMismatch { declared: usize, boxes: usize },
    #[error("occupancy table holds {codes} code(s) but the system has {boxes} box(es)")]
    MissingOccupancyCode { codes: usize, boxes: usize },
    #[error("{section} output is enabled with a step frequency of zero")]
    ZeroFrequency { section: &'static str },
}

impl OutputError {
    /// Attaches the destination identity to a bare stream error.
    pub(crate) fn for_destination(self, path: &Path) -> Self {
        match self {
            OutputError::Stream(source) => OutputError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        }
    }
}

/// A failure while bringing up an output session: either a single
/// destination/policy fault, or the aggregate failure of the initial frame.
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error(transparent)]
    Step(#[from] StepError),
}

/// The aggregate failure of one output event.
///
/// A failed write to one box's file does not block attempts on the other
/// boxes in the same pass; every failed destination is collected here with
/// its box index.
#[derive(Debug, Error)]
#[error("output for step {step} failed for {} destination(s)", failures.len())]
pub struct StepError {
    pub step: u64,
    pub failures: Vec<(usize, OutputError)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_destination_attaches_the_path_to_stream_errors() {
        let err = OutputError::Stream(io::Error::other("disk full"));
        match err.for_destination(Path::new("out/box0.pdb")) {
            OutputError::Io { path, .. } => assert_eq!(path, PathBuf::from("out/box0.pdb")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn for_destination_leaves_other_variants_alone() {
        let err = OutputError::ZeroFrequency { section: "state" };
        assert!(matches!(
            err.for_destination(Path::new("x")),
            OutputError::ZeroFrequency { .. }
        ));
    }

    #[test]
    fn step_error_reports_the_failure_count() {
        let err = StepError {
            step: 42,
            failures: vec![
                (0, OutputError::Stream(io::Error::other("a"))),
                (1, OutputError::Stream(io::Error::other("b"))),
            ],
        };
        assert_eq!(err.to_string(), "output for step 42 failed for 2 destination(s)");
    }
}
