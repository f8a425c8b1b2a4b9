// manifestrs/src/orchestrator/summary.rs

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Full,
    Incremental,
}

/// What one generation pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeBreakdown {
    pub added: usize,
    pub modified: usize,
    pub removed: usize,
    pub entry_point_regenerated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFailure {
    pub filepath: PathBuf,
    pub error: String,
}

/// Report of one generation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub mode: GenerationMode,

    /// Pass short-circuited without doing any work
    pub skipped: bool,

    pub components_considered: usize,
    pub files_written: usize,
    pub files_failed: usize,

    /// Writes skipped because the target was edited by hand
    pub conflicts: usize,

    pub breakdown: ChangeBreakdown,

    #[serde(serialize_with = "serialize_millis", rename = "durationMs")]
    pub duration: Duration,

    pub errors: Vec<FileFailure>,
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl GenerationSummary {
    pub fn new(mode: GenerationMode, components_considered: usize) -> Self {
        Self {
            mode,
            skipped: false,
            components_considered,
            files_written: 0,
            files_failed: 0,
            conflicts: 0,
            breakdown: ChangeBreakdown::default(),
            duration: Duration::ZERO,
            errors: Vec::new(),
        }
    }

    /// Summary of a pass that found nothing to do
    pub fn skipped(mode: GenerationMode) -> Self {
        Self {
            skipped: true,
            ..Self::new(mode, 0)
        }
    }

    pub fn record_failure(&mut self, filepath: &Path, error: impl ToString) {
        self.files_failed += 1;
        self.errors.push(FileFailure {
            filepath: filepath.to_path_buf(),
            error: error.to_string(),
        });
    }

    pub fn is_success(&self) -> bool {
        self.files_failed == 0
    }
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            GenerationMode::Full => "full",
            GenerationMode::Incremental => "incremental",
        };

        if self.skipped {
            return write!(f, "{} generation skipped: nothing changed", mode);
        }

        write!(
            f,
            "{} generation: {} components, {} written, {} failed, ",
            mode, self.components_considered, self.files_written, self.files_failed
        )?;

        let entry_point = if self.breakdown.entry_point_regenerated {
            ", entry point"
        } else {
            ""
        };
        let elapsed = Duration::from_millis(self.duration.as_millis() as u64);
        write!(
            f,
            "{} preserved (+{} ~{} -{}{}) in {}",
            self.conflicts,
            self.breakdown.added,
            self.breakdown.modified,
            self.breakdown.removed,
            entry_point,
            humantime::format_duration(elapsed)
        )
    }
}
