// crates/blockdrag-cli/src/artifacts.rs
// ============================================================================
// Module: Run Artifacts
// Description: Per-run artifact roots and per-attempt summaries.
// Purpose: Leave a deterministic record of every attempt on disk.
// Dependencies: serde, serde_jcs, blockdrag-core
// ============================================================================

//! ## Overview
//! Each invocation of `blockdrag run` gets a `run_{millis}` directory below
//! the configured artifact root, and each attempt writes into its own
//! `attempt_{n}` subdirectory. JSON artifacts use canonical JCS encoding so
//! two identical runs produce byte-identical files.
//!
//! [`AttemptReporter`] writes `summary.json` and `summary.md` even when the
//! attempt is abandoned without an explicit outcome.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use blockdrag_core::RunFailure;
use blockdrag_core::RunPhase;
use blockdrag_core::RunReport;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Summary file name (canonical JSON).
pub const SUMMARY_JSON: &str = "summary.json";
/// Summary file name (Markdown).
pub const SUMMARY_MARKDOWN: &str = "summary.md";
/// Attempt report file name.
pub const REPORT_JSON: &str = "report.json";
/// WebDriver transcript file name.
pub const TRANSCRIPT_JSON: &str = "webdriver_transcript.json";

// ============================================================================
// SECTION: Run Root
// ============================================================================

/// Milliseconds since the Unix epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Artifact root for one `blockdrag run` invocation.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    /// `run_{millis}` directory.
    root: PathBuf,
}

impl RunArtifacts {
    /// Creates a fresh `run_{millis}` directory below `base`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be created.
    pub fn create(base: &Path) -> io::Result<Self> {
        let root = base.join(format!("run_{}", now_millis()));
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
        })
    }

    /// Returns the run directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the directory for one attempt.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be created.
    pub fn attempt(&self, attempt: u32) -> io::Result<AttemptArtifacts> {
        let root = self.root.join(format!("attempt_{attempt}"));
        fs::create_dir_all(&root)?;
        Ok(AttemptArtifacts {
            root,
        })
    }
}

// ============================================================================
// SECTION: Attempt Directory
// ============================================================================

/// Artifact directory of a single attempt.
#[derive(Debug, Clone)]
pub struct AttemptArtifacts {
    /// `attempt_{n}` directory.
    root: PathBuf,
}

impl AttemptArtifacts {
    /// Returns the attempt directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a JSON artifact using canonical JCS serialization.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when encoding or writing fails.
    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        let bytes = serde_jcs::to_vec(value).map_err(|err| io::Error::other(err.to_string()))?;
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Writes a UTF-8 text artifact.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when writing fails.
    pub fn write_text(&self, name: &str, value: &str) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, value.as_bytes())?;
        Ok(path)
    }
}

// ============================================================================
// SECTION: Summary
// ============================================================================

/// Outcome label of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    /// Every iteration verified and teardown completed.
    Passed,
    /// The attempt raised a fault.
    Failed,
    /// The attempt ended without reporting an outcome.
    Unknown,
}

impl AttemptStatus {
    /// Returns the lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

/// Machine-readable attempt summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptSummary {
    /// Attempt number, starting at 1.
    pub attempt: u32,
    /// Outcome.
    pub status: AttemptStatus,
    /// Seed the attempt ran with, when it got that far.
    pub seed: Option<u64>,
    /// Drag gestures completed.
    pub drags: usize,
    /// Clean verification passes.
    pub verifications: usize,
    /// Last phase reached.
    pub final_phase: Option<RunPhase>,
    /// Fault category.
    pub error_kind: Option<String>,
    /// Fault description.
    pub error: Option<String>,
    /// Start time, milliseconds since the epoch.
    pub started_at_ms: u128,
    /// End time, milliseconds since the epoch.
    pub ended_at_ms: u128,
    /// Wall-clock duration.
    pub duration_ms: u128,
    /// Free-form notes.
    pub notes: Vec<String>,
    /// Other files written for the attempt.
    pub artifacts: Vec<String>,
}

/// Writes the summary of one attempt, falling back on drop.
pub struct AttemptReporter {
    /// Attempt directory.
    artifacts: AttemptArtifacts,
    /// Attempt number.
    attempt: u32,
    /// Creation time.
    started_at_ms: u128,
    /// Files written through [`AttemptReporter::record_json`].
    written: Vec<String>,
    /// Whether a summary was written.
    finalized: bool,
}

impl AttemptReporter {
    /// Creates a reporter writing into `artifacts`.
    #[must_use]
    pub fn new(artifacts: AttemptArtifacts, attempt: u32) -> Self {
        Self {
            artifacts,
            attempt,
            started_at_ms: now_millis(),
            written: Vec::new(),
            finalized: false,
        }
    }

    /// Returns the attempt directory.
    #[must_use]
    pub const fn artifacts(&self) -> &AttemptArtifacts {
        &self.artifacts
    }

    /// Writes a JSON artifact and lists it in the summary.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when encoding or writing fails.
    pub fn record_json<T: Serialize>(&mut self, name: &str, value: &T) -> io::Result<PathBuf> {
        let path = self.artifacts.write_json(name, value)?;
        self.written.push(name.to_string());
        Ok(path)
    }

    /// Writes the report and summary for a finished attempt.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when writing fails.
    pub fn finish(
        &mut self,
        outcome: &Result<RunReport, RunFailure>,
        notes: Vec<String>,
    ) -> io::Result<AttemptSummary> {
        let (report, status, error_kind, error) = match outcome {
            Ok(report) => (report, AttemptStatus::Passed, None, None),
            Err(failure) => (
                &failure.report,
                AttemptStatus::Failed,
                Some(failure.error.kind().to_string()),
                Some(failure.error.to_string()),
            ),
        };
        self.record_json(REPORT_JSON, report)?;
        let summary = AttemptSummary {
            attempt: self.attempt,
            status,
            seed: Some(report.seed),
            drags: report.drags,
            verifications: report.verifications,
            final_phase: Some(report.phase()),
            error_kind,
            error,
            notes,
            ..self.empty_summary(status)
        };
        self.write_summary(&summary)?;
        Ok(summary)
    }

    /// Writes a summary for an attempt that never produced a report.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when writing fails.
    pub fn abandon(&mut self, note: &str) -> io::Result<AttemptSummary> {
        let mut summary = self.empty_summary(AttemptStatus::Unknown);
        summary.notes.push(note.to_string());
        self.write_summary(&summary)?;
        Ok(summary)
    }

    /// Builds a summary with timing and artifact fields filled in.
    fn empty_summary(&self, status: AttemptStatus) -> AttemptSummary {
        let ended_at_ms = now_millis();
        AttemptSummary {
            attempt: self.attempt,
            status,
            seed: None,
            drags: 0,
            verifications: 0,
            final_phase: None,
            error_kind: None,
            error: None,
            started_at_ms: self.started_at_ms,
            ended_at_ms,
            duration_ms: ended_at_ms.saturating_sub(self.started_at_ms),
            notes: Vec::new(),
            artifacts: self.written.clone(),
        }
    }

    /// Writes both summary files and marks the reporter finalized.
    fn write_summary(&mut self, summary: &AttemptSummary) -> io::Result<()> {
        self.artifacts.write_json(SUMMARY_JSON, summary)?;
        self.artifacts.write_text(SUMMARY_MARKDOWN, &summary_markdown(summary))?;
        self.finalized = true;
        Ok(())
    }
}

impl Drop for AttemptReporter {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }
        let _ = self.abandon("attempt terminated without explicit summary");
    }
}

/// Renders the human-readable summary.
#[must_use]
pub fn summary_markdown(summary: &AttemptSummary) -> String {
    let mut out = String::new();
    out.push_str("# Attempt Summary\n\n");
    out.push_str("## Status\n\n");
    let _ = writeln!(out, "- Attempt: {}", summary.attempt);
    let _ = writeln!(out, "- Status: {}", summary.status.as_str());
    if let Some(seed) = summary.seed {
        let _ = writeln!(out, "- Seed: {seed}");
    }
    let _ = writeln!(out, "- Drags: {}", summary.drags);
    let _ = writeln!(out, "- Verifications: {}", summary.verifications);
    let _ = writeln!(out, "- Duration (ms): {}", summary.duration_ms);
    if let (Some(kind), Some(error)) = (&summary.error_kind, &summary.error) {
        let _ = writeln!(out, "- Fault ({kind}): {error}");
    }
    push_list(&mut out, "Notes", &summary.notes);
    push_list(&mut out, "Artifacts", &summary.artifacts);
    out
}

/// Appends a bulleted section, writing `None` for empty lists.
fn push_list(out: &mut String, title: &str, items: &[String]) {
    let _ = write!(out, "\n## {title}\n\n");
    if items.is_empty() {
        out.push_str("- None\n");
    }
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}
