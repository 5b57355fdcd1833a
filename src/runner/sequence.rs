//! The audit → harden → audit sequence with before/after report capture.
//!
//! Steps run strictly in order and the first failure aborts the rest:
//!
//! | # | action                                         |
//! |---|------------------------------------------------|
//! | 1 | run `Audit.ps1`                                |
//! | 2 | rename newest report to `before_<stem>_<ts>`   |
//! | 3 | run the harden script                          |
//! | 4 | run `Audit.ps1` again                          |
//! | 5 | rename newest report to `after_<stem>_<ts>`    |
//!
//! Renames that already happened stay in place after a failure. A step that
//! finds no report to rename is skipped without error.

#![allow(missing_docs)]

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use crate::core::errors::{HsnError, Result};
use crate::core::paths::{file_stem_lossy, sibling};
use crate::runner::ScriptRunner;
use crate::runner::reports::{AFTER_PREFIX, BEFORE_PREFIX, REPORTS_DIR_NAME, archive_latest};
use crate::scanner::patterns::AUDIT_SCRIPT_NAME;

/// Format of the token shared by both archive names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// One of the three script runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceStep {
    InitialAudit,
    Harden,
    FinalAudit,
}

impl SequenceStep {
    /// 1-based position among the script runs.
    #[must_use]
    pub const fn number(self) -> usize {
        match self {
            Self::InitialAudit => 1,
            Self::Harden => 2,
            Self::FinalAudit => 3,
        }
    }

    pub const COUNT: usize = 3;
}

impl fmt::Display for SequenceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitialAudit => f.write_str("initial audit"),
            Self::Harden => f.write_str("hardening script"),
            Self::FinalAudit => f.write_str("final audit"),
        }
    }
}

/// Which archive a report goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPhase {
    Before,
    After,
}

impl fmt::Display for ReportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => f.write_str("before"),
            Self::After => f.write_str("after"),
        }
    }
}

/// Progress notifications emitted while a sequence runs.
#[derive(Debug, Clone, Copy)]
pub enum SequenceEvent<'a> {
    Started {
        plan: &'a SequencePlan,
    },
    StepStarted {
        step: SequenceStep,
        script: &'a Path,
    },
    StepFinished {
        step: SequenceStep,
        script: &'a Path,
        elapsed: Duration,
    },
    ReportArchived {
        phase: ReportPhase,
        from: &'a Path,
        to: &'a Path,
    },
    ReportMissing {
        phase: ReportPhase,
        target: &'a Path,
    },
}

/// Everything a sequence needs, computed before any side effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequencePlan {
    pub audit: PathBuf,
    pub harden: PathBuf,
    pub reports_dir: PathBuf,
    pub timestamp: String,
    pub before_path: PathBuf,
    pub after_path: PathBuf,
}

impl SequencePlan {
    /// Check for the sibling `Audit.ps1` and compute the archive targets.
    ///
    /// Touches nothing on disk. A missing audit script is
    /// [`HsnError::MissingSibling`].
    pub fn prepare(harden: &Path, started_at: NaiveDateTime) -> Result<Self> {
        let audit = sibling(harden, AUDIT_SCRIPT_NAME);
        if !audit.exists() {
            return Err(HsnError::MissingSibling {
                harden: harden.to_path_buf(),
                expected: audit,
            });
        }

        let reports_dir = sibling(harden, REPORTS_DIR_NAME);
        let stem = file_stem_lossy(harden);
        let timestamp = started_at.format(TIMESTAMP_FORMAT).to_string();
        let before_path = reports_dir.join(format!("{BEFORE_PREFIX}{stem}_{timestamp}.json"));
        let after_path = reports_dir.join(format!("{AFTER_PREFIX}{stem}_{timestamp}.json"));

        Ok(Self {
            audit,
            harden: harden.to_path_buf(),
            reports_dir,
            timestamp,
            before_path,
            after_path,
        })
    }
}

/// Result of a sequence that ran to completion.
///
/// Both target paths are always reported. The `*_archived` flags say whether
/// a file actually landed there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceReport {
    #[serde(flatten)]
    pub plan: SequencePlan,
    pub before_archived: bool,
    pub after_archived: bool,
}

/// Drives one sequence over a [`ScriptRunner`].
pub struct Sequencer<'r, R: ScriptRunner + ?Sized> {
    runner: &'r R,
}

impl<'r, R: ScriptRunner + ?Sized> Sequencer<'r, R> {
    pub fn new(runner: &'r R) -> Self {
        Self { runner }
    }

    /// Plan with the current local time and run.
    pub fn run_for<F>(&self, harden: &Path, on_event: F) -> Result<SequenceReport>
    where
        F: FnMut(SequenceEvent<'_>),
    {
        let plan = SequencePlan::prepare(harden, Local::now().naive_local())?;
        self.run(&plan, on_event)
    }

    /// Execute a prepared plan.
    pub fn run<F>(&self, plan: &SequencePlan, mut on_event: F) -> Result<SequenceReport>
    where
        F: FnMut(SequenceEvent<'_>),
    {
        fs::create_dir_all(&plan.reports_dir)
            .map_err(|source| HsnError::io(&plan.reports_dir, source))?;
        on_event(SequenceEvent::Started { plan });

        self.step(SequenceStep::InitialAudit, &plan.audit, &mut on_event)?;
        let before_archived = archive(plan, ReportPhase::Before, &mut on_event)?;

        self.step(SequenceStep::Harden, &plan.harden, &mut on_event)?;

        self.step(SequenceStep::FinalAudit, &plan.audit, &mut on_event)?;
        let after_archived = archive(plan, ReportPhase::After, &mut on_event)?;

        Ok(SequenceReport {
            plan: plan.clone(),
            before_archived,
            after_archived,
        })
    }

    fn step<F>(&self, step: SequenceStep, script: &Path, on_event: &mut F) -> Result<()>
    where
        F: FnMut(SequenceEvent<'_>),
    {
        on_event(SequenceEvent::StepStarted { step, script });
        let started = Instant::now();
        self.runner.run_script(script)?;
        on_event(SequenceEvent::StepFinished {
            step,
            script,
            elapsed: started.elapsed(),
        });
        Ok(())
    }
}

fn archive<F>(plan: &SequencePlan, phase: ReportPhase, on_event: &mut F) -> Result<bool>
where
    F: FnMut(SequenceEvent<'_>),
{
    let target = match phase {
        ReportPhase::Before => &plan.before_path,
        ReportPhase::After => &plan.after_path,
    };
    match archive_latest(&plan.reports_dir, target)? {
        Some(from) => {
            on_event(SequenceEvent::ReportArchived {
                phase,
                from: &from,
                to: target,
            });
            Ok(true)
        }
        None => {
            on_event(SequenceEvent::ReportMissing { phase, target });
            Ok(false)
        }
    }
}
