//! Human-readable rendering of discovery results and sequence progress.
//!
//! Shared by the interactive menu and the one-shot subcommands so both print
//! the same lines.

use std::io::{self, Write};
use std::path::Path;

use crate::cli::theme::Palette;
use crate::core::errors::HsnError;
use crate::core::paths::file_name_str;
use crate::runner::sequence::{SequenceEvent, SequenceReport, SequenceStep};
use crate::scanner::discovery::LaunchEntry;

/// Tag shown after a paired entry.
pub const PAIR_TAG: &str = "[Auto Audit + Harden Sequence]";

/// `N. <name>  [tag]` for one menu entry.
#[must_use]
pub fn entry_line(index: usize, entry: &LaunchEntry) -> String {
    let tag = match entry {
        LaunchEntry::Pairing(_) => PAIR_TAG.to_string(),
        LaunchEntry::Single(single) => {
            format!("[{}]", file_name_str(&single.path).unwrap_or_default())
        }
    };
    format!("{index}. {}  {tag}", entry.display_name())
}

/// Print one progress event. Missing reports stay silent.
pub fn write_sequence_event<W: Write>(
    writer: &mut W,
    palette: Palette,
    event: &SequenceEvent<'_>,
) -> io::Result<()> {
    match *event {
        SequenceEvent::StepStarted { step, .. } => {
            let line = format!(
                "\n[{}/{}] Running {step}...",
                step.number(),
                SequenceStep::COUNT
            );
            let line = if step == SequenceStep::Harden {
                palette.warn(&line)
            } else {
                palette.info(&line)
            };
            writeln!(writer, "{line}")
        }
        SequenceEvent::StepFinished {
            step: SequenceStep::Harden,
            ..
        } => writeln!(writer, "{}", palette.ok("[✔] Hardening complete.")),
        SequenceEvent::ReportArchived { to, .. } => {
            writeln!(writer, "{}", palette.ok(&format!("[✔] Saved → {}", to.display())))
        }
        SequenceEvent::Started { .. }
        | SequenceEvent::StepFinished { .. }
        | SequenceEvent::ReportMissing { .. } => Ok(()),
    }
}

/// Prints sequence events as they arrive.
///
/// A failed write does not stop the sequence. The first error is kept and
/// handed back by [`EventPrinter::finish`]; later events are dropped.
pub struct EventPrinter<W> {
    writer: W,
    palette: Palette,
    error: Option<io::Error>,
}

impl<W: Write> EventPrinter<W> {
    pub fn new(writer: W, palette: Palette) -> Self {
        Self {
            writer,
            palette,
            error: None,
        }
    }

    /// Print one event unless an earlier write already failed.
    pub fn print(&mut self, event: &SequenceEvent<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = write_sequence_event(&mut self.writer, self.palette, event) {
            self.error = Some(err);
        }
    }

    /// First write error seen, if any.
    pub fn finish(self) -> io::Result<()> {
        self.error.map_or(Ok(()), Err)
    }
}

/// Closing summary of a finished sequence.
pub fn write_sequence_report<W: Write>(
    writer: &mut W,
    palette: Palette,
    report: &SequenceReport,
) -> io::Result<()> {
    writeln!(
        writer,
        "{}",
        palette.ok(&format!(
            "\n[✓] Sequence complete.\nReports in {}",
            report.plan.reports_dir.display()
        ))
    )?;
    writeln!(
        writer,
        "{}",
        palette.info(&format!(
            "→ Before: {}\n→ After:  {}",
            report.plan.before_path.display(),
            report.plan.after_path.display()
        ))
    )
}

/// Failure line for a sequence or a single run.
pub fn write_failure<W: Write>(writer: &mut W, palette: Palette, err: &HsnError) -> io::Result<()> {
    let line = match err {
        HsnError::MissingSibling { harden, .. } => {
            format!("[✘] Audit.ps1 not found beside {}", harden.display())
        }
        script_err if script_err.is_script_failure() => {
            format!("[✘] PowerShell failed: {err}")
        }
        other => format!("[✘] {other}"),
    };
    writeln!(writer, "{}", palette.fail(&line))
}

/// Announce a single-script run.
pub fn write_single_start<W: Write>(
    writer: &mut W,
    palette: Palette,
    script: &Path,
) -> io::Result<()> {
    writeln!(
        writer,
        "{}",
        palette.warn(&format!("\n[Running] {}", script.display()))
    )
}
