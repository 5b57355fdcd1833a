//! Activity log: turns launcher events into JSONL entries.
//!
//! Disabled unless a log path is configured. Without one every call is a
//! no-op.

#![allow(missing_docs)]

use std::path::Path;

use crate::core::config::LoggingConfig;
use crate::core::errors::HsnError;
use crate::logger::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};
use crate::runner::sequence::{SequenceEvent, SequenceReport};
use crate::scanner::discovery::Discovery;

pub struct ActivityLog {
    writer: Option<JsonlWriter>,
}

impl ActivityLog {
    #[must_use]
    pub fn disabled() -> Self {
        Self { writer: None }
    }

    #[must_use]
    pub fn from_config(config: &LoggingConfig) -> Self {
        let writer = config.jsonl_path.as_ref().map(|path| {
            JsonlWriter::open(JsonlConfig {
                path: path.clone(),
                max_size_bytes: config.max_size_bytes,
                max_rotated_files: config.max_rotated_files,
            })
        });
        Self { writer }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn record(&mut self, entry: &LogEntry) {
        if let Some(writer) = self.writer.as_mut() {
            writer.write_entry(entry);
        }
    }

    pub fn discovery(&mut self, discovery: &Discovery) {
        let mut entry =
            LogEntry::new(EventType::DiscoveryComplete, Severity::Info).with_path(&discovery.root);
        entry.details = Some(format!(
            "pairings={} singles={}",
            discovery.pairings.len(),
            discovery.singles.len()
        ));
        self.record(&entry);
    }

    pub fn sequence_event(&mut self, event: &SequenceEvent<'_>) {
        if !self.is_enabled() {
            return;
        }
        let entry = match *event {
            SequenceEvent::Started { plan } => {
                let mut entry = LogEntry::new(EventType::SequenceStart, Severity::Info)
                    .with_path(&plan.harden);
                entry.details = Some(format!("timestamp={}", plan.timestamp));
                entry
            }
            SequenceEvent::StepStarted { step, script } => {
                let mut entry =
                    LogEntry::new(EventType::ScriptStart, Severity::Info).with_path(script);
                entry.step = Some(step.to_string());
                entry
            }
            SequenceEvent::StepFinished {
                step,
                script,
                elapsed,
            } => {
                let mut entry = LogEntry::new(EventType::ScriptFinish, Severity::Info)
                    .with_path(script)
                    .with_ok(true);
                entry.step = Some(step.to_string());
                entry.duration_ms = Some(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
                entry
            }
            SequenceEvent::ReportArchived { phase, from, to } => {
                let mut entry = LogEntry::new(EventType::ReportArchived, Severity::Info)
                    .with_path(from)
                    .with_target(to);
                entry.details = Some(format!("phase={phase}"));
                entry
            }
            SequenceEvent::ReportMissing { phase, target } => {
                let mut entry =
                    LogEntry::new(EventType::ReportMissing, Severity::Warning).with_target(target);
                entry.details = Some(format!("phase={phase}"));
                entry
            }
        };
        self.record(&entry);
    }

    pub fn sequence_complete(&mut self, report: &SequenceReport) {
        let mut entry = LogEntry::new(EventType::SequenceComplete, Severity::Info)
            .with_path(&report.plan.harden)
            .with_ok(true);
        entry.details = Some(format!(
            "before_archived={} after_archived={}",
            report.before_archived, report.after_archived
        ));
        self.record(&entry);
    }

    pub fn sequence_failed(&mut self, harden: &Path, err: &HsnError) {
        let entry = LogEntry::new(EventType::SequenceFailed, Severity::Error)
            .with_path(harden)
            .with_error(err);
        self.record(&entry);
    }

    pub fn single_run(&mut self, script: &Path, outcome: Result<(), &HsnError>) {
        let entry = match outcome {
            Ok(()) => LogEntry::new(EventType::SingleRun, Severity::Info)
                .with_path(script)
                .with_ok(true),
            Err(err) => LogEntry::new(EventType::SingleRun, Severity::Error)
                .with_path(script)
                .with_error(err),
        };
        self.record(&entry);
    }

    pub fn flush(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush();
        }
    }
}
