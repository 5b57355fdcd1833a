//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use hardsecnet::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{HsnError, Result};

// Scanner
pub use crate::scanner::discovery::{Discovery, LaunchEntry, Pairing, ScriptEntry, discover};
pub use crate::scanner::walker::{Category, list_categories};

// Runner
pub use crate::runner::sequence::{
    SequenceEvent, SequencePlan, SequenceReport, SequenceStep, Sequencer,
};
pub use crate::runner::{CommandRunner, ScriptRunner};

// Logger
pub use crate::logger::activity::ActivityLog;
