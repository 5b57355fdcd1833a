#![forbid(unsafe_code)]

//! HardSecNet launcher: finds PowerShell audit and hardening scripts under a
//! category tree and runs them, either one at a time or as an
//! audit → harden → audit sequence that keeps before/after JSON reports.
//!
//! # Library usage
//!
//! Use the [`prelude`] for the most common types:
//!
//! ```rust,no_run
//! use hardsecnet::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use hardsecnet::core::config::Config;
//! use hardsecnet::scanner::discovery::discover;
//! ```

pub mod prelude;

#[cfg(feature = "cli")]
pub mod cli;
pub mod core;
pub mod logger;
pub mod runner;
pub mod scanner;
