//! Optional JSONL activity logging.

pub mod activity;
pub mod jsonl;
