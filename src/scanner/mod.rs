//! Script discovery: directory walking, name classification and pairing.

pub mod discovery;
pub mod patterns;
pub mod walker;
