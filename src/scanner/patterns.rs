//! Script naming conventions and display-name derivation.

#![allow(missing_docs)]

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::paths::file_stem_lossy;

/// Exact file name the pairing check and the sequencer look for.
pub const AUDIT_SCRIPT_NAME: &str = "Audit.ps1";

const SCRIPT_EXTENSION: &str = ".ps1";
const HARDEN_NEEDLE: &str = "harden";

/// Role a script plays, decided from its file name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptRole {
    Audit,
    Harden,
}

/// Classify a file name. Matching is case-insensitive.
///
/// - `audit.ps1` in any casing is an audit script.
/// - Any `.ps1` whose name contains `harden` is a harden script.
#[must_use]
pub fn classify_script_name(file_name: &str) -> Option<ScriptRole> {
    let lower = file_name.to_lowercase();
    if lower == AUDIT_SCRIPT_NAME.to_lowercase() {
        Some(ScriptRole::Audit)
    } else if lower.contains(HARDEN_NEEDLE) && lower.ends_with(SCRIPT_EXTENSION) {
        Some(ScriptRole::Harden)
    } else {
        None
    }
}

/// Dotted integer groups such as `2.1` or `10.0.0`. A bare `10` never matches.
fn version_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b\d+(?:\.\d+)+\b").unwrap_or_else(|err| {
            unreachable!("version token pattern is a valid literal: {err}")
        })
    })
}

/// Human-readable name for menus.
///
/// Strips version tokens, turns `_` and `-` into spaces, collapses and trims
/// whitespace, then title-cases word by word.
#[must_use]
pub fn pretty_name(raw: &str) -> String {
    let stripped = version_token_regex().replace_all(raw, "");
    let spaced = stripped.replace(['_', '-'], " ");
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    title_case(&collapsed)
}

/// Display name for a script file, derived from its stem.
#[must_use]
pub fn script_display_name(path: &Path) -> String {
    pretty_name(&file_stem_lossy(path))
}

/// Display name for a paired directory, derived from its whole name.
///
/// No extension is split off, so `1.1 Password Policy` keeps everything
/// after the version token and reads `Password Policy`.
#[must_use]
pub fn dir_display_name(dir: &Path) -> String {
    let name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    pretty_name(&name)
}

/// Uppercase the first cased letter of every run of cased letters and
/// lowercase the rest. Digits and punctuation start a new run.
fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_cased = false;
    for ch in input.chars() {
        let cased = ch.is_uppercase() || ch.is_lowercase();
        if cased && previous_cased {
            out.extend(ch.to_lowercase());
        } else if cased {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        previous_cased = cased;
    }
    out
}
