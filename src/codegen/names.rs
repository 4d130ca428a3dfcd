//! Name Synthesis
//!
//! Pure, deterministic string transforms that turn schema-declared names into
//! identifier-safe names:
//! - `to_camel_case`: title-case each `_`-separated word and join them. Used for
//!   synthesized child type names and enumerator identifiers.
//! - `to_snake_case`: insert `_` at case transitions and lowercase. Used by the
//!   renderer for file stems and symbol names.
//!
//! Both are total. `to_snake_case` is idempotent on its own output.

use std::sync::OnceLock;

use regex::Regex;

/// Word separator for both transforms
pub const WORD_SEPARATOR: char = '_';

/// Prefix for generated enumerator identifiers
pub const ENUMERATOR_PREFIX: &str = "k";

// =============================================================================
// Title-case join
// =============================================================================

/// Title-case a single word.
///
/// A cased letter is uppercased when it does not follow another cased letter,
/// otherwise lowercased. Digits and punctuation pass through and start a new
/// word, so `x2y` becomes `X2Y` and `fooBar` becomes `Foobar`.
fn title_case(word: &str) -> String {
    let mut result = String::with_capacity(word.len());
    let mut prev_cased = false;

    for c in word.chars() {
        let cased = c.is_lowercase() || c.is_uppercase();
        if cased && prev_cased {
            result.extend(c.to_lowercase());
        } else if cased {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        prev_cased = cased;
    }

    result
}

/// Split on `_`, title-case every part and concatenate.
///
/// `first_name` -> `FirstName`, `label` -> `Label`.
pub fn to_camel_case(s: &str) -> String {
    s.split(WORD_SEPARATOR).map(title_case).collect()
}

/// Identifier of a generated enumerator: `k` + title-case join of the value
pub fn enumerator_identifier(value: &str) -> String {
    format!("{}{}", ENUMERATOR_PREFIX, to_camel_case(value))
}

/// Name of a synthesized child type: parent name followed by the camel-cased role
pub fn child_type_name(parent: &str, role: &str) -> String {
    format!("{}{}", parent, to_camel_case(role))
}

// =============================================================================
// Separator insertion
// =============================================================================

fn upper_run_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("static regex"))
}

fn lower_upper_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-z0-9])([A-Z])").expect("static regex"))
}

/// Insert `_` before case transitions and lowercase the result.
///
/// `PathItem` -> `path_item`, `HTTPServer` -> `http_server`, `point3D` -> `point3_d`.
pub fn to_snake_case(name: &str) -> String {
    let name = upper_run_boundary().replace_all(name, "${1}_${2}");
    let name = lower_upper_boundary().replace_all(&name, "${1}_${2}");
    name.to_lowercase()
}
