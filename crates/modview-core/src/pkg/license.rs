//! License field normalization.
//!
//! package.json files declare licenses in several shapes:
//!
//! ```text
//! "license": "MIT"
//! "license": [{ "type": "MIT", "url": "..." }]
//! "licenses": ["MIT", "Apache-2.0"]
//! "licenses": { "type": "MIT" }
//! ```
//!
//! [`LicenseField`] captures those shapes once at parse time and
//! [`normalize_licenses`] flattens them into a plain list of strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder emitted for license values of an unknown shape.
pub const UNRECOGNIZED_LICENSE: &str = "unrecognized";

/// A license object carrying a `type` field (other fields are ignored).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedLicense {
    #[serde(rename = "type")]
    pub kind: String,
}

/// One element of a license array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LicenseEntry {
    Name(String),
    Typed(TypedLicense),
    Other(Value),
}

/// The raw `license` / `licenses` value of a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LicenseField {
    /// `"MIT"`
    Name(String),
    /// `["MIT", { "type": "GPL-3.0" }]`
    List(Vec<LicenseEntry>),
    /// `{ "type": "MIT" }`
    Typed(TypedLicense),
    /// Anything else (numbers, objects without a string `type`, ...).
    Other(Value),
}

/// Flatten a license field into an ordered list of license names.
///
/// Absent fields give an empty list. Unknown shapes, and array elements of an
/// unknown shape, are reported as [`UNRECOGNIZED_LICENSE`].
#[must_use]
pub fn normalize_licenses(field: Option<&LicenseField>) -> Vec<String> {
    match field {
        None => Vec::new(),
        Some(LicenseField::Name(name)) => vec![name.clone()],
        Some(LicenseField::Typed(typed)) => vec![typed.kind.clone()],
        Some(LicenseField::List(entries)) => entries
            .iter()
            .map(|entry| match entry {
                LicenseEntry::Name(name) => name.clone(),
                LicenseEntry::Typed(typed) => typed.kind.clone(),
                LicenseEntry::Other(_) => UNRECOGNIZED_LICENSE.to_string(),
            })
            .collect(),
        Some(LicenseField::Other(_)) => vec![UNRECOGNIZED_LICENSE.to_string()],
    }
}
