//! Jurisdiction model
//!
//! Synthetic jurisdictional context attached to every node during labeling.
//! Codes follow ISO 3166-1 alpha-2 but nothing checks them against the real
//! registry; templates are free to invent codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How strictly a jurisdiction enforces AML rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegulatoryTier {
    /// e.g. US, EU
    Strict,
    /// e.g. UK, Singapore
    Moderate,
    /// e.g. some offshore centres
    Lenient,
    Unregulated,
}

impl RegulatoryTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegulatoryTier::Strict => "strict",
            RegulatoryTier::Moderate => "moderate",
            RegulatoryTier::Lenient => "lenient",
            RegulatoryTier::Unregulated => "unregulated",
        }
    }
}

impl fmt::Display for RegulatoryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Jurisdictional context for a synthetic actor
///
/// # Example
/// ```
/// use scenario_forge_core_rs::models::{Jurisdiction, RegulatoryTier};
///
/// let ky = Jurisdiction::new("KY", "Cayman Islands", RegulatoryTier::Lenient);
/// assert_eq!(ky.to_string(), "Cayman Islands (KY)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Jurisdiction {
    pub code: String,
    pub name: String,
    pub tier: RegulatoryTier,
}

impl Jurisdiction {
    pub fn new(code: &str, name: &str, tier: RegulatoryTier) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            tier,
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}
