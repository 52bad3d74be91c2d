//! # Registry
//!
//! Code tables behind every membership identifier.
//!
//! - Category table: membership category name to tier (`PM`/`AM`)
//! - Region table: region name to a stable two-digit code (`01`-`16`)
//!
//! Both tables ship with compiled-in defaults and can be swapped out at
//! startup from a JSON file, so adding a category or region is a config
//! change rather than a release.
//!
//! The two lookups deliberately disagree on what to do with an unknown
//! name: an unknown category is an error, an unknown region files under
//! [`FALLBACK_REGION_CODE`].
use std::{collections::HashMap, fmt, fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod identifier;

/// Code used when a region name is missing from the table.
///
/// Unknown regions file under this shared bucket rather than failing the
/// registration. Callers should log when they hit it.
pub const FALLBACK_REGION_CODE: &str = "00";

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Unknown membership category: {0}")]
    UnknownCategory(String),

    #[error("Failed to load tables: {0}")]
    BadTablesFile(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// The two membership tiers, encoded as `PM`/`AM` in identifiers.
///
/// Tier is fixed at registration and never changes for the life of a
/// membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipTier {
    Prime,
    Associate,
}

impl MembershipTier {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Prime => "PM",
            Self::Associate => "AM",
        }
    }
}

impl fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

const DEFAULT_CATEGORIES: &[(&str, MembershipTier)] = &[
    ("Institutional Membership", MembershipTier::Prime),
    ("Proprietor", MembershipTier::Prime),
    ("Teacher Council", MembershipTier::Associate),
    ("Parent Council", MembershipTier::Associate),
    ("Non-Teaching Staff Council", MembershipTier::Associate),
    ("Service Provider", MembershipTier::Associate),
];

const DEFAULT_REGIONS: &[(&str, &str)] = &[
    ("Greater Accra", "01"),
    ("Ashanti", "02"),
    ("Western", "03"),
    ("Eastern", "04"),
    ("Central", "05"),
    ("Volta", "06"),
    ("Northern", "07"),
    ("Upper East", "08"),
    ("Upper West", "09"),
    ("Bono", "10"),
    ("Bono East", "11"),
    ("Ahafo", "12"),
    ("Western North", "13"),
    ("Oti", "14"),
    ("North East", "15"),
    ("Savannah", "16"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tables {
    categories: HashMap<String, MembershipTier>,
    regions: HashMap<String, String>,
}

impl Tables {
    pub fn builtin() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|&(name, tier)| (name.to_string(), tier))
                .collect(),
            regions: DEFAULT_REGIONS
                .iter()
                .map(|&(name, code)| (name.to_string(), code.to_string()))
                .collect(),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, RegistryError> {
        let data = fs::read_to_string(path).map_err(|e| RegistryError::BadTablesFile(e.into()))?;

        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, RegistryError> {
        serde_json::from_str(data).map_err(|e| RegistryError::BadTablesFile(e.into()))
    }

    /// Tier for a category name, or `None` for names outside the table.
    pub fn category_tier(&self, name: &str) -> Option<MembershipTier> {
        self.categories.get(name).copied()
    }

    /// Two-digit code for a region name, or `None` for names outside the
    /// table. [`identifier::format_identifier`] maps the `None` case to
    /// [`FALLBACK_REGION_CODE`].
    pub fn region_code(&self, name: &str) -> Option<&str> {
        self.regions.get(name).map(String::as_str)
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}
