//! Scheme registry: the list of schemes a run reports on.
//!
//! The registry file nests AMC → category → scheme name → scheme code and is
//! flattened once at startup into an ordered list of [`SchemeRegistryEntry`].
//! File order is preserved at every level.

use navroll_data::SchemeCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry file does not exist.
    #[error("scheme registry not found at {}", path.display())]
    NotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// The registry file could not be read.
    #[error("failed to read scheme registry {}: {source}", path.display())]
    Io {
        /// Path of the registry file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The registry is not valid JSON.
    #[error("scheme registry is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The registry is valid JSON but not of the expected shape.
    #[error("malformed scheme registry at {location}: {reason}")]
    Malformed {
        /// Position in the document, e.g. `"Example AMC" / "Large Cap"`
        location: String,
        /// What was wrong
        reason: String,
    },
}

/// One scheme to report on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeRegistryEntry {
    /// Asset management company.
    pub amc: String,
    /// Report category (one worksheet per category).
    pub category: String,
    /// Scheme name or plan label (e.g. "Direct").
    pub scheme_name: String,
    /// Code used to fetch the NAV history.
    pub scheme_code: SchemeCode,
}

impl SchemeRegistryEntry {
    /// Create a new registry entry.
    pub fn new(
        amc: impl Into<String>,
        category: impl Into<String>,
        scheme_name: impl Into<String>,
        scheme_code: impl Into<SchemeCode>,
    ) -> Self {
        Self {
            amc: amc.into(),
            category: category.into(),
            scheme_name: scheme_name.into(),
            scheme_code: scheme_code.into(),
        }
    }

    /// Human-readable label, e.g. `Example AMC - Large Cap - Direct`.
    pub fn label(&self) -> String {
        format!("{} - {} - {}", self.amc, self.category, self.scheme_name)
    }
}

/// A scheme listed with a `null` code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnconfiguredScheme {
    /// Asset management company.
    pub amc: String,
    /// Report category.
    pub category: String,
    /// Scheme name or plan label.
    pub scheme_name: String,
}

/// Flat, ordered scheme registry.
#[derive(Debug, Clone, Default)]
pub struct SchemeRegistry {
    entries: Vec<SchemeRegistryEntry>,
    unconfigured: Vec<UnconfiguredScheme>,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn expect_object<'a>(value: &'a Value, location: &str) -> Result<&'a Map<String, Value>, RegistryError> {
    value.as_object().ok_or_else(|| RegistryError::Malformed {
        location: location.to_string(),
        reason: format!("expected an object, found {}", json_kind(value)),
    })
}

fn parse_code(value: &Value, location: &str) -> Result<Option<SchemeCode>, RegistryError> {
    let malformed = |reason: String| RegistryError::Malformed {
        location: location.to_string(),
        reason,
    };

    let code = match value {
        Value::Null => return Ok(None),
        Value::String(s) => SchemeCode::new(s),
        Value::Number(n) if n.is_u64() => SchemeCode::new(n.to_string()),
        other => {
            return Err(malformed(format!(
                "expected a scheme code, found {}",
                json_kind(other)
            )));
        }
    };

    if code.is_empty() {
        return Err(malformed("empty scheme code".to_string()));
    }
    Ok(Some(code))
}

impl SchemeRegistry {
    /// Load the registry from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, unreadable, or malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RegistryError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let json = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json_str(&json)
    }

    /// Parse the registry from a JSON string.
    ///
    /// # Errors
    ///
    /// Fails if the string is not JSON or any level has the wrong shape.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let root: Value = serde_json::from_str(json)?;
        let mut registry = Self::default();

        for (amc, categories) in expect_object(&root, "<root>")? {
            let amc_location = format!("{amc:?}");
            for (category, schemes) in expect_object(categories, &amc_location)? {
                let category_location = format!("{amc_location} / {category:?}");
                for (scheme_name, code) in expect_object(schemes, &category_location)? {
                    let location = format!("{category_location} / {scheme_name:?}");
                    match parse_code(code, &location)? {
                        Some(scheme_code) => registry.entries.push(SchemeRegistryEntry {
                            amc: amc.clone(),
                            category: category.clone(),
                            scheme_name: scheme_name.clone(),
                            scheme_code,
                        }),
                        None => registry.unconfigured.push(UnconfiguredScheme {
                            amc: amc.clone(),
                            category: category.clone(),
                            scheme_name: scheme_name.clone(),
                        }),
                    }
                }
            }
        }

        Ok(registry)
    }

    /// Build a registry from entries directly.
    pub fn from_entries(entries: impl IntoIterator<Item = SchemeRegistryEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            unconfigured: Vec::new(),
        }
    }

    /// All entries in file order.
    pub fn entries(&self) -> &[SchemeRegistryEntry] {
        &self.entries
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, SchemeRegistryEntry> {
        self.entries.iter()
    }

    /// Schemes listed without a code.
    pub fn unconfigured(&self) -> &[UnconfiguredScheme] {
        &self.unconfigured
    }

    /// Number of schemes with a code.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no scheme has a code.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct AMCs in first-seen order.
    pub fn amcs(&self) -> Vec<&str> {
        distinct(self.entries.iter().map(|e| e.amc.as_str()))
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        distinct(self.entries.iter().map(|e| e.category.as_str()))
    }
}

fn distinct<'a>(items: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

impl<'a> IntoIterator for &'a SchemeRegistry {
    type Item = &'a SchemeRegistryEntry;
    type IntoIter = std::slice::Iter<'a, SchemeRegistryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
