//! Ordered key-value configuration container used to construct runtime-selected
//! models. Values are kept as JSON values and deserialized on lookup, so every
//! model family reads its own entries with its own types. Lookup failures
//! always report the offending key together with the keys actually present.

use crate::Specie::mixture::Mixture;
use crate::database::{ChemistryDatabase, DatabaseError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("mandatory entry '{key}' not found in config. Available entries: {available:?}")]
    NotFound { key: String, available: Vec<String> },
    #[error("entry '{key}' has the wrong type, expected {expected}: {source}")]
    WrongType {
        key: String,
        expected: &'static str,
        source: serde_json::Error,
    },
    #[error("entry '{key}' does not resolve to a valid mixture: {source}")]
    Mixture {
        key: String,
        source: DatabaseError,
    },
    #[error("config must be a JSON object, got: {got}")]
    NotAnObject { got: String },
    #[error("failed reading config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed parsing config JSON: {source}")]
    Json { source: serde_json::Error },
}

/// String-keyed configuration mapping preserving insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    order: Vec<String>,
    entries: HashMap<String, Value>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry; insertion order is kept for new keys.
    pub fn insert(&mut self, key: &str, value: Value) {
        if !self.entries.contains_key(key) {
            self.order.push(key.to_string());
        }
        self.entries.insert(key.to_string(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> &[String] {
        &self.order
    }

    /// Mandatory lookup: deserializes the entry into the requested type.
    pub fn lookup<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let value = self.entries.get(key).ok_or_else(|| ConfigError::NotFound {
            key: key.to_string(),
            available: self.order.clone(),
        })?;
        serde_json::from_value(value.clone()).map_err(|source| ConfigError::WrongType {
            key: key.to_string(),
            expected: std::any::type_name::<T>(),
            source,
        })
    }

    /// Optional lookup with an explicit documented default.
    pub fn lookup_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        if self.contains(key) {
            self.lookup(key)
        } else {
            Ok(default)
        }
    }

    /// Resolve a `{species name: mole fraction}` entry into a mixture against
    /// the chemistry database.
    pub fn mixture(&self, key: &str, db: &ChemistryDatabase) -> Result<Mixture, ConfigError> {
        let composition: BTreeMap<String, f64> = self.lookup(key)?;
        db.mixture_from_composition(&composition)
            .map_err(|source| ConfigError::Mixture {
                key: key.to_string(),
                source,
            })
    }

    /// Build from a JSON object string.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value: Value =
            serde_json::from_str(text).map_err(|source| ConfigError::Json { source })?;
        match value {
            Value::Object(map) => {
                let mut config = Self::new();
                for (key, value) in map {
                    config.insert(&key, value);
                }
                Ok(config)
            }
            other => Err(ConfigError::NotAnObject {
                got: other.to_string(),
            }),
        }
    }

    /// Load from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_insert_and_lookup() {
        let mut config = Config::new();
        config.insert("oxidizer", json!("O2"));
        config.insert("reactants", json!({"CH4": 0.25, "O2": 0.75}));
        let oxidizer: String = config.lookup("oxidizer").unwrap();
        assert_eq!(oxidizer, "O2");
        assert_eq!(config.keys(), &["oxidizer", "reactants"]);
    }

    #[test]
    fn test_missing_key_lists_available() {
        let mut config = Config::new();
        config.insert("oxidizer", json!("O2"));
        let err = config.lookup::<String>("reactants").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("reactants"));
        assert!(msg.contains("oxidizer"));
    }

    #[test]
    fn test_wrong_type() {
        let mut config = Config::new();
        config.insert("oxidizer", json!(42));
        assert!(matches!(
            config.lookup::<String>("oxidizer"),
            Err(ConfigError::WrongType { .. })
        ));
    }

    #[test]
    fn test_lookup_or_default() {
        let config = Config::new();
        let oxidizer: String = config.lookup_or("oxidizer", "O2".to_string()).unwrap();
        assert_eq!(oxidizer, "O2");
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"oxidizer": "O2", "reactants": {{"H2": 0.4, "O2": 0.6}}}}"#).unwrap();
        let config = Config::from_json_file(file.path()).unwrap();
        let oxidizer: String = config.lookup("oxidizer").unwrap();
        assert_eq!(oxidizer, "O2");
        let reactants: std::collections::BTreeMap<String, f64> =
            config.lookup("reactants").unwrap();
        assert_eq!(reactants.len(), 2);
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(Config::from_json_str("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_mixture_resolution() {
        let db = ChemistryDatabase::default_database();
        let mut config = Config::new();
        config.insert("reactants", json!({"CH4": 0.25, "O2": 0.75}));
        let mix = config.mixture("reactants", &db).unwrap();
        assert_eq!(mix.len(), 2);
        assert!((mix.x_by_name("CH4").unwrap() - 0.25).abs() < 1e-12);

        // missing key and unknown species both carry the key in the message
        assert!(matches!(
            config.mixture("oxidizer", &db),
            Err(ConfigError::NotFound { .. })
        ));
        config.insert("bad", json!({"Unobtainium": 1.0}));
        let err = config.mixture("bad", &db).unwrap_err();
        assert!(err.to_string().contains("bad"));
        assert!(matches!(err, ConfigError::Mixture { .. }));
    }
}
