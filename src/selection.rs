//! Runtime selection tables: name-keyed factory registries that construct a
//! member of a polymorphic model family from a configuration object, without
//! compile-time knowledge of every variant.
//!
//! Each family owns one table; variants register themselves under their type
//! name, naming their family explicitly. Lookup failures always report the
//! attempted name and the names actually registered.
//!
//!  # Examples
//! ```
//! use StoiComb::Reactions::reaction_model::with_reaction_model_table;
//! with_reaction_model_table(|table| println!("{}", table));
//! ```

use crate::config::Config;
use crate::database::ChemistryDatabase;
use prettytable::{Cell, Row, Table};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Factory signature shared by every selectable type: construct from a config
/// object plus the shared chemistry database.
pub type Factory<T> = fn(
    &Config,
    &Arc<ChemistryDatabase>,
) -> Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error(
        "no type '{type_name}' found in selection table for '{base}'. Available types are: {available:?}"
    )]
    NotFound {
        base: String,
        type_name: String,
        available: Vec<String>,
    },
    #[error("type '{type_name}' already present in selection table for '{base}'")]
    AlreadyRegistered { base: String, type_name: String },
    #[error("failed constructing instance of type '{type_name}' for '{base}': {source}")]
    Construction {
        base: String,
        type_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Name -> factory table for one model family. Registration order is kept so
/// listings are reproducible.
pub struct SelectionTable<T> {
    base: String,
    order: Vec<String>,
    factories: HashMap<String, Factory<T>>,
}

impl<T> fmt::Debug for SelectionTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SelectionTable")
            .field("base", &self.base)
            .field("types", &self.order)
            .finish()
    }
}

impl<T> fmt::Display for SelectionTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut table = Table::new();
        table.add_row(Row::new(vec![Cell::new(&format!(
            "Selection table for '{}'",
            self.base
        ))]));
        for name in &self.order {
            table.add_row(Row::new(vec![Cell::new(name)]));
        }
        write!(f, "{}", table)
    }
}

impl<T> SelectionTable<T> {
    /// Empty table owned by the named family.
    pub fn new(base: &str) -> Self {
        Self {
            base: base.to_string(),
            order: Vec::new(),
            factories: HashMap::new(),
        }
    }

    pub fn base_name(&self) -> &str {
        &self.base
    }

    /// Register a factory under a type name; duplicates are rejected.
    pub fn add(&mut self, type_name: &str, factory: Factory<T>) -> Result<(), SelectionError> {
        if self.factories.contains_key(type_name) {
            return Err(SelectionError::AlreadyRegistered {
                base: self.base.clone(),
                type_name: type_name.to_string(),
            });
        }
        log::info!(
            "registering type '{}' in selection table for '{}'",
            type_name,
            self.base
        );
        self.order.push(type_name.to_string());
        self.factories.insert(type_name.to_string(), factory);
        Ok(())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Registered type names, in registration order (defensive copy).
    pub fn list(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Construct an instance of a registered type from a config object.
    pub fn construct(
        &self,
        type_name: &str,
        config: &Config,
        db: &Arc<ChemistryDatabase>,
    ) -> Result<T, SelectionError> {
        let factory = self
            .factories
            .get(type_name)
            .ok_or_else(|| SelectionError::NotFound {
                base: self.base.clone(),
                type_name: type_name.to_string(),
                available: self.list(),
            })?;
        factory(config, db).map_err(|source| SelectionError::Construction {
            base: self.base.clone(),
            type_name: type_name.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Dummy {
        tag: String,
    }

    fn make_dummy(
        config: &Config,
        _db: &Arc<ChemistryDatabase>,
    ) -> Result<Dummy, Box<dyn std::error::Error + Send + Sync>> {
        let tag: String = config.lookup("tag")?;
        Ok(Dummy { tag })
    }

    #[test]
    fn test_register_and_construct() {
        let mut table: SelectionTable<Dummy> = SelectionTable::new("Dummy");
        table.add("Dummy", make_dummy).unwrap();
        assert!(table.contains("Dummy"));
        assert_eq!(table.list(), vec!["Dummy".to_string()]);

        let mut config = Config::new();
        config.insert("tag", serde_json::json!("hello"));
        let db = ChemistryDatabase::default_database();
        let instance = table.construct("Dummy", &config, &db).unwrap();
        assert_eq!(instance, Dummy { tag: "hello".to_string() });
    }

    #[test]
    fn test_unknown_type_lists_available() {
        let mut table: SelectionTable<Dummy> = SelectionTable::new("Dummy");
        table.add("Dummy", make_dummy).unwrap();
        let db = ChemistryDatabase::default_database();
        let err = table
            .construct("Missing", &Config::new(), &db)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Missing"));
        assert!(msg.contains("Dummy"));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut table: SelectionTable<Dummy> = SelectionTable::new("Dummy");
        table.add("Dummy", make_dummy).unwrap();
        assert!(matches!(
            table.add("Dummy", make_dummy),
            Err(SelectionError::AlreadyRegistered { .. })
        ));
    }

    #[test]
    fn test_construction_error_carries_type_name() {
        let mut table: SelectionTable<Dummy> = SelectionTable::new("Dummy");
        table.add("Dummy", make_dummy).unwrap();
        let db = ChemistryDatabase::default_database();
        // config without the mandatory "tag" entry
        let err = table.construct("Dummy", &Config::new(), &db).unwrap_err();
        assert!(matches!(err, SelectionError::Construction { .. }));
        assert!(err.to_string().contains("Dummy"));
    }
}
