use crate::Reactions::stoichiometric_combustion::StoichiometricCombustion;
use crate::Specie::mixture::{Mixture, MixtureError};
use crate::config::Config;
use crate::database::{ChemistryDatabase, DatabaseError};
use crate::selection::{Factory, SelectionError, SelectionTable};
use enum_dispatch::enum_dispatch;
use std::sync::{Arc, Mutex, OnceLock};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReactionModelError {
    #[error("reaction model '{model}' cannot work on an empty reactant mixture")]
    EmptyReactants { model: &'static str },
    #[error(
        "oxidation reaction not found in database '{category}' for the couple (fuel, oxidizer) = ({fuel}, {oxidizer})"
    )]
    MissingReaction {
        category: String,
        fuel: String,
        oxidizer: String,
    },
    #[error("singular stoichiometric system for fuel set {fuels:?}: degenerate fuel composition")]
    SingularSystem { fuels: Vec<String> },
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Mixture(#[from] MixtureError),
}

/// Freshness of the cached products with respect to the current reactants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// Reactants changed since the products were last computed.
    Stale,
    /// Cached products match the current reactants.
    Fresh,
}

/// A reaction model owns a reactant mixture and derives the product mixture
/// from it. Recomputation is lazy: `update` only marks the model stale when
/// the reactants actually changed (by value), and the first `products` read
/// in the stale state triggers the model-specific computation.
#[enum_dispatch]
pub trait ReactionModel {
    /// The current reactant mixture.
    fn reactants(&self) -> &Mixture;

    /// Replace the reactant mixture. Returns true when the new reactants are
    /// value-equal to the current ones and the model stays fresh, so callers
    /// can skip redundant work.
    fn update(&mut self, reactants: &Mixture) -> Result<bool, ReactionModelError>;

    /// The product mixture, recomputed on first access after the reactants
    /// changed and memoized afterwards.
    fn products(&mut self) -> Result<&Mixture, ReactionModelError>;

    fn state(&self) -> ModelState;

    fn model_name(&self) -> &'static str;
}

/// The selectable reaction model family.
#[enum_dispatch(ReactionModel)]
#[derive(Debug, Clone)]
pub enum ReactionModelEnum {
    StoichiometricCombustion(StoichiometricCombustion),
    NoReaction(NoReaction),
}

/// Passthrough reaction model: the products are always the reactants. Used
/// when no chemistry should be applied, e.g. motored-engine processing.
#[derive(Debug, Clone)]
pub struct NoReaction {
    reactants: Mixture,
}

impl NoReaction {
    pub fn new(reactants: Mixture) -> Result<Self, ReactionModelError> {
        if reactants.is_empty() {
            return Err(ReactionModelError::EmptyReactants {
                model: "NoReaction",
            });
        }
        Ok(Self { reactants })
    }

    pub fn from_config(
        config: &Config,
        db: &Arc<ChemistryDatabase>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let reactants = config.mixture("reactants", db)?;
        Ok(Self::new(reactants)?)
    }
}

impl ReactionModel for NoReaction {
    fn reactants(&self) -> &Mixture {
        &self.reactants
    }

    fn update(&mut self, reactants: &Mixture) -> Result<bool, ReactionModelError> {
        if reactants == &self.reactants {
            return Ok(true);
        }
        if reactants.is_empty() {
            return Err(ReactionModelError::EmptyReactants {
                model: "NoReaction",
            });
        }
        self.reactants = reactants.clone();
        Ok(false)
    }

    fn products(&mut self) -> Result<&Mixture, ReactionModelError> {
        Ok(&self.reactants)
    }

    fn state(&self) -> ModelState {
        // Products are the reactants themselves, never out of date
        ModelState::Fresh
    }

    fn model_name(&self) -> &'static str {
        "NoReaction"
    }
}

fn reaction_model_table() -> &'static Mutex<SelectionTable<ReactionModelEnum>> {
    static TABLE: OnceLock<Mutex<SelectionTable<ReactionModelEnum>>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = SelectionTable::new("ReactionModel");
        table
            .add("StoichiometricCombustion", |config, db| {
                Ok(ReactionModelEnum::from(
                    StoichiometricCombustion::from_config(config, db)?,
                ))
            })
            .expect("empty table accepts the built-in variants");
        table
            .add("NoReaction", |config, db| {
                Ok(ReactionModelEnum::from(NoReaction::from_config(
                    config, db,
                )?))
            })
            .expect("empty table accepts the built-in variants");
        Mutex::new(table)
    })
}

/// Run a closure against the process-wide reaction model selection table.
pub fn with_reaction_model_table<R>(f: impl FnOnce(&SelectionTable<ReactionModelEnum>) -> R) -> R {
    let table = reaction_model_table()
        .lock()
        .expect("reaction model table lock poisoned");
    f(&table)
}

/// Register an additional reaction model variant; intended for process
/// initialization, before models are constructed.
pub fn register_reaction_model(
    type_name: &str,
    factory: Factory<ReactionModelEnum>,
) -> Result<(), SelectionError> {
    let mut table = reaction_model_table()
        .lock()
        .expect("reaction model table lock poisoned");
    table.add(type_name, factory)
}

/// Construct a reaction model by type name from the process-wide table.
pub fn select_reaction_model(
    type_name: &str,
    config: &Config,
    db: &Arc<ChemistryDatabase>,
) -> Result<ReactionModelEnum, SelectionError> {
    with_reaction_model_table(|table| table.construct(type_name, config, db))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Specie::mixture::FractionBasis;
    use crate::Specie::molecule::Molecule;
    use serde_json::json;

    #[test]
    fn test_no_reaction_passthrough() {
        let db = ChemistryDatabase::default_database();
        let reactants = Mixture::new(
            vec![
                db.molecule("O2").unwrap().clone(),
                db.molecule("N2").unwrap().clone(),
            ],
            vec![0.21, 0.79],
            FractionBasis::Mole,
        )
        .unwrap();
        let mut model = NoReaction::new(reactants.clone()).unwrap();
        assert_eq!(model.products().unwrap(), &reactants);
        assert_eq!(model.state(), ModelState::Fresh);

        // identical update is a no-op
        assert!(model.update(&reactants).unwrap());
        let other = Mixture::single(Molecule::from_formula("CO2").unwrap());
        assert!(!model.update(&other).unwrap());
        assert_eq!(model.products().unwrap(), &other);
    }

    #[test]
    fn test_no_reaction_rejects_empty() {
        assert!(NoReaction::new(Mixture::empty()).is_err());
    }

    #[test]
    fn test_global_table_lists_builtins() {
        let names = with_reaction_model_table(|table| table.list());
        assert!(names.contains(&"StoichiometricCombustion".to_string()));
        assert!(names.contains(&"NoReaction".to_string()));
    }

    #[test]
    fn test_select_no_reaction_from_config() {
        let db = ChemistryDatabase::default_database();
        let mut config = Config::new();
        config.insert("reactants", json!({"N2": 0.79, "O2": 0.21}));
        let mut model = select_reaction_model("NoReaction", &config, &db).unwrap();
        assert_eq!(model.model_name(), "NoReaction");
        assert_eq!(model.products().unwrap().len(), 2);
    }

    #[test]
    fn test_select_unknown_model_fails_with_listing() {
        let db = ChemistryDatabase::default_database();
        let err = select_reaction_model("EquilibriumCombustion", &Config::new(), &db).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("EquilibriumCombustion"));
        assert!(msg.contains("StoichiometricCombustion"));
    }
}
