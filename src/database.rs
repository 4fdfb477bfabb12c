//! Chemistry reference database: known molecules, fuel tags and balanced
//! single-step reactions grouped by category. Built once (via the builder or
//! `default_database`), then shared read-only behind an `Arc` by every model
//! that needs reference data.

use crate::Reactions::reaction::{Reaction, ReactionError};
use crate::Specie::mixture::{FractionBasis, Mixture, MixtureError};
use crate::Specie::molecule::{Molecule, SpecieError};
use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Reaction category read by the stoichiometric combustion balancer.
pub const STOICHIOMETRIC_REACTIONS: &str = "StoichiometricReaction";

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("molecule '{name}' not found in database. Available molecules: {available:?}")]
    MoleculeNotFound { name: String, available: Vec<String> },
    #[error("reaction category '{category}' not found in database. Available categories: {available:?}")]
    CategoryNotFound {
        category: String,
        available: Vec<String>,
    },
    #[error("cannot tag '{name}' as fuel: molecule not registered")]
    UnknownFuel { name: String },
    #[error("duplicate reaction '{name}' in category '{category}'")]
    DuplicateReaction { category: String, name: String },
    #[error(transparent)]
    Specie(#[from] SpecieError),
    #[error(transparent)]
    Reaction(#[from] ReactionError),
    #[error(transparent)]
    Mixture(#[from] MixtureError),
}

/// Immutable chemistry reference data.
#[derive(Debug, Clone)]
pub struct ChemistryDatabase {
    molecules: HashMap<String, Molecule>,
    fuels: HashSet<String>,
    reactions: HashMap<String, BTreeMap<String, Reaction>>,
}

impl ChemistryDatabase {
    pub fn builder() -> ChemistryDatabaseBuilder {
        ChemistryDatabaseBuilder::new()
    }

    /// Look up a molecule by name; the error lists the registered names.
    pub fn molecule(&self, name: &str) -> Result<&Molecule, DatabaseError> {
        self.molecules
            .get(name)
            .ok_or_else(|| DatabaseError::MoleculeNotFound {
                name: name.to_string(),
                available: self.molecule_names(),
            })
    }

    pub fn molecule_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.molecules.keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether a species name is tagged as a fuel.
    pub fn is_fuel(&self, name: &str) -> bool {
        self.fuels.contains(name)
    }

    pub fn fuels(&self) -> &HashSet<String> {
        &self.fuels
    }

    /// All reactions of a category, keyed by reaction name. Name-ordered, so
    /// iteration and first-match lookups are deterministic.
    pub fn reactions(&self, category: &str) -> Result<&BTreeMap<String, Reaction>, DatabaseError> {
        self.reactions
            .get(category)
            .ok_or_else(|| DatabaseError::CategoryNotFound {
                category: category.to_string(),
                available: {
                    let mut categories: Vec<String> = self.reactions.keys().cloned().collect();
                    categories.sort();
                    categories
                },
            })
    }

    /// Resolve a {species name: mole fraction} map into a mixture. The map is
    /// ordered (BTreeMap) so the resulting mixture composition is
    /// deterministic.
    pub fn mixture_from_composition(
        &self,
        composition: &BTreeMap<String, f64>,
    ) -> Result<Mixture, DatabaseError> {
        let mut species = Vec::with_capacity(composition.len());
        let mut fractions = Vec::with_capacity(composition.len());
        for (name, fraction) in composition {
            species.push(self.molecule(name)?.clone());
            fractions.push(*fraction);
        }
        Ok(Mixture::new(species, fractions, FractionBasis::Mole)?)
    }

    /// Database of common engine species and their complete-oxidation
    /// reactions, built once per process.
    pub fn default_database() -> Arc<ChemistryDatabase> {
        static DEFAULT: OnceLock<Arc<ChemistryDatabase>> = OnceLock::new();
        DEFAULT
            .get_or_init(|| {
                Arc::new(build_default().expect("default chemistry database seed data is valid"))
            })
            .clone()
    }
}

/// Incremental construction of a `ChemistryDatabase`. Fuels must refer to
/// registered molecules; reaction names must be unique within a category.
#[derive(Debug, Default)]
pub struct ChemistryDatabaseBuilder {
    molecules: HashMap<String, Molecule>,
    fuels: HashSet<String>,
    reactions: HashMap<String, BTreeMap<String, Reaction>>,
}

impl ChemistryDatabaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_molecule(&mut self, molecule: Molecule) -> &mut Self {
        self.molecules
            .insert(molecule.name().to_string(), molecule);
        self
    }

    /// Register a molecule from its formula and return it.
    pub fn add_formula(&mut self, formula: &str) -> Result<Molecule, DatabaseError> {
        let molecule = Molecule::from_formula(formula)?;
        self.add_molecule(molecule.clone());
        Ok(molecule)
    }

    pub fn tag_fuel(&mut self, name: &str) -> Result<&mut Self, DatabaseError> {
        if !self.molecules.contains_key(name) {
            return Err(DatabaseError::UnknownFuel {
                name: name.to_string(),
            });
        }
        self.fuels.insert(name.to_string());
        Ok(self)
    }

    pub fn add_reaction(
        &mut self,
        category: &str,
        reaction: Reaction,
    ) -> Result<&mut Self, DatabaseError> {
        let entry = self.reactions.entry(category.to_string()).or_default();
        if entry.contains_key(reaction.name()) {
            return Err(DatabaseError::DuplicateReaction {
                category: category.to_string(),
                name: reaction.name().to_string(),
            });
        }
        debug!("registered reaction '{}' in '{}'", reaction.name(), category);
        entry.insert(reaction.name().to_string(), reaction);
        Ok(self)
    }

    pub fn build(self) -> ChemistryDatabase {
        ChemistryDatabase {
            molecules: self.molecules,
            fuels: self.fuels,
            reactions: self.reactions,
        }
    }
}

fn build_default() -> Result<ChemistryDatabase, DatabaseError> {
    let mut builder = ChemistryDatabase::builder();

    let o2 = builder.add_formula("O2")?;
    builder.add_formula("N2")?;
    builder.add_formula("Ar")?;
    let co2 = builder.add_formula("CO2")?;
    let h2o = builder.add_formula("H2O")?;
    let co = builder.add_formula("CO")?;
    let h2 = builder.add_formula("H2")?;
    let ch4 = builder.add_formula("CH4")?;
    let c2h6 = builder.add_formula("C2H6")?;
    let c3h8 = builder.add_formula("C3H8")?;

    for fuel in ["H2", "CH4", "C2H6", "C3H8", "CO"] {
        builder.tag_fuel(fuel)?;
    }

    // Complete oxidation reactions, one per fuel
    let oxidations = [
        Reaction::from_coefficients(
            "CH4+O2",
            &[(ch4.clone(), 1.0), (o2.clone(), 2.0)],
            &[(co2.clone(), 1.0), (h2o.clone(), 2.0)],
        )?,
        Reaction::from_coefficients(
            "H2+O2",
            &[(h2.clone(), 1.0), (o2.clone(), 0.5)],
            &[(h2o.clone(), 1.0)],
        )?,
        Reaction::from_coefficients(
            "C2H6+O2",
            &[(c2h6.clone(), 1.0), (o2.clone(), 3.5)],
            &[(co2.clone(), 2.0), (h2o.clone(), 3.0)],
        )?,
        Reaction::from_coefficients(
            "C3H8+O2",
            &[(c3h8.clone(), 1.0), (o2.clone(), 5.0)],
            &[(co2.clone(), 3.0), (h2o.clone(), 4.0)],
        )?,
        Reaction::from_coefficients(
            "CO+O2",
            &[(co.clone(), 1.0), (o2.clone(), 0.5)],
            &[(co2.clone(), 1.0)],
        )?,
    ];
    for reaction in oxidations {
        builder.add_reaction(STOICHIOMETRIC_REACTIONS, reaction)?;
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_database_contents() {
        let db = ChemistryDatabase::default_database();
        assert!(db.molecule("CH4").is_ok());
        assert!(db.is_fuel("CH4"));
        assert!(db.is_fuel("H2"));
        assert!(!db.is_fuel("N2"));
        let reactions = db.reactions(STOICHIOMETRIC_REACTIONS).unwrap();
        assert!(reactions.contains_key("CH4+O2"));
        assert_eq!(reactions.len(), 5);
    }

    #[test]
    fn test_missing_molecule_lists_available() {
        let db = ChemistryDatabase::default_database();
        let err = db.molecule("C8H18").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("C8H18"));
        assert!(msg.contains("CH4"));
    }

    #[test]
    fn test_missing_category() {
        let db = ChemistryDatabase::default_database();
        assert!(matches!(
            db.reactions("EquilibriumReaction"),
            Err(DatabaseError::CategoryNotFound { .. })
        ));
    }

    #[test]
    fn test_builder_rejects_unknown_fuel_and_duplicates() {
        let mut builder = ChemistryDatabase::builder();
        assert!(builder.tag_fuel("CH4").is_err());
        let ch4 = builder.add_formula("CH4").unwrap();
        let o2 = builder.add_formula("O2").unwrap();
        let co2 = builder.add_formula("CO2").unwrap();
        let h2o = builder.add_formula("H2O").unwrap();
        let reaction = Reaction::from_coefficients(
            "CH4+O2",
            &[(ch4, 1.0), (o2, 2.0)],
            &[(co2, 1.0), (h2o, 2.0)],
        )
        .unwrap();
        builder
            .add_reaction(STOICHIOMETRIC_REACTIONS, reaction.clone())
            .unwrap();
        assert!(matches!(
            builder.add_reaction(STOICHIOMETRIC_REACTIONS, reaction),
            Err(DatabaseError::DuplicateReaction { .. })
        ));
    }

    #[test]
    fn test_mixture_from_composition() {
        let db = ChemistryDatabase::default_database();
        let composition =
            BTreeMap::from([("CH4".to_string(), 1.0 / 3.0), ("O2".to_string(), 2.0 / 3.0)]);
        let mix = db.mixture_from_composition(&composition).unwrap();
        assert_eq!(mix.len(), 2);
        assert!(db.mixture_from_composition(&BTreeMap::from([("Kr".to_string(), 1.0)])).is_err());
    }
}
