use crate::Specie::mixture::{FractionBasis, Mixture, MixtureError};
use crate::Specie::molecule::Molecule;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Tolerance on atom conservation between the two sides of a reaction.
pub const BALANCE_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Error)]
pub enum ReactionError {
    #[error("reaction '{reaction}' has an empty {side} side")]
    EmptySide { reaction: String, side: String },
    #[error(
        "reaction '{reaction}' is not balanced for element '{element}': {lhs} atoms in reactants vs {rhs} in products"
    )]
    Unbalanced {
        reaction: String,
        element: String,
        lhs: f64,
        rhs: f64,
    },
    #[error("reaction '{reaction}': {source}")]
    Mixture {
        reaction: String,
        source: MixtureError,
    },
}

/// A single-step reaction between two mixtures, e.g. the complete oxidation
/// of one fuel by one oxidizer.
///
/// Immutable. Both sides are stored as normalized mixtures; `mole_ratio`
/// keeps the moles of products formed per mole of reactant mixture so that
/// atom conservation stays checkable after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    name: String,
    reactants: Mixture,
    products: Mixture,
    mole_ratio: f64,
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.name, self.reactants, self.products)
    }
}

impl Reaction {
    /// Build a reaction from stoichiometric coefficients on each side, e.g.
    /// CH4 + 2 O2 -> CO2 + 2 H2O. Verifies atom conservation per element
    /// within `BALANCE_TOLERANCE` before normalizing the sides to mixtures.
    pub fn from_coefficients(
        name: &str,
        reactants: &[(Molecule, f64)],
        products: &[(Molecule, f64)],
    ) -> Result<Self, ReactionError> {
        let empty_side = |side: &str| ReactionError::EmptySide {
            reaction: name.to_string(),
            side: side.to_string(),
        };
        if reactants.is_empty() {
            return Err(empty_side("reactant"));
        }
        if products.is_empty() {
            return Err(empty_side("product"));
        }

        let mut elements: HashSet<&str> = HashSet::new();
        for (molecule, _) in reactants.iter().chain(products) {
            elements.extend(molecule.composition().keys().map(|k| k.as_str()));
        }
        for element in elements {
            let lhs: f64 = reactants
                .iter()
                .map(|(m, c)| c * m.atoms_of(element) as f64)
                .sum();
            let rhs: f64 = products
                .iter()
                .map(|(m, c)| c * m.atoms_of(element) as f64)
                .sum();
            if (lhs - rhs).abs() > BALANCE_TOLERANCE {
                return Err(ReactionError::Unbalanced {
                    reaction: name.to_string(),
                    element: element.to_string(),
                    lhs,
                    rhs,
                });
            }
        }

        let side_mixture = |side: &[(Molecule, f64)]| -> Result<(Mixture, f64), ReactionError> {
            let total: f64 = side.iter().map(|(_, c)| c).sum();
            let species: Vec<Molecule> = side.iter().map(|(m, _)| m.clone()).collect();
            let fractions: Vec<f64> = side.iter().map(|(_, c)| c / total).collect();
            let mixture = Mixture::new(species, fractions, FractionBasis::Mole).map_err(
                |source| ReactionError::Mixture {
                    reaction: name.to_string(),
                    source,
                },
            )?;
            Ok((mixture, total))
        };
        let (reactants, n_reactants) = side_mixture(reactants)?;
        let (products, n_products) = side_mixture(products)?;

        Ok(Self {
            name: name.to_string(),
            reactants,
            products,
            mole_ratio: n_products / n_reactants,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reactants(&self) -> &Mixture {
        &self.reactants
    }

    pub fn products(&self) -> &Mixture {
        &self.products
    }

    /// Moles of products formed per mole of reactant mixture.
    pub fn mole_ratio(&self) -> f64 {
        self.mole_ratio
    }
}
