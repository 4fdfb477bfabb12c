use crate::Reactions::reaction::Reaction;
use crate::Reactions::reaction_model::{ModelState, ReactionModel, ReactionModelError};
use crate::Specie::mixture::{FractionBasis, Mixture, mixture_blend};
use crate::Specie::molecule::Molecule;
use crate::config::Config;
use crate::database::{ChemistryDatabase, STOICHIOMETRIC_REACTIONS};
use approx::relative_eq;
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;
use std::sync::Arc;

/// Relative tolerance for the lean/rich oxidizer comparison; protects the
/// branch selection from solver round-off.
const OXIDIZER_TOLERANCE: f64 = 1e-9;

/// Default oxidizer used when the config omits the "oxidizer" entry.
pub const DEFAULT_OXIDIZER: &str = "O2";

/// Reaction model of fuel combustion with infinitely fast chemistry: the
/// reactant mixture is converted in a single step into stoichiometric
/// products plus excess reactant and inerts.
///
/// All fuels are identified through the database fuel tags; for each fuel a
/// single-fuel oxidation reaction with the configured oxidizer must exist in
/// the `"StoichiometricReaction"` category. Multi-fuel mixtures are handled
/// by solving an (n+1)x(n+1) linear system for the blend of single-fuel
/// reactions reproducing the fuel-only composition.
#[derive(Debug, Clone)]
pub struct StoichiometricCombustion {
    db: Arc<ChemistryDatabase>,
    oxidizer: Molecule,
    reactants: Mixture,
    fuels: Vec<Molecule>,
    products: Option<Mixture>,
    state: ModelState,
}

impl StoichiometricCombustion {
    pub fn new(
        reactants: Mixture,
        oxidizer: Molecule,
        db: Arc<ChemistryDatabase>,
    ) -> Result<Self, ReactionModelError> {
        if reactants.is_empty() {
            return Err(ReactionModelError::EmptyReactants {
                model: "StoichiometricCombustion",
            });
        }
        let mut model = Self {
            db,
            oxidizer,
            reactants,
            fuels: Vec::new(),
            products: None,
            state: ModelState::Stale,
        };
        model.update_fuels();
        Ok(model)
    }

    /// Construct from a config object with entries:
    /// - "reactants" (mandatory): {species name: mole fraction}
    /// - "oxidizer" (optional): species name, defaults to O2
    pub fn from_config(
        config: &Config,
        db: &Arc<ChemistryDatabase>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let reactants = config.mixture("reactants", db)?;
        let oxidizer_name: String = config.lookup_or("oxidizer", DEFAULT_OXIDIZER.to_string())?;
        let oxidizer = db.molecule(&oxidizer_name)?.clone();
        Ok(Self::new(reactants, oxidizer, db.clone())?)
    }

    pub fn oxidizer(&self) -> &Molecule {
        &self.oxidizer
    }

    /// The fuel sub-mixture of the current reactants, renormalized. Empty
    /// when the reactants contain no tagged fuel.
    pub fn fuel(&self) -> Result<Mixture, ReactionModelError> {
        if self.fuels.is_empty() {
            return Ok(Mixture::empty());
        }
        let names: Vec<&str> = self.fuels.iter().map(|f| f.name()).collect();
        Ok(self.reactants.extract(&names)?)
    }

    fn update_fuels(&mut self) {
        self.fuels = self
            .reactants
            .iter()
            .filter(|e| self.db.is_fuel(e.specie.name()))
            .map(|e| e.specie.clone())
            .collect();
    }

    /// Locate the oxidation reaction for each fuel: the first reaction (in
    /// name order) in the stoichiometric category whose reactants contain
    /// both the fuel and the configured oxidizer. Missing reference data is
    /// fatal.
    fn oxidation_reactions(&self) -> Result<HashMap<String, Reaction>, ReactionModelError> {
        let all = self.db.reactions(STOICHIOMETRIC_REACTIONS)?;
        let mut found: HashMap<String, Reaction> = HashMap::new();
        for fuel in &self.fuels {
            let reaction = all
                .values()
                .find(|r| r.reactants().contains(fuel) && r.reactants().contains(&self.oxidizer))
                .ok_or_else(|| ReactionModelError::MissingReaction {
                    category: STOICHIOMETRIC_REACTIONS.to_string(),
                    fuel: fuel.name().to_string(),
                    oxidizer: self.oxidizer.name().to_string(),
                })?;
            found.insert(fuel.name().to_string(), reaction.clone());
        }
        Ok(found)
    }

    /// The balance itself, run on the first stale `products` read:
    /// 1. partition the reactants into reacting and inert species,
    /// 2. solve the stoichiometric blend of single-fuel reactions,
    /// 3. apply the lean/rich excess correction and recombine inerts.
    fn recompute(&mut self) -> Result<Mixture, ReactionModelError> {
        self.update_fuels();
        if self.fuels.is_empty() {
            debug!("no fuel in reactants, passing mixture through unreacted");
            return Ok(self.reactants.clone());
        }
        let ox_reactions = self.oxidation_reactions()?;

        // A specie reacts iff it appears in the reactants of some located
        // reaction whose entire reactant set is present in the mixture
        let mut reacting: Vec<&Molecule> = Vec::new();
        let mut x_react = 0.0;
        for entry in self.reactants.iter() {
            let active = ox_reactions.values().any(|reaction| {
                reaction.reactants().contains(&entry.specie)
                    && reaction
                        .reactants()
                        .iter()
                        .all(|r| self.reactants.contains(&r.specie))
            });
            if active {
                reacting.push(&entry.specie);
                x_react += entry.x;
            }
        }
        if reacting.is_empty() {
            debug!("no active oxidation reaction, passing mixture through unreacted");
            return Ok(self.reactants.clone());
        }
        let reacting_names: Vec<&str> = reacting.iter().map(|m| m.name()).collect();
        let reacting_mix = self.reactants.extract(&reacting_names)?;

        let mut x_inert = 0.0;
        let mut inert_names: Vec<&str> = Vec::new();
        for entry in self.reactants.iter() {
            if !reacting_mix.contains(&entry.specie) {
                inert_names.push(entry.specie.name());
                x_inert += entry.x;
            }
        }
        let inerts = if inert_names.is_empty() {
            None
        } else {
            Some(self.reactants.extract(&inert_names)?)
        };
        debug!(
            "reacting fraction {:.6}, inert fraction {:.6}",
            x_react, x_inert
        );

        // Solve for the blend of single-fuel reactions whose overall fuel
        // consumption reproduces the fuel-only mixture:
        //
        //   |f00  0   0  ... -f0| |c1| |0|
        //   | 0  f11  0  ... -f1|*|c2|=|0|
        //   |...                | |..| |.|
        //   | 1   1   1  ...  0 | |f | |1|
        //
        // with f_ii the fuel fraction in reaction i's reactants and f_i the
        // fuel fraction in the fuel-only mixture.
        let fuel_names: Vec<&str> = self.fuels.iter().map(|f| f.name()).collect();
        let fuel_mix = self.reactants.extract(&fuel_names)?;
        let n = self.fuels.len();
        let mut m = DMatrix::<f64>::zeros(n + 1, n + 1);
        let mut v = DVector::<f64>::zeros(n + 1);
        let singular = || ReactionModelError::SingularSystem {
            fuels: fuel_names.iter().map(|n| n.to_string()).collect(),
        };
        for (i, fuel) in self.fuels.iter().enumerate() {
            let reaction = &ox_reactions[fuel.name()];
            m[(i, i)] = reaction.reactants().x(fuel).ok_or_else(singular)?;
            m[(i, n)] = -fuel_mix.x(fuel).ok_or_else(singular)?;
            m[(n, i)] = 1.0;
        }
        v[n] = 1.0;
        let solution = m.lu().solve(&v).ok_or_else(singular)?;
        let weights: Vec<f64> = solution.iter().take(n).copied().collect();
        debug!("stoichiometric blend weights: {:?}", weights);

        let reactant_sides: Vec<&Mixture> = self
            .fuels
            .iter()
            .map(|f| ox_reactions[f.name()].reactants())
            .collect();
        let product_sides: Vec<&Mixture> = self
            .fuels
            .iter()
            .map(|f| ox_reactions[f.name()].products())
            .collect();
        let stoich_reacting = mixture_blend(&reactant_sides, &weights, FractionBasis::Mole)?;
        let mut products = mixture_blend(&product_sides, &weights, FractionBasis::Mole)?;

        // Lean/rich correction: compare the actual oxidizer fraction in the
        // reacting mixture with the stoichiometric one. Lean mixtures leave
        // pure excess oxidizer, rich mixtures leave the unburned fuel blend.
        let x_ox_actual = reacting_mix.x(&self.oxidizer).unwrap_or(0.0);
        let x_ox_stoich = stoich_reacting.x(&self.oxidizer).unwrap_or(0.0);
        if !relative_eq!(
            x_ox_actual,
            x_ox_stoich,
            max_relative = OXIDIZER_TOLERANCE,
            epsilon = OXIDIZER_TOLERANCE
        ) {
            let (x_excess, excess) = if x_ox_actual > x_ox_stoich {
                (x_ox_actual - x_ox_stoich, Mixture::single(self.oxidizer.clone()))
            } else {
                (x_ox_stoich - x_ox_actual, fuel_mix.clone())
            };
            debug!("excess fraction {:.6}: {}", x_excess, excess);
            products.dilute(&excess, x_excess, FractionBasis::Mole)?;
        }

        if let Some(inerts) = &inerts {
            products.dilute(inerts, x_inert, FractionBasis::Mole)?;
        }

        info!("combustion products: {}", products);
        Ok(products)
    }
}

impl ReactionModel for StoichiometricCombustion {
    fn reactants(&self) -> &Mixture {
        &self.reactants
    }

    fn update(&mut self, reactants: &Mixture) -> Result<bool, ReactionModelError> {
        if reactants == &self.reactants && self.state == ModelState::Fresh {
            return Ok(true);
        }
        if reactants.is_empty() {
            return Err(ReactionModelError::EmptyReactants {
                model: "StoichiometricCombustion",
            });
        }
        if reactants != &self.reactants {
            self.reactants = reactants.clone();
            self.update_fuels();
            self.state = ModelState::Stale;
        }
        Ok(false)
    }

    fn products(&mut self) -> Result<&Mixture, ReactionModelError> {
        if self.state == ModelState::Stale || self.products.is_none() {
            let products = self.recompute()?;
            self.state = ModelState::Fresh;
            self.products = Some(products);
        }
        Ok(self
            .products
            .as_ref()
            .expect("products are cached in the fresh state"))
    }

    fn state(&self) -> ModelState {
        self.state
    }

    fn model_name(&self) -> &'static str {
        "StoichiometricCombustion"
    }
}
