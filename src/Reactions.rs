/// Balanced single-step reactions between mixtures, with atom-conservation
/// checking at construction.
pub mod reaction;
/// The reaction model family: trait, passthrough model and the process-wide
/// selection table for runtime construction by type name.
pub mod reaction_model;
/// Stoichiometric combustion balancer: infinitely-fast single-step
/// conversion of a multi-fuel reactant mixture into products, with lean/rich
/// excess handling and inert passthrough.
///
///  # Examples
/// ```
/// use StoiComb::Reactions::reaction_model::ReactionModel;
/// use StoiComb::Reactions::stoichiometric_combustion::StoichiometricCombustion;
/// use StoiComb::Specie::mixture::{FractionBasis, Mixture};
/// use StoiComb::database::ChemistryDatabase;
///
/// let db = ChemistryDatabase::default_database();
/// let reactants = Mixture::new(
///     vec![db.molecule("CH4").unwrap().clone(), db.molecule("O2").unwrap().clone()],
///     vec![1.0 / 3.0, 2.0 / 3.0],
///     FractionBasis::Mole,
/// )
/// .unwrap();
/// let oxidizer = db.molecule("O2").unwrap().clone();
/// let mut model = StoichiometricCombustion::new(reactants, oxidizer, db).unwrap();
/// println!("products: {}", model.products().unwrap());
/// ```
pub mod stoichiometric_combustion;
