/// Table of chemical elements with their atomic masses, used to derive the
/// molar mass and atomic composition of every molecule in the crate.
pub mod periodic_table;
/// Immutable chemical species: name, elemental composition and derived molar mass.
///
///  # Examples
/// ```
/// use StoiComb::Specie::molecule::Molecule;
/// let ch4 = Molecule::from_formula("CH4").unwrap();
/// assert_eq!(ch4.atoms_of("H"), 4);
/// println!("molar mass: {} g/mol", ch4.molar_mass());
/// ```
pub mod molecule;
/// Mixtures of species given as ordered (molecule, mole fraction) pairs, with
/// dilution, extraction and blending operations on mole or mass basis.
///
///  # Examples
/// ```
/// use StoiComb::Specie::molecule::Molecule;
/// use StoiComb::Specie::mixture::{FractionBasis, Mixture};
/// let o2 = Molecule::from_formula("O2").unwrap();
/// let n2 = Molecule::from_formula("N2").unwrap();
/// let air = Mixture::new(vec![o2, n2], vec![0.21, 0.79], FractionBasis::Mole).unwrap();
/// println!("air molar mass: {}", air.molar_mass());
/// ```
pub mod mixture;
