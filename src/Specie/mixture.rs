use crate::Specie::molecule::Molecule;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Tolerance on the "fractions sum to one" invariant at construction; inside
/// it the composition is renormalized exactly, outside it is rejected.
pub const FRACTION_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error)]
pub enum MixtureError {
    #[error("species and fractions differ in length: {species} vs {fractions}")]
    LengthMismatch { species: usize, fractions: usize },
    #[error("mixture fractions must be non-negative, got {fraction} for '{specie}'")]
    NegativeFraction { specie: String, fraction: f64 },
    #[error("mixture fractions sum to {sum}, expected 1")]
    NotNormalized { sum: f64 },
    #[error("duplicate specie '{specie}' in mixture")]
    DuplicateSpecie { specie: String },
    #[error("dilution fraction {fraction} outside [0, 1]")]
    InvalidDilutionFraction { fraction: f64 },
    #[error("cannot extract {requested:?} from mixture: no matching species among {available:?}")]
    EmptyExtraction {
        requested: Vec<String>,
        available: Vec<String>,
    },
    #[error("cannot blend: {mixtures} mixtures vs {weights} weights")]
    BlendLengthMismatch { mixtures: usize, weights: usize },
    #[error("blend weights sum to {sum}, expected 1")]
    BlendNotNormalized { sum: f64 },
    #[error("operation on empty mixture")]
    EmptyMixture,
}

/// Mole- or mass-basis interpretation of fractions in mixture operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FractionBasis {
    Mole,
    Mass,
}

/// One mixture entry: a specie and its mole fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixtureEntry {
    pub specie: Molecule,
    /// Mole fraction
    pub x: f64,
}

/// A component that can be blended into a mixture: a single molecule or
/// another mixture.
#[derive(Debug, Clone, Copy)]
pub enum Component<'a> {
    Molecule(&'a Molecule),
    Mixture(&'a Mixture),
}

impl<'a> From<&'a Molecule> for Component<'a> {
    fn from(m: &'a Molecule) -> Self {
        Component::Molecule(m)
    }
}

impl<'a> From<&'a Mixture> for Component<'a> {
    fn from(m: &'a Mixture) -> Self {
        Component::Mixture(m)
    }
}

/// Ordered collection of (specie, mole fraction) entries summing to one.
///
/// Fractions are stored on mole basis; mass fractions are derived through the
/// species molar masses. The empty mixture is allowed as the neutral element
/// for dilution and as the "no species selected" result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mixture {
    entries: Vec<MixtureEntry>,
}

impl fmt::Display for Mixture {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:.6}", entry.specie.name(), entry.x)?;
        }
        write!(f, "]")
    }
}

impl Mixture {
    /// Construct from parallel species/fractions lists. Mass-basis fractions
    /// are converted to mole fractions through the molar masses. The
    /// fractions must sum to one within `FRACTION_SUM_TOLERANCE`.
    pub fn new(
        species: Vec<Molecule>,
        fractions: Vec<f64>,
        basis: FractionBasis,
    ) -> Result<Self, MixtureError> {
        if species.len() != fractions.len() {
            return Err(MixtureError::LengthMismatch {
                species: species.len(),
                fractions: fractions.len(),
            });
        }
        for (specie, fraction) in species.iter().zip(&fractions) {
            if *fraction < 0.0 {
                return Err(MixtureError::NegativeFraction {
                    specie: specie.name().to_string(),
                    fraction: *fraction,
                });
            }
        }
        for (i, specie) in species.iter().enumerate() {
            if species[..i].iter().any(|other| other == specie) {
                return Err(MixtureError::DuplicateSpecie {
                    specie: specie.name().to_string(),
                });
            }
        }
        let sum: f64 = fractions.iter().sum();
        if (sum - 1.0).abs() > FRACTION_SUM_TOLERANCE {
            return Err(MixtureError::NotNormalized { sum });
        }
        let moles: Vec<f64> = match basis {
            FractionBasis::Mole => fractions,
            FractionBasis::Mass => fractions
                .iter()
                .zip(&species)
                .map(|(y, s)| y / s.molar_mass())
                .collect(),
        };
        let entries = species
            .into_iter()
            .zip(moles)
            .map(|(specie, x)| MixtureEntry { specie, x })
            .collect();
        let mut mix = Self { entries };
        mix.renormalize();
        Ok(mix)
    }

    /// Single-specie mixture with mole fraction one.
    pub fn single(specie: Molecule) -> Self {
        Self {
            entries: vec![MixtureEntry { specie, x: 1.0 }],
        }
    }

    /// Mixture with no species.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MixtureEntry> {
        self.entries.iter()
    }

    pub fn contains(&self, specie: &Molecule) -> bool {
        self.contains_name(specie.name())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.specie.name() == name)
    }

    pub fn entry(&self, specie: &Molecule) -> Option<&MixtureEntry> {
        self.entries.iter().find(|e| &e.specie == specie)
    }

    /// Mole fraction of a specie, None if absent.
    pub fn x(&self, specie: &Molecule) -> Option<f64> {
        self.entry(specie).map(|e| e.x)
    }

    pub fn x_by_name(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.specie.name() == name)
            .map(|e| e.x)
    }

    /// Mass fraction of a specie, derived from mole fractions and molar
    /// masses. None if absent.
    pub fn y(&self, specie: &Molecule) -> Option<f64> {
        let molar_mass = self.molar_mass();
        self.entry(specie)
            .map(|e| e.x * e.specie.molar_mass() / molar_mass)
    }

    /// Molar mass of the blend, g/mol.
    pub fn molar_mass(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.x * e.specie.molar_mass())
            .sum()
    }

    /// Atoms of an element per mole of mixture.
    pub fn atoms_of(&self, element: &str) -> f64 {
        self.entries
            .iter()
            .map(|e| e.x * e.specie.atoms_of(element) as f64)
            .sum()
    }

    /// Blend in a component at the given fraction of the resulting mixture:
    /// the current composition is scaled by (1 - fraction) and the component
    /// by fraction, merging duplicate species. On mass basis the fraction is
    /// first converted to the equivalent mole fraction.
    ///
    /// Diluting the empty mixture adopts the component composition wholesale,
    /// ignoring the fraction: the empty mixture is the neutral element.
    pub fn dilute<'a>(
        &mut self,
        component: impl Into<Component<'a>>,
        fraction: f64,
        basis: FractionBasis,
    ) -> Result<(), MixtureError> {
        let component = component.into();
        if !(0.0..=1.0).contains(&fraction) {
            return Err(MixtureError::InvalidDilutionFraction { fraction });
        }
        let other = match component {
            Component::Molecule(m) => Mixture::single(m.clone()),
            Component::Mixture(m) => m.clone(),
        };
        if other.is_empty() || fraction == 0.0 {
            return Ok(());
        }
        if self.is_empty() {
            // Diluting nothing yields the component itself
            self.entries = other.entries;
            return Ok(());
        }
        let x = match basis {
            FractionBasis::Mole => fraction,
            FractionBasis::Mass => {
                let n_other = fraction / other.molar_mass();
                let n_self = (1.0 - fraction) / self.molar_mass();
                n_other / (n_other + n_self)
            }
        };
        for entry in &mut self.entries {
            entry.x *= 1.0 - x;
        }
        for other_entry in other.entries {
            match self
                .entries
                .iter_mut()
                .find(|e| e.specie == other_entry.specie)
            {
                Some(entry) => entry.x += other_entry.x * x,
                None => self.entries.push(MixtureEntry {
                    specie: other_entry.specie,
                    x: other_entry.x * x,
                }),
            }
        }
        self.renormalize();
        Ok(())
    }

    /// Renormalized sub-mixture restricted to the given species names.
    /// Fails when none of the requested species is present.
    pub fn extract<S: AsRef<str>>(&self, names: &[S]) -> Result<Mixture, MixtureError> {
        let entries: Vec<MixtureEntry> = self
            .entries
            .iter()
            .filter(|e| names.iter().any(|n| n.as_ref() == e.specie.name()))
            .cloned()
            .collect();
        if entries.is_empty() {
            return Err(MixtureError::EmptyExtraction {
                requested: names.iter().map(|n| n.as_ref().to_string()).collect(),
                available: self
                    .entries
                    .iter()
                    .map(|e| e.specie.name().to_string())
                    .collect(),
            });
        }
        let mut mix = Mixture { entries };
        mix.renormalize();
        Ok(mix)
    }

    fn renormalize(&mut self) {
        let sum: f64 = self.entries.iter().map(|e| e.x).sum();
        if sum > 0.0 {
            for entry in &mut self.entries {
                entry.x /= sum;
            }
        }
    }
}

/// Weighted blend of several mixtures. Weights must sum to one; on mass basis
/// they are converted to mole weights through the mixture molar masses.
pub fn mixture_blend(
    mixtures: &[&Mixture],
    weights: &[f64],
    basis: FractionBasis,
) -> Result<Mixture, MixtureError> {
    if mixtures.len() != weights.len() {
        return Err(MixtureError::BlendLengthMismatch {
            mixtures: mixtures.len(),
            weights: weights.len(),
        });
    }
    if mixtures.is_empty() {
        return Err(MixtureError::EmptyMixture);
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > FRACTION_SUM_TOLERANCE {
        return Err(MixtureError::BlendNotNormalized { sum });
    }
    let mole_weights: Vec<f64> = match basis {
        FractionBasis::Mole => weights.to_vec(),
        FractionBasis::Mass => {
            let moles: Vec<f64> = weights
                .iter()
                .zip(mixtures)
                .map(|(w, m)| w / m.molar_mass())
                .collect();
            let total: f64 = moles.iter().sum();
            moles.into_iter().map(|n| n / total).collect()
        }
    };
    let mut entries: Vec<MixtureEntry> = Vec::new();
    for (mixture, weight) in mixtures.iter().zip(&mole_weights) {
        for e in mixture.iter() {
            match entries.iter_mut().find(|known| known.specie == e.specie) {
                Some(known) => known.x += e.x * weight,
                None => entries.push(MixtureEntry {
                    specie: e.specie.clone(),
                    x: e.x * weight,
                }),
            }
        }
    }
    let mut mix = Mixture { entries };
    mix.renormalize();
    Ok(mix)
}
