use crate::Specie::periodic_table::{atomic_mass, is_element};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecieError {
    #[error("unknown element '{element}' in molecule '{molecule}'")]
    UnknownElement { molecule: String, element: String },
    #[error("molecule '{molecule}' has an empty atomic composition")]
    EmptyComposition { molecule: String },
    #[error("failed parsing chemical formula '{formula}': {reason}")]
    FormulaParse { formula: String, reason: String },
}

/// Chemical species: name, atomic composition and derived molar mass.
///
/// Immutable value type. Two molecules compare equal when their names are
/// equal, which is how species identity is tracked across mixtures,
/// reactions and the chemistry database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Molecule {
    name: String,
    composition: HashMap<String, usize>,
    molar_mass: f64,
}

impl PartialEq for Molecule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Molecule {}

impl Hash for Molecule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Molecule {
    /// Construct from an explicit atomic composition, e.g. {"C": 1, "H": 4}.
    /// Molar mass is computed from the periodic table.
    pub fn new(name: &str, composition: HashMap<String, usize>) -> Result<Self, SpecieError> {
        if composition.is_empty() {
            return Err(SpecieError::EmptyComposition {
                molecule: name.to_string(),
            });
        }
        let mut molar_mass = 0.0;
        for (element, count) in &composition {
            let mass = atomic_mass(element).ok_or_else(|| SpecieError::UnknownElement {
                molecule: name.to_string(),
                element: element.clone(),
            })?;
            molar_mass += mass * *count as f64;
        }
        Ok(Self {
            name: name.to_string(),
            composition,
            molar_mass,
        })
    }

    /// Construct by parsing a chemical formula such as "CH4", "C3H8" or
    /// "Na(NO3)2". The formula becomes the molecule name.
    pub fn from_formula(formula: &str) -> Result<Self, SpecieError> {
        let composition = parse_formula(formula)?;
        Self::new(formula, composition)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn composition(&self) -> &HashMap<String, usize> {
        &self.composition
    }

    /// Molar mass in g/mol.
    pub fn molar_mass(&self) -> f64 {
        self.molar_mass
    }

    /// Number of atoms of a given element in one molecule.
    pub fn atoms_of(&self, element: &str) -> usize {
        self.composition.get(element).copied().unwrap_or(0)
    }
}

/// Parse a chemical formula into an element -> atom count map.
///
/// Supports element tokens with optional counts and parenthesized groups with
/// a trailing multiplier, expanded innermost-first: "Ca(NO3)2" -> {Ca:1, N:2, O:6}.
pub fn parse_formula(formula: &str) -> Result<HashMap<String, usize>, SpecieError> {
    let parse_error = |reason: &str| SpecieError::FormulaParse {
        formula: formula.to_string(),
        reason: reason.to_string(),
    };
    let stripped: String = formula.chars().filter(|c| !c.is_whitespace()).collect();
    if stripped.is_empty() {
        return Err(parse_error("empty formula"));
    }

    // Expand bracketed groups until none are left: (NO3)2 -> N1O3N1O3 is not
    // literal; instead the group content is repeated via count scaling below.
    let group_re = Regex::new(r"\(([^()]*)\)(\d*)").expect("valid group regex");
    let token_re = Regex::new(r"([A-Z][a-z]?)(\d*)").expect("valid token regex");

    let mut expanded = stripped;
    loop {
        let (range, inner, mult) = match group_re.captures(&expanded) {
            None => break,
            Some(caps) => {
                let whole = caps.get(0).map(|m| m.start()..m.end()).unwrap_or(0..0);
                let inner = caps[1].to_string();
                let mult: usize = match &caps[2] {
                    "" => 1,
                    digits => digits
                        .parse()
                        .map_err(|_| parse_error("invalid group multiplier"))?,
                };
                (whole, inner, mult)
            }
        };
        // Rewrite the group in-place with scaled per-element counts
        let mut replacement = String::new();
        let mut consumed = 0;
        for caps in token_re.captures_iter(&inner) {
            let m = caps.get(0).map(|m| m.as_str()).unwrap_or("");
            consumed += m.len();
            let element = &caps[1];
            let count: usize = match &caps[2] {
                "" => 1,
                digits => digits
                    .parse()
                    .map_err(|_| parse_error("invalid atom count"))?,
            };
            replacement.push_str(&format!("{}{}", element, count * mult));
        }
        if consumed != inner.len() {
            return Err(parse_error("unrecognized symbols inside brackets"));
        }
        expanded.replace_range(range, &replacement);
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut consumed = 0;
    for caps in token_re.captures_iter(&expanded) {
        let m = caps.get(0).map(|m| m.as_str()).unwrap_or("");
        consumed += m.len();
        let element = caps[1].to_string();
        if !is_element(&element) {
            return Err(SpecieError::UnknownElement {
                molecule: formula.to_string(),
                element,
            });
        }
        let count: usize = match &caps[2] {
            "" => 1,
            digits => digits
                .parse()
                .map_err(|_| parse_error("invalid atom count"))?,
        };
        *counts.entry(element).or_insert(0) += count;
    }
    if consumed != expanded.len() {
        return Err(parse_error("unrecognized symbols in formula"));
    }
    Ok(counts)
}
