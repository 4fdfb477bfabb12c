// Element data for molar mass calculations
pub struct Element {
    pub symbol: &'static str,
    pub atomic_mass: f64,
}

// Elements and their atomic masses, g/mol
pub const ELEMENTS: &[Element] = &[
    Element {
        symbol: "H",
        atomic_mass: 1.008,
    },
    Element {
        symbol: "He",
        atomic_mass: 4.0026,
    },
    Element {
        symbol: "Li",
        atomic_mass: 6.94,
    },
    Element {
        symbol: "Be",
        atomic_mass: 9.0122,
    },
    Element {
        symbol: "B",
        atomic_mass: 10.81,
    },
    Element {
        symbol: "C",
        atomic_mass: 12.011,
    },
    Element {
        symbol: "N",
        atomic_mass: 14.007,
    },
    Element {
        symbol: "O",
        atomic_mass: 15.999,
    },
    Element {
        symbol: "F",
        atomic_mass: 18.998,
    },
    Element {
        symbol: "Ne",
        atomic_mass: 20.18,
    },
    Element {
        symbol: "Na",
        atomic_mass: 22.99,
    },
    Element {
        symbol: "Mg",
        atomic_mass: 24.305,
    },
    Element {
        symbol: "Al",
        atomic_mass: 26.98,
    },
    Element {
        symbol: "Si",
        atomic_mass: 28.085,
    },
    Element {
        symbol: "P",
        atomic_mass: 30.974,
    },
    Element {
        symbol: "S",
        atomic_mass: 32.065,
    },
    Element {
        symbol: "Cl",
        atomic_mass: 35.45,
    },
    Element {
        symbol: "Ar",
        atomic_mass: 39.948,
    },
    Element {
        symbol: "K",
        atomic_mass: 39.102,
    },
    Element {
        symbol: "Ca",
        atomic_mass: 40.08,
    },
    Element {
        symbol: "Fe",
        atomic_mass: 55.845,
    },
    Element {
        symbol: "Ni",
        atomic_mass: 58.69,
    },
    Element {
        symbol: "Cu",
        atomic_mass: 63.546,
    },
    Element {
        symbol: "Zn",
        atomic_mass: 65.38,
    },
    Element {
        symbol: "Br",
        atomic_mass: 79.904,
    },
    Element {
        symbol: "Kr",
        atomic_mass: 83.798,
    },
    Element {
        symbol: "Xe",
        atomic_mass: 131.293,
    },
    // Add more elements here...
];

/// Atomic mass of an element symbol, None if the symbol is unknown.
pub fn atomic_mass(symbol: &str) -> Option<f64> {
    ELEMENTS
        .iter()
        .find(|e| e.symbol == symbol)
        .map(|e| e.atomic_mass)
}

/// Check whether a symbol denotes a known element.
pub fn is_element(symbol: &str) -> bool {
    atomic_mass(symbol).is_some()
}
