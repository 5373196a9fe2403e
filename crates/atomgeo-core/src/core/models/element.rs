use phf::{Map, phf_map};
use std::collections::HashMap;
use std::fmt;

static ELEMENT_SYMBOLS: [&str; 86] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn",
];

// Single-bond covalent radii in Angstroms (Cordero et al., Dalton Trans. 2008).
// Low-spin values for Mn, Fe and Co; sp3 value for C.
#[rustfmt::skip]
static COVALENT_RADII: Map<&'static str, f64> = phf_map! {
    "H" => 0.31, "He" => 0.28,
    "Li" => 1.28, "Be" => 0.96, "B" => 0.84, "C" => 0.76, "N" => 0.71, "O" => 0.66, "F" => 0.57,
    "Ne" => 0.58,
    "Na" => 1.66, "Mg" => 1.41, "Al" => 1.21, "Si" => 1.11, "P" => 1.07, "S" => 1.05,
    "Cl" => 1.02, "Ar" => 1.06,
    "K" => 2.03, "Ca" => 1.76, "Sc" => 1.70, "Ti" => 1.60, "V" => 1.53, "Cr" => 1.39,
    "Mn" => 1.39, "Fe" => 1.32, "Co" => 1.26, "Ni" => 1.24, "Cu" => 1.32, "Zn" => 1.22,
    "Ga" => 1.22, "Ge" => 1.20, "As" => 1.19, "Se" => 1.20, "Br" => 1.20, "Kr" => 1.16,
    "Rb" => 2.20, "Sr" => 1.95, "Y" => 1.90, "Zr" => 1.75, "Nb" => 1.64, "Mo" => 1.54,
    "Tc" => 1.47, "Ru" => 1.46, "Rh" => 1.42, "Pd" => 1.39, "Ag" => 1.45, "Cd" => 1.44,
    "In" => 1.42, "Sn" => 1.39, "Sb" => 1.39, "Te" => 1.38, "I" => 1.39, "Xe" => 1.40,
    "Cs" => 2.44, "Ba" => 2.15,
    "La" => 2.07, "Ce" => 2.04, "Pr" => 2.03, "Nd" => 2.01, "Pm" => 1.99, "Sm" => 1.98,
    "Eu" => 1.98, "Gd" => 1.96, "Tb" => 1.94, "Dy" => 1.92, "Ho" => 1.92, "Er" => 1.89,
    "Tm" => 1.90, "Yb" => 1.87, "Lu" => 1.87,
    "Hf" => 1.75, "Ta" => 1.70, "W" => 1.62, "Re" => 1.51, "Os" => 1.44, "Ir" => 1.41,
    "Pt" => 1.36, "Au" => 1.36, "Hg" => 1.32, "Tl" => 1.45, "Pb" => 1.46, "Bi" => 1.48,
    "Po" => 1.40, "At" => 1.50, "Rn" => 1.50,
};

/// A chemical element, identified by its atomic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element(u8);

impl Element {
    /// Returns the element with atomic number `number`, if it is a known element (1 to 86).
    pub fn from_atomic_number(number: u8) -> Option<Self> {
        (1..=ELEMENT_SYMBOLS.len() as u8)
            .contains(&number)
            .then_some(Self(number))
    }

    /// Resolves an element symbol, ignoring case and surrounding whitespace.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let symbol = symbol.trim();
        ELEMENT_SYMBOLS
            .iter()
            .position(|known| known.eq_ignore_ascii_case(symbol))
            .map(|index| Self(index as u8 + 1))
    }

    #[inline]
    pub fn atomic_number(&self) -> u8 {
        self.0
    }

    pub fn symbol(&self) -> &'static str {
        ELEMENT_SYMBOLS[self.0 as usize - 1]
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A source of covalent radii, used to build bonding-distance references.
///
/// Implementations return `None` for elements they do not know. Radii are expected in
/// the same length unit as the coordinates they are compared against.
pub trait CovalentRadii {
    fn covalent_radius(&self, element: Element) -> Option<f64>;
}

/// The built-in covalent-radius table, covering hydrogen through radon.
#[derive(Debug, Clone, Copy, Default)]
pub struct CovalentRadiusTable;

impl CovalentRadii for CovalentRadiusTable {
    fn covalent_radius(&self, element: Element) -> Option<f64> {
        COVALENT_RADII.get(element.symbol()).copied()
    }
}

impl CovalentRadii for HashMap<Element, f64> {
    fn covalent_radius(&self, element: Element) -> Option<f64> {
        self.get(&element).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_symbol_is_case_insensitive() {
        assert_eq!(Element::from_symbol("C"), Element::from_atomic_number(6));
        assert_eq!(Element::from_symbol(" cl "), Element::from_atomic_number(17));
        assert_eq!(Element::from_symbol("FE").map(|e| e.atomic_number()), Some(26));
    }

    #[test]
    fn unknown_symbols_and_numbers_are_rejected() {
        assert_eq!(Element::from_symbol("Xx"), None);
        assert_eq!(Element::from_symbol(""), None);
        assert_eq!(Element::from_atomic_number(0), None);
        assert_eq!(Element::from_atomic_number(87), None);
    }

    #[test]
    fn symbol_and_display_round_trip() {
        let oxygen = Element::from_atomic_number(8).unwrap();
        assert_eq!(oxygen.symbol(), "O");
        assert_eq!(oxygen.to_string(), "O");
        assert_eq!(Element::from_atomic_number(86).unwrap().symbol(), "Rn");
    }

    #[test]
    fn table_covers_every_known_element() {
        let table = CovalentRadiusTable;
        for number in 1..=86u8 {
            let element = Element::from_atomic_number(number).unwrap();
            let radius = table.covalent_radius(element);
            assert!(
                radius.is_some_and(|r| r > 0.0),
                "missing radius for {element}"
            );
        }
    }

    #[test]
    fn table_returns_reference_values() {
        let table = CovalentRadiusTable;
        let hydrogen = Element::from_symbol("H").unwrap();
        let carbon = Element::from_symbol("C").unwrap();
        assert_eq!(table.covalent_radius(hydrogen), Some(0.31));
        assert_eq!(table.covalent_radius(carbon), Some(0.76));
    }

    #[test]
    fn hash_map_can_act_as_custom_radius_source() {
        let carbon = Element::from_symbol("C").unwrap();
        let nitrogen = Element::from_symbol("N").unwrap();
        let custom: HashMap<Element, f64> = HashMap::from([(carbon, 0.8)]);
        assert_eq!(custom.covalent_radius(carbon), Some(0.8));
        assert_eq!(custom.covalent_radius(nitrogen), None);
    }
}
