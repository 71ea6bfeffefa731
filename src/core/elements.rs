//! Chemical elements and the per-element numeric tables the rest of the crate draws on:
//! covalent radii (used for bonding inference and bond-order refinement), UFF electronegativities
//! and effective charges (used in bond/angle parameter formulae), and atomic masses (used in the
//! `Masses` data-file section).
//!
//! The table only covers elements this force-field corpus actually parameterizes; anything absent
//! surfaces as [`crate::core::error::GraphError::UnknownElement`] rather than a fabricated guess.

use std::fmt;
use std::str::FromStr;

/// A chemical element, identified by atomic number.
///
/// Covers the full periodic table through lawrencium so that arbitrary crystallographic input can
/// at least be labeled; only the subset with entries in [`Element::covalent_radius`] and friends
/// can actually be typed by a force field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Element {
    H = 1,
    He,
    Li,
    Be,
    B,
    C,
    N,
    O,
    F,
    Ne,
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    Ar,
    K,
    Ca,
    Sc,
    Ti,
    V,
    Cr,
    Mn,
    Fe,
    Co,
    Ni,
    Cu,
    Zn,
    Ga,
    Ge,
    As,
    Se,
    Br,
    Kr,
    Rb,
    Sr,
    Y,
    Zr,
    Nb,
    Mo,
    Tc,
    Ru,
    Rh,
    Pd,
    Ag,
    Cd,
    In,
    Sn,
    Sb,
    Te,
    I,
    Xe,
    Cs,
    Ba,
    La,
    Ce,
    Pr,
    Nd,
    Pm,
    Sm,
    Eu,
    Gd,
    Tb,
    Dy,
    Ho,
    Er,
    Tm,
    Yb,
    Lu,
    Hf,
    Ta,
    W,
    Re,
    Os,
    Ir,
    Pt,
    Au,
    Hg,
    Tl,
    Pb,
    Bi,
    Po,
    At,
    Rn,
    Fr,
    Ra,
    Ac,
    Th,
    Pa,
    U,
    Np,
    Pu,
    Am,
    Cm,
    Bk,
    Cf,
    Es,
    Fm,
    Md,
    No,
    Lr,
}

/// The organic set used by hydrogen-bonding exclusion rules (`H–H` and `H–non-organic` vetoes in
/// [`crate::graph::bonding::compute_bonding`]).
pub const ORGANIC_ELEMENTS: &[Element] = &[
    Element::H,
    Element::C,
    Element::N,
    Element::O,
    Element::F,
    Element::Cl,
    Element::S,
    Element::B,
];

/// Numeric constants a typing engine needs for one element: covalent radius, UFF electronegativity
/// (`chi`), UFF effective nuclear charge (`z_star`), and atomic mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementData {
    pub covalent_radius: f64,
    pub covalent_radius_sp2: f64,
    pub covalent_radius_sp: f64,
    pub chi: f64,
    pub z_star: f64,
    pub mass: f64,
}

impl Element {
    pub fn atomic_number(self) -> u8 {
        self as u8
    }

    /// Numeric tables transcribed from `original_source/ForceFields.py`'s UFF parameter block.
    /// Elements absent here are legitimately "unknown" to this implementation rather than a
    /// fabricated default; typing code must surface [`crate::core::error::GraphError::UnknownElement`].
    pub fn data(self) -> Option<ElementData> {
        use Element::*;
        let data = match self {
            H => ElementData { covalent_radius: 0.354, covalent_radius_sp2: 0.354, covalent_radius_sp: 0.354, chi: 4.528, z_star: 0.712, mass: 1.008 },
            B => ElementData { covalent_radius: 0.838, covalent_radius_sp2: 0.828, covalent_radius_sp: 0.818, chi: 4.829, z_star: 1.604, mass: 10.811 },
            C => ElementData { covalent_radius: 0.757, covalent_radius_sp2: 0.732, covalent_radius_sp: 0.706, chi: 5.343, z_star: 1.912, mass: 12.011 },
            N => ElementData { covalent_radius: 0.700, covalent_radius_sp2: 0.685, covalent_radius_sp: 0.656, chi: 6.899, z_star: 2.544, mass: 14.007 },
            O => ElementData { covalent_radius: 0.658, covalent_radius_sp2: 0.634, covalent_radius_sp: 0.639, chi: 8.741, z_star: 2.300, mass: 15.999 },
            F => ElementData { covalent_radius: 0.668, covalent_radius_sp2: 0.668, covalent_radius_sp: 0.668, chi: 10.874, z_star: 1.735, mass: 18.998 },
            Ne => ElementData { covalent_radius: 0.920, covalent_radius_sp2: 0.920, covalent_radius_sp: 0.920, chi: 11.04, z_star: 0.194, mass: 20.180 },
            Na => ElementData { covalent_radius: 1.539, covalent_radius_sp2: 1.539, covalent_radius_sp: 1.539, chi: 2.843, z_star: 1.081, mass: 22.990 },
            Mg => ElementData { covalent_radius: 1.421, covalent_radius_sp2: 1.421, covalent_radius_sp: 1.421, chi: 3.951, z_star: 1.787, mass: 24.305 },
            Al => ElementData { covalent_radius: 1.244, covalent_radius_sp2: 1.244, covalent_radius_sp: 1.244, chi: 3.041, z_star: 1.792, mass: 26.982 },
            Si => ElementData { covalent_radius: 1.117, covalent_radius_sp2: 1.117, covalent_radius_sp: 1.117, chi: 4.168, z_star: 2.323, mass: 28.086 },
            P => ElementData { covalent_radius: 1.101, covalent_radius_sp2: 1.101, covalent_radius_sp: 1.101, chi: 5.463, z_star: 2.863, mass: 30.974 },
            S => ElementData { covalent_radius: 1.064, covalent_radius_sp2: 1.064, covalent_radius_sp: 1.064, chi: 6.928, z_star: 2.703, mass: 32.065 },
            Cl => ElementData { covalent_radius: 1.044, covalent_radius_sp2: 1.044, covalent_radius_sp: 1.044, chi: 8.564, z_star: 2.348, mass: 35.453 },
            Ar => ElementData { covalent_radius: 1.032, covalent_radius_sp2: 1.032, covalent_radius_sp: 1.032, chi: 9.465, z_star: 0.300, mass: 39.948 },
            K => ElementData { covalent_radius: 1.953, covalent_radius_sp2: 1.953, covalent_radius_sp: 1.953, chi: 2.421, z_star: 1.165, mass: 39.098 },
            Ca => ElementData { covalent_radius: 1.761, covalent_radius_sp2: 1.761, covalent_radius_sp: 1.761, chi: 3.231, z_star: 2.141, mass: 40.078 },
            Fe => ElementData { covalent_radius: 1.242, covalent_radius_sp2: 1.242, covalent_radius_sp: 1.242, chi: 4.04, z_star: 2.43, mass: 55.845 },
            Cu => ElementData { covalent_radius: 1.302, covalent_radius_sp2: 1.302, covalent_radius_sp: 1.302, chi: 4.20, z_star: 2.00, mass: 63.546 },
            Zn => ElementData { covalent_radius: 1.193, covalent_radius_sp2: 1.193, covalent_radius_sp: 1.193, chi: 5.106, z_star: 1.308, mass: 65.38 },
            Br => ElementData { covalent_radius: 1.192, covalent_radius_sp2: 1.192, covalent_radius_sp: 1.192, chi: 7.790, z_star: 2.519, mass: 79.904 },
            I => ElementData { covalent_radius: 1.382, covalent_radius_sp2: 1.382, covalent_radius_sp: 1.382, chi: 6.822, z_star: 2.65, mass: 126.904 },
            _ => return None,
        };
        Some(data)
    }

    pub fn covalent_radius(self) -> Option<f64> {
        self.data().map(|d| d.covalent_radius)
    }

    pub fn mass(self) -> Option<f64> {
        self.data().map(|d| d.mass)
    }

    pub fn is_organic(self) -> bool {
        ORGANIC_ELEMENTS.contains(&self)
    }

    /// Group-VIA chalcogens with the special atomic numbers UFF's dihedral branch singles out.
    pub fn is_group_via_special(self) -> bool {
        matches!(self.atomic_number(), 8 | 16 | 34 | 52 | 84)
    }

    const SYMBOLS: &'static [(&'static str, Element)] = &[
        ("H", Element::H), ("He", Element::He), ("Li", Element::Li), ("Be", Element::Be),
        ("B", Element::B), ("C", Element::C), ("N", Element::N), ("O", Element::O),
        ("F", Element::F), ("Ne", Element::Ne), ("Na", Element::Na), ("Mg", Element::Mg),
        ("Al", Element::Al), ("Si", Element::Si), ("P", Element::P), ("S", Element::S),
        ("Cl", Element::Cl), ("Ar", Element::Ar), ("K", Element::K), ("Ca", Element::Ca),
        ("Sc", Element::Sc), ("Ti", Element::Ti), ("V", Element::V), ("Cr", Element::Cr),
        ("Mn", Element::Mn), ("Fe", Element::Fe), ("Co", Element::Co), ("Ni", Element::Ni),
        ("Cu", Element::Cu), ("Zn", Element::Zn), ("Ga", Element::Ga), ("Ge", Element::Ge),
        ("As", Element::As), ("Se", Element::Se), ("Br", Element::Br), ("Kr", Element::Kr),
        ("Rb", Element::Rb), ("Sr", Element::Sr), ("Y", Element::Y), ("Zr", Element::Zr),
        ("Nb", Element::Nb), ("Mo", Element::Mo), ("Tc", Element::Tc), ("Ru", Element::Ru),
        ("Rh", Element::Rh), ("Pd", Element::Pd), ("Ag", Element::Ag), ("Cd", Element::Cd),
        ("In", Element::In), ("Sn", Element::Sn), ("Sb", Element::Sb), ("Te", Element::Te),
        ("I", Element::I), ("Xe", Element::Xe), ("Cs", Element::Cs), ("Ba", Element::Ba),
        ("La", Element::La), ("Ce", Element::Ce), ("Pr", Element::Pr), ("Nd", Element::Nd),
        ("Pm", Element::Pm), ("Sm", Element::Sm), ("Eu", Element::Eu), ("Gd", Element::Gd),
        ("Tb", Element::Tb), ("Dy", Element::Dy), ("Ho", Element::Ho), ("Er", Element::Er),
        ("Tm", Element::Tm), ("Yb", Element::Yb), ("Lu", Element::Lu), ("Hf", Element::Hf),
        ("Ta", Element::Ta), ("W", Element::W), ("Re", Element::Re), ("Os", Element::Os),
        ("Ir", Element::Ir), ("Pt", Element::Pt), ("Au", Element::Au), ("Hg", Element::Hg),
        ("Tl", Element::Tl), ("Pb", Element::Pb), ("Bi", Element::Bi), ("Po", Element::Po),
        ("At", Element::At), ("Rn", Element::Rn), ("Fr", Element::Fr), ("Ra", Element::Ra),
        ("Ac", Element::Ac), ("Th", Element::Th), ("Pa", Element::Pa), ("U", Element::U),
        ("Np", Element::Np), ("Pu", Element::Pu), ("Am", Element::Am), ("Cm", Element::Cm),
        ("Bk", Element::Bk), ("Cf", Element::Cf), ("Es", Element::Es), ("Fm", Element::Fm),
        ("Md", Element::Md), ("No", Element::No), ("Lr", Element::Lr),
    ];
}

/// Error returned when a string does not name a known element symbol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a recognized element symbol")]
pub struct ParseElementError(pub String);

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Element::SYMBOLS
            .iter()
            .find(|(sym, _)| *sym == s)
            .map(|(_, el)| *el)
            .ok_or_else(|| ParseElementError(s.to_owned()))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sym, _) = Element::SYMBOLS
            .iter()
            .find(|(_, el)| el == self)
            .expect("every Element variant has a symbol entry");
        write!(f, "{sym}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_common_symbols() {
        for sym in ["H", "C", "N", "O", "Cu", "Fe", "Lr"] {
            let el: Element = sym.parse().unwrap();
            assert_eq!(el.to_string(), sym);
        }
    }

    #[test]
    fn rejects_unknown_symbols() {
        assert!("Xx".parse::<Element>().is_err());
    }

    #[test]
    fn exotic_lanthanides_have_no_forcefield_data() {
        assert!(Element::Pm.data().is_none());
    }

    #[test]
    fn organic_set_excludes_metals() {
        assert!(Element::C.is_organic());
        assert!(!Element::Cu.is_organic());
    }
}
