//! Foundational types shared by every layer of the crate: chemical elements, bond orders,
//! hybridization states, the triclinic [`Cell`], and the error taxonomy.

pub mod cell;
pub mod elements;
pub mod error;

pub use cell::Cell;
pub use elements::Element;

use std::fmt;
use std::str::FromStr;

/// A formal bond order as used by force-field formulae.
///
/// The underlying atoms do not carry a bond-order attribute of their own; this value is inferred
/// during [`crate::graph::bond_order`] refinement and then consumed directly by the typing
/// engines.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum BondOrder {
    Single,
    Aromatic,
    Double,
    Triple,
}

impl BondOrder {
    /// The numeric order used in force-field formulae: 1.0, 1.5, 2.0 or 3.0.
    pub fn value(self) -> f64 {
        match self {
            BondOrder::Single => 1.0,
            BondOrder::Aromatic => 1.5,
            BondOrder::Double => 2.0,
            BondOrder::Triple => 3.0,
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl FromStr for BondOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" | "1.0" | "single" | "S" => Ok(BondOrder::Single),
            "1.5" | "aromatic" | "A" => Ok(BondOrder::Aromatic),
            "2" | "2.0" | "double" | "D" => Ok(BondOrder::Double),
            "3" | "3.0" | "triple" | "T" => Ok(BondOrder::Triple),
            other => Err(format!("unrecognized bond order: {other}")),
        }
    }
}

/// Perceived hybridization state of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hybridization {
    Sp,
    Sp2,
    Sp3,
    /// Aromatic atoms are treated as sp2 with fractional bond order, but carry a distinct tag so
    /// that ring/aromaticity bookkeeping can tell them apart from ordinary sp2 atoms.
    Aromatic,
}

impl fmt::Display for Hybridization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Hybridization::Sp => "sp",
            Hybridization::Sp2 => "sp2",
            Hybridization::Sp3 => "sp3",
            Hybridization::Aromatic => "aromatic",
        };
        write!(f, "{s}")
    }
}
