//! Tagged potential variants for every topological term kind.
//!
//! Each variant carries its own parameter tuple and renders itself to the MD-engine's coefficient
//! syntax via [`Render::render`]; `typing::dedup` uses the rendered string (prefixed with the atom
//! type signature) as the de-duplication key, per `SPEC_FULL.md` §9's design note that the
//! rendered potential is an adequate structural hash.
//!
//! Grounded on the teacher's tagged-enum + custom-`Deserialize` idiom in the orphaned
//! `src/core/properties.rs`, generalized here from element/bond-order tagging to potential-variant
//! tagging.

use std::fmt::Write as _;

/// Renders a potential to the space-separated coefficient fields LAMMPS expects after the style
/// keyword and type index (e.g. `"200.0 1.54"` for a harmonic bond).
pub trait Render {
    fn render(&self) -> String;
    /// The LAMMPS style keyword this variant corresponds to (e.g. `"harmonic"`).
    fn style(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BondPotential {
    Harmonic { k: f64, r0: f64 },
    Morse { d: f64, alpha: f64, r0: f64 },
    Class2 { r0: f64, k2: f64, k3: f64, k4: f64 },
}

impl Render for BondPotential {
    fn render(&self) -> String {
        match self {
            BondPotential::Harmonic { k, r0 } => format!("{:.6} {:.6}", k, r0),
            BondPotential::Morse { d, alpha, r0 } => format!("{:.6} {:.6} {:.6}", d, alpha, r0),
            BondPotential::Class2 { r0, k2, k3, k4 } => {
                format!("{:.6} {:.6} {:.6} {:.6}", r0, k2, k3, k4)
            }
        }
    }

    fn style(&self) -> &'static str {
        match self {
            BondPotential::Harmonic { .. } => "harmonic",
            BondPotential::Morse { .. } => "morse",
            BondPotential::Class2 { .. } => "class2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnglePotential {
    /// DREIDING linear form: `K (1 + cos(theta))`.
    Cosine { k: f64 },
    /// DREIDING non-linear form: `K (cos(theta) - cos(theta0))^2 / sin^2(theta0)`.
    CosineSquared { k: f64, theta0_deg: f64 },
    /// UFF three-term Fourier: `K (C0 + C1 cos(theta) + C2 cos(2 theta))`.
    Fourier { k: f64, c0: f64, c1: f64, c2: f64 },
    /// UFF two-term Fourier used for linear/trigonal-planar/square-planar/octahedral geometries:
    /// `K/n^2 (1 - cos(n theta))`.
    FourierSimple { k: f64, n: u8, c: f64 },
    Class2 { theta0_deg: f64, k2: f64, k3: f64, k4: f64 },
}

impl Render for AnglePotential {
    fn render(&self) -> String {
        match self {
            AnglePotential::Cosine { k } => format!("{:.6}", k),
            AnglePotential::CosineSquared { k, theta0_deg } => format!("{:.6} {:.6}", k, theta0_deg),
            AnglePotential::Fourier { k, c0, c1, c2 } => {
                format!("{:.6} {:.6} {:.6} {:.6}", k, c0, c1, c2)
            }
            AnglePotential::FourierSimple { k, n, c } => format!("{:.6} {} {:.6}", k, n, c),
            AnglePotential::Class2 { theta0_deg, k2, k3, k4 } => {
                format!("{:.6} {:.6} {:.6} {:.6}", theta0_deg, k2, k3, k4)
            }
        }
    }

    fn style(&self) -> &'static str {
        match self {
            AnglePotential::Cosine { .. } => "cosine",
            AnglePotential::CosineSquared { .. } => "cosine/squared",
            AnglePotential::Fourier { .. } => "fourier",
            AnglePotential::FourierSimple { .. } => "fourier/simple",
            AnglePotential::Class2 { .. } => "class2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DihedralPotential {
    /// LAMMPS harmonic torsion: `K [1 + d cos(n phi)]`.
    Harmonic { k: f64, d: i8, n: u8 },
    Class2 { v1: f64, phi1_deg: f64, v2: f64, phi2_deg: f64, v3: f64, phi3_deg: f64 },
}

impl Render for DihedralPotential {
    fn render(&self) -> String {
        match self {
            DihedralPotential::Harmonic { k, d, n } => format!("{:.6} {} {}", k, d, n),
            DihedralPotential::Class2 {
                v1,
                phi1_deg,
                v2,
                phi2_deg,
                v3,
                phi3_deg,
            } => format!(
                "{:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
                v1, phi1_deg, v2, phi2_deg, v3, phi3_deg
            ),
        }
    }

    fn style(&self) -> &'static str {
        match self {
            DihedralPotential::Harmonic { .. } => "harmonic",
            DihedralPotential::Class2 { .. } => "class2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImproperPotential {
    /// DREIDING umbrella form.
    Umbrella { k: f64, omega0_deg: f64 },
    /// UFF three-term cosine `C0 + C1 cos(omega) + C2 cos(2 omega)`.
    CosineThree { c0: f64, c1: f64, c2: f64 },
    Class2 { k: f64, chi0_deg: f64 },
}

impl Render for ImproperPotential {
    fn render(&self) -> String {
        match self {
            ImproperPotential::Umbrella { k, omega0_deg } => format!("{:.6} {:.6}", k, omega0_deg),
            ImproperPotential::CosineThree { c0, c1, c2 } => format!("{:.6} {:.6} {:.6}", c0, c1, c2),
            ImproperPotential::Class2 { k, chi0_deg } => format!("{:.6} {:.6}", k, chi0_deg),
        }
    }

    fn style(&self) -> &'static str {
        match self {
            ImproperPotential::Umbrella { .. } => "umbrella",
            ImproperPotential::CosineThree { .. } => "cvff",
            ImproperPotential::Class2 { .. } => "class2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairPotential {
    LennardJones { epsilon: f64, sigma: f64 },
    Buckingham { a: f64, rho: f64, c: f64 },
    /// DREIDING H-bond pair (`SPEC_FULL.md` §4.3): Morse-like donor/acceptor term.
    HBondMorse { d0: f64, r0: f64, n: u8 },
}

impl Render for PairPotential {
    fn render(&self) -> String {
        match self {
            PairPotential::LennardJones { epsilon, sigma } => format!("{:.6} {:.6}", epsilon, sigma),
            PairPotential::Buckingham { a, rho, c } => format!("{:.6} {:.6} {:.6}", a, rho, c),
            PairPotential::HBondMorse { d0, r0, n } => format!("{:.6} {:.6} {}", d0, r0, n),
        }
    }

    fn style(&self) -> &'static str {
        match self {
            PairPotential::LennardJones { .. } => "lj/cut/coul/long",
            PairPotential::Buckingham { .. } => "buck/coul/long",
            PairPotential::HBondMorse { .. } => "hbond/dreiding/morse",
        }
    }
}

/// Builds the de-duplication key for a term: the rendered potential plus the ordered atom-type
/// signature, joined so that distinct signatures never collide by string concatenation alone.
pub fn signature_key(style: &str, rendered: &str, type_signature: &[usize]) -> String {
    let mut key = String::new();
    let _ = write!(key, "{style}|{rendered}|");
    for (i, t) in type_signature.iter().enumerate() {
        if i > 0 {
            key.push(',');
        }
        let _ = write!(key, "{t}");
    }
    key
}
