//! The UFF typing engine: atom labeling plus bond/angle/dihedral/improper parameterization.
//!
//! Grounded on `original_source/ForceFields.py`'s `UFF` class (`bond_term`, `angle_term`,
//! `uff_angle_type`, `dihedral_term`, `improper_term`), translated from its per-term method style
//! into free functions over a [`MolecularGraph`], per `SPEC_FULL.md` §4.3.

use crate::core::error::Diagnostics;
use crate::core::{Element, Hybridization};
use crate::graph::MolecularGraph;
use crate::potentials::{AnglePotential, BondPotential, DihedralPotential, ImproperPotential};

use super::tables::{ideal_angle_deg, is_group_via_override, uff_geometry_from_label, uff_torsion_params, UffGeometry};

/// Assigns a UFF force-field label to every atom that doesn't already carry one.
///
/// Organic atoms (C, N, O, S, B) receive `E_3`/`E_2`/`E_R`/`E_1` by hybridization; hydrogen gets
/// `H_`; halides get their element-specific single-coordination label; everything else falls back
/// to a generic `E_` label standing in for "the first UFF table entry matching the element
/// symbol" (the full UFF table itself is out of scope per `SPEC_FULL.md` §1).
pub fn label_atoms(graph: &mut MolecularGraph) {
    for id in graph.atom_ids() {
        let atom = graph.atom(id).unwrap();
        if atom.label.is_some() {
            continue;
        }
        let label = uff_label(atom.element, atom.hybridization);
        graph.atom_mut(id).unwrap().label = Some(label);
    }
}

fn uff_label(element: Element, hybridization: Option<Hybridization>) -> String {
    use Element::*;
    match element {
        H => "H_".to_string(),
        F | Cl | Br | I => format!("{element}_"),
        C | N | O | S | B => {
            let suffix = match hybridization {
                Some(Hybridization::Sp3) | None => "3",
                Some(Hybridization::Sp2) => "2",
                Some(Hybridization::Aromatic) => "R",
                Some(Hybridization::Sp) => "1",
            };
            format!("{element}_{suffix}")
        }
        Cu => "Cu3+1".to_string(),
        Zn => "Zn3+2".to_string(),
        Fe => "Fe3+2".to_string(),
        _ => format!("{element}_"),
    }
}

fn atom_z_star(graph: &MolecularGraph, atom_id: usize) -> Option<f64> {
    graph.atom(atom_id).unwrap().element.data().map(|d| d.z_star)
}

fn atom_chi(graph: &MolecularGraph, atom_id: usize) -> Option<f64> {
    graph.atom(atom_id).unwrap().element.data().map(|d| d.chi)
}

fn atom_radius(graph: &MolecularGraph, atom_id: usize) -> Option<f64> {
    graph.atom(atom_id).unwrap().element.data().map(|d| d.covalent_radius)
}

/// Harmonic bond parameters per `SPEC_FULL.md` §4.3's shared bond formula.
pub fn parameterize_bonds(graph: &mut MolecularGraph, diagnostics: &mut Diagnostics) {
    for bi in 0..graph.bonds.len() {
        let (a, b) = graph.bonds[bi].atom_ids;
        let order = graph.bonds[bi].order.value();

        let (Some(r1), Some(r2), Some(chi1), Some(chi2), Some(z1), Some(z2)) = (
            atom_radius(graph, a),
            atom_radius(graph, b),
            atom_chi(graph, a),
            atom_chi(graph, b),
            atom_z_star(graph, a),
            atom_z_star(graph, b),
        ) else {
            diagnostics.push_missing_potential("bond", vec![a, b], "missing element data for bond parameterization");
            continue;
        };

        let r_bo = -0.1332 * (r1 + r2) * order.ln();
        let r_en = r1 * r2 * (chi1.sqrt() - chi2.sqrt()).powi(2) / (chi1 * r1 + chi2 * r2);
        let r0 = r1 + r2 + r_bo - r_en;
        let k = 664.12 * z1 * z2 / r0.powi(3) / 2.0;
        graph.bonds[bi].potential = Some(BondPotential::Harmonic { k, r0 });
    }
}

fn bond_r0(graph: &MolecularGraph, a: usize, b: usize) -> Option<f64> {
    match graph.bond_between(a, b)?.potential {
        Some(BondPotential::Harmonic { r0, .. }) => Some(r0),
        _ => None,
    }
}

/// UFF angle parameterization, keyed on the central atom's geometry class.
pub fn parameterize_angles(graph: &mut MolecularGraph, diagnostics: &mut Diagnostics) {
    let angles = graph.terms.angles.clone();
    for angle in angles {
        let b_label = match graph.atom(angle.b).unwrap().label.clone() {
            Some(l) => l,
            None => {
                diagnostics.push_missing_potential("angle", vec![angle.a, angle.b, angle.c], "central atom has no force-field label");
                continue;
            }
        };
        let (Some(r_ab), Some(r_bc), Some(za), Some(zc)) = (
            bond_r0(graph, angle.a, angle.b),
            bond_r0(graph, angle.b, angle.c),
            atom_z_star(graph, angle.a),
            atom_z_star(graph, angle.c),
        ) else {
            diagnostics.push_missing_potential("angle", vec![angle.a, angle.b, angle.c], "missing bond equilibrium length or Z* for flanking atoms");
            continue;
        };

        let geometry = uff_geometry_from_label(&b_label);
        let theta0 = ideal_angle_deg(geometry);
        let theta0_rad = theta0.to_radians();
        let cos_t0 = theta0_rad.cos();
        let sin_t0 = theta0_rad.sin();

        let r_ac_sq = r_ab * r_ab + r_bc * r_bc - 2.0 * r_ab * r_bc * cos_t0;
        let r_ac = r_ac_sq.max(0.0).sqrt();
        let beta = 664.12 / (r_ab * r_bc);
        let mut k_base = beta * (za * zc / r_ac.powi(5));
        k_base *= 3.0 * r_ab * r_bc * (1.0 - cos_t0 * cos_t0) - r_ac * r_ac * cos_t0;

        let potential = if matches!(geometry, UffGeometry::Tetrahedral) && (theta0 - 90.0).abs() < 1e-6 {
            AnglePotential::FourierSimple { k: k_base / 4.0, n: 2, c: 1.0 }
        } else {
            match geometry {
                UffGeometry::Linear => AnglePotential::FourierSimple { k: k_base, n: 1, c: -1.0 },
                UffGeometry::TrigonalPlanar => AnglePotential::FourierSimple { k: k_base / 9.0, n: 3, c: -1.0 },
                UffGeometry::SquarePlanar | UffGeometry::Octahedral => {
                    AnglePotential::FourierSimple { k: k_base / 16.0, n: 4, c: -1.0 }
                }
                UffGeometry::Tetrahedral | UffGeometry::TrigonalBipyramidal => {
                    let c2 = 1.0 / (4.0 * sin_t0 * sin_t0);
                    let c1 = -4.0 * c2 * cos_t0;
                    let c0 = c2 * (2.0 * cos_t0 * cos_t0 + 1.0);
                    AnglePotential::Fourier { k: k_base, c0, c1, c2 }
                }
            }
        };
        graph.terms.angle_potentials.insert(angle, potential);
    }
}

fn is_sp2_like(h: Option<Hybridization>) -> bool {
    matches!(h, Some(Hybridization::Sp2) | Some(Hybridization::Aromatic))
}

fn is_sp3_like(h: Option<Hybridization>) -> bool {
    matches!(h, Some(Hybridization::Sp3))
}

/// UFF dihedral parameterization, branching on the joint sp2/sp3 classification of the bond's
/// hinge atoms.
pub fn parameterize_dihedrals(graph: &mut MolecularGraph, diagnostics: &mut Diagnostics) {
    let propers = graph.terms.propers.clone();
    for proper in propers {
        let b = proper.b;
        let c = proper.c;
        let hyb_b = graph.atom(b).unwrap().hybridization;
        let hyb_c = graph.atom(c).unwrap().hybridization;
        let element_b = graph.atom(b).unwrap().element;
        let element_c = graph.atom(c).unwrap().element;
        let order = match graph.bond_between(b, c) {
            Some(bond) => bond.order.value(),
            None => {
                diagnostics.push_missing_potential("dihedral", vec![proper.a, b, c, proper.d], "hinge bond order unavailable");
                continue;
            }
        };
        let m = (graph.degree(b) * graph.degree(c)).max(1) as f64;

        let all_sp3 = is_sp3_like(hyb_b) && is_sp3_like(hyb_c);
        let all_sp2 = is_sp2_like(hyb_b) && is_sp2_like(hyb_c);
        let mixed = (is_sp2_like(hyb_b) && is_sp3_like(hyb_c)) || (is_sp3_like(hyb_b) && is_sp2_like(hyb_c));

        let (mut v, mut n, mut phi0) = (0.0_f64, 2_u8, 180.0_f64);

        if all_sp3 {
            phi0 = 60.0;
            n = 3;
            let mut vi = uff_torsion_params(element_b).map(|p| p.v_sp3).unwrap_or(0.0);
            let mut vj = uff_torsion_params(element_c).map(|p| p.v_sp3).unwrap_or(0.0);
            if is_group_via_override(element_b) {
                vi = if element_b == Element::O { 2.0 } else { 6.8 };
                n = 2;
                phi0 = 90.0;
            }
            if is_group_via_override(element_c) {
                vj = if element_c == Element::O { 2.0 } else { 6.8 };
                n = 2;
                phi0 = 90.0;
            }
            v = (vi * vj).max(0.0).sqrt();
        } else if all_sp2 {
            phi0 = 180.0;
            n = 2;
            let ui = uff_torsion_params(element_b).map(|p| p.u_sp2).unwrap_or(0.0);
            let uj = uff_torsion_params(element_c).map(|p| p.u_sp2).unwrap_or(0.0);
            v = 5.0 * (ui * uj).max(0.0).sqrt() * (1.0 + 4.18 * order.ln());
        } else if mixed {
            phi0 = 180.0;
            n = 3;
            v = 2.0;
            if is_sp3_like(hyb_c) && is_group_via_override(element_c) {
                n = 2;
                phi0 = 90.0;
            } else if is_sp3_like(hyb_b) && is_group_via_override(element_b) {
                n = 2;
                phi0 = 90.0;
            }
            if n == 2 {
                let ui = uff_torsion_params(element_b).map(|p| p.u_sp2).unwrap_or(0.0);
                let uj = uff_torsion_params(element_c).map(|p| p.u_sp2).unwrap_or(0.0);
                v = 5.0 * (ui * uj).max(0.0).sqrt() * (1.0 + 4.18 * order.ln());
            }
        }

        v /= m;
        let nphi0 = n as f64 * phi0;
        let d = (-(nphi0.to_radians().cos())).round() as i8;
        graph
            .terms
            .proper_potentials
            .insert(proper, DihedralPotential::Harmonic { k: v / 2.0, d, n });
    }
}

const PNICTOGEN_PHI_DEG: [(&str, f64); 4] = [
    ("P_3+3", 84.4339),
    ("As3+3", 86.9735),
    ("Sb3+3", 87.7047),
    ("Bi3+3", 90.0),
];

/// UFF improper parameterization: a label-keyed lookup of the central atom's inversion
/// coefficients, with a strengthened constant when one substituent is a carbonyl oxygen.
pub fn parameterize_impropers(graph: &mut MolecularGraph, diagnostics: &mut Diagnostics) {
    let impropers = graph.terms.impropers.clone();
    for improper in impropers {
        let (a, c, d) = (improper.plane[0], improper.plane[1], improper.plane[2]);
        let b_label = graph.atom(improper.b).unwrap().label.clone().unwrap_or_default();

        let coeffs = if matches!(b_label.as_str(), "N_3" | "N_2" | "N_R" | "O_2" | "O_R") {
            Some((1.0, -1.0, 0.0, 6.0))
        } else if let Some(&(_, phi_deg)) = PNICTOGEN_PHI_DEG.iter().find(|(label, _)| *label == b_label) {
            let phi = phi_deg.to_radians();
            let c1 = -4.0 * phi.cos();
            let c2 = 1.0;
            let c0 = -c1 * phi.cos() + c2 * (2.0 * phi).cos();
            Some((c0, c1, c2, 22.0))
        } else if matches!(b_label.as_str(), "C_2" | "C_R") {
            let neighbor_labels = [a, c, d].map(|id| graph.atom(id).unwrap().label.clone().unwrap_or_default());
            let koop = if neighbor_labels.iter().any(|l| l == "O_2") { 50.0 } else { 6.0 };
            Some((1.0, -1.0, 0.0, koop))
        } else {
            None
        };

        let Some((c0, c1, c2, koop)) = coeffs else {
            diagnostics.push_missing_potential("improper", vec![a, improper.b, c, d], "central atom label not in the UFF improper table");
            continue;
        };
        let koop = koop / 3.0;
        graph.terms.improper_potentials.insert(
            improper,
            ImproperPotential::CosineThree { c0: koop * c0, c1: koop * c1, c2: koop * c2 },
        );
    }
}

/// Runs the full UFF pass (labeling, then bonds, angles, dihedrals, impropers in that order since
/// later terms depend on the bond-equilibrium lengths the bond pass computes).
pub fn apply(graph: &mut MolecularGraph, diagnostics: &mut Diagnostics) {
    label_atoms(graph);
    parameterize_bonds(graph, diagnostics);
    parameterize_angles(graph, diagnostics);
    parameterize_dihedrals(graph, diagnostics);
    parameterize_impropers(graph, diagnostics);
}
