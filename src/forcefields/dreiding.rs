//! The DREIDING typing engine: UFF-style organic labeling plus a hydrogen-bond retyping pass, and
//! DREIDING's own bond/angle/dihedral/improper/H-bond-pair formulas.
//!
//! Grounded on `SPEC_FULL.md` §4.3's DREIDING section; the retrieved `original_source` excerpt
//! does not carry a DREIDING class (only UFF's), so the bond/angle/dihedral/improper formulas here
//! follow the spec's decision tree directly rather than a source file.

use crate::core::error::Diagnostics;
use crate::core::{Element, Hybridization};
use crate::graph::MolecularGraph;
use crate::potentials::{AnglePotential, BondPotential, DihedralPotential, ImproperPotential};

use super::tables::{dreiding_hbond_params, is_group_via_override};
use super::uff::{label_atoms as uff_label_atoms, parameterize_angles as uff_parameterize_angles};

/// Labels atoms with UFF's organic convention, then retypes hydrogens attached to {N, O, F} as
/// `H__HB` when hydrogen bonding is enabled, flagging their heavy-atom partner as a donor.
pub fn label_atoms(graph: &mut MolecularGraph, hydrogen_bonding_enabled: bool) {
    uff_label_atoms(graph);
    if !hydrogen_bonding_enabled {
        return;
    }
    for id in graph.atom_ids() {
        if graph.atom(id).unwrap().element != Element::H {
            continue;
        }
        let Some(heavy) = graph.neighbors(id).into_iter().next() else {
            continue;
        };
        if matches!(graph.atom(heavy).unwrap().element, Element::N | Element::O | Element::F) {
            graph.atom_mut(id).unwrap().label = Some("H__HB".to_string());
            graph.atom_mut(heavy).unwrap().is_hbond_donor = true;
        }
    }
}

/// `R0 = R1 + R2 - 0.01`; `K = 700 * order`.
pub fn parameterize_bonds(graph: &mut MolecularGraph, diagnostics: &mut Diagnostics) {
    for bi in 0..graph.bonds.len() {
        let (a, b) = graph.bonds[bi].atom_ids;
        let order = graph.bonds[bi].order.value();
        let (Some(r1), Some(r2)) = (
            graph.atom(a).unwrap().element.data().map(|d| d.covalent_radius),
            graph.atom(b).unwrap().element.data().map(|d| d.covalent_radius),
        ) else {
            diagnostics.push_missing_potential("bond", vec![a, b], "missing covalent radius data");
            continue;
        };
        let r0 = r1 + r2 - 0.01;
        let k = 700.0 * order;
        graph.bonds[bi].potential = Some(BondPotential::Harmonic { k, r0 });
    }
}

/// `theta0 = 180 => K(1 + cos theta)` with `K = 100`; else cosine-squared with `K = 50/sin^2(theta0)`.
///
/// DREIDING doesn't vary `theta0` by geometry class the way UFF does; this crate follows UFF's
/// central-atom label to pick `theta0` (reusing the same geometry lookup), since DREIDING's own
/// published parameterization keys off the same coordination classes.
pub fn parameterize_angles(graph: &mut MolecularGraph, diagnostics: &mut Diagnostics) {
    uff_parameterize_angles(graph, diagnostics);
    let keys: Vec<_> = graph.terms.angle_potentials.keys().copied().collect();
    for angle in keys {
        let theta0 = match graph.terms.angle_potentials.get(&angle) {
            Some(AnglePotential::Fourier { .. }) | Some(AnglePotential::FourierSimple { .. }) => {
                // Re-derive theta0 from the UFF pass's geometry selection rather than duplicating
                // the label lookup: linear UFF angles map to DREIDING's K(1+cos) branch, anything
                // else to the cosine-squared branch with theta0 = 109.47 (tetrahedral default).
                let b_label = graph.atom(angle.b).unwrap().label.clone().unwrap_or_default();
                if super::tables::uff_geometry_from_label(&b_label) == super::tables::UffGeometry::Linear {
                    180.0
                } else {
                    super::tables::ideal_angle_deg(super::tables::uff_geometry_from_label(&b_label))
                }
            }
            _ => continue,
        };
        let potential = if (theta0 - 180.0).abs() < 1e-6 {
            AnglePotential::Cosine { k: 100.0 }
        } else {
            let theta0_rad = theta0.to_radians();
            let sin2 = theta0_rad.sin().powi(2);
            AnglePotential::CosineSquared { k: 0.5 * 100.0 / sin2, theta0_deg: theta0 }
        };
        graph.terms.angle_potentials.insert(angle, potential);
    }
    let _ = diagnostics;
}

fn chalcogen_override(element: Element) -> bool {
    is_group_via_override(element)
}

/// Piecewise DREIDING dihedral parameterization, per `SPEC_FULL.md` §4.3.
pub fn parameterize_dihedrals(graph: &mut MolecularGraph, diagnostics: &mut Diagnostics) {
    let propers = graph.terms.propers.clone();
    for proper in propers {
        let (b, c) = (proper.b, proper.c);
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
        let same_ring = crate::graph::hybridization::shares_ring(graph, b, c);
        let deg_term = ((graph.degree(b).saturating_sub(1)) * (graph.degree(c).saturating_sub(1))).max(1) as f64;

        let sp3_b = matches!(hyb_b, Some(Hybridization::Sp3));
        let sp3_c = matches!(hyb_c, Some(Hybridization::Sp3));
        let sp2_b = matches!(hyb_b, Some(Hybridization::Sp2) | Some(Hybridization::Aromatic));
        let sp2_c = matches!(hyb_c, Some(Hybridization::Sp2) | Some(Hybridization::Aromatic));
        let aromatic_b = matches!(hyb_b, Some(Hybridization::Aromatic));
        let aromatic_c = matches!(hyb_c, Some(Hybridization::Aromatic));

        let (mut v, mut n, mut phi0) = (0.0_f64, 2_u8, 180.0_f64);

        if sp3_b && sp3_c && (chalcogen_override(element_b) || chalcogen_override(element_c)) {
            v = 2.0;
            n = 2;
            phi0 = 90.0;
        } else if (sp2_b && sp3_c && chalcogen_override(element_c)) || (sp3_b && sp2_c && chalcogen_override(element_b)) {
            v = 2.0;
            n = 2;
            phi0 = if chalcogen_override(element_b) || chalcogen_override(element_c) { 90.0 } else { 180.0 };
        } else if sp2_b && sp2_c && (order - 2.0).abs() < 1e-6 {
            v = 45.0;
            n = 2;
        } else if sp2_b && sp2_c && (order - 1.5).abs() < 1e-6 {
            v = 25.0;
            n = 2;
        } else if aromatic_b && aromatic_c && (order - 1.0).abs() < 1e-6 {
            v = 5.0;
            n = 2;
            if !same_ring {
                v *= 2.0;
            }
        } else if sp3_b && sp3_c {
            v = 2.0;
            n = 3;
            phi0 = 60.0;
        } else {
            v = 0.0;
        }

        v /= deg_term;
        let d = (n as f64 * phi0 + 180.0).round() as i8;
        graph.terms.proper_potentials.insert(proper, DihedralPotential::Harmonic { k: v / 2.0, d, n });
    }
}

const PNICTOGENS: [Element; 4] = [Element::N, Element::P, Element::As, Element::Sb];

/// Umbrella form, `K = 40` (or `40/3` if the center is sp2); skipped for sp3 pnictogen centers.
pub fn parameterize_impropers(graph: &mut MolecularGraph, diagnostics: &mut Diagnostics) {
    let impropers = graph.terms.impropers.clone();
    for improper in impropers {
        let center = improper.b;
        let hyb = graph.atom(center).unwrap().hybridization;
        let element = graph.atom(center).unwrap().element;
        if PNICTOGENS.contains(&element) && matches!(hyb, Some(Hybridization::Sp3)) {
            continue;
        }
        let k = if matches!(hyb, Some(Hybridization::Sp2) | Some(Hybridization::Aromatic)) {
            40.0 / 3.0
        } else {
            40.0
        };
        graph
            .terms
            .improper_potentials
            .insert(improper, ImproperPotential::Umbrella { k, omega0_deg: 0.0 });
    }
    let _ = diagnostics;
}

/// For every H-bond donor hydrogen bonded to N/O/F, emits a Morse-based H-bond pair against every
/// acceptor heavy atom (itself N/O/F, not a donor), keyed by the donor and acceptor labels.
pub fn build_hbond_pairs(graph: &MolecularGraph) -> Vec<(usize, usize, crate::potentials::PairPotential)> {
    let mut pairs = Vec::new();
    for donor_h in graph.atom_ids() {
        let atom = graph.atom(donor_h).unwrap();
        if atom.element != Element::H || atom.label.as_deref() != Some("H__HB") {
            continue;
        }
        let Some(donor_heavy) = graph.neighbors(donor_h).into_iter().next() else {
            continue;
        };
        let donor_label = graph.atom(donor_heavy).unwrap().label.clone().unwrap_or_default();

        for acceptor in graph.atom_ids() {
            let acc_atom = graph.atom(acceptor).unwrap();
            if acceptor == donor_heavy || acc_atom.is_hbond_donor {
                continue;
            }
            if !matches!(acc_atom.element, Element::N | Element::O | Element::F) {
                continue;
            }
            let acceptor_label = acc_atom.label.clone().unwrap_or_default();
            let (d0, r0) = dreiding_hbond_params(&donor_label, &acceptor_label);
            pairs.push((donor_h, acceptor, crate::potentials::PairPotential::HBondMorse { d0, r0, n: 10 }));
        }
    }
    pairs
}

/// Runs the full DREIDING pass in dependency order (bonds before angles/dihedrals, since angle
/// parameterization reuses the UFF bond-length pass).
pub fn apply(graph: &mut MolecularGraph, diagnostics: &mut Diagnostics, hydrogen_bonding_enabled: bool) {
    label_atoms(graph, hydrogen_bonding_enabled);
    parameterize_bonds(graph, diagnostics);
    parameterize_angles(graph, diagnostics);
    parameterize_dihedrals(graph, diagnostics);
    parameterize_impropers(graph, diagnostics);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BondOrder, Cell};

    #[test]
    fn water_hydrogen_is_retyped_as_an_hbond_donor_when_enabled() {
        let mut graph = MolecularGraph::new();
        graph.set_cell(Cell::from_params(20.0, 20.0, 20.0, 90.0, 90.0, 90.0).unwrap());
        let o = graph.add_atom(Element::O, [0.0, 0.0, 0.0]);
        let h1 = graph.add_atom(Element::H, [0.96, 0.0, 0.0]);
        let h2 = graph.add_atom(Element::H, [-0.24, 0.93, 0.0]);
        graph.add_bond_raw(o, h1, BondOrder::Single, 0.96, ".".into()).unwrap();
        graph.add_bond_raw(o, h2, BondOrder::Single, 0.96, ".".into()).unwrap();

        label_atoms(&mut graph, true);
        assert_eq!(graph.atom(h1).unwrap().label.as_deref(), Some("H__HB"));
        assert!(graph.atom(o).unwrap().is_hbond_donor);
    }

    #[test]
    fn hydrogen_bonding_disabled_leaves_plain_hydrogen_labels() {
        let mut graph = MolecularGraph::new();
        graph.set_cell(Cell::identity());
        let o = graph.add_atom(Element::O, [0.0, 0.0, 0.0]);
        let h = graph.add_atom(Element::H, [0.96, 0.0, 0.0]);
        graph.add_bond_raw(o, h, BondOrder::Single, 0.96, ".".into()).unwrap();
        label_atoms(&mut graph, false);
        assert_eq!(graph.atom(h).unwrap().label.as_deref(), Some("H_"));
    }

    #[test]
    fn linear_dreiding_angle_uses_the_k_one_plus_cos_form() {
        let mut graph = MolecularGraph::new();
        graph.set_cell(Cell::from_params(20.0, 20.0, 20.0, 90.0, 90.0, 90.0).unwrap());
        let a = graph.add_atom(Element::C, [0.0, 0.0, 0.0]);
        let b = graph.add_atom(Element::C, [1.5, 0.0, 0.0]);
        let c = graph.add_atom(Element::C, [3.0, 1.0e-6, 0.0]);
        graph.atom_mut(b).unwrap().hybridization = Some(Hybridization::Sp);
        graph.atom_mut(b).unwrap().label = Some("C_1".to_string());
        graph.add_bond_raw(a, b, BondOrder::Triple, 1.2, ".".into()).unwrap();
        graph.add_bond_raw(b, c, BondOrder::Triple, 1.2, ".".into()).unwrap();
        crate::graph::terms::enumerate_terms(&mut graph);

        let mut diagnostics = Diagnostics::default();
        uff_label_atoms(&mut graph);
        graph.atom_mut(b).unwrap().label = Some("C_1".to_string());
        super::super::uff::parameterize_bonds(&mut graph, &mut diagnostics);
        parameterize_angles(&mut graph, &mut diagnostics);

        let angle = graph.terms.angles[0];
        match graph.terms.angle_potentials.get(&angle) {
            Some(AnglePotential::Cosine { k }) => assert_eq!(*k, 100.0),
            other => panic!("expected cosine angle, got {other:?}"),
        }
    }
}
