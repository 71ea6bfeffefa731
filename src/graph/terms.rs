//! Term enumeration: derives angles, proper dihedrals, and improper dihedrals from the bond graph.
//!
//! Grounded on the teacher's `src/core/graph.rs` term-building pass, generalized to `spec.md`
//! §4.2's "Term enumeration" rules: an angle for every atom with degree ≥ 2 and every unordered
//! pair of its neighbours; a proper dihedral for every bond `(b, c)` and every neighbour `a` of `b`
//! other than `c` paired with every neighbour `d` of `c` other than `b`; an improper for every
//! degree-3 atom, built from the three permutations of its neighbour triple at index 0, 2, 4 of the
//! six total orderings (the teacher's `Inversion` enumeration already picks out that same subset,
//! since an `ImproperDihedral`'s three plane atoms are order-invariant and only three of the six
//! permutations are distinct up to that invariance).

use super::{Angle, ImproperDihedral, MolecularGraph, ProperDihedral};

/// Rebuilds `graph.terms` from scratch based on the current bond graph. Safe to call repeatedly
/// (e.g. after bond-order refinement or supercell expansion) since it always starts from an empty
/// `Terms` rather than appending.
pub fn enumerate_terms(graph: &mut MolecularGraph) {
    let angles = enumerate_angles(graph);
    let propers = enumerate_propers(graph);
    let impropers = enumerate_impropers(graph);
    graph.terms.angles = angles;
    graph.terms.propers = propers;
    graph.terms.impropers = impropers;
}

fn enumerate_angles(graph: &MolecularGraph) -> Vec<Angle> {
    let mut angles = Vec::new();
    for center in graph.atom_ids() {
        let neighbors = graph.neighbors(center);
        if neighbors.len() < 2 {
            continue;
        }
        for i in 0..neighbors.len() {
            for j in (i + 1)..neighbors.len() {
                angles.push(Angle::new(neighbors[i], center, neighbors[j]));
            }
        }
    }
    dedup_preserve_order(angles)
}

fn enumerate_propers(graph: &MolecularGraph) -> Vec<ProperDihedral> {
    let mut propers = Vec::new();
    for bond in &graph.bonds {
        let (b, c) = bond.atom_ids;
        let b_neighbors: Vec<usize> = graph.neighbors(b).into_iter().filter(|&n| n != c).collect();
        let c_neighbors: Vec<usize> = graph.neighbors(c).into_iter().filter(|&n| n != b).collect();
        for &a in &b_neighbors {
            for &d in &c_neighbors {
                if a == d {
                    continue;
                }
                propers.push(ProperDihedral::new(a, b, c, d));
            }
        }
    }
    dedup_preserve_order(propers)
}

/// The six permutations of a 3-element neighbour set fall into two classes of three under the
/// plane-sort invariance `ImproperDihedral::new` applies, so only the first three distinct-chirality
/// orderings (indices 0, 2, 4 of the lexicographic permutation list) are needed to cover every
/// improper once.
fn enumerate_impropers(graph: &MolecularGraph) -> Vec<ImproperDihedral> {
    let mut impropers = Vec::new();
    for center in graph.atom_ids() {
        let neighbors = graph.neighbors(center);
        if neighbors.len() != 3 {
            continue;
        }
        let perms = permutations_of_three(&neighbors);
        for &idx in &[0usize, 2, 4] {
            let p = perms[idx];
            impropers.push(ImproperDihedral::new(center, p));
        }
    }
    dedup_preserve_order(impropers)
}

fn permutations_of_three(items: &[usize]) -> [[usize; 3]; 6] {
    let [x, y, z] = [items[0], items[1], items[2]];
    [
        [x, y, z],
        [x, z, y],
        [y, x, z],
        [y, z, x],
        [z, x, y],
        [z, y, x],
    ]
}

fn dedup_preserve_order<T: PartialEq + Clone>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BondOrder, Cell, Element};

    fn linear_propane() -> MolecularGraph {
        let mut graph = MolecularGraph::new();
        graph.set_cell(Cell::identity());
        let c1 = graph.add_atom(Element::C, [0.0, 0.0, 0.0]);
        let c2 = graph.add_atom(Element::C, [1.5, 0.0, 0.0]);
        let c3 = graph.add_atom(Element::C, [3.0, 0.0, 0.0]);
        graph.add_bond_raw(c1, c2, BondOrder::Single, 1.5, ".".into()).unwrap();
        graph.add_bond_raw(c2, c3, BondOrder::Single, 1.5, ".".into()).unwrap();
        graph
    }

    #[test]
    fn propane_has_exactly_one_angle_at_the_central_carbon() {
        let mut graph = linear_propane();
        enumerate_terms(&mut graph);
        assert_eq!(graph.terms.angles.len(), 1);
        let angle = graph.terms.angles[0];
        assert_eq!(angle.b, 2);
    }

    #[test]
    fn propane_has_no_proper_dihedral_without_a_fourth_heavy_atom() {
        let mut graph = linear_propane();
        enumerate_terms(&mut graph);
        assert!(graph.terms.propers.is_empty());
    }

    #[test]
    fn butane_backbone_has_one_proper_dihedral() {
        let mut graph = MolecularGraph::new();
        graph.set_cell(Cell::identity());
        let c1 = graph.add_atom(Element::C, [0.0, 0.0, 0.0]);
        let c2 = graph.add_atom(Element::C, [1.5, 0.0, 0.0]);
        let c3 = graph.add_atom(Element::C, [3.0, 0.0, 0.0]);
        let c4 = graph.add_atom(Element::C, [4.5, 0.0, 0.0]);
        graph.add_bond_raw(c1, c2, BondOrder::Single, 1.5, ".".into()).unwrap();
        graph.add_bond_raw(c2, c3, BondOrder::Single, 1.5, ".".into()).unwrap();
        graph.add_bond_raw(c3, c4, BondOrder::Single, 1.5, ".".into()).unwrap();
        enumerate_terms(&mut graph);
        assert_eq!(graph.terms.propers.len(), 1);
        let dihedral = graph.terms.propers[0];
        assert_eq!((dihedral.b, dihedral.c), (2, 3));
    }

    #[test]
    fn degree_three_center_produces_three_distinct_impropers() {
        let mut graph = MolecularGraph::new();
        graph.set_cell(Cell::identity());
        let n = graph.add_atom(Element::N, [0.0, 0.0, 0.0]);
        let h1 = graph.add_atom(Element::H, [1.0, 0.0, 0.0]);
        let h2 = graph.add_atom(Element::H, [-0.5, 0.9, 0.0]);
        let h3 = graph.add_atom(Element::H, [-0.5, -0.9, 0.0]);
        graph.add_bond_raw(n, h1, BondOrder::Single, 1.0, ".".into()).unwrap();
        graph.add_bond_raw(n, h2, BondOrder::Single, 1.0, ".".into()).unwrap();
        graph.add_bond_raw(n, h3, BondOrder::Single, 1.0, ".".into()).unwrap();
        enumerate_terms(&mut graph);
        assert_eq!(graph.terms.impropers.len(), 3);
        for improper in &graph.terms.impropers {
            assert_eq!(improper.b, n);
        }
    }

    #[test]
    fn degree_two_center_has_no_impropers() {
        let graph = linear_propane();
        assert!(enumerate_impropers(&graph).is_empty());
    }
}
