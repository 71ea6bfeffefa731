//! Global non-bonded pair-term construction: UFF Lennard-Jones mixing plus DREIDING H-bond pairs.
//!
//! Grounded on `original_source/ForceFields.py`'s `van_der_waals_pairs`, which builds one LJ row
//! per unique pair of atom *types* (not per atom) after typing has settled, using Lorentz-Berthelot
//! combining rules; per `SPEC_FULL.md` §4.3's pair-terms paragraph.

use std::collections::BTreeSet;

use crate::graph::MolecularGraph;
use crate::potentials::PairPotential;

use super::tables::{uff_epsilon, uff_nonbond_distance};

/// One row of the final pair-coefficient table, keyed by the two 1-based force-field type indices
/// it covers (`type_a <= type_b`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairTerm {
    pub type_a: usize,
    pub type_b: usize,
    pub potential: PairPotential,
}

/// `sigma = x_i * 2^(-1/6)`, per UFF's convention of tabulating the LJ minimum rather than the
/// zero-crossing radius, where `x_i` is the element's tabulated nonbond distance, not its covalent
/// bond radius.
fn uff_sigma(nonbond_distance: f64) -> f64 {
    nonbond_distance * 2f64.powf(-1.0 / 6.0)
}

/// Builds the diagonal-and-cross LJ table over every distinct (type_a, type_b) pair present among
/// `graph`'s typed atoms, mixing by Lorentz-Berthelot (`epsilon = sqrt(e1*e2)`, `sigma =
/// (s1+s2)/2`).
pub fn build_uff_pair_terms(graph: &MolecularGraph) -> Vec<PairTerm> {
    let mut per_type: Vec<(usize, f64, f64)> = Vec::new();
    let mut seen_types: BTreeSet<usize> = BTreeSet::new();
    for atom in &graph.atoms {
        let Some(type_index) = atom.type_index else { continue };
        if !seen_types.insert(type_index) {
            continue;
        }
        let sigma = uff_sigma(uff_nonbond_distance(atom.element));
        per_type.push((type_index, uff_epsilon(atom.element), sigma));
    }
    per_type.sort_by_key(|(t, _, _)| *t);

    let mut pairs = Vec::new();
    for i in 0..per_type.len() {
        for j in i..per_type.len() {
            let (ta, ea, sa) = per_type[i];
            let (tb, eb, sb) = per_type[j];
            let epsilon = (ea * eb).sqrt();
            let sigma = (sa + sb) / 2.0;
            pairs.push(PairTerm { type_a: ta, type_b: tb, potential: PairPotential::LennardJones { epsilon, sigma } });
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Cell, Element};

    #[test]
    fn two_typed_elements_produce_three_mixed_rows() {
        let mut graph = MolecularGraph::new();
        graph.set_cell(Cell::identity());
        let a = graph.add_atom(Element::C, [0.0, 0.0, 0.0]);
        let b = graph.add_atom(Element::O, [1.0, 0.0, 0.0]);
        graph.atom_mut(a).unwrap().type_index = Some(1);
        graph.atom_mut(b).unwrap().type_index = Some(2);

        let pairs = build_uff_pair_terms(&graph);
        assert_eq!(pairs.len(), 3);
        assert!(pairs.iter().any(|p| p.type_a == 1 && p.type_b == 1));
        assert!(pairs.iter().any(|p| p.type_a == 1 && p.type_b == 2));
        assert!(pairs.iter().any(|p| p.type_a == 2 && p.type_b == 2));
    }

    #[test]
    fn untyped_atoms_are_excluded() {
        let mut graph = MolecularGraph::new();
        graph.set_cell(Cell::identity());
        graph.add_atom(Element::C, [0.0, 0.0, 0.0]);
        assert!(build_uff_pair_terms(&graph).is_empty());
    }
}
