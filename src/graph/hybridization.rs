//! Initial hybridization assignment and ring/aromaticity perception.
//!
//! Ring detection is grounded on the teacher's `JohnsonCycleFinder` (`src/processor/perception.rs`)
//! but reshaped from a per-start-node BFS queue to the per-edge "remove edge, search shortest
//! paths" formulation `spec.md` §4.2 literally specifies.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::{Element, Hybridization};

use super::MolecularGraph;

const MAX_RING_LEN: usize = 10;

/// Assigns initial hybridization to every atom from element + degree, per `spec.md` §4.2's table.
/// Does not consider ring membership; [`perceive_aromaticity`] reclassifies ring atoms afterward.
pub fn assign_initial_hybridization(graph: &mut MolecularGraph) {
    let ids = graph.atom_ids();
    for id in ids {
        let degree = graph.degree(id);
        let element = graph.atom(id).unwrap().element;
        let hyb = match element {
            Element::C => {
                if degree >= 4 {
                    Hybridization::Sp3
                } else if degree == 3 {
                    Hybridization::Sp2
                } else {
                    Hybridization::Sp
                }
            }
            Element::N => {
                if degree >= 3 {
                    Hybridization::Sp3
                } else if degree == 2 {
                    Hybridization::Sp2
                } else {
                    Hybridization::Sp
                }
            }
            Element::O | Element::S => {
                if degree == 2 {
                    Hybridization::Sp3
                } else {
                    Hybridization::Sp2
                }
            }
            _ => Hybridization::Sp3,
        };
        graph.atom_mut(id).unwrap().hybridization = Some(hyb);
    }
}

/// Reconstructs every shortest path from `start` to `goal` in the graph with `excluded_bond`
/// removed, bounded to `max_edges` edges.
fn shortest_paths_excluding_edge(
    graph: &MolecularGraph,
    start: usize,
    goal: usize,
    excluded_bond: usize,
    max_edges: usize,
) -> Vec<Vec<usize>> {
    let mut dist: HashMap<usize, usize> = HashMap::new();
    let mut preds: HashMap<usize, Vec<usize>> = HashMap::new();
    dist.insert(start, 0);
    let mut queue = VecDeque::new();
    queue.push_back(start);
    let mut found_dist: Option<usize> = None;

    while let Some(u) = queue.pop_front() {
        let du = dist[&u];
        if let Some(fd) = found_dist {
            if du >= fd {
                break;
            }
        }
        if du >= max_edges {
            continue;
        }
        for &(v, bond_idx) in graph.adjacency_of(u) {
            if bond_idx == excluded_bond {
                continue;
            }
            match dist.get(&v).copied() {
                None => {
                    dist.insert(v, du + 1);
                    preds.entry(v).or_default().push(u);
                    queue.push_back(v);
                    if v == goal {
                        found_dist = Some(du + 1);
                    }
                }
                Some(dv) if dv == du + 1 => {
                    preds.entry(v).or_default().push(u);
                }
                _ => {}
            }
        }
    }

    let Some(_) = found_dist else {
        return Vec::new();
    };

    let mut paths = Vec::new();
    let mut stack = vec![vec![goal]];
    while let Some(partial) = stack.pop() {
        let head = *partial.last().unwrap();
        if head == start {
            let mut path = partial.clone();
            path.reverse();
            paths.push(path);
            continue;
        }
        if let Some(parents) = preds.get(&head) {
            for &p in parents {
                let mut next = partial.clone();
                next.push(p);
                stack.push(next);
            }
        }
    }
    paths
}

/// Detects candidate rings by, for every edge `(u, v)`, searching for shortest paths from `u` to
/// `v` of length at most [`MAX_RING_LEN`] with that edge removed. Returns deduplicated rings as
/// ordered atom-id paths (closing back on the removed edge).
pub fn detect_rings(graph: &MolecularGraph) -> Vec<Vec<usize>> {
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let mut rings = Vec::new();

    for (bond_index, bond) in graph.bonds.iter().enumerate() {
        let (u, v) = bond.atom_ids;
        let max_edges = MAX_RING_LEN - 1;
        for path in shortest_paths_excluding_edge(graph, u, v, bond_index, max_edges) {
            if path.len() < 3 {
                continue;
            }
            let mut key = path.clone();
            key.sort_unstable();
            if seen.insert(key) {
                rings.push(path);
            }
        }
    }
    rings
}

/// Reclassifies every atom in a ring as [`Hybridization::Aromatic`] and records ring membership,
/// when the ring's atoms are all degree ≤ 3 and drawn only from `{C, N, O, S}` — the exact
/// criterion `spec.md` §4.2 specifies (no Hückel electron counting at this layer).
pub fn perceive_aromaticity(graph: &mut MolecularGraph) {
    let rings = detect_rings(graph);
    for ring in rings {
        let qualifies = ring.iter().all(|&id| {
            let atom = graph.atom(id).unwrap();
            graph.degree(id) <= 3
                && matches!(atom.element, Element::C | Element::N | Element::O | Element::S)
        });
        if !qualifies {
            continue;
        }
        let ring_index = graph.rings.len();
        graph.rings.push(ring.clone());
        for &id in &ring {
            let atom = graph.atom_mut(id).unwrap();
            atom.hybridization = Some(Hybridization::Aromatic);
            if !atom.ring_ids.contains(&ring_index) {
                atom.ring_ids.push(ring_index);
            }
        }
    }
}

/// True if `a` and `b` share at least one ring in common.
pub fn shares_ring(graph: &MolecularGraph, a: usize, b: usize) -> bool {
    let atom_a = graph.atom(a).unwrap();
    let atom_b = graph.atom(b).unwrap();
    atom_a.ring_ids.iter().any(|r| atom_b.ring_ids.contains(r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BondOrder, Cell, Element};

    fn benzene() -> MolecularGraph {
        let mut graph = MolecularGraph::new();
        graph.set_cell(Cell::from_params(40.0, 40.0, 40.0, 90.0, 90.0, 90.0).unwrap());
        let mut carbons = Vec::new();
        for i in 0..6 {
            let angle = (i as f64) * std::f64::consts::PI / 3.0;
            carbons.push(graph.add_atom(Element::C, [1.4 * angle.cos(), 1.4 * angle.sin(), 0.0]));
        }
        for i in 0..6 {
            graph
                .add_bond_raw(carbons[i], carbons[(i + 1) % 6], BondOrder::Aromatic, 1.4, ".".into())
                .unwrap();
        }
        graph
    }

    #[test]
    fn methane_carbon_is_sp3() {
        let mut graph = MolecularGraph::new();
        graph.set_cell(Cell::identity());
        let c = graph.add_atom(Element::C, [0.0; 3]);
        for dx in [0.6, -0.6, 0.0, 0.0] {
            let h = graph.add_atom(Element::H, [dx, 0.0, 0.0]);
            graph.add_bond_raw(c, h, BondOrder::Single, 1.09, ".".into()).unwrap();
        }
        assign_initial_hybridization(&mut graph);
        assert_eq!(graph.atom(c).unwrap().hybridization, Some(Hybridization::Sp3));
    }

    #[test]
    fn benzene_ring_is_detected_and_marked_aromatic() {
        let mut graph = benzene();
        assign_initial_hybridization(&mut graph);
        perceive_aromaticity(&mut graph);
        assert_eq!(graph.rings.len(), 1);
        assert_eq!(graph.rings[0].len(), 6);
        for atom in &graph.atoms {
            assert_eq!(atom.hybridization, Some(Hybridization::Aromatic));
            assert!(atom.is_in_ring());
        }
    }

    #[test]
    fn acyclic_chain_has_no_rings() {
        let mut graph = MolecularGraph::new();
        graph.set_cell(Cell::identity());
        let a = graph.add_atom(Element::C, [0.0, 0.0, 0.0]);
        let b = graph.add_atom(Element::C, [1.5, 0.0, 0.0]);
        let c = graph.add_atom(Element::C, [3.0, 0.0, 0.0]);
        graph.add_bond_raw(a, b, BondOrder::Single, 1.5, ".".into()).unwrap();
        graph.add_bond_raw(b, c, BondOrder::Single, 1.5, ".".into()).unwrap();
        assert!(detect_rings(&graph).is_empty());
    }
}
