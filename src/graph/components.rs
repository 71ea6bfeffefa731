//! Connected-component analysis and subgraph extraction.
//!
//! Grounded on `graph::clusters`'s BFS-neighbourhood idiom, generalized from a depth-bounded
//! search to an unbounded connectivity walk, per `SPEC_FULL.md` §4.4 step 3's guest-molecule
//! splitting.

use std::collections::{HashMap, HashSet, VecDeque};

use super::{Angle, ImproperDihedral, MolecularGraph, ProperDihedral};

/// Partitions the graph's atoms into connected components via breadth-first search over the bond
/// adjacency. Each component is a list of atom ids in discovery order; components themselves are
/// returned in order of their lowest-id member.
pub fn connected_components(graph: &MolecularGraph) -> Vec<Vec<usize>> {
    let mut visited: HashSet<usize> = HashSet::new();
    let mut components = Vec::new();

    for seed in graph.atom_ids() {
        if visited.contains(&seed) {
            continue;
        }
        let mut component = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(seed);
        visited.insert(seed);
        while let Some(current) = queue.pop_front() {
            component.push(current);
            for neighbor in graph.neighbors(current) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        components.push(component);
    }
    components
}

/// Removes the atoms in `atom_ids` (and every bond/angle/dihedral/improper touching them) from
/// `graph`, returning a fresh graph containing just that fragment with ids renumbered from 1.
///
/// `atom_ids` must name a set with no bonds leaving it into the remaining graph (i.e. a full
/// connected component) — the caller (the assembler's guest-splitting pass) guarantees this by
/// always extracting whole components from [`connected_components`].
pub fn split_off(graph: &mut MolecularGraph, atom_ids: &[usize]) -> MolecularGraph {
    let keep: HashSet<usize> = atom_ids.iter().copied().collect();
    let mut renumber: HashMap<usize, usize> = HashMap::new();
    let mut fragment = MolecularGraph::new();
    fragment.cell = graph.cell.clone();

    let mut ordered: Vec<usize> = atom_ids.to_vec();
    ordered.sort_unstable();
    for old_id in ordered {
        let atom = graph.atom(old_id).unwrap().clone();
        let new_id = fragment.add_atom(atom.element, atom.cart);
        renumber.insert(old_id, new_id);
        let copied = fragment.atom_mut(new_id).unwrap();
        copied.charge = atom.charge;
        copied.hybridization = atom.hybridization;
        copied.label = atom.label;
        copied.special_flag = atom.special_flag;
        copied.is_hbond_donor = atom.is_hbond_donor;
    }

    for bond in &graph.bonds {
        let (a, b) = bond.atom_ids;
        if keep.contains(&a) && keep.contains(&b) {
            fragment
                .add_bond_raw(renumber[&a], renumber[&b], bond.order, bond.length, bond.sym_flag.clone())
                .expect("fragment endpoints already validated by the parent graph");
        }
    }

    let remap_angle = |angle: &Angle| -> Option<Angle> {
        if keep.contains(&angle.a) && keep.contains(&angle.b) && keep.contains(&angle.c) {
            Some(Angle::new(renumber[&angle.a], renumber[&angle.b], renumber[&angle.c]))
        } else {
            None
        }
    };
    let remap_proper = |proper: &ProperDihedral| -> Option<ProperDihedral> {
        if keep.contains(&proper.a) && keep.contains(&proper.b) && keep.contains(&proper.c) && keep.contains(&proper.d) {
            Some(ProperDihedral::new(
                renumber[&proper.a],
                renumber[&proper.b],
                renumber[&proper.c],
                renumber[&proper.d],
            ))
        } else {
            None
        }
    };
    let remap_improper = |improper: &ImproperDihedral| -> Option<ImproperDihedral> {
        let (a, c, d) = (improper.plane[0], improper.plane[1], improper.plane[2]);
        if keep.contains(&improper.b) && keep.contains(&a) && keep.contains(&c) && keep.contains(&d) {
            Some(ImproperDihedral::new(
                renumber[&improper.b],
                [renumber[&a], renumber[&c], renumber[&d]],
            ))
        } else {
            None
        }
    };

    fragment.terms.angles = graph.terms.angles.iter().filter_map(remap_angle).collect();
    fragment.terms.propers = graph.terms.propers.iter().filter_map(remap_proper).collect();
    fragment.terms.impropers = graph.terms.impropers.iter().filter_map(remap_improper).collect();

    graph.atoms.retain(|a| !keep.contains(&a.id));
    graph.bonds.retain(|b| !keep.contains(&b.atom_ids.0) && !keep.contains(&b.atom_ids.1));
    graph.terms.angles.retain(|a| remap_angle(a).is_none());
    graph.terms.propers.retain(|p| remap_proper(p).is_none());
    graph.terms.impropers.retain(|i| remap_improper(i).is_none());
    graph.rebuild_adjacency();

    fragment
}

/// Appends `other`'s atoms, bonds and terms onto `graph`, offsetting every id by `graph`'s current
/// highest atom/bond id so the two id spaces stay disjoint. Used by the assembler to merge typed
/// fragments back into the framework graph (§4.4 step 7).
pub fn merge_into(graph: &mut MolecularGraph, other: &MolecularGraph) {
    let mut renumber: HashMap<usize, usize> = HashMap::new();
    let remap = |renumber: &HashMap<usize, usize>, id: usize| renumber[&id];

    for atom in &other.atoms {
        let new_id = graph.add_atom(atom.element, atom.cart);
        renumber.insert(atom.id, new_id);
        let copied = graph.atom_mut(new_id).unwrap();
        copied.charge = atom.charge;
        copied.hybridization = atom.hybridization;
        copied.label = atom.label.clone();
        copied.type_index = atom.type_index;
        copied.special_flag = atom.special_flag.clone();
        copied.is_hbond_donor = atom.is_hbond_donor;
    }
    let remap = |id: usize| remap(&renumber, id);

    for bond in &other.bonds {
        let (a, b) = bond.atom_ids;
        let new_bond_id = graph
            .add_bond_raw(remap(a), remap(b), bond.order, bond.length, bond.sym_flag.clone())
            .expect("merged fragment bonds reference atoms just inserted above");
        let new_index = graph.bonds.iter().position(|bd| bd.id == new_bond_id).unwrap();
        graph.bonds[new_index].potential = bond.potential.clone();
        graph.bonds[new_index].type_index = bond.type_index;
    }

    for angle in &other.terms.angles {
        let new_angle = Angle::new(remap(angle.a), remap(angle.b), remap(angle.c));
        graph.terms.angles.push(new_angle);
        if let Some(p) = other.terms.angle_potentials.get(angle) {
            graph.terms.angle_potentials.insert(new_angle, p.clone());
        }
    }
    for proper in &other.terms.propers {
        let new_proper = ProperDihedral::new(remap(proper.a), remap(proper.b), remap(proper.c), remap(proper.d));
        graph.terms.propers.push(new_proper);
        if let Some(p) = other.terms.proper_potentials.get(proper) {
            graph.terms.proper_potentials.insert(new_proper, p.clone());
        }
    }
    for improper in &other.terms.impropers {
        let new_improper = ImproperDihedral::new(
            remap(improper.b),
            [remap(improper.plane[0]), remap(improper.plane[1]), remap(improper.plane[2])],
        );
        graph.terms.impropers.push(new_improper);
        if let Some(p) = other.terms.improper_potentials.get(improper) {
            graph.terms.improper_potentials.insert(new_improper, p.clone());
        }
    }
}
