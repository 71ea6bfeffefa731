//! Supercell expansion and pre-expansion coordinate unwrapping.
//!
//! Grounded on `original_source/structure_data.py`'s `build_supercell`, `img_offset`, and
//! `update_symflag` helpers, and `unwrap_node_coordinates`.

use std::collections::HashMap;

use crate::core::error::GraphError;

use super::bonding::{decode_symmetry_flag, encode_symmetry_flag, minimum_image_shift};
use super::{Angle, ImproperDihedral, MolecularGraph, ProperDihedral};

fn linear_index(cx: i32, cy: i32, cz: i32, dims: (i32, i32, i32)) -> i32 {
    (cz * dims.1 + cy) * dims.0 + cx
}

/// Given an atom's home image `(cx, cy, cz)` and a fractional shift describing where its bonded
/// partner lies relative to it, returns the partner's actual image coordinates (wrapped into the
/// new supercell) and the leftover shift that should be recorded as the new symmetry flag.
fn resolve_image(
    home: (i32, i32, i32),
    shift: (i32, i32, i32),
    dims: (i32, i32, i32),
) -> ((i32, i32, i32), (i32, i32, i32)) {
    let raw = (home.0 + shift.0, home.1 + shift.1, home.2 + shift.2);
    let wrap = |t: i32, n: i32| -> (i32, i32) {
        if t < 0 {
            (t + n, -1)
        } else if t >= n {
            (t - n, 1)
        } else {
            (t, 0)
        }
    };
    let (wx, lx) = wrap(raw.0, dims.0);
    let (wy, ly) = wrap(raw.1, dims.1);
    let (wz, lz) = wrap(raw.2, dims.2);
    ((wx, wy, wz), (lx, ly, lz))
}

/// Expands `graph` into a supercell of `(nx, ny, nz)` unit cells, rewiring every cross-boundary
/// bond and every derived angle/dihedral/improper so that all stored references point to atoms
/// that exist in the expanded graph, per `spec.md` §4.2's "Supercell expansion".
///
/// Ring/aromaticity bookkeeping is intentionally not replicated across images: cluster detection
/// and aromaticity perception run before expansion in the assembler's pipeline, and neither the
/// spec's invariants nor its worked scenarios ask for post-expansion ring membership.
pub fn expand_supercell(graph: &MolecularGraph, nx: u32, ny: u32, nz: u32) -> Result<MolecularGraph, GraphError> {
    let original_n = graph.atoms.len();
    let dims = (nx as i32, ny as i32, nz as i32);
    let cell = graph.cell.clone().ok_or(GraphError::NoCellSet)?;
    let supercell_images = (dims.0 * dims.1 * dims.2) as usize;

    let mut combined = MolecularGraph::new();
    combined.set_cell(cell.update_supercell(nx, ny, nz)?);

    for cz in 0..dims.2 {
        for cy in 0..dims.1 {
            for cx in 0..dims.0 {
                let lin = linear_index(cx, cy, cz, dims) as usize;
                let delta = lin * original_n;
                let translation = cell.cartesian([cx as f64, cy as f64, cz as f64]);

                for atom in &graph.atoms {
                    let mut new_atom = atom.clone();
                    new_atom.id = atom.id + delta;
                    new_atom.cart = [
                        atom.cart[0] + translation[0],
                        atom.cart[1] + translation[1],
                        atom.cart[2] + translation[2],
                    ];
                    combined.adjacency.push(Vec::new());
                    combined.atoms.push(new_atom);
                }
            }
        }
    }
    combined.next_atom_id = original_n * supercell_images + 1;

    let mut index_by_id: HashMap<usize, usize> = HashMap::new();
    for (i, atom) in combined.atoms.iter().enumerate() {
        index_by_id.insert(atom.id, i);
    }

    let remap_within_image = |orig_id: usize, lin: usize| orig_id + lin * original_n;

    for cz in 0..dims.2 {
        for cy in 0..dims.1 {
            for cx in 0..dims.0 {
                let home = (cx, cy, cz);
                let lin = linear_index(cx, cy, cz, dims) as usize;

                for bond in &graph.bonds {
                    let (orig_a, orig_b) = bond.atom_ids;
                    let new_a = remap_within_image(orig_a, lin);
                    let shift = decode_symmetry_flag(&bond.sym_flag);

                    let (target_image, leftover) = if shift == (0, 0, 0) {
                        (home, (0, 0, 0))
                    } else {
                        resolve_image(home, shift, dims)
                    };
                    let target_lin = linear_index(target_image.0, target_image.1, target_image.2, dims) as usize;
                    let new_b = remap_within_image(orig_b, target_lin);

                    if new_a == new_b {
                        continue;
                    }

                    let mut new_bond = bond.clone();
                    new_bond.id = combined.bonds.len() + 1;
                    new_bond.atom_ids = if new_a <= new_b { (new_a, new_b) } else { (new_b, new_a) };
                    new_bond.sym_flag = encode_symmetry_flag(leftover);

                    let bond_index = combined.bonds.len();
                    combined.bonds.push(new_bond);
                    if let Some(&ia) = index_by_id.get(&new_a) {
                        combined.adjacency[ia].push((new_b, bond_index));
                    }
                    if let Some(&ib) = index_by_id.get(&new_b) {
                        combined.adjacency[ib].push((new_a, bond_index));
                    }
                }
            }
        }
    }
    combined.next_bond_id = combined.bonds.len() + 1;

    // Angles, propers, and impropers are intra-image at the term-enumeration stage (every term is
    // derived from a single bond's local neighbourhood within one image), so each image simply
    // gets its own remapped copy of the original term tables.
    for cz in 0..dims.2 {
        for cy in 0..dims.1 {
            for cx in 0..dims.0 {
                let lin = linear_index(cx, cy, cz, dims) as usize;
                let remap = |id: usize| remap_within_image(id, lin);
                for angle in &graph.terms.angles {
                    combined
                        .terms
                        .angles
                        .push(Angle::new(remap(angle.a), remap(angle.b), remap(angle.c)));
                }
                for proper in &graph.terms.propers {
                    combined.terms.propers.push(ProperDihedral::new(
                        remap(proper.a),
                        remap(proper.b),
                        remap(proper.c),
                        remap(proper.d),
                    ));
                }
                for improper in &graph.terms.impropers {
                    combined.terms.impropers.push(ImproperDihedral::new(
                        remap(improper.b),
                        [remap(improper.plane[0]), remap(improper.plane[1]), remap(improper.plane[2])],
                    ));
                }
            }
        }
    }

    combined.validate_term_references()?;
    Ok(combined)
}

/// Unwraps a fragment's coordinates by walking the bond graph breadth-first from `seed`: for each
/// newly reached neighbour, picks whichever of its 27 periodic images lies closest to the
/// already-placed parent, writes that Cartesian position, and clears the connecting bond's
/// symmetry flag. Used prior to supercell expansion so a molecule stored split across periodic
/// images presents contiguous coordinates within the unit cell.
pub fn unwrap_fragment(graph: &mut MolecularGraph, seed: usize) {
    use std::collections::{HashSet, VecDeque};

    let cell = match graph.cell.clone() {
        Some(c) => c,
        None => return,
    };

    let mut visited = HashSet::new();
    visited.insert(seed);
    let mut queue = VecDeque::new();
    queue.push_back(seed);

    while let Some(current) = queue.pop_front() {
        let parent_cart = graph.atom(current).unwrap().cart;
        for neighbor in graph.neighbors(current) {
            if visited.contains(&neighbor) {
                continue;
            }
            visited.insert(neighbor);
            let child_cart = graph.atom(neighbor).unwrap().cart;
            let shift = minimum_image_shift(&cell, parent_cart, child_cart);
            let child_frac = cell.fractional(child_cart);
            let unwrapped_frac = [
                child_frac[0] + shift.0 as f64,
                child_frac[1] + shift.1 as f64,
                child_frac[2] + shift.2 as f64,
            ];
            graph.atom_mut(neighbor).unwrap().cart = cell.cartesian(unwrapped_frac);
            if let Some(bond) = graph.bond_between_mut(current, neighbor) {
                bond.sym_flag = ".".to_string();
            }
            queue.push_back(neighbor);
        }
    }
}
