//! End-to-end scenarios straight out of `SPEC_FULL.md` §8's worked examples. The hydrogen and NaCl
//! scenarios go through the blueprint/runner harness in `tests/harness.rs`; the benzene scenarios
//! build the graph directly (as `typing::dedup`'s own `typed_benzene` fixture does) so that every
//! symmetric atom's coordinates come from the same `cos`/`sin` call rather than hand-rounded
//! literals, keeping the six ring positions exactly equivalent under the six-decimal precision
//! `typing::dedup`'s rendered-signature keys compare at.

use xtalff::core::error::Diagnostics;
use xtalff::core::{BondOrder, Cell, Element};
use xtalff::forcefields::uff;
use xtalff::graph::{bond_order, clusters, hybridization, supercell, terms, MolecularGraph};
use xtalff::typing::dedup;

use crate::{build_from_blueprint, run_topology_pipeline, run_uff, AtomBlueprint, InputBondBlueprint, MoleculeTestCase};

/// Scenario 1: diatomic hydrogen in a large cubic cell bonds, orders 1, and UFF types with
/// `r0 ~= 0.708` (the ln(order) correction vanishes for a single bond).
#[test]
fn diatomic_hydrogen() {
    static ATOMS: [AtomBlueprint; 2] = [
        AtomBlueprint { label: "H1", element: Element::H, cart: [0.0, 0.0, 0.0] },
        AtomBlueprint { label: "H2", element: Element::H, cart: [0.74, 0.0, 0.0] },
    ];
    let case = MoleculeTestCase {
        name: "diatomic hydrogen",
        cell_params: (20.0, 20.0, 20.0, 90.0, 90.0, 90.0),
        atoms: &ATOMS,
        bonds: &[],
    };

    let mut molecule = build_from_blueprint(&case);
    run_topology_pipeline(&mut molecule);

    assert_eq!(molecule.graph.bonds.len(), 1);
    let bond = &molecule.graph.bonds[0];
    assert_eq!(bond.order, BondOrder::Single);
    assert!((bond.length - 0.74).abs() < 1e-9);
    assert!(molecule.graph.terms.angles.is_empty());
    assert!(molecule.graph.terms.propers.is_empty());
    assert!(molecule.graph.terms.impropers.is_empty());

    run_uff(&mut molecule);
    let h1 = molecule.id("H1");
    let h2 = molecule.id("H2");
    let potential = molecule.graph.bond_between(h1, h2).unwrap().potential.unwrap();
    match potential {
        xtalff::potentials::BondPotential::Harmonic { r0, .. } => {
            assert!((r0 - 0.708).abs() < 0.01, "r0 = {r0}");
        }
        other => panic!("expected a harmonic bond potential, got {other:?}"),
    }
}

/// Scenario 4: an NaCl rock-salt cell arranged so every Na-Cl bond crosses a cell face. Every bond
/// must carry a non-`.` symmetry flag and its recorded length must equal the minimum-image
/// distance.
#[test]
fn cross_boundary_bond_nacl() {
    static ATOMS: [AtomBlueprint; 2] = [
        AtomBlueprint { label: "Na1", element: Element::Na, cart: [0.0, 0.0, 0.0] },
        AtomBlueprint { label: "Cl1", element: Element::Cl, cart: [2.82, 2.82, 2.82] },
    ];
    let case = MoleculeTestCase {
        name: "NaCl cross-boundary",
        cell_params: (2.82 * 2.0, 2.82 * 2.0, 2.82 * 2.0, 90.0, 90.0, 90.0),
        atoms: &ATOMS,
        bonds: &[InputBondBlueprint { atom1_label: "Na1", atom2_label: "Cl1", order: BondOrder::Single }],
    };

    let mut molecule = build_from_blueprint(&case);
    run_topology_pipeline(&mut molecule);

    assert_eq!(molecule.graph.bonds.len(), 1);
    let bond = &molecule.graph.bonds[0];
    assert_ne!(bond.sym_flag, ".");

    let na = molecule.id("Na1");
    let cl = molecule.id("Cl1");
    let mic = xtalff::graph::bonding::min_image_distance(
        molecule.graph.cell.as_ref().unwrap(),
        molecule.graph.atom(na).unwrap().cart,
        molecule.graph.atom(cl).unwrap().cart,
    );
    assert!((bond.length - mic).abs() < 1e-6);
}

/// Builds six ring carbons and six ring hydrogens at exact hexagonal positions (every atom's
/// coordinates come from the same `cos`/`sin` call shifted by a multiple of 60 degrees), in a cell
/// large enough that no bond crosses the boundary. Mirrors `typing::dedup`'s own `typed_benzene`
/// fixture, which this scenario also exercises the angle/type-count consequences of.
fn benzene_graph() -> MolecularGraph {
    let mut graph = MolecularGraph::new();
    graph.set_cell(Cell::from_params(40.0, 40.0, 40.0, 90.0, 90.0, 90.0).unwrap());

    let cc = 1.40;
    let ch = 1.08;
    let mut carbons = Vec::with_capacity(6);
    let mut hydrogens = Vec::with_capacity(6);
    for i in 0..6 {
        let theta = (i as f64) * std::f64::consts::PI / 3.0;
        let (x, y) = (theta.cos(), theta.sin());
        carbons.push(graph.add_atom(Element::C, [cc * x, cc * y, 0.0]));
        hydrogens.push(graph.add_atom(Element::H, [(cc + ch) * x, (cc + ch) * y, 0.0]));
    }
    for i in 0..6 {
        graph.add_bond_raw(carbons[i], carbons[(i + 1) % 6], BondOrder::Single, cc, ".".into()).unwrap();
        graph.add_bond_raw(carbons[i], hydrogens[i], BondOrder::Single, ch, ".".into()).unwrap();
    }
    graph
}

fn run_benzene_topology(graph: &mut MolecularGraph) {
    hybridization::assign_initial_hybridization(graph);
    hybridization::perceive_aromaticity(graph);
    bond_order::refine_bond_orders(graph);
    terms::enumerate_terms(graph);
    clusters::detect_clusters(graph);
}

/// Scenario 2: benzene in a large cell perceives six aromatic ring bonds, six C-H single bonds,
/// and exactly two distinct angle types (C-C-C and C-C-H) over the full set of neighbour-pair
/// angles every degree-3 ring carbon contributes (3 per carbon: one C-C-C, two C-C-H, for 18
/// total), with no dihedral crossing the (oversized, non-periodic-in-practice) cell boundary.
#[test]
fn benzene_in_large_cell() {
    let mut graph = benzene_graph();
    run_benzene_topology(&mut graph);

    let ring_bonds = graph.bonds.iter().filter(|b| b.order == BondOrder::Aromatic).count();
    let ch_bonds = graph.bonds.iter().filter(|b| b.order == BondOrder::Single).count();
    assert_eq!(ring_bonds, 6);
    assert_eq!(ch_bonds, 6);
    assert_eq!(graph.terms.angles.len(), 18);

    for atom in &graph.atoms {
        if atom.element == Element::C {
            assert!(atom.is_aromatic(), "atom {} should be perceived aromatic", atom.id);
        }
    }

    let mut diagnostics = Diagnostics::default();
    uff::apply(&mut graph, &mut diagnostics);
    for atom in &graph.atoms {
        if atom.element == Element::C {
            assert_eq!(atom.label.as_deref(), Some("C_R"));
        }
    }

    let counts = dedup::assign_all_type_indices(&mut graph);
    assert_eq!(counts.atom_types, 2);
    assert_eq!(counts.bond_types, 2);
    assert_eq!(counts.angle_types, 2, "expected exactly C-C-C and C-C-H angle types");
}

/// Scenario 5: expanding benzene's 1x1x1 cell by (2,1,1) multiplies the atom, bond, and angle
/// counts by 2, and every term in the expansion references an atom that actually exists.
#[test]
fn supercell_of_benzene_doubles_every_term_count() {
    let mut graph = benzene_graph();
    run_benzene_topology(&mut graph);

    let atoms_before = graph.atoms.len();
    let bonds_before = graph.bonds.len();
    let angles_before = graph.terms.angles.len();

    let expanded = supercell::expand_supercell(&graph, 2, 1, 1).unwrap();

    assert_eq!(expanded.atoms.len(), atoms_before * 2);
    assert_eq!(expanded.bonds.len(), bonds_before * 2);
    assert_eq!(expanded.terms.angles.len(), angles_before * 2);

    for angle in &expanded.terms.angles {
        assert!(expanded.atom(angle.a).is_some());
        assert!(expanded.atom(angle.b).is_some());
        assert!(expanded.atom(angle.c).is_some());
    }
    for bond in &expanded.bonds {
        assert!(expanded.atom(bond.atom_ids.0).is_some());
        assert!(expanded.atom(bond.atom_ids.1).is_some());
    }
}

/// Scenario 3 (copper paddle-wheel) and scenario 6 (guest separation) are covered as dedicated
/// tests closer to the code that implements them: `graph::clusters`'s
/// `copper_paddlewheel_geometry_yields_a_full_correspondence_clique` and `assembler`'s
/// `guest_water_is_classified_and_merged_back`. Re-deriving idealized paddle-wheel and host/guest
/// geometry here would just duplicate those fixtures under a different name.
#[test]
fn benzene_fixture_has_no_leftover_special_flags() {
    // `run_benzene_topology` runs cluster detection too; a pure-organic ring should never pick up
    // an inorganic-cluster special flag.
    let mut graph = benzene_graph();
    run_benzene_topology(&mut graph);
    assert!(graph.atoms.iter().all(|a| a.special_flag.is_none()));
}
