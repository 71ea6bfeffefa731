//! Shared blueprint + runner harness for end-to-end scenarios, generalized from the teacher's
//! `AtomBlueprint`/`InputBondBlueprint`/`MoleculeTestCase`/`run_molecule_test_case` pattern to
//! carry a periodic [`Cell`] and Cartesian coordinates instead of a bare connectivity graph.

#[path = "cases/mod.rs"]
pub mod cases;

use std::collections::HashMap;

use xtalff::core::error::Diagnostics;
use xtalff::core::{BondOrder, Cell, Element};
use xtalff::forcefields::uff;
use xtalff::graph::{bond_order, bonding, clusters, hybridization, terms, MolecularGraph};

pub struct AtomBlueprint {
    pub label: &'static str,
    pub element: Element,
    pub cart: [f64; 3],
}

pub struct InputBondBlueprint {
    pub atom1_label: &'static str,
    pub atom2_label: &'static str,
    pub order: BondOrder,
}

pub struct MoleculeTestCase {
    pub name: &'static str,
    pub cell_params: (f64, f64, f64, f64, f64, f64),
    pub atoms: &'static [AtomBlueprint],
    /// Explicit bonds. Leave empty to exercise `compute_bonding`'s inference path instead.
    pub bonds: &'static [InputBondBlueprint],
}

pub struct LabeledMolecule {
    pub graph: MolecularGraph,
    labels: HashMap<&'static str, usize>,
}

impl LabeledMolecule {
    pub fn id(&self, label: &'static str) -> usize {
        *self
            .labels
            .get(label)
            .unwrap_or_else(|| panic!("Unknown atom label: {}", label))
    }
}

/// Builds the graph described by `case`, wiring any explicit bonds. Does not run bonding
/// inference or topology perception; callers chain [`run_topology_pipeline`] for that.
pub fn build_from_blueprint(case: &MoleculeTestCase) -> LabeledMolecule {
    let (a, b, c, alpha, beta, gamma) = case.cell_params;
    let cell = Cell::from_params(a, b, c, alpha, beta, gamma)
        .unwrap_or_else(|err| panic!("Molecule '{}': invalid cell: {:?}", case.name, err));

    let mut graph = MolecularGraph::new();
    graph.set_cell(cell);
    let mut labels = HashMap::new();

    for atom_bp in case.atoms {
        let id = graph.add_atom(atom_bp.element, atom_bp.cart);
        if labels.insert(atom_bp.label, id).is_some() {
            panic!("Molecule '{}': duplicate atom label '{}'", case.name, atom_bp.label);
        }
    }

    for bond_bp in case.bonds {
        let id1 = *labels
            .get(bond_bp.atom1_label)
            .unwrap_or_else(|| panic!("Label '{}' not found", bond_bp.atom1_label));
        let id2 = *labels
            .get(bond_bp.atom2_label)
            .unwrap_or_else(|| panic!("Label '{}' not found", bond_bp.atom2_label));
        graph
            .add_bond_raw(id1, id2, bond_bp.order, 0.0, ".".into())
            .unwrap_or_else(|err| panic!("Molecule '{}': {:?}", case.name, err));
    }

    LabeledMolecule { graph, labels }
}

/// Runs the full non-typing topology pipeline the assembler runs between reading a structure and
/// applying a force field: bonding (inference or length/flag recomputation), hybridization,
/// aromaticity, bond-order refinement, term enumeration, and cluster detection.
pub fn run_topology_pipeline(molecule: &mut LabeledMolecule) {
    bonding::compute_bonding(&mut molecule.graph, 0.9)
        .expect("bonding inference should succeed for these fixtures");
    hybridization::assign_initial_hybridization(&mut molecule.graph);
    hybridization::perceive_aromaticity(&mut molecule.graph);
    bond_order::refine_bond_orders(&mut molecule.graph);
    terms::enumerate_terms(&mut molecule.graph);
    clusters::detect_clusters(&mut molecule.graph);
}

/// Runs UFF typing over an already-perceived molecule and returns the accumulated diagnostics.
pub fn run_uff(molecule: &mut LabeledMolecule) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    uff::apply(&mut molecule.graph, &mut diagnostics);
    diagnostics
}
