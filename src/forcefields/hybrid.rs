//! Hybrid force-field combinator: applies UFF or DREIDING per fragment, chosen by a caller-supplied
//! per-molecule-type override map, defaulting to UFF.
//!
//! Grounded on `original_source/lammps_interface/MOFFF.py`, which dispatches a metal-organic
//! framework's node/linker fragments between its UFF and DREIDING implementations by a
//! user-supplied mapping rather than any structural heuristic; this crate keeps that same
//! "explicit mapping, UFF default" policy.

use std::collections::HashMap;

use crate::core::error::Diagnostics;
use crate::graph::MolecularGraph;

use super::{dreiding, uff};

/// The force field selected for one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceFieldKind {
    Uff,
    Dreiding,
}

impl Default for ForceFieldKind {
    fn default() -> Self {
        ForceFieldKind::Uff
    }
}

/// Runs the force field selected for `molecule_type` (falling back to [`ForceFieldKind::Uff`] when
/// `overrides` has no entry for it) over `graph`.
pub fn apply(
    graph: &mut MolecularGraph,
    molecule_type: &str,
    overrides: &HashMap<String, ForceFieldKind>,
    hydrogen_bonding_enabled: bool,
    diagnostics: &mut Diagnostics,
) -> ForceFieldKind {
    let kind = overrides.get(molecule_type).copied().unwrap_or_default();
    match kind {
        ForceFieldKind::Uff => uff::apply(graph, diagnostics),
        ForceFieldKind::Dreiding => dreiding::apply(graph, diagnostics, hydrogen_bonding_enabled),
    }
    kind
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BondOrder, Cell, Element};

    #[test]
    fn unmapped_molecule_type_defaults_to_uff() {
        let mut graph = MolecularGraph::new();
        graph.set_cell(Cell::identity());
        let a = graph.add_atom(Element::H, [0.0, 0.0, 0.0]);
        let b = graph.add_atom(Element::H, [0.74, 0.0, 0.0]);
        graph.add_bond_raw(a, b, BondOrder::Single, 0.74, ".".into()).unwrap();

        let mut diagnostics = Diagnostics::default();
        let overrides = HashMap::new();
        let kind = apply(&mut graph, "framework", &overrides, false, &mut diagnostics);
        assert_eq!(kind, ForceFieldKind::Uff);
    }

    #[test]
    fn mapped_molecule_type_runs_dreiding() {
        let mut graph = MolecularGraph::new();
        graph.set_cell(Cell::identity());
        let o = graph.add_atom(Element::O, [0.0, 0.0, 0.0]);
        let h = graph.add_atom(Element::H, [0.96, 0.0, 0.0]);
        graph.add_bond_raw(o, h, BondOrder::Single, 0.96, ".".into()).unwrap();

        let mut diagnostics = Diagnostics::default();
        let mut overrides = HashMap::new();
        overrides.insert("guest_water".to_string(), ForceFieldKind::Dreiding);
        let kind = apply(&mut graph, "guest_water", &overrides, true, &mut diagnostics);
        assert_eq!(kind, ForceFieldKind::Dreiding);
        assert_eq!(graph.atom(h).unwrap().label.as_deref(), Some("H__HB"));
    }
}
