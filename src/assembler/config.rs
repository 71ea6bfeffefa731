//! Non-interactive configuration for an assembler run, loaded from an optional TOML file.
//!
//! Grounded on the teacher's `rules::Rule`/`Conditions` TOML-deserialization idiom (`serde` +
//! `toml`, `deny_unknown_fields`, built-in defaults standing in for a `LazyLock`-backed default
//! table), generalized from a condition-matching rule set to a flat override record since this
//! crate's typing is formula-driven per force field rather than rule-matched. Replaces the
//! original's interactive per-molecule-type prompts entirely, per `SPEC_FULL.md` §9.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::core::error::{IoError, XtalffError};
use crate::forcefields::hybrid::ForceFieldKind;

/// The non-bonded cutoff (Å) used to size the minimum supercell when no override is supplied.
pub const DEFAULT_CUTOFF: f64 = 12.5;

/// Per-run overrides for the assembler pipeline: which force field each molecule type gets, the
/// default hydrogen-bonding policy, the non-bonded cutoff, and whether to dump the pre-typed
/// graph as a debug crystallographic file instead of (or alongside) the MD output.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AssemblerConfig {
    /// Keyed by molecule-type label (`"framework"` for the non-split residual graph, or a
    /// `guest_<n>` label assigned in first-seen order during step 4's classification).
    pub force_field_overrides: HashMap<String, ForceFieldKind>,
    pub hydrogen_bonding: bool,
    pub cutoff: f64,
    pub debug_dump: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        AssemblerConfig {
            force_field_overrides: HashMap::new(),
            hydrogen_bonding: false,
            cutoff: DEFAULT_CUTOFF,
            debug_dump: false,
        }
    }
}

impl AssemblerConfig {
    /// Loads a config from `path` if given, otherwise returns the built-in defaults (UFF
    /// everywhere, no hydrogen bonding, a 12.5 Å cutoff), per `SPEC_FULL.md` §4.4 step 0.
    pub fn load(path: Option<&Path>) -> Result<AssemblerConfig, XtalffError> {
        let Some(path) = path else { return Ok(AssemblerConfig::default()) };
        let text = std::fs::read_to_string(path).map_err(|source| IoError::Open { path: path.display().to_string(), source })?;
        toml::from_str(&text)
            .map_err(|e| IoError::InputParse { line: 1, message: format!("invalid config file: {e}") }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_path_yields_built_in_defaults() {
        let config = AssemblerConfig::load(None).unwrap();
        assert!(config.force_field_overrides.is_empty());
        assert!(!config.hydrogen_bonding);
        assert_eq!(config.cutoff, DEFAULT_CUTOFF);
    }

    #[test]
    fn parses_a_minimal_toml_override() {
        let dir = std::env::temp_dir();
        let path = dir.join("xtalff_test_config_minimal.toml");
        std::fs::write(&path, "cutoff = 15.0\nhydrogen_bonding = true\n\n[force_field_overrides]\nguest_0 = \"dreiding\"\n").unwrap();
        let config = AssemblerConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.cutoff, 15.0);
        assert!(config.hydrogen_bonding);
        assert_eq!(config.force_field_overrides.get("guest_0"), Some(&ForceFieldKind::Dreiding));
    }
}
