//! Global type unification: the final assembler step that walks every topological term kind once
//! more and collapses terms sharing a functional form, parameters, and atom-type signature onto a
//! single 1-based type index, per `SPEC_FULL.md` §4.4 step 8.

pub mod dedup;

pub use dedup::{assign_all_type_indices, TypeCounts};
