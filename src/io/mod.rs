//! Text I/O at the boundaries of the pipeline: a permissive crystallographic-file reader and a
//! plain LAMMPS-style data/control file writer, per `SPEC_FULL.md` §6's "minimal, honest
//! implementation at the interface boundary" — neither module attempts to be a general-purpose
//! implementation of its format.

pub mod reader;
pub mod writer;
