//! Force-field typing engines: UFF, DREIDING, a hybrid combinator over both, and the shared static
//! constant tables and pair-term mixing they depend on.

pub mod dreiding;
pub mod hybrid;
pub mod pairs;
pub mod tables;
pub mod uff;
