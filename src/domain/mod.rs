//! Domain logic and core data structures
//!
//! Pure plan data, the compiled-in section templates and page geometry.
//! Nothing here performs I/O.

pub mod core;
pub mod plan;
pub mod template;
