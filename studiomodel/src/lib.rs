//! Decoders for the compiled studio model formats of the Source engine.
//!
//! [`studio::Vtx`] decodes the hardware optimised strip data (.vtx) and
//! [`studio::MaterialCorrelator`] maps its meshes to materials of the matching
//! .mdl body part hierarchy.

#[macro_use]
pub mod binaries;
pub mod error;
pub mod level;
pub mod prelude;
pub mod studio;
pub mod trace;
