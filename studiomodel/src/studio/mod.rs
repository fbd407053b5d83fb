pub mod flags;
pub mod material;
pub mod mdl;
pub mod vtx;
pub mod vtx_headers;

#[cfg(test)]
pub(crate) mod fixture;

pub use material::MaterialCorrelator;
pub use mdl::{SkeletonBodyPart, SkeletonMesh, SkeletonModel};
pub use vtx::{Decoder, Vtx};
