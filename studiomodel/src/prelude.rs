pub use crate::error::{Result, VtxError};
pub use crate::level::{Level, NodePath};
pub use crate::studio::{
    flags::{MeshFlags, StripFlags, StripGroupFlags},
    vtx::{
        BodyPart, BoneStateChange, Mesh, Model, ModelLod, Strip, StripGroup, Vertex, VtxHeader,
        VtxStats,
    },
    vtx::READ_LIMIT_FACTOR,
    Decoder, MaterialCorrelator, SkeletonBodyPart, SkeletonMesh, SkeletonModel, Vtx,
};
pub use crate::trace::{LogTrace, TraceEvent, TraceLog, TraceSink};
