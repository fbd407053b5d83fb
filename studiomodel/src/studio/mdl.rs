// The body part hierarchy of an .mdl, as handed over by whatever decoded the
// mdl. Only the material index of each mesh is needed here.
//
// mstudiobodyparts_t -> mstudiomodel_t -> mstudiomesh_t

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkeletonBodyPart {
    pub name: String,
    pub models: Vec<SkeletonModel>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkeletonModel {
    pub name: String,
    pub meshes: Vec<SkeletonMesh>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SkeletonMesh {
    /// Index into the mdl's texture table.
    pub material: i32,
}

impl SkeletonBodyPart {
    pub fn new(name: impl Into<String>, models: Vec<SkeletonModel>) -> Self {
        Self {
            name: name.into(),
            models,
        }
    }
}

impl SkeletonModel {
    pub fn new(name: impl Into<String>, materials: &[i32]) -> Self {
        Self {
            name: name.into(),
            meshes: materials
                .iter()
                .map(|&material| SkeletonMesh { material })
                .collect(),
        }
    }
}
