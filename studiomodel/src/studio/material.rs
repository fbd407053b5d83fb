use crate::{
    error::{Result, VtxError},
    level::{Level, NodePath},
};

use super::{mdl::SkeletonBodyPart, vtx::Vtx};

/// Looks up the material of a vtx mesh in the mdl's body part hierarchy.
///
/// The vtx stores no materials. Mesh `k` of model `m` of body part `p` in any
/// LOD uses the material of the mdl mesh at the same coordinate.
#[derive(Copy, Clone, Debug)]
pub struct MaterialCorrelator<'a> {
    body_parts: &'a [SkeletonBodyPart],
}

fn get<T>(items: &[T], index: usize, dimension: Level) -> Result<&T> {
    items.get(index).ok_or(VtxError::IndexOutOfRange {
        dimension,
        index,
        count: items.len(),
    })
}

fn check(level: Level, path: NodePath, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        return Ok(());
    }
    let err = VtxError::ShapeMismatch {
        level,
        path,
        expected,
        found,
    };
    log::warn!("{err}");
    Err(err)
}

impl<'a> MaterialCorrelator<'a> {
    /// Trusts that `body_parts` describes the same model as the vtx the
    /// coordinates will come from.
    pub fn new(body_parts: &'a [SkeletonBodyPart]) -> Self {
        Self { body_parts }
    }

    /// Checks that `body_parts` has the shape of `vtx` first: the same number
    /// of body parts, models per body part, and meshes per model in every LOD.
    pub fn checked(body_parts: &'a [SkeletonBodyPart], vtx: &Vtx) -> Result<Self> {
        check(
            Level::BodyPart,
            NodePath::ROOT,
            body_parts.len(),
            vtx.body_parts.len(),
        )?;
        for (p, (part, vtx_part)) in body_parts.iter().zip(&vtx.body_parts).enumerate() {
            let path = NodePath::ROOT.child(p);
            check(Level::Model, path, part.models.len(), vtx_part.models.len())?;

            for (m, (model, vtx_model)) in part.models.iter().zip(&vtx_part.models).enumerate() {
                let path = path.child(m);
                for (l, lod) in vtx_model.lods.iter().enumerate() {
                    check(
                        Level::Mesh,
                        path.child(l),
                        model.meshes.len(),
                        lod.meshes.len(),
                    )?;
                }
            }
        }
        Ok(Self { body_parts })
    }

    pub fn material_index(&self, body_part: usize, model: usize, mesh: usize) -> Result<i32> {
        let part = get(self.body_parts, body_part, Level::BodyPart)?;
        let model = get(&part.models, model, Level::Model)?;
        Ok(get(&model.meshes, mesh, Level::Mesh)?.material)
    }

    /// Every mesh's material, body part major, then model, then mesh.
    pub fn all_material_indices(&self) -> Vec<i32> {
        self.body_parts
            .iter()
            .flat_map(|p| &p.models)
            .flat_map(|m| &m.meshes)
            .map(|mesh| mesh.material)
            .collect()
    }
}
