// VTX
//
// The .vtx files next to an .mdl hold Source's hardware optimised strip data:
// for every LOD of every model of every body part, the meshes are split into
// strip groups that carry their own vertex and index buffers plus the strips
// that draw them. The renderer specific extension (.dx90.vtx, .dx80.vtx,
// .sw.vtx) does not change the layout.
//
// Every table in the file is described by a (count, offset) pair, and every
// offset is relative to the address of the record holding the pair. Only the
// header's body part offset is effectively absolute, because the header sits
// at address 0.
//
// None of these records are padded on disk. A mesh header is 9 bytes and a
// strip group header 25, even though a C compiler would round both up.

use crate::{
    binaries::{f32_from_le, BinArray, BinaryData},
    level::Level,
};

/// Version written by studiomdl (OPTIMIZED_MODEL_FILE_VERSION).
pub const VTX_VERSION: i32 = 7;

pub const MAX_NUM_BONES_PER_VERT: usize = 3;

// Header
#[repr(C, packed)]
#[derive(Copy, Clone, Debug, bytemuck::Zeroable, bytemuck::Pod)]
pub struct FileHeader {
    pub version: i32,

    // hardware params that affect how the model is to be optimized.
    pub vert_cache_size: i32,
    pub max_bones_per_strip: u16,
    pub max_bones_per_tri: u16,
    pub max_bones_per_vert: i32,

    // Also specified in each ModelHeader
    pub num_lods: i32,

    pub body_parts: BinArray<BodyPartHeader>,
}

impl BinaryData for FileHeader {
    const WIRE_SIZE: usize = 28;
    const LEVEL: Level = Level::Header;

    fn to_host(self) -> Self {
        Self {
            version: i32::from_le(self.version),
            vert_cache_size: i32::from_le(self.vert_cache_size),
            max_bones_per_strip: u16::from_le(self.max_bones_per_strip),
            max_bones_per_tri: u16::from_le(self.max_bones_per_tri),
            max_bones_per_vert: i32::from_le(self.max_bones_per_vert),
            num_lods: i32::from_le(self.num_lods),
            body_parts: self.body_parts.to_host(),
        }
    }
}

// Body array
//     Size: num_body_parts.
//     Location: body_part_offset, from the start of the file.
#[repr(C, packed)]
#[derive(Copy, Clone, Debug, bytemuck::Zeroable, bytemuck::Pod)]
pub struct BodyPartHeader {
    pub models: BinArray<ModelHeader>,
}

impl BinaryData for BodyPartHeader {
    const WIRE_SIZE: usize = 8;
    const LEVEL: Level = Level::BodyPart;

    fn to_host(self) -> Self {
        Self {
            models: self.models.to_host(),
        }
    }
}

// Maps one to one with the models of the matching body part in the mdl.
#[repr(C, packed)]
#[derive(Copy, Clone, Debug, bytemuck::Zeroable, bytemuck::Pod)]
pub struct ModelHeader {
    pub lods: BinArray<ModelLodHeader>,
}

impl BinaryData for ModelHeader {
    const WIRE_SIZE: usize = 8;
    const LEVEL: Level = Level::Model;

    fn to_host(self) -> Self {
        Self {
            lods: self.lods.to_host(),
        }
    }
}

#[repr(C, packed)]
#[derive(Copy, Clone, Debug, bytemuck::Zeroable, bytemuck::Pod)]
pub struct ModelLodHeader {
    pub meshes: BinArray<MeshHeader>,
    // Distance at which the engine switches to this LOD.
    pub switch_point: f32,
}

impl BinaryData for ModelLodHeader {
    const WIRE_SIZE: usize = 12;
    const LEVEL: Level = Level::Lod;

    fn to_host(self) -> Self {
        Self {
            meshes: self.meshes.to_host(),
            switch_point: f32_from_le(self.switch_point),
        }
    }
}

// One per mdl mesh, so one per material.
#[repr(C, packed)]
#[derive(Copy, Clone, Debug, bytemuck::Zeroable, bytemuck::Pod)]
pub struct MeshHeader {
    pub strip_groups: BinArray<StripGroupHeader>,
    pub flags: u8,
}

impl BinaryData for MeshHeader {
    const WIRE_SIZE: usize = 9;
    const LEVEL: Level = Level::Mesh;

    fn to_host(self) -> Self {
        Self {
            strip_groups: self.strip_groups.to_host(),
            flags: self.flags,
        }
    }
}

#[repr(C, packed)]
#[derive(Copy, Clone, Debug, bytemuck::Zeroable, bytemuck::Pod)]
pub struct StripGroupHeader {
    // These are the arrays of all verts and indices for this mesh. Strips index into this.
    pub verts: BinArray<VertexRecord>,
    pub indices: BinArray<u16>,
    pub strips: BinArray<StripHeader>,
    pub flags: u8,
}

impl BinaryData for StripGroupHeader {
    const WIRE_SIZE: usize = 25;
    const LEVEL: Level = Level::StripGroup;

    fn to_host(self) -> Self {
        Self {
            verts: self.verts.to_host(),
            indices: self.indices.to_host(),
            strips: self.strips.to_host(),
            flags: self.flags,
        }
    }
}

// A strip is a piece of a strip group which is divided by bones.
// Its index and vertex offsets count elements into the owning strip group's
// arrays, they are not byte offsets.
#[repr(C, packed)]
#[derive(Copy, Clone, Debug, bytemuck::Zeroable, bytemuck::Pod)]
pub struct StripHeader {
    pub num_indices: i32,
    pub index_offset: i32,

    pub num_verts: i32,
    pub vert_offset: i32,

    pub num_bones: i16,

    pub flags: u8,

    pub bone_state_changes: BinArray<BoneStateChangeRecord>,
}

impl BinaryData for StripHeader {
    const WIRE_SIZE: usize = 27;
    const LEVEL: Level = Level::Strip;

    fn to_host(self) -> Self {
        Self {
            num_indices: i32::from_le(self.num_indices),
            index_offset: i32::from_le(self.index_offset),
            num_verts: i32::from_le(self.num_verts),
            vert_offset: i32::from_le(self.vert_offset),
            num_bones: i16::from_le(self.num_bones),
            flags: self.flags,
            bone_state_changes: self.bone_state_changes.to_host(),
        }
    }
}

#[repr(C, packed)]
#[derive(Copy, Clone, Debug, bytemuck::Zeroable, bytemuck::Pod)]
pub struct BoneStateChangeRecord {
    pub hardware_id: i32,
    pub new_bone_id: i32,
}

impl BinaryData for BoneStateChangeRecord {
    const WIRE_SIZE: usize = 8;
    const LEVEL: Level = Level::BoneStateChange;

    fn to_host(self) -> Self {
        Self {
            hardware_id: i32::from_le(self.hardware_id),
            new_bone_id: i32::from_le(self.new_bone_id),
        }
    }
}

// Nine bytes on disk. Reading these with a padded 10 byte struct corrupts
// every vertex after the first.
#[repr(C, packed)]
#[derive(Copy, Clone, Debug, bytemuck::Zeroable, bytemuck::Pod)]
pub struct VertexRecord {
    // these index into the mesh's vert[orig_mesh_vert_id]'s bones
    pub bone_weight_index: [u8; 3],
    pub num_bones: u8,

    pub orig_mesh_vert_id: u16,

    // for sw skinned verts, these are indices into the global list of bones
    // for hw skinned verts, these are hardware bone indices
    pub bone_id: [i8; 3],
}

impl BinaryData for VertexRecord {
    const WIRE_SIZE: usize = 9;
    const LEVEL: Level = Level::Vertex;

    fn to_host(self) -> Self {
        Self {
            orig_mesh_vert_id: u16::from_le(self.orig_mesh_vert_id),
            ..self
        }
    }
}

assert_wire_size!(FileHeader, 28);
assert_wire_size!(BodyPartHeader, 8);
assert_wire_size!(ModelHeader, 8);
assert_wire_size!(ModelLodHeader, 12);
assert_wire_size!(MeshHeader, 9);
assert_wire_size!(StripGroupHeader, 25);
assert_wire_size!(StripHeader, 27);
assert_wire_size!(BoneStateChangeRecord, 8);
assert_wire_size!(VertexRecord, 9);

#[cfg(test)]
mod vtx_headers_tests {
    use crate::binaries::ByteReader;

    use super::*;

    #[test]
    fn record_sizes_match_the_file_format() {
        assert_eq!(FileHeader::WIRE_SIZE, 28);
        assert_eq!(BodyPartHeader::WIRE_SIZE, 8);
        assert_eq!(ModelHeader::WIRE_SIZE, 8);
        assert_eq!(ModelLodHeader::WIRE_SIZE, 12);
        assert_eq!(MeshHeader::WIRE_SIZE, 9);
        assert_eq!(StripGroupHeader::WIRE_SIZE, 25);
        assert_eq!(StripHeader::WIRE_SIZE, 27);
        assert_eq!(VertexRecord::WIRE_SIZE, 9);
        assert_eq!(<u16 as BinaryData>::WIRE_SIZE, 2);
        assert_eq!(BoneStateChangeRecord::WIRE_SIZE, 8);
    }

    #[test]
    fn mesh_header_has_no_trailing_padding() {
        // Two back to back 9 byte mesh headers.
        let mut data = Vec::new();
        for (count, offset, flags) in [(1i32, 18i32, 0x01u8), (2, 40, 0x02)] {
            data.extend_from_slice(&count.to_le_bytes());
            data.extend_from_slice(&offset.to_le_bytes());
            data.push(flags);
        }
        let reader = ByteReader::new(&data);
        let meshes = reader.read_records::<MeshHeader>(0, 2).unwrap();

        assert_eq!(meshes[1].0, 9);
        let second = meshes[1].1;
        let count = second.strip_groups.count;
        let offset = second.strip_groups.offset;
        let flags = second.flags;
        assert_eq!((count, offset, flags), (2, 40, 0x02));
    }

    #[test]
    fn vertex_fields() {
        let data = [0, 1, 2, 3, 0x34, 0x12, 5, -1i8 as u8, 7];
        let reader = ByteReader::new(&data);
        let v = reader.read_scalar::<VertexRecord>(0).unwrap();
        let VertexRecord {
            bone_weight_index,
            num_bones,
            orig_mesh_vert_id,
            bone_id,
        } = v;
        assert_eq!(bone_weight_index, [0, 1, 2]);
        assert_eq!(num_bones, 3);
        assert_eq!(orig_mesh_vert_id, 0x1234);
        assert_eq!(bone_id, [5, -1, 7]);
    }
}
