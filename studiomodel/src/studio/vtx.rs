use flagset::FlagSet;

use crate::{
    binaries::{BinArray, BinaryData, ByteReader},
    error::{Result, VtxError},
    level::{Level, NodePath},
    trace::{TraceEvent, TraceSink},
};

use super::{
    flags::{self, MeshFlags, StripFlags, StripGroupFlags},
    vtx_headers::{
        BodyPartHeader, BoneStateChangeRecord, FileHeader, MeshHeader, ModelHeader,
        ModelLodHeader, StripGroupHeader, StripHeader, VertexRecord, MAX_NUM_BONES_PER_VERT,
        VTX_VERSION,
    },
};

/// A decoded .vtx file.
///
/// Built in one pass by [`Vtx::decode`] and never modified afterwards. Every
/// node keeps the absolute address it was read from.
#[derive(Clone, Debug, PartialEq)]
pub struct Vtx {
    pub header: VtxHeader,
    pub body_parts: Vec<BodyPart>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VtxHeader {
    pub version: i32,
    pub vert_cache_size: i32,
    pub max_bones_per_strip: u16,
    pub max_bones_per_tri: u16,
    pub max_bones_per_vert: i32,
    pub num_lods: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BodyPart {
    pub address: usize,
    pub models: Vec<Model>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    pub address: usize,
    pub lods: Vec<ModelLod>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelLod {
    pub address: usize,
    pub switch_point: f32,
    pub meshes: Vec<Mesh>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub address: usize,
    pub flags: FlagSet<MeshFlags>,
    pub raw_flags: u8,
    pub strip_groups: Vec<StripGroup>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StripGroup {
    pub address: usize,
    pub flags: FlagSet<StripGroupFlags>,
    pub raw_flags: u8,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
    pub strips: Vec<Strip>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Strip {
    pub address: usize,
    pub num_indices: i32,
    pub index_offset: i32,
    pub num_verts: i32,
    pub vert_offset: i32,
    pub num_bones: i16,
    pub flags: FlagSet<StripFlags>,
    pub raw_flags: u8,
    pub bone_state_changes: Vec<BoneStateChange>,
}

/// Skinning information for one strip group vertex. The position and the
/// rest of the geometry live in the .vvd at `orig_mesh_vert_id`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Vertex {
    pub bone_weight_index: [u8; 3],
    pub num_bones: u8,
    pub orig_mesh_vert_id: u16,
    pub bone_id: [i8; 3],
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoneStateChange {
    pub hardware_id: i32,
    pub new_bone_id: i32,
}

impl From<VertexRecord> for Vertex {
    fn from(v: VertexRecord) -> Self {
        Self {
            bone_weight_index: v.bone_weight_index,
            num_bones: v.num_bones,
            orig_mesh_vert_id: v.orig_mesh_vert_id,
            bone_id: v.bone_id,
        }
    }
}

impl From<BoneStateChangeRecord> for BoneStateChange {
    fn from(b: BoneStateChangeRecord) -> Self {
        Self {
            hardware_id: b.hardware_id,
            new_bone_id: b.new_bone_id,
        }
    }
}

impl Vertex {
    fn bones(&self) -> usize {
        (self.num_bones as usize).min(MAX_NUM_BONES_PER_VERT)
    }

    pub fn bone_ids(&self) -> &[i8] {
        &self.bone_id[..self.bones()]
    }

    pub fn bone_weight_indices(&self) -> &[u8] {
        &self.bone_weight_index[..self.bones()]
    }
}

impl Strip {
    pub fn is_tri_list(&self) -> bool {
        self.flags.contains(StripFlags::IsTriList)
    }

    pub fn is_tri_strip(&self) -> bool {
        self.flags.contains(StripFlags::IsTriStrip)
    }
}

fn sub_range<T>(items: &[T], offset: i32, count: i32) -> Option<&[T]> {
    let start = usize::try_from(offset).ok()?;
    let count = usize::try_from(count).ok()?;
    items.get(start..start.checked_add(count)?)
}

impl StripGroup {
    /// The strip's slice of this group's index array, if it fits.
    pub fn strip_indices(&self, strip: &Strip) -> Option<&[u16]> {
        sub_range(&self.indices, strip.index_offset, strip.num_indices)
    }

    /// The strip's slice of this group's vertex array, if it fits.
    pub fn strip_vertices(&self, strip: &Strip) -> Option<&[Vertex]> {
        sub_range(&self.vertices, strip.vert_offset, strip.num_verts)
    }

    /// Every triangle of the group as indices into [`StripGroup::vertices`].
    ///
    /// Strips whose range does not fit the group are skipped, as are
    /// degenerate triangles of triangle strips.
    pub fn triangles(&self) -> Vec<[u16; 3]> {
        let mut tris = Vec::new();
        for strip in &self.strips {
            let Some(indices) = self.strip_indices(strip) else {
                log::warn!(
                    "strip at {} indexes {}..+{} past {} indices",
                    strip.address,
                    strip.index_offset,
                    strip.num_indices,
                    self.indices.len()
                );
                continue;
            };
            if strip.is_tri_strip() && !strip.is_tri_list() {
                for (i, w) in indices.windows(3).enumerate() {
                    let tri = if i % 2 == 0 {
                        [w[0], w[1], w[2]]
                    } else {
                        [w[1], w[0], w[2]]
                    };
                    if tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2] {
                        tris.push(tri);
                    }
                }
            } else {
                tris.extend(indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]));
            }
        }
        tris
    }
}

/// Number of nodes at each level of a decoded tree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct VtxStats {
    pub body_parts: usize,
    pub models: usize,
    pub lods: usize,
    pub meshes: usize,
    pub strip_groups: usize,
    pub strips: usize,
    pub vertices: usize,
    pub indices: usize,
    pub bone_state_changes: usize,
}

impl Vtx {
    /// Decodes a complete vtx file held in memory.
    pub fn decode(data: &[u8]) -> Result<Vtx> {
        Decoder::new().decode(data)
    }

    pub fn lod(&self, body_part: usize, model: usize, lod: usize) -> Option<&ModelLod> {
        self.body_parts
            .get(body_part)?
            .models
            .get(model)?
            .lods
            .get(lod)
    }

    pub fn stats(&self) -> VtxStats {
        let mut stats = VtxStats {
            body_parts: self.body_parts.len(),
            ..Default::default()
        };
        for model in self.body_parts.iter().flat_map(|b| &b.models) {
            stats.models += 1;
            for lod in &model.lods {
                stats.lods += 1;
                for mesh in &lod.meshes {
                    stats.meshes += 1;
                    for group in &mesh.strip_groups {
                        stats.strip_groups += 1;
                        stats.strips += group.strips.len();
                        stats.vertices += group.vertices.len();
                        stats.indices += group.indices.len();
                        stats.bone_state_changes += group
                            .strips
                            .iter()
                            .map(|s| s.bone_state_changes.len())
                            .sum::<usize>();
                    }
                }
            }
        }
        stats
    }
}

/// Multiple of the file length that a decode may read in total. Tables are
/// only ever read more than once when records share them.
pub const READ_LIMIT_FACTOR: usize = 4;

/// Decode settings: an optional trace sink and a limit on the total number of
/// record bytes a decode may read.
#[derive(Default)]
pub struct Decoder<'t> {
    trace: Option<&'t mut dyn TraceSink>,
    read_limit: Option<usize>,
}

impl<'t> Decoder<'t> {
    pub fn new() -> Self {
        Self {
            trace: None,
            read_limit: None,
        }
    }

    pub fn with_trace(mut self, trace: &'t mut dyn TraceSink) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Overrides the default limit of [`READ_LIMIT_FACTOR`] times the file length.
    pub fn with_read_limit(mut self, bytes: usize) -> Self {
        self.read_limit = Some(bytes);
        self
    }

    pub fn decode(self, data: &[u8]) -> Result<Vtx> {
        let limit = self
            .read_limit
            .unwrap_or_else(|| data.len().saturating_mul(READ_LIMIT_FACTOR));
        let mut resolver = Resolver {
            reader: ByteReader::new(data),
            trace: self.trace,
            limit,
            read: 0,
        };
        let vtx = resolver.vtx()?;
        log::debug!(
            "decoded vtx of {} bytes reading {} record bytes: {:?}",
            data.len(),
            resolver.read,
            vtx.stats()
        );
        Ok(vtx)
    }
}

/// Walks the tree. Every step takes the absolute address of the record that
/// owns a table and resolves the table against that address.
struct Resolver<'a, 't> {
    reader: ByteReader<'a>,
    trace: Option<&'t mut dyn TraceSink>,
    limit: usize,
    /// Record bytes read so far, the header excluded.
    read: usize,
}

impl<'a, 't> Resolver<'a, 't> {
    fn emit(&mut self, event: TraceEvent) {
        if let Some(trace) = self.trace.as_deref_mut() {
            trace.event(&event);
        }
    }

    fn header(&mut self) -> Result<FileHeader> {
        let len = self.reader.len();
        let header: FileHeader = self.reader.read_scalar(0).map_err(|_| {
            self.emit(TraceEvent::BoundViolated {
                level: Level::Header,
                path: NodePath::ROOT,
                address: 0,
                size: FileHeader::WIRE_SIZE as i64,
                len,
            });
            VtxError::MalformedHeader {
                field: "length",
                value: len as i64,
                reason: format!("shorter than the {} byte header", FileHeader::WIRE_SIZE),
            }
        })?;

        let version = header.version;
        if version != VTX_VERSION {
            return Err(VtxError::UnsupportedVersion {
                found: version,
                expected: VTX_VERSION,
            });
        }

        let num_lods = header.num_lods;
        if num_lods < 0 {
            return Err(VtxError::MalformedHeader {
                field: "num_lods",
                value: num_lods as i64,
                reason: "negative count".to_owned(),
            });
        }

        let num_body_parts = header.body_parts.count;
        if num_body_parts < 0 {
            return Err(VtxError::MalformedHeader {
                field: "num_body_parts",
                value: num_body_parts as i64,
                reason: "negative count".to_owned(),
            });
        }

        let body_part_offset = header.body_parts.resolve(0);
        let size = num_body_parts as i64 * BodyPartHeader::WIRE_SIZE as i64;
        if let Err(e) = self.reader.validate(body_part_offset, size) {
            self.emit(TraceEvent::BoundViolated {
                level: Level::BodyPart,
                path: NodePath::ROOT,
                address: body_part_offset,
                size,
                len,
            });
            return Err(VtxError::MalformedHeader {
                field: "body_part_offset",
                value: body_part_offset,
                reason: format!("{num_body_parts} body parts: {e}"),
            });
        }

        Ok(header)
    }

    /// Reads the table described by `array`, which is stored in the record at
    /// `owner` (an absolute address) identified by `path`.
    fn table<T: BinaryData>(
        &mut self,
        path: NodePath,
        owner: i64,
        array: BinArray<T>,
    ) -> Result<Vec<(i64, T)>> {
        let count = array.count;
        self.emit(TraceEvent::CountRead {
            level: T::LEVEL,
            path,
            count,
        });
        let address = array.resolve(owner);
        let size = count as i64 * T::WIRE_SIZE as i64;

        if count < 0 {
            self.violated::<T>(path, address, size);
            return Err(VtxError::NegativeCount {
                level: T::LEVEL,
                path,
                count: count as i64,
            });
        }

        self.emit(TraceEvent::AddressResolved {
            level: T::LEVEL,
            path,
            address,
        });

        let records = match self.reader.read_records::<T>(address, count as i64) {
            Ok(records) => records,
            Err(e) => {
                let err = VtxError::from_read(e, T::LEVEL, path, address, T::WIRE_SIZE);
                // Out of bounds reads name the first entry that does not fit.
                let (at, bytes) = match err {
                    VtxError::OffsetOutOfBounds { address, size, .. } => (address, size),
                    _ => (address, size),
                };
                self.violated::<T>(path, at, bytes);
                return Err(err);
            }
        };

        self.read = self.read.saturating_add(records.len() * T::WIRE_SIZE);
        if self.read > self.limit {
            log::warn!(
                "{path}: {} table at {address} reads {} bytes in total, past {}",
                T::LEVEL,
                self.read,
                self.limit
            );
            return Err(VtxError::ReadLimitExceeded {
                level: T::LEVEL,
                path,
                limit: self.limit,
            });
        }
        Ok(records)
    }

    fn violated<T: BinaryData>(&mut self, path: NodePath, address: i64, size: i64) {
        let len = self.reader.len();
        self.emit(TraceEvent::BoundViolated {
            level: T::LEVEL,
            path,
            address,
            size,
            len,
        });
    }

    fn values<T: BinaryData, U: From<T>>(
        &mut self,
        path: NodePath,
        owner: i64,
        array: BinArray<T>,
    ) -> Result<Vec<U>> {
        Ok(self
            .table(path, owner, array)?
            .into_iter()
            .map(|(_, v)| U::from(v))
            .collect())
    }

    fn vtx(&mut self) -> Result<Vtx> {
        let header = self.header()?;

        let mut body_parts = Vec::new();
        for (i, (address, record)) in self
            .table(NodePath::ROOT, 0, header.body_parts)?
            .into_iter()
            .enumerate()
        {
            body_parts.push(self.body_part(NodePath::ROOT.child(i), address, record)?);
        }

        Ok(Vtx {
            header: VtxHeader {
                version: header.version,
                vert_cache_size: header.vert_cache_size,
                max_bones_per_strip: header.max_bones_per_strip,
                max_bones_per_tri: header.max_bones_per_tri,
                max_bones_per_vert: header.max_bones_per_vert,
                num_lods: header.num_lods,
            },
            body_parts,
        })
    }

    fn body_part(&mut self, path: NodePath, address: i64, record: BodyPartHeader) -> Result<BodyPart> {
        let mut models = Vec::new();
        for (i, (model_address, model)) in self
            .table(path, address, record.models)?
            .into_iter()
            .enumerate()
        {
            models.push(self.model(path.child(i), model_address, model)?);
        }
        Ok(BodyPart {
            address: address as usize,
            models,
        })
    }

    fn model(&mut self, path: NodePath, address: i64, record: ModelHeader) -> Result<Model> {
        let mut lods = Vec::new();
        for (i, (lod_address, lod)) in self
            .table(path, address, record.lods)?
            .into_iter()
            .enumerate()
        {
            lods.push(self.lod(path.child(i), lod_address, lod)?);
        }
        Ok(Model {
            address: address as usize,
            lods,
        })
    }

    fn lod(&mut self, path: NodePath, address: i64, record: ModelLodHeader) -> Result<ModelLod> {
        let mut meshes = Vec::new();
        for (i, (mesh_address, mesh)) in self
            .table(path, address, record.meshes)?
            .into_iter()
            .enumerate()
        {
            meshes.push(self.mesh(path.child(i), mesh_address, mesh)?);
        }
        Ok(ModelLod {
            address: address as usize,
            switch_point: record.switch_point,
            meshes,
        })
    }

    fn mesh(&mut self, path: NodePath, address: i64, record: MeshHeader) -> Result<Mesh> {
        let mut strip_groups = Vec::new();
        for (i, (group_address, group)) in self
            .table(path, address, record.strip_groups)?
            .into_iter()
            .enumerate()
        {
            strip_groups.push(self.strip_group(path.child(i), group_address, group)?);
        }
        Ok(Mesh {
            address: address as usize,
            flags: flags::known(record.flags),
            raw_flags: record.flags,
            strip_groups,
        })
    }

    // Vertices, indices and strips are siblings, each resolved against the
    // strip group's own address.
    fn strip_group(
        &mut self,
        path: NodePath,
        address: i64,
        record: StripGroupHeader,
    ) -> Result<StripGroup> {
        let vertices = self.values::<VertexRecord, Vertex>(path, address, record.verts)?;
        let indices = self.values::<u16, u16>(path, address, record.indices)?;

        let mut strips = Vec::new();
        for (i, (strip_address, strip)) in self
            .table(path, address, record.strips)?
            .into_iter()
            .enumerate()
        {
            strips.push(self.strip(path.child(i), strip_address, strip)?);
        }

        Ok(StripGroup {
            address: address as usize,
            flags: flags::known(record.flags),
            raw_flags: record.flags,
            vertices,
            indices,
            strips,
        })
    }

    fn strip(&mut self, path: NodePath, address: i64, record: StripHeader) -> Result<Strip> {
        let bone_state_changes = self.values(path, address, record.bone_state_changes)?;
        Ok(Strip {
            address: address as usize,
            num_indices: record.num_indices,
            index_offset: record.index_offset,
            num_verts: record.num_verts,
            vert_offset: record.vert_offset,
            num_bones: record.num_bones,
            flags: flags::known(record.flags),
            raw_flags: record.flags,
            bone_state_changes,
        })
    }
}
