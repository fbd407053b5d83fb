//! Builds little-endian vtx buffers for tests and remembers where every record went.

use super::vtx_headers::VTX_VERSION;

#[derive(Clone, Debug)]
pub struct StripDesc {
    pub num_indices: i32,
    pub index_offset: i32,
    pub num_verts: i32,
    pub vert_offset: i32,
    pub flags: u8,
    pub bone_state_changes: usize,
}

#[derive(Clone, Debug)]
pub struct StripGroupDesc {
    pub vertices: usize,
    pub indices: Vec<u16>,
    pub strips: Vec<StripDesc>,
    pub flags: u8,
}

impl StripGroupDesc {
    /// `tris` separate triangles drawn by one triangle list strip.
    pub fn triangles(tris: usize) -> Self {
        let n = tris * 3;
        Self {
            vertices: n,
            indices: (0..n as u16).collect(),
            strips: vec![StripDesc {
                num_indices: n as i32,
                index_offset: 0,
                num_verts: n as i32,
                vert_offset: 0,
                flags: 0x01,
                bone_state_changes: 1,
            }],
            flags: 0x02,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MeshDesc {
    pub flags: u8,
    pub strip_groups: Vec<StripGroupDesc>,
}

impl MeshDesc {
    pub fn new(strip_groups: Vec<StripGroupDesc>) -> Self {
        Self {
            flags: 0,
            strip_groups,
        }
    }
}

pub type LodDesc = Vec<MeshDesc>;
pub type ModelDesc = Vec<LodDesc>;
pub type BodyPartDesc = Vec<ModelDesc>;

/// Absolute addresses of every record, in depth first order.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    pub body_parts: Vec<usize>,
    pub models: Vec<usize>,
    pub lods: Vec<usize>,
    pub meshes: Vec<usize>,
    pub strip_groups: Vec<usize>,
    pub strips: Vec<usize>,
    /// (address, count) of each strip group's vertex table.
    pub vertex_tables: Vec<(usize, usize)>,
}

pub struct Fixture {
    pub bytes: Vec<u8>,
    pub layout: Layout,
}

/// Two body parts of uneven shape with a little geometry in every mesh.
pub fn uneven_tree() -> Vec<BodyPartDesc> {
    let mesh = |groups: &[usize]| {
        MeshDesc::new(
            groups
                .iter()
                .map(|&t| StripGroupDesc::triangles(t))
                .collect(),
        )
    };
    vec![
        vec![
            vec![
                vec![mesh(&[2]), mesh(&[1, 3])],
                vec![mesh(&[1]), mesh(&[1])],
            ],
            vec![vec![mesh(&[4])]],
        ],
        vec![vec![vec![mesh(&[1]), mesh(&[2]), mesh(&[1, 1])]]],
    ]
}

pub fn build(body_parts: &[BodyPartDesc]) -> Fixture {
    let mut w = Writer::default();
    let header = w.alloc(28);
    let num_lods = body_parts
        .iter()
        .flatten()
        .map(|lods| lods.len())
        .max()
        .unwrap_or(0);

    w.put_i32(header, VTX_VERSION);
    w.put_i32(header + 4, 24);
    w.put_u16(header + 8, 53);
    w.put_u16(header + 10, 9);
    w.put_i32(header + 12, 3);
    w.put_i32(header + 16, num_lods as i32);

    let table = w.alloc(8 * body_parts.len());
    w.array(header + 20, body_parts.len(), table, header);
    for (i, models) in body_parts.iter().enumerate() {
        w.body_part(table + 8 * i, models);
    }

    Fixture {
        bytes: w.bytes,
        layout: w.layout,
    }
}

#[derive(Default)]
struct Writer {
    bytes: Vec<u8>,
    layout: Layout,
    next_vertex_id: u16,
}

impl Writer {
    fn alloc(&mut self, size: usize) -> usize {
        let at = self.bytes.len();
        self.bytes.resize(at + size, 0);
        at
    }

    fn put_i32(&mut self, at: usize, v: i32) {
        self.bytes[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }

    fn put_u16(&mut self, at: usize, v: u16) {
        self.bytes[at..at + 2].copy_from_slice(&v.to_le_bytes());
    }

    /// Writes a (count, offset) pair at `at`, with the offset relative to `record`.
    fn array(&mut self, at: usize, count: usize, table: usize, record: usize) {
        self.put_i32(at, count as i32);
        self.put_i32(at + 4, table as i32 - record as i32);
    }

    fn body_part(&mut self, record: usize, models: &[ModelDesc]) {
        self.layout.body_parts.push(record);
        let table = self.alloc(8 * models.len());
        self.array(record, models.len(), table, record);
        for (i, lods) in models.iter().enumerate() {
            self.model(table + 8 * i, lods);
        }
    }

    fn model(&mut self, record: usize, lods: &[LodDesc]) {
        self.layout.models.push(record);
        let table = self.alloc(12 * lods.len());
        self.array(record, lods.len(), table, record);
        for (i, meshes) in lods.iter().enumerate() {
            self.lod(table + 12 * i, i, meshes);
        }
    }

    fn lod(&mut self, record: usize, index: usize, meshes: &[MeshDesc]) {
        self.layout.lods.push(record);
        let table = self.alloc(9 * meshes.len());
        self.array(record, meshes.len(), table, record);
        let switch_point = index as f32 * 10.0;
        self.bytes[record + 8..record + 12].copy_from_slice(&switch_point.to_le_bytes());
        for (i, mesh) in meshes.iter().enumerate() {
            self.mesh(table + 9 * i, mesh);
        }
    }

    fn mesh(&mut self, record: usize, mesh: &MeshDesc) {
        self.layout.meshes.push(record);
        let table = self.alloc(25 * mesh.strip_groups.len());
        self.array(record, mesh.strip_groups.len(), table, record);
        self.bytes[record + 8] = mesh.flags;
        for (i, group) in mesh.strip_groups.iter().enumerate() {
            self.strip_group(table + 25 * i, group);
        }
    }

    fn strip_group(&mut self, record: usize, group: &StripGroupDesc) {
        self.layout.strip_groups.push(record);

        let verts = self.alloc(9 * group.vertices);
        self.layout.vertex_tables.push((verts, group.vertices));
        self.array(record, group.vertices, verts, record);
        for k in 0..group.vertices {
            let at = verts + 9 * k;
            self.bytes[at..at + 3].copy_from_slice(&[0, 1, 2]);
            self.bytes[at + 3] = 1 + (k % 3) as u8;
            let id = self.next_vertex_id;
            self.next_vertex_id = id.wrapping_add(1);
            self.put_u16(at + 4, id);
            self.bytes[at + 6..at + 9].copy_from_slice(&[k as u8, 0, -1i8 as u8]);
        }

        let indices = self.alloc(2 * group.indices.len());
        self.array(record + 8, group.indices.len(), indices, record);
        for (k, index) in group.indices.iter().enumerate() {
            self.put_u16(indices + 2 * k, *index);
        }

        let strips = self.alloc(27 * group.strips.len());
        self.array(record + 16, group.strips.len(), strips, record);
        self.bytes[record + 24] = group.flags;
        for (i, strip) in group.strips.iter().enumerate() {
            self.strip(strips + 27 * i, strip);
        }
    }

    fn strip(&mut self, record: usize, strip: &StripDesc) {
        self.layout.strips.push(record);
        self.put_i32(record, strip.num_indices);
        self.put_i32(record + 4, strip.index_offset);
        self.put_i32(record + 8, strip.num_verts);
        self.put_i32(record + 12, strip.vert_offset);
        self.put_u16(record + 16, 2);
        self.bytes[record + 18] = strip.flags;

        let changes = self.alloc(8 * strip.bone_state_changes);
        self.array(record + 19, strip.bone_state_changes, changes, record);
        for k in 0..strip.bone_state_changes {
            self.put_i32(changes + 8 * k, k as i32);
            self.put_i32(changes + 8 * k + 4, 10 + k as i32);
        }
    }
}
