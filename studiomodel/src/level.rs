use std::fmt;

/// The kinds of table found in a VTX file, outermost first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    Header,
    BodyPart,
    Model,
    Lod,
    Mesh,
    StripGroup,
    Vertex,
    Index,
    Strip,
    BoneStateChange,
}

impl Level {
    pub fn name(self) -> &'static str {
        match self {
            Level::Header => "header",
            Level::BodyPart => "body part",
            Level::Model => "model",
            Level::Lod => "lod",
            Level::Mesh => "mesh",
            Level::StripGroup => "strip group",
            Level::Vertex => "vertex",
            Level::Index => "index",
            Level::Strip => "strip",
            Level::BoneStateChange => "bone state change",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Levels that own a child table, in nesting order. A path of depth n names a
// record at PATH_LEVELS[n - 1].
const PATH_LEVELS: [Level; 6] = [
    Level::BodyPart,
    Level::Model,
    Level::Lod,
    Level::Mesh,
    Level::StripGroup,
    Level::Strip,
];

/// Position of a record in the decoded tree, as indices from the body part down.
///
/// The root path (depth 0) stands for the file header.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath {
    indices: [usize; 6],
    depth: u8,
}

impl NodePath {
    pub const ROOT: NodePath = NodePath {
        indices: [0; 6],
        depth: 0,
    };

    /// Path of the `index`th child of this record.
    pub fn child(self, index: usize) -> NodePath {
        let mut path = self;
        let depth = self.depth as usize;
        if depth < path.indices.len() {
            path.indices[depth] = index;
            path.depth += 1;
        }
        path
    }

    pub fn depth(&self) -> usize {
        self.depth as usize
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices[..self.depth as usize]
    }

    /// The level of the record this path points at.
    pub fn level(&self) -> Level {
        match self.depth {
            0 => Level::Header,
            d => PATH_LEVELS[d as usize - 1],
        }
    }

    /// Index of the record within its parent's table, or 0 for the header.
    pub fn last(&self) -> usize {
        self.indices().last().copied().unwrap_or(0)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.depth == 0 {
            return f.write_str("header");
        }
        for (i, (level, index)) in PATH_LEVELS.iter().zip(self.indices()).enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{level} {index}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodePath({self})")
    }
}
