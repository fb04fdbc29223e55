//! Block types stored in chunk arrays.

/// What a voxel is made of.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum BlockKind {
    #[default]
    Air,
    Dirt,
    Stone,
    Sand,
    Log,
    Leaf,
    Cactus,
    Lava,
}

impl BlockKind {
    /// Transparent blocks do not occlude faces and count as open space for
    /// the ground scan during vegetation placement.
    pub fn is_transparent(self) -> bool {
        matches!(self, BlockKind::Air | BlockKind::Leaf)
    }
}

/// Per-block auxiliary state carried next to the kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct BlockInfo {
    /// Dirt with a grass top layer.
    pub grassy: bool,
}

/// One voxel: a kind plus its auxiliary info.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Block {
    pub kind: BlockKind,
    pub info: BlockInfo,
}

impl Block {
    pub const AIR: Block = Block {
        kind: BlockKind::Air,
        info: BlockInfo { grassy: false },
    };

    pub fn new(kind: BlockKind) -> Self {
        Block {
            kind,
            info: BlockInfo::default(),
        }
    }

    pub fn grassy_dirt() -> Self {
        Block {
            kind: BlockKind::Dirt,
            info: BlockInfo { grassy: true },
        }
    }

    pub fn is_air(self) -> bool {
        self.kind == BlockKind::Air
    }

    pub fn is_transparent(self) -> bool {
        self.kind.is_transparent()
    }
}
