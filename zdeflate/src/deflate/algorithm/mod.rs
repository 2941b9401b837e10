use super::tables::HuffTables;

mod constant;
mod direct;
mod icf;
mod stored;

pub(crate) use constant::{is_constant, ConstantRun};
pub(crate) use direct::DirectSink;
pub(crate) use icf::{choose_block_type, write_records};
pub(crate) use stored::{stored_block_bits, write_stored_blocks, MAX_STORED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockType {
    Stored,
    Fixed,
    Dynamic,
    /// the level 0 table, builtin or installed by the caller
    Default,
}

/// The code tables a block can be written with.
#[derive(Debug)]
pub(crate) struct BlockTables {
    pub(crate) default: HuffTables,
    pub(crate) fixed: HuffTables,
    /// codes derived from the histogram of the current block
    pub(crate) dynamic: HuffTables,
}

impl BlockTables {
    pub(crate) fn new(default: HuffTables) -> Self {
        Self {
            default,
            fixed: HuffTables::fixed(),
            dynamic: HuffTables::fixed(),
        }
    }

    pub(crate) fn get(&self, block_type: BlockType) -> &HuffTables {
        match block_type {
            BlockType::Fixed => &self.fixed,
            BlockType::Dynamic => &self.dynamic,
            BlockType::Default | BlockType::Stored => &self.default,
        }
    }
}
