use crate::key::PackedKey;
use crate::CHUNK_GROWTH;

use serde::{Deserialize, Serialize};

/// A stored color entry: one surface-exposed solid voxel and its color.
///
/// Colors are kept masked to 24 bits (`0x00RRGGBB`); the reserved high byte
/// of on-disk color words is discarded.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Block {
    pub key: PackedKey,
    pub color: u32,
}

/// The color entries of one 16×16 tile of columns, sorted ascending by key.
///
/// Sorting by `PackedKey` keeps each chunk in stream order, so point lookups
/// are a binary search and the encoder can walk a column's entries as a
/// contiguous slice.
#[derive(Clone, Debug, Default)]
pub struct Chunk {
    blocks: Vec<Block>,
}

impl Chunk {
    pub fn new() -> Self {
        Chunk { blocks: Vec::new() }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn position(&self, key: PackedKey) -> Result<usize, usize> {
        self.blocks.binary_search_by_key(&key, |b| b.key)
    }

    /// Grows capacity in constant steps rather than doubling, so a chunk
    /// never holds more than `CHUNK_GROWTH - 1` unused slots.
    fn reserve_step(&mut self) {
        if self.blocks.len() == self.blocks.capacity() {
            self.blocks.reserve_exact(CHUNK_GROWTH);
        }
    }

    pub fn find(&self, key: PackedKey) -> Option<u32> {
        self.position(key).ok().map(|i| self.blocks[i].color)
    }

    /// Inserts a new entry, preserving sort order. The key must not already
    /// be present.
    pub fn insert(&mut self, key: PackedKey, color: u32) {
        match self.position(key) {
            Ok(_) => debug_assert!(false, "insert of existing key {}", key),
            Err(i) => {
                self.reserve_step();
                self.blocks.insert(i, Block { key, color });
            }
        }
    }

    pub fn replace_or_insert(&mut self, key: PackedKey, color: u32) {
        match self.position(key) {
            Ok(i) => self.blocks[i].color = color,
            Err(i) => {
                self.reserve_step();
                self.blocks.insert(i, Block { key, color });
            }
        }
    }

    pub fn erase(&mut self, key: PackedKey) {
        if let Ok(i) = self.position(key) {
            self.blocks.remove(i);
        }
    }

    /// The decoder's bulk-append fast path. Keys arrive in globally ascending
    /// order during decode, so the chunk reaches its sorted state without any
    /// per-insert search.
    pub fn push(&mut self, key: PackedKey, color: u32) {
        debug_assert!(self.blocks.last().map_or(true, |b| b.key < key));
        self.reserve_step();
        self.blocks.push(Block { key, color });
    }

    /// The entries of one column, ascending in z.
    pub fn column_blocks(&self, x: u32, y: u32) -> &[Block] {
        let column = PackedKey::new(x, y, 0).column();
        let lo = self.blocks.partition_point(|b| b.key.column() < column);
        let hi = lo + self.blocks[lo..].partition_point(|b| b.key.column() == column);

        &self.blocks[lo..hi]
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
