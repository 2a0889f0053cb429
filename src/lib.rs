//! Reading, writing, mutating and streaming voxel maps in the compressed
//! "VXL" format of the Ace of Spades / Voxlap family of games.
//!
//! A VXL map is a dense grid of voxels that are either solid or air. The
//! on-disk encoding stores, per vertical column, only the spans of solid
//! voxels and the colors of voxels that touch air; interior solid voxels
//! exist implicitly and carry no color. [`VxlMap`] mirrors that exactly: a
//! solidity bitmap plus a sparse color store holding an entry for every
//! surface-exposed voxel, which makes re-encoding a straight projection of
//! the in-memory state.
//!
//! The codec always uses z as the vertical axis with z = 0 at the top
//! (voxlap's convention puts the water level at `depth - 1` instead); any
//! axis remapping for an engine's coordinate system is the caller's concern.

pub mod chunk;
pub mod face;
pub mod geometry;
pub mod io;
pub mod key;
pub mod map;
pub mod span;
pub mod stream;

#[cfg(test)]
mod test_util;

pub use chunk::{Block, Chunk};
pub use face::{Face, ALL_FACES};
pub use geometry::Geometry;
pub use io::write_to_file;
pub use key::PackedKey;
pub use map::VxlMap;
pub use span::{guess_size, DecodeError};
pub use stream::VxlStream;

/// Edge length of the square column tiles the color store is split into.
///
/// Smaller tiles speed up point updates but fragment the store into more
/// allocations.
pub const CHUNK_SIZE: u32 = 16;

/// How many entry slots a chunk grows by when it runs out.
pub const CHUNK_GROWTH: usize = 512;

/// The color reported for a solid voxel with no stored color, e.g. an
/// underground voxel that has never been visible from the surface.
pub const DEFAULT_COLOR: u32 = 0x67_40_28;
