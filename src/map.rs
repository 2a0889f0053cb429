use crate::chunk::{Block, Chunk};
use crate::face::ALL_FACES;
use crate::geometry::Geometry;
use crate::key::PackedKey;
use crate::span::{self, DecodeError};
use crate::{CHUNK_SIZE, DEFAULT_COLOR};

use tracing::debug;

/// A mutable VXL map: a solidity bitmap plus a sparse, chunked color store
/// holding an entry for every surface-exposed solid voxel.
///
/// z is the vertical axis with z = 0 at the top; any other axis convention is
/// the caller's remapping.
pub struct VxlMap {
    width: u32,
    height: u32,
    depth: u32,
    chunks_across: u32,
    geometry: Geometry,
    chunks: Vec<Chunk>,
}

impl VxlMap {
    fn with_dimensions(width: u32, height: u32, depth: u32) -> Self {
        assert!(width >= 1 && width <= 1 << 12);
        assert!(height >= 1 && height <= 1 << 12);
        // The span header's byte-sized z fields must also hold the
        // one-past-the-end sentinel `depth` (an all-air column encodes as
        // color_start = depth), so 256-deep maps are not representable.
        assert!(depth >= 1 && depth <= 255);

        let chunks_across = width.div_ceil(CHUNK_SIZE);
        let chunks_down = height.div_ceil(CHUNK_SIZE);

        VxlMap {
            width,
            height,
            depth,
            chunks_across,
            geometry: Geometry::new(width, height, depth),
            chunks: vec![Chunk::new(); (chunks_across * chunks_down) as usize],
        }
    }

    /// Decodes a map from VXL bytes. The buffer must hold exactly
    /// `width * height` columns.
    pub fn from_bytes(width: u32, height: u32, depth: u32, data: &[u8]) -> Result<Self, DecodeError> {
        let mut map = Self::with_dimensions(width, height, depth);

        let mut offset = 0;
        for y in 0..height {
            for x in 0..width {
                let ci = map.chunk_index(x, y);
                span::decode_column(data, &mut offset, x, y, &mut map.geometry, &mut map.chunks[ci])?;
            }
        }
        if offset != data.len() {
            return Err(DecodeError::TrailingData {
                remaining: data.len() - offset,
            });
        }
        debug!(width, height, depth, bytes = data.len(), "decoded vxl map");

        Ok(map)
    }

    /// Creates a map with the lower half (`z >= depth / 2`) filled solid.
    ///
    /// Only the water-level layer is surface-exposed (the map's side walls
    /// read as solid), so it is the only layer that gets color entries.
    pub fn empty(width: u32, height: u32, depth: u32) -> Self {
        let mut map = Self::with_dimensions(width, height, depth);
        let surface = depth / 2;

        for x in 0..width {
            for y in 0..height {
                map.geometry.fill_column(x, y, surface, depth);
            }
        }
        let chunks_across = map.chunks_across;
        let chunks_down = height.div_ceil(CHUNK_SIZE);
        for cy in 0..chunks_down {
            for cx in 0..chunks_across {
                let chunk = &mut map.chunks[(cy * chunks_across + cx) as usize];
                for y in cy * CHUNK_SIZE..((cy + 1) * CHUNK_SIZE).min(height) {
                    for x in cx * CHUNK_SIZE..((cx + 1) * CHUNK_SIZE).min(width) {
                        chunk.push(PackedKey::new(x, y, surface), DEFAULT_COLOR);
                    }
                }
            }
        }

        map
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    fn contains(&self, x: u32, y: u32, z: u32) -> bool {
        x < self.width && y < self.height && z < self.depth
    }

    fn chunk_index(&self, x: u32, y: u32) -> usize {
        ((y / CHUNK_SIZE) * self.chunks_across + (x / CHUNK_SIZE)) as usize
    }

    fn chunk(&self, x: u32, y: u32) -> &Chunk {
        &self.chunks[self.chunk_index(x, y)]
    }

    pub(crate) fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub(crate) fn column_blocks(&self, x: u32, y: u32) -> &[Block] {
        self.chunk(x, y).column_blocks(x, y)
    }

    /// Whether the voxel is solid. Out of bounds is air.
    pub fn is_solid(&self, x: u32, y: u32, z: u32) -> bool {
        self.geometry.is_solid(x, y, z)
    }

    /// Whether the voxel is solid and exposed to air on any of its six faces.
    pub fn on_surface(&self, x: u32, y: u32, z: u32) -> bool {
        self.geometry.on_surface(x, y, z)
    }

    /// The voxel's color: its stored color if it has one, `DEFAULT_COLOR` for
    /// interior solid voxels, 0 for air or out of bounds.
    pub fn get(&self, x: u32, y: u32, z: u32) -> u32 {
        if !self.contains(x, y, z) {
            return 0;
        }
        if let Some(color) = self.chunk(x, y).find(PackedKey::new(x, y, z)) {
            return color;
        }
        if self.geometry.is_solid(x, y, z) {
            DEFAULT_COLOR
        } else {
            0
        }
    }

    /// The color and z of the topmost solid voxel of a column, or `None` for
    /// an all-air column or out-of-bounds coordinates.
    pub fn get_top(&self, x: u32, y: u32) -> Option<(u32, u32)> {
        if x >= self.width || y >= self.height {
            return None;
        }

        (0..self.depth)
            .find(|&z| self.geometry.is_solid(x, y, z))
            .map(|z| (self.get(x, y, z), z))
    }

    /// Makes the voxel solid with the given color (masked to 24 bits), then
    /// restores the stored-color rule for it and its six neighbors. Out of
    /// bounds is a no-op.
    pub fn set(&mut self, x: u32, y: u32, z: u32, color: u32) {
        if !self.contains(x, y, z) {
            return;
        }
        self.geometry.set_solid(x, y, z, true);
        let ci = self.chunk_index(x, y);
        self.chunks[ci].replace_or_insert(PackedKey::new(x, y, z), color & 0xFF_FFFF);
        self.reconcile(x, y, z);
        self.reconcile_neighbors(x, y, z);
    }

    /// Makes the voxel air, dropping its stored color. Neighbors that become
    /// exposed gain a `DEFAULT_COLOR` entry. Out of bounds is a no-op.
    pub fn set_air(&mut self, x: u32, y: u32, z: u32) {
        if !self.contains(x, y, z) {
            return;
        }
        self.geometry.set_solid(x, y, z, false);
        let ci = self.chunk_index(x, y);
        self.chunks[ci].erase(PackedKey::new(x, y, z));
        self.reconcile_neighbors(x, y, z);
    }

    /// Restores the stored-color rule for one voxel: a surface voxel keeps an
    /// entry (default color if none is known), interior and air voxels none.
    fn reconcile(&mut self, x: u32, y: u32, z: u32) {
        if !self.geometry.is_solid(x, y, z) {
            return;
        }
        let on_surface = self.geometry.on_surface(x, y, z);
        let key = PackedKey::new(x, y, z);
        let ci = self.chunk_index(x, y);
        let chunk = &mut self.chunks[ci];
        if on_surface {
            if chunk.find(key).is_none() {
                chunk.insert(key, DEFAULT_COLOR);
            }
        } else {
            chunk.erase(key);
        }
    }

    fn reconcile_neighbors(&mut self, x: u32, y: u32, z: u32) {
        for face in ALL_FACES {
            let (dx, dy, dz) = face.offset();
            let (nx, ny, nz) = (x as i64 + dx, y as i64 + dy, z as i64 + dz);
            if nx >= 0 && ny >= 0 && nz >= 0 && self.contains(nx as u32, ny as u32, nz as u32) {
                self.reconcile(nx as u32, ny as u32, nz as u32);
            }
        }
    }

    pub(crate) fn encode_column_into(&self, x: u32, y: u32, out: &mut Vec<u8>) {
        span::encode_column(&self.geometry, self.chunk(x, y), x, y, out);
    }

    /// One-shot encode of the whole map, columns in (y, x) order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity((self.width * self.height) as usize * 8);
        for y in 0..self.height {
            for x in 0..self.width {
                self.encode_column_into(x, y, &mut out);
            }
        }
        debug!(bytes = out.len(), "encoded vxl map");

        out
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::guess_size;
    use crate::test_util::{assert_same_map, assert_store_invariants, hilly_map};

    #[test]
    fn test_empty_map_water_level() {
        let map = VxlMap::empty(64, 64, 64);

        assert!(map.is_solid(0, 0, 32));
        assert!(!map.is_solid(0, 0, 31));
        assert_eq!(map.get(0, 0, 32), DEFAULT_COLOR);
        assert_eq!(map.get_top(0, 0), Some((DEFAULT_COLOR, 32)));

        // Below the water-level layer everything is interior.
        assert!(!map.on_surface(0, 0, 33));
        assert_eq!(map.get(0, 0, 33), DEFAULT_COLOR);
        assert_store_invariants(&map);
    }

    #[test]
    fn test_set_above_water() {
        let mut map = VxlMap::empty(64, 64, 64);
        map.set(10, 10, 5, 0xFFFF_8000); // reserved high byte is dropped

        assert!(map.is_solid(10, 10, 5));
        assert_eq!(map.get(10, 10, 5), 0xFF8000);
        assert!(map.on_surface(10, 10, 5));
        assert_eq!(map.get_top(10, 10), Some((0xFF8000, 5)));
    }

    #[test]
    fn test_enclosed_voxel_loses_entry() {
        let mut map = VxlMap::empty(512, 512, 64);
        map.set(1, 1, 10, 0x112233);
        map.set(1, 1, 11, 0x445566);
        map.set(1, 1, 12, 0x778899);

        assert_eq!(map.get(1, 1, 11), 0x445566);
        assert!(map.on_surface(1, 1, 11));

        map.set(2, 1, 11, 0x0A0A0A);
        map.set(0, 1, 11, 0x0B0B0B);
        map.set(1, 2, 11, 0x0C0C0C);
        map.set(1, 0, 11, 0x0D0D0D);

        // All six neighbors are now solid; the entry must be gone.
        assert!(!map.on_surface(1, 1, 11));
        assert!(map.chunk(1, 1).find(PackedKey::new(1, 1, 11)).is_none());
        assert_eq!(map.get(1, 1, 11), DEFAULT_COLOR);
    }

    #[test]
    fn test_set_air_exposes_neighbors() {
        let mut map = VxlMap::empty(64, 64, 64);
        map.set_air(0, 0, 32);

        assert!(!map.is_solid(0, 0, 32));
        for (x, y, z) in [(1, 0, 32), (0, 1, 32), (0, 0, 33)] {
            assert!(map.on_surface(x, y, z));
            assert!(map.chunk(x, y).find(PackedKey::new(x, y, z)).is_some());
            assert_eq!(map.get(x, y, z), DEFAULT_COLOR);
        }
        assert_store_invariants(&map);
    }

    #[test]
    fn test_out_of_bounds_is_neutral() {
        let mut map = VxlMap::empty(16, 16, 16);

        assert!(!map.is_solid(16, 0, 0));
        assert!(!map.on_surface(0, 16, 0));
        assert_eq!(map.get(0, 0, 16), 0);
        assert_eq!(map.get_top(16, 16), None);

        map.set(99, 0, 0, 0xFFFFFF);
        map.set_air(0, 99, 0);
        assert_eq!(map.to_bytes(), VxlMap::empty(16, 16, 16).to_bytes());
    }

    #[test]
    fn test_get_top_of_empty_column() {
        let mut map = VxlMap::empty(16, 16, 16);
        for z in 8..16 {
            map.set_air(3, 3, z);
        }

        assert_eq!(map.get_top(3, 3), None);
    }

    #[test]
    fn test_roundtrip_empty_map() {
        let map = VxlMap::empty(64, 64, 64);
        let bytes = map.to_bytes();

        let decoded = VxlMap::from_bytes(64, 64, 64, &bytes).unwrap();
        assert_same_map(&map, &decoded);
        assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn test_roundtrip_after_mutations() {
        let map = hilly_map(32, 32, 32);
        assert_store_invariants(&map);

        let bytes = map.to_bytes();
        let decoded = VxlMap::from_bytes(32, 32, 32, &bytes).unwrap();
        assert_same_map(&map, &decoded);
        assert_store_invariants(&decoded);

        // Idempotent encode, byte for byte.
        assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn test_roundtrip_at_max_depth() {
        // depth = 255 is the deepest map whose all-air terminator sentinel
        // still fits the byte-sized header fields.
        let mut map = VxlMap::empty(4, 4, 255);
        map.set(2, 2, 0, 0x123456);
        for z in 0..255 {
            map.set_air(1, 1, z);
        }
        assert_eq!(map.get_top(1, 1), None);

        let bytes = map.to_bytes();
        let decoded = VxlMap::from_bytes(4, 4, 255, &bytes).unwrap();
        assert_same_map(&map, &decoded);
        assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    #[should_panic]
    fn test_depth_256_is_rejected() {
        VxlMap::empty(4, 4, 256);
    }

    #[test]
    fn test_from_bytes_rejects_trailing_data() {
        let mut bytes = VxlMap::empty(16, 16, 16).to_bytes();
        bytes.extend_from_slice(&[0, 0, 0, 0]);

        let err = VxlMap::from_bytes(16, 16, 16, &bytes).err().unwrap();
        assert!(matches!(err, DecodeError::TrailingData { remaining: 4 }));
    }

    #[test]
    fn test_from_bytes_rejects_truncation() {
        let bytes = VxlMap::empty(16, 16, 16).to_bytes();

        let err = VxlMap::from_bytes(16, 16, 16, &bytes[..bytes.len() - 2]).err().unwrap();
        assert!(matches!(err, DecodeError::Truncated { .. }));
    }

    #[test]
    fn test_guess_size() {
        assert_eq!(
            guess_size(&VxlMap::empty(64, 64, 64).to_bytes()).unwrap(),
            (64, 64)
        );
        assert_eq!(
            guess_size(&hilly_map(32, 32, 64).to_bytes()).unwrap(),
            (32, 64)
        );
    }
}
