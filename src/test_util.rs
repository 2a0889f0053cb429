use crate::key::PackedKey;
use crate::map::VxlMap;

/// A deterministic map with hills above the water level and scattered holes
/// below it, used by round-trip and streaming tests.
pub fn hilly_map(width: u32, height: u32, depth: u32) -> VxlMap {
    let mut map = VxlMap::empty(width, height, depth);
    let surface = depth / 2;

    for x in 0..width {
        for y in 0..height {
            let lift = ((x * 7 + y * 13) % 11) / 2;
            for i in 0..lift.min(surface) {
                let z = surface - 1 - i;
                let color = ((x & 0xFF) << 16) | ((y & 0xFF) << 8) | (z & 0xFF);
                map.set(x, y, z, color);
            }
            if (x * y) % 9 == 0 {
                map.set_air(x, y, surface + (x + y) % (depth - surface));
            }
        }
    }

    map
}

pub fn assert_same_map(a: &VxlMap, b: &VxlMap) {
    assert_eq!(
        (a.width(), a.height(), a.depth()),
        (b.width(), b.height(), b.depth())
    );
    for x in 0..a.width() {
        for y in 0..a.height() {
            for z in 0..a.depth() {
                assert_eq!(
                    a.is_solid(x, y, z),
                    b.is_solid(x, y, z),
                    "solidity differs at ({}, {}, {})",
                    x,
                    y,
                    z
                );
            }
        }
    }
    for (ca, cb) in a.chunks().iter().zip(b.chunks()) {
        assert_eq!(ca.blocks(), cb.blocks());
    }
}

/// Checks the stored-color discipline: entries sorted strictly ascending per
/// chunk, every entry on a solid surface voxel, every surface voxel with an
/// entry.
pub fn assert_store_invariants(map: &VxlMap) {
    for chunk in map.chunks() {
        assert!(chunk.blocks().windows(2).all(|w| w[0].key < w[1].key));
        for block in chunk.blocks() {
            let (x, y, z) = (block.key.x(), block.key.y(), block.key.z());
            assert!(map.is_solid(x, y, z), "entry on air voxel {}", block.key);
            assert!(
                map.on_surface(x, y, z),
                "entry on interior voxel {}",
                block.key
            );
        }
    }
    for x in 0..map.width() {
        for y in 0..map.height() {
            let column = map.column_blocks(x, y);
            for z in 0..map.depth() {
                if map.on_surface(x, y, z) {
                    assert!(
                        column.iter().any(|b| b.key == PackedKey::new(x, y, z)),
                        "surface voxel ({}, {}, {}) has no entry",
                        x,
                        y,
                        z
                    );
                }
            }
        }
    }
}
