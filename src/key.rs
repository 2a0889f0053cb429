use serde::{Deserialize, Serialize};
use std::fmt;

/// A voxel coordinate packed into 32 bits as `(y << 20) | (x << 8) | z`.
///
/// This leaves 12 bits for x and y and 8 bits for z. The derived `Ord` is the
/// lexicographic order on `(y, x, z)`, which is exactly the order columns are
/// traversed in the encoded stream, so sorting entries by key sorts them into
/// stream order.
#[derive(Copy, Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PackedKey(u32);

impl fmt::Display for PackedKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x(), self.y(), self.z())
    }
}

impl PackedKey {
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        debug_assert!(x < 1 << 12);
        debug_assert!(y < 1 << 12);
        debug_assert!(z < 1 << 8);

        PackedKey((y << 20) | (x << 8) | z)
    }

    pub fn x(self) -> u32 {
        (self.0 >> 8) & 0xFFF
    }

    pub fn y(self) -> u32 {
        self.0 >> 20
    }

    pub fn z(self) -> u32 {
        self.0 & 0xFF
    }

    /// The key with the z bits cleared; equal for all keys of one column.
    pub fn column(self) -> u32 {
        self.0 & 0xFFFF_FF00
    }

    pub fn raw(self) -> u32 {
        self.0
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

    #[test]
    fn test_pack_unpack_roundtrip() {
        let test_coords = [
            (0, 0, 0),
            (1, 2, 3),
            (511, 511, 63),
            (4095, 0, 255),
            (0, 4095, 0),
        ];

        for &(x, y, z) in test_coords.iter() {
            let key = PackedKey::new(x, y, z);
            assert_eq!((key.x(), key.y(), key.z()), (x, y, z));
        }
    }

    #[test]
    fn test_order_is_y_then_x_then_z() {
        let mut keys = vec![
            PackedKey::new(1, 0, 5),
            PackedKey::new(0, 1, 0),
            PackedKey::new(0, 0, 9),
            PackedKey::new(2, 0, 0),
            PackedKey::new(0, 0, 3),
        ];
        keys.sort();

        let coords: Vec<_> = keys.iter().map(|k| (k.y(), k.x(), k.z())).collect();
        assert_eq!(
            coords,
            vec![(0, 0, 3), (0, 0, 9), (0, 1, 5), (0, 2, 0), (1, 0, 0)]
        );
    }

    #[test]
    fn test_column_prefix() {
        assert_eq!(
            PackedKey::new(7, 9, 0).column(),
            PackedKey::new(7, 9, 255).column()
        );
        assert_ne!(
            PackedKey::new(7, 9, 0).column(),
            PackedKey::new(8, 9, 0).column()
        );
    }
}
