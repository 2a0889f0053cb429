use crate::face::ALL_FACES;

/// One bit of solidity per voxel, the authority on which voxels exist.
///
/// The bit at `((x * height) + y) * depth + z` is 1 iff the voxel is solid.
/// Colors live elsewhere; a solid voxel with no stored color is an interior
/// voxel whose color the VXL format cannot express.
pub struct Geometry {
    width: u32,
    height: u32,
    depth: u32,
    words: Vec<u64>,
}

impl Geometry {
    /// Creates an all-air geometry of the given dimensions.
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        let bits = width as usize * height as usize * depth as usize;

        Geometry {
            width,
            height,
            depth,
            words: vec![0; bits.div_ceil(64)],
        }
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

    fn bit_index(&self, x: u32, y: u32, z: u32) -> usize {
        ((x as usize * self.height as usize) + y as usize) * self.depth as usize + z as usize
    }

    /// Whether the voxel at `(x, y, z)` is solid. Out of bounds is air.
    pub fn is_solid(&self, x: u32, y: u32, z: u32) -> bool {
        if x >= self.width || y >= self.height || z >= self.depth {
            return false;
        }
        let i = self.bit_index(x, y, z);

        self.words[i / 64] & (1 << (i % 64)) != 0
    }

    pub fn set_solid(&mut self, x: u32, y: u32, z: u32, solid: bool) {
        debug_assert!(x < self.width && y < self.height && z < self.depth);
        let i = self.bit_index(x, y, z);
        if solid {
            self.words[i / 64] |= 1 << (i % 64);
        } else {
            self.words[i / 64] &= !(1 << (i % 64));
        }
    }

    /// Marks `z_start..z_end` of one column solid.
    pub fn fill_column(&mut self, x: u32, y: u32, z_start: u32, z_end: u32) {
        for z in z_start..z_end {
            self.set_solid(x, y, z, true);
        }
    }

    /// Solidity as seen by the surface-exposure rules, for possibly
    /// out-of-bounds neighbor probes.
    ///
    /// The map is closed on its sides and bottom: probes past the x/y walls
    /// or below `depth` read as solid. Only the face above z = 0 reads as
    /// air, which keeps the topmost voxel of every column exposed.
    pub fn solid_for_exposure(&self, x: i64, y: i64, z: i64) -> bool {
        if z < 0 {
            return false;
        }
        if z >= self.depth as i64 {
            return true;
        }
        if x < 0 || x >= self.width as i64 || y < 0 || y >= self.height as i64 {
            return true;
        }

        self.is_solid(x as u32, y as u32, z as u32)
    }

    /// Whether the voxel is solid with at least one air face-neighbor.
    pub fn on_surface(&self, x: u32, y: u32, z: u32) -> bool {
        if !self.is_solid(x, y, z) {
            return false;
        }

        ALL_FACES.iter().any(|face| {
            let (dx, dy, dz) = face.offset();

            !self.solid_for_exposure(x as i64 + dx, y as i64 + dy, z as i64 + dz)
        })
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
