//! Integer voxel cell addresses.

use std::fmt;

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// A cell in a voxel grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoxelCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelCoord {
    pub const ZERO: Self = Self::new(0, 0, 0);

    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The cell containing `point` for cubic cells of `cell_size`.
    #[must_use]
    pub fn containing(point: Vec3, cell_size: f32) -> Self {
        let cell = (point / cell_size).floor();
        Self::new(cell.x as i32, cell.y as i32, cell.z as i32)
    }

    /// World-space center of the cell.
    #[must_use]
    pub fn center(self, cell_size: f32) -> Vec3 {
        (IVec3::from(self).as_vec3() + Vec3::splat(0.5)) * cell_size
    }
}

impl From<VoxelCoord> for IVec3 {
    fn from(c: VoxelCoord) -> Self {
        IVec3::new(c.x, c.y, c.z)
    }
}

impl From<IVec3> for VoxelCoord {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl fmt::Display for VoxelCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
