//! # engine_math
//!
//! Math types for the entity framework. Re-exports [`glam`] for linear
//! algebra and defines spatial types: the [`Transform`] component and
//! [`VoxelCoord`] cell addresses.

pub mod transform;
pub mod voxel;

// Re-export glam types for convenience.
pub use glam::{EulerRot, Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

pub use transform::Transform;
pub use voxel::VoxelCoord;
