//! Bone matrix type shared by the host, the archive and guest-facing readback
//!
//! `BoneMatrix3x4` is POD so keyframe blocks can be uploaded and copied into
//! guest memory with bytemuck, and serializable so it can live in the archive.

use bitcode::{Decode, Encode};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// 3x4 affine bone matrix (row-major storage, POD type)
///
/// Stores 3 rows of a 4x4 affine matrix. The implicit 4th row is [0, 0, 0, 1].
///
/// Memory layout (48 bytes):
/// - row0: rotation row 0 + translation X
/// - row1: rotation row 1 + translation Y
/// - row2: rotation row 2 + translation Z
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize, Encode, Decode,
)]
#[repr(C)]
pub struct BoneMatrix3x4 {
    /// First row: [m00, m01, m02, tx]
    pub row0: [f32; 4],
    /// Second row: [m10, m11, m12, ty]
    pub row1: [f32; 4],
    /// Third row: [m20, m21, m22, tz]
    pub row2: [f32; 4],
}

impl BoneMatrix3x4 {
    /// Size in bytes (12 floats)
    pub const SIZE: usize = 48;

    /// Identity bone matrix (no transformation)
    pub const IDENTITY: Self = Self {
        row0: [1.0, 0.0, 0.0, 0.0],
        row1: [0.0, 1.0, 0.0, 0.0],
        row2: [0.0, 0.0, 1.0, 0.0],
    };

    /// Create from row arrays
    pub const fn from_rows(row0: [f32; 4], row1: [f32; 4], row2: [f32; 4]) -> Self {
        Self { row0, row1, row2 }
    }

    /// Flat f32 array (row-major)
    pub fn to_array(&self) -> [f32; 12] {
        bytemuck::cast(*self)
    }

    /// Create from a flat f32 array (row-major)
    pub fn from_array(arr: [f32; 12]) -> Self {
        bytemuck::cast(arr)
    }

    /// Create from 12 floats in column-major order
    ///
    /// Layout: `[col0.xyz, col1.xyz, col2.xyz, translation.xyz]`, the order
    /// skeleton inverse bind matrices use on the wire.
    pub fn from_cols_3x4(m: &[f32; 12]) -> Self {
        Self {
            row0: [m[0], m[3], m[6], m[9]],
            row1: [m[1], m[4], m[7], m[10]],
            row2: [m[2], m[5], m[8], m[11]],
        }
    }

    /// Drop the projective row of an affine 4x4 matrix
    pub fn from_mat4(m: Mat4) -> Self {
        let row = |i: usize| m.row(i).to_array();
        Self {
            row0: row(0),
            row1: row(1),
            row2: row(2),
        }
    }

    /// Build from rotation, translation and per-axis scale
    ///
    /// Scale is applied per column before rotation; translation lands in the
    /// last column.
    pub fn from_transform(rotation: Quat, translation: Vec3, scale: Vec3) -> Self {
        Self::from_mat4(Mat4::from_scale_rotation_translation(
            scale, rotation, translation,
        ))
    }

    /// Expand back to a 4x4 matrix with `[0, 0, 0, 1]` as the last row
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&[
            [self.row0[0], self.row1[0], self.row2[0], 0.0],
            [self.row0[1], self.row1[1], self.row2[1], 0.0],
            [self.row0[2], self.row1[2], self.row2[2], 0.0],
            [self.row0[3], self.row1[3], self.row2[3], 1.0],
        ])
    }

    /// Translation column
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.row0[3], self.row1[3], self.row2[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let m = BoneMatrix3x4::IDENTITY;
        assert_eq!(
            m.to_array(),
            [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
        assert_eq!(std::mem::size_of::<BoneMatrix3x4>(), BoneMatrix3x4::SIZE);
    }

    #[test]
    fn test_from_array_is_row_major() {
        let arr = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let m = BoneMatrix3x4::from_array(arr);
        assert_eq!(m.row0, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(m.row2, [9.0, 10.0, 11.0, 12.0]);
        assert_eq!(m.to_array(), arr);
    }

    #[test]
    fn test_from_cols_3x4_transposes() {
        let cols = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        let m = BoneMatrix3x4::from_cols_3x4(&cols);
        assert_eq!(m.row0, [1.0, 4.0, 7.0, 10.0]);
        assert_eq!(m.row1, [2.0, 5.0, 8.0, 11.0]);
        assert_eq!(m.row2, [3.0, 6.0, 9.0, 12.0]);
    }

    #[test]
    fn test_from_transform_translation_and_scale() {
        let m = BoneMatrix3x4::from_transform(
            Quat::IDENTITY,
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(2.0, 3.0, 4.0),
        );
        assert_eq!(m.row0, [2.0, 0.0, 0.0, 1.0]);
        assert_eq!(m.row1, [0.0, 3.0, 0.0, 2.0]);
        assert_eq!(m.row2, [0.0, 0.0, 4.0, 3.0]);
        assert_eq!(m.translation(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_from_transform_rotation() {
        // 90° about Z maps +X to +Y
        let m = BoneMatrix3x4::from_transform(
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::ZERO,
            Vec3::ONE,
        );
        let x = m.to_mat4().transform_point3(Vec3::X);
        assert!((x - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_mat4_roundtrip() {
        let m = BoneMatrix3x4::from_array([
            0.0, -1.0, 0.0, 5.0, 1.0, 0.0, 0.0, 6.0, 0.0, 0.0, 1.0, 7.0,
        ]);
        assert_eq!(BoneMatrix3x4::from_mat4(m.to_mat4()), m);
    }
}
