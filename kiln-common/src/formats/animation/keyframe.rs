//! Packed bone keyframe and its codecs

use glam::{Quat, Vec3};
use half::f16;

use crate::formats::{le_u16, le_u32};
use crate::math::BoneMatrix3x4;

/// Size of one packed bone keyframe (16 bytes)
pub const PACKED_BONE_KEYFRAME_SIZE: usize = 16;

/// Quantization scale: 10-bit range mapped from [-1/√2, 1/√2]
const QUANT_SCALE: f32 = 511.5;

/// Compressed bone transform as stored in a keyframe block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackedBoneKeyframe {
    /// Smallest-three packed quaternion
    pub rotation: u32,
    /// Translation as f16 bits
    pub position: [u16; 3],
    /// Per-axis scale as f16 bits
    pub scale: [u16; 3],
}

impl PackedBoneKeyframe {
    /// Compress a bone transform
    pub fn encode(rotation: Quat, position: Vec3, scale: Vec3) -> Self {
        Self {
            rotation: encode_quat_smallest_three(rotation),
            position: position.to_array().map(f32_to_f16),
            scale: scale.to_array().map(f32_to_f16),
        }
    }

    /// Parse from 16 bytes; `None` if the slice is shorter
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < PACKED_BONE_KEYFRAME_SIZE {
            return None;
        }
        let half = |i: usize| le_u16(bytes, 4 + i * 2);
        Some(Self {
            rotation: le_u32(bytes, 0),
            position: [half(0), half(1), half(2)],
            scale: [half(3), half(4), half(5)],
        })
    }

    /// Write to 16 bytes
    pub fn to_bytes(&self) -> [u8; PACKED_BONE_KEYFRAME_SIZE] {
        let mut bytes = [0u8; PACKED_BONE_KEYFRAME_SIZE];
        bytes[0..4].copy_from_slice(&self.rotation.to_le_bytes());
        for (i, bits) in self.position.iter().chain(&self.scale).enumerate() {
            bytes[4 + i * 2..6 + i * 2].copy_from_slice(&bits.to_le_bytes());
        }
        bytes
    }

    /// Unpacked rotation, translation and scale
    pub fn decode_parts(&self) -> (Quat, Vec3, Vec3) {
        (
            decode_quat_smallest_three(self.rotation),
            Vec3::from_array(self.position.map(f16_to_f32)),
            Vec3::from_array(self.scale.map(f16_to_f32)),
        )
    }

    /// Expand to a row-major affine bone matrix
    pub fn to_matrix(&self) -> BoneMatrix3x4 {
        let (rotation, position, scale) = self.decode_parts();
        BoneMatrix3x4::from_transform(rotation, position, scale)
    }
}

/// Encode a quaternion using smallest-three encoding (32 bits)
///
/// Bit layout: `[a:10][b:10][c:10][idx:2]`. `idx` names the dropped
/// (largest magnitude) component, which is made positive since q and -q
/// encode the same rotation. Each kept component is quantized with
/// `round((v * √2 + 1) * 511.5)`.
pub fn encode_quat_smallest_three(q: Quat) -> u32 {
    let components = q.to_array();
    let mut idx = 0;
    for i in 1..4 {
        if components[i].abs() > components[idx].abs() {
            idx = i;
        }
    }
    let sign = if components[idx] < 0.0 { -1.0 } else { 1.0 };

    let mut packed = idx as u32;
    let mut shift = 22;
    for (i, &v) in components.iter().enumerate() {
        if i == idx {
            continue;
        }
        let quantized = ((v * sign * std::f32::consts::SQRT_2 + 1.0) * QUANT_SCALE)
            .round()
            .clamp(0.0, 1023.0) as u32;
        packed |= quantized << shift;
        shift -= 10;
    }
    packed
}

/// Decode a smallest-three encoded quaternion
///
/// The dropped component is rebuilt as `sqrt(1 - a² - b² - c²)` and the
/// result is renormalized.
pub fn decode_quat_smallest_three(packed: u32) -> Quat {
    let idx = (packed & 0x3) as usize;
    let dequantize = |shift: u32| {
        let q = ((packed >> shift) & 0x3FF) as f32;
        (q / QUANT_SCALE - 1.0) * std::f32::consts::FRAC_1_SQRT_2
    };
    let kept = [dequantize(22), dequantize(12), dequantize(2)];
    let largest = (1.0 - kept.iter().map(|v| v * v).sum::<f32>()).max(0.0).sqrt();

    let mut components = [0.0f32; 4];
    let mut next = kept.into_iter();
    for (i, slot) in components.iter_mut().enumerate() {
        *slot = if i == idx {
            largest
        } else {
            next.next().unwrap_or(0.0)
        };
    }
    Quat::from_array(components).normalize()
}

/// Convert f32 to f16 bits
#[inline]
pub fn f32_to_f16(value: f32) -> u16 {
    f16::from_f32(value).to_bits()
}

/// Convert f16 bits to f32
#[inline]
pub fn f16_to_f32(bits: u16) -> f32 {
    f16::from_bits(bits).to_f32()
}
