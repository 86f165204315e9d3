//! Validated view over a keyframe block, and a builder for producing one

use super::header::KeyframeHeader;
use super::keyframe::{PACKED_BONE_KEYFRAME_SIZE, PackedBoneKeyframe};
use crate::formats::FormatError;
use crate::math::BoneMatrix3x4;

/// A keyframe block whose header and frame data have been validated
#[derive(Debug, Clone, Copy)]
pub struct KeyframeBlock<'a> {
    header: KeyframeHeader,
    /// Exactly `header.data_size()` bytes
    frames: &'a [u8],
}

impl<'a> KeyframeBlock<'a> {
    /// Validate a block
    ///
    /// Fails when the data is shorter than the header, the header has zero
    /// counts or non-zero flags, or the frame data is shorter than the header
    /// promises.
    ///
    /// The one-byte bone count caps a block at
    /// [`MAX_KEYFRAME_BONES`](super::MAX_KEYFRAME_BONES) (255) bones, one fewer
    /// than a skeleton may hold. Larger rigs animate through the immediate
    /// bone path instead.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, FormatError> {
        let header = KeyframeHeader::from_bytes(bytes).ok_or(FormatError::TruncatedHeader {
            len: bytes.len(),
            needed: KeyframeHeader::SIZE,
        })?;
        Self::with_header(header, &bytes[KeyframeHeader::SIZE..])
    }

    /// Validate headerless frame data against known counts
    ///
    /// Archive entries store the counts beside the data instead of in front.
    pub fn with_header(header: KeyframeHeader, frames: &'a [u8]) -> Result<Self, FormatError> {
        if !header.is_valid() {
            return Err(FormatError::InvalidHeader(
                "keyframe header needs non-zero counts and zero flags",
            ));
        }
        let needed = header.data_size();
        if frames.len() < needed {
            return Err(FormatError::TruncatedBody {
                len: frames.len(),
                needed,
            });
        }
        Ok(Self {
            header,
            frames: &frames[..needed],
        })
    }

    pub fn header(&self) -> KeyframeHeader {
        self.header
    }

    pub fn bone_count(&self) -> u32 {
        self.header.bone_count as u32
    }

    pub fn frame_count(&self) -> u32 {
        self.header.frame_count as u32
    }

    /// Packed keyframe for `bone` in `frame`
    pub fn keyframe(&self, frame: u32, bone: u32) -> Option<PackedBoneKeyframe> {
        if frame >= self.frame_count() || bone >= self.bone_count() {
            return None;
        }
        let index = (frame * self.bone_count() + bone) as usize;
        PackedBoneKeyframe::from_bytes(&self.frames[index * PACKED_BONE_KEYFRAME_SIZE..])
    }

    /// Decode every keyframe, frame-major, into bone matrices
    pub fn decode_matrices(&self) -> Vec<BoneMatrix3x4> {
        self.frames
            .chunks_exact(PACKED_BONE_KEYFRAME_SIZE)
            .filter_map(PackedBoneKeyframe::from_bytes)
            .map(|kf| kf.to_matrix())
            .collect()
    }
}

/// Builds a keyframe block frame by frame
#[derive(Debug, Clone)]
pub struct KeyframeBlockBuilder {
    bone_count: u8,
    frame_count: u16,
    data: Vec<u8>,
}

impl KeyframeBlockBuilder {
    pub fn new(bone_count: u8) -> Self {
        Self {
            bone_count,
            frame_count: 0,
            data: Vec::new(),
        }
    }

    /// Append one frame; `bones.len()` must equal the bone count
    pub fn push_frame(&mut self, bones: &[PackedBoneKeyframe]) -> Result<&mut Self, FormatError> {
        if bones.len() != self.bone_count as usize {
            return Err(FormatError::SizeMismatch {
                len: bones.len(),
                expected: self.bone_count as usize,
            });
        }
        if self.frame_count == u16::MAX {
            return Err(FormatError::TooLarge {
                what: "frame_count",
                value: self.frame_count as usize + 1,
                limit: u16::MAX as usize,
            });
        }
        for bone in bones {
            self.data.extend_from_slice(&bone.to_bytes());
        }
        self.frame_count += 1;
        Ok(self)
    }

    /// Frames pushed so far
    pub fn frame_count(&self) -> u16 {
        self.frame_count
    }

    /// Headerless frame data, as stored in an archive entry
    pub fn frame_data(&self) -> &[u8] {
        &self.data
    }

    /// Header plus frame data
    pub fn to_bytes(&self) -> Vec<u8> {
        let header = KeyframeHeader::new(self.bone_count, self.frame_count);
        let mut bytes = Vec::with_capacity(KeyframeHeader::SIZE + self.data.len());
        bytes.extend_from_slice(&header.to_bytes());
        bytes.extend_from_slice(&self.data);
        bytes
    }
}
