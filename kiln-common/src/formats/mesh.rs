//! Mesh binary format
//!
//! # Layout
//! ```text
//! 0x00: vertex_count u32
//! 0x04: index_count u32
//! 0x08: format u8 (vertex format flags)
//! 0x09: padding (3 bytes)
//! 0x0C: vertex_data (vertex_count × stride)
//! var:  index_data (index_count × u16 LE)
//! ```

use super::texture::check_exact;
use super::{FormatError, le_u32};

/// Vertex format flag: packed UV coordinates
pub const FORMAT_UV: u8 = 1;
/// Vertex format flag: per-vertex color
pub const FORMAT_COLOR: u8 = 2;
/// Vertex format flag: octahedral normal
pub const FORMAT_NORMAL: u8 = 4;
/// Vertex format flag: bone indices and weights
pub const FORMAT_SKINNED: u8 = 8;

/// All defined vertex format bits
const FORMAT_MASK: u8 = FORMAT_UV | FORMAT_COLOR | FORMAT_NORMAL | FORMAT_SKINNED;

/// Bytes per packed vertex for a format
///
/// - Position: f16x4 = 8 bytes
/// - UV: unorm16x2 = 4 bytes
/// - Color: unorm8x4 = 4 bytes
/// - Normal: octahedral u32 = 4 bytes
/// - Skinning: u8x4 indices + unorm8x4 weights = 8 bytes
pub const fn vertex_stride_packed(format: u8) -> u32 {
    let mut stride = 8;
    if format & FORMAT_UV != 0 {
        stride += 4;
    }
    if format & FORMAT_COLOR != 0 {
        stride += 4;
    }
    if format & FORMAT_NORMAL != 0 {
        stride += 4;
    }
    if format & FORMAT_SKINNED != 0 {
        stride += 8;
    }
    stride
}

/// Mesh header (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct MeshHeader {
    pub vertex_count: u32,
    pub index_count: u32,
    pub format: u8,
    pub _padding: [u8; 3],
}

impl MeshHeader {
    pub const SIZE: usize = 12;

    pub fn new(vertex_count: u32, index_count: u32, format: u8) -> Self {
        Self {
            vertex_count,
            index_count,
            format,
            _padding: [0; 3],
        }
    }

    /// Size of the packed vertex section
    pub fn vertex_data_size(&self) -> usize {
        self.vertex_count as usize * vertex_stride_packed(self.format) as usize
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.vertex_count.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.index_count.to_le_bytes());
        bytes[8] = self.format;
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self::new(le_u32(bytes, 0), le_u32(bytes, 4), bytes[8]))
    }
}

/// A validated mesh payload borrowed from the source bytes
#[derive(Debug, Clone, Copy)]
pub struct MeshView<'a> {
    pub header: MeshHeader,
    pub vertex_data: &'a [u8],
    /// Raw u16 LE index bytes
    pub index_bytes: &'a [u8],
}

impl MeshView<'_> {
    /// Iterate the decoded indices
    pub fn indices(&self) -> impl Iterator<Item = u16> + '_ {
        self.index_bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
    }
}

/// Validate a mesh payload
///
/// Rejects unknown format bits, empty meshes, wrong section sizes and indices
/// that point past the last vertex.
pub fn parse_mesh(bytes: &[u8]) -> Result<MeshView<'_>, FormatError> {
    let header = MeshHeader::from_bytes(bytes).ok_or(FormatError::TruncatedHeader {
        len: bytes.len(),
        needed: MeshHeader::SIZE,
    })?;
    if header.format & !FORMAT_MASK != 0 {
        return Err(FormatError::InvalidHeader("unknown vertex format bits"));
    }
    if header.vertex_count == 0 {
        return Err(FormatError::InvalidHeader("mesh has no vertices"));
    }

    let body = &bytes[MeshHeader::SIZE..];
    let vertex_size = header.vertex_data_size();
    let index_size = header.index_count as usize * 2;
    check_exact(body.len(), vertex_size + index_size)?;

    let view = MeshView {
        header,
        vertex_data: &body[..vertex_size],
        index_bytes: &body[vertex_size..],
    };
    if let Some(index) = view.indices().find(|&i| i as u32 >= header.vertex_count) {
        return Err(FormatError::IndexOutOfRange {
            index,
            vertex_count: header.vertex_count,
        });
    }
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_bytes(vertex_count: u32, format: u8, indices: &[u16]) -> Vec<u8> {
        let header = MeshHeader::new(vertex_count, indices.len() as u32, format);
        let mut bytes = header.to_bytes().to_vec();
        bytes.resize(MeshHeader::SIZE + header.vertex_data_size(), 0);
        for i in indices {
            bytes.extend_from_slice(&i.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_vertex_stride() {
        assert_eq!(vertex_stride_packed(0), 8);
        assert_eq!(vertex_stride_packed(FORMAT_UV | FORMAT_NORMAL), 16);
        assert_eq!(vertex_stride_packed(FORMAT_MASK), 28);
    }

    #[test]
    fn test_parse_indexed_mesh() {
        let bytes = mesh_bytes(3, FORMAT_UV, &[0, 1, 2]);
        let view = parse_mesh(&bytes).unwrap();
        assert_eq!(view.vertex_data.len(), 36);
        assert_eq!(view.indices().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_parse_mesh_rejects_out_of_range_index() {
        let bytes = mesh_bytes(3, 0, &[0, 1, 3]);
        assert_eq!(
            parse_mesh(&bytes).unwrap_err(),
            FormatError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        );
    }

    #[test]
    fn test_parse_mesh_rejects_bad_header() {
        assert!(parse_mesh(&mesh_bytes(0, 0, &[])).is_err());
        assert!(parse_mesh(&mesh_bytes(3, 0x10, &[])).is_err());
        let mut short = mesh_bytes(3, 0, &[]);
        short.pop();
        assert!(matches!(
            parse_mesh(&short),
            Err(FormatError::TruncatedBody { .. })
        ));
    }
}
