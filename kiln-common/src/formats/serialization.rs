//! Binary serialization trait for format headers.

/// Fixed-size little-endian format header
///
/// Generic code (tests, tooling) goes through this trait. Each header also
/// has a type-specific `to_bytes()` returning a fixed-size array.
pub trait BinarySerializable: Sized {
    /// Size of the serialized header in bytes.
    const SIZE: usize;

    /// Serialize to bytes.
    fn serialize(&self) -> Vec<u8>;

    /// Deserialize from bytes.
    ///
    /// Returns `None` if the byte slice is too short.
    fn deserialize(bytes: &[u8]) -> Option<Self>;
}

macro_rules! impl_binary_serializable {
    ($($header:ty),* $(,)?) => {
        $(
            impl BinarySerializable for $header {
                const SIZE: usize = <$header>::SIZE;

                fn serialize(&self) -> Vec<u8> {
                    self.to_bytes().to_vec()
                }

                fn deserialize(bytes: &[u8]) -> Option<Self> {
                    Self::from_bytes(bytes)
                }
            }
        )*
    };
}

impl_binary_serializable!(
    super::TextureHeader,
    super::MeshHeader,
    super::SkeletonHeader,
    super::SoundHeader,
    super::KeyframeHeader,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{KeyframeHeader, MeshHeader, SkeletonHeader, SoundHeader, TextureHeader};

    fn header_size<T: BinarySerializable>() -> usize {
        T::SIZE
    }

    #[test]
    fn test_header_sizes() {
        assert_eq!(header_size::<TextureHeader>(), 4);
        assert_eq!(header_size::<MeshHeader>(), 12);
        assert_eq!(header_size::<SkeletonHeader>(), 8);
        assert_eq!(header_size::<SoundHeader>(), 8);
        assert_eq!(header_size::<KeyframeHeader>(), 4);
    }

    #[test]
    fn test_mesh_header_trait() {
        let bytes = MeshHeader::new(100, 300, 0x07).serialize();
        assert_eq!(bytes.len(), MeshHeader::SIZE);
        let parsed = MeshHeader::deserialize(&bytes).unwrap();
        assert_eq!(parsed.vertex_count, 100);
        assert_eq!(parsed.index_count, 300);
        assert_eq!(parsed.format, 0x07);
    }

    #[test]
    fn test_deserialize_insufficient_bytes() {
        assert!(MeshHeader::deserialize(&[0; 11]).is_none());
        assert!(TextureHeader::deserialize(&[0; 3]).is_none());
        assert!(SkeletonHeader::deserialize(&[0; 7]).is_none());
        assert!(SoundHeader::deserialize(&[0; 7]).is_none());
        assert!(KeyframeHeader::deserialize(&[0; 3]).is_none());
    }
}
