#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Size metadata for a `KilnFormat`.
///
/// Block-compressed and packed formats report a `channel_byte_width` of 0 since their channels
/// are not individually addressable. Use `block_byte_width` for all size math.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KilnFormatInfo {
    pub channel_count: u32,
    pub channel_byte_width: u32,
    /// Pixels along each edge of a compression block, 1 for uncompressed formats
    pub block_size: u32,
    /// Bytes per block (bytes per pixel for uncompressed formats)
    pub block_byte_width: u32,
}

impl KilnFormatInfo {
    const fn uncompressed(
        channel_count: u32,
        channel_byte_width: u32,
    ) -> Self {
        KilnFormatInfo {
            channel_count,
            channel_byte_width,
            block_size: 1,
            block_byte_width: channel_count * channel_byte_width,
        }
    }

    const fn block(
        channel_count: u32,
        block_size: u32,
        block_byte_width: u32,
    ) -> Self {
        KilnFormatInfo {
            channel_count,
            channel_byte_width: 0,
            block_size,
            block_byte_width,
        }
    }
}

/// How the components of a format are interpreted by a shader
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnComponentKind {
    /// Float, UNORM and SNORM formats
    Float,
    Uint,
    Sint,
}

/// Pixel and vertex element formats
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnFormat {
    UNKNOWN,

    R32G32B32A32_FLOAT,
    R32G32B32A32_UINT,
    R32G32B32A32_SINT,
    R32G32B32_FLOAT,
    R32G32B32_UINT,
    R32G32B32_SINT,
    R32G32_FLOAT,
    R32G32_UINT,
    R32G32_SINT,
    R32_FLOAT,
    R32_UINT,
    R32_SINT,

    R16G16B16A16_FLOAT,
    R16G16B16A16_UNORM,
    R16G16B16A16_UINT,
    R16G16B16A16_SNORM,
    R16G16B16A16_SINT,
    R16G16_FLOAT,
    R16G16_UNORM,
    R16G16_UINT,
    R16G16_SNORM,
    R16G16_SINT,
    R16_FLOAT,
    R16_UNORM,
    R16_UINT,
    R16_SNORM,
    R16_SINT,

    R8G8B8A8_UNORM,
    R8G8B8A8_UINT,
    R8G8B8A8_SNORM,
    R8G8B8A8_SINT,
    R8G8_UNORM,
    R8G8_UINT,
    R8G8_SNORM,
    R8G8_SINT,
    R8_UNORM,
    R8_UINT,
    R8_SNORM,
    R8_SINT,

    D24_UNORM_S8_UINT,

    BC1_UNORM,
    BC3_UNORM,
}

impl Default for KilnFormat {
    fn default() -> Self {
        KilnFormat::UNKNOWN
    }
}

impl KilnFormat {
    pub const ALL: [KilnFormat; 43] = [
        KilnFormat::UNKNOWN,
        KilnFormat::R32G32B32A32_FLOAT,
        KilnFormat::R32G32B32A32_UINT,
        KilnFormat::R32G32B32A32_SINT,
        KilnFormat::R32G32B32_FLOAT,
        KilnFormat::R32G32B32_UINT,
        KilnFormat::R32G32B32_SINT,
        KilnFormat::R32G32_FLOAT,
        KilnFormat::R32G32_UINT,
        KilnFormat::R32G32_SINT,
        KilnFormat::R32_FLOAT,
        KilnFormat::R32_UINT,
        KilnFormat::R32_SINT,
        KilnFormat::R16G16B16A16_FLOAT,
        KilnFormat::R16G16B16A16_UNORM,
        KilnFormat::R16G16B16A16_UINT,
        KilnFormat::R16G16B16A16_SNORM,
        KilnFormat::R16G16B16A16_SINT,
        KilnFormat::R16G16_FLOAT,
        KilnFormat::R16G16_UNORM,
        KilnFormat::R16G16_UINT,
        KilnFormat::R16G16_SNORM,
        KilnFormat::R16G16_SINT,
        KilnFormat::R16_FLOAT,
        KilnFormat::R16_UNORM,
        KilnFormat::R16_UINT,
        KilnFormat::R16_SNORM,
        KilnFormat::R16_SINT,
        KilnFormat::R8G8B8A8_UNORM,
        KilnFormat::R8G8B8A8_UINT,
        KilnFormat::R8G8B8A8_SNORM,
        KilnFormat::R8G8B8A8_SINT,
        KilnFormat::R8G8_UNORM,
        KilnFormat::R8G8_UINT,
        KilnFormat::R8G8_SNORM,
        KilnFormat::R8G8_SINT,
        KilnFormat::R8_UNORM,
        KilnFormat::R8_UINT,
        KilnFormat::R8_SNORM,
        KilnFormat::R8_SINT,
        KilnFormat::D24_UNORM_S8_UINT,
        KilnFormat::BC1_UNORM,
        KilnFormat::BC3_UNORM,
    ];

    /// Size metadata for the format. Defined for every value, including `UNKNOWN` (which reports
    /// zero channels and zero bytes).
    pub fn info(self) -> KilnFormatInfo {
        use KilnFormat::*;
        match self {
            UNKNOWN => KilnFormatInfo {
                channel_count: 0,
                channel_byte_width: 0,
                block_size: 1,
                block_byte_width: 0,
            },

            R32G32B32A32_FLOAT | R32G32B32A32_UINT | R32G32B32A32_SINT => {
                KilnFormatInfo::uncompressed(4, 4)
            }
            R32G32B32_FLOAT | R32G32B32_UINT | R32G32B32_SINT => KilnFormatInfo::uncompressed(3, 4),
            R32G32_FLOAT | R32G32_UINT | R32G32_SINT => KilnFormatInfo::uncompressed(2, 4),
            R32_FLOAT | R32_UINT | R32_SINT => KilnFormatInfo::uncompressed(1, 4),

            R16G16B16A16_FLOAT | R16G16B16A16_UNORM | R16G16B16A16_UINT | R16G16B16A16_SNORM
            | R16G16B16A16_SINT => KilnFormatInfo::uncompressed(4, 2),
            R16G16_FLOAT | R16G16_UNORM | R16G16_UINT | R16G16_SNORM | R16G16_SINT => {
                KilnFormatInfo::uncompressed(2, 2)
            }
            R16_FLOAT | R16_UNORM | R16_UINT | R16_SNORM | R16_SINT => {
                KilnFormatInfo::uncompressed(1, 2)
            }

            R8G8B8A8_UNORM | R8G8B8A8_UINT | R8G8B8A8_SNORM | R8G8B8A8_SINT => {
                KilnFormatInfo::uncompressed(4, 1)
            }
            R8G8_UNORM | R8G8_UINT | R8G8_SNORM | R8G8_SINT => KilnFormatInfo::uncompressed(2, 1),
            R8_UNORM | R8_UINT | R8_SNORM | R8_SINT => KilnFormatInfo::uncompressed(1, 1),

            // 24 bits of depth and 8 bits of stencil packed into one 32-bit texel
            D24_UNORM_S8_UINT => KilnFormatInfo {
                channel_count: 2,
                channel_byte_width: 0,
                block_size: 1,
                block_byte_width: 4,
            },

            BC1_UNORM => KilnFormatInfo::block(4, 4, 8),
            BC3_UNORM => KilnFormatInfo::block(4, 4, 16),
        }
    }

    pub fn is_depth_stencil(self) -> bool {
        self == KilnFormat::D24_UNORM_S8_UINT
    }

    pub fn is_block_compressed(self) -> bool {
        self.info().block_size > 1
    }

    /// Bytes occupied by one vertex element of this format
    pub fn element_byte_width(self) -> u32 {
        self.info().block_byte_width
    }

    /// Valid formats for an index buffer
    pub fn is_index_format(self) -> bool {
        self == KilnFormat::R16_UINT || self == KilnFormat::R32_UINT
    }

    /// How a shader reads the format. `None` for formats that can't feed a shader input directly
    /// (`UNKNOWN`, depth/stencil, block compressed).
    pub fn component_kind(self) -> Option<KilnComponentKind> {
        use KilnFormat::*;
        match self {
            UNKNOWN | D24_UNORM_S8_UINT | BC1_UNORM | BC3_UNORM => None,

            R32G32B32A32_UINT | R32G32B32_UINT | R32G32_UINT | R32_UINT | R16G16B16A16_UINT
            | R16G16_UINT | R16_UINT | R8G8B8A8_UINT | R8G8_UINT | R8_UINT => {
                Some(KilnComponentKind::Uint)
            }

            R32G32B32A32_SINT | R32G32B32_SINT | R32G32_SINT | R32_SINT | R16G16B16A16_SINT
            | R16G16_SINT | R16_SINT | R8G8B8A8_SINT | R8G8_SINT | R8_SINT => {
                Some(KilnComponentKind::Sint)
            }

            _ => Some(KilnComponentKind::Float),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_info_is_total() {
        for format in KilnFormat::ALL.iter() {
            let info = format.info();
            assert!(info.block_size >= 1, "{:?} has a zero block size", format);
            if *format != KilnFormat::UNKNOWN {
                assert!(info.block_byte_width > 0, "{:?} has no byte width", format);
                assert!(info.channel_count > 0);
            }
        }

        let unknown = KilnFormat::UNKNOWN.info();
        assert_eq!(unknown.channel_count, 0);
        assert_eq!(unknown.block_byte_width, 0);
    }

    #[test]
    fn uncompressed_widths_are_channel_products() {
        for format in KilnFormat::ALL.iter() {
            let info = format.info();
            if info.channel_byte_width > 0 {
                assert_eq!(
                    info.block_byte_width,
                    info.channel_count * info.channel_byte_width
                );
                assert_eq!(info.block_size, 1);
            }
        }
    }

    #[test]
    fn block_compressed_formats() {
        assert_eq!(KilnFormat::BC1_UNORM.info().block_size, 4);
        assert_eq!(KilnFormat::BC1_UNORM.info().block_byte_width, 8);
        assert_eq!(KilnFormat::BC3_UNORM.info().block_byte_width, 16);
        assert!(KilnFormat::BC3_UNORM.is_block_compressed());
        assert!(!KilnFormat::R8G8B8A8_UNORM.is_block_compressed());
        assert_eq!(KilnFormat::BC1_UNORM.component_kind(), None);
    }

    #[test]
    fn component_kinds() {
        assert_eq!(
            KilnFormat::R16G16_SNORM.component_kind(),
            Some(KilnComponentKind::Float)
        );
        assert_eq!(
            KilnFormat::R8G8B8A8_UINT.component_kind(),
            Some(KilnComponentKind::Uint)
        );
        assert_eq!(
            KilnFormat::R32_SINT.component_kind(),
            Some(KilnComponentKind::Sint)
        );
        assert!(KilnFormat::R16_UINT.is_index_format());
        assert!(!KilnFormat::R16_UNORM.is_index_format());
    }
}
