use crate::types::*;
use crate::KilnResult;

/// Byte geometry of one subresource (a mip level of one array slice)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KilnSubresourceLayout {
    /// Pixel extents of the mip, floored at the format's block size
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    /// Bytes of meaningful data in one row of blocks
    pub row_byte_width: u32,
    /// Rows of blocks per depth slice
    pub row_count: u32,
    pub depth_count: u32,
}

impl KilnSubresourceLayout {
    /// Size of the subresource with tightly packed rows
    pub fn packed_byte_size(&self) -> u64 {
        self.row_byte_width as u64 * self.row_count as u64 * self.depth_count as u64
    }
}

/// Immutable description of a texture buffer, with every extent normalized
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KilnTextureInfo {
    pub format: KilnFormat,
    pub extents: KilnExtents3D,
    pub mip_levels: u32,
    pub array_size: u32,
    pub samples_count: u32,
    pub samples_quality: u32,
    pub bind_flags: KilnTextureBindFlags,
}

impl KilnTextureInfo {
    /// Clamps extents to 1 and resolves `mip_levels == 0` to the full chain. `samples_quality` is
    /// the already-resolved quality level.
    pub fn from_def(
        def: &KilnTextureBufferDef,
        samples_quality: u32,
    ) -> Self {
        let extents = KilnExtents3D {
            width: def.width.max(1),
            height: def.height.max(1),
            depth: def.depth.max(1),
        };

        let mip_levels = if def.mip_levels == 0 {
            Self::full_mip_chain_length(extents.width, extents.height, extents.depth)
        } else {
            def.mip_levels
        };

        KilnTextureInfo {
            format: def.format,
            extents,
            mip_levels,
            array_size: def.array_size.max(1),
            samples_count: def.samples_count.max(1),
            samples_quality,
            bind_flags: def.bind_flags,
        }
    }

    /// Mip count of a chain that halves down to 1x1x1
    pub fn full_mip_chain_length(
        width: u32,
        height: u32,
        depth: u32,
    ) -> u32 {
        let largest = width.max(height).max(depth).max(1);
        32 - largest.leading_zeros()
    }

    pub fn subresource_count(&self) -> u32 {
        self.mip_levels * self.array_size
    }

    pub fn subresource_index(
        &self,
        mip_slice: u32,
        array_slice: u32,
    ) -> u32 {
        mip_slice + array_slice * self.mip_levels
    }

    /// Splits a subresource index into (mip slice, array slice)
    pub fn subresource_mip_and_slice(
        &self,
        subresource: u32,
    ) -> (u32, u32) {
        (
            subresource % self.mip_levels,
            subresource / self.mip_levels,
        )
    }

    /// Width and height halve per level but never drop below the block size, depth never drops
    /// below 1. This holds for non power of two extents too.
    pub fn mip_extents(
        &self,
        mip_slice: u32,
    ) -> KilnExtents3D {
        let block_size = self.format.info().block_size;
        KilnExtents3D {
            width: block_size.max(self.extents.width.checked_shr(mip_slice).unwrap_or(0)),
            height: block_size.max(self.extents.height.checked_shr(mip_slice).unwrap_or(0)),
            depth: 1u32.max(self.extents.depth.checked_shr(mip_slice).unwrap_or(0)),
        }
    }

    pub fn mip_layout(
        &self,
        mip_slice: u32,
    ) -> KilnSubresourceLayout {
        let info = self.format.info();
        let extents = self.mip_extents(mip_slice);
        KilnSubresourceLayout {
            width: extents.width,
            height: extents.height,
            depth: extents.depth,
            // Exact for extents that passed KilnTextureBufferDef::verify
            row_byte_width: (extents.width / info.block_size).saturating_mul(info.block_byte_width),
            row_count: extents.height / info.block_size,
            depth_count: extents.depth,
        }
    }

    /// Sum of every mip's packed size, times the array size
    pub fn byte_size(&self) -> u64 {
        let per_slice: u64 = (0..self.mip_levels)
            .map(|mip| self.mip_layout(mip).packed_byte_size())
            .sum();
        per_slice * self.array_size as u64
    }
}

/// Immutable attributes of any buffer
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KilnBufferInfo {
    pub buffer_type: KilnBufferType,
    pub usage: KilnBufferUsage,
    pub access: KilnCpuAccess,
    pub byte_size: u64,
    pub subresource_count: u32,
    /// Set for texture buffer types only
    pub texture: Option<KilnTextureInfo>,
}

impl KilnBufferInfo {
    pub fn for_buffer(
        buffer_type: KilnBufferType,
        def: &KilnBufferDef,
    ) -> Self {
        KilnBufferInfo {
            buffer_type,
            usage: def.usage,
            access: def.access,
            byte_size: def.size,
            subresource_count: 1,
            texture: None,
        }
    }

    pub fn for_texture(
        def: &KilnTextureBufferDef,
        texture: KilnTextureInfo,
    ) -> Self {
        KilnBufferInfo {
            buffer_type: def.buffer_type,
            usage: def.usage,
            access: def.access,
            byte_size: texture.byte_size(),
            subresource_count: texture.subresource_count(),
            texture: Some(texture),
        }
    }

    /// Non-texture buffers have a single subresource made of a single row
    pub fn subresource_layout(
        &self,
        subresource: u32,
    ) -> KilnResult<KilnSubresourceLayout> {
        if subresource >= self.subresource_count {
            return Err(format!(
                "Subresource {} is out of range, buffer has {}",
                subresource, self.subresource_count
            ))?;
        }

        match &self.texture {
            Some(texture) => {
                let (mip_slice, _) = texture.subresource_mip_and_slice(subresource);
                Ok(texture.mip_layout(mip_slice))
            }
            None => {
                if self.byte_size > u32::MAX as u64 {
                    return Err(format!(
                        "Buffer of {} bytes is too large to address as a single row",
                        self.byte_size
                    ))?;
                }

                Ok(KilnSubresourceLayout {
                    width: self.byte_size as u32,
                    height: 1,
                    depth: 1,
                    row_byte_width: self.byte_size as u32,
                    row_count: 1,
                    depth_count: 1,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture_info(def: &KilnTextureBufferDef) -> KilnTextureInfo {
        KilnTextureInfo::from_def(def, 0)
    }

    #[test]
    fn rgba8_single_mip_size() {
        let def = KilnTextureBufferDef::texture_2d(256, 256, KilnFormat::R8G8B8A8_UNORM);
        assert_eq!(texture_info(&def).byte_size(), 256 * 256 * 4);
    }

    #[test]
    fn rgba8_full_chain_size() {
        let def = KilnTextureBufferDef {
            mip_levels: 9,
            ..KilnTextureBufferDef::texture_2d(256, 256, KilnFormat::R8G8B8A8_UNORM)
        };
        let info = texture_info(&def);
        assert_eq!(info.byte_size(), 349524);

        // 0 requests the same chain
        let full = KilnTextureBufferDef { mip_levels: 0, ..def };
        let full_info = texture_info(&full);
        assert_eq!(full_info.mip_levels, 9);
        assert_eq!(full_info.byte_size(), 349524);
    }

    #[test]
    fn bc1_size() {
        let def = KilnTextureBufferDef::texture_2d(64, 64, KilnFormat::BC1_UNORM);
        let info = texture_info(&def);
        assert_eq!(info.byte_size(), 2048);

        let layout = info.mip_layout(0);
        assert_eq!(layout.row_byte_width, 16 * 8);
        assert_eq!(layout.row_count, 16);
    }

    #[test]
    fn block_compressed_mips_floor_at_block_size() {
        let def = KilnTextureBufferDef {
            mip_levels: 0,
            ..KilnTextureBufferDef::texture_2d(16, 16, KilnFormat::BC3_UNORM)
        };
        let info = texture_info(&def);
        assert_eq!(info.mip_levels, 5);

        // 16, 8, then 4x4 for the last three mips
        let last = info.mip_layout(4);
        assert_eq!(last.width, 4);
        assert_eq!(last.height, 4);
        assert_eq!(last.row_count, 1);
        assert_eq!(last.row_byte_width, 16);
        assert_eq!(info.byte_size(), 16 * (16 + 4 + 1 + 1 + 1));
    }

    #[test]
    fn non_power_of_two_halving() {
        let def = KilnTextureBufferDef {
            mip_levels: 0,
            ..KilnTextureBufferDef::texture_2d(100, 30, KilnFormat::R8_UNORM)
        };
        let info = texture_info(&def);
        assert_eq!(info.mip_levels, 7);

        let widths: Vec<u32> = (0..info.mip_levels)
            .map(|mip| info.mip_extents(mip).width)
            .collect();
        let heights: Vec<u32> = (0..info.mip_levels)
            .map(|mip| info.mip_extents(mip).height)
            .collect();
        assert_eq!(widths, vec![100, 50, 25, 12, 6, 3, 1]);
        assert_eq!(heights, vec![30, 15, 7, 3, 1, 1, 1]);
    }

    #[test]
    fn volume_and_array_sizes() {
        let volume = KilnTextureBufferDef {
            buffer_type: KilnBufferType::Texture3D,
            depth: 4,
            mip_levels: 0,
            ..KilnTextureBufferDef::texture_2d(4, 4, KilnFormat::R32_FLOAT)
        };
        let info = texture_info(&volume);
        assert_eq!(info.mip_levels, 3);
        assert_eq!(info.mip_layout(1).depth_count, 2);
        assert_eq!(info.byte_size(), 4 * (64 + 8 + 1));

        let array = KilnTextureBufferDef {
            buffer_type: KilnBufferType::Texture2DArray,
            array_size: 3,
            mip_levels: 2,
            ..KilnTextureBufferDef::texture_2d(8, 8, KilnFormat::R8G8B8A8_UNORM)
        };
        let info = texture_info(&array);
        assert_eq!(info.subresource_count(), 6);
        assert_eq!(info.subresource_index(1, 2), 5);
        assert_eq!(info.subresource_mip_and_slice(5), (1, 2));
        assert_eq!(info.byte_size(), 3 * 4 * (64 + 16));
    }

    #[test]
    fn extents_clamp_to_one() {
        let def = KilnTextureBufferDef {
            width: 0,
            height: 0,
            depth: 0,
            ..Default::default()
        };
        let info = texture_info(&def);
        assert_eq!(
            info.extents,
            KilnExtents3D {
                width: 1,
                height: 1,
                depth: 1
            }
        );
        assert_eq!(info.byte_size(), 4);
    }

    #[test]
    fn plain_buffers_are_one_row() {
        let def = KilnBufferDef {
            size: 48,
            ..Default::default()
        };
        let info = KilnBufferInfo::for_buffer(KilnBufferType::Vertex, &def);
        let layout = info.subresource_layout(0).unwrap();
        assert_eq!(layout.row_byte_width, 48);
        assert_eq!(layout.row_count, 1);
        assert!(info.subresource_layout(1).is_err());
    }
}
