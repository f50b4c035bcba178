use super::internal::conversions::{clear_depth_stencil_texel, encode_clear_color};
use crate::soft::{KilnBufferSoft, KilnDeviceSoft, SoftHandle};
use crate::{KilnClearFlags, KilnError, KilnResult, KilnTextureInfo};

fn texture_info(buffer: &KilnBufferSoft) -> KilnResult<&KilnTextureInfo> {
    buffer
        .texture_info()
        .ok_or_else(|| KilnError::StringError("Views need a texture buffer".to_string()))
}

#[derive(Clone, Debug)]
pub struct KilnRenderTargetViewSoft {
    handle: SoftHandle,
    buffer: KilnBufferSoft,
    mip_slice: u32,
}

impl KilnRenderTargetViewSoft {
    pub fn new(
        device: &KilnDeviceSoft,
        buffer: &KilnBufferSoft,
        mip_slice: u32,
    ) -> KilnResult<Self> {
        texture_info(buffer)?;

        let handle = device.allocate_handle();
        log::trace!(
            "Created render target view {:?} of buffer {:?} mip {}",
            handle,
            buffer.handle(),
            mip_slice
        );

        Ok(KilnRenderTargetViewSoft {
            handle,
            buffer: buffer.clone(),
            mip_slice,
        })
    }

    pub fn handle(&self) -> SoftHandle {
        self.handle
    }

    pub fn buffer(&self) -> &KilnBufferSoft {
        &self.buffer
    }

    pub fn mip_slice(&self) -> u32 {
        self.mip_slice
    }

    /// Writes `color` to every texel of the view's mip in every array slice
    pub(crate) fn clear(
        &self,
        color: [f32; 4],
    ) -> KilnResult<()> {
        let texture = texture_info(&self.buffer)?;
        let texel = encode_clear_color(texture.format, color).ok_or_else(|| {
            KilnError::StringError(format!("{:?} can't be cleared as a color", texture.format))
        })?;

        for array_slice in 0..texture.array_size {
            let subresource = texture.subresource_index(self.mip_slice, array_slice);
            self.buffer.fill_rows(subresource, |row| {
                for chunk in row.chunks_exact_mut(texel.len()) {
                    chunk.copy_from_slice(&texel);
                }
            })?;
        }

        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct KilnTextureViewSoft {
    handle: SoftHandle,
    buffer: KilnBufferSoft,
    most_detailed_mip: u32,
    mip_levels: u32,
}

impl KilnTextureViewSoft {
    pub fn new(
        device: &KilnDeviceSoft,
        buffer: &KilnBufferSoft,
        most_detailed_mip: u32,
        mip_levels: u32,
    ) -> KilnResult<Self> {
        texture_info(buffer)?;

        let handle = device.allocate_handle();
        log::trace!(
            "Created texture view {:?} of buffer {:?} mips {}..{}",
            handle,
            buffer.handle(),
            most_detailed_mip,
            most_detailed_mip + mip_levels
        );

        Ok(KilnTextureViewSoft {
            handle,
            buffer: buffer.clone(),
            most_detailed_mip,
            mip_levels,
        })
    }

    pub fn handle(&self) -> SoftHandle {
        self.handle
    }

    pub fn buffer(&self) -> &KilnBufferSoft {
        &self.buffer
    }

    pub fn most_detailed_mip(&self) -> u32 {
        self.most_detailed_mip
    }

    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }
}

#[derive(Clone, Debug)]
pub struct KilnDepthStencilViewSoft {
    handle: SoftHandle,
    buffer: KilnBufferSoft,
    mip_slice: u32,
}

impl KilnDepthStencilViewSoft {
    pub fn new(
        device: &KilnDeviceSoft,
        buffer: &KilnBufferSoft,
        mip_slice: u32,
    ) -> KilnResult<Self> {
        texture_info(buffer)?;

        let handle = device.allocate_handle();
        log::trace!(
            "Created depth stencil view {:?} of buffer {:?} mip {}",
            handle,
            buffer.handle(),
            mip_slice
        );

        Ok(KilnDepthStencilViewSoft {
            handle,
            buffer: buffer.clone(),
            mip_slice,
        })
    }

    pub fn handle(&self) -> SoftHandle {
        self.handle
    }

    pub fn buffer(&self) -> &KilnBufferSoft {
        &self.buffer
    }

    pub fn mip_slice(&self) -> u32 {
        self.mip_slice
    }

    pub(crate) fn clear(
        &self,
        flags: KilnClearFlags,
        depth: f32,
        stencil: u8,
    ) -> KilnResult<()> {
        let texture = texture_info(&self.buffer)?;
        let texel_byte_width = texture.format.info().block_byte_width as usize;

        for array_slice in 0..texture.array_size {
            let subresource = texture.subresource_index(self.mip_slice, array_slice);
            self.buffer.fill_rows(subresource, |row| {
                for texel in row.chunks_exact_mut(texel_byte_width) {
                    clear_depth_stencil_texel(texel, flags, depth, stencil);
                }
            })?;
        }

        Ok(())
    }
}
