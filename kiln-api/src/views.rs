use crate::soft::{KilnDepthStencilViewSoft, KilnRenderTargetViewSoft, KilnTextureViewSoft};
use crate::*;

fn texture_info<'a>(
    buffer: &'a KilnBuffer,
    view_name: &str,
) -> KilnResult<&'a KilnTextureInfo> {
    buffer.texture_info().ok_or_else(|| {
        KilnError::StringError(format!(
            "{} views need a texture buffer, got a {:?} buffer",
            view_name,
            buffer.buffer_info().buffer_type
        ))
    })
}

pub(crate) fn verify_render_target_view(
    buffer: &KilnBuffer,
    view_def: &KilnRenderTargetViewDef,
) -> KilnResult<()> {
    let texture = texture_info(buffer, "Render target")?;
    if !texture.bind_flags.contains(KilnTextureBindFlags::RENDER_TARGET) {
        return Err("Render target views need a texture created with the RENDER_TARGET bind flag")?;
    }

    if view_def.mip_slice >= texture.mip_levels {
        return Err(format!(
            "Render target view mip slice {} is out of range, texture has {} mips",
            view_def.mip_slice, texture.mip_levels
        ))?;
    }

    Ok(())
}

/// Returns the number of mips the view covers
pub(crate) fn verify_texture_view(
    buffer: &KilnBuffer,
    view_def: &KilnTextureViewDef,
) -> KilnResult<u32> {
    let texture = texture_info(buffer, "Texture")?;
    if !texture.bind_flags.contains(KilnTextureBindFlags::SHADER_RESOURCE) {
        return Err("Texture views need a texture created with the SHADER_RESOURCE bind flag")?;
    }

    if view_def.most_detailed_mip >= texture.mip_levels {
        return Err(format!(
            "Texture view most detailed mip {} is out of range, texture has {} mips",
            view_def.most_detailed_mip, texture.mip_levels
        ))?;
    }

    let remaining = texture.mip_levels - view_def.most_detailed_mip;
    let mip_levels = if view_def.mip_levels == 0 {
        remaining
    } else {
        view_def.mip_levels
    };

    if mip_levels > remaining {
        return Err(format!(
            "Texture view requests {} mips from mip {}, texture has {} mips",
            mip_levels, view_def.most_detailed_mip, texture.mip_levels
        ))?;
    }

    Ok(mip_levels)
}

pub(crate) fn verify_depth_stencil_view(
    buffer: &KilnBuffer,
    view_def: &KilnDepthStencilViewDef,
) -> KilnResult<()> {
    let buffer_type = buffer.buffer_info().buffer_type;
    if buffer_type != KilnBufferType::Texture2D && buffer_type != KilnBufferType::Texture2DMultisample
    {
        return Err(format!(
            "Depth stencil views need a Texture2D or Texture2DMultisample buffer, got {:?}",
            buffer_type
        ))?;
    }

    let texture = texture_info(buffer, "Depth stencil")?;
    if texture.format != KilnFormat::D24_UNORM_S8_UINT {
        return Err(format!(
            "Depth stencil views need a D24_UNORM_S8_UINT texture, got {:?}",
            texture.format
        ))?;
    }

    if !texture.bind_flags.contains(KilnTextureBindFlags::DEPTH_STENCIL) {
        return Err("Depth stencil views need a texture created with the DEPTH_STENCIL bind flag")?;
    }

    if view_def.mip_slice >= texture.mip_levels {
        return Err(format!(
            "Depth stencil view mip slice {} is out of range, texture has {} mips",
            view_def.mip_slice, texture.mip_levels
        ))?;
    }

    Ok(())
}

/// A mip of a texture that can be drawn into. Keeps the texture alive.
#[derive(Clone, Debug)]
pub enum KilnRenderTargetView {
    Soft(KilnRenderTargetViewSoft),
}

impl KilnRenderTargetView {
    pub fn buffer(&self) -> KilnBuffer {
        match self {
            KilnRenderTargetView::Soft(inner) => KilnBuffer::Soft(inner.buffer().clone()),
        }
    }

    pub fn mip_slice(&self) -> u32 {
        match self {
            KilnRenderTargetView::Soft(inner) => inner.mip_slice(),
        }
    }

    pub fn soft_render_target_view(&self) -> Option<&KilnRenderTargetViewSoft> {
        match self {
            KilnRenderTargetView::Soft(inner) => Some(inner),
        }
    }
}

/// A range of mips of a texture that shaders can sample. Keeps the texture alive.
#[derive(Clone, Debug)]
pub enum KilnTextureView {
    Soft(KilnTextureViewSoft),
}

impl KilnTextureView {
    pub fn buffer(&self) -> KilnBuffer {
        match self {
            KilnTextureView::Soft(inner) => KilnBuffer::Soft(inner.buffer().clone()),
        }
    }

    pub fn most_detailed_mip(&self) -> u32 {
        match self {
            KilnTextureView::Soft(inner) => inner.most_detailed_mip(),
        }
    }

    pub fn mip_levels(&self) -> u32 {
        match self {
            KilnTextureView::Soft(inner) => inner.mip_levels(),
        }
    }

    pub fn soft_texture_view(&self) -> Option<&KilnTextureViewSoft> {
        match self {
            KilnTextureView::Soft(inner) => Some(inner),
        }
    }
}

/// A mip of a D24S8 texture used for depth and stencil testing. Keeps the texture alive.
#[derive(Clone, Debug)]
pub enum KilnDepthStencilView {
    Soft(KilnDepthStencilViewSoft),
}

impl KilnDepthStencilView {
    pub fn buffer(&self) -> KilnBuffer {
        match self {
            KilnDepthStencilView::Soft(inner) => KilnBuffer::Soft(inner.buffer().clone()),
        }
    }

    pub fn mip_slice(&self) -> u32 {
        match self {
            KilnDepthStencilView::Soft(inner) => inner.mip_slice(),
        }
    }

    pub fn soft_depth_stencil_view(&self) -> Option<&KilnDepthStencilViewSoft> {
        match self {
            KilnDepthStencilView::Soft(inner) => Some(inner),
        }
    }
}
