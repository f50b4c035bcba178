use crate::soft::{
    KilnBufferSoft, KilnDeviceSoft, KilnRenderTargetViewSoft, SoftCommand, SoftHandle,
};
use crate::*;
use raw_window_handle::HasRawWindowHandle;
use std::sync::{Arc, Weak};

const SWAP_CHAIN_BUFFER_COUNT: usize = 2;

/// Two buffers. Rendering goes to the back buffer and presenting copies it to the front buffer.
pub struct KilnSwapChainSoft {
    handle: SoftHandle,
    device: KilnDeviceSoft,
    window: Weak<dyn KilnWindow>,
    swap_chain_def: KilnSwapChainDef,
    extents: KilnExtents2D,
    buffers: Vec<KilnBufferSoft>,
    render_target_view: KilnRenderTargetViewSoft,
    fullscreen: bool,
    present_count: u64,
}

impl std::fmt::Debug for KilnSwapChainSoft {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("KilnSwapChainSoft")
            .field("handle", &self.handle)
            .field("extents", &self.extents)
            .field("format", &self.swap_chain_def.format)
            .field("fullscreen", &self.fullscreen)
            .field("present_count", &self.present_count)
            .finish()
    }
}

fn client_extents(window: &dyn KilnWindow) -> KilnResult<KilnExtents2D> {
    let extents = window.client_extents();
    if extents.width == 0 || extents.height == 0 {
        return Err(format!(
            "Window client area is {}x{}, swap chains need a non-empty client area",
            extents.width, extents.height
        ))?;
    }

    Ok(extents)
}

fn create_buffers(
    device: &KilnDeviceSoft,
    swap_chain_def: &KilnSwapChainDef,
    extents: KilnExtents2D,
) -> KilnResult<(Vec<KilnBufferSoft>, KilnRenderTargetViewSoft)> {
    let texture_def = KilnTextureBufferDef {
        bind_flags: KilnTextureBindFlags::RENDER_TARGET | KilnTextureBindFlags::SHADER_RESOURCE,
        ..KilnTextureBufferDef::texture_2d(extents.width, extents.height, swap_chain_def.format)
    };

    let buffers = (0..SWAP_CHAIN_BUFFER_COUNT)
        .map(|_| KilnBufferSoft::new_texture(device, &texture_def))
        .collect::<KilnResult<Vec<_>>>()?;
    let render_target_view = KilnRenderTargetViewSoft::new(device, &buffers[0], 0)?;

    Ok((buffers, render_target_view))
}

impl KilnSwapChainSoft {
    pub fn new(
        device: &KilnDeviceSoft,
        window: &Arc<dyn KilnWindow>,
        swap_chain_def: &KilnSwapChainDef,
    ) -> KilnResult<Self> {
        let extents = client_extents(window.as_ref())?;
        let (buffers, render_target_view) = create_buffers(device, swap_chain_def, extents)?;

        let handle = device.allocate_handle();
        log::debug!(
            "Created swap chain {:?} for {:?}, {}x{} {:?}",
            handle,
            window.raw_window_handle(),
            extents.width,
            extents.height,
            swap_chain_def.format
        );
        log::debug!("Fullscreen hotkeys are disabled, use set_fullscreen to change modes");

        Ok(KilnSwapChainSoft {
            handle,
            device: device.clone(),
            window: Arc::downgrade(window),
            swap_chain_def: *swap_chain_def,
            extents,
            buffers,
            render_target_view,
            fullscreen: false,
            present_count: 0,
        })
    }

    pub fn handle(&self) -> SoftHandle {
        self.handle
    }

    pub fn swap_chain_def(&self) -> &KilnSwapChainDef {
        &self.swap_chain_def
    }

    pub fn extents(&self) -> KilnExtents2D {
        self.extents
    }

    pub fn acquire_render_target_view(&self) -> &KilnRenderTargetViewSoft {
        &self.render_target_view
    }

    /// The buffer holding the most recently presented image
    pub fn front_buffer(&self) -> &KilnBufferSoft {
        &self.buffers[SWAP_CHAIN_BUFFER_COUNT - 1]
    }

    pub fn present_count(&self) -> u64 {
        self.present_count
    }

    #[profiling::function]
    pub fn present(
        &mut self,
        render_target_view: &KilnRenderTargetViewSoft,
        present_mode: KilnPresentMode,
    ) -> KilnResult<()> {
        if render_target_view.handle() != self.render_target_view.handle() {
            return Err(format!(
                "Render target view {:?} does not belong to swap chain {:?}",
                render_target_view.handle(),
                self.handle
            ))?;
        }

        if self.window.upgrade().is_none() {
            return Err("Can't present, the swap chain's window was destroyed")?;
        }

        self.front_buffer()
            .copy_subresource_from(0, &self.buffers[0], 0)?;

        self.device.context().record(SoftCommand::Present {
            swap_chain: self.handle,
            sync_interval: present_mode.sync_interval(),
        });
        self.present_count += 1;
        Ok(())
    }

    pub fn valid(&self) -> bool {
        match self.window.upgrade() {
            Some(window) => window.client_extents() == self.extents,
            None => false,
        }
    }

    pub fn resize(&mut self) -> KilnResult<()> {
        let window = self
            .window
            .upgrade()
            .ok_or("Can't resize, the swap chain's window was destroyed")?;
        let extents = client_extents(window.as_ref())?;

        let (buffers, render_target_view) =
            create_buffers(&self.device, &self.swap_chain_def, extents)?;

        log::debug!(
            "Resized swap chain {:?} from {}x{} to {}x{}",
            self.handle,
            self.extents.width,
            self.extents.height,
            extents.width,
            extents.height
        );

        self.buffers = buffers;
        self.render_target_view = render_target_view;
        self.extents = extents;
        Ok(())
    }

    pub fn set_fullscreen(
        &mut self,
        fullscreen: bool,
    ) -> KilnResult<()> {
        if self.window.upgrade().is_none() {
            return Err("Can't change fullscreen state, the swap chain's window was destroyed")?;
        }

        self.device.context().record(SoftCommand::SetFullscreenState {
            swap_chain: self.handle,
            fullscreen,
        });
        self.fullscreen = fullscreen;
        Ok(())
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }
}
