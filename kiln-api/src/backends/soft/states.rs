use crate::soft::{KilnDeviceSoft, SoftHandle};
use crate::{
    KilnBlendStateDef, KilnBlendStateRenderTarget, KilnDepthStencilStateDef, KilnRasterizerStateDef,
    KilnResult, KilnSamplerDef, MAX_RENDER_TARGETS,
};
use std::sync::Arc;

#[derive(Debug)]
struct KilnSamplerSoftInner {
    handle: SoftHandle,
    sampler_def: KilnSamplerDef,
}

#[derive(Clone, Debug)]
pub struct KilnSamplerSoft {
    inner: Arc<KilnSamplerSoftInner>,
}

impl KilnSamplerSoft {
    pub fn handle(&self) -> SoftHandle {
        self.inner.handle
    }

    pub fn sampler_def(&self) -> &KilnSamplerDef {
        &self.inner.sampler_def
    }

    pub fn new(
        device: &KilnDeviceSoft,
        sampler_def: &KilnSamplerDef,
    ) -> KilnResult<Self> {
        sampler_def.verify()?;

        let handle = device.allocate_handle();
        log::trace!("Created sampler {:?} {:?}", handle, sampler_def);

        Ok(KilnSamplerSoft {
            inner: Arc::new(KilnSamplerSoftInner {
                handle,
                sampler_def: *sampler_def,
            }),
        })
    }
}

#[derive(Debug)]
struct KilnBlendStateSoftInner {
    handle: SoftHandle,
    blend_state_def: KilnBlendStateDef,
    // One entry per render target slot
    render_targets: [KilnBlendStateRenderTarget; MAX_RENDER_TARGETS],
}

#[derive(Clone, Debug)]
pub struct KilnBlendStateSoft {
    inner: Arc<KilnBlendStateSoftInner>,
}

impl KilnBlendStateSoft {
    pub fn handle(&self) -> SoftHandle {
        self.inner.handle
    }

    pub fn blend_state_def(&self) -> &KilnBlendStateDef {
        &self.inner.blend_state_def
    }

    /// Blend settings applied to a render target slot
    pub fn render_target(
        &self,
        index: usize,
    ) -> Option<&KilnBlendStateRenderTarget> {
        self.inner.render_targets.get(index)
    }

    pub fn new(
        device: &KilnDeviceSoft,
        blend_state_def: &KilnBlendStateDef,
    ) -> KilnResult<Self> {
        blend_state_def.verify()?;

        let handle = device.allocate_handle();
        log::trace!(
            "Created blend state {:?}, independent {}, alpha to coverage {}",
            handle,
            blend_state_def.independent_blend,
            blend_state_def.alpha_to_coverage
        );

        Ok(KilnBlendStateSoft {
            inner: Arc::new(KilnBlendStateSoftInner {
                handle,
                blend_state_def: blend_state_def.clone(),
                render_targets: blend_state_def.expanded_render_targets(),
            }),
        })
    }
}

#[derive(Debug)]
struct KilnRasterizerStateSoftInner {
    handle: SoftHandle,
    rasterizer_state_def: KilnRasterizerStateDef,
}

#[derive(Clone, Debug)]
pub struct KilnRasterizerStateSoft {
    inner: Arc<KilnRasterizerStateSoftInner>,
}

impl KilnRasterizerStateSoft {
    pub fn handle(&self) -> SoftHandle {
        self.inner.handle
    }

    pub fn rasterizer_state_def(&self) -> &KilnRasterizerStateDef {
        &self.inner.rasterizer_state_def
    }

    pub fn new(
        device: &KilnDeviceSoft,
        rasterizer_state_def: &KilnRasterizerStateDef,
    ) -> KilnResult<Self> {
        rasterizer_state_def.verify()?;

        let handle = device.allocate_handle();
        log::trace!("Created rasterizer state {:?}", handle);

        Ok(KilnRasterizerStateSoft {
            inner: Arc::new(KilnRasterizerStateSoftInner {
                handle,
                rasterizer_state_def: *rasterizer_state_def,
            }),
        })
    }
}

#[derive(Debug)]
struct KilnDepthStencilStateSoftInner {
    handle: SoftHandle,
    depth_stencil_state_def: KilnDepthStencilStateDef,
}

#[derive(Clone, Debug)]
pub struct KilnDepthStencilStateSoft {
    inner: Arc<KilnDepthStencilStateSoftInner>,
}

impl KilnDepthStencilStateSoft {
    pub fn handle(&self) -> SoftHandle {
        self.inner.handle
    }

    pub fn depth_stencil_state_def(&self) -> &KilnDepthStencilStateDef {
        &self.inner.depth_stencil_state_def
    }

    pub fn new(
        device: &KilnDeviceSoft,
        depth_stencil_state_def: &KilnDepthStencilStateDef,
    ) -> KilnResult<Self> {
        let handle = device.allocate_handle();
        log::trace!(
            "Created depth stencil state {:?}, depth test {}, stencil test {}",
            handle,
            depth_stencil_state_def.depth_test_enable,
            depth_stencil_state_def.stencil_test_enable
        );

        Ok(KilnDepthStencilStateSoft {
            inner: Arc::new(KilnDepthStencilStateSoftInner {
                handle,
                depth_stencil_state_def: *depth_stencil_state_def,
            }),
        })
    }
}
