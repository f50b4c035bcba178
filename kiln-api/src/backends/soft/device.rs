use crate::soft::*;
use crate::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

struct KilnDeviceSoftInner {
    soft_api_def: KilnApiDefSoft,
    validation_mode: KilnValidationMode,
    device_info: KilnDeviceInfo,
    next_handle: AtomicU64,
    context: SoftContext,
}

/// The CPU-memory device. All resources live in host memory and every call that would reach a
/// driver is recorded in the device's `SoftContext`.
#[derive(Clone)]
pub struct KilnDeviceSoft {
    inner: Arc<KilnDeviceSoftInner>,
}

impl std::fmt::Debug for KilnDeviceSoft {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("KilnDeviceSoft")
            .field("validation_mode", &self.inner.validation_mode)
            .field("context", &self.inner.context)
            .finish()
    }
}

impl KilnDeviceSoft {
    pub fn device_info(&self) -> &KilnDeviceInfo {
        &self.inner.device_info
    }

    /// The immediate context, which holds the command log
    pub fn context(&self) -> &SoftContext {
        &self.inner.context
    }

    pub fn validation_enabled(&self) -> bool {
        self.inner.validation_mode == KilnValidationMode::Enabled
    }

    pub fn debug_names_enabled(&self) -> bool {
        self.inner.soft_api_def.debug_names
    }

    pub fn row_pitch_alignment(&self) -> u32 {
        self.inner.soft_api_def.row_pitch_alignment
    }

    pub fn max_texture_byte_size(&self) -> u64 {
        self.inner.soft_api_def.max_texture_byte_size
    }

    pub(crate) fn allocate_handle(&self) -> SoftHandle {
        SoftHandle(self.inner.next_handle.fetch_add(1, Ordering::Relaxed))
    }

    pub fn new(
        api_def: &KilnApiDef,
        soft_api_def: &KilnApiDefSoft,
    ) -> KilnResult<Self> {
        soft_api_def.verify()?;

        let device_info = KilnDeviceInfo {
            max_render_targets: MAX_RENDER_TARGETS as u32,
            max_vertex_stream_buffers: MAX_VERTEX_STREAM_BUFFERS as u32,
            max_texture_slots: MAX_TEXTURE_SLOTS as u32,
            max_sampler_slots: MAX_SAMPLER_SLOTS as u32,
            max_constant_buffer_slots: MAX_CONSTANT_BUFFER_SLOTS as u32,
            max_sample_count: soft_api_def.max_sample_count,
            row_pitch_alignment: soft_api_def.row_pitch_alignment,
            debug_names_enabled: soft_api_def.debug_names,
        };

        log::debug!("{:#?}", device_info);

        let inner = KilnDeviceSoftInner {
            soft_api_def: soft_api_def.clone(),
            validation_mode: api_def.validation_mode,
            device_info,
            // 0 is never handed out
            next_handle: AtomicU64::new(1),
            context: SoftContext::new(soft_api_def.command_log_capacity),
        };

        Ok(KilnDeviceSoft {
            inner: Arc::new(inner),
        })
    }

    /// Number of quality levels for a sample count. 0 means the count is not supported.
    pub fn multisample_quality_levels(
        &self,
        samples_count: u32,
    ) -> u32 {
        if samples_count == 1 {
            1
        } else if samples_count.is_power_of_two()
            && samples_count <= self.inner.soft_api_def.max_sample_count
        {
            self.inner.soft_api_def.multisample_quality_levels.max(1)
        } else {
            0
        }
    }

    pub fn get_max_multisample_quality(
        &self,
        samples_count: u32,
    ) -> u32 {
        self.multisample_quality_levels(samples_count)
            .saturating_sub(1)
    }

    pub fn create_buffer(
        &self,
        buffer_type: KilnBufferType,
        buffer_def: &KilnBufferDef,
    ) -> KilnResult<KilnBufferSoft> {
        KilnBufferSoft::new(self, buffer_type, buffer_def)
    }

    pub fn create_texture_buffer(
        &self,
        texture_def: &KilnTextureBufferDef,
    ) -> KilnResult<KilnBufferSoft> {
        KilnBufferSoft::new_texture(self, texture_def)
    }

    pub fn create_render_target_view(
        &self,
        buffer: &KilnBufferSoft,
        view_def: &KilnRenderTargetViewDef,
    ) -> KilnResult<KilnRenderTargetViewSoft> {
        KilnRenderTargetViewSoft::new(self, buffer, view_def.mip_slice)
    }

    pub fn create_texture_view(
        &self,
        buffer: &KilnBufferSoft,
        most_detailed_mip: u32,
        mip_levels: u32,
    ) -> KilnResult<KilnTextureViewSoft> {
        KilnTextureViewSoft::new(self, buffer, most_detailed_mip, mip_levels)
    }

    pub fn create_depth_stencil_view(
        &self,
        buffer: &KilnBufferSoft,
        view_def: &KilnDepthStencilViewDef,
    ) -> KilnResult<KilnDepthStencilViewSoft> {
        KilnDepthStencilViewSoft::new(self, buffer, view_def.mip_slice)
    }

    pub fn create_shader(
        &self,
        shader_def: &KilnShaderDef,
    ) -> KilnResult<KilnShaderSoft> {
        KilnShaderSoft::new(self, shader_def)
    }

    pub fn create_sampler(
        &self,
        sampler_def: &KilnSamplerDef,
    ) -> KilnResult<KilnSamplerSoft> {
        KilnSamplerSoft::new(self, sampler_def)
    }

    pub fn create_blend_state(
        &self,
        blend_state_def: &KilnBlendStateDef,
    ) -> KilnResult<KilnBlendStateSoft> {
        KilnBlendStateSoft::new(self, blend_state_def)
    }

    pub fn create_rasterizer_state(
        &self,
        rasterizer_state_def: &KilnRasterizerStateDef,
    ) -> KilnResult<KilnRasterizerStateSoft> {
        KilnRasterizerStateSoft::new(self, rasterizer_state_def)
    }

    pub fn create_depth_stencil_state(
        &self,
        depth_stencil_state_def: &KilnDepthStencilStateDef,
    ) -> KilnResult<KilnDepthStencilStateSoft> {
        KilnDepthStencilStateSoft::new(self, depth_stencil_state_def)
    }

    pub fn create_vertex_layout(
        &self,
        elements: Vec<KilnVertexElement>,
    ) -> KilnResult<KilnVertexLayoutSoft> {
        KilnVertexLayoutSoft::new(self, elements)
    }

    pub fn create_vertex_stream(
        &self,
        vertex_stream_def: &KilnVertexStreamDef,
    ) -> KilnResult<KilnVertexStreamSoft> {
        KilnVertexStreamSoft::new(self, vertex_stream_def)
    }

    pub fn create_command_interface(&self) -> KilnResult<KilnCommandInterfaceSoft> {
        Ok(KilnCommandInterfaceSoft::new())
    }

    pub fn create_swap_chain(
        &self,
        window: &Arc<dyn KilnWindow>,
        swap_chain_def: &KilnSwapChainDef,
    ) -> KilnResult<KilnSwapChainSoft> {
        KilnSwapChainSoft::new(self, window, swap_chain_def)
    }
}
