use crate::soft::*;
use crate::*;

// What the command interface last bound. None means the context default.
#[derive(Default, Debug)]
struct SoftBoundState {
    vertex_stream: Option<SoftHandle>,
    index_buffer_bound: bool,
    shaders: [Option<SoftHandle>; 3],
    blend_state: Option<SoftHandle>,
    depth_stencil_state: Option<SoftHandle>,
    rasterizer_state: Option<SoftHandle>,
}

/// Records against the immediate context of a soft device
#[derive(Debug)]
pub struct KilnCommandInterfaceSoft {
    device: Option<KilnDeviceSoft>,
    bound: SoftBoundState,
}

fn render_target_view_handle(view: &KilnRenderTargetView) -> SoftHandle {
    match view {
        KilnRenderTargetView::Soft(inner) => inner.handle(),
    }
}

fn depth_stencil_view_handle(view: &KilnDepthStencilView) -> SoftHandle {
    match view {
        KilnDepthStencilView::Soft(inner) => inner.handle(),
    }
}

fn texture_view_handle(view: &KilnTextureView) -> SoftHandle {
    match view {
        KilnTextureView::Soft(inner) => inner.handle(),
    }
}

fn buffer_handle(buffer: &KilnBuffer) -> SoftHandle {
    match buffer {
        KilnBuffer::Soft(inner) => inner.handle(),
    }
}

fn shader_handle(shader: &KilnShader) -> SoftHandle {
    match shader {
        KilnShader::Soft(inner) => inner.handle(),
    }
}

fn sampler_handle(sampler: &KilnSampler) -> SoftHandle {
    match sampler {
        KilnSampler::Soft(inner) => inner.handle(),
    }
}

impl KilnCommandInterfaceSoft {
    pub(crate) fn new() -> Self {
        KilnCommandInterfaceSoft {
            device: None,
            bound: SoftBoundState::default(),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.device.is_some()
    }

    // Fire-and-forget calls outside of begin/end are dropped with a warning
    fn context(
        &self,
        operation: &str,
    ) -> Option<SoftContext> {
        match &self.device {
            Some(device) => Some(device.context().clone()),
            None => {
                log::warn!("{} called on a command interface that is not recording", operation);
                None
            }
        }
    }

    fn validation_enabled(&self) -> bool {
        self.device
            .as_ref()
            .map(|x| x.validation_enabled())
            .unwrap_or(false)
    }

    pub fn begin(
        &mut self,
        device: &KilnDeviceSoft,
    ) -> KilnResult<()> {
        if self.device.is_some() {
            return Err("begin called on a command interface that is already recording")?;
        }

        device.context().record(SoftCommand::ClearState);
        self.bound = SoftBoundState::default();
        self.device = Some(device.clone());
        Ok(())
    }

    pub fn end(&mut self) -> KilnResult<()> {
        if self.device.take().is_none() {
            return Err("end called on a command interface that is not recording")?;
        }

        Ok(())
    }

    pub fn flush(&mut self) {
        if let Some(context) = self.context("flush") {
            context.record(SoftCommand::Flush);
        }
    }

    pub fn set_render_targets(
        &mut self,
        render_targets: &[&KilnRenderTargetView],
        depth_stencil: Option<&KilnDepthStencilView>,
    ) {
        let context = match self.context("set_render_targets") {
            Some(context) => context,
            None => return,
        };

        if render_targets.len() > MAX_RENDER_TARGETS {
            log::warn!(
                "set_render_targets called with {} render targets, max is {}",
                render_targets.len(),
                MAX_RENDER_TARGETS
            );
            return;
        }

        context.record(SoftCommand::OmSetRenderTargets {
            render_targets: render_targets
                .iter()
                .map(|x| render_target_view_handle(x))
                .collect(),
            depth_stencil: depth_stencil.map(depth_stencil_view_handle),
        });
    }

    pub fn clear_render_target(
        &mut self,
        render_target: &KilnRenderTargetView,
        color: KilnColorClearValue,
    ) {
        let context = match self.context("clear_render_target") {
            Some(context) => context,
            None => return,
        };

        let view = match render_target {
            KilnRenderTargetView::Soft(inner) => inner,
        };

        context.record(SoftCommand::ClearRenderTargetView {
            view: view.handle(),
            color: color.0,
        });

        if let Err(e) = view.clear(color.0) {
            log::warn!("Failed to clear render target view {:?}: {}", view.handle(), e);
        }
    }

    pub fn clear_depth_stencil(
        &mut self,
        depth_stencil: &KilnDepthStencilView,
        flags: KilnClearFlags,
        depth: f32,
        stencil: u8,
    ) {
        let context = match self.context("clear_depth_stencil") {
            Some(context) => context,
            None => return,
        };

        let view = match depth_stencil {
            KilnDepthStencilView::Soft(inner) => inner,
        };

        context.record(SoftCommand::ClearDepthStencilView {
            view: view.handle(),
            flags,
            depth,
            stencil,
        });

        if let Err(e) = view.clear(flags, depth, stencil) {
            log::warn!("Failed to clear depth stencil view {:?}: {}", view.handle(), e);
        }
    }

    pub fn map<'a>(
        &self,
        buffer: &'a KilnBufferSoft,
        subresource: u32,
        policy: KilnMapPolicy,
    ) -> KilnResult<KilnMappedSubresourceSoft<'a>> {
        buffer.map(subresource, policy)
    }

    #[profiling::function]
    pub fn set_constant_buffers(
        &mut self,
        constant_buffer_views: Option<&[&KilnConstantBufferView]>,
    ) {
        let context = match self.context("set_constant_buffers") {
            Some(context) => context,
            None => return,
        };

        let mut slots = [[None; MAX_CONSTANT_BUFFER_SLOTS]; 3];
        for view in constant_buffer_views.unwrap_or(&[]) {
            let handle = buffer_handle(view.buffer());
            for stage in KilnShaderStage::ALL.iter() {
                if let Some(slot) = view.slots().slot(*stage) {
                    if let Some(entry) = slots[stage.index()].get_mut(slot as usize) {
                        *entry = Some(handle);
                    }
                }
            }
        }

        for stage in KilnShaderStage::ALL.iter() {
            context.record(SoftCommand::SetConstantBuffers {
                stage: *stage,
                buffers: slots[stage.index()].to_vec(),
            });
        }
    }

    #[profiling::function]
    pub fn set_vertex_stream(
        &mut self,
        vertex_stream: Option<&KilnVertexStream>,
    ) {
        let context = match self.context("set_vertex_stream") {
            Some(context) => context,
            None => return,
        };

        let vertex_stream = vertex_stream.map(|x| match x {
            KilnVertexStream::Soft(inner) => inner,
        });

        let handle = vertex_stream.map(|x| x.handle());
        if handle == self.bound.vertex_stream {
            return;
        }

        match vertex_stream {
            Some(vertex_stream) => {
                context.record(SoftCommand::IaSetInputLayout {
                    layout: Some(vertex_stream.vertex_layout().handle()),
                });
                context.record(SoftCommand::IaSetVertexBuffers {
                    bindings: vertex_stream.vertex_buffer_bindings().to_vec(),
                });
                context.record(SoftCommand::IaSetIndexBuffer {
                    binding: vertex_stream.index_buffer(),
                });
                context.record(SoftCommand::IaSetPrimitiveTopology {
                    topology: vertex_stream.topology(),
                });
                self.bound.index_buffer_bound = vertex_stream.index_buffer().is_some();
            }
            None => {
                context.record(SoftCommand::IaSetInputLayout { layout: None });
                context.record(SoftCommand::IaSetVertexBuffers { bindings: vec![] });
                context.record(SoftCommand::IaSetIndexBuffer { binding: None });
                self.bound.index_buffer_bound = false;
            }
        }

        self.bound.vertex_stream = handle;
    }

    #[profiling::function]
    pub fn set_render_program(
        &mut self,
        render_program: Option<&KilnRenderProgram>,
    ) {
        let context = match self.context("set_render_program") {
            Some(context) => context,
            None => return,
        };

        for stage in KilnShaderStage::ALL.iter() {
            let handle = render_program
                .and_then(|x| x.shader(*stage))
                .map(shader_handle);

            let bound = &mut self.bound.shaders[stage.index()];
            if *bound != handle {
                context.record(SoftCommand::SetShader {
                    stage: *stage,
                    shader: handle,
                });
                *bound = handle;
            }
        }
    }

    pub fn set_blend_state(
        &mut self,
        blend_state: Option<&KilnBlendState>,
    ) {
        let context = match self.context("set_blend_state") {
            Some(context) => context,
            None => return,
        };

        let handle = blend_state.map(|x| match x {
            KilnBlendState::Soft(inner) => inner.handle(),
        });

        if handle != self.bound.blend_state {
            context.record(SoftCommand::OmSetBlendState { state: handle });
            self.bound.blend_state = handle;
        }
    }

    pub fn set_depth_stencil_state(
        &mut self,
        depth_stencil_state: Option<&KilnDepthStencilState>,
    ) {
        let context = match self.context("set_depth_stencil_state") {
            Some(context) => context,
            None => return,
        };

        let handle = depth_stencil_state.map(|x| match x {
            KilnDepthStencilState::Soft(inner) => inner.handle(),
        });

        if handle != self.bound.depth_stencil_state {
            context.record(SoftCommand::OmSetDepthStencilState { state: handle });
            self.bound.depth_stencil_state = handle;
        }
    }

    pub fn set_rasterizer_state(
        &mut self,
        rasterizer_state: Option<&KilnRasterizerState>,
    ) {
        let context = match self.context("set_rasterizer_state") {
            Some(context) => context,
            None => return,
        };

        let handle = rasterizer_state.map(|x| match x {
            KilnRasterizerState::Soft(inner) => inner.handle(),
        });

        if handle != self.bound.rasterizer_state {
            context.record(SoftCommand::RsSetState { state: handle });
            self.bound.rasterizer_state = handle;
        }
    }

    pub fn set_textures(
        &mut self,
        stage: KilnShaderStage,
        start_slot: u32,
        texture_views: &[&KilnTextureView],
    ) {
        let context = match self.context("set_textures") {
            Some(context) => context,
            None => return,
        };

        if start_slot as usize + texture_views.len() > MAX_TEXTURE_SLOTS {
            log::warn!(
                "set_textures for the {:?} stage binds slots {}..{}, max is {}",
                stage,
                start_slot,
                start_slot as usize + texture_views.len(),
                MAX_TEXTURE_SLOTS
            );
            return;
        }

        context.record(SoftCommand::SetShaderResources {
            stage,
            start_slot,
            views: texture_views.iter().map(|x| texture_view_handle(x)).collect(),
        });
    }

    pub fn set_samplers(
        &mut self,
        stage: KilnShaderStage,
        samplers: Option<&[Option<&KilnSampler>]>,
    ) {
        let context = match self.context("set_samplers") {
            Some(context) => context,
            None => return,
        };

        let samplers = samplers.unwrap_or(&[]);
        if samplers.len() > MAX_SAMPLER_SLOTS {
            log::warn!(
                "set_samplers for the {:?} stage got {} samplers, max is {}",
                stage,
                samplers.len(),
                MAX_SAMPLER_SLOTS
            );
            return;
        }

        let mut slots = vec![None; MAX_SAMPLER_SLOTS];
        for (slot, sampler) in slots.iter_mut().zip(samplers) {
            *slot = sampler.map(sampler_handle);
        }

        context.record(SoftCommand::SetSamplers {
            stage,
            samplers: slots,
        });
    }

    pub fn set_viewport(
        &mut self,
        viewport: &KilnViewport,
    ) {
        if let Some(context) = self.context("set_viewport") {
            context.record(SoftCommand::RsSetViewports {
                viewports: vec![*viewport],
            });
        }
    }

    fn validate_draw(
        &self,
        operation: &str,
        indexed: bool,
    ) {
        if !self.validation_enabled() {
            return;
        }

        if self.bound.shaders[KilnShaderStage::Vertex.index()].is_none()
            || self.bound.shaders[KilnShaderStage::Pixel.index()].is_none()
        {
            log::warn!("{} called without a render program bound", operation);
        }

        if self.bound.vertex_stream.is_none() {
            log::warn!("{} called without a vertex stream bound", operation);
        }

        if indexed && !self.bound.index_buffer_bound {
            log::warn!("{} called but the bound vertex stream has no index buffer", operation);
        }
    }

    #[profiling::function]
    pub fn draw(
        &mut self,
        vertex_count: u32,
        start_vertex: u32,
    ) {
        if let Some(context) = self.context("draw") {
            self.validate_draw("draw", false);
            context.record(SoftCommand::Draw {
                vertex_count,
                start_vertex,
            });
        }
    }

    #[profiling::function]
    pub fn draw_indexed(
        &mut self,
        index_count: u32,
        start_index: u32,
        base_vertex: i32,
    ) {
        if let Some(context) = self.context("draw_indexed") {
            self.validate_draw("draw_indexed", true);
            context.record(SoftCommand::DrawIndexed {
                index_count,
                start_index,
                base_vertex,
            });
        }
    }

    #[profiling::function]
    pub fn draw_instanced(
        &mut self,
        vertex_count_per_instance: u32,
        instance_count: u32,
        start_vertex: u32,
        start_instance: u32,
    ) {
        if let Some(context) = self.context("draw_instanced") {
            self.validate_draw("draw_instanced", false);
            context.record(SoftCommand::DrawInstanced {
                vertex_count_per_instance,
                instance_count,
                start_vertex,
                start_instance,
            });
        }
    }

    #[profiling::function]
    pub fn draw_indexed_instanced(
        &mut self,
        index_count_per_instance: u32,
        instance_count: u32,
        start_index: u32,
        base_vertex: i32,
        start_instance: u32,
    ) {
        if let Some(context) = self.context("draw_indexed_instanced") {
            self.validate_draw("draw_indexed_instanced", true);
            context.record(SoftCommand::DrawIndexedInstanced {
                index_count_per_instance,
                instance_count,
                start_index,
                base_vertex,
                start_instance,
            });
        }
    }
}
