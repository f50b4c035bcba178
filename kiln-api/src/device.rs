use crate::soft::KilnDeviceSoft;
use crate::*;
use std::sync::Arc;

/// A cloneable handle used to create graphics resources.
///
/// Creation is synchronous. The device does not synchronize creation and destruction internally,
/// callers are expected to do that.
#[derive(Clone, Debug)]
pub enum KilnDevice {
    Soft(KilnDeviceSoft),
}

impl KilnDevice {
    /// Get metadata about the device
    pub fn device_info(&self) -> &KilnDeviceInfo {
        match self {
            KilnDevice::Soft(inner) => inner.device_info(),
        }
    }

    /// Highest supported quality level for the sample count, 0 if the sample count isn't supported
    pub fn get_max_multisample_quality(
        &self,
        samples_count: u32,
    ) -> u32 {
        match self {
            KilnDevice::Soft(inner) => inner.get_max_multisample_quality(samples_count),
        }
    }

    fn create_buffer(
        &self,
        buffer_type: KilnBufferType,
        buffer_def: &KilnBufferDef,
    ) -> KilnResult<KilnBuffer> {
        Ok(match self {
            KilnDevice::Soft(inner) => KilnBuffer::Soft(inner.create_buffer(buffer_type, buffer_def)?),
        })
    }

    pub fn create_vertex_buffer(
        &self,
        buffer_def: &KilnBufferDef,
    ) -> KilnResult<KilnBuffer> {
        self.create_buffer(KilnBufferType::Vertex, buffer_def)
    }

    pub fn create_index_buffer(
        &self,
        buffer_def: &KilnBufferDef,
    ) -> KilnResult<KilnBuffer> {
        self.create_buffer(KilnBufferType::Index, buffer_def)
    }

    /// Size must be a multiple of 16
    pub fn create_constant_buffer(
        &self,
        buffer_def: &KilnBufferDef,
    ) -> KilnResult<KilnBuffer> {
        self.create_buffer(KilnBufferType::Constant, buffer_def)
    }

    /// Create a texture. `KilnSampleQuality::MaxAvailable` is resolved against the device.
    pub fn create_texture_buffer(
        &self,
        texture_def: &KilnTextureBufferDef,
    ) -> KilnResult<KilnBuffer> {
        Ok(match self {
            KilnDevice::Soft(inner) => KilnBuffer::Soft(inner.create_texture_buffer(texture_def)?),
        })
    }

    pub fn create_render_target_view(
        &self,
        buffer: &KilnBuffer,
        view_def: &KilnRenderTargetViewDef,
    ) -> KilnResult<KilnRenderTargetView> {
        verify_render_target_view(buffer, view_def)?;
        Ok(match (self, buffer) {
            (KilnDevice::Soft(inner), KilnBuffer::Soft(buffer)) => {
                KilnRenderTargetView::Soft(inner.create_render_target_view(buffer, view_def)?)
            }
        })
    }

    pub fn create_texture_view(
        &self,
        buffer: &KilnBuffer,
        view_def: &KilnTextureViewDef,
    ) -> KilnResult<KilnTextureView> {
        let mip_levels = verify_texture_view(buffer, view_def)?;
        Ok(match (self, buffer) {
            (KilnDevice::Soft(inner), KilnBuffer::Soft(buffer)) => KilnTextureView::Soft(
                inner.create_texture_view(buffer, view_def.most_detailed_mip, mip_levels)?,
            ),
        })
    }

    pub fn create_depth_stencil_view(
        &self,
        buffer: &KilnBuffer,
        view_def: &KilnDepthStencilViewDef,
    ) -> KilnResult<KilnDepthStencilView> {
        verify_depth_stencil_view(buffer, view_def)?;
        Ok(match (self, buffer) {
            (KilnDevice::Soft(inner), KilnBuffer::Soft(buffer)) => {
                KilnDepthStencilView::Soft(inner.create_depth_stencil_view(buffer, view_def)?)
            }
        })
    }

    /// Binds `buffer` to the block named in `view_def`, translating between the CPU layout in
    /// `view_def` and the layout reflected from every stage of `program`
    pub fn create_constant_buffer_view(
        &self,
        buffer: &KilnBuffer,
        program: &KilnRenderProgram,
        view_def: &KilnConstantBufferViewDef,
    ) -> KilnResult<KilnConstantBufferView> {
        if buffer.buffer_info().buffer_type != KilnBufferType::Constant {
            return Err(format!(
                "Constant buffer views need a Constant buffer, got {:?}",
                buffer.buffer_info().buffer_type
            ))?;
        }

        KilnConstantBufferView::new(buffer, program, view_def)
    }

    /// Preprocess and compile shader source. Reflection data is available on the result.
    pub fn create_shader(
        &self,
        shader_def: &KilnShaderDef,
    ) -> KilnResult<KilnShader> {
        Ok(match self {
            KilnDevice::Soft(inner) => KilnShader::Soft(inner.create_shader(shader_def)?),
        })
    }

    /// Vertex and pixel shaders are required, the geometry shader is optional. Every shader must
    /// have been compiled for the stage it's passed as.
    pub fn create_render_program(
        &self,
        vertex_shader: &KilnShader,
        pixel_shader: &KilnShader,
        geometry_shader: Option<&KilnShader>,
    ) -> KilnResult<KilnRenderProgram> {
        KilnRenderProgram::new(vertex_shader, pixel_shader, geometry_shader)
    }

    pub fn create_sampler(
        &self,
        sampler_def: &KilnSamplerDef,
    ) -> KilnResult<KilnSampler> {
        Ok(match self {
            KilnDevice::Soft(inner) => KilnSampler::Soft(inner.create_sampler(sampler_def)?),
        })
    }

    pub fn create_blend_state(
        &self,
        blend_state_def: &KilnBlendStateDef,
    ) -> KilnResult<KilnBlendState> {
        Ok(match self {
            KilnDevice::Soft(inner) => {
                KilnBlendState::Soft(inner.create_blend_state(blend_state_def)?)
            }
        })
    }

    pub fn create_rasterizer_state(
        &self,
        rasterizer_state_def: &KilnRasterizerStateDef,
    ) -> KilnResult<KilnRasterizerState> {
        Ok(match self {
            KilnDevice::Soft(inner) => {
                KilnRasterizerState::Soft(inner.create_rasterizer_state(rasterizer_state_def)?)
            }
        })
    }

    pub fn create_depth_stencil_state(
        &self,
        depth_stencil_state_def: &KilnDepthStencilStateDef,
    ) -> KilnResult<KilnDepthStencilState> {
        Ok(match self {
            KilnDevice::Soft(inner) => KilnDepthStencilState::Soft(
                inner.create_depth_stencil_state(depth_stencil_state_def)?,
            ),
        })
    }

    /// Matches `attributes` against the inputs of the program's vertex shader. The layout does
    /// not keep a reference to the program.
    pub fn create_vertex_layout(
        &self,
        program: &KilnRenderProgram,
        attributes: &[KilnVertexLayoutAttribute],
    ) -> KilnResult<KilnVertexLayout> {
        let elements = expand_vertex_attributes(attributes)?;
        verify_vertex_inputs(program.vertex_shader().reflection(), &elements)?;

        Ok(match self {
            KilnDevice::Soft(inner) => KilnVertexLayout::Soft(inner.create_vertex_layout(elements)?),
        })
    }

    pub fn create_vertex_stream(
        &self,
        vertex_stream_def: &KilnVertexStreamDef,
    ) -> KilnResult<KilnVertexStream> {
        vertex_stream_def.verify()?;
        Ok(match self {
            KilnDevice::Soft(inner) => {
                KilnVertexStream::Soft(inner.create_vertex_stream(vertex_stream_def)?)
            }
        })
    }

    /// Create an idle command interface. Call `begin` before recording.
    pub fn create_command_interface(&self) -> KilnResult<KilnCommandInterface> {
        Ok(match self {
            KilnDevice::Soft(inner) => {
                KilnCommandInterface::Soft(inner.create_command_interface()?)
            }
        })
    }

    /// Deferred command lists are not implemented, this always fails
    pub fn create_command_list(&self) -> KilnResult<()> {
        log::warn!("create_command_list called but deferred command lists are not implemented");
        Err(KilnError::Unimplemented("command lists"))
    }

    /// Create a swap chain sized to the window's client area. The swap chain does not keep the
    /// window alive.
    pub fn create_swap_chain(
        &self,
        window: &Arc<dyn KilnWindow>,
        swap_chain_def: &KilnSwapChainDef,
    ) -> KilnResult<KilnSwapChain> {
        swap_chain_def.verify()?;
        Ok(match self {
            KilnDevice::Soft(inner) => {
                KilnSwapChain::Soft(inner.create_swap_chain(window, swap_chain_def)?)
            }
        })
    }

    /// Get the underlying soft device, for inspecting its command log
    pub fn soft_device(&self) -> Option<&KilnDeviceSoft> {
        match self {
            KilnDevice::Soft(inner) => Some(inner),
        }
    }
}
