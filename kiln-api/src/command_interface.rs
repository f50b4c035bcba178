use crate::soft::KilnCommandInterfaceSoft;
use crate::*;

/// Records state changes, clears, buffer updates and draws against a device.
///
/// A command interface is idle until `begin` is called with the device to record against, and
/// returns to idle on `end`. The interface remembers which vertex stream, shaders and pipeline
/// states are bound and skips binds that would not change anything. `begin` forgets everything
/// that was bound.
///
/// Binds, clears and draws are fire-and-forget. Calls that are invalid (for example, binding
/// more render targets than the device supports) are logged and ignored.
#[derive(Debug)]
pub enum KilnCommandInterface {
    Soft(KilnCommandInterfaceSoft),
}

impl KilnCommandInterface {
    /// Start recording against `device`. Fails if already recording.
    pub fn begin(
        &mut self,
        device: &KilnDevice,
    ) -> KilnResult<()> {
        match (self, device) {
            (KilnCommandInterface::Soft(inner), KilnDevice::Soft(device)) => inner.begin(device),
        }
    }

    /// Stop recording. Fails if not recording.
    pub fn end(&mut self) -> KilnResult<()> {
        match self {
            KilnCommandInterface::Soft(inner) => inner.end(),
        }
    }

    /// Submit recorded work without ending
    pub fn flush(&mut self) {
        match self {
            KilnCommandInterface::Soft(inner) => inner.flush(),
        }
    }

    pub fn is_recording(&self) -> bool {
        match self {
            KilnCommandInterface::Soft(inner) => inner.is_recording(),
        }
    }

    /// Bind up to `MAX_RENDER_TARGETS` color targets and an optional depth stencil target
    pub fn set_render_targets(
        &mut self,
        render_targets: &[&KilnRenderTargetView],
        depth_stencil: Option<&KilnDepthStencilView>,
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => {
                inner.set_render_targets(render_targets, depth_stencil)
            }
        }
    }

    pub fn clear_render_target(
        &mut self,
        render_target: &KilnRenderTargetView,
        color: KilnColorClearValue,
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => inner.clear_render_target(render_target, color),
        }
    }

    /// Clear both the depth and the stencil aspect
    pub fn clear_depth_stencil(
        &mut self,
        depth_stencil: &KilnDepthStencilView,
        depth: f32,
        stencil: u8,
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => inner.clear_depth_stencil(
                depth_stencil,
                KilnClearFlags::DEPTH | KilnClearFlags::STENCIL,
                depth,
                stencil,
            ),
        }
    }

    pub fn clear_depth(
        &mut self,
        depth_stencil: &KilnDepthStencilView,
        depth: f32,
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => {
                inner.clear_depth_stencil(depth_stencil, KilnClearFlags::DEPTH, depth, 0)
            }
        }
    }

    pub fn clear_stencil(
        &mut self,
        depth_stencil: &KilnDepthStencilView,
        stencil: u8,
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => {
                inner.clear_depth_stencil(depth_stencil, KilnClearFlags::STENCIL, 0.0, stencil)
            }
        }
    }

    /// Map one subresource for CPU access. The subresource stays mapped until the returned value
    /// is dropped or passed to `unmap`. Mapping a subresource that is already mapped fails.
    pub fn map<'a>(
        &self,
        buffer: &'a KilnBuffer,
        subresource: u32,
        policy: KilnMapPolicy,
    ) -> KilnResult<KilnMappedSubresource<'a>> {
        match (self, buffer) {
            (KilnCommandInterface::Soft(inner), KilnBuffer::Soft(buffer)) => Ok(
                KilnMappedSubresource::Soft(inner.map(buffer, subresource, policy)?),
            ),
        }
    }

    pub fn unmap(
        &self,
        mapped: KilnMappedSubresource,
    ) {
        mapped.unmap();
    }

    /// Replace the contents of a subresource with tightly packed rows from `data`. Dynamic buffers
    /// are mapped with `WriteDiscard`, everything else with `WriteOnly`.
    #[profiling::function]
    pub fn update_subresource(
        &self,
        buffer: &KilnBuffer,
        subresource: u32,
        data: &[u8],
    ) -> KilnResult<()> {
        let layout = buffer.subresource_layout(subresource)?;
        let packed_byte_size = layout.packed_byte_size();
        if (data.len() as u64) < packed_byte_size {
            return Err(format!(
                "Subresource {} needs {} bytes of data, got {}",
                subresource,
                packed_byte_size,
                data.len()
            ))?;
        }

        let policy = if buffer.buffer_info().usage == KilnBufferUsage::Dynamic {
            KilnMapPolicy::WriteDiscard
        } else {
            KilnMapPolicy::WriteOnly
        };

        let mut mapped = self.map(buffer, subresource, policy)?;
        let row_byte_width = mapped.row_byte_width() as usize;
        let mut rows = data.chunks_exact(row_byte_width);
        for depth_slice in 0..mapped.depth_count() {
            for row in 0..mapped.row_count() {
                let source = rows
                    .next()
                    .ok_or("Ran out of source rows while updating a subresource")?;
                mapped.row_mut(depth_slice, row)?.copy_from_slice(source);
            }
        }

        Ok(())
    }

    /// Write `data` at `offset` in a vertex, index or constant buffer
    pub fn update_buffer(
        &self,
        buffer: &KilnBuffer,
        data: &[u8],
        offset: u32,
        discard: bool,
    ) -> KilnResult<()> {
        let layout = buffer.subresource_layout(0)?;
        if buffer.buffer_info().subresource_count != 1 || layout.row_count != 1 || layout.depth_count != 1 {
            return Err("update_buffer only supports buffers with a single row")?;
        }

        let start = offset as usize;
        let end = start + data.len();
        if end > layout.row_byte_width as usize {
            return Err(format!(
                "Writing {} bytes at offset {} overflows a {} byte buffer",
                data.len(),
                offset,
                layout.row_byte_width
            ))?;
        }

        let policy = if discard {
            KilnMapPolicy::WriteDiscard
        } else {
            KilnMapPolicy::WriteOnly
        };

        let mut mapped = self.map(buffer, 0, policy)?;
        mapped.row_mut(0, 0)?[start..end].copy_from_slice(data);
        Ok(())
    }

    /// Write CPU-layout constants into the view's buffer, moving each constant to the offset the
    /// shader expects
    #[profiling::function]
    pub fn update_constant_buffer(
        &self,
        constant_buffer_view: &KilnConstantBufferView,
        data: &[u8],
    ) -> KilnResult<()> {
        let placement_map = constant_buffer_view.placement_map();
        if (data.len() as u64) < placement_map.cpu_size() as u64 {
            return Err(format!(
                "Constant data for {} is {} bytes, the CPU layout needs {}",
                constant_buffer_view.block_name(),
                data.len(),
                placement_map.cpu_size()
            ))?;
        }

        let mut mapped = self.map(constant_buffer_view.buffer(), 0, KilnMapPolicy::WriteDiscard)?;
        placement_map.update_constants(data, mapped.row_mut(0, 0)?)
    }

    /// Bind each view to its slot in every stage that references its block. `None` unbinds every
    /// constant buffer slot of every stage.
    pub fn set_constant_buffers(
        &mut self,
        constant_buffer_views: Option<&[&KilnConstantBufferView]>,
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => inner.set_constant_buffers(constant_buffer_views),
        }
    }

    /// `None` unbinds the vertex stream
    pub fn set_vertex_stream(
        &mut self,
        vertex_stream: Option<&KilnVertexStream>,
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => inner.set_vertex_stream(vertex_stream),
        }
    }

    /// `None` unbinds every shader stage
    pub fn set_render_program(
        &mut self,
        render_program: Option<&KilnRenderProgram>,
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => inner.set_render_program(render_program),
        }
    }

    /// `None` reverts to the default blend state
    pub fn set_blend_state(
        &mut self,
        blend_state: Option<&KilnBlendState>,
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => inner.set_blend_state(blend_state),
        }
    }

    /// `None` reverts to the default depth stencil state
    pub fn set_depth_stencil_state(
        &mut self,
        depth_stencil_state: Option<&KilnDepthStencilState>,
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => inner.set_depth_stencil_state(depth_stencil_state),
        }
    }

    /// `None` reverts to the default rasterizer state
    pub fn set_rasterizer_state(
        &mut self,
        rasterizer_state: Option<&KilnRasterizerState>,
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => inner.set_rasterizer_state(rasterizer_state),
        }
    }

    /// Bind texture views to consecutive slots from `start_slot`. Ignored if the range passes
    /// `MAX_TEXTURE_SLOTS`.
    pub fn set_textures(
        &mut self,
        stage: KilnShaderStage,
        start_slot: u32,
        texture_views: &[&KilnTextureView],
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => {
                inner.set_textures(stage, start_slot, texture_views)
            }
        }
    }

    pub fn set_vs_textures(
        &mut self,
        start_slot: u32,
        texture_views: &[&KilnTextureView],
    ) {
        self.set_textures(KilnShaderStage::Vertex, start_slot, texture_views);
    }

    pub fn set_ps_textures(
        &mut self,
        start_slot: u32,
        texture_views: &[&KilnTextureView],
    ) {
        self.set_textures(KilnShaderStage::Pixel, start_slot, texture_views);
    }

    pub fn set_gs_textures(
        &mut self,
        start_slot: u32,
        texture_views: &[&KilnTextureView],
    ) {
        self.set_textures(KilnShaderStage::Geometry, start_slot, texture_views);
    }

    /// Binds all `MAX_SAMPLER_SLOTS` slots of the stage. `None` entries, and slots past the end of
    /// `samplers`, are unbound. `None` unbinds every slot.
    pub fn set_samplers(
        &mut self,
        stage: KilnShaderStage,
        samplers: Option<&[Option<&KilnSampler>]>,
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => inner.set_samplers(stage, samplers),
        }
    }

    pub fn set_vs_samplers(
        &mut self,
        samplers: Option<&[Option<&KilnSampler>]>,
    ) {
        self.set_samplers(KilnShaderStage::Vertex, samplers);
    }

    pub fn set_ps_samplers(
        &mut self,
        samplers: Option<&[Option<&KilnSampler>]>,
    ) {
        self.set_samplers(KilnShaderStage::Pixel, samplers);
    }

    pub fn set_gs_samplers(
        &mut self,
        samplers: Option<&[Option<&KilnSampler>]>,
    ) {
        self.set_samplers(KilnShaderStage::Geometry, samplers);
    }

    pub fn set_viewport(
        &mut self,
        viewport: &KilnViewport,
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => inner.set_viewport(viewport),
        }
    }

    pub fn draw(
        &mut self,
        vertex_count: u32,
        start_vertex: u32,
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => inner.draw(vertex_count, start_vertex),
        }
    }

    pub fn draw_indexed(
        &mut self,
        index_count: u32,
        start_index: u32,
        base_vertex: i32,
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => {
                inner.draw_indexed(index_count, start_index, base_vertex)
            }
        }
    }

    pub fn draw_instanced(
        &mut self,
        vertex_count_per_instance: u32,
        instance_count: u32,
        start_vertex: u32,
        start_instance: u32,
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => inner.draw_instanced(
                vertex_count_per_instance,
                instance_count,
                start_vertex,
                start_instance,
            ),
        }
    }

    pub fn draw_indexed_instanced(
        &mut self,
        index_count_per_instance: u32,
        instance_count: u32,
        start_index: u32,
        base_vertex: i32,
        start_instance: u32,
    ) {
        match self {
            KilnCommandInterface::Soft(inner) => inner.draw_indexed_instanced(
                index_count_per_instance,
                instance_count,
                start_index,
                base_vertex,
                start_instance,
            ),
        }
    }

    pub fn soft_command_interface(&self) -> Option<&KilnCommandInterfaceSoft> {
        match self {
            KilnCommandInterface::Soft(inner) => Some(inner),
        }
    }
}
