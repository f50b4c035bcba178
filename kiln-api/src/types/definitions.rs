use crate::types::*;
use crate::{
    KilnBuffer, KilnError, KilnResult, KilnVertexLayout, MAX_RENDER_TARGETS,
    MAX_TEXTURE_ARRAY_SIZE, MAX_TEXTURE_DIMENSION_2D, MAX_TEXTURE_DIMENSION_3D,
    MAX_VERTEX_INPUT_LOCATIONS, MAX_VERTEX_STREAM_BUFFERS,
};
#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// General configuration that all APIs will make best effort to respect
#[derive(Default, Clone, Debug)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnApiDef {
    pub validation_mode: KilnValidationMode,
}

/// Configuration for the software device
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnApiDefSoft {
    /// Mapped texture rows are padded up to a multiple of this many bytes. Must be a power of two.
    pub row_pitch_alignment: u32,
    /// Highest supported multisample count. Only powers of two up to this value are supported.
    pub max_sample_count: u32,
    /// Number of quality levels reported for every supported sample count above 1
    pub multisample_quality_levels: u32,
    /// Keep debug names on created objects
    pub debug_names: bool,
    /// Oldest entries of the command log are dropped past this many commands
    pub command_log_capacity: usize,
    /// Texture creation fails if the padded host memory of every subresource exceeds this
    pub max_texture_byte_size: u64,
}

impl Default for KilnApiDefSoft {
    fn default() -> Self {
        KilnApiDefSoft {
            row_pitch_alignment: 256,
            max_sample_count: 8,
            multisample_quality_levels: 4,
            debug_names: cfg!(debug_assertions),
            command_log_capacity: 64 * 1024,
            max_texture_byte_size: 1 << 30,
        }
    }
}

impl KilnApiDefSoft {
    pub fn verify(&self) -> KilnResult<()> {
        if !self.row_pitch_alignment.is_power_of_two() {
            return Err(format!(
                "row_pitch_alignment must be a power of two, got {}",
                self.row_pitch_alignment
            ))?;
        }

        if !self.max_sample_count.is_power_of_two() {
            return Err(format!(
                "max_sample_count must be a power of two, got {}",
                self.max_sample_count
            ))?;
        }

        if self.command_log_capacity == 0 {
            return Err("command_log_capacity must be non-zero")?;
        }

        if self.max_texture_byte_size == 0 {
            return Err("max_texture_byte_size must be non-zero")?;
        }

        Ok(())
    }
}

/// Used to create a vertex, index or constant `KilnBuffer`
#[derive(Copy, Clone, Debug, Default)]
pub struct KilnBufferDef<'a> {
    pub size: u64,
    pub usage: KilnBufferUsage,
    pub access: KilnCpuAccess,
    /// Must be exactly `size` bytes. Required for `KilnBufferUsage::Static`.
    pub initial_data: Option<&'a [u8]>,
}

impl<'a> KilnBufferDef<'a> {
    pub fn for_data(
        data: &'a [u8],
        usage: KilnBufferUsage,
        access: KilnCpuAccess,
    ) -> Self {
        KilnBufferDef {
            size: data.len() as u64,
            usage,
            access,
            initial_data: Some(data),
        }
    }

    pub fn verify(
        &self,
        buffer_type: KilnBufferType,
    ) -> KilnResult<()> {
        if buffer_type.is_texture() {
            return Err(format!(
                "{:?} buffers are created with create_texture_buffer",
                buffer_type
            ))?;
        }

        if self.size == 0 {
            return Err("Buffer size must be non-zero")?;
        }

        if buffer_type == KilnBufferType::Constant && self.size % 16 != 0 {
            return Err(format!(
                "Constant buffer size must be a multiple of 16, got {}",
                self.size
            ))?;
        }

        self.usage.verify_access(self.access)?;
        verify_initial_data(self.usage, self.initial_data, self.size)
    }
}

fn verify_initial_data(
    usage: KilnBufferUsage,
    initial_data: Option<&[u8]>,
    byte_size: u64,
) -> KilnResult<()> {
    match initial_data {
        None if usage == KilnBufferUsage::Static => {
            Err("Static buffers must be created with initial data")?
        }
        Some(data) if data.len() as u64 != byte_size => Err(format!(
            "Initial data is {} bytes but the buffer is {} bytes",
            data.len(),
            byte_size
        ))?,
        _ => Ok(()),
    }
}

/// Used to create a texture `KilnBuffer`. Byte size is derived from the format and extents.
#[derive(Copy, Clone, Debug)]
pub struct KilnTextureBufferDef<'a> {
    pub buffer_type: KilnBufferType,
    pub format: KilnFormat,
    /// Extents are clamped to a minimum of 1
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    /// 0 requests the full mip chain
    pub mip_levels: u32,
    pub array_size: u32,
    pub samples_count: u32,
    pub samples_quality: KilnSampleQuality,
    pub usage: KilnBufferUsage,
    pub access: KilnCpuAccess,
    pub bind_flags: KilnTextureBindFlags,
    /// Tightly packed rows of every subresource, mips of slice 0 first, then slice 1, etc.
    pub initial_data: Option<&'a [u8]>,
}

impl<'a> Default for KilnTextureBufferDef<'a> {
    fn default() -> Self {
        KilnTextureBufferDef {
            buffer_type: KilnBufferType::Texture2D,
            format: KilnFormat::R8G8B8A8_UNORM,
            width: 1,
            height: 1,
            depth: 1,
            mip_levels: 1,
            array_size: 1,
            samples_count: 1,
            samples_quality: KilnSampleQuality::Level(0),
            usage: KilnBufferUsage::Draw,
            access: KilnCpuAccess::NONE,
            bind_flags: KilnTextureBindFlags::SHADER_RESOURCE,
            initial_data: None,
        }
    }
}

impl<'a> KilnTextureBufferDef<'a> {
    pub fn texture_2d(
        width: u32,
        height: u32,
        format: KilnFormat,
    ) -> Self {
        KilnTextureBufferDef {
            width,
            height,
            format,
            ..Default::default()
        }
    }

    /// Checks everything that does not depend on device capabilities
    pub fn verify(&self) -> KilnResult<()> {
        let dimensions = self.buffer_type.texture_dimensions().ok_or_else(|| {
            KilnError::StringError(format!(
                "{:?} is not a texture buffer type",
                self.buffer_type
            ))
        })?;

        if self.format == KilnFormat::UNKNOWN {
            return Err("Texture buffers require a format")?;
        }

        if dimensions == KilnTextureDimensions::Dim1D && self.height.max(1) != 1 {
            return Err("1D textures must have a height of 1")?;
        }

        if dimensions != KilnTextureDimensions::Dim3D && self.depth.max(1) != 1 {
            return Err(format!(
                "{:?} textures must have a depth of 1",
                self.buffer_type
            ))?;
        }

        let max_extent = match dimensions {
            KilnTextureDimensions::Dim3D => MAX_TEXTURE_DIMENSION_3D,
            _ => MAX_TEXTURE_DIMENSION_2D,
        };
        if self.width.max(self.height).max(self.depth) > max_extent {
            return Err(format!(
                "{}x{}x{} is too large, {:?} textures are limited to {} texels per axis",
                self.width, self.height, self.depth, self.buffer_type, max_extent
            ))?;
        }

        if self.array_size == 0 {
            return Err("Texture array size must be at least 1")?;
        }

        if self.array_size > MAX_TEXTURE_ARRAY_SIZE {
            return Err(format!(
                "Texture array size {} exceeds the limit of {}",
                self.array_size, MAX_TEXTURE_ARRAY_SIZE
            ))?;
        }

        if !self.buffer_type.is_array() && self.array_size != 1 {
            return Err(format!(
                "{:?} textures must have an array size of 1",
                self.buffer_type
            ))?;
        }

        if self.buffer_type.is_multisample() {
            if self.mip_levels != 1 {
                return Err("Multisample textures must have exactly one mip level")?;
            }
        } else if self.samples_count > 1 {
            return Err(format!(
                "{:?} textures can't be multisampled",
                self.buffer_type
            ))?;
        }

        if self.samples_count == 0 {
            return Err("Texture sample count must be at least 1")?;
        }

        if self.format.is_block_compressed() {
            if dimensions != KilnTextureDimensions::Dim2D {
                return Err("Block compressed formats are only supported on 2D textures")?;
            }

            if self
                .bind_flags
                .intersects(KilnTextureBindFlags::RENDER_TARGET | KilnTextureBindFlags::DEPTH_STENCIL)
            {
                return Err("Block compressed textures can only be bound as shader resources")?;
            }
        }

        if self.format.is_depth_stencil() {
            if self.bind_flags.contains(KilnTextureBindFlags::RENDER_TARGET) {
                return Err("Depth stencil formats can't be bound as render targets")?;
            }
        } else if self.bind_flags.contains(KilnTextureBindFlags::DEPTH_STENCIL) {
            return Err(format!(
                "DEPTH_STENCIL bind flag requires a depth stencil format, got {:?}",
                self.format
            ))?;
        }

        if self.bind_flags.contains(KilnTextureBindFlags::DEPTH_STENCIL)
            && dimensions != KilnTextureDimensions::Dim2D
        {
            return Err("Depth stencil textures must be 2D")?;
        }

        if self.usage == KilnBufferUsage::Dynamic && self.mip_levels != 1 {
            return Err("Dynamic textures must have exactly one mip level")?;
        }

        self.usage.verify_access(self.access)?;

        let max_mip_levels = KilnTextureInfo::full_mip_chain_length(
            self.width.max(1),
            self.height.max(1),
            self.depth.max(1),
        );
        if self.mip_levels > max_mip_levels {
            return Err(format!(
                "Requested {} mip levels but a {}x{}x{} texture has at most {}",
                self.mip_levels, self.width, self.height, self.depth, max_mip_levels
            ))?;
        }

        if self.usage == KilnBufferUsage::Static && self.initial_data.is_none() {
            return Err("Static buffers must be created with initial data")?;
        }

        Ok(())
    }

    /// Initial data length must match the derived byte size exactly
    pub fn verify_initial_data(
        &self,
        byte_size: u64,
    ) -> KilnResult<()> {
        verify_initial_data(self.usage, self.initial_data, byte_size)
    }
}

/// Optional parameters for creating a `KilnRenderTargetView`
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct KilnRenderTargetViewDef {
    pub mip_slice: u32,
}

/// Optional parameters for creating a `KilnTextureView`
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct KilnTextureViewDef {
    pub most_detailed_mip: u32,
    /// 0 selects every mip from `most_detailed_mip` down
    pub mip_levels: u32,
}

/// Optional parameters for creating a `KilnDepthStencilView`
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct KilnDepthStencilViewDef {
    pub mip_slice: u32,
}

/// One CPU-side constant in a constant buffer block
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnConstantDef {
    /// Name of the member inside the shader's constant buffer struct
    pub name: String,
    pub size: u32,
    /// 0 or 1 packs the constant directly after the previous one
    pub alignment: u32,
}

impl KilnConstantDef {
    pub fn new(
        name: &str,
        size: u32,
        alignment: u32,
    ) -> Self {
        KilnConstantDef {
            name: name.to_string(),
            size,
            alignment,
        }
    }
}

/// Describes the CPU layout of a constant buffer block
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnConstantBufferViewDef {
    /// Matched against the uniform variable name or its struct type name
    pub block_name: String,
    /// In CPU order
    pub constants: Vec<KilnConstantDef>,
}

impl KilnConstantBufferViewDef {
    pub fn verify(&self) -> KilnResult<()> {
        if self.block_name.is_empty() {
            return Err("Constant buffer views need a block name")?;
        }

        if self.constants.is_empty() {
            return Err(format!(
                "Constant buffer view for {} has no constants",
                self.block_name
            ))?;
        }

        for constant in &self.constants {
            if constant.size == 0 {
                return Err(format!("Constant {} has a size of 0", constant.name))?;
            }

            if constant.alignment > 1 && !constant.alignment.is_power_of_two() {
                return Err(format!(
                    "Constant {} has alignment {}, which is not a power of two",
                    constant.name, constant.alignment
                ))?;
            }
        }

        Ok(())
    }
}

/// Used to create a `KilnShader`
#[derive(Copy, Clone, Debug)]
pub struct KilnShaderDef<'a> {
    pub stage: KilnShaderStage,
    pub language: KilnShaderLanguage,
    pub source: &'a str,
    pub entry_point: &'a str,
    /// Names defined for the preprocessor before the source is compiled
    pub defines: &'a [&'a str],
    pub optimization: KilnShaderOptimization,
}

impl<'a> KilnShaderDef<'a> {
    pub fn wgsl(
        stage: KilnShaderStage,
        source: &'a str,
        entry_point: &'a str,
    ) -> Self {
        KilnShaderDef {
            stage,
            language: KilnShaderLanguage::Wgsl,
            source,
            entry_point,
            defines: &[],
            optimization: KilnShaderOptimization::default(),
        }
    }
}

/// Used to create a `KilnSampler`
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnSamplerDef {
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub min_filter: KilnFilterType,
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub mag_filter: KilnFilterType,
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub mip_filter: KilnFilterType,
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub address_mode_u: KilnAddressMode,
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub address_mode_v: KilnAddressMode,
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub address_mode_w: KilnAddressMode,
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub mip_lod_bias: f32,
    /// 1 disables anisotropic filtering
    pub max_anisotropy: u32,
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub compare_op: KilnCompareOp,
    #[cfg_attr(feature = "serde-support", serde(default))]
    pub border_color: [f32; 4],
    pub min_lod: f32,
    pub max_lod: f32,
}

impl Default for KilnSamplerDef {
    fn default() -> Self {
        KilnSamplerDef {
            min_filter: Default::default(),
            mag_filter: Default::default(),
            mip_filter: Default::default(),
            address_mode_u: Default::default(),
            address_mode_v: Default::default(),
            address_mode_w: Default::default(),
            mip_lod_bias: 0.0,
            max_anisotropy: 1,
            compare_op: Default::default(),
            border_color: [0.0; 4],
            min_lod: 0.0,
            max_lod: f32::MAX,
        }
    }
}

impl KilnSamplerDef {
    pub fn verify(&self) -> KilnResult<()> {
        if !(1..=16).contains(&self.max_anisotropy) {
            return Err(format!(
                "max_anisotropy must be in 1..=16, got {}",
                self.max_anisotropy
            ))?;
        }

        if self.min_lod.is_nan() || self.max_lod.is_nan() || self.min_lod > self.max_lod {
            return Err(format!(
                "Sampler lod range {}..{} is not ordered",
                self.min_lod, self.max_lod
            ))?;
        }

        if !self.mip_lod_bias.is_finite() {
            return Err("mip_lod_bias must be finite")?;
        }

        Ok(())
    }
}

/// Configures blend state for a particular render target
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnBlendStateRenderTarget {
    pub src_factor: KilnBlendFactor,
    pub dst_factor: KilnBlendFactor,
    pub src_factor_alpha: KilnBlendFactor,
    pub dst_factor_alpha: KilnBlendFactor,
    pub blend_op: KilnBlendOp,
    pub blend_op_alpha: KilnBlendOp,
    pub masks: KilnColorFlags,
}

impl Default for KilnBlendStateRenderTarget {
    fn default() -> Self {
        KilnBlendStateRenderTarget {
            blend_op: KilnBlendOp::Add,
            blend_op_alpha: KilnBlendOp::Add,
            src_factor: KilnBlendFactor::One,
            src_factor_alpha: KilnBlendFactor::One,
            dst_factor: KilnBlendFactor::Zero,
            dst_factor_alpha: KilnBlendFactor::Zero,
            masks: KilnColorFlags::ALL,
        }
    }
}

impl KilnBlendStateRenderTarget {
    pub fn default_alpha_enabled() -> Self {
        KilnBlendStateRenderTarget {
            src_factor: KilnBlendFactor::SrcAlpha,
            dst_factor: KilnBlendFactor::OneMinusSrcAlpha,
            ..Default::default()
        }
    }

    pub fn blend_enabled(&self) -> bool {
        self.src_factor != KilnBlendFactor::One
            || self.src_factor_alpha != KilnBlendFactor::One
            || self.dst_factor != KilnBlendFactor::Zero
            || self.dst_factor_alpha != KilnBlendFactor::Zero
    }
}

/// Used to create a `KilnBlendState`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnBlendStateDef {
    pub render_target_blend_states: Vec<KilnBlendStateRenderTarget>,
    /// If false, `render_target_blend_states[0]` applies to every render target
    pub independent_blend: bool,
    pub alpha_to_coverage: bool,
}

impl KilnBlendStateDef {
    pub fn default_alpha_disabled() -> Self {
        KilnBlendStateDef {
            render_target_blend_states: vec![KilnBlendStateRenderTarget::default()],
            independent_blend: false,
            alpha_to_coverage: false,
        }
    }

    pub fn default_alpha_enabled() -> Self {
        KilnBlendStateDef {
            render_target_blend_states: vec![KilnBlendStateRenderTarget::default_alpha_enabled()],
            independent_blend: false,
            alpha_to_coverage: false,
        }
    }

    pub fn verify(&self) -> KilnResult<()> {
        let count = self.render_target_blend_states.len();
        if count == 0 || count > MAX_RENDER_TARGETS {
            return Err(format!(
                "Blend states need between 1 and {} render target entries, got {}",
                MAX_RENDER_TARGETS, count
            ))?;
        }

        if !self.independent_blend && count != 1 {
            return Err("If independent_blend is false, render_target_blend_states must have exactly one entry")?;
        }

        Ok(())
    }

    /// Blend settings for every render target slot, broadcasting entry 0 unless blending is
    /// independent
    pub fn expanded_render_targets(&self) -> [KilnBlendStateRenderTarget; MAX_RENDER_TARGETS] {
        let mut expanded = [KilnBlendStateRenderTarget::default(); MAX_RENDER_TARGETS];
        for (index, target) in expanded.iter_mut().enumerate() {
            let source = if self.independent_blend { index } else { 0 };
            if let Some(state) = self.render_target_blend_states.get(source) {
                *target = *state;
            }
        }
        expanded
    }
}

impl Default for KilnBlendStateDef {
    fn default() -> Self {
        Self::default_alpha_disabled()
    }
}

/// Used to create a `KilnRasterizerState`
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnRasterizerStateDef {
    pub cull_mode: KilnCullMode,
    pub front_face: KilnFrontFace,
    pub fill_mode: KilnFillMode,
    pub depth_bias: i32,
    pub depth_bias_clamp: f32,
    pub depth_bias_slope_scaled: f32,
    pub depth_clip_enable: bool,
    pub multisample: bool,
    pub scissor: bool,
    pub antialiased_lines: bool,
}

impl Default for KilnRasterizerStateDef {
    fn default() -> Self {
        KilnRasterizerStateDef {
            cull_mode: KilnCullMode::Back,
            front_face: Default::default(),
            fill_mode: Default::default(),
            depth_bias: 0,
            depth_bias_clamp: 0.0,
            depth_bias_slope_scaled: 0.0,
            depth_clip_enable: true,
            multisample: false,
            scissor: false,
            antialiased_lines: false,
        }
    }
}

impl KilnRasterizerStateDef {
    pub fn verify(&self) -> KilnResult<()> {
        if !self.depth_bias_clamp.is_finite() || !self.depth_bias_slope_scaled.is_finite() {
            return Err("Rasterizer depth bias values must be finite")?;
        }

        Ok(())
    }
}

/// Used to create a `KilnDepthStencilState`. Commonly used to enable "Z-buffering".
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnDepthStencilStateDef {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_compare_op: KilnCompareOp,
    pub stencil_test_enable: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
    pub front_depth_fail_op: KilnStencilOp,
    pub front_stencil_compare_op: KilnCompareOp,
    pub front_stencil_fail_op: KilnStencilOp,
    pub front_stencil_pass_op: KilnStencilOp,
    pub back_depth_fail_op: KilnStencilOp,
    pub back_stencil_compare_op: KilnCompareOp,
    pub back_stencil_fail_op: KilnStencilOp,
    pub back_stencil_pass_op: KilnStencilOp,
}

impl Default for KilnDepthStencilStateDef {
    fn default() -> Self {
        KilnDepthStencilStateDef {
            depth_test_enable: true,
            depth_write_enable: true,
            depth_compare_op: KilnCompareOp::Less,
            stencil_test_enable: false,
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
            front_depth_fail_op: Default::default(),
            front_stencil_compare_op: KilnCompareOp::Always,
            front_stencil_fail_op: Default::default(),
            front_stencil_pass_op: Default::default(),
            back_depth_fail_op: Default::default(),
            back_stencil_compare_op: KilnCompareOp::Always,
            back_stencil_fail_op: Default::default(),
            back_stencil_pass_op: Default::default(),
        }
    }
}

/// Describes one vertex shader input fed from a vertex buffer. An attribute with
/// `element_count > 1` (a matrix, for example) occupies that many consecutive locations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnVertexLayoutAttribute {
    pub location: u32,
    pub format: KilnFormat,
    pub buffer_slot: u32,
    pub byte_offset: u32,
    pub element_count: u32,
    pub per_instance: bool,
    /// Instances drawn per step when `per_instance` is set, ignored otherwise
    pub instance_step_rate: u32,
}

impl KilnVertexLayoutAttribute {
    pub fn per_vertex(
        location: u32,
        format: KilnFormat,
        buffer_slot: u32,
        byte_offset: u32,
    ) -> Self {
        KilnVertexLayoutAttribute {
            location,
            format,
            buffer_slot,
            byte_offset,
            element_count: 1,
            per_instance: false,
            instance_step_rate: 0,
        }
    }

    pub fn verify(&self) -> KilnResult<()> {
        if self.format.component_kind().is_none() {
            return Err(format!(
                "Vertex attribute at location {} has format {:?}, which can't be a vertex input",
                self.location, self.format
            ))?;
        }

        if self.element_count == 0 {
            return Err(format!(
                "Vertex attribute at location {} has an element count of 0",
                self.location
            ))?;
        }

        let end_location = self.location.saturating_add(self.element_count);
        if end_location > MAX_VERTEX_INPUT_LOCATIONS {
            return Err(format!(
                "Vertex attribute at location {} with {} elements runs past the last location {}",
                self.location,
                self.element_count,
                MAX_VERTEX_INPUT_LOCATIONS - 1
            ))?;
        }

        if self.buffer_slot as usize >= MAX_VERTEX_STREAM_BUFFERS {
            return Err(format!(
                "Vertex attribute at location {} reads buffer slot {}, max is {}",
                self.location,
                self.buffer_slot,
                MAX_VERTEX_STREAM_BUFFERS - 1
            ))?;
        }

        Ok(())
    }
}

/// A vertex buffer bound to one slot of a `KilnVertexStream`
#[derive(Copy, Clone, Debug)]
pub struct KilnVertexBufferBinding<'a> {
    pub buffer: &'a KilnBuffer,
    pub stride: u32,
    pub offset: u32,
}

/// The index buffer of a `KilnVertexStream`. Format must be R16_UINT or R32_UINT.
#[derive(Copy, Clone, Debug)]
pub struct KilnIndexBufferBinding<'a> {
    pub buffer: &'a KilnBuffer,
    pub format: KilnFormat,
    pub offset: u32,
}

/// Used to create a `KilnVertexStream`
#[derive(Copy, Clone, Debug)]
pub struct KilnVertexStreamDef<'a> {
    pub vertex_layout: &'a KilnVertexLayout,
    /// Bound to slots 0..len
    pub vertex_buffers: &'a [KilnVertexBufferBinding<'a>],
    pub index_buffer: Option<KilnIndexBufferBinding<'a>>,
    pub topology: KilnPrimitiveTopology,
}

impl<'a> KilnVertexStreamDef<'a> {
    pub fn verify(&self) -> KilnResult<()> {
        if self.vertex_buffers.len() > MAX_VERTEX_STREAM_BUFFERS {
            return Err(format!(
                "Vertex streams hold at most {} vertex buffers, got {}",
                MAX_VERTEX_STREAM_BUFFERS,
                self.vertex_buffers.len()
            ))?;
        }

        for (slot, binding) in self.vertex_buffers.iter().enumerate() {
            let buffer_type = binding.buffer.buffer_info().buffer_type;
            if buffer_type != KilnBufferType::Vertex {
                return Err(format!(
                    "Vertex stream slot {} holds a {:?} buffer",
                    slot, buffer_type
                ))?;
            }
        }

        if let Some(index_buffer) = &self.index_buffer {
            let buffer_type = index_buffer.buffer.buffer_info().buffer_type;
            if buffer_type != KilnBufferType::Index {
                return Err(format!(
                    "Vertex stream index buffer is a {:?} buffer",
                    buffer_type
                ))?;
            }

            if !index_buffer.format.is_index_format() {
                return Err(format!(
                    "Index buffer format must be R16_UINT or R32_UINT, got {:?}",
                    index_buffer.format
                ))?;
            }
        }

        Ok(())
    }
}

/// Used to create a `KilnSwapChain`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnSwapChainDef {
    pub format: KilnFormat,
}

impl Default for KilnSwapChainDef {
    fn default() -> Self {
        KilnSwapChainDef {
            format: KilnFormat::R8G8B8A8_UNORM,
        }
    }
}

impl KilnSwapChainDef {
    pub fn verify(&self) -> KilnResult<()> {
        if self.format.is_depth_stencil()
            || self.format.is_block_compressed()
            || self.format == KilnFormat::UNKNOWN
        {
            return Err(format!(
                "{:?} can't be used as a swap chain format",
                self.format
            ))?;
        }

        Ok(())
    }
}
