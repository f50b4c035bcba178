use crate::{KilnError, KilnResult};
#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Controls if validation is enabled or not. With validation enabled the soft backend performs
/// additional checks on draw calls and logs anything suspicious.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnValidationMode {
    Disabled,
    Enabled,
}

impl Default for KilnValidationMode {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        let validation_mode = KilnValidationMode::Enabled;
        #[cfg(not(debug_assertions))]
        let validation_mode = KilnValidationMode::Disabled;

        validation_mode
    }
}

/// Information about the device, mostly limits
#[derive(Clone, Debug)]
pub struct KilnDeviceInfo {
    pub max_render_targets: u32,
    pub max_vertex_stream_buffers: u32,
    pub max_texture_slots: u32,
    pub max_sampler_slots: u32,
    pub max_constant_buffer_slots: u32,
    pub max_sample_count: u32,
    /// Mapped texture rows are padded to a multiple of this
    pub row_pitch_alignment: u32,
    pub debug_names_enabled: bool,
}

/// A 2d size for windows, textures, etc.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnExtents2D {
    pub width: u32,
    pub height: u32,
}

/// A 3d size for textures
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnExtents3D {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl KilnExtents3D {
    pub fn to_2d(self) -> KilnExtents2D {
        KilnExtents2D {
            width: self.width,
            height: self.height,
        }
    }
}

/// What a buffer is for. The texture variants determine the dimensionality of a texture buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnBufferType {
    Vertex,
    Index,
    Constant,
    Texture1D,
    Texture1DArray,
    Texture2D,
    Texture2DArray,
    Texture2DMultisample,
    Texture2DMultisampleArray,
    Texture3D,
}

/// Number of dimensions of a texture buffer
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KilnTextureDimensions {
    Dim1D,
    Dim2D,
    Dim3D,
}

impl KilnBufferType {
    pub fn is_texture(self) -> bool {
        self.texture_dimensions().is_some()
    }

    pub fn is_array(self) -> bool {
        matches!(
            self,
            KilnBufferType::Texture1DArray
                | KilnBufferType::Texture2DArray
                | KilnBufferType::Texture2DMultisampleArray
        )
    }

    pub fn is_multisample(self) -> bool {
        matches!(
            self,
            KilnBufferType::Texture2DMultisample | KilnBufferType::Texture2DMultisampleArray
        )
    }

    pub fn texture_dimensions(self) -> Option<KilnTextureDimensions> {
        match self {
            KilnBufferType::Vertex | KilnBufferType::Index | KilnBufferType::Constant => None,
            KilnBufferType::Texture1D | KilnBufferType::Texture1DArray => {
                Some(KilnTextureDimensions::Dim1D)
            }
            KilnBufferType::Texture2D
            | KilnBufferType::Texture2DArray
            | KilnBufferType::Texture2DMultisample
            | KilnBufferType::Texture2DMultisampleArray => Some(KilnTextureDimensions::Dim2D),
            KilnBufferType::Texture3D => Some(KilnTextureDimensions::Dim3D),
        }
    }
}

/// Indicates how the memory will be accessed, by the GPU and the CPU, over the buffer's life
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnBufferUsage {
    /// Read and written by the GPU only
    Draw,
    /// Initialized at creation and never modified
    Static,
    /// Read by the GPU, rewritten by the CPU (typically every frame)
    Dynamic,
    /// Staging memory that both the CPU and the GPU may read and write
    Copy,
}

impl Default for KilnBufferUsage {
    fn default() -> Self {
        KilnBufferUsage::Draw
    }
}

bitflags::bitflags! {
    /// CPU access requested for a buffer. See `KilnBufferUsage` for which combinations are legal.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub struct KilnCpuAccess: u32 {
        const NONE = 0;
        const READ = 1<<0;
        const WRITE = 1<<1;
    }
}

impl KilnBufferUsage {
    pub fn verify_access(
        self,
        access: KilnCpuAccess,
    ) -> KilnResult<()> {
        let valid = match self {
            KilnBufferUsage::Draw | KilnBufferUsage::Static => access.is_empty(),
            KilnBufferUsage::Dynamic => access == KilnCpuAccess::WRITE,
            KilnBufferUsage::Copy => !access.is_empty(),
        };

        if valid {
            Ok(())
        } else {
            Err(KilnError::StringError(format!(
                "CPU access {:?} is not valid for {:?} usage",
                access, self
            )))
        }
    }
}

bitflags::bitflags! {
    /// Pipeline stages a texture buffer may be bound to
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub struct KilnTextureBindFlags: u32 {
        const NONE = 0;
        const SHADER_RESOURCE = 1<<0;
        const RENDER_TARGET = 1<<1;
        const DEPTH_STENCIL = 1<<2;
    }
}

impl Default for KilnTextureBindFlags {
    fn default() -> Self {
        KilnTextureBindFlags::SHADER_RESOURCE
    }
}

/// Multisample quality for a texture buffer
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnSampleQuality {
    Level(u32),
    /// Resolved at creation to the highest level the device supports for the sample count
    MaxAvailable,
}

impl Default for KilnSampleQuality {
    fn default() -> Self {
        KilnSampleQuality::Level(0)
    }
}

/// How a mapped subresource will be accessed
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KilnMapPolicy {
    ReadOnly,
    WriteOnly,
    ReadWrite,
    /// Previous contents become undefined. Only valid for `KilnBufferUsage::Dynamic` buffers.
    WriteDiscard,
}

impl KilnMapPolicy {
    pub fn is_readable(self) -> bool {
        matches!(self, KilnMapPolicy::ReadOnly | KilnMapPolicy::ReadWrite)
    }

    pub fn is_writable(self) -> bool {
        !matches!(self, KilnMapPolicy::ReadOnly)
    }

    pub fn verify(
        self,
        usage: KilnBufferUsage,
        access: KilnCpuAccess,
    ) -> KilnResult<()> {
        if self == KilnMapPolicy::WriteDiscard && usage != KilnBufferUsage::Dynamic {
            return Err(format!(
                "WriteDiscard maps require a Dynamic buffer (buffer usage is {:?})",
                usage
            ))?;
        }

        let mut required = KilnCpuAccess::NONE;
        if self.is_readable() {
            required |= KilnCpuAccess::READ;
        }
        if self.is_writable() {
            required |= KilnCpuAccess::WRITE;
        }

        if !access.contains(required) {
            return Err(format!(
                "Map policy {:?} requires CPU access {:?} but the buffer allows {:?}",
                self, required, access
            ))?;
        }

        Ok(())
    }
}

/// Affects whether presentation waits for a vertical blank
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnPresentMode {
    /// Present as soon as possible, tearing is allowed
    Immediate,
    /// Present synchronized to one vertical blank
    Vsync,
}

impl KilnPresentMode {
    pub fn sync_interval(self) -> u32 {
        match self {
            KilnPresentMode::Immediate => 0,
            KilnPresentMode::Vsync => 1,
        }
    }
}

/// The programmable stages a shader can be compiled for
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnShaderStage {
    Vertex,
    Pixel,
    Geometry,
}

impl KilnShaderStage {
    pub const ALL: [KilnShaderStage; 3] = [
        KilnShaderStage::Vertex,
        KilnShaderStage::Pixel,
        KilnShaderStage::Geometry,
    ];

    /// Position of the stage in per-stage arrays
    pub fn index(self) -> usize {
        match self {
            KilnShaderStage::Vertex => 0,
            KilnShaderStage::Pixel => 1,
            KilnShaderStage::Geometry => 2,
        }
    }

    /// Compilation target profile for the stage
    pub fn target_profile(self) -> &'static str {
        match self {
            KilnShaderStage::Vertex => "vs_5_0",
            KilnShaderStage::Pixel => "ps_5_0",
            KilnShaderStage::Geometry => "gs_5_0",
        }
    }
}

/// Shading language (and version) of shader source
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnShaderLanguage {
    /// WGSL 1.0, the only language the soft backend compiles
    Wgsl,
    /// HLSL shader model 5.0, reserved for native Direct3D backends
    Hlsl50,
}

impl Default for KilnShaderLanguage {
    fn default() -> Self {
        KilnShaderLanguage::Wgsl
    }
}

/// Requested compiler optimization level. The soft backend keeps it on the shader but compiles
/// every level the same way.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnShaderOptimization {
    Disabled,
    Low,
    High,
}

impl Default for KilnShaderOptimization {
    fn default() -> Self {
        KilnShaderOptimization::High
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnPrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

impl Default for KilnPrimitiveTopology {
    fn default() -> Self {
        KilnPrimitiveTopology::TriangleList
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnFilterType {
    Point,
    Linear,
}

impl Default for KilnFilterType {
    fn default() -> Self {
        KilnFilterType::Linear
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnAddressMode {
    Wrap,
    Mirror,
    Clamp,
    Border,
    MirrorOnce,
}

impl Default for KilnAddressMode {
    fn default() -> Self {
        KilnAddressMode::Clamp
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnCompareOp {
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

impl Default for KilnCompareOp {
    fn default() -> Self {
        KilnCompareOp::Never
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnStencilOp {
    Keep,
    Zero,
    Replace,
    IncrementAndClamp,
    DecrementAndClamp,
    Invert,
    IncrementAndWrap,
    DecrementAndWrap,
}

impl Default for KilnStencilOp {
    fn default() -> Self {
        KilnStencilOp::Keep
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnBlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    SrcAlphaSaturate,
    ConstantColor,
    OneMinusConstantColor,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnBlendOp {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

impl Default for KilnBlendOp {
    fn default() -> Self {
        KilnBlendOp::Add
    }
}

bitflags::bitflags! {
    /// Flags for enabling/disabling color channels, used with `KilnBlendStateDef`
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub struct KilnColorFlags: u8 {
        const RED = 1;
        const GREEN = 2;
        const BLUE = 4;
        const ALPHA = 8;
        const ALL = 0x0F;
    }
}

impl Default for KilnColorFlags {
    fn default() -> Self {
        KilnColorFlags::ALL
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnCullMode {
    None,
    Front,
    Back,
}

impl Default for KilnCullMode {
    fn default() -> Self {
        KilnCullMode::Back
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnFrontFace {
    CounterClockwise,
    Clockwise,
}

impl Default for KilnFrontFace {
    fn default() -> Self {
        KilnFrontFace::Clockwise
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnFillMode {
    Solid,
    Wireframe,
}

impl Default for KilnFillMode {
    fn default() -> Self {
        KilnFillMode::Solid
    }
}

bitflags::bitflags! {
    /// Which aspects of a depth stencil view a clear affects
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct KilnClearFlags: u32 {
        const DEPTH = 1<<0;
        const STENCIL = 1<<1;
    }
}

/// Value used to clear a render target
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnColorClearValue(pub [f32; 4]);

impl From<[f32; 4]> for KilnColorClearValue {
    fn from(color: [f32; 4]) -> Self {
        KilnColorClearValue(color)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnViewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl KilnViewport {
    pub fn from_extents(extents: KilnExtents2D) -> Self {
        KilnViewport {
            x: 0.0,
            y: 0.0,
            width: extents.width as f32,
            height: extents.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_access_consistency() {
        assert!(KilnBufferUsage::Static
            .verify_access(KilnCpuAccess::NONE)
            .is_ok());
        assert!(KilnBufferUsage::Static
            .verify_access(KilnCpuAccess::WRITE)
            .is_err());
        assert!(KilnBufferUsage::Dynamic
            .verify_access(KilnCpuAccess::WRITE)
            .is_ok());
        assert!(KilnBufferUsage::Dynamic
            .verify_access(KilnCpuAccess::READ | KilnCpuAccess::WRITE)
            .is_err());
        assert!(KilnBufferUsage::Copy
            .verify_access(KilnCpuAccess::READ)
            .is_ok());
        assert!(KilnBufferUsage::Copy
            .verify_access(KilnCpuAccess::NONE)
            .is_err());
    }

    #[test]
    fn map_policy_rules() {
        let rw = KilnCpuAccess::READ | KilnCpuAccess::WRITE;
        assert!(KilnMapPolicy::WriteDiscard
            .verify(KilnBufferUsage::Dynamic, KilnCpuAccess::WRITE)
            .is_ok());
        assert!(KilnMapPolicy::WriteDiscard
            .verify(KilnBufferUsage::Copy, rw)
            .is_err());
        assert!(KilnMapPolicy::ReadOnly
            .verify(KilnBufferUsage::Copy, rw)
            .is_ok());
        assert!(KilnMapPolicy::ReadOnly
            .verify(KilnBufferUsage::Dynamic, KilnCpuAccess::WRITE)
            .is_err());
        assert!(KilnMapPolicy::ReadWrite
            .verify(KilnBufferUsage::Copy, KilnCpuAccess::WRITE)
            .is_err());
        assert!(KilnMapPolicy::WriteOnly
            .verify(KilnBufferUsage::Draw, KilnCpuAccess::NONE)
            .is_err());
    }

    #[test]
    fn buffer_type_dimensions() {
        assert!(!KilnBufferType::Constant.is_texture());
        assert_eq!(
            KilnBufferType::Texture2DMultisampleArray.texture_dimensions(),
            Some(KilnTextureDimensions::Dim2D)
        );
        assert!(KilnBufferType::Texture2DMultisampleArray.is_array());
        assert!(KilnBufferType::Texture2DMultisampleArray.is_multisample());
        assert!(!KilnBufferType::Texture3D.is_array());
    }
}
