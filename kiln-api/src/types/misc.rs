#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::{KilnBuffer, KilnTexture};
use kiln_base::DecimalF32;

bitflags::bitflags! {
    /// The current state of a resource. When an operation is performed that references a resource,
    /// it must be in the correct state. Resources are moved between states using barriers.
    pub struct KilnResourceState: u32 {
        const UNDEFINED = 0;
        /// D3D12 shares one read state between vertex and constant buffers, so kiln does too. The
        /// buffer's resource type says which of the two it is.
        const VERTEX_AND_CONSTANT_BUFFER = 0x1;
        const INDEX_BUFFER = 0x2;
        /// Similar to vulkan's COLOR_ATTACHMENT_OPTIMAL image layout
        const RENDER_TARGET = 0x4;
        const UNORDERED_ACCESS = 0x8;
        /// Similar to vulkan's DEPTH_STENCIL_ATTACHMENT_OPTIMAL image layout
        const DEPTH_WRITE = 0x10;
        const DEPTH_READ = 0x20;
        const NON_PIXEL_SHADER_RESOURCE = 0x40;
        const PIXEL_SHADER_RESOURCE = 0x80;
        const SHADER_RESOURCE = 0x40 | 0x80;
        const STREAM_OUT = 0x100;
        const INDIRECT_ARGUMENT = 0x200;
        const COPY_DST = 0x400;
        const COPY_SRC = 0x800;
        const RESOLVE_DST = 0x1000;
        const RESOLVE_SRC = 0x2000;
        const GENERIC_READ = 0x1 | 0x2 | 0x40 | 0x80 | 0x200 | 0x800;
        /// Similar to vulkan's PRESENT_SRC_KHR image layout
        const PRESENT = 0x4000;
        const COMMON = 0x8000;
        const PREDICATION = 0x10000;
        /// A deferred barrier has been recorded for the resource but not yet flushed. The resource
        /// may not be read, written, or bound until the pending barriers are flushed.
        const TRANSITIONING = 0x8000_0000;
    }
}

bitflags::bitflags! {
    /// Indicates how a resource will be used. In some cases, multiple flags are allowed.
    #[derive(Default)]
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub struct KilnResourceType: u32 {
        const UNDEFINED = 0;
        const SAMPLER = 1<<0;
        /// Similar to DX12 SRV and vulkan SAMPLED image usage flag and SAMPLED_IMAGE descriptor type
        const TEXTURE = 1<<1;
        /// Similar to DX12 UAV and vulkan STORAGE image usage flag and STORAGE_IMAGE descriptor type
        const TEXTURE_READ_WRITE = 1<<2;
        /// Similar to DX12 SRV on a structured buffer and vulkan STORAGE_BUFFER descriptor type
        const BUFFER = 1<<3;
        /// Similar to DX12 UAV on a structured buffer and vulkan STORAGE_BUFFER descriptor type
        const BUFFER_READ_WRITE = 1<<4;
        /// Similar to DX12 CBV and vulkan UNIFORM_BUFFER descriptor type
        const UNIFORM_BUFFER = 1<<5;
        const VERTEX_BUFFER = 1<<6;
        const INDEX_BUFFER = 1<<7;
        const INDIRECT_BUFFER = 1<<8;
        const RENDER_TARGET_COLOR = 1<<9;
        const RENDER_TARGET_DEPTH_STENCIL = 1<<10;
    }
}

bitflags::bitflags! {
    /// Flags for enabling/disabling color channels, used with `KilnBlendState`
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

bitflags::bitflags! {
    /// Indicates a particular stage of a shader, or set of stages in a shader. Similar to
    /// VkShaderStageFlagBits
    #[derive(Default)]
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub struct KilnShaderStageFlags: u32 {
        const NONE = 0;
        const VERTEX = 1;
        const HULL = 2;
        const DOMAIN = 4;
        const GEOMETRY = 8;
        const PIXEL = 16;
        const COMPUTE = 32;
        const ALL_GRAPHICS = 0x1F;
        const ALL = 0x3F;
    }
}

bitflags::bitflags! {
    /// Hints attached to a root signature at finalize time. Similar to
    /// D3D12_ROOT_SIGNATURE_FLAGS; on vulkan the deny flags only trim stage visibility.
    #[derive(Default)]
    pub struct KilnRootSignatureFlags: u32 {
        const NONE = 0;
        const ALLOW_INPUT_ASSEMBLER_INPUT = 1;
        const DENY_VERTEX_SHADER_ACCESS = 2;
        const DENY_HULL_SHADER_ACCESS = 4;
        const DENY_DOMAIN_SHADER_ACCESS = 8;
        const DENY_GEOMETRY_SHADER_ACCESS = 16;
        const DENY_PIXEL_SHADER_ACCESS = 32;
    }
}

/// Which shader stages may see a root parameter. Similar to D3D12_SHADER_VISIBILITY; on vulkan
/// this widens to the matching VkShaderStageFlags.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnShaderVisibility {
    All,
    Vertex,
    Hull,
    Domain,
    Geometry,
    Pixel,
}

impl Default for KilnShaderVisibility {
    fn default() -> Self {
        KilnShaderVisibility::All
    }
}

/// The kind of descriptors a root parameter range holds. Texture and buffer SRV/UAV ranges are
/// distinct kinds, binding a texture into a buffer range is rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnDescriptorRangeType {
    ConstantBuffer,
    TextureSrv,
    BufferSrv,
    TextureUav,
    BufferUav,
    Sampler,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KilnPipelineType {
    Graphics,
    Compute,
}

/// Indicates how the memory of a buffer will be accessed
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnMemoryUsage {
    GpuOnly,
    CpuToGpu,
    GpuToCpu,
}

impl Default for KilnMemoryUsage {
    fn default() -> Self {
        KilnMemoryUsage::GpuOnly
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnFilterType {
    Nearest,
    Linear,
}

impl Default for KilnFilterType {
    fn default() -> Self {
        KilnFilterType::Nearest
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnMipMapMode {
    Nearest,
    Linear,
}

impl Default for KilnMipMapMode {
    fn default() -> Self {
        KilnMipMapMode::Nearest
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnAddressMode {
    Mirror,
    Repeat,
    ClampToEdge,
    ClampToBorder,
}

impl Default for KilnAddressMode {
    fn default() -> Self {
        KilnAddressMode::Mirror
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

impl Default for KilnBlendFactor {
    fn default() -> Self {
        KilnBlendFactor::Zero
    }
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
pub enum KilnCullMode {
    None,
    Back,
    Front,
}

impl Default for KilnCullMode {
    fn default() -> Self {
        KilnCullMode::None
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
        KilnFrontFace::CounterClockwise
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
pub enum KilnVertexAttributeRate {
    Vertex,
    Instance,
}

impl Default for KilnVertexAttributeRate {
    fn default() -> Self {
        KilnVertexAttributeRate::Vertex
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnLoadOp {
    DontCare,
    Load,
    Clear,
}

impl Default for KilnLoadOp {
    fn default() -> Self {
        KilnLoadOp::DontCare
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnStoreOp {
    DontCare,
    Store,
}

impl Default for KilnStoreOp {
    fn default() -> Self {
        KilnStoreOp::Store
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnSampleCount {
    SampleCount1,
    SampleCount2,
    SampleCount4,
    SampleCount8,
    SampleCount16,
}

impl Default for KilnSampleCount {
    fn default() -> Self {
        KilnSampleCount::SampleCount1
    }
}

impl KilnSampleCount {
    pub fn as_u32(self) -> u32 {
        match self {
            KilnSampleCount::SampleCount1 => 1,
            KilnSampleCount::SampleCount2 => 2,
            KilnSampleCount::SampleCount4 => 4,
            KilnSampleCount::SampleCount8 => 8,
            KilnSampleCount::SampleCount16 => 16,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnIndexType {
    Uint32,
    Uint16,
}

impl Default for KilnIndexType {
    fn default() -> Self {
        KilnIndexType::Uint32
    }
}

/// Capability and limit information for the device a context wraps
#[derive(Clone, Debug)]
pub struct KilnDeviceInfo {
    pub supports_imageless_framebuffer: bool,
    pub min_uniform_buffer_offset_alignment: u32,
    pub max_color_attachments: u32,
}

impl Default for KilnDeviceInfo {
    fn default() -> Self {
        KilnDeviceInfo {
            supports_imageless_framebuffer: false,
            min_uniform_buffer_offset_alignment: 256,
            max_color_attachments: crate::MAX_COLOR_ATTACHMENTS as u32,
        }
    }
}

/// A texture transition recorded into a barrier batch
pub struct KilnTextureBarrier<'a> {
    pub texture: &'a KilnTexture,
    pub src_state: KilnResourceState,
    pub dst_state: KilnResourceState,
}

impl<'a> KilnTextureBarrier<'a> {
    pub fn state_transition(
        texture: &'a KilnTexture,
        src_state: KilnResourceState,
        dst_state: KilnResourceState,
    ) -> Self {
        KilnTextureBarrier {
            texture,
            src_state,
            dst_state,
        }
    }
}

/// A buffer transition recorded into a barrier batch
pub struct KilnBufferBarrier<'a> {
    pub buffer: &'a KilnBuffer,
    pub src_state: KilnResourceState,
    pub dst_state: KilnResourceState,
}

impl<'a> KilnBufferBarrier<'a> {
    pub fn state_transition(
        buffer: &'a KilnBuffer,
        src_state: KilnResourceState,
        dst_state: KilnResourceState,
    ) -> Self {
        KilnBufferBarrier {
            buffer,
            src_state,
            dst_state,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnColorClearValue(pub [f32; 4]);

impl std::hash::Hash for KilnColorClearValue {
    fn hash<H: std::hash::Hasher>(
        &self,
        state: &mut H,
    ) {
        for &value in &self.0 {
            DecimalF32(value).hash(state);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnDepthStencilClearValue {
    pub depth: f32,
    pub stencil: u32,
}

impl Default for KilnDepthStencilClearValue {
    fn default() -> Self {
        KilnDepthStencilClearValue {
            depth: 0.0,
            stencil: 0,
        }
    }
}

impl std::hash::Hash for KilnDepthStencilClearValue {
    fn hash<H: std::hash::Hasher>(
        &self,
        state: &mut H,
    ) {
        DecimalF32(self.depth).hash(state);
        self.stencil.hash(state);
    }
}

/// Clear values for every attachment of a framebuffer, indexed the same way as the
/// framebuffer's color slots
#[derive(Clone, Debug, Default)]
pub struct KilnClearValues {
    pub colors: Vec<KilnColorClearValue>,
    pub depth_stencil: Option<KilnDepthStencilClearValue>,
}
