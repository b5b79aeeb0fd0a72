use crate::{
    KilnAddressMode, KilnBlendFactor, KilnBlendOp, KilnCompareOp, KilnCullMode,
    KilnDescriptorRangeType, KilnFillMode, KilnFilterType, KilnFormat, KilnFrontFace,
    KilnIndexType, KilnMipMapMode, KilnPrimitiveTopology, KilnResourceState, KilnSampleCount,
    KilnShaderStageFlags, KilnShaderVisibility, KilnStencilOp, KilnVertexAttributeRate,
};
use ash::vk;

impl KilnFormat {
    pub fn into_vk(self) -> vk::Format {
        vk::Format::from_raw(self.to_vk_raw())
    }

    pub fn from_vk(format: vk::Format) -> KilnFormat {
        KilnFormat::from_vk_raw(format.as_raw())
    }
}

pub(crate) fn shader_visibility_to_vk(visibility: KilnShaderVisibility) -> vk::ShaderStageFlags {
    match visibility {
        KilnShaderVisibility::All => vk::ShaderStageFlags::ALL_GRAPHICS | vk::ShaderStageFlags::COMPUTE,
        KilnShaderVisibility::Vertex => vk::ShaderStageFlags::VERTEX,
        KilnShaderVisibility::Hull => vk::ShaderStageFlags::TESSELLATION_CONTROL,
        KilnShaderVisibility::Domain => vk::ShaderStageFlags::TESSELLATION_EVALUATION,
        KilnShaderVisibility::Geometry => vk::ShaderStageFlags::GEOMETRY,
        KilnShaderVisibility::Pixel => vk::ShaderStageFlags::FRAGMENT,
    }
}

pub(crate) fn shader_stage_to_vk(stage: KilnShaderStageFlags) -> vk::ShaderStageFlags {
    let mut flags = vk::ShaderStageFlags::empty();
    if stage.intersects(KilnShaderStageFlags::VERTEX) {
        flags |= vk::ShaderStageFlags::VERTEX;
    }
    if stage.intersects(KilnShaderStageFlags::HULL) {
        flags |= vk::ShaderStageFlags::TESSELLATION_CONTROL;
    }
    if stage.intersects(KilnShaderStageFlags::DOMAIN) {
        flags |= vk::ShaderStageFlags::TESSELLATION_EVALUATION;
    }
    if stage.intersects(KilnShaderStageFlags::GEOMETRY) {
        flags |= vk::ShaderStageFlags::GEOMETRY;
    }
    if stage.intersects(KilnShaderStageFlags::PIXEL) {
        flags |= vk::ShaderStageFlags::FRAGMENT;
    }
    if stage.intersects(KilnShaderStageFlags::COMPUTE) {
        flags |= vk::ShaderStageFlags::COMPUTE;
    }
    flags
}

pub(crate) fn range_type_to_vk(
    range_type: KilnDescriptorRangeType,
    dynamic: bool,
) -> vk::DescriptorType {
    match range_type {
        KilnDescriptorRangeType::ConstantBuffer => {
            if dynamic {
                vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC
            } else {
                vk::DescriptorType::UNIFORM_BUFFER
            }
        }
        KilnDescriptorRangeType::TextureSrv => vk::DescriptorType::SAMPLED_IMAGE,
        KilnDescriptorRangeType::BufferSrv => vk::DescriptorType::STORAGE_BUFFER,
        KilnDescriptorRangeType::TextureUav => vk::DescriptorType::STORAGE_IMAGE,
        KilnDescriptorRangeType::BufferUav => vk::DescriptorType::STORAGE_BUFFER,
        KilnDescriptorRangeType::Sampler => vk::DescriptorType::SAMPLER,
    }
}

/// The image layout a tracked state corresponds to
pub(crate) fn resource_state_to_image_layout(state: KilnResourceState) -> vk::ImageLayout {
    if state == KilnResourceState::UNDEFINED {
        vk::ImageLayout::UNDEFINED
    } else if state.intersects(KilnResourceState::RENDER_TARGET) {
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL
    } else if state.intersects(KilnResourceState::DEPTH_WRITE) {
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
    } else if state.intersects(KilnResourceState::DEPTH_READ) {
        vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL
    } else if state.intersects(KilnResourceState::UNORDERED_ACCESS) {
        vk::ImageLayout::GENERAL
    } else if state.intersects(KilnResourceState::SHADER_RESOURCE) {
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL
    } else if state.intersects(KilnResourceState::COPY_SRC) {
        vk::ImageLayout::TRANSFER_SRC_OPTIMAL
    } else if state.intersects(KilnResourceState::COPY_DST) {
        vk::ImageLayout::TRANSFER_DST_OPTIMAL
    } else if state.intersects(KilnResourceState::PRESENT) {
        vk::ImageLayout::PRESENT_SRC_KHR
    } else {
        vk::ImageLayout::GENERAL
    }
}

pub(crate) fn resource_state_to_access_flags(state: KilnResourceState) -> vk::AccessFlags {
    let mut flags = vk::AccessFlags::empty();
    if state.intersects(KilnResourceState::VERTEX_AND_CONSTANT_BUFFER) {
        flags |= vk::AccessFlags::VERTEX_ATTRIBUTE_READ | vk::AccessFlags::UNIFORM_READ;
    }
    if state.intersects(KilnResourceState::INDEX_BUFFER) {
        flags |= vk::AccessFlags::INDEX_READ;
    }
    if state.intersects(KilnResourceState::RENDER_TARGET) {
        flags |= vk::AccessFlags::COLOR_ATTACHMENT_READ | vk::AccessFlags::COLOR_ATTACHMENT_WRITE;
    }
    if state.intersects(KilnResourceState::UNORDERED_ACCESS) {
        flags |= vk::AccessFlags::SHADER_READ | vk::AccessFlags::SHADER_WRITE;
    }
    if state.intersects(KilnResourceState::DEPTH_WRITE) {
        flags |= vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ
            | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE;
    }
    if state.intersects(KilnResourceState::DEPTH_READ) {
        flags |= vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ;
    }
    if state.intersects(KilnResourceState::SHADER_RESOURCE) {
        flags |= vk::AccessFlags::SHADER_READ;
    }
    if state.intersects(KilnResourceState::INDIRECT_ARGUMENT) {
        flags |= vk::AccessFlags::INDIRECT_COMMAND_READ;
    }
    if state.intersects(KilnResourceState::COPY_SRC) {
        flags |= vk::AccessFlags::TRANSFER_READ;
    }
    if state.intersects(KilnResourceState::COPY_DST) {
        flags |= vk::AccessFlags::TRANSFER_WRITE;
    }
    flags
}

pub(crate) fn index_type_to_vk(index_type: KilnIndexType) -> vk::IndexType {
    match index_type {
        KilnIndexType::Uint32 => vk::IndexType::UINT32,
        KilnIndexType::Uint16 => vk::IndexType::UINT16,
    }
}

pub(crate) fn sample_count_to_vk(sample_count: KilnSampleCount) -> vk::SampleCountFlags {
    match sample_count {
        KilnSampleCount::SampleCount1 => vk::SampleCountFlags::TYPE_1,
        KilnSampleCount::SampleCount2 => vk::SampleCountFlags::TYPE_2,
        KilnSampleCount::SampleCount4 => vk::SampleCountFlags::TYPE_4,
        KilnSampleCount::SampleCount8 => vk::SampleCountFlags::TYPE_8,
        KilnSampleCount::SampleCount16 => vk::SampleCountFlags::TYPE_16,
    }
}

pub(crate) fn topology_to_vk(topology: KilnPrimitiveTopology) -> vk::PrimitiveTopology {
    match topology {
        KilnPrimitiveTopology::PointList => vk::PrimitiveTopology::POINT_LIST,
        KilnPrimitiveTopology::LineList => vk::PrimitiveTopology::LINE_LIST,
        KilnPrimitiveTopology::LineStrip => vk::PrimitiveTopology::LINE_STRIP,
        KilnPrimitiveTopology::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
        KilnPrimitiveTopology::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
    }
}

pub(crate) fn attribute_rate_to_vk(rate: KilnVertexAttributeRate) -> vk::VertexInputRate {
    match rate {
        KilnVertexAttributeRate::Vertex => vk::VertexInputRate::VERTEX,
        KilnVertexAttributeRate::Instance => vk::VertexInputRate::INSTANCE,
    }
}

pub(crate) fn compare_op_to_vk(op: KilnCompareOp) -> vk::CompareOp {
    match op {
        KilnCompareOp::Never => vk::CompareOp::NEVER,
        KilnCompareOp::Less => vk::CompareOp::LESS,
        KilnCompareOp::Equal => vk::CompareOp::EQUAL,
        KilnCompareOp::LessOrEqual => vk::CompareOp::LESS_OR_EQUAL,
        KilnCompareOp::Greater => vk::CompareOp::GREATER,
        KilnCompareOp::NotEqual => vk::CompareOp::NOT_EQUAL,
        KilnCompareOp::GreaterOrEqual => vk::CompareOp::GREATER_OR_EQUAL,
        KilnCompareOp::Always => vk::CompareOp::ALWAYS,
    }
}

pub(crate) fn stencil_op_to_vk(op: KilnStencilOp) -> vk::StencilOp {
    match op {
        KilnStencilOp::Keep => vk::StencilOp::KEEP,
        KilnStencilOp::Zero => vk::StencilOp::ZERO,
        KilnStencilOp::Replace => vk::StencilOp::REPLACE,
        KilnStencilOp::IncrementAndClamp => vk::StencilOp::INCREMENT_AND_CLAMP,
        KilnStencilOp::DecrementAndClamp => vk::StencilOp::DECREMENT_AND_CLAMP,
        KilnStencilOp::Invert => vk::StencilOp::INVERT,
        KilnStencilOp::IncrementAndWrap => vk::StencilOp::INCREMENT_AND_WRAP,
        KilnStencilOp::DecrementAndWrap => vk::StencilOp::DECREMENT_AND_WRAP,
    }
}

pub(crate) fn blend_factor_to_vk(factor: KilnBlendFactor) -> vk::BlendFactor {
    match factor {
        KilnBlendFactor::Zero => vk::BlendFactor::ZERO,
        KilnBlendFactor::One => vk::BlendFactor::ONE,
        KilnBlendFactor::SrcColor => vk::BlendFactor::SRC_COLOR,
        KilnBlendFactor::OneMinusSrcColor => vk::BlendFactor::ONE_MINUS_SRC_COLOR,
        KilnBlendFactor::DstColor => vk::BlendFactor::DST_COLOR,
        KilnBlendFactor::OneMinusDstColor => vk::BlendFactor::ONE_MINUS_DST_COLOR,
        KilnBlendFactor::SrcAlpha => vk::BlendFactor::SRC_ALPHA,
        KilnBlendFactor::OneMinusSrcAlpha => vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
        KilnBlendFactor::DstAlpha => vk::BlendFactor::DST_ALPHA,
        KilnBlendFactor::OneMinusDstAlpha => vk::BlendFactor::ONE_MINUS_DST_ALPHA,
        KilnBlendFactor::SrcAlphaSaturate => vk::BlendFactor::SRC_ALPHA_SATURATE,
        KilnBlendFactor::ConstantColor => vk::BlendFactor::CONSTANT_COLOR,
        KilnBlendFactor::OneMinusConstantColor => vk::BlendFactor::ONE_MINUS_CONSTANT_COLOR,
    }
}

pub(crate) fn blend_op_to_vk(op: KilnBlendOp) -> vk::BlendOp {
    match op {
        KilnBlendOp::Add => vk::BlendOp::ADD,
        KilnBlendOp::Subtract => vk::BlendOp::SUBTRACT,
        KilnBlendOp::ReverseSubtract => vk::BlendOp::REVERSE_SUBTRACT,
        KilnBlendOp::Min => vk::BlendOp::MIN,
        KilnBlendOp::Max => vk::BlendOp::MAX,
    }
}

pub(crate) fn cull_mode_to_vk(mode: KilnCullMode) -> vk::CullModeFlags {
    match mode {
        KilnCullMode::None => vk::CullModeFlags::NONE,
        KilnCullMode::Back => vk::CullModeFlags::BACK,
        KilnCullMode::Front => vk::CullModeFlags::FRONT,
    }
}

pub(crate) fn front_face_to_vk(front_face: KilnFrontFace) -> vk::FrontFace {
    match front_face {
        KilnFrontFace::CounterClockwise => vk::FrontFace::COUNTER_CLOCKWISE,
        KilnFrontFace::Clockwise => vk::FrontFace::CLOCKWISE,
    }
}

pub(crate) fn fill_mode_to_vk(mode: KilnFillMode) -> vk::PolygonMode {
    match mode {
        KilnFillMode::Solid => vk::PolygonMode::FILL,
        KilnFillMode::Wireframe => vk::PolygonMode::LINE,
    }
}

pub(crate) fn filter_to_vk(filter: KilnFilterType) -> vk::Filter {
    match filter {
        KilnFilterType::Nearest => vk::Filter::NEAREST,
        KilnFilterType::Linear => vk::Filter::LINEAR,
    }
}

pub(crate) fn mip_map_mode_to_vk(mode: KilnMipMapMode) -> vk::SamplerMipmapMode {
    match mode {
        KilnMipMapMode::Nearest => vk::SamplerMipmapMode::NEAREST,
        KilnMipMapMode::Linear => vk::SamplerMipmapMode::LINEAR,
    }
}

pub(crate) fn address_mode_to_vk(mode: KilnAddressMode) -> vk::SamplerAddressMode {
    match mode {
        KilnAddressMode::Mirror => vk::SamplerAddressMode::MIRRORED_REPEAT,
        KilnAddressMode::Repeat => vk::SamplerAddressMode::REPEAT,
        KilnAddressMode::ClampToEdge => vk::SamplerAddressMode::CLAMP_TO_EDGE,
        KilnAddressMode::ClampToBorder => vk::SamplerAddressMode::CLAMP_TO_BORDER,
    }
}
