use crate::{
    KilnAddressMode, KilnBlendFactor, KilnBlendOp, KilnCompareOp, KilnCullMode, KilnFillMode,
    KilnFilterType, KilnFormat, KilnPrimitiveTopology, KilnResourceState, KilnSampleCount,
    KilnSamplerDef, KilnShaderVisibility, KilnStencilOp,
};
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

impl KilnFormat {
    pub fn into_dxgi(self) -> DXGI_FORMAT {
        DXGI_FORMAT(self.to_dxgi_raw() as i32)
    }

    pub fn from_dxgi(format: DXGI_FORMAT) -> KilnFormat {
        KilnFormat::from_dxgi_raw(format.0 as u32)
    }
}

/// D3D12 resource state bits match the tracked state bits, except for the states d3d12
/// folds into COMMON and the internal transitioning marker
pub(crate) fn resource_state_to_dx12(state: KilnResourceState) -> D3D12_RESOURCE_STATES {
    let mut native = state;
    native.remove(KilnResourceState::TRANSITIONING);
    native.remove(KilnResourceState::PRESENT);
    native.remove(KilnResourceState::COMMON);
    // COMMON, PRESENT, and UNDEFINED all map to D3D12_RESOURCE_STATE_COMMON (0)
    D3D12_RESOURCE_STATES(native.bits() as i32)
}

pub(crate) fn sample_count_to_dx12(sample_count: KilnSampleCount) -> u32 {
    match sample_count {
        KilnSampleCount::SampleCount1 => 1,
        KilnSampleCount::SampleCount2 => 2,
        KilnSampleCount::SampleCount4 => 4,
        KilnSampleCount::SampleCount8 => 8,
        KilnSampleCount::SampleCount16 => 16,
    }
}

pub(crate) fn shader_visibility_to_dx12(
    visibility: KilnShaderVisibility
) -> D3D12_SHADER_VISIBILITY {
    match visibility {
        KilnShaderVisibility::All => D3D12_SHADER_VISIBILITY_ALL,
        KilnShaderVisibility::Vertex => D3D12_SHADER_VISIBILITY_VERTEX,
        KilnShaderVisibility::Hull => D3D12_SHADER_VISIBILITY_HULL,
        KilnShaderVisibility::Domain => D3D12_SHADER_VISIBILITY_DOMAIN,
        KilnShaderVisibility::Geometry => D3D12_SHADER_VISIBILITY_GEOMETRY,
        KilnShaderVisibility::Pixel => D3D12_SHADER_VISIBILITY_PIXEL,
    }
}

pub(crate) fn compare_op_to_dx12(op: KilnCompareOp) -> D3D12_COMPARISON_FUNC {
    match op {
        KilnCompareOp::Never => D3D12_COMPARISON_FUNC_NEVER,
        KilnCompareOp::Less => D3D12_COMPARISON_FUNC_LESS,
        KilnCompareOp::Equal => D3D12_COMPARISON_FUNC_EQUAL,
        KilnCompareOp::LessOrEqual => D3D12_COMPARISON_FUNC_LESS_EQUAL,
        KilnCompareOp::Greater => D3D12_COMPARISON_FUNC_GREATER,
        KilnCompareOp::NotEqual => D3D12_COMPARISON_FUNC_NOT_EQUAL,
        KilnCompareOp::GreaterOrEqual => D3D12_COMPARISON_FUNC_GREATER_EQUAL,
        KilnCompareOp::Always => D3D12_COMPARISON_FUNC_ALWAYS,
    }
}

pub(crate) fn stencil_op_to_dx12(op: KilnStencilOp) -> D3D12_STENCIL_OP {
    match op {
        KilnStencilOp::Keep => D3D12_STENCIL_OP_KEEP,
        KilnStencilOp::Zero => D3D12_STENCIL_OP_ZERO,
        KilnStencilOp::Replace => D3D12_STENCIL_OP_REPLACE,
        KilnStencilOp::IncrementAndClamp => D3D12_STENCIL_OP_INCR_SAT,
        KilnStencilOp::DecrementAndClamp => D3D12_STENCIL_OP_DECR_SAT,
        KilnStencilOp::Invert => D3D12_STENCIL_OP_INVERT,
        KilnStencilOp::IncrementAndWrap => D3D12_STENCIL_OP_INCR,
        KilnStencilOp::DecrementAndWrap => D3D12_STENCIL_OP_DECR,
    }
}

pub(crate) fn blend_factor_to_dx12(factor: KilnBlendFactor) -> D3D12_BLEND {
    match factor {
        KilnBlendFactor::Zero => D3D12_BLEND_ZERO,
        KilnBlendFactor::One => D3D12_BLEND_ONE,
        KilnBlendFactor::SrcColor => D3D12_BLEND_SRC_COLOR,
        KilnBlendFactor::OneMinusSrcColor => D3D12_BLEND_INV_SRC_COLOR,
        KilnBlendFactor::DstColor => D3D12_BLEND_DEST_COLOR,
        KilnBlendFactor::OneMinusDstColor => D3D12_BLEND_INV_DEST_COLOR,
        KilnBlendFactor::SrcAlpha => D3D12_BLEND_SRC_ALPHA,
        KilnBlendFactor::OneMinusSrcAlpha => D3D12_BLEND_INV_SRC_ALPHA,
        KilnBlendFactor::DstAlpha => D3D12_BLEND_DEST_ALPHA,
        KilnBlendFactor::OneMinusDstAlpha => D3D12_BLEND_INV_DEST_ALPHA,
        KilnBlendFactor::SrcAlphaSaturate => D3D12_BLEND_SRC_ALPHA_SAT,
        KilnBlendFactor::ConstantColor => D3D12_BLEND_BLEND_FACTOR,
        KilnBlendFactor::OneMinusConstantColor => D3D12_BLEND_INV_BLEND_FACTOR,
    }
}

pub(crate) fn blend_op_to_dx12(op: KilnBlendOp) -> D3D12_BLEND_OP {
    match op {
        KilnBlendOp::Add => D3D12_BLEND_OP_ADD,
        KilnBlendOp::Subtract => D3D12_BLEND_OP_SUBTRACT,
        KilnBlendOp::ReverseSubtract => D3D12_BLEND_OP_REV_SUBTRACT,
        KilnBlendOp::Min => D3D12_BLEND_OP_MIN,
        KilnBlendOp::Max => D3D12_BLEND_OP_MAX,
    }
}

pub(crate) fn cull_mode_to_dx12(mode: KilnCullMode) -> D3D12_CULL_MODE {
    match mode {
        KilnCullMode::None => D3D12_CULL_MODE_NONE,
        KilnCullMode::Back => D3D12_CULL_MODE_BACK,
        KilnCullMode::Front => D3D12_CULL_MODE_FRONT,
    }
}

pub(crate) fn fill_mode_to_dx12(mode: KilnFillMode) -> D3D12_FILL_MODE {
    match mode {
        KilnFillMode::Solid => D3D12_FILL_MODE_SOLID,
        KilnFillMode::Wireframe => D3D12_FILL_MODE_WIREFRAME,
    }
}

pub(crate) fn topology_type_to_dx12(
    topology: KilnPrimitiveTopology
) -> D3D12_PRIMITIVE_TOPOLOGY_TYPE {
    match topology {
        KilnPrimitiveTopology::PointList => D3D12_PRIMITIVE_TOPOLOGY_TYPE_POINT,
        KilnPrimitiveTopology::LineList | KilnPrimitiveTopology::LineStrip => {
            D3D12_PRIMITIVE_TOPOLOGY_TYPE_LINE
        }
        KilnPrimitiveTopology::TriangleList | KilnPrimitiveTopology::TriangleStrip => {
            D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE
        }
    }
}

pub(crate) fn topology_to_dx12(topology: KilnPrimitiveTopology) -> D3D_PRIMITIVE_TOPOLOGY {
    match topology {
        KilnPrimitiveTopology::PointList => D3D_PRIMITIVE_TOPOLOGY_POINTLIST,
        KilnPrimitiveTopology::LineList => D3D_PRIMITIVE_TOPOLOGY_LINELIST,
        KilnPrimitiveTopology::LineStrip => D3D_PRIMITIVE_TOPOLOGY_LINESTRIP,
        KilnPrimitiveTopology::TriangleList => D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST,
        KilnPrimitiveTopology::TriangleStrip => D3D_PRIMITIVE_TOPOLOGY_TRIANGLESTRIP,
    }
}

pub(crate) fn address_mode_to_dx12(mode: KilnAddressMode) -> D3D12_TEXTURE_ADDRESS_MODE {
    match mode {
        KilnAddressMode::Mirror => D3D12_TEXTURE_ADDRESS_MODE_MIRROR,
        KilnAddressMode::Repeat => D3D12_TEXTURE_ADDRESS_MODE_WRAP,
        KilnAddressMode::ClampToEdge => D3D12_TEXTURE_ADDRESS_MODE_CLAMP,
        KilnAddressMode::ClampToBorder => D3D12_TEXTURE_ADDRESS_MODE_BORDER,
    }
}

// Encodes min/mag/mip filters into the packed D3D12_FILTER representation
pub(crate) fn filter_to_dx12(sampler_def: &KilnSamplerDef) -> D3D12_FILTER {
    if sampler_def.max_anisotropy > 1.0 {
        return D3D12_FILTER_ANISOTROPIC;
    }

    let mut bits = 0;
    if sampler_def.mip_map_mode == crate::KilnMipMapMode::Linear {
        bits |= 0x1;
    }
    if sampler_def.mag_filter == KilnFilterType::Linear {
        bits |= 0x4;
    }
    if sampler_def.min_filter == KilnFilterType::Linear {
        bits |= 0x10;
    }
    D3D12_FILTER(bits)
}

pub(crate) fn sampler_desc_to_dx12(sampler_def: &KilnSamplerDef) -> D3D12_SAMPLER_DESC {
    D3D12_SAMPLER_DESC {
        Filter: filter_to_dx12(sampler_def),
        AddressU: address_mode_to_dx12(sampler_def.address_mode_u),
        AddressV: address_mode_to_dx12(sampler_def.address_mode_v),
        AddressW: address_mode_to_dx12(sampler_def.address_mode_w),
        MipLODBias: sampler_def.mip_lod_bias,
        MaxAnisotropy: sampler_def.max_anisotropy as u32,
        ComparisonFunc: compare_op_to_dx12(sampler_def.compare_op),
        BorderColor: [0.0; 4],
        MinLOD: 0.0,
        MaxLOD: f32::MAX,
    }
}
