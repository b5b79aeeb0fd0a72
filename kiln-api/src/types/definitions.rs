#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

use crate::{
    KilnAddressMode, KilnBlendFactor, KilnBlendOp, KilnColorFlags, KilnCompareOp, KilnCullMode,
    KilnFillMode, KilnFilterType, KilnFormat, KilnFrontFace, KilnMemoryUsage, KilnMipMapMode,
    KilnPrimitiveTopology, KilnResourceState, KilnResourceType, KilnRootSignature,
    KilnSampleCount, KilnShader, KilnStencilOp, KilnVertexAttributeRate,
};
use kiln_base::DecimalF32;
use std::hash::{Hash, Hasher};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnExtents3D {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

/// Used to create a `KilnTexture`
#[derive(Clone, Debug)]
pub struct KilnTextureDef {
    pub extents: KilnExtents3D,
    pub array_length: u32,
    pub mip_count: u32,
    pub sample_count: KilnSampleCount,
    pub format: KilnFormat,
    pub resource_type: KilnResourceType,
}

impl Default for KilnTextureDef {
    fn default() -> Self {
        KilnTextureDef {
            extents: KilnExtents3D {
                width: 0,
                height: 0,
                depth: 1,
            },
            array_length: 1,
            mip_count: 1,
            sample_count: KilnSampleCount::SampleCount1,
            format: KilnFormat::Unknown,
            resource_type: KilnResourceType::TEXTURE,
        }
    }
}

impl KilnTextureDef {
    pub fn is_render_target(&self) -> bool {
        self.resource_type.intersects(
            KilnResourceType::RENDER_TARGET_COLOR | KilnResourceType::RENDER_TARGET_DEPTH_STENCIL,
        )
    }

    /// The state a texture with this def is tracked in immediately after creation
    pub fn initial_state(&self) -> KilnResourceState {
        if self
            .resource_type
            .intersects(KilnResourceType::RENDER_TARGET_COLOR)
        {
            KilnResourceState::RENDER_TARGET
        } else if self
            .resource_type
            .intersects(KilnResourceType::RENDER_TARGET_DEPTH_STENCIL)
        {
            KilnResourceState::DEPTH_WRITE
        } else {
            KilnResourceState::UNDEFINED
        }
    }

    pub fn verify(&self) {
        assert!(self.extents.width > 0);
        assert!(self.extents.height > 0);
        assert!(self.extents.depth > 0);
        assert!(self.array_length > 0);
        assert!(self.mip_count > 0);
        assert!(!self.format.is_undefined());

        if self
            .resource_type
            .intersects(KilnResourceType::RENDER_TARGET_COLOR)
        {
            assert!(!self.format.has_depth_or_stencil());
        }

        if self
            .resource_type
            .intersects(KilnResourceType::RENDER_TARGET_DEPTH_STENCIL)
        {
            assert!(self.format.has_depth_or_stencil());
        }

        if self.sample_count != KilnSampleCount::SampleCount1 {
            assert!(self.is_render_target());
            assert_eq!(self.mip_count, 1);
        }

        if self
            .resource_type
            .intersects(KilnResourceType::TEXTURE_READ_WRITE)
        {
            assert_eq!(self.sample_count, KilnSampleCount::SampleCount1);
        }
    }
}

/// Describes the elements of a structured buffer
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnBufferElementData {
    pub element_count: u64,
    pub element_stride: u64,
}

/// Used to create a `KilnBuffer`
#[derive(Clone, Debug)]
pub struct KilnBufferDef {
    pub size: u64,
    pub memory_usage: KilnMemoryUsage,
    pub resource_type: KilnResourceType,
    pub elements: KilnBufferElementData,
}

impl Default for KilnBufferDef {
    fn default() -> Self {
        KilnBufferDef {
            size: 0,
            memory_usage: KilnMemoryUsage::GpuOnly,
            resource_type: KilnResourceType::UNDEFINED,
            elements: Default::default(),
        }
    }
}

impl KilnBufferDef {
    pub fn initial_state(&self) -> KilnResourceState {
        KilnResourceState::COMMON
    }

    pub fn verify(&self) {
        assert_ne!(self.size, 0);
        if self
            .resource_type
            .intersects(KilnResourceType::BUFFER | KilnResourceType::BUFFER_READ_WRITE)
        {
            assert_ne!(self.elements.element_stride, 0);
            assert_ne!(self.elements.element_count, 0);
            assert!(self.elements.element_count * self.elements.element_stride <= self.size);
        }
    }

    pub fn for_uniform_buffer_size(size: u64) -> Self {
        KilnBufferDef {
            size,
            memory_usage: KilnMemoryUsage::CpuToGpu,
            resource_type: KilnResourceType::UNIFORM_BUFFER,
            ..Default::default()
        }
    }

    pub fn for_structured_buffer(
        element_count: u64,
        element_stride: u64,
        read_write: bool,
    ) -> Self {
        let resource_type = if read_write {
            KilnResourceType::BUFFER_READ_WRITE
        } else {
            KilnResourceType::BUFFER
        };

        KilnBufferDef {
            size: element_count * element_stride,
            memory_usage: KilnMemoryUsage::GpuOnly,
            resource_type,
            elements: KilnBufferElementData {
                element_count,
                element_stride,
            },
        }
    }
}

/// Used to create a `KilnSampler`, or embedded in a root signature as a static sampler
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnSamplerDef {
    pub min_filter: KilnFilterType,
    pub mag_filter: KilnFilterType,
    pub mip_map_mode: KilnMipMapMode,
    pub address_mode_u: KilnAddressMode,
    pub address_mode_v: KilnAddressMode,
    pub address_mode_w: KilnAddressMode,
    pub mip_lod_bias: f32,
    pub max_anisotropy: f32,
    pub compare_op: KilnCompareOp,
}

impl Eq for KilnSamplerDef {}

impl Hash for KilnSamplerDef {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.min_filter.hash(state);
        self.mag_filter.hash(state);
        self.mip_map_mode.hash(state);
        self.address_mode_u.hash(state);
        self.address_mode_v.hash(state);
        self.address_mode_w.hash(state);
        DecimalF32(self.mip_lod_bias).hash(state);
        DecimalF32(self.max_anisotropy).hash(state);
        self.compare_op.hash(state);
    }
}

/// Affects depth and stencil testing in a graphics pipeline
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnDepthState {
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

impl Default for KilnDepthState {
    fn default() -> Self {
        KilnDepthState {
            depth_test_enable: false,
            depth_write_enable: false,
            depth_compare_op: KilnCompareOp::LessOrEqual,
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

/// Affects rasterization in a graphics pipeline
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnRasterizerState {
    pub cull_mode: KilnCullMode,
    pub front_face: KilnFrontFace,
    pub fill_mode: KilnFillMode,
    pub depth_bias: i32,
    pub depth_bias_slope_scaled: f32,
    pub depth_clamp_enable: bool,
    pub multisample: bool,
}

impl Eq for KilnRasterizerState {}

impl Hash for KilnRasterizerState {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.cull_mode.hash(state);
        self.front_face.hash(state);
        self.fill_mode.hash(state);
        self.depth_bias.hash(state);
        DecimalF32(self.depth_bias_slope_scaled).hash(state);
        self.depth_clamp_enable.hash(state);
        self.multisample.hash(state);
    }
}

/// Blending configuration for a single color attachment
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnBlendStateRenderTarget {
    pub blend_enable: bool,
    pub src_factor: KilnBlendFactor,
    pub dst_factor: KilnBlendFactor,
    pub blend_op: KilnBlendOp,
    pub src_factor_alpha: KilnBlendFactor,
    pub dst_factor_alpha: KilnBlendFactor,
    pub blend_op_alpha: KilnBlendOp,
    pub masks: KilnColorFlags,
}

/// Affects blending in a graphics pipeline. When `independent_blend` is false the single
/// entry in `render_target_blend_states` applies to every color attachment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnBlendState {
    pub independent_blend: bool,
    pub render_target_blend_states: Vec<KilnBlendStateRenderTarget>,
}

impl Default for KilnBlendState {
    fn default() -> Self {
        KilnBlendState {
            independent_blend: false,
            render_target_blend_states: vec![KilnBlendStateRenderTarget::default()],
        }
    }
}

impl KilnBlendState {
    pub fn verify(
        &self,
        color_attachment_count: usize,
    ) {
        if self.independent_blend {
            assert_eq!(
                self.render_target_blend_states.len(),
                color_attachment_count,
                "blend state must be provided for each color attachment when independent blend is enabled"
            );
        } else {
            assert_eq!(
                self.render_target_blend_states.len(),
                1,
                "expected a single blend state when independent blend is disabled"
            );
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnVertexLayoutAttribute {
    pub format: KilnFormat,
    pub buffer_index: u32,
    pub location: u32,
    pub byte_offset: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnVertexLayoutBuffer {
    pub stride: u32,
    pub rate: KilnVertexAttributeRate,
}

/// The input layout a graphics pipeline consumes vertex buffers with
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct KilnVertexLayout {
    pub attributes: Vec<KilnVertexLayoutAttribute>,
    pub buffers: Vec<KilnVertexLayoutBuffer>,
}

/// The full state blob a graphics pipeline is created from. Hashing the def keys the
/// per-device pipeline cache, so two defs that hash equal produce one native pipeline.
#[derive(Clone, Debug, Default)]
pub struct KilnGraphicsPsoDef {
    pub root_signature: Option<KilnRootSignature>,
    pub vertex_shader: Option<KilnShader>,
    pub pixel_shader: Option<KilnShader>,
    pub geometry_shader: Option<KilnShader>,
    pub hull_shader: Option<KilnShader>,
    pub domain_shader: Option<KilnShader>,
    pub blend_state: KilnBlendState,
    pub depth_state: KilnDepthState,
    pub rasterizer_state: KilnRasterizerState,
    pub vertex_layout: KilnVertexLayout,
    pub primitive_topology: KilnPrimitiveTopology,
    pub color_formats: Vec<KilnFormat>,
    pub depth_stencil_format: Option<KilnFormat>,
    pub sample_count: KilnSampleCount,
}

fn hash_shader<H: Hasher>(
    shader: &Option<KilnShader>,
    state: &mut H,
) {
    match shader {
        Some(shader) => shader.shader_hash().hash(state),
        None => 0u64.hash(state),
    }
}

impl Hash for KilnGraphicsPsoDef {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        match &self.root_signature {
            Some(signature) => signature.signature_id().hash(state),
            None => 0u64.hash(state),
        }
        hash_shader(&self.vertex_shader, state);
        hash_shader(&self.pixel_shader, state);
        hash_shader(&self.geometry_shader, state);
        hash_shader(&self.hull_shader, state);
        hash_shader(&self.domain_shader, state);
        self.blend_state.hash(state);
        self.depth_state.hash(state);
        self.rasterizer_state.hash(state);
        self.vertex_layout.hash(state);
        self.primitive_topology.hash(state);
        self.color_formats.hash(state);
        self.depth_stencil_format.hash(state);
        self.sample_count.hash(state);
    }
}

impl KilnGraphicsPsoDef {
    pub fn verify(&self) {
        assert!(
            self.root_signature.is_some(),
            "graphics pipeline requires a root signature"
        );
        assert!(
            self.vertex_shader.is_some(),
            "graphics pipeline requires a vertex shader"
        );
        assert!(
            !self.color_formats.is_empty() || self.depth_stencil_format.is_some(),
            "graphics pipeline requires at least one render target format"
        );
        self.blend_state.verify(self.color_formats.len().max(1));
        if let Some(depth_format) = self.depth_stencil_format {
            assert!(depth_format.has_depth_or_stencil());
        }
    }
}

/// The state blob a compute pipeline is created from
#[derive(Clone, Debug, Default)]
pub struct KilnComputePsoDef {
    pub root_signature: Option<KilnRootSignature>,
    pub compute_shader: Option<KilnShader>,
}

impl Hash for KilnComputePsoDef {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        match &self.root_signature {
            Some(signature) => signature.signature_id().hash(state),
            None => 0u64.hash(state),
        }
        hash_shader(&self.compute_shader, state);
    }
}

impl KilnComputePsoDef {
    pub fn verify(&self) {
        assert!(
            self.root_signature.is_some(),
            "compute pipeline requires a root signature"
        );
        assert!(
            self.compute_shader.is_some(),
            "compute pipeline requires a compute shader"
        );
    }
}

/// Used to create a `KilnShaderModule` from compiled shader bytes
#[derive(Clone, Debug)]
pub enum KilnShaderModuleDef<'a> {
    /// SPIR-V binary
    SpvBytes(&'a [u8]),
    /// DXIL binary
    DxilBytes(&'a [u8]),
}

impl<'a> KilnShaderModuleDef<'a> {
    pub fn bytes(&self) -> &'a [u8] {
        match self {
            KilnShaderModuleDef::SpvBytes(bytes) => bytes,
            KilnShaderModuleDef::DxilBytes(bytes) => bytes,
        }
    }
}

/// A single shader stage: a compiled module plus the entry point to run
#[derive(Clone, Debug)]
pub struct KilnShaderStageDef {
    pub shader_module: crate::KilnShaderModule,
    pub entry_point: String,
    pub stage: crate::KilnShaderStageFlags,
}
