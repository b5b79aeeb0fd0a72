use super::{util, KilnDeviceContextDx12, KilnShaderDx12};
use crate::{
    KilnComputePsoDef, KilnGraphicsPsoDef, KilnPipelineType, KilnResult, KilnRootSignature,
    KilnShader, MAX_COLOR_ATTACHMENTS,
};
use std::sync::Arc;
use windows::core::PCSTR;
use windows::Win32::Graphics::Direct3D::{
    D3D_PRIMITIVE_TOPOLOGY, D3D_PRIMITIVE_TOPOLOGY_UNDEFINED,
};
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

// Vertex attributes are matched by semantic index rather than name
const SEMANTIC_NAME: &[u8] = b"TEXCOORD\0";

#[derive(Debug)]
struct KilnPipelineDx12Inner {
    _device_context: KilnDeviceContextDx12,
    pipeline_type: KilnPipelineType,
    root_signature: KilnRootSignature,
    pipeline_state: ID3D12PipelineState,
    topology: D3D_PRIMITIVE_TOPOLOGY,
}

#[derive(Clone, Debug)]
pub struct KilnPipelineDx12 {
    inner: Arc<KilnPipelineDx12Inner>,
}

fn dx12_shader<'a>(shader: &'a KilnShader) -> KilnResult<&'a KilnShaderDx12> {
    Ok(shader
        .dx12_shader()
        .ok_or("shader was not created by this device context")?)
}

fn bytecode(shader: &KilnShaderDx12) -> D3D12_SHADER_BYTECODE {
    D3D12_SHADER_BYTECODE {
        pShaderBytecode: shader.bytecode().as_ptr() as *const std::ffi::c_void,
        BytecodeLength: shader.bytecode().len(),
    }
}

impl KilnPipelineDx12 {
    pub(crate) fn new_graphics_pipeline(
        device_context: &KilnDeviceContextDx12,
        def: &KilnGraphicsPsoDef,
    ) -> KilnResult<Self> {
        def.verify();

        // verify() guarantees these are set
        let root_signature = def.root_signature.clone().unwrap();
        let dx12_root_signature = root_signature
            .dx12_root_signature()
            .ok_or("root signature was not created by this device context")?;

        let mut input_elements = Vec::with_capacity(def.vertex_layout.attributes.len());
        for attribute in &def.vertex_layout.attributes {
            let buffer = &def.vertex_layout.buffers[attribute.buffer_index as usize];
            let (input_class, step_rate) = match buffer.rate {
                crate::KilnVertexAttributeRate::Vertex => {
                    (D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA, 0)
                }
                crate::KilnVertexAttributeRate::Instance => {
                    (D3D12_INPUT_CLASSIFICATION_PER_INSTANCE_DATA, 1)
                }
            };
            input_elements.push(D3D12_INPUT_ELEMENT_DESC {
                SemanticName: PCSTR(SEMANTIC_NAME.as_ptr()),
                SemanticIndex: attribute.location,
                Format: attribute.format.into_dxgi(),
                InputSlot: attribute.buffer_index,
                AlignedByteOffset: attribute.byte_offset,
                InputSlotClass: input_class,
                InstanceDataStepRate: step_rate,
            });
        }

        let mut render_target_blends =
            [D3D12_RENDER_TARGET_BLEND_DESC::default(); MAX_COLOR_ATTACHMENTS];
        for attachment_index in 0..def.color_formats.len() {
            let rt_state = if def.blend_state.independent_blend {
                &def.blend_state.render_target_blend_states[attachment_index]
            } else {
                &def.blend_state.render_target_blend_states[0]
            };
            render_target_blends[attachment_index] = D3D12_RENDER_TARGET_BLEND_DESC {
                BlendEnable: rt_state.blend_enable.into(),
                LogicOpEnable: false.into(),
                SrcBlend: util::blend_factor_to_dx12(rt_state.src_factor),
                DestBlend: util::blend_factor_to_dx12(rt_state.dst_factor),
                BlendOp: util::blend_op_to_dx12(rt_state.blend_op),
                SrcBlendAlpha: util::blend_factor_to_dx12(rt_state.src_factor_alpha),
                DestBlendAlpha: util::blend_factor_to_dx12(rt_state.dst_factor_alpha),
                BlendOpAlpha: util::blend_op_to_dx12(rt_state.blend_op_alpha),
                LogicOp: D3D12_LOGIC_OP_NOOP,
                RenderTargetWriteMask: rt_state.masks.bits(),
            };
        }

        let depth_state = &def.depth_state;
        let depth_stencil = D3D12_DEPTH_STENCIL_DESC {
            DepthEnable: depth_state.depth_test_enable.into(),
            DepthWriteMask: if depth_state.depth_write_enable {
                D3D12_DEPTH_WRITE_MASK_ALL
            } else {
                D3D12_DEPTH_WRITE_MASK_ZERO
            },
            DepthFunc: util::compare_op_to_dx12(depth_state.depth_compare_op),
            StencilEnable: depth_state.stencil_test_enable.into(),
            StencilReadMask: depth_state.stencil_read_mask,
            StencilWriteMask: depth_state.stencil_write_mask,
            FrontFace: D3D12_DEPTH_STENCILOP_DESC {
                StencilFailOp: util::stencil_op_to_dx12(depth_state.front_stencil_fail_op),
                StencilDepthFailOp: util::stencil_op_to_dx12(depth_state.front_depth_fail_op),
                StencilPassOp: util::stencil_op_to_dx12(depth_state.front_stencil_pass_op),
                StencilFunc: util::compare_op_to_dx12(depth_state.front_stencil_compare_op),
            },
            BackFace: D3D12_DEPTH_STENCILOP_DESC {
                StencilFailOp: util::stencil_op_to_dx12(depth_state.back_stencil_fail_op),
                StencilDepthFailOp: util::stencil_op_to_dx12(depth_state.back_depth_fail_op),
                StencilPassOp: util::stencil_op_to_dx12(depth_state.back_stencil_pass_op),
                StencilFunc: util::compare_op_to_dx12(depth_state.back_stencil_compare_op),
            },
        };

        let rasterizer = D3D12_RASTERIZER_DESC {
            FillMode: util::fill_mode_to_dx12(def.rasterizer_state.fill_mode),
            CullMode: util::cull_mode_to_dx12(def.rasterizer_state.cull_mode),
            FrontCounterClockwise: (def.rasterizer_state.front_face
                == crate::KilnFrontFace::CounterClockwise)
                .into(),
            DepthBias: def.rasterizer_state.depth_bias,
            DepthBiasClamp: 0.0,
            SlopeScaledDepthBias: def.rasterizer_state.depth_bias_slope_scaled,
            DepthClipEnable: (!def.rasterizer_state.depth_clamp_enable).into(),
            MultisampleEnable: def.rasterizer_state.multisample.into(),
            AntialiasedLineEnable: false.into(),
            ForcedSampleCount: 0,
            ConservativeRaster: D3D12_CONSERVATIVE_RASTERIZATION_MODE_OFF,
        };

        let mut rtv_formats = [DXGI_FORMAT_UNKNOWN; MAX_COLOR_ATTACHMENTS];
        for (slot, format) in def.color_formats.iter().enumerate() {
            rtv_formats[slot] = format.into_dxgi();
        }

        let mut desc = D3D12_GRAPHICS_PIPELINE_STATE_DESC {
            pRootSignature: windows::core::ManuallyDrop::new(
                dx12_root_signature.dx12_root_signature(),
            ),
            InputLayout: D3D12_INPUT_LAYOUT_DESC {
                pInputElementDescs: input_elements.as_ptr(),
                NumElements: input_elements.len() as u32,
            },
            BlendState: D3D12_BLEND_DESC {
                AlphaToCoverageEnable: false.into(),
                IndependentBlendEnable: def.blend_state.independent_blend.into(),
                RenderTarget: render_target_blends,
            },
            SampleMask: u32::MAX,
            RasterizerState: rasterizer,
            DepthStencilState: depth_stencil,
            IBStripCutValue: D3D12_INDEX_BUFFER_STRIP_CUT_VALUE_DISABLED,
            PrimitiveTopologyType: util::topology_type_to_dx12(def.primitive_topology),
            NumRenderTargets: def.color_formats.len() as u32,
            RTVFormats: rtv_formats,
            DSVFormat: def
                .depth_stencil_format
                .map(|f| f.into_dxgi())
                .unwrap_or(DXGI_FORMAT_UNKNOWN),
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: util::sample_count_to_dx12(def.sample_count),
                Quality: 0,
            },
            NodeMask: 0,
            ..Default::default()
        };

        desc.VS = bytecode(dx12_shader(def.vertex_shader.as_ref().unwrap())?);
        if let Some(shader) = &def.pixel_shader {
            desc.PS = bytecode(dx12_shader(shader)?);
        }
        if let Some(shader) = &def.geometry_shader {
            desc.GS = bytecode(dx12_shader(shader)?);
        }
        if let Some(shader) = &def.hull_shader {
            desc.HS = bytecode(dx12_shader(shader)?);
        }
        if let Some(shader) = &def.domain_shader {
            desc.DS = bytecode(dx12_shader(shader)?);
        }

        let pipeline_state: ID3D12PipelineState = unsafe {
            device_context
                .inner
                .device
                .CreateGraphicsPipelineState(&desc)?
        };

        Ok(KilnPipelineDx12 {
            inner: Arc::new(KilnPipelineDx12Inner {
                _device_context: device_context.clone(),
                pipeline_type: KilnPipelineType::Graphics,
                root_signature,
                pipeline_state,
                topology: util::topology_to_dx12(def.primitive_topology),
            }),
        })
    }

    pub(crate) fn new_compute_pipeline(
        device_context: &KilnDeviceContextDx12,
        def: &KilnComputePsoDef,
    ) -> KilnResult<Self> {
        def.verify();

        let root_signature = def.root_signature.clone().unwrap();
        let dx12_root_signature = root_signature
            .dx12_root_signature()
            .ok_or("root signature was not created by this device context")?;
        let shader = dx12_shader(def.compute_shader.as_ref().unwrap())?;

        let desc = D3D12_COMPUTE_PIPELINE_STATE_DESC {
            pRootSignature: windows::core::ManuallyDrop::new(
                dx12_root_signature.dx12_root_signature(),
            ),
            CS: bytecode(shader),
            NodeMask: 0,
            ..Default::default()
        };

        let pipeline_state: ID3D12PipelineState = unsafe {
            device_context
                .inner
                .device
                .CreateComputePipelineState(&desc)?
        };

        Ok(KilnPipelineDx12 {
            inner: Arc::new(KilnPipelineDx12Inner {
                _device_context: device_context.clone(),
                pipeline_type: KilnPipelineType::Compute,
                root_signature,
                pipeline_state,
                topology: D3D_PRIMITIVE_TOPOLOGY_UNDEFINED,
            }),
        })
    }

    pub fn pipeline_type(&self) -> KilnPipelineType {
        self.inner.pipeline_type
    }

    pub fn root_signature(&self) -> &KilnRootSignature {
        &self.inner.root_signature
    }

    pub fn dx12_pipeline_state(&self) -> &ID3D12PipelineState {
        &self.inner.pipeline_state
    }

    pub(crate) fn dx12_topology(&self) -> D3D_PRIMITIVE_TOPOLOGY {
        self.inner.topology
    }
}
