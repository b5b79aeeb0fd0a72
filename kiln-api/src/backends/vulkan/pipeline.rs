use super::{util, KilnDeviceContextVulkan, KilnShaderVulkan};
use crate::{
    KilnComputePsoDef, KilnGraphicsPsoDef, KilnPipelineType, KilnResult, KilnRootSignature,
    KilnShader,
};
use ash::vk;
use std::sync::Arc;

#[derive(Debug)]
struct KilnPipelineVulkanInner {
    device_context: KilnDeviceContextVulkan,
    pipeline_type: KilnPipelineType,
    root_signature: KilnRootSignature,
    pipeline: vk::Pipeline,
}

impl Drop for KilnPipelineVulkanInner {
    fn drop(&mut self) {
        unsafe {
            self.device_context
                .inner
                .device
                .destroy_pipeline(self.pipeline, None);
        }
    }
}

#[derive(Clone, Debug)]
pub struct KilnPipelineVulkan {
    inner: Arc<KilnPipelineVulkanInner>,
}

fn vk_shader<'a>(shader: &'a KilnShader) -> KilnResult<&'a KilnShaderVulkan> {
    Ok(shader
        .vk_shader()
        .ok_or("shader was not created by this device context")?)
}

impl KilnPipelineVulkan {
    pub(crate) fn new_graphics_pipeline(
        device_context: &KilnDeviceContextVulkan,
        def: &KilnGraphicsPsoDef,
    ) -> KilnResult<Self> {
        def.verify();

        // verify() guarantees these are set
        let root_signature = def.root_signature.clone().unwrap();
        let vk_root_signature = root_signature
            .vk_root_signature()
            .ok_or("root signature was not created by this device context")?;

        let mut stages = Vec::new();
        let shader_slots = [
            (&def.vertex_shader, vk::ShaderStageFlags::VERTEX),
            (&def.pixel_shader, vk::ShaderStageFlags::FRAGMENT),
            (&def.geometry_shader, vk::ShaderStageFlags::GEOMETRY),
            (&def.hull_shader, vk::ShaderStageFlags::TESSELLATION_CONTROL),
            (
                &def.domain_shader,
                vk::ShaderStageFlags::TESSELLATION_EVALUATION,
            ),
        ];
        for (shader, stage) in shader_slots {
            if let Some(shader) = shader {
                let shader = vk_shader(shader)?;
                stages.push(
                    vk::PipelineShaderStageCreateInfo::builder()
                        .stage(stage)
                        .module(shader.vk_shader_module())
                        .name(shader.entry_point_cstr())
                        .build(),
                );
            }
        }

        let mut vertex_bindings = Vec::with_capacity(def.vertex_layout.buffers.len());
        for (buffer_index, buffer) in def.vertex_layout.buffers.iter().enumerate() {
            vertex_bindings.push(vk::VertexInputBindingDescription {
                binding: buffer_index as u32,
                stride: buffer.stride,
                input_rate: util::attribute_rate_to_vk(buffer.rate),
            });
        }

        let mut vertex_attributes = Vec::with_capacity(def.vertex_layout.attributes.len());
        for attribute in &def.vertex_layout.attributes {
            vertex_attributes.push(vk::VertexInputAttributeDescription {
                location: attribute.location,
                binding: attribute.buffer_index,
                format: attribute.format.into_vk(),
                offset: attribute.byte_offset,
            });
        }

        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::builder()
            .vertex_binding_descriptions(&vertex_bindings)
            .vertex_attribute_descriptions(&vertex_attributes);

        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::builder()
            .topology(util::topology_to_vk(def.primitive_topology));

        // Viewport and scissor are always dynamic, counts still have to be declared
        let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
            .viewport_count(1)
            .scissor_count(1);

        let rasterization_state = vk::PipelineRasterizationStateCreateInfo::builder()
            .polygon_mode(util::fill_mode_to_vk(def.rasterizer_state.fill_mode))
            .cull_mode(util::cull_mode_to_vk(def.rasterizer_state.cull_mode))
            .front_face(util::front_face_to_vk(def.rasterizer_state.front_face))
            .depth_clamp_enable(def.rasterizer_state.depth_clamp_enable)
            .depth_bias_enable(def.rasterizer_state.depth_bias != 0)
            .depth_bias_constant_factor(def.rasterizer_state.depth_bias as f32)
            .depth_bias_slope_factor(def.rasterizer_state.depth_bias_slope_scaled)
            .line_width(1.0);

        let multisample_state = vk::PipelineMultisampleStateCreateInfo::builder()
            .rasterization_samples(util::sample_count_to_vk(def.sample_count));

        let depth_state = &def.depth_state;
        let front = vk::StencilOpState {
            fail_op: util::stencil_op_to_vk(depth_state.front_stencil_fail_op),
            pass_op: util::stencil_op_to_vk(depth_state.front_stencil_pass_op),
            depth_fail_op: util::stencil_op_to_vk(depth_state.front_depth_fail_op),
            compare_op: util::compare_op_to_vk(depth_state.front_stencil_compare_op),
            compare_mask: depth_state.stencil_read_mask as u32,
            write_mask: depth_state.stencil_write_mask as u32,
            reference: 0,
        };
        let back = vk::StencilOpState {
            fail_op: util::stencil_op_to_vk(depth_state.back_stencil_fail_op),
            pass_op: util::stencil_op_to_vk(depth_state.back_stencil_pass_op),
            depth_fail_op: util::stencil_op_to_vk(depth_state.back_depth_fail_op),
            compare_op: util::compare_op_to_vk(depth_state.back_stencil_compare_op),
            compare_mask: depth_state.stencil_read_mask as u32,
            write_mask: depth_state.stencil_write_mask as u32,
            reference: 0,
        };
        let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::builder()
            .depth_test_enable(depth_state.depth_test_enable)
            .depth_write_enable(depth_state.depth_write_enable)
            .depth_compare_op(util::compare_op_to_vk(depth_state.depth_compare_op))
            .stencil_test_enable(depth_state.stencil_test_enable)
            .front(front)
            .back(back);

        let mut blend_attachments = Vec::with_capacity(def.color_formats.len());
        for attachment_index in 0..def.color_formats.len() {
            let rt_state = if def.blend_state.independent_blend {
                &def.blend_state.render_target_blend_states[attachment_index]
            } else {
                &def.blend_state.render_target_blend_states[0]
            };
            blend_attachments.push(
                vk::PipelineColorBlendAttachmentState::builder()
                    .blend_enable(rt_state.blend_enable)
                    .src_color_blend_factor(util::blend_factor_to_vk(rt_state.src_factor))
                    .dst_color_blend_factor(util::blend_factor_to_vk(rt_state.dst_factor))
                    .color_blend_op(util::blend_op_to_vk(rt_state.blend_op))
                    .src_alpha_blend_factor(util::blend_factor_to_vk(rt_state.src_factor_alpha))
                    .dst_alpha_blend_factor(util::blend_factor_to_vk(rt_state.dst_factor_alpha))
                    .alpha_blend_op(util::blend_op_to_vk(rt_state.blend_op_alpha))
                    .color_write_mask(vk::ColorComponentFlags::from_raw(
                        rt_state.masks.bits() as u32
                    ))
                    .build(),
            );
        }

        let color_blend_state =
            vk::PipelineColorBlendStateCreateInfo::builder().attachments(&blend_attachments);

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::builder().dynamic_states(&dynamic_states);

        // No render pass objects, attachment formats go through dynamic rendering
        let color_formats: Vec<_> = def.color_formats.iter().map(|f| f.into_vk()).collect();
        let mut rendering_info = vk::PipelineRenderingCreateInfo::builder()
            .color_attachment_formats(&color_formats)
            .depth_attachment_format(
                def.depth_stencil_format
                    .filter(|f| f.has_depth())
                    .map(|f| f.into_vk())
                    .unwrap_or(vk::Format::UNDEFINED),
            )
            .stencil_attachment_format(
                def.depth_stencil_format
                    .filter(|f| f.has_stencil())
                    .map(|f| f.into_vk())
                    .unwrap_or(vk::Format::UNDEFINED),
            );

        let create_info = vk::GraphicsPipelineCreateInfo::builder()
            .stages(&stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .multisample_state(&multisample_state)
            .depth_stencil_state(&depth_stencil_state)
            .color_blend_state(&color_blend_state)
            .dynamic_state(&dynamic_state)
            .layout(vk_root_signature.vk_pipeline_layout())
            .push_next(&mut rendering_info);

        let pipeline = unsafe {
            device_context
                .inner
                .device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[create_info.build()], None)
                .map_err(|(_, e)| e)?[0]
        };

        Ok(KilnPipelineVulkan {
            inner: Arc::new(KilnPipelineVulkanInner {
                device_context: device_context.clone(),
                pipeline_type: KilnPipelineType::Graphics,
                root_signature,
                pipeline,
            }),
        })
    }

    pub(crate) fn new_compute_pipeline(
        device_context: &KilnDeviceContextVulkan,
        def: &KilnComputePsoDef,
    ) -> KilnResult<Self> {
        def.verify();

        let root_signature = def.root_signature.clone().unwrap();
        let vk_root_signature = root_signature
            .vk_root_signature()
            .ok_or("root signature was not created by this device context")?;
        let shader = vk_shader(def.compute_shader.as_ref().unwrap())?;

        let stage = vk::PipelineShaderStageCreateInfo::builder()
            .stage(vk::ShaderStageFlags::COMPUTE)
            .module(shader.vk_shader_module())
            .name(shader.entry_point_cstr())
            .build();

        let create_info = vk::ComputePipelineCreateInfo::builder()
            .stage(stage)
            .layout(vk_root_signature.vk_pipeline_layout());

        let pipeline = unsafe {
            device_context
                .inner
                .device
                .create_compute_pipelines(vk::PipelineCache::null(), &[create_info.build()], None)
                .map_err(|(_, e)| e)?[0]
        };

        Ok(KilnPipelineVulkan {
            inner: Arc::new(KilnPipelineVulkanInner {
                device_context: device_context.clone(),
                pipeline_type: KilnPipelineType::Compute,
                root_signature,
                pipeline,
            }),
        })
    }

    pub fn pipeline_type(&self) -> KilnPipelineType {
        self.inner.pipeline_type
    }

    pub fn root_signature(&self) -> &KilnRootSignature {
        &self.inner.root_signature
    }

    pub fn vk_pipeline(&self) -> vk::Pipeline {
        self.inner.pipeline
    }
}
