use super::{util, KilnDeviceContextVulkan, KilnSamplerVulkan};
use crate::root_signature::{allocate_signature_id, KilnBindingModel, KilnRootParameterKind};
use crate::{KilnResult, KilnRootSignatureDef, KilnRootSignatureFlags};
use ash::vk;
use std::sync::Arc;

#[derive(Debug)]
struct KilnRootSignatureVulkanInner {
    device_context: KilnDeviceContextVulkan,
    binding_model: KilnBindingModel,
    flags: KilnRootSignatureFlags,
    signature_id: u64,
    // One descriptor set layout per root parameter, set index == parameter index.
    // Static samplers live in one extra trailing layout as immutable samplers.
    set_layouts: Vec<vk::DescriptorSetLayout>,
    immutable_samplers: Vec<vk::Sampler>,
    pipeline_layout: vk::PipelineLayout,
}

impl Drop for KilnRootSignatureVulkanInner {
    fn drop(&mut self) {
        let device = &self.device_context.inner.device;
        unsafe {
            device.destroy_pipeline_layout(self.pipeline_layout, None);
            for layout in &self.set_layouts {
                device.destroy_descriptor_set_layout(*layout, None);
            }
            for sampler in &self.immutable_samplers {
                device.destroy_sampler(*sampler, None);
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct KilnRootSignatureVulkan {
    inner: Arc<KilnRootSignatureVulkanInner>,
}

impl KilnRootSignatureVulkan {
    pub(crate) fn new(
        device_context: &KilnDeviceContextVulkan,
        root_signature_def: &KilnRootSignatureDef,
        name: &str,
        flags: KilnRootSignatureFlags,
    ) -> KilnResult<Self> {
        let binding_model = root_signature_def.build_binding_model();
        let signature_id = allocate_signature_id();
        let device = &device_context.inner.device;

        let mut set_layouts = Vec::with_capacity(binding_model.parameters.len() + 1);
        for parameter in &binding_model.parameters {
            let stage_flags = util::shader_visibility_to_vk(parameter.visibility);
            let mut bindings = Vec::new();
            match &parameter.kind {
                KilnRootParameterKind::ConstantBuffer { dynamic, .. } => {
                    let descriptor_type = if *dynamic {
                        vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC
                    } else {
                        vk::DescriptorType::UNIFORM_BUFFER
                    };
                    bindings.push(
                        vk::DescriptorSetLayoutBinding::builder()
                            .binding(0)
                            .descriptor_type(descriptor_type)
                            .descriptor_count(1)
                            .stage_flags(stage_flags)
                            .build(),
                    );
                }
                KilnRootParameterKind::DescriptorTable { ranges } => {
                    for (range_index, range) in ranges.iter().enumerate() {
                        bindings.push(
                            vk::DescriptorSetLayoutBinding::builder()
                                .binding(range_index as u32)
                                .descriptor_type(util::range_type_to_vk(range.range_type, false))
                                .descriptor_count(range.descriptor_count)
                                .stage_flags(stage_flags)
                                .build(),
                        );
                    }
                }
            }

            let layout_create_info =
                vk::DescriptorSetLayoutCreateInfo::builder().bindings(&bindings);
            let layout = unsafe { device.create_descriptor_set_layout(&layout_create_info, None) };
            match layout {
                Ok(layout) => set_layouts.push(layout),
                Err(e) => {
                    Self::destroy_layouts(device, &set_layouts, &[]);
                    return Err(e)?;
                }
            }
        }

        let mut immutable_samplers = Vec::new();
        if !binding_model.static_samplers.is_empty() {
            for static_sampler in &binding_model.static_samplers {
                match KilnSamplerVulkan::create_vk_sampler(device, &static_sampler.sampler_def) {
                    Ok(sampler) => immutable_samplers.push(sampler),
                    Err(e) => {
                        Self::destroy_layouts(device, &set_layouts, &immutable_samplers);
                        return Err(e);
                    }
                }
            }

            let mut bindings = Vec::new();
            for (sampler_index, static_sampler) in binding_model.static_samplers.iter().enumerate()
            {
                bindings.push(
                    vk::DescriptorSetLayoutBinding::builder()
                        .binding(sampler_index as u32)
                        .descriptor_type(vk::DescriptorType::SAMPLER)
                        .descriptor_count(1)
                        .stage_flags(util::shader_visibility_to_vk(static_sampler.visibility))
                        .immutable_samplers(std::slice::from_ref(
                            &immutable_samplers[sampler_index],
                        ))
                        .build(),
                );
            }

            let layout_create_info =
                vk::DescriptorSetLayoutCreateInfo::builder().bindings(&bindings);
            let layout = unsafe { device.create_descriptor_set_layout(&layout_create_info, None) };
            match layout {
                Ok(layout) => set_layouts.push(layout),
                Err(e) => {
                    Self::destroy_layouts(device, &set_layouts, &immutable_samplers);
                    return Err(e)?;
                }
            }
        }

        let pipeline_layout_create_info =
            vk::PipelineLayoutCreateInfo::builder().set_layouts(&set_layouts);
        let pipeline_layout =
            match unsafe { device.create_pipeline_layout(&pipeline_layout_create_info, None) } {
                Ok(pipeline_layout) => pipeline_layout,
                Err(e) => {
                    Self::destroy_layouts(device, &set_layouts, &immutable_samplers);
                    return Err(e)?;
                }
            };

        log::trace!(
            "created root signature {:?} (id {}) with {} parameters and {} static samplers",
            name,
            signature_id,
            binding_model.parameters.len(),
            binding_model.static_samplers.len()
        );

        Ok(KilnRootSignatureVulkan {
            inner: Arc::new(KilnRootSignatureVulkanInner {
                device_context: device_context.clone(),
                binding_model,
                flags,
                signature_id,
                set_layouts,
                immutable_samplers,
                pipeline_layout,
            }),
        })
    }

    fn destroy_layouts(
        device: &ash::Device,
        layouts: &[vk::DescriptorSetLayout],
        samplers: &[vk::Sampler],
    ) {
        unsafe {
            for layout in layouts {
                device.destroy_descriptor_set_layout(*layout, None);
            }
            for sampler in samplers {
                device.destroy_sampler(*sampler, None);
            }
        }
    }

    pub(crate) fn binding_model(&self) -> &KilnBindingModel {
        &self.inner.binding_model
    }

    pub fn flags(&self) -> KilnRootSignatureFlags {
        self.inner.flags
    }

    pub fn signature_id(&self) -> u64 {
        self.inner.signature_id
    }

    pub fn vk_pipeline_layout(&self) -> vk::PipelineLayout {
        self.inner.pipeline_layout
    }

    /// Layout for one root parameter, set index equals parameter index
    pub fn vk_set_layout(
        &self,
        param_index: u32,
    ) -> vk::DescriptorSetLayout {
        self.inner.set_layouts[param_index as usize]
    }

    /// The (binding, array element) a flat descriptor index within a parameter maps to
    pub(crate) fn binding_location(
        &self,
        param_index: u32,
        array_index: u32,
    ) -> (u32, u32) {
        match &self.inner.binding_model.parameters[param_index as usize].kind {
            KilnRootParameterKind::ConstantBuffer { .. } => (0, 0),
            KilnRootParameterKind::DescriptorTable { ranges } => {
                let mut remaining = array_index;
                for (range_index, range) in ranges.iter().enumerate() {
                    if remaining < range.descriptor_count {
                        return (range_index as u32, remaining);
                    }
                    remaining -= range.descriptor_count;
                }
                unreachable!("descriptor index out of range")
            }
        }
    }
}
