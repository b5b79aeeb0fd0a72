use super::{util, KilnDeviceContextVulkan, KilnRootSignatureVulkan};
use crate::resource_set::{DescriptorWrite, SlotResource};
use crate::{KilnDescriptorRangeType, KilnResourceState, KilnResult};
use ash::vk;

/// Owns one native descriptor set per covered root parameter and turns batched
/// descriptor writes into a single `vkUpdateDescriptorSets` call.
#[derive(Debug)]
pub struct KilnResourceSetVulkan {
    device_context: KilnDeviceContextVulkan,
    root_signature: KilnRootSignatureVulkan,
    first_param: u32,
    descriptor_sets: Vec<vk::DescriptorSet>,
}

impl Drop for KilnResourceSetVulkan {
    fn drop(&mut self) {
        let device = &self.device_context.inner.device;
        let pool = *self.device_context.inner.descriptor_pool.lock().unwrap();
        unsafe {
            // Pool was created with FREE_DESCRIPTOR_SET
            let _ = device.free_descriptor_sets(pool, &self.descriptor_sets);
        }
    }
}

impl KilnResourceSetVulkan {
    pub(crate) fn new(
        device_context: &KilnDeviceContextVulkan,
        root_signature: &KilnRootSignatureVulkan,
        first_param: u32,
        param_count: u32,
    ) -> KilnResult<Self> {
        let layouts: Vec<_> = (first_param..first_param + param_count)
            .map(|param_index| root_signature.vk_set_layout(param_index))
            .collect();

        let pool = *device_context.inner.descriptor_pool.lock().unwrap();
        let allocate_info = vk::DescriptorSetAllocateInfo::builder()
            .descriptor_pool(pool)
            .set_layouts(&layouts);

        let descriptor_sets = unsafe {
            device_context
                .inner
                .device
                .allocate_descriptor_sets(&allocate_info)?
        };

        Ok(KilnResourceSetVulkan {
            device_context: device_context.clone(),
            root_signature: root_signature.clone(),
            first_param,
            descriptor_sets,
        })
    }

    /// Native sets in parameter order, set index within the pipeline layout equals
    /// `first_param + i`
    pub fn vk_descriptor_sets(&self) -> &[vk::DescriptorSet] {
        &self.descriptor_sets
    }

    pub fn first_param(&self) -> u32 {
        self.first_param
    }

    pub(crate) fn flush(
        &mut self,
        writes: &[DescriptorWrite],
    ) -> KilnResult<()> {
        debug_assert!(!writes.is_empty());

        // Info structs must stay at stable addresses until the update call, so they are
        // sized up front and never reallocated
        let mut buffer_infos = Vec::with_capacity(writes.len());
        let mut image_infos = Vec::with_capacity(writes.len());
        let mut vk_writes = Vec::with_capacity(writes.len());

        for write in writes {
            let (binding, array_element) = self
                .root_signature
                .binding_location(write.param_index, write.array_index);
            let dst_set = self.descriptor_sets[(write.param_index - self.first_param) as usize];
            let parameter =
                &self.root_signature.binding_model().parameters[write.param_index as usize];
            let descriptor_type = util::range_type_to_vk(
                write.range_type,
                parameter.is_dynamic_constant_buffer(),
            );

            let mut vk_write = vk::WriteDescriptorSet::builder()
                .dst_set(dst_set)
                .dst_binding(binding)
                .dst_array_element(array_element)
                .descriptor_type(descriptor_type)
                .build();
            vk_write.descriptor_count = 1;

            match &write.resource {
                SlotResource::Buffer(buffer) => {
                    let buffer = buffer
                        .vk_buffer()
                        .ok_or("buffer was not created by this device context")?;
                    buffer_infos.push(vk::DescriptorBufferInfo {
                        buffer: buffer.vk_buffer(),
                        offset: 0,
                        range: vk::WHOLE_SIZE,
                    });
                    vk_write.p_buffer_info = &buffer_infos[buffer_infos.len() - 1];
                }
                SlotResource::Texture(texture) => {
                    let texture = texture
                        .vk_texture()
                        .ok_or("texture was not created by this device context")?;
                    let (view, layout) = match write.range_type {
                        KilnDescriptorRangeType::TextureUav => {
                            (texture.vk_uav_view(), vk::ImageLayout::GENERAL)
                        }
                        _ => (
                            texture.vk_srv_view(),
                            util::resource_state_to_image_layout(
                                KilnResourceState::SHADER_RESOURCE,
                            ),
                        ),
                    };
                    image_infos.push(vk::DescriptorImageInfo {
                        sampler: vk::Sampler::null(),
                        image_view: view,
                        image_layout: layout,
                    });
                    vk_write.p_image_info = &image_infos[image_infos.len() - 1];
                }
                SlotResource::Sampler(sampler) => {
                    let sampler = sampler
                        .vk_sampler()
                        .ok_or("sampler was not created by this device context")?;
                    image_infos.push(vk::DescriptorImageInfo {
                        sampler: sampler.vk_sampler(),
                        image_view: vk::ImageView::null(),
                        image_layout: vk::ImageLayout::UNDEFINED,
                    });
                    vk_write.p_image_info = &image_infos[image_infos.len() - 1];
                }
                SlotResource::None => unreachable!("dirty slot with nothing bound"),
            }

            vk_writes.push(vk_write);
        }

        log::trace!(
            "updating {} descriptors across {} sets in one call",
            vk_writes.len(),
            self.descriptor_sets.len()
        );

        unsafe {
            self.device_context
                .inner
                .device
                .update_descriptor_sets(&vk_writes, &[]);
        }
        Ok(())
    }
}
