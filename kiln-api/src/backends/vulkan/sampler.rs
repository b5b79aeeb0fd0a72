use super::{util, KilnDeviceContextVulkan};
use crate::internal_shared;
use crate::{KilnCompareOp, KilnResult, KilnSamplerDef};
use ash::vk;
use std::sync::Arc;

#[derive(Debug)]
struct KilnSamplerVulkanInner {
    device_context: KilnDeviceContextVulkan,
    sampler_def: KilnSamplerDef,
    sampler: vk::Sampler,
    sampler_id: u64,
}

impl Drop for KilnSamplerVulkanInner {
    fn drop(&mut self) {
        unsafe {
            self.device_context
                .inner
                .device
                .destroy_sampler(self.sampler, None);
        }
    }
}

#[derive(Clone, Debug)]
pub struct KilnSamplerVulkan {
    inner: Arc<KilnSamplerVulkanInner>,
}

impl KilnSamplerVulkan {
    pub(crate) fn new(
        device_context: &KilnDeviceContextVulkan,
        sampler_def: &KilnSamplerDef,
    ) -> KilnResult<Self> {
        let sampler = Self::create_vk_sampler(&device_context.inner.device, sampler_def)?;

        Ok(KilnSamplerVulkan {
            inner: Arc::new(KilnSamplerVulkanInner {
                device_context: device_context.clone(),
                sampler_def: sampler_def.clone(),
                sampler,
                sampler_id: internal_shared::allocate_view_id(),
            }),
        })
    }

    pub(crate) fn create_vk_sampler(
        device: &ash::Device,
        sampler_def: &KilnSamplerDef,
    ) -> KilnResult<vk::Sampler> {
        let sampler_create_info = vk::SamplerCreateInfo::builder()
            .mag_filter(util::filter_to_vk(sampler_def.mag_filter))
            .min_filter(util::filter_to_vk(sampler_def.min_filter))
            .mipmap_mode(util::mip_map_mode_to_vk(sampler_def.mip_map_mode))
            .address_mode_u(util::address_mode_to_vk(sampler_def.address_mode_u))
            .address_mode_v(util::address_mode_to_vk(sampler_def.address_mode_v))
            .address_mode_w(util::address_mode_to_vk(sampler_def.address_mode_w))
            .mip_lod_bias(sampler_def.mip_lod_bias)
            .anisotropy_enable(sampler_def.max_anisotropy > 0.0)
            .max_anisotropy(sampler_def.max_anisotropy)
            .compare_enable(sampler_def.compare_op != KilnCompareOp::Never)
            .compare_op(util::compare_op_to_vk(sampler_def.compare_op))
            .min_lod(0.0)
            .max_lod(vk::LOD_CLAMP_NONE);

        let sampler = unsafe { device.create_sampler(&sampler_create_info, None)? };
        Ok(sampler)
    }

    pub fn sampler_def(&self) -> &KilnSamplerDef {
        &self.inner.sampler_def
    }

    pub fn sampler_id(&self) -> u64 {
        self.inner.sampler_id
    }

    pub fn vk_sampler(&self) -> vk::Sampler {
        self.inner.sampler
    }
}
