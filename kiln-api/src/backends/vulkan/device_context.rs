use super::{
    KilnBufferVulkan, KilnGraphicsContextVulkan, KilnPipelineVulkan, KilnResourceSetVulkan,
    KilnRootSignatureVulkan, KilnSamplerVulkan, KilnShaderModuleVulkan, KilnShaderVulkan,
    KilnTextureVulkan,
};
use crate::internal_shared::PipelineCache;
use crate::{
    KilnBufferDef, KilnComputePsoDef, KilnDeviceInfo, KilnGraphicsPsoDef, KilnMemoryUsage,
    KilnPipeline, KilnResult, KilnRootSignatureDef, KilnRootSignatureFlags, KilnSamplerDef,
    KilnShaderModuleDef, KilnShaderStageDef, KilnTextureDef,
};
use ash::vk;
use std::sync::{Arc, Mutex};

// Generous fixed-size pool, resource sets are expected to be long-lived
const DESCRIPTOR_POOL_MAX_SETS: u32 = 8192;
const DESCRIPTOR_POOL_SIZE_PER_TYPE: u32 = 8192;

pub(crate) struct KilnDeviceContextVulkanInner {
    pub(crate) device: ash::Device,
    pub(crate) memory_properties: vk::PhysicalDeviceMemoryProperties,
    pub(crate) queue_family_index: u32,
    pub(crate) descriptor_pool: Mutex<vk::DescriptorPool>,
    device_info: KilnDeviceInfo,
    graphics_pipelines: PipelineCache<KilnPipeline>,
    compute_pipelines: PipelineCache<KilnPipeline>,
}

impl Drop for KilnDeviceContextVulkanInner {
    fn drop(&mut self) {
        // The ash::Device itself is owned by the application
        unsafe {
            let pool = *self.descriptor_pool.lock().unwrap();
            self.device.destroy_descriptor_pool(pool, None);
        }
    }
}

/// Wraps an externally created vulkan device. The device must outlive this context and
/// everything created from it.
#[derive(Clone)]
pub struct KilnDeviceContextVulkan {
    pub(crate) inner: Arc<KilnDeviceContextVulkanInner>,
}

impl std::fmt::Debug for KilnDeviceContextVulkan {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("KilnDeviceContextVulkan")
            .field("queue_family_index", &self.inner.queue_family_index)
            .finish()
    }
}

impl KilnDeviceContextVulkan {
    pub fn new(
        device: ash::Device,
        memory_properties: vk::PhysicalDeviceMemoryProperties,
        queue_family_index: u32,
        device_info: KilnDeviceInfo,
    ) -> KilnResult<Self> {
        let pool_sizes = [
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::UNIFORM_BUFFER,
                descriptor_count: DESCRIPTOR_POOL_SIZE_PER_TYPE,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC,
                descriptor_count: DESCRIPTOR_POOL_SIZE_PER_TYPE,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::SAMPLED_IMAGE,
                descriptor_count: DESCRIPTOR_POOL_SIZE_PER_TYPE,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::STORAGE_IMAGE,
                descriptor_count: DESCRIPTOR_POOL_SIZE_PER_TYPE,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::STORAGE_BUFFER,
                descriptor_count: DESCRIPTOR_POOL_SIZE_PER_TYPE,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::SAMPLER,
                descriptor_count: DESCRIPTOR_POOL_SIZE_PER_TYPE,
            },
        ];

        let pool_create_info = vk::DescriptorPoolCreateInfo::builder()
            .flags(vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET)
            .max_sets(DESCRIPTOR_POOL_MAX_SETS)
            .pool_sizes(&pool_sizes);

        let descriptor_pool = unsafe { device.create_descriptor_pool(&pool_create_info, None)? };

        Ok(KilnDeviceContextVulkan {
            inner: Arc::new(KilnDeviceContextVulkanInner {
                device,
                memory_properties,
                queue_family_index,
                descriptor_pool: Mutex::new(descriptor_pool),
                device_info,
                graphics_pipelines: PipelineCache::new(),
                compute_pipelines: PipelineCache::new(),
            }),
        })
    }

    pub fn device(&self) -> &ash::Device {
        &self.inner.device
    }

    pub fn queue_family_index(&self) -> u32 {
        self.inner.queue_family_index
    }

    pub fn device_info(&self) -> &KilnDeviceInfo {
        &self.inner.device_info
    }

    /// Index of a memory type compatible with `requirements` and the requested usage
    pub(crate) fn find_memory_type_index(
        &self,
        requirements: &vk::MemoryRequirements,
        memory_usage: KilnMemoryUsage,
    ) -> KilnResult<u32> {
        let required_flags = match memory_usage {
            KilnMemoryUsage::GpuOnly => vk::MemoryPropertyFlags::DEVICE_LOCAL,
            KilnMemoryUsage::CpuToGpu => {
                vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT
            }
            KilnMemoryUsage::GpuToCpu => {
                vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_CACHED
            }
        };

        let properties = &self.inner.memory_properties;
        for index in 0..properties.memory_type_count {
            let type_supported = requirements.memory_type_bits & (1 << index) != 0;
            let flags_supported = properties.memory_types[index as usize]
                .property_flags
                .contains(required_flags);
            if type_supported && flags_supported {
                return Ok(index);
            }
        }

        Err(format!(
            "no compatible memory type for usage {:?}",
            memory_usage
        ))?
    }

    pub fn create_texture(
        &self,
        texture_def: &KilnTextureDef,
    ) -> KilnResult<KilnTextureVulkan> {
        KilnTextureVulkan::new(self, texture_def)
    }

    pub fn create_buffer(
        &self,
        buffer_def: &KilnBufferDef,
    ) -> KilnResult<KilnBufferVulkan> {
        KilnBufferVulkan::new(self, buffer_def)
    }

    pub fn create_sampler(
        &self,
        sampler_def: &KilnSamplerDef,
    ) -> KilnResult<KilnSamplerVulkan> {
        KilnSamplerVulkan::new(self, sampler_def)
    }

    pub fn create_shader_module(
        &self,
        shader_module_def: KilnShaderModuleDef,
    ) -> KilnResult<KilnShaderModuleVulkan> {
        KilnShaderModuleVulkan::new(self, shader_module_def)
    }

    pub fn create_shader(
        &self,
        stage_def: &KilnShaderStageDef,
    ) -> KilnResult<KilnShaderVulkan> {
        KilnShaderVulkan::new(stage_def)
    }

    pub fn create_root_signature(
        &self,
        root_signature_def: &KilnRootSignatureDef,
        name: &str,
        flags: KilnRootSignatureFlags,
    ) -> KilnResult<KilnRootSignatureVulkan> {
        KilnRootSignatureVulkan::new(self, root_signature_def, name, flags)
    }

    pub(crate) fn create_resource_set_storage(
        &self,
        root_signature: &KilnRootSignatureVulkan,
        first_param: u32,
        param_count: u32,
    ) -> KilnResult<KilnResourceSetVulkan> {
        KilnResourceSetVulkan::new(self, root_signature, first_param, param_count)
    }

    pub(crate) fn create_graphics_context_backend(&self) -> KilnResult<KilnGraphicsContextVulkan> {
        KilnGraphicsContextVulkan::new(self)
    }

    pub(crate) fn get_or_create_graphics_pipeline(
        &self,
        hash: u64,
        def: &KilnGraphicsPsoDef,
    ) -> KilnResult<KilnPipeline> {
        self.inner.graphics_pipelines.get_or_create(hash, || {
            Ok(KilnPipeline::Vk(KilnPipelineVulkan::new_graphics_pipeline(
                self, def,
            )?))
        })
    }

    pub(crate) fn get_or_create_compute_pipeline(
        &self,
        hash: u64,
        def: &KilnComputePsoDef,
    ) -> KilnResult<KilnPipeline> {
        self.inner.compute_pipelines.get_or_create(hash, || {
            Ok(KilnPipeline::Vk(KilnPipelineVulkan::new_compute_pipeline(
                self, def,
            )?))
        })
    }

    pub fn cached_pipeline_count(&self) -> usize {
        self.inner.graphics_pipelines.len() + self.inner.compute_pipelines.len()
    }

    pub fn destroy_all_pipelines(&self) {
        self.inner.graphics_pipelines.clear();
        self.inner.compute_pipelines.clear();
    }
}
