use super::KilnDeviceContextVulkan;
use crate::{KilnResult, KilnShaderModuleDef, KilnShaderStageDef, KilnShaderStageFlags};
use ash::vk;
use fnv::FnvHasher;
use std::hash::Hasher;
use std::sync::Arc;

#[derive(Debug)]
struct KilnShaderModuleVulkanInner {
    device_context: KilnDeviceContextVulkan,
    shader_module: vk::ShaderModule,
    content_hash: u64,
}

impl Drop for KilnShaderModuleVulkanInner {
    fn drop(&mut self) {
        unsafe {
            self.device_context
                .inner
                .device
                .destroy_shader_module(self.shader_module, None);
        }
    }
}

#[derive(Clone, Debug)]
pub struct KilnShaderModuleVulkan {
    inner: Arc<KilnShaderModuleVulkanInner>,
}

impl KilnShaderModuleVulkan {
    pub(crate) fn new(
        device_context: &KilnDeviceContextVulkan,
        shader_module_def: KilnShaderModuleDef,
    ) -> KilnResult<Self> {
        let bytes = match shader_module_def {
            KilnShaderModuleDef::SpvBytes(bytes) => bytes,
            KilnShaderModuleDef::DxilBytes(_) => {
                Err("the vulkan backend requires SPIR-V shader modules")?
            }
        };

        let mut cursor = std::io::Cursor::new(bytes);
        let code = ash::util::read_spv(&mut cursor)?;
        let create_info = vk::ShaderModuleCreateInfo::builder().code(&code);
        let shader_module = unsafe {
            device_context
                .inner
                .device
                .create_shader_module(&create_info, None)?
        };

        let mut hasher = FnvHasher::default();
        hasher.write(bytes);

        Ok(KilnShaderModuleVulkan {
            inner: Arc::new(KilnShaderModuleVulkanInner {
                device_context: device_context.clone(),
                shader_module,
                content_hash: hasher.finish(),
            }),
        })
    }

    pub fn content_hash(&self) -> u64 {
        self.inner.content_hash
    }

    pub fn vk_shader_module(&self) -> vk::ShaderModule {
        self.inner.shader_module
    }
}

#[derive(Debug)]
struct KilnShaderVulkanInner {
    shader_module: KilnShaderModuleVulkan,
    stage: KilnShaderStageFlags,
    entry_point: std::ffi::CString,
    shader_hash: u64,
}

#[derive(Clone, Debug)]
pub struct KilnShaderVulkan {
    inner: Arc<KilnShaderVulkanInner>,
}

impl KilnShaderVulkan {
    pub(crate) fn new(stage_def: &KilnShaderStageDef) -> KilnResult<Self> {
        let module = stage_def
            .shader_module
            .vk_shader_module()
            .ok_or("shader module was not created by this device context")?
            .clone();

        let mut hasher = FnvHasher::default();
        hasher.write_u64(module.content_hash());
        hasher.write(stage_def.entry_point.as_bytes());
        hasher.write_u32(stage_def.stage.bits());
        let shader_hash = hasher.finish();

        let entry_point = std::ffi::CString::new(stage_def.entry_point.as_str())
            .map_err(|_| crate::KilnError::from("shader entry point contains a NUL byte"))?;

        Ok(KilnShaderVulkan {
            inner: Arc::new(KilnShaderVulkanInner {
                shader_module: module,
                stage: stage_def.stage,
                entry_point,
                shader_hash,
            }),
        })
    }

    pub fn stage(&self) -> KilnShaderStageFlags {
        self.inner.stage
    }

    pub fn entry_point(&self) -> &str {
        self.inner
            .entry_point
            .to_str()
            .unwrap_or("main")
    }

    pub(crate) fn entry_point_cstr(&self) -> &std::ffi::CStr {
        &self.inner.entry_point
    }

    pub fn shader_hash(&self) -> u64 {
        self.inner.shader_hash
    }

    pub fn vk_shader_module(&self) -> vk::ShaderModule {
        self.inner.shader_module.vk_shader_module()
    }
}
