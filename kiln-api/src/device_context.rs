#[cfg(feature = "kiln-dx12")]
use crate::dx12::KilnDeviceContextDx12;
use crate::null::KilnDeviceContextNull;
#[cfg(feature = "kiln-vulkan")]
use crate::vulkan::KilnDeviceContextVulkan;
use crate::{
    KilnBuffer, KilnBufferDef, KilnComputePsoDef, KilnDeviceInfo, KilnGraphicsContext,
    KilnGraphicsPsoDef, KilnPipeline, KilnResult, KilnRootSignature, KilnRootSignatureDef,
    KilnRootSignatureFlags, KilnSampler, KilnSamplerDef, KilnShader, KilnShaderModule,
    KilnShaderModuleDef, KilnShaderStageDef, KilnTexture, KilnTextureDef,
};

/// The device-scoped entry point of the API. Wraps a native device created elsewhere
/// (or nothing at all for the null backend), owns the pipeline caches, and creates
/// every other object. Cheap to clone and shareable across threads.
#[derive(Clone, Debug)]
pub enum KilnDeviceContext {
    Null(KilnDeviceContextNull),
    #[cfg(feature = "kiln-vulkan")]
    Vk(KilnDeviceContextVulkan),
    #[cfg(feature = "kiln-dx12")]
    Dx12(KilnDeviceContextDx12),
}

impl KilnDeviceContext {
    /// A device context backed by no GPU at all. Tracks all binding and state behavior,
    /// performs no native work.
    pub fn new_null() -> Self {
        KilnDeviceContext::Null(KilnDeviceContextNull::new())
    }

    pub fn device_info(&self) -> &KilnDeviceInfo {
        match self {
            KilnDeviceContext::Null(inner) => inner.device_info(),
            #[cfg(feature = "kiln-vulkan")]
            KilnDeviceContext::Vk(inner) => inner.device_info(),
            #[cfg(feature = "kiln-dx12")]
            KilnDeviceContext::Dx12(inner) => inner.device_info(),
        }
    }

    pub fn create_texture(
        &self,
        texture_def: &KilnTextureDef,
    ) -> KilnResult<KilnTexture> {
        Ok(match self {
            KilnDeviceContext::Null(inner) => KilnTexture::Null(inner.create_texture(texture_def)?),
            #[cfg(feature = "kiln-vulkan")]
            KilnDeviceContext::Vk(inner) => KilnTexture::Vk(inner.create_texture(texture_def)?),
            #[cfg(feature = "kiln-dx12")]
            KilnDeviceContext::Dx12(inner) => KilnTexture::Dx12(inner.create_texture(texture_def)?),
        })
    }

    pub fn create_buffer(
        &self,
        buffer_def: &KilnBufferDef,
    ) -> KilnResult<KilnBuffer> {
        Ok(match self {
            KilnDeviceContext::Null(inner) => KilnBuffer::Null(inner.create_buffer(buffer_def)?),
            #[cfg(feature = "kiln-vulkan")]
            KilnDeviceContext::Vk(inner) => KilnBuffer::Vk(inner.create_buffer(buffer_def)?),
            #[cfg(feature = "kiln-dx12")]
            KilnDeviceContext::Dx12(inner) => KilnBuffer::Dx12(inner.create_buffer(buffer_def)?),
        })
    }

    pub fn create_sampler(
        &self,
        sampler_def: &KilnSamplerDef,
    ) -> KilnResult<KilnSampler> {
        Ok(match self {
            KilnDeviceContext::Null(inner) => KilnSampler::Null(inner.create_sampler(sampler_def)?),
            #[cfg(feature = "kiln-vulkan")]
            KilnDeviceContext::Vk(inner) => KilnSampler::Vk(inner.create_sampler(sampler_def)?),
            #[cfg(feature = "kiln-dx12")]
            KilnDeviceContext::Dx12(inner) => KilnSampler::Dx12(inner.create_sampler(sampler_def)?),
        })
    }

    pub fn create_shader_module(
        &self,
        shader_module_def: KilnShaderModuleDef,
    ) -> KilnResult<KilnShaderModule> {
        Ok(match self {
            KilnDeviceContext::Null(inner) => {
                KilnShaderModule::Null(inner.create_shader_module(shader_module_def)?)
            }
            #[cfg(feature = "kiln-vulkan")]
            KilnDeviceContext::Vk(inner) => {
                KilnShaderModule::Vk(inner.create_shader_module(shader_module_def)?)
            }
            #[cfg(feature = "kiln-dx12")]
            KilnDeviceContext::Dx12(inner) => {
                KilnShaderModule::Dx12(inner.create_shader_module(shader_module_def)?)
            }
        })
    }

    pub fn create_shader(
        &self,
        stage_def: &KilnShaderStageDef,
    ) -> KilnResult<KilnShader> {
        Ok(match self {
            KilnDeviceContext::Null(inner) => KilnShader::Null(inner.create_shader(stage_def)?),
            #[cfg(feature = "kiln-vulkan")]
            KilnDeviceContext::Vk(inner) => KilnShader::Vk(inner.create_shader(stage_def)?),
            #[cfg(feature = "kiln-dx12")]
            KilnDeviceContext::Dx12(inner) => KilnShader::Dx12(inner.create_shader(stage_def)?),
        })
    }

    /// Finalizes a root signature def into an immutable layout. Panics if the def has
    /// unconfigured parameters, ranges, or static samplers.
    pub fn create_root_signature(
        &self,
        root_signature_def: &KilnRootSignatureDef,
        name: &str,
        flags: KilnRootSignatureFlags,
    ) -> KilnResult<KilnRootSignature> {
        Ok(match self {
            KilnDeviceContext::Null(inner) => {
                KilnRootSignature::Null(inner.create_root_signature(root_signature_def, name, flags)?)
            }
            #[cfg(feature = "kiln-vulkan")]
            KilnDeviceContext::Vk(inner) => {
                KilnRootSignature::Vk(inner.create_root_signature(root_signature_def, name, flags)?)
            }
            #[cfg(feature = "kiln-dx12")]
            KilnDeviceContext::Dx12(inner) => KilnRootSignature::Dx12(
                inner.create_root_signature(root_signature_def, name, flags)?,
            ),
        })
    }

    pub fn create_graphics_context(&self) -> KilnResult<KilnGraphicsContext> {
        KilnGraphicsContext::new(self)
    }

    pub(crate) fn get_or_create_graphics_pipeline(
        &self,
        hash: u64,
        def: &KilnGraphicsPsoDef,
    ) -> KilnResult<KilnPipeline> {
        match self {
            KilnDeviceContext::Null(inner) => inner.get_or_create_graphics_pipeline(hash, def),
            #[cfg(feature = "kiln-vulkan")]
            KilnDeviceContext::Vk(inner) => inner.get_or_create_graphics_pipeline(hash, def),
            #[cfg(feature = "kiln-dx12")]
            KilnDeviceContext::Dx12(inner) => inner.get_or_create_graphics_pipeline(hash, def),
        }
    }

    pub(crate) fn get_or_create_compute_pipeline(
        &self,
        hash: u64,
        def: &KilnComputePsoDef,
    ) -> KilnResult<KilnPipeline> {
        match self {
            KilnDeviceContext::Null(inner) => inner.get_or_create_compute_pipeline(hash, def),
            #[cfg(feature = "kiln-vulkan")]
            KilnDeviceContext::Vk(inner) => inner.get_or_create_compute_pipeline(hash, def),
            #[cfg(feature = "kiln-dx12")]
            KilnDeviceContext::Dx12(inner) => inner.get_or_create_compute_pipeline(hash, def),
        }
    }

    /// Number of distinct native pipelines currently cached on this device
    pub fn cached_pipeline_count(&self) -> usize {
        match self {
            KilnDeviceContext::Null(inner) => inner.cached_pipeline_count(),
            #[cfg(feature = "kiln-vulkan")]
            KilnDeviceContext::Vk(inner) => inner.cached_pipeline_count(),
            #[cfg(feature = "kiln-dx12")]
            KilnDeviceContext::Dx12(inner) => inner.cached_pipeline_count(),
        }
    }

    /// Drops every cached pipeline. Call during device teardown, after all submitted
    /// work has completed.
    pub fn destroy_all_pipelines(&self) {
        match self {
            KilnDeviceContext::Null(inner) => inner.destroy_all_pipelines(),
            #[cfg(feature = "kiln-vulkan")]
            KilnDeviceContext::Vk(inner) => inner.destroy_all_pipelines(),
            #[cfg(feature = "kiln-dx12")]
            KilnDeviceContext::Dx12(inner) => inner.destroy_all_pipelines(),
        }
    }

    pub fn null_device_context(&self) -> Option<&KilnDeviceContextNull> {
        match self {
            KilnDeviceContext::Null(inner) => Some(inner),
            #[cfg(any(feature = "kiln-vulkan", feature = "kiln-dx12"))]
            _ => None,
        }
    }

    #[cfg(feature = "kiln-vulkan")]
    pub fn vk_device_context(&self) -> Option<&KilnDeviceContextVulkan> {
        match self {
            KilnDeviceContext::Vk(inner) => Some(inner),
            _ => None,
        }
    }

    #[cfg(feature = "kiln-dx12")]
    pub fn dx12_device_context(&self) -> Option<&KilnDeviceContextDx12> {
        match self {
            KilnDeviceContext::Dx12(inner) => Some(inner),
            _ => None,
        }
    }
}
