#[cfg(feature = "kiln-dx12")]
use crate::dx12::{KilnShaderDx12, KilnShaderModuleDx12};
use crate::null::{KilnShaderModuleNull, KilnShaderNull};
#[cfg(feature = "kiln-vulkan")]
use crate::vulkan::{KilnShaderModuleVulkan, KilnShaderVulkan};
use crate::KilnShaderStageFlags;

/// A compiled shader binary uploaded to the device
#[derive(Clone, Debug)]
pub enum KilnShaderModule {
    Null(KilnShaderModuleNull),
    #[cfg(feature = "kiln-vulkan")]
    Vk(KilnShaderModuleVulkan),
    #[cfg(feature = "kiln-dx12")]
    Dx12(KilnShaderModuleDx12),
}

impl KilnShaderModule {
    /// Hash of the compiled bytes, stands in for reflection data when keying pipeline
    /// caches
    pub fn content_hash(&self) -> u64 {
        match self {
            KilnShaderModule::Null(inner) => inner.content_hash(),
            #[cfg(feature = "kiln-vulkan")]
            KilnShaderModule::Vk(inner) => inner.content_hash(),
            #[cfg(feature = "kiln-dx12")]
            KilnShaderModule::Dx12(inner) => inner.content_hash(),
        }
    }

    pub fn null_shader_module(&self) -> Option<&KilnShaderModuleNull> {
        match self {
            KilnShaderModule::Null(inner) => Some(inner),
            #[cfg(any(feature = "kiln-vulkan", feature = "kiln-dx12"))]
            _ => None,
        }
    }

    #[cfg(feature = "kiln-vulkan")]
    pub fn vk_shader_module(&self) -> Option<&KilnShaderModuleVulkan> {
        match self {
            KilnShaderModule::Vk(inner) => Some(inner),
            _ => None,
        }
    }

    #[cfg(feature = "kiln-dx12")]
    pub fn dx12_shader_module(&self) -> Option<&KilnShaderModuleDx12> {
        match self {
            KilnShaderModule::Dx12(inner) => Some(inner),
            _ => None,
        }
    }
}

/// A single shader stage ready to attach to a pipeline: a module plus entry point and
/// stage flag
#[derive(Clone, Debug)]
pub enum KilnShader {
    Null(KilnShaderNull),
    #[cfg(feature = "kiln-vulkan")]
    Vk(KilnShaderVulkan),
    #[cfg(feature = "kiln-dx12")]
    Dx12(KilnShaderDx12),
}

impl KilnShader {
    pub fn stage(&self) -> KilnShaderStageFlags {
        match self {
            KilnShader::Null(inner) => inner.stage(),
            #[cfg(feature = "kiln-vulkan")]
            KilnShader::Vk(inner) => inner.stage(),
            #[cfg(feature = "kiln-dx12")]
            KilnShader::Dx12(inner) => inner.stage(),
        }
    }

    pub fn entry_point(&self) -> &str {
        match self {
            KilnShader::Null(inner) => inner.entry_point(),
            #[cfg(feature = "kiln-vulkan")]
            KilnShader::Vk(inner) => inner.entry_point(),
            #[cfg(feature = "kiln-dx12")]
            KilnShader::Dx12(inner) => inner.entry_point(),
        }
    }

    /// Combined hash of module contents, entry point, and stage. Used when hashing
    /// pipeline state blobs.
    pub fn shader_hash(&self) -> u64 {
        match self {
            KilnShader::Null(inner) => inner.shader_hash(),
            #[cfg(feature = "kiln-vulkan")]
            KilnShader::Vk(inner) => inner.shader_hash(),
            #[cfg(feature = "kiln-dx12")]
            KilnShader::Dx12(inner) => inner.shader_hash(),
        }
    }

    pub fn null_shader(&self) -> Option<&KilnShaderNull> {
        match self {
            KilnShader::Null(inner) => Some(inner),
            #[cfg(any(feature = "kiln-vulkan", feature = "kiln-dx12"))]
            _ => None,
        }
    }

    #[cfg(feature = "kiln-vulkan")]
    pub fn vk_shader(&self) -> Option<&KilnShaderVulkan> {
        match self {
            KilnShader::Vk(inner) => Some(inner),
            _ => None,
        }
    }

    #[cfg(feature = "kiln-dx12")]
    pub fn dx12_shader(&self) -> Option<&KilnShaderDx12> {
        match self {
            KilnShader::Dx12(inner) => Some(inner),
            _ => None,
        }
    }
}
