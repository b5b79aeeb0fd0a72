#[cfg(feature = "kiln-dx12")]
use crate::dx12::KilnSamplerDx12;
use crate::null::KilnSamplerNull;
#[cfg(feature = "kiln-vulkan")]
use crate::vulkan::KilnSamplerVulkan;
use crate::KilnSamplerDef;

#[derive(Clone, Debug)]
pub enum KilnSampler {
    Null(KilnSamplerNull),
    #[cfg(feature = "kiln-vulkan")]
    Vk(KilnSamplerVulkan),
    #[cfg(feature = "kiln-dx12")]
    Dx12(KilnSamplerDx12),
}

impl KilnSampler {
    pub fn sampler_def(&self) -> &KilnSamplerDef {
        match self {
            KilnSampler::Null(inner) => inner.sampler_def(),
            #[cfg(feature = "kiln-vulkan")]
            KilnSampler::Vk(inner) => inner.sampler_def(),
            #[cfg(feature = "kiln-dx12")]
            KilnSampler::Dx12(inner) => inner.sampler_def(),
        }
    }

    pub fn sampler_id(&self) -> u64 {
        match self {
            KilnSampler::Null(inner) => inner.sampler_id(),
            #[cfg(feature = "kiln-vulkan")]
            KilnSampler::Vk(inner) => inner.sampler_id(),
            #[cfg(feature = "kiln-dx12")]
            KilnSampler::Dx12(inner) => inner.sampler_id(),
        }
    }

    pub fn null_sampler(&self) -> Option<&KilnSamplerNull> {
        match self {
            KilnSampler::Null(inner) => Some(inner),
            #[cfg(any(feature = "kiln-vulkan", feature = "kiln-dx12"))]
            _ => None,
        }
    }

    #[cfg(feature = "kiln-vulkan")]
    pub fn vk_sampler(&self) -> Option<&KilnSamplerVulkan> {
        match self {
            KilnSampler::Vk(inner) => Some(inner),
            _ => None,
        }
    }

    #[cfg(feature = "kiln-dx12")]
    pub fn dx12_sampler(&self) -> Option<&KilnSamplerDx12> {
        match self {
            KilnSampler::Dx12(inner) => Some(inner),
            _ => None,
        }
    }
}
