use super::util;
use crate::internal_shared;
use crate::{KilnResult, KilnSamplerDef};
use std::sync::Arc;
use windows::Win32::Graphics::Direct3D12::D3D12_SAMPLER_DESC;

#[derive(Debug)]
struct KilnSamplerDx12Inner {
    sampler_def: KilnSamplerDef,
    sampler_id: u64,
}

/// Holds no native object. D3D12 samplers only exist as descriptors, the resource set
/// creates one from the cached desc when the sampler is bound.
#[derive(Clone, Debug)]
pub struct KilnSamplerDx12 {
    inner: Arc<KilnSamplerDx12Inner>,
}

impl KilnSamplerDx12 {
    pub(crate) fn new(sampler_def: &KilnSamplerDef) -> KilnResult<Self> {
        Ok(KilnSamplerDx12 {
            inner: Arc::new(KilnSamplerDx12Inner {
                sampler_def: sampler_def.clone(),
                sampler_id: internal_shared::allocate_view_id(),
            }),
        })
    }

    pub fn sampler_def(&self) -> &KilnSamplerDef {
        &self.inner.sampler_def
    }

    pub fn sampler_id(&self) -> u64 {
        self.inner.sampler_id
    }

    pub(crate) fn dx12_desc(&self) -> D3D12_SAMPLER_DESC {
        util::sampler_desc_to_dx12(&self.inner.sampler_def)
    }
}
