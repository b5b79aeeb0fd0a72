use crate::internal_shared;
use crate::KilnSamplerDef;
use std::sync::Arc;

#[derive(Debug)]
struct KilnSamplerNullInner {
    sampler_def: KilnSamplerDef,
    sampler_id: u64,
}

#[derive(Clone, Debug)]
pub struct KilnSamplerNull {
    inner: Arc<KilnSamplerNullInner>,
}

impl KilnSamplerNull {
    pub(crate) fn new(sampler_def: &KilnSamplerDef) -> Self {
        KilnSamplerNull {
            inner: Arc::new(KilnSamplerNullInner {
                sampler_def: sampler_def.clone(),
                sampler_id: internal_shared::allocate_view_id(),
            }),
        }
    }

    pub fn sampler_def(&self) -> &KilnSamplerDef {
        &self.inner.sampler_def
    }

    pub fn sampler_id(&self) -> u64 {
        self.inner.sampler_id
    }
}
