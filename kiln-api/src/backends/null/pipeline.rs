use crate::{KilnPipelineType, KilnRootSignature};
use std::sync::Arc;

#[derive(Debug)]
struct KilnPipelineNullInner {
    pipeline_type: KilnPipelineType,
    root_signature: KilnRootSignature,
}

#[derive(Clone, Debug)]
pub struct KilnPipelineNull {
    inner: Arc<KilnPipelineNullInner>,
}

impl KilnPipelineNull {
    pub(crate) fn new(
        pipeline_type: KilnPipelineType,
        root_signature: KilnRootSignature,
    ) -> Self {
        KilnPipelineNull {
            inner: Arc::new(KilnPipelineNullInner {
                pipeline_type,
                root_signature,
            }),
        }
    }

    pub fn pipeline_type(&self) -> KilnPipelineType {
        self.inner.pipeline_type
    }

    pub fn root_signature(&self) -> &KilnRootSignature {
        &self.inner.root_signature
    }
}
