use crate::internal_shared::BufferCommon;
use crate::KilnBufferDef;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct KilnBufferNull {
    inner: Arc<BufferCommon>,
}

impl KilnBufferNull {
    pub(crate) fn new(buffer_def: &KilnBufferDef) -> Self {
        KilnBufferNull {
            inner: Arc::new(BufferCommon::new(buffer_def)),
        }
    }

    pub(crate) fn common(&self) -> &BufferCommon {
        &self.inner
    }
}
