use crate::internal_shared::TextureCommon;
use crate::KilnTextureDef;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct KilnTextureNull {
    inner: Arc<TextureCommon>,
}

impl KilnTextureNull {
    pub(crate) fn new(texture_def: &KilnTextureDef) -> Self {
        KilnTextureNull {
            inner: Arc::new(TextureCommon::new(texture_def)),
        }
    }

    pub(crate) fn common(&self) -> &TextureCommon {
        &self.inner
    }
}
