use crate::{KilnResult, KilnShaderStageFlags, KilnShaderStageDef};
use fnv::FnvHasher;
use std::hash::Hasher;
use std::sync::Arc;

#[derive(Debug)]
struct KilnShaderModuleNullInner {
    content_hash: u64,
    byte_count: usize,
}

/// Holds no binary, just the identity of one. Content hash stands in for the compiled
/// code when keying pipeline caches.
#[derive(Clone, Debug)]
pub struct KilnShaderModuleNull {
    inner: Arc<KilnShaderModuleNullInner>,
}

impl KilnShaderModuleNull {
    pub(crate) fn new(bytes: &[u8]) -> Self {
        let mut hasher = FnvHasher::default();
        hasher.write(bytes);

        KilnShaderModuleNull {
            inner: Arc::new(KilnShaderModuleNullInner {
                content_hash: hasher.finish(),
                byte_count: bytes.len(),
            }),
        }
    }

    pub fn content_hash(&self) -> u64 {
        self.inner.content_hash
    }

    pub fn byte_count(&self) -> usize {
        self.inner.byte_count
    }
}

#[derive(Debug)]
struct KilnShaderNullInner {
    stage: KilnShaderStageFlags,
    entry_point: String,
    shader_hash: u64,
}

#[derive(Clone, Debug)]
pub struct KilnShaderNull {
    inner: Arc<KilnShaderNullInner>,
}

impl KilnShaderNull {
    pub(crate) fn new(stage_def: &KilnShaderStageDef) -> KilnResult<Self> {
        let module = stage_def
            .shader_module
            .null_shader_module()
            .ok_or("shader module was not created by this device context")?;

        let mut hasher = FnvHasher::default();
        hasher.write_u64(module.content_hash());
        hasher.write(stage_def.entry_point.as_bytes());
        hasher.write_u32(stage_def.stage.bits());

        Ok(KilnShaderNull {
            inner: Arc::new(KilnShaderNullInner {
                stage: stage_def.stage,
                entry_point: stage_def.entry_point.clone(),
                shader_hash: hasher.finish(),
            }),
        })
    }

    pub fn stage(&self) -> KilnShaderStageFlags {
        self.inner.stage
    }

    pub fn entry_point(&self) -> &str {
        &self.inner.entry_point
    }

    pub fn shader_hash(&self) -> u64 {
        self.inner.shader_hash
    }
}
