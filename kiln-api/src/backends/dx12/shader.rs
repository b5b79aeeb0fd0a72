use crate::{KilnResult, KilnShaderModuleDef, KilnShaderStageDef, KilnShaderStageFlags};
use fnv::FnvHasher;
use std::hash::Hasher;
use std::sync::Arc;

#[derive(Debug)]
struct KilnShaderModuleDx12Inner {
    // DXIL is handed to pipeline creation by pointer, the bytes are kept alive here
    bytes: Vec<u8>,
    content_hash: u64,
}

#[derive(Clone, Debug)]
pub struct KilnShaderModuleDx12 {
    inner: Arc<KilnShaderModuleDx12Inner>,
}

impl KilnShaderModuleDx12 {
    pub(crate) fn new(shader_module_def: KilnShaderModuleDef) -> KilnResult<Self> {
        let bytes = match shader_module_def {
            KilnShaderModuleDef::DxilBytes(bytes) => bytes,
            KilnShaderModuleDef::SpvBytes(_) => {
                Err("the d3d12 backend requires DXIL shader modules")?
            }
        };

        let mut hasher = FnvHasher::default();
        hasher.write(bytes);

        Ok(KilnShaderModuleDx12 {
            inner: Arc::new(KilnShaderModuleDx12Inner {
                bytes: bytes.to_vec(),
                content_hash: hasher.finish(),
            }),
        })
    }

    pub fn content_hash(&self) -> u64 {
        self.inner.content_hash
    }

    pub fn bytes(&self) -> &[u8] {
        &self.inner.bytes
    }
}

#[derive(Debug)]
struct KilnShaderDx12Inner {
    shader_module: KilnShaderModuleDx12,
    stage: KilnShaderStageFlags,
    entry_point: String,
    shader_hash: u64,
}

#[derive(Clone, Debug)]
pub struct KilnShaderDx12 {
    inner: Arc<KilnShaderDx12Inner>,
}

impl KilnShaderDx12 {
    pub(crate) fn new(stage_def: &KilnShaderStageDef) -> KilnResult<Self> {
        let module = stage_def
            .shader_module
            .dx12_shader_module()
            .ok_or("shader module was not created by this device context")?
            .clone();

        let mut hasher = FnvHasher::default();
        hasher.write_u64(module.content_hash());
        hasher.write(stage_def.entry_point.as_bytes());
        hasher.write_u32(stage_def.stage.bits());

        Ok(KilnShaderDx12 {
            inner: Arc::new(KilnShaderDx12Inner {
                shader_module: module,
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

    pub fn bytecode(&self) -> &[u8] {
        self.inner.shader_module.bytes()
    }
}
