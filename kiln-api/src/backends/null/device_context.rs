use super::{
    KilnBufferNull, KilnGraphicsContextNull, KilnPipelineNull, KilnResourceSetNull,
    KilnRootSignatureNull, KilnSamplerNull, KilnShaderModuleNull, KilnShaderNull, KilnTextureNull,
};
use crate::internal_shared::PipelineCache;
use crate::{
    KilnBufferDef, KilnComputePsoDef, KilnDeviceInfo, KilnGraphicsPsoDef, KilnPipeline,
    KilnPipelineType, KilnResult, KilnRootSignatureDef, KilnRootSignatureFlags, KilnSamplerDef,
    KilnShaderModuleDef, KilnShaderStageDef, KilnTextureDef,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub(crate) struct KilnDeviceContextNullInner {
    device_info: KilnDeviceInfo,
    graphics_pipelines: PipelineCache<KilnPipeline>,
    compute_pipelines: PipelineCache<KilnPipeline>,

    // Counts of the native calls this backend would have made, observable by tests
    descriptor_batch_count: AtomicU64,
    descriptor_write_count: AtomicU64,
    last_batch_write_count: AtomicU64,
    barrier_batch_count: AtomicU64,
    barrier_count: AtomicU64,
    pipelines_created: AtomicU64,
}

#[derive(Clone)]
pub struct KilnDeviceContextNull {
    pub(crate) inner: Arc<KilnDeviceContextNullInner>,
}

impl std::fmt::Debug for KilnDeviceContextNull {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("KilnDeviceContextNull")
            .field("device_info", &self.inner.device_info)
            .finish()
    }
}

impl KilnDeviceContextNull {
    pub fn new() -> Self {
        KilnDeviceContextNull {
            inner: Arc::new(KilnDeviceContextNullInner {
                device_info: KilnDeviceInfo::default(),
                graphics_pipelines: PipelineCache::new(),
                compute_pipelines: PipelineCache::new(),
                descriptor_batch_count: AtomicU64::new(0),
                descriptor_write_count: AtomicU64::new(0),
                last_batch_write_count: AtomicU64::new(0),
                barrier_batch_count: AtomicU64::new(0),
                barrier_count: AtomicU64::new(0),
                pipelines_created: AtomicU64::new(0),
            }),
        }
    }

    pub fn device_info(&self) -> &KilnDeviceInfo {
        &self.inner.device_info
    }

    pub fn create_texture(
        &self,
        texture_def: &KilnTextureDef,
    ) -> KilnResult<KilnTextureNull> {
        Ok(KilnTextureNull::new(texture_def))
    }

    pub fn create_buffer(
        &self,
        buffer_def: &KilnBufferDef,
    ) -> KilnResult<KilnBufferNull> {
        Ok(KilnBufferNull::new(buffer_def))
    }

    pub fn create_sampler(
        &self,
        sampler_def: &KilnSamplerDef,
    ) -> KilnResult<KilnSamplerNull> {
        Ok(KilnSamplerNull::new(sampler_def))
    }

    pub fn create_shader_module(
        &self,
        shader_module_def: KilnShaderModuleDef,
    ) -> KilnResult<KilnShaderModuleNull> {
        Ok(KilnShaderModuleNull::new(shader_module_def.bytes()))
    }

    pub fn create_shader(
        &self,
        stage_def: &KilnShaderStageDef,
    ) -> KilnResult<KilnShaderNull> {
        KilnShaderNull::new(stage_def)
    }

    pub fn create_root_signature(
        &self,
        root_signature_def: &KilnRootSignatureDef,
        name: &str,
        flags: KilnRootSignatureFlags,
    ) -> KilnResult<KilnRootSignatureNull> {
        KilnRootSignatureNull::new(self, root_signature_def, name, flags)
    }

    pub(crate) fn create_resource_set_storage(
        &self,
        _root_signature: &KilnRootSignatureNull,
        _first_param: u32,
        _param_count: u32,
    ) -> KilnResult<KilnResourceSetNull> {
        Ok(KilnResourceSetNull::new(self))
    }

    pub(crate) fn create_graphics_context_backend(&self) -> KilnResult<KilnGraphicsContextNull> {
        Ok(KilnGraphicsContextNull::new(self))
    }

    pub(crate) fn get_or_create_graphics_pipeline(
        &self,
        hash: u64,
        def: &KilnGraphicsPsoDef,
    ) -> KilnResult<KilnPipeline> {
        // Def was verified by the PSO before hashing
        let root_signature = def.root_signature.clone().unwrap();
        self.inner.graphics_pipelines.get_or_create(hash, || {
            self.inner.pipelines_created.fetch_add(1, Ordering::Relaxed);
            Ok(KilnPipeline::Null(KilnPipelineNull::new(
                KilnPipelineType::Graphics,
                root_signature,
            )))
        })
    }

    pub(crate) fn get_or_create_compute_pipeline(
        &self,
        hash: u64,
        def: &KilnComputePsoDef,
    ) -> KilnResult<KilnPipeline> {
        let root_signature = def.root_signature.clone().unwrap();
        self.inner.compute_pipelines.get_or_create(hash, || {
            self.inner.pipelines_created.fetch_add(1, Ordering::Relaxed);
            Ok(KilnPipeline::Null(KilnPipelineNull::new(
                KilnPipelineType::Compute,
                root_signature,
            )))
        })
    }

    pub fn cached_pipeline_count(&self) -> usize {
        self.inner.graphics_pipelines.len() + self.inner.compute_pipelines.len()
    }

    pub fn destroy_all_pipelines(&self) {
        self.inner.graphics_pipelines.clear();
        self.inner.compute_pipelines.clear();
    }

    pub(crate) fn record_descriptor_batch(
        &self,
        write_count: usize,
    ) {
        self.inner
            .descriptor_batch_count
            .fetch_add(1, Ordering::Relaxed);
        self.inner
            .descriptor_write_count
            .fetch_add(write_count as u64, Ordering::Relaxed);
        self.inner
            .last_batch_write_count
            .store(write_count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_barrier_batch(
        &self,
        barrier_count: usize,
    ) {
        self.inner
            .barrier_batch_count
            .fetch_add(1, Ordering::Relaxed);
        self.inner
            .barrier_count
            .fetch_add(barrier_count as u64, Ordering::Relaxed);
    }

    /// Number of batched descriptor update calls issued so far
    pub fn descriptor_batch_count(&self) -> u64 {
        self.inner.descriptor_batch_count.load(Ordering::Relaxed)
    }

    /// Total descriptor writes across all batches
    pub fn descriptor_write_count(&self) -> u64 {
        self.inner.descriptor_write_count.load(Ordering::Relaxed)
    }

    /// Number of writes in the most recent batch
    pub fn last_batch_write_count(&self) -> u64 {
        self.inner.last_batch_write_count.load(Ordering::Relaxed)
    }

    /// Number of barrier submissions issued so far
    pub fn barrier_batch_count(&self) -> u64 {
        self.inner.barrier_batch_count.load(Ordering::Relaxed)
    }

    /// Total barriers across all submissions
    pub fn barrier_count(&self) -> u64 {
        self.inner.barrier_count.load(Ordering::Relaxed)
    }

    /// Number of native pipelines created, cache hits excluded
    pub fn pipelines_created(&self) -> u64 {
        self.inner.pipelines_created.load(Ordering::Relaxed)
    }
}
