use super::descriptor_heap::Dx12DescriptorHeap;
use super::{
    KilnBufferDx12, KilnGraphicsContextDx12, KilnPipelineDx12, KilnResourceSetDx12,
    KilnRootSignatureDx12, KilnSamplerDx12, KilnShaderDx12, KilnShaderModuleDx12, KilnTextureDx12,
};
use crate::internal_shared::PipelineCache;
use crate::{
    KilnBufferDef, KilnComputePsoDef, KilnDeviceInfo, KilnGraphicsPsoDef, KilnPipeline,
    KilnResult, KilnRootSignatureDef, KilnRootSignatureFlags, KilnSamplerDef, KilnShaderModuleDef,
    KilnShaderStageDef, KilnTextureDef,
};
use std::sync::Arc;
use windows::Win32::Graphics::Direct3D12::*;

const CBV_SRV_UAV_HEAP_SIZE: u32 = 65536;
const SAMPLER_HEAP_SIZE: u32 = 2048;
const RTV_HEAP_SIZE: u32 = 4096;
const DSV_HEAP_SIZE: u32 = 1024;

pub(crate) struct KilnDeviceContextDx12Inner {
    pub(crate) device: ID3D12Device,
    device_info: KilnDeviceInfo,
    // Shader-visible heaps all resource sets share, plus CPU staging heaps views are
    // created into before being copied over in one batch
    pub(crate) cbv_srv_uav_heap: Dx12DescriptorHeap,
    pub(crate) sampler_heap: Dx12DescriptorHeap,
    pub(crate) cbv_srv_uav_staging_heap: Dx12DescriptorHeap,
    pub(crate) sampler_staging_heap: Dx12DescriptorHeap,
    pub(crate) rtv_heap: Dx12DescriptorHeap,
    pub(crate) dsv_heap: Dx12DescriptorHeap,
    graphics_pipelines: PipelineCache<KilnPipeline>,
    compute_pipelines: PipelineCache<KilnPipeline>,
}

/// Wraps an externally created d3d12 device. The device must outlive this context and
/// everything created from it.
#[derive(Clone)]
pub struct KilnDeviceContextDx12 {
    pub(crate) inner: Arc<KilnDeviceContextDx12Inner>,
}

impl std::fmt::Debug for KilnDeviceContextDx12 {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("KilnDeviceContextDx12").finish()
    }
}

impl KilnDeviceContextDx12 {
    pub fn new(
        device: ID3D12Device,
        device_info: KilnDeviceInfo,
    ) -> KilnResult<Self> {
        let cbv_srv_uav_heap = Dx12DescriptorHeap::new(
            &device,
            D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
            CBV_SRV_UAV_HEAP_SIZE,
            true,
        )?;
        let sampler_heap = Dx12DescriptorHeap::new(
            &device,
            D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER,
            SAMPLER_HEAP_SIZE,
            true,
        )?;
        let cbv_srv_uav_staging_heap = Dx12DescriptorHeap::new(
            &device,
            D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
            CBV_SRV_UAV_HEAP_SIZE,
            false,
        )?;
        let sampler_staging_heap = Dx12DescriptorHeap::new(
            &device,
            D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER,
            SAMPLER_HEAP_SIZE,
            false,
        )?;
        let rtv_heap =
            Dx12DescriptorHeap::new(&device, D3D12_DESCRIPTOR_HEAP_TYPE_RTV, RTV_HEAP_SIZE, false)?;
        let dsv_heap =
            Dx12DescriptorHeap::new(&device, D3D12_DESCRIPTOR_HEAP_TYPE_DSV, DSV_HEAP_SIZE, false)?;

        Ok(KilnDeviceContextDx12 {
            inner: Arc::new(KilnDeviceContextDx12Inner {
                device,
                device_info,
                cbv_srv_uav_heap,
                sampler_heap,
                cbv_srv_uav_staging_heap,
                sampler_staging_heap,
                rtv_heap,
                dsv_heap,
                graphics_pipelines: PipelineCache::new(),
                compute_pipelines: PipelineCache::new(),
            }),
        })
    }

    pub fn device(&self) -> &ID3D12Device {
        &self.inner.device
    }

    pub fn device_info(&self) -> &KilnDeviceInfo {
        &self.inner.device_info
    }

    pub fn create_texture(
        &self,
        texture_def: &KilnTextureDef,
    ) -> KilnResult<KilnTextureDx12> {
        KilnTextureDx12::new(self, texture_def)
    }

    pub fn create_buffer(
        &self,
        buffer_def: &KilnBufferDef,
    ) -> KilnResult<KilnBufferDx12> {
        KilnBufferDx12::new(self, buffer_def)
    }

    pub fn create_sampler(
        &self,
        sampler_def: &KilnSamplerDef,
    ) -> KilnResult<KilnSamplerDx12> {
        KilnSamplerDx12::new(sampler_def)
    }

    pub fn create_shader_module(
        &self,
        shader_module_def: KilnShaderModuleDef,
    ) -> KilnResult<KilnShaderModuleDx12> {
        KilnShaderModuleDx12::new(shader_module_def)
    }

    pub fn create_shader(
        &self,
        stage_def: &KilnShaderStageDef,
    ) -> KilnResult<KilnShaderDx12> {
        KilnShaderDx12::new(stage_def)
    }

    pub fn create_root_signature(
        &self,
        root_signature_def: &KilnRootSignatureDef,
        name: &str,
        flags: KilnRootSignatureFlags,
    ) -> KilnResult<KilnRootSignatureDx12> {
        KilnRootSignatureDx12::new(self, root_signature_def, name, flags)
    }

    pub(crate) fn create_resource_set_storage(
        &self,
        root_signature: &KilnRootSignatureDx12,
        first_param: u32,
        param_count: u32,
    ) -> KilnResult<KilnResourceSetDx12> {
        KilnResourceSetDx12::new(self, root_signature, first_param, param_count)
    }

    pub(crate) fn create_graphics_context_backend(&self) -> KilnResult<KilnGraphicsContextDx12> {
        KilnGraphicsContextDx12::new(self)
    }

    pub(crate) fn get_or_create_graphics_pipeline(
        &self,
        hash: u64,
        def: &KilnGraphicsPsoDef,
    ) -> KilnResult<KilnPipeline> {
        self.inner.graphics_pipelines.get_or_create(hash, || {
            Ok(KilnPipeline::Dx12(KilnPipelineDx12::new_graphics_pipeline(
                self, def,
            )?))
        })
    }

    pub(crate) fn get_or_create_compute_pipeline(
        &self,
        hash: u64,
        def: &KilnComputePsoDef,
    ) -> KilnResult<KilnPipeline> {
        self.inner.compute_pipelines.get_or_create(hash, || {
            Ok(KilnPipeline::Dx12(KilnPipelineDx12::new_compute_pipeline(
                self, def,
            )?))
        })
    }

    pub fn cached_pipeline_count(&self) -> usize {
        self.inner.graphics_pipelines.len() + self.inner.compute_pipelines.len()
    }

    pub fn destroy_all_pipelines(&self) {
        self.inner.graphics_pipelines.clear();
        self.inner.compute_pipelines.clear();
    }
}
