use super::{KilnDeviceContextDx12, KilnRootSignatureDx12};
use crate::resource_set::{DescriptorWrite, SlotResource};
use crate::root_signature::KilnRootParameterKind;
use crate::{KilnDescriptorRangeType, KilnResult};
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HeapKind {
    CbvSrvUav,
    Sampler,
}

/// Where one flat descriptor slot of the covered parameters lives
#[derive(Clone, Copy, Debug)]
enum SlotLocation {
    /// Offset into this set's block in the shader-visible heap of `HeapKind`
    Table(HeapKind, u32),
    /// Root CBV parameters hold no heap descriptor, the buffer address is recorded and
    /// bound directly
    RootConstantBuffer,
}

/// How one covered root parameter is bound at draw time
#[derive(Clone, Copy, Debug)]
pub(crate) enum Dx12ParamBinding {
    DescriptorTable(D3D12_GPU_DESCRIPTOR_HANDLE),
    /// GPU virtual address of the bound constant buffer, 0 until one is bound
    ConstantBuffer(u64),
}

/// Owns contiguous blocks in the shared shader-visible heaps. Descriptor writes are
/// created into the CPU staging heaps and copied over in one `CopyDescriptors` call
/// per heap kind.
#[derive(Debug)]
pub struct KilnResourceSetDx12 {
    device_context: KilnDeviceContextDx12,
    root_signature: KilnRootSignatureDx12,
    first_param: u32,
    slot_locations: Vec<SlotLocation>,
    // Flat slot index within the signature where this set's coverage begins
    base_slot: u32,
    cbv_srv_uav_first: u32,
    cbv_srv_uav_staging_first: u32,
    sampler_first: u32,
    sampler_staging_first: u32,
    param_bindings: Vec<Dx12ParamBinding>,
}

impl KilnResourceSetDx12 {
    pub(crate) fn new(
        device_context: &KilnDeviceContextDx12,
        root_signature: &KilnRootSignatureDx12,
        first_param: u32,
        param_count: u32,
    ) -> KilnResult<Self> {
        let binding_model = root_signature.binding_model();
        let base_slot = binding_model.parameters[first_param as usize].first_slot;

        // Lay out every covered slot into its heap in declaration order
        let mut slot_locations = Vec::new();
        let mut cbv_srv_uav_count = 0u32;
        let mut sampler_count = 0u32;
        let mut param_table_offsets = Vec::with_capacity(param_count as usize);

        for param_index in first_param..first_param + param_count {
            let parameter = &binding_model.parameters[param_index as usize];
            param_table_offsets.push((cbv_srv_uav_count, sampler_count));
            match &parameter.kind {
                KilnRootParameterKind::ConstantBuffer { .. } => {
                    slot_locations.push(SlotLocation::RootConstantBuffer);
                }
                KilnRootParameterKind::DescriptorTable { .. } => {
                    for array_index in 0..parameter.descriptor_count() {
                        let range_type = parameter.range_type_at(array_index).unwrap();
                        if range_type == KilnDescriptorRangeType::Sampler {
                            slot_locations
                                .push(SlotLocation::Table(HeapKind::Sampler, sampler_count));
                            sampler_count += 1;
                        } else {
                            slot_locations.push(SlotLocation::Table(
                                HeapKind::CbvSrvUav,
                                cbv_srv_uav_count,
                            ));
                            cbv_srv_uav_count += 1;
                        }
                    }
                }
            }
        }

        let inner = &device_context.inner;
        let (cbv_srv_uav_first, cbv_srv_uav_staging_first) = if cbv_srv_uav_count > 0 {
            (
                inner.cbv_srv_uav_heap.allocate(cbv_srv_uav_count)?,
                inner.cbv_srv_uav_staging_heap.allocate(cbv_srv_uav_count)?,
            )
        } else {
            (0, 0)
        };
        let (sampler_first, sampler_staging_first) = if sampler_count > 0 {
            (
                inner.sampler_heap.allocate(sampler_count)?,
                inner.sampler_staging_heap.allocate(sampler_count)?,
            )
        } else {
            (0, 0)
        };

        let mut param_bindings = Vec::with_capacity(param_count as usize);
        for (i, param_index) in (first_param..first_param + param_count).enumerate() {
            let parameter = &binding_model.parameters[param_index as usize];
            let binding = match &parameter.kind {
                KilnRootParameterKind::ConstantBuffer { .. } => {
                    Dx12ParamBinding::ConstantBuffer(0)
                }
                KilnRootParameterKind::DescriptorTable { ranges } => {
                    // Tables are homogeneous per heap kind, the first range decides
                    let (cbv_srv_uav_offset, sampler_offset) = param_table_offsets[i];
                    let handle = if ranges[0].range_type == KilnDescriptorRangeType::Sampler {
                        inner.sampler_heap.gpu_handle(sampler_first + sampler_offset)
                    } else {
                        inner
                            .cbv_srv_uav_heap
                            .gpu_handle(cbv_srv_uav_first + cbv_srv_uav_offset)
                    };
                    Dx12ParamBinding::DescriptorTable(handle)
                }
            };
            param_bindings.push(binding);
        }

        Ok(KilnResourceSetDx12 {
            device_context: device_context.clone(),
            root_signature: root_signature.clone(),
            first_param,
            slot_locations,
            base_slot,
            cbv_srv_uav_first,
            cbv_srv_uav_staging_first,
            sampler_first,
            sampler_staging_first,
            param_bindings,
        })
    }

    pub fn first_param(&self) -> u32 {
        self.first_param
    }

    /// Per covered parameter, what the graphics context binds for it
    pub(crate) fn param_bindings(&self) -> &[Dx12ParamBinding] {
        &self.param_bindings
    }

    fn local_slot(
        &self,
        write: &DescriptorWrite,
    ) -> usize {
        let binding_model = self.root_signature.binding_model();
        binding_model.slot_index(write.param_index, write.array_index) - self.base_slot as usize
    }

    pub(crate) fn flush(
        &mut self,
        writes: &[DescriptorWrite],
    ) -> KilnResult<()> {
        debug_assert!(!writes.is_empty());

        let inner = self.device_context.inner.clone();
        let device = &inner.device;

        // Individual staged descriptors, gathered into one copy per heap kind
        let mut cbv_srv_uav_src = Vec::new();
        let mut cbv_srv_uav_dst = Vec::new();
        let mut sampler_src = Vec::new();
        let mut sampler_dst = Vec::new();

        for write in writes {
            let slot = self.local_slot(write);
            match self.slot_locations[slot] {
                SlotLocation::RootConstantBuffer => {
                    let buffer = match &write.resource {
                        SlotResource::Buffer(buffer) => buffer
                            .dx12_buffer()
                            .ok_or("buffer was not created by this device context")?,
                        _ => Err("constant buffer slot bound with a non-buffer resource")?,
                    };
                    let param_slot = (write.param_index - self.first_param) as usize;
                    self.param_bindings[param_slot] =
                        Dx12ParamBinding::ConstantBuffer(buffer.gpu_virtual_address());
                }
                SlotLocation::Table(HeapKind::CbvSrvUav, offset) => {
                    let staging_handle = inner
                        .cbv_srv_uav_staging_heap
                        .cpu_handle(self.cbv_srv_uav_staging_first + offset);
                    self.write_cbv_srv_uav(device, write, staging_handle)?;
                    cbv_srv_uav_src.push(staging_handle);
                    cbv_srv_uav_dst.push(
                        inner
                            .cbv_srv_uav_heap
                            .cpu_handle(self.cbv_srv_uav_first + offset),
                    );
                }
                SlotLocation::Table(HeapKind::Sampler, offset) => {
                    let sampler = match &write.resource {
                        SlotResource::Sampler(sampler) => sampler
                            .dx12_sampler()
                            .ok_or("sampler was not created by this device context")?,
                        _ => Err("sampler slot bound with a non-sampler resource")?,
                    };
                    let staging_handle = inner
                        .sampler_staging_heap
                        .cpu_handle(self.sampler_staging_first + offset);
                    unsafe {
                        device.CreateSampler(&sampler.dx12_desc(), staging_handle);
                    }
                    sampler_src.push(staging_handle);
                    sampler_dst
                        .push(inner.sampler_heap.cpu_handle(self.sampler_first + offset));
                }
            }
        }

        log::trace!(
            "copying {} view and {} sampler descriptors to the shader-visible heaps",
            cbv_srv_uav_dst.len(),
            sampler_dst.len()
        );

        let ones_view: Vec<u32> = vec![1; cbv_srv_uav_dst.len()];
        let ones_sampler: Vec<u32> = vec![1; sampler_dst.len()];
        unsafe {
            if !cbv_srv_uav_dst.is_empty() {
                device.CopyDescriptors(
                    cbv_srv_uav_dst.len() as u32,
                    cbv_srv_uav_dst.as_ptr(),
                    Some(ones_view.as_ptr()),
                    cbv_srv_uav_src.len() as u32,
                    cbv_srv_uav_src.as_ptr(),
                    Some(ones_view.as_ptr()),
                    D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
                );
            }
            if !sampler_dst.is_empty() {
                device.CopyDescriptors(
                    sampler_dst.len() as u32,
                    sampler_dst.as_ptr(),
                    Some(ones_sampler.as_ptr()),
                    sampler_src.len() as u32,
                    sampler_src.as_ptr(),
                    Some(ones_sampler.as_ptr()),
                    D3D12_DESCRIPTOR_HEAP_TYPE_SAMPLER,
                );
            }
        }
        Ok(())
    }

    fn write_cbv_srv_uav(
        &self,
        device: &ID3D12Device,
        write: &DescriptorWrite,
        staging_handle: D3D12_CPU_DESCRIPTOR_HANDLE,
    ) -> KilnResult<()> {
        match write.range_type {
            KilnDescriptorRangeType::ConstantBuffer => {
                let buffer = match &write.resource {
                    SlotResource::Buffer(buffer) => buffer
                        .dx12_buffer()
                        .ok_or("buffer was not created by this device context")?,
                    _ => Err("constant buffer slot bound with a non-buffer resource")?,
                };
                let desc = D3D12_CONSTANT_BUFFER_VIEW_DESC {
                    BufferLocation: buffer.gpu_virtual_address(),
                    SizeInBytes: ((buffer.common().def.size + 255) & !255) as u32,
                };
                unsafe {
                    device.CreateConstantBufferView(Some(&desc), staging_handle);
                }
            }
            KilnDescriptorRangeType::TextureSrv => {
                let texture = match &write.resource {
                    SlotResource::Texture(texture) => texture
                        .dx12_texture()
                        .ok_or("texture was not created by this device context")?,
                    _ => Err("texture SRV slot bound with a non-texture resource")?,
                };
                unsafe {
                    device.CreateShaderResourceView(texture.dx12_resource(), None, staging_handle);
                }
            }
            KilnDescriptorRangeType::BufferSrv => {
                let buffer = match &write.resource {
                    SlotResource::Buffer(buffer) => buffer
                        .dx12_buffer()
                        .ok_or("buffer was not created by this device context")?,
                    _ => Err("buffer SRV slot bound with a non-buffer resource")?,
                };
                let elements = buffer.common().def.elements;
                let desc = D3D12_SHADER_RESOURCE_VIEW_DESC {
                    Format: DXGI_FORMAT_UNKNOWN,
                    ViewDimension: D3D12_SRV_DIMENSION_BUFFER,
                    Shader4ComponentMapping: D3D12_DEFAULT_SHADER_4_COMPONENT_MAPPING,
                    Anonymous: D3D12_SHADER_RESOURCE_VIEW_DESC_0 {
                        Buffer: D3D12_BUFFER_SRV {
                            FirstElement: 0,
                            NumElements: elements.element_count as u32,
                            StructureByteStride: elements.element_stride as u32,
                            Flags: D3D12_BUFFER_SRV_FLAG_NONE,
                        },
                    },
                };
                unsafe {
                    device.CreateShaderResourceView(
                        buffer.dx12_resource(),
                        Some(&desc),
                        staging_handle,
                    );
                }
            }
            KilnDescriptorRangeType::TextureUav => {
                let texture = match &write.resource {
                    SlotResource::Texture(texture) => texture
                        .dx12_texture()
                        .ok_or("texture was not created by this device context")?,
                    _ => Err("texture UAV slot bound with a non-texture resource")?,
                };
                unsafe {
                    device.CreateUnorderedAccessView(
                        texture.dx12_resource(),
                        None::<&ID3D12Resource>,
                        None,
                        staging_handle,
                    );
                }
            }
            KilnDescriptorRangeType::BufferUav => {
                let buffer = match &write.resource {
                    SlotResource::Buffer(buffer) => buffer
                        .dx12_buffer()
                        .ok_or("buffer was not created by this device context")?,
                    _ => Err("buffer UAV slot bound with a non-buffer resource")?,
                };
                let elements = buffer.common().def.elements;
                let desc = D3D12_UNORDERED_ACCESS_VIEW_DESC {
                    Format: DXGI_FORMAT_UNKNOWN,
                    ViewDimension: D3D12_UAV_DIMENSION_BUFFER,
                    Anonymous: D3D12_UNORDERED_ACCESS_VIEW_DESC_0 {
                        Buffer: D3D12_BUFFER_UAV {
                            FirstElement: 0,
                            NumElements: elements.element_count as u32,
                            StructureByteStride: elements.element_stride as u32,
                            CounterOffsetInBytes: 0,
                            Flags: D3D12_BUFFER_UAV_FLAG_NONE,
                        },
                    },
                };
                unsafe {
                    device.CreateUnorderedAccessView(
                        buffer.dx12_resource(),
                        None::<&ID3D12Resource>,
                        Some(&desc),
                        staging_handle,
                    );
                }
            }
            KilnDescriptorRangeType::Sampler => {
                unreachable!("sampler writes are staged into the sampler heap")
            }
        }
        Ok(())
    }
}
