use super::{util, KilnDeviceContextDx12};
use crate::internal_shared::BufferCommon;
use crate::{KilnBufferDef, KilnMemoryUsage, KilnResourceType, KilnResult};
use std::sync::Arc;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

#[derive(Debug)]
struct KilnBufferDx12Inner {
    device_context: KilnDeviceContextDx12,
    common: BufferCommon,
    resource: ID3D12Resource,
    gpu_virtual_address: u64,
    mapped_ptr: Option<std::ptr::NonNull<u8>>,
}

// The mapped pointer is only handed out for copying, never shared mutable state
unsafe impl Send for KilnBufferDx12Inner {}
unsafe impl Sync for KilnBufferDx12Inner {}

impl Drop for KilnBufferDx12Inner {
    fn drop(&mut self) {
        if self.mapped_ptr.is_some() {
            unsafe {
                self.resource.Unmap(0, None);
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct KilnBufferDx12 {
    inner: Arc<KilnBufferDx12Inner>,
}

impl KilnBufferDx12 {
    pub(crate) fn new(
        device_context: &KilnDeviceContextDx12,
        buffer_def: &KilnBufferDef,
    ) -> KilnResult<Self> {
        buffer_def.verify();

        let device = &device_context.inner.device;

        let heap_type = match buffer_def.memory_usage {
            KilnMemoryUsage::GpuOnly => D3D12_HEAP_TYPE_DEFAULT,
            KilnMemoryUsage::CpuToGpu => D3D12_HEAP_TYPE_UPLOAD,
            KilnMemoryUsage::GpuToCpu => D3D12_HEAP_TYPE_READBACK,
        };

        let mut size = buffer_def.size;
        if buffer_def
            .resource_type
            .intersects(KilnResourceType::UNIFORM_BUFFER)
        {
            // Constant buffer sizes must be 256-byte aligned
            size = (size + 255) & !255;
        }

        let mut flags = D3D12_RESOURCE_FLAG_NONE;
        if buffer_def
            .resource_type
            .intersects(KilnResourceType::BUFFER_READ_WRITE)
        {
            flags |= D3D12_RESOURCE_FLAG_ALLOW_UNORDERED_ACCESS;
        }

        let desc = D3D12_RESOURCE_DESC {
            Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
            Alignment: 0,
            Width: size,
            Height: 1,
            DepthOrArraySize: 1,
            MipLevels: 1,
            Format: DXGI_FORMAT_UNKNOWN,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            Layout: D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
            Flags: flags,
        };

        let heap_properties = D3D12_HEAP_PROPERTIES {
            Type: heap_type,
            ..Default::default()
        };

        // Upload heaps require GENERIC_READ, readback heaps require COPY_DEST
        let initial_state = match buffer_def.memory_usage {
            KilnMemoryUsage::GpuOnly => util::resource_state_to_dx12(buffer_def.initial_state()),
            KilnMemoryUsage::CpuToGpu => D3D12_RESOURCE_STATE_GENERIC_READ,
            KilnMemoryUsage::GpuToCpu => D3D12_RESOURCE_STATE_COPY_DEST,
        };

        let mut resource: Option<ID3D12Resource> = None;
        unsafe {
            device.CreateCommittedResource(
                &heap_properties,
                D3D12_HEAP_FLAG_NONE,
                &desc,
                initial_state,
                None,
                &mut resource,
            )?;
        }
        let resource = resource.unwrap();
        let gpu_virtual_address = unsafe { resource.GetGPUVirtualAddress() };

        // Host-visible buffers stay persistently mapped
        let mapped_ptr = if buffer_def.memory_usage != KilnMemoryUsage::GpuOnly {
            let mut ptr = std::ptr::null_mut();
            unsafe {
                resource.Map(0, None, Some(&mut ptr))?;
            }
            std::ptr::NonNull::new(ptr as *mut u8)
        } else {
            None
        };

        Ok(KilnBufferDx12 {
            inner: Arc::new(KilnBufferDx12Inner {
                device_context: device_context.clone(),
                common: BufferCommon::new(buffer_def),
                resource,
                gpu_virtual_address,
                mapped_ptr,
            }),
        })
    }

    pub(crate) fn common(&self) -> &BufferCommon {
        &self.inner.common
    }

    pub fn dx12_resource(&self) -> &ID3D12Resource {
        &self.inner.resource
    }

    pub fn gpu_virtual_address(&self) -> u64 {
        self.inner.gpu_virtual_address
    }

    /// Persistently mapped pointer, None for GPU-only buffers
    pub fn mapped_ptr(&self) -> Option<*mut u8> {
        self.inner.mapped_ptr.map(|p| p.as_ptr())
    }

    pub fn copy_to_host_visible_buffer<T: Copy>(
        &self,
        data: &[T],
    ) -> KilnResult<()> {
        let byte_count = std::mem::size_of_val(data) as u64;
        if byte_count > self.inner.common.def.size {
            Err(format!(
                "copy of {} bytes exceeds buffer size {}",
                byte_count, self.inner.common.def.size
            ))?;
        }

        let ptr = self
            .inner
            .mapped_ptr
            .ok_or_else(|| crate::KilnError::from("buffer is not host visible"))?;
        unsafe {
            std::ptr::copy_nonoverlapping(
                data.as_ptr() as *const u8,
                ptr.as_ptr(),
                byte_count as usize,
            );
        }
        Ok(())
    }
}
