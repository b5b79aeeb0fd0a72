use super::KilnDeviceContextVulkan;
use crate::internal_shared::BufferCommon;
use crate::{KilnBufferDef, KilnMemoryUsage, KilnResourceType, KilnResult};
use ash::vk;
use std::sync::Arc;

#[derive(Debug)]
struct KilnBufferVulkanInner {
    device_context: KilnDeviceContextVulkan,
    common: BufferCommon,
    buffer: vk::Buffer,
    device_memory: vk::DeviceMemory,
    mapped_ptr: Option<std::ptr::NonNull<u8>>,
}

// The mapped pointer is only written through &mut self
unsafe impl Send for KilnBufferVulkanInner {}
unsafe impl Sync for KilnBufferVulkanInner {}

impl Drop for KilnBufferVulkanInner {
    fn drop(&mut self) {
        let device = &self.device_context.inner.device;
        unsafe {
            if self.mapped_ptr.is_some() {
                device.unmap_memory(self.device_memory);
            }
            device.destroy_buffer(self.buffer, None);
            device.free_memory(self.device_memory, None);
        }
    }
}

#[derive(Clone, Debug)]
pub struct KilnBufferVulkan {
    inner: Arc<KilnBufferVulkanInner>,
}

impl KilnBufferVulkan {
    pub(crate) fn new(
        device_context: &KilnDeviceContextVulkan,
        buffer_def: &KilnBufferDef,
    ) -> KilnResult<Self> {
        buffer_def.verify();

        let device = &device_context.inner.device;

        let mut usage = vk::BufferUsageFlags::TRANSFER_SRC | vk::BufferUsageFlags::TRANSFER_DST;
        if buffer_def
            .resource_type
            .intersects(KilnResourceType::UNIFORM_BUFFER)
        {
            usage |= vk::BufferUsageFlags::UNIFORM_BUFFER;
        }
        if buffer_def
            .resource_type
            .intersects(KilnResourceType::BUFFER | KilnResourceType::BUFFER_READ_WRITE)
        {
            usage |= vk::BufferUsageFlags::STORAGE_BUFFER;
        }
        if buffer_def
            .resource_type
            .intersects(KilnResourceType::VERTEX_BUFFER)
        {
            usage |= vk::BufferUsageFlags::VERTEX_BUFFER;
        }
        if buffer_def
            .resource_type
            .intersects(KilnResourceType::INDEX_BUFFER)
        {
            usage |= vk::BufferUsageFlags::INDEX_BUFFER;
        }
        if buffer_def
            .resource_type
            .intersects(KilnResourceType::INDIRECT_BUFFER)
        {
            usage |= vk::BufferUsageFlags::INDIRECT_BUFFER;
        }

        let buffer_create_info = vk::BufferCreateInfo::builder()
            .size(buffer_def.size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe { device.create_buffer(&buffer_create_info, None)? };

        let requirements = unsafe { device.get_buffer_memory_requirements(buffer) };
        let memory_type_index =
            device_context.find_memory_type_index(&requirements, buffer_def.memory_usage)?;
        let allocate_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type_index);
        let device_memory = unsafe { device.allocate_memory(&allocate_info, None)? };
        unsafe {
            device.bind_buffer_memory(buffer, device_memory, 0)?;
        }

        // Host-visible buffers stay persistently mapped
        let mapped_ptr = if buffer_def.memory_usage != KilnMemoryUsage::GpuOnly {
            let ptr = unsafe {
                device.map_memory(
                    device_memory,
                    0,
                    vk::WHOLE_SIZE,
                    vk::MemoryMapFlags::empty(),
                )?
            };
            std::ptr::NonNull::new(ptr as *mut u8)
        } else {
            None
        };

        Ok(KilnBufferVulkan {
            inner: Arc::new(KilnBufferVulkanInner {
                device_context: device_context.clone(),
                common: BufferCommon::new(buffer_def),
                buffer,
                device_memory,
                mapped_ptr,
            }),
        })
    }

    pub(crate) fn common(&self) -> &BufferCommon {
        &self.inner.common
    }

    pub fn vk_buffer(&self) -> vk::Buffer {
        self.inner.buffer
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
