use crate::KilnResult;
use std::sync::atomic::{AtomicU32, Ordering};
use windows::Win32::Graphics::Direct3D12::*;

/// A bump allocator over one `ID3D12DescriptorHeap`. Descriptors are never recycled,
/// the heaps are sized for the lifetime of the device context.
#[derive(Debug)]
pub(crate) struct Dx12DescriptorHeap {
    heap: ID3D12DescriptorHeap,
    stride: u32,
    capacity: u32,
    next_index: AtomicU32,
    first_cpu_handle: D3D12_CPU_DESCRIPTOR_HANDLE,
    first_gpu_handle: D3D12_GPU_DESCRIPTOR_HANDLE,
    shader_visible: bool,
}

impl Dx12DescriptorHeap {
    pub fn new(
        device: &ID3D12Device,
        heap_type: D3D12_DESCRIPTOR_HEAP_TYPE,
        capacity: u32,
        shader_visible: bool,
    ) -> KilnResult<Self> {
        let flags = if shader_visible {
            D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE
        } else {
            D3D12_DESCRIPTOR_HEAP_FLAG_NONE
        };

        let desc = D3D12_DESCRIPTOR_HEAP_DESC {
            Type: heap_type,
            NumDescriptors: capacity,
            Flags: flags,
            NodeMask: 0,
        };

        let heap: ID3D12DescriptorHeap = unsafe { device.CreateDescriptorHeap(&desc)? };
        let stride = unsafe { device.GetDescriptorHandleIncrementSize(heap_type) };
        let first_cpu_handle = unsafe { heap.GetCPUDescriptorHandleForHeapStart() };
        let first_gpu_handle = if shader_visible {
            unsafe { heap.GetGPUDescriptorHandleForHeapStart() }
        } else {
            D3D12_GPU_DESCRIPTOR_HANDLE::default()
        };

        Ok(Dx12DescriptorHeap {
            heap,
            stride,
            capacity,
            next_index: AtomicU32::new(0),
            first_cpu_handle,
            first_gpu_handle,
            shader_visible,
        })
    }

    pub fn heap(&self) -> &ID3D12DescriptorHeap {
        &self.heap
    }

    /// Reserves a contiguous block of descriptors, returning the first index
    pub fn allocate(
        &self,
        count: u32,
    ) -> KilnResult<u32> {
        let first = self.next_index.fetch_add(count, Ordering::Relaxed);
        if first + count > self.capacity {
            Err(format!(
                "descriptor heap exhausted, capacity is {}",
                self.capacity
            ))?;
        }
        Ok(first)
    }

    pub fn cpu_handle(
        &self,
        index: u32,
    ) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: self.first_cpu_handle.ptr + (index as usize * self.stride as usize),
        }
    }

    pub fn gpu_handle(
        &self,
        index: u32,
    ) -> D3D12_GPU_DESCRIPTOR_HANDLE {
        debug_assert!(self.shader_visible);
        D3D12_GPU_DESCRIPTOR_HANDLE {
            ptr: self.first_gpu_handle.ptr + (index as u64 * self.stride as u64),
        }
    }
}
