use super::{util, KilnDeviceContextDx12};
use crate::{
    KilnBuffer, KilnBufferBarrier, KilnClearValues, KilnFrameBuffer, KilnIndexType, KilnPipeline,
    KilnPipelineType, KilnResourceSet, KilnResult, KilnRootSignature, KilnTexture,
    KilnTextureBarrier,
};
use std::mem::ManuallyDrop;
use windows::Win32::Foundation::RECT;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

/// Records into a direct command list with its own allocator. Submission to a queue
/// stays with the application.
pub struct KilnGraphicsContextDx12 {
    device_context: KilnDeviceContextDx12,
    command_allocator: ID3D12CommandAllocator,
    command_list: ID3D12GraphicsCommandList,
    bound_root_signature: Option<ID3D12RootSignature>,
    bound_pipeline_type: KilnPipelineType,
}

impl std::fmt::Debug for KilnGraphicsContextDx12 {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("KilnGraphicsContextDx12").finish()
    }
}

impl KilnGraphicsContextDx12 {
    pub(crate) fn new(device_context: &KilnDeviceContextDx12) -> KilnResult<Self> {
        let device = &device_context.inner.device;

        let command_allocator: ID3D12CommandAllocator =
            unsafe { device.CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT)? };

        // Lists are created open, close immediately so begin() can reset it
        let command_list: ID3D12GraphicsCommandList = unsafe {
            let command_list: ID3D12GraphicsCommandList = device.CreateCommandList(
                0,
                D3D12_COMMAND_LIST_TYPE_DIRECT,
                &command_allocator,
                None,
            )?;
            command_list.Close()?;
            command_list
        };

        Ok(KilnGraphicsContextDx12 {
            device_context: device_context.clone(),
            command_allocator,
            command_list,
            bound_root_signature: None,
            bound_pipeline_type: KilnPipelineType::Graphics,
        })
    }

    pub fn dx12_command_list(&self) -> &ID3D12GraphicsCommandList {
        &self.command_list
    }

    pub(crate) fn begin(&mut self) -> KilnResult<()> {
        let inner = &self.device_context.inner;
        unsafe {
            self.command_allocator.Reset()?;
            self.command_list.Reset(&self.command_allocator, None)?;

            // Every resource set lives in the two shared shader-visible heaps, bind
            // them once for the whole recording
            self.command_list.SetDescriptorHeaps(&[
                Some(inner.cbv_srv_uav_heap.heap().clone()),
                Some(inner.sampler_heap.heap().clone()),
            ]);
        }
        self.bound_root_signature = None;
        Ok(())
    }

    pub(crate) fn end(&mut self) -> KilnResult<()> {
        unsafe {
            self.command_list.Close()?;
        }
        Ok(())
    }

    pub(crate) fn submit_barriers(
        &mut self,
        texture_barriers: &[KilnTextureBarrier],
        buffer_barriers: &[KilnBufferBarrier],
    ) -> KilnResult<()> {
        let mut barriers =
            Vec::with_capacity(texture_barriers.len() + buffer_barriers.len());

        for barrier in texture_barriers {
            let texture = barrier
                .texture
                .dx12_texture()
                .ok_or("texture was not created by this device context")?;
            let mut native = D3D12_RESOURCE_BARRIER::default();
            native.Type = D3D12_RESOURCE_BARRIER_TYPE_TRANSITION;
            native.Flags = D3D12_RESOURCE_BARRIER_FLAG_NONE;
            native.Anonymous.Transition = ManuallyDrop::new(D3D12_RESOURCE_TRANSITION_BARRIER {
                pResource: windows::core::ManuallyDrop::new(texture.dx12_resource()),
                Subresource: D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
                StateBefore: util::resource_state_to_dx12(barrier.src_state),
                StateAfter: util::resource_state_to_dx12(barrier.dst_state),
            });
            barriers.push(native);
        }

        for barrier in buffer_barriers {
            let buffer = barrier
                .buffer
                .dx12_buffer()
                .ok_or("buffer was not created by this device context")?;
            let mut native = D3D12_RESOURCE_BARRIER::default();
            native.Type = D3D12_RESOURCE_BARRIER_TYPE_TRANSITION;
            native.Flags = D3D12_RESOURCE_BARRIER_FLAG_NONE;
            native.Anonymous.Transition = ManuallyDrop::new(D3D12_RESOURCE_TRANSITION_BARRIER {
                pResource: windows::core::ManuallyDrop::new(buffer.dx12_resource()),
                Subresource: D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
                StateBefore: util::resource_state_to_dx12(barrier.src_state),
                StateAfter: util::resource_state_to_dx12(barrier.dst_state),
            });
            barriers.push(native);
        }

        log::trace!(
            "submitting barrier batch, {} texture and {} buffer barriers",
            texture_barriers.len(),
            buffer_barriers.len()
        );

        if !barriers.is_empty() {
            unsafe {
                self.command_list.ResourceBarrier(&barriers);
            }
        }
        Ok(())
    }

    pub(crate) fn begin_render_pass(
        &mut self,
        framebuffer: &KilnFrameBuffer,
        clear_values: &KilnClearValues,
    ) -> KilnResult<()> {
        let mut rtvs = Vec::with_capacity(framebuffer.color_attachment_count());
        for index in 0..framebuffer.color_attachment_count() {
            // Slots [0..count) are contiguous after finalize
            let texture = framebuffer.get_color_buffer(index).unwrap();
            let texture = texture
                .dx12_texture()
                .ok_or("texture was not created by this device context")?;
            rtvs.push(
                texture
                    .rtv_handle()
                    .ok_or("texture was not created as a color render target")?,
            );
        }

        // OMSetRenderTargets wants a pointer to the dsv handle, keep it on the stack
        // for the duration of the call
        let mut dsv_value = D3D12_CPU_DESCRIPTOR_HANDLE::default();
        let mut dsv_ptr = None;
        let mut depth_has_stencil = false;
        if let Some(texture) = framebuffer.get_depth_buffer() {
            depth_has_stencil = texture.texture_def().format.has_stencil();
            let texture = texture
                .dx12_texture()
                .ok_or("texture was not created by this device context")?;
            dsv_value = texture
                .dsv_handle()
                .ok_or("texture was not created as a depth stencil target")?;
            dsv_ptr = Some(&dsv_value as *const D3D12_CPU_DESCRIPTOR_HANDLE);
        }

        unsafe {
            self.command_list.OMSetRenderTargets(
                rtvs.len() as u32,
                Some(rtvs.as_ptr()),
                false,
                dsv_ptr,
            );
        }

        for (index, rtv) in rtvs.iter().enumerate() {
            let clear_value = clear_values.colors.get(index).cloned().unwrap_or_default();
            unsafe {
                self.command_list
                    .ClearRenderTargetView(*rtv, clear_value.0.as_ptr(), &[]);
            }
        }

        if dsv_ptr.is_some() {
            let clear_value = clear_values.depth_stencil.unwrap_or_default();
            let mut flags = D3D12_CLEAR_FLAG_DEPTH;
            if depth_has_stencil {
                flags |= D3D12_CLEAR_FLAG_STENCIL;
            }
            unsafe {
                self.command_list.ClearDepthStencilView(
                    dsv_value,
                    flags,
                    clear_value.depth,
                    clear_value.stencil as u8,
                    &[],
                );
            }
        }
        Ok(())
    }

    pub(crate) fn end_render_pass(&mut self) -> KilnResult<()> {
        // Targets stay bound until the next OMSetRenderTargets, nothing to close
        Ok(())
    }

    pub(crate) fn bind_root_signature(
        &mut self,
        root_signature: &KilnRootSignature,
    ) -> KilnResult<()> {
        let signature = root_signature
            .dx12_root_signature()
            .ok_or("root signature was not created by this device context")?;
        let signature = signature.dx12_root_signature();

        // Signatures are pipeline-type agnostic, set both bind points so resource sets
        // can be bound before the pipeline is known
        unsafe {
            self.command_list.SetGraphicsRootSignature(signature);
            self.command_list.SetComputeRootSignature(signature);
        }
        self.bound_root_signature = Some(signature.clone());
        Ok(())
    }

    pub(crate) fn bind_pipeline(
        &mut self,
        pipeline: &KilnPipeline,
    ) -> KilnResult<()> {
        let dx12_pipeline = pipeline
            .dx12_pipeline()
            .ok_or("pipeline was not created by this device context")?;

        self.bound_pipeline_type = pipeline.pipeline_type();

        unsafe {
            self.command_list
                .SetPipelineState(dx12_pipeline.dx12_pipeline_state());
            if self.bound_pipeline_type == KilnPipelineType::Graphics {
                self.command_list
                    .IASetPrimitiveTopology(dx12_pipeline.dx12_topology());
            }
        }
        Ok(())
    }

    pub(crate) fn bind_resource_set(
        &mut self,
        resource_set: &KilnResourceSet,
    ) -> KilnResult<()> {
        assert!(
            self.bound_root_signature.is_some(),
            "a root signature or pipeline must be bound before resource sets"
        );

        let storage = match resource_set.storage() {
            crate::resource_set::KilnResourceSetStorage::Dx12(inner) => inner,
            _ => Err("resource set was not created by this device context")?,
        };

        let dynamic_offset = resource_set.dynamic_offset().unwrap_or(0);

        for (index, binding) in storage.param_bindings().iter().enumerate() {
            let param_index = storage.first_param() + index as u32;
            match binding {
                super::resource_set::Dx12ParamBinding::DescriptorTable(handle) => unsafe {
                    match self.bound_pipeline_type {
                        KilnPipelineType::Graphics => self
                            .command_list
                            .SetGraphicsRootDescriptorTable(param_index, *handle),
                        KilnPipelineType::Compute => self
                            .command_list
                            .SetComputeRootDescriptorTable(param_index, *handle),
                    }
                },
                super::resource_set::Dx12ParamBinding::ConstantBuffer(address) => {
                    // Dynamic offsets fold into the GPU virtual address
                    let address = address + dynamic_offset;
                    unsafe {
                        match self.bound_pipeline_type {
                            KilnPipelineType::Graphics => self
                                .command_list
                                .SetGraphicsRootConstantBufferView(param_index, address),
                            KilnPipelineType::Compute => self
                                .command_list
                                .SetComputeRootConstantBufferView(param_index, address),
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub(crate) fn bind_vertex_buffer(
        &mut self,
        binding: u32,
        buffer: &KilnBuffer,
        byte_offset: u64,
    ) -> KilnResult<()> {
        let buffer = buffer
            .dx12_buffer()
            .ok_or("buffer was not created by this device context")?;
        let def = &buffer.common().def;
        let view = D3D12_VERTEX_BUFFER_VIEW {
            BufferLocation: buffer.gpu_virtual_address() + byte_offset,
            SizeInBytes: (def.size - byte_offset) as u32,
            StrideInBytes: def.elements.element_stride as u32,
        };
        unsafe {
            self.command_list.IASetVertexBuffers(binding, Some(&[view]));
        }
        Ok(())
    }

    pub(crate) fn bind_index_buffer(
        &mut self,
        buffer: &KilnBuffer,
        byte_offset: u64,
        index_type: KilnIndexType,
    ) -> KilnResult<()> {
        let format = match index_type {
            KilnIndexType::Uint16 => DXGI_FORMAT_R16_UINT,
            KilnIndexType::Uint32 => DXGI_FORMAT_R32_UINT,
        };
        let buffer = buffer
            .dx12_buffer()
            .ok_or("buffer was not created by this device context")?;
        let view = D3D12_INDEX_BUFFER_VIEW {
            BufferLocation: buffer.gpu_virtual_address() + byte_offset,
            SizeInBytes: (buffer.common().def.size - byte_offset) as u32,
            Format: format,
        };
        unsafe {
            self.command_list.IASetIndexBuffer(Some(&view));
        }
        Ok(())
    }

    pub(crate) fn set_viewport_and_scissor(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> KilnResult<()> {
        unsafe {
            self.command_list.RSSetViewports(&[D3D12_VIEWPORT {
                TopLeftX: x as f32,
                TopLeftY: y as f32,
                Width: width as f32,
                Height: height as f32,
                MinDepth: 0.0,
                MaxDepth: 1.0,
            }]);
            self.command_list.RSSetScissorRects(&[RECT {
                left: x as i32,
                top: y as i32,
                right: (x + width) as i32,
                bottom: (y + height) as i32,
            }]);
        }
        Ok(())
    }

    pub(crate) fn draw(
        &mut self,
        vertex_count: u32,
        first_vertex: u32,
    ) -> KilnResult<()> {
        unsafe {
            self.command_list
                .DrawInstanced(vertex_count, 1, first_vertex, 0);
        }
        Ok(())
    }

    pub(crate) fn draw_indexed(
        &mut self,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    ) -> KilnResult<()> {
        unsafe {
            self.command_list
                .DrawIndexedInstanced(index_count, 1, first_index, vertex_offset, 0);
        }
        Ok(())
    }

    pub(crate) fn dispatch(
        &mut self,
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32,
    ) -> KilnResult<()> {
        unsafe {
            self.command_list
                .Dispatch(group_count_x, group_count_y, group_count_z);
        }
        Ok(())
    }

    pub(crate) fn clear_color(
        &mut self,
        texture: &KilnTexture,
        rgba: [f32; 4],
    ) -> KilnResult<()> {
        let texture = texture
            .dx12_texture()
            .ok_or("texture was not created by this device context")?;
        let rtv = texture
            .rtv_handle()
            .ok_or("texture was not created as a color render target")?;
        unsafe {
            self.command_list
                .ClearRenderTargetView(rtv, rgba.as_ptr(), &[]);
        }
        Ok(())
    }

    pub(crate) fn clear_depth(
        &mut self,
        texture: &KilnTexture,
        depth: f32,
        stencil: u32,
    ) -> KilnResult<()> {
        let has_stencil = texture.texture_def().format.has_stencil();
        let texture = texture
            .dx12_texture()
            .ok_or("texture was not created by this device context")?;
        let dsv = texture
            .dsv_handle()
            .ok_or("texture was not created as a depth stencil target")?;
        let mut flags = D3D12_CLEAR_FLAG_DEPTH;
        if has_stencil {
            flags |= D3D12_CLEAR_FLAG_STENCIL;
        }
        unsafe {
            self.command_list
                .ClearDepthStencilView(dsv, flags, depth, stencil as u8, &[]);
        }
        Ok(())
    }

    pub(crate) fn present(
        &mut self,
        _texture: &KilnTexture,
    ) -> KilnResult<()> {
        // Swapchain interaction stays with the application, state validation happens in
        // the shared layer
        Ok(())
    }
}
