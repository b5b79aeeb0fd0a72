use super::{util, KilnDeviceContextVulkan};
use crate::{
    KilnBuffer, KilnBufferBarrier, KilnClearValues, KilnFrameBuffer, KilnIndexType, KilnPipeline,
    KilnPipelineType, KilnResourceSet, KilnResourceState, KilnResult, KilnRootSignature,
    KilnTexture, KilnTextureBarrier,
};
use ash::vk;

/// `vkCmdClearColorImage`/`vkCmdClearDepthStencilImage` only accept the GENERAL and
/// TRANSFER_DST_OPTIMAL layouts, so an explicit clear moves the image into
/// TRANSFER_DST_OPTIMAL and restores the tracked state's layout afterwards. The
/// tracked state itself never changes. Returns the pre and post clear barriers.
fn clear_transition_barriers(
    image: vk::Image,
    aspect_mask: vk::ImageAspectFlags,
    state: KilnResourceState,
) -> [vk::ImageMemoryBarrier; 2] {
    let tracked_layout = util::resource_state_to_image_layout(state);
    let tracked_access = util::resource_state_to_access_flags(state);
    let range = vk::ImageSubresourceRange {
        aspect_mask,
        base_mip_level: 0,
        level_count: vk::REMAINING_MIP_LEVELS,
        base_array_layer: 0,
        layer_count: vk::REMAINING_ARRAY_LAYERS,
    };
    let pre = vk::ImageMemoryBarrier::builder()
        .src_access_mask(tracked_access)
        .dst_access_mask(vk::AccessFlags::TRANSFER_WRITE)
        .old_layout(tracked_layout)
        .new_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(range)
        .build();
    let post = vk::ImageMemoryBarrier::builder()
        .src_access_mask(vk::AccessFlags::TRANSFER_WRITE)
        .dst_access_mask(tracked_access)
        .old_layout(vk::ImageLayout::TRANSFER_DST_OPTIMAL)
        .new_layout(tracked_layout)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(range)
        .build();
    [pre, post]
}

/// Records into a primary command buffer allocated from its own pool. Submission to a
/// queue stays with the application.
pub struct KilnGraphicsContextVulkan {
    device_context: KilnDeviceContextVulkan,
    command_pool: vk::CommandPool,
    command_buffer: vk::CommandBuffer,
    // Set when a root signature or pipeline is bound, needed to bind descriptor sets
    bound_pipeline_layout: vk::PipelineLayout,
    bound_bind_point: vk::PipelineBindPoint,
}

impl std::fmt::Debug for KilnGraphicsContextVulkan {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        f.debug_struct("KilnGraphicsContextVulkan")
            .field("command_buffer", &self.command_buffer)
            .finish()
    }
}

impl Drop for KilnGraphicsContextVulkan {
    fn drop(&mut self) {
        unsafe {
            self.device_context
                .inner
                .device
                .destroy_command_pool(self.command_pool, None);
        }
    }
}

impl KilnGraphicsContextVulkan {
    pub(crate) fn new(device_context: &KilnDeviceContextVulkan) -> KilnResult<Self> {
        let device = &device_context.inner.device;

        let pool_create_info = vk::CommandPoolCreateInfo::builder()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(device_context.inner.queue_family_index);
        let command_pool = unsafe { device.create_command_pool(&pool_create_info, None)? };

        let allocate_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        let command_buffer = match unsafe { device.allocate_command_buffers(&allocate_info) } {
            Ok(buffers) => buffers[0],
            Err(e) => {
                unsafe {
                    device.destroy_command_pool(command_pool, None);
                }
                return Err(e)?;
            }
        };

        Ok(KilnGraphicsContextVulkan {
            device_context: device_context.clone(),
            command_pool,
            command_buffer,
            bound_pipeline_layout: vk::PipelineLayout::null(),
            bound_bind_point: vk::PipelineBindPoint::GRAPHICS,
        })
    }

    pub fn vk_command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    fn device(&self) -> &ash::Device {
        &self.device_context.inner.device
    }

    pub(crate) fn begin(&mut self) -> KilnResult<()> {
        let begin_info = vk::CommandBufferBeginInfo::builder()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        unsafe {
            self.device().reset_command_buffer(
                self.command_buffer,
                vk::CommandBufferResetFlags::empty(),
            )?;
            self.device()
                .begin_command_buffer(self.command_buffer, &begin_info)?;
        }
        self.bound_pipeline_layout = vk::PipelineLayout::null();
        Ok(())
    }

    pub(crate) fn end(&mut self) -> KilnResult<()> {
        unsafe {
            self.device().end_command_buffer(self.command_buffer)?;
        }
        Ok(())
    }

    pub(crate) fn submit_barriers(
        &mut self,
        texture_barriers: &[KilnTextureBarrier],
        buffer_barriers: &[KilnBufferBarrier],
    ) -> KilnResult<()> {
        let mut image_barriers = Vec::with_capacity(texture_barriers.len());
        for barrier in texture_barriers {
            let texture = barrier
                .texture
                .vk_texture()
                .ok_or("texture was not created by this device context")?;
            image_barriers.push(
                vk::ImageMemoryBarrier::builder()
                    .src_access_mask(util::resource_state_to_access_flags(barrier.src_state))
                    .dst_access_mask(util::resource_state_to_access_flags(barrier.dst_state))
                    .old_layout(util::resource_state_to_image_layout(barrier.src_state))
                    .new_layout(util::resource_state_to_image_layout(barrier.dst_state))
                    .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .image(texture.vk_image())
                    .subresource_range(vk::ImageSubresourceRange {
                        aspect_mask: texture.vk_aspect_mask(),
                        base_mip_level: 0,
                        level_count: vk::REMAINING_MIP_LEVELS,
                        base_array_layer: 0,
                        layer_count: vk::REMAINING_ARRAY_LAYERS,
                    })
                    .build(),
            );
        }

        let mut memory_barriers = Vec::with_capacity(buffer_barriers.len());
        for barrier in buffer_barriers {
            let buffer = barrier
                .buffer
                .vk_buffer()
                .ok_or("buffer was not created by this device context")?;
            memory_barriers.push(
                vk::BufferMemoryBarrier::builder()
                    .src_access_mask(util::resource_state_to_access_flags(barrier.src_state))
                    .dst_access_mask(util::resource_state_to_access_flags(barrier.dst_state))
                    .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
                    .buffer(buffer.vk_buffer())
                    .offset(0)
                    .size(vk::WHOLE_SIZE)
                    .build(),
            );
        }

        log::trace!(
            "submitting barrier batch, {} image and {} buffer barriers",
            image_barriers.len(),
            memory_barriers.len()
        );

        unsafe {
            self.device().cmd_pipeline_barrier(
                self.command_buffer,
                vk::PipelineStageFlags::ALL_COMMANDS,
                vk::PipelineStageFlags::ALL_COMMANDS,
                vk::DependencyFlags::empty(),
                &[],
                &memory_barriers,
                &image_barriers,
            );
        }
        Ok(())
    }

    unsafe fn cmd_single_image_barrier(
        &self,
        barrier: vk::ImageMemoryBarrier,
    ) {
        self.device().cmd_pipeline_barrier(
            self.command_buffer,
            vk::PipelineStageFlags::ALL_COMMANDS,
            vk::PipelineStageFlags::ALL_COMMANDS,
            vk::DependencyFlags::empty(),
            &[],
            &[],
            &[barrier],
        );
    }

    pub(crate) fn begin_render_pass(
        &mut self,
        framebuffer: &KilnFrameBuffer,
        clear_values: &KilnClearValues,
    ) -> KilnResult<()> {
        let mut color_attachments = Vec::with_capacity(framebuffer.color_attachment_count());
        for index in 0..framebuffer.color_attachment_count() {
            // Slots [0..count) are contiguous after finalize
            let texture = framebuffer.get_color_buffer(index).unwrap();
            let texture = texture
                .vk_texture()
                .ok_or("texture was not created by this device context")?;

            let clear_value = clear_values
                .colors
                .get(index)
                .map(|c| vk::ClearValue {
                    color: vk::ClearColorValue { float32: c.0 },
                })
                .unwrap_or_default();

            color_attachments.push(
                vk::RenderingAttachmentInfo::builder()
                    .image_view(texture.vk_render_target_view())
                    .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
                    .load_op(vk::AttachmentLoadOp::CLEAR)
                    .store_op(vk::AttachmentStoreOp::STORE)
                    .clear_value(clear_value)
                    .build(),
            );
        }

        let depth_attachment = if let Some(texture) = framebuffer.get_depth_buffer() {
            let texture = texture
                .vk_texture()
                .ok_or("texture was not created by this device context")?;
            let clear_value = clear_values.depth_stencil.unwrap_or_default();
            Some(
                vk::RenderingAttachmentInfo::builder()
                    .image_view(texture.vk_render_target_view())
                    .image_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL)
                    .load_op(vk::AttachmentLoadOp::CLEAR)
                    .store_op(vk::AttachmentStoreOp::STORE)
                    .clear_value(vk::ClearValue {
                        depth_stencil: vk::ClearDepthStencilValue {
                            depth: clear_value.depth,
                            stencil: clear_value.stencil,
                        },
                    })
                    .build(),
            )
        } else {
            None
        };

        let render_area = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent: vk::Extent2D {
                width: framebuffer.width(),
                height: framebuffer.height(),
            },
        };

        let mut rendering_info = vk::RenderingInfo::builder()
            .render_area(render_area)
            .layer_count(1)
            .color_attachments(&color_attachments);
        if let Some(depth_attachment) = &depth_attachment {
            rendering_info = rendering_info.depth_attachment(depth_attachment);
        }

        unsafe {
            self.device()
                .cmd_begin_rendering(self.command_buffer, &rendering_info);
        }
        Ok(())
    }

    pub(crate) fn end_render_pass(&mut self) -> KilnResult<()> {
        unsafe {
            self.device().cmd_end_rendering(self.command_buffer);
        }
        Ok(())
    }

    pub(crate) fn bind_root_signature(
        &mut self,
        root_signature: &KilnRootSignature,
    ) -> KilnResult<()> {
        let signature = root_signature
            .vk_root_signature()
            .ok_or("root signature was not created by this device context")?;
        self.bound_pipeline_layout = signature.vk_pipeline_layout();
        Ok(())
    }

    pub(crate) fn bind_pipeline(
        &mut self,
        pipeline: &KilnPipeline,
    ) -> KilnResult<()> {
        let vk_pipeline = pipeline
            .vk_pipeline()
            .ok_or("pipeline was not created by this device context")?;

        self.bound_bind_point = match pipeline.pipeline_type() {
            KilnPipelineType::Graphics => vk::PipelineBindPoint::GRAPHICS,
            KilnPipelineType::Compute => vk::PipelineBindPoint::COMPUTE,
        };

        unsafe {
            self.device().cmd_bind_pipeline(
                self.command_buffer,
                self.bound_bind_point,
                vk_pipeline.vk_pipeline(),
            );
        }
        Ok(())
    }

    pub(crate) fn bind_resource_set(
        &mut self,
        resource_set: &KilnResourceSet,
    ) -> KilnResult<()> {
        assert_ne!(
            self.bound_pipeline_layout,
            vk::PipelineLayout::null(),
            "a root signature or pipeline must be bound before resource sets"
        );

        let storage = match resource_set.storage() {
            crate::resource_set::KilnResourceSetStorage::Vk(inner) => inner,
            _ => Err("resource set was not created by this device context")?,
        };

        let dynamic_offsets: Vec<u32> = resource_set
            .dynamic_offset()
            .map(|offset| vec![offset as u32])
            .unwrap_or_default();

        unsafe {
            self.device().cmd_bind_descriptor_sets(
                self.command_buffer,
                self.bound_bind_point,
                self.bound_pipeline_layout,
                storage.first_param(),
                storage.vk_descriptor_sets(),
                &dynamic_offsets,
            );
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
            .vk_buffer()
            .ok_or("buffer was not created by this device context")?;
        unsafe {
            self.device().cmd_bind_vertex_buffers(
                self.command_buffer,
                binding,
                &[buffer.vk_buffer()],
                &[byte_offset],
            );
        }
        Ok(())
    }

    pub(crate) fn bind_index_buffer(
        &mut self,
        buffer: &KilnBuffer,
        byte_offset: u64,
        index_type: KilnIndexType,
    ) -> KilnResult<()> {
        let buffer = buffer
            .vk_buffer()
            .ok_or("buffer was not created by this device context")?;
        unsafe {
            self.device().cmd_bind_index_buffer(
                self.command_buffer,
                buffer.vk_buffer(),
                byte_offset,
                util::index_type_to_vk(index_type),
            );
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
        let viewport = vk::Viewport {
            x: x as f32,
            y: y as f32,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let scissor = vk::Rect2D {
            offset: vk::Offset2D {
                x: x as i32,
                y: y as i32,
            },
            extent: vk::Extent2D { width, height },
        };
        unsafe {
            self.device()
                .cmd_set_viewport(self.command_buffer, 0, &[viewport]);
            self.device()
                .cmd_set_scissor(self.command_buffer, 0, &[scissor]);
        }
        Ok(())
    }

    pub(crate) fn draw(
        &mut self,
        vertex_count: u32,
        first_vertex: u32,
    ) -> KilnResult<()> {
        unsafe {
            self.device()
                .cmd_draw(self.command_buffer, vertex_count, 1, first_vertex, 0);
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
            self.device().cmd_draw_indexed(
                self.command_buffer,
                index_count,
                1,
                first_index,
                vertex_offset,
                0,
            );
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
            self.device().cmd_dispatch(
                self.command_buffer,
                group_count_x,
                group_count_y,
                group_count_z,
            );
        }
        Ok(())
    }

    pub(crate) fn clear_color(
        &mut self,
        texture: &KilnTexture,
        rgba: [f32; 4],
    ) -> KilnResult<()> {
        let state = texture.tracked_state();
        let texture = texture
            .vk_texture()
            .ok_or("texture was not created by this device context")?;
        let clear_value = vk::ClearColorValue { float32: rgba };
        let range = vk::ImageSubresourceRange {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            base_mip_level: 0,
            level_count: vk::REMAINING_MIP_LEVELS,
            base_array_layer: 0,
            layer_count: vk::REMAINING_ARRAY_LAYERS,
        };
        let [pre_barrier, post_barrier] =
            clear_transition_barriers(texture.vk_image(), vk::ImageAspectFlags::COLOR, state);
        unsafe {
            self.cmd_single_image_barrier(pre_barrier);
            self.device().cmd_clear_color_image(
                self.command_buffer,
                texture.vk_image(),
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &clear_value,
                &[range],
            );
            self.cmd_single_image_barrier(post_barrier);
        }
        Ok(())
    }

    pub(crate) fn clear_depth(
        &mut self,
        texture: &KilnTexture,
        depth: f32,
        stencil: u32,
    ) -> KilnResult<()> {
        let state = texture.tracked_state();
        let vk_texture = texture
            .vk_texture()
            .ok_or("texture was not created by this device context")?;
        let clear_value = vk::ClearDepthStencilValue { depth, stencil };
        let range = vk::ImageSubresourceRange {
            aspect_mask: vk_texture.vk_aspect_mask(),
            base_mip_level: 0,
            level_count: vk::REMAINING_MIP_LEVELS,
            base_array_layer: 0,
            layer_count: vk::REMAINING_ARRAY_LAYERS,
        };
        let [pre_barrier, post_barrier] = clear_transition_barriers(
            vk_texture.vk_image(),
            vk_texture.vk_aspect_mask(),
            state,
        );
        unsafe {
            self.cmd_single_image_barrier(pre_barrier);
            self.device().cmd_clear_depth_stencil_image(
                self.command_buffer,
                vk_texture.vk_image(),
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &clear_value,
                &[range],
            );
            self.cmd_single_image_barrier(post_barrier);
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

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn explicit_clears_run_in_transfer_dst_layout() {
        // Clearing a render target must not record the clear against the attachment
        // layout, only GENERAL and TRANSFER_DST_OPTIMAL are valid for the clear
        // commands
        let [pre, post] = clear_transition_barriers(
            vk::Image::null(),
            vk::ImageAspectFlags::COLOR,
            KilnResourceState::RENDER_TARGET,
        );
        assert_eq!(pre.old_layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
        assert_eq!(pre.new_layout, vk::ImageLayout::TRANSFER_DST_OPTIMAL);
        assert_eq!(pre.dst_access_mask, vk::AccessFlags::TRANSFER_WRITE);
        assert_eq!(post.old_layout, vk::ImageLayout::TRANSFER_DST_OPTIMAL);
        assert_eq!(post.new_layout, vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);
    }

    #[test]
    fn depth_clears_restore_the_depth_attachment_layout() {
        let [pre, post] = clear_transition_barriers(
            vk::Image::null(),
            vk::ImageAspectFlags::DEPTH,
            KilnResourceState::DEPTH_WRITE,
        );
        assert_eq!(
            pre.old_layout,
            vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
        );
        assert_eq!(pre.new_layout, vk::ImageLayout::TRANSFER_DST_OPTIMAL);
        assert_eq!(
            post.new_layout,
            vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
        );
        assert_eq!(post.src_access_mask, vk::AccessFlags::TRANSFER_WRITE);
    }
}
