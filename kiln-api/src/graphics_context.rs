#[cfg(feature = "kiln-dx12")]
use crate::dx12::KilnGraphicsContextDx12;
use crate::null::KilnGraphicsContextNull;
#[cfg(feature = "kiln-vulkan")]
use crate::vulkan::KilnGraphicsContextVulkan;
use crate::{
    KilnBuffer, KilnBufferBarrier, KilnClearValues, KilnComputePso, KilnDeviceContext,
    KilnFrameBuffer, KilnGraphicsPso, KilnIndexType, KilnPipeline, KilnPipelineType,
    KilnResourceSet, KilnResourceState, KilnResourceType, KilnResult, KilnRootSignature,
    KilnTexture, KilnTextureBarrier,
};

#[derive(Debug)]
pub(crate) enum KilnGraphicsContextBackend {
    Null(KilnGraphicsContextNull),
    #[cfg(feature = "kiln-vulkan")]
    Vk(KilnGraphicsContextVulkan),
    #[cfg(feature = "kiln-dx12")]
    Dx12(KilnGraphicsContextDx12),
}

macro_rules! backend_dispatch {
    ($self:ident, $inner:ident => $body:expr) => {
        match &mut $self.backend {
            KilnGraphicsContextBackend::Null($inner) => $body,
            #[cfg(feature = "kiln-vulkan")]
            KilnGraphicsContextBackend::Vk($inner) => $body,
            #[cfg(feature = "kiln-dx12")]
            KilnGraphicsContextBackend::Dx12($inner) => $body,
        }
    };
}

#[derive(Debug)]
enum PendingResource {
    Texture(KilnTexture),
    Buffer(KilnBuffer),
}

#[derive(Debug)]
struct PendingTransition {
    resource: PendingResource,
    src_state: KilnResourceState,
    dst_state: KilnResourceState,
}

/// The single-threaded recording surface. Wraps one backend command list and owns
/// resource state transitions for everything recorded through it. No internal locking,
/// one context is used from one thread at a time.
#[derive(Debug)]
pub struct KilnGraphicsContext {
    device_context: KilnDeviceContext,
    backend: KilnGraphicsContextBackend,
    recording: bool,
    active_render_pass: bool,
    bound_signature: Option<KilnRootSignature>,
    bound_pipeline_type: Option<KilnPipelineType>,
    pending_transitions: Vec<PendingTransition>,
}

impl KilnGraphicsContext {
    pub(crate) fn new(device_context: &KilnDeviceContext) -> KilnResult<Self> {
        let backend = match device_context {
            KilnDeviceContext::Null(inner) => {
                KilnGraphicsContextBackend::Null(inner.create_graphics_context_backend()?)
            }
            #[cfg(feature = "kiln-vulkan")]
            KilnDeviceContext::Vk(inner) => {
                KilnGraphicsContextBackend::Vk(inner.create_graphics_context_backend()?)
            }
            #[cfg(feature = "kiln-dx12")]
            KilnDeviceContext::Dx12(inner) => {
                KilnGraphicsContextBackend::Dx12(inner.create_graphics_context_backend()?)
            }
        };

        Ok(KilnGraphicsContext {
            device_context: device_context.clone(),
            backend,
            recording: false,
            active_render_pass: false,
            bound_signature: None,
            bound_pipeline_type: None,
            pending_transitions: Vec::new(),
        })
    }

    pub fn device_context(&self) -> &KilnDeviceContext {
        &self.device_context
    }

    pub fn begin(&mut self) -> KilnResult<()> {
        assert!(!self.recording, "graphics context is already recording");
        backend_dispatch!(self, inner => inner.begin())?;
        self.recording = true;
        self.bound_signature = None;
        self.bound_pipeline_type = None;
        Ok(())
    }

    pub fn end(&mut self) -> KilnResult<()> {
        assert!(self.recording, "graphics context is not recording");
        assert!(
            !self.active_render_pass,
            "render pass is still active, call end_render_pass first"
        );
        assert!(
            self.pending_transitions.is_empty(),
            "deferred barriers were recorded but never flushed"
        );
        backend_dispatch!(self, inner => inner.end())?;
        self.recording = false;
        Ok(())
    }

    fn assert_recording(&self) {
        assert!(self.recording, "graphics context is not recording");
    }

    /// Transitions a texture to `dst_state`. With `immediate` the barrier is issued on
    /// the spot, otherwise it is held until [`flush_resource_barriers`]
    /// (Self::flush_resource_barriers) submits every held barrier as one batch. Already
    /// being in `dst_state` is a no-op either way.
    pub fn transition_texture(
        &mut self,
        texture: &KilnTexture,
        dst_state: KilnResourceState,
        immediate: bool,
    ) -> KilnResult<()> {
        self.assert_recording();
        assert!(
            !self.active_render_pass,
            "resource barriers are not allowed inside a render pass"
        );

        let src_state = texture.tracked_state();
        assert!(
            !src_state.intersects(KilnResourceState::TRANSITIONING),
            "texture already has a pending deferred barrier"
        );

        if src_state == dst_state {
            return Ok(());
        }

        if immediate {
            let barrier = KilnTextureBarrier::state_transition(texture, src_state, dst_state);
            backend_dispatch!(self, inner => inner.submit_barriers(&[barrier], &[]))?;
            texture.set_tracked_state(dst_state);
        } else {
            self.pending_transitions.push(PendingTransition {
                resource: PendingResource::Texture(texture.clone()),
                src_state,
                dst_state,
            });
            texture.set_tracked_state(KilnResourceState::TRANSITIONING);
        }

        Ok(())
    }

    /// Buffer version of [`transition_texture`](Self::transition_texture)
    pub fn transition_buffer(
        &mut self,
        buffer: &KilnBuffer,
        dst_state: KilnResourceState,
        immediate: bool,
    ) -> KilnResult<()> {
        self.assert_recording();
        assert!(
            !self.active_render_pass,
            "resource barriers are not allowed inside a render pass"
        );

        let src_state = buffer.tracked_state();
        assert!(
            !src_state.intersects(KilnResourceState::TRANSITIONING),
            "buffer already has a pending deferred barrier"
        );

        if src_state == dst_state {
            return Ok(());
        }

        if immediate {
            let barrier = KilnBufferBarrier::state_transition(buffer, src_state, dst_state);
            backend_dispatch!(self, inner => inner.submit_barriers(&[], &[barrier]))?;
            buffer.set_tracked_state(dst_state);
        } else {
            self.pending_transitions.push(PendingTransition {
                resource: PendingResource::Buffer(buffer.clone()),
                src_state,
                dst_state,
            });
            buffer.set_tracked_state(KilnResourceState::TRANSITIONING);
        }

        Ok(())
    }

    /// Submits every deferred barrier in a single backend call and resolves the
    /// affected resources to their target states. No-op when nothing is pending.
    #[profiling::function]
    pub fn flush_resource_barriers(&mut self) -> KilnResult<()> {
        self.assert_recording();
        if self.pending_transitions.is_empty() {
            return Ok(());
        }

        let pending = std::mem::take(&mut self.pending_transitions);

        let mut texture_barriers = Vec::new();
        let mut buffer_barriers = Vec::new();
        for transition in &pending {
            match &transition.resource {
                PendingResource::Texture(texture) => texture_barriers.push(
                    KilnTextureBarrier::state_transition(
                        texture,
                        transition.src_state,
                        transition.dst_state,
                    ),
                ),
                PendingResource::Buffer(buffer) => buffer_barriers.push(
                    KilnBufferBarrier::state_transition(
                        buffer,
                        transition.src_state,
                        transition.dst_state,
                    ),
                ),
            }
        }

        log::trace!(
            "flushing {} deferred barriers in one batch",
            texture_barriers.len() + buffer_barriers.len()
        );
        backend_dispatch!(self, inner => inner.submit_barriers(&texture_barriers, &buffer_barriers))?;

        for transition in &pending {
            match &transition.resource {
                PendingResource::Texture(texture) => texture.set_tracked_state(transition.dst_state),
                PendingResource::Buffer(buffer) => buffer.set_tracked_state(transition.dst_state),
            }
        }

        Ok(())
    }

    pub fn begin_render_pass(
        &mut self,
        framebuffer: &KilnFrameBuffer,
        clear_values: &KilnClearValues,
    ) -> KilnResult<()> {
        self.assert_recording();
        assert!(!self.active_render_pass, "render pass is already active");
        assert!(
            framebuffer.is_finalized(),
            "framebuffer must be finalized before use"
        );

        for index in 0..framebuffer.color_attachment_count() {
            // Attachment exists, slots are contiguous after finalize
            let texture = framebuffer.get_color_buffer(index).unwrap();
            let state = texture.tracked_state();
            assert!(
                state.intersects(KilnResourceState::RENDER_TARGET),
                "color attachment {} must be in RENDER_TARGET state, tracked state is {:?}",
                index,
                state
            );
        }

        if let Some(texture) = framebuffer.get_depth_buffer() {
            let state = texture.tracked_state();
            assert!(
                state.intersects(KilnResourceState::DEPTH_WRITE),
                "depth attachment must be in DEPTH_WRITE state, tracked state is {:?}",
                state
            );
        }

        assert!(
            clear_values.colors.len() >= framebuffer.color_attachment_count(),
            "a clear value is required for each color attachment"
        );

        backend_dispatch!(self, inner => inner.begin_render_pass(framebuffer, clear_values))?;
        self.active_render_pass = true;
        Ok(())
    }

    pub fn end_render_pass(&mut self) -> KilnResult<()> {
        assert!(self.active_render_pass, "no render pass is active");
        backend_dispatch!(self, inner => inner.end_render_pass())?;
        self.active_render_pass = false;
        Ok(())
    }

    pub fn set_root_signature(
        &mut self,
        root_signature: &KilnRootSignature,
    ) -> KilnResult<()> {
        self.assert_recording();
        backend_dispatch!(self, inner => inner.bind_root_signature(root_signature))?;
        self.bound_signature = Some(root_signature.clone());
        Ok(())
    }

    fn bind_pipeline(
        &mut self,
        pipeline: &KilnPipeline,
    ) -> KilnResult<()> {
        self.assert_recording();
        let bound = self
            .bound_signature
            .as_ref()
            .expect("a root signature must be bound before a pipeline");
        assert!(
            bound == pipeline.root_signature(),
            "pipeline was created against a different root signature than the bound one"
        );

        backend_dispatch!(self, inner => inner.bind_pipeline(pipeline))?;
        self.bound_pipeline_type = Some(pipeline.pipeline_type());
        Ok(())
    }

    /// Binds a finalized graphics PSO. Panics if the PSO is not finalized or was built
    /// against a root signature other than the bound one.
    pub fn set_pipeline_state(
        &mut self,
        pso: &KilnGraphicsPso,
    ) -> KilnResult<()> {
        self.bind_pipeline(pso.pipeline())
    }

    pub fn set_compute_pipeline_state(
        &mut self,
        pso: &KilnComputePso,
    ) -> KilnResult<()> {
        self.bind_pipeline(pso.pipeline())
    }

    /// Binds a resource set, implicitly flushing its pending descriptor writes first
    pub fn set_resources(
        &mut self,
        resource_set: &mut KilnResourceSet,
    ) -> KilnResult<()> {
        self.assert_recording();
        let bound = self
            .bound_signature
            .as_ref()
            .expect("a root signature must be bound before resources");
        assert!(
            bound == resource_set.root_signature(),
            "resource set was created against a different root signature than the bound one"
        );

        resource_set.update()?;
        backend_dispatch!(self, inner => inner.bind_resource_set(resource_set))
    }

    pub fn set_vertex_buffer(
        &mut self,
        binding: u32,
        buffer: &KilnBuffer,
        byte_offset: u64,
    ) -> KilnResult<()> {
        self.assert_recording();
        assert!(
            buffer
                .buffer_def()
                .resource_type
                .intersects(KilnResourceType::VERTEX_BUFFER),
            "buffer was not created with VERTEX_BUFFER usage"
        );
        assert!(
            !buffer
                .tracked_state()
                .intersects(KilnResourceState::TRANSITIONING),
            "buffer has a pending deferred barrier, flush barriers before binding it"
        );
        backend_dispatch!(self, inner => inner.bind_vertex_buffer(binding, buffer, byte_offset))
    }

    pub fn set_index_buffer(
        &mut self,
        buffer: &KilnBuffer,
        byte_offset: u64,
        index_type: KilnIndexType,
    ) -> KilnResult<()> {
        self.assert_recording();
        assert!(
            buffer
                .buffer_def()
                .resource_type
                .intersects(KilnResourceType::INDEX_BUFFER),
            "buffer was not created with INDEX_BUFFER usage"
        );
        assert!(
            !buffer
                .tracked_state()
                .intersects(KilnResourceState::TRANSITIONING),
            "buffer has a pending deferred barrier, flush barriers before binding it"
        );
        backend_dispatch!(self, inner => inner.bind_index_buffer(buffer, byte_offset, index_type))
    }

    pub fn set_viewport_and_scissor(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> KilnResult<()> {
        self.assert_recording();
        backend_dispatch!(self, inner => inner.set_viewport_and_scissor(x, y, width, height))
    }

    pub fn draw(
        &mut self,
        vertex_count: u32,
        first_vertex: u32,
    ) -> KilnResult<()> {
        assert!(self.active_render_pass, "draws require an active render pass");
        assert_eq!(
            self.bound_pipeline_type,
            Some(KilnPipelineType::Graphics),
            "draws require a bound graphics pipeline"
        );
        backend_dispatch!(self, inner => inner.draw(vertex_count, first_vertex))
    }

    pub fn draw_indexed(
        &mut self,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    ) -> KilnResult<()> {
        assert!(self.active_render_pass, "draws require an active render pass");
        assert_eq!(
            self.bound_pipeline_type,
            Some(KilnPipelineType::Graphics),
            "draws require a bound graphics pipeline"
        );
        backend_dispatch!(self, inner => inner.draw_indexed(index_count, first_index, vertex_offset))
    }

    pub fn dispatch(
        &mut self,
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32,
    ) -> KilnResult<()> {
        self.assert_recording();
        assert!(
            !self.active_render_pass,
            "dispatches are not allowed inside a render pass"
        );
        assert_eq!(
            self.bound_pipeline_type,
            Some(KilnPipelineType::Compute),
            "dispatches require a bound compute pipeline"
        );
        backend_dispatch!(self, inner => inner.dispatch(group_count_x, group_count_y, group_count_z))
    }

    pub fn clear_color(
        &mut self,
        texture: &KilnTexture,
        rgba: [f32; 4],
    ) -> KilnResult<()> {
        self.assert_recording();
        assert!(
            !self.active_render_pass,
            "explicit clears are not allowed inside a render pass"
        );
        assert!(
            texture
                .tracked_state()
                .intersects(KilnResourceState::RENDER_TARGET),
            "texture must be in RENDER_TARGET state to clear"
        );
        backend_dispatch!(self, inner => inner.clear_color(texture, rgba))
    }

    pub fn clear_depth(
        &mut self,
        texture: &KilnTexture,
        depth: f32,
        stencil: u32,
    ) -> KilnResult<()> {
        self.assert_recording();
        assert!(
            !self.active_render_pass,
            "explicit clears are not allowed inside a render pass"
        );
        assert!(
            texture
                .tracked_state()
                .intersects(KilnResourceState::DEPTH_WRITE),
            "texture must be in DEPTH_WRITE state to clear"
        );
        backend_dispatch!(self, inner => inner.clear_depth(texture, depth, stencil))
    }

    /// Hands a texture off for presentation. The texture must have been transitioned to
    /// `PRESENT` first, anything else is the error the platform validation layers would
    /// report at queue present time.
    pub fn present(
        &mut self,
        texture: &KilnTexture,
    ) -> KilnResult<()> {
        let state = texture.tracked_state();
        if state != KilnResourceState::PRESENT {
            log::error!(
                "texture {} presented in state {:?}, expected PRESENT",
                texture.texture_id(),
                state
            );
            return Err(format!(
                "texture must be in PRESENT state to present, tracked state is {:?}",
                state
            ))?;
        }

        backend_dispatch!(self, inner => inner.present(texture))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{KilnBufferDef, KilnExtents3D, KilnFormat, KilnTextureDef};

    fn sampled_texture(device_context: &KilnDeviceContext) -> KilnTexture {
        device_context
            .create_texture(&KilnTextureDef {
                extents: KilnExtents3D {
                    width: 16,
                    height: 16,
                    depth: 1,
                },
                format: KilnFormat::R8G8B8A8Unorm,
                ..Default::default()
            })
            .unwrap()
    }

    fn color_target(device_context: &KilnDeviceContext) -> KilnTexture {
        device_context
            .create_texture(&KilnTextureDef {
                extents: KilnExtents3D {
                    width: 16,
                    height: 16,
                    depth: 1,
                },
                format: KilnFormat::R8G8B8A8Unorm,
                resource_type: KilnResourceType::RENDER_TARGET_COLOR,
                ..Default::default()
            })
            .unwrap()
    }

    fn structured_buffer(device_context: &KilnDeviceContext) -> KilnBuffer {
        device_context
            .create_buffer(&KilnBufferDef::for_structured_buffer(16, 64, false))
            .unwrap()
    }

    #[test]
    fn immediate_transitions_submit_on_the_spot() {
        let device_context = KilnDeviceContext::new_null();
        let mut context = device_context.create_graphics_context().unwrap();
        let texture = sampled_texture(&device_context);

        context.begin().unwrap();
        context
            .transition_texture(&texture, KilnResourceState::SHADER_RESOURCE, true)
            .unwrap();
        context.end().unwrap();

        assert_eq!(texture.tracked_state(), KilnResourceState::SHADER_RESOURCE);
        let null = device_context.null_device_context().unwrap();
        assert_eq!(null.barrier_batch_count(), 1);
        assert_eq!(null.barrier_count(), 1);
    }

    #[test]
    fn deferred_transitions_flush_as_one_batch() {
        let device_context = KilnDeviceContext::new_null();
        let mut context = device_context.create_graphics_context().unwrap();
        let texture = sampled_texture(&device_context);
        let buffer = structured_buffer(&device_context);

        context.begin().unwrap();
        context
            .transition_texture(&texture, KilnResourceState::SHADER_RESOURCE, false)
            .unwrap();
        context
            .transition_buffer(&buffer, KilnResourceState::SHADER_RESOURCE, false)
            .unwrap();

        // Held barriers mark the resources in flight until the flush resolves them
        assert_eq!(texture.tracked_state(), KilnResourceState::TRANSITIONING);
        assert_eq!(buffer.tracked_state(), KilnResourceState::TRANSITIONING);
        let null = device_context.null_device_context().unwrap();
        assert_eq!(null.barrier_batch_count(), 0);

        context.flush_resource_barriers().unwrap();
        context.end().unwrap();

        assert_eq!(texture.tracked_state(), KilnResourceState::SHADER_RESOURCE);
        assert_eq!(buffer.tracked_state(), KilnResourceState::SHADER_RESOURCE);
        assert_eq!(null.barrier_batch_count(), 1);
        assert_eq!(null.barrier_count(), 2);
    }

    #[test]
    fn transition_to_the_current_state_is_a_no_op() {
        let device_context = KilnDeviceContext::new_null();
        let mut context = device_context.create_graphics_context().unwrap();
        let buffer = structured_buffer(&device_context);
        assert_eq!(buffer.tracked_state(), KilnResourceState::COMMON);

        context.begin().unwrap();
        context
            .transition_buffer(&buffer, KilnResourceState::COMMON, true)
            .unwrap();
        context
            .transition_buffer(&buffer, KilnResourceState::COMMON, false)
            .unwrap();
        context.end().unwrap();

        let null = device_context.null_device_context().unwrap();
        assert_eq!(null.barrier_batch_count(), 0);
    }

    #[test]
    fn present_requires_the_present_state() {
        let device_context = KilnDeviceContext::new_null();
        let mut context = device_context.create_graphics_context().unwrap();
        let texture = color_target(&device_context);

        context.begin().unwrap();
        assert!(context.present(&texture).is_err());

        context
            .transition_texture(&texture, KilnResourceState::PRESENT, true)
            .unwrap();
        context.present(&texture).unwrap();
        context.end().unwrap();
    }

    #[test]
    fn render_pass_runs_against_a_finalized_framebuffer() {
        let device_context = KilnDeviceContext::new_null();
        let mut context = device_context.create_graphics_context().unwrap();

        // Render targets start tracked in RENDER_TARGET state
        let target = color_target(&device_context);
        let mut framebuffer = KilnFrameBuffer::new();
        framebuffer.set_color_buffer(0, &target);
        framebuffer.finalize(&device_context).unwrap();

        let clear_values = KilnClearValues {
            colors: vec![Default::default()],
            depth_stencil: None,
        };

        context.begin().unwrap();
        context.clear_color(&target, [0.0, 0.0, 0.0, 1.0]).unwrap();
        context.begin_render_pass(&framebuffer, &clear_values).unwrap();
        context.end_render_pass().unwrap();
        context.end().unwrap();
    }

    #[test]
    #[should_panic(expected = "a clear value is required for each color attachment")]
    fn render_pass_requires_a_clear_value_per_attachment() {
        let device_context = KilnDeviceContext::new_null();
        let mut context = device_context.create_graphics_context().unwrap();

        let mut framebuffer = KilnFrameBuffer::new();
        framebuffer.set_color_buffer(0, &color_target(&device_context));
        framebuffer.finalize(&device_context).unwrap();

        context.begin().unwrap();
        let _ = context.begin_render_pass(&framebuffer, &KilnClearValues::default());
    }

    #[test]
    #[should_panic(expected = "resource barriers are not allowed inside a render pass")]
    fn barriers_inside_a_render_pass_panic() {
        let device_context = KilnDeviceContext::new_null();
        let mut context = device_context.create_graphics_context().unwrap();

        let mut framebuffer = KilnFrameBuffer::new();
        framebuffer.set_color_buffer(0, &color_target(&device_context));
        framebuffer.finalize(&device_context).unwrap();

        let clear_values = KilnClearValues {
            colors: vec![Default::default()],
            depth_stencil: None,
        };

        context.begin().unwrap();
        context.begin_render_pass(&framebuffer, &clear_values).unwrap();
        let _ = context.transition_texture(
            &sampled_texture(&device_context),
            KilnResourceState::SHADER_RESOURCE,
            true,
        );
    }

    #[test]
    #[should_panic(expected = "deferred barriers were recorded but never flushed")]
    fn ending_with_held_barriers_panics() {
        let device_context = KilnDeviceContext::new_null();
        let mut context = device_context.create_graphics_context().unwrap();

        context.begin().unwrap();
        context
            .transition_texture(
                &sampled_texture(&device_context),
                KilnResourceState::SHADER_RESOURCE,
                false,
            )
            .unwrap();
        let _ = context.end();
    }

    #[test]
    #[should_panic(expected = "texture must be in RENDER_TARGET state to clear")]
    fn clearing_a_non_render_target_state_panics() {
        let device_context = KilnDeviceContext::new_null();
        let mut context = device_context.create_graphics_context().unwrap();
        let target = color_target(&device_context);

        context.begin().unwrap();
        context
            .transition_texture(&target, KilnResourceState::SHADER_RESOURCE, true)
            .unwrap();
        let _ = context.clear_color(&target, [0.0; 4]);
    }

    #[test]
    #[should_panic(expected = "draws require a bound graphics pipeline")]
    fn draws_without_a_pipeline_panic() {
        let device_context = KilnDeviceContext::new_null();
        let mut context = device_context.create_graphics_context().unwrap();

        let mut framebuffer = KilnFrameBuffer::new();
        framebuffer.set_color_buffer(0, &color_target(&device_context));
        framebuffer.finalize(&device_context).unwrap();

        let clear_values = KilnClearValues {
            colors: vec![Default::default()],
            depth_stencil: None,
        };

        context.begin().unwrap();
        context.begin_render_pass(&framebuffer, &clear_values).unwrap();
        let _ = context.draw(3, 0);
    }
}
