use super::KilnDeviceContextNull;
use crate::{
    KilnBuffer, KilnBufferBarrier, KilnClearValues, KilnFrameBuffer, KilnIndexType, KilnPipeline,
    KilnResourceSet, KilnResult, KilnRootSignature, KilnTexture, KilnTextureBarrier,
};

/// Recording surface that records nothing. Counts barrier submissions so batching
/// behavior is observable.
#[derive(Debug)]
pub struct KilnGraphicsContextNull {
    device_context: KilnDeviceContextNull,
}

impl KilnGraphicsContextNull {
    pub(crate) fn new(device_context: &KilnDeviceContextNull) -> Self {
        KilnGraphicsContextNull {
            device_context: device_context.clone(),
        }
    }

    pub(crate) fn begin(&mut self) -> KilnResult<()> {
        Ok(())
    }

    pub(crate) fn end(&mut self) -> KilnResult<()> {
        Ok(())
    }

    pub(crate) fn submit_barriers(
        &mut self,
        texture_barriers: &[KilnTextureBarrier],
        buffer_barriers: &[KilnBufferBarrier],
    ) -> KilnResult<()> {
        self.device_context
            .record_barrier_batch(texture_barriers.len() + buffer_barriers.len());
        Ok(())
    }

    pub(crate) fn begin_render_pass(
        &mut self,
        _framebuffer: &KilnFrameBuffer,
        _clear_values: &KilnClearValues,
    ) -> KilnResult<()> {
        Ok(())
    }

    pub(crate) fn end_render_pass(&mut self) -> KilnResult<()> {
        Ok(())
    }

    pub(crate) fn bind_root_signature(
        &mut self,
        _root_signature: &KilnRootSignature,
    ) -> KilnResult<()> {
        Ok(())
    }

    pub(crate) fn bind_pipeline(
        &mut self,
        _pipeline: &KilnPipeline,
    ) -> KilnResult<()> {
        Ok(())
    }

    pub(crate) fn bind_resource_set(
        &mut self,
        _resource_set: &KilnResourceSet,
    ) -> KilnResult<()> {
        Ok(())
    }

    pub(crate) fn bind_vertex_buffer(
        &mut self,
        _binding: u32,
        _buffer: &KilnBuffer,
        _byte_offset: u64,
    ) -> KilnResult<()> {
        Ok(())
    }

    pub(crate) fn bind_index_buffer(
        &mut self,
        _buffer: &KilnBuffer,
        _byte_offset: u64,
        _index_type: KilnIndexType,
    ) -> KilnResult<()> {
        Ok(())
    }

    pub(crate) fn set_viewport_and_scissor(
        &mut self,
        _x: u32,
        _y: u32,
        _width: u32,
        _height: u32,
    ) -> KilnResult<()> {
        Ok(())
    }

    pub(crate) fn draw(
        &mut self,
        _vertex_count: u32,
        _first_vertex: u32,
    ) -> KilnResult<()> {
        Ok(())
    }

    pub(crate) fn draw_indexed(
        &mut self,
        _index_count: u32,
        _first_index: u32,
        _vertex_offset: i32,
    ) -> KilnResult<()> {
        Ok(())
    }

    pub(crate) fn dispatch(
        &mut self,
        _group_count_x: u32,
        _group_count_y: u32,
        _group_count_z: u32,
    ) -> KilnResult<()> {
        Ok(())
    }

    pub(crate) fn clear_color(
        &mut self,
        _texture: &KilnTexture,
        _rgba: [f32; 4],
    ) -> KilnResult<()> {
        Ok(())
    }

    pub(crate) fn clear_depth(
        &mut self,
        _texture: &KilnTexture,
        _depth: f32,
        _stencil: u32,
    ) -> KilnResult<()> {
        Ok(())
    }

    pub(crate) fn present(
        &mut self,
        _texture: &KilnTexture,
    ) -> KilnResult<()> {
        Ok(())
    }
}
