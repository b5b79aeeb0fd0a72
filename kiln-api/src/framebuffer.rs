use crate::{
    KilnDeviceContext, KilnResourceType, KilnResult, KilnSampleCount, KilnTexture,
    MAX_COLOR_ATTACHMENTS,
};

#[derive(Debug)]
struct FinalizedState {
    width: u32,
    height: u32,
    sample_count: KilnSampleCount,
    imageless: bool,
}

/// A set of render target attachments. Attachments are assigned with the setters, then
/// `finalize` validates them as a group. Dimension or sample count mismatches are
/// reported as errors rather than silently resolved. Setters panic after finalize.
#[derive(Debug)]
pub struct KilnFrameBuffer {
    color_attachments: Vec<Option<KilnTexture>>,
    depth_attachment: Option<KilnTexture>,
    imageless_requested: bool,
    finalized: Option<FinalizedState>,
}

impl Default for KilnFrameBuffer {
    fn default() -> Self {
        KilnFrameBuffer {
            color_attachments: (0..MAX_COLOR_ATTACHMENTS).map(|_| None).collect(),
            depth_attachment: None,
            imageless_requested: false,
            finalized: None,
        }
    }
}

impl KilnFrameBuffer {
    pub fn new() -> Self {
        Default::default()
    }

    fn assert_mutable(&self) {
        assert!(
            self.finalized.is_none(),
            "framebuffer is finalized and can no longer be changed"
        );
    }

    pub fn set_color_buffer(
        &mut self,
        index: usize,
        texture: &KilnTexture,
    ) {
        self.assert_mutable();
        assert!(index < MAX_COLOR_ATTACHMENTS);
        self.color_attachments[index] = Some(texture.clone());
    }

    pub fn set_depth_buffer(
        &mut self,
        texture: &KilnTexture,
    ) {
        self.assert_mutable();
        self.depth_attachment = Some(texture.clone());
    }

    /// Requests deferring physical image binding until render pass begin. Honored only
    /// if the device supports it, otherwise the framebuffer finalizes in the ordinary
    /// imaged mode. Query `is_imageless()` after finalize to see which was used.
    pub fn set_imageless(
        &mut self,
        imageless: bool,
    ) {
        self.assert_mutable();
        self.imageless_requested = imageless;
    }

    pub fn finalize(
        &mut self,
        device_context: &KilnDeviceContext,
    ) -> KilnResult<()> {
        assert!(self.finalized.is_none(), "framebuffer was already finalized");

        let color_count = self.validate_color_slots()?;

        let mut extents: Option<(u32, u32)> = None;
        let mut sample_count: Option<KilnSampleCount> = None;

        for texture in self
            .color_attachments
            .iter()
            .take(color_count)
            .map(|x| x.as_ref().unwrap())
        {
            let def = texture.texture_def();
            if !def
                .resource_type
                .intersects(KilnResourceType::RENDER_TARGET_COLOR)
            {
                return Err(format!(
                    "texture {} is not a color render target",
                    texture.texture_id()
                ))?;
            }

            Self::merge_attachment_properties(
                &mut extents,
                &mut sample_count,
                (def.extents.width, def.extents.height),
                def.sample_count,
            )?;
        }

        if let Some(texture) = &self.depth_attachment {
            let def = texture.texture_def();
            if !def
                .resource_type
                .intersects(KilnResourceType::RENDER_TARGET_DEPTH_STENCIL)
            {
                return Err(format!(
                    "texture {} is not a depth/stencil render target",
                    texture.texture_id()
                ))?;
            }

            Self::merge_attachment_properties(
                &mut extents,
                &mut sample_count,
                (def.extents.width, def.extents.height),
                def.sample_count,
            )?;
        }

        let (width, height) = extents.ok_or("framebuffer has no attachments")?;
        // sample_count is set whenever extents is
        let sample_count = sample_count.unwrap();

        let imageless = self.imageless_requested
            && device_context.device_info().supports_imageless_framebuffer;

        log::trace!(
            "finalized framebuffer {}x{} with {} color attachments, depth: {}, imageless: {}",
            width,
            height,
            color_count,
            self.depth_attachment.is_some(),
            imageless
        );

        self.finalized = Some(FinalizedState {
            width,
            height,
            sample_count,
            imageless,
        });
        Ok(())
    }

    // Color attachments must fill slots [0..n) with no gaps
    fn validate_color_slots(&self) -> KilnResult<usize> {
        let count = self
            .color_attachments
            .iter()
            .position(|x| x.is_none())
            .unwrap_or(MAX_COLOR_ATTACHMENTS);

        for (index, attachment) in self.color_attachments.iter().enumerate().skip(count) {
            if attachment.is_some() {
                return Err(format!(
                    "color attachment {} is set but attachment {} is empty",
                    index, count
                ))?;
            }
        }

        Ok(count)
    }

    fn merge_attachment_properties(
        extents: &mut Option<(u32, u32)>,
        sample_count: &mut Option<KilnSampleCount>,
        attachment_extents: (u32, u32),
        attachment_sample_count: KilnSampleCount,
    ) -> KilnResult<()> {
        if let Some(existing) = *extents {
            if existing != attachment_extents {
                return Err(format!(
                    "attachment dimensions {}x{} do not match framebuffer dimensions {}x{}",
                    attachment_extents.0, attachment_extents.1, existing.0, existing.1
                ))?;
            }
        } else {
            *extents = Some(attachment_extents);
        }

        if let Some(existing) = *sample_count {
            if existing != attachment_sample_count {
                return Err(format!(
                    "attachment sample count {:?} does not match framebuffer sample count {:?}",
                    attachment_sample_count, existing
                ))?;
            }
        } else {
            *sample_count = Some(attachment_sample_count);
        }

        Ok(())
    }

    fn finalized_state(&self) -> &FinalizedState {
        self.finalized
            .as_ref()
            .expect("framebuffer has not been finalized")
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.is_some()
    }

    pub fn width(&self) -> u32 {
        self.finalized_state().width
    }

    pub fn height(&self) -> u32 {
        self.finalized_state().height
    }

    pub fn sample_count(&self) -> KilnSampleCount {
        self.finalized_state().sample_count
    }

    pub fn is_imageless(&self) -> bool {
        self.finalized_state().imageless
    }

    pub fn color_attachment_count(&self) -> usize {
        self.color_attachments.iter().filter(|x| x.is_some()).count()
    }

    pub fn get_color_buffer(
        &self,
        index: usize,
    ) -> Option<&KilnTexture> {
        self.color_attachments[index].as_ref()
    }

    pub fn get_depth_buffer(&self) -> Option<&KilnTexture> {
        self.depth_attachment.as_ref()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{KilnExtents3D, KilnFormat, KilnTextureDef};

    fn target(
        device_context: &KilnDeviceContext,
        width: u32,
        height: u32,
        format: KilnFormat,
        resource_type: KilnResourceType,
        sample_count: KilnSampleCount,
    ) -> KilnTexture {
        device_context
            .create_texture(&KilnTextureDef {
                extents: KilnExtents3D {
                    width,
                    height,
                    depth: 1,
                },
                format,
                resource_type,
                sample_count,
                ..Default::default()
            })
            .unwrap()
    }

    fn color_target(
        device_context: &KilnDeviceContext,
        width: u32,
        height: u32,
    ) -> KilnTexture {
        target(
            device_context,
            width,
            height,
            KilnFormat::R8G8B8A8Unorm,
            KilnResourceType::RENDER_TARGET_COLOR,
            KilnSampleCount::SampleCount1,
        )
    }

    fn depth_target(
        device_context: &KilnDeviceContext,
        width: u32,
        height: u32,
    ) -> KilnTexture {
        target(
            device_context,
            width,
            height,
            KilnFormat::D32Float,
            KilnResourceType::RENDER_TARGET_DEPTH_STENCIL,
            KilnSampleCount::SampleCount1,
        )
    }

    #[test]
    fn finalize_captures_attachment_properties() {
        let device_context = KilnDeviceContext::new_null();
        let mut framebuffer = KilnFrameBuffer::new();
        framebuffer.set_color_buffer(0, &color_target(&device_context, 1920, 1080));
        framebuffer.set_color_buffer(1, &color_target(&device_context, 1920, 1080));
        framebuffer.set_depth_buffer(&depth_target(&device_context, 1920, 1080));

        assert!(!framebuffer.is_finalized());
        framebuffer.finalize(&device_context).unwrap();
        assert!(framebuffer.is_finalized());

        assert_eq!(framebuffer.width(), 1920);
        assert_eq!(framebuffer.height(), 1080);
        assert_eq!(framebuffer.sample_count(), KilnSampleCount::SampleCount1);
        assert_eq!(framebuffer.color_attachment_count(), 2);
        assert!(framebuffer.get_color_buffer(0).is_some());
        assert!(framebuffer.get_color_buffer(2).is_none());
        assert!(framebuffer.get_depth_buffer().is_some());
    }

    #[test]
    fn mismatched_dimensions_are_an_error() {
        let device_context = KilnDeviceContext::new_null();
        let mut framebuffer = KilnFrameBuffer::new();
        framebuffer.set_color_buffer(0, &color_target(&device_context, 1920, 1080));
        framebuffer.set_depth_buffer(&depth_target(&device_context, 1280, 720));
        assert!(framebuffer.finalize(&device_context).is_err());
    }

    #[test]
    fn mismatched_sample_counts_are_an_error() {
        let device_context = KilnDeviceContext::new_null();
        let mut framebuffer = KilnFrameBuffer::new();
        framebuffer.set_color_buffer(0, &color_target(&device_context, 800, 600));
        framebuffer.set_color_buffer(
            1,
            &target(
                &device_context,
                800,
                600,
                KilnFormat::R8G8B8A8Unorm,
                KilnResourceType::RENDER_TARGET_COLOR,
                KilnSampleCount::SampleCount4,
            ),
        );
        assert!(framebuffer.finalize(&device_context).is_err());
    }

    #[test]
    fn gaps_in_color_slots_are_an_error() {
        let device_context = KilnDeviceContext::new_null();
        let mut framebuffer = KilnFrameBuffer::new();
        framebuffer.set_color_buffer(1, &color_target(&device_context, 800, 600));
        assert!(framebuffer.finalize(&device_context).is_err());
    }

    #[test]
    fn empty_framebuffer_is_an_error() {
        let device_context = KilnDeviceContext::new_null();
        let mut framebuffer = KilnFrameBuffer::new();
        assert!(framebuffer.finalize(&device_context).is_err());
    }

    #[test]
    fn attachments_must_carry_render_target_usage() {
        let device_context = KilnDeviceContext::new_null();

        let mut framebuffer = KilnFrameBuffer::new();
        framebuffer.set_color_buffer(
            0,
            &target(
                &device_context,
                64,
                64,
                KilnFormat::R8G8B8A8Unorm,
                KilnResourceType::TEXTURE,
                KilnSampleCount::SampleCount1,
            ),
        );
        assert!(framebuffer.finalize(&device_context).is_err());

        let mut framebuffer = KilnFrameBuffer::new();
        framebuffer.set_color_buffer(0, &color_target(&device_context, 64, 64));
        // A color target is not a valid depth attachment
        framebuffer.set_depth_buffer(&color_target(&device_context, 64, 64));
        assert!(framebuffer.finalize(&device_context).is_err());
    }

    #[test]
    fn imageless_degrades_when_the_device_lacks_support() {
        let device_context = KilnDeviceContext::new_null();
        assert!(!device_context.device_info().supports_imageless_framebuffer);

        let mut framebuffer = KilnFrameBuffer::new();
        framebuffer.set_color_buffer(0, &color_target(&device_context, 64, 64));
        framebuffer.set_imageless(true);
        framebuffer.finalize(&device_context).unwrap();
        assert!(!framebuffer.is_imageless());
    }

    #[test]
    #[should_panic(expected = "framebuffer has not been finalized")]
    fn dimension_queries_panic_before_finalize() {
        let framebuffer = KilnFrameBuffer::new();
        let _ = framebuffer.width();
    }

    #[test]
    #[should_panic(expected = "finalized and can no longer be changed")]
    fn setters_panic_after_finalize() {
        let device_context = KilnDeviceContext::new_null();
        let mut framebuffer = KilnFrameBuffer::new();
        framebuffer.set_color_buffer(0, &color_target(&device_context, 64, 64));
        framebuffer.finalize(&device_context).unwrap();
        framebuffer.set_color_buffer(1, &color_target(&device_context, 64, 64));
    }
}
