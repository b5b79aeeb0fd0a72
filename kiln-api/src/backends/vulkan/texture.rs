use super::KilnDeviceContextVulkan;
use crate::internal_shared::TextureCommon;
use crate::{KilnFormat, KilnMemoryUsage, KilnResourceType, KilnResult, KilnTextureDef};
use ash::vk;
use std::sync::Arc;

#[derive(Debug)]
struct KilnTextureVulkanInner {
    device_context: KilnDeviceContextVulkan,
    common: TextureCommon,
    image: vk::Image,
    device_memory: vk::DeviceMemory,
    srv_view: vk::ImageView,
    uav_view: vk::ImageView,
    render_target_view: vk::ImageView,
    aspect_mask: vk::ImageAspectFlags,
}

impl Drop for KilnTextureVulkanInner {
    fn drop(&mut self) {
        let device = &self.device_context.inner.device;
        unsafe {
            if self.srv_view != vk::ImageView::null() {
                device.destroy_image_view(self.srv_view, None);
            }
            if self.uav_view != vk::ImageView::null() {
                device.destroy_image_view(self.uav_view, None);
            }
            if self.render_target_view != vk::ImageView::null() {
                device.destroy_image_view(self.render_target_view, None);
            }
            device.destroy_image(self.image, None);
            device.free_memory(self.device_memory, None);
        }
    }
}

#[derive(Clone, Debug)]
pub struct KilnTextureVulkan {
    inner: Arc<KilnTextureVulkanInner>,
}

impl KilnTextureVulkan {
    pub(crate) fn new(
        device_context: &KilnDeviceContextVulkan,
        texture_def: &KilnTextureDef,
    ) -> KilnResult<Self> {
        texture_def.verify();

        let device = &device_context.inner.device;
        let format = texture_def.format.into_vk();
        if format == vk::Format::UNDEFINED {
            Err(format!(
                "cannot create a vulkan texture with format {:?}",
                texture_def.format
            ))?;
        }

        let mut usage = vk::ImageUsageFlags::TRANSFER_SRC | vk::ImageUsageFlags::TRANSFER_DST;
        if texture_def
            .resource_type
            .intersects(KilnResourceType::TEXTURE)
        {
            usage |= vk::ImageUsageFlags::SAMPLED;
        }
        if texture_def
            .resource_type
            .intersects(KilnResourceType::TEXTURE_READ_WRITE)
        {
            usage |= vk::ImageUsageFlags::STORAGE;
        }
        if texture_def
            .resource_type
            .intersects(KilnResourceType::RENDER_TARGET_COLOR)
        {
            usage |= vk::ImageUsageFlags::COLOR_ATTACHMENT;
        }
        if texture_def
            .resource_type
            .intersects(KilnResourceType::RENDER_TARGET_DEPTH_STENCIL)
        {
            usage |= vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT;
        }

        let image_type = if texture_def.extents.depth > 1 {
            vk::ImageType::TYPE_3D
        } else {
            vk::ImageType::TYPE_2D
        };

        let image_create_info = vk::ImageCreateInfo::builder()
            .image_type(image_type)
            .format(format)
            .extent(vk::Extent3D {
                width: texture_def.extents.width,
                height: texture_def.extents.height,
                depth: texture_def.extents.depth,
            })
            .mip_levels(texture_def.mip_count)
            .array_layers(texture_def.array_length)
            .samples(super::util::sample_count_to_vk(texture_def.sample_count))
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        let image = unsafe { device.create_image(&image_create_info, None)? };

        let requirements = unsafe { device.get_image_memory_requirements(image) };
        let memory_type_index =
            device_context.find_memory_type_index(&requirements, KilnMemoryUsage::GpuOnly)?;
        let allocate_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type_index);
        let device_memory = unsafe { device.allocate_memory(&allocate_info, None)? };
        unsafe {
            device.bind_image_memory(image, device_memory, 0)?;
        }

        let aspect_mask = Self::aspect_mask_for_format(texture_def.format);

        let common = TextureCommon::new(texture_def);

        let srv_view = if common.srv_view_id != 0 {
            Self::create_view(device, image, texture_def, format, aspect_mask)?
        } else {
            vk::ImageView::null()
        };
        let uav_view = if common.uav_view_id != 0 {
            Self::create_view(device, image, texture_def, format, aspect_mask)?
        } else {
            vk::ImageView::null()
        };
        let render_target_view = if texture_def.resource_type.intersects(
            KilnResourceType::RENDER_TARGET_COLOR | KilnResourceType::RENDER_TARGET_DEPTH_STENCIL,
        ) {
            Self::create_view(device, image, texture_def, format, aspect_mask)?
        } else {
            vk::ImageView::null()
        };

        Ok(KilnTextureVulkan {
            inner: Arc::new(KilnTextureVulkanInner {
                device_context: device_context.clone(),
                common,
                image,
                device_memory,
                srv_view,
                uav_view,
                render_target_view,
                aspect_mask,
            }),
        })
    }

    fn aspect_mask_for_format(format: KilnFormat) -> vk::ImageAspectFlags {
        let mut aspect_mask = vk::ImageAspectFlags::empty();
        if format.has_depth() {
            aspect_mask |= vk::ImageAspectFlags::DEPTH;
        }
        if format.has_stencil() {
            aspect_mask |= vk::ImageAspectFlags::STENCIL;
        }
        if aspect_mask.is_empty() {
            aspect_mask = vk::ImageAspectFlags::COLOR;
        }
        aspect_mask
    }

    fn create_view(
        device: &ash::Device,
        image: vk::Image,
        texture_def: &KilnTextureDef,
        format: vk::Format,
        aspect_mask: vk::ImageAspectFlags,
    ) -> KilnResult<vk::ImageView> {
        let view_type = if texture_def.extents.depth > 1 {
            vk::ImageViewType::TYPE_3D
        } else if texture_def.array_length > 1 {
            vk::ImageViewType::TYPE_2D_ARRAY
        } else {
            vk::ImageViewType::TYPE_2D
        };

        let view_create_info = vk::ImageViewCreateInfo::builder()
            .image(image)
            .view_type(view_type)
            .format(format)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask,
                base_mip_level: 0,
                level_count: texture_def.mip_count,
                base_array_layer: 0,
                layer_count: texture_def.array_length,
            });

        let view = unsafe { device.create_image_view(&view_create_info, None)? };
        Ok(view)
    }

    pub(crate) fn common(&self) -> &TextureCommon {
        &self.inner.common
    }

    pub fn vk_image(&self) -> vk::Image {
        self.inner.image
    }

    pub fn vk_srv_view(&self) -> vk::ImageView {
        self.inner.srv_view
    }

    pub fn vk_uav_view(&self) -> vk::ImageView {
        self.inner.uav_view
    }

    pub fn vk_render_target_view(&self) -> vk::ImageView {
        self.inner.render_target_view
    }

    pub fn vk_aspect_mask(&self) -> vk::ImageAspectFlags {
        self.inner.aspect_mask
    }
}
