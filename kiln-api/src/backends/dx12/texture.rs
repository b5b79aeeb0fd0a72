use super::{util, KilnDeviceContextDx12};
use crate::internal_shared::TextureCommon;
use crate::{KilnResourceType, KilnResult, KilnTextureDef};
use std::sync::Arc;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;

#[derive(Debug)]
struct KilnTextureDx12Inner {
    device_context: KilnDeviceContextDx12,
    common: TextureCommon,
    resource: ID3D12Resource,
    rtv_handle: Option<D3D12_CPU_DESCRIPTOR_HANDLE>,
    dsv_handle: Option<D3D12_CPU_DESCRIPTOR_HANDLE>,
}

#[derive(Clone, Debug)]
pub struct KilnTextureDx12 {
    inner: Arc<KilnTextureDx12Inner>,
}

impl KilnTextureDx12 {
    pub(crate) fn new(
        device_context: &KilnDeviceContextDx12,
        texture_def: &KilnTextureDef,
    ) -> KilnResult<Self> {
        texture_def.verify();

        let device = &device_context.inner.device;
        let format = texture_def.format.into_dxgi();
        if format == DXGI_FORMAT_UNKNOWN {
            Err(format!(
                "cannot create a d3d12 texture with format {:?}",
                texture_def.format
            ))?;
        }

        let is_render_target = texture_def
            .resource_type
            .intersects(KilnResourceType::RENDER_TARGET_COLOR);
        let is_depth_stencil = texture_def
            .resource_type
            .intersects(KilnResourceType::RENDER_TARGET_DEPTH_STENCIL);

        let mut flags = D3D12_RESOURCE_FLAG_NONE;
        if is_render_target {
            flags |= D3D12_RESOURCE_FLAG_ALLOW_RENDER_TARGET;
        }
        if is_depth_stencil {
            flags |= D3D12_RESOURCE_FLAG_ALLOW_DEPTH_STENCIL;
        }
        if texture_def
            .resource_type
            .intersects(KilnResourceType::TEXTURE_READ_WRITE)
        {
            flags |= D3D12_RESOURCE_FLAG_ALLOW_UNORDERED_ACCESS;
        }

        let dimension = if texture_def.extents.depth > 1 {
            D3D12_RESOURCE_DIMENSION_TEXTURE3D
        } else {
            D3D12_RESOURCE_DIMENSION_TEXTURE2D
        };

        let depth_or_array_size = if texture_def.extents.depth > 1 {
            texture_def.extents.depth as u16
        } else {
            texture_def.array_length as u16
        };

        let desc = D3D12_RESOURCE_DESC {
            Dimension: dimension,
            Alignment: 0,
            Width: texture_def.extents.width as u64,
            Height: texture_def.extents.height,
            DepthOrArraySize: depth_or_array_size,
            MipLevels: texture_def.mip_count as u16,
            Format: format,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: util::sample_count_to_dx12(texture_def.sample_count),
                Quality: 0,
            },
            Layout: D3D12_TEXTURE_LAYOUT_UNKNOWN,
            Flags: flags,
        };

        let heap_properties = D3D12_HEAP_PROPERTIES {
            Type: D3D12_HEAP_TYPE_DEFAULT,
            ..Default::default()
        };

        let common = TextureCommon::new(texture_def);
        let initial_state = util::resource_state_to_dx12(texture_def.initial_state());

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
        // CreateCommittedResource only succeeds with a resource
        let resource = resource.unwrap();

        let rtv_handle = if is_render_target {
            let heap = &device_context.inner.rtv_heap;
            let index = heap.allocate(1)?;
            let handle = heap.cpu_handle(index);
            unsafe {
                device.CreateRenderTargetView(&resource, None, handle);
            }
            Some(handle)
        } else {
            None
        };

        let dsv_handle = if is_depth_stencil {
            let heap = &device_context.inner.dsv_heap;
            let index = heap.allocate(1)?;
            let handle = heap.cpu_handle(index);
            unsafe {
                device.CreateDepthStencilView(&resource, None, handle);
            }
            Some(handle)
        } else {
            None
        };

        Ok(KilnTextureDx12 {
            inner: Arc::new(KilnTextureDx12Inner {
                device_context: device_context.clone(),
                common,
                resource,
                rtv_handle,
                dsv_handle,
            }),
        })
    }

    pub(crate) fn common(&self) -> &TextureCommon {
        &self.inner.common
    }

    pub fn dx12_resource(&self) -> &ID3D12Resource {
        &self.inner.resource
    }

    pub(crate) fn rtv_handle(&self) -> Option<D3D12_CPU_DESCRIPTOR_HANDLE> {
        self.inner.rtv_handle
    }

    pub(crate) fn dsv_handle(&self) -> Option<D3D12_CPU_DESCRIPTOR_HANDLE> {
        self.inner.dsv_handle
    }
}
