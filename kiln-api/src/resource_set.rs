#[cfg(feature = "kiln-dx12")]
use crate::dx12::KilnResourceSetDx12;
use crate::internal_shared::DirtyMask;
use crate::null::KilnResourceSetNull;
#[cfg(feature = "kiln-vulkan")]
use crate::vulkan::KilnResourceSetVulkan;
use crate::{
    KilnBuffer, KilnDescriptorRangeType, KilnDeviceContext, KilnResourceState, KilnResult,
    KilnRootSignature, KilnSampler, KilnTexture,
};

/// The resource recorded into one descriptor slot. Handles are clones (shared
/// ownership of the underlying GPU object), dropping a resource set never destroys
/// what was bound into it.
#[derive(Clone, Debug)]
pub(crate) enum SlotResource {
    None,
    Buffer(KilnBuffer),
    Texture(KilnTexture),
    Sampler(KilnSampler),
}

#[derive(Debug)]
struct Slot {
    param_index: u32,
    array_index: u32,
    range_type: KilnDescriptorRangeType,
    // View id currently written to the slot, 0 when nothing is bound. Rebinding the
    // same id does not mark the slot dirty.
    bound_view: u64,
    resource: SlotResource,
}

/// One pending descriptor write handed to the backend during a flush
#[derive(Debug)]
pub(crate) struct DescriptorWrite {
    pub param_index: u32,
    pub array_index: u32,
    pub range_type: KilnDescriptorRangeType,
    pub resource: SlotResource,
}

#[derive(Debug)]
pub(crate) enum KilnResourceSetStorage {
    Null(KilnResourceSetNull),
    #[cfg(feature = "kiln-vulkan")]
    Vk(KilnResourceSetVulkan),
    #[cfg(feature = "kiln-dx12")]
    Dx12(KilnResourceSetDx12),
}

impl KilnResourceSetStorage {
    fn flush(
        &mut self,
        writes: &[DescriptorWrite],
    ) -> KilnResult<()> {
        match self {
            KilnResourceSetStorage::Null(inner) => inner.flush(writes),
            #[cfg(feature = "kiln-vulkan")]
            KilnResourceSetStorage::Vk(inner) => inner.flush(writes),
            #[cfg(feature = "kiln-dx12")]
            KilnResourceSetStorage::Dx12(inner) => inner.flush(writes),
        }
    }
}

/// Records resource bindings against a root signature and batches the descriptor
/// writes. Setters only mark state dirty, [`update`](Self::update) pushes every dirty
/// slot to the backend in a single batched call. Updating requires `&mut self`, two
/// threads cannot update one set concurrently.
#[derive(Debug)]
pub struct KilnResourceSet {
    root_signature: KilnRootSignature,
    first_param: u32,
    param_count: u32,
    // Flat slot index within the signature where this set's storage begins
    base_slot: u32,
    slots: Vec<Slot>,
    dirty: DirtyMask,
    dynamic_offset: Option<u64>,
    min_dynamic_offset_alignment: u64,
    storage: KilnResourceSetStorage,
}

impl KilnResourceSet {
    /// A set covering a single root parameter
    pub fn new(
        device_context: &KilnDeviceContext,
        root_signature: &KilnRootSignature,
        param_index: u32,
    ) -> KilnResult<Self> {
        if param_index as usize >= root_signature.parameter_count() {
            return Err(format!(
                "root parameter index {} out of range, signature has {} parameters",
                param_index,
                root_signature.parameter_count()
            ))?;
        }

        Self::do_new(device_context, root_signature, param_index, 1)
    }

    /// A set covering every root parameter in the signature
    pub fn new_for_signature(
        device_context: &KilnDeviceContext,
        root_signature: &KilnRootSignature,
    ) -> KilnResult<Self> {
        Self::do_new(
            device_context,
            root_signature,
            0,
            root_signature.parameter_count() as u32,
        )
    }

    fn do_new(
        device_context: &KilnDeviceContext,
        root_signature: &KilnRootSignature,
        first_param: u32,
        param_count: u32,
    ) -> KilnResult<Self> {
        assert!(param_count > 0, "resource set must cover at least one root parameter");

        let storage = match device_context {
            KilnDeviceContext::Null(inner) => {
                let signature = root_signature
                    .null_root_signature()
                    .ok_or("root signature was not created by this device context")?;
                KilnResourceSetStorage::Null(inner.create_resource_set_storage(
                    signature,
                    first_param,
                    param_count,
                )?)
            }
            #[cfg(feature = "kiln-vulkan")]
            KilnDeviceContext::Vk(inner) => {
                let signature = root_signature
                    .vk_root_signature()
                    .ok_or("root signature was not created by this device context")?;
                KilnResourceSetStorage::Vk(inner.create_resource_set_storage(
                    signature,
                    first_param,
                    param_count,
                )?)
            }
            #[cfg(feature = "kiln-dx12")]
            KilnDeviceContext::Dx12(inner) => {
                let signature = root_signature
                    .dx12_root_signature()
                    .ok_or("root signature was not created by this device context")?;
                KilnResourceSetStorage::Dx12(inner.create_resource_set_storage(
                    signature,
                    first_param,
                    param_count,
                )?)
            }
        };

        let binding_model = root_signature.binding_model();
        let base_slot = binding_model.parameters[first_param as usize].first_slot;

        let mut slots = Vec::new();
        for param_index in first_param..first_param + param_count {
            let parameter = &binding_model.parameters[param_index as usize];
            for array_index in 0..parameter.descriptor_count() {
                // Cannot be None, array_index is in range by construction
                let range_type = parameter.range_type_at(array_index).unwrap();
                slots.push(Slot {
                    param_index,
                    array_index,
                    range_type,
                    bound_view: 0,
                    resource: SlotResource::None,
                });
            }
        }

        log::trace!(
            "created resource set over root parameters [{}..{}) with {} slots",
            first_param,
            first_param + param_count,
            slots.len()
        );

        Ok(KilnResourceSet {
            root_signature: root_signature.clone(),
            first_param,
            param_count,
            base_slot,
            slots,
            dirty: Default::default(),
            dynamic_offset: None,
            min_dynamic_offset_alignment: device_context
                .device_info()
                .min_uniform_buffer_offset_alignment as u64,
            storage,
        })
    }

    pub fn root_signature(&self) -> &KilnRootSignature {
        &self.root_signature
    }

    #[allow(dead_code)]
    pub(crate) fn storage(&self) -> &KilnResourceSetStorage {
        &self.storage
    }

    pub fn first_param(&self) -> u32 {
        self.first_param
    }

    pub fn param_count(&self) -> u32 {
        self.param_count
    }

    /// Number of slots that would be written by the next `update()`
    pub fn pending_write_count(&self) -> u32 {
        self.dirty.count()
    }

    /// The dynamic offset to apply when binding, if one was set
    pub fn dynamic_offset(&self) -> Option<u64> {
        self.dynamic_offset
    }

    fn local_slot_index(
        &self,
        param_index: u32,
        array_index: u32,
    ) -> KilnResult<usize> {
        if param_index < self.first_param || param_index >= self.first_param + self.param_count {
            return Err(format!(
                "root parameter {} is not covered by this resource set",
                param_index
            ))?;
        }

        let parameter = self.root_signature.parameter(param_index);
        if array_index >= parameter.descriptor_count() {
            return Err(format!(
                "descriptor index {} out of range, root parameter {} has {} descriptors",
                array_index,
                param_index,
                parameter.descriptor_count()
            ))?;
        }

        let binding_model = self.root_signature.binding_model();
        Ok(binding_model.slot_index(param_index, array_index) - self.base_slot as usize)
    }

    fn bind(
        &mut self,
        param_index: u32,
        array_index: u32,
        expected_type: KilnDescriptorRangeType,
        view_id: u64,
        resource: SlotResource,
    ) -> KilnResult<()> {
        let slot_index = self.local_slot_index(param_index, array_index)?;
        let slot = &mut self.slots[slot_index];

        if slot.range_type != expected_type {
            return Err(format!(
                "descriptor {}[{}] holds {:?} descriptors, attempted to bind a {:?}",
                param_index, array_index, slot.range_type, expected_type
            ))?;
        }

        // Same view already recorded, nothing to write
        if slot.bound_view == view_id {
            return Ok(());
        }

        slot.bound_view = view_id;
        slot.resource = resource;
        self.dirty.mark(slot_index);
        Ok(())
    }

    fn assert_not_transitioning(state: KilnResourceState) {
        assert!(
            !state.intersects(KilnResourceState::TRANSITIONING),
            "resource has a pending deferred barrier, flush barriers before binding it"
        );
    }

    /// Binds a uniform buffer to a constant buffer slot
    pub fn set_cbv(
        &mut self,
        param_index: u32,
        buffer: &KilnBuffer,
    ) -> KilnResult<()> {
        Self::assert_not_transitioning(buffer.tracked_state());
        if buffer.cbv_view_id() == 0 {
            return Err(
                "buffer was not created with UNIFORM_BUFFER usage and has no constant buffer view",
            )?;
        }

        self.bind(
            param_index,
            0,
            KilnDescriptorRangeType::ConstantBuffer,
            buffer.cbv_view_id(),
            SlotResource::Buffer(buffer.clone()),
        )
    }

    /// Binds a texture's sampled view to a texture SRV slot
    pub fn set_texture_srv(
        &mut self,
        param_index: u32,
        array_index: u32,
        texture: &KilnTexture,
    ) -> KilnResult<()> {
        Self::assert_not_transitioning(texture.tracked_state());
        if texture.srv_view_id() == 0 {
            return Err("texture was not created with TEXTURE usage and has no sampled view")?;
        }

        self.bind(
            param_index,
            array_index,
            KilnDescriptorRangeType::TextureSrv,
            texture.srv_view_id(),
            SlotResource::Texture(texture.clone()),
        )
    }

    /// Binds a structured buffer's read view to a buffer SRV slot
    pub fn set_buffer_srv(
        &mut self,
        param_index: u32,
        array_index: u32,
        buffer: &KilnBuffer,
    ) -> KilnResult<()> {
        Self::assert_not_transitioning(buffer.tracked_state());
        if buffer.srv_view_id() == 0 {
            return Err("buffer was not created with BUFFER usage and has no structured read view")?;
        }

        self.bind(
            param_index,
            array_index,
            KilnDescriptorRangeType::BufferSrv,
            buffer.srv_view_id(),
            SlotResource::Buffer(buffer.clone()),
        )
    }

    /// Binds a texture's storage view to a texture UAV slot
    pub fn set_texture_uav(
        &mut self,
        param_index: u32,
        array_index: u32,
        texture: &KilnTexture,
    ) -> KilnResult<()> {
        Self::assert_not_transitioning(texture.tracked_state());
        if texture.uav_view_id() == 0 {
            return Err(
                "texture was not created with TEXTURE_READ_WRITE usage and has no storage view",
            )?;
        }

        self.bind(
            param_index,
            array_index,
            KilnDescriptorRangeType::TextureUav,
            texture.uav_view_id(),
            SlotResource::Texture(texture.clone()),
        )
    }

    /// Binds a structured buffer's read/write view to a buffer UAV slot
    pub fn set_buffer_uav(
        &mut self,
        param_index: u32,
        array_index: u32,
        buffer: &KilnBuffer,
    ) -> KilnResult<()> {
        Self::assert_not_transitioning(buffer.tracked_state());
        if buffer.uav_view_id() == 0 {
            return Err(
                "buffer was not created with BUFFER_READ_WRITE usage and has no read/write view",
            )?;
        }

        self.bind(
            param_index,
            array_index,
            KilnDescriptorRangeType::BufferUav,
            buffer.uav_view_id(),
            SlotResource::Buffer(buffer.clone()),
        )
    }

    pub fn set_sampler(
        &mut self,
        param_index: u32,
        array_index: u32,
        sampler: &KilnSampler,
    ) -> KilnResult<()> {
        self.bind(
            param_index,
            array_index,
            KilnDescriptorRangeType::Sampler,
            sampler.sampler_id(),
            SlotResource::Sampler(sampler.clone()),
        )
    }

    /// Sets the offset applied to the bound constant buffer at bind time. Only valid
    /// when the set covers exactly one root parameter and that parameter is a dynamic
    /// constant buffer.
    pub fn set_dynamic_offset(
        &mut self,
        offset: u64,
    ) -> KilnResult<()> {
        if self.param_count != 1
            || !self
                .root_signature
                .parameter(self.first_param)
                .is_dynamic_constant_buffer()
        {
            return Err(
                "dynamic offsets require a set bound to a single dynamic constant buffer parameter",
            )?;
        }

        if offset % self.min_dynamic_offset_alignment != 0 {
            return Err(format!(
                "dynamic offset {} is not aligned to the device minimum of {}",
                offset, self.min_dynamic_offset_alignment
            ))?;
        }

        self.dynamic_offset = Some(offset);
        Ok(())
    }

    /// Pushes every dirty slot to the backend in one batched call. With nothing dirty
    /// this makes no backend call at all.
    #[profiling::function]
    pub fn update(&mut self) -> KilnResult<()> {
        if !self.dirty.any() {
            return Ok(());
        }

        let slots = &self.slots;
        let writes: Vec<DescriptorWrite> = self
            .dirty
            .iter()
            .map(|slot_index| {
                let slot = &slots[slot_index];
                debug_assert!(!matches!(slot.resource, SlotResource::None));
                DescriptorWrite {
                    param_index: slot.param_index,
                    array_index: slot.array_index,
                    range_type: slot.range_type,
                    resource: slot.resource.clone(),
                }
            })
            .collect();

        log::trace!("flushing {} descriptor writes in one batch", writes.len());
        self.storage.flush(&writes)?;

        // Slots stay dirty until the backend accepted the batch, a failed flush can
        // be retried with the same writes
        self.dirty.clear();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        KilnBufferDef, KilnExtents3D, KilnFormat, KilnResourceType, KilnRootSignatureDef,
        KilnRootSignatureFlags, KilnShaderVisibility, KilnTextureDef,
    };

    fn signature(device_context: &KilnDeviceContext) -> KilnRootSignature {
        let mut def = KilnRootSignatureDef::new(2, 0);
        def.init_as_constant_buffer(0, 0, KilnShaderVisibility::All);
        def.init_as_descriptor_range(
            1,
            KilnDescriptorRangeType::TextureSrv,
            0,
            4,
            KilnShaderVisibility::Pixel,
        );
        device_context
            .create_root_signature(&def, "test", KilnRootSignatureFlags::NONE)
            .unwrap()
    }

    fn uniform_buffer(device_context: &KilnDeviceContext) -> KilnBuffer {
        device_context
            .create_buffer(&KilnBufferDef::for_uniform_buffer_size(256))
            .unwrap()
    }

    fn sampled_texture(device_context: &KilnDeviceContext) -> KilnTexture {
        device_context
            .create_texture(&KilnTextureDef {
                extents: KilnExtents3D {
                    width: 4,
                    height: 4,
                    depth: 1,
                },
                format: KilnFormat::R8G8B8A8Unorm,
                ..Default::default()
            })
            .unwrap()
    }

    #[test]
    fn update_flushes_every_dirty_slot_in_one_batch() {
        let device_context = KilnDeviceContext::new_null();
        let root_signature = signature(&device_context);
        let mut set =
            KilnResourceSet::new_for_signature(&device_context, &root_signature).unwrap();

        set.set_cbv(0, &uniform_buffer(&device_context)).unwrap();
        set.set_texture_srv(1, 0, &sampled_texture(&device_context))
            .unwrap();
        set.set_texture_srv(1, 1, &sampled_texture(&device_context))
            .unwrap();
        assert_eq!(set.pending_write_count(), 3);

        set.update().unwrap();
        assert_eq!(set.pending_write_count(), 0);

        let null = device_context.null_device_context().unwrap();
        assert_eq!(null.descriptor_batch_count(), 1);
        assert_eq!(null.last_batch_write_count(), 3);
        assert_eq!(null.descriptor_write_count(), 3);
    }

    #[test]
    fn clean_update_makes_no_backend_call() {
        let device_context = KilnDeviceContext::new_null();
        let root_signature = signature(&device_context);
        let mut set =
            KilnResourceSet::new_for_signature(&device_context, &root_signature).unwrap();

        set.update().unwrap();
        set.set_cbv(0, &uniform_buffer(&device_context)).unwrap();
        set.update().unwrap();
        set.update().unwrap();

        let null = device_context.null_device_context().unwrap();
        assert_eq!(null.descriptor_batch_count(), 1);
    }

    #[test]
    fn rebinding_the_same_view_does_not_dirty_the_slot() {
        let device_context = KilnDeviceContext::new_null();
        let root_signature = signature(&device_context);
        let mut set =
            KilnResourceSet::new_for_signature(&device_context, &root_signature).unwrap();

        let buffer = uniform_buffer(&device_context);
        set.set_cbv(0, &buffer).unwrap();
        set.update().unwrap();

        set.set_cbv(0, &buffer).unwrap();
        assert_eq!(set.pending_write_count(), 0);

        // A different buffer is a different view, that one dirties
        set.set_cbv(0, &uniform_buffer(&device_context)).unwrap();
        assert_eq!(set.pending_write_count(), 1);
    }

    #[test]
    fn binding_the_wrong_descriptor_kind_fails() {
        let device_context = KilnDeviceContext::new_null();
        let root_signature = signature(&device_context);
        let mut set =
            KilnResourceSet::new_for_signature(&device_context, &root_signature).unwrap();

        let structured = device_context
            .create_buffer(&KilnBufferDef::for_structured_buffer(16, 64, false))
            .unwrap();
        // Parameter 1 holds texture SRVs, a buffer SRV must be rejected
        assert!(set.set_buffer_srv(1, 0, &structured).is_err());
        // Parameter 0 is a constant buffer, a texture SRV must be rejected
        assert!(set
            .set_texture_srv(0, 0, &sampled_texture(&device_context))
            .is_err());
        assert_eq!(set.pending_write_count(), 0);
    }

    #[test]
    fn buffer_without_the_matching_view_is_rejected() {
        let device_context = KilnDeviceContext::new_null();
        let root_signature = signature(&device_context);
        let mut set =
            KilnResourceSet::new_for_signature(&device_context, &root_signature).unwrap();

        let structured = device_context
            .create_buffer(&KilnBufferDef::for_structured_buffer(16, 64, false))
            .unwrap();
        assert!(set.set_cbv(0, &structured).is_err());
    }

    #[test]
    fn out_of_range_indices_fail() {
        let device_context = KilnDeviceContext::new_null();
        let root_signature = signature(&device_context);

        assert!(KilnResourceSet::new(&device_context, &root_signature, 2).is_err());

        let mut set =
            KilnResourceSet::new_for_signature(&device_context, &root_signature).unwrap();
        // Parameter 1 has 4 descriptors
        assert!(set
            .set_texture_srv(1, 4, &sampled_texture(&device_context))
            .is_err());
    }

    #[test]
    fn single_param_set_covers_only_its_parameter() {
        let device_context = KilnDeviceContext::new_null();
        let root_signature = signature(&device_context);
        let mut set = KilnResourceSet::new(&device_context, &root_signature, 1).unwrap();

        assert_eq!(set.first_param(), 1);
        assert_eq!(set.param_count(), 1);
        set.set_texture_srv(1, 2, &sampled_texture(&device_context))
            .unwrap();
        assert!(set.set_cbv(0, &uniform_buffer(&device_context)).is_err());
    }

    #[test]
    fn dynamic_offsets_validate_the_parameter_and_alignment() {
        let device_context = KilnDeviceContext::new_null();

        let mut def = KilnRootSignatureDef::new(1, 0);
        def.init_as_dynamic_constant_buffer(0, 0, KilnShaderVisibility::All);
        let dynamic_signature = device_context
            .create_root_signature(&def, "dynamic", KilnRootSignatureFlags::NONE)
            .unwrap();

        let mut set =
            KilnResourceSet::new_for_signature(&device_context, &dynamic_signature).unwrap();
        assert_eq!(set.dynamic_offset(), None);
        set.set_dynamic_offset(512).unwrap();
        assert_eq!(set.dynamic_offset(), Some(512));

        // Device minimum alignment is 256
        assert!(set.set_dynamic_offset(100).is_err());
        assert_eq!(set.dynamic_offset(), Some(512));

        // A static constant buffer parameter does not accept dynamic offsets
        let static_signature = signature(&device_context);
        let mut static_set =
            KilnResourceSet::new(&device_context, &static_signature, 0).unwrap();
        assert!(static_set.set_dynamic_offset(256).is_err());
    }

    #[test]
    #[should_panic(expected = "pending deferred barrier")]
    fn binding_a_transitioning_resource_panics() {
        let device_context = KilnDeviceContext::new_null();
        let root_signature = signature(&device_context);
        let mut set =
            KilnResourceSet::new_for_signature(&device_context, &root_signature).unwrap();

        let texture = sampled_texture(&device_context);
        texture.set_tracked_state(KilnResourceState::TRANSITIONING);
        let _ = set.set_texture_srv(1, 0, &texture);
    }
}
