use super::state_cell::ResourceStateCell;
use crate::{KilnBufferDef, KilnResourceType, KilnTextureDef};
use std::sync::atomic::{AtomicU64, Ordering};

// View ids start at 1 so 0 can mean "nothing bound" in resource set slots. A single
// process-wide counter covers textures and buffers, ids only need to be unique.
static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn allocate_view_id() -> u64 {
    NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed)
}

/// Backend-independent bookkeeping every texture carries: the def it was created from,
/// stable view identities for descriptor writes, and the tracked resource state.
#[derive(Debug)]
pub(crate) struct TextureCommon {
    pub def: KilnTextureDef,
    pub texture_id: u64,
    pub srv_view_id: u64,
    pub uav_view_id: u64,
    pub state: ResourceStateCell,
}

impl TextureCommon {
    pub fn new(def: &KilnTextureDef) -> Self {
        def.verify();

        let srv_view_id = if def.resource_type.intersects(KilnResourceType::TEXTURE) {
            allocate_view_id()
        } else {
            0
        };
        let uav_view_id = if def
            .resource_type
            .intersects(KilnResourceType::TEXTURE_READ_WRITE)
        {
            allocate_view_id()
        } else {
            0
        };

        TextureCommon {
            def: def.clone(),
            texture_id: allocate_view_id(),
            srv_view_id,
            uav_view_id,
            state: ResourceStateCell::new(def.initial_state()),
        }
    }
}

/// Backend-independent bookkeeping every buffer carries
#[derive(Debug)]
pub(crate) struct BufferCommon {
    pub def: KilnBufferDef,
    pub buffer_id: u64,
    pub cbv_view_id: u64,
    pub srv_view_id: u64,
    pub uav_view_id: u64,
    pub state: ResourceStateCell,
}

impl BufferCommon {
    pub fn new(def: &KilnBufferDef) -> Self {
        def.verify();

        let cbv_view_id = if def
            .resource_type
            .intersects(KilnResourceType::UNIFORM_BUFFER)
        {
            allocate_view_id()
        } else {
            0
        };
        let srv_view_id = if def.resource_type.intersects(KilnResourceType::BUFFER) {
            allocate_view_id()
        } else {
            0
        };
        let uav_view_id = if def
            .resource_type
            .intersects(KilnResourceType::BUFFER_READ_WRITE)
        {
            allocate_view_id()
        } else {
            0
        };

        BufferCommon {
            def: def.clone(),
            buffer_id: allocate_view_id(),
            cbv_view_id,
            srv_view_id,
            uav_view_id,
            state: ResourceStateCell::new(def.initial_state()),
        }
    }
}
