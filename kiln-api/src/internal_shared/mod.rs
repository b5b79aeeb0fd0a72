mod dirty_mask;
pub use dirty_mask::MAX_DESCRIPTORS_PER_SET;
pub(crate) use dirty_mask::DirtyMask;

mod state_cell;
pub(crate) use state_cell::ResourceStateCell;

mod pipeline_cache;
pub(crate) use pipeline_cache::PipelineCache;

mod resource_common;
pub(crate) use resource_common::{allocate_view_id, BufferCommon, TextureCommon};
