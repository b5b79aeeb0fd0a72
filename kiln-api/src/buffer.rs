#[cfg(feature = "kiln-dx12")]
use crate::dx12::KilnBufferDx12;
use crate::internal_shared::BufferCommon;
use crate::null::KilnBufferNull;
#[cfg(feature = "kiln-vulkan")]
use crate::vulkan::KilnBufferVulkan;
use crate::{KilnBufferDef, KilnResourceState};

/// A buffer and the state the engine tracks for it. Cloning shares the underlying
/// buffer, it does not copy it.
#[derive(Clone, Debug)]
pub enum KilnBuffer {
    Null(KilnBufferNull),
    #[cfg(feature = "kiln-vulkan")]
    Vk(KilnBufferVulkan),
    #[cfg(feature = "kiln-dx12")]
    Dx12(KilnBufferDx12),
}

impl KilnBuffer {
    pub(crate) fn common(&self) -> &BufferCommon {
        match self {
            KilnBuffer::Null(inner) => inner.common(),
            #[cfg(feature = "kiln-vulkan")]
            KilnBuffer::Vk(inner) => inner.common(),
            #[cfg(feature = "kiln-dx12")]
            KilnBuffer::Dx12(inner) => inner.common(),
        }
    }

    pub fn buffer_def(&self) -> &KilnBufferDef {
        &self.common().def
    }

    pub fn buffer_id(&self) -> u64 {
        self.common().buffer_id
    }

    /// Identity of the buffer's constant buffer view, 0 unless created with
    /// `UNIFORM_BUFFER` usage
    pub fn cbv_view_id(&self) -> u64 {
        self.common().cbv_view_id
    }

    /// Identity of the buffer's structured SRV view, 0 unless created with `BUFFER`
    /// usage
    pub fn srv_view_id(&self) -> u64 {
        self.common().srv_view_id
    }

    /// Identity of the buffer's structured UAV view, 0 unless created with
    /// `BUFFER_READ_WRITE` usage
    pub fn uav_view_id(&self) -> u64 {
        self.common().uav_view_id
    }

    pub fn tracked_state(&self) -> KilnResourceState {
        self.common().state.load()
    }

    pub(crate) fn set_tracked_state(
        &self,
        state: KilnResourceState,
    ) {
        self.common().state.store(state)
    }

    pub fn null_buffer(&self) -> Option<&KilnBufferNull> {
        match self {
            KilnBuffer::Null(inner) => Some(inner),
            #[cfg(any(feature = "kiln-vulkan", feature = "kiln-dx12"))]
            _ => None,
        }
    }

    #[cfg(feature = "kiln-vulkan")]
    pub fn vk_buffer(&self) -> Option<&KilnBufferVulkan> {
        match self {
            KilnBuffer::Vk(inner) => Some(inner),
            _ => None,
        }
    }

    #[cfg(feature = "kiln-dx12")]
    pub fn dx12_buffer(&self) -> Option<&KilnBufferDx12> {
        match self {
            KilnBuffer::Dx12(inner) => Some(inner),
            _ => None,
        }
    }
}
