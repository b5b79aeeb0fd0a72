#[cfg(feature = "kiln-dx12")]
use crate::dx12::KilnTextureDx12;
use crate::internal_shared::TextureCommon;
use crate::null::KilnTextureNull;
#[cfg(feature = "kiln-vulkan")]
use crate::vulkan::KilnTextureVulkan;
use crate::{KilnResourceState, KilnTextureDef};

/// A texture and the state the engine tracks for it. Cloning shares the underlying
/// texture, it does not copy it.
#[derive(Clone, Debug)]
pub enum KilnTexture {
    Null(KilnTextureNull),
    #[cfg(feature = "kiln-vulkan")]
    Vk(KilnTextureVulkan),
    #[cfg(feature = "kiln-dx12")]
    Dx12(KilnTextureDx12),
}

impl KilnTexture {
    pub(crate) fn common(&self) -> &TextureCommon {
        match self {
            KilnTexture::Null(inner) => inner.common(),
            #[cfg(feature = "kiln-vulkan")]
            KilnTexture::Vk(inner) => inner.common(),
            #[cfg(feature = "kiln-dx12")]
            KilnTexture::Dx12(inner) => inner.common(),
        }
    }

    pub fn texture_def(&self) -> &KilnTextureDef {
        &self.common().def
    }

    /// Process-unique identity of the texture object
    pub fn texture_id(&self) -> u64 {
        self.common().texture_id
    }

    /// Identity of the texture's sampled (SRV) view, 0 if the texture was not created
    /// with `TEXTURE` usage. Rebinding the same view id into a resource set slot is a
    /// no-op.
    pub fn srv_view_id(&self) -> u64 {
        self.common().srv_view_id
    }

    /// Identity of the texture's storage (UAV) view, 0 if the texture was not created
    /// with `TEXTURE_READ_WRITE` usage
    pub fn uav_view_id(&self) -> u64 {
        self.common().uav_view_id
    }

    /// The state the engine currently tracks this texture in
    pub fn tracked_state(&self) -> KilnResourceState {
        self.common().state.load()
    }

    pub(crate) fn set_tracked_state(
        &self,
        state: KilnResourceState,
    ) {
        self.common().state.store(state)
    }

    pub fn null_texture(&self) -> Option<&KilnTextureNull> {
        match self {
            KilnTexture::Null(inner) => Some(inner),
            #[cfg(any(feature = "kiln-vulkan", feature = "kiln-dx12"))]
            _ => None,
        }
    }

    #[cfg(feature = "kiln-vulkan")]
    pub fn vk_texture(&self) -> Option<&KilnTextureVulkan> {
        match self {
            KilnTexture::Vk(inner) => Some(inner),
            _ => None,
        }
    }

    #[cfg(feature = "kiln-dx12")]
    pub fn dx12_texture(&self) -> Option<&KilnTextureDx12> {
        match self {
            KilnTexture::Dx12(inner) => Some(inner),
            _ => None,
        }
    }
}
