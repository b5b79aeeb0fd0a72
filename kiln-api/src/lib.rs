//! A cross-API GPU resource binding and pipeline abstraction over vulkan and D3D12.
//!
//! The API is modeled on the D3D12 binding model (root signatures, descriptor tables,
//! explicit resource state) and translated to vulkan's (pipeline layouts, descriptor
//! sets, image layouts). The backend is chosen at compile time with cargo features:
//!  * `kiln-vulkan` - vulkan via `ash`, wrapping an externally created device
//!  * `kiln-dx12` - D3D12 via the `windows` crate, wrapping an externally created device
//!
//! With no backend feature enabled the `null` backend is used. It performs no GPU work
//! but fully tracks binding, state, and batching behavior, which is what the test suite
//! runs against.
//!
//! The general usage flow:
//!  * Create a [`KilnDeviceContext`]
//!  * Describe the binding shape with a [`KilnRootSignatureDef`] and finalize it into a
//!    [`KilnRootSignature`]
//!  * Build pipelines with [`KilnGraphicsPso`]/[`KilnComputePso`], which are cached per
//!    device by the hash of their full state
//!  * Bind resources through a [`KilnResourceSet`], which batches descriptor writes and
//!    flushes them in a single backend update
//!  * Record work with a [`KilnGraphicsContext`], which also owns resource state
//!    transitions

pub mod backends;

pub use backends::null;
#[cfg(feature = "kiln-vulkan")]
pub use backends::vulkan;
#[cfg(feature = "kiln-dx12")]
pub use backends::dx12;

mod types;
pub use types::*;

mod error;
pub use error::KilnError;
pub use error::KilnResult;

mod internal_shared;
pub use internal_shared::MAX_DESCRIPTORS_PER_SET;

mod device_context;
pub use device_context::KilnDeviceContext;

mod texture;
pub use texture::KilnTexture;

mod buffer;
pub use buffer::KilnBuffer;

mod sampler;
pub use sampler::KilnSampler;

mod shader;
pub use shader::KilnShader;
pub use shader::KilnShaderModule;

mod root_signature;
pub use root_signature::KilnRootParameterInfo;
pub use root_signature::KilnRootParameterKind;
pub use root_signature::KilnRootParameterRange;
pub use root_signature::KilnRootSignature;
pub use root_signature::KilnRootSignatureDef;
pub use root_signature::KilnStaticSamplerInfo;

mod resource_set;
pub use resource_set::KilnResourceSet;

mod pipeline;
pub use pipeline::KilnComputePso;
pub use pipeline::KilnGraphicsPso;
pub use pipeline::KilnPipeline;

mod framebuffer;
pub use framebuffer::KilnFrameBuffer;

mod graphics_context;
pub use graphics_context::KilnGraphicsContext;

/// Root signatures address up to this many root parameters
pub const MAX_ROOT_PARAMETERS: usize = 16;

/// Framebuffers hold up to this many color attachments plus one depth/stencil attachment
pub const MAX_COLOR_ATTACHMENTS: usize = 8;
