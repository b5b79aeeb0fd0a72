//! The backend used when no native backend feature is enabled. It owns no GPU objects
//! and records nothing to any device, but it fully implements the binding, state
//! tracking, and batching behavior of the API and counts the native calls it would
//! have made. The test suite runs against it.

mod device_context;
pub use device_context::KilnDeviceContextNull;

mod texture;
pub use texture::KilnTextureNull;

mod buffer;
pub use buffer::KilnBufferNull;

mod sampler;
pub use sampler::KilnSamplerNull;

mod shader;
pub use shader::KilnShaderModuleNull;
pub use shader::KilnShaderNull;

mod root_signature;
pub use root_signature::KilnRootSignatureNull;

mod resource_set;
pub use resource_set::KilnResourceSetNull;

mod pipeline;
pub use pipeline::KilnPipelineNull;

mod graphics_context;
pub use graphics_context::KilnGraphicsContextNull;
