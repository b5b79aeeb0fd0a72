//! DirectX 12 backend built on the `windows` crate. The device context wraps an
//! `ID3D12Device` created by the application, swapchain and queue management stay
//! outside the API.

mod device_context;
pub use device_context::KilnDeviceContextDx12;

mod texture;
pub use texture::KilnTextureDx12;

mod buffer;
pub use buffer::KilnBufferDx12;

mod sampler;
pub use sampler::KilnSamplerDx12;

mod shader;
pub use shader::KilnShaderDx12;
pub use shader::KilnShaderModuleDx12;

mod root_signature;
pub use root_signature::KilnRootSignatureDx12;

mod resource_set;
pub use resource_set::KilnResourceSetDx12;

mod pipeline;
pub use pipeline::KilnPipelineDx12;

mod graphics_context;
pub use graphics_context::KilnGraphicsContextDx12;

mod descriptor_heap;
mod util;
