//! Vulkan backend built on `ash`. The device context wraps an `ash::Device` created by
//! the application, instance and swapchain management stay outside the API.

mod device_context;
pub use device_context::KilnDeviceContextVulkan;

mod texture;
pub use texture::KilnTextureVulkan;

mod buffer;
pub use buffer::KilnBufferVulkan;

mod sampler;
pub use sampler::KilnSamplerVulkan;

mod shader;
pub use shader::KilnShaderModuleVulkan;
pub use shader::KilnShaderVulkan;

mod root_signature;
pub use root_signature::KilnRootSignatureVulkan;

mod resource_set;
pub use resource_set::KilnResourceSetVulkan;

mod pipeline;
pub use pipeline::KilnPipelineVulkan;

mod graphics_context;
pub use graphics_context::KilnGraphicsContextVulkan;

mod util;
