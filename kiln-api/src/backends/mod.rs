pub mod null;

#[cfg(feature = "kiln-vulkan")]
pub mod vulkan;

#[cfg(feature = "kiln-dx12")]
pub mod dx12;
