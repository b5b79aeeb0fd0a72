#[cfg(feature = "kiln-vulkan")]
use ash::vk;
use std::sync::Arc;

pub type KilnResult<T> = Result<T, KilnError>;

/// Generic error that contains all the different kinds of errors that may occur when using the API
#[derive(Debug, Clone)]
pub enum KilnError {
    StringError(String),
    IoError(Arc<std::io::Error>),
    #[cfg(feature = "kiln-vulkan")]
    VkError(vk::Result),
    #[cfg(feature = "kiln-dx12")]
    WindowsError(windows::core::Error),
}

impl std::error::Error for KilnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            KilnError::StringError(_) => None,
            KilnError::IoError(ref e) => Some(&**e),
            #[cfg(feature = "kiln-vulkan")]
            KilnError::VkError(ref e) => Some(e),
            #[cfg(feature = "kiln-dx12")]
            KilnError::WindowsError(ref e) => Some(e),
        }
    }
}

impl core::fmt::Display for KilnError {
    fn fmt(
        &self,
        fmt: &mut core::fmt::Formatter,
    ) -> core::fmt::Result {
        match *self {
            KilnError::StringError(ref e) => e.fmt(fmt),
            KilnError::IoError(ref e) => e.fmt(fmt),
            #[cfg(feature = "kiln-vulkan")]
            KilnError::VkError(ref e) => e.fmt(fmt),
            #[cfg(feature = "kiln-dx12")]
            KilnError::WindowsError(ref e) => e.fmt(fmt),
        }
    }
}

impl From<&str> for KilnError {
    fn from(str: &str) -> Self {
        KilnError::StringError(str.to_string())
    }
}

impl From<String> for KilnError {
    fn from(string: String) -> Self {
        KilnError::StringError(string)
    }
}

impl From<std::io::Error> for KilnError {
    fn from(error: std::io::Error) -> Self {
        KilnError::IoError(Arc::new(error))
    }
}

#[cfg(feature = "kiln-vulkan")]
impl From<vk::Result> for KilnError {
    fn from(result: vk::Result) -> Self {
        KilnError::VkError(result)
    }
}

#[cfg(feature = "kiln-dx12")]
impl From<windows::core::Error> for KilnError {
    fn from(error: windows::core::Error) -> Self {
        KilnError::WindowsError(error)
    }
}
