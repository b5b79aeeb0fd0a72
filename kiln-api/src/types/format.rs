#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// An engine-neutral texture/vertex format. Only formats with a direct
/// equivalent in both DXGI and vulkan are included, which keeps translation
/// lossless in both directions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum KilnFormat {
    Unknown,
    R8Unorm,
    R8G8B8A8Unorm,
    R8G8B8A8Srgb,
    B8G8R8A8Unorm,
    B8G8R8A8Srgb,
    R10G10B10A2Unorm,
    R11G11B10Float,
    R16Float,
    R16G16Float,
    R16G16B16A16Float,
    R32Uint,
    R32Float,
    R32G32Float,
    R32G32B32A32Float,
    D16Unorm,
    D24UnormS8Uint,
    D32Float,
    D32FloatS8Uint,
}

impl Default for KilnFormat {
    fn default() -> Self {
        KilnFormat::Unknown
    }
}

/// One row of the translation table: a format and its raw numeric values in
/// the two native enums (`DXGI_FORMAT` and `VkFormat`).
#[derive(Copy, Clone, Debug)]
pub struct KilnFormatMapping {
    pub format: KilnFormat,
    pub dxgi_raw: u32,
    pub vk_raw: i32,
}

const fn mapping(
    format: KilnFormat,
    dxgi_raw: u32,
    vk_raw: i32,
) -> KilnFormatMapping {
    KilnFormatMapping {
        format,
        dxgi_raw,
        vk_raw,
    }
}

/// Built at compile time so lookups never race and never allocate. `Unknown`
/// deliberately has no row, lookups that miss fall back to it.
pub const FORMAT_TABLE: &[KilnFormatMapping] = &[
    mapping(KilnFormat::R8Unorm, 61, 9),
    mapping(KilnFormat::R8G8B8A8Unorm, 28, 37),
    mapping(KilnFormat::R8G8B8A8Srgb, 29, 43),
    mapping(KilnFormat::B8G8R8A8Unorm, 87, 44),
    mapping(KilnFormat::B8G8R8A8Srgb, 91, 50),
    mapping(KilnFormat::R10G10B10A2Unorm, 24, 64),
    mapping(KilnFormat::R11G11B10Float, 26, 122),
    mapping(KilnFormat::R16Float, 54, 76),
    mapping(KilnFormat::R16G16Float, 34, 83),
    mapping(KilnFormat::R16G16B16A16Float, 10, 97),
    mapping(KilnFormat::R32Uint, 42, 98),
    mapping(KilnFormat::R32Float, 41, 100),
    mapping(KilnFormat::R32G32Float, 16, 103),
    mapping(KilnFormat::R32G32B32A32Float, 2, 109),
    mapping(KilnFormat::D16Unorm, 55, 124),
    mapping(KilnFormat::D24UnormS8Uint, 45, 129),
    mapping(KilnFormat::D32Float, 40, 126),
    mapping(KilnFormat::D32FloatS8Uint, 20, 130),
];

impl KilnFormat {
    fn table_entry(self) -> Option<&'static KilnFormatMapping> {
        FORMAT_TABLE.iter().find(|x| x.format == self)
    }

    /// The raw numeric `DXGI_FORMAT` value, `DXGI_FORMAT_UNKNOWN` (0) for
    /// `Unknown`
    pub fn to_dxgi_raw(self) -> u32 {
        self.table_entry().map(|x| x.dxgi_raw).unwrap_or(0)
    }

    /// The raw numeric `VkFormat` value, `VK_FORMAT_UNDEFINED` (0) for
    /// `Unknown`
    pub fn to_vk_raw(self) -> i32 {
        self.table_entry().map(|x| x.vk_raw).unwrap_or(0)
    }

    pub fn from_dxgi_raw(raw: u32) -> KilnFormat {
        FORMAT_TABLE
            .iter()
            .find(|x| x.dxgi_raw == raw)
            .map(|x| x.format)
            .unwrap_or(KilnFormat::Unknown)
    }

    pub fn from_vk_raw(raw: i32) -> KilnFormat {
        FORMAT_TABLE
            .iter()
            .find(|x| x.vk_raw == raw)
            .map(|x| x.format)
            .unwrap_or(KilnFormat::Unknown)
    }

    pub fn is_undefined(self) -> bool {
        self == KilnFormat::Unknown
    }

    pub fn has_depth(self) -> bool {
        matches!(
            self,
            KilnFormat::D16Unorm
                | KilnFormat::D24UnormS8Uint
                | KilnFormat::D32Float
                | KilnFormat::D32FloatS8Uint
        )
    }

    pub fn has_stencil(self) -> bool {
        matches!(self, KilnFormat::D24UnormS8Uint | KilnFormat::D32FloatS8Uint)
    }

    pub fn has_depth_or_stencil(self) -> bool {
        self.has_depth() || self.has_stencil()
    }

    /// Bytes per texel. Depth/stencil formats report their packed native size.
    pub fn block_size_in_bytes(self) -> u32 {
        match self {
            KilnFormat::Unknown => 0,
            KilnFormat::R8Unorm => 1,
            KilnFormat::R16Float | KilnFormat::D16Unorm => 2,
            KilnFormat::R8G8B8A8Unorm
            | KilnFormat::R8G8B8A8Srgb
            | KilnFormat::B8G8R8A8Unorm
            | KilnFormat::B8G8R8A8Srgb
            | KilnFormat::R10G10B10A2Unorm
            | KilnFormat::R11G11B10Float
            | KilnFormat::R16G16Float
            | KilnFormat::R32Uint
            | KilnFormat::R32Float
            | KilnFormat::D24UnormS8Uint
            | KilnFormat::D32Float => 4,
            KilnFormat::R16G16B16A16Float
            | KilnFormat::R32G32Float
            | KilnFormat::D32FloatS8Uint => 8,
            KilnFormat::R32G32B32A32Float => 16,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dxgi_round_trip_is_closed() {
        for entry in FORMAT_TABLE {
            let raw = entry.format.to_dxgi_raw();
            assert_eq!(raw, entry.dxgi_raw);
            assert_eq!(KilnFormat::from_dxgi_raw(raw), entry.format);
        }
    }

    #[test]
    fn vk_round_trip_is_closed() {
        for entry in FORMAT_TABLE {
            let raw = entry.format.to_vk_raw();
            assert_eq!(raw, entry.vk_raw);
            assert_eq!(KilnFormat::from_vk_raw(raw), entry.format);
        }
    }

    #[test]
    fn unmapped_raw_values_fall_back_to_unknown() {
        // DXGI_FORMAT_R32G32B32A32_TYPELESS and a nonsense value
        assert_eq!(KilnFormat::from_dxgi_raw(1), KilnFormat::Unknown);
        assert_eq!(KilnFormat::from_dxgi_raw(0xFFFF), KilnFormat::Unknown);
        // VK_FORMAT_R4G4_UNORM_PACK8 and a nonsense value
        assert_eq!(KilnFormat::from_vk_raw(1), KilnFormat::Unknown);
        assert_eq!(KilnFormat::from_vk_raw(-5), KilnFormat::Unknown);
        assert_eq!(KilnFormat::Unknown.to_dxgi_raw(), 0);
        assert_eq!(KilnFormat::Unknown.to_vk_raw(), 0);
    }

    #[test]
    fn raw_values_are_unique() {
        for (i, a) in FORMAT_TABLE.iter().enumerate() {
            for b in &FORMAT_TABLE[i + 1..] {
                assert_ne!(a.dxgi_raw, b.dxgi_raw);
                assert_ne!(a.vk_raw, b.vk_raw);
            }
        }
    }

    #[test]
    fn depth_stencil_predicates() {
        assert!(KilnFormat::D24UnormS8Uint.has_depth());
        assert!(KilnFormat::D24UnormS8Uint.has_stencil());
        assert!(KilnFormat::D32Float.has_depth());
        assert!(!KilnFormat::D32Float.has_stencil());
        assert!(!KilnFormat::R8G8B8A8Unorm.has_depth_or_stencil());
    }
}
