#[cfg(feature = "kiln-dx12")]
use crate::dx12::KilnRootSignatureDx12;
use crate::null::KilnRootSignatureNull;
#[cfg(feature = "kiln-vulkan")]
use crate::vulkan::KilnRootSignatureVulkan;
use crate::{
    KilnDescriptorRangeType, KilnRootSignatureFlags, KilnSamplerDef, KilnShaderVisibility,
    MAX_DESCRIPTORS_PER_SET, MAX_ROOT_PARAMETERS,
};
use fnv::FnvHashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SIGNATURE_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn allocate_signature_id() -> u64 {
    NEXT_SIGNATURE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A contiguous run of descriptors of one kind within a descriptor table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KilnRootParameterRange {
    pub range_type: KilnDescriptorRangeType,
    pub base_register: u32,
    pub descriptor_count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KilnRootParameterKind {
    /// A single constant buffer view. When `dynamic` is true the bound offset can be
    /// adjusted per draw without rewriting the descriptor.
    ConstantBuffer { register: u32, dynamic: bool },
    /// A table of one or more descriptor ranges
    DescriptorTable {
        ranges: Vec<KilnRootParameterRange>,
    },
}

/// A finalized root parameter, queryable on the root signature after creation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KilnRootParameterInfo {
    pub kind: KilnRootParameterKind,
    pub visibility: KilnShaderVisibility,
    // First flat descriptor slot this parameter occupies within the signature
    pub(crate) first_slot: u32,
}

impl KilnRootParameterInfo {
    pub fn descriptor_count(&self) -> u32 {
        match &self.kind {
            KilnRootParameterKind::ConstantBuffer { .. } => 1,
            KilnRootParameterKind::DescriptorTable { ranges } => {
                ranges.iter().map(|x| x.descriptor_count).sum()
            }
        }
    }

    pub fn is_dynamic_constant_buffer(&self) -> bool {
        matches!(
            self.kind,
            KilnRootParameterKind::ConstantBuffer { dynamic: true, .. }
        )
    }

    /// The kind of descriptor at a flat index into this parameter, walking table ranges
    /// in declaration order. None if the index is out of bounds.
    pub fn range_type_at(
        &self,
        array_index: u32,
    ) -> Option<KilnDescriptorRangeType> {
        match &self.kind {
            KilnRootParameterKind::ConstantBuffer { .. } => {
                if array_index == 0 {
                    Some(KilnDescriptorRangeType::ConstantBuffer)
                } else {
                    None
                }
            }
            KilnRootParameterKind::DescriptorTable { ranges } => {
                let mut remaining = array_index;
                for range in ranges {
                    if remaining < range.descriptor_count {
                        return Some(range.range_type);
                    }
                    remaining -= range.descriptor_count;
                }
                None
            }
        }
    }
}

/// A sampler baked directly into the root signature rather than bound through a set
#[derive(Clone, Debug, PartialEq)]
pub struct KilnStaticSamplerInfo {
    pub sampler_def: KilnSamplerDef,
    pub visibility: KilnShaderVisibility,
    pub register: u32,
}

/// The finalized, backend-neutral description of a root signature's binding shape.
/// Backends derive their native layout objects from this.
#[derive(Clone, Debug)]
pub(crate) struct KilnBindingModel {
    pub parameters: Vec<KilnRootParameterInfo>,
    pub static_samplers: Vec<KilnStaticSamplerInfo>,
    pub name_to_parameter: FnvHashMap<String, u32>,
    pub total_slots: u32,
}

impl KilnBindingModel {
    /// Flat slot index of one descriptor within the signature
    pub fn slot_index(
        &self,
        param_index: u32,
        array_index: u32,
    ) -> usize {
        let parameter = &self.parameters[param_index as usize];
        debug_assert!(array_index < parameter.descriptor_count());
        (parameter.first_slot + array_index) as usize
    }
}

#[derive(Clone, Debug)]
enum PendingParameter {
    ConstantBuffer {
        register: u32,
        dynamic: bool,
        visibility: KilnShaderVisibility,
    },
    DescriptorTable {
        visibility: KilnShaderVisibility,
        ranges: Vec<Option<KilnRootParameterRange>>,
    },
}

/// Describes the binding shape of a root signature. Every root parameter and static
/// sampler declared at construction must be configured with one of the `init_*` calls
/// before the def can be finalized with
/// [`KilnDeviceContext::create_root_signature`](crate::KilnDeviceContext::create_root_signature).
#[derive(Clone, Debug, Default)]
pub struct KilnRootSignatureDef {
    parameters: Vec<Option<PendingParameter>>,
    static_samplers: Vec<Option<KilnStaticSamplerInfo>>,
    parameter_names: FnvHashMap<String, u32>,
}

impl KilnRootSignatureDef {
    pub fn new(
        num_root_parameters: usize,
        num_static_samplers: usize,
    ) -> Self {
        let mut def = KilnRootSignatureDef::default();
        def.reset(num_root_parameters, num_static_samplers);
        def
    }

    /// Discards all configured parameters and resizes the def
    pub fn reset(
        &mut self,
        num_root_parameters: usize,
        num_static_samplers: usize,
    ) {
        assert!(num_root_parameters <= MAX_ROOT_PARAMETERS);
        self.parameters.clear();
        self.parameters.resize(num_root_parameters, None);
        self.static_samplers.clear();
        self.static_samplers.resize(num_static_samplers, None);
        self.parameter_names.clear();
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn init_as_constant_buffer(
        &mut self,
        param_index: u32,
        register: u32,
        visibility: KilnShaderVisibility,
    ) {
        self.set_parameter(
            param_index,
            PendingParameter::ConstantBuffer {
                register,
                dynamic: false,
                visibility,
            },
        );
    }

    pub fn init_as_dynamic_constant_buffer(
        &mut self,
        param_index: u32,
        register: u32,
        visibility: KilnShaderVisibility,
    ) {
        self.set_parameter(
            param_index,
            PendingParameter::ConstantBuffer {
                register,
                dynamic: true,
                visibility,
            },
        );
    }

    /// Shorthand for a descriptor table holding a single range
    pub fn init_as_descriptor_range(
        &mut self,
        param_index: u32,
        range_type: KilnDescriptorRangeType,
        base_register: u32,
        descriptor_count: u32,
        visibility: KilnShaderVisibility,
    ) {
        assert!(descriptor_count > 0);
        self.set_parameter(
            param_index,
            PendingParameter::DescriptorTable {
                visibility,
                ranges: vec![Some(KilnRootParameterRange {
                    range_type,
                    base_register,
                    descriptor_count,
                })],
            },
        );
    }

    /// Declares a table with `num_ranges` ranges, each to be filled in with
    /// [`set_table_range`](Self::set_table_range)
    pub fn init_as_descriptor_table(
        &mut self,
        param_index: u32,
        num_ranges: usize,
        visibility: KilnShaderVisibility,
    ) {
        assert!(num_ranges > 0);
        self.set_parameter(
            param_index,
            PendingParameter::DescriptorTable {
                visibility,
                ranges: vec![None; num_ranges],
            },
        );
    }

    pub fn set_table_range(
        &mut self,
        param_index: u32,
        range_index: usize,
        range_type: KilnDescriptorRangeType,
        base_register: u32,
        descriptor_count: u32,
    ) {
        assert!(descriptor_count > 0);
        match &mut self.parameters[param_index as usize] {
            Some(PendingParameter::DescriptorTable { ranges, .. }) => {
                ranges[range_index] = Some(KilnRootParameterRange {
                    range_type,
                    base_register,
                    descriptor_count,
                });
            }
            _ => panic!(
                "root parameter {} is not a descriptor table",
                param_index
            ),
        }
    }

    pub fn init_static_sampler(
        &mut self,
        sampler_index: u32,
        sampler_def: &KilnSamplerDef,
        register: u32,
        visibility: KilnShaderVisibility,
    ) {
        self.static_samplers[sampler_index as usize] = Some(KilnStaticSamplerInfo {
            sampler_def: sampler_def.clone(),
            visibility,
            register,
        });
    }

    /// Optional debug/lookup name for a root parameter
    pub fn set_parameter_name(
        &mut self,
        param_index: u32,
        name: &str,
    ) {
        assert!((param_index as usize) < self.parameters.len());
        self.parameter_names.insert(name.to_string(), param_index);
    }

    fn set_parameter(
        &mut self,
        param_index: u32,
        parameter: PendingParameter,
    ) {
        self.parameters[param_index as usize] = Some(parameter);
    }

    /// Finalize-time validation. Panics if any declared parameter, table range, or
    /// static sampler was never configured.
    pub(crate) fn build_binding_model(&self) -> KilnBindingModel {
        let mut parameters = Vec::with_capacity(self.parameters.len());
        let mut next_slot = 0u32;

        for (param_index, pending) in self.parameters.iter().enumerate() {
            let pending = pending.as_ref().unwrap_or_else(|| {
                panic!("root parameter {} was never configured", param_index)
            });

            let info = match pending {
                PendingParameter::ConstantBuffer {
                    register,
                    dynamic,
                    visibility,
                } => KilnRootParameterInfo {
                    kind: KilnRootParameterKind::ConstantBuffer {
                        register: *register,
                        dynamic: *dynamic,
                    },
                    visibility: *visibility,
                    first_slot: next_slot,
                },
                PendingParameter::DescriptorTable { visibility, ranges } => {
                    let ranges: Vec<_> = ranges
                        .iter()
                        .enumerate()
                        .map(|(range_index, range)| {
                            range.clone().unwrap_or_else(|| {
                                panic!(
                                    "range {} of root parameter {} was never configured",
                                    range_index, param_index
                                )
                            })
                        })
                        .collect();

                    KilnRootParameterInfo {
                        kind: KilnRootParameterKind::DescriptorTable { ranges },
                        visibility: *visibility,
                        first_slot: next_slot,
                    }
                }
            };

            next_slot += info.descriptor_count();
            parameters.push(info);
        }

        assert!(
            next_slot as usize <= MAX_DESCRIPTORS_PER_SET,
            "root signature declares {} descriptors, the limit is {}",
            next_slot,
            MAX_DESCRIPTORS_PER_SET
        );

        let static_samplers: Vec<_> = self
            .static_samplers
            .iter()
            .enumerate()
            .map(|(sampler_index, sampler)| {
                sampler.clone().unwrap_or_else(|| {
                    panic!("static sampler {} was never configured", sampler_index)
                })
            })
            .collect();

        KilnBindingModel {
            parameters,
            static_samplers,
            name_to_parameter: self.parameter_names.clone(),
            total_slots: next_slot,
        }
    }
}

/// An immutable, finalized binding layout. Cheap to clone, pipelines and resource sets
/// hold clones so the layout cannot be destroyed while anything references it.
#[derive(Clone, Debug)]
pub enum KilnRootSignature {
    Null(KilnRootSignatureNull),
    #[cfg(feature = "kiln-vulkan")]
    Vk(KilnRootSignatureVulkan),
    #[cfg(feature = "kiln-dx12")]
    Dx12(KilnRootSignatureDx12),
}

impl KilnRootSignature {
    pub(crate) fn binding_model(&self) -> &KilnBindingModel {
        match self {
            KilnRootSignature::Null(inner) => inner.binding_model(),
            #[cfg(feature = "kiln-vulkan")]
            KilnRootSignature::Vk(inner) => inner.binding_model(),
            #[cfg(feature = "kiln-dx12")]
            KilnRootSignature::Dx12(inner) => inner.binding_model(),
        }
    }

    /// Process-unique identity, used to match pipelines against bound signatures
    pub fn signature_id(&self) -> u64 {
        match self {
            KilnRootSignature::Null(inner) => inner.signature_id(),
            #[cfg(feature = "kiln-vulkan")]
            KilnRootSignature::Vk(inner) => inner.signature_id(),
            #[cfg(feature = "kiln-dx12")]
            KilnRootSignature::Dx12(inner) => inner.signature_id(),
        }
    }

    pub fn flags(&self) -> KilnRootSignatureFlags {
        match self {
            KilnRootSignature::Null(inner) => inner.flags(),
            #[cfg(feature = "kiln-vulkan")]
            KilnRootSignature::Vk(inner) => inner.flags(),
            #[cfg(feature = "kiln-dx12")]
            KilnRootSignature::Dx12(inner) => inner.flags(),
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.binding_model().parameters.len()
    }

    pub fn parameter(
        &self,
        param_index: u32,
    ) -> &KilnRootParameterInfo {
        &self.binding_model().parameters[param_index as usize]
    }

    pub fn static_sampler_count(&self) -> usize {
        self.binding_model().static_samplers.len()
    }

    pub fn static_sampler(
        &self,
        sampler_index: u32,
    ) -> &KilnStaticSamplerInfo {
        &self.binding_model().static_samplers[sampler_index as usize]
    }

    pub fn find_parameter_by_name(
        &self,
        name: &str,
    ) -> Option<u32> {
        self.binding_model().name_to_parameter.get(name).copied()
    }

    pub fn null_root_signature(&self) -> Option<&KilnRootSignatureNull> {
        match self {
            KilnRootSignature::Null(inner) => Some(inner),
            #[cfg(any(feature = "kiln-vulkan", feature = "kiln-dx12"))]
            _ => None,
        }
    }

    #[cfg(feature = "kiln-vulkan")]
    pub fn vk_root_signature(&self) -> Option<&KilnRootSignatureVulkan> {
        match self {
            KilnRootSignature::Vk(inner) => Some(inner),
            _ => None,
        }
    }

    #[cfg(feature = "kiln-dx12")]
    pub fn dx12_root_signature(&self) -> Option<&KilnRootSignatureDx12> {
        match self {
            KilnRootSignature::Dx12(inner) => Some(inner),
            _ => None,
        }
    }
}

impl PartialEq for KilnRootSignature {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.signature_id() == other.signature_id()
    }
}

impl Eq for KilnRootSignature {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{KilnDeviceContext, KilnSamplerDef, KilnShaderVisibility};

    #[test]
    fn parameters_are_queryable_after_creation() {
        let device_context = KilnDeviceContext::new_null();

        let mut def = KilnRootSignatureDef::new(3, 1);
        def.init_as_constant_buffer(0, 0, KilnShaderVisibility::Vertex);
        def.init_as_dynamic_constant_buffer(1, 1, KilnShaderVisibility::All);
        def.init_as_descriptor_table(2, 2, KilnShaderVisibility::Pixel);
        def.set_table_range(2, 0, KilnDescriptorRangeType::TextureSrv, 0, 4);
        def.set_table_range(2, 1, KilnDescriptorRangeType::BufferUav, 0, 2);
        def.init_static_sampler(0, &KilnSamplerDef::default(), 0, KilnShaderVisibility::Pixel);
        def.set_parameter_name(2, "materials");

        let signature = device_context
            .create_root_signature(&def, "queryable", KilnRootSignatureFlags::NONE)
            .unwrap();

        assert_eq!(signature.parameter_count(), 3);
        assert_eq!(signature.static_sampler_count(), 1);

        assert_eq!(signature.parameter(0).descriptor_count(), 1);
        assert!(!signature.parameter(0).is_dynamic_constant_buffer());
        assert!(signature.parameter(1).is_dynamic_constant_buffer());

        let table = signature.parameter(2);
        assert_eq!(table.descriptor_count(), 6);
        assert_eq!(
            table.range_type_at(0),
            Some(KilnDescriptorRangeType::TextureSrv)
        );
        assert_eq!(
            table.range_type_at(3),
            Some(KilnDescriptorRangeType::TextureSrv)
        );
        assert_eq!(
            table.range_type_at(4),
            Some(KilnDescriptorRangeType::BufferUav)
        );
        assert_eq!(table.range_type_at(6), None);

        assert_eq!(signature.find_parameter_by_name("materials"), Some(2));
        assert_eq!(signature.find_parameter_by_name("missing"), None);
    }

    #[test]
    fn identity_is_per_object_not_per_def() {
        let device_context = KilnDeviceContext::new_null();

        let mut def = KilnRootSignatureDef::new(1, 0);
        def.init_as_constant_buffer(0, 0, KilnShaderVisibility::All);

        let a = device_context
            .create_root_signature(&def, "a", KilnRootSignatureFlags::NONE)
            .unwrap();
        let b = device_context
            .create_root_signature(&def, "b", KilnRootSignatureFlags::NONE)
            .unwrap();

        assert_ne!(a.signature_id(), b.signature_id());
        assert!(a != b);
        assert!(a == a.clone());
    }

    #[test]
    #[should_panic(expected = "root parameter 1 was never configured")]
    fn unconfigured_parameter_panics_at_creation() {
        let device_context = KilnDeviceContext::new_null();
        let mut def = KilnRootSignatureDef::new(2, 0);
        def.init_as_constant_buffer(0, 0, KilnShaderVisibility::All);
        let _ = device_context.create_root_signature(
            &def,
            "incomplete",
            KilnRootSignatureFlags::NONE,
        );
    }

    #[test]
    #[should_panic(expected = "range 1 of root parameter 0 was never configured")]
    fn unconfigured_table_range_panics_at_creation() {
        let device_context = KilnDeviceContext::new_null();
        let mut def = KilnRootSignatureDef::new(1, 0);
        def.init_as_descriptor_table(0, 2, KilnShaderVisibility::All);
        def.set_table_range(0, 0, KilnDescriptorRangeType::TextureSrv, 0, 1);
        let _ = device_context.create_root_signature(
            &def,
            "incomplete",
            KilnRootSignatureFlags::NONE,
        );
    }

    #[test]
    #[should_panic(expected = "static sampler 0 was never configured")]
    fn unconfigured_static_sampler_panics_at_creation() {
        let device_context = KilnDeviceContext::new_null();
        let mut def = KilnRootSignatureDef::new(1, 1);
        def.init_as_constant_buffer(0, 0, KilnShaderVisibility::All);
        let _ = device_context.create_root_signature(
            &def,
            "incomplete",
            KilnRootSignatureFlags::NONE,
        );
    }
}
