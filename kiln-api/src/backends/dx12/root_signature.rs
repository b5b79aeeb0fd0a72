use super::{util, KilnDeviceContextDx12};
use crate::root_signature::{allocate_signature_id, KilnBindingModel, KilnRootParameterKind};
use crate::{
    KilnDescriptorRangeType, KilnResult, KilnRootSignatureDef, KilnRootSignatureFlags,
};
use std::sync::Arc;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;

fn range_type_to_dx12(range_type: KilnDescriptorRangeType) -> D3D12_DESCRIPTOR_RANGE_TYPE {
    match range_type {
        KilnDescriptorRangeType::ConstantBuffer => D3D12_DESCRIPTOR_RANGE_TYPE_CBV,
        KilnDescriptorRangeType::TextureSrv | KilnDescriptorRangeType::BufferSrv => {
            D3D12_DESCRIPTOR_RANGE_TYPE_SRV
        }
        KilnDescriptorRangeType::TextureUav | KilnDescriptorRangeType::BufferUav => {
            D3D12_DESCRIPTOR_RANGE_TYPE_UAV
        }
        KilnDescriptorRangeType::Sampler => D3D12_DESCRIPTOR_RANGE_TYPE_SAMPLER,
    }
}

fn signature_flags_to_dx12(flags: KilnRootSignatureFlags) -> D3D12_ROOT_SIGNATURE_FLAGS {
    let mut native = D3D12_ROOT_SIGNATURE_FLAG_NONE;
    if flags.intersects(KilnRootSignatureFlags::ALLOW_INPUT_ASSEMBLER_INPUT) {
        native |= D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT;
    }
    if flags.intersects(KilnRootSignatureFlags::DENY_VERTEX_SHADER_ACCESS) {
        native |= D3D12_ROOT_SIGNATURE_FLAG_DENY_VERTEX_SHADER_ROOT_ACCESS;
    }
    if flags.intersects(KilnRootSignatureFlags::DENY_HULL_SHADER_ACCESS) {
        native |= D3D12_ROOT_SIGNATURE_FLAG_DENY_HULL_SHADER_ROOT_ACCESS;
    }
    if flags.intersects(KilnRootSignatureFlags::DENY_DOMAIN_SHADER_ACCESS) {
        native |= D3D12_ROOT_SIGNATURE_FLAG_DENY_DOMAIN_SHADER_ROOT_ACCESS;
    }
    if flags.intersects(KilnRootSignatureFlags::DENY_GEOMETRY_SHADER_ACCESS) {
        native |= D3D12_ROOT_SIGNATURE_FLAG_DENY_GEOMETRY_SHADER_ROOT_ACCESS;
    }
    if flags.intersects(KilnRootSignatureFlags::DENY_PIXEL_SHADER_ACCESS) {
        native |= D3D12_ROOT_SIGNATURE_FLAG_DENY_PIXEL_SHADER_ROOT_ACCESS;
    }
    native
}

#[derive(Debug)]
struct KilnRootSignatureDx12Inner {
    _device_context: KilnDeviceContextDx12,
    binding_model: KilnBindingModel,
    flags: KilnRootSignatureFlags,
    signature_id: u64,
    root_signature: ID3D12RootSignature,
}

#[derive(Clone, Debug)]
pub struct KilnRootSignatureDx12 {
    inner: Arc<KilnRootSignatureDx12Inner>,
}

impl KilnRootSignatureDx12 {
    pub(crate) fn new(
        device_context: &KilnDeviceContextDx12,
        root_signature_def: &KilnRootSignatureDef,
        name: &str,
        flags: KilnRootSignatureFlags,
    ) -> KilnResult<Self> {
        let binding_model = root_signature_def.build_binding_model();
        let signature_id = allocate_signature_id();

        // Range arrays must outlive the desc, parked per parameter
        let mut range_storage: Vec<Vec<D3D12_DESCRIPTOR_RANGE>> = Vec::new();
        let mut root_parameters = Vec::with_capacity(binding_model.parameters.len());

        for parameter in &binding_model.parameters {
            let visibility = util::shader_visibility_to_dx12(parameter.visibility);
            match &parameter.kind {
                KilnRootParameterKind::ConstantBuffer { register, .. } => {
                    // Root CBVs serve both static and dynamic constant buffers, dynamic
                    // offsets are folded into the GPU virtual address at bind time
                    root_parameters.push(D3D12_ROOT_PARAMETER {
                        ParameterType: D3D12_ROOT_PARAMETER_TYPE_CBV,
                        Anonymous: D3D12_ROOT_PARAMETER_0 {
                            Descriptor: D3D12_ROOT_DESCRIPTOR {
                                ShaderRegister: *register,
                                RegisterSpace: 0,
                            },
                        },
                        ShaderVisibility: visibility,
                    });
                }
                KilnRootParameterKind::DescriptorTable { ranges } => {
                    let native_ranges: Vec<D3D12_DESCRIPTOR_RANGE> = ranges
                        .iter()
                        .map(|range| D3D12_DESCRIPTOR_RANGE {
                            RangeType: range_type_to_dx12(range.range_type),
                            NumDescriptors: range.descriptor_count,
                            BaseShaderRegister: range.base_register,
                            RegisterSpace: 0,
                            OffsetInDescriptorsFromTableStart:
                                D3D12_DESCRIPTOR_RANGE_OFFSET_APPEND,
                        })
                        .collect();
                    range_storage.push(native_ranges);
                    let native_ranges = range_storage.last().unwrap();

                    root_parameters.push(D3D12_ROOT_PARAMETER {
                        ParameterType: D3D12_ROOT_PARAMETER_TYPE_DESCRIPTOR_TABLE,
                        Anonymous: D3D12_ROOT_PARAMETER_0 {
                            DescriptorTable: D3D12_ROOT_DESCRIPTOR_TABLE {
                                NumDescriptorRanges: native_ranges.len() as u32,
                                pDescriptorRanges: native_ranges.as_ptr(),
                            },
                        },
                        ShaderVisibility: visibility,
                    });
                }
            }
        }

        let static_samplers: Vec<D3D12_STATIC_SAMPLER_DESC> = binding_model
            .static_samplers
            .iter()
            .map(|static_sampler| {
                let desc = util::sampler_desc_to_dx12(&static_sampler.sampler_def);
                D3D12_STATIC_SAMPLER_DESC {
                    Filter: desc.Filter,
                    AddressU: desc.AddressU,
                    AddressV: desc.AddressV,
                    AddressW: desc.AddressW,
                    MipLODBias: desc.MipLODBias,
                    MaxAnisotropy: desc.MaxAnisotropy,
                    ComparisonFunc: desc.ComparisonFunc,
                    BorderColor: D3D12_STATIC_BORDER_COLOR_TRANSPARENT_BLACK,
                    MinLOD: desc.MinLOD,
                    MaxLOD: desc.MaxLOD,
                    ShaderRegister: static_sampler.register,
                    RegisterSpace: 0,
                    ShaderVisibility: util::shader_visibility_to_dx12(static_sampler.visibility),
                }
            })
            .collect();

        let desc = D3D12_ROOT_SIGNATURE_DESC {
            NumParameters: root_parameters.len() as u32,
            pParameters: root_parameters.as_ptr(),
            NumStaticSamplers: static_samplers.len() as u32,
            pStaticSamplers: static_samplers.as_ptr(),
            Flags: signature_flags_to_dx12(flags),
        };

        let mut blob: Option<ID3DBlob> = None;
        let mut error_blob: Option<ID3DBlob> = None;
        let serialize_result = unsafe {
            D3D12SerializeRootSignature(
                &desc,
                D3D_ROOT_SIGNATURE_VERSION_1,
                &mut blob,
                Some(&mut error_blob),
            )
        };
        if let Err(e) = serialize_result {
            if let Some(error_blob) = &error_blob {
                let message = unsafe {
                    let bytes = std::slice::from_raw_parts(
                        error_blob.GetBufferPointer() as *const u8,
                        error_blob.GetBufferSize(),
                    );
                    String::from_utf8_lossy(bytes).into_owned()
                };
                log::error!("root signature {:?} failed to serialize: {}", name, message);
            }
            return Err(e)?;
        }
        let blob = blob.unwrap();

        let root_signature: ID3D12RootSignature = unsafe {
            let bytes = std::slice::from_raw_parts(
                blob.GetBufferPointer() as *const u8,
                blob.GetBufferSize(),
            );
            device_context.inner.device.CreateRootSignature(0, bytes)?
        };

        log::trace!(
            "created root signature {:?} (id {}) with {} parameters and {} static samplers",
            name,
            signature_id,
            binding_model.parameters.len(),
            binding_model.static_samplers.len()
        );

        Ok(KilnRootSignatureDx12 {
            inner: Arc::new(KilnRootSignatureDx12Inner {
                _device_context: device_context.clone(),
                binding_model,
                flags,
                signature_id,
                root_signature,
            }),
        })
    }

    pub(crate) fn binding_model(&self) -> &KilnBindingModel {
        &self.inner.binding_model
    }

    pub fn flags(&self) -> KilnRootSignatureFlags {
        self.inner.flags
    }

    pub fn signature_id(&self) -> u64 {
        self.inner.signature_id
    }

    pub fn dx12_root_signature(&self) -> &ID3D12RootSignature {
        &self.inner.root_signature
    }
}
