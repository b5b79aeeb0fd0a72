use super::KilnDeviceContextNull;
use crate::root_signature::{allocate_signature_id, KilnBindingModel};
use crate::{KilnResult, KilnRootSignatureDef, KilnRootSignatureFlags};
use std::sync::Arc;

#[derive(Debug)]
struct KilnRootSignatureNullInner {
    // Keeps the counters alive as long as anything references the layout
    _device_context: KilnDeviceContextNull,
    binding_model: KilnBindingModel,
    flags: KilnRootSignatureFlags,
    signature_id: u64,
}

#[derive(Clone, Debug)]
pub struct KilnRootSignatureNull {
    inner: Arc<KilnRootSignatureNullInner>,
}

impl KilnRootSignatureNull {
    pub(crate) fn new(
        device_context: &KilnDeviceContextNull,
        root_signature_def: &KilnRootSignatureDef,
        name: &str,
        flags: KilnRootSignatureFlags,
    ) -> KilnResult<Self> {
        let binding_model = root_signature_def.build_binding_model();
        let signature_id = allocate_signature_id();

        log::trace!(
            "created root signature {:?} (id {}) with {} parameters and {} static samplers",
            name,
            signature_id,
            binding_model.parameters.len(),
            binding_model.static_samplers.len()
        );

        Ok(KilnRootSignatureNull {
            inner: Arc::new(KilnRootSignatureNullInner {
                _device_context: device_context.clone(),
                binding_model,
                flags,
                signature_id,
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
}
