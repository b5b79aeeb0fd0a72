use super::KilnDeviceContextNull;
use crate::resource_set::DescriptorWrite;
use crate::KilnResult;

/// Descriptor storage that goes nowhere. Records the batch sizes the native backends
/// would have submitted.
#[derive(Debug)]
pub struct KilnResourceSetNull {
    device_context: KilnDeviceContextNull,
}

impl KilnResourceSetNull {
    pub(crate) fn new(device_context: &KilnDeviceContextNull) -> Self {
        KilnResourceSetNull {
            device_context: device_context.clone(),
        }
    }

    pub(crate) fn flush(
        &mut self,
        writes: &[DescriptorWrite],
    ) -> KilnResult<()> {
        debug_assert!(!writes.is_empty());
        self.device_context.record_descriptor_batch(writes.len());
        Ok(())
    }
}
