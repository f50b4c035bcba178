use crate::soft::{KilnApiSoft, KilnDeviceSoft};
use crate::*;

/// Primary entry point to using the API. Use the `new_*` functions to initialize the desired
/// backend.
///
/// Once the API object is created, use `device()` to obtain a cloneable handle to the device.
/// The `KilnDevice` is the factory for every other object.
pub enum KilnApi {
    Soft(KilnApiSoft),
}

impl KilnApi {
    /// Create a device using the default backend
    pub fn new(api_def: &KilnApiDef) -> KilnResult<Self> {
        KilnApi::new_soft(api_def, &Default::default())
    }

    /// Initialize a device using the CPU-memory software backend
    pub fn new_soft(
        api_def: &KilnApiDef,
        soft_api_def: &KilnApiDefSoft,
    ) -> KilnResult<Self> {
        Ok(KilnApi::Soft(KilnApiSoft::new(api_def, soft_api_def)?))
    }

    /// Create a cloneable handle to the device. Dropping the handle does nothing, it can be
    /// obtained again by calling this function.
    pub fn device(&self) -> KilnDevice {
        match self {
            KilnApi::Soft(inner) => KilnDevice::Soft(inner.device().clone()),
        }
    }

    /// Get the underlying soft API object. This provides access to any internally created
    /// soft objects, like the command log.
    pub fn soft_api(&self) -> Option<&KilnApiSoft> {
        match self {
            KilnApi::Soft(inner) => Some(inner),
        }
    }

    pub fn soft_device(&self) -> Option<&KilnDeviceSoft> {
        match self {
            KilnApi::Soft(inner) => Some(inner.device()),
        }
    }
}
