use crate::soft::KilnDeviceSoft;
use crate::{KilnApiDef, KilnApiDefSoft, KilnResult};

pub struct KilnApiSoft {
    device: KilnDeviceSoft,
}

impl KilnApiSoft {
    pub fn device(&self) -> &KilnDeviceSoft {
        &self.device
    }

    pub fn new(
        api_def: &KilnApiDef,
        soft_api_def: &KilnApiDefSoft,
    ) -> KilnResult<Self> {
        soft_api_def.verify()?;

        log::info!(
            "Creating soft device (validation {:?}, row pitch alignment {}, max samples {})",
            api_def.validation_mode,
            soft_api_def.row_pitch_alignment,
            soft_api_def.max_sample_count
        );

        let device = KilnDeviceSoft::new(api_def, soft_api_def)?;
        Ok(KilnApiSoft { device })
    }
}

impl Drop for KilnApiSoft {
    fn drop(&mut self) {
        log::trace!(
            "Destroying soft api, {} commands were recorded",
            self.device.context().total_recorded()
        );
    }
}
