use crate::soft::KilnSamplerSoft;
use crate::KilnSamplerDef;

/// Configures how images will be sampled by the GPU
#[derive(Clone, Debug)]
pub enum KilnSampler {
    Soft(KilnSamplerSoft),
}

impl KilnSampler {
    pub fn sampler_def(&self) -> &KilnSamplerDef {
        match self {
            KilnSampler::Soft(inner) => inner.sampler_def(),
        }
    }

    pub fn soft_sampler(&self) -> Option<&KilnSamplerSoft> {
        match self {
            KilnSampler::Soft(inner) => Some(inner),
        }
    }
}
