use crate::soft::{KilnBlendStateSoft, KilnDepthStencilStateSoft, KilnRasterizerStateSoft};
use crate::{KilnBlendStateDef, KilnDepthStencilStateDef, KilnRasterizerStateDef};

/// Immutable output merger blend configuration
#[derive(Clone, Debug)]
pub enum KilnBlendState {
    Soft(KilnBlendStateSoft),
}

impl KilnBlendState {
    pub fn blend_state_def(&self) -> &KilnBlendStateDef {
        match self {
            KilnBlendState::Soft(inner) => inner.blend_state_def(),
        }
    }

    pub fn soft_blend_state(&self) -> Option<&KilnBlendStateSoft> {
        match self {
            KilnBlendState::Soft(inner) => Some(inner),
        }
    }
}

#[derive(Clone, Debug)]
pub enum KilnRasterizerState {
    Soft(KilnRasterizerStateSoft),
}

impl KilnRasterizerState {
    pub fn rasterizer_state_def(&self) -> &KilnRasterizerStateDef {
        match self {
            KilnRasterizerState::Soft(inner) => inner.rasterizer_state_def(),
        }
    }

    pub fn soft_rasterizer_state(&self) -> Option<&KilnRasterizerStateSoft> {
        match self {
            KilnRasterizerState::Soft(inner) => Some(inner),
        }
    }
}

#[derive(Clone, Debug)]
pub enum KilnDepthStencilState {
    Soft(KilnDepthStencilStateSoft),
}

impl KilnDepthStencilState {
    pub fn depth_stencil_state_def(&self) -> &KilnDepthStencilStateDef {
        match self {
            KilnDepthStencilState::Soft(inner) => inner.depth_stencil_state_def(),
        }
    }

    pub fn soft_depth_stencil_state(&self) -> Option<&KilnDepthStencilStateSoft> {
        match self {
            KilnDepthStencilState::Soft(inner) => Some(inner),
        }
    }
}
