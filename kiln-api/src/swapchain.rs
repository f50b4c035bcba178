use crate::soft::KilnSwapChainSoft;
use crate::*;

/// Presents render targets to a `KilnWindow`.
///
/// The swap chain holds a weak reference to its window. Once the window's client area no longer
/// matches the size the swap chain was built at, `valid()` returns false and the caller should
/// `resize()` before rendering again.
#[derive(Debug)]
pub enum KilnSwapChain {
    Soft(KilnSwapChainSoft),
}

impl KilnSwapChain {
    pub fn swap_chain_def(&self) -> &KilnSwapChainDef {
        match self {
            KilnSwapChain::Soft(inner) => inner.swap_chain_def(),
        }
    }

    /// Size of the back buffer
    pub fn extents(&self) -> KilnExtents2D {
        match self {
            KilnSwapChain::Soft(inner) => inner.extents(),
        }
    }

    /// The render target view of the back buffer
    pub fn acquire_render_target_view(&self) -> KilnRenderTargetView {
        match self {
            KilnSwapChain::Soft(inner) => {
                KilnRenderTargetView::Soft(inner.acquire_render_target_view().clone())
            }
        }
    }

    /// `render_target_view` must have been acquired from this swap chain
    pub fn present(
        &mut self,
        render_target_view: &KilnRenderTargetView,
        present_mode: KilnPresentMode,
    ) -> KilnResult<()> {
        match (self, render_target_view) {
            (KilnSwapChain::Soft(inner), KilnRenderTargetView::Soft(view)) => {
                inner.present(view, present_mode)
            }
        }
    }

    /// False if the window is gone or its client area changed size since the swap chain was built
    pub fn valid(&self) -> bool {
        match self {
            KilnSwapChain::Soft(inner) => inner.valid(),
        }
    }

    /// Rebuild the buffers at the window's current client size. Views acquired before the resize
    /// must be acquired again.
    pub fn resize(&mut self) -> KilnResult<()> {
        match self {
            KilnSwapChain::Soft(inner) => inner.resize(),
        }
    }

    pub fn set_fullscreen(
        &mut self,
        fullscreen: bool,
    ) -> KilnResult<()> {
        match self {
            KilnSwapChain::Soft(inner) => inner.set_fullscreen(fullscreen),
        }
    }

    pub fn is_fullscreen(&self) -> bool {
        match self {
            KilnSwapChain::Soft(inner) => inner.is_fullscreen(),
        }
    }

    pub fn soft_swap_chain(&self) -> Option<&KilnSwapChainSoft> {
        match self {
            KilnSwapChain::Soft(inner) => Some(inner),
        }
    }
}
