//! Graphics-API-agnostic resource creation and command recording.
//!
//! A `KilnApi` owns one backend and hands out a `KilnDevice`. The device creates buffers, views,
//! shaders and pipeline state objects. A `KilnCommandInterface` records state changes, clears,
//! maps and draws against the device, eliding binds of state that is already bound. A
//! `KilnSwapChain` presents render targets to a `KilnWindow`.
//!
//! Every public type is an enum with one variant per backend. The only backend in this crate is
//! `soft`, which keeps all memory on the CPU and records every backend call in an inspectable
//! command log.

pub use api::*;
pub use buffer::*;
pub use command_interface::*;
pub use constant_buffer_view::*;
pub use device::*;
pub use error::*;
pub use pipeline_state::*;
pub use reflection::*;
pub use sampler::*;
pub use shader::*;
pub use swapchain::*;
pub use types::*;
pub use vertex_layout::*;
pub use views::*;
pub use window::*;

pub use backends::soft;

mod backends;
mod types;

mod api;
mod buffer;
mod command_interface;
mod constant_buffer_view;
mod device;
mod error;
mod pipeline_state;
mod reflection;
mod sampler;
mod shader;
mod swapchain;
mod vertex_layout;
mod views;
mod window;

/// The maximum number of simultaneously bound render targets
pub const MAX_RENDER_TARGETS: usize = 8;

/// The maximum number of vertex buffers in one vertex stream
pub const MAX_VERTEX_STREAM_BUFFERS: usize = 16;

/// Largest width of a 1D texture, and largest width or height of a 2D texture
pub const MAX_TEXTURE_DIMENSION_2D: u32 = 16384;

/// Largest width, height or depth of a 3D texture
pub const MAX_TEXTURE_DIMENSION_3D: u32 = 2048;

/// Largest array size of a texture array
pub const MAX_TEXTURE_ARRAY_SIZE: u32 = 2048;

/// Vertex input locations are in `0..MAX_VERTEX_INPUT_LOCATIONS`
pub const MAX_VERTEX_INPUT_LOCATIONS: u32 = 32;

/// Shader resource slots per stage
pub const MAX_TEXTURE_SLOTS: usize = 128;

/// Sampler slots per stage
pub const MAX_SAMPLER_SLOTS: usize = 16;

/// Constant buffer slots per stage
pub const MAX_CONSTANT_BUFFER_SLOTS: usize = 14;

/// Recorded as a constant buffer view's slot for a stage that doesn't reference the block. One
/// past the last valid slot.
pub const KILN_CONSTANT_BUFFER_SLOT_UNUSED: u32 = MAX_CONSTANT_BUFFER_SLOTS as u32;
