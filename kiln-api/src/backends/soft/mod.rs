mod api;
pub use api::*;

mod context;
pub use context::*;

mod device;
pub use device::*;

mod buffer;
pub use buffer::*;

mod views;
pub use views::*;

mod shader;
pub use shader::*;

mod states;
pub use states::*;

mod vertex_layout;
pub use vertex_layout::*;

mod command_interface;
pub use command_interface::*;

mod swapchain;
pub use swapchain::*;

mod internal;

#[cfg(test)]
mod tests;
