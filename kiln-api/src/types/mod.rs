mod definitions;
pub use definitions::*;

mod format;
pub use format::*;

mod layout;
pub use layout::*;

mod misc;
pub use misc::*;
