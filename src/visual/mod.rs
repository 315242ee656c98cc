//! Everything between a loudness value and the pixels on screen.

pub mod radius;
pub mod render;
pub mod theme;
pub mod viewport;

pub use radius::RadiusMapper;
pub use render::{FrameRenderer, RenderParams, RendererKind};
pub use theme::{Palette, Theme};
pub use viewport::ViewportSize;
