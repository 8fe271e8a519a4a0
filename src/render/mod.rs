pub mod element;
pub mod gauge;
pub mod palette;
pub mod renderer;

pub use element::{GaugeElement, GaugeSurface};
pub use gauge::{Band, GaugeVisualState};
pub use renderer::GaugeRenderer;
