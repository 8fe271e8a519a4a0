use crate::config::GaugeConfig;
use crate::engine::estimator::Estimate;
use crate::render::element::GaugeSurface;
use crate::render::gauge::{visual_state, GaugeVisualState};

/// Owns the gauge surface and writes estimates into it.
///
/// At most one element is live at a time: `create` always tears the
/// previous one down first.
pub struct GaugeRenderer<S: GaugeSurface> {
    surface: S,
    last_state: Option<GaugeVisualState>,
}

impl<S: GaugeSurface> GaugeRenderer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            last_state: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_mounted()
    }

    /// State written by the most recent successful `render`.
    pub fn last_state(&self) -> Option<&GaugeVisualState> {
        self.last_state.as_ref()
    }

    pub fn create(&mut self, config: &GaugeConfig) {
        self.destroy();
        self.surface.mount(config.position);
        log::info!(
            "Token Gauge: Gauge created at {}",
            config.position.css_class()
        );
    }

    pub fn reposition(&mut self, config: &GaugeConfig) {
        if !self.surface.is_mounted() {
            return;
        }
        self.surface.set_position(config.position);
    }

    /// Write `estimate` into the element. Returns the state written, or
    /// `None` when no element is mounted.
    pub fn render(&mut self, estimate: &Estimate, config: &GaugeConfig) -> Option<&GaugeVisualState> {
        if !self.surface.is_mounted() {
            log::debug!("Token Gauge: No gauge element to update");
            return None;
        }

        log::debug!("Token Gauge: Updating gauge to {} tokens", estimate.units);
        let state = visual_state(estimate, config);
        self.surface.set_needle(state.needle_end);
        self.surface.set_label(&state.display_text, state.text_color);
        self.last_state = Some(state);
        self.last_state.as_ref()
    }

    /// Detach the element if present. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.surface.is_mounted() {
            self.surface.unmount();
            log::info!("Token Gauge: Gauge removed");
        }
        self.last_state = None;
    }
}
