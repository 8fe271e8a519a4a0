use std::time::Duration;

use crate::config::{keys, ChangeSet, GaugeConfig};
use crate::dom::extract_from_html;
use crate::engine::detector::ChangeDetector;
use crate::engine::estimator::{estimate, Estimate};
use crate::engine::sampler::{Sample, Sampler};
use crate::engine::scheduler::Scheduler;
use crate::engine::Event;
use crate::render::{GaugeRenderer, GaugeSurface, GaugeVisualState};

/// Time between sampling passes.
pub const SAMPLE_PERIOD: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Disabled,
    Active,
}

/// What one pass ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum PassOutcome {
    /// The page is being read elsewhere; the rest of the pass runs when
    /// [`Event::Sampled`] comes back.
    Pending,
    /// The page could not be read; nothing else ran.
    SourceFailed,
    /// Text length unchanged since the previous pass.
    Unchanged,
    /// No element to draw into.
    NotMounted,
    Rendered(GaugeVisualState),
}

/// Owns every piece of the gauge and moves it between `Disabled` and
/// `Active`.
///
/// Only the page read may happen elsewhere (see [`Sampler`]). Extraction,
/// detection, estimation and rendering all run on the caller's thread, one
/// event at a time, so two passes never overlap.
pub struct GaugeController<Sm: Sampler, S: GaugeSurface, T: Scheduler> {
    config: GaugeConfig,
    sampler: Sm,
    detector: ChangeDetector,
    renderer: GaugeRenderer<S>,
    scheduler: T,
    state: LoopState,
}

impl<Sm: Sampler, S: GaugeSurface, T: Scheduler> GaugeController<Sm, S, T> {
    pub fn new(sampler: Sm, surface: S, scheduler: T) -> Self {
        Self {
            config: GaugeConfig::default(),
            sampler,
            detector: ChangeDetector::new(),
            renderer: GaugeRenderer::new(surface),
            scheduler,
            state: LoopState::Disabled,
        }
    }

    pub fn config(&self) -> &GaugeConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn renderer(&self) -> &GaugeRenderer<S> {
        &self.renderer
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    pub fn sampler_mut(&mut self) -> &mut Sm {
        &mut self.sampler
    }

    /// Page loaded and settings hydrated.
    pub fn on_load(&mut self, config: GaugeConfig) {
        log::info!("Token Gauge: Settings loaded {:?}", config);
        self.config = config;
        if self.config.enabled {
            self.activate();
        }
    }

    pub fn on_config_change(&mut self, changes: &ChangeSet) {
        if changes.is_empty() {
            return;
        }
        self.config = self.config.merge(changes);

        match (self.state, self.config.enabled) {
            (LoopState::Disabled, true) => self.activate(),
            (LoopState::Active, false) => self.deactivate(),
            (LoopState::Active, true) => {
                if changes.touches(keys::IS_ENABLED) {
                    log::debug!("Token Gauge: enabled flag rewritten while active");
                }
                self.renderer.reposition(&self.config);
                self.force_render();
            }
            (LoopState::Disabled, false) => {}
        }
    }

    pub fn on_tick(&mut self) -> Option<PassOutcome> {
        if self.state != LoopState::Active {
            log::debug!("Token Gauge: tick while disabled, ignoring");
            return None;
        }
        Some(self.run_pass())
    }

    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Tick => {
                self.on_tick();
            }
            Event::ConfigChanged(changes) => self.on_config_change(&changes),
            Event::Sampled(sample) => {
                self.on_sampled(sample);
            }
        }
    }

    /// One gated pass: skipped when the text length has not moved.
    pub fn run_pass(&mut self) -> PassOutcome {
        self.request(false)
    }

    /// A pass that renders even when the text length is unchanged. If the
    /// page cannot be read, the last sampled length is re-rendered.
    pub fn force_render(&mut self) -> PassOutcome {
        self.request(true)
    }

    /// Rest of a pass, once the page has been read.
    pub fn on_sampled(&mut self, sample: Sample) -> PassOutcome {
        if self.state != LoopState::Active {
            log::debug!("Token Gauge: sample arrived while disabled, ignoring");
            return PassOutcome::NotMounted;
        }

        let html = match sample.html {
            Ok(html) => html,
            Err(e) => {
                log::warn!("Token Gauge: could not read page: {}", e);
                if sample.force {
                    let estimate = self.estimate_for(self.detector.previous());
                    return self.render(&estimate);
                }
                return PassOutcome::SourceFailed;
            }
        };

        let extraction = extract_from_html(&html);
        let length = extraction.len();
        let changed = self.detector.should_process(length);
        if !changed && !sample.force {
            return PassOutcome::Unchanged;
        }

        log::debug!("Token Gauge: Text length is {} characters", length);
        let estimate = self.estimate_for(length);
        log::debug!("Token Gauge: Estimated {} tokens", estimate.units);
        self.render(&estimate)
    }

    fn activate(&mut self) {
        log::info!("Token Gauge: Initializing gauge");
        self.renderer.create(&self.config);
        // A fresh element shows nothing sampled yet.
        self.detector.reset();
        self.state = LoopState::Active;
        self.force_render();
        self.scheduler.start(SAMPLE_PERIOD);
    }

    fn deactivate(&mut self) {
        self.renderer.destroy();
        self.scheduler.stop();
        self.state = LoopState::Disabled;
    }

    fn request(&mut self, force: bool) -> PassOutcome {
        log::debug!("Token Gauge: Counting tokens...");
        match self.sampler.request(force) {
            Some(sample) => self.on_sampled(sample),
            None => PassOutcome::Pending,
        }
    }

    fn estimate_for(&self, length: usize) -> Estimate {
        estimate(length, self.config.effective_limit())
    }

    fn render(&mut self, estimate: &Estimate) -> PassOutcome {
        match self.renderer.render(estimate, &self.config) {
            Some(state) => PassOutcome::Rendered(state.clone()),
            None => PassOutcome::NotMounted,
        }
    }
}
