//! `GaugeApp`: the egui host for the gauge.
//!
//! The window plays the part of the chat page. The page is read on a
//! sampler thread; everything else the controller does happens inside
//! `update`, one event at a time:
//!
//! - `overlay`: paints the gauge element in its corner
//! - `settings`: the settings panel that writes to the store

pub mod overlay;
pub mod settings;

use std::sync::{mpsc, Arc};

use eframe::egui;

use token_gauge::config::settings::SettingsForm;
use token_gauge::config::store::ConfigStore;
use token_gauge::config::{ChangeSet, GaugeConfig};
use token_gauge::engine::{
    Event, GaugeController, LoopState, ThreadSampler, ThreadScheduler, Waker, SAMPLE_PERIOD,
};
use token_gauge::net::PageSource;
use token_gauge::render::{GaugeElement, GaugeSurface};

pub type Controller = GaugeController<ThreadSampler, GaugeElement, ThreadScheduler>;

pub struct GaugeApp {
    pub controller: Controller,
    pub store: Box<dyn ConfigStore>,
    pub form: SettingsForm,
    pub show_settings: bool,
    events: mpsc::Receiver<Event>,
    store_changes: mpsc::Receiver<ChangeSet>,
}

impl GaugeApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        store: Box<dyn ConfigStore>,
        source: Box<dyn PageSource + Send>,
    ) -> Self {
        let (tx, events) = mpsc::channel();
        let ctx = cc.egui_ctx.clone();
        let waker: Waker = Arc::new(move || ctx.request_repaint());
        let sampler = ThreadSampler::spawn(source, tx.clone(), Some(Arc::clone(&waker)));
        let scheduler = ThreadScheduler::new(tx).with_waker(waker);

        // Subscribe before reading so no edit slips between the two.
        let store_changes = store.subscribe();
        let config = GaugeConfig::from_values(&store.get_all());

        let mut controller = GaugeController::new(sampler, GaugeElement::new(), scheduler);
        controller.on_load(config);

        Self {
            form: SettingsForm::from_config(controller.config()),
            controller,
            store,
            show_settings: false,
            events,
            store_changes,
        }
    }

    /// Apply pending settings changes, then pending ticks and samples.
    fn drain_events(&mut self) {
        let mut config_changed = false;
        while let Ok(changes) = self.store_changes.try_recv() {
            self.controller.handle(Event::ConfigChanged(changes));
            config_changed = true;
        }
        if config_changed {
            self.form = SettingsForm::from_config(self.controller.config());
        }

        while let Ok(event) = self.events.try_recv() {
            self.controller.handle(event);
        }
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let (text, color) = match self.controller.state() {
                LoopState::Active => ("\u{25CF} sampling", egui::Color32::from_rgb(0, 160, 0)),
                LoopState::Disabled => ("\u{25CB} disabled", egui::Color32::GRAY),
            };
            ui.colored_label(color, text);
            ui.separator();

            let surface = self.controller.renderer().surface();
            if ui
                .add_enabled(surface.is_mounted(), egui::Button::new("Copy SVG"))
                .clicked()
            {
                let svg = surface.to_svg();
                ui.output_mut(|o| o.copied_text = svg);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.toggle_value(&mut self.show_settings, "Settings");
            });
        });
    }
}

impl eframe::App for GaugeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        if self.show_settings {
            egui::SidePanel::right("settings")
                .default_width(200.0)
                .show(ctx, |ui| {
                    self.draw_settings(ui);
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            overlay::draw_gauge(ui, self.controller.renderer().surface());
        });

        // Fallback wake-up; ticks and samples normally repaint through the waker.
        ctx.request_repaint_after(SAMPLE_PERIOD);
    }
}
