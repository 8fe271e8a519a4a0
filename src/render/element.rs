//! The gauge's visual element.
//!
//! [`GaugeSurface`] is the small capability set the renderer needs from
//! whatever draws the gauge. [`GaugeElement`] is the retained
//! implementation: the egui overlay paints it every frame and
//! [`GaugeElement::to_svg`] serializes the same state as markup.

use crate::config::Position;
use crate::render::gauge::{self, ARC_RADIUS, CENTER};
use crate::render::palette::{self, Rgba};

pub const ROOT_CLASS: &str = "token-gauge";
pub const VIEW_BOX: (f64, f64) = (180.0, 120.0);
pub const HUB_RADIUS: f64 = 6.0;
pub const LABEL_POS: (f64, f64) = (90.0, 112.0);
pub const INITIAL_LABEL: &str = "0 / 200K (0%)";

pub trait GaugeSurface {
    /// Build a fresh element and attach it, pinned to `position`.
    fn mount(&mut self, position: Position);
    /// Detach the element. No-op when nothing is mounted.
    fn unmount(&mut self);
    fn is_mounted(&self) -> bool;
    /// Replace the placement class.
    fn set_position(&mut self, position: Position);
    /// Move the needle tip; the pivot stays at the arc center.
    fn set_needle(&mut self, end: (f64, f64));
    fn set_label(&mut self, text: &str, color: Rgba);
}

/// One fixed arc of the dial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSegment {
    pub from_deg: f64,
    pub to_deg: f64,
    pub color: Rgba,
    pub width: f64,
}

impl ArcSegment {
    pub fn start(&self) -> (f64, f64) {
        gauge::point_on_arc(self.from_deg, ARC_RADIUS)
    }

    pub fn end(&self) -> (f64, f64) {
        gauge::point_on_arc(self.to_deg, ARC_RADIUS)
    }
}

/// Background track followed by the safe, caution and danger bands.
/// The bands are decorative and never recolored.
pub const DIAL_ARCS: [ArcSegment; 4] = [
    ArcSegment { from_deg: 180.0, to_deg: 0.0, color: palette::TRACK, width: 1.0 },
    ArcSegment { from_deg: 180.0, to_deg: 120.0, color: palette::SAFE, width: 16.0 },
    ArcSegment { from_deg: 120.0, to_deg: 60.0, color: palette::CAUTION, width: 16.0 },
    ArcSegment { from_deg: 60.0, to_deg: 0.0, color: palette::DANGER, width: 16.0 },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Needle {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub color: Rgba,
}

/// Retained gauge element.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeElement {
    mounted: bool,
    /// Bumped on every mount so a recreated element is distinguishable.
    generation: u64,
    classes: Vec<String>,
    needle: Needle,
    label: Label,
}

impl Default for GaugeElement {
    fn default() -> Self {
        Self::new()
    }
}

impl GaugeElement {
    pub fn new() -> Self {
        Self {
            mounted: false,
            generation: 0,
            classes: Vec::new(),
            needle: Self::initial_needle(),
            label: Self::initial_label(),
        }
    }

    fn initial_needle() -> Needle {
        Needle {
            start: CENTER,
            end: (CENTER.0, CENTER.1 - 70.0),
        }
    }

    fn initial_label() -> Label {
        Label {
            text: INITIAL_LABEL.to_string(),
            color: palette::TEXT,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Corner named by the current placement class.
    pub fn placement(&self) -> Option<Position> {
        self.classes.iter().find_map(|c| Position::parse(c))
    }

    pub fn arcs(&self) -> &'static [ArcSegment] {
        &DIAL_ARCS
    }

    pub fn needle(&self) -> Needle {
        self.needle
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    /// SVG markup for the current state.
    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            r#"<svg class="{}" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            self.classes.join(" "),
            w = num(VIEW_BOX.0),
            h = num(VIEW_BOX.1),
        );
        for arc in DIAL_ARCS.iter() {
            let (x1, y1) = arc.start();
            let (x2, y2) = arc.end();
            svg.push_str(&format!(
                r#"<path d="M{},{} A{r},{r} 0 0,1 {},{}" fill="none" stroke="{}" stroke-width="{}" stroke-linecap="round"/>"#,
                num(x1),
                num(y1),
                num(x2),
                num(y2),
                arc.color.to_hex(),
                num(arc.width),
                r = num(ARC_RADIUS),
            ));
        }
        svg.push_str(&format!(
            r#"<line id="gauge-needle" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="3" stroke-linecap="round"/>"#,
            num(self.needle.start.0),
            num(self.needle.start.1),
            num(self.needle.end.0),
            num(self.needle.end.1),
            palette::NEEDLE.to_hex(),
        ));
        svg.push_str(&format!(
            r#"<circle cx="{}" cy="{}" r="{}" fill="{}"/>"#,
            num(CENTER.0),
            num(CENTER.1),
            num(HUB_RADIUS),
            palette::NEEDLE.to_hex(),
        ));
        svg.push_str(&format!(
            r#"<text id="token-text" x="{}" y="{}" text-anchor="middle" font-size="14" font-weight="bold" fill="{}">{}</text>"#,
            num(LABEL_POS.0),
            num(LABEL_POS.1),
            self.label.color.to_hex(),
            escape_xml(&self.label.text),
        ));
        svg.push_str("</svg>");
        svg
    }
}

impl GaugeSurface for GaugeElement {
    fn mount(&mut self, position: Position) {
        self.generation += 1;
        self.mounted = true;
        self.classes = vec![ROOT_CLASS.to_string()];
        self.needle = Self::initial_needle();
        self.label = Self::initial_label();
        self.set_position(position);
    }

    fn unmount(&mut self) {
        self.mounted = false;
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn set_position(&mut self, position: Position) {
        self.classes
            .retain(|c| !Position::ALL.iter().any(|p| p.css_class() == c));
        self.classes.push(position.css_class().to_string());
    }

    fn set_needle(&mut self, end: (f64, f64)) {
        self.needle = Needle { start: CENTER, end };
    }

    fn set_label(&mut self, text: &str, color: Rgba) {
        self.label = Label {
            text: text.to_string(),
            color,
        };
    }
}

/// Two decimals, trailing zeros dropped.
fn num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
