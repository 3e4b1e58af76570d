// Lighting - Section name to ambient color, with smooth timed transitions
// Unknown section names take the next color of a fixed fallback palette, kept for the song

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Linear RGB color, components in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Interpolate toward `other`; t outside 0..=1 snaps to the nearest end
    pub fn lerp(&self, other: &Color, t: f32) -> Color {
        if t >= 1.0 {
            return *other;
        }
        if t.is_nan() || t <= 0.0 {
            return *self;
        }
        Color::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::from_rgb8(70, 70, 90)
    }
}

/// Lowercase with all whitespace removed ("Pre Chorus " -> "prechorus")
pub fn normalize_section_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Section name -> color table with a round-robin fallback
#[derive(Debug, Clone)]
pub struct SectionPalette {
    known: HashMap<String, Color>,
    fallback: Vec<Color>,
    next_fallback: usize,
    // Fallback color handed to each unknown (normalised) name this song
    assigned: HashMap<String, Color>,
}

impl SectionPalette {
    pub fn new(known: impl IntoIterator<Item = (&'static str, Color)>, fallback: Vec<Color>) -> Self {
        Self {
            known: known
                .into_iter()
                .map(|(name, color)| (normalize_section_name(name), color))
                .collect(),
            fallback,
            next_fallback: 0,
            assigned: HashMap::new(),
        }
    }

    /// Color for a section; an unrecognised name takes the next fallback color
    /// the first time it is seen and keeps it until the cycle is reset
    pub fn color_for(&mut self, section_name: &str) -> Color {
        let name = normalize_section_name(section_name);
        if let Some(color) = self.known.get(&name).or_else(|| self.assigned.get(&name)) {
            return *color;
        }
        if self.fallback.is_empty() {
            return Color::default();
        }
        let color = self.fallback[self.next_fallback % self.fallback.len()];
        self.next_fallback = (self.next_fallback + 1) % self.fallback.len();
        self.assigned.insert(name, color);
        color
    }

    /// Restart the fallback cycle and forget assigned names (new song)
    pub fn reset_cycle(&mut self) {
        self.next_fallback = 0;
        self.assigned.clear();
    }
}

impl Default for SectionPalette {
    fn default() -> Self {
        Self::new(
            [
                ("intro", Color::from_rgb8(60, 90, 160)),
                ("verse", Color::from_rgb8(80, 160, 200)),
                ("prechorus", Color::from_rgb8(200, 140, 60)),
                ("chorus", Color::from_rgb8(230, 60, 120)),
                ("postchorus", Color::from_rgb8(190, 80, 160)),
                ("bridge", Color::from_rgb8(120, 80, 200)),
                ("breakdown", Color::from_rgb8(40, 40, 120)),
                ("build", Color::from_rgb8(240, 180, 40)),
                ("drop", Color::from_rgb8(255, 40, 40)),
                ("solo", Color::from_rgb8(40, 220, 140)),
                ("instrumental", Color::from_rgb8(90, 200, 90)),
                ("outro", Color::from_rgb8(50, 50, 100)),
            ],
            vec![
                Color::from_rgb8(255, 120, 0),
                Color::from_rgb8(0, 200, 255),
                Color::from_rgb8(180, 0, 255),
                Color::from_rgb8(0, 255, 120),
                Color::from_rgb8(255, 0, 160),
            ],
        )
    }
}

/// A timed interpolation between two ambient colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorTransition {
    pub from: Color,
    pub to: Color,
    pub start: f64,
    pub duration: f64,
}

impl ColorTransition {
    /// Color at wall time `now`
    pub fn color_at(&self, now: f64) -> Color {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = ((now - self.start) / self.duration) as f32;
        self.from.lerp(&self.to, t)
    }

    pub fn is_finished(&self, now: f64) -> bool {
        now >= self.start + self.duration
    }
}

/// Drives ambient lighting from section changes
#[derive(Debug, Clone)]
pub struct LightingDriver {
    palette: SectionPalette,
    base_color: Color,
    transition_seconds: f64,
    transition: Option<ColorTransition>,
}

impl LightingDriver {
    pub fn new(palette: SectionPalette, base_color: Color, transition_seconds: f64) -> Self {
        Self {
            palette,
            base_color,
            transition_seconds,
            transition: None,
        }
    }

    /// Start a transition toward the new section's color (base color for no section)
    /// Begins from wherever the current transition has reached
    pub fn on_section_changed(&mut self, section_name: Option<&str>, now: f64) -> ColorTransition {
        let from = self.color_at(now);
        let to = match section_name {
            Some(name) => self.palette.color_for(name),
            None => self.base_color,
        };
        let transition = ColorTransition {
            from,
            to,
            start: now,
            duration: self.transition_seconds,
        };
        self.transition = Some(transition);
        transition
    }

    /// Current ambient color
    pub fn color_at(&self, now: f64) -> Color {
        self.transition
            .map(|t| t.color_at(now))
            .unwrap_or(self.base_color)
    }

    /// Back to base lighting for a new song
    pub fn reset(&mut self) {
        self.transition = None;
        self.palette.reset_cycle();
    }
}
