//! Timed hallucination overlay: while active the background hue rotates
//! every frame and the glitch pass is on. It switches itself off after a
//! fixed duration and puts the sky back.

use crate::color::Color;
use gallery_shared::config::EffectConfig;

/// What the renderer needs to draw the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualState {
    /// Background color as 0xRRGGBB.
    pub background: u32,
    pub glitch: bool,
}

impl VisualState {
    pub fn new(config: &EffectConfig) -> Self {
        Self {
            background: config.sky_color,
            glitch: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hallucination {
    active: bool,
    /// Sim seconds since the world was created.
    start_time: f64,
    hue: f32,
}

impl Default for Hallucination {
    fn default() -> Self {
        Self::new()
    }
}

impl Hallucination {
    pub fn new() -> Self {
        Self {
            active: false,
            start_time: 0.0,
            hue: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    /// Begin the effect at sim time `now`. Triggering it again while it runs
    /// changes nothing, including the start time. Returns whether it started.
    pub fn start(&mut self, now: f64, visual: &mut VisualState) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.start_time = now;
        self.hue = Color::from_hex(visual.background).to_hsl().h;
        visual.glitch = true;
        true
    }

    /// Advance one frame. Returns true on the frame the effect ends.
    pub fn update(&mut self, now: f64, visual: &mut VisualState, config: &EffectConfig) -> bool {
        if !self.active {
            return false;
        }

        if now - self.start_time >= f64::from(config.duration) {
            self.active = false;
            visual.background = config.sky_color;
            visual.glitch = false;
            return true;
        }

        self.hue = advance_hue(self.hue, config.hue_step);
        visual.background = Color::from_hsl(self.hue, config.saturation, config.lightness).to_hex();
        false
    }
}

/// Step the hue forward, wrapping into [0, 1).
pub fn advance_hue(hue: f32, step: f32) -> f32 {
    (hue + step).rem_euclid(1.0)
}
