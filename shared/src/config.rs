/// Physics tuning for the player capsule and the thrown spheres.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct PhysicsConfig {
    /// Downward acceleration (m/s^2)
    pub gravity: f32,
    pub steps_per_frame: u32,
    /// Upper bound on the frame delta fed to the substeps (seconds)
    pub max_frame_delta: f32,
    pub sphere_count: u32,
    pub sphere_radius: f32,
    pub player_radius: f32,
    /// Distance between the capsule's start and end points
    pub player_height: f32,
    pub spawn_height: f32,
    /// Camera height at or below which the player respawns
    pub out_of_bounds_height: f32,
    pub ground_accel: f32,
    pub air_accel: f32,
    pub jump_speed: f32,
    pub player_damping: f32,
    /// Multiplier on player damping while airborne
    pub air_damping_factor: f32,
    pub sphere_damping: f32,
    /// Fraction of the normal velocity removed on a world bounce
    pub sphere_bounce: f32,
    pub throw_base_impulse: f32,
    pub throw_extra_impulse: f32,
    /// Spawn offset in front of the camera, in player radii
    pub throw_offset: f32,
    pub min_push_depth: f32,
    /// Radians of camera rotation per pixel of pointer movement
    pub look_sensitivity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 30.0,
            steps_per_frame: 5,
            max_frame_delta: 0.05,
            sphere_count: 100,
            sphere_radius: 0.2,
            player_radius: 0.35,
            player_height: 0.65,
            spawn_height: 10.0,
            out_of_bounds_height: -25.0,
            ground_accel: 50.0,
            air_accel: 16.0,
            jump_speed: 25.0,
            player_damping: 4.0,
            air_damping_factor: 0.1,
            sphere_damping: 1.5,
            sphere_bounce: 1.5,
            throw_base_impulse: 15.0,
            throw_extra_impulse: 30.0,
            throw_offset: 1.5,
            min_push_depth: 1e-10,
            look_sensitivity: 1.0 / 500.0,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.steps_per_frame == 0 {
            return Err("steps_per_frame must be > 0".to_string());
        }
        if self.sphere_count == 0 {
            return Err("sphere_count must be > 0".to_string());
        }
        if !self.max_frame_delta.is_finite() || self.max_frame_delta <= 0.0 {
            return Err("max_frame_delta must be finite and > 0".to_string());
        }
        for (name, value) in [
            ("sphere_radius", self.sphere_radius),
            ("player_radius", self.player_radius),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{} must be finite and > 0", name));
            }
        }
        for (name, value) in [
            ("gravity", self.gravity),
            ("player_height", self.player_height),
            ("ground_accel", self.ground_accel),
            ("air_accel", self.air_accel),
            ("jump_speed", self.jump_speed),
            ("player_damping", self.player_damping),
            ("air_damping_factor", self.air_damping_factor),
            ("sphere_damping", self.sphere_damping),
            ("sphere_bounce", self.sphere_bounce),
            ("throw_base_impulse", self.throw_base_impulse),
            ("throw_extra_impulse", self.throw_extra_impulse),
            ("throw_offset", self.throw_offset),
            ("min_push_depth", self.min_push_depth),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be finite and >= 0", name));
            }
        }
        if !self.spawn_height.is_finite() || !self.out_of_bounds_height.is_finite() {
            return Err("spawn_height and out_of_bounds_height must be finite".to_string());
        }
        if self.out_of_bounds_height >= self.spawn_height {
            return Err("out_of_bounds_height must be below spawn_height".to_string());
        }
        if !self.look_sensitivity.is_finite() {
            return Err("look_sensitivity must be finite".to_string());
        }
        Ok(())
    }
}

/// Proximity thresholds for tagged scene objects
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct InteractionConfig {
    pub painting_distance: f32,
    pub mushroom_distance: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            painting_distance: 10.0,
            mushroom_distance: 3.0,
        }
    }
}

impl InteractionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.painting_distance.is_finite() || self.painting_distance <= 0.0 {
            return Err("painting_distance must be finite and > 0".to_string());
        }
        if !self.mushroom_distance.is_finite() || self.mushroom_distance <= 0.0 {
            return Err("mushroom_distance must be finite and > 0".to_string());
        }
        Ok(())
    }
}

/// Hallucination effect timing and colors
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct EffectConfig {
    /// Seconds the effect stays active
    pub duration: f32,
    /// Hue advance per rendered frame (fraction of a turn)
    pub hue_step: f32,
    pub saturation: f32,
    pub lightness: f32,
    /// Background color restored when the effect ends (0xRRGGBB)
    pub sky_color: u32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            duration: 30.0,
            hue_step: 0.0015,
            saturation: 1.0,
            lightness: 0.5,
            sky_color: 0x87ceeb,
        }
    }
}

impl EffectConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err("duration must be finite and > 0".to_string());
        }
        if !self.hue_step.is_finite() || self.hue_step <= 0.0 || self.hue_step >= 1.0 {
            return Err("hue_step must be in (0, 1)".to_string());
        }
        if !(0.0..=1.0).contains(&self.saturation) || !(0.0..=1.0).contains(&self.lightness) {
            return Err("saturation and lightness must be in [0, 1]".to_string());
        }
        if self.sky_color > 0xFFFFFF {
            return Err("sky_color must be a 24-bit RGB value".to_string());
        }
        Ok(())
    }
}

/// Everything the simulation core is tuned by. Sent to the renderer on connect.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct GalleryConfig {
    pub physics: PhysicsConfig,
    pub interaction: InteractionConfig,
    pub effect: EffectConfig,
}

impl GalleryConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.physics.validate()?;
        self.interaction.validate()?;
        self.effect.validate()
    }
}
