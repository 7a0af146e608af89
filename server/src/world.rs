use crate::effect::{Hallucination, VisualState};
use crate::input::{InputState, Key};
use crate::interaction::{scan, Interactable, InteractionKind};
use crate::physics::{
    apply_controls, launch_sphere, respawn_if_out_of_bounds, substep_dt, update_player,
    update_spheres,
};
use crate::player::{Camera, PlayerBody};
use crate::scene::LoadedScene;
use crate::sphere::{throw_impulse, SpherePool};
use gallery_shared::config::GalleryConfig;
use glam::{Quat, Vec3};

/// Side effects the UI collaborator has to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldEvent {
    OpenUrl(String),
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub camera_position: Vec3,
    pub camera_orientation: Quat,
    pub spheres: Vec<Vec3>,
    pub prompt: Option<&'static str>,
    pub glitch: bool,
    pub background: u32,
}

/// The whole simulation: bodies, camera, level, interaction and effect
/// state. Owned by the frame driver; nothing here is shared.
#[derive(Debug)]
pub struct SimulationWorld {
    config: GalleryConfig,
    scene: Option<LoadedScene>,
    player: PlayerBody,
    camera: Camera,
    spheres: SpherePool,
    input: InputState,
    hallucination: Hallucination,
    visual: VisualState,
    /// Index into the scene's interactables.
    current: Option<usize>,
    /// Sim clock in seconds. An f32 stops advancing by 1/60 s after a few
    /// days of uptime.
    elapsed: f64,
    pointer_down_at: f64,
    frame_count: u64,
}

impl SimulationWorld {
    pub fn new(config: GalleryConfig) -> Self {
        let player = PlayerBody::spawn(&config.physics);
        let camera = Camera::at(player.collider.end);
        Self {
            scene: None,
            player,
            camera,
            spheres: SpherePool::new(
                config.physics.sphere_count as usize,
                config.physics.sphere_radius,
            ),
            input: InputState::default(),
            hallucination: Hallucination::new(),
            visual: VisualState::new(&config.effect),
            current: None,
            elapsed: 0.0,
            pointer_down_at: 0.0,
            frame_count: 0,
            config,
        }
    }

    /// Install the level. Only the first call takes effect.
    pub fn load(&mut self, scene: LoadedScene) -> bool {
        if self.scene.is_some() {
            tracing::warn!("Scene already loaded, ignoring second load");
            return false;
        }
        self.scene = Some(scene);
        true
    }

    pub fn is_ready(&self) -> bool {
        self.scene.is_some()
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn player(&self) -> &PlayerBody {
        &self.player
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn spheres(&self) -> &SpherePool {
        &self.spheres
    }

    pub fn visual(&self) -> VisualState {
        self.visual
    }

    pub fn hallucinating(&self) -> bool {
        self.hallucination.is_active()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn current_interactable(&self) -> Option<&Interactable> {
        let index = self.current?;
        self.scene.as_ref()?.interactables.get(index)
    }

    /// Advance one rendered frame of `frame_delta` seconds: all physics
    /// substeps, then the interaction scan, then the effect.
    pub fn frame(&mut self, frame_delta: f32) {
        let physics = self.config.physics;
        let dt = substep_dt(frame_delta, &physics);
        let level = self.scene.as_ref().map(|s| &s.octree);

        for _ in 0..physics.steps_per_frame {
            apply_controls(&mut self.player, &self.camera, &self.input, dt, &physics);
            update_player(&mut self.player, &mut self.camera, level, dt, &physics);
            update_spheres(
                self.spheres.bodies_mut(),
                &mut self.player,
                level,
                dt,
                &physics,
            );
            if respawn_if_out_of_bounds(&mut self.player, &mut self.camera, &physics) {
                tracing::info!("Player fell out of the level, respawning");
            }
        }

        if frame_delta.is_finite() && frame_delta > 0.0 {
            self.elapsed += f64::from(frame_delta);
        }

        self.current = self.scene.as_ref().and_then(|scene| {
            scan(&scene.interactables, self.camera.position, &self.config.interaction)
        });

        if self
            .hallucination
            .update(self.elapsed, &mut self.visual, &self.config.effect)
        {
            tracing::info!("Hallucination wore off");
        }

        self.frame_count += 1;
    }

    /// Handle a key press by DOM key code.
    pub fn key_down(&mut self, code: &str) -> Option<WorldEvent> {
        let key = Key::from_code(code)?;
        self.input.set(key, true);

        match key {
            Key::Buy => {
                let item = self.current_interactable()?;
                if item.kind != InteractionKind::Painting {
                    return None;
                }
                let url = item.url.clone()?;
                tracing::info!("Opening listing for {}", item.name);
                Some(WorldEvent::OpenUrl(url))
            }
            Key::Eat => {
                let is_mushroom = self
                    .current_interactable()
                    .is_some_and(|i| i.kind == InteractionKind::Mushroom);
                if is_mushroom && self.hallucination.start(self.elapsed, &mut self.visual) {
                    tracing::info!("Mushroom eaten, hallucination started");
                }
                None
            }
            _ => None,
        }
    }

    pub fn key_up(&mut self, code: &str) {
        if let Some(key) = Key::from_code(code) {
            self.input.set(key, false);
        }
    }

    /// Drop every held key, e.g. when the controlling session goes away.
    pub fn release_input(&mut self) {
        self.input.clear();
    }

    pub fn look(&mut self, dx: f32, dy: f32) {
        if dx.is_finite() && dy.is_finite() {
            self.camera
                .look(dx, dy, self.config.physics.look_sensitivity);
        }
    }

    pub fn pointer_down(&mut self) {
        self.pointer_down_at = self.elapsed;
    }

    /// Throws only while the pointer is locked. Returns the pool index used.
    pub fn pointer_up(&mut self, locked: bool) -> Option<usize> {
        if !locked {
            return None;
        }
        let held_ms = ((self.elapsed - self.pointer_down_at) * 1000.0) as f32;
        Some(self.throw_ball(held_ms))
    }

    /// Launch the next pooled sphere from the camera.
    pub fn throw_ball(&mut self, held_ms: f32) -> usize {
        let physics = self.config.physics;
        let impulse = throw_impulse(
            held_ms,
            physics.throw_base_impulse,
            physics.throw_extra_impulse,
        );
        let index = self.spheres.claim();
        if let Some(body) = self.spheres.get_mut(index) {
            launch_sphere(body, &self.player, &self.camera, impulse, &physics);
        }
        tracing::debug!("Threw sphere {} at {:.1}", index, impulse);
        index
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.frame_count,
            camera_position: self.camera.position,
            camera_orientation: self.camera.orientation(),
            spheres: self.spheres.positions().collect(),
            prompt: self.current_interactable().map(|i| i.kind.prompt()),
            glitch: self.visual.glitch,
            background: self.visual.background,
        }
    }
}
