use crate::collider::Capsule;
use gallery_shared::config::PhysicsConfig;
use glam::{EulerRot, Quat, Vec3};

/// The walking player: a capsule plus its velocity and ground state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerBody {
    pub collider: Capsule,
    pub velocity: Vec3,
    pub on_floor: bool,
}

impl PlayerBody {
    pub fn spawn(config: &PhysicsConfig) -> Self {
        Self {
            collider: spawn_capsule(config),
            velocity: Vec3::ZERO,
            on_floor: false,
        }
    }
}

/// Capsule at the spawn point, feet at `spawn_height`.
pub fn spawn_capsule(config: &PhysicsConfig) -> Capsule {
    Capsule::new(
        Vec3::new(0.0, config.spawn_height, 0.0),
        Vec3::new(0.0, config.spawn_height + config.player_height, 0.0),
        config.player_radius,
    )
}

/// First-person camera. Rotation is applied yaw first, then pitch, and the
/// unrotated camera looks down -Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Camera {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Apply a pointer delta in pixels.
    pub fn look(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.yaw -= dx * sensitivity;
        self.pitch -= dy * sensitivity;
    }

    pub fn reset_rotation(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Unit view direction.
    pub fn direction(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    /// View direction flattened onto the ground plane. Zero when looking
    /// straight up or down.
    pub fn forward(&self) -> Vec3 {
        let dir = self.direction();
        Vec3::new(dir.x, 0.0, dir.z).normalize_or_zero()
    }

    /// Ground-plane direction to the camera's right.
    pub fn side(&self) -> Vec3 {
        self.forward().cross(Vec3::Y)
    }
}
