use crate::collider::Sphere;
use glam::Vec3;

/// Where unused spheres wait until their first throw.
pub const PARKED_POSITION: Vec3 = Vec3::new(0.0, -100.0, 0.0);

/// A dynamic ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereBody {
    pub collider: Sphere,
    pub velocity: Vec3,
}

impl SphereBody {
    pub fn parked(radius: f32) -> Self {
        Self {
            collider: Sphere::new(PARKED_POSITION, radius),
            velocity: Vec3::ZERO,
        }
    }
}

/// Fixed pool of spheres reused round-robin. Nothing is allocated after
/// construction; a throw always recycles the body under the cursor.
#[derive(Debug, Clone)]
pub struct SpherePool {
    bodies: Vec<SphereBody>,
    next: usize,
}

impl SpherePool {
    pub fn new(count: usize, radius: f32) -> Self {
        Self {
            bodies: vec![SphereBody::parked(radius); count.max(1)],
            next: 0,
        }
    }

    /// Index the next throw will reuse.
    pub fn cursor(&self) -> usize {
        self.next
    }

    /// Hand out the body under the cursor and advance it.
    pub fn claim(&mut self) -> usize {
        let index = self.next;
        self.next = (self.next + 1) % self.bodies.len();
        index
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SphereBody> {
        self.bodies.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SphereBody> {
        self.bodies.get_mut(index)
    }

    pub fn bodies(&self) -> &[SphereBody] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [SphereBody] {
        &mut self.bodies
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.bodies.iter().map(|b| b.collider.center)
    }
}

/// Launch speed for a throw, saturating towards `base + extra` the longer
/// the button was held.
pub fn throw_impulse(held_ms: f32, base: f32, extra: f32) -> f32 {
    base + extra * (1.0 - (-held_ms.max(0.0) * 0.001).exp())
}
