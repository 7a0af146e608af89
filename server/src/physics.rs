//! One physics substep, split into the stages the frame driver runs in
//! order: controls, player integration and world collision, sphere
//! integration with world and player contacts, sphere-sphere contacts, and
//! out-of-bounds recovery.
//!
//! `level` is `None` until the level geometry has loaded; every world query
//! then reports no contact.

use crate::collider::Sphere;
use crate::input::InputState;
use crate::octree::Octree;
use crate::player::{spawn_capsule, Camera, PlayerBody};
use crate::sphere::SphereBody;
use gallery_shared::config::PhysicsConfig;
use glam::Vec3;

/// Substep length for a frame: the frame delta is clamped so a stalled tab
/// cannot produce a tunnelling step, then split evenly.
pub fn substep_dt(frame_delta: f32, config: &PhysicsConfig) -> f32 {
    let clamped = if frame_delta.is_finite() {
        frame_delta.clamp(0.0, config.max_frame_delta)
    } else {
        0.0
    };
    clamped / config.steps_per_frame.max(1) as f32
}

pub fn apply_controls(
    player: &mut PlayerBody,
    camera: &Camera,
    input: &InputState,
    dt: f32,
    config: &PhysicsConfig,
) {
    let accel = if player.on_floor {
        config.ground_accel
    } else {
        config.air_accel
    };
    let speed_delta = dt * accel;

    if input.forward {
        player.velocity += camera.forward() * speed_delta;
    }
    if input.back {
        player.velocity -= camera.forward() * speed_delta;
    }
    if input.left {
        player.velocity -= camera.side() * speed_delta;
    }
    if input.right {
        player.velocity += camera.side() * speed_delta;
    }
    if player.on_floor && input.jump {
        player.velocity.y = config.jump_speed;
    }
}

/// Damp, apply gravity when airborne, move, collide with the level, and
/// put the camera at the capsule's head.
pub fn update_player(
    player: &mut PlayerBody,
    camera: &mut Camera,
    level: Option<&Octree>,
    dt: f32,
    config: &PhysicsConfig,
) {
    let mut damping = (-config.player_damping * dt).exp() - 1.0;
    if !player.on_floor {
        player.velocity.y -= config.gravity * dt;
        damping *= config.air_damping_factor;
    }
    player.velocity += player.velocity * damping;

    player.collider.translate(player.velocity * dt);
    resolve_player_world(player, level, config);
    camera.position = player.collider.end;
}

/// Ground the player on upward-facing contacts, slide along everything else,
/// and push the capsule out of the level.
pub fn resolve_player_world(player: &mut PlayerBody, level: Option<&Octree>, config: &PhysicsConfig) {
    player.on_floor = false;
    let Some(contact) = level.and_then(|l| l.capsule_intersect(&player.collider)) else {
        return;
    };

    player.on_floor = contact.normal.y > 0.0;
    if !player.on_floor {
        player.velocity -= contact.normal * contact.normal.dot(player.velocity);
    }
    if contact.depth >= config.min_push_depth {
        player.collider.translate(contact.normal * contact.depth);
    }
}

/// Integrate every sphere, bounce it off the level, and let the player
/// shove it. Sphere-sphere contacts are resolved afterwards in one pass.
pub fn update_spheres(
    bodies: &mut [SphereBody],
    player: &mut PlayerBody,
    level: Option<&Octree>,
    dt: f32,
    config: &PhysicsConfig,
) {
    let damping = (-config.sphere_damping * dt).exp() - 1.0;

    for body in bodies.iter_mut() {
        body.collider.center += body.velocity * dt;

        match level.and_then(|l| l.sphere_intersect(&body.collider)) {
            Some(contact) => {
                body.velocity -=
                    contact.normal * (contact.normal.dot(body.velocity) * config.sphere_bounce);
                body.collider.center += contact.normal * contact.depth;
            }
            None => body.velocity.y -= config.gravity * dt,
        }

        body.velocity += body.velocity * damping;
        resolve_player_sphere(player, body);
    }

    resolve_sphere_pairs(bodies);
}

/// Swap the components of `a` and `b` along unit `normal`, leaving the
/// tangential components alone.
pub fn exchange_normal_velocity(a: &mut Vec3, b: &mut Vec3, normal: Vec3) {
    let va = normal * normal.dot(*a);
    let vb = normal * normal.dot(*b);
    *a += vb - va;
    *b += va - vb;
}

/// The capsule is approximated by spheres at its feet, head and middle.
/// Only the ball is moved; the player just trades momentum with it.
pub fn resolve_player_sphere(player: &mut PlayerBody, body: &mut SphereBody) {
    let capsule = player.collider;
    let r = capsule.radius + body.collider.radius;
    let r2 = r * r;

    for point in [capsule.start, capsule.end, capsule.center()] {
        let d2 = point.distance_squared(body.collider.center);
        if d2 >= r2 {
            continue;
        }
        let normal = (point - body.collider.center).normalize_or_zero();
        if normal == Vec3::ZERO {
            continue;
        }
        exchange_normal_velocity(&mut player.velocity, &mut body.velocity, normal);
        let d = (r - d2.sqrt()) / 2.0;
        body.collider.center -= normal * d;
    }
}

/// Resolve every overlapping pair once, `i < j` ascending. The result depends
/// on array order when contacts chain through more than two spheres.
pub fn resolve_sphere_pairs(bodies: &mut [SphereBody]) {
    let len = bodies.len();
    for i in 0..len {
        let (head, tail) = bodies.split_at_mut(i + 1);
        let s1 = &mut head[i];
        for s2 in tail.iter_mut() {
            resolve_sphere_pair(s1, s2);
        }
    }
}

fn resolve_sphere_pair(s1: &mut SphereBody, s2: &mut SphereBody) {
    let d2 = s1.collider.center.distance_squared(s2.collider.center);
    let r = s1.collider.radius + s2.collider.radius;
    if d2 >= r * r {
        return;
    }
    let normal = (s1.collider.center - s2.collider.center).normalize_or_zero();
    if normal == Vec3::ZERO {
        return;
    }
    exchange_normal_velocity(&mut s1.velocity, &mut s2.velocity, normal);
    let d = (r - d2.sqrt()) / 2.0;
    s1.collider.center += normal * d;
    s2.collider.center -= normal * d;
}

/// Teleport the player back to spawn once the camera drops to the kill
/// height. Velocity is kept as is. Returns whether a respawn happened.
pub fn respawn_if_out_of_bounds(
    player: &mut PlayerBody,
    camera: &mut Camera,
    config: &PhysicsConfig,
) -> bool {
    if camera.position.y > config.out_of_bounds_height {
        return false;
    }
    player.collider = spawn_capsule(config);
    camera.position = player.collider.end;
    camera.reset_rotation();
    true
}

/// Place a sphere just ahead of the player's head and launch it along the
/// view direction, inheriting twice the player's velocity.
pub fn launch_sphere(
    body: &mut SphereBody,
    player: &PlayerBody,
    camera: &Camera,
    impulse: f32,
    config: &PhysicsConfig,
) {
    let direction = camera.direction();
    body.collider = Sphere::new(
        player.collider.end + direction * (player.collider.radius * config.throw_offset),
        body.collider.radius,
    );
    body.velocity = direction * impulse + player.velocity * 2.0;
}
