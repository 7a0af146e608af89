//! Collider primitives and the narrow-phase tests against single triangles.
//!
//! Spheres and capsules are plain value types. The triangle tests mirror the
//! usual octree-walkthrough approach: a penetration is reported with an
//! outward normal and a non-negative depth, never a contact manifold.

use glam::Vec3;

/// Below this squared length a vector is treated as having no direction.
const DIRECTION_EPSILON: f32 = 1e-12;
const PARALLEL_EPSILON: f32 = 1e-10;

/// Outward contact normal (unit length) and penetration depth (>= 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub normal: Vec3,
    pub depth: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn intersects_box(&self, bounds: &Aabb) -> bool {
        bounds.distance_squared_to_point(self.center) <= self.radius * self.radius
    }
}

/// A segment from `start` (feet) to `end` (head) with a uniform radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
}

impl Capsule {
    pub fn new(start: Vec3, end: Vec3, radius: f32) -> Self {
        Self { start, end, radius }
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.start += offset;
        self.end += offset;
    }

    pub fn center(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }

    /// Conservative overlap test: each pair of axes is checked against the
    /// radius-expanded box in projection.
    pub fn intersects_box(&self, bounds: &Aabb) -> bool {
        let (s, e, r) = (self.start, self.end, self.radius);
        let (min, max) = (bounds.min, bounds.max);
        check_axis_pair(s.x, s.y, e.x, e.y, min.x, max.x, min.y, max.y, r)
            && check_axis_pair(s.x, s.z, e.x, e.z, min.x, max.x, min.z, max.z, r)
            && check_axis_pair(s.y, s.z, e.y, e.z, min.y, max.y, min.z, max.z, r)
    }
}

#[allow(clippy::too_many_arguments)]
fn check_axis_pair(
    p1x: f32,
    p1y: f32,
    p2x: f32,
    p2y: f32,
    min_x: f32,
    max_x: f32,
    min_y: f32,
    max_y: f32,
    radius: f32,
) -> bool {
    (min_x - p1x < radius || min_x - p2x < radius)
        && (p1x - max_x < radius || p2x - max_x < radius)
        && (min_y - p1y < radius || min_y - p2y < radius)
        && (p1y - max_y < radius || p2y - max_y < radius)
}

/// Tagged collider shape. Only spheres and the player capsule exist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Collider {
    Sphere(Sphere),
    Capsule(Capsule),
}

impl Collider {
    pub fn intersects_box(&self, bounds: &Aabb) -> bool {
        match self {
            Collider::Sphere(s) => s.intersects_box(bounds),
            Collider::Capsule(c) => c.intersects_box(bounds),
        }
    }

    pub fn translate(&mut self, offset: Vec3) {
        match self {
            Collider::Sphere(s) => s.center += offset,
            Collider::Capsule(c) => c.translate(offset),
        }
    }

    /// Reference point used to measure the net push-out of a query.
    pub fn anchor(&self) -> Vec3 {
        match self {
            Collider::Sphere(s) => s.center,
            Collider::Capsule(c) => c.center(),
        }
    }

    pub fn intersect_triangle(&self, triangle: &Triangle) -> Option<Contact> {
        match self {
            Collider::Sphere(s) => triangle.sphere_contact(s),
            Collider::Capsule(c) => triangle.capsule_contact(c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// An inverted box that any `expand` call replaces.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn expand_to_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn distance_squared_to_point(&self, p: Vec3) -> f32 {
        p.clamp(self.min, self.max).distance_squared(p)
    }

    /// Separating-axis test between this box and a triangle.
    pub fn intersects_triangle(&self, triangle: &Triangle) -> bool {
        if self.is_empty() {
            return false;
        }
        let center = self.center();
        let extents = self.max - center;

        let v0 = triangle.a - center;
        let v1 = triangle.b - center;
        let v2 = triangle.c - center;

        let f0 = v1 - v0;
        let f1 = v2 - v1;
        let f2 = v0 - v2;

        let edge_axes = [
            Vec3::new(0.0, -f0.z, f0.y),
            Vec3::new(0.0, -f1.z, f1.y),
            Vec3::new(0.0, -f2.z, f2.y),
            Vec3::new(f0.z, 0.0, -f0.x),
            Vec3::new(f1.z, 0.0, -f1.x),
            Vec3::new(f2.z, 0.0, -f2.x),
            Vec3::new(-f0.y, f0.x, 0.0),
            Vec3::new(-f1.y, f1.x, 0.0),
            Vec3::new(-f2.y, f2.x, 0.0),
        ];
        if !sat_for_axes(&edge_axes, v0, v1, v2, extents) {
            return false;
        }
        if !sat_for_axes(&[Vec3::X, Vec3::Y, Vec3::Z], v0, v1, v2, extents) {
            return false;
        }
        sat_for_axes(&[f0.cross(f1)], v0, v1, v2, extents)
    }
}

fn sat_for_axes(axes: &[Vec3], v0: Vec3, v1: Vec3, v2: Vec3, extents: Vec3) -> bool {
    axes.iter().all(|axis| {
        let r = extents.x * axis.x.abs() + extents.y * axis.y.abs() + extents.z * axis.z.abs();
        let p0 = v0.dot(*axis);
        let p1 = v1.dot(*axis);
        let p2 = v2.dot(*axis);
        (-p0.max(p1).max(p2)).max(p0.min(p1).min(p2)) <= r
    })
}

/// Plane through a triangle, `normal . p + constant = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    pub fn distance_to_point(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.constant
    }

    pub fn project_point(&self, p: Vec3) -> Vec3 {
        p - self.normal * self.distance_to_point(p)
    }
}

/// Counter-clockwise triangle; its front face is on the side of `(b-a)x(c-a)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Zero-area triangles have no usable plane.
    pub fn is_degenerate(&self) -> bool {
        (self.c - self.b)
            .cross(self.a - self.b)
            .length_squared()
            < DIRECTION_EPSILON
    }

    pub fn plane(&self) -> Plane {
        let normal = (self.c - self.b).cross(self.a - self.b).normalize_or_zero();
        Plane {
            normal,
            constant: -normal.dot(self.a),
        }
    }

    pub fn edges(&self) -> [(Vec3, Vec3); 3] {
        [(self.a, self.b), (self.b, self.c), (self.c, self.a)]
    }

    /// Barycentric containment of `p` projected onto the triangle's plane.
    pub fn contains_point(&self, p: Vec3) -> bool {
        let v0 = self.c - self.a;
        let v1 = self.b - self.a;
        let v2 = p - self.a;

        let dot00 = v0.dot(v0);
        let dot01 = v0.dot(v1);
        let dot02 = v0.dot(v2);
        let dot11 = v1.dot(v1);
        let dot12 = v1.dot(v2);

        let denom = dot00 * dot11 - dot01 * dot01;
        if denom == 0.0 {
            return false;
        }
        let inv = 1.0 / denom;
        let u = (dot11 * dot02 - dot01 * dot12) * inv;
        let v = (dot00 * dot12 - dot01 * dot02) * inv;
        u >= 0.0 && v >= 0.0 && u + v <= 1.0
    }

    pub fn sphere_contact(&self, sphere: &Sphere) -> Option<Contact> {
        let plane = self.plane();
        let distance = plane.distance_to_point(sphere.center);
        if distance.abs() > sphere.radius {
            return None;
        }

        if self.contains_point(sphere.center) {
            return Some(Contact {
                normal: plane.normal,
                depth: (distance - sphere.radius).abs(),
            });
        }

        let plane_point = plane.project_point(sphere.center);
        let r2 = sphere.radius * sphere.radius;
        for (p, q) in self.edges() {
            let closest = closest_point_on_segment(p, q, plane_point);
            let d2 = closest.distance_squared(sphere.center);
            if d2 < r2 {
                let normal = (sphere.center - closest).normalize_or_zero();
                if normal == Vec3::ZERO {
                    continue;
                }
                return Some(Contact {
                    normal,
                    depth: sphere.radius - d2.sqrt(),
                });
            }
        }
        None
    }

    pub fn capsule_contact(&self, capsule: &Capsule) -> Option<Contact> {
        let plane = self.plane();
        let d1 = plane.distance_to_point(capsule.start) - capsule.radius;
        let d2 = plane.distance_to_point(capsule.end) - capsule.radius;

        if (d1 > 0.0 && d2 > 0.0) || (d1 < -capsule.radius && d2 < -capsule.radius) {
            return None;
        }

        let sum = d1.abs() + d2.abs();
        let delta = if sum > 0.0 { (d1 / sum).abs() } else { 0.0 };
        let intersect_point = capsule.start.lerp(capsule.end, delta);
        if self.contains_point(intersect_point) {
            return Some(Contact {
                normal: plane.normal,
                depth: d1.min(d2).abs(),
            });
        }

        let r2 = capsule.radius * capsule.radius;
        for (p, q) in self.edges() {
            let (on_capsule, on_edge) =
                segment_closest_points(capsule.start, capsule.end, p, q);
            if on_capsule.distance_squared(on_edge) < r2 {
                let normal = (on_capsule - on_edge).normalize_or_zero();
                if normal == Vec3::ZERO {
                    continue;
                }
                return Some(Contact {
                    normal,
                    depth: capsule.radius - on_capsule.distance(on_edge),
                });
            }
        }
        None
    }
}

pub fn closest_point_on_segment(start: Vec3, end: Vec3, p: Vec3) -> Vec3 {
    let dir = end - start;
    let len2 = dir.length_squared();
    if len2 == 0.0 {
        return start;
    }
    let t = ((p - start).dot(dir) / len2).clamp(0.0, 1.0);
    start + dir * t
}

/// Closest points between segments `p1-q1` and `p2-q2`, clamped to both segments.
pub fn segment_closest_points(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    let r = q1 - p1;
    let s = q2 - p2;
    let w = p2 - p1;

    let a = r.dot(s);
    let b = r.dot(r);
    let c = s.dot(s);
    let d = s.dot(w);
    let e = r.dot(w);

    if c == 0.0 {
        return (closest_point_on_segment(p1, q1, p2), p2);
    }

    let divisor = b * c - a * a;
    let (t1, t2) = if divisor.abs() < PARALLEL_EPSILON {
        let d1 = -d / c;
        let d2 = (a - d) / c;
        if (d1 - 0.5).abs() < (d2 - 0.5).abs() {
            (0.0, d1)
        } else {
            (1.0, d2)
        }
    } else {
        let t1 = (d * a + e * c) / divisor;
        (t1, (t1 * a - d) / c)
    };

    let t1 = t1.clamp(0.0, 1.0);
    let t2 = t2.clamp(0.0, 1.0);
    (p1 + r * t1, p2 + s * t2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_triangle() -> Triangle {
        // Large counter-clockwise triangle in the y=0 plane, facing +y.
        Triangle::new(
            Vec3::new(-10.0, 0.0, 10.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, -10.0),
        )
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-5,
            "Expected {} to be close to {}",
            actual,
            expected
        );
    }

    #[test]
    fn floor_triangle_faces_up() {
        let plane = floor_triangle().plane();
        assert!((plane.normal - Vec3::Y).length() < 1e-6);
        assert_close(plane.constant, 0.0);
    }

    #[test]
    fn sphere_resting_in_floor_reports_depth() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.15, 0.0), 0.2);
        let contact = floor_triangle().sphere_contact(&sphere).unwrap();
        assert!((contact.normal - Vec3::Y).length() < 1e-6);
        assert_close(contact.depth, 0.05);
    }

    #[test]
    fn sphere_above_floor_has_no_contact() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.5, 0.0), 0.2);
        assert!(floor_triangle().sphere_contact(&sphere).is_none());
    }

    #[test]
    fn sphere_near_edge_pushes_away_from_edge() {
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -1.0),
        );
        // Just past the edge along x=0, slightly above the plane.
        let sphere = Sphere::new(Vec3::new(-0.1, 0.05, -0.5), 0.2);
        let contact = tri.sphere_contact(&sphere).unwrap();
        assert!(contact.normal.x < 0.0);
        assert!(contact.depth > 0.0 && contact.depth < 0.2);
    }

    #[test]
    fn capsule_standing_in_floor_reports_depth() {
        let capsule = Capsule::new(Vec3::new(0.0, 0.3, 0.0), Vec3::new(0.0, 0.95, 0.0), 0.35);
        let contact = floor_triangle().capsule_contact(&capsule).unwrap();
        assert!((contact.normal - Vec3::Y).length() < 1e-6);
        assert_close(contact.depth, 0.05);
    }

    #[test]
    fn capsule_above_floor_has_no_contact() {
        let capsule = Capsule::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.65, 0.0), 0.35);
        assert!(floor_triangle().capsule_contact(&capsule).is_none());
    }

    #[test]
    fn contains_point_respects_edges() {
        let tri = floor_triangle();
        assert!(tri.contains_point(Vec3::new(0.0, 1.0, 0.0)));
        assert!(!tri.contains_point(Vec3::new(20.0, 0.0, 0.0)));
    }

    #[test]
    fn degenerate_triangle_detected() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert!(tri.is_degenerate());
        assert!(!floor_triangle().is_degenerate());
    }

    #[test]
    fn box_triangle_overlap() {
        let bounds = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        assert!(bounds.intersects_triangle(&floor_triangle()));

        let high = Aabb::new(Vec3::new(-1.0, 2.0, -1.0), Vec3::new(1.0, 3.0, 1.0));
        assert!(!high.intersects_triangle(&floor_triangle()));
    }

    #[test]
    fn capsule_box_overlap_accounts_for_radius() {
        let bounds = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let touching = Capsule::new(Vec3::new(1.2, 0.5, 0.5), Vec3::new(1.2, 0.9, 0.5), 0.35);
        let far = Capsule::new(Vec3::new(2.0, 0.5, 0.5), Vec3::new(2.0, 0.9, 0.5), 0.35);
        assert!(touching.intersects_box(&bounds));
        assert!(!far.intersects_box(&bounds));
    }

    #[test]
    fn sphere_box_overlap() {
        let bounds = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(Sphere::new(Vec3::new(1.1, 0.5, 0.5), 0.2).intersects_box(&bounds));
        assert!(!Sphere::new(Vec3::new(1.5, 0.5, 0.5), 0.2).intersects_box(&bounds));
    }

    #[test]
    fn crossing_segments_meet() {
        let (p, q) = segment_closest_points(
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, -1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        );
        assert!((p - Vec3::ZERO).length() < 1e-6);
        assert!((q - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn parallel_segments_stay_finite() {
        let (p, q) = segment_closest_points(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        );
        assert!(p.is_finite() && q.is_finite());
        assert_close(p.distance(q), 1.0);
    }
}
