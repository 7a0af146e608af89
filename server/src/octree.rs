//! Static octree over the level's triangle soup.
//!
//! Built once when the level finishes loading and only queried afterwards.
//! A query gathers the triangles of every leaf the collider's bounds touch,
//! pushes a scratch copy of the collider out of each penetrated triangle in
//! turn, and reports the accumulated displacement as a single contact.

use crate::collider::{Aabb, Capsule, Collider, Contact, Sphere, Triangle};
use glam::Vec3;

/// Leaves holding more triangles than this are split further.
pub const TRIANGLES_PER_LEAF: usize = 8;
pub const MAX_DEPTH: u32 = 16;
/// The root box is grown by this much on its min corner so geometry lying
/// exactly on a split plane is not lost to the regular grid.
const ROOT_PADDING: f32 = 0.01;
/// Net push-outs shorter than this carry no usable direction.
const MIN_PUSH: f32 = 1e-7;

#[derive(Debug)]
struct Node {
    bounds: Aabb,
    /// Indices into `Octree::triangles`. Only leaves hold any.
    triangles: Vec<u32>,
    children: Vec<Node>,
}

impl Node {
    fn new(bounds: Aabb) -> Self {
        Self {
            bounds,
            triangles: Vec::new(),
            children: Vec::new(),
        }
    }

    fn split(&mut self, level: u32, triangles: &[Triangle]) {
        let half = (self.bounds.max - self.bounds.min) * 0.5;
        let mut octants = Vec::with_capacity(8);
        for x in 0..2 {
            for y in 0..2 {
                for z in 0..2 {
                    let offset = Vec3::new(x as f32, y as f32, z as f32) * half;
                    let min = self.bounds.min + offset;
                    octants.push(Node::new(Aabb::new(min, min + half)));
                }
            }
        }

        for index in self.triangles.drain(..) {
            let triangle = &triangles[index as usize];
            for octant in octants.iter_mut() {
                if octant.bounds.intersects_triangle(triangle) {
                    octant.triangles.push(index);
                }
            }
        }

        for mut octant in octants {
            let len = octant.triangles.len();
            if len > TRIANGLES_PER_LEAF && level < MAX_DEPTH {
                octant.split(level + 1, triangles);
            }
            if len != 0 {
                self.children.push(octant);
            }
        }
    }

    fn collect(&self, collider: &Collider, out: &mut Vec<u32>) {
        for child in &self.children {
            if !collider.intersects_box(&child.bounds) {
                continue;
            }
            if child.triangles.is_empty() {
                child.collect(collider, out);
            } else {
                for &index in &child.triangles {
                    if !out.contains(&index) {
                        out.push(index);
                    }
                }
            }
        }
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }
}

/// Read-only spatial index over static level geometry.
#[derive(Debug)]
pub struct Octree {
    triangles: Vec<Triangle>,
    root: Node,
    skipped: usize,
}

impl Octree {
    /// Build the index from a triangle soup. Zero-area triangles are dropped;
    /// other malformed input only degrades query quality.
    pub fn build(soup: impl IntoIterator<Item = Triangle>) -> Self {
        let mut triangles = Vec::new();
        let mut skipped = 0;
        let mut bounds = Aabb::empty();

        for triangle in soup {
            if triangle.is_degenerate() {
                skipped += 1;
                continue;
            }
            bounds.expand_to_point(triangle.a);
            bounds.expand_to_point(triangle.b);
            bounds.expand_to_point(triangle.c);
            triangles.push(triangle);
        }

        if skipped > 0 {
            tracing::debug!("Dropped {} degenerate triangles", skipped);
        }

        if triangles.is_empty() {
            return Self {
                triangles,
                root: Node::new(Aabb::empty()),
                skipped,
            };
        }

        bounds.min -= Vec3::splat(ROOT_PADDING);
        let mut root = Node::new(bounds);
        root.triangles = (0..triangles.len() as u32).collect();
        root.split(0, &triangles);

        Self {
            triangles,
            root,
            skipped,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    pub fn node_count(&self) -> usize {
        self.root.count()
    }

    pub fn bounds(&self) -> Aabb {
        self.root.bounds
    }

    pub fn sphere_intersect(&self, sphere: &Sphere) -> Option<Contact> {
        self.intersect(Collider::Sphere(*sphere))
    }

    pub fn capsule_intersect(&self, capsule: &Capsule) -> Option<Contact> {
        self.intersect(Collider::Capsule(*capsule))
    }

    /// Candidate triangles for `collider`, in discovery order.
    pub fn candidates(&self, collider: &Collider) -> Vec<u32> {
        let mut out = Vec::new();
        self.root.collect(collider, &mut out);
        out
    }

    fn intersect(&self, collider: Collider) -> Option<Contact> {
        let candidates = self.candidates(&collider);
        let mut scratch = collider;
        let mut hit = false;

        for index in candidates {
            if let Some(contact) = scratch.intersect_triangle(&self.triangles[index as usize]) {
                hit = true;
                scratch.translate(contact.normal * contact.depth);
            }
        }

        if !hit {
            return None;
        }

        let push = scratch.anchor() - collider.anchor();
        let depth = push.length();
        if depth < MIN_PUSH {
            return None;
        }
        Some(Contact {
            normal: push / depth,
            depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two triangles forming a square floor at y=0 spanning [-half, half].
    fn floor(half: f32) -> Vec<Triangle> {
        let a = Vec3::new(-half, 0.0, -half);
        let b = Vec3::new(half, 0.0, -half);
        let c = Vec3::new(half, 0.0, half);
        let d = Vec3::new(-half, 0.0, half);
        vec![Triangle::new(a, c, b), Triangle::new(a, d, c)]
    }

    /// A floor made of many small quads so the tree actually splits.
    fn tiled_floor(tiles: i32, size: f32) -> Vec<Triangle> {
        let mut out = Vec::new();
        for i in 0..tiles {
            for j in 0..tiles {
                let x0 = i as f32 * size - tiles as f32 * size * 0.5;
                let z0 = j as f32 * size - tiles as f32 * size * 0.5;
                let a = Vec3::new(x0, 0.0, z0);
                let b = Vec3::new(x0 + size, 0.0, z0);
                let c = Vec3::new(x0 + size, 0.0, z0 + size);
                let d = Vec3::new(x0, 0.0, z0 + size);
                out.push(Triangle::new(a, c, b));
                out.push(Triangle::new(a, d, c));
            }
        }
        out
    }

    #[test]
    fn floor_faces_up() {
        for tri in floor(5.0) {
            assert!((tri.plane().normal - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn empty_index_never_reports_contacts() {
        let tree = Octree::build(Vec::new());
        assert_eq!(tree.triangle_count(), 0);
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        assert!(tree.sphere_intersect(&sphere).is_none());
    }

    #[test]
    fn degenerate_triangles_are_skipped() {
        let mut soup = floor(5.0);
        soup.push(Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0));
        let tree = Octree::build(soup);
        assert_eq!(tree.triangle_count(), 2);
        assert_eq!(tree.skipped_count(), 1);
    }

    #[test]
    fn large_mesh_splits_into_children() {
        let tree = Octree::build(tiled_floor(16, 1.0));
        assert_eq!(tree.triangle_count(), 512);
        assert!(tree.node_count() > 9);
    }

    #[test]
    fn sphere_sunk_in_floor_pushes_up() {
        let tree = Octree::build(tiled_floor(16, 1.0));
        let sphere = Sphere::new(Vec3::new(0.3, 0.1, 0.6), 0.2);
        let contact = tree.sphere_intersect(&sphere).unwrap();
        assert!((contact.normal - Vec3::Y).length() < 1e-4);
        assert!((contact.depth - 0.1).abs() < 1e-4);
    }

    #[test]
    fn capsule_sunk_in_floor_pushes_up() {
        let tree = Octree::build(floor(10.0));
        let capsule = Capsule::new(Vec3::new(1.0, 0.25, 2.0), Vec3::new(1.0, 0.9, 2.0), 0.35);
        let contact = tree.capsule_intersect(&capsule).unwrap();
        assert!(contact.normal.y > 0.99);
        assert!((contact.depth - 0.1).abs() < 1e-4);
    }

    #[test]
    fn far_collider_has_no_candidates() {
        let tree = Octree::build(tiled_floor(16, 1.0));
        let sphere = Collider::Sphere(Sphere::new(Vec3::new(0.0, 50.0, 0.0), 0.2));
        assert!(tree.candidates(&sphere).is_empty());
    }

    #[test]
    fn correction_does_not_increase_penetration() {
        let tree = Octree::build(tiled_floor(16, 1.0));
        for start_y in [0.19_f32, 0.12, 0.05, 0.01] {
            let mut sphere = Sphere::new(Vec3::new(-2.3, start_y, 1.4), 0.2);
            let first = tree.sphere_intersect(&sphere).unwrap();
            sphere.center += first.normal * first.depth;
            let second = tree.sphere_intersect(&sphere).map_or(0.0, |c| c.depth);
            assert!(
                second <= first.depth,
                "Depth grew from {} to {} at y={}",
                first.depth,
                second,
                start_y
            );
        }
    }

    #[test]
    fn capsule_correction_does_not_increase_penetration() {
        let tree = Octree::build(tiled_floor(8, 2.0));
        let mut capsule = Capsule::new(Vec3::new(0.5, 0.1, 1.2), Vec3::new(0.5, 0.75, 1.2), 0.35);
        let first = tree.capsule_intersect(&capsule).unwrap();
        capsule.translate(first.normal * first.depth);
        let second = tree.capsule_intersect(&capsule).map_or(0.0, |c| c.depth);
        assert!(second <= first.depth);
    }
}
