pub use gallery_shared::protocol::*;

use crate::world::FrameSnapshot;
use glam::{Quat, Vec3};

// === Conversion helpers ===

/// Round to 4 decimal places (millimetre precision, keeps frames small)
#[inline]
fn round4(v: f32) -> f32 {
    (v * 10000.0).round() / 10000.0
}

fn vec3_wire(v: Vec3) -> [f32; 3] {
    [round4(v.x), round4(v.y), round4(v.z)]
}

fn quat_wire(q: Quat) -> [f32; 4] {
    [round4(q.x), round4(q.y), round4(q.z), round4(q.w)]
}

pub fn camera_wire(position: Vec3, orientation: Quat) -> CameraWire {
    CameraWire {
        position: vec3_wire(position),
        orientation: quat_wire(orientation),
    }
}

pub fn frame_msg(snapshot: &FrameSnapshot) -> FrameMsg {
    FrameMsg {
        frame: snapshot.frame,
        camera: camera_wire(snapshot.camera_position, snapshot.camera_orientation),
        spheres: snapshot.spheres.iter().copied().map(vec3_wire).collect(),
        prompt: snapshot.prompt.map(str::to_string),
        glitch: snapshot.glitch,
        background: snapshot.background,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> FrameSnapshot {
        FrameSnapshot {
            frame: 42,
            camera_position: Vec3::new(1.234567, 10.65, -0.00004),
            camera_orientation: Quat::from_rotation_y(0.5),
            spheres: vec![Vec3::new(0.0, -100.0, 0.0), Vec3::new(0.123456, 0.2, 3.99996)],
            prompt: Some("Press 'B' to buy artwork"),
            glitch: true,
            background: 0xff0000,
        }
    }

    #[test]
    fn frame_positions_are_rounded() {
        let msg = frame_msg(&snapshot());
        assert_eq!(msg.frame, 42);
        assert!((msg.camera.position[0] - 1.2346).abs() < 1e-6);
        assert_eq!(msg.camera.position[2], 0.0);
        assert!((msg.spheres[1][0] - 0.1235).abs() < 1e-6);
        assert!((msg.spheres[1][2] - 4.0).abs() < 1e-6);
        assert_eq!(msg.spheres.len(), 2);
    }

    #[test]
    fn frame_carries_overlay_state() {
        let msg = frame_msg(&snapshot());
        assert_eq!(msg.prompt.as_deref(), Some("Press 'B' to buy artwork"));
        assert!(msg.glitch);
        assert_eq!(msg.background, 0xff0000);
    }

    #[test]
    fn orientation_is_xyzw() {
        let msg = frame_msg(&snapshot());
        let q = Quat::from_rotation_y(0.5);
        assert!((msg.camera.orientation[1] - round4(q.y)).abs() < 1e-6);
        assert!((msg.camera.orientation[3] - round4(q.w)).abs() < 1e-6);
        assert_eq!(msg.camera.orientation[0], 0.0);
    }

    #[test]
    fn frame_serializes_with_type_tag() {
        let json = serde_json::to_string(&ServerMsg::Frame(frame_msg(&snapshot())))
            .unwrap();
        assert!(json.contains("\"type\":\"frame\""));
        assert!(json.contains("\"glitch\":true"));
        let parsed: ServerMsg = serde_json::from_str(&json).unwrap();
        match parsed {
            ServerMsg::Frame(f) => assert_eq!(f.spheres.len(), 2),
            _ => panic!("Expected Frame"),
        }
    }
}
