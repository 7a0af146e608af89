use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::GalleryConfig;

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

// === Server -> Client ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "welcome")]
    Welcome(WelcomeMsg),
    #[serde(rename = "frame")]
    Frame(FrameMsg),
    #[serde(rename = "open_url")]
    OpenUrl(OpenUrlMsg),
    #[serde(rename = "rejected")]
    Rejected(RejectedMsg),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMsg {
    pub protocol_version: u32,
    pub server_version: String,
    pub config: GalleryConfig,
}

/// Camera pose for the renderer. Orientation is a quaternion `[x, y, z, w]`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct CameraWire {
    pub position: [f32; 3],
    pub orientation: [f32; 4],
}

/// Everything the renderer and UI overlay consume for one frame.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct FrameMsg {
    pub frame: u64,
    pub camera: CameraWire,
    pub spheres: Vec<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub glitch: bool,
    /// Background color as 0xRRGGBB
    pub background: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
pub struct OpenUrlMsg {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
pub struct RejectedMsg {
    pub reason: String,
}

// === Client -> Server ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(tag = "type")]
pub enum ClientMsg {
    /// `code` is a DOM `KeyboardEvent.code` such as `"KeyW"` or `"Space"`.
    #[serde(rename = "key_down")]
    KeyDown { code: String },
    #[serde(rename = "key_up")]
    KeyUp { code: String },
    /// Pointer movement in pixels since the last message.
    #[serde(rename = "look")]
    Look { dx: f32, dy: f32 },
    #[serde(rename = "pointer_down")]
    PointerDown,
    /// `locked` reports whether the pointer was captured when released.
    #[serde(rename = "pointer_up")]
    PointerUp { locked: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_msg_omits_missing_prompt() {
        let msg = ServerMsg::Frame(FrameMsg {
            frame: 3,
            camera: CameraWire {
                position: [0.0, 10.65, 0.0],
                orientation: [0.0, 0.0, 0.0, 1.0],
            },
            spheres: vec![[0.0, -100.0, 0.0]],
            prompt: None,
            glitch: false,
            background: 0x87ceeb,
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"frame\""));
        assert!(!json.contains("prompt"));
    }

    #[test]
    fn client_msg_key_down_parses() {
        let parsed: ClientMsg =
            serde_json::from_str(r#"{"type":"key_down","code":"KeyW"}"#).unwrap();
        match parsed {
            ClientMsg::KeyDown { code } => assert_eq!(code, "KeyW"),
            _ => panic!("Expected KeyDown"),
        }
    }

    #[test]
    fn client_msg_pointer_down_has_no_payload() {
        let json = serde_json::to_string(&ClientMsg::PointerDown).unwrap();
        assert_eq!(json, r#"{"type":"pointer_down"}"#);
    }

    #[test]
    fn welcome_carries_config() {
        let msg = ServerMsg::Welcome(WelcomeMsg {
            protocol_version: PROTOCOL_VERSION,
            server_version: "test".to_string(),
            config: GalleryConfig::default(),
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"protocolVersion\":1"));
        assert!(json.contains("\"paintingDistance\":10.0"));
    }
}
