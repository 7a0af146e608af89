use gallery_shared::config::GalleryConfig;
use std::path::PathBuf;

pub const ENV_LISTEN_ADDR: &str = "GALLERY_LISTEN_ADDR";
pub const ENV_SCENE: &str = "GALLERY_SCENE";
pub const ENV_FRAME_RATE: &str = "GALLERY_FRAME_RATE";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub frame_rate_hz: u32,
    pub broadcast_rate_hz: u32,
    /// Scene JSON to load; the built-in gallery when unset.
    pub scene_path: Option<PathBuf>,
    pub gallery: GalleryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9001".to_string(),
            frame_rate_hz: 60,
            broadcast_rate_hz: 30,
            scene_path: None,
            gallery: GalleryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `GALLERY_*` environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut config = Self::default();
        if let Some(addr) = lookup(ENV_LISTEN_ADDR) {
            config.listen_addr = addr;
        }
        if let Some(path) = lookup(ENV_SCENE).filter(|p| !p.is_empty()) {
            config.scene_path = Some(PathBuf::from(path));
        }
        if let Some(rate) = lookup(ENV_FRAME_RATE) {
            config.frame_rate_hz = rate
                .trim()
                .parse()
                .map_err(|_| format!("{} must be a positive integer, got {:?}", ENV_FRAME_RATE, rate))?;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.is_empty() {
            return Err("listen_addr must not be empty".to_string());
        }
        if self.frame_rate_hz == 0 {
            return Err("frame_rate_hz must be positive".to_string());
        }
        if self.broadcast_rate_hz == 0 {
            return Err("broadcast_rate_hz must be positive".to_string());
        }
        if self.broadcast_rate_hz > self.frame_rate_hz {
            return Err(format!(
                "broadcast_rate_hz ({}) must not exceed frame_rate_hz ({})",
                self.broadcast_rate_hz, self.frame_rate_hz
            ));
        }
        self.gallery.validate()
    }

    /// Frames between two broadcasts.
    pub fn broadcast_every(&self) -> u32 {
        (self.frame_rate_hz / self.broadcast_rate_hz.max(1)).max(1)
    }
}
