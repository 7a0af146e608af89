//! Gallery walkthrough server library.
//!
//! The physics and interaction core plus the frame driver and WebSocket
//! bridge, exposed for the binaries and integration tests.

pub mod collider;
pub mod color;
pub mod config;
pub mod effect;
pub mod game_loop;
pub mod input;
pub mod interaction;
pub mod octree;
pub mod physics;
pub mod player;
pub mod protocol;
pub mod scene;
pub mod sphere;
pub mod world;
pub mod ws;
