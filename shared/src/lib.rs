//! Types shared between the gallery simulation server and the browser renderer.

pub mod config;
pub mod protocol;
