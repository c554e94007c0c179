// PlayLens - platform/mod.rs
//
// Platform layer: filesystem access, config location and loading, and the
// outbound webhook. Everything that touches the OS or network lives here.

pub mod config;
pub mod fs;
pub mod notify;
