pub mod app;
pub mod audio;
pub mod config;
pub mod depth;
pub mod ecs;
pub mod flock;
pub mod ghost;
pub mod input;
pub mod render;
pub mod settings;
pub mod stats;
pub mod util;
