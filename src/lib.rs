pub mod config;
pub mod dom;
pub mod engine;
pub mod net;
pub mod render;
