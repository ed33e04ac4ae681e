pub mod config;
pub mod geometry;
pub mod hand;
pub mod normalizer;
pub mod orientation;
pub mod render;
pub mod session;
pub mod source;
