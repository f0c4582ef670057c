pub mod app;
pub mod clock;
pub mod config;
pub mod flight;
pub mod logging;
pub mod render;
pub mod scene;
pub mod terminal;
pub mod visual;
