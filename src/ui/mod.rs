//! Routing och textvyer

pub mod render;
pub mod route;

pub use render::TextRenderer;
pub use route::Route;
