pub mod cache;
pub mod color;
pub mod resolver;

pub use cache::StyleCache;
pub use color::Color;
pub use resolver::{cluster_radius, cluster_style, marker_style, RenderStyle};
