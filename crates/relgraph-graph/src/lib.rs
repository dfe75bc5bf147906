pub mod animation;
pub mod filter;
pub mod geometry;
pub mod hit_tester;
pub mod limiter;
pub mod simulation;
pub mod style;
pub mod transform;
pub mod viewport;

pub use animation::{Easing, Transition};
pub use filter::{GraphStats, KindFilter};
pub use geometry::{Bounds, Vec2};
pub use hit_tester::HitTester;
pub use limiter::{LimitReport, NodeLimiter};
pub use simulation::{ForceConfig, LayoutEngine, SimNode, SimulationState};
pub use style::{
    COLLISION_PADDING, Color, FillRule, LinkVisual, NodeState, NodeVisual, collision_radius,
    is_navigable_company, kind_color, link_visual, node_radius, node_visual, shows_ring,
};
pub use transform::{DedupKey, DedupResult, GraphTransformer};
pub use viewport::{MAX_ZOOM, MIN_ZOOM, ViewTransform, Viewport, clamp_zoom, wheel_zoom_factor};
