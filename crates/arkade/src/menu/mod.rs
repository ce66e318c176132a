pub mod model;

pub use model::{ItemVisual, MenuPhase, MenuVisual, RadialMenu, selected_mode};
