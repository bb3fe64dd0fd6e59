//! 地面约束：脚部不穿透地面、脚趾不高于脚掌

mod engine;
mod plane;
mod toe;

pub use engine::{apply_floor_constraint, FloorOptions};
pub use plane::FloorPlane;
pub use toe::apply_toe_floor_constraint;
