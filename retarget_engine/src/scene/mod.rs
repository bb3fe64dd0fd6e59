//! 场景：姿态上下文、时间轴、选中对象与作用域守卫

mod context;
mod guard;
mod progress;
mod selection;
mod timeline;

pub use context::PoseContext;
pub use guard::{ConstraintMuteGuard, LayerGuard};
pub use progress::Progress;
pub use selection::{pick_rig_and_plane, ObjectKind, SceneObject};
pub use timeline::{Marker, Timeline};
