//! 动画系统：关键帧、曲线、Action、帧范围与关键帧写入

mod action;
mod bezier;
mod fcurve;
mod frame_range;
mod keyframe;
pub mod writer;

pub use action::Action;
pub use bezier::BezierCurve;
pub use fcurve::{Channel, ChannelPath, Extrapolation, FCurve};
pub use frame_range::FrameRange;
pub use keyframe::{Interpolation, Keyframe};
pub use writer::{fill_keyframes, insert_location, insert_rotation, normalize_interpolation};
