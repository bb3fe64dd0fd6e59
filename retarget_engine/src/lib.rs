//! Retarget Engine - FK/IK 切换与地面约束的重定向引擎
//!
//! 提供动作捕捉数据重定向到骨骼绑定上时所需的核心功能：
//! - 姿态空间 / 全局空间矩阵转换
//! - 极向目标（pole target）求解
//! - 手臂、腿部的 FK→IK / IK→FK 逐帧吸附
//! - 脚部地面投影约束与脚趾约束
//! - 关键帧写入与插值规范化
//!
//! 宿主场景（骨骼树、动画曲线、时间轴）由 [`scene::PoseContext`] 显式建模，
//! 所有姿态求值都必须显式调用 `refresh()`。

pub mod animation;
pub mod config;
pub mod floor;
pub mod math;
pub mod scene;
pub mod skeleton;
pub mod snap;

#[cfg(test)]
pub(crate) mod testing;

pub use animation::{Action, ChannelPath, FCurve, FrameRange};
pub use config::{get_config, reset_config, set_config, RetargetConfig};
pub use floor::{apply_floor_constraint, apply_toe_floor_constraint, FloorOptions, FloorPlane};
pub use scene::{pick_rig_and_plane, ObjectKind, PoseContext, SceneObject, Timeline};
pub use skeleton::{Bone, RigProfile, Rig, RotationMode, Side};
pub use snap::{
    clear_animation, clear_pole_targets, leg_ik_active, limbs_bend_positive, set_ik_switch,
    solve_pole_point, transfer_fk_to_ik, transfer_ik_to_fk, TransferOptions,
};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetargetError {
    #[error("Unsupported rig topology: {0}")]
    UnsupportedRigTopology(String),

    #[error("Unsupported for mode: {0}")]
    UnsupportedForMode(String),

    #[error("Degenerate transform: {0}")]
    DegenerateTransform(String),

    #[error("No animation data: {0}")]
    NoAnimationData(String),

    #[error("Ambiguous selection: {0}")]
    AmbiguousSelection(String),
}

impl RetargetError {
    /// 错误类别标签（稳定字符串，供调用方分类处理）
    pub fn category(&self) -> &'static str {
        match self {
            RetargetError::UnsupportedRigTopology(_) => "unsupported_rig_topology",
            RetargetError::UnsupportedForMode(_) => "unsupported_for_mode",
            RetargetError::DegenerateTransform(_) => "degenerate_transform",
            RetargetError::NoAnimationData(_) => "no_animation_data",
            RetargetError::AmbiguousSelection(_) => "ambiguous_selection",
        }
    }
}

pub type Result<T> = std::result::Result<T, RetargetError>;
