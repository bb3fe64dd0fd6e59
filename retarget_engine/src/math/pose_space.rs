//! 姿态空间 / 全局空间矩阵转换
//!
//! 骨骼的姿态矩阵总是相对于"父骨骼当前姿态 × 父骨骼静止矩阵的逆"表达，
//! 而不是直接相对于世界空间：
//!
//! ```text
//! pose   = rest⁻¹ · parent_rest · parent_global⁻¹ · global
//! global = parent_global · parent_rest⁻¹ · rest · pose
//! ```
//!
//! 根骨骼没有父骨骼时，两式退化为 `pose = rest⁻¹ · global` 与 `global = rest · pose`。

use glam::Mat4;

use crate::config::get_config;
use crate::{Result, RetargetError};

/// 父骨骼在转换中需要的两个矩阵
#[derive(Clone, Copy, Debug)]
pub struct ParentFrame {
    /// 父骨骼静止矩阵（骨架空间）
    pub rest: Mat4,
    /// 父骨骼当前已求值的全局姿态矩阵
    pub global: Mat4,
}

/// 求逆前检查行列式，不可逆时返回 `DegenerateTransform`
pub fn checked_inverse(matrix: &Mat4, what: &str) -> Result<Mat4> {
    let det = matrix.determinant();
    if !det.is_finite() || det.abs() < get_config().determinant_epsilon {
        return Err(RetargetError::DegenerateTransform(format!(
            "{} is not invertible (det = {})",
            what, det
        )));
    }
    Ok(matrix.inverse())
}

/// 全局矩阵 → 姿态空间矩阵
pub fn to_pose_space(global: &Mat4, rest: &Mat4, parent: Option<&ParentFrame>) -> Result<Mat4> {
    let rest_inv = checked_inverse(rest, "bone rest matrix")?;
    match parent {
        Some(parent) => {
            let parent_inv = checked_inverse(&parent.global, "parent pose matrix")?;
            Ok(rest_inv * parent.rest * parent_inv * *global)
        }
        None => Ok(rest_inv * *global),
    }
}

/// 姿态空间矩阵 → 全局矩阵
pub fn to_global_space(pose: &Mat4, rest: &Mat4, parent: Option<&ParentFrame>) -> Result<Mat4> {
    match parent {
        Some(parent) => {
            let parent_rest_inv = checked_inverse(&parent.rest, "parent rest matrix")?;
            Ok(parent.global * parent_rest_inv * *rest * *pose)
        }
        None => Ok(*rest * *pose),
    }
}
