//! 矩阵与变换工具

mod pose_space;
mod rotation;

pub use pose_space::{checked_inverse, to_global_space, to_pose_space, ParentFrame};
pub use rotation::{axis_angle_to_quat, quat_to_axis_angle, EulerOrder, RotationMode};

use glam::{Mat3, Mat4, Vec3};

/// 矩阵第 `axis` 列的方向向量（0=X, 1=Y, 2=Z）
pub fn axis(matrix: &Mat4, axis: usize) -> Vec3 {
    matrix.col(axis).truncate()
}

/// 矩阵的平移部分（骨骼头部位置）
pub fn head(matrix: &Mat4) -> Vec3 {
    matrix.w_axis.truncate()
}

/// 骨骼尾部位置 = 头部 + 长度 × Y 轴
pub fn tail(matrix: &Mat4, length: f32) -> Vec3 {
    head(matrix) + axis(matrix, 1) * length
}

/// 由三个轴和原点拼出仿射矩阵
pub fn from_axes(x: Vec3, y: Vec3, z: Vec3, origin: Vec3) -> Mat4 {
    Mat4::from_cols(x.extend(0.0), y.extend(0.0), z.extend(0.0), origin.extend(1.0))
}

/// 替换矩阵的旋转部分，保留平移
pub fn with_rotation(rotation: Mat3, origin: Vec3) -> Mat4 {
    from_axes(rotation.x_axis, rotation.y_axis, rotation.z_axis, origin)
}

/// 去掉向量在单位方向 `n` 上的分量
pub fn reject(v: Vec3, n: Vec3) -> Vec3 {
    v - n * v.dot(n)
}
