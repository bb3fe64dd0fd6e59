//! 骨骼节点

use glam::{Mat3, Mat4, Quat, Vec3, Vec4};

use crate::animation::Channel;
use crate::math::{axis_angle_to_quat, quat_to_axis_angle, RotationMode};

use super::constraint::{BoneConstraint, ConstraintKind};

/// 骨骼节点
#[derive(Clone, Debug)]
pub struct Bone {
    pub name: String,
    pub parent_index: Option<usize>,

    // 静止姿态（骨架空间，绑定时的 matrix_local）
    pub rest_transform: Mat4,
    // 静止矩阵的逆（在 Rig::add_bone 中计算）
    pub rest_inverse: Mat4,
    // 沿本地 Y 轴的长度
    pub length: f32,

    pub rotation_mode: RotationMode,

    // 姿态通道（姿态空间，相对于父骨骼当前姿态）
    pub location: Vec3,
    pub rotation_quaternion: Quat,
    pub rotation_euler: Vec3,
    pub rotation_axis_angle: Vec4,
    pub scale: Vec3,

    pub constraints: Vec<BoneConstraint>,

    // 求值结果（骨架空间），只由 Rig::evaluate 写入
    pub global_transform: Mat4,
}

impl Bone {
    pub fn new(name: impl Into<String>, rest_transform: Mat4, length: f32) -> Self {
        Self {
            name: name.into(),
            parent_index: None,
            rest_transform,
            rest_inverse: Mat4::IDENTITY,
            length,
            rotation_mode: RotationMode::Quaternion,
            location: Vec3::ZERO,
            rotation_quaternion: Quat::IDENTITY,
            rotation_euler: Vec3::ZERO,
            rotation_axis_angle: Vec4::new(0.0, 0.0, 1.0, 0.0),
            scale: Vec3::ONE,
            constraints: Vec::new(),
            global_transform: rest_transform,
        }
    }

    /// 从头尾位置创建骨骼
    ///
    /// Y 轴指向尾部，`z_hint` 去掉 Y 分量后作为 Z 轴，X = Y × Z。
    pub fn from_head_tail(name: impl Into<String>, head: Vec3, tail: Vec3, z_hint: Vec3) -> Self {
        let offset = tail - head;
        let length = offset.length();
        let y = offset.normalize_or_zero();
        let mut z = (z_hint - y * z_hint.dot(y)).normalize_or_zero();
        if z == Vec3::ZERO {
            z = y.any_orthonormal_vector();
        }
        let x = y.cross(z);
        let rest = Mat4::from_cols(x.extend(0.0), y.extend(0.0), z.extend(0.0), head.extend(1.0));
        Self::new(name, rest, length)
    }

    pub fn with_rotation_mode(mut self, mode: RotationMode) -> Self {
        self.rotation_mode = mode;
        self
    }

    /// 当前旋转（按旋转模式读取对应通道）
    pub fn rotation(&self) -> Quat {
        match self.rotation_mode {
            RotationMode::Quaternion => self.rotation_quaternion.normalize(),
            RotationMode::Euler(order) => order.to_quat(self.rotation_euler),
            RotationMode::AxisAngle => axis_angle_to_quat(self.rotation_axis_angle),
        }
    }

    /// 按旋转模式写入旋转
    pub fn set_rotation(&mut self, rotation: Quat) {
        match self.rotation_mode {
            RotationMode::Quaternion => self.rotation_quaternion = rotation,
            RotationMode::Euler(order) => self.rotation_euler = order.from_quat(rotation),
            RotationMode::AxisAngle => self.rotation_axis_angle = quat_to_axis_angle(rotation),
        }
    }

    /// 姿态基矩阵 = T · R · S
    pub fn pose_basis(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation(), self.location)
    }

    /// 应用未静音的旋转限制约束后的姿态基矩阵
    pub fn constrained_basis(&self) -> Mat4 {
        let mut rotation = self.rotation();
        for constraint in &self.constraints {
            if constraint.muted {
                continue;
            }
            if let ConstraintKind::LimitRotation(limit) = &constraint.kind {
                rotation = limit.apply(rotation);
            }
        }
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.location)
    }

    /// 用姿态矩阵整体设置 location / rotation / scale
    pub fn set_pose_basis(&mut self, basis: &Mat4) {
        let (scale, rotation, translation) = basis.to_scale_rotation_translation();
        self.location = translation;
        self.scale = scale;
        self.set_rotation(rotation);
    }

    /// 重置为静止姿态
    pub fn reset_pose(&mut self) {
        self.location = Vec3::ZERO;
        self.rotation_quaternion = Quat::IDENTITY;
        self.rotation_euler = Vec3::ZERO;
        self.rotation_axis_angle = Vec4::new(0.0, 0.0, 1.0, 0.0);
        self.scale = Vec3::ONE;
    }

    /// 读取动画通道分量
    pub fn channel_value(&self, channel: Channel, index: usize) -> Option<f32> {
        let value = match channel {
            Channel::Location => self.location.to_array().get(index).copied(),
            Channel::Scale => self.scale.to_array().get(index).copied(),
            Channel::RotationEuler => self.rotation_euler.to_array().get(index).copied(),
            Channel::RotationAxisAngle => self.rotation_axis_angle.to_array().get(index).copied(),
            Channel::RotationQuaternion => {
                // 通道顺序为 w, x, y, z
                let q = self.rotation_quaternion;
                [q.w, q.x, q.y, q.z].get(index).copied()
            }
        };
        value
    }

    /// 写入动画通道分量，索引越界时忽略
    pub fn set_channel_value(&mut self, channel: Channel, index: usize, value: f32) {
        match channel {
            Channel::Location => {
                if index < 3 {
                    self.location[index] = value;
                }
            }
            Channel::Scale => {
                if index < 3 {
                    self.scale[index] = value;
                }
            }
            Channel::RotationEuler => {
                if index < 3 {
                    self.rotation_euler[index] = value;
                }
            }
            Channel::RotationAxisAngle => {
                if index < 4 {
                    self.rotation_axis_angle[index] = value;
                }
            }
            Channel::RotationQuaternion => {
                let q = &mut self.rotation_quaternion;
                match index {
                    0 => q.w = value,
                    1 => q.x = value,
                    2 => q.y = value,
                    3 => q.z = value,
                    _ => {}
                }
            }
        }
    }

    /// 当前旋转模式对应的动画通道
    pub fn rotation_channel(&self) -> Channel {
        Channel::rotation_for(self.rotation_mode)
    }

    /// 全局旋转部分（3x3）
    pub fn global_rotation(&self) -> Mat3 {
        Mat3::from_mat4(self.global_transform)
    }

    /// 当前全局头部位置
    pub fn head(&self) -> Vec3 {
        self.global_transform.w_axis.truncate()
    }

    /// 当前全局尾部位置
    pub fn tail(&self) -> Vec3 {
        self.head() + self.global_transform.y_axis.truncate() * self.length
    }
}

impl Default for Bone {
    fn default() -> Self {
        Self::new(String::new(), Mat4::IDENTITY, 1.0)
    }
}
