//! 旋转表示
//!
//! 宿主的欧拉角约定：模式 "XYZ" 表示先绕 X、再绕 Y、最后绕 Z 旋转，
//! 即 `R = Rz * Ry * Rx`（外旋）。glam 的 `EulerRot` 是内旋，
//! 所以外旋 ABC 对应 glam 的 CBA。

use glam::{EulerRot, Quat, Vec3, Vec4};

/// 欧拉角轴顺序（外旋，按名称顺序依次应用）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EulerOrder {
    XYZ,
    XZY,
    YXZ,
    YZX,
    ZXY,
    ZYX,
}

impl EulerOrder {
    /// 对应的 glam 内旋顺序
    fn glam_rot(self) -> EulerRot {
        match self {
            EulerOrder::XYZ => EulerRot::ZYX,
            EulerOrder::XZY => EulerRot::YZX,
            EulerOrder::YXZ => EulerRot::ZXY,
            EulerOrder::YZX => EulerRot::XZY,
            EulerOrder::ZXY => EulerRot::YXZ,
            EulerOrder::ZYX => EulerRot::XYZ,
        }
    }

    /// glam 角度参数的轴索引（0=X, 1=Y, 2=Z），按 glam 的参数顺序
    fn glam_axes(self) -> [usize; 3] {
        match self {
            EulerOrder::XYZ => [2, 1, 0],
            EulerOrder::XZY => [1, 2, 0],
            EulerOrder::YXZ => [2, 0, 1],
            EulerOrder::YZX => [0, 2, 1],
            EulerOrder::ZXY => [1, 0, 2],
            EulerOrder::ZYX => [0, 1, 2],
        }
    }

    /// 从欧拉角 (x, y, z) 构建四元数
    pub fn to_quat(self, euler: Vec3) -> Quat {
        let axes = self.glam_axes();
        let angles = euler.to_array();
        Quat::from_euler(
            self.glam_rot(),
            angles[axes[0]],
            angles[axes[1]],
            angles[axes[2]],
        )
    }

    /// 从四元数分解欧拉角，返回 (x, y, z)
    pub fn from_quat(self, rotation: Quat) -> Vec3 {
        let (a, b, c) = rotation.to_euler(self.glam_rot());
        let axes = self.glam_axes();
        let mut angles = [0.0f32; 3];
        angles[axes[0]] = a;
        angles[axes[1]] = b;
        angles[axes[2]] = c;
        Vec3::from_array(angles)
    }
}

/// 骨骼的旋转表示模式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RotationMode {
    Quaternion,
    Euler(EulerOrder),
    /// 轴角，存储为 `[angle, x, y, z]`
    AxisAngle,
}

impl Default for RotationMode {
    fn default() -> Self {
        RotationMode::Quaternion
    }
}

impl RotationMode {
    /// 该模式的分量个数（关键帧通道数）
    pub fn component_count(self) -> usize {
        match self {
            RotationMode::Quaternion | RotationMode::AxisAngle => 4,
            RotationMode::Euler(_) => 3,
        }
    }
}

/// 轴角 `[angle, x, y, z]` 转四元数，轴长为零时返回单位旋转
pub fn axis_angle_to_quat(axis_angle: Vec4) -> Quat {
    let axis = Vec3::new(axis_angle.y, axis_angle.z, axis_angle.w);
    if axis.length_squared() < 1e-12 {
        return Quat::IDENTITY;
    }
    Quat::from_axis_angle(axis.normalize(), axis_angle.x)
}

/// 四元数转轴角 `[angle, x, y, z]`
pub fn quat_to_axis_angle(rotation: Quat) -> Vec4 {
    let (axis, angle) = rotation.normalize().to_axis_angle();
    Vec4::new(angle, axis.x, axis.y, axis.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ORDERS: [EulerOrder; 6] = [
        EulerOrder::XYZ,
        EulerOrder::XZY,
        EulerOrder::YXZ,
        EulerOrder::YZX,
        EulerOrder::ZXY,
        EulerOrder::ZYX,
    ];

    #[test]
    fn test_xyz_applies_x_first() {
        let euler = Vec3::new(0.3, -0.2, 0.5);
        let q = EulerOrder::XYZ.to_quat(euler);
        let expected = Quat::from_rotation_z(0.5)
            * Quat::from_rotation_y(-0.2)
            * Quat::from_rotation_x(0.3);
        assert!(q.angle_between(expected) < 1e-5);
    }

    #[test]
    fn test_yzx_composition() {
        let euler = Vec3::new(0.1, 0.4, -0.25);
        let q = EulerOrder::YZX.to_quat(euler);
        let expected = Quat::from_rotation_x(0.1)
            * Quat::from_rotation_z(-0.25)
            * Quat::from_rotation_y(0.4);
        assert!(q.angle_between(expected) < 1e-5);
    }

    #[test]
    fn test_euler_decompose_all_orders() {
        let euler = Vec3::new(0.2, -0.35, 0.6);
        for order in ALL_ORDERS {
            let q = order.to_quat(euler);
            let back = order.from_quat(q);
            assert!((back - euler).abs().max_element() < 1e-4, "{:?}: {:?}", order, back);
        }
    }

    #[test]
    fn test_axis_angle_zero_axis() {
        let q = axis_angle_to_quat(Vec4::new(1.0, 0.0, 0.0, 0.0));
        assert!(q.angle_between(Quat::IDENTITY) < 1e-6);

        let aa = quat_to_axis_angle(Quat::from_rotation_y(0.75));
        assert!((aa.x - 0.75).abs() < 1e-5);
        assert!((aa.z - 1.0).abs() < 1e-5);
    }
}
