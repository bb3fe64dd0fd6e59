//! 骨骼约束

use glam::{Quat, Vec3};

use crate::math::EulerOrder;

/// 旋转限制（在 XYZ 欧拉角上逐轴钳制）
#[derive(Clone, Debug, PartialEq)]
pub struct LimitRotation {
    pub min: Vec3,
    pub max: Vec3,
    pub use_limit: [bool; 3],
}

impl LimitRotation {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min,
            max,
            use_limit: [true; 3],
        }
    }

    /// 只限制 X 轴
    pub fn x_only(min: f32, max: f32) -> Self {
        Self {
            min: Vec3::new(min, 0.0, 0.0),
            max: Vec3::new(max, 0.0, 0.0),
            use_limit: [true, false, false],
        }
    }

    pub fn apply(&self, rotation: Quat) -> Quat {
        let mut euler = EulerOrder::XYZ.from_quat(rotation);
        for axis in 0..3 {
            if self.use_limit[axis] {
                euler[axis] = euler[axis].clamp(self.min[axis], self.max[axis]);
            }
        }
        EulerOrder::XYZ.to_quat(euler)
    }
}

/// 两骨 IK 约束，挂在下段骨骼上，上段为其父骨骼
#[derive(Clone, Debug, PartialEq)]
pub struct IkConstraint {
    /// 目标骨骼（取其头部位置）
    pub target: usize,
    /// 极向目标骨骼（取其头部位置）
    pub pole: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintKind {
    LimitRotation(LimitRotation),
    Ik(IkConstraint),
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoneConstraint {
    pub name: String,
    pub kind: ConstraintKind,
    pub muted: bool,
}

impl BoneConstraint {
    pub fn new(name: impl Into<String>, kind: ConstraintKind) -> Self {
        Self {
            name: name.into(),
            kind,
            muted: false,
        }
    }

    pub fn is_ik(&self) -> bool {
        matches!(self.kind, ConstraintKind::Ik(_))
    }
}
