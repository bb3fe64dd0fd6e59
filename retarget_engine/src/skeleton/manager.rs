//! 骨架（骨骼层级 + 约束求值 + 自定义属性 + 图层）

use glam::Mat4;
use std::collections::HashMap;

use super::bone::Bone;
use super::constraint::{BoneConstraint, ConstraintKind, IkConstraint, LimitRotation};
use super::ik_solver::TwoBoneIkSolver;
use crate::math::{checked_inverse, to_global_space, to_pose_space, ParentFrame};
use crate::{Result, RetargetError};

/// 骨架图层数量
pub const LAYER_COUNT: usize = 32;

/// 骨架
#[derive(Clone, Debug)]
pub struct Rig {
    pub name: String,
    bones: Vec<Bone>,
    name_to_index: HashMap<String, usize>,
    /// 自定义数值属性（如 IK/FK 切换开关）
    properties: HashMap<String, f32>,
    /// 可见图层
    pub layers: [bool; LAYER_COUNT],
    /// 骨架对象的世界矩阵
    pub world_matrix: Mat4,
}

impl Rig {
    pub fn new(name: impl Into<String>) -> Self {
        let mut layers = [false; LAYER_COUNT];
        layers[0] = true;
        Self {
            name: name.into(),
            bones: Vec::new(),
            name_to_index: HashMap::new(),
            properties: HashMap::new(),
            layers,
            world_matrix: Mat4::IDENTITY,
        }
    }

    /// 添加骨骼，父骨骼必须先于子骨骼加入
    pub fn add_bone(&mut self, mut bone: Bone, parent: Option<&str>) -> Result<usize> {
        if self.name_to_index.contains_key(&bone.name) {
            return Err(RetargetError::UnsupportedRigTopology(format!(
                "duplicate bone name '{}'",
                bone.name
            )));
        }
        bone.parent_index = match parent {
            Some(parent) => Some(self.bone_index(parent)?),
            None => None,
        };
        bone.rest_inverse = checked_inverse(&bone.rest_transform, &bone.name)?;

        let index = self.bones.len();
        self.name_to_index.insert(bone.name.clone(), index);
        self.bones.push(bone);
        self.update_global_transform(index);
        Ok(index)
    }

    /// 通过名称查找骨骼
    pub fn find_bone_by_name(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// 通过名称查找骨骼，不存在时返回拓扑错误
    pub fn bone_index(&self, name: &str) -> Result<usize> {
        self.find_bone_by_name(name).ok_or_else(|| {
            RetargetError::UnsupportedRigTopology(format!("bone '{}' not found in rig '{}'", name, self.name))
        })
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn get_bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn get_bone_mut(&mut self, index: usize) -> Option<&mut Bone> {
        self.bones.get_mut(index)
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// 索引有效时返回骨骼，否则返回拓扑错误
    pub fn bone(&self, index: usize) -> Result<&Bone> {
        self.bones.get(index).ok_or_else(|| {
            RetargetError::UnsupportedRigTopology(format!("bone index {} out of range", index))
        })
    }

    pub fn bone_mut(&mut self, index: usize) -> Result<&mut Bone> {
        self.bones.get_mut(index).ok_or_else(|| {
            RetargetError::UnsupportedRigTopology(format!("bone index {} out of range", index))
        })
    }

    // ========== 约束 ==========

    /// 添加旋转限制约束
    pub fn add_limit_rotation(&mut self, bone: &str, name: &str, limit: LimitRotation) -> Result<()> {
        let index = self.bone_index(bone)?;
        self.bones[index]
            .constraints
            .push(BoneConstraint::new(name, ConstraintKind::LimitRotation(limit)));
        Ok(())
    }

    /// 在下段骨骼上添加两骨 IK 约束
    pub fn add_ik_constraint(&mut self, owner: &str, target: &str, pole: Option<&str>) -> Result<()> {
        let index = self.bone_index(owner)?;
        if self.bones[index].parent_index.is_none() {
            return Err(RetargetError::UnsupportedRigTopology(format!(
                "IK owner '{}' needs a parent bone",
                owner
            )));
        }
        let target = self.bone_index(target)?;
        let pole = match pole {
            Some(pole) => Some(self.bone_index(pole)?),
            None => None,
        };
        self.bones[index]
            .constraints
            .push(BoneConstraint::new("IK", ConstraintKind::Ik(IkConstraint { target, pole })));
        Ok(())
    }

    // ========== 属性与图层 ==========

    pub fn property(&self, name: &str) -> Option<f32> {
        self.properties.get(name).copied()
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: f32) {
        self.properties.insert(name.into(), value);
    }

    // ========== 求值 ==========

    /// 求值整个骨架
    ///
    /// 1. 按插入顺序（父先于子）计算全局变换，应用旋转限制
    /// 2. 依次求解未静音的 IK 约束
    pub fn evaluate(&mut self) {
        for index in 0..self.bones.len() {
            self.bones[index].global_transform = self.evaluate_bone(index);
        }

        for solver in self.ik_solvers() {
            solver.solve(&mut self.bones);
        }
    }

    fn evaluate_bone(&self, index: usize) -> Mat4 {
        let bone = &self.bones[index];
        let basis = bone.constrained_basis();
        match bone.parent_index {
            Some(parent) => {
                let parent = &self.bones[parent];
                parent.global_transform * parent.rest_inverse * bone.rest_transform * basis
            }
            None => bone.rest_transform * basis,
        }
    }

    fn ik_solvers(&self) -> Vec<TwoBoneIkSolver> {
        let mut solvers = Vec::new();
        for (index, bone) in self.bones.iter().enumerate() {
            let Some(upper) = bone.parent_index else {
                continue;
            };
            for constraint in &bone.constraints {
                if constraint.muted {
                    continue;
                }
                if let ConstraintKind::Ik(ik) = &constraint.kind {
                    solvers.push(TwoBoneIkSolver::new(upper, index, ik.target, ik.pole));
                }
            }
        }
        solvers
    }

    /// 只更新一根骨骼及其子骨骼（不求解 IK）
    pub fn update_global_transform(&mut self, index: usize) {
        update_global_recursive(&mut self.bones, index);
    }

    // ========== 空间转换 ==========

    /// 父骨骼的静止矩阵与当前全局矩阵
    pub fn parent_frame(&self, index: usize) -> Option<ParentFrame> {
        let parent = self.bones.get(index)?.parent_index?;
        let parent = &self.bones[parent];
        Some(ParentFrame {
            rest: parent.rest_transform,
            global: parent.global_transform,
        })
    }

    /// 骨架空间矩阵 → 该骨骼的姿态矩阵
    pub fn pose_matrix(&self, index: usize, global: &Mat4) -> Result<Mat4> {
        let bone = self.bone(index)?;
        to_pose_space(global, &bone.rest_transform, self.parent_frame(index).as_ref())
    }

    /// 该骨骼的姿态矩阵 → 骨架空间矩阵
    pub fn global_from_pose(&self, index: usize, pose: &Mat4) -> Result<Mat4> {
        let bone = self.bone(index)?;
        to_global_space(pose, &bone.rest_transform, self.parent_frame(index).as_ref())
    }

    /// 当前全局矩阵
    pub fn global_transform(&self, index: usize) -> Result<Mat4> {
        Ok(self.bone(index)?.global_transform)
    }
}

impl Default for Rig {
    fn default() -> Self {
        Self::new("Armature")
    }
}

/// 递归更新骨骼全局变换
pub(crate) fn update_global_recursive(bones: &mut [Bone], index: usize) {
    if index >= bones.len() {
        return;
    }
    let basis = bones[index].constrained_basis();
    bones[index].global_transform = match bones[index].parent_index {
        Some(parent) => {
            let parent = &bones[parent];
            parent.global_transform * parent.rest_inverse * bones[index].rest_transform * basis
        }
        None => bones[index].rest_transform * basis,
    };

    let children: Vec<usize> = (0..bones.len())
        .filter(|&i| bones[i].parent_index == Some(index))
        .collect();
    for child in children {
        update_global_recursive(bones, child);
    }
}
