//! 两骨解析 IK 求解器
//!
//! 上段骨骼头部为根，目标骨骼头部为目标点，极向目标决定弯曲平面。
//! 用余弦定理求出关节位置，再重建上下两段的朝向：
//!
//! ```text
//! u = normalize(T - A)
//! w = normalize(reject(P - A, u))          // 关节弯向的一侧
//! cos α = (l1² + d² - l2²) / (2·l1·d)
//! K = A + l1·(cos α·u + sin α·w)
//! X = normalize(w × u)                      // 两段共用的弯曲轴
//! ```
//!
//! 不做拉伸：目标超出 l1 + l2 时链条伸直指向目标。

use glam::{Mat4, Vec3};

use super::bone::Bone;
use super::manager::update_global_recursive;
use crate::math::{axis, from_axes, head, reject};

/// 两骨 IK 求解器
#[derive(Clone, Debug)]
pub struct TwoBoneIkSolver {
    /// 上段骨骼（下段的父骨骼）
    pub upper: usize,
    /// 下段骨骼（约束的拥有者）
    pub lower: usize,
    pub target: usize,
    pub pole: Option<usize>,
}

impl TwoBoneIkSolver {
    pub fn new(upper: usize, lower: usize, target: usize, pole: Option<usize>) -> Self {
        Self {
            upper,
            lower,
            target,
            pole,
        }
    }

    /// 求解并写回两段骨骼及其子骨骼的全局变换
    pub fn solve(&self, bones: &mut [Bone]) {
        let len = bones.len();
        if self.upper >= len || self.lower >= len || self.target >= len {
            return;
        }

        let upper_global = bones[self.upper].global_transform;
        let root = head(&upper_global);
        let target = bones[self.target].head();
        let l1 = bones[self.upper].length;
        let l2 = bones[self.lower].length;

        let to_target = target - root;
        let dist = to_target.length();
        if dist < 1e-6 || l1 < 1e-6 || l2 < 1e-6 {
            return;
        }
        let u = to_target / dist;

        // 1. 弯曲方向
        let Some(w) = self.bend_direction(bones, root, u, &upper_global) else {
            return;
        };

        // 2. 关节位置
        let cos_a = ((l1 * l1 + dist * dist - l2 * l2) / (2.0 * l1 * dist)).clamp(-1.0, 1.0);
        let sin_a = (1.0 - cos_a * cos_a).max(0.0).sqrt();
        let knee = root + (u * cos_a + w * sin_a) * l1;

        // 3. 两段骨骼的朝向
        let x = w.cross(u).normalize();
        let y_upper = (knee - root).normalize_or_zero();
        let y_lower = match (target - knee).try_normalize() {
            Some(dir) => dir,
            None => y_upper,
        };
        let upper = from_axes(x, y_upper, x.cross(y_upper), root);
        let lower = from_axes(x, y_lower, x.cross(y_lower), knee);

        // 4. 写回并更新子骨骼
        self.apply(bones, self.upper, upper);
        self.apply(bones, self.lower, lower);
    }

    fn bend_direction(&self, bones: &[Bone], root: Vec3, u: Vec3, upper_global: &Mat4) -> Option<Vec3> {
        if let Some(pole) = self.pole.filter(|&p| p < bones.len()) {
            let side = reject(bones[pole].head() - root, u);
            if let Some(w) = side.try_normalize() {
                return Some(w);
            }
        }
        // 没有极向目标，或极向目标落在根-目标连线上：沿用当前弯曲面（-Z 侧）
        reject(-axis(upper_global, 2), u)
            .try_normalize()
            .or_else(|| reject(axis(upper_global, 0).cross(u), u).try_normalize())
    }

    /// 保留原有缩放，只替换朝向和位置
    fn apply(&self, bones: &mut [Bone], index: usize, solved: Mat4) {
        let scale = bones[index].scale;
        bones[index].global_transform = solved * Mat4::from_scale(scale);
        let children: Vec<usize> = (0..bones.len())
            .filter(|&i| bones[i].parent_index == Some(index))
            .collect();
        for child in children {
            update_global_recursive(bones, child);
        }
    }
}
