//! 作用域守卫
//!
//! 守卫持有 `&mut PoseContext` 并解引用到它，`Drop` 时恢复原状态，
//! 因此错误路径上也不会遗留被静音的约束或被改动的图层。

use std::ops::{Deref, DerefMut};

use super::context::PoseContext;
use crate::skeleton::{ConstraintKind, LAYER_COUNT};

/// 静音骨骼上的旋转限制约束
pub struct ConstraintMuteGuard<'a> {
    ctx: &'a mut PoseContext,
    /// (骨骼索引, 约束索引)
    muted: Vec<(usize, usize)>,
}

impl<'a> ConstraintMuteGuard<'a> {
    /// 只处理当前未静音的约束，恢复时也只恢复这些
    pub fn mute_limits(ctx: &'a mut PoseContext, bones: &[usize]) -> Self {
        let mut muted = Vec::new();
        for &bone_index in bones {
            let Some(bone) = ctx.rig.get_bone_mut(bone_index) else {
                continue;
            };
            for (i, constraint) in bone.constraints.iter_mut().enumerate() {
                if constraint.muted || !matches!(constraint.kind, ConstraintKind::LimitRotation(_)) {
                    continue;
                }
                constraint.muted = true;
                muted.push((bone_index, i));
            }
        }
        log::debug!("Muted {} rotation limit constraints", muted.len());
        Self { ctx, muted }
    }

    pub fn muted_count(&self) -> usize {
        self.muted.len()
    }
}

impl Deref for ConstraintMuteGuard<'_> {
    type Target = PoseContext;

    fn deref(&self) -> &PoseContext {
        self.ctx
    }
}

impl DerefMut for ConstraintMuteGuard<'_> {
    fn deref_mut(&mut self) -> &mut PoseContext {
        self.ctx
    }
}

impl Drop for ConstraintMuteGuard<'_> {
    fn drop(&mut self) {
        for &(bone_index, i) in &self.muted {
            if let Some(constraint) = self
                .ctx
                .rig
                .get_bone_mut(bone_index)
                .and_then(|bone| bone.constraints.get_mut(i))
            {
                constraint.muted = false;
            }
        }
    }
}

/// 临时替换骨架可见图层
pub struct LayerGuard<'a> {
    ctx: &'a mut PoseContext,
    saved: [bool; LAYER_COUNT],
}

impl<'a> LayerGuard<'a> {
    pub fn replace(ctx: &'a mut PoseContext, layers: [bool; LAYER_COUNT]) -> Self {
        let saved = ctx.rig.layers;
        ctx.rig.layers = layers;
        Self { ctx, saved }
    }
}

impl Deref for LayerGuard<'_> {
    type Target = PoseContext;

    fn deref(&self) -> &PoseContext {
        self.ctx
    }
}

impl DerefMut for LayerGuard<'_> {
    fn deref_mut(&mut self) -> &mut PoseContext {
        self.ctx
    }
}

impl Drop for LayerGuard<'_> {
    fn drop(&mut self) {
        self.ctx.rig.layers = self.saved;
    }
}
