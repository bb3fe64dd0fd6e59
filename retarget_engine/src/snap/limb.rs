//! 单帧的肢体吸附
//!
//! 每个函数在当前帧把一条骨骼链的姿态匹配到另一条上。
//! 靠近根部的骨骼先匹配，刷新后再匹配下一节（`accurate` 关闭时跳过链内刷新）。

use glam::{Mat3, Mat4};

use super::pole::match_pole_target;
use crate::animation::{insert_location, insert_rotation};
use crate::math::{axis, from_axes, head, reject};
use crate::scene::PoseContext;
use crate::skeleton::{ArmFkChain, ArmIkChain, FootMarkers, LegFkChain, LegIkChain};
use crate::Result;

fn refresh_if(ctx: &mut PoseContext, accurate: bool) {
    if accurate {
        ctx.refresh();
    }
}

/// `dst` 的位置匹配到 `src` 的头部
pub(crate) fn match_translation(ctx: &mut PoseContext, dst: usize, src: usize) -> Result<()> {
    let pose = ctx.rig.pose_matrix(dst, &ctx.rig.global_transform(src)?)?;
    insert_location(ctx, dst, &pose)
}

/// `dst` 的朝向匹配到 `src`
pub(crate) fn match_rotation(ctx: &mut PoseContext, dst: usize, src: usize) -> Result<()> {
    let pose = ctx.rig.pose_matrix(dst, &ctx.rig.global_transform(src)?)?;
    insert_rotation(ctx, dst, &pose)
}

pub(crate) fn match_loc_rot(ctx: &mut PoseContext, dst: usize, src: usize) -> Result<()> {
    let pose = ctx.rig.pose_matrix(dst, &ctx.rig.global_transform(src)?)?;
    insert_location(ctx, dst, &pose)?;
    insert_rotation(ctx, dst, &pose)
}

/// 反向骨骼的全局矩阵：头部移到尾部，Y、Z 轴取反
pub(crate) fn reversed(global: &Mat4, length: f32) -> Mat4 {
    let x = axis(global, 0);
    let y = axis(global, 1);
    let z = axis(global, 2);
    from_axes(x, -y, -z, head(global) + y * length)
}

/// `dst` 匹配为 `src` 的反向骨骼
///
/// 整个姿态基矩阵都会改写，但只写入旋转关键帧。
pub(crate) fn match_reverse(ctx: &mut PoseContext, dst: usize, src: usize) -> Result<()> {
    let length = ctx.rig.bone(src)?.length;
    let global = reversed(&ctx.rig.global_transform(src)?, length);
    let pose = ctx.rig.pose_matrix(dst, &global)?;
    ctx.rig.bone_mut(dst)?.set_pose_basis(&pose);
    insert_rotation(ctx, dst, &pose)
}

/// 由 FK 脚趾和三个足部标记确定 IK 脚控制骨骼
///
/// 脚跟高于脚掌和脚尖时 IK 脚放平；否则从脚跟指向脚趾尖。
pub(crate) fn match_ik_leg(ctx: &mut PoseContext, foot_ik: usize, toe_fk: usize, markers: &FootMarkers) -> Result<()> {
    let toe = ctx.rig.bone(toe_fk)?;
    let rotation = Mat3::from_mat4(toe.global_transform);
    let toe_tail = toe.tail();

    let z_ball = ctx.rig.bone(markers.ball)?.head().z;
    let z_toe = ctx.rig.bone(markers.toe)?.head().z;
    let heel = ctx.rig.bone(markers.heel)?.head();

    let mut y = rotation.y_axis;
    if heel.z > z_ball && heel.z > z_toe {
        if y.z.abs() > rotation.z_axis.z.abs() {
            y = -rotation.z_axis;
        }
        y.z = 0.0;
    } else {
        y = toe_tail - heel;
    }

    let y = y.normalize_or_zero();
    let x = reject(rotation.x_axis, y).normalize_or_zero();
    let z = x.cross(y);
    let length = ctx.rig.bone(foot_ik)?.length;
    let global = from_axes(x, y, z, toe_tail - y * length);

    let pose = ctx.rig.pose_matrix(foot_ik, &global)?;
    insert_location(ctx, foot_ik, &pose)?;
    insert_rotation(ctx, foot_ik, &pose)
}

/// FK 手臂 → IK 手臂
pub(crate) fn snap_ik_arm(ctx: &mut PoseContext, fk: &ArmFkChain, ik: &ArmIkChain, accurate: bool) -> Result<()> {
    match_loc_rot(ctx, ik.hand, fk.hand)?;
    refresh_if(ctx, accurate);
    match_pole_target(ctx, ik.elbow_pole, fk.upper_arm, fk.forearm)
}

/// FK 腿 → IK 腿
pub(crate) fn snap_ik_leg(ctx: &mut PoseContext, fk: &LegFkChain, ik: &LegIkChain, accurate: bool) -> Result<()> {
    match_translation(ctx, ik.ankle, fk.foot)?;
    refresh_if(ctx, accurate);
    match_ik_leg(ctx, ik.foot_ik, fk.toe, &ik.markers)?;
    refresh_if(ctx, accurate);
    match_reverse(ctx, ik.toe_rev, fk.toe)?;
    refresh_if(ctx, accurate);
    match_reverse(ctx, ik.foot_rev, fk.foot)?;
    refresh_if(ctx, accurate);
    match_translation(ctx, ik.ankle_ik, fk.foot)?;
    refresh_if(ctx, accurate);
    match_pole_target(ctx, ik.knee_pole, fk.thigh, fk.shin)
}

/// IK 手臂 → FK 手臂
pub(crate) fn snap_fk_arm(ctx: &mut PoseContext, fk: &ArmFkChain, ik: &ArmIkChain, accurate: bool) -> Result<()> {
    match_rotation(ctx, fk.upper_arm, ik.upper_arm)?;
    refresh_if(ctx, accurate);
    match_rotation(ctx, fk.forearm, ik.forearm)?;
    refresh_if(ctx, accurate);
    match_rotation(ctx, fk.hand, ik.hand)
}

/// IK 腿 → FK 腿，`ik_to_ankle` 时脚和脚趾保持不变
pub(crate) fn snap_fk_leg(
    ctx: &mut PoseContext,
    fk: &LegFkChain,
    ik: &LegIkChain,
    ik_to_ankle: bool,
    accurate: bool,
) -> Result<()> {
    match_rotation(ctx, fk.thigh, ik.thigh)?;
    refresh_if(ctx, accurate);
    match_rotation(ctx, fk.shin, ik.shin)?;
    if ik_to_ankle {
        return Ok(());
    }
    refresh_if(ctx, accurate);
    match_reverse(ctx, fk.foot, ik.foot_rev)?;
    refresh_if(ctx, accurate);
    match_reverse(ctx, fk.toe, ik.toe_rev)
}
