//! 脚趾约束：脚趾尖不能高于脚掌，且只允许向下弯

use glam::{Mat3, Mat4, Vec3};

use super::plane::FloorPlane;
use crate::animation::{insert_rotation, FrameRange};
use crate::math::{from_axes, reject, EulerOrder};
use crate::scene::{PoseContext, Progress};
use crate::skeleton::{BoneRole, FootMarkers, RigProfile, Side};
use crate::snap::leg_ik_active;
use crate::{Result, RetargetError};

/// 逐帧修正两侧 FK 脚趾的旋转，返回被压平的帧数
///
/// 只在 FK 腿模式下可用。
pub fn apply_toe_floor_constraint(
    ctx: &mut PoseContext,
    profile: &RigProfile,
    plane: Option<&FloorPlane>,
    frames: &FrameRange,
) -> Result<usize> {
    if leg_ik_active(&ctx.rig, profile) {
        return Err(RetargetError::UnsupportedForMode(
            "toe floor constraint only works with FK legs".into(),
        ));
    }
    ctx.action()?;
    let plane = plane.copied().unwrap_or_default();

    let mut flattened = 0;
    for side in Side::BOTH {
        flattened += toes_below_ball(ctx, profile, &plane, frames, side)?;
    }
    log::info!("Toes kept below ball, {} frames flattened", flattened);
    Ok(flattened)
}

fn toes_below_ball(
    ctx: &mut PoseContext,
    profile: &RigProfile,
    plane: &FloorPlane,
    frames: &FrameRange,
    side: Side,
) -> Result<usize> {
    let toe = profile.resolve(&ctx.rig, BoneRole::ToeFk, side)?;
    let markers: Option<FootMarkers> = profile.resolve_markers(&ctx.rig, side);
    let progress = Progress::start("Toes below ball", frames.len());

    let mut flattened = 0;
    for (n, frame) in frames.iter().enumerate() {
        ctx.set_frame(frame);
        ctx.refresh();
        progress.tick(n, frame);

        let global = ctx.rig.global_transform(toe)?;
        let tip_above_ball = match markers {
            Some(markers) => {
                let z_toe = plane.height(ctx.rig.bone(markers.toe)?.head());
                let z_ball = plane.height(ctx.rig.bone(markers.ball)?.head());
                z_toe > z_ball
            }
            None => plane.height(global.y_axis.truncate()) > 0.0,
        };

        let pose = if tip_above_ball {
            flattened += 1;
            let flat = flatten_toe(&global, plane);
            ctx.rig.pose_matrix(toe, &flat)?
        } else {
            ctx.rig.pose_matrix(toe, &global)?
        };
        let pose = keep_toe_rotation_negative(&pose);
        insert_rotation(ctx, toe, &pose)?;
    }
    progress.finish();
    Ok(flattened)
}

/// 把脚趾 Y 轴投影到地面内并重新正交化，头部保持不动
fn flatten_toe(global: &Mat4, plane: &FloorPlane) -> Mat4 {
    let rotation = Mat3::from_mat4(*global);
    let Some(y) = plane.project_direction(rotation.y_axis).try_normalize() else {
        // 脚趾垂直于地面，无法确定朝向
        return *global;
    };
    let x = reject(rotation.x_axis, y).normalize_or_zero();
    let z = x.cross(y);
    from_axes(x, y, z, global.w_axis.truncate())
}

/// 按 YZX 欧拉分解，X 分量为正时清零（脚趾不能向上翘）
pub(crate) fn keep_toe_rotation_negative(pose: &Mat4) -> Mat4 {
    let (_, rotation, translation) = pose.to_scale_rotation_translation();
    let mut euler: Vec3 = EulerOrder::YZX.from_quat(rotation);
    if euler.x <= 0.0 {
        return *pose;
    }
    euler.x = 0.0;
    Mat4::from_rotation_translation(EulerOrder::YZX.to_quat(euler), translation)
}
