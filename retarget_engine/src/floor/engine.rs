//! 地面投影：逐帧把穿透地面的脚抬到地面以上
//!
//! FK 模式下抬高髋部（取左右脚中较大的穿透深度）；
//! IK 模式下分别抬高两只 IK 脚，可选地再把根骨骼抬高两脚中较小的深度。

use glam::{Mat4, Vec3};

use super::plane::FloorPlane;
use crate::animation::{fill_keyframes, insert_location, Channel, FrameRange};
use crate::scene::{PoseContext, Progress};
use crate::skeleton::{BoneRole, FootMarkers, Rig, RigProfile, Side};
use crate::snap::leg_ik_active;
use crate::Result;

/// 地面约束选项
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FloorOptions {
    pub left: bool,
    pub right: bool,
    /// 同时调整髋部/根骨骼
    pub hips: bool,
}

impl Default for FloorOptions {
    fn default() -> Self {
        Self {
            left: true,
            right: true,
            hips: true,
        }
    }
}

impl FloorOptions {
    fn includes(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// FK 脚部骨骼
#[derive(Clone, Copy, Debug)]
pub(crate) struct FkFoot {
    pub foot: usize,
    pub toe: usize,
    pub markers: Option<FootMarkers>,
}

impl FkFoot {
    pub(crate) fn resolve(rig: &Rig, profile: &RigProfile, side: Side) -> Result<Self> {
        Ok(Self {
            foot: profile.resolve(rig, BoneRole::FootFk, side)?,
            toe: profile.resolve(rig, BoneRole::ToeFk, side)?,
            markers: profile.resolve_markers(rig, side),
        })
    }
}

/// 让双脚保持在地面以上，返回发生抬高的帧数
///
/// 腿部任一侧处于 IK 模式时按 IK 处理。
pub fn apply_floor_constraint(
    ctx: &mut PoseContext,
    profile: &RigProfile,
    plane: Option<&FloorPlane>,
    frames: &FrameRange,
    options: &FloorOptions,
) -> Result<usize> {
    ctx.action()?;
    let plane = plane.copied().unwrap_or_default();
    let progress = Progress::start("Keep feet above floor", frames.len());

    let lifted = if leg_ik_active(&ctx.rig, profile) {
        floor_ik_feet(ctx, profile, &plane, frames, options, &progress)?
    } else {
        floor_fk_feet(ctx, profile, &plane, frames, options, &progress)?
    };

    progress.finish();
    log::info!("Feet kept above floor, {} of {} frames lifted", lifted, frames.len());
    Ok(lifted)
}

fn floor_fk_feet(
    ctx: &mut PoseContext,
    profile: &RigProfile,
    plane: &FloorPlane,
    frames: &FrameRange,
    options: &FloorOptions,
    progress: &Progress,
) -> Result<usize> {
    let hips = profile.resolve(&ctx.rig, BoneRole::Hips, Side::Left)?;
    let left = FkFoot::resolve(&ctx.rig, profile, Side::Left)?;
    let right = FkFoot::resolve(&ctx.rig, profile, Side::Right)?;

    let mut lifted = 0;
    for (n, frame) in frames.iter().enumerate() {
        ctx.set_frame(frame);
        ctx.refresh();

        let mut offset: f32 = 0.0;
        if options.left {
            offset = fk_offset(&ctx.rig, plane, &left)?;
        }
        if options.right {
            offset = offset.max(fk_offset(&ctx.rig, plane, &right)?);
        }
        progress.tick(n, frame);

        if offset > 0.0 {
            log::debug!("Frame {}: lift hips by {:.4}", frame, offset);
            add_offset(ctx, hips, offset, plane)?;
            lifted += 1;
        }
    }
    Ok(lifted)
}

/// FK 脚的最大穿透深度
///
/// 有标记骨骼时取三个标记头部；否则取脚趾尾部、脚趾头部和推算的脚跟。
pub(crate) fn fk_offset(rig: &Rig, plane: &FloorPlane, foot: &FkFoot) -> Result<f32> {
    let points: [Vec3; 3] = match foot.markers {
        Some(markers) => [
            rig.bone(markers.toe)?.head(),
            rig.bone(markers.ball)?.head(),
            rig.bone(markers.heel)?.head(),
        ],
        None => {
            let toe = rig.bone(foot.toe)?;
            let foot_length = rig.bone(foot.foot)?.length;
            let ball = toe.head();
            let y = toe.global_transform.y_axis.truncate();
            [toe.tail(), ball, ball - y * foot_length]
        }
    };
    Ok(points
        .iter()
        .map(|&p| plane.offset(p))
        .fold(f32::NEG_INFINITY, f32::max))
}

fn floor_ik_feet(
    ctx: &mut PoseContext,
    profile: &RigProfile,
    plane: &FloorPlane,
    frames: &FrameRange,
    options: &FloorOptions,
    progress: &Progress,
) -> Result<usize> {
    let root = profile.resolve(&ctx.rig, BoneRole::Root, Side::Left)?;
    let left = profile.resolve(&ctx.rig, BoneRole::FootIk, Side::Left)?;
    let right = profile.resolve(&ctx.rig, BoneRole::FootIk, Side::Right)?;

    // 先在每一帧补齐位置关键帧，偏移总是写在显式关键帧上
    fill_keyframes(ctx, left, Channel::Location, frames)?;
    fill_keyframes(ctx, right, Channel::Location, frames)?;
    if options.hips {
        fill_keyframes(ctx, root, Channel::Location, frames)?;
    }

    let mut lifted = 0;
    for (n, frame) in frames.iter().enumerate() {
        ctx.set_frame(frame);
        ctx.refresh();
        progress.tick(n, frame);

        let mut offsets = [0.0f32; 2];
        for (slot, (side, leg)) in [(Side::Left, left), (Side::Right, right)].into_iter().enumerate() {
            if !options.includes(side) {
                continue;
            }
            let offset = ik_offset(&ctx.rig, plane, leg)?;
            offsets[slot] = offset;
            if offset > 0.0 {
                log::debug!("Frame {}: lift {} IK foot by {:.4}", frame, side.letter(), offset);
                add_offset(ctx, leg, offset, plane)?;
            }
        }

        let hips_offset = offsets[0].min(offsets[1]);
        if hips_offset > 0.0 && options.hips {
            add_offset(ctx, root, hips_offset, plane)?;
        }
        if offsets.iter().any(|&o| o > 0.0) {
            lifted += 1;
        }
    }
    Ok(lifted)
}

/// IK 脚控制骨骼头尾两点的最大穿透深度
fn ik_offset(rig: &Rig, plane: &FloorPlane, leg: usize) -> Result<f32> {
    let bone = rig.bone(leg)?;
    Ok(plane.offset(bone.head()).max(plane.offset(bone.tail())))
}

/// 沿法线平移骨骼并写入位置关键帧
pub(crate) fn add_offset(ctx: &mut PoseContext, bone: usize, offset: f32, plane: &FloorPlane) -> Result<()> {
    let mut global: Mat4 = ctx.rig.global_transform(bone)?;
    global.w_axis += (plane.normal * offset).extend(0.0);
    let pose = ctx.rig.pose_matrix(bone, &global)?;
    insert_location(ctx, bone, &pose)
}
