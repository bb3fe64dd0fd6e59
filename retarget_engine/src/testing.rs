//! 测试用骨架
//!
//! Z 轴向上，角色面朝 -Y。左侧骨骼在 +X，右侧镜像。

use std::f32::consts::TAU;

use glam::{EulerRot, Quat, Vec3};

use crate::animation::{Action, Channel, ChannelPath, FrameRange};
use crate::scene::PoseContext;
use crate::skeleton::{Bone, LimitRotation, Rig};

/// 步行循环中写入旋转关键帧的 FK 骨骼
pub(crate) const WALK_FK_BONES: [&str; 14] = [
    "upper_arm.fk.L",
    "forearm.fk.L",
    "hand.fk.L",
    "thigh.fk.L",
    "shin.fk.L",
    "foot.fk.L",
    "toe.fk.L",
    "upper_arm.fk.R",
    "forearm.fk.R",
    "hand.fk.R",
    "thigh.fk.R",
    "shin.fk.R",
    "foot.fk.R",
    "toe.fk.R",
];

fn add(rig: &mut Rig, name: &str, head: Vec3, tail: Vec3, z_hint: Vec3, parent: Option<&str>) {
    rig.add_bone(Bone::from_head_tail(name, head, tail, z_hint), parent)
        .unwrap();
}

fn build_rig(with_markers: bool) -> Rig {
    let mut rig = Rig::new("MHX");
    add(&mut rig, "root", Vec3::ZERO, Vec3::new(0.0, 0.5, 0.0), Vec3::Z, None);
    add(&mut rig, "hips", Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 1.2), Vec3::NEG_Y, Some("root"));

    for (side, sx) in [("L", 1.0f32), ("R", -1.0f32)] {
        let n = |base: &str| format!("{}.{}", base, side);
        let p = |x: f32, y: f32, z: f32| Vec3::new(x * sx, y, z);

        // 手臂
        for chain in ["fk", "ik"] {
            let upper = n(&format!("upper_arm.{}", chain));
            let forearm = n(&format!("forearm.{}", chain));
            add(&mut rig, &upper, p(0.2, 0.0, 1.5), p(0.5, 0.0, 1.5), Vec3::Z, Some("hips"));
            add(&mut rig, &forearm, p(0.5, 0.0, 1.5), p(0.8, 0.0, 1.5), Vec3::Z, Some(&upper));
        }
        add(&mut rig, &n("hand.fk"), p(0.8, 0.0, 1.5), p(0.9, 0.0, 1.5), Vec3::Z, Some(&n("forearm.fk")));
        add(&mut rig, &n("hand.ik"), p(0.8, 0.0, 1.5), p(0.9, 0.0, 1.5), Vec3::Z, Some("root"));
        add(&mut rig, &n("elbow.pt.ik"), p(0.5, 0.0, 1.2), p(0.5, 0.0, 1.1), Vec3::Y, Some("root"));
        rig.add_ik_constraint(&n("forearm.ik"), &n("hand.ik"), Some(&n("elbow.pt.ik")))
            .unwrap();
        rig.add_limit_rotation(&n("forearm.fk"), "Limit Rotation", LimitRotation::x_only(0.0, 2.5))
            .unwrap();

        // FK 腿
        add(&mut rig, &n("thigh.fk"), p(0.1, 0.0, 1.0), p(0.1, 0.0, 0.55), Vec3::Y, Some("hips"));
        add(&mut rig, &n("shin.fk"), p(0.1, 0.0, 0.55), p(0.1, 0.0, 0.1), Vec3::Y, Some(&n("thigh.fk")));
        add(&mut rig, &n("foot.fk"), p(0.1, 0.0, 0.1), p(0.1, -0.15, 0.02), Vec3::Z, Some(&n("shin.fk")));
        add(&mut rig, &n("toe.fk"), p(0.1, -0.15, 0.02), p(0.1, -0.22, 0.02), Vec3::Z, Some(&n("foot.fk")));
        if with_markers {
            add(&mut rig, &n("heel.marker"), p(0.1, 0.03, 0.0), p(0.1, 0.05, 0.0), Vec3::Z, Some(&n("foot.fk")));
            add(&mut rig, &n("ball.marker"), p(0.1, -0.15, 0.0), p(0.1, -0.13, 0.0), Vec3::Z, Some(&n("foot.fk")));
            add(&mut rig, &n("toe.marker"), p(0.1, -0.22, 0.0), p(0.1, -0.20, 0.0), Vec3::Z, Some(&n("toe.fk")));
        }

        // IK 腿
        add(&mut rig, &n("thigh.ik"), p(0.1, 0.0, 1.0), p(0.1, 0.0, 0.55), Vec3::Y, Some("hips"));
        add(&mut rig, &n("shin.ik"), p(0.1, 0.0, 0.55), p(0.1, 0.0, 0.1), Vec3::Y, Some(&n("thigh.ik")));
        add(&mut rig, &n("knee.pt.ik"), p(0.1, -0.5, 0.55), p(0.1, -0.6, 0.55), Vec3::Z, Some("root"));
        add(&mut rig, &n("ankle"), p(0.1, 0.0, 0.1), p(0.1, 0.05, 0.1), Vec3::Z, Some("root"));
        add(&mut rig, &n("foot.ik"), p(0.1, 0.03, 0.0), p(0.1, -0.22, 0.02), Vec3::Z, Some("root"));
        add(&mut rig, &n("toe.rev"), p(0.1, -0.22, 0.02), p(0.1, -0.15, 0.02), Vec3::NEG_Z, Some(&n("foot.ik")));
        add(&mut rig, &n("foot.rev"), p(0.1, -0.15, 0.02), p(0.1, 0.0, 0.1), Vec3::NEG_Z, Some(&n("toe.rev")));
        add(&mut rig, &n("ankle.ik"), p(0.1, 0.0, 0.1), p(0.1, 0.05, 0.1), Vec3::Z, Some(&n("foot.rev")));
        rig.add_ik_constraint(&n("shin.ik"), &n("ankle.ik"), Some(&n("knee.pt.ik")))
            .unwrap();

        rig.set_property(format!("MhaArmIk_{}", side), 0.0);
        rig.set_property(format!("MhaLegIk_{}", side), 0.0);
    }
    rig.evaluate();
    rig
}

/// 带足部标记的完整测试骨架
pub(crate) fn mhx_rig() -> Rig {
    build_rig(true)
}

/// 测试骨架 + 空 Action
pub(crate) fn mhx_context() -> PoseContext {
    PoseContext::new(mhx_rig(), Some(Action::new("MhxAction")))
}

pub(crate) fn mhx_context_without_markers() -> PoseContext {
    PoseContext::new(build_rig(false), Some(Action::new("MhxAction")))
}

fn key_bone(ctx: &mut PoseContext, bone: &Bone, channel: Channel, frame: i32) {
    let action = ctx.action_mut().unwrap();
    for index in 0..channel.component_count() {
        let value = bone.channel_value(channel, index).unwrap();
        action.insert_keyframe(ChannelPath::new(bone.name.clone(), channel, index), frame, value);
    }
}

/// 在父骨骼静止时把骨骼头部平移 `delta`（骨架空间），写入位置关键帧
pub(crate) fn key_location_global(ctx: &mut PoseContext, bone: usize, frame: i32, delta: Vec3) {
    let mut posed = ctx.rig.get_bone(bone).unwrap().clone();
    let rest = glam::Mat3::from_mat4(posed.rest_transform);
    posed.location = rest.transpose() * delta;
    key_bone(ctx, &posed, Channel::Location, frame);
}

/// 按骨骼的旋转模式写入旋转关键帧
pub(crate) fn key_rotation(ctx: &mut PoseContext, bone: usize, frame: i32, rotation: Quat) {
    let mut posed = ctx.rig.get_bone(bone).unwrap().clone();
    posed.set_rotation(rotation);
    let channel = posed.rotation_channel();
    key_bone(ctx, &posed, channel, frame);
}

/// 生成 `frames` 帧的 FK 步行循环（第 1 帧起）
///
/// 手肘和膝盖的弯曲在首帧最小且始终为正。
pub(crate) fn fk_walk_cycle(ctx: &mut PoseContext, frames: i32) -> FrameRange {
    let index = |ctx: &PoseContext, name: &str| ctx.rig.bone_index(name).unwrap();
    let hips = index(ctx, "hips");

    for i in 0..frames {
        let frame = i + 1;
        let phase = TAU * i as f32 / frames as f32;
        key_location_global(
            ctx,
            hips,
            frame,
            Vec3::new(0.03 * phase.sin(), -0.1 * i as f32, -0.04 * (1.0 - phase.cos())),
        );

        for (side, offset) in [("L", 0.0f32), ("R", std::f32::consts::PI)] {
            let t = phase + offset;
            let bend = 1.0 - phase.cos();
            let bone = |ctx: &PoseContext, base: &str| index(ctx, &format!("{}.{}", base, side));

            let upper_arm = Quat::from_euler(EulerRot::XYZ, 0.3 * t.sin(), 0.2 * t.cos(), 0.5 + 0.2 * t.sin());
            let upper_arm_index = bone(ctx, "upper_arm.fk");
            key_rotation(ctx, upper_arm_index, frame, upper_arm);
            let forearm_index = bone(ctx, "forearm.fk");
            key_rotation(ctx, forearm_index, frame, Quat::from_rotation_x(0.2 + 0.4 * bend));
            let hand_index = bone(ctx, "hand.fk");
            key_rotation(ctx, hand_index, frame, Quat::from_euler(EulerRot::XYZ, 0.2 * t.cos(), 0.1, -0.3 * t.sin()));

            let thigh_index = bone(ctx, "thigh.fk");
            key_rotation(ctx, thigh_index, frame, Quat::from_euler(EulerRot::XYZ, -0.4 * t.sin(), 0.05, 0.1 * t.cos()));
            let shin_index = bone(ctx, "shin.fk");
            key_rotation(ctx, shin_index, frame, Quat::from_rotation_x(0.15 + 0.3 * bend));
            let foot_index = bone(ctx, "foot.fk");
            key_rotation(ctx, foot_index, frame, Quat::from_euler(EulerRot::XYZ, 0.25 * t.sin(), 0.0, 0.05 * t.cos()));
            let toe_index = bone(ctx, "toe.fk");
            key_rotation(ctx, toe_index, frame, Quat::from_rotation_x(-0.3 * t.sin()));
        }
    }
    FrameRange::from_frames(1..=frames).unwrap()
}
