//! 关节弯曲方向修正
//!
//! 手肘（前臂）和膝盖（小腿）只允许朝一个方向弯。帧范围内弯曲通道的关键帧
//! 不得低于该通道在范围首帧的取值。

use crate::animation::{Channel, ChannelPath, FrameRange};
use crate::math::RotationMode;
use crate::scene::PoseContext;
use crate::skeleton::{BoneRole, RigProfile, Side};
use crate::Result;

/// 弯曲通道：欧拉角 X 分量，或四元数 x 分量
fn bend_channel(mode: RotationMode) -> Option<(Channel, usize)> {
    match mode {
        RotationMode::Euler(_) => Some((Channel::RotationEuler, 0)),
        RotationMode::Quaternion => Some((Channel::RotationQuaternion, 1)),
        RotationMode::AxisAngle => None,
    }
}

/// 修正手肘 / 膝盖的弯曲关键帧，返回被修改的关键帧数
pub fn limbs_bend_positive(
    ctx: &mut PoseContext,
    profile: &RigProfile,
    frames: &FrameRange,
    elbows: bool,
    knees: bool,
) -> Result<usize> {
    let mut roles = Vec::new();
    if elbows {
        roles.push(BoneRole::ForearmFk);
    }
    if knees {
        roles.push(BoneRole::ShinFk);
    }

    let mut clamped = 0;
    for role in roles {
        for side in Side::BOTH {
            let index = profile.resolve(&ctx.rig, role, side)?;
            clamped += limb_bend_positive(ctx, index, frames)?;
        }
    }
    if clamped > 0 {
        log::info!("Limbs bend positive: {} keys clamped", clamped);
    }
    Ok(clamped)
}

fn limb_bend_positive(ctx: &mut PoseContext, bone: usize, frames: &FrameRange) -> Result<usize> {
    let target = ctx.rig.bone(bone)?;
    let name = target.name.clone();
    let Some((channel, index)) = bend_channel(target.rotation_mode) else {
        log::warn!("{} uses axis-angle rotation, bend direction not enforced", name);
        return Ok(0);
    };

    let path = ChannelPath::new(name, channel, index);
    let Some(fcu) = ctx.action_mut()?.curve_mut(&path) else {
        log::debug!("{} has no curve, nothing to straighten", path);
        return Ok(0);
    };

    let floor = fcu.evaluate(frames.first() as f32);
    let mut clamped = 0;
    for keyframe in fcu.keyframes.values_mut() {
        if frames.contains(keyframe.frame) && keyframe.value < floor {
            keyframe.value = floor;
            clamped += 1;
        }
    }
    Ok(clamped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::EulerOrder;
    use crate::testing::mhx_context;

    #[test]
    fn test_keys_clamped_to_first_frame() {
        let mut ctx = mhx_context();
        let profile = RigProfile::mhx();
        let path = ChannelPath::new("shin.fk.L", Channel::RotationQuaternion, 1);
        {
            let action = ctx.action_mut().unwrap();
            for (frame, value) in [(1, -5.0), (2, 10.0), (3, -8.0), (4, -3.0), (9, -9.0)] {
                action.insert_keyframe(path.clone(), frame, value);
            }
        }

        let frames = FrameRange::from_frames([1, 2, 3, 4]).unwrap();
        let clamped = limbs_bend_positive(&mut ctx, &profile, &frames, false, true).unwrap();
        assert_eq!(clamped, 1);

        let fcu = ctx.action().unwrap().curve(&path).unwrap();
        let values: Vec<f32> = fcu.keyframes.values().map(|k| k.value).collect();
        // 范围外的第 9 帧不处理
        assert_eq!(values, vec![-5.0, 10.0, -5.0, -3.0, -9.0]);
    }

    #[test]
    fn test_euler_bend_channel() {
        let mut ctx = mhx_context();
        let profile = RigProfile::mhx();
        let forearm = ctx.rig.bone_index("forearm.fk.R").unwrap();
        ctx.rig.bone_mut(forearm).unwrap().rotation_mode = RotationMode::Euler(EulerOrder::YZX);
        let path = ChannelPath::new("forearm.fk.R", Channel::RotationEuler, 0);
        {
            let action = ctx.action_mut().unwrap();
            action.insert_keyframe(path.clone(), 1, 0.5);
            action.insert_keyframe(path.clone(), 2, 0.2);
        }

        let frames = FrameRange::from_frames([1, 2]).unwrap();
        // 只处理膝盖时手肘不变
        assert_eq!(limbs_bend_positive(&mut ctx, &profile, &frames, false, true).unwrap(), 0);
        assert_eq!(limbs_bend_positive(&mut ctx, &profile, &frames, true, false).unwrap(), 1);
        let fcu = ctx.action().unwrap().curve(&path).unwrap();
        assert_eq!(fcu.find(2).unwrap().value, 0.5);
    }

    #[test]
    fn test_axis_angle_skipped() {
        let mut ctx = mhx_context();
        let profile = RigProfile::mhx();
        let shin = ctx.rig.bone_index("shin.fk.L").unwrap();
        ctx.rig.bone_mut(shin).unwrap().rotation_mode = RotationMode::AxisAngle;
        ctx.action_mut()
            .unwrap()
            .insert_keyframe(ChannelPath::new("shin.fk.L", Channel::RotationAxisAngle, 0), 1, -1.0);
        let frames = FrameRange::from_frames([1]).unwrap();
        assert_eq!(limbs_bend_positive(&mut ctx, &profile, &frames, false, true).unwrap(), 0);
    }
}
