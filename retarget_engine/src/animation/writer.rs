//! 关键帧写入
//!
//! 从姿态矩阵中提取平移或旋转，赋给骨骼的姿态通道，并在当前帧写入关键帧。
//! 同一骨骼同一帧重复写入会覆盖，不会产生重复关键帧。

use glam::Mat4;

use super::fcurve::{Channel, ChannelPath};
use super::frame_range::FrameRange;
use crate::scene::PoseContext;
use crate::Result;

/// 写入平移关键帧
pub fn insert_location(ctx: &mut PoseContext, bone: usize, pose: &Mat4) -> Result<()> {
    ctx.action()?;
    let (_, _, translation) = pose.to_scale_rotation_translation();
    ctx.rig.bone_mut(bone)?.location = translation;
    key_channel(ctx, bone, Channel::Location)
}

/// 写入旋转关键帧（按骨骼的旋转模式选择通道）
pub fn insert_rotation(ctx: &mut PoseContext, bone: usize, pose: &Mat4) -> Result<()> {
    ctx.action()?;
    let (_, rotation, _) = pose.to_scale_rotation_translation();
    let target = ctx.rig.bone_mut(bone)?;
    target.set_rotation(rotation);
    let channel = target.rotation_channel();
    key_channel(ctx, bone, channel)
}

/// 把骨骼某通道的当前值写成当前帧的关键帧
pub fn key_channel(ctx: &mut PoseContext, bone: usize, channel: Channel) -> Result<()> {
    let frame = ctx.current_frame();
    let target = ctx.rig.bone(bone)?;
    let name = target.name.clone();
    let values: Vec<f32> = (0..channel.component_count())
        .filter_map(|i| target.channel_value(channel, i))
        .collect();

    let action = ctx.action_mut()?;
    for (index, value) in values.into_iter().enumerate() {
        action.insert_keyframe(ChannelPath::new(name.clone(), channel, index), frame, value);
    }
    Ok(())
}

/// 在帧范围内每一帧补齐关键帧，返回写入的曲线数
///
/// 逐帧跳转后取骨骼通道的值：有曲线的分量即曲线求值结果，
/// 缺曲线的分量取骨骼当前值并新建曲线。结束后回到原来的帧。
pub fn fill_keyframes(ctx: &mut PoseContext, bone: usize, channel: Channel, frames: &FrameRange) -> Result<usize> {
    let name = ctx.rig.bone(bone)?.name.clone();
    let paths: Vec<ChannelPath> = (0..channel.component_count())
        .map(|index| ChannelPath::new(name.clone(), channel, index))
        .collect();
    {
        let action = ctx.action()?;
        for path in paths.iter().filter(|p| action.curve(p).is_none()) {
            log::debug!("{} has no curve, keyed from current pose", path);
        }
    }

    let current = ctx.current_frame();
    for frame in frames.iter() {
        ctx.set_frame(frame);
        let target = ctx.rig.bone(bone)?;
        let values: Vec<f32> = (0..paths.len())
            .filter_map(|i| target.channel_value(channel, i))
            .collect();
        let action = ctx.action_mut()?;
        for (path, value) in paths.iter().zip(values) {
            action.insert_keyframe(path.clone(), frame, value);
        }
    }
    ctx.set_frame(current);
    Ok(paths.len())
}

/// 全部曲线改为线性插值与常量外插
pub fn normalize_interpolation(ctx: &mut PoseContext) -> Result<()> {
    ctx.action_mut()?.normalize_interpolation();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Action;
    use crate::math::{EulerOrder, RotationMode};
    use crate::skeleton::{Bone, Rig};
    use glam::{Quat, Vec3};

    fn context() -> PoseContext {
        let mut rig = Rig::new("test");
        rig.add_bone(Bone::new("q", Mat4::IDENTITY, 1.0), None).unwrap();
        rig.add_bone(
            Bone::new("e", Mat4::IDENTITY, 1.0).with_rotation_mode(RotationMode::Euler(EulerOrder::YZX)),
            None,
        )
        .unwrap();
        let mut ctx = PoseContext::new(rig, Some(Action::new("act")));
        ctx.set_frame(4);
        ctx
    }

    #[test]
    fn test_insert_twice_same_frame() {
        let mut ctx = context();
        let pose = Mat4::from_rotation_translation(Quat::from_rotation_x(0.5), Vec3::new(1.0, 2.0, 3.0));
        insert_location(&mut ctx, 0, &pose).unwrap();
        insert_location(&mut ctx, 0, &pose).unwrap();

        let action = ctx.action().unwrap();
        let fcu = action.find_bone_curve("q", Channel::Location, 1).unwrap();
        assert_eq!(fcu.len(), 1);
        assert_eq!(fcu.find(4).map(|k| k.value), Some(2.0));
        assert_eq!(fcu.group, "q");
        assert_eq!(ctx.rig.get_bone(0).unwrap().location, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_insert_rotation_honours_mode() {
        let mut ctx = context();
        let pose = Mat4::from_quat(Quat::from_rotation_y(0.3));
        insert_rotation(&mut ctx, 0, &pose).unwrap();
        insert_rotation(&mut ctx, 1, &pose).unwrap();

        let action = ctx.action().unwrap();
        assert_eq!(
            action.curves().filter(|c| c.path.bone == "q").count(),
            4
        );
        let euler_y = action.find_bone_curve("e", Channel::RotationEuler, 1).unwrap();
        assert!((euler_y.find(4).unwrap().value - 0.3).abs() < 1e-5);
        assert!(action.find_bone_curve("e", Channel::RotationQuaternion, 0).is_none());
    }

    #[test]
    fn test_write_without_action() {
        let mut ctx = context();
        ctx.action = None;
        let err = insert_location(&mut ctx, 0, &Mat4::IDENTITY).unwrap_err();
        assert_eq!(err.category(), "no_animation_data");
        // 失败时骨骼通道保持不变
        assert_eq!(ctx.rig.get_bone(0).unwrap().location, Vec3::ZERO);
    }

    #[test]
    fn test_fill_keyframes() {
        let mut ctx = context();
        {
            let action = ctx.action_mut().unwrap();
            for index in 0..3 {
                let path = ChannelPath::new("q", Channel::Location, index);
                action.insert_keyframe(path.clone(), 0, 0.0);
                action.insert_keyframe(path, 10, 10.0);
            }
            action.normalize_interpolation();
        }
        let frames = FrameRange::from_frames([0, 2, 5, 10]).unwrap();
        assert_eq!(fill_keyframes(&mut ctx, 0, Channel::Location, &frames).unwrap(), 3);

        let fcu = ctx.action().unwrap().find_bone_curve("q", Channel::Location, 2).unwrap();
        assert_eq!(fcu.frames().collect::<Vec<_>>(), vec![0, 2, 5, 10]);
        assert!((fcu.find(5).unwrap().value - 5.0).abs() < 1e-5);

        // 补完后回到原来的帧
        assert_eq!(ctx.current_frame(), 4);
    }

    #[test]
    fn test_fill_keyframes_without_curve() {
        let mut ctx = context();
        ctx.rig.get_bone_mut(0).unwrap().location = Vec3::new(0.0, 0.0, 0.25);
        let frames = FrameRange::from_frames([1, 3]).unwrap();
        assert_eq!(fill_keyframes(&mut ctx, 0, Channel::Location, &frames).unwrap(), 3);

        // 没有曲线时用骨骼当前值在每一帧建关键帧
        let fcu = ctx.action().unwrap().find_bone_curve("q", Channel::Location, 2).unwrap();
        assert_eq!(fcu.frames().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(fcu.find(3).map(|k| k.value), Some(0.25));
    }
}
