//! 姿态上下文
//!
//! 场景里唯一的"当前姿态"。所有操作都通过 `&mut PoseContext` 读写，
//! 全局变换只在显式调用 `refresh()` 时重新计算。

use crate::animation::Action;
use crate::skeleton::Rig;
use crate::{Result, RetargetError};

use super::timeline::Timeline;

#[derive(Clone, Debug)]
pub struct PoseContext {
    pub rig: Rig,
    pub action: Option<Action>,
    pub timeline: Timeline,
    refresh_count: usize,
}

impl PoseContext {
    pub fn new(rig: Rig, action: Option<Action>) -> Self {
        Self {
            rig,
            action,
            timeline: Timeline::default(),
            refresh_count: 0,
        }
    }

    pub fn with_timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = timeline;
        self
    }

    pub fn current_frame(&self) -> i32 {
        self.timeline.current_frame
    }

    /// 跳到指定帧并把动画曲线写入骨骼通道（不刷新全局变换）
    pub fn set_frame(&mut self, frame: i32) {
        self.timeline.current_frame = frame;
        if let Some(action) = &self.action {
            action.apply_to_rig(&mut self.rig, frame as f32);
        }
    }

    /// 重新求值骨架
    pub fn refresh(&mut self) {
        self.rig.evaluate();
        self.refresh_count += 1;
    }

    /// 已执行的刷新次数
    pub fn refresh_count(&self) -> usize {
        self.refresh_count
    }

    pub fn action(&self) -> Result<&Action> {
        self.action
            .as_ref()
            .ok_or_else(|| RetargetError::NoAnimationData(format!("rig '{}' has no action", self.rig.name)))
    }

    pub fn action_mut(&mut self) -> Result<&mut Action> {
        let name = &self.rig.name;
        self.action
            .as_mut()
            .ok_or_else(|| RetargetError::NoAnimationData(format!("rig '{}' has no action", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Channel, ChannelPath};
    use crate::skeleton::Bone;
    use glam::{Mat4, Vec3};

    #[test]
    fn test_set_frame_does_not_refresh() {
        let mut rig = Rig::new("test");
        rig.add_bone(Bone::new("a", Mat4::IDENTITY, 1.0), None).unwrap();
        let mut action = Action::new("walk");
        action.insert_keyframe(ChannelPath::new("a", Channel::Location, 0), 1, 2.0);
        let mut ctx = PoseContext::new(rig, Some(action));

        ctx.set_frame(1);
        assert_eq!(ctx.rig.get_bone(0).unwrap().location.x, 2.0);
        assert_eq!(ctx.rig.get_bone(0).unwrap().head(), Vec3::ZERO);
        assert_eq!(ctx.refresh_count(), 0);

        ctx.refresh();
        assert_eq!(ctx.rig.get_bone(0).unwrap().head(), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ctx.refresh_count(), 1);
    }

    #[test]
    fn test_missing_action() {
        let mut ctx = PoseContext::new(Rig::new("test"), None);
        assert_eq!(ctx.action_mut().unwrap_err().category(), "no_animation_data");
    }
}
