//! 帧范围
//!
//! 由 Action 中所有关键帧的帧号组成（升序、去重），可选地限定在两个时间点之间。

use super::action::Action;
use crate::scene::Timeline;
use crate::{Result, RetargetError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRange {
    frames: Vec<i32>,
}

impl FrameRange {
    /// 直接指定帧列表（排序并去重）
    pub fn from_frames(frames: impl IntoIterator<Item = i32>) -> Result<Self> {
        let mut frames: Vec<i32> = frames.into_iter().collect();
        frames.sort_unstable();
        frames.dedup();
        if frames.is_empty() {
            return Err(RetargetError::NoAnimationData("frame range is empty".into()));
        }
        Ok(Self { frames })
    }

    /// Action 中的全部关键帧，可选上下界（含）
    pub fn active(action: &Action, min: Option<i32>, max: Option<i32>) -> Result<Self> {
        let frames = action
            .keyframe_frames()
            .into_iter()
            .filter(|&f| min.map_or(true, |m| f >= m) && max.map_or(true, |m| f <= m));
        Self::from_frames(frames).map_err(|_| {
            RetargetError::NoAnimationData(format!("action '{}' has no keyframes in range", action.name))
        })
    }

    /// 限定在首尾两个选中标记之间；选中标记少于两个时取全部关键帧
    pub fn between_markers(action: &Action, timeline: &Timeline) -> Result<Self> {
        match timeline.marked_range() {
            Some((start, end)) => Self::active(action, Some(start), Some(end)),
            None => Self::active(action, None, None),
        }
    }

    pub fn frames(&self) -> &[i32] {
        &self.frames
    }

    pub fn first(&self) -> i32 {
        self.frames[0]
    }

    pub fn last(&self) -> i32 {
        self.frames[self.frames.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn contains(&self, frame: i32) -> bool {
        frame >= self.first() && frame <= self.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.frames.iter().copied()
    }
}
