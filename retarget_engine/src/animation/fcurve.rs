//! 动画曲线
//!
//! 每条曲线驱动一根骨骼一个通道的一个分量，关键帧按帧号存放在 `BTreeMap` 中，
//! 同一帧重复插入直接覆盖。

use std::collections::BTreeMap;
use std::fmt;

use super::keyframe::{Interpolation, Keyframe};
use crate::math::RotationMode;

/// 骨骼动画通道
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    Location,
    RotationQuaternion,
    RotationEuler,
    RotationAxisAngle,
    Scale,
}

impl Channel {
    pub fn name(self) -> &'static str {
        match self {
            Channel::Location => "location",
            Channel::RotationQuaternion => "rotation_quaternion",
            Channel::RotationEuler => "rotation_euler",
            Channel::RotationAxisAngle => "rotation_axis_angle",
            Channel::Scale => "scale",
        }
    }

    pub fn component_count(self) -> usize {
        match self {
            Channel::Location | Channel::RotationEuler | Channel::Scale => 3,
            Channel::RotationQuaternion | Channel::RotationAxisAngle => 4,
        }
    }

    /// 旋转模式对应的旋转通道
    pub fn rotation_for(mode: RotationMode) -> Channel {
        match mode {
            RotationMode::Quaternion => Channel::RotationQuaternion,
            RotationMode::Euler(_) => Channel::RotationEuler,
            RotationMode::AxisAngle => Channel::RotationAxisAngle,
        }
    }
}

/// 曲线地址：(骨骼名, 通道, 分量索引)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelPath {
    pub bone: String,
    pub channel: Channel,
    pub index: usize,
}

impl ChannelPath {
    pub fn new(bone: impl Into<String>, channel: Channel, index: usize) -> Self {
        Self {
            bone: bone.into(),
            channel,
            index,
        }
    }

    /// 宿主风格的数据路径
    pub fn data_path(&self) -> String {
        format!("pose.bones[\"{}\"].{}", self.bone, self.channel.name())
    }
}

impl fmt::Display for ChannelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.data_path(), self.index)
    }
}

/// 首尾关键帧之外的外插方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Extrapolation {
    #[default]
    Constant,
    Linear,
}

/// 动画曲线
#[derive(Clone, Debug)]
pub struct FCurve {
    pub path: ChannelPath,
    /// 分组名（骨骼名）
    pub group: String,
    pub keyframes: BTreeMap<i32, Keyframe>,
    pub extrapolation: Extrapolation,
}

impl FCurve {
    pub fn new(path: ChannelPath) -> Self {
        let group = path.bone.clone();
        Self {
            path,
            group,
            keyframes: BTreeMap::new(),
            extrapolation: Extrapolation::Constant,
        }
    }

    /// 插入关键帧，同一帧已存在时覆盖数值并保留插值方式
    pub fn insert_keyframe(&mut self, frame: i32, value: f32) -> Option<Keyframe> {
        match self.keyframes.get_mut(&frame) {
            Some(existing) => {
                let old = *existing;
                existing.value = value;
                Some(old)
            }
            None => self.keyframes.insert(frame, Keyframe::new(frame, value)),
        }
    }

    pub fn insert(&mut self, keyframe: Keyframe) -> Option<Keyframe> {
        self.keyframes.insert(keyframe.frame, keyframe)
    }

    /// 查找精确帧
    pub fn find(&self, frame: i32) -> Option<&Keyframe> {
        self.keyframes.get(&frame)
    }

    /// 查找 `frame` 之前（含）与之后的最近关键帧
    pub fn search_closest(&self, frame: f32) -> (Option<&Keyframe>, Option<&Keyframe>) {
        let key = frame.floor() as i32;
        let prev = self.keyframes.range(..=key).next_back().map(|(_, k)| k);
        let next = self.keyframes.range(key.saturating_add(1)..).next().map(|(_, k)| k);
        (prev, next)
    }

    /// 求值任意时间（支持帧间插值）
    pub fn evaluate(&self, frame: f32) -> f32 {
        match self.search_closest(frame) {
            (None, None) => 0.0,
            (Some(prev), Some(next)) => {
                let span = (next.frame - prev.frame) as f32;
                let t = (frame - prev.frame as f32) / span;
                let w = prev.interpolation.weight(t);
                prev.value + (next.value - prev.value) * w
            }
            (Some(last), None) => self.extrapolate(last, frame, false),
            (None, Some(first)) => self.extrapolate(first, frame, true),
        }
    }

    fn extrapolate(&self, edge: &Keyframe, frame: f32, before: bool) -> f32 {
        if self.extrapolation == Extrapolation::Constant || self.keyframes.len() < 2 {
            return edge.value;
        }
        let neighbour = if before {
            self.keyframes.values().nth(1)
        } else {
            self.keyframes.values().rev().nth(1)
        };
        match neighbour {
            Some(other) => {
                let slope = (edge.value - other.value) / (edge.frame - other.frame) as f32;
                edge.value + slope * (frame - edge.frame as f32)
            }
            None => edge.value,
        }
    }

    /// 所有关键帧改为线性插值
    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        for keyframe in self.keyframes.values_mut() {
            keyframe.interpolation = interpolation;
        }
    }

    pub fn frames(&self) -> impl Iterator<Item = i32> + '_ {
        self.keyframes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }
}
