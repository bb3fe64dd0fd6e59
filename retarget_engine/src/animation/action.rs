//! Action：一组动画曲线
//!
//! 曲线按 (骨骼名, 通道, 分量) 存放在无序映射中。

use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};

use super::fcurve::{Channel, ChannelPath, Extrapolation, FCurve};
use super::keyframe::Interpolation;
use crate::skeleton::Rig;

/// 动画数据
#[derive(Debug, Clone, Default)]
pub struct Action {
    pub name: String,
    curves: HashMap<ChannelPath, FCurve>,
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            curves: HashMap::new(),
        }
    }

    /// 插入关键帧，曲线不存在时创建
    pub fn insert_keyframe(&mut self, path: ChannelPath, frame: i32, value: f32) {
        self.curves
            .entry(path.clone())
            .or_insert_with(|| FCurve::new(path))
            .insert_keyframe(frame, value);
    }

    pub fn curve(&self, path: &ChannelPath) -> Option<&FCurve> {
        self.curves.get(path)
    }

    pub fn curve_mut(&mut self, path: &ChannelPath) -> Option<&mut FCurve> {
        self.curves.get_mut(path)
    }

    /// 按骨骼、通道、分量查找曲线
    pub fn find_bone_curve(&self, bone: &str, channel: Channel, index: usize) -> Option<&FCurve> {
        self.curves.get(&ChannelPath::new(bone, channel, index))
    }

    pub fn curves(&self) -> impl Iterator<Item = &FCurve> {
        self.curves.values()
    }

    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.values().all(FCurve::is_empty)
    }

    /// 移除属于指定骨骼的全部曲线，返回移除数量
    pub fn remove_bone_curves(&mut self, bones: &[String]) -> usize {
        let before = self.curves.len();
        self.curves.retain(|path, _| !bones.contains(&path.bone));
        before - self.curves.len()
    }

    /// 所有曲线的关键帧帧号（升序去重）
    pub fn keyframe_frames(&self) -> BTreeSet<i32> {
        self.curves.values().flat_map(|fcu| fcu.frames()).collect()
    }

    /// 在指定时间求值全部曲线，写入骨骼姿态通道
    pub fn apply_to_rig(&self, rig: &mut Rig, frame: f32) {
        for fcu in self.curves.values() {
            if fcu.is_empty() {
                continue;
            }
            let Some(index) = rig.find_bone_by_name(&fcu.path.bone) else {
                log::debug!("Curve {} targets an unknown bone, skipped", fcu.path);
                continue;
            };
            let value = fcu.evaluate(frame);
            if let Some(bone) = rig.get_bone_mut(index) {
                bone.set_channel_value(fcu.path.channel, fcu.path.index, value);
            }
        }
    }

    /// 全部关键帧改为线性插值，外插改为常量
    pub fn normalize_interpolation(&mut self) {
        self.curves.par_iter_mut().for_each(|(_, fcu)| {
            fcu.set_interpolation(Interpolation::Linear);
            fcu.extrapolation = Extrapolation::Constant;
        });
    }
}
