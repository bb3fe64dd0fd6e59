//! 动画关键帧

use super::BezierCurve;

/// 关键帧到下一关键帧之间的插值方式
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Interpolation {
    Constant,
    Linear,
    Bezier(BezierCurve),
}

impl Default for Interpolation {
    fn default() -> Self {
        Interpolation::Bezier(BezierCurve::ease())
    }
}

impl Interpolation {
    /// 在 [0, 1] 区间内把时间参数映射为混合系数
    pub fn weight(&self, t: f32) -> f32 {
        match self {
            Interpolation::Constant => 0.0,
            Interpolation::Linear => t,
            Interpolation::Bezier(curve) => curve.evaluate(t),
        }
    }
}

/// 单通道关键帧
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    pub frame: i32,
    pub value: f32,
    pub interpolation: Interpolation,
}

impl Keyframe {
    pub fn new(frame: i32, value: f32) -> Self {
        Self {
            frame,
            value,
            interpolation: Interpolation::default(),
        }
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }
}
