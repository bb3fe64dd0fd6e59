//! 贝塞尔曲线插值

/// 归一化的三次贝塞尔缓动曲线，端点固定在 (0,0) 与 (1,1)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BezierCurve {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BezierCurve {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// 线性
    pub fn linear() -> Self {
        Self::new(1.0 / 3.0, 1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0)
    }

    /// 缓入缓出（新插入关键帧的默认手柄）
    pub fn ease() -> Self {
        Self::new(1.0 / 3.0, 0.0, 2.0 / 3.0, 1.0)
    }

    /// 评估贝塞尔曲线
    pub fn evaluate(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        // 牛顿法求解 x(s) = t
        let mut s = t;
        for _ in 0..15 {
            let dx = self.bezier_dx(s);
            if dx.abs() < 1e-6 {
                break;
            }
            let next = (s - (self.bezier_x(s) - t) / dx).clamp(0.0, 1.0);
            if (next - s).abs() < 1e-6 {
                s = next;
                break;
            }
            s = next;
        }

        self.bezier_y(s)
    }

    fn bezier_x(&self, s: f32) -> f32 {
        cubic(s, self.x1, self.x2)
    }

    fn bezier_y(&self, s: f32) -> f32 {
        cubic(s, self.y1, self.y2)
    }

    fn bezier_dx(&self, s: f32) -> f32 {
        let t = 1.0 - s;
        3.0 * t * t * self.x1 + 6.0 * t * s * (self.x2 - self.x1) + 3.0 * s * s * (1.0 - self.x2)
    }
}

impl Default for BezierCurve {
    fn default() -> Self {
        Self::ease()
    }
}

fn cubic(s: f32, p1: f32, p2: f32) -> f32 {
    let t = 1.0 - s;
    3.0 * t * t * s * p1 + 3.0 * t * s * s * p2 + s * s * s
}
