//! 逐帧进度日志

use crate::config::get_config;

/// 每隔固定帧数输出一次百分比
pub struct Progress {
    label: &'static str,
    total: usize,
    step: usize,
}

impl Progress {
    pub fn start(label: &'static str, total: usize) -> Self {
        log::info!("{}: {} frames", label, total);
        Self {
            label,
            total,
            step: get_config().progress_step.max(1),
        }
    }

    pub fn tick(&self, n: usize, frame: i32) {
        if n % self.step == 0 {
            let percent = if self.total == 0 { 100.0 } else { 100.0 * n as f32 / self.total as f32 };
            log::info!("{}: frame {} ({:.0}%)", self.label, frame, percent);
        }
    }

    pub fn finish(self) {
        log::info!("{}: done", self.label);
    }
}
