//! 重定向引擎运行时配置
//!
//! 所有参数扁平化，直接在代码中修改默认值即可。

use once_cell::sync::Lazy;
use std::sync::RwLock;

/// 重定向配置（扁平化，不嵌套）
#[derive(Debug, Clone, PartialEq)]
pub struct RetargetConfig {
    // ========== 极向目标 ==========
    /// 极向目标距离关节的倍数（乘以极向骨骼长度），默认 6.0
    pub pole_distance_factor: f32,
    /// 上下两节骨骼近似平行的判定阈值（叉积长度），默认 1e-4
    pub pole_parallel_epsilon: f32,

    // ========== 矩阵 ==========
    /// 行列式绝对值小于此值视为不可逆，默认 1e-9
    pub determinant_epsilon: f32,

    // ========== 进度 ==========
    /// 每隔多少帧输出一次进度日志，默认 20
    pub progress_step: usize,
}

impl Default for RetargetConfig {
    fn default() -> Self {
        Self {
            pole_distance_factor: 6.0,
            pole_parallel_epsilon: 1e-4,

            determinant_epsilon: 1e-9,

            progress_step: 20,
        }
    }
}

/// 全局配置实例
static RETARGET_CONFIG: Lazy<RwLock<RetargetConfig>> =
    Lazy::new(|| RwLock::new(RetargetConfig::default()));

/// 获取当前配置（只读）
pub fn get_config() -> RetargetConfig {
    match RETARGET_CONFIG.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: RetargetConfig) {
    match RETARGET_CONFIG.write() {
        Ok(mut guard) => *guard = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// 重置为默认配置
pub fn reset_config() {
    set_config(RetargetConfig::default());
}
