//! 地面平面

use glam::{Mat3, Mat4, Vec3};

use crate::{Result, RetargetError};

/// 参考地面：单位法线 + 原点
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloorPlane {
    pub normal: Vec3,
    pub origin: Vec3,
}

impl FloorPlane {
    /// 世界原点处、法线朝 +Z 的地面
    pub fn world_up() -> Self {
        Self {
            normal: Vec3::Z,
            origin: Vec3::ZERO,
        }
    }

    /// 由平面对象的世界矩阵构建：3x3 部分逐列归一化后取 Z 列为法线，平移为原点
    pub fn from_world_matrix(matrix: &Mat4) -> Result<Self> {
        let rotation = Mat3::from_mat4(*matrix);
        let normal = rotation.z_axis.try_normalize().ok_or_else(|| {
            RetargetError::DegenerateTransform("floor plane has a zero-length normal".into())
        })?;
        Ok(Self {
            normal,
            origin: matrix.w_axis.truncate(),
        })
    }

    /// 点在平面以下的深度：`-n · (p - origin)`，正值表示穿透地面
    pub fn offset(&self, point: Vec3) -> f32 {
        -self.normal.dot(point - self.origin)
    }

    /// 沿法线方向的投影高度
    pub fn height(&self, v: Vec3) -> f32 {
        self.normal.dot(v)
    }

    /// 把方向向量投影到平面内
    pub fn project_direction(&self, v: Vec3) -> Vec3 {
        v - self.normal * self.normal.dot(v)
    }
}

impl Default for FloorPlane {
    fn default() -> Self {
        Self::world_up()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_offset_sign() {
        let plane = FloorPlane::world_up();
        assert!((plane.offset(Vec3::new(1.0, 2.0, -0.3)) - 0.3).abs() < 1e-6);
        assert!(plane.offset(Vec3::new(0.0, 0.0, 0.5)) < 0.0);
    }

    #[test]
    fn test_from_scaled_world_matrix() {
        let matrix = Mat4::from_scale_rotation_translation(
            Vec3::new(4.0, 4.0, 2.0),
            Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
            Vec3::new(0.0, 0.0, 1.0),
        );
        let plane = FloorPlane::from_world_matrix(&matrix).unwrap();
        assert!(plane.normal.abs_diff_eq(Vec3::NEG_Y, 1e-5));
        assert!(plane.origin.abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn test_degenerate_plane() {
        let matrix = Mat4::from_scale(Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(
            FloorPlane::from_world_matrix(&matrix).unwrap_err().category(),
            "degenerate_transform"
        );
    }
}
