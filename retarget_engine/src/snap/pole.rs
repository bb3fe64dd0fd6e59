//! 极向目标求解
//!
//! 由上下两段骨骼的朝向求出弯曲平面，把极向目标放在关节外侧：
//!
//! ```text
//! n = above.y × below.y
//! d = normalize(reject(above.y - below.y, n̂))，与 above.z 同向时取反
//! p = below.head + factor · pole.length · d
//! ```
//!
//! 两段近似共线时无法确定弯曲平面，极向目标直接放在关节上。

use glam::{Mat4, Vec3};

use crate::animation::insert_location;
use crate::config::get_config;
use crate::math::{axis, head, reject};
use crate::scene::PoseContext;
use crate::Result;

/// 计算极向目标的骨架空间位置
pub fn solve_pole_point(above: &Mat4, below: &Mat4, pole_length: f32) -> Vec3 {
    let config = get_config();
    let above_y = axis(above, 1);
    let below_y = axis(below, 1);
    let joint = head(below);

    let n = above_y.cross(below_y);
    if n.length() <= config.pole_parallel_epsilon {
        log::debug!("Limb segments are parallel, pole placed on the joint");
        return joint;
    }

    let n = n.normalize();
    let Some(mut d) = reject(above_y - below_y, n).try_normalize() else {
        return joint;
    };
    if d.dot(axis(above, 2)) > 0.0 {
        d = -d;
    }
    joint + d * (config.pole_distance_factor * pole_length)
}

/// 把极向目标骨骼移到由 `above` / `below` 两段骨骼求出的位置，写入位置关键帧
pub(crate) fn match_pole_target(ctx: &mut PoseContext, pole: usize, above: usize, below: usize) -> Result<()> {
    let length = ctx.rig.bone(pole)?.length;
    let point = solve_pole_point(
        &ctx.rig.global_transform(above)?,
        &ctx.rig.global_transform(below)?,
        length,
    );
    let pose = ctx.rig.pose_matrix(pole, &Mat4::from_translation(point))?;
    insert_location(ctx, pole, &pose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::from_axes;

    #[test]
    fn test_parallel_segments_fall_back_to_joint() {
        let above = from_axes(Vec3::X, Vec3::NEG_Z, Vec3::Y, Vec3::new(0.0, 0.0, 1.0));
        let below = from_axes(Vec3::X, Vec3::NEG_Z, Vec3::Y, Vec3::new(0.0, 0.0, 0.5));
        let point = solve_pole_point(&above, &below, 0.2);
        assert!(point.abs_diff_eq(Vec3::new(0.0, 0.0, 0.5), 1e-6));
    }

    #[test]
    fn test_bent_knee_points_forward() {
        // 大腿竖直向下，小腿向后弯 90°：膝盖朝 -Y，极向目标在膝盖前方
        let above = from_axes(Vec3::X, Vec3::NEG_Z, Vec3::Y, Vec3::new(0.0, 0.0, 1.0));
        let below = from_axes(Vec3::X, Vec3::Y, Vec3::Z, Vec3::new(0.0, 0.0, 0.5));
        let point = solve_pole_point(&above, &below, 0.1);

        let d = (Vec3::NEG_Z - Vec3::Y).normalize();
        let expected = Vec3::new(0.0, 0.0, 0.5) + d * 0.6;
        assert!(point.abs_diff_eq(expected, 1e-5), "pole at {:?}", point);
        assert!(point.y < 0.0);
    }

    #[test]
    fn test_direction_flipped_against_above_z() {
        // 同样的弯曲，但上段 Z 轴朝 -Y：d 与 above.z 同向，需要取反
        let above = from_axes(Vec3::NEG_X, Vec3::NEG_Z, Vec3::NEG_Y, Vec3::new(0.0, 0.0, 1.0));
        let below = from_axes(Vec3::X, Vec3::Y, Vec3::Z, Vec3::new(0.0, 0.0, 0.5));
        let point = solve_pole_point(&above, &below, 0.1);
        assert!(point.y > 0.0);
    }

    #[test]
    fn test_distance_factor_from_config() {
        let above = from_axes(Vec3::X, Vec3::NEG_Z, Vec3::Y, Vec3::ZERO);
        let below = from_axes(Vec3::X, Vec3::Y, Vec3::Z, Vec3::ZERO);
        let point = solve_pole_point(&above, &below, 0.5);
        assert!((point.length() - 3.0).abs() < 1e-5);
    }
}
