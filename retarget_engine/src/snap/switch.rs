//! IK/FK 切换属性、图层与动画清除

use crate::scene::PoseContext;
use crate::skeleton::{BoneRole, ChainKind, Limb, Rig, RigProfile, Side, SwitchKind};
use crate::{Result, RetargetError};

use super::transfer::TransferOptions;

/// 设置手臂/腿的 IK 混合属性，并切换对应的 IK / FK 图层
///
/// `value != 0` 时打开 IK 图层、关闭 FK 图层，否则相反。
pub fn set_ik_switch(rig: &mut Rig, profile: &RigProfile, arms: bool, legs: bool, value: f32) {
    let mut ik_layers: Vec<usize> = Vec::new();
    let mut fk_layers: Vec<usize> = Vec::new();

    for (limb, kind, enabled) in [(Limb::Arm, SwitchKind::ArmIk, arms), (Limb::Leg, SwitchKind::LegIk, legs)] {
        if !enabled {
            continue;
        }
        for side in Side::BOTH {
            if let Some(name) = profile.switch_name(kind, side) {
                rig.set_property(name, value);
            }
        }
        ik_layers.extend_from_slice(profile.layers_for(limb, ChainKind::Ik));
        fk_layers.extend_from_slice(profile.layers_for(limb, ChainKind::Fk));
    }

    let (shown, hidden) = if value != 0.0 {
        (ik_layers, fk_layers)
    } else {
        (fk_layers, ik_layers)
    };
    for n in shown {
        if let Some(layer) = rig.layers.get_mut(n) {
            *layer = true;
        }
    }
    for n in hidden {
        if let Some(layer) = rig.layers.get_mut(n) {
            *layer = false;
        }
    }
    log::debug!("IK switch set to {} (arms: {}, legs: {})", value, arms, legs);
}

/// 任一侧腿处于 IK 模式（缺失的属性视为 FK）
pub fn leg_ik_active(rig: &Rig, profile: &RigProfile) -> bool {
    Side::BOTH.iter().any(|&side| {
        profile
            .switch_name(SwitchKind::LegIk, side)
            .and_then(|name| rig.property(&name))
            .map_or(false, |value| value != 0.0)
    })
}

/// 该侧腿的 IK 是否直接驱动踝部
pub(crate) fn leg_ik_to_ankle(rig: &Rig, profile: &RigProfile, side: Side) -> bool {
    profile
        .switch_name(SwitchKind::LegIkToAnkle, side)
        .and_then(|name| rig.property(&name))
        .map_or(false, |value| value != 0.0)
}

/// 选中肢体、两侧的骨骼名
fn chain_bone_names(ctx: &PoseContext, profile: &RigProfile, kind: ChainKind, options: &TransferOptions) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for limb in options.limbs() {
        for side in Side::BOTH {
            let chain = profile.chain(&ctx.rig, limb, kind, side)?;
            for index in chain.bones() {
                names.push(ctx.rig.bone(index)?.name.clone());
            }
        }
    }
    Ok(names)
}

/// 删除 FK 或 IK 骨骼链上的全部动画曲线，并把开关切到另一侧
///
/// 清除 FK 后切到 IK（1.0），清除 IK 后切到 FK（0.0）。
pub fn clear_animation(ctx: &mut PoseContext, profile: &RigProfile, kind: ChainKind, options: &TransferOptions) -> Result<usize> {
    let names = chain_bone_names(ctx, profile, kind, options)?;
    let removed = ctx.action_mut()?.remove_bone_curves(&names);
    if removed == 0 {
        return Err(RetargetError::NoAnimationData(format!(
            "no {:?} curves to clear",
            kind
        )));
    }

    let value = match kind {
        ChainKind::Fk => 1.0,
        ChainKind::Ik => 0.0,
    };
    set_ik_switch(&mut ctx.rig, profile, options.include_arms, options.include_legs, value);
    log::info!("Cleared {} {:?} curves", removed, kind);
    Ok(removed)
}

/// 删除极向目标的动画曲线并把它们恢复到静止姿态
pub fn clear_pole_targets(ctx: &mut PoseContext, profile: &RigProfile, options: &TransferOptions) -> Result<usize> {
    let mut poles = Vec::new();
    for limb in options.limbs() {
        let role = match limb {
            Limb::Arm => BoneRole::ElbowPole,
            Limb::Leg => BoneRole::KneePole,
        };
        for side in Side::BOTH {
            poles.push(profile.resolve(&ctx.rig, role, side)?);
        }
    }

    let mut names = Vec::with_capacity(poles.len());
    for &pole in &poles {
        names.push(ctx.rig.bone(pole)?.name.clone());
    }
    let removed = ctx.action_mut()?.remove_bone_curves(&names);
    for pole in poles {
        ctx.rig.bone_mut(pole)?.reset_pose();
    }
    log::info!("Cleared {} pole target curves", removed);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Channel, ChannelPath};
    use crate::testing::mhx_context;
    use glam::Vec3;

    #[test]
    fn test_switch_toggles_layers() {
        let mut ctx = mhx_context();
        let profile = RigProfile::mhx();
        set_ik_switch(&mut ctx.rig, &profile, false, true, 1.0);
        assert_eq!(ctx.rig.property("MhaLegIk_L"), Some(1.0));
        assert_eq!(ctx.rig.property("MhaArmIk_L"), Some(0.0));
        assert!(ctx.rig.layers[4] && ctx.rig.layers[20]);
        assert!(!ctx.rig.layers[5] && !ctx.rig.layers[21]);
        assert!(leg_ik_active(&ctx.rig, &profile));

        set_ik_switch(&mut ctx.rig, &profile, false, true, 0.0);
        assert!(!ctx.rig.layers[4] && ctx.rig.layers[5]);
        assert!(!leg_ik_active(&ctx.rig, &profile));
    }

    #[test]
    fn test_missing_ankle_flag_is_false() {
        let mut ctx = mhx_context();
        let profile = RigProfile::mhx();
        assert!(!leg_ik_to_ankle(&ctx.rig, &profile, Side::Left));
        ctx.rig.set_property("MhaLegIkToAnkle_L", 1.0);
        assert!(leg_ik_to_ankle(&ctx.rig, &profile, Side::Left));
        assert!(!leg_ik_active(&Rig::new("bare"), &profile));
    }

    #[test]
    fn test_clear_fk_animation() {
        let mut ctx = mhx_context();
        let profile = RigProfile::mhx();
        let options = TransferOptions::default();
        {
            let action = ctx.action_mut().unwrap();
            action.insert_keyframe(ChannelPath::new("thigh.fk.L", Channel::RotationQuaternion, 1), 1, 0.2);
            action.insert_keyframe(ChannelPath::new("toe.fk.R", Channel::RotationQuaternion, 0), 1, 1.0);
            action.insert_keyframe(ChannelPath::new("upper_arm.fk.L", Channel::RotationQuaternion, 0), 1, 1.0);
            action.insert_keyframe(ChannelPath::new("hips", Channel::Location, 0), 1, 0.0);
        }

        // 默认只处理腿
        assert_eq!(clear_animation(&mut ctx, &profile, ChainKind::Fk, &options).unwrap(), 2);
        assert_eq!(ctx.action().unwrap().curve_count(), 2);
        assert_eq!(ctx.rig.property("MhaLegIk_R"), Some(1.0));

        let err = clear_animation(&mut ctx, &profile, ChainKind::Fk, &options).unwrap_err();
        assert_eq!(err.category(), "no_animation_data");
    }

    #[test]
    fn test_clear_pole_targets() {
        let mut ctx = mhx_context();
        let profile = RigProfile::mhx();
        let knee = ctx.rig.bone_index("knee.pt.ik.L").unwrap();
        ctx.action_mut()
            .unwrap()
            .insert_keyframe(ChannelPath::new("knee.pt.ik.L", Channel::Location, 2), 1, 0.4);
        ctx.rig.bone_mut(knee).unwrap().location = Vec3::new(0.0, 0.0, 0.4);

        let removed = clear_pole_targets(&mut ctx, &profile, &TransferOptions::default()).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(ctx.rig.get_bone(knee).unwrap().location, Vec3::ZERO);
        assert!(ctx.action().unwrap().is_empty());
    }
}
