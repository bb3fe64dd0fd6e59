//! FK ↔ IK 整段传递
//!
//! 流程：
//! 1. 解析选中肢体两侧的 FK / IK 骨骼链
//! 2. 切换开关到源一侧，静音链上的旋转限制，替换为工作图层
//! 3. IK→FK 时先修正 FK 手肘与膝盖的弯曲方向
//! 4. 逐帧：跳帧、刷新、逐侧逐肢体吸附
//! 5. 恢复图层与约束，切换开关到目标一侧，插值改为线性

use crate::animation::{normalize_interpolation, FrameRange};
use crate::scene::{ConstraintMuteGuard, LayerGuard, PoseContext, Progress};
use crate::skeleton::{
    ArmFkChain, ArmIkChain, BoneRole, LegFkChain, LegIkChain, Limb, LimbChain, RigProfile, Side,
};
use crate::Result;

use super::bend::limbs_bend_positive;
use super::limb::{snap_fk_arm, snap_fk_leg, snap_ik_arm, snap_ik_leg};
use super::switch::{leg_ik_to_ankle, set_ik_switch};

/// 传递选项
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferOptions {
    pub include_arms: bool,
    pub include_legs: bool,
    /// 链内每一节匹配后都刷新姿态
    pub accurate: bool,
    /// IK→FK 前先修正手肘/膝盖的弯曲方向
    pub bend_positive: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            include_arms: false,
            include_legs: true,
            accurate: true,
            bend_positive: true,
        }
    }
}

impl TransferOptions {
    /// 选中的肢体
    pub fn limbs(&self) -> Vec<Limb> {
        let mut limbs = Vec::with_capacity(2);
        if self.include_arms {
            limbs.push(Limb::Arm);
        }
        if self.include_legs {
            limbs.push(Limb::Leg);
        }
        limbs
    }
}

/// 一侧选中肢体的骨骼链
struct SideChains {
    side: Side,
    arm: Option<(ArmFkChain, ArmIkChain)>,
    leg: Option<(LegFkChain, LegIkChain)>,
}

impl SideChains {
    fn chains(&self) -> Vec<LimbChain> {
        let mut chains = Vec::with_capacity(4);
        if let Some((fk, ik)) = self.arm {
            chains.extend([LimbChain::ArmFk(fk), LimbChain::ArmIk(ik)]);
        }
        if let Some((fk, ik)) = self.leg {
            chains.extend([LimbChain::LegFk(fk), LimbChain::LegIk(ik)]);
        }
        chains
    }

    /// 两条链上参与吸附的全部骨骼（含反向骨骼、踝部与极向目标）
    fn bones(&self) -> Vec<usize> {
        self.chains().iter().flat_map(LimbChain::bones).collect()
    }
}

fn resolve_chains(ctx: &PoseContext, profile: &RigProfile, options: &TransferOptions) -> Result<Vec<SideChains>> {
    let mut chains = Vec::with_capacity(2);
    for side in Side::BOTH {
        let arm = if options.include_arms {
            Some((profile.arm_fk(&ctx.rig, side)?, profile.arm_ik(&ctx.rig, side)?))
        } else {
            None
        };
        let leg = if options.include_legs {
            Some((profile.leg_fk(&ctx.rig, side)?, profile.leg_ik(&ctx.rig, side)?))
        } else {
            None
        };
        chains.push(SideChains { side, arm, leg });
    }
    Ok(chains)
}

/// FK 动画逐帧传递到 IK 控制骨骼
pub fn transfer_fk_to_ik(
    ctx: &mut PoseContext,
    profile: &RigProfile,
    frames: &FrameRange,
    options: &TransferOptions,
) -> Result<()> {
    ctx.action()?;
    let chains = resolve_chains(ctx, profile, options)?;
    let bones: Vec<usize> = chains.iter().flat_map(SideChains::bones).collect();
    log::info!("Transfer FK to IK: {} frames", frames.len());

    set_ik_switch(&mut ctx.rig, profile, options.include_arms, options.include_legs, 0.0);
    {
        let mut muted = ConstraintMuteGuard::mute_limits(ctx, &bones);
        let mut ctx = LayerGuard::replace(&mut muted, profile.working_layers);

        let progress = Progress::start("Snap FK to IK", frames.len());
        for (n, frame) in frames.iter().enumerate() {
            ctx.set_frame(frame);
            ctx.refresh();
            for side in &chains {
                if let Some((fk, ik)) = &side.arm {
                    snap_ik_arm(&mut ctx, fk, ik, options.accurate)?;
                }
                if let Some((fk, ik)) = &side.leg {
                    snap_ik_leg(&mut ctx, fk, ik, options.accurate)?;
                }
            }
            progress.tick(n, frame);
        }
        progress.finish();
    }

    set_ik_switch(&mut ctx.rig, profile, options.include_arms, options.include_legs, 1.0);
    normalize_interpolation(ctx)?;
    log::info!("Transfer FK to IK done");
    Ok(())
}

/// IK 姿态逐帧传递回 FK 骨骼
pub fn transfer_ik_to_fk(
    ctx: &mut PoseContext,
    profile: &RigProfile,
    frames: &FrameRange,
    options: &TransferOptions,
) -> Result<()> {
    ctx.action()?;
    let chains = resolve_chains(ctx, profile, options)?;
    if options.bend_positive {
        for side in Side::BOTH {
            profile.resolve(&ctx.rig, BoneRole::ForearmFk, side)?;
            profile.resolve(&ctx.rig, BoneRole::ShinFk, side)?;
        }
    }
    let bones: Vec<usize> = chains.iter().flat_map(SideChains::bones).collect();
    log::info!("Transfer IK to FK: {} frames", frames.len());

    set_ik_switch(&mut ctx.rig, profile, options.include_arms, options.include_legs, 1.0);
    {
        let mut muted = ConstraintMuteGuard::mute_limits(ctx, &bones);
        let mut ctx = LayerGuard::replace(&mut muted, profile.working_layers);

        // 手肘与膝盖总是一起处理，与选中的肢体无关
        if options.bend_positive {
            limbs_bend_positive(&mut ctx, profile, frames, true, true)?;
        }

        let progress = Progress::start("Snap IK to FK", frames.len());
        for (n, frame) in frames.iter().enumerate() {
            ctx.set_frame(frame);
            ctx.refresh();
            for side in &chains {
                if let Some((fk, ik)) = &side.arm {
                    snap_fk_arm(&mut ctx, fk, ik, options.accurate)?;
                }
                if let Some((fk, ik)) = &side.leg {
                    let ik_to_ankle = leg_ik_to_ankle(&ctx.rig, profile, side.side);
                    snap_fk_leg(&mut ctx, fk, ik, ik_to_ankle, options.accurate)?;
                }
            }
            progress.tick(n, frame);
        }
        progress.finish();
    }

    set_ik_switch(&mut ctx.rig, profile, options.include_arms, options.include_legs, 0.0);
    normalize_interpolation(ctx)?;
    log::info!("Transfer IK to FK done");
    Ok(())
}
