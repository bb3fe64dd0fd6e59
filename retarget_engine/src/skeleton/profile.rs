//! 骨架命名方案与肢体链解析
//!
//! `RigProfile` 把语义角色映射到骨骼名模板（`{side}` 占位符替换为 L / R），
//! 每次操作时解析成带命名字段的肢体链，避免按位置索引取骨骼。

use std::collections::HashMap;

use super::manager::{Rig, LAYER_COUNT};
use crate::{Result, RetargetError};

/// 左右侧
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn letter(self) -> &'static str {
        match self {
            Side::Left => "L",
            Side::Right => "R",
        }
    }
}

/// 肢体
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Limb {
    Arm,
    Leg,
}

/// 骨骼链类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChainKind {
    Fk,
    Ik,
}

/// 骨骼语义角色
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoneRole {
    // FK 手臂
    UpperArmFk,
    ForearmFk,
    HandFk,
    // IK 手臂
    UpperArmIk,
    ForearmIk,
    ArmEffectorIk,
    ElbowPole,
    HandIk,
    // FK 腿
    ThighFk,
    ShinFk,
    FootFk,
    ToeFk,
    // IK 腿
    ThighIk,
    ShinIk,
    KneePole,
    Ankle,
    AnkleIk,
    FootIk,
    FootRev,
    ToeRev,
    BallMarker,
    ToeMarker,
    HeelMarker,
    // 躯干
    Hips,
    Root,
}

/// IK/FK 切换属性
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwitchKind {
    /// 手臂 IK 混合（0 = FK, 1 = IK）
    ArmIk,
    /// 腿 IK 混合
    LegIk,
    /// 腿 IK 直接驱动踝部
    LegIkToAnkle,
}

/// 骨架命名方案
#[derive(Clone, Debug)]
pub struct RigProfile {
    pub name: String,
    patterns: HashMap<BoneRole, String>,
    switches: HashMap<SwitchKind, String>,
    /// 传递期间使用的工作图层
    pub working_layers: [bool; LAYER_COUNT],
    pub arm_ik_layers: Vec<usize>,
    pub arm_fk_layers: Vec<usize>,
    pub leg_ik_layers: Vec<usize>,
    pub leg_fk_layers: Vec<usize>,
}

impl RigProfile {
    /// 空方案，通过 `with_role` / `with_switch` 填充
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            patterns: HashMap::new(),
            switches: HashMap::new(),
            working_layers: [true; LAYER_COUNT],
            arm_ik_layers: Vec::new(),
            arm_fk_layers: Vec::new(),
            leg_ik_layers: Vec::new(),
            leg_fk_layers: Vec::new(),
        }
    }

    /// MHX 骨架命名
    pub fn mhx() -> Self {
        use BoneRole::*;
        let roles = [
            (UpperArmFk, "upper_arm.fk.{side}"),
            (ForearmFk, "forearm.fk.{side}"),
            (HandFk, "hand.fk.{side}"),
            (UpperArmIk, "upper_arm.ik.{side}"),
            (ForearmIk, "forearm.ik.{side}"),
            (ElbowPole, "elbow.pt.ik.{side}"),
            (HandIk, "hand.ik.{side}"),
            (ThighFk, "thigh.fk.{side}"),
            (ShinFk, "shin.fk.{side}"),
            (FootFk, "foot.fk.{side}"),
            (ToeFk, "toe.fk.{side}"),
            (ThighIk, "thigh.ik.{side}"),
            (ShinIk, "shin.ik.{side}"),
            (KneePole, "knee.pt.ik.{side}"),
            (Ankle, "ankle.{side}"),
            (AnkleIk, "ankle.ik.{side}"),
            (FootIk, "foot.ik.{side}"),
            (FootRev, "foot.rev.{side}"),
            (ToeRev, "toe.rev.{side}"),
            (BallMarker, "ball.marker.{side}"),
            (ToeMarker, "toe.marker.{side}"),
            (HeelMarker, "heel.marker.{side}"),
            (Hips, "hips"),
            (Root, "root"),
        ];

        let mut profile = Self::new("MHX");
        for (role, pattern) in roles {
            profile = profile.with_role(role, pattern);
        }
        profile = profile
            .with_switch(SwitchKind::ArmIk, "MhaArmIk_{side}")
            .with_switch(SwitchKind::LegIk, "MhaLegIk_{side}")
            .with_switch(SwitchKind::LegIkToAnkle, "MhaLegIkToAnkle_{side}");

        // 0-7 与 16-23 层可见
        let mut layers = [false; LAYER_COUNT];
        for (i, layer) in layers.iter_mut().enumerate() {
            *layer = (i / 8) % 2 == 0;
        }
        profile.working_layers = layers;
        profile.arm_ik_layers = vec![2, 18];
        profile.arm_fk_layers = vec![3, 19];
        profile.leg_ik_layers = vec![4, 20];
        profile.leg_fk_layers = vec![5, 21];
        profile
    }

    pub fn with_role(mut self, role: BoneRole, pattern: impl Into<String>) -> Self {
        self.patterns.insert(role, pattern.into());
        self
    }

    pub fn with_switch(mut self, kind: SwitchKind, pattern: impl Into<String>) -> Self {
        self.switches.insert(kind, pattern.into());
        self
    }

    /// 角色对应的骨骼名，方案未定义该角色时返回 None
    pub fn bone_name(&self, role: BoneRole, side: Side) -> Option<String> {
        self.patterns
            .get(&role)
            .map(|pattern| pattern.replace("{side}", side.letter()))
    }

    /// 切换属性名
    pub fn switch_name(&self, kind: SwitchKind, side: Side) -> Option<String> {
        self.switches
            .get(&kind)
            .map(|pattern| pattern.replace("{side}", side.letter()))
    }

    /// 解析必需角色
    pub fn resolve(&self, rig: &Rig, role: BoneRole, side: Side) -> Result<usize> {
        let name = self.bone_name(role, side).ok_or_else(|| {
            RetargetError::UnsupportedRigTopology(format!(
                "profile '{}' has no bone for role {:?}",
                self.name, role
            ))
        })?;
        rig.bone_index(&name)
    }

    /// 解析可选角色：方案未定义时为 None，定义了但骨架缺失时报错
    pub fn resolve_optional(&self, rig: &Rig, role: BoneRole, side: Side) -> Result<Option<usize>> {
        match self.bone_name(role, side) {
            Some(name) => rig.bone_index(&name).map(Some),
            None => Ok(None),
        }
    }

    /// 解析足部标记（三个都存在才返回）
    pub fn resolve_markers(&self, rig: &Rig, side: Side) -> Option<FootMarkers> {
        let find = |role| {
            self.bone_name(role, side)
                .and_then(|name| rig.find_bone_by_name(&name))
        };
        Some(FootMarkers {
            ball: find(BoneRole::BallMarker)?,
            toe: find(BoneRole::ToeMarker)?,
            heel: find(BoneRole::HeelMarker)?,
        })
    }

    pub fn arm_fk(&self, rig: &Rig, side: Side) -> Result<ArmFkChain> {
        Ok(ArmFkChain {
            side,
            upper_arm: self.resolve(rig, BoneRole::UpperArmFk, side)?,
            forearm: self.resolve(rig, BoneRole::ForearmFk, side)?,
            hand: self.resolve(rig, BoneRole::HandFk, side)?,
        })
    }

    pub fn arm_ik(&self, rig: &Rig, side: Side) -> Result<ArmIkChain> {
        Ok(ArmIkChain {
            side,
            upper_arm: self.resolve(rig, BoneRole::UpperArmIk, side)?,
            forearm: self.resolve(rig, BoneRole::ForearmIk, side)?,
            effector: self.resolve_optional(rig, BoneRole::ArmEffectorIk, side)?,
            elbow_pole: self.resolve(rig, BoneRole::ElbowPole, side)?,
            hand: self.resolve(rig, BoneRole::HandIk, side)?,
        })
    }

    pub fn leg_fk(&self, rig: &Rig, side: Side) -> Result<LegFkChain> {
        Ok(LegFkChain {
            side,
            thigh: self.resolve(rig, BoneRole::ThighFk, side)?,
            shin: self.resolve(rig, BoneRole::ShinFk, side)?,
            foot: self.resolve(rig, BoneRole::FootFk, side)?,
            toe: self.resolve(rig, BoneRole::ToeFk, side)?,
        })
    }

    pub fn leg_ik(&self, rig: &Rig, side: Side) -> Result<LegIkChain> {
        Ok(LegIkChain {
            side,
            thigh: self.resolve(rig, BoneRole::ThighIk, side)?,
            shin: self.resolve(rig, BoneRole::ShinIk, side)?,
            knee_pole: self.resolve(rig, BoneRole::KneePole, side)?,
            ankle: self.resolve(rig, BoneRole::Ankle, side)?,
            ankle_ik: self.resolve(rig, BoneRole::AnkleIk, side)?,
            foot_ik: self.resolve(rig, BoneRole::FootIk, side)?,
            foot_rev: self.resolve(rig, BoneRole::FootRev, side)?,
            toe_rev: self.resolve(rig, BoneRole::ToeRev, side)?,
            markers: FootMarkers {
                ball: self.resolve(rig, BoneRole::BallMarker, side)?,
                toe: self.resolve(rig, BoneRole::ToeMarker, side)?,
                heel: self.resolve(rig, BoneRole::HeelMarker, side)?,
            },
        })
    }

    /// 按肢体与类型解析骨骼链
    pub fn chain(&self, rig: &Rig, limb: Limb, kind: ChainKind, side: Side) -> Result<LimbChain> {
        Ok(match (limb, kind) {
            (Limb::Arm, ChainKind::Fk) => LimbChain::ArmFk(self.arm_fk(rig, side)?),
            (Limb::Arm, ChainKind::Ik) => LimbChain::ArmIk(self.arm_ik(rig, side)?),
            (Limb::Leg, ChainKind::Fk) => LimbChain::LegFk(self.leg_fk(rig, side)?),
            (Limb::Leg, ChainKind::Ik) => LimbChain::LegIk(self.leg_ik(rig, side)?),
        })
    }

    /// 解析四肢的全部骨骼链（两侧、FK 与 IK）
    pub fn all_chains(&self, rig: &Rig) -> Result<Vec<LimbChain>> {
        let mut chains = Vec::with_capacity(8);
        for limb in [Limb::Arm, Limb::Leg] {
            for kind in [ChainKind::Ik, ChainKind::Fk] {
                for side in Side::BOTH {
                    chains.push(self.chain(rig, limb, kind, side)?);
                }
            }
        }
        Ok(chains)
    }

    /// 肢体对应的 IK / FK 图层
    pub fn layers_for(&self, limb: Limb, kind: ChainKind) -> &[usize] {
        match (limb, kind) {
            (Limb::Arm, ChainKind::Ik) => &self.arm_ik_layers,
            (Limb::Arm, ChainKind::Fk) => &self.arm_fk_layers,
            (Limb::Leg, ChainKind::Ik) => &self.leg_ik_layers,
            (Limb::Leg, ChainKind::Fk) => &self.leg_fk_layers,
        }
    }
}

impl Default for RigProfile {
    fn default() -> Self {
        Self::mhx()
    }
}

/// 足部接触标记
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FootMarkers {
    pub ball: usize,
    pub toe: usize,
    pub heel: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArmFkChain {
    pub side: Side,
    pub upper_arm: usize,
    pub forearm: usize,
    pub hand: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArmIkChain {
    pub side: Side,
    pub upper_arm: usize,
    pub forearm: usize,
    /// 末端执行器槽位（MHX 没有）
    pub effector: Option<usize>,
    pub elbow_pole: usize,
    pub hand: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegFkChain {
    pub side: Side,
    pub thigh: usize,
    pub shin: usize,
    pub foot: usize,
    pub toe: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LegIkChain {
    pub side: Side,
    pub thigh: usize,
    pub shin: usize,
    pub knee_pole: usize,
    pub ankle: usize,
    pub ankle_ik: usize,
    pub foot_ik: usize,
    pub foot_rev: usize,
    pub toe_rev: usize,
    pub markers: FootMarkers,
}

/// 肢体骨骼链
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LimbChain {
    ArmFk(ArmFkChain),
    ArmIk(ArmIkChain),
    LegFk(LegFkChain),
    LegIk(LegIkChain),
}

impl LimbChain {
    /// 链上全部骨骼
    pub fn bones(&self) -> Vec<usize> {
        match self {
            LimbChain::ArmFk(c) => vec![c.upper_arm, c.forearm, c.hand],
            LimbChain::ArmIk(c) => {
                let mut bones = vec![c.upper_arm, c.forearm];
                bones.extend(c.effector);
                bones.extend([c.elbow_pole, c.hand]);
                bones
            }
            LimbChain::LegFk(c) => vec![c.thigh, c.shin, c.foot, c.toe],
            LimbChain::LegIk(c) => vec![
                c.thigh,
                c.shin,
                c.knee_pole,
                c.ankle,
                c.ankle_ik,
                c.foot_ik,
                c.foot_rev,
                c.toe_rev,
                c.markers.ball,
                c.markers.toe,
                c.markers.heel,
            ],
        }
    }
}
