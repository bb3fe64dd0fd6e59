//! 骨架系统：骨骼、约束、两骨 IK 求解与命名方案

mod bone;
mod constraint;
mod ik_solver;
mod manager;
mod profile;

pub use bone::Bone;
pub use constraint::{BoneConstraint, ConstraintKind, IkConstraint, LimitRotation};
pub use ik_solver::TwoBoneIkSolver;
pub use manager::{Rig, LAYER_COUNT};
pub use profile::{
    ArmFkChain, ArmIkChain, BoneRole, ChainKind, FootMarkers, LegFkChain, LegIkChain, Limb, LimbChain,
    RigProfile, Side, SwitchKind,
};

pub use crate::math::{EulerOrder, RotationMode};
