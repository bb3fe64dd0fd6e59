//! FK/IK 吸附：极向目标、单帧肢体匹配、整段传递与切换开关

mod bend;
mod limb;
mod pole;
mod switch;
mod transfer;

pub use bend::limbs_bend_positive;
pub use pole::solve_pole_point;
pub use switch::{clear_animation, clear_pole_targets, leg_ik_active, set_ik_switch};
pub use transfer::{transfer_fk_to_ik, transfer_ik_to_fk, TransferOptions};
