//! 选中对象解析：一个骨架 + 可选的一个地面网格

use glam::Mat4;

use crate::floor::FloorPlane;
use crate::{Result, RetargetError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Armature,
    Mesh,
    Other,
}

/// 场景对象
#[derive(Clone, Debug)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub selected: bool,
    pub world_matrix: Mat4,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, kind: ObjectKind, world_matrix: Mat4) -> Self {
        Self {
            name: name.into(),
            kind,
            selected: true,
            world_matrix,
        }
    }
}

/// 返回选中骨架在 `objects` 中的索引，以及由选中网格得到的地面
///
/// 选中两个骨架、两个网格或没有骨架时返回 `AmbiguousSelection`。
pub fn pick_rig_and_plane(objects: &[SceneObject]) -> Result<(usize, Option<FloorPlane>)> {
    let mut rig: Option<usize> = None;
    let mut plane: Option<usize> = None;

    for (i, ob) in objects.iter().enumerate().filter(|(_, ob)| ob.selected) {
        let slot = match ob.kind {
            ObjectKind::Armature => &mut rig,
            ObjectKind::Mesh => &mut plane,
            ObjectKind::Other => continue,
        };
        if let Some(prev) = *slot {
            let what = if ob.kind == ObjectKind::Armature { "armatures" } else { "meshes" };
            return Err(RetargetError::AmbiguousSelection(format!(
                "two {} selected: {} and {}",
                what, objects[prev].name, ob.name
            )));
        }
        *slot = Some(i);
    }

    let rig = rig.ok_or_else(|| RetargetError::AmbiguousSelection("no rig selected".into()))?;
    let plane = match plane {
        Some(i) => Some(FloorPlane::from_world_matrix(&objects[i].world_matrix)?),
        None => None,
    };
    Ok((rig, plane))
}
