//! 时间轴与标记

/// 时间轴标记
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Marker {
    pub name: String,
    pub frame: i32,
    pub selected: bool,
}

/// 场景时间轴
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    pub current_frame: i32,
    pub markers: Vec<Marker>,
}

impl Timeline {
    pub fn new(current_frame: i32) -> Self {
        Self {
            current_frame,
            markers: Vec::new(),
        }
    }

    pub fn add_marker(&mut self, name: impl Into<String>, frame: i32, selected: bool) {
        self.markers.push(Marker {
            name: name.into(),
            frame,
            selected,
        });
    }

    /// 首尾两个选中标记的帧号；选中标记少于两个时返回 None
    pub fn marked_range(&self) -> Option<(i32, i32)> {
        let mut frames: Vec<i32> = self
            .markers
            .iter()
            .filter(|m| m.selected)
            .map(|m| m.frame)
            .collect();
        if frames.len() < 2 {
            return None;
        }
        frames.sort_unstable();
        Some((frames[0], frames[frames.len() - 1]))
    }
}
