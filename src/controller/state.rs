use serde::{Deserialize, Serialize};
use std::fmt;

/// How one dataset is currently rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderState {
    /// Nothing rendered: no groups, not built yet, or the build failed
    #[default]
    Absent,
    /// Groups aggregated on the dataset's own cluster layer
    Clustered,
    /// Groups drawn individually on the shared marker layer
    Flat,
}

impl RenderState {
    /// State a dataset with `group_count` groups should be in at `zoom`.
    /// Zoom levels `<= threshold` cluster.
    pub fn target(zoom: f64, group_count: usize, threshold: f64) -> Self {
        if group_count == 0 {
            RenderState::Absent
        } else if zoom <= threshold {
            RenderState::Clustered
        } else {
            RenderState::Flat
        }
    }

    pub fn is_rendered(&self) -> bool {
        !matches!(self, RenderState::Absent)
    }
}

impl fmt::Display for RenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderState::Absent => write!(f, "absent"),
            RenderState::Clustered => write!(f, "clustered"),
            RenderState::Flat => write!(f, "flat"),
        }
    }
}
