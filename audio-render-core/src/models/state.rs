use serde::{Deserialize, Serialize};

/// Render loop state machine.
///
/// State transitions:
/// ```text
/// idle → priming → running → stopping → idle
///           ↓
///         idle   (stream failed to start)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum RenderState {
    #[default]
    Idle = 0,
    Priming = 1,
    Running = 2,
    Stopping = 3,
}

impl RenderState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether the render thread is alive and owns the device.
    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Priming,
            2 => Self::Running,
            3 => Self::Stopping,
            _ => Self::Idle,
        }
    }
}
