//! Status returned by behavior nodes.

use std::fmt;

/// The result of ticking a behavior node.
///
/// # Lifecycle
///
/// - `Idle` is the state of a node that has not been ticked yet, or that was
///   halted / reset after completing.
/// - `Running` means the node started work that has not finished; the node
///   must be ticked again (never re-constructed) to make progress.
/// - `Success` and `Failure` are terminal for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeStatus {
    /// Not ticked yet, or reset by a halt.
    #[default]
    Idle,

    /// Asynchronous work in progress; tick again later.
    Running,

    /// The behavior completed successfully.
    ///
    /// For conditions: The condition was met.
    /// For actions: The action executed without errors.
    Success,

    /// The behavior failed.
    ///
    /// For conditions: The condition was not met.
    /// For actions: The action could not be executed.
    Failure,
}

impl NodeStatus {
    /// Returns `true` if this status is `Success`.
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, NodeStatus::Success)
    }

    /// Returns `true` if this status is `Failure`.
    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, NodeStatus::Failure)
    }

    /// Returns `true` if this status is `Running`.
    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, NodeStatus::Running)
    }

    /// Returns `true` for the terminal statuses `Success` and `Failure`.
    #[inline]
    pub fn is_completed(self) -> bool {
        matches!(self, NodeStatus::Success | NodeStatus::Failure)
    }

    /// Inverts the status: Success becomes Failure and vice versa.
    ///
    /// `Running` and `Idle` are returned unchanged.
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            NodeStatus::Success => NodeStatus::Failure,
            NodeStatus::Failure => NodeStatus::Success,
            other => other,
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeStatus::Idle => "IDLE",
            NodeStatus::Running => "RUNNING",
            NodeStatus::Success => "SUCCESS",
            NodeStatus::Failure => "FAILURE",
        };
        f.write_str(label)
    }
}
