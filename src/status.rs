//! Item lifecycle states and legal transitions.
//!
//! A report moves forward only: Lost -> Found -> Claimed. Claimed is
//! terminal. New reports start as Lost or Found, never Claimed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle stage of an item.
///
/// Wire-encoded as the integer ids `1`/`2`/`3` under the `status_id`
/// attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Lost,
    Found,
    Claimed,
}

impl Status {
    /// Wire id for this status.
    pub fn id(self) -> i64 {
        match self {
            Status::Lost => 1,
            Status::Found => 2,
            Status::Claimed => 3,
        }
    }

    /// Parse a wire id. Returns `None` for unknown ids.
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Status::Lost),
            2 => Some(Status::Found),
            3 => Some(Status::Claimed),
            _ => None,
        }
    }

    /// The next stage along the lifecycle, or `None` from the terminal state.
    pub fn next(self) -> Option<Self> {
        match self {
            Status::Lost => Some(Status::Found),
            Status::Found => Some(Status::Claimed),
            Status::Claimed => None,
        }
    }

    /// Whether no further transition exists.
    pub fn is_terminal(self) -> bool {
        self == Status::Claimed
    }

    /// Whether a new report may start in this state.
    pub fn is_initial(self) -> bool {
        matches!(self, Status::Lost | Status::Found)
    }

    /// Display name, as seeded in the status metadata table.
    pub fn name(self) -> &'static str {
        match self {
            Status::Lost => "Lost",
            Status::Found => "Found",
            Status::Claimed => "Claimed",
        }
    }

    /// Badge color, as seeded in the status metadata table.
    pub fn color(self) -> &'static str {
        match self {
            Status::Lost => "#dc3545",
            Status::Found => "#28a745",
            Status::Claimed => "#17a2b8",
        }
    }

    /// All states, in lifecycle order.
    pub fn all() -> [Status; 3] {
        [Status::Lost, Status::Found, Status::Claimed]
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_chain() {
        assert_eq!(Status::Lost.next(), Some(Status::Found));
        assert_eq!(Status::Found.next(), Some(Status::Claimed));
        assert_eq!(Status::Claimed.next(), None);
    }

    #[test]
    fn test_terminal() {
        assert!(!Status::Lost.is_terminal());
        assert!(!Status::Found.is_terminal());
        assert!(Status::Claimed.is_terminal());
    }

    #[test]
    fn test_initial_states() {
        assert!(Status::Lost.is_initial());
        assert!(Status::Found.is_initial());
        assert!(!Status::Claimed.is_initial());
    }

    #[test]
    fn test_wire_ids_roundtrip() {
        for status in Status::all() {
            assert_eq!(Status::from_id(status.id()), Some(status));
        }
        assert_eq!(Status::from_id(0), None);
        assert_eq!(Status::from_id(4), None);
    }
}
