//! Control messages from the foreground app.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A recognized control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// Activate the waiting worker now.
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
}

impl ControlMessage {
    /// Parse a posted message. Anything unrecognized is ignored.
    pub fn parse(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Encode for posting.
    pub fn to_value(self) -> Value {
        serde_json::json!(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_skip_waiting() {
        assert_eq!(
            ControlMessage::parse(&json!({"type": "SKIP_WAITING"})),
            Some(ControlMessage::SkipWaiting)
        );
    }

    #[test]
    fn test_ignores_other_shapes() {
        assert_eq!(ControlMessage::parse(&json!(null)), None);
        assert_eq!(ControlMessage::parse(&json!("SKIP_WAITING")), None);
        assert_eq!(ControlMessage::parse(&json!({})), None);
        assert_eq!(ControlMessage::parse(&json!({"type": "skip_waiting"})), None);
        assert_eq!(ControlMessage::parse(&json!({"type": "RELOAD"})), None);
        assert_eq!(ControlMessage::parse(&json!({"type": 1})), None);
        assert_eq!(ControlMessage::parse(&json!([1, 2])), None);
    }

    #[test]
    fn test_to_value() {
        assert_eq!(
            ControlMessage::SkipWaiting.to_value(),
            json!({"type": "SKIP_WAITING"})
        );
    }
}
