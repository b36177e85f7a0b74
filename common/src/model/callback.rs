//! Payloads exchanged with the editing server's save callback.
//!
//! Apart from `status`, every field is optional: the editing server decides
//! what to include for each status, so nothing here is assumed present.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/Document/{id}/callback`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallbackPayload {
    pub status: i32,
    #[serde(default)]
    pub key: Option<String>,
    /// Download location of the saved document.
    #[serde(default)]
    pub url: Option<String>,
    /// Download location of the change-history archive.
    #[serde(default)]
    pub changesurl: Option<String>,
    #[serde(default)]
    pub history: Option<serde_json::Value>,
    /// Editor user ids, most recent editor first.
    #[serde(default)]
    pub users: Option<Vec<String>>,
    #[serde(default)]
    pub actions: Option<Vec<CallbackAction>>,
    #[serde(default)]
    pub forcesavetype: Option<i32>,
    /// Location of the submitted form values (force-save type 3).
    #[serde(default)]
    pub formsdataurl: Option<String>,
}

/// A user connecting to or leaving a co-editing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackAction {
    /// 0 = disconnected, 1 = connected, 2 = clicked force-save.
    #[serde(rename = "type")]
    pub action_type: i32,
    #[serde(default)]
    pub userid: Option<String>,
}

/// The answer the editing server expects: `{"error":0}` on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackResponse {
    pub error: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CallbackResponse {
    pub fn ok() -> Self {
        CallbackResponse {
            error: 0,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        CallbackResponse {
            error: 1,
            message: Some(message.into()),
        }
    }
}

/// One entry of the form-data document referenced by `formsdataurl`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedField {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_payload_only_needs_status() {
        let payload: CallbackPayload = serde_json::from_str(r#"{"status":4}"#).unwrap();
        assert_eq!(payload.status, 4);
        assert!(payload.url.is_none());
        assert!(payload.actions.is_none());
    }

    #[test]
    fn actions_use_type_and_userid() {
        let payload: CallbackPayload = serde_json::from_str(
            r#"{"status":1,"key":"k","actions":[{"type":1,"userid":"u1"}],"users":["u1"]}"#,
        )
        .unwrap();
        let actions = payload.actions.unwrap();
        assert_eq!(actions[0].action_type, 1);
        assert_eq!(actions[0].userid.as_deref(), Some("u1"));
    }

    #[test]
    fn success_response_omits_message() {
        let json = serde_json::to_string(&CallbackResponse::ok()).unwrap();
        assert_eq!(json, r#"{"error":0}"#);
    }
}
