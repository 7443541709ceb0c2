use serde::{Deserialize, Serialize};

/// Topic metadata reported by the backend during a stream.
///
/// The wire shape is an open object; only the fields the client acts on are
/// kept, everything else is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
