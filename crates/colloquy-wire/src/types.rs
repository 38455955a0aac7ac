use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

/// One message exchanged in the conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            metadata: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// Opaque identity payload supplied by the caller and echoed on every
/// request so the server can correlate turns to one logical conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDescriptor {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub email: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangePhase {
    Started,
    Active,
}

/// Request body for both calls; the server dispatches on `phase`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExchangeRequest {
    pub phase: ExchangePhase,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(rename = "identityDescriptor", skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<u32>,
}

impl ExchangeRequest {
    pub fn handshake(session_id: impl Into<String>, identity: Option<IdentityDescriptor>) -> Self {
        Self {
            phase: ExchangePhase::Started,
            session_id: session_id.into(),
            content: None,
            identity,
            stage: None,
        }
    }

    pub fn turn(
        session_id: impl Into<String>,
        content: impl Into<String>,
        identity: Option<IdentityDescriptor>,
        stage: u32,
    ) -> Self {
        Self {
            phase: ExchangePhase::Active,
            session_id: session_id.into(),
            content: Some(content.into()),
            identity,
            stage: Some(stage),
        }
    }
}

/// Monolithic response body. Every field is optional on the wire; callers
/// decide which absences are malformed for their phase.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ExchangeResponse {
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<Turn>>,
    #[serde(default)]
    pub response_content: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub stage: Option<u32>,
}

/// One record of an incremental response.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct StreamRecord {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub stage: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub done: bool,
}

impl StreamRecord {
    /// Failure text carried by this record, whichever field the server used.
    pub fn error_text(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.error_message.as_deref())
            .filter(|text| !text.is_empty())
    }
}
