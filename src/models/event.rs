// src/models/event.rs

use serde::{Deserialize, Serialize};

/// Something a chat user did, as forwarded by the chat gateway.
/// The sender identity travels separately, in the request's JWT.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    Start,
    RegisterKey {
        code: String,
        #[serde(default)]
        answers: Vec<String>,
    },
    ListTests,
    RequestDocument {
        code: String,
    },
    /// Inline keyboard press; `data` is the button payload.
    Button {
        data: String,
    },
    /// Free text, treated as an answer submission `CODE tok tok ...`.
    Text {
        text: String,
    },
    SubmitAnswers {
        code: String,
        answers: Vec<String>,
    },
    MyResults,
    TopUsers,
    UploadDocument {
        file_id: String,
    },
}

/// What the gateway should render back into the chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    Reply { text: String },
    /// One selectable button per code, each carrying `SEND_<code>`.
    TestList { title: String, codes: Vec<String> },
    Document { file_id: String, caption: String },
}

impl Outbound {
    pub fn reply(text: impl Into<String>) -> Self {
        Outbound::Reply { text: text.into() }
    }
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub replies: Vec<Outbound>,
}

/// A bot command advertised to the chat platform.
#[derive(Debug, Serialize)]
pub struct BotCommand {
    pub command: &'static str,
    pub description: &'static str,
}
