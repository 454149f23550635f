//! Outgoing ChatKit request payloads.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::common::config::ApiConfig;
use crate::common::ids::ThreadId;

/// A ChatKit request, tagged by its `type` field.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ChatKitRequest {
    /// Start a new thread with the first user message.
    #[serde(rename = "threads.create")]
    CreateThread {
        /// Request parameters.
        params: CreateThreadParams,
        /// Workflow metadata.
        metadata: WorkflowMetadata,
        /// Workflow identifier, repeated at the top level.
        workflow_id: String,
    },
    /// Append a user message to an existing thread.
    #[serde(rename = "threads.add_user_message")]
    AddUserMessage {
        /// Request parameters.
        params: AddUserMessageParams,
        /// Workflow metadata.
        metadata: WorkflowMetadata,
        /// Workflow identifier, repeated at the top level.
        workflow_id: String,
    },
}

impl ChatKitRequest {
    /// Build the request for `user_text`, continuing `thread` when one is active.
    #[must_use]
    pub fn for_thread(thread: Option<&ThreadId>, user_text: &str, config: &ApiConfig) -> Self {
        let input = UserInput::text(user_text);
        let metadata = WorkflowMetadata::from_config(config);
        let workflow_id = config.workflow_id.clone();

        match thread {
            Some(thread_id) => Self::AddUserMessage {
                params: AddUserMessageParams {
                    thread_id: thread_id.clone(),
                    input,
                },
                metadata,
                workflow_id,
            },
            None => Self::CreateThread {
                params: CreateThreadParams { input },
                metadata,
                workflow_id,
            },
        }
    }

    /// Wire name of the request type.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CreateThread { .. } => "threads.create",
            Self::AddUserMessage { .. } => "threads.add_user_message",
        }
    }

    /// Thread the request targets, if any.
    #[must_use]
    pub const fn thread_id(&self) -> Option<&ThreadId> {
        match self {
            Self::CreateThread { .. } => None,
            Self::AddUserMessage { params, .. } => Some(&params.thread_id),
        }
    }
}

/// Parameters of `threads.create`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreateThreadParams {
    /// First user message.
    pub input: UserInput,
}

/// Parameters of `threads.add_user_message`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AddUserMessageParams {
    /// Target thread.
    pub thread_id: ThreadId,
    /// User message.
    pub input: UserInput,
}

/// Workflow metadata attached to every request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WorkflowMetadata {
    /// Workflow identifier.
    pub workflow_id: String,
    /// Workflow display name.
    pub workflow_name: String,
}

impl WorkflowMetadata {
    fn from_config(config: &ApiConfig) -> Self {
        Self {
            workflow_id: config.workflow_id.clone(),
            workflow_name: config.workflow_name.clone(),
        }
    }
}

/// A user message in ChatKit input format.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserInput {
    /// Content parts.
    pub content: Vec<InputContent>,
    /// Attachments (always empty for text input).
    pub attachments: Vec<Value>,
    /// Quoted text, if the user replied to a fragment.
    pub quoted_text: Option<String>,
    /// Per-request inference options.
    pub inference_options: Map<String, Value>,
}

impl UserInput {
    /// Plain-text input without attachments.
    #[must_use]
    pub fn text(text: &str) -> Self {
        Self {
            content: vec![InputContent::InputText {
                text: text.to_string(),
            }],
            attachments: Vec::new(),
            quoted_text: None,
            inference_options: Map::new(),
        }
    }
}

/// One content part of a user message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputContent {
    /// Plain text.
    InputText {
        /// The text.
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> ApiConfig {
        ApiConfig::new("wf-1").with_workflow_name("Orcheo Bot")
    }

    #[test]
    fn test_create_thread_shape() {
        let request = ChatKitRequest::for_thread(None, "Hello", &config());
        assert_eq!(request.kind(), "threads.create");
        assert_eq!(request.thread_id(), None);

        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            json!({
                "type": "threads.create",
                "params": {
                    "input": {
                        "content": [{"type": "input_text", "text": "Hello"}],
                        "attachments": [],
                        "quoted_text": null,
                        "inference_options": {}
                    }
                },
                "metadata": {"workflow_id": "wf-1", "workflow_name": "Orcheo Bot"},
                "workflow_id": "wf-1"
            })
        );
    }

    #[test]
    fn test_add_user_message_shape() {
        let thread = ThreadId::new("t1").expect("valid id");
        let request = ChatKitRequest::for_thread(Some(&thread), "More", &config());
        assert_eq!(request.kind(), "threads.add_user_message");
        assert_eq!(request.thread_id(), Some(&thread));

        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value["type"], "threads.add_user_message");
        assert_eq!(value["params"]["thread_id"], "t1");
        assert_eq!(value["params"]["input"]["content"][0]["text"], "More");
        assert_eq!(value["metadata"]["workflow_name"], "Orcheo Bot");
        assert_eq!(value["workflow_id"], "wf-1");
    }
}
