//! Conversation Driver
//!
//! The single state machine shared by every adapter:
//!
//! ```text
//! START -> REQUEST_SENT -> no tool calls ....... DONE (assistant reply)
//!                       -> tool calls ........... execute each
//!                            all ok ............. DONE (tool results)
//!                            unknown tool, 1st .. RETRY without descriptors
//!                            anything else ...... FAILED
//! ```
//!
//! The retry path is terminal: whatever the second request produces is the
//! final outcome, and a third request is never made.

use async_trait::async_trait;
use serde_json::{Map, Value};

use llmkit_core::{Conversation, FunctionCall, LlmError, Message, PromptResponse, Result, Role, ToolCall};

/// One round trip to a provider's chat endpoint: serialize, send, decode,
/// settle. Implemented by each adapter; `disable_tools` omits the tool
/// descriptors from the outgoing request.
#[async_trait]
pub(crate) trait ChatRoundTrip: Send + Sync {
    async fn chat_round_trip(
        &self,
        conversation: &mut Conversation,
        disable_tools: bool,
    ) -> Result<PromptResponse>;
}

/// Run a full converse exchange, recovering once from a hallucinated tool
/// call by re-issuing the request with tool descriptors omitted.
pub(crate) async fn drive<B: ChatRoundTrip>(
    backend: &B,
    conversation: &mut Conversation,
) -> Result<PromptResponse> {
    match backend.chat_round_trip(conversation, false).await {
        Err(LlmError::ToolNotFound(tool)) => {
            tracing::warn!(
                tool = %tool,
                "model requested an unregistered tool; retrying once without tool descriptors"
            );
            backend.chat_round_trip(conversation, true).await
        }
        result => result,
    }
}

/// A tool call as the provider asked for it, normalized across wire formats.
///
/// `envelope` is the provider-native JSON for this call, echoed back into
/// the conversation so the provider can replay it on a later turn.
pub(crate) struct ToolCallRequest {
    pub id: Option<String>,
    pub name: String,
    pub arguments: Map<String, Value>,
    pub envelope: Value,
}

/// A decoded chat response, reduced to what the driver needs.
pub(crate) struct ChatReply {
    pub content: String,
    pub tool_calls: Vec<ToolCallRequest>,
}

/// Settle a decoded reply against the conversation.
///
/// With no tool calls, the assistant reply is appended and returned. With
/// tool calls, the whole batch is executed before the conversation is
/// touched, so any failure aborts with the message log exactly as it was;
/// on success each call appends its assistant-envelope/tool-result pair.
pub(crate) fn settle_reply(
    conversation: &mut Conversation,
    reply: ChatReply,
) -> Result<PromptResponse> {
    if reply.tool_calls.is_empty() {
        conversation.add_message(Role::Assistant, reply.content.as_str());
        return Ok(PromptResponse {
            role: Role::Assistant,
            content: reply.content,
            tool_calls: Vec::new(),
        });
    }

    let mut outputs = Vec::with_capacity(reply.tool_calls.len());
    for call in &reply.tool_calls {
        let output = conversation.tools().execute(&call.name, &call.arguments)?;
        outputs.push(output);
    }

    let mut records = Vec::with_capacity(outputs.len());
    for (call, output) in reply.tool_calls.into_iter().zip(outputs) {
        conversation.append_message(
            Message::assistant("").with_field("tool_calls", Value::Array(vec![call.envelope])),
        );

        let mut result_message = Message::tool(output.as_str());
        if let Some(id) = &call.id {
            result_message = result_message.with_field("tool_call_id", Value::String(id.clone()));
        }
        conversation.append_message(result_message);

        records.push(ToolCall {
            function: FunctionCall {
                name: call.name,
                arguments: call.arguments,
                result: Some(output),
            },
        });
    }

    Ok(PromptResponse {
        role: Role::Tool,
        content: String::new(),
        tool_calls: records,
    })
}
