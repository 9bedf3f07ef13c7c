//! OpenAI chat request -> gateway request.
//!
//! The gateway has no notion of a message list. A conversation is folded
//! into three fields:
//!
//! | messages | `system_msg` | `history`            | `prompt` |
//! |----------|--------------|----------------------|----------|
//! | 1        | -            | -                    | m[0]     |
//! | 2        | m[0]         | -                    | m[1]     |
//! | n >= 3   | m[0]         | m[1..n-1] as JSON    | m[n-1]   |

use crate::domain::{ChatMessage, ChatRequest, GatewayRequest};
use crate::error::CoreError;

/// Translate an inbound chat request.
///
/// # Errors
///
/// Returns [`CoreError::InvalidRequest`] when `messages` is empty.
pub fn translate_request(request: &ChatRequest) -> Result<GatewayRequest, CoreError> {
    let messages = &request.messages;
    let Some(last) = messages.last() else {
        return Err(CoreError::InvalidRequest(
            "messages must contain at least one message".to_string(),
        ));
    };

    let system_msg = (messages.len() >= 2).then(|| messages[0].content.clone());
    let history = if messages.len() >= 3 {
        Some(history_from_messages(&messages[1..messages.len() - 1])?)
    } else {
        None
    };

    Ok(GatewayRequest {
        model_id: Some(request.model.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string),
        prompt: last.content.clone(),
        system_msg,
        history,
        // Zero means "unset" for both knobs; forwarding it would override
        // the gateway's own default.
        max_tokens: request.max_tokens.filter(|&n| n > 0),
        temperature: request.temperature.filter(|&t| t != 0.0),
        stream: request.stream,
    })
}

/// Render turns as a JSON array of `"role: content"` strings.
fn history_from_messages(messages: &[ChatMessage]) -> Result<String, CoreError> {
    let turns: Vec<String> = messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect();
    serde_json::to_string(&turns).map_err(|e| CoreError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn request(messages: Vec<ChatMessage>) -> ChatRequest {
        serde_json::from_value(serde_json::json!({
            "model": "meta-llama/Llama-3.1-8B-Instruct",
            "messages": messages,
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_messages_rejected() {
        let err = translate_request(&request(vec![])).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest(_)));
    }

    #[test]
    fn test_single_message_is_prompt_only() {
        let req = request(vec![ChatMessage::new(Role::System, "be brief")]);
        let out = translate_request(&req).unwrap();
        assert_eq!(out.prompt, "be brief");
        assert_eq!(out.system_msg, None);
        assert_eq!(out.history, None);
    }

    #[test]
    fn test_two_messages() {
        let req = request(vec![
            ChatMessage::new(Role::System, "A"),
            ChatMessage::new(Role::User, "B"),
        ]);
        let out = translate_request(&req).unwrap();
        assert_eq!(out.system_msg.as_deref(), Some("A"));
        assert_eq!(out.prompt, "B");
        assert_eq!(out.history, None);
    }

    #[test]
    fn test_history_holds_middle_turns_in_order() {
        let req = request(vec![
            ChatMessage::new(Role::System, "sys"),
            ChatMessage::new(Role::User, "hi"),
            ChatMessage::new(Role::Assistant, "hello"),
            ChatMessage::new(Role::User, "how are you?"),
        ]);
        let out = translate_request(&req).unwrap();
        assert_eq!(out.system_msg.as_deref(), Some("sys"));
        assert_eq!(out.prompt, "how are you?");

        let history: Vec<String> = serde_json::from_str(out.history.as_deref().unwrap()).unwrap();
        assert_eq!(history, vec!["user: hi", "assistant: hello"]);
    }

    #[test]
    fn test_three_messages_history_has_one_entry() {
        let req = request(vec![
            ChatMessage::new(Role::System, "s"),
            ChatMessage::new(Role::User, "say \"quoted\""),
            ChatMessage::new(Role::User, "z"),
        ]);
        let out = translate_request(&req).unwrap();
        assert_eq!(out.history.as_deref(), Some(r#"["user: say \"quoted\""]"#));
    }

    #[test]
    fn test_optional_knobs() {
        let mut req = request(vec![ChatMessage::new(Role::User, "x")]);
        let out = translate_request(&req).unwrap();
        assert_eq!(out.max_tokens, None);
        assert_eq!(out.temperature, None);
        assert!(!out.stream);

        req.max_tokens = Some(0);
        req.temperature = Some(0.0);
        let out = translate_request(&req).unwrap();
        assert_eq!(out.max_tokens, None);
        assert_eq!(out.temperature, None);

        req.max_tokens = Some(256);
        req.temperature = Some(0.7);
        req.stream = true;
        let out = translate_request(&req).unwrap();
        assert_eq!(out.max_tokens, Some(256));
        assert_eq!(out.temperature, Some(0.7));
        assert!(out.stream);
    }

    #[test]
    fn test_model_forwarded_unless_blank() {
        let mut req = request(vec![ChatMessage::new(Role::User, "x")]);
        assert_eq!(
            translate_request(&req).unwrap().model_id.as_deref(),
            Some("meta-llama/Llama-3.1-8B-Instruct")
        );
        req.model = "  ".to_string();
        assert_eq!(translate_request(&req).unwrap().model_id, None);
    }
}
