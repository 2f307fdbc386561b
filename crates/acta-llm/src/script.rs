//! Scripted playback client for tests and offline demos.

use std::collections::VecDeque;
use std::sync::Mutex;

use acta_contracts::error::EndpointError;
use acta_core::traits::ReasoningClient;

/// Replays a fixed sequence of responses, ignoring the prompts.
///
/// Once only one response remains, it repeats forever. That makes "a model
/// that never terminates" trivially expressible: script one non-terminal
/// response and let the step budget trip.
pub struct ScriptedClient {
    responses: Mutex<VecDeque<String>>,
}

impl ScriptedClient {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
        }
    }

    /// Responses not yet consumed (the repeating final response counts once).
    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl ReasoningClient for ScriptedClient {
    fn complete(&self, _system: &str, _prompt: &str) -> Result<String, EndpointError> {
        let mut responses = self.responses.lock().map_err(|e| EndpointError::Transport {
            reason: format!("script lock poisoned: {}", e),
        })?;

        let response = if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().cloned()
        };
        response.ok_or_else(|| EndpointError::MalformedResponse {
            reason: "script is empty".to_string(),
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use acta_contracts::error::EndpointError;
    use acta_core::traits::ReasoningClient;

    use super::ScriptedClient;

    // ── Test cases ────────────────────────────────────────────────────────────

    #[test]
    fn test_script_plays_in_order() {
        let client = ScriptedClient::new(["first", "second"]);

        assert_eq!(client.complete("s", "p").unwrap(), "first");
        assert_eq!(client.complete("s", "p").unwrap(), "second");
    }

    #[test]
    fn test_final_response_repeats() {
        let client = ScriptedClient::new(["only"]);

        assert_eq!(client.complete("s", "p").unwrap(), "only");
        assert_eq!(client.complete("s", "p").unwrap(), "only");
        assert_eq!(client.complete("s", "p").unwrap(), "only");
        assert_eq!(client.remaining(), 1);
    }

    #[test]
    fn test_empty_script_is_a_malformed_response() {
        let client = ScriptedClient::new(Vec::<String>::new());

        assert!(matches!(
            client.complete("s", "p"),
            Err(EndpointError::MalformedResponse { .. })
        ));
    }
}
