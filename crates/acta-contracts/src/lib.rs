//! # acta-contracts
//!
//! Shared types, schemas, and contracts for the ACTA runtime.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate; only data definitions and error types.

pub mod action;
pub mod audit;
pub mod error;
pub mod observation;
pub mod run;

#[cfg(test)]
mod tests {
    use super::*;
    use action::Action;
    use audit::{AuditEntry, EventType};
    use error::{ActaError, EndpointError, ParseError};
    use observation::{FailureKind, Observation};
    use run::{RunId, RunState};
    use serde_json::json;

    // ── Action serde ─────────────────────────────────────────────────────────

    #[test]
    fn action_continue_serializes_with_tag_only() {
        let json = serde_json::to_string(&Action::Continue).unwrap();
        assert_eq!(json, r#"{"action":"CONTINUE"}"#);
    }

    #[test]
    fn action_tool_call_round_trips() {
        let original = Action::ToolCall {
            tool: "sql_extractor".to_string(),
            input: json!({"query": "SELECT * FROM transactions"}),
        };
        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains(r#""action":"TOOL_CALL""#));

        let decoded: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn action_final_answer_round_trips() {
        let original = Action::FinalAnswer {
            answer: json!("all transactions compliant"),
        };
        let json = serde_json::to_string(&original).unwrap();
        let decoded: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn only_final_answer_is_terminal() {
        assert!(Action::FinalAnswer { answer: json!(null) }.is_terminal());
        assert!(!Action::Continue.is_terminal());
        assert!(!Action::ToolCall {
            tool: "policy_lookup".to_string(),
            input: json!("CAPEX"),
        }
        .is_terminal());
    }

    // ── EventType wire names ─────────────────────────────────────────────────

    #[test]
    fn event_types_use_screaming_snake_case() {
        let cases = [
            (EventType::Init, r#""INIT""#),
            (EventType::LlmRaw, r#""LLM_RAW""#),
            (EventType::ToolResult, r#""TOOL_RESULT""#),
            (EventType::Error, r#""ERROR""#),
            (EventType::Final, r#""FINAL""#),
        ];
        for (event, expected) in cases {
            assert_eq!(serde_json::to_string(&event).unwrap(), expected);
        }
    }

    // ── Observation serde ────────────────────────────────────────────────────

    #[test]
    fn observation_success_round_trips() {
        let mut record = observation::Record::new();
        record.insert("vendor".to_string(), json!("Acme Corp"));
        record.insert("amount".to_string(), json!(7200.0));

        let original = Observation::success(vec![record]);
        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains(r#""status":"SUCCESS""#));

        let decoded: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn observation_failure_carries_kind_and_tool() {
        let original = Observation::failure(
            FailureKind::UnknownTool,
            Some("graph_db"),
            "no tool registered under 'graph_db'",
        );
        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains(r#""status":"FAILURE""#));
        assert!(json.contains(r#""kind":"UNKNOWN_TOOL""#));
        assert!(json.contains("graph_db"));

        let decoded: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(original, decoded);
        assert!(decoded.is_failure());
    }

    #[test]
    fn observation_success_is_not_failure() {
        assert!(!Observation::success(Vec::new()).is_failure());
    }

    // ── AuditEntry serde ─────────────────────────────────────────────────────

    #[test]
    fn audit_entry_serializes_event_type_as_type() {
        let entry = AuditEntry {
            timestamp: chrono::Utc::now(),
            run_id: RunId::new(),
            step_id: 3,
            event_type: EventType::ToolResult,
            payload: json!({"tool": "policy_lookup"}),
            prev_hash: "00".repeat(32),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""type":"TOOL_RESULT""#));

        let decoded: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, decoded);
    }

    // ── RunId / RunState ─────────────────────────────────────────────────────

    #[test]
    fn run_id_new_produces_unique_values() {
        let ids: Vec<RunId> = (0..100).map(|_| RunId::new()).collect();

        // All 100 IDs should be distinct.
        let unique: std::collections::HashSet<String> =
            ids.iter().map(|id| id.0.to_string()).collect();
        assert_eq!(unique.len(), 100);
    }

    #[test]
    fn only_running_is_non_terminal() {
        assert!(!RunState::Running.is_terminal());
        assert!(RunState::Finalized.is_terminal());
        assert!(RunState::Exhausted.is_terminal());
        assert!(RunState::Failed.is_terminal());
    }

    // ── Error display messages ───────────────────────────────────────────────

    #[test]
    fn error_reasoning_endpoint_display() {
        let err = ActaError::ReasoningEndpoint {
            reason: "request timed out after 120s".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("reasoning endpoint failed after retry"));
        assert!(msg.contains("timed out"));
    }

    #[test]
    fn error_audit_write_display() {
        let err = ActaError::AuditWrite {
            reason: "disk full".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("audit write failed"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn error_audit_corrupt_display() {
        let err = ActaError::AuditCorrupt {
            reason: "prev_hash mismatch at entry 4".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("audit chain corrupt"));
        assert!(msg.contains("entry 4"));
    }

    #[test]
    fn error_invalid_objective_display() {
        let err = ActaError::InvalidObjective {
            reason: "objective must not be empty".to_string(),
        };
        assert!(err.to_string().contains("objective must not be empty"));
    }

    #[test]
    fn endpoint_error_status_display() {
        let err = EndpointError::Status {
            status: 503,
            body: "model loading".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("model loading"));
    }

    #[test]
    fn parse_error_invalid_input_display() {
        let err = ParseError::InvalidInput {
            tool: "ml_classifier".to_string(),
            detail: "expected value at line 1 column 1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ml_classifier"));
        assert!(msg.contains("not valid JSON"));
    }
}
