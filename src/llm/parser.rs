//! Parse oracle replies into validated structures
//!
//! The oracle is untrusted: replies may wrap the JSON object in prose, omit
//! required fields or use unknown action names. Everything is checked here
//! before a reply reaches simulation state.

use serde::{Deserialize, Serialize};

use crate::core::error::{DecisionError, Result, SimError};
use crate::decision::{ActionKind, Decision, DecisionTarget};
use crate::llm::client::CompletionBackend;
use crate::llm::context::WorldSummary;

/// Extract JSON object from a reply (handles surrounding text)
pub fn extract_json(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start < end).then(|| &response[start..=end])
}

#[derive(Deserialize)]
struct RawDecision {
    message: Option<String>,
    action: Option<String>,
    target: Option<DecisionTarget>,
    #[serde(default)]
    speech: Option<String>,
}

/// Validate an oracle reply against the decision schema
pub fn parse_decision(response: &str) -> std::result::Result<Decision, DecisionError> {
    let json = extract_json(response)
        .ok_or_else(|| DecisionError::InvalidPayload("no JSON object in reply".into()))?;

    let raw: RawDecision = serde_json::from_str(json)
        .map_err(|e| DecisionError::InvalidPayload(e.to_string()))?;

    let action = raw
        .action
        .ok_or_else(|| DecisionError::InvalidPayload("missing field `action`".into()))?;
    let action: ActionKind = serde_json::from_value(serde_json::Value::String(
        action.trim().to_lowercase(),
    ))
    .map_err(|_| DecisionError::InvalidPayload(format!("unknown action `{}`", action)))?;

    let message = raw
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| DecisionError::InvalidPayload("missing field `message`".into()))?;

    // Absent and `null` both land here
    let target = raw
        .target
        .ok_or_else(|| DecisionError::InvalidPayload("missing field `target`".into()))?;

    let mut decision = Decision::new(action, target, message);
    if let Some(speech) = raw.speech.filter(|s| !s.trim().is_empty()) {
        decision = decision.with_speech(speech);
    }
    Ok(decision)
}

/// Urgency an oracle attaches to a decree
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecreePriority {
    Low,
    Medium,
    High,
}

/// A world-level directive issued in response to an observer's prompt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Decree {
    pub message: String,
    /// Free-form action lines, e.g. `spawn Gatherers 3`
    pub actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_entities: Option<Vec<String>>,
    pub priority: DecreePriority,
}

pub fn parse_decree(response: &str) -> Result<Decree> {
    let json = extract_json(response)
        .ok_or_else(|| SimError::Llm("No JSON found in response".into()))?;
    serde_json::from_str(json).map_err(|e| {
        SimError::Llm(format!(
            "Failed to parse decree: {} - Response: {}",
            e, response
        ))
    })
}

/// Ask the oracle to rule on `prompt` given the current society
pub async fn request_decree<B: CompletionBackend + ?Sized>(
    backend: &B,
    prompt: &str,
    world: &WorldSummary,
) -> Result<Decree> {
    let user_prompt = format!(
        "CURRENT WORLD:\n{}\n\nOBSERVER REQUEST:\n{}\n\nRespond with a decree in JSON:",
        world.summary(),
        prompt
    );

    let response = backend.complete(DECREE_SYSTEM_PROMPT, &user_prompt).await?;
    parse_decree(&response)
}

const DECREE_SYSTEM_PROMPT: &str = r#"You oversee a small simulated society of Gatherers, Builders, Explorers and Traders.
An observer asks you to intervene. Answer with a decree.

AVAILABLE ACTIONS (one per line in "actions"):
- spawn <Species> [count]   add new agents, count defaults to 1
- remove <agent-id>         take an agent out of the world

OUTPUT FORMAT (JSON only, no explanation):
{
  "message": "what you announce to the world",
  "actions": ["spawn Explorers 2"],
  "affectedEntities": ["agent ids you refer to"] or omitted,
  "priority": "low|medium|high"
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::world::biome::ResourceKind;

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = "Sure!\n{\"action\": \"build\"}\nAnything else?";
        assert_eq!(extract_json(response), Some("{\"action\": \"build\"}"));
        assert_eq!(extract_json("no braces here"), None);
        assert_eq!(extract_json("} backwards {"), None);
    }

    #[test]
    fn test_parse_full_decision() {
        let reply = r#"{
            "message": "Heading to the forest",
            "action": "Gather",
            "target": {"resource": "wood"},
            "speech": "Wood for the winter!"
        }"#;
        let decision = parse_decision(reply).unwrap();
        assert_eq!(decision.action, ActionKind::Gather);
        assert_eq!(decision.target.resource, Some(ResourceKind::Wood));
        assert_eq!(decision.speech.as_deref(), Some("Wood for the winter!"));
    }

    #[test]
    fn test_missing_action_is_invalid() {
        let err = parse_decision(r#"{"message": "hmm"}"#).unwrap_err();
        assert!(matches!(err, DecisionError::InvalidPayload(m) if m.contains("action")));
    }

    #[test]
    fn test_unknown_action_is_invalid() {
        let err = parse_decision(r#"{"message": "x", "action": "fly"}"#).unwrap_err();
        assert!(matches!(err, DecisionError::InvalidPayload(_)));
    }

    #[test]
    fn test_missing_or_null_target_is_invalid() {
        for reply in [
            r#"{"message": "m", "action": "move"}"#,
            r#"{"message": "m", "action": "move", "target": null}"#,
        ] {
            let err = parse_decision(reply).unwrap_err();
            assert!(matches!(err, DecisionError::InvalidPayload(m) if m.contains("target")));
        }
    }

    #[test]
    fn test_empty_target_accepted_and_blank_speech_dropped() {
        let decision = parse_decision(
            r#"{"message": "resting", "action": "explore", "target": {}, "speech": "  "}"#,
        )
        .unwrap();
        assert_eq!(decision.target, DecisionTarget::default());
        assert_eq!(decision.speech, None);
    }

    #[test]
    fn test_decree_deserialization() {
        let decree = parse_decree(
            r#"{"message": "Let there be explorers", "actions": ["spawn Explorers 2"],
                "affectedEntities": ["Explorers-1"], "priority": "high"}"#,
        )
        .unwrap();
        assert_eq!(decree.actions, vec!["spawn Explorers 2".to_string()]);
        assert_eq!(decree.priority, DecreePriority::High);
        assert_eq!(decree.affected_entities, Some(vec!["Explorers-1".to_string()]));

        let minimal =
            parse_decree(r#"{"message": "Peace", "actions": [], "priority": "medium"}"#).unwrap();
        assert_eq!(minimal.priority, DecreePriority::Medium);
        assert!(minimal.actions.is_empty());
        assert_eq!(minimal.affected_entities, None);
    }

    #[test]
    fn test_decree_missing_required_fields_rejected() {
        assert!(matches!(parse_decree(r#"{"message": "m"}"#), Err(SimError::Llm(_))));
        assert!(parse_decree(r#"{"message": "m", "actions": []}"#).is_err());
        assert!(parse_decree(r#"{"message": "m", "priority": "low"}"#).is_err());
    }

    struct Canned(&'static str);

    #[async_trait]
    impl CompletionBackend for Canned {
        async fn complete(&self, _system: &str, user: &str) -> Result<String> {
            assert!(user.contains("OBSERVER REQUEST"));
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_request_decree_round_trip() {
        let world = WorldSummary {
            current_tick: 3,
            population: vec![],
            named_agents: vec![],
            recent_events: vec![],
        };
        let backend = Canned(r#"Decree: {"message": "Rain falls", "actions": [], "priority": "low"}"#);
        let decree = request_decree(&backend, "make it rain", &world).await.unwrap();
        assert_eq!(decree.message, "Rain falls");
        assert_eq!(decree.priority, DecreePriority::Low);
    }
}
