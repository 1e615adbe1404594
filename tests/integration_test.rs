use machine_spirit::*;
use machine_spirit::config::{Config, OrchestratorConfig};
use machine_spirit::self_model::{
    Confidence, Metadata, Patch, SensoryUpdate, Verbosity, NARRATIVE_EXPORT_LIMIT,
};
use machine_spirit::session::Role;
use serde_json::json;

/// Test the full chat flow: request → pipeline → response envelope
#[test]
fn test_chat_flow_dev_mode() {
    let mut orch = Orchestrator::new(SelfModel::new(), OrchestratorConfig::default());

    let resp = orch.handle_message("s1", "u1", "hello", Some(Mode::Dev), None);

    assert_eq!(
        resp.reply,
        "[DEV] Machine Spirit has received: 'hello'. Real reasoning core not wired yet."
    );
    assert_eq!(resp.mode, Mode::Dev);
    assert_eq!(resp.epistemic.confidence, Confidence::Low);
    assert_eq!(resp.epistemic.sources, vec!["internal_stub".to_string()]);

    let history = orch.get_conversation_history("s1");
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].content, resp.reply);
}

/// Test the serialized response matches what a transport layer would send
#[test]
fn test_response_wire_shape() {
    let mut orch = Orchestrator::new(SelfModel::new(), OrchestratorConfig::default());
    let request: ChatRequest = serde_json::from_value(json!({
        "session_id": "web-1",
        "user_id": "alice",
        "text": "status report",
        "mode": "OPS",
        "metadata": {"client": "browser"}
    }))
    .unwrap();

    let resp = orch.handle_request(request).unwrap();
    let wire = serde_json::to_value(&resp).unwrap();

    assert_eq!(wire["mode"], "OPS");
    assert_eq!(wire["epistemic"]["sources"], json!(["internal_stub"]));
    assert_eq!(wire["self_state"]["runtime"]["current_mode"], "OPS");
    assert_eq!(wire["self_state"]["behavior"]["formality"], "professional");
    assert_eq!(wire["self_state"]["last_epistemic"]["confidence"], "low");

    let history = orch.get_conversation_history("web-1");
    assert_eq!(history[0].metadata["client"], "browser");
}

/// Test an invalid mode is rejected at the boundary with no side effects
#[test]
fn test_invalid_mode_rejected() {
    let mut orch = Orchestrator::new(SelfModel::new(), OrchestratorConfig::default());
    let request = ChatRequest {
        session_id: "s1".to_string(),
        user_id: "u1".to_string(),
        text: "hi".to_string(),
        mode: Some("dev".to_string()),
        metadata: None,
    };

    assert!(matches!(
        orch.handle_request(request),
        Err(SpiritError::InvalidMode(_))
    ));
    assert!(orch.get_conversation_history("s1").is_empty());
    assert!(orch.self_model().narrative().is_empty());
}

/// Test 60 turns with the default cap leave exactly 50 messages, newest kept
#[test]
fn test_history_eviction_over_many_turns() {
    let mut orch = Orchestrator::new(SelfModel::new(), OrchestratorConfig::default());

    for i in 0..60 {
        orch.handle_message("s1", "u1", &format!("turn {}", i), None, None);
    }

    let history = orch.get_conversation_history("s1");
    assert_eq!(history.len(), 50);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].content, "turn 35");
    assert_eq!(history[49].role, Role::Assistant);
    assert_eq!(orch.self_model().message_count(), 60);

    // Narrative keeps every event in memory but exports only the tail
    assert_eq!(orch.self_model().narrative().len(), 60);
    assert_eq!(
        orch.self_model().snapshot().narrative.len(),
        NARRATIVE_EXPORT_LIMIT
    );
}

/// Test verbosity escalates once and stays escalated across many turns
#[test]
fn test_verbosity_never_regresses() {
    let mut orch = Orchestrator::new(SelfModel::new(), OrchestratorConfig::default());
    orch.self_model_mut().behavior.verbosity = Verbosity::Brief;

    for _ in 0..5 {
        orch.handle_message("s1", "u1", "again", None, None);
        assert_eq!(orch.self_model().behavior.verbosity, Verbosity::Balanced);
    }
}

/// Test self-model mutators together with snapshot purity
#[test]
fn test_self_model_lifecycle() {
    let mut sm = SelfModel::new();
    sm.add_session_goal("answer the user");
    sm.add_session_goal("answer the user");
    sm.add_long_term_goal("wire the reasoning core");
    sm.update_sensory_state(SensoryUpdate {
        detected_objects: Patch::Set(vec!["cup".to_string(), "keyboard".to_string()]),
        ..Default::default()
    });
    let mut meta = Metadata::new();
    meta.insert("source".to_string(), json!("test"));
    sm.log_event("boot", "Self-model initialised", Some(meta));

    let first = sm.snapshot();
    let second = sm.snapshot();
    assert_eq!(first, second);
    assert_eq!(first.goals.session_goals.len(), 1);
    assert_eq!(first.sensory.detected_objects.len(), 2);
    assert_eq!(first.narrative[0].metadata["source"], "test");

    sm.clear_session_goals();
    assert!(sm.goals.session_goals.is_empty());
    assert_eq!(sm.goals.long_term_goals.len(), 1);
}

/// Test config file → orchestrator wiring
#[test]
fn test_config_to_orchestrator() {
    use std::io::Write;
    use tempfile::NamedTempFile;

    let toml_content = r#"
[orchestrator]
default_mode = "STORY"
max_history_messages = 6
enable_autonomy = false

[identity]
name = "Omnissiah Node"
build_codename = "vigil"
"#;

    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(toml_content.as_bytes()).unwrap();

    let config = Config::from_file(tmp.path()).unwrap();
    assert!(!config.orchestrator.enable_autonomy);

    let mut orch = Orchestrator::from_config(&config);
    for _ in 0..5 {
        orch.handle_message("s1", "u1", "tell me a tale", None, None);
    }

    let resp = orch.handle_message("s1", "u1", "the end", None, None);
    assert!(resp.reply.starts_with("[STORY] "));
    assert_eq!(resp.self_state.identity.name, "Omnissiah Node");
    assert_eq!(resp.self_state.identity.build_codename, "vigil");
    assert_eq!(orch.get_conversation_history("s1").len(), 6);
}
