use envaware::{
    Action, EnvironmentController, EnvironmentState, Observation, PolicyConfig, PolicyEngine,
    Snapshot, StepRecord, ValidationError,
};

const TARGET: &str = r"C:\Users\me\docs\System_Brief.md";

#[test]
fn full_toolchain_yields_conversion_command() {
    let mut state = EnvironmentState::new();
    state.reinforce("Windows", 0.7).unwrap();
    state.reinforce("PowerShell", 1.23).unwrap();
    state.reinforce("PandocInstalled", 0.8).unwrap();
    state.reinforce("PDFExportSuccess", 0.8).unwrap();

    let engine = PolicyEngine::new(PolicyConfig::with_confident(0.5)).unwrap();
    let decision = engine.decide(&state.snapshot(), TARGET);

    assert_eq!(decision.action, Action::ProvideCommand);
    assert_eq!(decision.action.label(), "Provide direct conversion command");
    assert_eq!(decision.assumption, "Windows + PowerShell + Pandoc present");
    let command = decision.command.expect("conversion command");
    assert!(command.starts_with("pandoc \""));
    assert!(command.contains("System_Brief.md"));
    assert!(command.contains("System_Brief.pdf"));
    assert!(command.ends_with("--pdf-engine=xelatex"));
}

#[test]
fn powershell_only_yields_install_suggestion() {
    let mut state = EnvironmentState::new();
    state.reinforce("PowerShell", 0.9).unwrap();

    let engine = PolicyEngine::new(PolicyConfig::with_confident(0.5)).unwrap();
    let decision = engine.decide(&state.snapshot(), TARGET);

    assert_eq!(decision.action, Action::SuggestInstall);
    assert_eq!(decision.action.label(), "Suggest install command");
    assert_eq!(decision.command.as_deref(), Some("winget install Pandoc.Pandoc"));
}

#[test]
fn empty_snapshot_asks_without_command() {
    let decision = PolicyEngine::default().decide(&Snapshot::default(), TARGET);
    assert_eq!(decision.action, Action::AskQuestion);
    assert_eq!(decision.action.label(), "Ask clarifying question");
    assert!(decision.command.is_none());
    assert!(decision.question.is_some());
}

#[test]
fn exact_threshold_selects_conversion() {
    let snapshot = Snapshot::from_weights([
        ("Windows", 0.5),
        ("PowerShell", 0.5),
        ("PandocInstalled", 0.5),
    ])
    .unwrap();
    let decision = PolicyEngine::default().decide(&snapshot, TARGET);
    assert_eq!(decision.action, Action::ProvideCommand);
}

#[test]
fn stale_beliefs_fade_back_to_a_question() {
    let mut ctrl = EnvironmentController::new(PolicyEngine::default());
    let first = ctrl
        .step(
            0.1,
            &[
                Observation::new(["Windows", "PowerShell"], 0.7),
                Observation::new(["PandocInstalled", "PDFExportSuccess"], 0.8),
            ],
            TARGET,
        )
        .unwrap();
    assert_eq!(first.decision.action, Action::ProvideCommand);

    // With no new evidence Windows (0.7) drops under 0.5 first, so the policy
    // eventually stops assuming the toolchain and starts asking again.
    let mut last = first;
    for _ in 0..10 {
        last = ctrl.step(0.1, &[], TARGET).unwrap();
    }
    assert_eq!(last.decision.action, Action::AskQuestion);
    assert!(last.snapshot.get("Windows") > 0.0);
    assert_eq!(ctrl.steps(), 11);
}

#[test]
fn run_log_is_one_json_row_per_step() {
    let mut ctrl = EnvironmentController::new(PolicyEngine::default());
    let mut log = Vec::new();
    let events = [
        vec![Observation::new(["PowerShell"], 0.9)],
        vec![],
        vec![Observation::new(["PandocInstalled", "Windows"], 0.8)],
    ];
    for observations in &events {
        ctrl.step(0.05, observations, TARGET)
            .unwrap()
            .write_jsonl(&mut log)
            .unwrap();
    }

    let text = String::from_utf8(log).unwrap();
    let rows: Vec<StepRecord> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].decision.action, Action::SuggestInstall);
    assert_eq!(rows[1].decision.action, Action::SuggestInstall);
    assert_eq!(rows[2].decision.action, Action::ProvideCommand);
    assert!(rows.iter().all(|row| row.run_id == ctrl.run_id()));
}

#[test]
fn invalid_arguments_leave_state_untouched() {
    let mut state = EnvironmentState::with_seed([("Windows", 0.9)]).unwrap();
    let before = state.clone();

    assert!(matches!(
        state.decay(1.0),
        Err(ValidationError::DecayRateOutOfRange { .. })
    ));
    assert!(matches!(
        state.reinforce("Windows", -0.5),
        Err(ValidationError::InvalidReinforcement { .. })
    ));
    assert_eq!(state, before);
}

#[test]
fn config_from_json_drives_engine() {
    let config = PolicyConfig::from_json_str(
        r#"{
            "thresholds": { "confident": 0.8 },
            "templates": { "pdf_engine": "lualatex" },
            "default_question": "Which OS are you on?"
        }"#,
    )
    .unwrap();
    let engine = PolicyEngine::new(config).unwrap();

    let below = Snapshot::from_weights([
        ("Windows", 0.7),
        ("PowerShell", 0.9),
        ("PandocInstalled", 0.9),
    ])
    .unwrap();
    assert_eq!(engine.decide(&below, TARGET).action, Action::AskQuestion);

    let above = Snapshot::from_weights([
        ("Windows", 0.8),
        ("PowerShell", 0.9),
        ("PandocInstalled", 0.9),
    ])
    .unwrap();
    let decision = engine.decide(&above, TARGET);
    assert!(decision.command.unwrap().ends_with("--pdf-engine=lualatex"));

    let empty = engine.decide(&Snapshot::default(), TARGET);
    assert_eq!(empty.question.as_deref(), Some("Which OS are you on?"));
}

#[test]
fn log_rows_with_invalid_weights_are_rejected() {
    let mut ctrl = EnvironmentController::new(PolicyEngine::default());
    let row = ctrl
        .step(0.1, &[Observation::new(["Windows"], 0.7)], TARGET)
        .unwrap()
        .to_json_line()
        .unwrap();
    assert!(serde_json::from_str::<StepRecord>(&row).is_ok());

    let tampered = row.replace(r#""Windows":0.7"#, r#""Windows":-1.0"#);
    assert_ne!(tampered, row);
    assert!(serde_json::from_str::<StepRecord>(&tampered).is_err());
}
