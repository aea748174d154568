use face_expression_core::{
    builtins, parse_expression_json,
    pose::{Pose, EYE_OPENNESS, LID_TOP},
    Expression, ExpressionLibrary, FaceConfig, FaceEngine, FaceError, InterpolationMethod,
    Keyframe, LatestFrame, Priority,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

#[test]
fn default_library_holds_the_builtins() {
    let lib = ExpressionLibrary::new();
    assert_eq!(
        lib.names(),
        vec!["angry", "blink", "happy", "look_around", "love", "neutral", "sad", "scared"]
    );
    for e in builtins::all() {
        e.validate().unwrap();
        assert_eq!(*lib.get(&e.name).unwrap(), e);
    }
    assert!(ExpressionLibrary::empty().is_empty());
}

#[test]
fn register_then_get_returns_an_equal_expression() {
    let mut lib = ExpressionLibrary::empty();
    let e = Expression::new(
        "nod",
        vec![
            Keyframe::new(0.0, Pose::new().with(LID_TOP, 0.0)),
            Keyframe::new(0.3, Pose::new().with(LID_TOP, 0.2)),
        ],
    )
    .with_method(InterpolationMethod::EaseOut);
    lib.register(e.clone()).unwrap();
    assert_eq!(*lib.get("nod").unwrap(), e);

    let again = lib.register(e.with_priority(Priority::Interrupt));
    assert_eq!(again.unwrap_err(), FaceError::DuplicateName { name: "nod".into() });
    assert_eq!(lib.get("nod").unwrap().priority, Priority::Normal);
    assert_eq!(
        lib.get("shake").unwrap_err(),
        FaceError::NotFound { name: "shake".into() }
    );
}

#[test]
fn malformed_expressions_are_rejected() {
    let mut lib = ExpressionLibrary::empty();
    let pose = || Pose::new().with(EYE_OPENNESS, 1.0);
    let cases = vec![
        Expression::new("empty", vec![]),
        Expression::new("late-start", vec![Keyframe::new(0.2, pose())]),
        Expression::new(
            "repeat",
            vec![Keyframe::new(0.0, pose()), Keyframe::new(0.0, pose())],
        ),
        Expression::new(
            "nan",
            vec![Keyframe::new(0.0, Pose::new().with(EYE_OPENNESS, f32::NAN))],
        ),
        Expression::new("", vec![Keyframe::new(0.0, pose())]),
        Expression::new("negative-fade", vec![Keyframe::new(0.0, pose())]).with_transition(-1.0),
    ];
    for e in cases {
        let name = e.name.clone();
        assert!(
            matches!(lib.register(e), Err(FaceError::Validation { .. })),
            "'{name}' should fail validation"
        );
    }
    assert!(lib.is_empty());
}

#[test]
fn definition_fixture_parses_with_defaults() {
    let json = face_test_fixtures::expressions::json("wink").expect("load wink fixture");
    let wink = parse_expression_json(&json).expect("parse wink");
    assert_eq!(wink.name, "wink");
    assert_eq!(wink.interpolation_method, InterpolationMethod::EaseInOut);
    assert_eq!(wink.priority, Priority::Normal);
    assert!(!wink.r#loop && !wink.sticky);
    approx(wink.transition, 0.1, 1e-6);
    approx(wink.duration(), 0.4, 1e-6);
    approx(wink.keyframes[1].pose.get(LID_TOP).unwrap(), 0.8, 1e-6);
}

#[test]
fn invalid_definition_documents_fail_cleanly() {
    let unsorted = face_test_fixtures::expressions::json("unsorted-keyframes").unwrap();
    assert!(matches!(
        parse_expression_json(&unsorted),
        Err(FaceError::Validation { name, .. }) if name == "broken"
    ));

    let typo = face_test_fixtures::expressions::json("unknown-field").unwrap();
    assert!(matches!(parse_expression_json(&typo), Err(FaceError::Parse { .. })));
    assert!(matches!(parse_expression_json("{"), Err(FaceError::Parse { .. })));
}

#[test]
fn library_document_loads_in_order_and_plays() {
    let json = face_test_fixtures::expressions::json("companion-library").unwrap();
    let mut lib = ExpressionLibrary::new();
    let loaded = lib.load_json(&json).unwrap();
    assert_eq!(loaded, vec!["curious", "startled", "sleepy"]);
    assert_eq!(lib.get("startled").unwrap().priority, Priority::Interrupt);
    assert!(lib.get("sleepy").unwrap().r#loop);

    // second load collides on the first name and stops there
    assert!(matches!(
        lib.load_json(&json),
        Err(FaceError::DuplicateName { name }) if name == "curious"
    ));

    let mut engine = FaceEngine::with_library(FaceConfig::default(), lib).unwrap();
    engine.enqueue("curious").unwrap();
    let mut sink = LatestFrame::default();
    let out = engine.tick(0.05, &mut sink);
    assert_eq!(out.started(), vec!["curious"]);
}

#[test]
fn config_fixtures_round_through_validation() {
    let cfg = FaceConfig::from_json_str(&face_test_fixtures::configs::json("desk-robot").unwrap())
        .unwrap();
    assert_eq!(cfg.idle_expressions, vec!["blink"]);
    assert_eq!(cfg.idle_seed, Some(42));
    assert_eq!(cfg.inbox_capacity, 64);
    assert_eq!(cfg.rest_expression, "neutral");

    let engine = FaceEngine::new(cfg).unwrap();
    assert_eq!(engine.player().speed(), 1.5);
    assert_eq!(engine.config().idle_timeout, 8.0);

    let bad = face_test_fixtures::configs::json("out-of-range").unwrap();
    assert!(matches!(
        FaceConfig::from_json_str(&bad),
        Err(FaceError::InvalidConfig { field, .. }) if field == "animation_speed"
    ));
}

#[test]
fn fullscreen_hint_reaches_the_frame() {
    let cfg = FaceConfig::from_json_str(&face_test_fixtures::configs::json("desk-robot").unwrap())
        .unwrap();
    let mut engine = FaceEngine::new(cfg).unwrap();
    let mut sink = LatestFrame::default();
    engine.tick(0.016, &mut sink);
    let frame = sink.0.expect("frame presented");
    assert!(frame.fullscreen);
    assert_eq!(frame.tick, 1);
    assert_eq!(&frame.pose, engine.player().rest_pose());
}
