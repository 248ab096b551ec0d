//! Integration tests for the facade: config loading, builder, and a full
//! round through the prelude types.

use std::time::Duration;

use spinwheel::prelude::*;
use tokio::time;

// =========================================================================
// Config loading
// =========================================================================

#[test]
fn test_parse_config_fills_defaults_and_clamps() {
    let config = spinwheel::parse_config(
        r#"{
            "countdown_seed": 5,
            "jitter_fraction": 4.0,
            "strategy": { "kind": "decoded", "min_turns": 8, "max_turns": 5 }
        }"#,
    )
    .unwrap();
    assert_eq!(config.countdown_seed, 5);
    assert_eq!(config.extra_turns, 8);
    assert_eq!(config.jitter_fraction, WheelConfig::MAX_JITTER_FRACTION);
    assert_eq!(
        config.strategy,
        StrategyKind::Decoded {
            min_turns: 5,
            max_turns: 8
        }
    );
}

#[test]
fn test_parse_config_rejects_bad_json() {
    let err = spinwheel::parse_config("{ countdown_seed: }").unwrap_err();
    assert!(matches!(err, SpinwheelError::Config(_)));
}

#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join(format!("spinwheel-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "roast_mode": false, "eject_duration": { "secs": 2, "nanos": 0 } }"#)
        .unwrap();
    let config = spinwheel::load_config(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert!(!config.roast_mode);
    assert_eq!(config.eject_duration, Duration::from_secs(2));
    assert_eq!(config.countdown_seed, 15);
}

#[test]
fn test_load_config_missing_file() {
    let err = spinwheel::load_config("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, SpinwheelError::Io(_)));
}

#[test]
fn test_parse_config_caps_huge_durations() {
    let mut config = spinwheel::parse_config(
        r#"{
            "spin_duration": { "secs": 18446744073709551615, "nanos": 0 },
            "settle_padding": { "secs": 1, "nanos": 0 }
        }"#,
    )
    .unwrap();
    assert_eq!(config.spin_duration, WheelConfig::MAX_DURATION);
    assert_eq!(
        config.reveal_delay(),
        WheelConfig::MAX_DURATION + Duration::from_secs(1)
    );

    // Wiped back to unchecked; the machine validates again on construction.
    config.spin_duration = Duration::MAX;
    let mut machine = Spinwheel::builder()
        .config(config)
        .machine(SeededRandom::new(1));
    assert!(machine.start(SpinRequest::new(["a", "b"])).is_ok());
    assert_eq!(machine.phase(), Phase::Spinning);
    assert_eq!(machine.config().spin_duration, WheelConfig::MAX_DURATION);
}

#[test]
fn test_init_tracing_is_idempotent() {
    spinwheel::init_tracing();
    spinwheel::init_tracing();
}

// =========================================================================
// Builder + controller
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_builder_round_to_elimination() {
    let (wheel, mut events) = Spinwheel::builder()
        .spin_duration(Duration::from_secs(2))
        .settle_padding(Duration::ZERO)
        .countdown_seed(1)
        .eject_duration(Duration::from_secs(1))
        .float_duration(Duration::from_secs(1))
        .seed(99)
        .spawn();

    wheel
        .start(SpinRequest::new(["Ann", "Ben", "Cy"]))
        .await
        .map_err(SpinwheelError::from)
        .unwrap();

    time::sleep(Duration::from_millis(3_500)).await;
    let snap = wheel.current();
    assert!(snap.can_confirm);
    let winner = snap.winner.clone().unwrap();
    wheel.confirm().await.unwrap();

    time::sleep(Duration::from_secs(5)).await;
    let mut eliminated = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let WheelEvent::Eliminated(elim) = event {
            eliminated.push(elim);
        }
    }
    assert_eq!(eliminated.len(), 1);
    assert_eq!(eliminated[0].name, winner);
    assert_eq!(wheel.current().phase, Phase::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_same_seed_same_winner() {
    let crew = SpinRequest::new(["a", "b", "c", "d", "e", "f", "g"]);
    let mut winners = Vec::new();
    for _ in 0..2 {
        let (wheel, _events) = Spinwheel::builder().seed(1234).spawn();
        wheel.start(crew.clone()).await.unwrap();
        time::sleep(Duration::from_secs(7)).await;
        let snap = wheel.current();
        winners.push((snap.winner_index, snap.rotation));
        wheel.shutdown().await.unwrap();
    }
    assert_eq!(winners[0], winners[1]);
}

#[tokio::test(start_paused = true)]
async fn test_phase_errors_convert() {
    let (wheel, _events) = Spinwheel::builder().spawn();
    let result: Result<(), SpinwheelError> = async {
        wheel.confirm().await?;
        Ok(())
    }
    .await;
    assert!(matches!(
        result,
        Err(SpinwheelError::Phase(PhaseError::InvalidTransition { .. }))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_huge_eject_duration_still_eliminates() {
    let (wheel, mut events) = Spinwheel::builder()
        .spin_duration(Duration::from_secs(1))
        .countdown_seed(0)
        .eject_duration(Duration::MAX)
        .float_duration(Duration::from_secs(1))
        .seed(7)
        .spawn();

    wheel.start(SpinRequest::new(["Ann", "Ben"])).await.unwrap();
    time::sleep(Duration::from_millis(1_500)).await;
    let winner = wheel.current().winner.clone().unwrap();
    wheel.confirm().await.unwrap();

    // The actor survived arming the eject hold and still answers.
    let snap = wheel.snapshot().await.unwrap();
    assert_eq!(snap.phase, Phase::Ejecting);

    time::sleep(WheelConfig::MAX_DURATION + Duration::from_secs(5)).await;
    let mut eliminated = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let WheelEvent::Eliminated(elim) = event {
            eliminated.push(elim);
        }
    }
    assert_eq!(eliminated.len(), 1);
    assert_eq!(eliminated[0].name, winner);
    assert_eq!(wheel.current().phase, Phase::Closed);
}
