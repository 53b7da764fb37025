use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::{json, Value};

use pawtale_core::errors::GatewayError;
use pawtale_core::{Action, Effect, Mood, SessionId, TriggerConfig};
use pawtale_engine::{
    EventGenerator, GameConfig, GameError, Illustrator, NarrationConfig, NarrationService,
    NarrationStatus, Narrator, PetGame,
};
use pawtale_llm::{MockProvider, MockResponse};
use pawtale_store::SessionStore;

fn event_json(title: &str) -> Value {
    json!({
        "event_type": "random",
        "title": title,
        "description": "A butterfly drifts past the window.",
        "options": [
            {"text": "Chase it", "effect": {"hunger": -1, "energy": -2, "happiness": 3}, "reasoning": "Fun but tiring"},
            {"text": "Watch quietly", "effect": {"hunger": 0, "energy": 1, "happiness": 1}, "reasoning": "Relaxing"}
        ]
    })
}

fn always() -> TriggerConfig {
    TriggerConfig {
        normal_chance: 1.0,
        critical_chance: 1.0,
        cooldown_min: 0,
        cooldown_max: 0,
        ..TriggerConfig::default()
    }
}

fn never() -> TriggerConfig {
    TriggerConfig {
        normal_chance: 0.0,
        critical_chance: 0.0,
        ..TriggerConfig::default()
    }
}

fn game(dir: &Path, llm: Arc<MockProvider>, trigger: TriggerConfig) -> PetGame {
    let config = GameConfig {
        trigger,
        ..GameConfig::default()
    };
    PetGame::new(
        SessionStore::new(dir.join("sessions")),
        EventGenerator::new(llm),
        config,
    )
    .with_seed(42)
}

fn sid(raw: &str) -> SessionId {
    SessionId::parse(raw).unwrap()
}

#[tokio::test]
async fn setup_opens_story_with_title_and_image() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockProvider::new(vec![
        MockResponse::Json(event_json("The Butterfly")),
        MockResponse::Text("Luna's Garden Days".into()),
    ]));
    let images = Arc::new(MockProvider::new(vec![MockResponse::ImageUrl(
        "https://img.example/butterfly.png".into(),
    )]));
    let game = game(dir.path(), llm.clone(), never()).with_illustrator(Illustrator::new(images));
    let id = sid("setup-1");

    let outcome = game.setup(&id, " Luna ", "CAT", false).await.unwrap();
    assert!(outcome.saved);
    assert!(outcome.notice.is_none());
    let event = outcome.snapshot.pending_event.as_ref().unwrap();
    assert_eq!(event.title, "The Butterfly");
    assert_eq!(
        event.image_url.as_deref(),
        Some("https://img.example/butterfly.png")
    );
    assert_eq!(outcome.snapshot.title.as_deref(), Some("Luna's Garden Days"));
    assert_eq!(outcome.snapshot.identity.name(), "Luna");

    let stored = game.view(&id).await.unwrap().unwrap();
    assert_eq!(stored, outcome.snapshot);
    assert_eq!(llm.call_count(), 2);
}

#[tokio::test]
async fn setup_falls_back_when_backend_is_down() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockProvider::new(vec![
        MockResponse::Error(GatewayError::NotConfigured("no key".into())),
        MockResponse::Error(GatewayError::NotConfigured("no key".into())),
    ]));
    let game = game(dir.path(), llm, never());

    let outcome = game.setup(&sid("fallback"), "Rex", "dog", true).await.unwrap();
    let event = outcome.snapshot.pending_event.as_ref().unwrap();
    assert_eq!(event.title, "Rex's Day Out");
    assert_eq!(outcome.snapshot.title.as_deref(), Some("Rex's Great Adventure"));
    assert!(outcome.notice.is_some());
    assert!(outcome.snapshot.reading_level.is_young());
}

#[tokio::test]
async fn setup_rejects_bad_input_and_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockProvider::new(vec![]));
    let game = game(dir.path(), llm, never());
    let id = sid("dup");

    assert!(matches!(
        game.setup(&id, "Rex", "dragon", false).await,
        Err(GameError::UnknownSpecies(_))
    ));
    assert!(matches!(
        game.setup(&id, "  ", "dog", false).await,
        Err(GameError::Identity(_))
    ));

    game.setup(&id, "Rex", "dog", false).await.unwrap();
    assert!(matches!(
        game.setup(&id, "Rex", "dog", false).await,
        Err(GameError::AlreadySetUp(_))
    ));
}

#[tokio::test]
async fn choosing_applies_effect_and_clears_event() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockProvider::new(vec![
        MockResponse::Json(event_json("The Butterfly")),
        MockResponse::Text("Luna's Garden Days".into()),
    ]));
    let game = game(dir.path(), llm, never());
    let id = sid("choose");
    game.setup(&id, "Luna", "cat", false).await.unwrap();

    let outcome = game.choose(&id, 0).await.unwrap();
    assert_eq!(outcome.effect, Effect::new(-1, -2, 3));
    assert!(outcome.saved);
    let snap = &outcome.snapshot;
    assert_eq!(
        (snap.stats.hunger(), snap.stats.energy(), snap.stats.happiness()),
        (4, 3, 8)
    );
    assert!(snap.pending_event.is_none());
    assert_eq!(snap.event_counter, 1);
    assert_eq!(
        snap.history.entries(),
        ["Event: The Butterfly - Description: A butterfly drifts past the window. - Chose: Chase it"]
    );

    let noop = game.choose(&id, 0).await.unwrap();
    assert_eq!(noop.effect, Effect::NONE);
    assert!(!noop.changed);
    assert!(noop.saved);
    assert_eq!(noop.snapshot.stats, snap.stats);
}

#[tokio::test]
async fn out_of_range_choice_keeps_event() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockProvider::new(vec![
        MockResponse::Json(event_json("The Butterfly")),
        MockResponse::Text("Luna's Garden Days".into()),
    ]));
    let game = game(dir.path(), llm, never());
    let id = sid("range");
    game.setup(&id, "Luna", "cat", false).await.unwrap();

    let outcome = game.choose(&id, 7).await.unwrap();
    assert_eq!(outcome.effect, Effect::NONE);
    assert!(outcome.snapshot.pending_event.is_some());
    assert_eq!(outcome.snapshot.event_counter, 0);
}

#[tokio::test]
async fn actions_trigger_events_only_without_pending_one() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockProvider::new(vec![
        MockResponse::Json(event_json("Opening")),
        MockResponse::Text("Pip Takes Flight".into()),
        MockResponse::Json(event_json("Second Chapter")),
    ]));
    let game = game(dir.path(), llm.clone(), always());
    let id = sid("trigger");
    game.setup(&id, "Pip", "bird", false).await.unwrap();

    let pending = game.act(&id, Action::Feed).await.unwrap();
    assert!(!pending.event_triggered);
    assert_eq!(pending.effect, Effect::new(2, 0, 0));
    assert_eq!(pending.snapshot.pending_event.as_ref().unwrap().title, "Opening");
    assert_eq!(llm.call_count(), 2);

    game.choose(&id, 1).await.unwrap();
    let fired = game.act(&id, Action::Play).await.unwrap();
    assert!(fired.event_triggered);
    assert_eq!(
        fired.snapshot.pending_event.as_ref().unwrap().title,
        "Second Chapter"
    );
    assert_eq!(fired.snapshot.history.entries().last().unwrap(), "Pip played.");
}

#[tokio::test]
async fn failed_event_generation_is_a_notice() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockProvider::new(vec![
        MockResponse::Json(event_json("Opening")),
        MockResponse::Text("Pip Takes Flight".into()),
        MockResponse::Json(json!({"title": "half an event"})),
    ]));
    let game = game(dir.path(), llm, always());
    let id = sid("notice");
    game.setup(&id, "Pip", "bird", false).await.unwrap();
    game.choose(&id, 0).await.unwrap();

    let outcome = game.act(&id, Action::Rest).await.unwrap();
    assert!(outcome.notice.is_some());
    assert!(!outcome.event_triggered);
    assert!(outcome.snapshot.pending_event.is_none());
    assert!(outcome.saved);
}

#[tokio::test]
async fn title_is_refreshed_every_third_choice() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockProvider::new(vec![
        MockResponse::Json(event_json("One")),
        MockResponse::Text("Mochi Begins".into()),
        MockResponse::Json(event_json("Two")),
        MockResponse::Json(event_json("Three")),
        MockResponse::Text("The Third Chapter".into()),
    ]));
    let game = game(dir.path(), llm.clone(), always());
    let id = sid("titles");
    game.setup(&id, "Mochi", "rabbit", false).await.unwrap();

    let first = game.choose(&id, 1).await.unwrap();
    assert_eq!(first.snapshot.title.as_deref(), Some("Mochi Begins"));
    game.act(&id, Action::Rest).await.unwrap();
    game.choose(&id, 1).await.unwrap();
    game.act(&id, Action::Rest).await.unwrap();
    let third = game.choose(&id, 1).await.unwrap();

    assert_eq!(third.snapshot.event_counter, 3);
    assert_eq!(
        third.snapshot.title.as_deref(),
        Some("Mochi's The Third Chapter")
    );
    assert_eq!(llm.call_count(), 5);
}

#[tokio::test]
async fn long_history_is_summarized() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockProvider::new(vec![
        MockResponse::Json(event_json("Opening")),
        MockResponse::Text("Goldie's Bowl".into()),
        MockResponse::Text("Goldie ate and rested a lot.".into()),
    ]));
    let game = game(dir.path(), llm, never());
    let id = sid("summary");
    game.setup(&id, "Goldie", "fish", false).await.unwrap();

    let mut last = None;
    for _ in 0..11 {
        last = Some(game.act(&id, Action::Feed).await.unwrap());
    }
    let snap = last.unwrap().snapshot;
    assert_eq!(snap.summaries, vec!["Goldie ate and rested a lot.".to_string()]);
    assert_eq!(snap.history.len(), 1);
}

#[tokio::test]
async fn failed_summary_caps_history() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockProvider::new(vec![
        MockResponse::Json(event_json("Opening")),
        MockResponse::Text("Goldie's Bowl".into()),
    ]));
    let game = game(dir.path(), llm, never());
    let id = sid("capped");
    game.setup(&id, "Goldie", "fish", false).await.unwrap();

    let mut last = None;
    for _ in 0..17 {
        last = Some(game.act(&id, Action::Rest).await.unwrap());
    }
    let snap = last.unwrap().snapshot;
    assert!(snap.summaries.is_empty());
    assert_eq!(snap.history.len(), 15);
}

#[tokio::test]
async fn concurrent_actions_on_one_session_are_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockProvider::new(vec![
        MockResponse::Json(event_json("Opening")),
        MockResponse::Text("Nibbles' Wheel".into()),
    ]));
    let game = game(dir.path(), llm, never());
    let id = sid("race");
    game.setup(&id, "Nibbles", "hamster", false).await.unwrap();

    let (a, b) = tokio::join!(game.act(&id, Action::Feed), game.act(&id, Action::Play));
    a.unwrap();
    b.unwrap();

    let snap = game.view(&id).await.unwrap().unwrap();
    assert_eq!(snap.history.len(), 2);
    assert_eq!(
        (snap.stats.hunger(), snap.stats.energy(), snap.stats.happiness()),
        (6, 4, 7)
    );
}

#[tokio::test]
async fn reset_then_new_setup_is_independent() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockProvider::new(vec![
        MockResponse::Json(event_json("Opening")),
        MockResponse::Text("Luna's Tale".into()),
        MockResponse::Json(event_json("Fresh Start")),
        MockResponse::Text("Max's Tale".into()),
    ]));
    let game = game(dir.path(), llm, never());
    let id = sid("again");
    game.setup(&id, "Luna", "cat", false).await.unwrap();
    game.act(&id, Action::Play).await.unwrap();

    game.reset(&id).await.unwrap();
    assert!(game.view(&id).await.unwrap().is_none());
    assert!(matches!(
        game.act(&id, Action::Feed).await,
        Err(GameError::SessionNotFound(_))
    ));

    let outcome = game.setup(&id, "Max", "dog", false).await.unwrap();
    let snap = outcome.snapshot;
    assert_eq!(snap.identity.name(), "Max");
    assert!(snap.history.is_empty());
    assert_eq!(snap.stats.mood(), Mood::Happy);
    assert_eq!(snap.event_counter, 0);
}

#[tokio::test]
async fn reading_level_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockProvider::new(vec![
        MockResponse::Json(event_json("Opening")),
        MockResponse::Text("Luna's Tale".into()),
    ]));
    let game = game(dir.path(), llm, never());
    let id = sid("level");
    game.setup(&id, "Luna", "cat", false).await.unwrap();

    game.set_reading_level(&id, true).await.unwrap();
    assert!(game.view(&id).await.unwrap().unwrap().reading_level.is_young());
}

#[cfg(unix)]
#[tokio::test]
async fn save_failure_still_returns_state() {
    let dir = tempfile::tempdir().unwrap();
    let link = dir.path().join("data");
    std::os::unix::fs::symlink(dir.path().join("missing-target"), &link).unwrap();

    let llm = Arc::new(MockProvider::new(vec![
        MockResponse::Json(event_json("Opening")),
        MockResponse::Text("Luna's Tale".into()),
    ]));
    let game = game(&link, llm, never());

    let outcome = game.setup(&sid("unsaved"), "Luna", "cat", false).await.unwrap();
    assert!(!outcome.saved);
    assert!(outcome.save_error.is_some());
    assert!(outcome.snapshot.pending_event.is_some());
}

#[cfg(unix)]
#[tokio::test]
async fn unsaved_state_survives_until_storage_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("missing-target");
    let link = dir.path().join("data");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    let llm = Arc::new(MockProvider::new(vec![
        MockResponse::Json(event_json("Opening")),
        MockResponse::Text("Luna's Tale".into()),
    ]));
    let game = game(&link, llm, never());
    let id = sid("flaky");

    assert!(!game.setup(&id, "Luna", "cat", false).await.unwrap().saved);
    assert!(game.view(&id).await.unwrap().is_some());
    assert!(matches!(
        game.setup(&id, "Luna", "cat", false).await,
        Err(GameError::AlreadySetUp(_))
    ));

    let first = game.act(&id, Action::Feed).await.unwrap();
    assert!(!first.saved);
    assert_eq!(first.snapshot.stats.hunger(), 7);
    let second = game.act(&id, Action::Feed).await.unwrap();
    assert!(!second.saved);
    assert_eq!(second.snapshot.stats.hunger(), 9);
    assert_eq!(second.snapshot.history.len(), 2);

    std::fs::create_dir(&target).unwrap();
    let third = game.act(&id, Action::Rest).await.unwrap();
    assert!(third.saved);
    assert!(third.save_error.is_none());

    let reopened = SessionStore::new(link.join("sessions"))
        .load(&id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        (reopened.stats.hunger(), reopened.stats.energy()),
        (9, 7)
    );
    assert_eq!(reopened.history.len(), 3);
}

#[cfg(unix)]
#[tokio::test]
async fn reset_discards_unsaved_state() {
    let dir = tempfile::tempdir().unwrap();
    let link = dir.path().join("data");
    std::os::unix::fs::symlink(dir.path().join("missing-target"), &link).unwrap();

    let llm = Arc::new(MockProvider::new(vec![
        MockResponse::Json(event_json("Opening")),
        MockResponse::Text("Luna's Tale".into()),
    ]));
    let game = game(&link, llm, never());
    let id = sid("forgotten");

    game.setup(&id, "Luna", "cat", false).await.unwrap();
    game.reset(&id).await.unwrap();
    assert!(game.view(&id).await.unwrap().is_none());
    assert!(matches!(
        game.act(&id, Action::Feed).await,
        Err(GameError::SessionNotFound(_))
    ));
}

#[tokio::test]
async fn narration_of_pending_event() {
    let dir = tempfile::tempdir().unwrap();
    let llm = Arc::new(MockProvider::new(vec![
        MockResponse::Json(event_json("Opening")),
        MockResponse::Text("Luna's Tale".into()),
    ]));
    let speech = Arc::new(MockProvider::new(vec![MockResponse::Audio(Bytes::from_static(
        b"mp3",
    ))]));
    let narrator = Narrator::new(speech, None, NarrationConfig::new(dir.path().join("audio")));
    let game = game(dir.path(), llm, never()).with_narration(NarrationService::new(narrator));
    let id = sid("narrate");

    assert!(matches!(
        game.start_narration(&id, None).await,
        Err(GameError::SessionNotFound(_))
    ));
    game.setup(&id, "Luna", "cat", false).await.unwrap();
    assert!(game.narration_status(&id, false).await.unwrap().is_none());

    let started = game.start_narration(&id, Some("nova".into())).await.unwrap();
    assert_eq!(started, NarrationStatus::InProgress);
    let done = game.narration_status(&id, true).await.unwrap().unwrap();
    let NarrationStatus::Complete { audio } = done else {
        panic!("expected complete narration, got {done:?}");
    };
    assert!(audio.path.exists());

    game.choose(&id, 0).await.unwrap();
    assert!(matches!(
        game.start_narration(&id, None).await,
        Err(GameError::NoPendingEvent)
    ));
}

#[tokio::test]
async fn narration_disabled_without_service() {
    let dir = tempfile::tempdir().unwrap();
    let game = game(dir.path(), Arc::new(MockProvider::new(vec![])), never());
    assert!(matches!(
        game.start_narration(&sid("x"), None).await,
        Err(GameError::NarrationDisabled)
    ));
}
