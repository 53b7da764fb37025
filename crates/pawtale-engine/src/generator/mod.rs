//! Event generation against the structured-output backend.

pub mod prompts;
pub mod schema;
pub mod starters;

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use pawtale_core::{
    Effect, Event, EventId, EventKind, EventOption, HistoryLog, PetIdentity, PetStats,
    ReadingLevel,
};
use pawtale_llm::LlmProvider;

use crate::error::GenerationError;

pub use schema::event_schema;
pub use starters::{random_starter, StoryStarter, STORY_STARTERS};

/// Reply shape the backend must produce. Every field is required.
#[derive(Debug, Deserialize)]
struct WireEvent {
    event_type: EventKind,
    title: String,
    description: String,
    options: Vec<WireOption>,
}

#[derive(Debug, Deserialize)]
struct WireOption {
    text: String,
    effect: WireEffect,
    #[serde(default)]
    reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireEffect {
    hunger: i32,
    energy: i32,
    happiness: i32,
}

/// Turns a raw backend reply into a validated [`Event`] with a fresh id.
pub fn parse_event(value: Value) -> Result<Event, GenerationError> {
    let wire: WireEvent = serde_json::from_value(value)
        .map_err(|e| GenerationError::Malformed(format!("event does not match schema: {e}")))?;

    let event = Event {
        id: Some(EventId::new()),
        kind: wire.event_type,
        title: wire.title.trim().to_string(),
        description: wire.description.trim().to_string(),
        options: wire
            .options
            .into_iter()
            .map(|o| EventOption {
                text: o.text.trim().to_string(),
                effect: Effect::new(o.effect.hunger, o.effect.energy, o.effect.happiness),
                reasoning: o.reasoning,
            })
            .collect(),
        image_url: None,
    };

    event
        .validate()
        .map_err(|e| GenerationError::Malformed(e.to_string()))?;
    Ok(event)
}

/// Canned opening used when the first story cannot be generated.
pub fn fallback_story(identity: &PetIdentity) -> Event {
    let name = identity.name();
    let option = |text: &str, effect: Effect| EventOption {
        text: text.to_string(),
        effect,
        reasoning: None,
    };
    Event {
        id: Some(EventId::new()),
        kind: EventKind::Random,
        title: format!("{name}'s Day Out"),
        description: format!(
            "{name} wakes up full of energy and looks out the window. \
             The sun is shining and the whole day is waiting. What should {name} do?"
        ),
        options: vec![
            option("Visit the park", Effect::new(0, -1, 2)),
            option("Have a picnic", Effect::new(2, 0, 1)),
            option("Stay home and nap", Effect::new(0, 2, 0)),
        ],
        image_url: None,
    }
}

/// Title shown until the backend has produced one.
pub fn fallback_title(identity: &PetIdentity) -> String {
    format!("{}'s Great Adventure", identity.name())
}

fn clean_title(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '*')
        .trim()
}

/// Makes sure a generated title names the pet.
pub fn ensure_title_names_pet(raw: &str, name: &str) -> String {
    let title = clean_title(raw);
    if title.contains(name) {
        title.to_string()
    } else {
        format!("{name}'s {title}")
    }
}

#[derive(Clone)]
pub struct EventGenerator {
    provider: Arc<dyn LlmProvider>,
}

impl EventGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Next story beat for the current state of the pet.
    #[instrument(skip_all, fields(pet = identity.name(), mood = %stats.mood()))]
    pub async fn generate(
        &self,
        stats: &PetStats,
        identity: &PetIdentity,
        history: &HistoryLog,
        summaries: &[String],
        level: ReadingLevel,
    ) -> Result<Event, GenerationError> {
        let prompt = prompts::event_prompt(stats, identity, history, summaries, level);
        self.request_event(&prompt).await
    }

    #[instrument(skip_all, fields(pet = identity.name(), location = starter.location))]
    pub async fn generate_initial_story(
        &self,
        stats: &PetStats,
        identity: &PetIdentity,
        level: ReadingLevel,
        starter: &StoryStarter,
    ) -> Result<Event, GenerationError> {
        let prompt = prompts::initial_story_prompt(stats, identity, level, starter);
        self.request_event(&prompt).await
    }

    async fn request_event(&self, prompt: &pawtale_llm::Prompt) -> Result<Event, GenerationError> {
        let raw = self
            .provider
            .generate_structured(prompt, &event_schema())
            .await?;
        match parse_event(raw) {
            Ok(event) => {
                debug!(title = %event.title, options = event.options.len(), "event generated");
                Ok(event)
            }
            Err(e) => {
                warn!(error = %e, "rejected malformed event");
                Err(e)
            }
        }
    }

    /// A story title that always contains the pet's name.
    #[instrument(skip_all, fields(pet = identity.name()))]
    pub async fn generate_title(
        &self,
        identity: &PetIdentity,
        current_event: Option<&Event>,
    ) -> Result<String, GenerationError> {
        let raw = self
            .provider
            .complete_text(&prompts::title_prompt(identity, current_event))
            .await?;
        if clean_title(&raw).is_empty() {
            return Err(GenerationError::Malformed("empty title".into()));
        }
        Ok(ensure_title_names_pet(&raw, identity.name()))
    }

    /// Condenses old history entries into one line.
    #[instrument(skip_all, fields(pet = identity.name(), entries = entries.len()))]
    pub async fn generate_summary(
        &self,
        identity: &PetIdentity,
        entries: &[String],
    ) -> Result<String, GenerationError> {
        let raw = self
            .provider
            .complete_text(&prompts::summary_prompt(identity, entries))
            .await?;
        let summary = raw.trim();
        if summary.is_empty() {
            return Err(GenerationError::Malformed("empty summary".into()));
        }
        Ok(summary.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawtale_core::errors::GatewayError;
    use pawtale_core::Species;
    use pawtale_llm::{MockProvider, MockResponse};
    use serde_json::json;

    fn luna() -> PetIdentity {
        PetIdentity::new("Luna", Species::Cat).unwrap()
    }

    fn storm_event() -> Value {
        json!({
            "event_type": "weather",
            "title": "Thunderstorm",
            "description": "Thunder rumbles over the rooftops.",
            "options": [
                {"text": "Hide under the bed", "effect": {"hunger": 0, "energy": 1, "happiness": -1}, "reasoning": "Safe but dull"},
                {"text": "Watch the lightning", "effect": {"hunger": -1, "energy": -1, "happiness": 3}, "reasoning": "Exciting"}
            ]
        })
    }

    fn generator(responses: Vec<MockResponse>) -> (EventGenerator, Arc<MockProvider>) {
        let mock = Arc::new(MockProvider::new(responses));
        (EventGenerator::new(mock.clone()), mock)
    }

    #[test]
    fn parses_valid_event() {
        let event = parse_event(storm_event()).unwrap();
        assert_eq!(event.kind, EventKind::Weather);
        assert_eq!(event.options.len(), 2);
        assert_eq!(event.options[1].effect, Effect::new(-1, -1, 3));
        assert_eq!(event.options[0].reasoning.as_deref(), Some("Safe but dull"));
        assert!(event.id.is_some());
        assert!(event.image_url.is_none());
    }

    #[test]
    fn rejects_out_of_range_effect() {
        let mut raw = storm_event();
        raw["options"][0]["effect"]["happiness"] = json!(7);
        assert!(matches!(parse_event(raw), Err(GenerationError::Malformed(_))));
    }

    #[test]
    fn rejects_bad_option_count() {
        let mut raw = storm_event();
        raw["options"] = json!([raw["options"][0].clone()]);
        assert!(matches!(parse_event(raw), Err(GenerationError::Malformed(_))));

        let mut raw = storm_event();
        let opt = raw["options"][0].clone();
        raw["options"] = json!([opt.clone(), opt.clone(), opt.clone(), opt.clone(), opt]);
        assert!(matches!(parse_event(raw), Err(GenerationError::Malformed(_))));
    }

    #[test]
    fn rejects_missing_fields() {
        let mut raw = storm_event();
        raw.as_object_mut().unwrap().remove("event_type");
        assert!(matches!(parse_event(raw), Err(GenerationError::Malformed(_))));

        let raw = json!({"title": "Only a title"});
        assert!(matches!(parse_event(raw), Err(GenerationError::Malformed(_))));
    }

    #[test]
    fn fallback_story_is_valid() {
        let event = fallback_story(&luna());
        assert!(event.validate().is_ok());
        assert_eq!(event.title, "Luna's Day Out");
        assert_eq!(event.options.len(), 3);
        assert_eq!(fallback_title(&luna()), "Luna's Great Adventure");
    }

    #[test]
    fn title_gets_name_prefix() {
        assert_eq!(ensure_title_names_pet("\"The Lost Sock\"", "Luna"), "Luna's The Lost Sock");
        assert_eq!(
            ensure_title_names_pet("Luna and the Moon", "Luna"),
            "Luna and the Moon"
        );
    }

    #[tokio::test]
    async fn generate_returns_parsed_event() {
        let (gen, mock) = generator(vec![MockResponse::Json(storm_event())]);
        let event = gen
            .generate(&PetStats::new(1, 8, 8), &luna(), &HistoryLog::new(), &[], ReadingLevel::Young)
            .await
            .unwrap();
        assert_eq!(event.title, "Thunderstorm");
        assert_eq!(mock.call_count(), 1);
        assert!(mock.inputs()[0].contains("Hunger: 1/10"));
    }

    #[tokio::test]
    async fn generate_surfaces_malformed_reply() {
        let (gen, _) = generator(vec![MockResponse::Json(json!({"nonsense": true}))]);
        let err = gen
            .generate(&PetStats::default(), &luna(), &HistoryLog::new(), &[], ReadingLevel::Standard)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));
    }

    #[tokio::test]
    async fn generate_surfaces_gateway_error() {
        let (gen, _) = generator(vec![MockResponse::Error(GatewayError::RateLimited)]);
        let err = gen
            .generate(&PetStats::default(), &luna(), &HistoryLog::new(), &[], ReadingLevel::Standard)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Gateway(GatewayError::RateLimited)));
    }

    #[tokio::test]
    async fn initial_story_mentions_starter() {
        let (gen, mock) = generator(vec![MockResponse::Json(storm_event())]);
        gen.generate_initial_story(
            &PetStats::default(),
            &luna(),
            ReadingLevel::Standard,
            &STORY_STARTERS[4],
        )
        .await
        .unwrap();
        assert!(mock.inputs()[0].contains("a quiet library"));
    }

    #[tokio::test]
    async fn title_always_names_pet() {
        let (gen, _) = generator(vec![
            MockResponse::Text("Whiskers in the Rain".into()),
            MockResponse::Text("  Luna Saves the Day \n".into()),
            MockResponse::Text("  \"\" ".into()),
        ]);
        let first = gen.generate_title(&luna(), None).await.unwrap();
        assert_eq!(first, "Luna's Whiskers in the Rain");
        let second = gen.generate_title(&luna(), None).await.unwrap();
        assert_eq!(second, "Luna Saves the Day");
        assert!(gen.generate_title(&luna(), None).await.is_err());
    }

    #[tokio::test]
    async fn summary_is_trimmed() {
        let (gen, mock) = generator(vec![MockResponse::Text(" Luna napped a lot. ".into())]);
        let entries = vec!["Luna took a rest.".to_string(); 3];
        let summary = gen.generate_summary(&luna(), &entries).await.unwrap();
        assert_eq!(summary, "Luna napped a lot.");
        assert!(mock.inputs()[0].contains("- Luna took a rest."));
    }
}
