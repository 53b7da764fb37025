//! Prompt text sent to the model backend.

use std::fmt::Write as _;

use pawtale_core::{Event, EventOption, HistoryLog, PetIdentity, PetStats, ReadingLevel};
use pawtale_llm::Prompt;

use super::starters::StoryStarter;

/// How many recent history entries are quoted verbatim.
pub const RECENT_HISTORY: usize = 10;

const EVENT_SYSTEM: &str = "You are a storyteller for a virtual pet game. \
You write short interactive story beats that end with choices for the player. \
Every choice has an effect on the pet's hunger, energy and happiness, each an \
integer from -5 to 5. Higher stats are better; hunger measures how full the pet is.";

const TITLE_SYSTEM: &str = "You name ongoing stories for a virtual pet game. \
Reply with the title only, no quotes.";

const SUMMARY_SYSTEM: &str = "You keep a virtual pet's story journal. \
Summarize the entries you are given in two or three sentences, keeping names \
and the choices that were made.";

const SPEECH_SYSTEM: &str = "You prepare stories to be read aloud to a player. \
Rewrite the story and its choices as natural spoken prose. Number the choices \
so the listener can pick one.";

pub fn reading_directive(level: ReadingLevel) -> &'static str {
    match level {
        ReadingLevel::Young => {
            "The reader is a young child. Use short sentences and simple words. \
             Keep the description under 80 words and each choice under 8 words."
        }
        ReadingLevel::Standard => {
            "Write vivid, age-appropriate prose. Keep the description to one or \
             two short paragraphs."
        }
    }
}

fn describe_pet(out: &mut String, stats: &PetStats, identity: &PetIdentity) {
    let _ = writeln!(
        out,
        "The pet is a {} named {}.",
        identity.species().display_name().to_lowercase(),
        identity.name()
    );
    let _ = writeln!(out, "Current state:");
    let _ = writeln!(out, "- Hunger: {}/10", stats.hunger());
    let _ = writeln!(out, "- Energy: {}/10", stats.energy());
    let _ = writeln!(out, "- Happiness: {}/10", stats.happiness());
    let _ = writeln!(out, "- Mood: {}", stats.mood());
}

pub fn event_prompt(
    stats: &PetStats,
    identity: &PetIdentity,
    history: &HistoryLog,
    summaries: &[String],
    level: ReadingLevel,
) -> Prompt {
    let mut user = String::new();
    describe_pet(&mut user, stats, identity);

    if !summaries.is_empty() {
        let _ = writeln!(user, "\nThe story so far:");
        for summary in summaries {
            let _ = writeln!(user, "- {summary}");
        }
    }

    let recent = history.recent(RECENT_HISTORY);
    if !recent.is_empty() {
        let _ = writeln!(user, "\nRecent happenings:");
        for entry in recent {
            let _ = writeln!(user, "- {entry}");
        }
    }

    let _ = writeln!(
        user,
        "\nContinue the story with a new event for {}. Offer 2 to 4 choices. \
         Low stats should make events about food, rest or cheering up more likely.",
        identity.name()
    );
    let _ = write!(user, "{}", reading_directive(level));

    Prompt::new(EVENT_SYSTEM, user)
}

pub fn initial_story_prompt(
    stats: &PetStats,
    identity: &PetIdentity,
    level: ReadingLevel,
    starter: &StoryStarter,
) -> Prompt {
    let mut user = String::new();
    describe_pet(&mut user, stats, identity);
    let _ = writeln!(
        user,
        "\nStart a brand-new story. {} is in {}. {}",
        identity.name(),
        starter.location,
        starter.scenario
    );
    let _ = writeln!(user, "Offer 2 to 4 choices for what happens next.");
    let _ = write!(user, "{}", reading_directive(level));

    Prompt::new(EVENT_SYSTEM, user)
}

pub fn title_prompt(identity: &PetIdentity, event: Option<&Event>) -> Prompt {
    let mut user = format!(
        "Give a short story title (at most six words) for the adventures of {} the {}.",
        identity.name(),
        identity.species().display_name().to_lowercase()
    );
    if let Some(event) = event {
        let _ = write!(
            user,
            " The latest chapter is \"{}\": {}",
            event.title, event.description
        );
    }
    let _ = write!(user, " The title must include the name {}.", identity.name());

    let mut prompt = Prompt::new(TITLE_SYSTEM, user);
    prompt.temperature = Some(0.9);
    prompt
}

pub fn summary_prompt(identity: &PetIdentity, entries: &[String]) -> Prompt {
    let mut user = format!("Journal entries about {}:\n", identity.name());
    for entry in entries {
        let _ = writeln!(user, "- {entry}");
    }
    let mut prompt = Prompt::new(SUMMARY_SYSTEM, user);
    prompt.temperature = Some(0.3);
    prompt
}

pub fn speech_prompt(description: &str, pet_name: &str, options: &[EventOption]) -> Prompt {
    let mut user = format!("Story about {pet_name}:\n{description}\n\nChoices:\n");
    for (i, option) in options.iter().enumerate() {
        let _ = writeln!(user, "{}. {}", i + 1, option.text);
    }
    Prompt::new(SPEECH_SYSTEM, user)
}
