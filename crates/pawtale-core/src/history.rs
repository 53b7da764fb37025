use serde::{Deserialize, Serialize};

use crate::event::{Event, EventOption};
use crate::stats::Action;

/// Ordered, human-readable record of what happened to the pet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog(Vec<String>);

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        self.0.push(entry.into());
    }

    pub fn record_action(&mut self, pet_name: &str, action: Action) {
        let phrase = match action {
            Action::Feed => "was fed",
            Action::Play => "played",
            Action::Rest => "took a rest",
        };
        self.push(format!("{pet_name} {phrase}."));
    }

    pub fn record_choice(&mut self, event: &Event, chosen: &EventOption) {
        self.push(format!(
            "Event: {} - Description: {} - Chose: {}",
            event.title, event.description, chosen.text
        ));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.0
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[String] {
        let start = self.0.len().saturating_sub(n);
        &self.0[start..]
    }

    pub fn oldest(&self, n: usize) -> &[String] {
        &self.0[..n.min(self.0.len())]
    }

    /// Drop the oldest `n` entries once they have been summarised.
    pub fn fold_oldest(&mut self, n: usize) {
        let n = n.min(self.0.len());
        self.0.drain(..n);
    }

    /// Keep only the most recent `max` entries.
    pub fn cap(&mut self, max: usize) {
        let excess = self.0.len().saturating_sub(max);
        if excess > 0 {
            self.0.drain(..excess);
        }
    }
}

impl From<Vec<String>> for HistoryLog {
    fn from(entries: Vec<String>) -> Self {
        Self(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Effect, EventKind};

    fn log_of(n: usize) -> HistoryLog {
        (0..n).map(|i| format!("entry {i}")).collect::<Vec<_>>().into()
    }

    #[test]
    fn choice_entry_format() {
        let option = EventOption {
            text: "Chase it".into(),
            effect: Effect::new(0, -1, 2),
            reasoning: None,
        };
        let event = Event {
            id: None,
            kind: EventKind::Random,
            title: "A Butterfly".into(),
            description: "Something flutters by.".into(),
            options: vec![option.clone()],
            image_url: None,
        };
        let mut log = HistoryLog::new();
        log.record_choice(&event, &option);
        assert_eq!(
            log.entries()[0],
            "Event: A Butterfly - Description: Something flutters by. - Chose: Chase it"
        );
    }

    #[test]
    fn action_entries_name_the_pet() {
        let mut log = HistoryLog::new();
        log.record_action("Luna", Action::Feed);
        log.record_action("Luna", Action::Rest);
        assert_eq!(log.entries(), ["Luna was fed.", "Luna took a rest."]);
    }

    #[test]
    fn recent_and_oldest_slices() {
        let log = log_of(12);
        assert_eq!(log.recent(3), ["entry 9", "entry 10", "entry 11"]);
        assert_eq!(log.oldest(2), ["entry 0", "entry 1"]);
        assert_eq!(log.recent(50).len(), 12);
    }

    #[test]
    fn fold_removes_oldest() {
        let mut log = log_of(11);
        log.fold_oldest(10);
        assert_eq!(log.entries(), ["entry 10"]);
    }

    #[test]
    fn cap_keeps_most_recent() {
        let mut log = log_of(18);
        log.cap(15);
        assert_eq!(log.len(), 15);
        assert_eq!(log.entries()[0], "entry 3");

        let mut short = log_of(4);
        short.cap(15);
        assert_eq!(short.len(), 4);
    }

    #[test]
    fn serializes_as_plain_list() {
        let log = log_of(2);
        assert_eq!(
            serde_json::to_string(&log).unwrap(),
            r#"["entry 0","entry 1"]"#
        );
    }
}
