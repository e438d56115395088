// 🧮 View State - explicit state + message dispatch + derivation pipeline
//
// records → derived (power) → searched → summary

use crate::api::LoadError;
use crate::creature::{Creature, DerivedCreature};
use crate::filter::{search, SearchPattern, Summary, Threshold};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    Failed(String),
}

/// Everything that can change the view
#[derive(Debug)]
pub enum Message {
    Loaded(Result<Vec<Creature>, LoadError>),
    SearchChanged(String),
    ThresholdChanged(String),
}

#[derive(Debug)]
pub struct ViewState {
    derived: Vec<DerivedCreature>,
    search_input: String,
    pattern: SearchPattern,
    threshold_input: String,
    threshold: Threshold,
    load: LoadState,
}

/// Rendered view of the current state
#[derive(Debug)]
pub struct Snapshot<'a> {
    pub rows: Vec<&'a DerivedCreature>,
    pub summary: Summary,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    /// Empty view waiting for its first load
    pub fn new() -> Self {
        let threshold = Threshold::default();
        Self {
            derived: Vec::new(),
            search_input: String::new(),
            pattern: SearchPattern::Any,
            threshold_input: threshold.to_string(),
            threshold,
            load: LoadState::Loading,
        }
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::Loaded(Ok(records)) => {
                log::info!("view received {} creatures", records.len());
                self.derived = records.into_iter().map(DerivedCreature::from).collect();
                self.load = LoadState::Loaded;
            }
            Message::Loaded(Err(e)) => {
                log::error!("failed to load creatures: {}", e);
                self.load = LoadState::Failed(e.to_string());
            }
            Message::SearchChanged(text) => {
                self.pattern = SearchPattern::from_input(&text);
                self.search_input = text;
            }
            Message::ThresholdChanged(text) => {
                self.threshold = Threshold::parse(&text);
                self.threshold_input = text;
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let rows = search(&self.derived, &self.pattern);
        let summary = Summary::compute(&rows, self.threshold);
        Snapshot { rows, summary }
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn threshold_input(&self) -> &str {
        &self.threshold_input
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Search text did not compile and is matched literally
    pub fn literal_search(&self) -> bool {
        self.pattern.is_literal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creature::tests::{bulbasaur, flat_creature};
    use std::path::PathBuf;

    fn loaded(records: Vec<Creature>) -> ViewState {
        let mut view = ViewState::new();
        view.update(Message::Loaded(Ok(records)));
        view
    }

    fn io_failure() -> LoadError {
        LoadError::Io {
            path: PathBuf::from("pokemon.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        }
    }

    #[test]
    fn test_initial_state_is_empty() {
        let view = ViewState::new();
        let snap = view.snapshot();

        assert_eq!(view.load_state(), &LoadState::Loading);
        assert!(snap.rows.is_empty());
        assert_eq!(snap.summary, Summary::default());
        assert_eq!(view.threshold(), Threshold::Value(0));
        assert_eq!(view.threshold_input(), "0");
        assert_eq!(view.search_input(), "");
    }

    #[test]
    fn test_bulbasaur_example() {
        let mut view = loaded(vec![bulbasaur()]);
        view.update(Message::SearchChanged("bulba".to_string()));
        view.update(Message::ThresholdChanged("300".to_string()));

        let snap = view.snapshot();
        assert_eq!(snap.rows.len(), 1);
        assert_eq!(snap.rows[0].power, 318);
        assert_eq!(snap.summary.count_above, 1);
        assert_eq!((snap.summary.display_min(), snap.summary.display_max()), (318, 318));

        view.update(Message::ThresholdChanged("400".to_string()));
        let snap = view.snapshot();
        assert_eq!(snap.summary.count_above, 0);
        assert_eq!((snap.summary.display_min(), snap.summary.display_max()), (318, 318));
    }

    #[test]
    fn test_no_match_shows_zeroes() {
        let mut view = loaded(vec![bulbasaur()]);
        view.update(Message::SearchChanged("xyz".to_string()));

        let snap = view.snapshot();
        assert!(snap.rows.is_empty());
        assert_eq!(snap.summary.count_above, 0);
        assert_eq!((snap.summary.display_min(), snap.summary.display_max()), (0, 0));
    }

    #[test]
    fn test_invalid_threshold_counts_nothing() {
        let mut view = loaded(vec![bulbasaur(), flat_creature(2, "Weakling", 1)]);
        view.update(Message::ThresholdChanged("abc".to_string()));

        let snap = view.snapshot();
        assert_eq!(view.threshold(), Threshold::Invalid);
        assert_eq!(view.threshold_input(), "abc");
        assert_eq!(snap.rows.len(), 2);
        assert_eq!(snap.summary.count_above, 0);
        assert_eq!(snap.summary.min, Some(6));
        assert_eq!(snap.summary.max, Some(318));
    }

    #[test]
    fn test_invalid_search_does_not_crash() {
        let mut view = loaded(vec![bulbasaur()]);
        view.update(Message::SearchChanged("bulba(".to_string()));

        assert!(view.literal_search());
        assert!(view.snapshot().rows.is_empty());

        view.update(Message::SearchChanged("BULBA".to_string()));
        assert!(!view.literal_search());
        assert_eq!(view.snapshot().rows.len(), 1);
    }

    #[test]
    fn test_failed_load_keeps_previous_records() {
        let mut view = loaded(vec![bulbasaur()]);
        view.update(Message::Loaded(Err(io_failure())));

        match view.load_state() {
            LoadState::Failed(msg) => assert!(msg.contains("pokemon.json"), "message: {}", msg),
            other => panic!("expected failure, got {:?}", other),
        }
        let snap = view.snapshot();
        assert_eq!(snap.rows.len(), 1);
        assert_eq!(snap.rows[0].creature.name, "Bulbasaur");
        assert_eq!(snap.summary.max, Some(318));
    }

    #[test]
    fn test_failed_initial_load_is_empty() {
        let mut view = ViewState::new();
        view.update(Message::Loaded(Err(io_failure())));

        assert!(matches!(view.load_state(), LoadState::Failed(_)));
        assert!(view.snapshot().rows.is_empty());
    }

    #[test]
    fn test_reload_recomputes_power() {
        let mut view = loaded(vec![flat_creature(1, "Small", 1)]);
        assert_eq!(view.snapshot().summary.max, Some(6));

        view.update(Message::Loaded(Ok(vec![flat_creature(1, "Small", 10)])));
        assert_eq!(view.snapshot().summary.max, Some(60));
        assert_eq!(view.load_state(), &LoadState::Loaded);
    }
}
