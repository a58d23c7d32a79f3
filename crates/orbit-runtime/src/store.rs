#![forbid(unsafe_code)]

//! Step store and persisted runtime state.
//!
//! [`StepStore`] owns the ordered step list and the [`RuntimeState`]. The
//! current index is a pure derivation of the state: `None` iff the tour is
//! inactive, otherwise the index of `currentStepId`, falling back to `0`
//! when the id no longer names a step.
//!
//! State is persisted as camelCase JSON under the composite storage key.
//! Persistence is best effort: every storage or decoding failure is logged
//! at `warn` and otherwise ignored.

use std::collections::HashSet;
use std::fmt;

use orbit_core::step::Step;
use serde::{Deserialize, Serialize};

use crate::host::{Storage, StorageError};

/// Tour progress, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeState {
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step_id: Option<String>,
    /// Visited step ids, in first-visit order without duplicates.
    #[serde(default)]
    pub visited: Vec<String>,
}

impl RuntimeState {
    pub fn to_json(&self) -> Result<String, PersistError> {
        serde_json::to_string(self).map_err(PersistError::Encode)
    }

    pub fn from_json(raw: &str) -> Result<Self, PersistError> {
        let mut state: Self = serde_json::from_str(raw).map_err(PersistError::Decode)?;
        state.dedup_visited();
        Ok(state)
    }

    /// Record a visit, keeping first-visit order.
    pub fn visit(&mut self, id: &str) {
        if !self.has_visited(id) {
            self.visited.push(id.to_owned());
        }
    }

    pub fn has_visited(&self, id: &str) -> bool {
        self.visited.iter().any(|v| v == id)
    }

    fn dedup_visited(&mut self) {
        let mut seen = HashSet::new();
        self.visited.retain(|id| seen.insert(id.clone()));
    }
}

/// Failure to load or save [`RuntimeState`].
#[derive(Debug)]
pub enum PersistError {
    Storage(StorageError),
    Encode(serde_json::Error),
    Decode(serde_json::Error),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode tour state: {err}"),
            Self::Decode(err) => write!(f, "failed to decode tour state: {err}"),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) | Self::Decode(err) => Some(err),
        }
    }
}

impl From<StorageError> for PersistError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

/// Read persisted state under `key`.
pub fn load_state(storage: &dyn Storage, key: &str) -> Result<Option<RuntimeState>, PersistError> {
    match storage.get_item(key)? {
        Some(raw) => RuntimeState::from_json(&raw).map(Some),
        None => Ok(None),
    }
}

/// Write `state` under `key`.
pub fn save_state(storage: &mut dyn Storage, key: &str, state: &RuntimeState) -> Result<(), PersistError> {
    let raw = state.to_json()?;
    storage.set_item(key, &raw)?;
    Ok(())
}

/// Ordered steps plus runtime state.
#[derive(Debug, Clone, Default)]
pub struct StepStore {
    steps: Vec<Step>,
    state: RuntimeState,
}

impl StepStore {
    pub fn new(steps: Vec<Step>) -> Self {
        let mut store = Self::default();
        store.set_steps(steps);
        store
    }

    /// Replace the step list.
    ///
    /// Duplicate ids are kept (first match wins on lookup) and logged once.
    pub fn set_steps(&mut self, steps: Vec<Step>) {
        {
            let mut seen = HashSet::new();
            for step in &steps {
                if !seen.insert(step.id.as_str()) {
                    tracing::warn!(target: "orbit.store", id = %step.id, "duplicate step id; first occurrence wins");
                }
            }
        }
        self.steps = steps;
        if self.steps.is_empty() {
            self.state.active = false;
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Index of the first step with `id`.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }

    pub fn state(&self) -> &RuntimeState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active && !self.steps.is_empty()
    }

    /// `None` iff inactive; otherwise the current step's index, `0` when
    /// the stored id is stale.
    pub fn current_index(&self) -> Option<usize> {
        if !self.is_active() {
            return None;
        }
        Some(
            self.state
                .current_step_id
                .as_deref()
                .and_then(|id| self.index_of(id))
                .unwrap_or(0),
        )
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.current_index().and_then(|i| self.steps.get(i))
    }

    pub fn visit(&mut self, id: &str) {
        self.state.visit(id);
    }

    /// Make `index` current, mark it visited and activate.
    ///
    /// Returns the step id, or `None` when out of range.
    pub fn activate_at(&mut self, index: usize) -> Option<String> {
        let id = self.steps.get(index)?.id.clone();
        self.state.active = true;
        self.state.current_step_id = Some(id.clone());
        self.state.visit(&id);
        Some(id)
    }

    /// Deactivate and forget the current step so a reload does not resume.
    /// The visited set is kept.
    ///
    /// Returns whether the store was active.
    pub fn deactivate(&mut self) -> bool {
        let was_active = self.state.active;
        self.state.active = false;
        self.state.current_step_id = None;
        was_active
    }

    /// Adopt a previously persisted state.
    ///
    /// Only states with a `currentStepId` are adopted; a stale id is
    /// normalized to the first step. Returns whether the tour is now active.
    pub fn adopt(&mut self, saved: RuntimeState) -> bool {
        let Some(saved_id) = saved.current_step_id else {
            return false;
        };
        if self.steps.is_empty() {
            return false;
        }
        let id = if self.index_of(&saved_id).is_some() {
            saved_id
        } else {
            tracing::warn!(target: "orbit.store", stale = %saved_id, "persisted step no longer exists; restarting at first step");
            self.steps[0].id.clone()
        };
        self.state = RuntimeState {
            active: true,
            current_step_id: Some(id),
            visited: saved.visited,
        };
        true
    }

    /// Load and adopt persisted state, swallowing failures.
    pub fn resume(&mut self, storage: &dyn Storage, key: &str) -> bool {
        match load_state(storage, key) {
            Ok(Some(saved)) => self.adopt(saved),
            Ok(None) => false,
            Err(err) => {
                tracing::warn!(target: "orbit.store", key, error = %err, "failed to read tour state");
                false
            }
        }
    }

    /// Persist the current state, swallowing failures.
    pub fn persist(&self, storage: &mut dyn Storage, key: &str) {
        if let Err(err) = save_state(storage, key, &self.state) {
            tracing::warn!(target: "orbit.store", key, error = %err, "failed to persist tour state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapStorage {
        items: HashMap<String, String>,
        fail: bool,
    }

    impl Storage for MapStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.fail {
                return Err(StorageError::Unavailable);
            }
            Ok(self.items.get(key).cloned())
        }

        fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail {
                return Err(StorageError::QuotaExceeded);
            }
            self.items.insert(key.to_owned(), value.to_owned());
            Ok(())
        }
    }

    fn three() -> StepStore {
        StepStore::new(vec![
            Step::new("a", "A"),
            Step::new("b", "B"),
            Step::new("c", "C"),
        ])
    }

    #[test]
    fn current_index_none_iff_inactive() {
        let mut store = three();
        assert_eq!(store.current_index(), None);
        store.activate_at(1);
        assert_eq!(store.current_index(), Some(1));
        store.deactivate();
        assert_eq!(store.current_index(), None);
        assert_eq!(store.state().current_step_id, None);
        assert_eq!(store.state().visited, vec!["b"]);
    }

    #[test]
    fn stale_id_maps_to_zero() {
        let mut store = three();
        assert!(store.adopt(RuntimeState {
            active: true,
            current_step_id: Some("gone".into()),
            visited: vec!["a".into()],
        }));
        assert_eq!(store.current_index(), Some(0));
        assert_eq!(store.state().current_step_id.as_deref(), Some("a"));
    }

    #[test]
    fn adopt_requires_current_id() {
        let mut store = three();
        assert!(!store.adopt(RuntimeState::default()));
        assert!(!store.state().active);
    }

    #[test]
    fn wire_format_is_camel_case() {
        let state = RuntimeState {
            active: true,
            current_step_id: Some("b".into()),
            visited: vec!["a".into(), "b".into()],
        };
        assert_eq!(
            state.to_json().unwrap(),
            r#"{"active":true,"currentStepId":"b","visited":["a","b"]}"#
        );
        let decoded = RuntimeState::from_json(r#"{"active":false,"visited":["a","a","b"]}"#).unwrap();
        assert_eq!(decoded.visited, vec!["a", "b"]);
        assert_eq!(decoded.current_step_id, None);
    }

    #[test]
    fn visit_dedups_preserving_order() {
        let mut state = RuntimeState::default();
        for id in ["b", "a", "b", "c", "a"] {
            state.visit(id);
        }
        assert_eq!(state.visited, vec!["b", "a", "c"]);
    }

    #[test]
    fn persist_and_resume_roundtrip() {
        let mut storage = MapStorage::default();
        let mut store = three();
        store.activate_at(0);
        store.activate_at(2);
        store.persist(&mut storage, "k");

        let mut fresh = three();
        assert!(fresh.resume(&storage, "k"));
        assert_eq!(fresh.current_index(), Some(2));
        assert_eq!(fresh.state().visited, vec!["a", "c"]);
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let mut storage = MapStorage {
            fail: true,
            ..Default::default()
        };
        let mut store = three();
        store.activate_at(0);
        store.persist(&mut storage, "k");
        assert!(!store.resume(&storage, "k"));
        assert_eq!(store.current_index(), Some(0));
    }

    #[test]
    fn corrupt_state_does_not_resume() {
        let mut storage = MapStorage::default();
        storage.items.insert("k".into(), "{not json".into());
        let mut store = three();
        assert!(!store.resume(&storage, "k"));
        assert_eq!(store.current_index(), None);
        assert!(matches!(load_state(&storage, "k"), Err(PersistError::Decode(_))));
    }

    #[test]
    fn empty_store_never_active() {
        let mut store = StepStore::new(Vec::new());
        assert_eq!(store.activate_at(0), None);
        assert!(!store.adopt(RuntimeState {
            active: true,
            current_step_id: Some("x".into()),
            visited: Vec::new(),
        }));
        assert_eq!(store.current_index(), None);
    }

    #[test]
    fn duplicate_ids_first_wins() {
        let store = StepStore::new(vec![Step::new("a", "1"), Step::new("a", "2")]);
        assert_eq!(store.index_of("a"), Some(0));
    }
}
