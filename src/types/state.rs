use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::error::EngineError;

pub(crate) const CURRENT_NODE: &str = "current_node";
pub(crate) const PATH: &str = "path";
pub(crate) const RESPONSES: &str = "accepted_responses";
pub(crate) const CURRENT_ANSWERS: &str = "current_answers";

/// A value held in a [`State`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateValue {
    /// A single textual answer or node name.
    Text(String),
    /// An ordered sequence, oldest first (`path`, `accepted_responses`).
    List(Vec<String>),
}

impl StateValue {
    /// Returns the text if this is a [`StateValue::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StateValue::Text(s) => Some(s),
            StateValue::List(_) => None,
        }
    }

    /// Returns the items if this is a [`StateValue::List`].
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            StateValue::List(items) => Some(items),
            StateValue::Text(_) => None,
        }
    }
}

impl From<&str> for StateValue {
    fn from(v: &str) -> Self {
        StateValue::Text(v.to_owned())
    }
}

impl From<String> for StateValue {
    fn from(v: String) -> Self {
        StateValue::Text(v)
    }
}

impl From<&String> for StateValue {
    fn from(v: &String) -> Self {
        StateValue::Text(v.clone())
    }
}

impl From<Vec<String>> for StateValue {
    fn from(v: Vec<String>) -> Self {
        StateValue::List(v)
    }
}

impl From<Vec<&str>> for StateValue {
    fn from(v: Vec<&str>) -> Self {
        StateValue::List(v.into_iter().map(str::to_owned).collect())
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Text(v) => write!(f, "{v}"),
            StateValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// Immutable session data: answers given so far, the visited path and the
/// node the session is currently on.
///
/// Every key is normalized on the way in and on the way out, so `":Path"`,
/// `"path"` and `" PATH "` address the same entry. `responses` is an alias of
/// `accepted_responses`.
///
/// [`put`](State::put) never modifies the receiver; it returns a new state.
/// Two states are equal only when they hold exactly the same keys with the
/// same values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State {
    data: BTreeMap<String, StateValue>,
}

impl State {
    /// Create a state positioned on `current_node` with empty `path`,
    /// `accepted_responses` and `current_answers`.
    #[must_use]
    pub fn new(current_node: &str) -> Self {
        let mut data = BTreeMap::new();
        data.insert(CURRENT_NODE.to_owned(), StateValue::from(current_node));
        data.insert(PATH.to_owned(), StateValue::List(Vec::new()));
        data.insert(RESPONSES.to_owned(), StateValue::List(Vec::new()));
        data.insert(CURRENT_ANSWERS.to_owned(), StateValue::List(Vec::new()));
        Self { data }
    }

    /// Build a state from arbitrary pairs. `current_node` must be among them;
    /// the other reserved sequences default to empty when absent.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingCurrentNode`] if no `current_node` pair is given.
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self, EngineError>
    where
        K: AsRef<str>,
        V: Into<StateValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let data: BTreeMap<String, StateValue> = pairs
            .into_iter()
            .map(|(k, v)| (normalize_key(k.as_ref()), v.into()))
            .collect();
        if !data.contains_key(CURRENT_NODE) {
            return Err(EngineError::MissingCurrentNode);
        }
        let mut state = Self { data };
        for key in [PATH, RESPONSES, CURRENT_ANSWERS] {
            state
                .data
                .entry(key.to_owned())
                .or_insert_with(|| StateValue::List(Vec::new()));
        }
        Ok(state)
    }

    /// Look up a value.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UndefinedValue`] if the key is absent.
    pub fn get(&self, key: &str) -> Result<&StateValue, EngineError> {
        let key = normalize_key(key);
        self.data
            .get(&key)
            .ok_or(EngineError::UndefinedValue { key })
    }

    /// Look up a textual value.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UndefinedValue`] if absent, or
    /// [`EngineError::TypeMismatch`] if the key holds a list.
    pub fn get_text(&self, key: &str) -> Result<&str, EngineError> {
        self.get(key)?
            .as_text()
            .ok_or_else(|| EngineError::TypeMismatch {
                key: normalize_key(key),
                expected: "text",
            })
    }

    /// Look up a list value.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UndefinedValue`] if absent, or
    /// [`EngineError::TypeMismatch`] if the key holds text.
    pub fn get_list(&self, key: &str) -> Result<&[String], EngineError> {
        self.get(key)?
            .as_list()
            .ok_or_else(|| EngineError::TypeMismatch {
                key: normalize_key(key),
                expected: "list",
            })
    }

    /// Return a copy of this state with `key` set to `value`.
    #[must_use]
    pub fn put(&self, key: &str, value: impl Into<StateValue>) -> Self {
        let mut data = self.data.clone();
        data.insert(normalize_key(key), value.into());
        Self { data }
    }

    /// Whether a value is stored under `key` after normalization.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(&normalize_key(key))
    }

    /// The set of normalized keys held by this state.
    #[must_use]
    pub fn keys(&self) -> BTreeSet<String> {
        self.data.keys().cloned().collect()
    }

    /// # Errors
    ///
    /// Fails only for states whose `current_node` was overwritten with a list.
    pub fn current_node(&self) -> Result<&str, EngineError> {
        self.get_text(CURRENT_NODE)
    }

    /// Names of the nodes visited so far, oldest first.
    ///
    /// # Errors
    ///
    /// Fails if `path` was removed or overwritten with text.
    pub fn path(&self) -> Result<&[String], EngineError> {
        self.get_list(PATH)
    }

    /// Raw inputs accepted so far, oldest first.
    ///
    /// # Errors
    ///
    /// Fails if `accepted_responses` was overwritten with text.
    pub fn responses(&self) -> Result<&[String], EngineError> {
        self.get_list(RESPONSES)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State(")?;
        for (i, (key, value)) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        write!(f, ")")
    }
}

/// Canonical form of a state key: trimmed, without a leading `:` symbol
/// marker, ASCII-lowercased. `responses` folds onto `accepted_responses`.
pub(crate) fn normalize_key(key: &str) -> String {
    let trimmed = key.trim();
    let bare = trimmed.strip_prefix(':').unwrap_or(trimmed);
    let lowered = bare.to_ascii_lowercase();
    if lowered == "responses" {
        RESPONSES.to_owned()
    } else {
        lowered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_initializes_reserved_sequences() {
        let state = State::new("start_state");
        assert_eq!(state.get_list("accepted_responses").unwrap(), &[] as &[String]);
        assert_eq!(state.get_list("path").unwrap(), &[] as &[String]);
        assert_eq!(state.get_list("current_answers").unwrap(), &[] as &[String]);
    }

    #[test]
    fn from_pairs_requires_current_node() {
        let result = State::from_pairs([("a", "1")]);
        assert_eq!(result, Err(EngineError::MissingCurrentNode));
    }

    #[test]
    fn from_pairs_defaults_sequences() {
        let state = State::from_pairs([("current_node", "red"), ("a", "1")]).unwrap();
        assert_eq!(state.path().unwrap(), &[] as &[String]);
        assert_eq!(state.get_text("a").unwrap(), "1");
    }

    #[test]
    fn get_undefined_value() {
        let state = State::new("start_state");
        assert_eq!(
            state.get("a"),
            Err(EngineError::UndefinedValue { key: "a".into() })
        );
    }

    #[test]
    fn key_access_is_normalized() {
        let state = State::new("start_state");
        assert_eq!(state.get_text(":current_node").unwrap(), "start_state");
        assert_eq!(state.get_text("Current_Node").unwrap(), "start_state");
        assert_eq!(state.get_text(" current_node ").unwrap(), "start_state");

        let s2 = state.put(":b", "1");
        assert_eq!(s2.get_text("b").unwrap(), "1");
        let s3 = state.put("b", "2");
        assert_eq!(s3.get_text(":b").unwrap(), "2");
    }

    #[test]
    fn responses_aliases_accepted_responses() {
        let state = State::new("start").put("responses", vec!["yes"]);
        assert_eq!(state.get_list("accepted_responses").unwrap(), &["yes".to_owned()]);
        assert_eq!(state.responses().unwrap(), &["yes".to_owned()]);
    }

    #[test]
    fn keys_returns_all_normalized_keys() {
        let state = State::new("start_state");
        let expected: BTreeSet<String> =
            ["current_node", "path", "accepted_responses", "current_answers"]
                .into_iter()
                .map(str::to_owned)
                .collect();
        assert_eq!(state.keys(), expected);
    }

    #[test]
    fn put_leaves_original_unchanged() {
        let state = State::new("start_state");
        let next = state.put("a", "1");
        assert!(state.get("a").is_err());
        assert_eq!(next.get_text("a").unwrap(), "1");
    }

    #[test]
    fn equality_is_structural() {
        let s1 = State::new("red");
        let s2 = State::new("red");
        let s3 = State::new("green");
        let s4 = State::new("red").put("a", "1");
        assert_eq!(s1, s2);
        assert_ne!(s1, s3);
        assert_ne!(s1, s4);
        assert_ne!(s4, s1);
    }

    #[test]
    fn typed_accessors_report_mismatch() {
        let state = State::new("red");
        assert_eq!(
            state.get_text("path"),
            Err(EngineError::TypeMismatch {
                key: "path".into(),
                expected: "text",
            })
        );
        assert!(state.get_list("current_node").is_err());
    }

    #[test]
    fn display_lists_entries_in_key_order() {
        let state = State::new("red").put("a", "1");
        assert_eq!(
            state.to_string(),
            "State(a: 1, accepted_responses: [], current_answers: [], current_node: red, path: [])"
        );
    }
}
