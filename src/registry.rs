use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::State;

type PredicateFn = Arc<dyn Fn(&State) -> bool + Send + Sync>;
type FunctionFn = Arc<dyn Fn(&[String], &State) -> bool + Send + Sync>;
type CountryTableFn = Arc<dyn Fn() -> Vec<(String, String)> + Send + Sync>;

/// Application-defined behavior the flow documents refer to by name.
///
/// Holds the named predicates (`eea_passport?`), predicate functions
/// (`within_days(arrival, 30)`) and country tables (`[country: origin,
/// countries: all_countries]`). The registry is passed explicitly to the
/// compiler and the engine; nothing is looked up globally.
///
/// # Example
///
/// ```
/// use flowdown::Registry;
///
/// let registry = Registry::new()
///     .predicate("eea_passport?", |state| {
///         state.get_text("passport").is_ok_and(|p| p == "greek")
///     })
///     .country_table("all_countries", || {
///         vec![("fr".to_owned(), "France".to_owned())]
///     });
/// assert!(registry.has_predicate("eea_passport?"));
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    predicates: HashMap<String, PredicateFn>,
    functions: HashMap<String, FunctionFn>,
    country_tables: HashMap<String, CountryTableFn>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named predicate evaluated against the current state.
    #[must_use]
    pub fn predicate(
        mut self,
        name: &str,
        f: impl Fn(&State) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicates.insert(name.to_owned(), Arc::new(f));
        self
    }

    /// Register a predicate function receiving the literal call arguments.
    #[must_use]
    pub fn function(
        mut self,
        name: &str,
        f: impl Fn(&[String], &State) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.functions.insert(name.to_owned(), Arc::new(f));
        self
    }

    /// Register a provider of `(code, label)` pairs for country questions.
    #[must_use]
    pub fn country_table(
        mut self,
        name: &str,
        f: impl Fn() -> Vec<(String, String)> + Send + Sync + 'static,
    ) -> Self {
        self.country_tables.insert(name.to_owned(), Arc::new(f));
        self
    }

    #[must_use]
    pub fn has_predicate(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    pub(crate) fn call_predicate(&self, name: &str, state: &State) -> Option<bool> {
        self.predicates.get(name).map(|f| f(state))
    }

    pub(crate) fn call_function(
        &self,
        name: &str,
        arguments: &[String],
        state: &State,
    ) -> Option<bool> {
        self.functions.get(name).map(|f| f(arguments, state))
    }

    pub(crate) fn countries(&self, name: &str) -> Option<Vec<(String, String)>> {
        self.country_tables.get(name).map(|f| f())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut predicates: Vec<&str> = self.predicates.keys().map(String::as_str).collect();
        let mut functions: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        let mut tables: Vec<&str> = self.country_tables.keys().map(String::as_str).collect();
        predicates.sort_unstable();
        functions.sort_unstable();
        tables.sort_unstable();
        f.debug_struct("Registry")
            .field("predicates", &predicates)
            .field("functions", &functions)
            .field("country_tables", &tables)
            .finish()
    }
}
