//! Shared test helpers
//!
//! [`RecordingContext`] is a render context for tests: it answers conditions
//! from a fixed allow set and records every condition check and fragment
//! dispatch in render order. Fragments write nothing to the output, so
//! rendered text stays deterministic.

use std::collections::HashSet;

use crate::weft::render::RenderContext;

#[derive(Debug, Default)]
pub struct RecordingContext {
    /// Conditions answered `true`; everything else is `false`.
    pub allowed: HashSet<String>,
    /// Every condition asked, in render order.
    pub conditions: Vec<String>,
    /// Every fragment dispatched, in render order.
    pub fragments: Vec<(String, Vec<(String, String)>)>,
}

impl RecordingContext {
    /// A context that answers `true` for exactly the given conditions.
    pub fn allowing<I, S>(conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: conditions.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl RenderContext for RecordingContext {
    fn check_condition(&mut self, condition: &str) -> bool {
        self.conditions.push(condition.to_string());
        self.allowed.contains(condition)
    }

    fn run_fragment(&mut self, _out: &mut String, name: &str, params: &[(String, String)]) {
        self.fragments.push((name.to_string(), params.to_vec()));
    }
}
