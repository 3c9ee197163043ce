//! Completion candidates and their merging.

use std::collections::HashSet;

use serde::Serialize;

use crate::range::StringRange;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Suggestion {
    range: StringRange,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tooltip: Option<String>,
}

impl Suggestion {
    pub fn new(range: StringRange, text: impl Into<String>, tooltip: Option<String>) -> Self {
        Suggestion {
            range,
            text: text.into(),
            tooltip,
        }
    }

    /// Span of input the text replaces.
    pub fn range(&self) -> StringRange {
        self.range
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    /// `input` with the range replaced by this suggestion.
    pub fn apply(&self, input: &str) -> String {
        let chars: Vec<char> = input.chars().collect();
        let start = self.range.start.min(chars.len());
        let end = self.range.end.clamp(start, chars.len());
        let mut out: String = chars[..start].iter().collect();
        out.push_str(&self.text);
        out.extend(&chars[end..]);
        out
    }
}

/// A deduplicated, sorted list of suggestions and the range they cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestions {
    range: StringRange,
    #[serde(rename = "suggestions")]
    list: Vec<Suggestion>,
}

impl Suggestions {
    pub fn empty() -> Self {
        Suggestions {
            range: StringRange::at(0),
            list: Vec::new(),
        }
    }

    pub fn range(&self) -> StringRange {
        self.range
    }

    pub fn list(&self) -> &[Suggestion] {
        &self.list
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn into_list(self) -> Vec<Suggestion> {
        self.list
    }

    /// Drop duplicate `(text, tooltip)` pairs, sort case-insensitively and
    /// cover every contributing range.
    pub fn create(suggestions: impl IntoIterator<Item = Suggestion>) -> Self {
        let mut seen = HashSet::new();
        let mut list: Vec<Suggestion> = suggestions
            .into_iter()
            .filter(|s| seen.insert((s.text.clone(), s.tooltip.clone())))
            .collect();
        if list.is_empty() {
            return Suggestions::empty();
        }
        let range = list
            .iter()
            .map(|s| s.range)
            .reduce(StringRange::encompassing)
            .unwrap_or_default();
        list.sort_by(|a, b| {
            a.text
                .to_lowercase()
                .cmp(&b.text.to_lowercase())
                .then_with(|| a.text.cmp(&b.text))
        });
        Suggestions { range, list }
    }

    pub fn merge(all: impl IntoIterator<Item = Suggestions>) -> Self {
        let mut all: Vec<Suggestions> = all.into_iter().filter(|s| !s.is_empty()).collect();
        match all.len() {
            0 => Suggestions::empty(),
            1 => all.swap_remove(0),
            _ => Suggestions::create(all.into_iter().flat_map(Suggestions::into_list)),
        }
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&Suggestion) -> bool) {
        self.list.retain(keep);
        if self.list.is_empty() {
            *self = Suggestions::empty();
        }
    }

    /// Keep the first `max` entries and shrink the range to cover them.
    pub(crate) fn truncate(&mut self, max: usize) {
        if self.list.len() <= max {
            return;
        }
        self.list.truncate(max);
        *self = Suggestions::create(std::mem::take(&mut self.list));
    }
}

impl Default for Suggestions {
    fn default() -> Self {
        Suggestions::empty()
    }
}

/// Collects suggestions for the text typed since `start`.
#[derive(Debug, Clone)]
pub struct SuggestionsBuilder {
    remaining: String,
    lowercase: String,
    start: usize,
    result: Vec<Suggestion>,
}

impl SuggestionsBuilder {
    pub fn new(remaining: impl Into<String>, start: usize) -> Self {
        let remaining = remaining.into();
        SuggestionsBuilder {
            lowercase: remaining.to_lowercase(),
            remaining,
            start,
            result: Vec::new(),
        }
    }

    /// Text typed so far.
    pub fn remaining(&self) -> &str {
        &self.remaining
    }

    pub fn remaining_lowercase(&self) -> &str {
        &self.lowercase
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn suggest(&mut self, text: impl Into<String>) -> &mut Self {
        self.suggest_with_tooltip(text, None)
    }

    /// Add a candidate replacing the typed text. Text equal to what is
    /// already typed is ignored.
    pub fn suggest_with_tooltip(&mut self, text: impl Into<String>, tooltip: Option<&str>) -> &mut Self {
        let text = text.into();
        if text == self.remaining {
            return self;
        }
        let range = StringRange::between(self.start, self.start + self.remaining.chars().count());
        self.result
            .push(Suggestion::new(range, text, tooltip.map(str::to_owned)));
        self
    }

    /// Same typed text, no candidates yet.
    pub fn clean(&self) -> SuggestionsBuilder {
        SuggestionsBuilder::new(self.remaining.clone(), self.start)
    }

    pub fn build(self) -> Suggestions {
        Suggestions::create(self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(suggestions: &Suggestions) -> Vec<&str> {
        suggestions.list().iter().map(Suggestion::text).collect()
    }

    #[test]
    fn builder_covers_typed_prefix_and_skips_exact_match() {
        let mut builder = SuggestionsBuilder::new("co", 4);
        builder.suggest("command").suggest("co").suggest("Copy");
        let built = builder.build();
        assert_eq!(texts(&built), vec!["command", "Copy"]);
        assert_eq!(built.range(), StringRange::between(4, 6));
    }

    #[test]
    fn create_dedups_and_sorts_case_insensitively() {
        let at = StringRange::at(0);
        let built = Suggestions::create([
            Suggestion::new(at, "beta", None),
            Suggestion::new(at, "Alpha", None),
            Suggestion::new(at, "beta", None),
            Suggestion::new(at, "beta", Some("tip".into())),
        ]);
        assert_eq!(texts(&built), vec!["Alpha", "beta", "beta"]);
    }

    #[test]
    fn merge_takes_covering_range() {
        let left = Suggestions::create([Suggestion::new(StringRange::between(2, 4), "b", None)]);
        let right = Suggestions::create([Suggestion::new(StringRange::between(0, 3), "a", None)]);
        let merged = Suggestions::merge([left, Suggestions::empty(), right]);
        assert_eq!(texts(&merged), vec!["a", "b"]);
        assert_eq!(merged.range(), StringRange::between(0, 4));
    }

    #[test]
    fn merge_of_one_is_identity() {
        let only = Suggestions::create([Suggestion::new(StringRange::at(5), "x", None)]);
        assert_eq!(Suggestions::merge([only.clone()]), only);
        assert!(Suggestions::merge(Vec::new()).is_empty());
    }

    #[test]
    fn truncate_shrinks_range_to_kept_entries() {
        let mut built = Suggestions::create([
            Suggestion::new(StringRange::between(4, 6), "alpha", None),
            Suggestion::new(StringRange::between(0, 6), "beta", None),
        ]);
        assert_eq!(built.range(), StringRange::between(0, 6));
        built.truncate(1);
        assert_eq!(texts(&built), vec!["alpha"]);
        assert_eq!(built.range(), StringRange::between(4, 6));
        built.truncate(0);
        assert!(built.is_empty());
        assert_eq!(built.range(), StringRange::at(0));
    }

    #[test]
    fn apply_replaces_range() {
        let suggestion = Suggestion::new(StringRange::between(5, 7), "command", None);
        assert_eq!(suggestion.apply("help co"), "help command");
    }
}
