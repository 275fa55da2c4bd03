//! Fuzzy file picker model.
//!
//! [`PickerState`] holds the query and scored results for the interactive
//! overlay; [`BestMatchPicker`] picks non-interactively for `--find`.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::tree::{locale_compare, FileHandle};

/// One entry offered by the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchItem {
    /// Root-relative path, the primary match text
    pub label: String,
    /// Bare file name, the secondary match text
    pub description: String,
    pub handle: FileHandle,
}

impl SearchItem {
    pub fn new(label: String, handle: FileHandle) -> Self {
        let description = handle.file_name().to_string();
        Self {
            label,
            description,
            handle,
        }
    }
}

/// Lets the user choose one of `items`, or cancel with `None`.
pub trait Picker {
    fn pick(&mut self, items: Vec<SearchItem>) -> Option<SearchItem>;
}

/// A scored picker entry.
#[derive(Debug, Clone)]
pub struct PickerMatch {
    pub item: SearchItem,
    pub score: i64,
    /// Character indices of the label that matched, for highlighting.
    pub label_indices: Vec<usize>,
}

/// Score `item` against `query`: the label first, the file name as fallback.
fn score_item(matcher: &SkimMatcherV2, item: &SearchItem, query: &str) -> Option<(i64, Vec<usize>)> {
    let on_label = matcher.fuzzy_indices(&item.label, query);
    let on_description = matcher.fuzzy_match(&item.description, query);

    match (on_label, on_description) {
        (Some((score, indices)), Some(desc)) => Some((score.max(desc), indices)),
        (Some(hit), None) => Some(hit),
        (None, Some(desc)) => Some((desc, Vec::new())),
        (None, None) => None,
    }
}

/// Rank `items` for `query`, best first. An empty query keeps every item,
/// ordered by label.
pub fn rank(matcher: &SkimMatcherV2, items: &[SearchItem], query: &str) -> Vec<PickerMatch> {
    let query = query.trim();

    let mut matches: Vec<PickerMatch> = if query.is_empty() {
        items
            .iter()
            .map(|item| PickerMatch {
                item: item.clone(),
                score: 0,
                label_indices: Vec::new(),
            })
            .collect()
    } else {
        items
            .iter()
            .filter_map(|item| {
                let (score, label_indices) = score_item(matcher, item, query)?;
                Some(PickerMatch {
                    item: item.clone(),
                    score,
                    label_indices,
                })
            })
            .collect()
    };

    matches.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| locale_compare(&a.item.label, &b.item.label))
    });
    matches
}

/// State of the interactive picker overlay.
pub struct PickerState {
    items: Vec<SearchItem>,
    matcher: SkimMatcherV2,
    pub query: String,
    pub results: Vec<PickerMatch>,
    pub selected_index: usize,
}

impl PickerState {
    pub fn new(items: Vec<SearchItem>) -> Self {
        let mut state = Self {
            items,
            matcher: SkimMatcherV2::default(),
            query: String::new(),
            results: Vec::new(),
            selected_index: 0,
        };
        state.update_results();
        state
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.update_results();
    }

    pub fn backspace(&mut self) {
        if self.query.pop().is_some() {
            self.update_results();
        }
    }

    pub fn select_next(&mut self) {
        if self.selected_index + 1 < self.results.len() {
            self.selected_index += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn selected(&self) -> Option<&SearchItem> {
        self.results.get(self.selected_index).map(|m| &m.item)
    }

    fn update_results(&mut self) {
        self.results = rank(&self.matcher, &self.items, &self.query);
        self.selected_index = 0;
    }
}

/// Picks the best match for a fixed query without user interaction.
pub struct BestMatchPicker {
    query: String,
    matcher: SkimMatcherV2,
}

impl BestMatchPicker {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            matcher: SkimMatcherV2::default(),
        }
    }
}

impl Picker for BestMatchPicker {
    fn pick(&mut self, items: Vec<SearchItem>) -> Option<SearchItem> {
        if self.query.trim().is_empty() {
            return None;
        }
        rank(&self.matcher, &items, &self.query)
            .into_iter()
            .next()
            .map(|m| m.item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn items(paths: &[&str]) -> Vec<SearchItem> {
        paths
            .iter()
            .map(|p| SearchItem::new(p.to_string(), FileHandle::new(*p, PathBuf::from("/ws").join(p))))
            .collect()
    }

    fn labels(state: &PickerState) -> Vec<&str> {
        state.results.iter().map(|m| m.item.label.as_str()).collect()
    }

    #[test]
    fn test_description_is_file_name() {
        let item = &items(&["docs/api/usage.md"])[0];
        assert_eq!(item.description, "usage.md");
    }

    #[test]
    fn test_empty_query_lists_everything_sorted() {
        let state = PickerState::new(items(&["zeta.md", "docs/README.md", "alpha.md"]));
        assert_eq!(labels(&state), vec!["alpha.md", "docs/README.md", "zeta.md"]);
        assert_eq!(state.item_count(), 3);
    }

    #[test]
    fn test_query_filters() {
        let mut state = PickerState::new(items(&["docs/guide.md", "README.md", "crates/core/README.md"]));
        for c in "guide".chars() {
            state.push_char(c);
        }
        assert_eq!(labels(&state), vec!["docs/guide.md"]);
        assert!(!state.results[0].label_indices.is_empty());

        state.push_char('x');
        assert!(state.results.is_empty());
        assert!(state.selected().is_none());

        state.backspace();
        assert_eq!(labels(&state), vec!["docs/guide.md"]);
    }

    #[test]
    fn test_selection_bounds() {
        let mut state = PickerState::new(items(&["a.md", "b.md"]));
        state.select_previous();
        assert_eq!(state.selected_index, 0);
        state.select_next();
        state.select_next();
        assert_eq!(state.selected_index, 1);
        assert_eq!(state.selected().unwrap().label, "b.md");
    }

    #[test]
    fn test_large_workspace_keeps_every_result() {
        let paths: Vec<String> = (0..250).map(|i| format!("f{:03}.md", i)).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let mut state = PickerState::new(items(&refs));
        assert_eq!(state.results.len(), 250);

        for _ in 0..300 {
            state.select_next();
        }
        assert_eq!(state.selected_index, 249);
        assert_eq!(state.selected().unwrap().label, "f249.md");

        state.push_char('f');
        assert_eq!(state.results.len(), 250);
    }

    #[test]
    fn test_best_match_picker() {
        let mut picker = BestMatchPicker::new("core");
        let chosen = picker
            .pick(items(&["README.md", "crates/core/README.md", "docs/guide.md"]))
            .unwrap();
        assert_eq!(chosen.label, "crates/core/README.md");

        let mut picker = BestMatchPicker::new("qqq");
        assert!(picker.pick(items(&["README.md"])).is_none());

        let mut picker = BestMatchPicker::new("  ");
        assert!(picker.pick(items(&["README.md"])).is_none());
    }
}
