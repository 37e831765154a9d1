//! Option model and the substring filter behind the suggestion popup

use std::fmt::Debug;

/// Anything that can be offered as a choice.
///
/// `label` is what the user sees and types against, `value` is what gets
/// committed. Plain strings use the same text for both.
pub trait OptionText: Debug {
    fn label(&self) -> &str;

    fn value(&self) -> &str {
        self.label()
    }
}

impl OptionText for String {
    fn label(&self) -> &str {
        self
    }
}

impl OptionText for &str {
    fn label(&self) -> &str {
        self
    }
}

/// An option whose committed value differs from its label
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

impl OptionText for SelectOption {
    fn label(&self) -> &str {
        &self.label
    }

    fn value(&self) -> &str {
        &self.value
    }
}

/// How the query is compared with option labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseSensitivity {
    #[default]
    Insensitive,
    Sensitive,
}

/// Whether `label` contains `query` as a literal substring
pub fn matches(label: &str, query: &str, case: CaseSensitivity) -> bool {
    if query.is_empty() {
        return true;
    }
    match case {
        CaseSensitivity::Sensitive => label.contains(query),
        CaseSensitivity::Insensitive => label.to_lowercase().contains(&query.to_lowercase()),
    }
}

/// Positions in `options` whose labels match `query`, in their original order
pub fn filter_indices<O: OptionText>(options: &[O], query: &str, case: CaseSensitivity) -> Vec<usize> {
    if query.is_empty() {
        return (0..options.len()).collect();
    }

    // Lowercase the query once rather than per option
    let needle = match case {
        CaseSensitivity::Sensitive => query.to_owned(),
        CaseSensitivity::Insensitive => query.to_lowercase(),
    };

    options
        .iter()
        .enumerate()
        .filter(|(_, option)| match case {
            CaseSensitivity::Sensitive => option.label().contains(needle.as_str()),
            CaseSensitivity::Insensitive => option.label().to_lowercase().contains(needle.as_str()),
        })
        .map(|(index, _)| index)
        .collect()
}

/// Stable subsequence of `options` matching `query`.
///
/// An empty query returns every option untouched.
pub fn filter<'a, O: OptionText>(options: &'a [O], query: &str, case: CaseSensitivity) -> Vec<&'a O> {
    filter_indices(options, query, case)
        .into_iter()
        .map(|index| &options[index])
        .collect()
}
