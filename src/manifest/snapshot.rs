//! Manifest snapshot: the complete translation table of a project at one commit.

use std::collections::{
    HashMap,
    HashSet,
};

use serde::{
    Deserialize,
    Serialize,
};

/// Key → value table of a single locale.
///
/// `None` is an explicit null cell; a missing entry is an absent cell. Both
/// read back as absent through [`Snapshot::value`].
pub type LocaleValues = HashMap<String, Option<String>>;

/// Full replacement of a project's translation state.
///
/// `locales` and `keys` are ordered and unique. `values` may omit any
/// `(locale, key)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub locales: Vec<String>,

    #[serde(default)]
    pub keys: Vec<String>,

    #[serde(rename = "manifest", alias = "values", default)]
    pub values: HashMap<String, LocaleValues>,
}

impl Snapshot {
    /// Snapshot of a project without any commit.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with the given axes and no values.
    #[must_use]
    pub fn new<L, K>(locales: L, keys: K) -> Self
    where
        L: IntoIterator,
        L::Item: Into<String>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        let mut snapshot = Self {
            locales: locales.into_iter().map(Into::into).collect(),
            keys: keys.into_iter().map(Into::into).collect(),
            values: HashMap::new(),
        };
        snapshot.dedup_axes();
        snapshot
    }

    /// Set a cell, registering the locale and key on their axes when new.
    pub fn set(&mut self, locale: &str, key: &str, value: Option<&str>) {
        if !self.contains_locale(locale) {
            self.locales.push(locale.to_string());
        }
        if !self.contains_key(key) {
            self.keys.push(key.to_string());
        }
        self.values
            .entry(locale.to_string())
            .or_default()
            .insert(key.to_string(), value.map(str::to_string));
    }

    /// Builder form of [`Snapshot::set`].
    #[must_use]
    pub fn with_value(mut self, locale: &str, key: &str, value: &str) -> Self {
        self.set(locale, key, Some(value));
        self
    }

    /// Drop repeated locales and keys, keeping the first occurrence.
    ///
    /// Returns the number of entries removed.
    pub fn dedup_axes(&mut self) -> usize {
        /// Drop repeated entries keeping first occurrences; returns how many went.
fn dedup(items: &mut Vec<String>) -> usize {
            let before = items.len();
            let mut seen = HashSet::new();
            items.retain(|item| seen.insert(item.clone()));
            before - items.len()
        }

        dedup(&mut self.locales) + dedup(&mut self.keys)
    }

    /// Whether `locale` is listed.
    #[must_use]
    pub fn contains_locale(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }

    /// Whether `key` is listed.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Value of a cell; `None` for absent and null cells alike.
    #[must_use]
    pub fn value(&self, locale: &str, key: &str) -> Option<&str> {
        self.values.get(locale)?.get(key)?.as_deref()
    }

    /// Values of one locale, if the locale is part of the snapshot.
    #[must_use]
    pub fn locale_values(&self, locale: &str) -> Option<&LocaleValues> {
        if !self.contains_locale(locale) {
            return None;
        }
        self.values.get(locale)
    }

    /// True iff the cell holds a value with non-whitespace content.
    #[must_use]
    pub fn is_translated(&self, locale: &str, key: &str) -> bool {
        self.value(locale, key).is_some_and(is_translated_value)
    }

    /// `|keys| × |locales|`. Zero means there is no data to measure.
    #[must_use]
    pub fn total_slots(&self) -> usize {
        self.keys.len() * self.locales.len()
    }

    /// Number of translated cells over the full `(locale, key)` grid.
    #[must_use]
    pub fn translated_slots(&self) -> usize {
        self.locales.iter().map(|locale| self.translated_keys_in(locale)).sum()
    }

    /// Number of listed keys translated in `locale`.
    #[must_use]
    pub fn translated_keys_in(&self, locale: &str) -> usize {
        self.keys.iter().filter(|key| self.is_translated(locale, key)).count()
    }
}

/// Shared "has content" predicate used by progress and bundle grouping.
#[must_use]
pub fn is_translated_value(value: &str) -> bool {
    !value.trim().is_empty()
}
