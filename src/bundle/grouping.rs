//! Folding of flat keys into platform resource entries.
//!
//! A key may carry one bracketed suffix: `items[0]` is an array item,
//! `count[one]` / `count[many]` are plural forms. Anything else is a plain
//! string named after the key with the bracket group removed.

use std::collections::{
    BTreeMap,
    HashMap,
};
use std::sync::LazyLock;

use regex::Regex;

use crate::manifest::Snapshot;
use crate::manifest::snapshot::is_translated_value;

/// First `[...]` group of a key.
#[allow(clippy::expect_used)]
static BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*?)\]").expect("BRACKET: invalid regex pattern"));

/// Platform resource entry built from one or more keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Scalar(String),
    /// Items by zero-based index.
    Array(BTreeMap<usize, String>),
    /// A missing form stays empty.
    Plural { one: String, many: String },
}

/// Named entry of one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedEntry {
    pub name: String,
    pub entry: Entry,
}

/// Plural forms carried in a key suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PluralForm {
    One,
    Many,
}

/// What a key contributes to its entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyShape {
    Scalar,
    Item(usize),
    Form(PluralForm),
}

/// Split a key into its entry name and shape using the first bracket group.
fn classify(key: &str) -> (String, KeyShape) {
    let Some(caps) = BRACKET.captures(key) else {
        return (key.to_string(), KeyShape::Scalar);
    };
    let Some(content) = caps.get(1) else {
        return (key.to_string(), KeyShape::Scalar);
    };

    let name = BRACKET.replace(key, "").into_owned();
    let content = content.as_str();
    let shape = match content {
        "one" => KeyShape::Form(PluralForm::One),
        "many" => KeyShape::Form(PluralForm::Many),
        _ if !content.is_empty() && content.bytes().all(|b| b.is_ascii_digit()) => {
            content.parse().map_or(KeyShape::Scalar, KeyShape::Item)
        }
        _ => KeyShape::Scalar,
    };

    (name, shape)
}

/// Every value seen under one name.
///
/// Scalar, array and plural values are kept side by side; the shape of the
/// last key decides which of them becomes the entry. Switching shapes back
/// and forth therefore loses nothing.
#[derive(Debug)]
struct Slots {
    last: KeyShape,
    value: String,
    items: BTreeMap<usize, String>,
    one: String,
    many: String,
}

impl Slots {
    /// Empty slots whose kind is `shape` until another key says otherwise.
    const fn new(shape: KeyShape) -> Self {
        Self {
            last: shape,
            value: String::new(),
            items: BTreeMap::new(),
            one: String::new(),
            many: String::new(),
        }
    }

    /// Store `value` in the slot named by `shape` and make it the entry kind.
    fn absorb(&mut self, shape: KeyShape, value: &str) {
        self.last = shape;
        let slot = match shape {
            KeyShape::Scalar => &mut self.value,
            KeyShape::Item(index) => self.items.entry(index).or_default(),
            KeyShape::Form(PluralForm::One) => &mut self.one,
            KeyShape::Form(PluralForm::Many) => &mut self.many,
        };
        value.clone_into(slot);
    }

    /// Entry of the last seen kind.
    fn into_entry(self) -> Entry {
        match self.last {
            KeyShape::Scalar => Entry::Scalar(self.value),
            KeyShape::Item(_) => Entry::Array(self.items),
            KeyShape::Form(_) => Entry::Plural { one: self.one, many: self.many },
        }
    }
}

/// Entries of one locale, in first-appearance order of their names.
///
/// Only listed keys are visited, in snapshot key order. Blank values are
/// skipped entirely.
#[must_use]
pub fn group_locale(snapshot: &Snapshot, locale: &str) -> Vec<GroupedEntry> {
    let mut entries: Vec<(String, Slots)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for key in &snapshot.keys {
        let Some(value) = snapshot.value(locale, key).filter(|v| is_translated_value(v)) else {
            continue;
        };

        let (name, shape) = classify(key);
        let position = *positions.entry(name.clone()).or_insert_with(|| {
            entries.push((name, Slots::new(shape)));
            entries.len() - 1
        });
        if let Some((_, slots)) = entries.get_mut(position) {
            slots.absorb(shape, value);
        }
    }

    entries
        .into_iter()
        .map(|(name, slots)| GroupedEntry { name, entry: slots.into_entry() })
        .collect()
}
