//! iOS `Localizable.strings` writer.

use std::fmt::Write as _;

use super::grouping::{
    Entry,
    GroupedEntry,
};

/// Render the strings file of one locale. Values are written verbatim.
#[must_use]
pub fn render(entries: &[GroupedEntry]) -> String {
    let mut strings = String::new();

    for GroupedEntry { name, entry } in entries {
        match entry {
            Entry::Scalar(value) => {
                let _ = writeln!(strings, "\"{name}\" = \"{value}\";");
            }
            Entry::Array(items) => {
                for (index, value) in items {
                    let _ = writeln!(strings, "\"{name}[{index}]\" = \"{value}\";");
                }
            }
            Entry::Plural { one, many } => {
                let _ = writeln!(strings, "\"{name}\" = \"{one}\";");
                let _ = writeln!(strings, "\"{name}-plural\" = \"{many}\";");
            }
        }
    }

    strings
}
