//! `{{ key }}` placeholder resolution inside translation values.
//!
//! A placeholder is replaced by the value of the referenced key in the same
//! locale of the same snapshot. Substituted values are resolved recursively
//! before being spliced in. Unknown or null references resolve to `""`.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::snapshot::{
    LocaleValues,
    Snapshot,
};
use crate::error::{
    CoreError,
    Result,
};

/// Default bound on nested references for one value.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// `{{ name }}` where name is made of ASCII letters, digits, `_`, `.` and `-`.
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}").expect("PLACEHOLDER: invalid regex pattern")
});

/// Names referenced by placeholders in `value`, in order of appearance.
#[must_use]
pub fn placeholders(value: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(value)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Resolves placeholders with cycle detection and a depth bound.
#[derive(Debug, Clone, Copy)]
pub struct Interpolator {
    max_depth: usize,
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

/// State of one top-level resolution.
struct Resolution<'a> {
    locale: &'a str,
    root: &'a str,
    values: &'a LocaleValues,
    /// Keys currently being expanded, outermost first.
    stack: Vec<&'a str>,
}

impl Interpolator {
    /// Interpolator resolving at most `max_depth` nested references.
    #[must_use]
    pub const fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Configured nesting bound.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Fully resolved value of `key`; `""` when the key has no value.
    ///
    /// # Errors
    /// - [`CoreError::CyclicReference`] when `key` reaches itself
    /// - [`CoreError::DepthExceeded`] when nesting goes past the bound
    pub fn resolve_key(&self, locale: &str, key: &str, values: &LocaleValues) -> Result<String> {
        let mut resolution = Resolution { locale, root: key, values, stack: Vec::new() };
        self.expand_key(&mut resolution, key)
    }

    /// Resolve placeholders inside an arbitrary string.
    pub fn resolve_value(&self, locale: &str, raw: &str, values: &LocaleValues) -> Result<String> {
        let mut resolution = Resolution { locale, root: raw, values, stack: Vec::new() };
        self.expand(&mut resolution, raw)
    }

    /// Resolve every cell of every listed locale.
    ///
    /// Each cell is resolved against the raw values of its locale, so the
    /// result does not depend on iteration order. Null cells stay null.
    pub fn interpolate_snapshot(&self, snapshot: &Snapshot) -> Result<Snapshot> {
        let mut values = HashMap::with_capacity(snapshot.values.len());

        for locale in &snapshot.locales {
            let Some(raw_values) = snapshot.values.get(locale) else {
                continue;
            };

            let mut resolved = LocaleValues::with_capacity(raw_values.len());
            for (key, value) in raw_values {
                let value = match value {
                    Some(_) => Some(self.resolve_key(locale, key, raw_values)?),
                    None => None,
                };
                resolved.insert(key.clone(), value);
            }
            values.insert(locale.clone(), resolved);
        }

        tracing::debug!(locales = values.len(), "Interpolated snapshot");

        Ok(Snapshot { locales: snapshot.locales.clone(), keys: snapshot.keys.clone(), values })
    }

    /// Resolved value of `key`, tracking it on the expansion stack.
    fn expand_key<'a>(&self, resolution: &mut Resolution<'a>, key: &'a str) -> Result<String> {
        if resolution.stack.contains(&key) {
            let mut chain: Vec<String> =
                resolution.stack.iter().map(|k| (*k).to_string()).collect();
            chain.push(key.to_string());
            return Err(CoreError::CyclicReference {
                locale: resolution.locale.to_string(),
                key: resolution.root.to_string(),
                chain,
            });
        }

        if resolution.stack.len() >= self.max_depth {
            return Err(CoreError::DepthExceeded {
                locale: resolution.locale.to_string(),
                key: resolution.root.to_string(),
                max_depth: self.max_depth,
            });
        }

        let values = resolution.values;
        let Some((stored_key, Some(raw))) = values.get_key_value(key) else {
            return Ok(String::new());
        };

        resolution.stack.push(stored_key.as_str());
        let expanded = self.expand(resolution, raw);
        resolution.stack.pop();
        expanded
    }

    /// Substitute every placeholder of `raw`.
    fn expand<'a>(&self, resolution: &mut Resolution<'a>, raw: &'a str) -> Result<String> {
        let mut output = String::with_capacity(raw.len());
        let mut last_end = 0;

        for caps in PLACEHOLDER.captures_iter(raw) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            output.push_str(raw.get(last_end..whole.start()).unwrap_or_default());
            output.push_str(&self.expand_key(resolution, name.as_str())?);
            last_end = whole.end();
        }
        output.push_str(raw.get(last_end..).unwrap_or_default());

        Ok(output)
    }
}
