//! Payload key resolution.
//!
//! A schema declares fields under one canonical name (camelCase by
//! convention, mirroring the target types). Payloads arrive with whatever
//! casing their producer liked, so loose mode probes a small candidate list
//! derived from the declared name. The same case converters feed the
//! `to_map` mirror so a hydrate → to_map → hydrate round trip is stable.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// -------------------------------- Modes ----------------------------------- //

/// Whether payload key lookup applies casing fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Exact key match only, no fallback.
    Strict,
    /// Declared name, then snake_case, then kebab-case; first present key wins.
    #[default]
    Loose,
}

/// Target casing for map keys on the serialization mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyCase {
    Camel,
    Snake,
    Kebab,
}

impl KeyCase {
    pub fn convert(&self, key: &str) -> String {
        match self {
            KeyCase::Camel => to_camel_case(key),
            KeyCase::Snake => to_snake_case(key),
            KeyCase::Kebab => to_kebab_case(key),
        }
    }
}

// --------------------------- Rename strategies ---------------------------- //

/// Explicit key renaming attached to a field or a whole schema. When present
/// it replaces the candidate list entirely: exactly one key, no fallback.
#[derive(Clone)]
pub enum NameStrategy {
    Identity,
    Snake,
    Kebab,
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl NameStrategy {
    pub fn apply(&self, name: &str) -> String {
        match self {
            NameStrategy::Identity => name.to_string(),
            NameStrategy::Snake => to_snake_case(name),
            NameStrategy::Kebab => to_kebab_case(name),
            NameStrategy::Custom(f) => f(name),
        }
    }
}

impl fmt::Debug for NameStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameStrategy::Identity => write!(f, "Identity"),
            NameStrategy::Snake => write!(f, "Snake"),
            NameStrategy::Kebab => write!(f, "Kebab"),
            NameStrategy::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Ordered candidate keys to probe for a field. Lookup elsewhere is by key
/// presence, not truthiness, so an explicit `null` under a candidate key is
/// a hit and stays distinguishable from an absent field.
pub fn candidate_keys(name: &str, mode: Mode, strategy: Option<&NameStrategy>) -> Vec<String> {
    if let Some(strategy) = strategy {
        return vec![strategy.apply(name)];
    }
    match mode {
        Mode::Strict => vec![name.to_string()],
        Mode::Loose => {
            let mut keys = vec![name.to_string()];
            for alt in [to_snake_case(name), to_kebab_case(name)] {
                if !keys.contains(&alt) {
                    keys.push(alt);
                }
            }
            keys
        }
    }
}

// ----------------------------- Case converters ---------------------------- //

pub fn to_snake_case(name: &str) -> String {
    delimit(name, '_')
}

pub fn to_kebab_case(name: &str) -> String {
    delimit(name, '-')
}

/// `user_name` / `user-name` → `userName`. Leading character is lowered so
/// `UserName` also normalizes to `userName`.
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for (i, c) in name.chars().enumerate() {
        if c == '_' || c == '-' {
            upper_next = true;
            continue;
        }
        if i == 0 {
            out.extend(c.to_lowercase());
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Shared by snake and kebab: break on case boundaries and existing
/// delimiters, join with `sep`.
fn delimit(name: &str, sep: char) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower_or_digit = false;
    for c in name.chars() {
        if c == '_' || c == '-' {
            out.push(sep);
            prev_lower_or_digit = false;
            continue;
        }
        if c.is_uppercase() {
            if prev_lower_or_digit {
                out.push(sep);
            }
            out.extend(c.to_lowercase());
            prev_lower_or_digit = false;
        } else {
            out.push(c);
            prev_lower_or_digit = c.is_lowercase() || c.is_ascii_digit();
        }
    }
    out
}
