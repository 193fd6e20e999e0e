//! Keyword substitution for task fields
//!
//! Substitutions are plain `(pattern, replacement)` pairs, e.g.
//! `$.rootDir()` → `/home/me/world`. They are applied repeatedly until the
//! text stops changing, so a replacement may itself contain another keyword.

use crate::error::{InterpolationError, InterpolationResult};

/// Upper bound on full passes over the substitution list
pub const MAX_SUBSTITUTION_PASSES: usize = 256;

/// A single textual pattern → replacement pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub pattern: String,
    pub replacement: String,
}

impl Substitution {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Substitution {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// Replace every occurrence of `sub.pattern` in `text`, leftmost first.
///
/// Returns the number of replacements performed. Searching resumes after the
/// inserted replacement, so a replacement that re-creates the pattern is
/// picked up by the caller's next pass rather than looping here.
fn replace_occurrences(text: &mut String, sub: &Substitution) -> usize {
    if sub.pattern.is_empty() {
        return 0;
    }

    let mut count = 0;
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find(&sub.pattern) {
        let start = search_from + offset;
        text.replace_range(start..start + sub.pattern.len(), &sub.replacement);
        search_from = start + sub.replacement.len();
        count += 1;
    }

    count
}

/// Apply substitutions until a full pass over `substitutions` changes nothing.
///
/// Passes walk the list in order. A self-referential set (`a` → `xa`) never
/// settles; after [`MAX_SUBSTITUTION_PASSES`] passes an error is returned
/// instead of looping forever.
pub fn apply_substitutions(
    text: &str,
    substitutions: &[Substitution],
) -> InterpolationResult<String> {
    let mut result = text.to_string();

    for _ in 0..MAX_SUBSTITUTION_PASSES {
        let replaced: usize = substitutions
            .iter()
            .map(|sub| replace_occurrences(&mut result, sub))
            .sum();

        if replaced == 0 {
            return Ok(result);
        }
    }

    Err(InterpolationError::RecursiveSubstitution {
        passes: MAX_SUBSTITUTION_PASSES,
    })
}

/// Apply substitutions to every string in a list
pub fn apply_substitutions_list(
    list: &[String],
    substitutions: &[Substitution],
) -> InterpolationResult<Vec<String>> {
    list.iter()
        .map(|s| apply_substitutions(s, substitutions))
        .collect::<InterpolationResult<Vec<String>>>()
}
