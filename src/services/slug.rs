use crate::error::BlogError;
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_SLUG_LEN: usize = 100;

static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s-]").expect("valid slug regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid slug regex"));

/// Lowercases the title, drops everything but word characters, whitespace and
/// hyphens, turns each whitespace run into a single hyphen and cuts the result
/// to [`MAX_SLUG_LEN`] characters.
///
/// Titles made only of symbols produce an empty slug; callers decide what to
/// do with it.
pub fn generate_slug(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = DISALLOWED.replace_all(&lowered, "");
    let hyphenated = WHITESPACE.replace_all(&stripped, "-");
    hyphenated.chars().take(MAX_SLUG_LEN).collect()
}

pub fn validate_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > 200 {
        return false;
    }
    slug.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Finds a slug no other post holds.
///
/// `owner_of` returns the id of the post currently using a slug. The
/// candidate is returned as-is when it is free or held by `exclude_id`;
/// otherwise `-1`, `-2`, ... are appended, one lookup per probe, up to
/// `max_attempts` suffixed probes.
pub fn resolve_unique_slug<F>(
    candidate: &str,
    exclude_id: Option<&str>,
    max_attempts: u32,
    mut owner_of: F,
) -> Result<String>
where
    F: FnMut(&str) -> Result<Option<String>>,
{
    let is_free = |owner: Option<String>| match owner {
        None => true,
        Some(id) => exclude_id == Some(id.as_str()),
    };

    if is_free(owner_of(candidate)?) {
        return Ok(candidate.to_string());
    }

    for counter in 1..=max_attempts {
        let probe = format!("{}-{}", candidate, counter);
        if is_free(owner_of(&probe)?) {
            return Ok(probe);
        }
    }

    tracing::warn!(
        "Slug '{}' still taken after {} suffixed probes",
        candidate,
        max_attempts
    );
    Err(BlogError::SlugExhausted {
        slug: candidate.to_string(),
        attempts: max_attempts,
    }
    .into())
}
