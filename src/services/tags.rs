/// Appends a trimmed tag unless it is blank or already present.
/// Returns whether the list changed.
pub fn add_tag(tags: &mut Vec<String>, tag: &str) -> bool {
    let tag = tag.trim();
    if tag.is_empty() || tags.iter().any(|t| t == tag) {
        return false;
    }
    tags.push(tag.to_string());
    true
}

/// Trims every tag and drops blanks and repeats, keeping first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Vec::new();
    for tag in tags {
        add_tag(&mut out, tag.as_ref());
    }
    out
}

pub fn parse_tag_list(input: &str) -> Vec<String> {
    normalize_tags(input.split(','))
}
