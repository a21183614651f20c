//! Utility functions

use std::sync::OnceLock;

use regex::Regex;

pub fn mask_email(email: &str) -> String {
    if let Some(at_pos) = email.find('@') {
        let (local, domain) = email.split_at(at_pos);
        if local.is_empty() {
            format!("***{}", domain)
        } else if local.len() <= 2 {
            format!("{}***{}", &local[..1], domain)
        } else {
            format!("{}***{}", &local[..2], domain)
        }
    } else {
        "***".to_string()
    }
}

/// Lowercase, ASCII-only, dash separated. Falls back to `"workspace"` when
/// nothing usable is left.
pub fn slugify(input: &str) -> String {
    static NON_SLUG: OnceLock<Option<Regex>> = OnceLock::new();

    let lowered = input.trim().to_lowercase();
    let replaced = match NON_SLUG.get_or_init(|| Regex::new(r"[^a-z0-9]+").ok()) {
        Some(re) => re.replace_all(&lowered, "-").into_owned(),
        None => lowered
            .split(|c: char| !c.is_ascii_lowercase() && !c.is_ascii_digit())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-"),
    };
    let slug = replaced.trim_matches('-');
    if slug.is_empty() {
        "workspace".to_string()
    } else {
        slug.chars().take(80).collect::<String>().trim_end_matches('-').to_string()
    }
}
