//! Branch names for revisions without a bookmark

use crate::types::Revision;

/// Number of change ID characters embedded in a derived branch name
pub const CHANGE_ID_PREFIX_LEN: usize = 5;

/// Branch name for a revision
///
/// An existing bookmark is used as-is. Otherwise the name is
/// `<login>/<first 5 of change id>/<kebab description>`, where the
/// description drops everything up to its first colon (`feat: add widget`
/// becomes `add-widget`). Returns `None` when nothing can be derived.
pub fn branch_name(login: &str, revision: &Revision) -> Option<String> {
    if let Some(ref bookmark) = revision.bookmark {
        return Some(bookmark.clone());
    }

    let description = revision.description.trim();
    if description.is_empty() {
        return None;
    }

    let subject = description
        .split_once(':')
        .map(|(_, rest)| rest.trim())
        .filter(|rest| !rest.is_empty())
        .unwrap_or(description);

    let slug = kebab_case(subject);
    let slug = if slug.is_empty() {
        kebab_case(description)
    } else {
        slug
    };
    if slug.is_empty() {
        return None;
    }

    let prefix: String = revision
        .change_id
        .chars()
        .take(CHANGE_ID_PREFIX_LEN)
        .collect();

    Some(format!("{login}/{prefix}/{slug}"))
}

/// Lowercase ASCII words joined by `-`
///
/// Words break on any non-alphanumeric character and on lower-to-upper
/// case changes, so `addWidget` and `Add  widget!` both give `add-widget`.
pub fn kebab_case(input: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            current.push(c.to_ascii_lowercase());
        } else {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words.join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rev(change_id: &str, description: &str, bookmark: Option<&str>) -> Revision {
        Revision {
            change_id: change_id.to_string(),
            short_change_id: change_id.chars().take(2).collect(),
            description: description.to_string(),
            bookmark: bookmark.map(ToString::to_string),
            remote_outdated: false,
        }
    }

    #[test]
    fn test_derives_from_text_after_colon() {
        let r = rev("kpqvxyzmnwlr", "add: widget", None);
        assert_eq!(
            branch_name("alice", &r).as_deref(),
            Some("alice/kpqvx/widget")
        );
    }

    #[test]
    fn test_derives_from_whole_description_without_colon() {
        let r = rev("kpqvxyzmnwlr", "Add widget support", None);
        assert_eq!(
            branch_name("alice", &r).as_deref(),
            Some("alice/kpqvx/add-widget-support")
        );
    }

    #[test]
    fn test_keeps_text_after_later_colons() {
        let r = rev("zzzzzzzz", "feat(ui): modal: close button", None);
        assert_eq!(
            branch_name("bob", &r).as_deref(),
            Some("bob/zzzzz/modal-close-button")
        );
    }

    #[test]
    fn test_existing_bookmark_wins() {
        let r = rev("kpqvxyzmnwlr", "fix: bug", Some("alice/b"));
        assert_eq!(branch_name("alice", &r).as_deref(), Some("alice/b"));
    }

    #[test]
    fn test_empty_description_is_not_derivable() {
        assert_eq!(branch_name("alice", &rev("kpqvx", "", None)), None);
        assert_eq!(branch_name("alice", &rev("kpqvx", "   ", None)), None);
        assert_eq!(branch_name("alice", &rev("kpqvx", "!!!", None)), None);
    }

    #[test]
    fn test_empty_subject_falls_back_to_prefix() {
        let r = rev("kpqvxyzmnwlr", "wip:", None);
        assert_eq!(branch_name("alice", &r).as_deref(), Some("alice/kpqvx/wip"));
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("add widget"), "add-widget");
        assert_eq!(kebab_case("addWidget"), "add-widget");
        assert_eq!(kebab_case("  Fix the  BUG!! "), "fix-the-bug");
        assert_eq!(kebab_case("support v2 api"), "support-v2-api");
        assert_eq!(kebab_case("snake_case_name"), "snake-case-name");
        assert_eq!(kebab_case(""), "");
    }
}
