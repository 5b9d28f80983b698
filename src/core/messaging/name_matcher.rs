use super::messaging_models::Contact;

/// Code points ignored when comparing display names: ASCII space and
/// ideographic (full-width) space.
const IGNORABLE: [char; 2] = ['\u{0020}', '\u{3000}'];

/// Removes every ignorable space from `name`. Only used as a comparison key.
pub fn normalize_name(name: &str) -> String {
    name.chars().filter(|c| !IGNORABLE.contains(c)).collect()
}

/// Returns the account id of the first contact whose name equals `query_name`
/// once spaces are removed from both sides.
///
/// Matching is otherwise exact (case and script sensitive). An empty query
/// only matches an entry whose name is itself made of spaces.
pub fn find_id(directory: &[Contact], query_name: &str) -> Option<u64> {
    let wanted = normalize_name(query_name);
    directory
        .iter()
        .find(|contact| normalize_name(&contact.name) == wanted)
        .map(|contact| contact.account_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory(entries: &[(u64, &str)]) -> Vec<Contact> {
        entries
            .iter()
            .map(|(id, name)| Contact::new(*id, name))
            .collect()
    }

    #[test]
    fn test_normalize_strips_both_spaces() {
        assert_eq!(normalize_name(" 自動　通知 bot　"), "自動通知bot");
        assert_eq!(normalize_name("\tTab"), "\tTab");
    }

    #[test]
    fn test_exact_match() {
        let dir = directory(&[(6222482, "自動通知bot")]);
        assert_eq!(find_id(&dir, "自動通知bot"), Some(6222482));
    }

    #[test]
    fn test_ascii_space_in_query() {
        let dir = directory(&[(6222482, "自動通知bot")]);
        assert_eq!(find_id(&dir, "自動通知 bot"), Some(6222482));
    }

    #[test]
    fn test_ideographic_space_in_query() {
        let dir = directory(&[(6222482, "自動通知bot")]);
        assert_eq!(find_id(&dir, "\u{3000}自動通知bot"), Some(6222482));
    }

    #[test]
    fn test_space_in_directory_name() {
        let dir = directory(&[(10, "山田　太郎")]);
        assert_eq!(find_id(&dir, "山田太郎"), Some(10));
    }

    #[test]
    fn test_unknown_name() {
        let dir = directory(&[(6222482, "自動通知bot")]);
        assert_eq!(find_id(&dir, "unknown"), None);
    }

    #[test]
    fn test_case_sensitive() {
        let dir = directory(&[(1, "Alice")]);
        assert_eq!(find_id(&dir, "alice"), None);
    }

    #[test]
    fn test_first_match_wins() {
        let dir = directory(&[(1, "Bob Smith"), (2, "BobSmith")]);
        assert_eq!(find_id(&dir, "BobSmith"), Some(1));
    }

    #[test]
    fn test_empty_query_against_ordinary_names() {
        let dir = directory(&[(1, "Alice"), (2, "Bob")]);
        assert_eq!(find_id(&dir, ""), None);
        assert_eq!(find_id(&dir, "   "), None);
    }

    #[test]
    fn test_empty_query_matches_blank_name() {
        let dir = directory(&[(1, "Alice"), (2, "\u{3000}"), (3, " ")]);
        assert_eq!(find_id(&dir, ""), Some(2));
        assert_eq!(find_id(&dir, "　 "), Some(2));
    }

    #[test]
    fn test_find_id_is_idempotent() {
        let dir = directory(&[(1, "Alice"), (2, "自動通知bot")]);
        let first = find_id(&dir, "自動通知 bot");
        let second = find_id(&dir, "自動通知 bot");
        assert_eq!(first, second);
        assert_eq!(first, Some(2));
    }
}
