use regex::{Captures, Regex};
use std::sync::OnceLock;

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("token pattern compiles"))
}

/// All `${Identifier}` tokens in `template`, left to right, duplicates kept.
pub fn get_tokens(template: &str) -> Vec<String> {
    token_regex()
        .find_iter(template)
        .map(|token| token.as_str().to_string())
        .collect()
}

/// `"${System.Title}"` -> `"System.Title"`. Non-token input is returned as-is.
pub fn token_identifier(token: &str) -> &str {
    token
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .unwrap_or(token)
}

/// Replace every token occurrence with `resolve(identifier)`, in template
/// order. Substituted text is never re-scanned for tokens.
pub fn replace_tokens<F>(template: &str, mut resolve: F) -> String
where
    F: FnMut(&str) -> String,
{
    token_regex()
        .replace_all(template, |caps: &Captures<'_>| resolve(&caps[1]))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::{get_tokens, replace_tokens, token_identifier};

    #[test]
    fn get_tokens_returns_tokens_in_order_with_duplicates() {
        let tokens = get_tokens("${System.WorkItemType}/${id}-${System.Title}-${id}");
        assert_eq!(
            tokens,
            vec![
                "${System.WorkItemType}",
                "${id}",
                "${System.Title}",
                "${id}"
            ]
        );
    }

    #[test]
    fn get_tokens_ignores_unterminated_and_empty_placeholders() {
        assert!(get_tokens("feature/plain").is_empty());
        assert!(get_tokens("feature/${").is_empty());
        assert!(get_tokens("feature/${}").is_empty());
        assert_eq!(get_tokens("$${a}}"), vec!["${a}"]);
    }

    #[test]
    fn get_tokens_does_not_validate_identifiers() {
        assert_eq!(
            get_tokens("${not a field!}/${Custom.Área}"),
            vec!["${not a field!}", "${Custom.Área}"]
        );
    }

    #[test]
    fn token_identifier_strips_delimiters() {
        assert_eq!(token_identifier("${System.Title}"), "System.Title");
        assert_eq!(token_identifier("plain"), "plain");
    }

    #[test]
    fn replace_tokens_resolves_each_occurrence_positionally() {
        let mut seen = Vec::new();
        let rendered = replace_tokens("${a}/${b}-${a}", |identifier| {
            seen.push(identifier.to_string());
            format!("<{identifier}{}>", seen.len())
        });

        assert_eq!(rendered, "<a1>/<b2>-<a3>");
        assert_eq!(seen, vec!["a", "b", "a"]);
    }

    #[test]
    fn replace_tokens_does_not_rescan_substituted_text() {
        let rendered = replace_tokens("${a}-${b}", |identifier| match identifier {
            "a" => "${b}".to_string(),
            _ => "B".to_string(),
        });
        assert_eq!(rendered, "${b}-B");
    }
}
