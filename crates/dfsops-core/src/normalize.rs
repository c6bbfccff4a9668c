// Player-name normalization for comparison.

/// Generational suffixes dropped from the end of a name.
const SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv", "v"];

/// Produce the comparison form of a player name.
///
/// - lower-cases everything
/// - removes apostrophes (straight and typographic), so `O'Brien` -> `obrien`
/// - turns hyphens into spaces, so `Smith-Jones` -> `smith jones`
/// - drops trailing generational suffixes (`Jr.`, `Sr`, `III,` ...)
/// - collapses whitespace
///
/// Total: any input, including the empty string, yields a string.
pub fn normalize(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}' | '`'))
        .map(|c| if c == '-' { ' ' } else { c })
        .collect::<String>()
        .to_lowercase();

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    while tokens.len() > 1 {
        let Some(&last) = tokens.last() else { break };
        let bare = last.trim_end_matches(&['.', ','][..]);
        if SUFFIXES.contains(&bare) {
            tokens.pop();
        } else {
            break;
        }
    }

    // A lone trailing comma on the surviving last token ("smith," before "jr")
    if let Some(last) = tokens.last_mut() {
        let token: &str = *last;
        *last = token.trim_end_matches(',');
    }

    tokens
        .into_iter()
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a name into `(first token, remaining tokens joined by a space)`.
///
/// Case is preserved. A single-token name yields `(token, "")`; an empty
/// name yields two empty strings.
pub fn split_name(raw: &str) -> (String, String) {
    let mut tokens = raw.split_whitespace();
    let first = tokens.next().unwrap_or_default().to_string();
    let rest = tokens.collect::<Vec<_>>().join(" ");
    (first, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases() {
        assert_eq!(normalize("Josh ALLEN"), "josh allen");
    }

    #[test]
    fn strips_apostrophes() {
        assert_eq!(normalize("O'Brien"), "obrien");
        assert_eq!(normalize("Ja\u{2019}Marr Chase"), "jamarr chase");
    }

    #[test]
    fn hyphen_becomes_space() {
        assert_eq!(normalize("Smith-Jones"), "smith jones");
        assert_eq!(normalize("Amon-Ra St. Brown"), "amon ra st. brown");
    }

    #[test]
    fn drops_suffixes() {
        assert_eq!(normalize("Michael Pittman Jr."), "michael pittman");
        assert_eq!(normalize("Kenneth Walker III"), "kenneth walker");
        assert_eq!(normalize("Odell Beckham Jr"), "odell beckham");
        assert_eq!(normalize("Marvin Harrison Sr."), "marvin harrison");
        assert_eq!(normalize("Patrick Mahomes II"), "patrick mahomes");
        assert_eq!(normalize("Henry Ruggs IV"), "henry ruggs");
    }

    #[test]
    fn drops_suffix_with_comma() {
        assert_eq!(normalize("Pittman, Jr."), "pittman");
        assert_eq!(normalize("Michael Pittman Jr.,"), "michael pittman");
    }

    #[test]
    fn drops_stacked_suffixes() {
        assert_eq!(normalize("John Doe Jr. III"), "john doe");
    }

    #[test]
    fn suffix_only_in_middle_is_kept() {
        assert_eq!(normalize("V Jackson Smith"), "v jackson smith");
    }

    #[test]
    fn single_suffix_token_is_kept() {
        // Never reduce a name to nothing.
        assert_eq!(normalize("V"), "v");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("  Justin   Jefferson  "), "justin jefferson");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn split_two_tokens() {
        assert_eq!(
            split_name("Justin Jefferson"),
            ("Justin".to_string(), "Jefferson".to_string())
        );
    }

    #[test]
    fn split_many_tokens() {
        assert_eq!(
            split_name("Amon-Ra St. Brown"),
            ("Amon-Ra".to_string(), "St. Brown".to_string())
        );
    }

    #[test]
    fn split_single_token() {
        assert_eq!(split_name("Bills"), ("Bills".to_string(), String::new()));
        assert_eq!(split_name(""), (String::new(), String::new()));
    }
}
