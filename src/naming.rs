//! Filename parsing for the `YYYY-MM-DD-slug` convention.
//!
//! Posts are named with their publication date in front of the slug. Other
//! content types usually have no date prefix, so the prefix is optional:
//!
//! - `2024-03-15-advanced-markdown-tips.md` → date 2024-03-15, slug `advanced-markdown-tips`
//! - `about.md` → no date, slug `about`
//!
//! ## Fallback Titles
//!
//! When a document has no `title` in its front matter, the slug is titleized:
//! dashes become spaces and every word is capitalized
//! (`advanced-markdown-tips` → "Advanced Markdown Tips").

use chrono::NaiveDate;

/// Result of parsing a file stem like `2024-03-15-hello-world`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Date prefix if present and a valid calendar date.
    pub date: Option<NaiveDate>,
    /// Stem with the date prefix removed. The full stem when there is none.
    pub slug: String,
    /// Titleized slug.
    pub display_title: String,
}

/// Parse a file stem following the `YYYY-MM-DD-slug` convention.
///
/// - `"2024-03-15-hello-world"` → date=Some(2024-03-15), slug="hello-world"
/// - `"2024-03-15"` → date=Some(2024-03-15), slug="" (nothing after the date)
/// - `"2024-13-40-oops"` → date=None, slug="2024-13-40-oops" (not a real date)
/// - `"about"` → date=None, slug="about"
pub fn parse_entry_name(stem: &str) -> ParsedName {
    if let Some(prefix) = stem.get(..10)
        && let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
    {
        let rest = &stem[10..];
        if rest.is_empty() || rest.starts_with('-') {
            let slug = rest.trim_start_matches('-');
            return ParsedName {
                date: Some(date),
                slug: slug.to_string(),
                display_title: titleize(slug),
            };
        }
    }
    ParsedName {
        date: None,
        slug: stem.to_string(),
        display_title: titleize(stem),
    }
}

fn titleize(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn dated_multi_word_slug() {
        let p = parse_entry_name("2024-03-15-advanced-markdown-tips");
        assert_eq!(p.date, ymd(2024, 3, 15));
        assert_eq!(p.slug, "advanced-markdown-tips");
        assert_eq!(p.display_title, "Advanced Markdown Tips");
    }

    #[test]
    fn dated_single_word() {
        let p = parse_entry_name("2023-01-02-welcome");
        assert_eq!(p.date, ymd(2023, 1, 2));
        assert_eq!(p.slug, "welcome");
        assert_eq!(p.display_title, "Welcome");
    }

    #[test]
    fn date_only() {
        let p = parse_entry_name("2024-03-15");
        assert_eq!(p.date, ymd(2024, 3, 15));
        assert_eq!(p.slug, "");
        assert_eq!(p.display_title, "");
    }

    #[test]
    fn undated_with_dashes() {
        let p = parse_entry_name("who-am-i");
        assert_eq!(p.date, None);
        assert_eq!(p.slug, "who-am-i");
        assert_eq!(p.display_title, "Who Am I");
    }

    #[test]
    fn impossible_date_is_part_of_slug() {
        let p = parse_entry_name("2024-13-40-oops");
        assert_eq!(p.date, None);
        assert_eq!(p.slug, "2024-13-40-oops");
    }

    #[test]
    fn date_must_be_followed_by_dash() {
        let p = parse_entry_name("2024-03-15x");
        assert_eq!(p.date, None);
        assert_eq!(p.slug, "2024-03-15x");
    }

    #[test]
    fn short_stem() {
        let p = parse_entry_name("faq");
        assert_eq!(p.date, None);
        assert_eq!(p.display_title, "Faq");
    }

    #[test]
    fn multibyte_stem_does_not_panic() {
        let p = parse_entry_name("héllo-wörld-ü");
        assert_eq!(p.date, None);
        assert_eq!(p.display_title, "Héllo Wörld Ü");
    }
}
