use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

const FORUMS_MARKER: &str = "Forums";
const COMMENTS_MARKER: &str = "COMMENTS:";

static MORE_MATCHES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\.\. \d+ more matches").expect("valid regex"));

/// Strips forum teasers and user comments from a page's visible text.
///
/// The forum sidebar sits between a `Forums` heading and a `... N more matches`
/// link and is interleaved with match content, so that span is cut out. When
/// the closing link is missing everything from `Forums` on goes. Anything from
/// `COMMENTS:` on is always dropped. Text without markers comes back as is.
pub fn normalize_page_text(text: &str) -> Cow<'_, str> {
    let mut filtered = Cow::Borrowed(text);

    if let Some(forums) = text.find(FORUMS_MARKER) {
        filtered = match MORE_MATCHES.find_at(text, forums) {
            Some(more) => Cow::Owned(format!("{}{}", &text[..forums], &text[more.end()..])),
            None => Cow::Borrowed(&text[..forums]),
        };
    }

    if let Some(comments) = filtered.find(COMMENTS_MARKER) {
        filtered = match filtered {
            Cow::Borrowed(s) => Cow::Borrowed(&s[..comments]),
            Cow::Owned(mut s) => {
                s.truncate(comments);
                Cow::Owned(s)
            }
        };
    }

    filtered
}

/// Cuts at the first `comments`, in any case.
///
/// Stricter than [`normalize_page_text`]; used where stray digits from user
/// posts would be mistaken for scores.
pub fn strip_comment_tail(text: &str) -> &str {
    match text.to_ascii_lowercase().find("comments") {
        Some(pos) => &text[..pos],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_markers_is_untouched() {
        let text = "FNATIC\n13\nAscent\nPICK\n11\nKarmine Corp";
        let normalized = normalize_page_text(text);
        assert!(matches!(normalized, Cow::Borrowed(_)));
        assert_eq!(normalized, text);
        assert_eq!(normalize_page_text(&normalized), text);
    }

    #[test]
    fn forum_span_is_excised() {
        let text = "header\nForums\nthread 2:1\n... 12 more matches\nmatch body";
        assert_eq!(normalize_page_text(text), "header\n\nmatch body");
    }

    #[test]
    fn forums_without_closing_marker_truncates() {
        let text = "match body\nForums\nthread about Bind";
        assert_eq!(normalize_page_text(text), "match body\n");
    }

    #[test]
    fn closing_marker_before_forums_is_ignored() {
        let text = "... 3 more matches\nbody\nForums\nteaser";
        assert_eq!(normalize_page_text(text), "... 3 more matches\nbody\n");
    }

    #[test]
    fn comments_are_dropped() {
        let text = "Forums\nteaser\n... 4 more matches\nbody\nCOMMENTS:\n2:0 ez Bind";
        assert_eq!(normalize_page_text(text), "\nbody\n");
        assert_eq!(normalize_page_text("body\nCOMMENTS: lol"), "body\n");
    }

    #[test]
    fn comment_tail_is_case_insensitive() {
        assert_eq!(strip_comment_tail("score 2:1\n12 Comments\n3:0"), "score 2:1\n12 ");
        assert_eq!(strip_comment_tail("no tail"), "no tail");
    }
}
