//! Plain text to HTML.
//!
//! [`compose_html`] encodes a draft before it is sent and keeps the editor's
//! inline `<b>`, `<i>` and `<u>` markup as-is. [`text_to_html`] shows a
//! received `text/plain` body and escapes it, since its angle brackets are
//! text, not markup.

use regex::Regex;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::LazyLock;

/// `http`/`https` URLs. Quotes and angle brackets end a URL.
#[allow(clippy::unwrap_used)] // constant pattern
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:[A-Za-z0-9$&()*+,\-./:;=?@\[\]^_!~#]|%[0-9A-Fa-f]{2})+").unwrap()
});

/// Top margin for a paragraph that follows one or more blank lines.
const GAP_STYLE: &str = "margin-top: 1em";

/// A run of text, or the index of the distinct URL matched at that spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Url(usize),
}

/// Converts draft text to a minimal HTML document.
///
/// URLs become anchors and each line becomes a paragraph. Blank lines are
/// not emitted as empty paragraphs; the paragraph after them gets extra top
/// margin instead.
#[must_use]
pub fn compose_html(text: &str) -> String {
    render(text, false)
}

/// Like [`compose_html`], for received plain text: `&`, `<` and `>` outside
/// URLs are escaped.
#[must_use]
pub fn text_to_html(text: &str) -> String {
    render(text, true)
}

fn render(text: &str, escape: bool) -> String {
    let (tokens, urls) = tokenize(text);

    let mut linked = String::with_capacity(text.len());
    for token in tokens {
        match token {
            Token::Text(run) if escape => linked.push_str(&escape_html(run)),
            Token::Text(run) => linked.push_str(run),
            Token::Url(index) => {
                let url = urls[index];
                let _ = write!(linked, "<a href=\"{url}\">{url}</a>");
            }
        }
    }

    let mut body = String::new();
    let mut gap = false;
    for line in linked.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            gap = true;
            continue;
        }

        if gap {
            let _ = write!(body, "<p style=\"{GAP_STYLE}\">{line}</p>");
            gap = false;
        } else {
            let _ = write!(body, "<p>{line}</p>");
        }
    }

    format!("<!DOCTYPE html><head></head><body>{body}</body>")
}

/// Splits text at URL matches, one index per distinct URL.
///
/// URLs are substituted by position from the match spans, so neither a URL
/// that is a prefix of a longer one nor token-like text already in the input
/// can be rewritten by mistake.
fn tokenize(text: &str) -> (Vec<Token<'_>>, Vec<&str>) {
    let mut urls: Vec<&str> = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut tokens = Vec::new();
    let mut last = 0;

    for m in URL_PATTERN.find_iter(text) {
        let url = m.as_str();
        let index = *seen.entry(url).or_insert_with(|| {
            urls.push(url);
            urls.len() - 1
        });

        if m.start() > last {
            tokens.push(Token::Text(&text[last..m.start()]));
        }
        tokens.push(Token::Url(index));
        last = m.end();
    }
    if last < text.len() {
        tokens.push(Token::Text(&text[last..]));
    }

    (tokens, urls)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SHELL_OPEN: &str = "<!DOCTYPE html><head></head><body>";
    const SHELL_CLOSE: &str = "</body>";

    fn body(html: &str) -> &str {
        html.strip_prefix(SHELL_OPEN)
            .and_then(|h| h.strip_suffix(SHELL_CLOSE))
            .unwrap()
    }

    fn paragraphs(html: &str) -> Vec<String> {
        let re = Regex::new(r"<p[^>]*>(.*?)</p>").unwrap();
        re.captures_iter(html).map(|c| c[1].to_string()).collect()
    }

    #[test]
    fn test_single_line() {
        assert_eq!(
            compose_html("Hello"),
            "<!DOCTYPE html><head></head><body><p>Hello</p></body>"
        );
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(body(&compose_html("")), "");
    }

    #[test]
    fn test_lines_become_paragraphs() {
        assert_eq!(body(&compose_html("one\ntwo")), "<p>one</p><p>two</p>");
        assert_eq!(body(&compose_html("one\r\ntwo\r\n")), "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_blank_lines_collapse_into_margin() {
        assert_eq!(
            body(&compose_html("Hi,\n\n\nSee you")),
            "<p>Hi,</p><p style=\"margin-top: 1em\">See you</p>"
        );
    }

    #[test]
    fn test_url_becomes_anchor() {
        assert_eq!(
            body(&compose_html("go to https://example.com/a?b=1&c=%20 now")),
            "<p>go to <a href=\"https://example.com/a?b=1&c=%20\">\
             https://example.com/a?b=1&c=%20</a> now</p>"
        );
    }

    #[test]
    fn test_url_stops_at_markup() {
        assert_eq!(
            body(&compose_html("<b>http://example.com</b>")),
            "<p><b><a href=\"http://example.com\">http://example.com</a></b></p>"
        );
    }

    #[test]
    fn test_prefix_url_does_not_corrupt_longer_url() {
        let html = compose_html("http://a.io and http://a.io/docs");
        assert_eq!(
            body(&html),
            "<p><a href=\"http://a.io\">http://a.io</a> and \
             <a href=\"http://a.io/docs\">http://a.io/docs</a></p>"
        );
    }

    #[test]
    fn test_many_distinct_urls() {
        let text: Vec<String> = (0..12).map(|i| format!("http://h{i}.org")).collect();
        let html = compose_html(&text.join(" "));
        for url in &text {
            assert!(html.contains(&format!("<a href=\"{url}\">{url}</a>")));
        }
        assert_eq!(html.matches("<a ").count(), 12);
    }

    #[test]
    fn test_token_like_text_is_not_linked() {
        let text = "token \u{E000}0\u{E001} then http://x.io";
        let html = compose_html(text);
        assert_eq!(html.matches("<a ").count(), 1);
        assert_eq!(
            body(&html),
            "<p>token \u{E000}0\u{E001} then <a href=\"http://x.io\">http://x.io</a></p>"
        );
    }

    #[test]
    fn test_tokenize_reuses_index() {
        let (tokens, urls) = tokenize("http://a.io x http://a.io");
        assert_eq!(urls, vec!["http://a.io"]);
        assert_eq!(tokens, vec![Token::Url(0), Token::Text(" x "), Token::Url(0)]);
    }

    #[test]
    fn test_received_text_is_escaped() {
        assert_eq!(
            body(&text_to_html("if a<b && c>d see <http://x.io?a=1&b=2>")),
            "<p>if a&lt;b &amp;&amp; c&gt;d see &lt;\
             <a href=\"http://x.io?a=1&b=2\">http://x.io?a=1&b=2</a>&gt;</p>"
        );
        assert_eq!(
            body(&text_to_html("<b>not bold</b>")),
            "<p>&lt;b&gt;not bold&lt;/b&gt;</p>"
        );
    }

    #[test]
    fn test_markup_is_kept() {
        assert_eq!(
            body(&compose_html("<i>hey</i> <u>you</u>")),
            "<p><i>hey</i> <u>you</u></p>"
        );
    }

    #[test]
    fn test_deterministic() {
        let text = "a http://x.y\n\nb http://x.y";
        assert_eq!(compose_html(text), compose_html(text));
    }

    proptest! {
        #[test]
        fn prop_plain_lines_round_trip(lines in prop::collection::vec("[a-zA-Z0-9 ,.!?]{0,20}", 0..8)) {
            let text = lines.join("\n");
            let html = compose_html(&text);

            prop_assert!(!html.contains("<a"));
            let expected: Vec<String> = lines.into_iter().filter(|l| !l.is_empty()).collect();
            prop_assert_eq!(paragraphs(&html), expected);
        }

        #[test]
        fn prop_repeated_url_links_identically(
            host in "[a-z]{1,10}",
            path in "[a-z0-9/]{0,10}",
            filler in "[a-z ]{0,10}",
        ) {
            let url = format!("https://{host}.com/{path}");
            let html = compose_html(&format!("{url} {filler} {url}"));

            let href = format!("href=\"{url}\"");
            let anchor_text = format!(">{url}</a>");
            prop_assert_eq!(html.matches(&href).count(), 2);
            prop_assert_eq!(html.matches(&anchor_text).count(), 2);
        }
    }
}
