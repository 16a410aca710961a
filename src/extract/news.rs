//! Industry-news section extraction.
//!
//! The news prompt asks for numbered sub-sections with a bolded title, a
//! labeled source link and a one-line summary. Articles are numbered by
//! appearance order, not by the digits the agent happened to emit.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub number: usize,
    pub title: String,
    pub source_url: String,
    pub source_domain: String,
    pub summary: String,
}

static ARTICLE_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"###\s+(\d+)\.\s+\*\*([^*\n]+)\*\*").expect("article heading pattern")
});

static SOURCE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Source URL[^\[]*\[([^\]]+)\]\(([^)\s#]+)").expect("source url pattern")
});

static SUMMARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Summary[:*]+\s*([^\n\[]+)").expect("summary pattern"));

pub fn parse_articles(text: &str) -> Vec<NewsArticle> {
    let headings: Vec<_> = ARTICLE_HEADING_RE.captures_iter(text).collect();

    headings
        .iter()
        .enumerate()
        .map(|(i, cap)| {
            let start = cap.get(0).map(|m| m.start()).unwrap_or(0);
            let end = headings
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(text.len());
            let body = &text[start..end];

            let source_url = SOURCE_URL_RE
                .captures(body)
                .map(|c| c[2].trim().to_string())
                .unwrap_or_default();

            let summary = SUMMARY_RE
                .captures(body)
                .map(|c| c[1].trim().to_string())
                .unwrap_or_default();

            NewsArticle {
                number: i + 1,
                title: cap[2].trim().to_string(),
                source_domain: source_domain(&source_url),
                source_url,
                summary,
            }
        })
        .collect()
}

/// Host name with any leading `www.` removed; the raw string is kept when the
/// URL does not parse.
fn source_domain(raw: &str) -> String {
    Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .map(|host| host.strip_prefix("www.").unwrap_or(&host).to_string())
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_article() {
        let text = "### 1. **Acme Raises Seed**\n\
            Source URL: [link](https://example.com/a)\n\
            **Summary:** grew fast\n";
        let articles = parse_articles(text);
        assert_eq!(articles.len(), 1);
        let a = &articles[0];
        assert_eq!(a.number, 1);
        assert_eq!(a.title, "Acme Raises Seed");
        assert_eq!(a.source_url, "https://example.com/a");
        assert_eq!(a.source_domain, "example.com");
        assert_eq!(a.summary, "grew fast");
    }

    #[test]
    fn test_numbering_follows_appearance_order() {
        let text = "### 7. **First**\n**Summary:** a\n\
            ### 2. **Second**\n**Summary:** b\n";
        let articles = parse_articles(text);
        assert_eq!(articles[0].number, 1);
        assert_eq!(articles[0].title, "First");
        assert_eq!(articles[1].number, 2);
        assert_eq!(articles[1].title, "Second");
    }

    #[test]
    fn test_fields_do_not_leak_across_sections() {
        let text = "### 1. **Has Nothing**\nplain text only\n\
            ### 2. **Has Both**\nSource URL: [x](https://news.example.org/p)\n\
            **Summary:** detail line\n";
        let articles = parse_articles(text);
        assert_eq!(articles[0].source_url, "");
        assert_eq!(articles[0].summary, "");
        assert_eq!(articles[1].source_domain, "news.example.org");
        assert_eq!(articles[1].summary, "detail line");
    }

    #[test]
    fn test_www_prefix_stripped() {
        let text = "### 1. **T**\nSource URL: [l](https://www.techcrunch.com/x)\n";
        assert_eq!(parse_articles(text)[0].source_domain, "techcrunch.com");
    }

    #[test]
    fn test_unparsable_url_kept_raw() {
        let text = "### 1. **T**\nSource URL: [l](not-a-url)\n";
        let articles = parse_articles(text);
        assert_eq!(articles[0].source_url, "not-a-url");
        assert_eq!(articles[0].source_domain, "not-a-url");
    }

    #[test]
    fn test_no_articles_in_plain_text() {
        assert!(parse_articles("Just prose without any numbered sections.").is_empty());
    }

    #[test]
    fn test_url_fragment_excluded() {
        let text = "### 1. **T**\nSource URL: [l](https://example.com/a#section)\n";
        assert_eq!(parse_articles(text)[0].source_url, "https://example.com/a");
    }
}
