//! Heuristic extraction of structured fields from agent-generated markdown.
//!
//! This is best-effort presentation-layer parsing of free-form generative
//! text: every extractor falls back to a default or empty value when its
//! pattern misses, and none of them can fail. The memo consumer degrades
//! gracefully on empty sections.

pub mod news;
pub mod risk;
pub mod tam;

pub use news::NewsArticle;
pub use risk::{RiskLevel, RiskScoreFields};
pub use tam::{RegionRisk, TamSections, TamStats};

use serde::Serialize;

/// Everything the dashboard memo renders, extracted once from the three
/// markdown sections that carry loosely-structured fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMemo {
    pub confidence: i32,
    pub risk_level: RiskLevel,
    pub justification: String,
    pub rationale: String,
    pub tam: Option<String>,
    pub cagr: Option<String>,
    pub horizon_year: Option<String>,
    pub market_overview: String,
    pub region_risks: Vec<RegionRisk>,
    pub news_articles: Vec<NewsArticle>,
}

/// Pure assembly over the section texts; identical input yields identical
/// output.
pub fn build_memo(risk_score_text: &str, tam_text: &str, news_text: &str) -> DashboardMemo {
    let risk = risk::parse_risk_score(risk_score_text);
    let sections = tam::split_sections(tam_text);
    let stats = tam::parse_stats(tam_text);

    DashboardMemo {
        confidence: risk.confidence,
        risk_level: risk.risk_level,
        justification: risk.justification,
        rationale: risk.rationale,
        tam: stats.tam,
        cagr: stats.cagr,
        horizon_year: stats.year,
        market_overview: sections.main,
        region_risks: tam::parse_region_risks(&sections.risks),
        news_articles: news::parse_articles(news_text),
    }
}
