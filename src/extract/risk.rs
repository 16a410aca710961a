//! Risk & confidence section extraction.
//!
//! Patterns mirror the memo format the risk prompt asks the agent for. A miss
//! falls back deterministically: confidence 75, risk level Medium, empty text.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIDENCE: i32 = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskScoreFields {
    pub confidence: i32,
    pub risk_level: RiskLevel,
    pub justification: String,
    pub rationale: String,
}

static CONFIDENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Confidence Score[^:*]*[:*]+\s*\*{0,2}(\d+)%").expect("confidence pattern")
});

static RISK_LEVEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Risk Level[^:*]*[:*]+\s*\*{0,2}(Low|Medium|High)").expect("risk level pattern")
});

static JUSTIFICATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[Jj]ustification[:*\s]+([^\n]+)").expect("justification pattern"));

// Lazy up to the next horizontal rule or heading; if neither follows, the
// whole match fails and the rationale stays empty.
static RATIONALE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)[Rr]ationale[:*\s]+(.+?)\n(?:---|###)").expect("rationale pattern")
});

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-*]").expect("marker pattern"));
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("ws pattern"));

pub fn parse_risk_score(text: &str) -> RiskScoreFields {
    let confidence = CONFIDENCE_RE
        .captures(text)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(DEFAULT_CONFIDENCE);

    let risk_level = RISK_LEVEL_RE
        .captures(text)
        .and_then(|c| RiskLevel::from_label(&c[1]))
        .unwrap_or(RiskLevel::Medium);

    let justification = JUSTIFICATION_RE
        .captures(text)
        .map(|c| c[1].replace('*', "").trim().to_string())
        .unwrap_or_default();

    let rationale = RATIONALE_RE
        .captures(text)
        .map(|c| {
            let stripped = MARKER_RE.replace_all(&c[1], "");
            WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
        })
        .unwrap_or_default();

    RiskScoreFields {
        confidence,
        risk_level,
        justification,
        rationale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_and_risk_from_bold_markup() {
        let text = "Evaluation:\nConfidence Score: **82%** overall.\nRisk Level: **Low** given traction.";
        let fields = parse_risk_score(text);
        assert_eq!(fields.confidence, 82);
        assert_eq!(fields.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_confidence_fallback_is_deterministic() {
        let text = "No structured markers at all in this response.";
        assert_eq!(parse_risk_score(text).confidence, 75);
        assert_eq!(parse_risk_score(text).confidence, 75);
    }

    #[test]
    fn test_risk_level_fallback_medium() {
        let fields = parse_risk_score("Risk Level: extreme");
        assert_eq!(fields.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_risk_level_case_insensitive() {
        let fields = parse_risk_score("risk level: high");
        assert_eq!(fields.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_confidence_with_label_suffix() {
        // "Confidence Score (0-100%)" style labels before the separator
        let fields = parse_risk_score("2. Confidence Score (model clarity): 64%");
        assert_eq!(fields.confidence, 64);
    }

    #[test]
    fn test_justification_strips_emphasis() {
        let fields = parse_risk_score("Justification: **Strong** recurring *revenue* base\nmore");
        assert_eq!(fields.justification, "Strong recurring revenue base");
    }

    #[test]
    fn test_rationale_stops_at_rule() {
        let text = "Rationale: - solid *market*\n- clear moat\n---\n### Benchmark\nignored";
        let fields = parse_risk_score(text);
        assert_eq!(fields.rationale, "solid market clear moat");
    }

    #[test]
    fn test_rationale_without_terminator_is_empty() {
        let fields = parse_risk_score("Rationale: trailing text with no rule or heading");
        assert_eq!(fields.rationale, "");
    }

    #[test]
    fn test_risk_level_serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&RiskLevel::Medium).unwrap(),
            "\"Medium\""
        );
        assert_eq!(RiskLevel::High.to_string(), "High");
    }
}
