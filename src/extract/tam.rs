//! TAM section extraction: market stats plus region-specific risk bullets.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// The TAM markdown split at the region-risks heading. Either half may be
/// empty when the heading is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TamSections {
    pub main: String,
    pub risks: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TamStats {
    pub tam: Option<String>,
    pub cagr: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionRisk {
    pub title: String,
    pub body: String,
}

// Tolerates numbering and wording drift, e.g. "### 3. Region-Specific Risks"
// or "### Regional Risks & Regulation".
static REGION_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"###\s+\d*\.?\s*[Rr]egion.{0,20}[Rr]isk").expect("region heading pattern")
});

static TAM_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$(\d+\.?\d*)[–-](\d+\.?\d*)\s*(?:billion|B)").expect("tam range pattern")
});

static TAM_SINGLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\$(\d+\.?\d*)\s*(?:billion|B)").expect("tam pattern"));

static CAGR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.?\d*)%\s*(?:CAGR|cagr)").expect("cagr pattern"));

static THROUGH_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)through\s+(\d{4})").expect("through year pattern"));

static BY_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)by\s+(\d{4})").expect("by year pattern"));

static RISK_BULLET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^-\s+\*\*([^*]+)\*\*[:\s]*(.*)").expect("risk bullet pattern")
});

pub fn split_sections(text: &str) -> TamSections {
    match REGION_HEADING_RE.find(text) {
        Some(m) => TamSections {
            main: text[..m.start()].trim().to_string(),
            risks: text[m.start()..].trim().to_string(),
        },
        None => TamSections {
            main: text.to_string(),
            risks: String::new(),
        },
    }
}

pub fn parse_stats(text: &str) -> TamStats {
    let tam = if let Some(c) = TAM_RANGE_RE.captures(text) {
        Some(format!("${}–{}B", &c[1], &c[2]))
    } else {
        TAM_SINGLE_RE.captures(text).map(|c| format!("${}B", &c[1]))
    };

    let cagr = CAGR_RE.captures(text).map(|c| format!("{}%", &c[1]));

    let year = THROUGH_YEAR_RE
        .captures(text)
        .or_else(|| BY_YEAR_RE.captures(text))
        .map(|c| c[1].to_string());

    TamStats { tam, cagr, year }
}

pub fn parse_region_risks(text: &str) -> Vec<RegionRisk> {
    RISK_BULLET_RE
        .captures_iter(text)
        .map(|c| {
            let raw_title = &c[1];
            let title = raw_title.strip_suffix(':').unwrap_or(raw_title).trim();
            RegionRisk {
                title: title.to_string(),
                body: c[2].trim().to_string(),
            }
        })
        .collect()
}
