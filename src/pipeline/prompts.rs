//! The five research prompts synthesized from one intake.

use super::evaluate::Intake;

pub fn industry_news(intake: &Intake) -> String {
    format!(
        "Find the 5 most recent and relevant news articles about startups or companies \
         in the {} industry, specifically related to this problem: \"{}\".\n\n\
         For each article provide:\n\
         - Title\n\
         - Source URL\n\
         - One-sentence summary\n\n\
         Focus on 2025\u{2013}2026 news. Cite your sources.",
        intake.industry, intake.core_problem_statement
    )
}

pub fn competitor_links(competitors: &[String]) -> String {
    format!(
        "Find the official website and pricing page for each of these companies: {}.\n\n\
         For each company return:\n\
         - Company name\n\
         - Homepage URL\n\
         - Pricing page URL (if publicly available)\n\n\
         Cite your sources.",
        competitors.join(", ")
    )
}

pub fn synthesis(intake: &Intake) -> String {
    format!(
        "You are a senior venture analyst writing an AI Research Synthesis report section.\n\n\
         Startup: {} ({})\n\
         Problem: {}\n\
         Solution: {}\n\
         Ideal Customer Profile (ICP): {}\n\n\
         Write 3 concise paragraphs:\n\
         1. Problem clarity and market pain severity\n\
         2. Solution uniqueness and feasibility\n\
         3. ICP fit and go-to-market alignment\n\n\
         Be direct, analytical, and grounded in evidence. Cite sources where possible.",
        intake.startup_name,
        intake.industry,
        intake.core_problem_statement,
        intake.proposed_solution_overview,
        intake.target_customer_profile
    )
}

pub fn regional_tam(intake: &Intake) -> String {
    format!(
        "You are a market research analyst specializing in regional market sizing.\n\n\
         Startup: {}\n\
         Industry: {}\n\
         Problem: {}\n\
         Target Region: {}\n\n\
         Provide a concise TAM (Total Addressable Market) estimate ONLY for the {} region. \
         Include:\n\
         - Estimated market size in USD\n\
         - Key growth drivers in this region\n\
         - Any region-specific risks or regulatory considerations\n\n\
         Cite real data sources where available.",
        intake.startup_name,
        intake.industry,
        intake.core_problem_statement,
        intake.primary_geography,
        intake.primary_geography
    )
}

pub fn risk_confidence(intake: &Intake) -> String {
    let mut metrics = String::new();
    if let Some(mrr) = &intake.monthly_recurring_revenue {
        metrics.push_str(&format!("MRR: {mrr}\n"));
    }
    if let Some(customers) = &intake.active_customer_count {
        metrics.push_str(&format!("Active Customers: {customers}\n"));
    }
    if let Some(growth) = &intake.month_over_month_growth {
        metrics.push_str(&format!("MoM Growth: {growth}\n"));
    }

    format!(
        "You are a venture risk analyst evaluating startup business model viability.\n\n\
         Startup: {}\n\
         Industry: {}\n\
         Stage: {}\n\
         Revenue Model: {}\n\
         Business Model: {}\n\
         Competitive Differentiators: {}\n\
         {}\n\
         Return a structured evaluation with:\n\
         1. Risk Level: Low / Medium / High \u{2014} with a one-sentence justification\n\
         2. Confidence Score: 0\u{2013}100% \u{2014} based on model clarity, market fit, and \
         differentiation strength\n\
         3. Benchmark: How does this model compare to typical {} companies at the {} stage?\n\n\
         Be concise and direct.",
        intake.startup_name,
        intake.industry,
        intake.funding_stage,
        intake.revenue_model_structure,
        intake.business_model_explanation,
        intake.competitive_differentiators,
        metrics,
        intake.industry,
        intake.funding_stage
    )
}
