use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use opentelemetry::trace::TraceContextExt;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use uuid::Uuid;

use crate::agent::{AgentResult, ResearchAgent};
use crate::db::sessions::InsertSession;
use crate::error::AppError;
use crate::extract::risk::{self, RiskLevel};
use crate::telemetry::metrics::{
    EVALUATION_CITATIONS, EVALUATION_CONFIDENCE, EVALUATION_DURATION,
};

use super::prompts;

/// The startup intake collected before evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intake {
    pub startup_name: String,
    pub industry: String,
    pub funding_stage: String,
    pub primary_geography: String,
    pub target_customer_profile: String,
    pub core_problem_statement: String,
    pub proposed_solution_overview: String,
    pub revenue_model_structure: String,
    pub business_model_explanation: String,
    #[serde(default)]
    pub known_competitors: Vec<String>,
    pub competitive_differentiators: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_recurring_revenue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_customer_count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_over_month_growth: Option<String>,
}

/// The five named report sections of one evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub industry_news: AgentResult,
    pub competitor_links: AgentResult,
    pub synthesis: AgentResult,
    pub tam_data: AgentResult,
    pub risk_score: AgentResult,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub confidence: i32,
    pub risk_level: RiskLevel,
    pub result: EvaluationResult,
}

const NO_COMPETITORS_TEXT: &str = "No competitors listed.";

async fn call(
    agent: &dyn ResearchAgent,
    deadline: Duration,
    task: &'static str,
    input: String,
) -> Result<AgentResult, AppError> {
    match tokio::time::timeout(deadline, agent.research(task, &input)).await {
        Ok(result) => result.map_err(|e| AppError::Agent(e.to_string())),
        Err(_) => Err(AppError::Pipeline(format!(
            "agent call {task} exceeded its {}s deadline",
            deadline.as_secs()
        ))),
    }
}

/// Fans out the five research calls and waits for all of them. Each call
/// carries its own deadline; the first failure drops the sibling futures,
/// cancelling their in-flight requests. No partial results are delivered.
pub async fn run_agents(
    agent: &dyn ResearchAgent,
    deadline: Duration,
    intake: &Intake,
) -> Result<EvaluationResult, AppError> {
    let competitor_links = async {
        if intake.known_competitors.is_empty() {
            Ok(AgentResult {
                text: NO_COMPETITORS_TEXT.to_string(),
                citations: vec![],
            })
        } else {
            call(
                agent,
                deadline,
                "competitor_links",
                prompts::competitor_links(&intake.known_competitors),
            )
            .await
        }
    };

    let (industry_news, competitor_links, synthesis, tam_data, risk_score) = tokio::try_join!(
        call(agent, deadline, "industry_news", prompts::industry_news(intake)),
        competitor_links,
        call(agent, deadline, "synthesis", prompts::synthesis(intake)),
        call(agent, deadline, "tam_data", prompts::regional_tam(intake)),
        call(agent, deadline, "risk_score", prompts::risk_confidence(intake)),
    )?;

    Ok(EvaluationResult {
        industry_news,
        competitor_links,
        synthesis,
        tam_data,
        risk_score,
    })
}

#[tracing::instrument(
    name = "pipeline evaluate",
    skip(pool, agent, intake),
    fields(
        evaluation.startup = %intake.startup_name,
        evaluation.session_id,
        evaluation.confidence,
        evaluation.risk_level,
        evaluation.duration_ms,
    )
)]
pub async fn evaluate(
    pool: &PgPool,
    agent: &dyn ResearchAgent,
    deadline: Duration,
    intake: &Intake,
) -> Result<Evaluation, AppError> {
    let start = Instant::now();

    let span = tracing::Span::current();
    let context = span.context();
    let otel_span = context.span();
    let span_context = otel_span.span_context();
    let trace_id = span_context
        .is_valid()
        .then(|| span_context.trace_id().to_string());

    let result = run_agents(agent, deadline, intake).await?;

    // Derived fields, extracted once at assembly time and stored with the
    // session so history listings never re-parse the markdown.
    let risk = risk::parse_risk_score(&result.risk_score.text);

    let duration = start.elapsed();
    let session_id = Uuid::new_v4();
    let created_at = Utc::now();

    let intake_json =
        serde_json::to_value(intake).map_err(|e| AppError::Pipeline(e.to_string()))?;
    let result_json =
        serde_json::to_value(&result).map_err(|e| AppError::Pipeline(e.to_string()))?;

    crate::db::sessions::insert_session(
        pool,
        &InsertSession {
            id: session_id,
            startup_name: &intake.startup_name,
            industry: &intake.industry,
            funding_stage: &intake.funding_stage,
            intake: &intake_json,
            result: &result_json,
            confidence: risk.confidence,
            risk_level: risk.risk_level.as_str(),
            trace_id: trace_id.as_deref(),
            evaluation_duration_ms: duration.as_millis() as i32,
        },
    )
    .await
    .map_err(AppError::Database)?;

    let total_citations = result.industry_news.citations.len()
        + result.competitor_links.citations.len()
        + result.synthesis.citations.len()
        + result.tam_data.citations.len()
        + result.risk_score.citations.len();

    EVALUATION_DURATION.record(duration.as_secs_f64(), &[]);
    EVALUATION_CITATIONS.record(total_citations as f64, &[]);
    EVALUATION_CONFIDENCE.record(f64::from(risk.confidence), &[]);

    span.record("evaluation.session_id", session_id.to_string());
    span.record("evaluation.confidence", risk.confidence);
    span.record("evaluation.risk_level", risk.risk_level.as_str());
    span.record("evaluation.duration_ms", duration.as_millis() as u64);

    Ok(Evaluation {
        session_id,
        created_at,
        confidence: risk.confidence,
        risk_level: risk.risk_level,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubAgent {
        fail_task: Option<&'static str>,
        delay: Option<Duration>,
        calls: Mutex<Vec<String>>,
    }

    impl StubAgent {
        fn new() -> Self {
            Self {
                fail_task: None,
                delay: None,
                calls: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait::async_trait]
    impl ResearchAgent for StubAgent {
        async fn research(&self, task: &str, _input: &str) -> anyhow::Result<AgentResult> {
            self.calls.lock().unwrap().push(task.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_task == Some(task) {
                anyhow::bail!("stub failure in {task}");
            }
            Ok(AgentResult {
                text: format!("section for {task}"),
                citations: vec![],
            })
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn intake_with_competitors(competitors: Vec<String>) -> Intake {
        Intake {
            startup_name: "Acme".to_string(),
            industry: "Fintech".to_string(),
            funding_stage: "Pre-Seed".to_string(),
            primary_geography: "US".to_string(),
            target_customer_profile: "SMBs".to_string(),
            core_problem_statement: "payments are slow".to_string(),
            proposed_solution_overview: "instant rails".to_string(),
            revenue_model_structure: "take rate".to_string(),
            business_model_explanation: "per-transaction fee".to_string(),
            known_competitors: competitors,
            competitive_differentiators: "speed".to_string(),
            monthly_recurring_revenue: None,
            active_customer_count: None,
            month_over_month_growth: None,
        }
    }

    #[tokio::test]
    async fn test_run_agents_populates_all_sections() {
        let agent = StubAgent::new();
        let intake = intake_with_competitors(vec!["Rival".to_string()]);

        let result = run_agents(&agent, Duration::from_secs(5), &intake)
            .await
            .unwrap();

        assert_eq!(result.industry_news.text, "section for industry_news");
        assert_eq!(result.competitor_links.text, "section for competitor_links");
        assert_eq!(result.synthesis.text, "section for synthesis");
        assert_eq!(result.tam_data.text, "section for tam_data");
        assert_eq!(result.risk_score.text, "section for risk_score");
        assert_eq!(agent.calls.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_run_agents_skips_competitor_call_when_list_empty() {
        let agent = StubAgent::new();
        let intake = intake_with_competitors(vec![]);

        let result = run_agents(&agent, Duration::from_secs(5), &intake)
            .await
            .unwrap();

        assert_eq!(result.competitor_links.text, "No competitors listed.");
        assert!(result.competitor_links.citations.is_empty());
        let calls = agent.calls.lock().unwrap();
        assert_eq!(calls.len(), 4);
        assert!(!calls.iter().any(|t| t == "competitor_links"));
    }

    #[tokio::test]
    async fn test_run_agents_fails_as_a_unit() {
        let agent = StubAgent {
            fail_task: Some("tam_data"),
            ..StubAgent::new()
        };
        let intake = intake_with_competitors(vec![]);

        let err = run_agents(&agent, Duration::from_secs(5), &intake)
            .await
            .unwrap_err();

        match err {
            AppError::Agent(msg) => assert!(msg.contains("stub failure in tam_data")),
            other => panic!("expected Agent error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_agents_enforces_per_call_deadline() {
        let agent = StubAgent {
            delay: Some(Duration::from_secs(30)),
            ..StubAgent::new()
        };
        let intake = intake_with_competitors(vec![]);

        let err = run_agents(&agent, Duration::from_millis(20), &intake)
            .await
            .unwrap_err();

        match err {
            AppError::Pipeline(msg) => assert!(msg.contains("deadline")),
            other => panic!("expected Pipeline error, got {other:?}"),
        }
    }

    #[test]
    fn test_intake_deserializes_camel_case_body() {
        let intake: Intake = serde_json::from_str(
            r#"{
                "startupName": "Acme",
                "industry": "Fintech",
                "fundingStage": "Seed",
                "primaryGeography": "EU",
                "targetCustomerProfile": "SMBs",
                "coreProblemStatement": "payments are slow",
                "proposedSolutionOverview": "instant rails",
                "revenueModelStructure": "take rate",
                "businessModelExplanation": "per-transaction fee",
                "competitiveDifferentiators": "speed",
                "monthlyRecurringRevenue": "$10k"
            }"#,
        )
        .unwrap();
        assert_eq!(intake.startup_name, "Acme");
        assert!(intake.known_competitors.is_empty());
        assert_eq!(intake.monthly_recurring_revenue.as_deref(), Some("$10k"));
        assert_eq!(intake.active_customer_count, None);
    }

    #[test]
    fn test_evaluation_result_serializes_with_named_sections() {
        let section = AgentResult::default();
        let result = EvaluationResult {
            industry_news: section.clone(),
            competitor_links: section.clone(),
            synthesis: section.clone(),
            tam_data: section.clone(),
            risk_score: section,
        };
        let json = serde_json::to_value(&result).unwrap();
        for key in [
            "industryNews",
            "competitorLinks",
            "synthesis",
            "tamData",
            "riskScore",
        ] {
            assert!(json.get(key).is_some(), "missing section {key}");
        }
    }
}
