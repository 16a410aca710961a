use std::time::Duration;

use axum::{Json, extract::State};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::pipeline::{Evaluation, Intake, evaluate};

pub async fn create_evaluation(
    State(state): State<AppState>,
    Json(intake): Json<Intake>,
) -> AppResult<Json<Evaluation>> {
    validate_intake(&intake)?;

    let deadline = Duration::from_secs(state.config.agent_call_timeout_secs);
    let evaluation = evaluate(&state.pool, state.agent.as_ref(), deadline, &intake).await?;

    Ok(Json(evaluation))
}

fn validate_intake(intake: &Intake) -> Result<(), AppError> {
    let required = [
        ("startupName", &intake.startup_name),
        ("industry", &intake.industry),
        ("fundingStage", &intake.funding_stage),
        ("primaryGeography", &intake.primary_geography),
        ("targetCustomerProfile", &intake.target_customer_profile),
        ("coreProblemStatement", &intake.core_problem_statement),
        ("proposedSolutionOverview", &intake.proposed_solution_overview),
        ("revenueModelStructure", &intake.revenue_model_structure),
        ("businessModelExplanation", &intake.business_model_explanation),
        (
            "competitiveDifferentiators",
            &intake.competitive_differentiators,
        ),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} must not be empty")));
        }
    }

    Ok(())
}
