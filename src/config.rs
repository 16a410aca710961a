use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub database_url: String,
    pub agent_api_url: String,
    pub agent_api_key: Option<String>,
    pub agent_name: String,
    pub agent_verbosity: String,
    pub agent_max_workflow_steps: u32,
    pub agent_call_timeout_secs: u64,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            port: env::var("APP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("APP_PORT must be a number"),
            environment: env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            agent_api_url: env::var("AGENT_API_URL")
                .unwrap_or_else(|_| "https://api.you.com/v1/agents/runs".to_string()),
            agent_api_key: env::var("AGENT_API_KEY").ok(),
            agent_name: env::var("AGENT_NAME").unwrap_or_else(|_| "advanced".to_string()),
            agent_verbosity: env::var("AGENT_VERBOSITY").unwrap_or_else(|_| "medium".to_string()),
            agent_max_workflow_steps: env::var("AGENT_MAX_WORKFLOW_STEPS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("AGENT_MAX_WORKFLOW_STEPS must be a number"),
            agent_call_timeout_secs: env::var("AGENT_CALL_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .expect("AGENT_CALL_TIMEOUT_SECS must be a number"),
            otel_service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "venturescope".to_string()),
            otel_exporter_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:4317".to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
