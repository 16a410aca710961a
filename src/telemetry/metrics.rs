use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
};
use std::sync::LazyLock;

pub static METER: LazyLock<Meter> = LazyLock::new(|| global::meter("venturescope"));

// --- Agent API Metrics ---

pub static AGENT_CALL_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("agent.client.operation.duration")
        .with_description("Duration of agent API calls in seconds")
        .with_unit("s")
        .build()
});

pub static AGENT_ERROR_COUNT: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("agent.client.error.count")
        .with_description("Number of failed agent API calls")
        .with_unit("{error}")
        .build()
});

pub static AGENT_CITATIONS: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("agent.client.citations")
        .with_description("Number of citations returned per agent call")
        .with_unit("{citation}")
        .build()
});

// --- Domain Metrics ---

pub static EVALUATION_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("evaluation.duration")
        .with_description("Total evaluation duration in seconds")
        .with_unit("s")
        .build()
});

pub static EVALUATION_CITATIONS: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("evaluation.citations")
        .with_description("Total citations collected per evaluation")
        .with_unit("{citation}")
        .build()
});

pub static EVALUATION_CONFIDENCE: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("evaluation.confidence")
        .with_description("Extracted confidence score per evaluation")
        .with_unit("%")
        .build()
});

// --- HTTP Metrics ---

pub static HTTP_REQUESTS_TOTAL: LazyLock<Counter<u64>> = LazyLock::new(|| {
    METER
        .u64_counter("http.requests.total")
        .with_description("Total number of HTTP requests")
        .with_unit("{request}")
        .build()
});

pub static HTTP_REQUEST_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    METER
        .f64_histogram("http.request.duration")
        .with_description("HTTP request duration in milliseconds")
        .with_unit("ms")
        .with_boundaries(vec![
            1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0,
        ])
        .build()
});
