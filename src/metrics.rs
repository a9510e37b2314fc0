//! Pipeline counters, registered with the default Prometheus registry.

use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    pub static ref PIPELINE_RUNS: IntCounterVec = register_int_counter_vec!(
        "agc_pipeline_runs_total",
        "Document pipeline runs by outcome",
        &["outcome"]
    )
    .expect("pipeline run counter registration");
    pub static ref PIPELINE_STAGE_FAILURES: IntCounterVec = register_int_counter_vec!(
        "agc_pipeline_stage_failures_total",
        "Document pipeline failures by stage",
        &["stage"]
    )
    .expect("stage failure counter registration");
}
