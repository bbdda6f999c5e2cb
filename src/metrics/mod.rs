//! Prometheus metrics module
//!
//! Session lifecycle, command, and gateway counters exposed on /metrics.

use metrics::{counter, describe_counter, describe_gauge, gauge, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;

/// Bot metrics collector
#[derive(Clone)]
pub struct BotMetrics {
    handle: Arc<PrometheusHandle>,
}

impl BotMetrics {
    /// Initialize metrics and return handle
    pub fn new() -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("Failed to install Prometheus recorder");

        Self::register_metrics();

        Self {
            handle: Arc::new(handle),
        }
    }

    /// Register metric descriptions
    fn register_metrics() {
        describe_counter!(
            "scrimbot_sessions_created_total",
            Unit::Count,
            "Recruitment sessions opened"
        );
        describe_counter!(
            "scrimbot_session_joins_total",
            Unit::Count,
            "Successful roster joins"
        );
        describe_counter!(
            "scrimbot_session_leaves_total",
            Unit::Count,
            "Successful roster leaves"
        );
        describe_counter!(
            "scrimbot_session_closures_total",
            Unit::Count,
            "Session closures by reason"
        );
        describe_counter!(
            "scrimbot_session_errors_total",
            Unit::Count,
            "Rejected session operations by error type"
        );
        describe_counter!(
            "scrimbot_team_assignments_total",
            Unit::Count,
            "Team assignment reports produced"
        );
        describe_counter!(
            "scrimbot_commands_total",
            Unit::Count,
            "Prefix commands handled"
        );
        describe_counter!(
            "scrimbot_bot_errors_total",
            Unit::Count,
            "Adapter errors by error type"
        );

        describe_gauge!(
            "scrimbot_roster_size",
            Unit::Count,
            "Players on the current roster"
        );
        describe_gauge!(
            "scrimbot_gateway_connected",
            Unit::Count,
            "Discord gateway status (1=connected, 0=disconnected)"
        );
    }

    /// Record a session being opened
    pub fn record_session_created(&self) {
        counter!("scrimbot_sessions_created_total").increment(1);
        gauge!("scrimbot_roster_size").set(0.0);
    }

    /// Record a successful join and the resulting roster size
    pub fn record_join(&self, roster_size: usize) {
        counter!("scrimbot_session_joins_total").increment(1);
        gauge!("scrimbot_roster_size").set(roster_size as f64);
    }

    /// Record a successful leave and the resulting roster size
    pub fn record_leave(&self, roster_size: usize) {
        counter!("scrimbot_session_leaves_total").increment(1);
        gauge!("scrimbot_roster_size").set(roster_size as f64);
    }

    /// Record a session closure
    pub fn record_closure(&self, reason: &'static str) {
        counter!(
            "scrimbot_session_closures_total",
            "reason" => reason
        )
        .increment(1);
        gauge!("scrimbot_roster_size").set(0.0);
    }

    /// Record a rejected session operation
    pub fn record_session_error(&self, error_type: &'static str) {
        counter!(
            "scrimbot_session_errors_total",
            "error_type" => error_type
        )
        .increment(1);
    }

    /// Record a produced team assignment
    pub fn record_team_assignment(&self) {
        counter!("scrimbot_team_assignments_total").increment(1);
    }

    /// Record a handled prefix command
    pub fn record_command(&self, command: &'static str) {
        counter!(
            "scrimbot_commands_total",
            "command" => command
        )
        .increment(1);
    }

    /// Record an adapter error
    pub fn record_bot_error(&self, error_type: &'static str) {
        counter!(
            "scrimbot_bot_errors_total",
            "error_type" => error_type
        )
        .increment(1);
    }

    /// Set gateway connection status
    pub fn set_gateway_connected(&self, connected: bool) {
        gauge!("scrimbot_gateway_connected").set(if connected { 1.0 } else { 0.0 });
    }

    /// Render metrics in Prometheus format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl Default for BotMetrics {
    fn default() -> Self {
        Self::new()
    }
}
