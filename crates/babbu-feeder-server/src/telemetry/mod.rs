// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::Mutex;

pub const METRIC_SUBSYSTEM: &str = "babbu_feeder";

#[derive(Debug, Default)]
struct RouteStats {
    count: u64,
    latency_ns_total: u128,
}

/// Per-route/status request counters with a text exposition. Small on
/// purpose: one gauge of truth for "did the scheduler actually hit us".
#[derive(Debug, Default)]
pub struct RequestMetrics {
    by_route_status: Mutex<BTreeMap<(String, u16), RouteStats>>,
}

impl RequestMetrics {
    pub async fn observe_request(&self, route: &str, status: StatusCode, latency: Duration) {
        let mut map = self.by_route_status.lock().await;
        let stats = map.entry((route.to_string(), status.as_u16())).or_default();
        stats.count += 1;
        stats.latency_ns_total += latency.as_nanos();
    }

    /// Prometheus-style exposition of the counters.
    pub async fn render(&self) -> String {
        let map = self.by_route_status.lock().await;
        let mut body = String::new();
        body.push_str(&format!(
            "# TYPE {METRIC_SUBSYSTEM}_http_requests_total counter\n"
        ));
        for ((route, status), stats) in map.iter() {
            body.push_str(&format!(
                "{METRIC_SUBSYSTEM}_http_requests_total{{route=\"{route}\",status=\"{status}\"}} {}\n",
                stats.count
            ));
        }
        body.push_str(&format!(
            "# TYPE {METRIC_SUBSYSTEM}_http_request_seconds_total counter\n"
        ));
        for ((route, status), stats) in map.iter() {
            let seconds = stats.latency_ns_total as f64 / 1_000_000_000.0;
            body.push_str(&format!(
                "{METRIC_SUBSYSTEM}_http_request_seconds_total{{route=\"{route}\",status=\"{status}\"}} {seconds:.9}\n",
            ));
        }
        body
    }
}
