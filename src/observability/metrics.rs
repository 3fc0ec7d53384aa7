use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub rides_requested_total: IntCounter,
    pub accept_attempts_total: IntCounterVec,
    pub ride_transitions_total: IntCounterVec,
    pub payments_total: IntCounterVec,
    pub open_requests: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let rides_requested_total = IntCounter::new(
            "rides_requested_total",
            "Total ride requests created",
        )
        .expect("valid rides_requested_total metric");

        let accept_attempts_total = IntCounterVec::new(
            Opts::new("accept_attempts_total", "Accept attempts by outcome"),
            &["outcome"],
        )
        .expect("valid accept_attempts_total metric");

        let ride_transitions_total = IntCounterVec::new(
            Opts::new("ride_transitions_total", "Lifecycle transitions by kind"),
            &["transition"],
        )
        .expect("valid ride_transitions_total metric");

        let payments_total = IntCounterVec::new(
            Opts::new("payments_total", "Payments processed by outcome"),
            &["outcome"],
        )
        .expect("valid payments_total metric");

        let open_requests = IntGauge::new(
            "open_requests",
            "Current number of unassigned open ride requests",
        )
        .expect("valid open_requests metric");

        registry
            .register(Box::new(rides_requested_total.clone()))
            .expect("register rides_requested_total");
        registry
            .register(Box::new(accept_attempts_total.clone()))
            .expect("register accept_attempts_total");
        registry
            .register(Box::new(ride_transitions_total.clone()))
            .expect("register ride_transitions_total");
        registry
            .register(Box::new(payments_total.clone()))
            .expect("register payments_total");
        registry
            .register(Box::new(open_requests.clone()))
            .expect("register open_requests");

        Self {
            registry,
            rides_requested_total,
            accept_attempts_total,
            ride_transitions_total,
            payments_total,
            open_requests,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
