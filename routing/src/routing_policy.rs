use crate::record::Destination;

/// Metrics routed to the time-series sink when no policy is configured.
pub const DEFAULT_TIME_SERIES_METRICS: &[&str] = &["average-wind-speed", "overdrive-state-time"];

/// Named table of the turbine metrics that go to the time-series sink.
///
/// An alias is routed to the time-series sink when it ends with
/// `windfarms/<farm>/turbines/<turbine>/<metric>` and `<metric>` is in the table.
/// Every other alias goes to the batch sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingPolicy {
    time_series_metrics: Vec<String>,
}

impl RoutingPolicy {
    pub fn new<S: AsRef<str>>(time_series_metrics: &[S]) -> Self {
        Self {
            time_series_metrics: time_series_metrics
                .iter()
                .map(|metric| metric.as_ref().trim().to_owned())
                .filter(|metric| !metric.is_empty())
                .collect(),
        }
    }

    /// Parses a comma-separated metric list, e.g. `average-wind-speed,overdrive-state-time`.
    pub fn from_metric_list(metric_list: &str) -> Self {
        let metrics: Vec<&str> = metric_list.split(',').collect();
        Self::new(metrics.as_slice())
    }

    pub fn time_series_metrics(&self) -> &[String] {
        &self.time_series_metrics
    }

    /// Metric name of a turbine alias, `None` for any other alias shape.
    pub fn turbine_metric(alias: &str) -> Option<&str> {
        let segments: Vec<&str> = alias.split('/').collect();
        let [.., windfarms, farm, turbines, turbine, metric] = segments.as_slice() else {
            return None;
        };
        let well_formed = *windfarms == "windfarms"
            && *turbines == "turbines"
            && !farm.is_empty()
            && !turbine.is_empty()
            && !metric.is_empty();
        well_formed.then_some(*metric)
    }

    pub fn destination(&self, alias: &str) -> Destination {
        match Self::turbine_metric(alias) {
            Some(metric) if self.time_series_metrics.iter().any(|m| m == metric) => {
                Destination::TimeSeries
            }
            _ => Destination::Batch,
        }
    }
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_SERIES_METRICS)
    }
}
