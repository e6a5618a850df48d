mod history_gateway;
mod log_gateway;
mod statsd_gateway;

pub use history_gateway::{HistoryEntry, HistoryGateway, HistoryLog};
pub use log_gateway::LogGateway;
pub use statsd_gateway::StatsdGateway;

use const_format::concatcp;
use dipstick::*;

const METRIC_PREFIX: &str = "painter.";
const GENERATION_METRIC: &str = concatcp!(METRIC_PREFIX, "generation");
const FITNESS_METRIC: &str = concatcp!(METRIC_PREFIX, "best-fitness");

metrics! {
    PAINTER_PROXY: Proxy = "Painter_Proxy" => {
        GENERATION: Gauge = GENERATION_METRIC;
        FITNESS: Gauge = FITNESS_METRIC;
    }
}
