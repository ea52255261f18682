use crate::funnel::controller::ControllerTimings;
use crate::telemetry::dispatcher::DispatcherConfig;

pub const GA_MEASUREMENT_ID: &str = "G-KBSLRJ2FJF";
pub const PIXEL_ID: &str = "683e4507be02a8b1bece6041";
pub const PIXEL_SCRIPT_URL: &str = "https://cdn.utmify.com.br/scripts/pixel/pixel.js";
pub const PAYMENT_URL: &str = "https://pay.cakto.com.br/ko6ftx6_410912";

pub const CAMPAIGN_PREFIX: &str = "utm_";
pub const FALLBACK_EVENTS_KEY: &str = "utmfy_fallback_events";

/// Everything the funnel pages need to know that isn't markup.
#[derive(Clone, Debug, PartialEq)]
pub struct FunnelConfig {
    pub payment_url: &'static str,
    pub pixel_id: &'static str,
    pub pixel_script_url: &'static str,
    pub campaign_prefix: &'static str,
    pub fallback_events_key: &'static str,
    pub flush_debounce_ms: u32,
    pub retry_delay_ms: u32,
    pub max_retry_attempts: u32,
    pub status_monitor_delay_ms: u32,
    pub completion_delay_ms: u32,
    pub navigate_delay_ms: u32,
    pub error_clear_ms: u32,
    pub connectivity_debounce_ms: u32,
    pub home_urgency_interval_ms: u32,
    pub result_urgency_interval_ms: u32,
    pub result_urgency_cap: u32,
    /// Offer events GA couldn't take to the attribution pixel.
    pub pixel_fallback: bool,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            payment_url: PAYMENT_URL,
            pixel_id: PIXEL_ID,
            pixel_script_url: PIXEL_SCRIPT_URL,
            campaign_prefix: CAMPAIGN_PREFIX,
            fallback_events_key: FALLBACK_EVENTS_KEY,
            flush_debounce_ms: 200,
            retry_delay_ms: 10_000,
            max_retry_attempts: 3,
            status_monitor_delay_ms: 5_000,
            completion_delay_ms: 800,
            navigate_delay_ms: 100,
            error_clear_ms: 5_000,
            connectivity_debounce_ms: 500,
            home_urgency_interval_ms: 45_000,
            result_urgency_interval_ms: 30_000,
            result_urgency_cap: 17,
            pixel_fallback: true,
        }
    }
}

impl FunnelConfig {
    pub fn dispatcher(&self) -> DispatcherConfig {
        DispatcherConfig {
            flush_debounce_ms: f64::from(self.flush_debounce_ms),
            retry_delay_ms: f64::from(self.retry_delay_ms),
            max_retry_attempts: self.max_retry_attempts,
        }
    }

    pub fn controller(&self) -> ControllerTimings {
        ControllerTimings {
            completion_delay_ms: f64::from(self.completion_delay_ms),
            navigate_delay_ms: f64::from(self.navigate_delay_ms),
            error_clear_ms: f64::from(self.error_clear_ms),
            connectivity_debounce_ms: f64::from(self.connectivity_debounce_ms),
        }
    }
}

pub fn get_config() -> FunnelConfig {
    FunnelConfig::default()
}

#[cfg(debug_assertions)]
pub fn log_level() -> log::Level {
    log::Level::Debug // verbose while running under trunk serve
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> log::Level {
    log::Level::Info
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings_match_funnel_flow() {
        let config = FunnelConfig::default();
        let controller = config.controller();
        assert_eq!(controller.completion_delay_ms, 800.0);
        assert_eq!(controller.navigate_delay_ms, 100.0);

        let dispatcher = config.dispatcher();
        assert_eq!(dispatcher.retry_delay_ms, 10_000.0);
        assert_eq!(dispatcher.max_retry_attempts, 3);
    }

    #[test]
    fn test_fallback_key_is_shared_with_legacy_pages() {
        assert_eq!(get_config().fallback_events_key, "utmfy_fallback_events");
        assert_eq!(get_config().campaign_prefix, "utm_");
    }
}
