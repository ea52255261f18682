use std::cell::Cell;
use std::rc::Rc;

use gloo_net::http::{Method, Request};
use gloo_timers::callback::Timeout;
use log::{info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::window;

use crate::browser::navigation;
use crate::browser::storage::LocalStorageStore;
use crate::browser::trackers::{self, GtagTracker, PixelTracker, ScriptState};
use crate::config::{FunnelConfig, GA_MEASUREMENT_ID};
use crate::telemetry::clock::{BrowserClock, Clock};
use crate::telemetry::dispatcher::Dispatcher;
use crate::telemetry::handle::Telemetry;
use crate::telemetry::storage::{EventStore, MemoryStore};
use crate::telemetry::tracker::{NoopTracker, Tracker};

/// Load the vendor scripts and build the app-wide dispatcher.
pub fn start_telemetry(config: &FunnelConfig) -> Telemetry {
    let clock: Rc<dyn Clock> = Rc::new(BrowserClock);

    let primary: Box<dyn Tracker> = if window().is_some() {
        trackers::install_gtag(GA_MEASUREMENT_ID);
        Box::new(GtagTracker)
    } else {
        Box::new(NoopTracker)
    };

    let store: Box<dyn EventStore> = if LocalStorageStore::is_supported() {
        Box::new(LocalStorageStore::new(config.fallback_events_key))
    } else {
        warn!("localStorage unavailable, fallback events live in memory only");
        Box::new(MemoryStore::default())
    };

    let mut dispatcher = Dispatcher::new(primary, store, clock.clone(), config.dispatcher());
    if config.pixel_fallback {
        trackers::set_pixel_id(config.pixel_id);
        let pixel_state = Rc::new(Cell::new(ScriptState::Loading));
        trackers::load_script(config.pixel_script_url, pixel_state.clone());
        dispatcher = dispatcher.with_secondary(Box::new(PixelTracker::new(pixel_state)));
    }

    info!("telemetry started");
    Telemetry::new(dispatcher, clock)
}

/// One-off console dump of the tracking setup, plus a reachability check of the pixel CDN.
pub fn schedule_status_monitor(telemetry: Telemetry, config: &FunnelConfig) {
    let pixel_id = config.pixel_id;
    let pixel_script_url = config.pixel_script_url;
    Timeout::new(config.status_monitor_delay_ms, move || {
        let status = telemetry.status();
        gloo_console::log!("=== tracking status ===");
        gloo_console::log!("Pixel ID:", pixel_id);
        gloo_console::log!("Primary tracker:", status.primary, status.primary_available);
        gloo_console::log!("Pixel available:", status.secondary_available);
        gloo_console::log!("Hostname:", navigation::hostname());
        gloo_console::log!("Queued events:", status.queued);
        if status.pending_fallback > 0 {
            gloo_console::log!("Pending fallback events:", status.pending_fallback);
        }

        wasm_bindgen_futures::spawn_local(async move {
            match Request::new(pixel_script_url).method(Method::HEAD).send().await {
                Ok(response) if response.ok() => info!("pixel CDN reachable"),
                Ok(response) => warn!("pixel CDN answered {}", response.status()),
                Err(e) => warn!("pixel CDN unreachable: {e}"),
            }
        });
    })
    .forget();
}

/// Run `callback` once the document has finished loading.
pub fn when_loaded(callback: impl FnOnce() + 'static) {
    if navigation::document_complete() {
        callback();
        return;
    }
    let Some(window) = window() else {
        return;
    };
    let closure = Closure::once_into_js(callback);
    if window
        .add_event_listener_with_callback("load", closure.unchecked_ref())
        .is_err()
    {
        warn!("could not wait for load event");
    }
}
