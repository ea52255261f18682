use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{window, PerformanceNavigationTiming};

use crate::error::FunnelError;

pub fn current_search() -> String {
    window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

pub fn hostname() -> String {
    window()
        .and_then(|w| w.location().hostname().ok())
        .unwrap_or_default()
}

/// `<link rel="prefetch">` for the page we're about to open.
pub fn add_prefetch_hint(href: &str) {
    let Some(document) = window().and_then(|w| w.document()) else {
        return;
    };
    let Some(head) = document.head() else {
        return;
    };
    match document.create_element("link") {
        Ok(link) => {
            let _ = link.set_attribute("rel", "prefetch");
            let _ = link.set_attribute("href", href);
            if head.append_child(&link).is_err() {
                warn!("could not add prefetch hint for {href}");
            }
        }
        Err(_) => warn!("could not create prefetch link"),
    }
}

/// Payment page in a new browsing context. Nothing comes back from it.
pub fn open_in_new_tab(url: &str) -> Result<(), FunnelError> {
    let window = window().ok_or_else(|| FunnelError::Navigation("no window".to_string()))?;
    match window.open_with_url_and_target(url, "_blank") {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(FunnelError::Navigation(format!("popup blocked for {url}"))),
        Err(e) => Err(FunnelError::Navigation(format!("{:?}", e))),
    }
}

pub fn document_complete() -> bool {
    window()
        .and_then(|w| w.document())
        .map(|d| d.ready_state() == "complete")
        .unwrap_or(false)
}

#[derive(Clone, Debug, PartialEq)]
pub struct NavigationTiming {
    pub dom_content_loaded_ms: f64,
    pub load_time_ms: f64,
}

/// Navigation timing of the current document, once the load event has finished.
pub fn navigation_timing() -> Option<NavigationTiming> {
    let performance = window()?.performance()?;
    let entries = performance.get_entries_by_type("navigation");
    let timing = entries
        .get(0)
        .dyn_into::<PerformanceNavigationTiming>()
        .ok()?;
    if timing.load_event_end() <= 0.0 {
        debug!("navigation timing not final yet");
        return None;
    }
    Some(NavigationTiming {
        dom_content_loaded_ms: (timing.dom_content_loaded_event_end()
            - timing.dom_content_loaded_event_start())
        .round(),
        load_time_ms: (timing.load_event_end() - timing.fetch_start()).round(),
    })
}
