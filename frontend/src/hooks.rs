use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use log::{debug, warn};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::browser::{device, navigation};
use crate::config::get_config;
use crate::error::FunnelError;
use crate::funnel::campaign::CampaignParameters;
use crate::funnel::controller::{Effect, InteractionController, StartRequest, UiState};
use crate::funnel::device::DeviceClass;
use crate::telemetry::clock::{BrowserClock, Clock};
use crate::telemetry::handle::Telemetry;
use crate::Route;

#[derive(Clone, PartialEq)]
pub struct InteractionHandle {
    pub ui: UiState,
    pub can_start: bool,
    /// `can_start` read from the live controller, for handlers that may fire
    /// twice before the next render.
    pub can_start_now: Callback<(), bool>,
    pub start: Callback<StartRequest>,
    pub dismiss_error: Callback<()>,
}

fn now() -> f64 {
    BrowserClock.now_ms()
}

/// Router route for a controller target. Paths the router doesn't know are
/// rejected rather than sent to the not-found page.
pub(crate) fn resolve_route(path: &str) -> Result<Route, FunnelError> {
    match Route::recognize(path) {
        Some(Route::NotFound) | None => Err(FunnelError::InvalidTarget(path.to_string())),
        Some(route) => Ok(route),
    }
}

fn run_effects(
    effects: Vec<Effect>,
    controller: &Rc<RefCell<InteractionController>>,
    telemetry: &Option<Telemetry>,
    navigator: &Option<Navigator>,
) {
    for effect in effects {
        match effect {
            Effect::Track(event) => match telemetry {
                Some(telemetry) => telemetry.track(event),
                None => warn!("no telemetry context, dropping {}", event.name),
            },
            Effect::Prefetch(url) => navigation::add_prefetch_hint(&url),
            Effect::Navigate(target) => {
                let result = match (resolve_route(&target.path), navigator) {
                    (Err(e), _) => Err(e),
                    (Ok(route), Some(navigator)) if target.campaign.is_empty() => {
                        navigator.push(&route);
                        Ok(())
                    }
                    (Ok(route), Some(navigator)) => navigator
                        .push_with_query(&route, &target.campaign)
                        .map_err(|e| FunnelError::Navigation(format!("{:?}", e))),
                    (Ok(_), None) => web_sys::window()
                        .ok_or_else(|| FunnelError::Navigation("no window".to_string()))
                        .and_then(|w| {
                            w.location()
                                .set_href(&target.url())
                                .map_err(|e| FunnelError::Navigation(format!("{:?}", e)))
                        }),
                };
                if let Err(e) = result {
                    let mut controller = controller.borrow_mut();
                    controller.fail(e, now());
                    debug!("navigation aborted, controller {:?}", controller.phase());
                }
            }
        }
    }
}

/// Mounts an [`InteractionController`] for the calling page and keeps it
/// ticking until the page unmounts.
#[hook]
pub fn use_interaction() -> InteractionHandle {
    let telemetry = use_context::<Telemetry>();
    let navigator = use_navigator();
    let controller = use_mut_ref(|| {
        let config = get_config();
        let class = DeviceClass::classify(&device::read_signals());
        let campaign =
            CampaignParameters::from_query(&navigation::current_search(), config.campaign_prefix);
        if let Some(source) = campaign.get("utm_source") {
            debug!("visitor arrived from {source}");
        }
        let mut controller = InteractionController::new(class, campaign, config.controller());
        controller.set_online_now(device::is_online());
        controller
    });
    let ui = use_state(|| controller.borrow().ui().clone());

    {
        let controller = controller.clone();
        let ui = ui.clone();
        let telemetry = telemetry.clone();
        let navigator = navigator.clone();
        use_effect_with_deps(
            move |_| {
                controller.borrow_mut().mark_loaded();
                ui.set(controller.borrow().ui().clone());

                let watcher = {
                    let controller = controller.clone();
                    device::ConnectivityWatcher::attach(move |online| {
                        controller.borrow_mut().observe_connectivity(online, now());
                    })
                };

                let cadence = controller.borrow().profile().frame_interval_ms as u32;
                let interval = Interval::new(cadence, move || {
                    if !controller.borrow().needs_ticks() {
                        return;
                    }
                    let before = controller.borrow().ui().clone();
                    let effects = controller.borrow_mut().tick(now());
                    run_effects(effects, &controller, &telemetry, &navigator);
                    let after = controller.borrow().ui().clone();
                    if after != before {
                        ui.set(after);
                    }
                });

                move || {
                    drop(interval);
                    drop(watcher);
                }
            },
            (),
        );
    }

    let start = {
        let controller = controller.clone();
        let ui = ui.clone();
        let telemetry = telemetry.clone();
        let navigator = navigator.clone();
        Callback::from(move |request: StartRequest| {
            let effects = controller.borrow_mut().start(request, now());
            run_effects(effects, &controller, &telemetry, &navigator);
            ui.set(controller.borrow().ui().clone());
        })
    };

    let can_start_now = {
        let controller = controller.clone();
        Callback::from(move |_| controller.borrow().can_start())
    };

    let dismiss_error = {
        let controller = controller.clone();
        let ui = ui.clone();
        Callback::from(move |_| {
            controller.borrow_mut().dismiss_error();
            ui.set(controller.borrow().ui().clone());
        })
    };

    let can_start = controller.borrow().can_start();
    InteractionHandle {
        ui: (*ui).clone(),
        can_start,
        can_start_now,
        start,
        dismiss_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funnel_paths_resolve_to_routes() {
        assert_eq!(resolve_route("/"), Ok(Route::Home));
        assert_eq!(resolve_route("/quiz/3"), Ok(Route::Quiz { step: 3 }));
        assert_eq!(resolve_route("/resultado"), Ok(Route::Result));
    }

    #[test]
    fn test_unknown_paths_are_invalid_targets() {
        for path in ["/checkout", "/quiz/abc", "/quiz/300"] {
            assert_eq!(
                resolve_route(path),
                Err(FunnelError::InvalidTarget(path.to_string()))
            );
        }
    }
}
