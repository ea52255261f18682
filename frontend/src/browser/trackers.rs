use std::cell::Cell;
use std::rc::Rc;

use log::{error, info, warn};
use serde::Serialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::{Function, Reflect};
use web_sys::window;

use crate::error::TrackError;
use crate::telemetry::event::Properties;
use crate::telemetry::tracker::Tracker;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptState {
    Loading,
    Ready,
    Failed,
}

fn global(name: &str) -> Option<JsValue> {
    let window = window()?;
    Reflect::get(&window, &JsValue::from_str(name))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

fn js_error_text(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

fn to_js(properties: &Properties) -> Result<JsValue, TrackError> {
    // plain objects, not Maps: gtag ignores Map entries
    properties
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| TrackError::Encode(e.to_string()))
}

/// `window.gtag("event", name, properties)`.
pub struct GtagTracker;

impl GtagTracker {
    fn function() -> Option<Function> {
        global("gtag")?.dyn_into::<Function>().ok()
    }
}

impl Tracker for GtagTracker {
    fn is_available(&self) -> bool {
        Self::function().is_some()
    }

    fn track(&self, name: &str, properties: &Properties) -> Result<(), TrackError> {
        let gtag = Self::function()
            .ok_or_else(|| TrackError::Unavailable("window.gtag is undefined".to_string()))?;
        let payload = to_js(properties)?;
        gtag.call3(
            &JsValue::NULL,
            &JsValue::from_str("event"),
            &JsValue::from_str(name),
            &payload,
        )
        .map(|_| ())
        .map_err(|e| TrackError::Rejected(js_error_text(&e)))
    }

    fn describe(&self) -> &'static str {
        "gtag"
    }
}

/// `window.utmify.track(name, properties)` for the attribution pixel.
///
/// Once the pixel script has failed to load this turns into an inert mock
/// that only logs, so callers never need to check for the global.
pub struct PixelTracker {
    state: Rc<Cell<ScriptState>>,
}

impl PixelTracker {
    pub fn new(state: Rc<Cell<ScriptState>>) -> Self {
        Self { state }
    }

    fn target() -> Option<(JsValue, Function)> {
        let utmify = global("utmify")?;
        let track = Reflect::get(&utmify, &JsValue::from_str("track"))
            .ok()?
            .dyn_into::<Function>()
            .ok()?;
        Some((utmify, track))
    }
}

impl Tracker for PixelTracker {
    fn is_available(&self) -> bool {
        self.state.get() == ScriptState::Failed || Self::target().is_some()
    }

    fn track(&self, name: &str, properties: &Properties) -> Result<(), TrackError> {
        if self.state.get() == ScriptState::Failed {
            info!("pixel mock: {name} {properties:?}");
            return Ok(());
        }
        let (utmify, track) = Self::target()
            .ok_or_else(|| TrackError::Unavailable("window.utmify is undefined".to_string()))?;
        let payload = to_js(properties)?;
        track
            .call2(&utmify, &JsValue::from_str(name), &payload)
            .map(|_| ())
            .map_err(|e| TrackError::Rejected(js_error_text(&e)))
    }

    fn describe(&self) -> &'static str {
        "utmify"
    }
}

/// Append an async `<script>` to `<head>` and report how it went through `state`.
pub fn load_script(src: &str, state: Rc<Cell<ScriptState>>) {
    let Some(document) = window().and_then(|w| w.document()) else {
        warn!("no document, not loading {src}");
        state.set(ScriptState::Failed);
        return;
    };
    let Some(head) = document.head() else {
        state.set(ScriptState::Failed);
        return;
    };
    let script = match document.create_element("script") {
        Ok(element) => element,
        Err(e) => {
            error!("could not create script element: {}", js_error_text(&e));
            state.set(ScriptState::Failed);
            return;
        }
    };
    let _ = script.set_attribute("async", "");
    let _ = script.set_attribute("defer", "");
    let _ = script.set_attribute("src", src);

    state.set(ScriptState::Loading);
    let on_load = {
        let state = state.clone();
        let src = src.to_string();
        Closure::<dyn FnMut()>::new(move || {
            info!("script loaded: {src}");
            state.set(ScriptState::Ready);
        })
    };
    let on_error = {
        let state = state.clone();
        let src = src.to_string();
        Closure::<dyn FnMut()>::new(move || {
            error!("script failed to load: {src}");
            state.set(ScriptState::Failed);
        })
    };
    let _ = script.add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref());
    let _ = script.add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref());
    on_load.forget();
    on_error.forget();

    if let Err(e) = head.append_child(&script) {
        error!("could not append script {src}: {}", js_error_text(&e));
        state.set(ScriptState::Failed);
    }
}

/// Define the `dataLayer`/`gtag` pair and pull in the GA loader.
pub fn install_gtag(measurement_id: &str) {
    let bootstrap = Function::new_no_args(
        "window.dataLayer = window.dataLayer || [];\
         window.gtag = window.gtag || function(){ window.dataLayer.push(arguments); };",
    );
    if let Err(e) = bootstrap.call0(&JsValue::NULL) {
        error!("gtag bootstrap failed: {}", js_error_text(&e));
        return;
    }
    if let Some(gtag) = GtagTracker::function() {
        let _ = gtag.call2(
            &JsValue::NULL,
            &JsValue::from_str("js"),
            &web_sys::js_sys::Date::new_0(),
        );
        let _ = gtag.call2(
            &JsValue::NULL,
            &JsValue::from_str("config"),
            &JsValue::from_str(measurement_id),
        );
    }
    let state = Rc::new(Cell::new(ScriptState::Loading));
    load_script(
        &format!("https://www.googletagmanager.com/gtag/js?id={measurement_id}"),
        state,
    );
}

/// Expose the pixel id where the pixel script looks for it.
pub fn set_pixel_id(pixel_id: &str) {
    if let Some(window) = window() {
        let _ = Reflect::set(
            &window,
            &JsValue::from_str("pixelId"),
            &JsValue::from_str(pixel_id),
        );
    }
}
