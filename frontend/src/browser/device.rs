use log::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Reflect;
use web_sys::{window, Window};

use crate::funnel::device::DeviceSignals;

const FALLBACK_VIEWPORT_WIDTH: f64 = 1024.0;

pub fn viewport_width() -> f64 {
    window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|width| width.as_f64())
        .unwrap_or(FALLBACK_VIEWPORT_WIDTH)
}

pub fn read_signals() -> DeviceSignals {
    let Some(window) = window() else {
        return DeviceSignals {
            hardware_concurrency: None,
            device_memory_gb: None,
            viewport_width: FALLBACK_VIEWPORT_WIDTH,
        };
    };
    let navigator = window.navigator();
    let cores = navigator.hardware_concurrency();
    // not in web-sys: Chromium-only property
    let memory = Reflect::get(&navigator, &JsValue::from_str("deviceMemory"))
        .ok()
        .and_then(|value| value.as_f64());

    let signals = DeviceSignals {
        hardware_concurrency: (cores > 0.0).then_some(cores),
        device_memory_gb: memory,
        viewport_width: viewport_width(),
    };
    debug!("device signals: {:?}", signals);
    signals
}

pub fn is_online() -> bool {
    window().map(|w| w.navigator().on_line()).unwrap_or(true)
}

/// Keeps `online`/`offline` listeners on the window until dropped.
pub struct ConnectivityWatcher {
    window: Window,
    callback: Closure<dyn Fn()>,
}

impl ConnectivityWatcher {
    pub fn attach(on_change: impl Fn(bool) + 'static) -> Option<Self> {
        let window = window()?;
        let callback = Closure::<dyn Fn()>::new(move || on_change(is_online()));
        for event in ["online", "offline"] {
            window
                .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
                .ok()?;
        }
        Some(Self { window, callback })
    }
}

impl Drop for ConnectivityWatcher {
    fn drop(&mut self) {
        for event in ["online", "offline"] {
            let _ = self
                .window
                .remove_event_listener_with_callback(event, self.callback.as_ref().unchecked_ref());
        }
    }
}
