use yew::prelude::*;
use yew_router::prelude::*;
use log::{info, warn};

mod config;
mod error;
mod hooks;
mod telemetry {
    pub mod event;
    pub mod clock;
    pub mod tracker;
    pub mod storage;
    pub mod dispatcher;
    pub mod handle;
}
mod funnel {
    pub mod campaign;
    pub mod device;
    pub mod controller;
    pub mod quiz;
    pub mod urgency;
}
mod browser {
    pub mod trackers;
    pub mod storage;
    pub mod device;
    pub mod navigation;
    pub mod bootstrap;
}
mod components {
    pub mod loading_overlay;
    pub mod banners;
}
mod pages {
    pub mod home;
    pub mod quiz;
    pub mod result;
}

use browser::bootstrap::{schedule_status_monitor, start_telemetry};
use config::get_config;
use pages::{
    home::Home,
    quiz::QuizPage,
    result::ResultPage,
};
use telemetry::handle::Telemetry;


#[derive(Clone, Debug, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/quiz/:step")]
    Quiz { step: u8 },
    #[at("/resultado")]
    Result,
    #[not_found]
    #[at("/404")]
    NotFound,
}


fn switch(routes: Route) -> Html {
    match routes {
        Route::Home => {
            info!("Rendering Home page");
            html! { <Home /> }
        },
        Route::Quiz { step } => {
            info!("Rendering Quiz step {}", step);
            // keyed so every step mounts its own controller
            html! { <QuizPage key={step.to_string()} {step} /> }
        },
        Route::Result => {
            info!("Rendering Result page");
            html! { <ResultPage /> }
        },
        Route::NotFound => {
            warn!("Unknown route, sending visitor home");
            html! { <Redirect<Route> to={Route::Home} /> }
        },
    }
}


#[function_component]
fn App() -> Html {
    let telemetry = use_state(|| start_telemetry(&get_config()));

    {
        let telemetry = (*telemetry).clone();
        use_effect_with_deps(move |_| {
            schedule_status_monitor(telemetry, &get_config());
            || ()
        }, ());
    }

    html! {
        <ContextProvider<Telemetry> context={(*telemetry).clone()}>
            <BrowserRouter>
                <Switch<Route> render={switch} />
            </BrowserRouter>
        </ContextProvider<Telemetry>>
    }
}


fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(config::log_level()) {
        gloo_console::error!(format!("error initializing log: {e}"));
    }

    info!("Starting funnel");
    yew::Renderer::<App>::new().render();
}
