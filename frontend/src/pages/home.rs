use gloo_timers::callback::Timeout;
use web_sys::js_sys::Math;
use yew::prelude::*;
use yew_hooks::prelude::*;

use crate::browser::bootstrap::when_loaded;
use crate::browser::{device, navigation};
use crate::components::banners::StatusLayer;
use crate::config::get_config;
use crate::funnel::controller::StartRequest;
use crate::funnel::device::device_type;
use crate::funnel::quiz::question_path;
use crate::funnel::urgency::SimulatedCounter;
use crate::hooks::use_interaction;
use crate::telemetry::event::TrackedEvent;
use crate::telemetry::handle::Telemetry;

const HERO_IMAGE: &str = "https://comprarplanseguro.shop/wp-content/uploads/2025/06/Nova-Imagem-Plan-A-Livro.png";
const STORY_IMAGE: &str = "https://comprarplanseguro.shop/wp-content/uploads/2025/06/02-IMAGE-INICIAL-NOVA.png";

#[function_component(Home)]
pub fn home() -> Html {
    let config = get_config();
    let telemetry = use_context::<Telemetry>();
    let interaction = use_interaction();
    let urgency = use_state(SimulatedCounter::home);

    // view + load metrics, once
    {
        let telemetry = telemetry.clone();
        use_effect_with_deps(
            move |_| {
                if let Some(telemetry) = telemetry {
                    let kind = device_type(device::viewport_width());
                    telemetry.track(
                        TrackedEvent::new("visualizo_pagina_inicial").with("device_type", kind),
                    );
                    // loadEventEnd is only set after the load handlers return
                    when_loaded(move || {
                        Timeout::new(0, move || {
                            if let Some(timing) = navigation::navigation_timing() {
                                telemetry.track(
                                    TrackedEvent::new("metricas_rendimiento")
                                        .with("domContentLoaded", timing.dom_content_loaded_ms)
                                        .with("loadTime", timing.load_time_ms)
                                        .with("deviceType", kind),
                                );
                            }
                        })
                        .forget();
                    });
                }
                || ()
            },
            (),
        );
    }

    // warm up the first two questions
    use_effect_with_deps(
        move |_| {
            let timeout = Timeout::new(2_000, || {
                for step in [1, 2] {
                    navigation::add_prefetch_hint(&question_path(step));
                }
            });
            move || drop(timeout)
        },
        (),
    );

    {
        let urgency = urgency.clone();
        use_interval(
            move || {
                let mut next = *urgency;
                next.bump(Math::random());
                urgency.set(next);
            },
            config.home_urgency_interval_ms,
        );
    }

    let on_start = {
        let start = interaction.start.clone();
        Callback::from(move |_: MouseEvent| {
            start.emit(StartRequest {
                target_path: question_path(1),
                event: TrackedEvent::new("inicio_quiz")
                    .with("device_type", device_type(device::viewport_width())),
                message: "Preparando tu test personalizado...".to_string(),
            });
        })
    };

    let ui = &interaction.ui;
    let disabled = ui.is_loading || !interaction.can_start;

    html! {
        <div class="funnel-home">
            <style>
                {r#"
                    .funnel-home {
                        min-height: 100vh;
                        background: linear-gradient(135deg, #000 0%, #111827 50%, #0f172a 100%);
                        display: flex;
                        align-items: center;
                        justify-content: center;
                        padding: 1rem;
                    }
                    .home-card {
                        max-width: 48rem;
                        width: 100%;
                        text-align: center;
                        background: linear-gradient(135deg, rgba(17, 24, 39, 0.95), rgba(0, 0, 0, 0.95));
                        border: 2px solid rgba(249, 115, 22, 0.3);
                        border-radius: 1rem;
                        padding: 2rem;
                        color: #fff;
                    }
                    .home-logo {
                        width: 112px;
                        height: 112px;
                        margin: 0 auto 1.5rem;
                        border-radius: 50%;
                        overflow: hidden;
                        border: 4px solid #f97316;
                    }
                    .home-logo img {
                        width: 100%;
                        height: 100%;
                        object-fit: cover;
                    }
                    .home-title {
                        font-size: 1.75rem;
                        font-weight: 700;
                        line-height: 1.25;
                        margin-bottom: 1.5rem;
                        min-height: 3.5rem;
                    }
                    .home-title .accent {
                        color: #ef4444;
                    }
                    .home-subtitle {
                        color: #22c55e;
                        font-weight: 700;
                        font-size: 1.25rem;
                        margin-bottom: 1.5rem;
                    }
                    .home-story {
                        width: 100%;
                        height: auto;
                        border-radius: 0.5rem;
                        margin-bottom: 2rem;
                        aspect-ratio: 600 / 400;
                    }
                    .home-cta {
                        background: linear-gradient(90deg, #22c55e, #16a34a);
                        color: #fff;
                        font-weight: 700;
                        font-size: 1.125rem;
                        padding: 1.25rem 2rem;
                        border: none;
                        border-radius: 9999px;
                        min-height: 3.5rem;
                        cursor: pointer;
                    }
                    .home-cta:disabled {
                        opacity: 0.7;
                        cursor: not-allowed;
                    }
                    .home-urgency {
                        margin-top: 1rem;
                        color: #fb923c;
                        font-size: 0.9rem;
                    }
                    .home-privacy {
                        margin-top: 1rem;
                        color: #9ca3af;
                        font-size: 0.75rem;
                    }
                    @media (max-width: 640px) {
                        .home-card { padding: 1rem; }
                        .home-title { font-size: 1.25rem; }
                    }
                "#}
            </style>
            <StatusLayer ui={ui.clone()} on_dismiss={interaction.dismiss_error.clone()} />
            <div class="home-card">
                <div class="home-logo">
                    <img src={HERO_IMAGE} alt="Logo Plan A" width="112" height="112" />
                </div>
                <h1 class="home-title">
                    {"Conoce el "}<span class="accent">{"Truco de 3 pasos"}</span>{" que está funcionando"}
                    <br />
                    <span class="accent">{"hace que las mujeres regresen incluso después de una traición"}</span>
                </h1>
                <p>{"✓ Funciona con cualquier mujer..."}</p>
                <p>{"sin mensajes largos, desaparecer ni jugar juegos."}</p>
                <h2 class="home-subtitle">{"✅ ¿Y lo mejor? Es el mismo que usaron grandes celebridades."}</h2>
                <img class="home-story" src={STORY_IMAGE} alt="Imagen de ejemplo" loading="lazy" width="600" height="400" />
                <button class="home-cta" onclick={on_start} {disabled} aria-label="Iniciar test">
                    {
                        if ui.is_loading {
                            "PREPARANDO..."
                        } else {
                            "QUIERO DESCUBRIR EL TRUCO →"
                        }
                    }
                </button>
                <div class="home-urgency">
                    {format!("🔥 {} personas hicieron el test hoy", urgency.value())}
                </div>
                <div class="home-privacy">
                    {"🔒 Tus respuestas son confidenciales y están protegidas"}
                </div>
            </div>
        </div>
    }
}
