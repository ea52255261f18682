use gloo_timers::callback::Timeout;
use log::{info, warn};
use wasm_bindgen::JsCast;
use web_sys::js_sys::Math;
use web_sys::{window, HtmlElement};
use yew::prelude::*;
use yew_hooks::prelude::*;

use crate::browser::{device, navigation, storage};
use crate::components::banners::StatusLayer;
use crate::config::get_config;
use crate::funnel::device::device_type;
use crate::funnel::quiz::QuizAnswers;
use crate::funnel::urgency::SimulatedCounter;
use crate::hooks::use_interaction;
use crate::telemetry::event::TrackedEvent;
use crate::telemetry::handle::Telemetry;

const OFFER_SECTION_ID: &str = "oferta";
const PRODUCT_IMAGE: &str = "https://comprarplanseguro.shop/wp-content/uploads/2025/06/Nova-Imagem-Plan-A-Livro.png";
const OFFER_PRICE: &str = "$9,90";

fn scroll_to_offer() {
    let section = window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(OFFER_SECTION_ID));
    match section {
        Some(section) => section.scroll_into_view(),
        None => warn!("offer section not mounted"),
    }
}

/// Checkout in a new tab, or in this one when the popup gets blocked.
fn open_checkout(url: &str) {
    if let Err(e) = navigation::open_in_new_tab(url) {
        warn!("{e}, opening checkout in place");
        if let Some(w) = window() {
            if w.location().set_href(url).is_err() {
                warn!("could not open checkout at {url}");
            }
        }
    }
}

#[function_component(ResultPage)]
pub fn result_page() -> Html {
    let config = get_config();
    let telemetry = use_context::<Telemetry>();
    let interaction = use_interaction();
    let answers = use_memo(|_| QuizAnswers::load(storage::get_item), ());
    let revealed = use_state(|| false);
    let buyers = use_state(|| SimulatedCounter::recent_buyers(config.result_urgency_cap));

    {
        let telemetry = telemetry.clone();
        let answers = answers.clone();
        let revealed = revealed.clone();
        use_effect_with_deps(
            move |_| {
                if let Some(telemetry) = telemetry {
                    telemetry.track(
                        TrackedEvent::new("visualizou_resultado")
                            .with("genero", answers.gender.as_answer())
                            .with("bonus_desbloqueados", answers.unlocked_bonuses.len() as u32)
                            .with("valor_total", answers.total_value)
                            .with("device_type", device_type(device::viewport_width())),
                    );
                }
                let timeout = Timeout::new(300, move || revealed.set(true));
                move || drop(timeout)
            },
            (),
        );
    }

    {
        let buyers = buyers.clone();
        use_interval(
            move || {
                let mut next = *buyers;
                next.bump(Math::random());
                buyers.set(next);
            },
            config.result_urgency_interval_ms,
        );
    }

    let buy = {
        let telemetry = telemetry.clone();
        let payment_url = config.payment_url;
        move |position: &'static str| {
            let telemetry = telemetry.clone();
            Callback::from(move |_: MouseEvent| {
                info!("checkout from {position}");
                if let Some(telemetry) = &telemetry {
                    telemetry.track(TrackedEvent::new("clicou_comprar").with("posicao", position));
                }
                open_checkout(payment_url);
            })
        }
    };

    let on_scroll = Callback::from(|e: MouseEvent| {
        if let Some(target) = e.target().and_then(|t| t.dyn_into::<HtmlElement>().ok()) {
            let _ = target.blur();
        }
        scroll_to_offer();
    });

    let gender = answers.gender;
    let bonuses = answers.bonuses();
    let ui = &interaction.ui;

    html! {
        <div class={classes!("result-page", (*revealed).then_some("revealed"))}>
            <style>
                {r#"
                    .result-page {
                        min-height: 100vh;
                        background: linear-gradient(135deg, #000 0%, #111827 50%, #0f172a 100%);
                        color: #fff;
                        padding: 2rem 1rem;
                        opacity: 0;
                        transition: opacity 0.4s ease;
                    }
                    .result-page.revealed {
                        opacity: 1;
                    }
                    .result-inner {
                        max-width: 48rem;
                        margin: 0 auto;
                        text-align: center;
                    }
                    .result-title {
                        font-size: 2rem;
                        font-weight: 800;
                        color: #f97316;
                        margin-bottom: 1rem;
                    }
                    .result-lead {
                        font-size: 1.1rem;
                        color: #d1d5db;
                        margin-bottom: 2rem;
                    }
                    .result-cta {
                        background: linear-gradient(90deg, #22c55e, #16a34a);
                        color: #fff;
                        font-weight: 700;
                        font-size: 1.125rem;
                        padding: 1.25rem 2rem;
                        border: none;
                        border-radius: 9999px;
                        cursor: pointer;
                        margin: 1rem 0;
                    }
                    .result-secondary {
                        background: none;
                        border: 1px solid #f97316;
                        color: #f97316;
                        padding: 0.75rem 1.5rem;
                        border-radius: 9999px;
                        cursor: pointer;
                    }
                    .result-bonuses {
                        text-align: left;
                        background: rgba(17, 24, 39, 0.95);
                        border: 2px solid rgba(249, 115, 22, 0.3);
                        border-radius: 1rem;
                        padding: 1.5rem;
                        margin: 2rem 0;
                    }
                    .result-bonus {
                        display: flex;
                        justify-content: space-between;
                        padding: 0.5rem 0;
                        border-bottom: 1px solid #374151;
                    }
                    .result-bonus .value {
                        color: #9ca3af;
                        text-decoration: line-through;
                    }
                    .result-total {
                        margin-top: 1rem;
                        font-weight: 700;
                        color: #22c55e;
                    }
                    .result-offer img {
                        max-width: 280px;
                        width: 100%;
                        height: auto;
                        margin: 1rem auto;
                    }
                    .result-price {
                        font-size: 2.5rem;
                        font-weight: 800;
                        color: #22c55e;
                    }
                    .result-urgency {
                        color: #fb923c;
                        margin-top: 1rem;
                    }
                "#}
            </style>
            <StatusLayer ui={ui.clone()} on_dismiss={interaction.dismiss_error.clone()} />
            <div class="result-inner">
                <h1 class="result-title">{gender.title()}</h1>
                <p class="result-lead">
                    {format!(
                        "Según tus respuestas, todavía hay una oportunidad real de que {} vuelva a buscarte.",
                        gender.partner_pronoun()
                    )}
                </p>
                <button class="result-cta" onclick={buy("top")}>{gender.call_to_action()}</button>
                <div>
                    <button class="result-secondary" onclick={on_scroll}>{"Ver la oferta completa ↓"}</button>
                </div>

                <div class="result-bonuses">
                    <h3>{"🎁 Bonos que desbloqueaste"}</h3>
                    {
                        if bonuses.is_empty() {
                            html! { <p>{"Responde el test para desbloquear tus bonos."}</p> }
                        } else {
                            bonuses.iter().map(|bonus| html! {
                                <div class="result-bonus" key={bonus.id.to_string()}>
                                    <span>{bonus.title}</span>
                                    <span class="value">{format!("${}", bonus.value)}</span>
                                </div>
                            }).collect::<Html>()
                        }
                    }
                    <div class="result-total">
                        {format!("Valor total: ${} · Hoy: GRATIS con el Plan A", answers.total_value)}
                    </div>
                </div>

                <section class="result-offer" id={OFFER_SECTION_ID}>
                    <img src={PRODUCT_IMAGE} alt="Plan A" loading="lazy" width="280" height="280" />
                    <div class="result-price">{OFFER_PRICE}</div>
                    <button class="result-cta" onclick={buy("offer")}>{gender.call_to_action()}</button>
                    <div class="result-urgency">
                        {format!("⚠️ {} personas compraron en las últimas 2 horas", buyers.value())}
                    </div>
                </section>

                <button class="result-cta" onclick={buy("bottom")}>{"QUIERO EL PLAN A AHORA"}</button>
            </div>
        </div>
    }
}
