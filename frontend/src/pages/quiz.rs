use log::{error, warn};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::browser::storage;
use crate::components::banners::StatusLayer;
use crate::funnel::controller::StartRequest;
use crate::funnel::quiz::{self, QuizAnswers, QUESTIONS};
use crate::hooks::use_interaction;
use crate::telemetry::event::TrackedEvent;
use crate::Route;

#[derive(Properties, PartialEq)]
pub struct QuizPageProps {
    pub step: u8,
}

#[function_component(QuizPage)]
pub fn quiz_page(props: &QuizPageProps) -> Html {
    let step = props.step;
    let interaction = use_interaction();
    let answers = use_mut_ref(|| QuizAnswers::load(storage::get_item));
    let picked = use_state(|| None::<String>);

    if let Some(restart) = quiz::redirect_step(step) {
        warn!("unknown quiz step {step}, back to step {restart}");
        return html! { <Redirect<Route> to={Route::Quiz { step: restart }} /> };
    }
    let Some(question) = quiz::question(step) else {
        return html! {};
    };

    let on_pick = {
        let start = interaction.start.clone();
        let can_start_now = interaction.can_start_now.clone();
        let answers = answers.clone();
        let picked = picked.clone();
        Callback::from(move |option: &'static str| {
            if !can_start_now.emit(()) {
                return;
            }
            let unlocked = answers.borrow_mut().answer(step, option);
            match answers.borrow().to_storage() {
                Ok(items) => storage::set_items(&items),
                Err(e) => error!("could not encode quiz answers: {e}"),
            }
            picked.set(Some(option.to_string()));

            let mut event = TrackedEvent::new("respondio_pregunta")
                .with("step", u32::from(step))
                .with("respuesta", option);
            if let Some(bonus) = unlocked {
                event = event.with("bonus_id", bonus.id);
            }
            start.emit(StartRequest {
                target_path: quiz::next_path(step),
                event,
                message: "Analizando tu respuesta...".to_string(),
            });
        })
    };

    let ui = &interaction.ui;
    let total = QUESTIONS.len();
    let percent = u32::from(step) * 100 / total as u32;

    html! {
        <div class="quiz-page">
            <style>
                {r#"
                    .quiz-page {
                        min-height: 100vh;
                        background: linear-gradient(135deg, #000 0%, #111827 50%, #0f172a 100%);
                        color: #fff;
                        display: flex;
                        flex-direction: column;
                        align-items: center;
                        padding: 2rem 1rem;
                    }
                    .quiz-progress {
                        width: 100%;
                        max-width: 40rem;
                        margin-bottom: 2rem;
                    }
                    .quiz-progress-label {
                        display: flex;
                        justify-content: space-between;
                        font-size: 0.85rem;
                        color: #9ca3af;
                        margin-bottom: 0.5rem;
                    }
                    .quiz-progress-track {
                        height: 8px;
                        background: #374151;
                        border-radius: 9999px;
                        overflow: hidden;
                    }
                    .quiz-progress-fill {
                        height: 100%;
                        background: linear-gradient(90deg, #f97316, #ef4444);
                        transition: width 0.3s ease;
                    }
                    .quiz-card {
                        width: 100%;
                        max-width: 40rem;
                        background: rgba(17, 24, 39, 0.95);
                        border: 2px solid rgba(249, 115, 22, 0.3);
                        border-radius: 1rem;
                        padding: 2rem;
                    }
                    .quiz-prompt {
                        font-size: 1.5rem;
                        font-weight: 700;
                        text-align: center;
                        margin-bottom: 2rem;
                    }
                    .quiz-option {
                        display: block;
                        width: 100%;
                        text-align: left;
                        padding: 1rem 1.25rem;
                        margin-bottom: 0.75rem;
                        background: #1f2937;
                        color: #fff;
                        border: 2px solid #374151;
                        border-radius: 0.75rem;
                        font-size: 1rem;
                        cursor: pointer;
                        transition: border-color 0.2s ease, background 0.2s ease;
                    }
                    .quiz-option:hover:not(:disabled) {
                        border-color: #f97316;
                    }
                    .quiz-option.picked {
                        border-color: #22c55e;
                        background: rgba(34, 197, 94, 0.15);
                    }
                    .quiz-option:disabled {
                        cursor: not-allowed;
                        opacity: 0.7;
                    }
                    .quiz-bonus-hint {
                        margin-top: 1.5rem;
                        text-align: center;
                        color: #fb923c;
                        font-size: 0.9rem;
                    }
                "#}
            </style>
            <StatusLayer ui={ui.clone()} on_dismiss={interaction.dismiss_error.clone()} />
            <div class="quiz-progress">
                <div class="quiz-progress-label">
                    <span>{format!("Pregunta {} de {}", step, total)}</span>
                    <span>{format!("{}%", percent)}</span>
                </div>
                <div class="quiz-progress-track">
                    <div class="quiz-progress-fill" style={format!("width: {}%;", percent)}></div>
                </div>
            </div>
            <div class="quiz-card">
                <h2 class="quiz-prompt">{question.prompt}</h2>
                {
                    question.options.iter().map(|option| {
                        let option: &'static str = option;
                        let is_picked = picked.as_deref() == Some(option);
                        let onclick = {
                            let on_pick = on_pick.clone();
                            Callback::from(move |_: MouseEvent| on_pick.emit(option))
                        };
                        html! {
                            <button
                                class={classes!("quiz-option", is_picked.then_some("picked"))}
                                {onclick}
                                disabled={!interaction.can_start}
                            >
                                {option}
                            </button>
                        }
                    }).collect::<Html>()
                }
                <div class="quiz-bonus-hint">
                    {format!("🎁 Responde y desbloquea: {} (valor ${})", question.bonus.title, question.bonus.value)}
                </div>
            </div>
        </div>
    }
}
