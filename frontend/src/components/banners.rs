use yew::prelude::*;

use crate::components::loading_overlay::LoadingOverlay;
use crate::funnel::controller::UiState;

#[derive(Properties, PartialEq)]
pub struct ErrorBannerProps {
    pub message: String,
    pub on_dismiss: Callback<()>,
}

#[function_component(ErrorBanner)]
pub fn error_banner(props: &ErrorBannerProps) -> Html {
    let on_close = {
        let on_dismiss = props.on_dismiss.clone();
        Callback::from(move |_: MouseEvent| on_dismiss.emit(()))
    };

    html! {
        <div class="error-banner" role="alert">
            {&props.message}
            <button class="error-banner-close" onclick={on_close} aria-label="Cerrar mensaje de error">
                {"×"}
            </button>
        </div>
    }
}

#[function_component(OfflineBanner)]
pub fn offline_banner() -> Html {
    html! {
        <div class="offline-banner" role="alert">
            {"Parece que estás sin conexión. Verifica tu internet para continuar."}
        </div>
    }
}

/// Shared styles for both banners; rendered once per page.
#[function_component(BannerStyles)]
pub fn banner_styles() -> Html {
    html! {
        <style>
            {r#"
                .error-banner {
                    position: fixed;
                    top: 1rem;
                    left: 0;
                    right: 0;
                    margin: 0 auto;
                    max-width: 28rem;
                    background: #fee2e2;
                    color: #991b1b;
                    padding: 1rem;
                    border-radius: 0.5rem;
                    text-align: center;
                    font-weight: 500;
                    z-index: 50;
                }
                .error-banner-close {
                    margin-left: 0.5rem;
                    color: #dc2626;
                    font-weight: 700;
                    background: none;
                    border: none;
                    cursor: pointer;
                }
                .offline-banner {
                    position: fixed;
                    top: 0;
                    left: 0;
                    right: 0;
                    background: #fee2e2;
                    color: #991b1b;
                    padding: 0.75rem;
                    text-align: center;
                    font-weight: 500;
                    z-index: 50;
                }
            "#}
        </style>
    }
}

#[derive(Properties, PartialEq)]
pub struct StatusLayerProps {
    pub ui: UiState,
    pub on_dismiss: Callback<()>,
}

/// Overlay, error and offline banners driven by one page's controller state.
#[function_component(StatusLayer)]
pub fn status_layer(props: &StatusLayerProps) -> Html {
    let ui = &props.ui;
    html! {
        <>
            <BannerStyles />
            {
                if ui.is_loading {
                    html! { <LoadingOverlay progress={ui.progress} message={ui.message.clone()} /> }
                } else {
                    html! {}
                }
            }
            {
                if let Some(message) = ui.error_message.clone() {
                    html! { <ErrorBanner {message} on_dismiss={props.on_dismiss.clone()} /> }
                } else {
                    html! {}
                }
            }
            {
                if !ui.is_online {
                    html! { <OfflineBanner /> }
                } else {
                    html! {}
                }
            }
        </>
    }
}
