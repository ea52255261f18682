use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct LoadingOverlayProps {
    pub progress: u8,
    #[prop_or_default]
    pub message: String,
}

#[function_component(LoadingOverlay)]
pub fn loading_overlay(props: &LoadingOverlayProps) -> Html {
    let message = if props.message.is_empty() {
        "Cargando...".to_string()
    } else {
        props.message.clone()
    };

    html! {
        <div class="loading-overlay" role="status" aria-live="polite">
            <style>
                {r#"
                    .loading-overlay {
                        position: fixed;
                        inset: 0;
                        background: rgba(0, 0, 0, 0.8);
                        display: flex;
                        flex-direction: column;
                        align-items: center;
                        justify-content: center;
                        z-index: 50;
                    }
                    .loading-spinner {
                        width: 64px;
                        height: 64px;
                        border-radius: 50%;
                        border-top: 2px solid #f97316;
                        border-bottom: 2px solid #f97316;
                        animation: spin 1s linear infinite;
                        margin-bottom: 1rem;
                    }
                    @keyframes spin {
                        to { transform: rotate(360deg); }
                    }
                    .loading-message {
                        color: #fff;
                        font-size: 1.125rem;
                    }
                    .progress-track {
                        width: 16rem;
                        height: 0.5rem;
                        background: #374151;
                        border-radius: 9999px;
                        margin-top: 1rem;
                        overflow: hidden;
                    }
                    .progress-fill {
                        height: 100%;
                        background: #f97316;
                        border-radius: 9999px;
                        transition: width 0.3s ease;
                    }
                "#}
            </style>
            <div class="loading-spinner"></div>
            <p class="loading-message">{message}</p>
            <div class="progress-track">
                <div class="progress-fill" style={format!("width: {}%;", props.progress)}></div>
            </div>
        </div>
    }
}
