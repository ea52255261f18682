//! Per-page state machine behind the primary call-to-action.
//!
//! `Idle -> Busy -> Navigating`, or `Busy -> Failed -> Idle` when something
//! goes wrong. The controller never touches the browser: the page feeds it
//! the current time through [`InteractionController::tick`] and carries out
//! the [`Effect`]s it returns.

use log::{error, info};

use crate::error::FunnelError;
use crate::funnel::campaign::CampaignParameters;
use crate::funnel::device::{AnimationProfile, DeviceClass};
use crate::telemetry::event::TrackedEvent;

pub const START_ERROR_MESSAGE: &str = "Hubo un problema al iniciar el test. Inténtalo de nuevo.";

#[derive(Clone, Debug, PartialEq)]
pub struct ControllerTimings {
    /// Upper bound on how long the bar animates before completing.
    pub completion_delay_ms: f64,
    /// Gap between the prefetch hint and the actual navigation.
    pub navigate_delay_ms: f64,
    pub error_clear_ms: f64,
    pub connectivity_debounce_ms: f64,
}

impl Default for ControllerTimings {
    fn default() -> Self {
        Self {
            completion_delay_ms: 800.0,
            navigate_delay_ms: 100.0,
            error_clear_ms: 5_000.0,
            connectivity_debounce_ms: 500.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Busy,
    Navigating,
    Failed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UiState {
    pub is_loaded: bool,
    pub is_loading: bool,
    pub progress: u8,
    pub message: String,
    pub error_message: Option<String>,
    pub is_online: bool,
    pub device_class: DeviceClass,
}

/// Where a finished episode sends the visitor.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationTarget {
    pub path: String,
    pub campaign: CampaignParameters,
}

impl NavigationTarget {
    pub fn new(path: &str, campaign: CampaignParameters) -> Result<Self, FunnelError> {
        if !path.starts_with('/') || path.contains(|c: char| c == '?' || c == '#') {
            return Err(FunnelError::InvalidTarget(path.to_string()));
        }
        Ok(Self {
            path: path.to_string(),
            campaign,
        })
    }

    pub fn url(&self) -> String {
        self.campaign.append_to(&self.path)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Track(TrackedEvent),
    Prefetch(String),
    Navigate(NavigationTarget),
}

/// What pressing the primary action should do.
#[derive(Clone, Debug, PartialEq)]
pub struct StartRequest {
    pub target_path: String,
    pub event: TrackedEvent,
    pub message: String,
}

struct Episode {
    started_at: f64,
    last_step_at: f64,
    target_path: String,
    navigate: Option<(NavigationTarget, f64)>,
}

pub struct InteractionController {
    profile: AnimationProfile,
    timings: ControllerTimings,
    campaign: CampaignParameters,
    phase: Phase,
    ui: UiState,
    episode: Option<Episode>,
    error_clear_at: Option<f64>,
    pending_online: Option<(bool, f64)>,
}

impl InteractionController {
    pub fn new(
        device_class: DeviceClass,
        campaign: CampaignParameters,
        timings: ControllerTimings,
    ) -> Self {
        Self {
            profile: AnimationProfile::for_class(device_class),
            timings,
            campaign,
            phase: Phase::Idle,
            ui: UiState {
                is_loaded: false,
                is_loading: false,
                progress: 0,
                message: String::new(),
                error_message: None,
                is_online: true,
                device_class,
            },
            episode: None,
            error_clear_at: None,
            pending_online: None,
        }
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn profile(&self) -> AnimationProfile {
        self.profile
    }

    /// The action stays disabled until the page has mounted and while offline.
    pub fn can_start(&self) -> bool {
        self.ui.is_loaded
            && self.ui.is_online
            && matches!(self.phase, Phase::Idle | Phase::Failed)
    }

    /// Whether [`InteractionController::tick`] can still change anything.
    pub fn needs_ticks(&self) -> bool {
        self.phase == Phase::Busy || self.pending_online.is_some() || self.error_clear_at.is_some()
    }

    pub fn mark_loaded(&mut self) {
        self.ui.is_loaded = true;
    }

    /// Press of the primary action. Returns no effects when the press is ignored.
    pub fn start(&mut self, request: StartRequest, now: f64) -> Vec<Effect> {
        if !self.can_start() {
            return Vec::new();
        }
        if self.phase == Phase::Failed {
            self.dismiss_error();
        }

        info!("starting episode towards {}", request.target_path);
        self.phase = Phase::Busy;
        self.ui.is_loading = true;
        self.ui.progress = self.profile.initial_progress;
        self.ui.message = request.message;
        self.episode = Some(Episode {
            started_at: now,
            last_step_at: now,
            target_path: request.target_path,
            navigate: None,
        });
        vec![Effect::Track(request.event)]
    }

    pub fn tick(&mut self, now: f64) -> Vec<Effect> {
        let mut effects = Vec::new();

        if let Some((online, at)) = self.pending_online {
            if now >= at {
                self.ui.is_online = online;
                self.pending_online = None;
            }
        }
        if self.error_clear_at.is_some_and(|at| now >= at) {
            self.dismiss_error();
        }
        if self.phase != Phase::Busy {
            return effects;
        }
        let Some(mut episode) = self.episode.take() else {
            return effects;
        };

        if let Some((target, at)) = episode.navigate.take() {
            if now >= at {
                self.phase = Phase::Navigating;
                effects.push(Effect::Navigate(target));
                return effects;
            }
            episode.navigate = Some((target, at));
            self.episode = Some(episode);
            return effects;
        }

        let ceiling = self.profile.ceiling;
        while self.ui.progress < ceiling
            && now - episode.last_step_at >= self.profile.frame_interval_ms
        {
            self.ui.progress = self.ui.progress.saturating_add(self.profile.step).min(ceiling);
            episode.last_step_at += self.profile.frame_interval_ms;
        }

        let timed_out = now - episode.started_at >= self.timings.completion_delay_ms;
        if self.ui.progress < ceiling && !timed_out {
            self.episode = Some(episode);
            return effects;
        }

        match NavigationTarget::new(&episode.target_path, self.campaign.clone()) {
            Ok(target) => {
                self.ui.progress = 100;
                effects.push(Effect::Prefetch(target.url()));
                episode.navigate = Some((target, now + self.timings.navigate_delay_ms));
                self.episode = Some(episode);
            }
            Err(e) => self.fail(e, now),
        }
        effects
    }

    /// Abort the current episode and show the retry banner.
    pub fn fail(&mut self, err: FunnelError, now: f64) {
        error!("episode failed: {err}");
        self.phase = Phase::Failed;
        self.episode = None;
        self.ui.is_loading = false;
        self.ui.progress = 0;
        self.ui.message.clear();
        self.ui.error_message = Some(START_ERROR_MESSAGE.to_string());
        self.error_clear_at = Some(now + self.timings.error_clear_ms);
    }

    pub fn dismiss_error(&mut self) {
        self.ui.error_message = None;
        self.error_clear_at = None;
        if self.phase == Phase::Failed {
            self.phase = Phase::Idle;
        }
    }

    /// Mount-time reading, applied without debounce.
    pub fn set_online_now(&mut self, online: bool) {
        self.ui.is_online = online;
        self.pending_online = None;
    }

    /// Raw `online`/`offline` signal; applied once it has held for the debounce window.
    pub fn observe_connectivity(&mut self, online: bool, now: f64) {
        if self.pending_online.is_none() && online == self.ui.is_online {
            return;
        }
        self.pending_online = Some((online, now + self.timings.connectivity_debounce_ms));
    }
}
