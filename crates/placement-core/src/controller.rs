//! Student session controller
//!
//! Owns the login → company list flow for one student:
//!
//! - `submit` validates the form, authenticates, and kicks off the first
//!   company fetch in the background
//! - `fetch_companies` loads the listing; a 429 starts the countdown and the
//!   fetch is retried when it reaches zero
//! - `logout` discards the session and cancels whatever is still in flight
//!
//! All state lives in one `ControllerState` published on a watch channel.
//! Every write is tagged with the session epoch it belongs to, so a response
//! that lands after logout is dropped instead of resurrecting the session.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{CompanyListResponse, PlacementApi};
use crate::backoff::{Countdown, CountdownOutcome};
use crate::config::PortalConfig;
use crate::constants::messages;
use crate::error::{ApiError, SessionError};
use crate::models::{BackoffState, ControllerState, Phase, Session};
use crate::validation::LoginForm;

/// Result of one `fetch_companies` run, after any rate-limit retries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Listing replaced with this many records
    Loaded(usize),
    /// HTTP 200 with an empty list; listing left as it was
    Empty,
    /// HTTP 200 marked invalid; alert raised
    Invalid,
    /// HTTP 200 with a body we do not understand
    Unrecognized,
    /// Non-429 failure; logged only
    Failed(ApiError),
    /// Gave up after the configured number of rate-limit retries
    RetriesExhausted,
    /// Session logged out while the fetch was running
    Cancelled,
}

/// Drives one student's session against a `PlacementApi`
pub struct SessionController<A: PlacementApi + ?Sized> {
    api: Arc<A>,
    config: PortalConfig,
    countdown: Countdown,
    state: watch::Sender<ControllerState>,
}

impl<A: PlacementApi + ?Sized + 'static> SessionController<A> {
    pub fn new(api: Arc<A>, config: PortalConfig) -> Self {
        let countdown = Countdown::from_config(&config);
        let (state, _) = watch::channel(ControllerState::default());
        Self {
            api,
            config,
            countdown,
            state,
        }
    }

    /// Current state
    pub fn snapshot(&self) -> ControllerState {
        self.state.borrow().clone()
    }

    /// Change notifications for the presentation layer
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state.subscribe()
    }

    pub fn dismiss_alert(&self) {
        self.state.send_if_modified(|state| state.alert.take().is_some());
    }

    /// Validate and submit the login form.
    ///
    /// On success the session is stored and the first company fetch is
    /// spawned with the new token. Failures are never retried.
    pub async fn submit(
        self: &Arc<Self>,
        roll_number: &str,
        password: &str,
    ) -> Result<Session, SessionError> {
        let credentials = LoginForm::new(roll_number, password)
            .validate()
            .map_err(SessionError::Validation)?;

        let mut started = None;
        self.state.send_if_modified(|state| {
            if state.phase != Phase::LoggedOut {
                return false;
            }
            state.epoch += 1;
            state.phase = Phase::Authenticating;
            state.loading = true;
            state.alert = None;
            state.cancel = CancellationToken::new();
            started = Some((state.epoch, state.cancel.clone()));
            true
        });
        let Some((epoch, cancel)) = started else {
            return Err(SessionError::AlreadyAuthenticated);
        };

        info!(roll_number = %credentials.roll_number, "Submitting student login");

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SessionError::Cancelled),
            result = self.api.check_student_login(&credentials) => result,
        };

        let outcome = match result {
            Ok(response) => response
                .into_session(&credentials.roll_number)
                .ok_or(SessionError::InvalidCredentials),
            Err(ApiError::Decode(e)) => {
                debug!(error = %e, "Malformed login response");
                Err(SessionError::InvalidCredentials)
            }
            Err(e) => Err(SessionError::Transport(e.to_string())),
        };

        match outcome {
            Ok(session) => {
                let stored = session.clone();
                let applied = self.update_if_current(epoch, |state| {
                    state.session = Some(stored);
                    state.phase = Phase::FetchingCompanies;
                });
                if !applied {
                    return Err(SessionError::Cancelled);
                }
                info!(roll_number = %session.roll_number, "Student logged in");
                self.spawn_fetch(session.token().to_string(), epoch, cancel);
                Ok(session)
            }
            Err(err) => {
                warn!(error = %err, "Student login failed");
                let alert = err.to_string();
                self.update_if_current(epoch, |state| {
                    state.phase = Phase::LoggedOut;
                    state.loading = false;
                    state.alert = Some(alert);
                });
                Err(err)
            }
        }
    }

    /// Fetch the company list for the current session.
    ///
    /// Rate-limited responses are retried after the countdown, with no cap
    /// unless `max_rate_limit_retries` is configured.
    pub async fn fetch_companies(&self, token: &str) -> Result<FetchOutcome, SessionError> {
        let (epoch, cancel) = {
            let state = self.state.borrow();
            if !state.is_authenticated() {
                return Err(SessionError::NotAuthenticated);
            }
            (state.epoch, state.cancel.clone())
        };
        Ok(self.run_fetch(token, epoch, &cancel).await)
    }

    /// Discard the session and listing. In-flight calls and countdowns are
    /// cancelled; the token is not revoked server-side.
    pub fn logout(&self) {
        let mut was_logged_in = false;
        self.state.send_if_modified(|state| {
            state.cancel.cancel();
            was_logged_in = state.phase != Phase::LoggedOut;
            *state = ControllerState {
                epoch: state.epoch + 1,
                ..Default::default()
            };
            was_logged_in
        });
        if was_logged_in {
            info!("Student logged out");
        }
    }

    fn spawn_fetch(self: &Arc<Self>, token: String, epoch: u64, cancel: CancellationToken) {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = controller.run_fetch(&token, epoch, &cancel).await;
            debug!(?outcome, "Initial company fetch finished");
        });
    }

    async fn run_fetch(&self, token: &str, epoch: u64, cancel: &CancellationToken) -> FetchOutcome {
        let mut retries: u32 = 0;

        loop {
            let started = self.update_if_current(epoch, |state| {
                state.phase = Phase::FetchingCompanies;
                state.loading = true;
            });
            if !started {
                return FetchOutcome::Cancelled;
            }

            debug!(retries, "Fetching company list");
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return FetchOutcome::Cancelled,
                result = self.api.get_all_company_list(token) => result,
            };

            let outcome = match result {
                Ok(CompanyListResponse::Companies(companies)) if companies.is_empty() => {
                    debug!("Company list is empty; keeping current listing");
                    self.finish(epoch, |_| {}, FetchOutcome::Empty)
                }
                Ok(CompanyListResponse::Companies(companies)) => {
                    let count = companies.len();
                    info!(count, "Company list loaded");
                    self.finish(
                        epoch,
                        |state| state.companies = companies,
                        FetchOutcome::Loaded(count),
                    )
                }
                Ok(CompanyListResponse::Invalid) => {
                    warn!("Company list marked invalid");
                    self.finish(
                        epoch,
                        |state| state.alert = Some(messages::SOMETHING_WENT_WRONG.to_string()),
                        FetchOutcome::Invalid,
                    )
                }
                Ok(CompanyListResponse::Unrecognized(body)) => {
                    warn!(%body, "Unrecognized company list response");
                    self.finish(epoch, |_| {}, FetchOutcome::Unrecognized)
                }
                Err(ApiError::RateLimited) => {
                    if let Some(max) = self.config.max_rate_limit_retries {
                        if retries >= max {
                            warn!(retries, "Rate-limit retries exhausted");
                            return self.finish(
                                epoch,
                                |state| {
                                    state.alert =
                                        Some(messages::SOMETHING_WENT_WRONG.to_string())
                                },
                                FetchOutcome::RetriesExhausted,
                            );
                        }
                    }
                    retries += 1;
                    warn!(
                        attempt = retries,
                        retry_in_ms = self.config.retry_interval_ms,
                        ticks = self.countdown.ticks(),
                        "Company list rate limited, backing off"
                    );

                    match self.back_off(epoch, cancel).await {
                        CountdownOutcome::Elapsed => continue,
                        CountdownOutcome::Cancelled => return FetchOutcome::Cancelled,
                    }
                }
                Err(err) => {
                    warn!(error = %err, "Failed to fetch company list");
                    self.finish(epoch, |_| {}, FetchOutcome::Failed(err))
                }
            };
            return outcome;
        }
    }

    /// Publish the countdown and wait for it. Backoff is cleared on the tick
    /// that reaches zero, immediately before the retry.
    async fn back_off(&self, epoch: u64, cancel: &CancellationToken) -> CountdownOutcome {
        self.countdown
            .run(cancel, |remaining| {
                let remaining_ms = duration_ms(remaining);
                self.update_if_current(epoch, |state| {
                    state.loading = false;
                    if remaining_ms > 0 {
                        state.phase = Phase::Backoff;
                        state.backoff = BackoffState::counting(remaining_ms);
                    } else {
                        state.backoff = BackoffState::default();
                    }
                });
            })
            .await
    }

    /// Settle back to idle after a fetch, applying `apply` first
    fn finish<F>(&self, epoch: u64, apply: F, outcome: FetchOutcome) -> FetchOutcome
    where
        F: FnOnce(&mut ControllerState),
    {
        let applied = self.update_if_current(epoch, |state| {
            apply(state);
            state.phase = Phase::Idle;
            state.loading = false;
            state.backoff = BackoffState::default();
        });
        if applied {
            outcome
        } else {
            FetchOutcome::Cancelled
        }
    }

    /// Apply `f` only if the session that issued the write is still current
    fn update_if_current<F>(&self, epoch: u64, f: F) -> bool
    where
        F: FnOnce(&mut ControllerState),
    {
        self.state.send_if_modified(|state| {
            if state.epoch != epoch {
                return false;
            }
            f(state);
            true
        })
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
