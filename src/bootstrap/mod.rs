//! Session bootstrap
//!
//! Drives a fresh browser session from the landing page to a state where the
//! catalog can be browsed: guest entry, then location qualification.
//! Failure is reported as [`BootstrapState::Failed`] and is not fatal to a run.

mod state;

pub use state::{BootstrapFailure, BootstrapState};

use crate::config::Config;
use crate::selector::{chains, poll_until, Resolver};
use crate::session::{settle, BrowserSession};
use std::time::Duration;

const SETTLE_AFTER_LANDING: Duration = Duration::from_secs(2);
const GUEST_WAIT: Duration = Duration::from_secs(5);
const SETTLE_AFTER_GUEST: Duration = Duration::from_secs(3);
const SETTLE_FOR_MODAL: Duration = Duration::from_secs(5);
const SETTLE_AFTER_TYPING: Duration = Duration::from_secs(2);
const CONFIRM_POLL_ATTEMPTS: u32 = 10;
const CONFIRM_POLL_INTERVAL: Duration = Duration::from_secs(1);
const SETTLE_AFTER_CONFIRM: Duration = Duration::from_secs(8);

/// Interval between presence checks while waiting for a chain
const WAIT_INTERVAL: Duration = Duration::from_millis(500);

type StepResult = std::result::Result<BootstrapState, BootstrapFailure>;

/// Bootstrap state machine bound to one session
pub struct SessionBootstrap<'a, S: BrowserSession> {
    resolver: Resolver<'a, S>,
    base_url: &'a str,
    location_code: &'a str,
    page_load_timeout: Duration,
    state: BootstrapState,
}

impl<'a, S: BrowserSession> SessionBootstrap<'a, S> {
    pub fn new(session: &'a S, config: &'a Config) -> Self {
        Self {
            resolver: Resolver::new(session, config.scrape.element_timeout()),
            base_url: &config.site.base_url,
            location_code: &config.site.location_code,
            page_load_timeout: config.scrape.page_load_timeout(),
            state: BootstrapState::Landed,
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// Runs steps until a terminal state is reached
    ///
    /// Calling this again after a terminal state returns that state without
    /// touching the browser.
    pub async fn run(&mut self) -> BootstrapState {
        while !self.state.is_terminal() {
            let step = match self.state {
                BootstrapState::Landed => self.enter_as_guest().await,
                BootstrapState::GuestEntered => self.qualify_location().await,
                BootstrapState::LocationQualified => self.finish().await,
                BootstrapState::Ready | BootstrapState::Failed(_) => break,
            };
            self.transition(step.unwrap_or_else(BootstrapState::Failed));
        }
        self.state
    }

    fn transition(&mut self, next: BootstrapState) {
        if !self.state.can_transition_to(next) {
            tracing::warn!("Rejected bootstrap transition {} -> {}", self.state, next);
            self.state = BootstrapState::Failed(BootstrapFailure::InvalidTransition);
            return;
        }

        match next {
            BootstrapState::Failed(reason) => {
                tracing::warn!("Session setup failed at {}: {}", self.state, reason)
            }
            _ => tracing::info!("Session setup: {} -> {}", self.state, next),
        }
        self.state = next;
    }

    async fn enter_as_guest(&self) -> StepResult {
        let session = self.resolver.session();

        if let Err(e) = session.goto(self.base_url, self.page_load_timeout).await {
            tracing::warn!("Failed to load {}: {}", self.base_url, e);
            return Err(BootstrapFailure::NavigationFailed);
        }
        settle(SETTLE_AFTER_LANDING).await;

        let guest = self
            .resolver
            .wait_for_chain(chains::GUEST_BUTTON, GUEST_WAIT, WAIT_INTERVAL)
            .await
            .ok_or(BootstrapFailure::GuestEntryNotFound)?;

        session.click(&guest.element).await.map_err(|e| {
            tracing::warn!("Guest entry click failed: {}", e);
            BootstrapFailure::InteractionFailed
        })?;
        settle(SETTLE_AFTER_GUEST).await;

        Ok(BootstrapState::GuestEntered)
    }

    async fn qualify_location(&self) -> StepResult {
        let session = self.resolver.session();
        settle(SETTLE_FOR_MODAL).await;

        let input = self
            .resolver
            .wait_for_chain(
                chains::LOCATION_INPUT,
                self.resolver.element_timeout(),
                WAIT_INTERVAL,
            )
            .await
            .ok_or(BootstrapFailure::LocationInputNotFound)?;

        session
            .clear_and_type(&input.element, self.location_code)
            .await
            .map_err(|e| {
                tracing::warn!("Typing location code failed: {}", e);
                BootstrapFailure::InteractionFailed
            })?;
        tracing::debug!("Entered location code {}", self.location_code);
        settle(SETTLE_AFTER_TYPING).await;

        let confirm = self
            .resolver
            .resolve(chains::LOCATION_CONFIRM, None)
            .await
            .ok_or(BootstrapFailure::LocationConfirmNotFound)?;

        let control = &confirm.element;
        let enabled = poll_until(CONFIRM_POLL_ATTEMPTS, CONFIRM_POLL_INTERVAL, move || async move {
            match session.attribute(control, "disabled").await {
                Ok(None) => Some(()),
                Ok(Some(_)) => None,
                Err(e) => {
                    tracing::trace!("Could not read confirm state: {}", e);
                    None
                }
            }
        })
        .await;

        if enabled.is_none() {
            return Err(BootstrapFailure::LocationConfirmDisabled);
        }

        if let Err(e) = session.scroll_into_view(&confirm.element).await {
            tracing::debug!("Scroll to confirm control failed: {}", e);
        }
        session.click(&confirm.element).await.map_err(|e| {
            tracing::warn!("Location confirm click failed: {}", e);
            BootstrapFailure::InteractionFailed
        })?;

        Ok(BootstrapState::LocationQualified)
    }

    async fn finish(&self) -> StepResult {
        settle(SETTLE_AFTER_CONFIRM).await;
        Ok(BootstrapState::Ready)
    }
}

/// Bootstraps `session` once and returns the terminal state
pub async fn bootstrap<S: BrowserSession>(session: &S, config: &Config) -> BootstrapState {
    SessionBootstrap::new(session, config).run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::session::FixtureSession;

    const BASE: &str = "https://shop.example.com/";

    fn config() -> Config {
        parse_config(&format!(
            r#"
[site]
base-url = "{}"
location-code = "97035"

[scrape]
categories = ["Dairy"]
element-timeout-ms = 1000

[output]
directory = "out"
file-name = "products.csv"
"#,
            BASE
        ))
        .unwrap()
    }

    fn landing(confirm_attrs: &str) -> String {
        format!(
            r#"<html><body>
            <button data-id="btn_login_continue_as_guest">Continue as Guest</button>
            <div class="initial-zipcode-modal-input"><input type="text"></div>
            <button data-id="initial_zipcode_modal_start_shopping_button" {}>Start Shopping</button>
            </body></html>"#,
            confirm_attrs
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaches_ready() {
        let config = config();
        let session = FixtureSession::builder()
            .page(BASE, landing(r#"disabled data-fixture-enable-after="3""#))
            .build();

        let mut bootstrap = SessionBootstrap::new(&session, &config);
        assert_eq!(bootstrap.run().await, BootstrapState::Ready);
        assert_eq!(session.typed_values(), vec!["97035"]);
        assert_eq!(session.clicks().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rerun_on_ready_is_noop() {
        let config = config();
        let session = FixtureSession::builder().page(BASE, landing("")).build();

        let mut bootstrap = SessionBootstrap::new(&session, &config);
        assert!(bootstrap.run().await.is_ready());
        let navigations = session.navigations().len();

        assert!(bootstrap.run().await.is_ready());
        assert_eq!(session.navigations().len(), navigations);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_guest_control_fails() {
        let config = config();
        let session = FixtureSession::builder()
            .page(BASE, "<html><body><p>Welcome</p></body></html>")
            .build();

        assert_eq!(
            bootstrap(&session, &config).await,
            BootstrapState::Failed(BootstrapFailure::GuestEntryNotFound)
        );
        assert!(session.typed_values().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_never_enabled_fails() {
        let config = config();
        let session = FixtureSession::builder()
            .page(BASE, landing(r#"disabled data-fixture-enable-after="50""#))
            .build();

        let start = tokio::time::Instant::now();
        assert_eq!(
            bootstrap(&session, &config).await,
            BootstrapState::Failed(BootstrapFailure::LocationConfirmDisabled)
        );
        // Only the guest click happened
        assert_eq!(session.clicks().len(), 1);
        // 2 + 3 + 5 + 2 seconds of settling plus 9 seconds of polling
        assert_eq!(start.elapsed(), Duration::from_secs(21));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_site_fails() {
        let config = config();
        let session = FixtureSession::builder().build();

        assert_eq!(
            bootstrap(&session, &config).await,
            BootstrapState::Failed(BootstrapFailure::NavigationFailed)
        );
    }
}
