//! Session lifecycle manager: establishment, silent renewal, logout.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use hrms_core::config::AuthConfig;
use hrms_core::error::AppError;
use hrms_core::events::{EventBus, LogoutReason, Notice, SessionEvent};
use hrms_core::result::AppResult;
use hrms_entity::{Role, Session};

use crate::jwt::TokenValidator;

use super::store::{StorageKey, TokenStore};

/// Exchanges a refresh token for a new access token.
///
/// `Ok(None)` means the backend answered but carried no token.
#[async_trait]
pub trait TokenRenewer: Send + Sync + 'static {
    /// Perform one renewal call.
    async fn renew(&self, access_token: &str, refresh_token: &str) -> AppResult<Option<String>>;
}

type PendingRenewal = Shared<BoxFuture<'static, Option<String>>>;

/// Result of [`SessionManager::renew_admitted`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewalAttempt {
    /// A renewal ran, either started by this caller or joined.
    Completed(Option<String>),
    /// No renewal was running and the caller declined to start one.
    Declined,
}

/// Owns the stored session and everything that may end it.
///
/// Concurrent callers of [`renew`](Self::renew) share a single renewal
/// call. Logout is guarded by a flag so overlapping triggers publish one
/// `LoggedOut` event.
#[derive(Clone)]
pub struct SessionManager {
    /// Session persistence.
    store: Arc<dyn TokenStore>,
    /// Backend renewal call.
    renewer: Arc<dyn TokenRenewer>,
    /// Claim decoding.
    validator: TokenValidator,
    /// Where session events and notices go.
    events: EventBus,
    /// Route announced in `LoggedOut` events.
    login_route: Arc<str>,
    /// Renewal shared by every caller that arrives while it runs.
    pending: Arc<Mutex<Option<PendingRenewal>>>,
    /// Set while a logout is being carried out.
    logout_in_progress: Arc<AtomicBool>,
    /// Bumped whenever a session starts or ends.
    epoch: Arc<AtomicU64>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("store", &self.store)
            .field("validator", &self.validator)
            .field("login_route", &self.login_route)
            .finish()
    }
}

impl SessionManager {
    /// Creates a session manager.
    pub fn new(
        store: Arc<dyn TokenStore>,
        renewer: Arc<dyn TokenRenewer>,
        validator: TokenValidator,
        events: EventBus,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            store,
            renewer,
            validator,
            events,
            login_route: Arc::from(login_route.into()),
            pending: Arc::new(Mutex::new(None)),
            logout_in_progress: Arc::new(AtomicBool::new(false)),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a session manager from the `[auth]` section.
    pub fn from_config(
        config: &AuthConfig,
        store: Arc<dyn TokenStore>,
        renewer: Arc<dyn TokenRenewer>,
        events: EventBus,
    ) -> Self {
        Self::new(
            store,
            renewer,
            TokenValidator::new(config.role_claim_candidates.clone()),
            events,
            config.login_route.clone(),
        )
    }

    /// The token validator in use.
    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// The event bus session events are published on.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// The login route.
    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// Snapshot of the stored session.
    pub fn session(&self) -> Session {
        self.store.session()
    }

    /// The stored access token, expired or not.
    pub fn access_token(&self) -> Option<String> {
        self.store.get(StorageKey::AccessToken)
    }

    /// Returns `true` if an unexpired access token is stored.
    pub fn is_authenticated(&self) -> bool {
        !self.validator.is_expired(self.access_token().as_deref())
    }

    /// Role of the current session.
    ///
    /// The stored role wins over the token's role claim. A mismatch is
    /// logged; it usually means the role changed since login.
    pub fn current_role(&self) -> Option<Role> {
        let session = self.store.session();
        let token = session.access_token.as_deref()?;
        let claimed = self.validator.role_of(token);

        match (session.role, claimed) {
            (Some(stored), Some(claimed)) if stored != claimed => {
                warn!(
                    stored = %stored,
                    claimed = %claimed,
                    "Stored role differs from token claim, using stored role"
                );
                Some(stored)
            }
            (Some(stored), _) => Some(stored),
            (None, claimed) => claimed,
        }
    }

    /// Store a freshly issued session.
    ///
    /// Rejects sessions without an access token or with one that has
    /// already expired. A missing role is filled from the token claims.
    pub fn establish(&self, mut session: Session) -> AppResult<()> {
        let Some(token) = session.access_token.as_deref() else {
            return Err(AppError::authentication("Login response carried no access token"));
        };
        if self.validator.is_expired(Some(token)) {
            return Err(AppError::authentication("Login returned an expired access token"));
        }
        if session.role.is_none() {
            session.role = self.validator.role_of(token);
        }

        self.store.save_session(&session)?;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        info!(
            user_id = session.user_id.as_deref().unwrap_or("-"),
            role = ?session.role,
            "Session established"
        );
        self.events.session(SessionEvent::LoggedIn {
            user_id: session.user_id,
            email: session.email,
        });
        Ok(())
    }

    /// Token to attach to an outgoing request.
    ///
    /// Returns `Ok(None)` when no token is stored. An expired token is
    /// renewed first; if that fails the session is already gone and an
    /// authentication error is returned.
    pub async fn valid_token(&self) -> AppResult<Option<String>> {
        let Some(token) = self.access_token() else {
            return Ok(None);
        };
        if !self.validator.is_expired(Some(&token)) {
            return Ok(Some(token));
        }

        debug!("Access token expired, renewing before request");
        self.renew()
            .await
            .map(Some)
            .ok_or_else(|| AppError::authentication("Session expired"))
    }

    /// Renew the access token.
    ///
    /// Returns the new token, or `None` after logging out. Callers that
    /// arrive while a renewal is running wait for that one instead of
    /// starting their own.
    pub async fn renew(&self) -> Option<String> {
        match self.renew_admitted(|| true).await {
            RenewalAttempt::Completed(token) => token,
            RenewalAttempt::Declined => None,
        }
    }

    /// Join the running renewal, or start one if `admit` allows it.
    ///
    /// `admit` is only consulted when no renewal is in flight, under the
    /// same lock that publishes a new one, so callers joining a renewal
    /// never pay for it.
    pub async fn renew_admitted<F>(&self, admit: F) -> RenewalAttempt
    where
        F: FnOnce() -> bool,
    {
        let shared = {
            let mut pending = self.pending.lock().await;
            match pending.as_ref() {
                Some(running) if running.peek().is_none() => {
                    debug!("Joining renewal already in flight");
                    running.clone()
                }
                _ => {
                    if !admit() {
                        return RenewalAttempt::Declined;
                    }
                    let this = self.clone();
                    let renewal = async move { this.renew_once().await }.boxed().shared();
                    *pending = Some(renewal.clone());
                    renewal
                }
            }
        };

        let token = shared.clone().await;

        let mut pending = self.pending.lock().await;
        if pending.as_ref().is_some_and(|p| p.ptr_eq(&shared)) {
            *pending = None;
        }
        RenewalAttempt::Completed(token)
    }

    async fn renew_once(&self) -> Option<String> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let session = self.store.session();
        let (Some(access), Some(refresh)) = (session.access_token, session.refresh_token) else {
            warn!("Cannot renew session: access or refresh token missing");
            self.logout(LogoutReason::MissingCredentials);
            return None;
        };

        info!("Renewing access token");
        let outcome = self.renewer.renew(&access, &refresh).await;

        // The session this renewal belonged to is gone; leave the store alone.
        if self.epoch.load(Ordering::SeqCst) != epoch {
            info!("Session changed during renewal, discarding result");
            return None;
        }

        match outcome {
            Ok(Some(token)) => match self.store.set(StorageKey::AccessToken, &token) {
                Ok(()) if self.epoch.load(Ordering::SeqCst) != epoch => {
                    // A logout raced the write above.
                    if self.access_token().as_deref() == Some(token.as_str()) {
                        if let Err(e) = self.store.remove(StorageKey::AccessToken) {
                            error!(error = %e, "Failed to drop renewed token after logout");
                        }
                    }
                    None
                }
                Ok(()) => {
                    info!("Access token renewed");
                    self.events.session(SessionEvent::TokenRenewed);
                    Some(token)
                }
                Err(e) => {
                    error!(error = %e, "Failed to persist renewed token");
                    self.expire_session()
                }
            },
            Ok(None) => {
                warn!("Renewal response carried no access token");
                self.expire_session()
            }
            Err(e) => {
                warn!(error = %e, "Token renewal failed");
                self.expire_session()
            }
        }
    }

    fn expire_session(&self) -> Option<String> {
        self.events.notice(Notice::SessionExpired);
        self.logout(LogoutReason::RenewalFailed);
        None
    }

    /// Erase the session and announce the redirect to the login route.
    ///
    /// Returns `false` if another logout was already running.
    pub fn logout(&self, reason: LogoutReason) -> bool {
        if self.logout_in_progress.swap(true, Ordering::SeqCst) {
            debug!(%reason, "Logout already in progress, ignoring");
            return false;
        }

        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = self.store.clear() {
            error!(error = %e, "Failed to clear token store during logout");
        }
        info!(%reason, "Session ended");
        self.events.session(SessionEvent::LoggedOut {
            reason,
            redirect_to: self.login_route.to_string(),
        });

        self.logout_in_progress.store(false, Ordering::SeqCst);
        true
    }

    /// Erase the stored session without publishing anything.
    pub fn clear(&self) -> AppResult<()> {
        self.store.clear()
    }
}
