//! Drives scratch-reveal widgets on the server
//!
//! Each session owns one [`ScratchReveal`] behind its own mutex. When the
//! widget asks for a discount the fetch runs in a spawned task without the
//! lock held, so pointer input keeps flowing while the model answers.
//!
//! Sessions live in a bounded cache and expire after sitting idle. Dropping
//! a session, for whatever reason, aborts its fetch and wakes its waiters.

use moka::future::Cache;
use moka::notification::RemovalCause;
use robobox_core::reveal::{
    Effect, FetchTicket, MemoryClipboard, PointerEvent, RasterMask, RevealView, ScratchReveal,
};
use robobox_llm::DiscountFlow;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::RevealConfig;
use crate::error::ServerError;

/// View of one session as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    #[serde(flatten)]
    pub view: RevealView,
}

/// Result of a copy action
#[derive(Debug, Clone, Serialize)]
pub struct CopyOutcome {
    pub code: Option<String>,
    pub copied: bool,
}

struct RevealSession {
    widget: Mutex<ScratchReveal>,
    fetch: std::sync::Mutex<Option<AbortHandle>>,
    /// `true` while a fetch is outstanding
    in_flight: watch::Sender<bool>,
}

impl RevealSession {
    fn new(widget: ScratchReveal) -> Self {
        let (in_flight, _) = watch::channel(false);
        Self {
            widget: Mutex::new(widget),
            fetch: std::sync::Mutex::new(None),
            in_flight,
        }
    }

    async fn view(&self) -> RevealView {
        self.widget.lock().await.view(Instant::now())
    }

    /// Track a new fetch, aborting the one it replaces
    fn track_fetch(&self, handle: AbortHandle) {
        match self.fetch.lock() {
            Ok(mut slot) => {
                if let Some(previous) = slot.replace(handle) {
                    previous.abort();
                }
            }
            Err(_) => warn!("Reveal fetch slot poisoned; fetch left untracked"),
        }
    }

    /// Abort the outstanding fetch and release anyone waiting on it
    fn abandon_fetch(&self) {
        if let Ok(mut slot) = self.fetch.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
        self.in_flight.send_replace(false);
    }
}

/// All live reveal sessions
pub struct RevealSessions {
    sessions: Cache<Uuid, Arc<RevealSession>>,
    flow: Arc<DiscountFlow>,
    geometry: RevealConfig,
}

impl RevealSessions {
    pub fn new(flow: Arc<DiscountFlow>, config: RevealConfig) -> Self {
        let idle = config.idle_timeout();
        Self::build(flow, config, idle)
    }

    fn build(flow: Arc<DiscountFlow>, geometry: RevealConfig, idle: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(geometry.max_sessions)
            .time_to_idle(idle)
            .eviction_listener(
                |id: Arc<Uuid>, session: Arc<RevealSession>, cause: RemovalCause| {
                    session.abandon_fetch();
                    debug!("Reveal session {} dropped ({:?})", id, cause);
                },
            )
            .build();

        Self {
            sessions,
            flow,
            geometry,
        }
    }

    /// Number of live sessions, after pending evictions have run
    pub async fn live_count(&self) -> u64 {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count()
    }

    pub async fn create(&self) -> SessionView {
        let mask = RasterMask::new(self.geometry.width, self.geometry.height);
        let widget = ScratchReveal::new(mask).with_brush_radius(self.geometry.brush_radius);
        let session = Arc::new(RevealSession::new(widget));

        let id = Uuid::new_v4();
        let view = session.view().await;
        self.sessions.insert(id, session).await;

        info!("Opened reveal session {}", id);
        SessionView { id, view }
    }

    pub async fn view(&self, id: Uuid) -> Result<SessionView, ServerError> {
        let session = self.session(id).await?;
        Ok(SessionView {
            id,
            view: session.view().await,
        })
    }

    /// Drop a session, abandoning any fetch in flight
    pub async fn remove(&self, id: Uuid) -> Result<(), ServerError> {
        let session = self
            .sessions
            .remove(&id)
            .await
            .ok_or_else(|| not_found(id))?;

        session.abandon_fetch();
        info!("Closed reveal session {}", id);
        Ok(())
    }

    pub async fn pointer(
        &self,
        id: Uuid,
        events: &[PointerEvent],
    ) -> Result<SessionView, ServerError> {
        let session = self.session(id).await?;
        let effects: Vec<Effect> = {
            let mut widget = session.widget.lock().await;
            events.iter().filter_map(|e| widget.handle(*e)).collect()
        };
        self.run_effects(&session, effects);
        self.view(id).await
    }

    pub async fn reveal(&self, id: Uuid) -> Result<SessionView, ServerError> {
        let session = self.session(id).await?;
        let effect = session.widget.lock().await.reveal_instantly();
        self.run_effects(&session, effect);
        self.view(id).await
    }

    pub async fn retry(&self, id: Uuid) -> Result<SessionView, ServerError> {
        let session = self.session(id).await?;
        let effect = session.widget.lock().await.retry();
        self.run_effects(&session, effect);
        self.view(id).await
    }

    pub async fn copy(&self, id: Uuid) -> Result<CopyOutcome, ServerError> {
        let session = self.session(id).await?;
        let mut clipboard = MemoryClipboard::new();
        let code = session
            .widget
            .lock()
            .await
            .copy_code(Instant::now(), &mut clipboard);

        Ok(CopyOutcome {
            copied: code.is_some(),
            code,
        })
    }

    /// Wait until no fetch is outstanding
    ///
    /// Any number of callers may wait at once. Removing the session releases
    /// them.
    pub async fn settle(&self, id: Uuid) -> Result<(), ServerError> {
        let session = self.session(id).await?;
        let mut in_flight = session.in_flight.subscribe();
        in_flight
            .wait_for(|pending| !*pending)
            .await
            .map_err(|e| ServerError::InternalError(format!("Discount fetch lost: {}", e)))?;
        Ok(())
    }

    async fn session(&self, id: Uuid) -> Result<Arc<RevealSession>, ServerError> {
        self.sessions.get(&id).await.ok_or_else(|| not_found(id))
    }

    fn run_effects(
        &self,
        session: &Arc<RevealSession>,
        effects: impl IntoIterator<Item = Effect>,
    ) {
        for effect in effects {
            match effect {
                Effect::FetchDiscount(ticket) => self.spawn_fetch(session, ticket),
            }
        }
    }

    fn spawn_fetch(&self, session: &Arc<RevealSession>, ticket: FetchTicket) {
        let flow = self.flow.clone();
        let target = session.clone();
        session.in_flight.send_replace(true);

        let handle = tokio::spawn(async move {
            let result = flow.generate().await;
            let mut widget = target.widget.lock().await;
            let applied = widget.resolve(ticket, result);
            // A stale ticket means a newer fetch still owns the flag
            if applied {
                target.in_flight.send_replace(false);
            }
            debug!("Discount fetch {} applied: {}", ticket.id(), applied);
        });

        session.track_fetch(handle.abort_handle());
    }
}

fn not_found(id: Uuid) -> ServerError {
    ServerError::NotFound(format!("reveal session {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use robobox_core::reveal::FlowStatus;
    use robobox_llm::MockProvider;

    const DISCOUNT_REPLY: &str = r#"{"discountCode": "ROBO-WAIT", "discountPercentage": 20}"#;

    fn sessions_with(
        provider: Arc<MockProvider>,
        config: RevealConfig,
        idle: Duration,
    ) -> Arc<RevealSessions> {
        let flow = Arc::new(DiscountFlow::with_defaults(provider));
        Arc::new(RevealSessions::build(flow, config, idle))
    }

    fn slow_provider(delay: Duration) -> Arc<MockProvider> {
        Arc::new(MockProvider::with_response(DISCOUNT_REPLY.to_string()).with_delay(delay))
    }

    #[tokio::test]
    async fn test_concurrent_waiters_both_see_result() {
        let provider = slow_provider(Duration::from_millis(100));
        let sessions = sessions_with(
            provider.clone(),
            RevealConfig::default(),
            Duration::from_secs(60),
        );
        let id = sessions.create().await.id;
        sessions.reveal(id).await.unwrap();

        let waiters: Vec<_> = (0..2)
            .map(|_| {
                let sessions = sessions.clone();
                tokio::spawn(async move {
                    sessions.settle(id).await.unwrap();
                    sessions.view(id).await.unwrap().view.status
                })
            })
            .collect();

        for waiter in waiters {
            let status = waiter.await.unwrap();
            assert!(matches!(status, FlowStatus::Ready { .. }));
        }
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_remove_releases_waiter() {
        let provider = slow_provider(Duration::from_secs(30));
        let sessions = sessions_with(
            provider.clone(),
            RevealConfig::default(),
            Duration::from_secs(60),
        );
        let id = sessions.create().await.id;
        sessions.reveal(id).await.unwrap();

        let waiter = {
            let sessions = sessions.clone();
            tokio::spawn(async move { sessions.settle(id).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        sessions.remove(id).await.unwrap();
        let settled = tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .expect("waiter should be released")
            .unwrap();
        assert!(settled.is_ok());
        assert!(matches!(sessions.view(id).await, Err(ServerError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let provider = slow_provider(Duration::from_secs(30));
        let sessions = sessions_with(
            provider,
            RevealConfig::default(),
            Duration::from_millis(100),
        );

        let idle = sessions.create().await.id;
        let busy = sessions.create().await.id;
        sessions.reveal(busy).await.unwrap();
        let waiter = {
            let sessions = sessions.clone();
            tokio::spawn(async move { sessions.settle(busy).await })
        };
        assert_eq!(sessions.live_count().await, 2);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(matches!(sessions.view(idle).await, Err(ServerError::NotFound(_))));
        assert_eq!(sessions.live_count().await, 0);

        // Eviction abandons the outstanding fetch
        let settled = tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .expect("waiter should be released")
            .unwrap();
        assert!(settled.is_ok());
    }

    #[tokio::test]
    async fn test_session_count_is_bounded() {
        let provider = slow_provider(Duration::from_millis(1));
        let config = RevealConfig {
            max_sessions: 3,
            ..Default::default()
        };
        let sessions = sessions_with(provider, config, Duration::from_secs(60));

        for _ in 0..20 {
            sessions.create().await;
        }
        assert!(sessions.live_count().await <= 3);
    }
}
