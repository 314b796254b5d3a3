//! Personalised recommendations: a short, unpaged list shown with the same
//! cards as the listing.

use std::sync::Arc;

use shared::{domain::Internship, protocol::RecommendationsResponse};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    controller::{FetchOutcome, ListEvent, ListSettings},
    error::ClientError,
    notice::{Notice, NoticeKind, NoticeSlot},
    render::{render_page, RenderedPage},
    types::{LoadState, PageState},
    RecommendationsApi,
};

#[derive(Debug, Clone)]
pub struct RecommendationsSnapshot {
    pub items: Vec<Internship>,
    pub load: LoadState,
    pub rendered: Option<RenderedPage>,
    pub updated_at: Option<String>,
    pub notice: Option<Notice>,
}

struct RecommendationsState {
    items: Vec<Internship>,
    load: LoadState,
    rendered: Option<RenderedPage>,
    updated_at: Option<String>,
    notices: NoticeSlot,
    latest_request: u64,
}

pub struct RecommendationsController {
    api: Arc<dyn RecommendationsApi>,
    settings: ListSettings,
    inner: Mutex<RecommendationsState>,
    events: broadcast::Sender<ListEvent>,
}

impl RecommendationsController {
    /// Only the notice ttls of `settings` apply; recommendations are not paged.
    pub fn new(api: Arc<dyn RecommendationsApi>, settings: ListSettings) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            api,
            settings,
            inner: Mutex::new(RecommendationsState {
                items: Vec::new(),
                load: LoadState::Idle,
                rendered: None,
                updated_at: None,
                notices: NoticeSlot::default(),
                latest_request: 0,
            }),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> RecommendationsSnapshot {
        let guard = self.inner.lock().await;
        RecommendationsSnapshot {
            items: guard.items.clone(),
            load: guard.load.clone(),
            rendered: guard.rendered.clone(),
            updated_at: guard.updated_at.clone(),
            notice: guard.notices.current().cloned(),
        }
    }

    fn emit(&self, event: ListEvent) {
        let _ = self.events.send(event);
    }

    /// Shows the stored recommendations. When the backend has none stored
    /// (any non-success status), a generation run without force refresh
    /// takes its place.
    pub async fn load(self: &Arc<Self>) -> FetchOutcome {
        let seq = self.begin().await;
        let result = match self.api.stored().await {
            Err(err @ ClientError::Status { .. }) => {
                debug!("listing: no stored recommendations ({err}), generating");
                self.api.generate(false).await
            }
            other => other,
        };
        self.apply(seq, result, "Failed to load recommendations", None)
            .await
    }

    /// Regenerates recommendations, bypassing any cached result.
    pub async fn refresh(self: &Arc<Self>) -> FetchOutcome {
        let seq = self.begin().await;
        let result = self.api.generate(true).await;
        self.apply(
            seq,
            result,
            "Failed to refresh recommendations",
            Some("Recommendations updated successfully!"),
        )
        .await
    }

    async fn begin(&self) -> u64 {
        let seq = {
            let mut guard = self.inner.lock().await;
            guard.latest_request += 1;
            guard.load = LoadState::Loading;
            guard.latest_request
        };
        self.emit(ListEvent::LoadStateChanged(LoadState::Loading));
        seq
    }

    async fn apply(
        self: &Arc<Self>,
        seq: u64,
        result: Result<RecommendationsResponse, ClientError>,
        failure: &str,
        success: Option<&str>,
    ) -> FetchOutcome {
        let mut guard = self.inner.lock().await;
        if seq != guard.latest_request {
            debug!("listing: dropping superseded recommendations response seq={seq}");
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(response) => {
                guard.items = response.detailed_internships;
                guard.updated_at = response.updated_at;
                let rendered = render_page(&guard.items, &PageState::default());
                guard.rendered = Some(rendered.clone());
                guard.load = LoadState::Loaded;
                info!("listing: showing {} recommendations", guard.items.len());
                drop(guard);

                self.emit(ListEvent::LoadStateChanged(LoadState::Loaded));
                self.emit(ListEvent::PageRendered(rendered));
                if let Some(message) = success {
                    self.show_notice(NoticeKind::Success, message).await;
                }
                FetchOutcome::Applied
            }
            Err(err) => {
                warn!("listing: recommendations request failed: {err}");
                let message = err.user_message(failure);
                guard.items.clear();
                guard.rendered = None;
                guard.load = LoadState::Error(message.clone());
                drop(guard);

                self.emit(ListEvent::LoadStateChanged(LoadState::Error(message.clone())));
                self.show_notice(NoticeKind::Error, message).await;
                FetchOutcome::Failed
            }
        }
    }

    async fn show_notice(self: &Arc<Self>, kind: NoticeKind, message: impl Into<String>) {
        let ttl = match kind {
            NoticeKind::Success => self.settings.success_notice_ttl,
            NoticeKind::Error => self.settings.error_notice_ttl,
        };
        let notice = self
            .inner
            .lock()
            .await
            .notices
            .post(kind, message.into(), ttl);
        self.emit(ListEvent::Notice(notice.clone()));

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            controller.dismiss_notice(notice.id).await;
        });
    }

    pub async fn dismiss_notice(&self, id: u64) -> bool {
        let dismissed = self.inner.lock().await.notices.dismiss(id);
        if dismissed {
            self.emit(ListEvent::NoticeDismissed(id));
        }
        dismissed
    }
}

#[cfg(test)]
#[path = "tests/recommendations_tests.rs"]
mod tests;
