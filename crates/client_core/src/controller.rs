use std::{sync::Arc, time::Duration};

use shared::{
    domain::{Internship, InternshipId},
    protocol::FilterOptions,
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    error::ClientError,
    form::{payload_from_form, FormState},
    notice::{Notice, NoticeKind, NoticeSlot},
    render::{render_page, RenderedPage},
    types::{FilterKey, FilterState, LoadState, PageState, DEFAULT_PER_PAGE},
    ListingApi,
};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
pub const ERROR_NOTICE_TTL: Duration = Duration::from_secs(5);
pub const SUCCESS_NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct ListSettings {
    pub per_page: u32,
    pub search_debounce: Duration,
    pub error_notice_ttl: Duration,
    pub success_notice_ttl: Duration,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            search_debounce: SEARCH_DEBOUNCE,
            error_notice_ttl: ERROR_NOTICE_TTL,
            success_notice_ttl: SUCCESS_NOTICE_TTL,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ListEvent {
    LoadStateChanged(LoadState),
    PageRendered(RenderedPage),
    FacetsLoaded(FilterOptions),
    Notice(Notice),
    NoticeDismissed(u64),
    EditOpened { id: InternshipId, form: FormState },
    EditClosed,
    DeleteConfirmOpened(InternshipId),
    DeleteConfirmClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch was issued while this one was in flight; its response
    /// was dropped.
    Superseded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub id: InternshipId,
    pub form: FormState,
}

#[derive(Debug, Clone)]
pub struct ListSnapshot {
    pub filters: FilterState,
    pub page: PageState,
    pub items: Vec<Internship>,
    pub load: LoadState,
    pub rendered: Option<RenderedPage>,
    pub facets: FilterOptions,
    pub edit: Option<EditSession>,
    pub pending_delete: Option<InternshipId>,
    pub notice: Option<Notice>,
}

struct ListState {
    filters: FilterState,
    page: PageState,
    items: Vec<Internship>,
    load: LoadState,
    rendered: Option<RenderedPage>,
    facets: FilterOptions,
    edit: Option<EditSession>,
    pending_delete: Option<InternshipId>,
    notices: NoticeSlot,
    latest_fetch: u64,
}

/// Keeps one page of a remote, filtered listing collection in sync with the
/// local view and runs the edit/delete/create flows against it.
///
/// Every mutation is reconciled by re-fetching the current page; the local
/// result set is never patched in place.
pub struct ListController {
    api: Arc<dyn ListingApi>,
    settings: ListSettings,
    inner: Mutex<ListState>,
    search_debounce: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<ListEvent>,
}

impl ListController {
    pub fn new(api: Arc<dyn ListingApi>, settings: ListSettings) -> Arc<Self> {
        Self::with_filters(api, settings, FilterState::default())
    }

    /// Starts from already-known filters, e.g. ones restored from a saved
    /// query. Nothing is fetched until [`ListController::mount`].
    pub fn with_filters(
        api: Arc<dyn ListingApi>,
        settings: ListSettings,
        filters: FilterState,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        let page = PageState::new(settings.per_page);
        Arc::new(Self {
            api,
            settings,
            inner: Mutex::new(ListState {
                filters,
                page,
                items: Vec::new(),
                load: LoadState::Idle,
                rendered: None,
                facets: FilterOptions::default(),
                edit: None,
                pending_delete: None,
                notices: NoticeSlot::default(),
                latest_fetch: 0,
            }),
            search_debounce: Mutex::new(None),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        let guard = self.inner.lock().await;
        ListSnapshot {
            filters: guard.filters.clone(),
            page: guard.page,
            items: guard.items.clone(),
            load: guard.load.clone(),
            rendered: guard.rendered.clone(),
            facets: guard.facets.clone(),
            edit: guard.edit.clone(),
            pending_delete: guard.pending_delete,
            notice: guard.notices.current().cloned(),
        }
    }

    fn emit(&self, event: ListEvent) {
        let _ = self.events.send(event);
    }

    /// Loads the facet options and the first page.
    pub async fn mount(self: &Arc<Self>) -> FetchOutcome {
        self.load_filter_options().await;
        self.fetch().await
    }

    pub async fn load_filter_options(self: &Arc<Self>) -> bool {
        match self.api.filter_options().await {
            Ok(options) => {
                self.inner.lock().await.facets = options.clone();
                self.emit(ListEvent::FacetsLoaded(options));
                true
            }
            Err(err) => {
                warn!("listing: failed to load filter options: {err}");
                self.show_notice(
                    NoticeKind::Error,
                    err.user_message("Failed to load filter options"),
                )
                .await;
                false
            }
        }
    }

    /// Updates one filter and goes back to the first page. Search text is
    /// debounced and the returned value is `None`; facet changes fetch right
    /// away.
    pub async fn set_filter(self: &Arc<Self>, key: FilterKey, value: &str) -> Option<FetchOutcome> {
        {
            let mut guard = self.inner.lock().await;
            guard.filters.set(key, value);
            guard.page.reset();
        }

        if key.is_debounced() {
            self.schedule_search().await;
            return None;
        }

        // The immediate fetch already carries the latest search text.
        self.cancel_pending_search().await;
        Some(self.fetch().await)
    }

    async fn schedule_search(self: &Arc<Self>) {
        let controller = Arc::clone(self);
        let delay = self.settings.search_debounce;

        let mut pending = self.search_debounce.lock().await;
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            controller.search_debounce.lock().await.take();
            controller.fetch().await;
        }));
    }

    async fn cancel_pending_search(&self) {
        if let Some(pending) = self.search_debounce.lock().await.take() {
            pending.abort();
        }
    }

    /// Moves `delta` pages. Does nothing and returns `None` when the target
    /// page is outside `[1, total_pages]`.
    pub async fn go_to_page(self: &Arc<Self>, delta: i64) -> Option<FetchOutcome> {
        {
            let mut guard = self.inner.lock().await;
            let Some(target) = guard.page.offset(delta) else {
                debug!(
                    "listing: ignoring page move delta={delta} current={} total={}",
                    guard.page.current_page, guard.page.total_pages
                );
                return None;
            };
            guard.page.current_page = target;
        }
        Some(self.fetch().await)
    }

    pub async fn clear_filters(self: &Arc<Self>) -> FetchOutcome {
        self.cancel_pending_search().await;
        {
            let mut guard = self.inner.lock().await;
            guard.filters.clear();
            guard.page.reset();
        }
        self.fetch().await
    }

    /// Fetches the page described by the current filters.
    ///
    /// Each call takes a new sequence number; a response is applied only if
    /// no newer fetch was started while it was in flight.
    pub async fn fetch(self: &Arc<Self>) -> FetchOutcome {
        let (seq, query) = {
            let mut guard = self.inner.lock().await;
            guard.latest_fetch += 1;
            guard.load = LoadState::Loading;
            (guard.latest_fetch, guard.filters.to_query(&guard.page))
        };
        self.emit(ListEvent::LoadStateChanged(LoadState::Loading));

        let result = self.api.search(&query).await;

        let mut guard = self.inner.lock().await;
        if seq != guard.latest_fetch {
            debug!(
                "listing: dropping response of superseded fetch seq={seq} latest={}",
                guard.latest_fetch
            );
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(response) => {
                let meta = response.effective_pagination();
                guard.items = response.items;
                guard.page.apply(meta);
                let rendered = render_page(&guard.items, &guard.page);
                guard.rendered = Some(rendered.clone());
                guard.load = LoadState::Loaded;
                debug!(
                    "listing: loaded {} items page={} of {}",
                    guard.items.len(),
                    guard.page.current_page,
                    guard.page.total_pages
                );
                drop(guard);

                self.emit(ListEvent::LoadStateChanged(LoadState::Loaded));
                self.emit(ListEvent::PageRendered(rendered));
                FetchOutcome::Applied
            }
            Err(err) => {
                warn!("listing: fetch failed: {err}");
                let message = err.user_message("Failed to load internships");
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

    /// Loads the full record and opens it in the edit form.
    pub async fn request_edit(self: &Arc<Self>, id: InternshipId) -> Result<(), ClientError> {
        let item = match self.api.fetch_item(id).await {
            Ok(item) => item,
            Err(err) => {
                warn!("listing: failed to load internship {id} for edit: {err}");
                self.show_notice(
                    NoticeKind::Error,
                    err.user_message("Failed to load internship details"),
                )
                .await;
                return Err(err);
            }
        };

        let form = FormState::for_item(&item);
        self.inner.lock().await.edit = Some(EditSession {
            id,
            form: form.clone(),
        });
        self.emit(ListEvent::EditOpened { id, form });
        Ok(())
    }

    pub async fn set_edit_field(&self, name: &str, value: &str) -> bool {
        let mut guard = self.inner.lock().await;
        match guard.edit.as_mut() {
            Some(session) => session.form.set(name, value),
            None => false,
        }
    }

    pub async fn close_edit(&self) {
        if self.inner.lock().await.edit.take().is_some() {
            self.emit(ListEvent::EditClosed);
        }
    }

    /// Validates and sends the open edit form. The form stays open on any
    /// failure so the user can correct it and retry.
    pub async fn submit_edit(self: &Arc<Self>) -> Result<(), ClientError> {
        let Some(session) = self.inner.lock().await.edit.clone() else {
            debug!("listing: submit_edit without an open edit form");
            return Ok(());
        };

        let payload = match payload_from_form(&session.form) {
            Ok(payload) => payload,
            Err(err) => {
                self.show_notice(NoticeKind::Error, err.user_message("Invalid form"))
                    .await;
                return Err(err);
            }
        };

        if let Err(err) = self.api.update_item(session.id, &payload).await {
            warn!("listing: failed to update internship {}: {err}", session.id);
            self.show_notice(
                NoticeKind::Error,
                err.user_message("Failed to update internship"),
            )
            .await;
            return Err(err);
        }

        info!("listing: updated internship {}", session.id);
        let closed = {
            let mut guard = self.inner.lock().await;
            let same_session = guard.edit.as_ref().is_some_and(|open| open.id == session.id);
            if same_session {
                guard.edit = None;
            }
            same_session
        };
        // A different record may have been opened while the update was in flight.
        if closed {
            self.emit(ListEvent::EditClosed);
        }
        self.show_notice(NoticeKind::Success, "Internship updated successfully!")
            .await;
        self.fetch().await;
        Ok(())
    }

    /// Opens the delete confirmation for `id`; nothing is sent yet.
    pub async fn request_delete(&self, id: InternshipId) {
        self.inner.lock().await.pending_delete = Some(id);
        self.emit(ListEvent::DeleteConfirmOpened(id));
    }

    pub async fn cancel_delete(&self) {
        if self.inner.lock().await.pending_delete.take().is_some() {
            self.emit(ListEvent::DeleteConfirmClosed);
        }
    }

    /// Deletes the pending candidate. On failure the confirmation stays open
    /// with the same candidate.
    pub async fn confirm_delete(self: &Arc<Self>) -> Result<(), ClientError> {
        let Some(id) = self.inner.lock().await.pending_delete else {
            debug!("listing: confirm_delete without a pending candidate");
            return Ok(());
        };

        if let Err(err) = self.api.delete_item(id).await {
            warn!("listing: failed to delete internship {id}: {err}");
            self.show_notice(
                NoticeKind::Error,
                err.user_message("Failed to delete internship"),
            )
            .await;
            return Err(err);
        }

        info!("listing: deleted internship {id}");
        let closed = {
            let mut guard = self.inner.lock().await;
            let same_candidate = guard.pending_delete == Some(id);
            if same_candidate {
                guard.pending_delete = None;
            }
            same_candidate
        };
        if closed {
            self.emit(ListEvent::DeleteConfirmClosed);
        }
        self.show_notice(NoticeKind::Success, "Internship deleted successfully!")
            .await;
        self.fetch().await;
        Ok(())
    }

    /// Validates and posts a new listing, then refreshes the current page.
    pub async fn create(self: &Arc<Self>, form: &FormState) -> Result<Option<Internship>, ClientError> {
        let payload = match payload_from_form(form) {
            Ok(payload) => payload,
            Err(err) => {
                self.show_notice(NoticeKind::Error, err.user_message("Invalid form"))
                    .await;
                return Err(err);
            }
        };

        let response = match self.api.create_item(&payload).await {
            Ok(response) => response,
            Err(err) => {
                warn!("listing: failed to create internship: {err}");
                self.show_notice(
                    NoticeKind::Error,
                    err.user_message("Failed to create internship"),
                )
                .await;
                return Err(err);
            }
        };

        info!(
            "listing: created internship {}",
            response
                .item
                .as_ref()
                .map(|item| item.internship_id.to_string())
                .unwrap_or_else(|| "?".to_string())
        );
        self.show_notice(NoticeKind::Success, "Internship created successfully!")
            .await;
        self.fetch().await;
        Ok(response.item)
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

    /// Hides the notice with `id` if it is still the one on screen.
    pub async fn dismiss_notice(&self, id: u64) -> bool {
        let dismissed = self.inner.lock().await.notices.dismiss(id);
        if dismissed {
            self.emit(ListEvent::NoticeDismissed(id));
        }
        dismissed
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
