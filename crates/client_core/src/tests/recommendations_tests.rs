use super::*;
use async_trait::async_trait;
use shared::{domain::InternshipId, error::ApiFailure};
use std::{collections::VecDeque, sync::Mutex as StdMutex, time::Duration};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Stored,
    Generate { force_refresh: bool },
}

enum Reply {
    Items(Vec<i64>),
    Status(u16, &'static str),
    Application(&'static str),
}

impl Reply {
    fn into_result(self) -> Result<RecommendationsResponse, ClientError> {
        match self {
            Self::Items(ids) => Ok(RecommendationsResponse {
                recommendations: ids.iter().copied().map(InternshipId).collect(),
                detailed_internships: ids.into_iter().map(recommended).collect(),
                updated_at: Some("2024-03-01T09:00:00".into()),
            }),
            Self::Status(status, message) => Err(ClientError::Status {
                status,
                failure: ApiFailure::new(message),
            }),
            Self::Application(message) => Err(ClientError::application(message)),
        }
    }
}

#[derive(Default)]
struct FakeRecommendations {
    calls: StdMutex<Vec<Call>>,
    stored: StdMutex<VecDeque<Reply>>,
    generated: StdMutex<VecDeque<Reply>>,
}

impl FakeRecommendations {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn on_stored(&self, reply: Reply) {
        self.stored.lock().expect("stored").push_back(reply);
    }

    fn on_generate(&self, reply: Reply) {
        self.generated.lock().expect("generated").push_back(reply);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls").clone()
    }
}

#[async_trait]
impl RecommendationsApi for FakeRecommendations {
    async fn stored(&self) -> Result<RecommendationsResponse, ClientError> {
        self.calls.lock().expect("calls").push(Call::Stored);
        let reply = self.stored.lock().expect("stored").pop_front();
        reply.unwrap_or(Reply::Items(Vec::new())).into_result()
    }

    async fn generate(&self, force_refresh: bool) -> Result<RecommendationsResponse, ClientError> {
        self.calls
            .lock()
            .expect("calls")
            .push(Call::Generate { force_refresh });
        let reply = self.generated.lock().expect("generated").pop_front();
        reply.unwrap_or(Reply::Items(Vec::new())).into_result()
    }
}

fn recommended(id: i64) -> Internship {
    Internship {
        internship_id: InternshipId(id),
        internship_title: Some(format!("Recommended {id}")),
        company_name: Some("Acme".into()),
        location_type: Some("Hybrid".into()),
        ..Internship::default()
    }
}

fn controller(api: &Arc<FakeRecommendations>) -> Arc<RecommendationsController> {
    RecommendationsController::new(api.clone(), ListSettings::default())
}

fn ids(snapshot: &RecommendationsSnapshot) -> Vec<i64> {
    snapshot
        .items
        .iter()
        .map(|item| item.internship_id.0)
        .collect()
}

#[tokio::test]
async fn stored_recommendations_render_as_cards() {
    let api = FakeRecommendations::new();
    api.on_stored(Reply::Items(vec![3, 1]));
    let recommendations = controller(&api);

    assert_eq!(recommendations.load().await, FetchOutcome::Applied);

    let snapshot = recommendations.snapshot().await;
    assert_eq!(api.calls(), vec![Call::Stored]);
    assert_eq!(ids(&snapshot), vec![3, 1]);
    assert_eq!(snapshot.load, LoadState::Loaded);
    assert_eq!(snapshot.updated_at.as_deref(), Some("2024-03-01T09:00:00"));
    let rendered = snapshot.rendered.expect("rendered");
    assert_eq!(rendered.cards.len(), 2);
    assert!(rendered.cards[0].contains("Recommended&#32;3"));
    assert!(!rendered.pagination.visible);
    assert!(snapshot.notice.is_none());
}

#[tokio::test]
async fn missing_stored_recommendations_trigger_generation() {
    let api = FakeRecommendations::new();
    api.on_stored(Reply::Status(404, "No recommendations found"));
    api.on_generate(Reply::Items(vec![7]));
    let recommendations = controller(&api);

    assert_eq!(recommendations.load().await, FetchOutcome::Applied);

    assert_eq!(
        api.calls(),
        vec![Call::Stored, Call::Generate { force_refresh: false }]
    );
    let snapshot = recommendations.snapshot().await;
    assert_eq!(ids(&snapshot), vec![7]);
    assert!(snapshot.notice.is_none());
}

#[tokio::test]
async fn unsuccessful_envelope_is_reported_without_generating() {
    let api = FakeRecommendations::new();
    api.on_stored(Reply::Application("Session expired"));
    let recommendations = controller(&api);

    assert_eq!(recommendations.load().await, FetchOutcome::Failed);

    assert_eq!(api.calls(), vec![Call::Stored]);
    let snapshot = recommendations.snapshot().await;
    assert_eq!(snapshot.load, LoadState::Error("Session expired".into()));
    let notice = snapshot.notice.expect("notice");
    assert!(notice.is_error());
    assert_eq!(notice.message, "Session expired");
}

#[tokio::test]
async fn failed_generation_clears_previous_cards() {
    let api = FakeRecommendations::new();
    api.on_stored(Reply::Items(vec![1, 2]));
    let recommendations = controller(&api);
    recommendations.load().await;

    api.on_stored(Reply::Status(404, "No recommendations found"));
    api.on_generate(Reply::Status(503, "Recommendation engine unavailable"));
    assert_eq!(recommendations.load().await, FetchOutcome::Failed);

    let snapshot = recommendations.snapshot().await;
    assert!(snapshot.items.is_empty());
    assert!(snapshot.rendered.is_none());
    assert_eq!(
        snapshot.load,
        LoadState::Error("Recommendation engine unavailable (HTTP 503)".into())
    );
}

#[tokio::test]
async fn empty_recommendations_show_the_empty_state() {
    let api = FakeRecommendations::new();
    let recommendations = controller(&api);

    recommendations.load().await;

    let rendered = recommendations.snapshot().await.rendered.expect("rendered");
    assert!(rendered.empty_state);
    assert!(rendered.cards.is_empty());
}

#[tokio::test(start_paused = true)]
async fn refresh_forces_generation_and_confirms() {
    let api = FakeRecommendations::new();
    api.on_generate(Reply::Items(vec![4, 5, 6]));
    let recommendations = controller(&api);
    let mut events = recommendations.subscribe();

    assert_eq!(recommendations.refresh().await, FetchOutcome::Applied);

    assert_eq!(api.calls(), vec![Call::Generate { force_refresh: true }]);
    let notice = recommendations.snapshot().await.notice.expect("notice");
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.message, "Recommendations updated successfully!");

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(matches!(seen[0], ListEvent::LoadStateChanged(LoadState::Loading)));
    assert!(seen
        .iter()
        .any(|event| matches!(event, ListEvent::PageRendered(page) if page.cards.len() == 3)));

    tokio::time::sleep(Duration::from_millis(3_100)).await;
    assert!(recommendations.snapshot().await.notice.is_none());
}

#[tokio::test]
async fn failed_refresh_uses_fallback_message_for_bare_status() {
    let api = FakeRecommendations::new();
    api.on_generate(Reply::Status(500, ""));
    let recommendations = controller(&api);

    assert_eq!(recommendations.refresh().await, FetchOutcome::Failed);

    let notice = recommendations.snapshot().await.notice.expect("notice");
    assert!(notice.is_error());
    assert_eq!(notice.message, "Failed to refresh recommendations (HTTP 500)");
}
