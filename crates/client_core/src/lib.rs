use async_trait::async_trait;
use shared::{
    domain::{Internship, InternshipId},
    protocol::{
        FilterOptions, InternshipPayload, ListQuery, ListResponse, MutationResponse,
        RecommendationsResponse,
    },
};

pub mod controller;
pub mod error;
pub mod form;
pub mod notice;
pub mod recommendations;
pub mod render;
pub mod transport;
pub mod types;

pub use controller::{EditSession, FetchOutcome, ListController, ListEvent, ListSettings, ListSnapshot};
pub use error::ClientError;
pub use form::FormState;
pub use recommendations::{RecommendationsController, RecommendationsSnapshot};
pub use transport::{HttpListingApi, HttpRecommendationsApi};
pub use types::{FilterKey, FilterState, LoadState, PageState};

/// Backend operations the list controller depends on.
///
/// Implementations report the three failure shapes separately: transport
/// problems, non-success HTTP statuses, and envelopes with `success: false`.
#[async_trait]
pub trait ListingApi: Send + Sync {
    async fn search(&self, query: &ListQuery) -> Result<ListResponse, ClientError>;
    async fn filter_options(&self) -> Result<FilterOptions, ClientError>;
    async fn fetch_item(&self, id: InternshipId) -> Result<Internship, ClientError>;
    async fn create_item(&self, payload: &InternshipPayload)
        -> Result<MutationResponse, ClientError>;
    async fn update_item(
        &self,
        id: InternshipId,
        payload: &InternshipPayload,
    ) -> Result<MutationResponse, ClientError>;
    async fn delete_item(&self, id: InternshipId) -> Result<MutationResponse, ClientError>;
}

/// Personalised recommendations for the signed-in user.
#[async_trait]
pub trait RecommendationsApi: Send + Sync {
    /// Recommendations saved by an earlier generation run.
    async fn stored(&self) -> Result<RecommendationsResponse, ClientError>;
    async fn generate(&self, force_refresh: bool) -> Result<RecommendationsResponse, ClientError>;
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod http_tests;
