use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, COOKIE},
    Client, RequestBuilder,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::{Internship, InternshipId},
    error::{envelope_success, ApiFailure},
    protocol::{
        FilterOptions, FiltersResponse, GenerateRecommendationsRequest, InternshipPayload,
        ItemResponse, ListQuery, ListResponse, MutationResponse, RecommendationsResponse,
    },
};
use tracing::{debug, warn};
use url::Url;

use crate::{error::ClientError, ListingApi, RecommendationsApi};

/// Client with the session cookie, if any, sent on every request. The cookie
/// jar also keeps whatever the backend sets.
fn session_client(session_cookie: Option<&str>) -> Result<Client, ClientError> {
    let mut headers = HeaderMap::new();
    if let Some(cookie) = session_cookie.filter(|c| !c.trim().is_empty()) {
        let value = HeaderValue::from_str(cookie).map_err(|_| ClientError::InvalidSessionCookie)?;
        headers.insert(COOKIE, value);
    }

    Ok(Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .build()?)
}

/// Sends a request and unwraps the `{ success, ... }` envelope.
async fn send(request: RequestBuilder) -> Result<Value, ClientError> {
    let response = request.send().await?;
    let status = response.status();

    let body = match response.json::<Value>().await {
        Ok(body) => body,
        Err(_) if !status.is_success() => Value::Null,
        Err(err) => return Err(err.into()),
    };

    if !status.is_success() {
        warn!("listing: backend returned status {status}");
        return Err(ClientError::Status {
            status: status.as_u16(),
            failure: ApiFailure::from_body(&body),
        });
    }

    if !envelope_success(&body) {
        return Err(ClientError::Application(ApiFailure::from_body(&body)));
    }

    Ok(body)
}

/// `ListingApi` over the backend's JSON endpoints.
///
/// All endpoints hang off one collection url, e.g.
/// `http://localhost:5001/api/internships` or `.../api/company/internships`.
pub struct HttpListingApi {
    http: Client,
    collection_url: String,
}

impl HttpListingApi {
    pub fn new(
        base_url: &str,
        collection_path: &str,
        session_cookie: Option<&str>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            http: session_client(session_cookie)?,
            collection_url: join_url(base_url, collection_path)?,
        })
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    fn item_url(&self, id: InternshipId) -> String {
        format!("{}/{}", self.collection_url, id.0)
    }
}

/// `RecommendationsApi` over `{api}/get_recommendations` and
/// `{api}/generate_recommendations`.
pub struct HttpRecommendationsApi {
    http: Client,
    api_url: String,
}

impl HttpRecommendationsApi {
    pub fn new(
        base_url: &str,
        api_path: &str,
        session_cookie: Option<&str>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            http: session_client(session_cookie)?,
            api_url: join_url(base_url, api_path)?,
        })
    }
}

#[async_trait]
impl RecommendationsApi for HttpRecommendationsApi {
    async fn stored(&self) -> Result<RecommendationsResponse, ClientError> {
        let body = send(self.http.get(format!("{}/get_recommendations", self.api_url))).await?;
        decode(body)
    }

    async fn generate(&self, force_refresh: bool) -> Result<RecommendationsResponse, ClientError> {
        debug!("listing: generating recommendations force_refresh={force_refresh}");
        let body = send(
            self.http
                .post(format!("{}/generate_recommendations", self.api_url))
                .json(&GenerateRecommendationsRequest { force_refresh }),
        )
        .await?;
        decode(body)
    }
}

/// Appends `path` to the base url's own path, so a backend mounted under a
/// prefix keeps it.
fn join_url(base_url: &str, path: &str) -> Result<String, ClientError> {
    let invalid = |reason: String| ClientError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    let mut url = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }

    let prefix = url.path().trim_end_matches('/').to_string();
    let path = path.trim().trim_matches('/');
    url.set_path(&format!("{prefix}/{path}"));
    url.set_query(None);
    url.set_fragment(None);

    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ClientError> {
    serde_json::from_value(body).map_err(|e| ClientError::Malformed(e.to_string()))
}

#[async_trait]
impl ListingApi for HttpListingApi {
    async fn search(&self, query: &ListQuery) -> Result<ListResponse, ClientError> {
        let url = if query.is_search() {
            format!("{}/search", self.collection_url)
        } else {
            self.collection_url.clone()
        };
        debug!(
            "listing: GET {url} page={} per_page={}",
            query.page, query.per_page
        );
        let body = send(self.http.get(url).query(query)).await?;
        decode(body)
    }

    async fn filter_options(&self) -> Result<FilterOptions, ClientError> {
        let body = send(self.http.get(format!("{}/filters", self.collection_url))).await?;
        let response: FiltersResponse = decode(body)?;
        Ok(response.filters)
    }

    async fn fetch_item(&self, id: InternshipId) -> Result<Internship, ClientError> {
        let body = send(self.http.get(self.item_url(id))).await?;
        let response: ItemResponse = decode(body)?;
        Ok(response.item)
    }

    async fn create_item(
        &self,
        payload: &InternshipPayload,
    ) -> Result<MutationResponse, ClientError> {
        let body = send(self.http.post(&self.collection_url).json(payload)).await?;
        decode(body)
    }

    async fn update_item(
        &self,
        id: InternshipId,
        payload: &InternshipPayload,
    ) -> Result<MutationResponse, ClientError> {
        let body = send(self.http.put(self.item_url(id)).json(payload)).await?;
        decode(body)
    }

    async fn delete_item(&self, id: InternshipId) -> Result<MutationResponse, ClientError> {
        let body = send(self.http.delete(self.item_url(id))).await?;
        decode(body)
    }
}

#[cfg(test)]
mod tests {
    use super::join_url;

    #[test]
    fn appends_collection_path_to_base() {
        assert_eq!(
            join_url("http://localhost:5001", "/api/internships").expect("url"),
            "http://localhost:5001/api/internships"
        );
        assert_eq!(
            join_url("http://localhost:5001/", "api/company/internships/").expect("url"),
            "http://localhost:5001/api/company/internships"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        assert_eq!(
            join_url("https://example.com/portal/", "/api/internships").expect("url"),
            "https://example.com/portal/api/internships"
        );
        assert_eq!(
            join_url("https://example.com/portal?x=1", "api").expect("url"),
            "https://example.com/portal/api"
        );
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(join_url("ftp://example.com", "/api/internships").is_err());
        assert!(join_url("not a url", "/api/internships").is_err());
    }
}
