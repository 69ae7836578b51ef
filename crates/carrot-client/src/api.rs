use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use carrot_core::favorites::ListingDirectory;
use carrot_types::api::{
    CommentRequest, ErrorBody, ExistingListingsRequest, ExistingListingsResponse, ListingForm,
    ListingQuery, LocationGroups, LoginRequest, LoginResponse, MAX_EXISTENCE_IDS,
    MyListingsResponse, SignupRequest, UpdateProfileRequest,
};
use carrot_types::models::{CommentWithAuthor, Listing, ListingWithSeller, User};

use crate::error::ClientError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Typed wrapper over the marketplace REST API.
#[derive(Clone)]
pub struct MarketClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl MarketClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    // -- Auth --

    pub async fn signup(&self, req: &SignupRequest) -> Result<User, ClientError> {
        self.send(self.http.post(self.url("/auth/signup")).json(req)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send(self.http.post(self.url("/auth/login")).json(&req)).await
    }

    pub async fn me(&self) -> Result<User, ClientError> {
        self.send(self.authed(self.http.get(self.url("/auth/me")))).await
    }

    // -- Profile --

    pub async fn user(&self, user_id: &str) -> Result<User, ClientError> {
        self.send(self.http.get(self.url(&format!("/users/{}", user_id)))).await
    }

    pub async fn update_profile(&self, req: &UpdateProfileRequest) -> Result<User, ClientError> {
        self.send(self.authed(self.http.put(self.url("/profile")).json(req))).await
    }

    // -- Listings --

    pub async fn listings(&self, query: &ListingQuery) -> Result<Vec<ListingWithSeller>, ClientError> {
        self.send(self.http.get(self.url("/listings")).query(query)).await
    }

    pub async fn listing(&self, listing_id: &str) -> Result<ListingWithSeller, ClientError> {
        self.send(self.http.get(self.url(&format!("/listings/{}", listing_id)))).await
    }

    pub async fn create_listing(&self, form: &ListingForm) -> Result<Listing, ClientError> {
        self.send(self.authed(self.http.post(self.url("/listings")).json(form))).await
    }

    pub async fn update_listing(&self, listing_id: &str, form: &ListingForm) -> Result<Listing, ClientError> {
        let url = self.url(&format!("/listings/{}", listing_id));
        self.send(self.authed(self.http.put(url).json(form))).await
    }

    pub async fn delete_listing(&self, listing_id: &str) -> Result<(), ClientError> {
        let url = self.url(&format!("/listings/{}", listing_id));
        self.send_empty(self.authed(self.http.delete(url))).await
    }

    pub async fn my_listings(&self) -> Result<MyListingsResponse, ClientError> {
        self.send(self.authed(self.http.get(self.url("/my/listings")))).await
    }

    pub async fn my_listing(&self, listing_id: &str) -> Result<Listing, ClientError> {
        let url = self.url(&format!("/my/listings/{}", listing_id));
        self.send(self.authed(self.http.get(url))).await
    }

    /// Which of `ids` still have a listing. Long lists go out in batches
    /// the server accepts; any failed batch fails the whole check.
    pub async fn existing(&self, ids: &[String]) -> Result<Vec<String>, ClientError> {
        let mut found = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_EXISTENCE_IDS) {
            let req = ExistingListingsRequest { ids: chunk.to_vec() };
            let resp: ExistingListingsResponse = self
                .send(self.http.post(self.url("/listings/existing")).json(&req))
                .await?;
            found.extend(resp.ids);
        }
        Ok(found)
    }

    // -- Comments --

    pub async fn comments(&self, listing_id: &str) -> Result<Vec<CommentWithAuthor>, ClientError> {
        let url = self.url(&format!("/listings/{}/comments", listing_id));
        self.send(self.http.get(url)).await
    }

    pub async fn add_comment(&self, listing_id: &str, content: &str) -> Result<CommentWithAuthor, ClientError> {
        let url = self.url(&format!("/listings/{}/comments", listing_id));
        let req = CommentRequest {
            content: content.to_string(),
        };
        self.send(self.authed(self.http.post(url).json(&req))).await
    }

    pub async fn edit_comment(&self, comment_id: &str, content: &str) -> Result<CommentWithAuthor, ClientError> {
        let url = self.url(&format!("/comments/{}", comment_id));
        let req = CommentRequest {
            content: content.to_string(),
        };
        self.send(self.authed(self.http.put(url).json(&req))).await
    }

    pub async fn delete_comment(&self, comment_id: &str) -> Result<(), ClientError> {
        let url = self.url(&format!("/comments/{}", comment_id));
        self.send_empty(self.authed(self.http.delete(url))).await
    }

    // -- Locations --

    pub async fn locations(&self, term: &str) -> Result<LocationGroups, ClientError> {
        self.send(self.http.get(self.url("/locations")).query(&[("q", term)])).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        let resp = check(resp).await?;
        Ok(resp.json().await?)
    }

    async fn send_empty(&self, req: RequestBuilder) -> Result<(), ClientError> {
        let resp = req.send().await?;
        check(resp).await?;
        Ok(())
    }
}

/// Turns a non-2xx response into [`ClientError::Api`] carrying the server's
/// error text.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = match resp.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR.as_str())
            .to_string(),
    };
    debug!("API error {}: {}", status, message);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

impl ListingDirectory for MarketClient {
    async fn existing_ids(&self, ids: &[String]) -> anyhow::Result<Vec<String>> {
        Ok(self.existing(ids).await?)
    }
}
