//! Client side of the marketplace: a typed REST client plus the state a
//! front end keeps between screens (login session and favorites), both
//! persisted in a local JSON file.

pub mod api;
pub mod error;
pub mod session;
pub mod storage;
pub mod view;

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use carrot_core::catalog::{Category, CatalogQuery};
use carrot_core::favorites::Favorites;
use carrot_core::locations;
use carrot_core::validation::{validate_comment, validate_listing, validate_profile, validate_signup};
use carrot_types::api::{
    ListingForm, LocationGroups, MyListingsResponse, SignupRequest, UpdateProfileRequest,
};
use carrot_types::models::{CommentWithAuthor, Listing, ListingWithSeller, User};

use crate::api::MarketClient;
use crate::error::ClientError;
use crate::session::{Session, SessionStore};
use crate::storage::{LocalStorage, StoredFavorites};
use crate::view::ListingCard;

pub const STORAGE_FILE: &str = "carrot-storage.json";

/// Screen-level operations. Failures render through
/// [`ClientError::user_message`] with the matching [`error::Action`].
pub struct MarketApp {
    api: MarketClient,
    sessions: SessionStore,
    session: Option<Session>,
    favorites: Favorites<StoredFavorites, MarketClient>,
}

impl MarketApp {
    pub fn new(base_url: &str, data_dir: &Path) -> Result<Self, ClientError> {
        let api = MarketClient::new(base_url)?;
        let storage = Arc::new(LocalStorage::open(data_dir.join(STORAGE_FILE)));
        Ok(Self {
            favorites: Favorites::new(StoredFavorites::new(storage.clone()), api.clone()),
            sessions: SessionStore::new(storage),
            session: None,
            api,
        })
    }

    /// Restores the stored session and reconciles favorites.
    pub async fn start(&mut self) -> Option<&User> {
        self.favorites.load().await;
        self.restore_session().await
    }

    pub fn api(&self) -> &MarketClient {
        &self.api
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    // -- Session --

    /// Picks up a stored unexpired session and refreshes the user from the
    /// server. Any failure signs the user out.
    pub async fn restore_session(&mut self) -> Option<&User> {
        let Some(mut session) = self.sessions.get(Utc::now()) else {
            self.end_session();
            return None;
        };

        self.api.set_token(Some(session.token.clone()));
        match self.api.me().await {
            Ok(user) => {
                session.user = user;
                if let Err(e) = self.sessions.save(&session) {
                    warn!("Failed to persist refreshed session: {:#}", e);
                }
                info!("Session restored for {}", session.user.nickname);
                self.session = Some(session);
                self.current_user()
            }
            Err(e) => {
                warn!("Session refresh failed, signing out: {}", e);
                self.end_session();
                None
            }
        }
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<&User, ClientError> {
        let resp = self.api.login(email.trim(), password).await?;
        let session = Session::new(resp.user, resp.token, Utc::now());
        self.sessions.save(&session)?;
        self.api.set_token(Some(session.token.clone()));
        info!("Signed in as {}", session.user.nickname);
        Ok(&self.session.insert(session).user)
    }

    /// Creates the account. The caller signs in separately afterwards.
    pub async fn sign_up(&self, req: &SignupRequest) -> Result<User, ClientError> {
        validate_signup(req)?;
        self.api.signup(req).await
    }

    pub fn sign_out(&mut self) -> Result<(), ClientError> {
        self.sessions.clear()?;
        self.session = None;
        self.api.set_token(None);
        Ok(())
    }

    /// Public profile of any user. Viewing a profile re-checks favorites.
    pub async fn profile(&mut self, user_id: &str) -> Result<User, ClientError> {
        let user = self.api.user(user_id).await?;
        self.favorites.refresh().await;
        Ok(user)
    }

    pub async fn update_profile(&mut self, req: &UpdateProfileRequest) -> Result<&User, ClientError> {
        let session = self.session.as_ref().ok_or(ClientError::NotLoggedIn)?;
        validate_profile(req, &session.user)?;

        let user = self.api.update_profile(req).await?;
        let session = self.session.as_mut().ok_or(ClientError::NotLoggedIn)?;
        session.user = user;
        self.sessions.save(session)?;
        Ok(&session.user)
    }

    fn end_session(&mut self) {
        if let Err(e) = self.sessions.clear() {
            warn!("Failed to clear session: {:#}", e);
        }
        self.session = None;
        self.api.set_token(None);
    }

    // -- Browse --

    /// Listing cards for the browse grid. The favorites category sends the
    /// reconciled favorite ids along with the query.
    pub async fn browse(&self, query: &CatalogQuery) -> Result<Vec<ListingCard>, ClientError> {
        let favorites = match query.category {
            Category::Favorites => self.favorites.valid().to_vec(),
            _ => Vec::new(),
        };
        let items = self.api.listings(&query.to_params(&favorites)).await?;

        let now = Utc::now();
        Ok(items
            .iter()
            .map(|item| {
                let favorite = self.favorites.is_favorite(&item.listing.id.to_string());
                ListingCard::new(item, favorite, now)
            })
            .collect())
    }

    pub async fn listing(&self, listing_id: &str) -> Result<ListingWithSeller, ClientError> {
        self.api.listing(listing_id).await
    }

    pub fn favorites(&self) -> &Favorites<StoredFavorites, MarketClient> {
        &self.favorites
    }

    /// Returns true if the listing is now a favorite.
    pub async fn toggle_favorite(&mut self, listing_id: &str) -> bool {
        self.favorites.toggle(listing_id).await
    }

    // -- Selling --

    pub async fn sell(&self, form: &ListingForm) -> Result<Listing, ClientError> {
        self.require_login()?;
        validate_listing(form)?;
        self.api.create_listing(form).await
    }

    /// Loads one of the caller's own listings into an edit form.
    pub async fn edit_form(&self, listing_id: &str) -> Result<ListingForm, ClientError> {
        self.require_login()?;
        let listing = self.api.my_listing(listing_id).await?;
        Ok(ListingForm {
            title: listing.title,
            description: listing.description,
            price: Some(listing.price),
            trade_type: listing.trade_type,
            images: vec![listing.image],
        })
    }

    pub async fn edit_listing(&self, listing_id: &str, form: &ListingForm) -> Result<Listing, ClientError> {
        self.require_login()?;
        validate_listing(form)?;
        self.api.update_listing(listing_id, form).await
    }

    pub async fn my_listings(&self) -> Result<MyListingsResponse, ClientError> {
        self.require_login()?;
        self.api.my_listings().await
    }

    /// Deletes an owned listing and drops it from favorites.
    pub async fn delete_listing(&mut self, listing_id: &str) -> Result<(), ClientError> {
        self.require_login()?;
        self.api.delete_listing(listing_id).await?;
        self.favorites.refresh().await;
        Ok(())
    }

    // -- Comments --

    pub async fn comments(&self, listing_id: &str) -> Result<Vec<CommentWithAuthor>, ClientError> {
        self.api.comments(listing_id).await
    }

    pub async fn add_comment(&self, listing_id: &str, content: &str) -> Result<CommentWithAuthor, ClientError> {
        self.require_login()?;
        let content = validate_comment(content)?;
        self.api.add_comment(listing_id, &content).await
    }

    pub async fn edit_comment(&self, comment_id: &str, content: &str) -> Result<CommentWithAuthor, ClientError> {
        self.require_login()?;
        let content = validate_comment(content)?;
        self.api.edit_comment(comment_id, &content).await
    }

    pub async fn delete_comment(&self, comment_id: &str) -> Result<(), ClientError> {
        self.require_login()?;
        self.api.delete_comment(comment_id).await
    }

    // -- Location picker --

    pub fn locations(&self, term: &str) -> LocationGroups {
        locations::grouped(term)
    }

    fn require_login(&self) -> Result<(), ClientError> {
        if self.session.is_none() {
            return Err(ClientError::NotLoggedIn);
        }
        Ok(())
    }
}
