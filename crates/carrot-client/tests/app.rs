use std::path::PathBuf;

use uuid::Uuid;

use carrot_api::routes::router;
use carrot_api::state::{AppState, AppStateInner};
use carrot_client::MarketApp;
use carrot_client::api::MarketClient;
use carrot_client::error::{Action, ClientError};
use carrot_core::catalog::{Category, CatalogQuery, SortOrder};
use carrot_core::favorites::{Favorites, MemoryStore};
use carrot_core::messages;
use carrot_db::Database;
use carrot_types::api::{ListingForm, MAX_EXISTENCE_IDS, SignupRequest, UpdateProfileRequest};
use carrot_types::models::TradeType;

async fn spawn_server() -> String {
    spawn_server_with_state().await.0
}

async fn spawn_server_with_state() -> (String, AppState) {
    let db = Database::open_in_memory().unwrap();
    let state = AppStateInner::new(db, "client-test-secret", 24);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), state)
}

fn data_dir() -> PathBuf {
    std::env::temp_dir().join(format!("carrot-app-{}", Uuid::new_v4()))
}

fn signup_request(email: &str, nickname: &str) -> SignupRequest {
    SignupRequest {
        email: email.into(),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
        nickname: nickname.into(),
        location: "정자동".into(),
    }
}

fn form(title: &str, price: Option<i64>, trade_type: TradeType) -> ListingForm {
    ListingForm {
        title: title.into(),
        description: "상태 좋아요".into(),
        price,
        trade_type,
        images: vec![],
    }
}

#[tokio::test]
async fn full_marketplace_session() {
    let base = spawn_server().await;
    let dir = data_dir();

    let mut app = MarketApp::new(&base, &dir).unwrap();
    assert!(app.start().await.is_none());

    let mut mismatch = signup_request("seller@example.com", "판매왕");
    mismatch.confirm_password = "other12".into();
    assert!(matches!(app.sign_up(&mismatch).await, Err(ClientError::Validation(_))));

    app.sign_up(&signup_request("seller@example.com", "판매왕")).await.unwrap();
    let user = app.sign_in("seller@example.com", "secret1").await.unwrap();
    assert_eq!(user.nickname, "판매왕");

    let desk = app.sell(&form("책상", Some(30_000), TradeType::Sell)).await.unwrap();
    let chair = app.sell(&form("의자", None, TradeType::Share)).await.unwrap();
    assert_eq!(chair.price, 0);

    let query = CatalogQuery {
        sort: SortOrder::PriceLow,
        ..Default::default()
    };
    let cards = app.browse(&query).await.unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].price, "나눔");
    assert_eq!(cards[1].price, "30,000원");
    assert_eq!(cards[1].location, "성남시 정자동");

    assert!(app.toggle_favorite(&desk.id.to_string()).await);
    let ghost = Uuid::new_v4().to_string();
    app.toggle_favorite(&ghost).await;
    assert!(!app.favorites().is_favorite(&ghost));
    assert_eq!(app.favorites().count(), 1);

    let favorites = CatalogQuery {
        category: Category::Favorites,
        ..Default::default()
    };
    let cards = app.browse(&favorites).await.unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].id, desk.id);
    assert!(cards[0].favorite);

    let comment = app.add_comment(&desk.id.to_string(), " 아직 있나요? ").await.unwrap();
    assert_eq!(comment.comment.content, "아직 있나요?");
    assert_eq!(comment.author.nickname, "판매왕");
    let comments = app.comments(&desk.id.to_string()).await.unwrap();
    assert_eq!(comments.len(), 1);

    let mut edit = app.edit_form(&desk.id.to_string()).await.unwrap();
    assert_eq!(edit.price, Some(30_000));
    edit.price = Some(25_000);
    let updated = app.edit_listing(&desk.id.to_string(), &edit).await.unwrap();
    assert_eq!(updated.price, 25_000);

    app.delete_listing(&desk.id.to_string()).await.unwrap();
    assert_eq!(app.favorites().count(), 0);
    assert_eq!(app.my_listings().await.unwrap().count, 1);

    // A second app over the same storage picks the session back up.
    let mut reopened = MarketApp::new(&base, &dir).unwrap();
    let restored = reopened.start().await.unwrap();
    assert_eq!(restored.email, "seller@example.com");

    let profile = UpdateProfileRequest {
        nickname: "판매왕".into(),
        location: "정자동".into(),
        avatar_url: None,
    };
    let err = reopened.update_profile(&profile).await.unwrap_err();
    assert_eq!(err.to_string(), "변경된 내용이 없습니다.");

    let profile = UpdateProfileRequest {
        location: "서현동".into(),
        ..profile
    };
    let user = reopened.update_profile(&profile).await.unwrap();
    assert_eq!(user.location, "서현동");

    reopened.sign_out().unwrap();
    let mut signed_out = MarketApp::new(&base, &dir).unwrap();
    assert!(signed_out.start().await.is_none());
}

#[tokio::test]
async fn anonymous_actions_need_login() {
    let base = spawn_server().await;
    let mut app = MarketApp::new(&base, &data_dir()).unwrap();
    app.start().await;

    let err = app.sell(&form("노트북", Some(100), TradeType::Sell)).await.unwrap_err();
    assert!(matches!(err, ClientError::NotLoggedIn));
    assert_eq!(err.to_string(), messages::LOGIN_REQUIRED);

    let err = app.sign_in("nobody@example.com", "secret1").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.user_message(Action::SignIn), messages::INVALID_CREDENTIALS);
}

#[tokio::test]
async fn unreachable_server_maps_to_generic_message() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut app = MarketApp::new(&format!("http://{}", addr), &data_dir()).unwrap();
    let err = app.sign_in("a@example.com", "secret1").await.unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));
    assert_eq!(err.user_message(Action::SignIn), messages::LOGIN_FAILED);
}

#[tokio::test]
async fn remote_location_table_matches_local() {
    let base = spawn_server().await;
    let app = MarketApp::new(&base, &data_dir()).unwrap();
    let remote = app.api().locations("강남").await.unwrap();
    assert_eq!(remote, app.locations("강남"));
}

#[tokio::test]
async fn large_favorite_lists_are_reconciled_in_batches() {
    let base = spawn_server().await;
    let mut seller = MarketApp::new(&base, &data_dir()).unwrap();
    seller.sign_up(&signup_request("bulk@example.com", "대량판매")).await.unwrap();
    seller.sign_in("bulk@example.com", "secret1").await.unwrap();
    let kept = seller.sell(&form("모니터", Some(100_000), TradeType::Sell)).await.unwrap();
    let kept = kept.id.to_string();

    let mut stale: Vec<String> = (0..MAX_EXISTENCE_IDS + 1).map(|_| Uuid::new_v4().to_string()).collect();
    stale.insert(MAX_EXISTENCE_IDS - 1, kept.clone());
    let refs: Vec<&str> = stale.iter().map(String::as_str).collect();

    let client = MarketClient::new(&base).unwrap();
    let mut favorites = Favorites::new(MemoryStore::with_ids(&refs), client);
    favorites.load().await;

    assert_eq!(favorites.valid(), &[kept.clone()]);
    assert_eq!(favorites.count(), 1);
    assert_eq!(favorites.saved(), &[kept]);
}

#[tokio::test]
async fn viewing_a_profile_refreshes_favorites() {
    let base = spawn_server().await;
    let mut seller = MarketApp::new(&base, &data_dir()).unwrap();
    let account = seller.sign_up(&signup_request("shop@example.com", "동네가게")).await.unwrap();
    seller.sign_in("shop@example.com", "secret1").await.unwrap();
    let lamp = seller.sell(&form("조명", Some(15_000), TradeType::Sell)).await.unwrap();
    let lamp = lamp.id.to_string();

    let mut guest = MarketApp::new(&base, &data_dir()).unwrap();
    guest.start().await;
    assert!(guest.toggle_favorite(&lamp).await);

    seller.delete_listing(&lamp).await.unwrap();
    assert!(guest.favorites().is_favorite(&lamp));

    let profile = guest.profile(&account.id.to_string()).await.unwrap();
    assert_eq!(profile.nickname, "동네가게");
    assert!(!guest.favorites().is_favorite(&lamp));
    assert_eq!(guest.favorites().count(), 0);
}

#[tokio::test]
async fn server_failures_use_each_action_message() {
    let (base, state) = spawn_server_with_state().await;
    let mut app = MarketApp::new(&base, &data_dir()).unwrap();
    app.sign_up(&signup_request("broken@example.com", "고장난집")).await.unwrap();
    app.sign_in("broken@example.com", "secret1").await.unwrap();

    state
        .db
        .with_conn(|conn| {
            conn.execute_batch("DROP TABLE comments; DROP TABLE listings; DROP TABLE users;")?;
            Ok(())
        })
        .unwrap();

    let err = app.sign_up(&signup_request("next@example.com", "다음사람")).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.user_message(Action::SignUp), messages::SIGNUP_FAILED);

    let profile = UpdateProfileRequest {
        nickname: "새이름".into(),
        location: "정자동".into(),
        avatar_url: None,
    };
    let err = app.update_profile(&profile).await.unwrap_err();
    assert_eq!(err.user_message(Action::UpdateProfile), messages::PROFILE_UPDATE_FAILED);

    let err = app.browse(&CatalogQuery::default()).await.unwrap_err();
    assert_eq!(err.user_message(Action::LoadListings), messages::LISTINGS_UNAVAILABLE);

    let err = app.comments(&Uuid::new_v4().to_string()).await.unwrap_err();
    assert_eq!(err.user_message(Action::LoadComments), messages::COMMENTS_UNAVAILABLE);
}
