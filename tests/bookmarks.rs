use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::web::Data;
use actix_web::App;
use serde_json::{json, Value};

use adboard::advertisement::AdvertisementBody;
use adboard::database::{Database, MemoryDatabase};
use adboard::user::endpoints::{CreatedUserBody, UserBody};

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

#[actix_web::test]
async fn bookmark_lifecycle() {
    let db: Data<dyn Database> = Data::from(Arc::new(MemoryDatabase::new()) as Arc<dyn Database>);
    let app = test::init_service(App::new().app_data(db.clone()).configure(adboard::configure)).await;

    let request = TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": "Alice" }))
        .to_request();
    let alice: CreatedUserBody = test::call_and_read_body_json(&app, request).await;

    let request = TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": "Bob" }))
        .to_request();
    let bob: CreatedUserBody = test::call_and_read_body_json(&app, request).await;

    let request = TestRequest::post()
        .uri("/advertisements")
        .insert_header(bearer(&alice.token))
        .set_json(json!({ "title": "Bicycle" }))
        .to_request();
    let bicycle: AdvertisementBody = test::call_and_read_body_json(&app, request).await;
    let add_uri = format!("/advertisements/{}/add-bookmark", bicycle.id);
    let remove_uri = format!("/advertisements/{}/remove-bookmark", bicycle.id);

    // own advertisement
    let request = TestRequest::patch()
        .uri(&add_uri)
        .insert_header(bearer(&alice.token))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["error_code"], "E4091001");

    for _ in 0..2 {
        let request = TestRequest::patch()
            .uri(&add_uri)
            .insert_header(bearer(&bob.token))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let request = TestRequest::get()
        .uri("/advertisements/bookmarks-list")
        .insert_header(bearer(&bob.token))
        .to_request();
    let bookmarks: Vec<AdvertisementBody> = test::call_and_read_body_json(&app, request).await;
    assert_eq!(bookmarks.len(), 1);
    assert_eq!(bookmarks[0].id, bicycle.id);

    let request = TestRequest::get()
        .uri("/users/me")
        .insert_header(bearer(&bob.token))
        .to_request();
    let profile: UserBody = test::call_and_read_body_json(&app, request).await;
    assert_eq!(profile.favourites, vec![bicycle.id]);

    let request = TestRequest::patch()
        .uri(&remove_uri)
        .insert_header(bearer(&bob.token))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = TestRequest::get()
        .uri("/advertisements/bookmarks-list")
        .insert_header(bearer(&bob.token))
        .to_request();
    let bookmarks: Vec<AdvertisementBody> = test::call_and_read_body_json(&app, request).await;
    assert!(bookmarks.is_empty());
}

#[actix_web::test]
async fn bookmarks_require_authentication() {
    let db: Data<dyn Database> = Data::from(Arc::new(MemoryDatabase::new()) as Arc<dyn Database>);
    let app = test::init_service(App::new().app_data(db.clone()).configure(adboard::configure)).await;

    let request = TestRequest::get()
        .uri("/advertisements/bookmarks-list")
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = TestRequest::get().uri("/users/me").to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn cannot_bookmark_hidden_draft() {
    let db: Data<dyn Database> = Data::from(Arc::new(MemoryDatabase::new()) as Arc<dyn Database>);
    let app = test::init_service(App::new().app_data(db.clone()).configure(adboard::configure)).await;

    let request = TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": "Alice" }))
        .to_request();
    let alice: CreatedUserBody = test::call_and_read_body_json(&app, request).await;

    let request = TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": "Bob" }))
        .to_request();
    let bob: CreatedUserBody = test::call_and_read_body_json(&app, request).await;

    let request = TestRequest::post()
        .uri("/advertisements")
        .insert_header(bearer(&alice.token))
        .set_json(json!({ "title": "Sofa", "status": "DRAFT" }))
        .to_request();
    let sofa: AdvertisementBody = test::call_and_read_body_json(&app, request).await;

    let request = TestRequest::patch()
        .uri(&format!("/advertisements/{}/add-bookmark", sofa.id))
        .insert_header(bearer(&bob.token))
        .to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
