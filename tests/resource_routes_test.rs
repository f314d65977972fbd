mod common;

use axum::http::{Method, StatusCode};
use freshfit::store::{Collection, DocumentStore, Filter};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn test_user_registers_self_once() {
    let app = TestApp::new();
    let token = app.token_for("new@x.com");

    let (status, body) = app
        .send(
            Method::POST,
            "/users",
            Some(&token),
            Some(json!({ "email": "new@x.com", "name": "New", "role": "admin" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["insertedId"].is_string());

    // Self-assigned roles are dropped
    let stored = app
        .store
        .find_one(Collection::Users, &Filter::eq("email", "new@x.com"))
        .await
        .unwrap()
        .unwrap();
    assert!(stored.get("role").is_none());

    let (status, body) = app
        .send(
            Method::POST,
            "/users",
            Some(&token),
            Some(json!({ "email": "new@x.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "user already exists", "insertedId": null }));
}

#[tokio::test]
async fn test_user_cannot_register_someone_else() {
    let app = TestApp::new();
    let token = app.token_for("a@x.com");

    let (status, _) = app
        .send(
            Method::POST,
            "/users",
            Some(&token),
            Some(json!({ "email": "b@x.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Method::POST, "/users", Some(&token), Some(json!({ "name": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_manages_users() {
    let app = TestApp::new();
    app.seed_user("admin@x.com", Some("admin")).await;
    let member_id = app.seed_user("m@x.com", None).await;
    let admin = app.token_for("admin@x.com");

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/users/{}/role", member_id),
            Some(&admin),
            Some(json!({ "role": "trainer" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modifiedCount"], 1);

    let member = app.token_for("m@x.com");
    let (_, body) = app
        .send(Method::GET, "/users/role/m@x.com", Some(&member), None)
        .await;
    assert_eq!(body["role"], "trainer");

    let (status, _) = app
        .send(
            Method::PATCH,
            "/users/unknown/role",
            Some(&admin),
            Some(json!({ "role": "trainer" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/users/{}/role", member_id),
            Some(&admin),
            Some(json!({ "role": "overlord" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app
        .send(Method::DELETE, &format!("/users/{}", member_id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 1);

    let (status, _) = app
        .send(Method::DELETE, &format!("/users/{}", member_id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_gallery_pagination() {
    let app = TestApp::new();
    for n in 0..5 {
        app.seed(Collection::Gallery, json!({ "url": format!("img{}.png", n) }))
            .await;
    }

    let (status, body) = app
        .send(Method::GET, "/gallery?skip=2&limit=2", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    let urls: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["url"].as_str().unwrap())
        .collect();
    assert_eq!(urls, vec!["img2.png", "img3.png"]);

    let (_, body) = app.send(Method::GET, "/gallery", None, None).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_trainer_application_flow() {
    let app = TestApp::new();
    app.seed_user("admin@x.com", Some("admin")).await;
    app.seed_user("c@x.com", None).await;
    let admin = app.token_for("admin@x.com");
    let applicant = app.token_for("c@x.com");

    let application = json!({ "email": "c@x.com", "name": "Casey", "skills": ["yoga"] });
    let (status, body) = app
        .send(
            Method::POST,
            "/trainer-requests",
            Some(&applicant),
            Some(application.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let request_id = body["insertedId"].as_str().unwrap().to_string();

    let (_, body) = app
        .send(Method::POST, "/trainer-requests", Some(&applicant), Some(application))
        .await;
    assert_eq!(body["message"], "request already exists");

    // Applicants cannot list or approve requests
    let (status, _) = app
        .send(Method::GET, "/trainer-requests", Some(&applicant), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/trainer-requests/{}/approve", request_id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "approved": true, "email": "c@x.com" }));

    let (_, trainers) = app.send(Method::GET, "/trainers", None, None).await;
    let trainers = trainers.as_array().unwrap();
    assert_eq!(trainers.len(), 1);
    assert_eq!(trainers[0]["name"], "Casey");

    let trainer_id = trainers[0]["_id"].as_str().unwrap();
    let (status, body) = app
        .send(Method::GET, &format!("/trainers/{}", trainer_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "c@x.com");

    let (_, pending) = app
        .send(Method::GET, "/trainer-requests", Some(&admin), None)
        .await;
    assert_eq!(pending, json!([]));

    // The promotion takes effect with the token already in hand
    let (status, _) = app
        .send(Method::POST, "/classes", Some(&applicant), Some(json!({ "name": "Flow" })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, classes) = app.send(Method::GET, "/classes", None, None).await;
    assert_eq!(classes[0]["trainer_email"], "c@x.com");
}

#[tokio::test]
async fn test_approval_reuses_an_existing_trainer_profile() {
    let app = TestApp::new();
    app.seed_user("admin@x.com", Some("admin")).await;
    app.seed_user("c@x.com", None).await;
    let admin = app.token_for("admin@x.com");

    // Left behind by an earlier approval that stopped before promoting
    app.seed(Collection::Trainers, json!({ "email": "c@x.com", "name": "Casey" }))
        .await;
    let request_id = app
        .seed(Collection::TrainerRequests, json!({ "email": "c@x.com", "name": "Casey" }))
        .await;

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/trainer-requests/{}/approve", request_id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let profiles = app
        .store
        .count(Collection::Trainers, &Filter::eq("email", "c@x.com"))
        .await
        .unwrap();
    assert_eq!(profiles, 1);

    let user = app
        .store
        .find_one(Collection::Users, &Filter::eq("email", "c@x.com"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user["role"], "trainer");
    assert_eq!(
        app.store
            .count(Collection::TrainerRequests, &Filter::all())
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_approval_for_unknown_user_changes_nothing() {
    let app = TestApp::new();
    app.seed_user("admin@x.com", Some("admin")).await;
    let admin = app.token_for("admin@x.com");
    let request_id = app
        .seed(Collection::TrainerRequests, json!({ "email": "ghost@x.com" }))
        .await;

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/trainer-requests/{}/approve", request_id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let trainers = app.store.count(Collection::Trainers, &Filter::all()).await.unwrap();
    assert_eq!(trainers, 0);
    let pending = app
        .store
        .count(Collection::TrainerRequests, &Filter::all())
        .await
        .unwrap();
    assert_eq!(pending, 1);
}

#[tokio::test]
async fn test_missing_trainer_is_not_found() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/trainers/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Trainer not found");
}

#[tokio::test]
async fn test_bookings_belong_to_their_owner() {
    let app = TestApp::new();
    let alice = app.token_for("a@x.com");
    let bob = app.token_for("b@x.com");

    let (status, body) = app
        .send(
            Method::POST,
            "/bookings",
            Some(&alice),
            Some(json!({ "email": "a@x.com", "slot": "Mon 07:00" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let booking_id = body["insertedId"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            Method::POST,
            "/bookings",
            Some(&bob),
            Some(json!({ "email": "a@x.com", "slot": "Tue 07:00" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(Method::GET, "/bookings/user/a@x.com", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app
        .send(Method::GET, "/bookings/user/a@x.com", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/bookings/{}", booking_id);
    let (status, _) = app.send(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send(Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 1);

    let (status, _) = app.send(Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_payments_and_admin_stats() {
    let app = TestApp::new();
    app.seed_user("admin@x.com", Some("admin")).await;
    app.seed_user("a@x.com", None).await;
    app.seed(Collection::Trainers, json!({ "name": "Casey" })).await;
    let admin = app.token_for("admin@x.com");
    let alice = app.token_for("a@x.com");

    for price in [25, 40] {
        let (status, _) = app
            .send(
                Method::POST,
                "/payments",
                Some(&alice),
                Some(json!({ "email": "a@x.com", "price": price })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = app
        .send(
            Method::POST,
            "/payments",
            Some(&alice),
            Some(json!({ "email": "a@x.com", "price": "lots" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, history) = app
        .send(Method::GET, "/payments/a@x.com", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 2);
    assert!(history[0]["date"].is_string());

    let (status, _) = app.send(Method::GET, "/payments", Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, stats) = app.send(Method::GET, "/admin-stats", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats,
        json!({
            "users": 2,
            "trainers": 1,
            "classes": 0,
            "bookings": 0,
            "payments": 2,
            "revenue": 65.0,
        })
    );
}

#[tokio::test]
async fn test_newsletter_and_testimonials() {
    let app = TestApp::new();
    app.seed_user("admin@x.com", Some("admin")).await;
    let admin = app.token_for("admin@x.com");
    let alice = app.token_for("a@x.com");

    let (status, _) = app
        .send(
            Method::POST,
            "/newsletters",
            Some(&alice),
            Some(json!({ "email": "a@x.com", "name": "Alice" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .send(
            Method::POST,
            "/newsletters",
            Some(&alice),
            Some(json!({ "email": "a@x.com" })),
        )
        .await;
    assert_eq!(body["message"], "already subscribed");

    let (status, subscribers) = app
        .send(Method::GET, "/newsletters", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(subscribers.as_array().unwrap().len(), 1);

    // The author is always the caller
    let (status, _) = app
        .send(
            Method::POST,
            "/testimonials",
            Some(&alice),
            Some(json!({ "email": "someone@x.com", "text": "Great gym" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, testimonials) = app.send(Method::GET, "/testimonials", None, None).await;
    assert_eq!(testimonials[0]["email"], "a@x.com");
    assert_eq!(testimonials[0]["text"], "Great gym");

    let (status, _) = app
        .send(Method::POST, "/testimonials", None, Some(json!({ "text": "anon" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forum_pagination_and_authorship() {
    let app = TestApp::new();
    app.seed_user("b@x.com", Some("trainer")).await;
    let trainer = app.token_for("b@x.com");

    for title in ["Warmups", "Mobility", "Recovery"] {
        let (status, _) = app
            .send(Method::POST, "/forums", Some(&trainer), Some(json!({ "title": title })))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = app.send(Method::GET, "/forums?limit=1&skip=1", None, None).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["items"][0]["title"], "Mobility");
    assert_eq!(body["items"][0]["author_email"], "b@x.com");
}
