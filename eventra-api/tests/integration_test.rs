/// Integration tests for the Eventra API
///
/// These tests verify the system works end-to-end over HTTP:
/// - Registration and login by either identity
/// - Organizer creation with slug disambiguation
/// - Membership guards on organizer-scoped routes
/// - Sole-admin leave refusal
/// - Bearer authentication requirement
///
/// They run against the database named by `DATABASE_URL` and are skipped
/// when it is not set.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestContext;
use eventra_shared::auth::token;
use serde_json::json;
use tower::Service as _;
use uuid::Uuid;

/// Register an account, then log in by email and by username
#[tokio::test]
async fn test_register_then_login_with_either_identity() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let tag = Uuid::new_v4().simple().to_string();
    let email = format!("alice-{}@example.com", tag);
    let username = format!("alice-{}", tag);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "email": email,
                "username": username,
                "password": "correct horse battery staple"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["user"]["role"], "user");
    let user_id = body["user"]["id"].as_i64().unwrap();

    // The session token carries the platform role.
    let claims =
        token::verify_session(&ctx.state.tokens, body["access_token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.user_id().unwrap(), user_id);
    assert_eq!(claims.role.as_deref(), Some("user"));

    for identity in [email.as_str(), username.as_str()] {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "identity": identity,
                    "password": "correct horse battery staple"
                })
                .to_string(),
            ))
            .unwrap();

        let response = ctx.app.clone().call(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "login as {}", identity);
    }

    // Wrong password is indistinguishable from an unknown identity.
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "identity": email,
                "password": "not the password"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup_user(user_id).await;
}

/// Two organizers with the same name get distinct, suffixed slugs
#[tokio::test]
async fn test_duplicate_organizer_names_get_suffixed_slugs() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let (user, jwt_token) = ctx.create_user().await;
    let name = format!("Acme Corp {}", Uuid::new_v4().simple());

    let mut ids = Vec::new();
    let mut slugs = Vec::new();

    for _ in 0..2 {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/organizers")
            .header("authorization", TestContext::bearer(&jwt_token))
            .header("content-type", "application/json")
            .body(Body::from(json!({ "name": name }).to_string()))
            .unwrap();

        let response = ctx.app.clone().call(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = common::body_json(response).await;
        assert_eq!(body["name"], name.as_str());
        ids.push(body["id"].as_i64().unwrap());
        slugs.push(body["slug"].as_str().unwrap().to_string());
    }

    assert_eq!(slugs[1], format!("{}-1", slugs[0]));

    for id in ids {
        ctx.cleanup_organizer(id).await;
    }
    ctx.cleanup_user(user.id).await;
}

/// Organizer mutation and roster access are refused to non-members
#[tokio::test]
async fn test_non_member_is_forbidden() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let (admin, admin_token) = ctx.create_user().await;
    let (outsider, outsider_token) = ctx.create_user().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/organizers")
        .header("authorization", TestContext::bearer(&admin_token))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "name": format!("Guarded {}", Uuid::new_v4().simple()) }).to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let organizer_id = common::body_json(response).await["id"].as_i64().unwrap();

    // Rename attempt by a non-member.
    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/api/v1/organizers/{}", organizer_id))
        .header("authorization", TestContext::bearer(&outsider_token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "name": "Intruder Inc" }).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Roster read by a non-member.
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/v1/organizers/{}/members", organizer_id))
        .header("authorization", TestContext::bearer(&outsider_token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The admin still reads the roster.
    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/v1/organizers/{}/members", organizer_id))
        .header("authorization", TestContext::bearer(&admin_token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    ctx.cleanup_organizer(organizer_id).await;
    ctx.cleanup_user(admin.id).await;
    ctx.cleanup_user(outsider.id).await;
}

/// The only active admin cannot leave until the role is handed over
#[tokio::test]
async fn test_sole_admin_cannot_leave() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let (admin, admin_token) = ctx.create_user().await;
    let (second, _) = ctx.create_user().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/organizers")
        .header("authorization", TestContext::bearer(&admin_token))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "name": format!("Leavers {}", Uuid::new_v4().simple()) }).to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let organizer_id = common::body_json(response).await["id"].as_i64().unwrap();

    // Alone on the admin seat: refused.
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/v1/organizers/{}/leave", organizer_id))
        .header("authorization", TestContext::bearer(&admin_token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Seat a second admin.
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/v1/organizers/{}/members", organizer_id))
        .header("authorization", TestContext::bearer(&admin_token))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "user_id": second.id, "role": "organizer_admin" }).to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Now the first admin may go.
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/v1/organizers/{}/leave", organizer_id))
        .header("authorization", TestContext::bearer(&admin_token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_json(response).await["removed"], true);

    ctx.cleanup_organizer(organizer_id).await;
    ctx.cleanup_user(admin.id).await;
    ctx.cleanup_user(second.id).await;
}

/// Requests without a bearer token are rejected
#[tokio::test]
async fn test_authentication_required() {
    let Some(ctx) = TestContext::new().await else {
        return;
    };

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/users/me")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
