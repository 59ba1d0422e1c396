//! Tests for sign-up, session checks, navigation and the admin role toggle.

mod common;

use axum::http::StatusCode;
use common::create_test_app;
use serde_json::json;

/// Test: protected routes refuse requests without a session cookie
#[tokio::test]
async fn test_requests_without_session_are_unauthorized() {
    let app = create_test_app();

    let (status, _) = app.send("GET", "/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send("GET", "/me", Some("session=not-a-real-session"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// Test: signing up twice with the same email returns 409
#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let app = create_test_app();
    app.sign_up("ana@example.com").await;

    let (status, _) = app
        .send(
            "POST",
            "/auth/signup",
            None,
            Some(json!({ "email": "ana@example.com", "password": "other" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

/// Test: login with the right password issues a session, the wrong one is 401
#[tokio::test]
async fn test_login_checks_password() {
    let app = create_test_app();
    app.sign_up("ana@example.com").await;

    let (status, cookie, _) = app
        .send_raw(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": "hunter22" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie.unwrap().starts_with("session="));

    let (status, _) = app
        .send(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// Test: a session stops working after logout
#[tokio::test]
async fn test_logout_ends_session() {
    let app = create_test_app();
    let (cookie, _) = app.sign_up("ana@example.com").await;

    let (status, _) = app.send("POST", "/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send("GET", "/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// Test: a new account has no role stored and is treated as a student
#[tokio::test]
async fn test_new_account_is_student() {
    let app = create_test_app();
    let (cookie, user_id) = app.sign_up("ana@example.com").await;

    let (status, me) = app.send("GET", "/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], user_id.as_str());
    assert_eq!(me["role"], "student");

    let (_, nav) = app.send("GET", "/me/navigation", Some(&cookie), None).await;
    assert_eq!(nav["role"], "student");
    assert_eq!(nav["show_admin_panel"], false);
    assert_eq!(nav["show_course_authoring"], false);
    assert_eq!(nav["show_notifications"], false);
}

/// Test: saving a profile turns the account into a tutor
#[tokio::test]
async fn test_profile_makes_tutor() {
    let app = create_test_app();
    let (cookie, _) = app.sign_up("ana@example.com").await;

    let (status, user) = app
        .send(
            "PUT",
            "/me/profile",
            Some(&cookie),
            Some(json!({ "display_name": "  Ana  ", "bio": "Jazz guitar" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["display_name"], "Ana");
    assert_eq!(user["role"], "tutor");

    let (_, nav) = app.send("GET", "/me/navigation", Some(&cookie), None).await;
    assert_eq!(nav["show_course_authoring"], true);
    assert_eq!(nav["show_notifications"], true);
    assert_eq!(nav["show_admin_panel"], false);
}

/// Test: a blank display name is rejected
#[tokio::test]
async fn test_profile_requires_name() {
    let app = create_test_app();
    let (cookie, _) = app.sign_up("ana@example.com").await;

    let (status, _) = app
        .send(
            "PUT",
            "/me/profile",
            Some(&cookie),
            Some(json!({ "display_name": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Test: toggling a role flips student and tutor back and forth
#[tokio::test]
async fn test_toggle_role_flips() {
    let app = create_test_app();
    let (admin, _) = app.sign_up("admin@example.com").await;
    let (_, student_id) = app.sign_up("ben@example.com").await;
    let uri = format!("/admin/users/{}/toggle-role", student_id);

    let (status, body) = app.send("POST", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "tutor");

    let (_, body) = app.send("POST", &uri, Some(&admin), None).await;
    assert_eq!(body["role"], "student");

    let (_, users) = app.send("GET", "/admin/users", Some(&admin), None).await;
    assert_eq!(users.as_array().unwrap().len(), 2);
}
