//! Tests for enrollment and lesson progress over HTTP.

mod common;

use axum::http::StatusCode;
use common::create_test_app;
use serde_json::json;
use uuid::Uuid;

/// Test: the second enrollment in the same course is refused and no duplicate is stored
#[tokio::test]
async fn test_enrolling_twice_conflicts() {
    let app = create_test_app();
    let (tutor, _) = app.sign_up("tutor@example.com").await;
    let (student, student_id) = app.sign_up("student@example.com").await;
    let course = app.create_course(&tutor, "Blues Guitar", 5).await;
    let uri = format!("/courses/{}/enroll", course["id"].as_str().unwrap());

    let (status, body) = app.send("POST", &uri, Some(&student), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["course_id"], course["id"]);

    let (status, _) = app.send("POST", &uri, Some(&student), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let course_id = Uuid::parse_str(course["id"].as_str().unwrap()).unwrap();
    let student_id = Uuid::parse_str(&student_id).unwrap();
    assert_eq!(app.db.enrollment_count(student_id, course_id), 1);
}

/// Test: enrolling in a course that does not exist is 404
#[tokio::test]
async fn test_enroll_unknown_course_not_found() {
    let app = create_test_app();
    let (student, _) = app.sign_up("student@example.com").await;

    let uri = format!("/courses/{}/enroll", Uuid::new_v4());
    let (status, _) = app.send("POST", &uri, Some(&student), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Test: completing lessons raises the percentage and repeats change nothing
#[tokio::test]
async fn test_completing_lessons_updates_percentage() {
    let app = create_test_app();
    let (tutor, _) = app.sign_up("tutor@example.com").await;
    let (student, _) = app.sign_up("student@example.com").await;
    let course = app.create_course(&tutor, "Blues Guitar", 5).await;
    let course_id = course["id"].as_str().unwrap();

    let complete = |lesson: &str| format!("/courses/{}/lessons/{}/complete", course_id, lesson);

    let (status, body) = app
        .send("POST", &complete("1"), Some(&student), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress_percentage"], 20);

    let (_, body) = app
        .send("POST", &complete("1"), Some(&student), Some(json!({})))
        .await;
    assert_eq!(body["progress_percentage"], 20);

    let (_, body) = app
        .send("POST", &complete("2"), Some(&student), Some(json!({ "total_lessons": 5 })))
        .await;
    assert_eq!(body["progress_percentage"], 40);

    let (status, progress) = app
        .send("GET", &format!("/courses/{}/progress", course_id), Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["completed_lessons"], json!(["1", "2"]));
    assert_eq!(progress["progress_percentage"], 40);
}

/// Test: a course never started reports empty progress
#[tokio::test]
async fn test_progress_defaults_to_empty() {
    let app = create_test_app();
    let (student, _) = app.sign_up("student@example.com").await;

    let uri = format!("/courses/{}/progress", Uuid::new_v4());
    let (status, progress) = app.send("GET", &uri, Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["completed_lessons"], json!([]));
    assert_eq!(progress["progress_percentage"], 0);
}

/// Test: the enrolled-course list carries each course's percentage
#[tokio::test]
async fn test_my_courses_include_progress() {
    let app = create_test_app();
    let (tutor, _) = app.sign_up("tutor@example.com").await;
    let (student, _) = app.sign_up("student@example.com").await;
    let started = app.create_course(&tutor, "Blues Guitar", 4).await;
    let untouched = app.create_course(&tutor, "Jazz Chords", 3).await;

    for course in [&started, &untouched] {
        let uri = format!("/courses/{}/enroll", course["id"].as_str().unwrap());
        app.send("POST", &uri, Some(&student), None).await;
    }
    let uri = format!(
        "/courses/{}/lessons/1/complete",
        started["id"].as_str().unwrap()
    );
    app.send("POST", &uri, Some(&student), Some(json!({}))).await;

    let (status, list) = app.send("GET", "/me/courses", Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    for entry in list {
        let expected = if entry["course"]["id"] == started["id"] { 25 } else { 0 };
        assert_eq!(entry["progress_percentage"], expected);
    }

    let (_, batch) = app
        .send(
            "POST",
            "/progress",
            Some(&student),
            Some(json!({ "course_ids": [started["id"], untouched["id"]] })),
        )
        .await;
    assert_eq!(batch["progress"][started["id"].as_str().unwrap()], 25);
    assert_eq!(batch["progress"][untouched["id"].as_str().unwrap()], 0);
}

/// Test: a bare POST with no body falls back to the stored lesson count
#[tokio::test]
async fn test_complete_without_body_uses_course_count() {
    let app = create_test_app();
    let (tutor, _) = app.sign_up("tutor@example.com").await;
    let (student, _) = app.sign_up("student@example.com").await;
    let course = app.create_course(&tutor, "Blues Guitar", 4).await;
    let uri = format!(
        "/courses/{}/lessons/3/complete",
        course["id"].as_str().unwrap()
    );

    let (status, body) = app.send("POST", &uri, Some(&student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lesson_id"], "3");
    assert_eq!(body["progress_percentage"], 25);
}
