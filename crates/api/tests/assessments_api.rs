//! Integration tests for submission, scoring and the `/assessments` endpoints.

mod common;

use apresiasi_core::assessment::ResponseInput;
use apresiasi_core::period::PeriodKind;
use apresiasi_core::types::{Date, DbId};
use apresiasi_db::models::assignment::CreateAssignment;
use apresiasi_db::models::period::{CreatePeriod, Period};
use apresiasi_db::repositories::{AssignmentRepo, FeedbackResponseRepo, PeriodRepo};
use axum::http::StatusCode;
use common::{
    active_period, body_json, create_profile, get_auth, post_json_auth, set_role, token_for,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn september(pool: &PgPool) -> Period {
    active_period(
        pool,
        PeriodKind::Assessment,
        Date::from_ymd_opt(2025, 9, 1).unwrap(),
        Date::from_ymd_opt(2025, 9, 30).unwrap(),
    )
    .await
}

async fn assign(pool: &PgPool, assessor_id: DbId, assessee_id: DbId, period_id: DbId) -> DbId {
    AssignmentRepo::create(
        pool,
        &CreateAssignment {
            assessor_id,
            assessee_id,
            period_id,
        },
    )
    .await
    .unwrap()
    .id
}

fn ratings(aspect: &str, values: &[i32]) -> serde_json::Value {
    let responses: Vec<serde_json::Value> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            json!({ "aspect": aspect, "indicator": format!("Indikator {i}"), "rating": v })
        })
        .collect();
    serde_json::Value::Array(responses)
}

async fn submit(pool: &PgPool, email: &str, body: serde_json::Value) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    post_json_auth(app, "/api/v1/assessments/submit", &token_for(email), body).await
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_resubmission_replaces_previous_responses(pool: PgPool) {
    let assessor = create_profile(&pool, "ani").await;
    let assessee = create_profile(&pool, "budi").await;
    let period = september(&pool).await;
    let assignment_id = assign(&pool, assessor.id, assessee.id, period.id).await;

    let first = json!({
        "assignment_id": assignment_id,
        "responses": ratings("kolaboratif", &[5, 6, 7])
    });
    let response = submit(&pool, &assessor.email, first).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["success"], true);
    assert_eq!(json["data"]["assignment"]["is_completed"], true);

    let second = json!({
        "assignment_id": assignment_id,
        "responses": [
            {
                "aspect": "adaptif",
                "indicator": "Cepat menyesuaikan diri",
                "rating": 9,
                "comment": "  "
            }
        ]
    });
    let response = submit(&pool, &assessor.email, second).await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = FeedbackResponseRepo::list_for_assignment(&pool, assignment_id)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].aspect, "adaptif");
    assert_eq!(stored[0].rating, 9);
    assert!(stored[0].comment.is_none(), "blank comments are dropped");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_malformed_submissions_are_rejected_before_writing(pool: PgPool) {
    let assessor = create_profile(&pool, "citra").await;
    let assessee = create_profile(&pool, "dedi").await;
    let period = september(&pool).await;
    let assignment_id = assign(&pool, assessor.id, assessee.id, period.id).await;

    let cases = [
        json!({ "assignment_id": assignment_id, "responses": [] }),
        json!({ "assignment_id": assignment_id, "responses": ratings("kolaboratif", &[11]) }),
        json!({ "assignment_id": assignment_id, "responses": ratings("kolaboratif", &[0]) }),
        json!({
            "assignment_id": assignment_id,
            "assessee_id": assessee.id,
            "responses": ratings("kolaboratif", &[5])
        }),
        json!({ "responses": ratings("kolaboratif", &[5]) }),
        json!({ "assignment_id": assignment_id, "responses": "kolaboratif=9" }),
        json!({ "assignment_id": "satu", "responses": ratings("kolaboratif", &[5]) }),
    ];
    for body in cases {
        let response = submit(&pool, &assessor.email, body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let json = body_json(response).await;
        assert!(json["code"].is_string(), "error envelope for body: {body}");
        assert!(json["error"].is_string(), "error envelope for body: {body}");
    }

    let assignment = AssignmentRepo::find_by_id(&pool, assignment_id)
        .await
        .unwrap()
        .unwrap();
    assert!(!assignment.is_completed);
    assert!(FeedbackResponseRepo::list_for_assignment(&pool, assignment_id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submitting_someone_elses_assignment_is_forbidden(pool: PgPool) {
    let assessor = create_profile(&pool, "eka").await;
    let intruder = create_profile(&pool, "fajar").await;
    let assessee = create_profile(&pool, "gita").await;
    let period = september(&pool).await;
    let assignment_id = assign(&pool, assessor.id, assessee.id, period.id).await;

    let body = json!({ "assignment_id": assignment_id, "responses": ratings("kolaboratif", &[8]) });
    let response = submit(&pool, &intruder.email, body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submission_without_active_period_is_conflict(pool: PgPool) {
    let supervisor = create_profile(&pool, "hadi").await;
    let assessee = create_profile(&pool, "indah").await;
    set_role(&pool, supervisor.id, "supervisor").await;

    let body = json!({ "assessee_id": assessee.id, "responses": ratings("kolaboratif", &[8]) });
    let response = submit(&pool, &supervisor.email, body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "NO_ACTIVE_PERIOD");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_direct_assessment_requires_supervisor(pool: PgPool) {
    let peer = create_profile(&pool, "joko").await;
    let supervisor = create_profile(&pool, "kartika").await;
    let admin = create_profile(&pool, "lukman").await;
    let assessee = create_profile(&pool, "mira").await;
    set_role(&pool, supervisor.id, "supervisor").await;
    set_role(&pool, admin.id, "admin").await;
    let period = september(&pool).await;

    let body = json!({ "assessee_id": assessee.id, "responses": ratings("kolaboratif", &[7]) });
    let response = submit(&pool, &peer.email, body.clone()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body_admin = json!({ "assessee_id": admin.id, "responses": ratings("kolaboratif", &[7]) });
    let response = submit(&pool, &supervisor.email, body_admin).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The lazily created assignment is reused on resubmission.
    assert_eq!(submit(&pool, &supervisor.email, body.clone()).await.status(), StatusCode::OK);
    assert_eq!(submit(&pool, &supervisor.email, body).await.status(), StatusCode::OK);
    let assignments = AssignmentRepo::list_for_assessee(&pool, assessee.id, period.id)
        .await
        .unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].assessor_id, supervisor.id);
    assert!(assignments[0].is_completed);
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_results_without_feedback_score_zero(pool: PgPool) {
    let user = create_profile(&pool, "nanda").await;

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/v1/assessments/results/{}", user.id),
        &token_for(&user.email),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["aspect_results"].as_array().unwrap().is_empty());
    assert_eq!(json["data"]["overall_score"], 0.0);
    assert_eq!(json["data"]["total_feedback"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_results_blend_supervisor_and_peer_ratings(pool: PgPool) {
    let supervisor = create_profile(&pool, "oki").await;
    let peer_a = create_profile(&pool, "putri").await;
    let peer_b = create_profile(&pool, "qori").await;
    let pending = create_profile(&pool, "rudi").await;
    let assessee = create_profile(&pool, "sari").await;
    set_role(&pool, supervisor.id, "supervisor").await;
    let period = september(&pool).await;

    let a = assign(&pool, peer_a.id, assessee.id, period.id).await;
    let b = assign(&pool, peer_b.id, assessee.id, period.id).await;
    assign(&pool, pending.id, assessee.id, period.id).await;

    let sup_body = json!({
        "assessee_id": assessee.id,
        "responses": [
            { "aspect": "kolaboratif", "indicator": "Terbuka", "rating": 8 },
            { "aspect": "adaptif", "indicator": "Inovatif", "rating": 9 }
        ]
    });
    assert_eq!(submit(&pool, &supervisor.email, sup_body).await.status(), StatusCode::OK);
    let a_body = json!({ "assignment_id": a, "responses": ratings("kolaboratif", &[6]) });
    assert_eq!(submit(&pool, &peer_a.email, a_body).await.status(), StatusCode::OK);
    let b_body = json!({ "assignment_id": b, "responses": ratings("kolaboratif", &[10]) });
    assert_eq!(submit(&pool, &peer_b.email, b_body).await.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/assessments/results/{}?period_id={}", assessee.id, period.id),
        &token_for(&supervisor.email),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();

    let aspects = data["aspect_results"].as_array().unwrap();
    assert_eq!(aspects.len(), 2);
    assert_eq!(aspects[0]["aspect"], "kolaboratif");
    assert_eq!(aspects[0]["supervisor_average"], 8.0);
    assert_eq!(aspects[0]["peer_average"], 8.0);
    assert_eq!(aspects[0]["final_score"], 8.0);
    assert_eq!(aspects[0]["total_feedback"], 3);
    assert_eq!(aspects[1]["aspect"], "adaptif");
    assert_eq!(aspects[1]["final_score"], 9.0);
    assert!(aspects[1]["peer_average"].is_null());

    assert_eq!(data["overall_score"], 8.5);
    assert_eq!(data["total_feedback"], 3);
    assert_eq!(data["supervisor_feedback_count"], 1);
    assert_eq!(data["peer_feedback_count"], 2);
    assert_eq!(data["completed_assessor_ids"].as_array().unwrap().len(), 3);
    assert_eq!(data["pending_assessor_ids"], json!([pending.id]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_results_default_to_active_period(pool: PgPool) {
    let peer = create_profile(&pool, "tari").await;
    let assessee = create_profile(&pool, "udin").await;
    let august = PeriodRepo::create(
        &pool,
        PeriodKind::Assessment,
        &CreatePeriod {
            month: Some(8),
            year: Some(2025),
            start_date: Date::from_ymd_opt(2025, 8, 1).unwrap(),
            end_date: Date::from_ymd_opt(2025, 8, 31).unwrap(),
        },
    )
    .await
    .unwrap();
    let old = assign(&pool, peer.id, assessee.id, august.id).await;
    let old_response = ResponseInput {
        aspect: "kolaboratif".to_string(),
        indicator: "Terbuka".to_string(),
        rating: 2,
        comment: None,
    };
    FeedbackResponseRepo::replace_for_assignment(&pool, old, &[old_response], chrono::Utc::now())
        .await
        .unwrap();

    let september = september(&pool).await;
    let current = assign(&pool, peer.id, assessee.id, september.id).await;
    let body = json!({ "assignment_id": current, "responses": ratings("kolaboratif", &[8]) });
    assert_eq!(submit(&pool, &peer.email, body).await.status(), StatusCode::OK);

    let token = token_for(&assessee.email);
    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/assessments/results/{}", assessee.id);
    let data = body_json(get_auth(app, &uri, &token).await).await["data"].clone();
    assert_eq!(data["period_id"], september.id);
    assert_eq!(data["total_feedback"], 1);
    assert_eq!(data["overall_score"], 8.0);
    assert_eq!(data["completed_assessor_ids"], json!([peer.id]));

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/assessments/results/{}?period_id={}", assessee.id, august.id);
    let data = body_json(get_auth(app, &uri, &token).await).await["data"].clone();
    assert_eq!(data["period_id"], august.id);
    assert_eq!(data["overall_score"], 2.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_results_of_others_are_forbidden_for_peers(pool: PgPool) {
    let peer = create_profile(&pool, "tono").await;
    let other = create_profile(&pool, "umi").await;

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/v1/assessments/results/{}", other.id),
        &token_for(&peer.email),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Assignments and dashboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_supervisor_assignments_cover_all_non_admins(pool: PgPool) {
    let supervisor = create_profile(&pool, "vina").await;
    let admin = create_profile(&pool, "wati").await;
    let a = create_profile(&pool, "xavier").await;
    let b = create_profile(&pool, "yuni").await;
    set_role(&pool, supervisor.id, "supervisor").await;
    set_role(&pool, admin.id, "admin").await;
    let period = september(&pool).await;
    let peer_assignment = assign(&pool, a.id, b.id, period.id).await;

    let app = common::build_test_app(pool.clone());
    let json = body_json(
        get_auth(app, "/api/v1/assessments/assignments", &token_for(&supervisor.email)).await,
    )
    .await;
    let ids: Vec<i64> = json["data"]["assignments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["assessee_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![a.id, b.id]);
    assert_eq!(json["data"]["period"]["id"], period.id);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/assessments/assignments", &token_for(&a.email)).await;
    let json = body_json(response).await;
    let mine = json["data"]["assignments"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["assignment_id"], peer_assignment);
    assert_eq!(mine[0]["is_completed"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_team_performance_is_ranked_and_restricted(pool: PgPool) {
    let supervisor = create_profile(&pool, "zaki").await;
    let strong = create_profile(&pool, "agus").await;
    let weak = create_profile(&pool, "bela").await;
    set_role(&pool, supervisor.id, "supervisor").await;
    let period = september(&pool).await;

    for (assessee, rating) in [(weak.id, 4), (strong.id, 9)] {
        let body = json!({
            "assessee_id": assessee,
            "responses": ratings("kolaboratif", &[rating])
        });
        assert_eq!(submit(&pool, &supervisor.email, body).await.status(), StatusCode::OK);
    }

    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/assessments/team-performance?period_id={}", period.id),
        &token_for(&supervisor.email),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows[0]["profile_id"], strong.id);
    // Supervisor-only ratings are zero-filled on the peer side.
    assert_eq!(rows[0]["supervisor_average"], 9.0);
    assert_eq!(rows[0]["peer_average"], 0.0);
    assert!((rows[0]["overall_score"].as_f64().unwrap() - 5.4).abs() < 1e-9);
    assert_eq!(rows[1]["profile_id"], weak.id);

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        "/api/v1/assessments/team-performance",
        &token_for(&strong.email),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
