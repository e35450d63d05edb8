//! Tests for users API handlers.

use super::*;
use crate::domain::pagination::PageRequest;
use crate::domain::ports::{MockRateLimiter, MockUsersCommand, MockUsersQuery};
use crate::domain::{EmailAddress, ErrorCode, StorageId, UserPatch};
use actix_web::http::StatusCode;
use actix_web::http::header::RETRY_AFTER;
use actix_web::{App, test as actix_test, web};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::sync::Arc;

struct Ports {
    query: MockUsersQuery,
    command: MockUsersCommand,
    limiter: MockRateLimiter,
}

#[fixture]
fn ports() -> Ports {
    Ports {
        query: MockUsersQuery::new(),
        command: MockUsersCommand::new(),
        limiter: MockRateLimiter::new(),
    }
}

fn ada() -> User {
    User {
        id: UserId::new(1),
        name: "Ada".to_owned(),
        email: EmailAddress::new("ada@example.com").expect("valid email"),
        password: "secret".to_owned(),
    }
}

struct Reply {
    status: StatusCode,
    retry_after: Option<String>,
    body: Value,
}

async fn send(ports: Ports, request: actix_test::TestRequest) -> Reply {
    let Ports {
        query,
        command,
        limiter,
    } = ports;
    let state = HttpState::new(Arc::new(query), Arc::new(command), Arc::new(limiter));
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure),
    )
    .await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = actix_test::read_body(response).await;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Reply {
        status,
        retry_after,
        body,
    }
}

fn admit_all(limiter: &mut MockRateLimiter) {
    limiter.expect_check().returning(|_| Ok(()));
}

#[actix_web::test]
async fn banner_reports_service_is_running() {
    let app = actix_test::init_service(App::new().service(banner)).await;
    let response =
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = actix_test::read_body(response).await;
    assert_eq!(body.as_ref(), BANNER.as_bytes());
}

#[rstest]
#[actix_web::test]
async fn list_users_returns_page_envelope(mut ports: Ports) {
    ports
        .limiter
        .expect_check()
        .withf(|client| client.as_ref() == "192.0.2.10")
        .times(1)
        .returning(|_| Ok(()));
    ports
        .query
        .expect_list_users()
        .withf(|request| request.page() == 2 && request.limit() == 1)
        .times(1)
        .return_once(|request| Ok(Page::new(request, vec![ada()], 3)));

    let reply = send(
        ports,
        actix_test::TestRequest::get()
            .uri("/users?page=2&limit=1")
            .peer_addr("192.0.2.10:4000".parse().expect("socket addr")),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body,
        json!({
            "users": [{
                "id": 1,
                "name": "Ada",
                "email": "ada@example.com",
                "password": "secret",
            }],
            "total_users": 3,
            "page": 2,
            "total_pages": 3,
        })
    );
}

#[rstest]
#[actix_web::test]
async fn list_users_applies_default_pagination(mut ports: Ports) {
    admit_all(&mut ports.limiter);
    ports
        .query
        .expect_list_users()
        .withf(|request| *request == PageRequest::new(1, 10).expect("valid page"))
        .return_once(|request| Ok(Page::new(request, Vec::new(), 0)));

    let reply = send(ports, actix_test::TestRequest::get().uri("/users")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["total_pages"], 0);
    assert_eq!(reply.body["users"], json!([]));
}

#[rstest]
#[case("/users?page=abc", "Invalid page or limit parameter, must be an integer")]
#[case("/users?limit=1.5", "Invalid page or limit parameter, must be an integer")]
#[case("/users?limit=0", "page and limit must be positive integers")]
#[case("/users?page=-2", "page and limit must be positive integers")]
#[case("/users?limit=1000", "limit must not exceed 100")]
#[case("/users?page=1&page=2", "Invalid page or limit parameter, must be an integer")]
#[actix_web::test]
async fn list_users_rejects_bad_pagination(
    mut ports: Ports,
    #[case] uri: &str,
    #[case] message: &str,
) {
    admit_all(&mut ports.limiter);
    ports.query.expect_list_users().never();

    let reply = send(ports, actix_test::TestRequest::get().uri(uri)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["code"], "invalid_request");
    assert_eq!(reply.body["message"], message);
}

#[rstest]
#[actix_web::test]
async fn list_users_rejects_clients_over_budget(mut ports: Ports) {
    ports.limiter.expect_check().return_once(|_| {
        Err(
            Error::rate_limited("Rate limit exceeded: 5 per 1 minute")
                .with_details(json!({"limit": "5 per 1 minute", "retryAfterSecs": 30})),
        )
    });
    ports.query.expect_list_users().never();

    let reply = send(ports, actix_test::TestRequest::get().uri("/users")).await;
    assert_eq!(reply.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(reply.retry_after.as_deref(), Some("30"));
    assert_eq!(reply.body["code"], "rate_limited");
    assert_eq!(reply.body["message"], "Rate limit exceeded: 5 per 1 minute");
}

#[rstest]
#[actix_web::test]
async fn get_user_returns_record(mut ports: Ports) {
    ports
        .query
        .expect_get_user()
        .withf(|id| *id == UserId::new(1))
        .return_once(|_| Ok(ada()));

    let reply = send(ports, actix_test::TestRequest::get().uri("/users/1")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["email"], "ada@example.com");
}

#[rstest]
#[actix_web::test]
async fn get_user_reports_missing_record(mut ports: Ports) {
    ports
        .query
        .expect_get_user()
        .return_once(|_| Err(Error::not_found("User not found")));

    let reply = send(ports, actix_test::TestRequest::get().uri("/users/999")).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["message"], "User not found");
}

#[rstest]
#[actix_web::test]
async fn non_integer_path_ids_address_no_user(mut ports: Ports) {
    ports.query.expect_get_user().never();

    let reply = send(ports, actix_test::TestRequest::get().uri("/users/abc")).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn create_user_returns_storage_id(mut ports: Ports) {
    let stored = StorageId::random();
    ports
        .command
        .expect_create_user()
        .withf(|user| *user == ada())
        .times(1)
        .return_once(move |_| Ok(stored));

    let reply = send(
        ports,
        actix_test::TestRequest::post().uri("/users").set_json(json!({
            "id": 1,
            "name": "Ada",
            "email": "ada@example.com",
            "password": "secret",
        })),
    )
    .await;

    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["message"], "User added");
    assert_eq!(reply.body["id"], stored.to_string());
}

#[rstest]
#[actix_web::test]
async fn create_user_reports_every_field_error(mut ports: Ports) {
    ports.command.expect_create_user().never();

    let reply = send(
        ports,
        actix_test::TestRequest::post().uri("/users").set_json(json!({
            "id": "seven",
            "email": "not-an-email",
            "role": "admin",
        })),
    )
    .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        reply.body,
        json!({
            "email": ["Not a valid email address."],
            "id": ["Not a valid integer."],
            "name": ["Missing data for required field."],
            "password": ["Missing data for required field."],
            "role": ["Unknown field."],
        })
    );
}

#[rstest]
#[actix_web::test]
async fn create_user_rejects_malformed_json(mut ports: Ports) {
    ports.command.expect_create_user().never();

    let reply = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/users")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{\"id\": 1,"),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["code"], "invalid_request");
}

#[rstest]
#[actix_web::test]
async fn create_user_reports_duplicates_as_bad_request(mut ports: Ports) {
    ports.command.expect_create_user().return_once(|_| {
        Err(Error::conflict(
            "User with this ID or email already exists",
        ))
    });

    let reply = send(
        ports,
        actix_test::TestRequest::post()
            .uri("/users")
            .set_json(serde_json::to_value(ada()).expect("serialise user")),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["code"], "conflict");
    assert_eq!(
        reply.body["message"],
        "User with this ID or email already exists"
    );
}

#[rstest]
#[case(UpdateOutcome::Updated, "User updated successfully")]
#[case(UpdateOutcome::Unchanged, "Nothing to update")]
#[actix_web::test]
async fn update_user_reports_outcome(
    mut ports: Ports,
    #[case] outcome: UpdateOutcome,
    #[case] message: &str,
) {
    ports
        .command
        .expect_update_user()
        .withf(|id, patch| {
            *id == UserId::new(1)
                && *patch
                    == UserPatch {
                        name: Some("Ada King".to_owned()),
                        ..UserPatch::default()
                    }
        })
        .return_once(move |_, _| Ok(outcome));

    let reply = send(
        ports,
        actix_test::TestRequest::put()
            .uri("/users/1")
            .set_json(json!({"name": "Ada King"})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({"message": message}));
}

#[rstest]
#[actix_web::test]
async fn update_user_validates_present_fields(mut ports: Ports) {
    ports.command.expect_update_user().never();

    let reply = send(
        ports,
        actix_test::TestRequest::put()
            .uri("/users/1")
            .set_json(json!({"name": null, "email": 42})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        reply.body,
        json!({
            "email": ["Not a valid string."],
            "name": ["Field may not be null."],
        })
    );
}

#[rstest]
#[actix_web::test]
async fn update_user_reports_missing_record(mut ports: Ports) {
    ports
        .command
        .expect_update_user()
        .return_once(|_, _| Err(Error::not_found("User not found")));

    let reply = send(
        ports,
        actix_test::TestRequest::put()
            .uri("/users/404")
            .set_json(json!({"name": "Nobody"})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[rstest]
#[case(DeleteOutcome::Deleted, "User deleted successfully")]
#[case(DeleteOutcome::NotFound, "No user found")]
#[actix_web::test]
async fn delete_user_reports_outcome(
    mut ports: Ports,
    #[case] outcome: DeleteOutcome,
    #[case] message: &str,
) {
    ports
        .command
        .expect_delete_user()
        .withf(|id| *id == UserId::new(5))
        .return_once(move |_| Ok(outcome));

    let reply = send(ports, actix_test::TestRequest::delete().uri("/users/5")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({"message": message}));
}

#[rstest]
#[actix_web::test]
async fn only_listing_is_rate_limited(mut ports: Ports) {
    ports.limiter.expect_check().never();
    ports
        .query
        .expect_get_user()
        .return_once(|_| Ok(ada()));

    let reply = send(ports, actix_test::TestRequest::get().uri("/users/1")).await;
    assert_eq!(reply.status, StatusCode::OK);
}
