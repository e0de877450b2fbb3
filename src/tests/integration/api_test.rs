use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use axum_test::{TestServer, TestServerConfig};
use futures::future::join_all;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::client_mock::{setup_fake_provider, InMemoryProvider};
use crate::handlers::api::AppState;
use crate::routes::{create_router, create_router_with_booking_limit};
use crate::services::booking::BookingCoordinator;
use crate::tests::common::fixtures::candidate;

/// API integration tests
#[cfg(test)]
mod api_tests {
    use super::*;

    // Helper function to set up a test server backed by the in-memory provider
    fn setup_test_server(create_delay: Duration) -> (TestServer, Arc<InMemoryProvider>) {
        let (fake, provider) = setup_fake_provider(create_delay);

        let app_state = Arc::new(AppState {
            coordinator: BookingCoordinator::new(provider),
        });
        let router = create_router(app_state);

        let config = TestServerConfig::builder().mock_transport().build();
        let server = TestServer::new_with_config(router, config).unwrap();

        (server, fake)
    }

    // Router without the test transport, for requests that must run concurrently
    fn setup_router(create_delay: Duration, booking_limit: usize) -> (Router, Arc<InMemoryProvider>) {
        let (fake, provider) = setup_fake_provider(create_delay);
        let app_state = Arc::new(AppState {
            coordinator: BookingCoordinator::new(provider),
        });
        (create_router_with_booking_limit(app_state, booking_limit), fake)
    }

    fn post_booking(body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/meetings")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_meetings() -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri("/meetings")
            .body(Body::empty())
            .unwrap()
    }

    fn booking(topic: &str, start_date: &str, duration: i64) -> Value {
        json!({
            "topic": topic,
            "startDate": start_date,
            "duration": duration
        })
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (server, _) = setup_test_server(Duration::ZERO);

        let response = server.get("/health").await;
        assert_eq!(response.status_code().as_u16(), 200);
        assert_eq!(response.text(), "OK");
    }

    #[tokio::test]
    async fn test_list_meetings_empty() {
        let (server, _) = setup_test_server(Duration::ZERO);

        let response = server.get("/meetings").await;
        assert_eq!(response.status_code().as_u16(), 200);
        assert_eq!(response.json::<Value>(), json!({"meetings": []}));
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let (server, fake) = setup_test_server(Duration::ZERO);

        let response = server
            .post("/meetings")
            .json(&booking("Planning", "2035-03-30T14:00:00.000Z", 30))
            .await;
        assert_eq!(response.status_code().as_u16(), 200);

        let created = response.json::<Value>();
        assert_eq!(created["startDate"], "2035-03-30T14:00:00.000Z");
        assert_eq!(created["duration"], 30);
        assert!(created["joinLink"].as_str().unwrap().starts_with("https://"));
        assert_eq!(fake.create_calls(), 1);

        let listed = server.get("/meetings").await.json::<Value>();
        let meetings = listed["meetings"].as_array().unwrap();
        assert_eq!(meetings.len(), 1);
        assert_eq!(meetings[0]["id"], created["id"]);
        assert_eq!(meetings[0]["startDate"], "2035-03-30T14:00:00.000Z");
        assert!(meetings[0].get("joinLink").is_none());
    }

    #[tokio::test]
    async fn test_overlapping_booking_returns_conflict() {
        let (server, fake) = setup_test_server(Duration::ZERO);
        fake.seed(&candidate("existing", 9, 0, 60));

        let response = server
            .post("/meetings")
            .json(&booking("Sync", "2035-03-30T09:30:00Z", 15))
            .await;

        assert_eq!(response.status_code().as_u16(), 409);
        assert_eq!(
            response.json::<Value>(),
            json!({"message": "Meeting overlaps with existing meetings"})
        );
        assert_eq!(fake.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_touching_booking_is_accepted() {
        let (server, fake) = setup_test_server(Duration::ZERO);
        fake.seed(&candidate("existing", 9, 0, 30));

        // 10:30 in UTC+1 is 09:30 UTC, exactly where the existing meeting ends.
        let response = server
            .post("/meetings")
            .json(&booking("Follow-up", "2035-03-30T10:30:00+01:00", 30))
            .await;

        assert_eq!(response.status_code().as_u16(), 200);
        assert_eq!(response.json::<Value>()["startDate"], "2035-03-30T09:30:00.000Z");
    }

    #[tokio::test]
    async fn test_validation_failures() {
        let (server, fake) = setup_test_server(Duration::ZERO);

        let cases = vec![
            booking("", "2035-03-30T09:00:00Z", 30),
            booking(&"x".repeat(201), "2035-03-30T09:00:00Z", 30),
            booking("Planning", "tomorrow morning", 30),
            booking("Planning", "2035-03-30T09:00:00Z", -30),
            json!({"topic": "Planning"}),
        ];

        for body in cases {
            let response = server.post("/meetings").json(&body).await;
            assert_eq!(response.status_code().as_u16(), 422, "body: {}", body);
            assert!(response.json::<Value>()["message"].is_string());
        }

        assert_eq!(fake.list_calls(), 0);
        assert_eq!(fake.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_returns_bad_gateway() {
        let (server, fake) = setup_test_server(Duration::ZERO);
        fake.fail_next_list();

        let response = server.get("/meetings").await;
        assert_eq!(response.status_code().as_u16(), 502);
        assert!(response.json::<Value>()["message"]
            .as_str()
            .unwrap()
            .contains("authentication"));

        // The failure is not sticky.
        let response = server.get("/meetings").await;
        assert_eq!(response.status_code().as_u16(), 200);
    }

    #[tokio::test]
    async fn test_provider_failure_during_booking() {
        let (server, fake) = setup_test_server(Duration::ZERO);
        fake.fail_next_list();

        let response = server
            .post("/meetings")
            .json(&booking("Planning", "2035-03-30T14:00:00Z", 30))
            .await;
        assert_eq!(response.status_code().as_u16(), 502);
        assert_eq!(fake.create_calls(), 0);

        let response = server
            .post("/meetings")
            .json(&booking("Planning", "2035-03-30T14:00:00Z", 30))
            .await;
        assert_eq!(response.status_code().as_u16(), 200);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_book_once() {
        let (router, fake) = setup_router(Duration::from_millis(20), 64);

        // Each request runs on its own task, as it would behind a real listener.
        let tasks = (0..5).map(|i| {
            let router = router.clone();
            let request = post_booking(&booking(&format!("race {}", i), "2035-03-30T13:00:00Z", 30));
            tokio::spawn(async move { router.oneshot(request).await.unwrap().status() })
        });
        let statuses: Vec<StatusCode> = join_all(tasks)
            .await
            .into_iter()
            .map(|status| status.unwrap())
            .collect();

        assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1);
        assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count(), 4);
        assert_eq!(fake.stored().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_listing_is_served_while_bookings_are_shed() {
        let (router, fake) = setup_router(Duration::from_secs(3600), 1);

        let first = tokio::spawn(
            router
                .clone()
                .oneshot(post_booking(&booking("Slow", "2035-03-30T09:00:00Z", 30))),
        );
        while fake.create_calls() == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        // The only booking slot is taken by the request still waiting on Zoom.
        let shed = router
            .clone()
            .oneshot(post_booking(&booking("Other", "2035-03-30T15:00:00Z", 30)))
            .await
            .unwrap();
        assert_eq!(shed.status(), StatusCode::SERVICE_UNAVAILABLE);

        let listed = router.clone().oneshot(get_meetings()).await.unwrap();
        assert_eq!(listed.status(), StatusCode::OK);

        let first = first.await.unwrap().unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        // The slot is free again once the slow booking completes.
        let retried = router
            .oneshot(post_booking(&booking("Other", "2035-03-30T15:00:00Z", 30)))
            .await
            .unwrap();
        assert_eq!(retried.status(), StatusCode::OK);
        assert_eq!(fake.stored().len(), 2);
    }
}
