//! Integration tests for the appointments API endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::util::ServiceExt;

    use crate::test_utils::{
        expired_tokens, fresh_tokens, mock_userinfo, seed_shared_calendar, session_cookie_value,
        test_app,
    };

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn event_json(id: &str, summary: &str, description: &str) -> Value {
        json!({
            "id": id,
            "summary": summary,
            "description": description,
            "start": {"dateTime": "2025-03-10T18:00:00Z", "timeZone": "America/New_York"},
            "end": {"dateTime": "2025-03-10T18:30:00Z", "timeZone": "America/New_York"}
        })
    }

    /// No session cookie means 401
    #[tokio::test]
    async fn it_requires_a_session_to_list() {
        let (app, _state) = test_app("http://localhost:0").await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/appointments")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    /// Without a shared credential the list endpoint answers 503 with
    /// guidance, not a raw failure
    #[tokio::test]
    async fn it_returns_503_when_shared_calendar_is_not_configured() {
        let mut server = mockito::Server::new_async().await;
        let _userinfo = mock_userinfo(&mut server, "pat@example.com").await;
        let (app, _state) = test_app(&server.url()).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/appointments")
                    .header(header::COOKIE, session_cookie_value())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Shared calendar not available");
    }

    /// A failed shared-credential refresh surfaces as 503 and clears the
    /// in-memory credential
    #[tokio::test]
    async fn it_invalidates_the_credential_when_refresh_fails() {
        let mut server = mockito::Server::new_async().await;
        let _userinfo = mock_userinfo(&mut server, "pat@example.com").await;
        let _token = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant"}"#)
            .create_async()
            .await;
        let (app, state) = test_app(&server.url()).await;
        seed_shared_calendar(&state, expired_tokens());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/appointments")
                    .header(header::COOKIE, session_cookie_value())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!state.read().unwrap().shared_calendar.is_configured());
    }

    /// Patients only see appointments they booked or are the patient on;
    /// unrelated calendar entries are filtered out entirely
    #[tokio::test]
    async fn it_filters_the_list_for_patients() {
        let mut server = mockito::Server::new_async().await;
        let _userinfo = mock_userinfo(&mut server, "pat@example.com").await;
        let events = json!({
            "items": [
                event_json(
                    "evt_mine",
                    "[PENDING] Regular Checkup - Pat",
                    "Patient: Pat\nEmail: pat@example.com\nReason: Regular Checkup\nStatus: pending\nBookedByEmail: pat@example.com"
                ),
                event_json(
                    "evt_other",
                    "[CONFIRMED] Teeth Cleaning - Sam",
                    "Patient: Sam\nEmail: sam@example.com\nReason: Teeth Cleaning\nStatus: confirmed\nBookedByEmail: sam@example.com"
                ),
                event_json("evt_unrelated", "Staff meeting", "Quarterly review"),
            ]
        });
        let _list = server
            .mock("GET", "/calendar/v3/calendars/shared-cal/events")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(events.to_string())
            .create_async()
            .await;
        let (app, state) = test_app(&server.url()).await;
        seed_shared_calendar(&state, fresh_tokens());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/appointments")
                    .header(header::COOKIE, session_cookie_value())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let appointments = body["appointments"].as_array().unwrap();
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0]["id"], "evt_mine");
        assert_eq!(appointments[0]["time"], "14:00");
        assert_eq!(appointments[0]["reason"], "checkup");
    }

    /// Admins see every appointment
    #[tokio::test]
    async fn it_lists_everything_for_admins() {
        let mut server = mockito::Server::new_async().await;
        let _userinfo = mock_userinfo(&mut server, "admin@dentalclinic.com").await;
        let events = json!({
            "items": [
                event_json(
                    "evt_1",
                    "[PENDING] Regular Checkup - Pat",
                    "Patient: Pat\nEmail: pat@example.com\nStatus: pending\nBookedByEmail: pat@example.com"
                ),
                event_json(
                    "evt_2",
                    "[CONFIRMED] Teeth Cleaning - Sam",
                    "Patient: Sam\nEmail: sam@example.com\nStatus: confirmed\nBookedByEmail: sam@example.com"
                ),
            ]
        });
        let _list = server
            .mock("GET", "/calendar/v3/calendars/shared-cal/events")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(events.to_string())
            .create_async()
            .await;
        let (app, state) = test_app(&server.url()).await;
        seed_shared_calendar(&state, fresh_tokens());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/appointments")
                    .header(header::COOKIE, session_cookie_value())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["appointments"].as_array().unwrap().len(), 2);
    }

    /// A non-admin booking lands on the calendar as a pending request with
    /// the tagged title, and attributes the booking to the session email
    #[tokio::test]
    async fn it_creates_a_pending_appointment_for_patients() {
        let mut server = mockito::Server::new_async().await;
        let _userinfo = mock_userinfo(&mut server, "a@x.com").await;
        let insert = server
            .mock("POST", "/calendar/v3/calendars/shared-cal/events")
            .match_query(mockito::Matcher::UrlEncoded(
                "sendUpdates".to_string(),
                "all".to_string(),
            ))
            .match_body(mockito::Matcher::PartialJson(json!({
                "summary": "[PENDING] Regular Checkup - Ada Lovelace"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "evt_new"}"#)
            .create_async()
            .await;
        let (app, state) = test_app(&server.url()).await;
        seed_shared_calendar(&state, fresh_tokens());

        let request_body = json!({
            "patientName": "Ada Lovelace",
            "patientEmail": "a@x.com",
            "patientPhone": "555-0100",
            "date": "2025-03-10",
            "time": "2:00 PM",
            "reason": "checkup"
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/appointments")
                    .header(header::COOKIE, session_cookie_value())
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(request_body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        insert.assert_async().await;
        let body = body_json(response).await;
        assert_eq!(body["success"], Value::Bool(true));
        assert_eq!(body["appointment"]["id"], "evt_new");
        assert_eq!(body["appointment"]["status"], "pending");
        assert_eq!(body["appointment"]["bookedByEmail"], "a@x.com");
    }

    /// Admin bookings are confirmed immediately
    #[tokio::test]
    async fn it_creates_a_confirmed_appointment_for_admins() {
        let mut server = mockito::Server::new_async().await;
        let _userinfo = mock_userinfo(&mut server, "admin@dentalclinic.com").await;
        let insert = server
            .mock("POST", "/calendar/v3/calendars/shared-cal/events")
            .match_query(mockito::Matcher::Any)
            .match_body(mockito::Matcher::PartialJson(json!({
                "summary": "[CONFIRMED] Teeth Cleaning - Bob"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "evt_adm"}"#)
            .create_async()
            .await;
        let (app, state) = test_app(&server.url()).await;
        seed_shared_calendar(&state, fresh_tokens());

        let request_body = json!({
            "patientName": "Bob",
            "patientEmail": "bob@example.com",
            "date": "2025-03-11",
            "time": "10:00",
            "reason": "cleaning"
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/appointments")
                    .header(header::COOKIE, session_cookie_value())
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(request_body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        insert.assert_async().await;
        let body = body_json(response).await;
        assert_eq!(body["appointment"]["status"], "confirmed");
        assert_eq!(body["message"], "Appointment confirmed and added to calendar");
    }

    /// Only admins may change status
    #[tokio::test]
    async fn it_forbids_status_updates_for_patients() {
        let mut server = mockito::Server::new_async().await;
        let _userinfo = mock_userinfo(&mut server, "pat@example.com").await;
        let (app, state) = test_app(&server.url()).await;
        seed_shared_calendar(&state, fresh_tokens());

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/appointments/evt_1/status")
                    .header(header::COOKIE, session_cookie_value())
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"status": "confirmed"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    /// Status values outside the enumeration are rejected
    #[tokio::test]
    async fn it_rejects_an_invalid_status() {
        let mut server = mockito::Server::new_async().await;
        let _userinfo = mock_userinfo(&mut server, "admin@dentalclinic.com").await;
        let (app, state) = test_app(&server.url()).await;
        seed_shared_calendar(&state, fresh_tokens());

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/appointments/evt_1/status")
                    .header(header::COOKIE, session_cookie_value())
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"status": "cancelled"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid status");
    }

    /// Confirming rewrites the title tag and the Status line on the event
    #[tokio::test]
    async fn it_confirms_an_appointment() {
        let mut server = mockito::Server::new_async().await;
        let _userinfo = mock_userinfo(&mut server, "admin@dentalclinic.com").await;
        let _get = server
            .mock("GET", "/calendar/v3/calendars/shared-cal/events/evt_1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                event_json(
                    "evt_1",
                    "[PENDING] Regular Checkup - Ada",
                    "Patient: Ada\nStatus: pending",
                )
                .to_string(),
            )
            .create_async()
            .await;
        let update = server
            .mock("PUT", "/calendar/v3/calendars/shared-cal/events/evt_1")
            .match_query(mockito::Matcher::UrlEncoded(
                "sendUpdates".to_string(),
                "all".to_string(),
            ))
            .match_body(mockito::Matcher::PartialJson(json!({
                "summary": "[CONFIRMED] Regular Checkup - Ada",
                "description": "Patient: Ada\nStatus: confirmed"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "evt_1"}"#)
            .create_async()
            .await;
        let (app, state) = test_app(&server.url()).await;
        seed_shared_calendar(&state, fresh_tokens());

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/appointments/evt_1/status")
                    .header(header::COOKIE, session_cookie_value())
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"status": "confirmed"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        update.assert_async().await;
        let body = body_json(response).await;
        assert_eq!(body["appointment"]["status"], "confirmed");
        assert_eq!(
            body["appointment"]["summary"],
            "[CONFIRMED] Regular Checkup - Ada"
        );
        assert_eq!(body["message"], "Appointment confirmed successfully");
    }

    /// Updating a missing event maps the provider's 404 through
    #[tokio::test]
    async fn it_returns_404_for_a_missing_event() {
        let mut server = mockito::Server::new_async().await;
        let _userinfo = mock_userinfo(&mut server, "admin@dentalclinic.com").await;
        let _get = server
            .mock("GET", "/calendar/v3/calendars/shared-cal/events/gone")
            .with_status(404)
            .with_body(r#"{"error": {"message": "Not Found"}}"#)
            .create_async()
            .await;
        let (app, state) = test_app(&server.url()).await;
        seed_shared_calendar(&state, fresh_tokens());

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/appointments/gone/status")
                    .header(header::COOKIE, session_cookie_value())
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"status": "declined"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    /// Only admins may delete
    #[tokio::test]
    async fn it_forbids_deletes_for_patients() {
        let mut server = mockito::Server::new_async().await;
        let _userinfo = mock_userinfo(&mut server, "pat@example.com").await;
        let (app, state) = test_app(&server.url()).await;
        seed_shared_calendar(&state, fresh_tokens());

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/appointments/evt_1")
                    .header(header::COOKIE, session_cookie_value())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    /// Admin delete removes the event outright
    #[tokio::test]
    async fn it_deletes_an_appointment() {
        let mut server = mockito::Server::new_async().await;
        let _userinfo = mock_userinfo(&mut server, "admin@dentalclinic.com").await;
        let delete = server
            .mock("DELETE", "/calendar/v3/calendars/shared-cal/events/evt_1")
            .match_query(mockito::Matcher::Any)
            .with_status(204)
            .with_body("")
            .create_async()
            .await;
        let (app, state) = test_app(&server.url()).await;
        seed_shared_calendar(&state, fresh_tokens());

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/appointments/evt_1")
                    .header(header::COOKIE, session_cookie_value())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        delete.assert_async().await;
        let body = body_json(response).await;
        assert_eq!(body["success"], Value::Bool(true));
    }
}
