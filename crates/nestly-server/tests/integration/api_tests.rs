use axum::body::Body;
use axum::http::{Method, Request, StatusCode};

use nestly_core::UserRole;
use nestly_core::webhook::WebhookVerifier;

use crate::integration::common::{TEST_WEBHOOK_SECRET, create_user, setup_test_app, token};

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app().await;

    let (status, json) = app.call(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_valid_session() {
    let app = setup_test_app().await;

    let (status, json) = app.call(Method::GET, "/api/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "unauthorized");

    let (status, _) = app
        .call(Method::GET, "/api/dashboard/overview", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Public routes stay open.
    let (status, json) = app.call(Method::GET, "/api/properties", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn session_cookie_is_accepted() {
    let app = setup_test_app().await;
    create_user(&app.db, "user_cookie", UserRole::Tenant).await;

    let request = Request::get("/api/users/me")
        .header("cookie", format!("__session={}", token("user_cookie", None)))
        .body(Body::empty())
        .unwrap();
    let (status, json) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["clerkId"], "user_cookie");
}

#[tokio::test]
async fn get_me_provisions_user_from_claims() {
    let app = setup_test_app().await;

    let (status, json) = app
        .call(
            Method::GET,
            "/api/users/me",
            Some(&token("user_new", Some("jane@example.com"))),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["email"], "jane@example.com");
    assert_eq!(json["firstName"], "Jane");
    assert_eq!(json["role"], "TENANT");
    assert_eq!(json["properties"], serde_json::json!([]));

    // No local record and nothing in the token to build one from.
    let (status, json) = app
        .call(Method::GET, "/api/users/me", Some(&token("user_ghost", None)), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "User not found");
}

#[tokio::test]
async fn put_me_creates_landlord_and_post_me_ignores_role() {
    let app = setup_test_app().await;
    let session = token("user_owner", Some("owner@example.com"));

    let (status, json) = app
        .call(
            Method::PUT,
            "/api/users/me",
            Some(&session),
            Some(serde_json::json!({"role": "LANDLORD", "firstName": "John"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["role"], "LANDLORD");
    assert_eq!(json["firstName"], "John");

    let (status, json) = app
        .call(
            Method::POST,
            "/api/users/me",
            Some(&session),
            Some(serde_json::json!({"role": "TENANT", "bio": "Owner of fine flats"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["role"], "LANDLORD");
    assert_eq!(json["bio"], "Owner of fine flats");

    // Role is ignored here, even when it is not a known value.
    let (status, json) = app
        .call(
            Method::POST,
            "/api/users/me",
            Some(&session),
            Some(serde_json::json!({"role": "ADMIN", "bio": null})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["role"], "LANDLORD");
    assert_eq!(json["bio"], serde_json::Value::Null);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/users/me",
            Some(&token("user_unknown", None)),
            Some(serde_json::json!({"bio": "hi"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tenant_cannot_create_property() {
    let app = setup_test_app().await;
    create_user(&app.db, "user_tenant", UserRole::Tenant).await;

    let (status, json) = app
        .call(
            Method::POST,
            "/api/properties",
            Some(&token("user_tenant", None)),
            Some(serde_json::json!({
                "title": "Loft",
                "price": 1000,
                "address": "1 Main",
                "city": "Austin"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "forbidden");

    // The role check comes before the body is validated.
    let (status, _) = app
        .call(
            Method::POST,
            "/api/properties",
            Some(&token("user_tenant", None)),
            Some(serde_json::json!({"title": "Loft"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn landlord_property_lifecycle() {
    let app = setup_test_app().await;
    create_user(&app.db, "user_landlord", UserRole::Landlord).await;
    create_user(&app.db, "user_rival", UserRole::Landlord).await;
    let owner = token("user_landlord", None);
    let rival = token("user_rival", None);

    let id = app.create_listing(&owner, "Luxury Downtown Apartment", 2500.0).await;

    let (status, json) = app
        .call(Method::GET, "/api/properties?city=san%20fran&bedrooms=2%2B", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["id"], id.as_str());
    assert_eq!(json[0]["type"], "APARTMENT");
    assert_eq!(json[0]["owner"]["firstName"], "Test");

    let (status, json) = app
        .call(Method::GET, &format!("/api/properties/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["owner"]["email"], "user_landlord@example.com");
    assert_eq!(json["reviews"], serde_json::json!([]));

    let patch = serde_json::json!({"price": 2700, "status": "RENTED"});
    let (status, _) = app
        .call(Method::PATCH, &format!("/api/properties/{id}"), Some(&rival), Some(patch.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = app
        .call(Method::PATCH, &format!("/api/properties/{id}"), Some(&owner), Some(patch))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["price"], 2700.0);
    assert_eq!(json["status"], "RENTED");

    let (status, json) = app
        .call(
            Method::PATCH,
            &format!("/api/properties/{id}"),
            Some(&owner),
            Some(serde_json::json!({"thumbnail": "https://img.example.com/t.jpg"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["thumbnail"], "https://img.example.com/t.jpg");

    let (status, json) = app
        .call(
            Method::PATCH,
            &format!("/api/properties/{id}"),
            Some(&owner),
            Some(serde_json::json!({"thumbnail": null})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["thumbnail"], serde_json::Value::Null);
    assert_eq!(json["price"], 2700.0);

    // Rented listings drop out of search.
    let (_, json) = app.call(Method::GET, "/api/properties", None, None).await;
    assert_eq!(json, serde_json::json!([]));

    let (status, json) = app
        .call(Method::GET, "/api/properties/user", Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (status, json) = app
        .call(Method::DELETE, &format!("/api/properties/{id}"), Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Property deleted successfully");

    let (status, _) = app
        .call(Method::GET, &format!("/api/properties/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_input_returns_400() {
    let app = setup_test_app().await;
    create_user(&app.db, "user_landlord", UserRole::Landlord).await;

    let (status, json) = app
        .call(Method::GET, "/api/properties?minPrice=cheap", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");

    let (status, _) = app
        .call(Method::GET, "/api/properties?type=CASTLE", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Malformed ids get the same JSON error body.
    let (status, json) = app
        .call(Method::GET, "/api/properties/not-a-uuid", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert!(json["message"].as_str().is_some());

    let (status, json) = app
        .call(
            Method::DELETE,
            "/api/favorites/not-a-uuid",
            Some(&token("user_landlord", None)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");

    let (status, json) = app
        .call(
            Method::POST,
            "/api/properties",
            Some(&token("user_landlord", None)),
            Some(serde_json::json!({
                "title": "  ",
                "price": 100,
                "address": "1 Main",
                "city": "Austin"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "title is required");

    // Malformed JSON bodies are rejected the same way.
    let request = Request::post("/api/inquiries")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn upload_without_storage_returns_503() {
    let app = setup_test_app().await;
    create_user(&app.db, "user_landlord", UserRole::Landlord).await;
    create_user(&app.db, "user_tenant", UserRole::Tenant).await;

    let upload = |clerk_id: &str| {
        Request::post("/api/uploads?filename=front.png")
            .header("authorization", format!("Bearer {}", token(clerk_id, None)))
            .header("content-type", "image/png")
            .body(Body::from(vec![0x89, b'P', b'N', b'G']))
            .unwrap()
    };

    let (status, _) = app.send(upload("user_tenant")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = app.send(upload("user_landlord")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "service_unavailable");
}

#[tokio::test]
async fn oversized_upload_returns_413() {
    let app = setup_test_app().await;
    create_user(&app.db, "user_landlord", UserRole::Landlord).await;

    let request = Request::post("/api/uploads")
        .header("authorization", format!("Bearer {}", token("user_landlord", None)))
        .header("content-type", "image/jpeg")
        .header("content-length", (11 * 1024 * 1024).to_string())
        .body(Body::from(vec![0u8; 11 * 1024 * 1024]))
        .unwrap();
    let (status, _) = app.send(request).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

fn signed_webhook(payload: &serde_json::Value) -> Request<Body> {
    let verifier = WebhookVerifier::new(TEST_WEBHOOK_SECRET).unwrap();
    let body = payload.to_string();
    let ts = chrono::Utc::now().timestamp();
    let signature = verifier.sign("msg_test", ts, &body);

    Request::post("/api/webhooks/clerk")
        .header("content-type", "application/json")
        .header("svix-id", "msg_test")
        .header("svix-timestamp", ts.to_string())
        .header("svix-signature", format!("v1,{signature}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn webhook_syncs_users() {
    let app = setup_test_app().await;

    let created = serde_json::json!({
        "type": "user.created",
        "data": {
            "id": "user_hook",
            "email_addresses": [{"email_address": "hook@example.com"}],
            "first_name": "Hook",
            "last_name": "Landlord",
            "unsafe_metadata": {"role": "LANDLORD"}
        }
    });
    let (status, json) = app.send(signed_webhook(&created)).await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["success"], true);

    let user = app.db.users().find_by_clerk_id("user_hook").await.unwrap().unwrap();
    assert_eq!(json["userId"], user.id.to_string());
    assert_eq!(user.role, UserRole::Landlord);
    assert_eq!(user.email, "hook@example.com");

    let deleted = serde_json::json!({"type": "user.deleted", "data": {"id": "user_hook"}});
    let (status, _) = app.send(signed_webhook(&deleted)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.db.users().find_by_clerk_id("user_hook").await.unwrap().is_none());

    // Replaying the deletion is harmless.
    let (status, json) = app.send(signed_webhook(&deleted)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let other = serde_json::json!({"type": "session.created", "data": {}});
    let (status, _) = app.send(signed_webhook(&other)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn webhook_rejects_unsigned_deliveries() {
    let app = setup_test_app().await;
    let payload = serde_json::json!({"type": "user.deleted", "data": {"id": "user_1"}});

    let (status, _) = app
        .call(Method::POST, "/api/webhooks/clerk", None, Some(payload.clone()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::post("/api/webhooks/clerk")
        .header("svix-id", "msg_test")
        .header("svix-timestamp", chrono::Utc::now().timestamp().to_string())
        .header("svix-signature", "v1,Zm9yZ2VkLXNpZ25hdHVyZQ==")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let (status, json) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "webhook_error");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app().await;

    let (status, json) = app
        .call(Method::GET, "/api-docs/openapi.json", None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["info"]["title"], "Nestly API");
    assert!(json["paths"]["/api/dashboard/overview"].is_object());
}
