use axum::http::{Method, StatusCode};

use nestly_core::UserRole;

use crate::integration::common::{create_user, setup_test_app, token};

#[tokio::test]
async fn inquiry_flow_notifies_the_owner() {
    let app = setup_test_app().await;
    create_user(&app.db, "user_landlord", UserRole::Landlord).await;
    create_user(&app.db, "user_rival", UserRole::Landlord).await;
    let owner = token("user_landlord", None);
    let property_id = app.create_listing(&owner, "Cozy Suburban House", 3500.0).await;

    let (status, json) = app
        .call(
            Method::POST,
            "/api/inquiries",
            None,
            Some(serde_json::json!({"propertyId": property_id, "tenantName": "Bob"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "propertyId, tenantName, and tenantEmail are required");

    let (status, json) = app
        .call(
            Method::POST,
            "/api/inquiries",
            None,
            Some(serde_json::json!({
                "propertyId": uuid::Uuid::new_v4(),
                "tenantName": "Bob",
                "tenantEmail": "bob@example.com"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Property not found");

    let (status, json) = app
        .call(
            Method::POST,
            "/api/inquiries",
            None,
            Some(serde_json::json!({
                "propertyId": property_id,
                "tenantName": "Bob",
                "tenantEmail": "bob@example.com",
                "message": "Is parking included?"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["status"], "PENDING");
    assert_eq!(json["property"]["title"], "Cozy Suburban House");
    let inquiry_id = json["id"].as_str().unwrap().to_string();

    let (status, json) = app
        .call(Method::GET, "/api/notifications", Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["type"], "INQUIRY");
    assert_eq!(json[0]["title"], "New Inquiry Received");
    assert_eq!(
        json[0]["message"],
        "You have a new inquiry for \"Cozy Suburban House\" from Bob."
    );
    assert_eq!(json[0]["isRead"], false);

    let (status, json) = app.call(Method::GET, "/api/inquiries", Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["id"], inquiry_id.as_str());
    assert_eq!(json[0]["property"]["id"], property_id.as_str());

    let uri = format!("/api/inquiries/{inquiry_id}");
    let (status, json) = app
        .call(Method::PATCH, &uri, Some(&owner), Some(serde_json::json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "status is required");

    let rival = token("user_rival", None);
    for status_value in ["CONTACTED", "BOGUS"] {
        let body = serde_json::json!({ "status": status_value });
        let (status, _) = app.call(Method::PATCH, &uri, Some(&rival), Some(body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (status, json) = app
        .call(Method::PATCH, &uri, Some(&owner), Some(serde_json::json!({"status": "CONTACTED"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "CONTACTED");
    assert_eq!(json["property"]["title"], "Cozy Suburban House");

    let (status, json) = app.call(Method::DELETE, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (status, _) = app.call(Method::DELETE, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notifications_can_be_marked_read() {
    let app = setup_test_app().await;
    create_user(&app.db, "user_landlord", UserRole::Landlord).await;
    create_user(&app.db, "user_other", UserRole::Tenant).await;
    let owner = token("user_landlord", None);
    let property_id = app.create_listing(&owner, "Loft", 1800.0).await;

    for name in ["Ann", "Ben"] {
        let (status, _) = app
            .call(
                Method::POST,
                "/api/inquiries",
                None,
                Some(serde_json::json!({
                    "propertyId": property_id,
                    "tenantName": name,
                    "tenantEmail": format!("{}@example.com", name.to_lowercase())
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, json) = app
        .call(Method::GET, "/api/notifications", Some(&owner), None)
        .await;
    let first_id = json[0]["id"].as_str().unwrap().to_string();

    let (status, json) = app
        .call(Method::PATCH, "/api/notifications", Some(&owner), Some(serde_json::json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Notification ID is required");

    let (status, _) = app
        .call(
            Method::PATCH,
            "/api/notifications",
            Some(&token("user_other", None)),
            Some(serde_json::json!({"notificationId": first_id})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = app
        .call(
            Method::PATCH,
            "/api/notifications",
            Some(&owner),
            Some(serde_json::json!({"notificationId": first_id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["isRead"], true);

    let (status, json) = app
        .call(
            Method::PATCH,
            "/api/notifications",
            Some(&owner),
            Some(serde_json::json!({"markAllRead": true})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "All notifications marked as read");
    assert_eq!(json["updated"], 1);
}

#[tokio::test]
async fn favorites_are_idempotent() {
    let app = setup_test_app().await;
    create_user(&app.db, "user_landlord", UserRole::Landlord).await;
    create_user(&app.db, "user_tenant", UserRole::Tenant).await;
    let property_id = app
        .create_listing(&token("user_landlord", None), "Garden Flat", 2100.0)
        .await;
    let tenant = token("user_tenant", None);

    let body = serde_json::json!({"propertyId": property_id});
    let (status, first) = app
        .call(Method::POST, "/api/favorites", Some(&tenant), Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, second) = app
        .call(Method::POST, "/api/favorites", Some(&tenant), Some(body))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["id"], second["id"]);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/favorites",
            Some(&tenant),
            Some(serde_json::json!({"propertyId": uuid::Uuid::new_v4()})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = app.call(Method::GET, "/api/favorites", Some(&tenant), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["property"]["title"], "Garden Flat");

    let uri = format!("/api/favorites/{property_id}");
    let (status, _) = app.call(Method::DELETE, &uri, Some(&tenant), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = app.call(Method::DELETE, &uri, Some(&tenant), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Favorite not found");
}

#[tokio::test]
async fn reviews_and_messages_notify_the_recipient() {
    let app = setup_test_app().await;
    let landlord = create_user(&app.db, "user_landlord", UserRole::Landlord).await;
    create_user(&app.db, "user_tenant", UserRole::Tenant).await;
    let owner = token("user_landlord", None);
    let tenant = token("user_tenant", None);
    let property_id = app.create_listing(&owner, "Sunny Studio", 1500.0).await;
    let reviews_uri = format!("/api/properties/{property_id}/reviews");

    let (status, json) = app
        .call(Method::POST, &reviews_uri, Some(&owner), Some(serde_json::json!({"rating": 5})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "You cannot review your own property");

    let (status, _) = app
        .call(Method::POST, &reviews_uri, Some(&tenant), Some(serde_json::json!({"rating": 9})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = app
        .call(
            Method::POST,
            &reviews_uri,
            Some(&tenant),
            Some(serde_json::json!({"rating": 4, "comment": "Great light"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["rating"], 4);

    let (_, json) = app
        .call(Method::GET, &format!("/api/properties/{property_id}"), None, None)
        .await;
    assert_eq!(json["reviews"][0]["comment"], "Great light");
    assert_eq!(json["reviews"][0]["author"]["lastName"], "user_tenant");

    let (status, json) = app
        .call(
            Method::POST,
            "/api/messages",
            Some(&owner),
            Some(serde_json::json!({"receiverId": landlord.id, "content": "note to self"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Cannot send a message to yourself");

    let (status, _) = app
        .call(
            Method::POST,
            "/api/messages",
            Some(&tenant),
            Some(serde_json::json!({"receiverId": uuid::Uuid::new_v4(), "content": "hello"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = app
        .call(
            Method::POST,
            "/api/messages",
            Some(&tenant),
            Some(serde_json::json!({
                "receiverId": landlord.id,
                "propertyId": property_id,
                "content": "  Can I visit on Friday?  "
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    assert_eq!(json["content"], "Can I visit on Friday?");

    let (_, json) = app.call(Method::GET, "/api/messages", Some(&owner), None).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (_, json) = app
        .call(Method::GET, "/api/notifications", Some(&owner), None)
        .await;
    let notifications = json.as_array().unwrap();
    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0]["title"], "New Message");
    assert_eq!(notifications[0]["message"], "You have a new message from Test user_tenant.");
    assert_eq!(notifications[1]["title"], "New Review");
}

#[tokio::test]
async fn dashboard_overview_summarizes_listings() {
    let app = setup_test_app().await;
    create_user(&app.db, "user_landlord", UserRole::Landlord).await;
    create_user(&app.db, "user_tenant", UserRole::Tenant).await;
    let owner = token("user_landlord", None);

    let rented = app.create_listing(&owner, "Rented Flat", 2000.0).await;
    let active = app.create_listing(&owner, "Open Flat", 1000.0).await;
    app.call(
        Method::PATCH,
        &format!("/api/properties/{rented}"),
        Some(&owner),
        Some(serde_json::json!({"status": "RENTED"})),
    )
    .await;
    app.call(
        Method::POST,
        "/api/inquiries",
        None,
        Some(serde_json::json!({
            "propertyId": active,
            "tenantName": "Cat",
            "tenantEmail": "cat@example.com"
        })),
    )
    .await;
    app.call(
        Method::POST,
        "/api/favorites",
        Some(&token("user_tenant", None)),
        Some(serde_json::json!({"propertyId": active})),
    )
    .await;

    let (status, json) = app
        .call(Method::GET, "/api/dashboard/overview", Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["totalProperties"], 2);
    assert_eq!(json["activeProperties"], 1);
    assert_eq!(json["rentedProperties"], 1);
    assert_eq!(json["vacantProperties"], 1);
    assert_eq!(json["totalMonthlyRevenue"], 3000.0);
    assert_eq!(json["occupancyRate"], 50);
    assert_eq!(json["totalInquiries"], 1);
    assert_eq!(json["pendingInquiries"], 1);
    assert_eq!(json["recentInquiries"], 1);
    assert_eq!(json["totalFavorites"], 1);
    assert_eq!(json["forRentCount"], 2);
    assert_eq!(json["latestInquiries"][0]["property"]["title"], "Open Flat");
    assert_eq!(json["properties"].as_array().unwrap().len(), 2);
}
