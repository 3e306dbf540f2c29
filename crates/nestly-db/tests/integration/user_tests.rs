use nestly_core::models::{IdentityProfile, ProfileChanges, UserRole};

use crate::integration::common::{create_property, create_user, new_property, setup_test_db};

#[tokio::test]
async fn upsert_identity_inserts_then_refreshes() {
    let (db, _container) = setup_test_db().await;
    let users = db.users();

    let profile = IdentityProfile {
        clerk_id: "user_abc".into(),
        email: "first@example.com".into(),
        first_name: Some("Jane".into()),
        last_name: Some("Tenant".into()),
        role: None,
    };
    let created = users.upsert_identity(&profile).await.unwrap();
    assert_eq!(created.email, "first@example.com");
    assert_eq!(created.role, UserRole::Tenant);

    // Missing names keep the stored ones; email is always refreshed.
    let refreshed = users
        .upsert_identity(&IdentityProfile {
            clerk_id: "user_abc".into(),
            email: "second@example.com".into(),
            first_name: None,
            last_name: None,
            role: Some(UserRole::Landlord),
        })
        .await
        .unwrap();

    assert_eq!(refreshed.id, created.id);
    assert_eq!(refreshed.email, "second@example.com");
    assert_eq!(refreshed.first_name, "Jane");
    assert_eq!(refreshed.role, UserRole::Landlord);
}

#[tokio::test]
async fn update_profile_changes_only_given_fields() {
    let (db, _container) = setup_test_db().await;
    let user = create_user(&db, "user_profile", UserRole::Tenant).await;

    let updated = db
        .users()
        .update_profile(
            &user.clerk_id,
            &ProfileChanges {
                phone: Some(Some("+1 555 0100".into())),
                sms_notifications: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("user exists");

    assert_eq!(updated.phone.as_deref(), Some("+1 555 0100"));
    assert!(updated.sms_notifications);
    assert!(updated.email_notifications);
    assert_eq!(updated.first_name, user.first_name);

    let missing = db
        .users()
        .update_profile("user_missing", &ProfileChanges::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn update_profile_clears_nullable_fields() {
    let (db, _container) = setup_test_db().await;
    let user = create_user(&db, "user_clear_bio", UserRole::Tenant).await;
    let users = db.users();

    users
        .update_profile(
            &user.clerk_id,
            &ProfileChanges {
                phone: Some(Some("+1 555 0101".into())),
                bio: Some(Some("Quiet tenant".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let cleared = users
        .update_profile(
            &user.clerk_id,
            &ProfileChanges {
                bio: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("user exists");

    assert_eq!(cleared.bio, None);
    assert_eq!(cleared.phone.as_deref(), Some("+1 555 0101"));
}

#[tokio::test]
async fn delete_user_cascades_to_listings() {
    let (db, _container) = setup_test_db().await;
    let owner = create_user(&db, "user_owner", UserRole::Landlord).await;
    let listing = create_property(&db, &owner, new_property("Loft", "Oakland", 1800.0)).await;

    assert!(db.users().delete_by_clerk_id("user_owner").await.unwrap());
    assert!(!db.users().delete_by_clerk_id("user_owner").await.unwrap());
    assert!(
        db.properties()
            .get(listing.property.id)
            .await
            .unwrap()
            .is_none()
    );
}
