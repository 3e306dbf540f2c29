use nestly_core::models::{PropertyChanges, PropertyStatus, PropertyType, UserRole};
use nestly_core::search::{CountFilter, PropertySearch};

use crate::integration::common::{create_property, create_user, new_property, setup_test_db};

#[tokio::test]
async fn create_and_fetch_detail() {
    let (db, _container) = setup_test_db().await;
    let owner = create_user(&db, "user_landlord", UserRole::Landlord).await;

    let listing = create_property(
        &db,
        &owner,
        new_property("Luxury Downtown Apartment", "San Francisco", 2500.0),
    )
    .await;
    assert_eq!(listing.owner.id, owner.id);
    assert_eq!(listing.owner.first_name, "Test");
    assert_eq!(listing.property.status, PropertyStatus::Active);

    let detail = db
        .properties()
        .get_detail(listing.property.id)
        .await
        .unwrap()
        .expect("listing exists");
    assert_eq!(detail.property.title, "Luxury Downtown Apartment");
    assert_eq!(detail.owner.email, "user_landlord@example.com");
    assert!(detail.reviews.is_empty());
}

#[tokio::test]
async fn search_applies_filters() {
    let (db, _container) = setup_test_db().await;
    let owner = create_user(&db, "user_search", UserRole::Landlord).await;

    let mut house = new_property("Modern Family House", "San Francisco", 3500.0);
    house.property_type = PropertyType::House;
    house.bedrooms = 4;
    house.amenities = vec!["Garden".into(), "Parking".into()];
    create_property(&db, &owner, house).await;

    // Small delay to ensure different timestamps
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    create_property(&db, &owner, new_property("Cozy Flat", "San Francisco", 2500.0)).await;
    create_property(&db, &owner, new_property("Harbor Studio", "Boston", 1900.0)).await;

    let mut hidden = new_property("Hidden Gem", "San Francisco", 1000.0);
    hidden.status = PropertyStatus::Rented;
    create_property(&db, &owner, hidden).await;

    let repo = db.properties();

    let all_sf = repo
        .search(&PropertySearch {
            text: Some("san fran".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all_sf.len(), 2, "rented listings are excluded");
    // Newest first.
    assert_eq!(all_sf[0].property.title, "Cozy Flat");

    let big = repo
        .search(&PropertySearch {
            bedrooms: Some(CountFilter::AtLeast(3)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(big.len(), 1);
    assert_eq!(big[0].property.title, "Modern Family House");

    let exact_two = repo
        .search(&PropertySearch {
            bedrooms: Some(CountFilter::Exactly(2)),
            max_price: Some(2000.0),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(exact_two.len(), 1);
    assert_eq!(exact_two[0].property.city, "Boston");

    let garden = repo
        .search(&PropertySearch {
            amenities: vec!["Garden".into(), "Parking".into()],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(garden.len(), 1);

    let limited = repo
        .search(&PropertySearch {
            limit: 1,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
    let (db, _container) = setup_test_db().await;
    let owner = create_user(&db, "user_wild", UserRole::Landlord).await;
    create_property(&db, &owner, new_property("Plain", "Denver", 1200.0)).await;

    let results = db
        .properties()
        .search(&PropertySearch {
            text: Some("%".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn update_changes_only_given_fields() {
    let (db, _container) = setup_test_db().await;
    let owner = create_user(&db, "user_update", UserRole::Landlord).await;
    let listing = create_property(&db, &owner, new_property("Before", "Austin", 1500.0)).await;

    let updated = db
        .properties()
        .update(
            listing.property.id,
            &PropertyChanges {
                title: Some("After".into()),
                status: Some(PropertyStatus::Rented),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("listing exists");

    assert_eq!(updated.property.title, "After");
    assert_eq!(updated.property.status, PropertyStatus::Rented);
    assert_eq!(updated.property.price, 1500.0);
    assert!(updated.property.updated_at >= listing.property.updated_at);

    let missing = db
        .properties()
        .update(uuid::Uuid::new_v4(), &PropertyChanges::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn update_clears_nullable_fields() {
    let (db, _container) = setup_test_db().await;
    let owner = create_user(&db, "user_clear", UserRole::Landlord).await;
    let mut property = new_property("Garden Flat", "Austin", 1400.0);
    property.thumbnail = Some("https://img.example.com/thumb.jpg".into());
    let listing = create_property(&db, &owner, property).await;
    assert!(listing.property.thumbnail.is_some());

    let updated = db
        .properties()
        .update(
            listing.property.id,
            &PropertyChanges {
                thumbnail: Some(None),
                description: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("listing exists");

    assert_eq!(updated.property.thumbnail, None);
    assert_eq!(updated.property.description, None);
    assert_eq!(updated.property.title, "Garden Flat");
    assert_eq!(updated.property.images, listing.property.images);
}

#[tokio::test]
async fn owner_listings_and_delete() {
    let (db, _container) = setup_test_db().await;
    let owner = create_user(&db, "user_lister", UserRole::Landlord).await;
    let other = create_user(&db, "user_other", UserRole::Landlord).await;

    let first = create_property(&db, &owner, new_property("One", "Austin", 1000.0)).await;
    create_property(&db, &owner, new_property("Two", "Austin", 1100.0)).await;
    create_property(&db, &other, new_property("Three", "Austin", 1200.0)).await;

    let repo = db.properties();
    assert_eq!(repo.list_by_owner(owner.id, None).await.unwrap().len(), 2);
    assert_eq!(repo.list_by_owner(owner.id, Some(1)).await.unwrap().len(), 1);

    assert!(repo.delete(first.property.id).await.unwrap());
    assert!(!repo.delete(first.property.id).await.unwrap());
    assert_eq!(repo.list_by_owner(owner.id, None).await.unwrap().len(), 1);
}
