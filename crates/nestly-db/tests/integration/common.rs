use nestly_core::models::{
    IdentityProfile, ListingType, NewProperty, PropertyListing, PropertyStatus, PropertyType,
    User, UserRole,
};
use nestly_db::Database;
use sqlx::postgres::PgPoolOptions;
use testcontainers::core::{ContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};

/// Spins up a PostgreSQL container, applies the migrations, and returns
/// a connected `Database`.
///
/// The `ContainerAsync` must be kept in scope for the test duration.
pub async fn setup_test_db() -> (Database, ContainerAsync<GenericImage>) {
    let container = GenericImage::new("postgres", "16")
        .with_exposed_port(ContainerPort::Tcp(5432))
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_PASSWORD", "postgres")
        .with_env_var("POSTGRES_DB", "nestly_test")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host = container.get_host().await.expect("Failed to get host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get port");

    let connection_string = format!("postgresql://postgres:postgres@{host}:{port}/nestly_test");

    // The server restarts once after init, so the first attempts may fail.
    const MAX_RETRIES: u32 = 30;
    let mut retries = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .connect(&connection_string)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retries += 1;
                if retries >= MAX_RETRIES {
                    panic!("Failed to connect to database after {MAX_RETRIES} retries: {e}");
                }
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            }
        }
    };

    let db = Database::from_pool(pool);
    db.migrate().await.expect("Failed to run migrations");
    (db, container)
}

pub async fn create_user(db: &Database, clerk_id: &str, role: UserRole) -> User {
    db.users()
        .upsert_identity(&IdentityProfile {
            clerk_id: clerk_id.into(),
            email: format!("{clerk_id}@example.com"),
            first_name: Some("Test".into()),
            last_name: Some(clerk_id.into()),
            role: Some(role),
        })
        .await
        .expect("Failed to create user")
}

pub fn new_property(title: &str, city: &str, price: f64) -> NewProperty {
    NewProperty {
        title: title.into(),
        description: Some("Bright and quiet".into()),
        price,
        currency: "$".into(),
        address: "123 Main Street".into(),
        location: Some("Downtown".into()),
        city: city.into(),
        state: Some("CA".into()),
        zip_code: Some("94102".into()),
        country: Some("USA".into()),
        latitude: None,
        longitude: None,
        property_type: PropertyType::Apartment,
        listing_type: ListingType::Rent,
        bedrooms: 2,
        bathrooms: 1,
        sqft: 900,
        amenities: vec!["WiFi".into(), "Parking".into()],
        images: vec!["https://img.example.com/a.jpg".into()],
        thumbnail: None,
        available: true,
        available_from: None,
        status: PropertyStatus::Active,
    }
}

pub async fn create_property(db: &Database, owner: &User, property: NewProperty) -> PropertyListing {
    db.properties()
        .create(owner.id, &property)
        .await
        .expect("Failed to create property")
}
