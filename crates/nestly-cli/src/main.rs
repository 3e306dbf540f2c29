use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nestly_core::models::{
    IdentityProfile, NewInquiry, NewMessage, NewNotification, NewProperty, ProfileChanges,
    Property, User,
};
use nestly_core::{ListingType, PropertySearch, PropertyStatus, PropertyType, UserRole};
use nestly_db::{Database, DatabaseConfig};

#[derive(Parser)]
#[command(name = "nestly", version, about = "Nestly rental marketplace tooling")]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Connection pool size
    #[arg(
        long,
        global = true,
        env = "DATABASE_MAX_CONNECTIONS",
        default_value_t = 5,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    max_connections: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Load demo users, listings and activity (safe to run repeatedly)
    Seed,

    /// Search active listings and print them as JSON
    Search {
        /// Substring of city, title or location
        #[arg(short, long)]
        city: Option<String>,

        #[arg(long)]
        min_price: Option<String>,

        #[arg(long)]
        max_price: Option<String>,

        /// Property type, e.g. APARTMENT or HOUSE
        #[arg(short = 't', long = "type")]
        property_type: Option<String>,

        /// RENT or SALE
        #[arg(short, long)]
        listing_type: Option<String>,

        /// Exact count ("2") or minimum ("2+")
        #[arg(short, long)]
        bedrooms: Option<String>,

        #[arg(long)]
        bathrooms: Option<String>,

        /// Required amenity; repeat for several
        #[arg(short, long = "amenity")]
        amenities: Vec<String>,

        /// Maximum number of results
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nestly=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = connect_db(cli.database_url, cli.max_connections).await?;

    match cli.command {
        Commands::Migrate => {
            db.migrate().await?;
            tracing::info!("Migrations applied");
        }
        Commands::Seed => {
            db.migrate().await?;
            cmd_seed(&db).await?;
        }
        Commands::Search {
            city,
            min_price,
            max_price,
            property_type,
            listing_type,
            bedrooms,
            bathrooms,
            amenities,
            limit,
        } => {
            let mut pairs: Vec<(&str, String)> = [
                ("city", city),
                ("minPrice", min_price),
                ("maxPrice", max_price),
                ("type", property_type),
                ("listingType", listing_type),
                ("bedrooms", bedrooms),
                ("bathrooms", bathrooms),
            ]
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect();
            pairs.extend(amenities.into_iter().map(|a| ("amenities", a)));
            pairs.push(("limit", limit.to_string()));

            let search = PropertySearch::from_pairs(pairs)?;
            cmd_search(&db, &search).await?;
        }
    }

    Ok(())
}

async fn connect_db(url: Option<String>, max_connections: u32) -> Result<Database> {
    let url = url.context("DATABASE_URL not set. Pass --database-url or set the variable.")?;
    let config = DatabaseConfig {
        url,
        max_connections,
    };
    Database::connect(&config)
        .await
        .context("Failed to connect to database")
}

async fn cmd_search(db: &Database, search: &PropertySearch) -> Result<()> {
    let listings = db.properties().search(search).await?;
    tracing::info!(count = listings.len(), "Search complete");

    println!("{}", serde_json::to_string_pretty(&listings)?);
    Ok(())
}

async fn cmd_seed(db: &Database) -> Result<()> {
    let landlord = seed_user(
        db,
        IdentityProfile {
            clerk_id: "landlord_demo_001".into(),
            email: "landlord@demo.com".into(),
            first_name: Some("John".into()),
            last_name: Some("Landlord".into()),
            role: Some(UserRole::Landlord),
        },
        ProfileChanges {
            phone: Some(Some("+1 (555) 123-4567".into())),
            bio: Some(Some(
                "Professional property manager with 10+ years of experience".into(),
            )),
            ..Default::default()
        },
    )
    .await?;

    let tenant = seed_user(
        db,
        IdentityProfile {
            clerk_id: "tenant_demo_001".into(),
            email: "tenant@demo.com".into(),
            first_name: Some("Jane".into()),
            last_name: Some("Tenant".into()),
            role: Some(UserRole::Tenant),
        },
        ProfileChanges {
            phone: Some(Some("+1 (555) 987-6543".into())),
            ..Default::default()
        },
    )
    .await?;

    tracing::info!(landlord = %landlord.id, tenant = %tenant.id, "Users ready");

    let apartment = NewProperty {
        title: "Luxury Downtown Apartment".into(),
        description: Some(
            "Beautiful 2-bedroom apartment in the heart of downtown with city views".into(),
        ),
        price: 2500.0,
        address: "123 Main Street".into(),
        zip_code: Some("94102".into()),
        latitude: Some(37.7749),
        longitude: Some(-122.4194),
        property_type: PropertyType::Apartment,
        bedrooms: 2,
        bathrooms: 2,
        sqft: 1200,
        amenities: to_strings(&["WiFi", "Air Conditioning", "Gym", "Parking", "Dishwasher"]),
        ..demo_listing()
    };
    let house = NewProperty {
        title: "Modern House with Garden".into(),
        description: Some("Spacious 3-bedroom house with backyard and garage".into()),
        price: 3500.0,
        address: "456 Oak Avenue".into(),
        zip_code: Some("94103".into()),
        latitude: Some(37.7751),
        longitude: Some(-122.4195),
        property_type: PropertyType::House,
        bedrooms: 3,
        bathrooms: 2,
        sqft: 2000,
        amenities: to_strings(&["Garden", "Garage", "Washer/Dryer", "Fireplace"]),
        ..demo_listing()
    };

    let (apartment, apartment_is_new) = seed_property(db, &landlord, &apartment).await?;
    let (house, _) = seed_property(db, &landlord, &house).await?;
    tracing::info!(apartment = %apartment.id, house = %house.id, "Properties ready");

    let favorite = db.favorites().add(tenant.id, apartment.id).await?;
    tracing::info!(favorite = %favorite.id, "Favorite ready");

    // Activity is only generated alongside a freshly created listing so
    // repeated runs do not pile up duplicates.
    if apartment_is_new {
        let message = db
            .messages()
            .create_with_notification(
                &NewMessage {
                    sender_id: tenant.id,
                    receiver_id: landlord.id,
                    property_id: Some(apartment.id),
                    content: "Hi! I'm interested in your downtown apartment. Can we schedule a viewing?"
                        .into(),
                },
                &NewNotification::message_received(landlord.id, &tenant.display_name()),
            )
            .await?;

        let inquiry = db
            .inquiries()
            .create_with_notification(
                &NewInquiry {
                    property_id: apartment.id,
                    tenant_name: "Jane Tenant".into(),
                    tenant_email: "jane@example.com".into(),
                    tenant_phone: Some("+1 (555) 987-6543".into()),
                    message: Some("I would like to inquire about this property".into()),
                },
                &NewNotification::inquiry_received(landlord.id, &apartment.title, "Jane Tenant"),
            )
            .await?;

        tracing::info!(message = %message.id, inquiry = %inquiry.id, "Demo activity created");
    } else {
        tracing::info!("Demo activity already present; skipped");
    }

    tracing::info!("Seeding completed");
    Ok(())
}

async fn seed_user(
    db: &Database,
    profile: IdentityProfile,
    extras: ProfileChanges,
) -> Result<User> {
    let users = db.users();
    users.upsert_identity(&profile).await?;
    users
        .update_profile(&profile.clerk_id, &extras)
        .await?
        .with_context(|| format!("Seeded user {} vanished", profile.clerk_id))
}

/// Find the owner's listing with the same title, or create it.
/// Returns whether the listing was created by this call.
async fn seed_property(
    db: &Database,
    owner: &User,
    property: &NewProperty,
) -> Result<(Property, bool)> {
    let existing = db
        .properties()
        .list_by_owner(owner.id, None)
        .await?
        .into_iter()
        .map(|listing| listing.property)
        .find(|p| p.title == property.title);

    match existing {
        Some(found) => Ok((found, false)),
        None => {
            let created = db.properties().create(owner.id, property).await?;
            Ok((created.property, true))
        }
    }
}

fn demo_listing() -> NewProperty {
    NewProperty {
        title: String::new(),
        description: None,
        price: 0.0,
        currency: "$".into(),
        address: String::new(),
        location: None,
        city: "San Francisco".into(),
        state: Some("CA".into()),
        zip_code: None,
        country: Some("USA".into()),
        latitude: None,
        longitude: None,
        property_type: PropertyType::Apartment,
        listing_type: ListingType::Rent,
        bedrooms: 0,
        bathrooms: 0,
        sqft: 0,
        amenities: Vec::new(),
        images: Vec::new(),
        thumbnail: None,
        available: true,
        available_from: None,
        status: PropertyStatus::Active,
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
