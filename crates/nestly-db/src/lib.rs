pub mod config;
pub mod database;
pub mod favorite_repository;
pub mod inquiry_repository;
pub mod message_repository;
pub mod notification_repository;
pub mod property_repository;
pub mod review_repository;
pub mod user_repository;

pub use config::DatabaseConfig;
pub use database::Database;
pub use favorite_repository::FavoriteRepository;
pub use inquiry_repository::InquiryRepository;
pub use message_repository::MessageRepository;
pub use notification_repository::NotificationRepository;
pub use property_repository::PropertyRepository;
pub use review_repository::ReviewRepository;
pub use user_repository::UserRepository;

use nestly_core::AppError;

pub(crate) fn db_err(e: sqlx::Error) -> AppError {
    AppError::DatabaseError(e.to_string())
}
