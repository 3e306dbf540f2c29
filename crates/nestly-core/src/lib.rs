pub mod dashboard;
pub mod error;
pub mod identity;
pub mod models;
pub mod search;
pub mod traits;
pub mod uploads;
pub mod webhook;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use error::AppError;
pub use models::{
    InquiryStatus, ListingType, NotificationType, PropertyStatus, PropertyType, User, UserRole,
};
pub use search::{CountFilter, PropertySearch};
pub use traits::{IdentityDirectory, ObjectStore};
