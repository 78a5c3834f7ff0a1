//! Configuration module

mod site;

pub use site::BuildConfig;
pub use site::ContentStoreConfig;
pub use site::ModerationConfig;
pub use site::SiteConfig;
