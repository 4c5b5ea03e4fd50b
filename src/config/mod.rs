//! Configuration module

mod site;

pub use site::BuildMode;
pub use site::ContentSource;
pub use site::EmbedConfig;
pub use site::FeedConfig;
pub use site::SiteConfig;
pub use site::SocialVideoConfig;
