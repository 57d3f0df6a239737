pub mod core;
pub mod orchestration;
pub mod platforms;
pub mod security;

pub use self::core::*;
pub use orchestration::{PostOrchestrator, PublishHistory};
pub use security::{ArticleScanner, ScanReport, SecretFinding, TokenStore};
