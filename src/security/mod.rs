pub mod article_scanner;
pub mod token_store;

pub use article_scanner::{ArticleScanner, ScanReport, SecretFinding, Severity};
pub use token_store::TokenStore;
