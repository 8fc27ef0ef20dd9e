pub mod auth;
pub use auth::AuthService;
pub mod import_service;
pub use import_service::ImportService;
pub mod order_service;
pub use order_service::OrderService;
pub mod rotation_service;
pub use rotation_service::RotationService;
pub mod spreadsheet;
