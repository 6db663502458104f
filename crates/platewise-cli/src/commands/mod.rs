//! Command implementations.

pub mod analyze;
pub mod barcode;
pub mod brand;
pub mod config;
pub mod keys;
pub mod search;

pub use self::analyze::execute_analyze;
pub use self::barcode::execute_barcode;
pub use self::brand::execute_brand;
pub use self::config::execute_config;
pub use self::keys::execute_keys;
pub use self::search::execute_search;
