#![allow(dead_code)]

pub mod failing;

pub use failing::*;
pub use fixtures::*;

use medreq_store::Config;
use std::sync::OnceLock;

pub fn init_tracing() {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(medreq_store::logging::init_simple_logging);
}

/// Database for the PostgreSQL tests: `MEDREQ_TEST_DATABASE_URL`, then
/// `database.test_database_url` from configuration
pub fn test_database_url() -> Option<String> {
    std::env::var("MEDREQ_TEST_DATABASE_URL").ok().or_else(|| {
        Config::load()
            .ok()
            .and_then(|config| config.database.test_database_url)
    })
}
