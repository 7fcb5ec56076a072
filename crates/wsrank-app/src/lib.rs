// Library root: configuration and export, shared by the `wsrank` binary
// and the integration tests.

pub mod config;
pub mod export;
