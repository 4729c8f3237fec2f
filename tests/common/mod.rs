//! Shared test support.

pub mod fake_transport;

use tracing_subscriber::EnvFilter;

/// Install a tracing subscriber writing to the test output; later calls are
/// no-ops. Run tests with `RUST_LOG=jiraquery=debug` to see the client's
/// retry decisions.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
