//! Skips wiremock tests where localhost sockets cannot be bound.
//!
//! Set `TOPIC_DISCOVERY_REQUIRE_SOCKET_TESTS=1` in CI to turn a skip into a
//! failure.

use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "TOPIC_DISCOVERY_REQUIRE_SOCKET_TESTS";

#[must_use]
pub fn socket_tests_required() -> bool {
    std::env::var(REQUIRE_ENV)
        .ok()
        .is_some_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

fn skip_message(location: &Location<'_>) -> String {
    format!(
        "[socket-bound-test] cannot bind localhost socket at {}:{}; mock providers cannot run here",
        location.file(),
        location.line()
    )
}

#[track_caller]
#[must_use]
pub fn should_skip_socket_bound_test() -> bool {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return false;
    }

    let message = skip_message(Location::caller());
    assert!(
        !socket_tests_required(),
        "{message}. Set {REQUIRE_ENV}=0 to allow local skip behavior."
    );

    eprintln!("{message}. Skipping test. Set {REQUIRE_ENV}=1 to fail-fast instead.");
    true
}

/// Starts a mock server, or returns `None` when sockets are unavailable.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if should_skip_socket_bound_test() {
        None
    } else {
        Some(MockServer::start().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_message_names_the_call_site() {
        let message = skip_message(Location::caller());
        assert!(message.starts_with("[socket-bound-test] cannot bind localhost socket at "));
        assert!(message.contains("socket_guard.rs"));
        assert!(message.ends_with("mock providers cannot run here"));
    }
}
