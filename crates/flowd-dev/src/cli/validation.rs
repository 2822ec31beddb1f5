use std::net::IpAddr;

/// Parse and validate the `--host` bind address.
///
/// Only IP addresses are accepted: the server binds without name
/// resolution, so `localhost` is rejected with a hint.
///
/// # Errors
///
/// Returns an error message if the address is empty or not an IP address.
pub fn parse_host(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("Host cannot be empty".to_string());
    }

    if s.eq_ignore_ascii_case("localhost") {
        return Err("Use 127.0.0.1 (or ::1) instead of 'localhost'".to_string());
    }

    s.parse::<IpAddr>()
        .map(|ip| ip.to_string())
        .map_err(|_| format!("Host must be an IP address: '{}'", s))
}
