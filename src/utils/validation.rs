//! Common validation utilities shared across modules

/// Check if a string is empty or only whitespace
pub fn is_empty_or_whitespace(s: &str) -> bool {
    s.trim().is_empty()
}

/// Validate that a hostname/domain doesn't contain invalid characters
pub fn validate_hostname_chars(hostname: &str) -> bool {
    !hostname.is_empty()
        && hostname.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        && !hostname.starts_with('-')
        && !hostname.ends_with('-')
}

/// Split an address into its host and port parts, if it carries a port.
/// Bracketed IPv6 literals keep their brackets: `[::1]:80` -> (`[::1]`, `80`).
pub fn split_host_port(addr: &str) -> Option<(&str, &str)> {
    if addr.starts_with('[') {
        let end = addr.find("]:")?;
        return Some((&addr[..=end], &addr[end + 2..]));
    }
    let (host, port) = addr.rsplit_once(':')?;
    if host.contains(':') {
        // bare IPv6 literal without a port
        return None;
    }
    Some((host, port))
}

/// Validate a `host:port` dial address such as a backend `pass` value.
pub fn validate_dial_address(addr: &str) -> Result<(), String> {
    let (host, port) = split_host_port(addr).ok_or_else(|| format!("Address '{}' must be in host:port form", addr))?;
    if is_empty_or_whitespace(host) {
        return Err(format!("Address '{}' is missing a host", addr));
    }
    validate_port_range(port).map_err(|e| format!("Address '{}': {}", addr, e))
}

/// Validate that a port string is a number in valid range (1-65535)
pub fn validate_port_range(port: &str) -> Result<(), String> {
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err("Port must be between 1 and 65535".to_string()),
        Ok(_) => Ok(()),
    }
}
