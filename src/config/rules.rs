use regex::Regex;
use std::fmt::Display;

/// Prefix on a `location` that inverts its match.
pub const NEGATION_MARKER: char = '!';

/// A validated forwarding rule, normalized from either config section.
#[derive(Debug, Clone)]
pub enum ForwardingRule {
    Tcp(TcpRule),
    Http(HttpRule),
}

#[derive(Debug, Clone)]
pub struct TcpRule {
    pub listen: String,
    pub backend: String,
    pub expose: String,
}

#[derive(Debug, Clone)]
pub struct HttpRule {
    pub listen: String,
    pub routes: Vec<RouteEntry>,
}

#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub expose: String,
    pub pattern: Regex,
    pub negated: bool,
    pub backend: String,
}

impl ForwardingRule {
    pub fn listen(&self) -> &str {
        match self {
            ForwardingRule::Tcp(rule) => &rule.listen,
            ForwardingRule::Http(rule) => &rule.listen,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ForwardingRule::Tcp(_) => "TCP",
            ForwardingRule::Http(_) => "HTTP",
        }
    }

    /// Domains this rule needs resolved to loopback, deduplicated case-insensitively in config order.
    pub fn exposed_domains(&self) -> Vec<String> {
        match self {
            ForwardingRule::Tcp(rule) => vec![rule.expose.clone()],
            ForwardingRule::Http(rule) => {
                let mut domains: Vec<String> = Vec::new();
                for route in &rule.routes {
                    if !domains.iter().any(|d| d.eq_ignore_ascii_case(&route.expose)) {
                        domains.push(route.expose.clone());
                    }
                }
                domains
            }
        }
    }
}

impl RouteEntry {
    /// Build an entry from a raw `location`, splitting off the negation marker.
    pub fn new(expose: impl Into<String>, location: &str, backend: impl Into<String>) -> Result<Self, regex::Error> {
        let (negated, source) = match location.strip_prefix(NEGATION_MARKER) {
            Some(rest) => (true, rest),
            None => (false, location),
        };
        Ok(Self { expose: expose.into(), pattern: Regex::new(source)?, negated, backend: backend.into() })
    }

    pub fn applies_to(&self, host: &str) -> bool {
        self.expose.eq_ignore_ascii_case(host)
    }

    pub fn matches(&self, target: &str) -> bool {
        self.pattern.is_match(target) != self.negated
    }

    pub fn location(&self) -> String {
        if self.negated { format!("{}{}", NEGATION_MARKER, self.pattern.as_str()) } else { self.pattern.as_str().to_string() }
    }
}

impl Display for ForwardingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForwardingRule::Tcp(rule) => write!(f, "tcp {} ({} => {})", rule.listen, rule.expose, rule.backend),
            ForwardingRule::Http(rule) => {
                write!(f, "http {}", rule.listen)?;
                for route in &rule.routes {
                    write!(f, "\n  {} [{}] => {}", route.expose, route.location(), route.backend)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_entry_plain_pattern() {
        let route = RouteEntry::new("a.test", "/api", "127.0.0.1:9001").unwrap();
        assert!(!route.negated);
        assert!(route.matches("/api/x"));
        assert!(!route.matches("/web"));
        assert_eq!(route.location(), "/api");
    }

    #[test]
    fn test_route_entry_negated_pattern() {
        let route = RouteEntry::new("a.test", "!/public", "127.0.0.1:9002").unwrap();
        assert!(route.negated);
        assert!(!route.matches("/public"));
        assert!(route.matches("/private"));
        assert!(route.matches("/"));
        assert_eq!(route.location(), "!/public");
    }

    #[test]
    fn test_empty_location_matches_everything() {
        let route = RouteEntry::new("a.test", "", "127.0.0.1:9001").unwrap();
        assert!(route.matches("/"));
        assert!(route.matches("a.test:443"));

        let never = RouteEntry::new("a.test", "!", "127.0.0.1:9001").unwrap();
        assert!(!never.matches("/anything"));
    }

    #[test]
    fn test_route_entry_invalid_pattern() {
        assert!(RouteEntry::new("a.test", "/api(", "127.0.0.1:9001").is_err());
    }

    #[test]
    fn test_applies_to_is_case_insensitive() {
        let route = RouteEntry::new("A.Test", "/", "127.0.0.1:9001").unwrap();
        assert!(route.applies_to("a.test"));
        assert!(route.applies_to("A.TEST"));
        assert!(!route.applies_to("b.test"));
    }

    #[test]
    fn test_exposed_domains_dedup() {
        let rule = ForwardingRule::Http(HttpRule {
            listen: "127.0.0.1:80".to_string(),
            routes: vec![
                RouteEntry::new("api.test", "/v1", "127.0.0.1:1").unwrap(),
                RouteEntry::new("web.test", "", "127.0.0.1:2").unwrap(),
                RouteEntry::new("API.test", "/v2", "127.0.0.1:3").unwrap(),
            ],
        });
        assert_eq!(rule.exposed_domains(), vec!["api.test".to_string(), "web.test".to_string()]);
        assert_eq!(rule.kind(), "HTTP");
        assert_eq!(rule.listen(), "127.0.0.1:80");
    }
}
