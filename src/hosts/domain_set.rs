use std::collections::BTreeMap;

/// Address every exposed domain is pointed at.
pub const LOOPBACK_IP: &str = "127.0.0.1";

/// Domains to inject, grouped by the IP they resolve to. Domain order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostsDomainSet {
    entries: BTreeMap<String, Vec<String>>,
}

impl HostsDomainSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set mapping every given domain to the loopback address.
    pub fn loopback<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for domain in domains {
            set.insert(LOOPBACK_IP, domain);
        }
        set
    }

    /// Add a domain under an IP, ignoring case-insensitive duplicates.
    pub fn insert(&mut self, ip: impl Into<String>, domain: impl Into<String>) {
        let domain = domain.into();
        let domains = self.entries.entry(ip.into()).or_default();
        if !domains.iter().any(|d| d.eq_ignore_ascii_case(&domain)) {
            domains.push(domain);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|d| d.is_empty())
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.entries.values().flatten().map(String::as_str)
    }

    /// One hosts line per IP: `ip<TAB><TAB>domain1<TAB><TAB>domain2...`
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().filter(|(_, domains)| !domains.is_empty()).map(|(ip, domains)| format_line(ip, domains)).collect()
    }
}

pub fn format_line(ip: &str, domains: &[String]) -> String {
    format!("{}\t\t{}", ip, domains.join("\t\t"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_domain_line() {
        let set = HostsDomainSet::loopback(["a.test"]);
        assert_eq!(set.lines(), vec!["127.0.0.1\t\ta.test".to_string()]);
    }

    #[test]
    fn test_multiple_domains_keep_order() {
        let set = HostsDomainSet::loopback(["b.test", "a.test", "B.TEST", "c.test"]);
        assert_eq!(set.lines(), vec!["127.0.0.1\t\tb.test\t\ta.test\t\tc.test".to_string()]);
        assert_eq!(set.domains().collect::<Vec<_>>(), vec!["b.test", "a.test", "c.test"]);
    }

    #[test]
    fn test_empty_set() {
        let set = HostsDomainSet::new();
        assert!(set.is_empty());
        assert!(set.lines().is_empty());
    }

    #[test]
    fn test_multiple_ips() {
        let mut set = HostsDomainSet::new();
        set.insert("127.0.0.1", "a.test");
        set.insert("::1", "a.test");
        assert_eq!(set.lines().len(), 2);
    }
}
