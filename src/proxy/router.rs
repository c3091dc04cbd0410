use crate::config::rules::RouteEntry;
use crate::proxy::request_head::RequestHead;
use log::info;

/// Where a request ends up, and whether a configured route picked it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Routed { backend: String, expose: String, location: String },
    Fallthrough { backend: String },
}

impl Resolution {
    pub fn backend(&self) -> &str {
        match self {
            Resolution::Routed { backend, .. } | Resolution::Fallthrough { backend } => backend,
        }
    }
}

/// First route whose expose matches the Host and whose location matches the target wins.
/// Without a match the Host header itself (default port 80) is the backend.
pub fn resolve_backend(routes: &[RouteEntry], head: &RequestHead) -> Resolution {
    let target = head.route_target();
    let hostname = head.hostname();
    let candidate = routes.iter().filter(|route| route.applies_to(hostname) || route.applies_to(&head.host)).find(|route| route.matches(target));

    match candidate {
        Some(route) => {
            Resolution::Routed { backend: route.backend.clone(), expose: route.expose.clone(), location: route.location() }
        }
        None => {
            let backend = head.default_backend();
            info!("Forwarded original request URI, not matched to the configured forwarding routing. <{} {}> => {}", head.host, target, backend);
            Resolution::Fallthrough { backend }
        }
    }
}
