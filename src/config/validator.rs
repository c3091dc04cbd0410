use crate::config::rules::{ForwardingRule, HttpRule, RouteEntry, TcpRule};
use crate::config::types::Config;
use crate::error::{AgentError, Result};
use crate::utils::validation::{is_empty_or_whitespace, validate_dial_address, validate_hostname_chars};

impl Config {
    /// Validate every section and normalize it into forwarding rules, TCP rules first.
    pub fn to_rules(&self) -> Result<Vec<ForwardingRule>> {
        let mut rules = Vec::with_capacity(self.tcp.len() + self.http.len());

        for (index, tcp) in self.tcp.iter().enumerate() {
            let context = format!("tcp[{}]", index);
            require_listen(&context, &tcp.listen)?;
            validate_expose(&context, &tcp.expose)?;
            validate_dial_address(&tcp.pass).map_err(|e| AgentError::invalid(format!("{}: pass: {}", context, e)))?;
            rules.push(ForwardingRule::Tcp(TcpRule { listen: tcp.listen.clone(), backend: tcp.pass.clone(), expose: tcp.expose.clone() }));
        }

        for (index, http) in self.http.iter().enumerate() {
            let context = format!("http[{}]", index);
            require_listen(&context, &http.listen)?;
            if http.proxy.is_empty() {
                return Err(AgentError::invalid(format!("{}: at least one proxy entry is required", context)));
            }
            let mut routes = Vec::with_capacity(http.proxy.len());
            for (route_index, proxy) in http.proxy.iter().enumerate() {
                let context = format!("{}.proxy[{}]", context, route_index);
                validate_expose(&context, &proxy.expose)?;
                validate_dial_address(&proxy.pass).map_err(|e| AgentError::invalid(format!("{}: pass: {}", context, e)))?;
                let route = RouteEntry::new(proxy.expose.clone(), &proxy.location, proxy.pass.clone())
                    .map_err(|source| AgentError::InvalidPattern { pattern: proxy.location.clone(), source })?;
                routes.push(route);
            }
            rules.push(ForwardingRule::Http(HttpRule { listen: http.listen.clone(), routes }));
        }

        Ok(rules)
    }
}

fn require_listen(context: &str, listen: &str) -> Result<()> {
    if is_empty_or_whitespace(listen) {
        return Err(AgentError::invalid(format!("{}: listen address must not be empty", context)));
    }
    Ok(())
}

fn validate_expose(context: &str, expose: &str) -> Result<()> {
    if !validate_hostname_chars(expose) {
        return Err(AgentError::invalid(format!("{}: expose '{}' is not a valid domain", context, expose)));
    }
    Ok(())
}
