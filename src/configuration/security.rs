#[cfg(test)]
#[path = "security_test.rs"]
mod tests;

use url::Url;

use super::Config;
use super::ConfigKey;

pub fn is_development_mode() -> bool {
    return Config::get(ConfigKey::Environment) == "dev";
}

/// Whether an embedding origin is allowed to host the client.
pub fn is_allowed_domain(origin: &str) -> bool {
    return is_allowed_origin(origin, &Config::get(ConfigKey::AllowedEmbedDomain));
}

fn host_of(value: &str) -> Option<String> {
    let parsed = Url::parse(value.trim_end_matches('/')).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }

    return parsed.host_str().map(|host| return host.to_lowercase());
}

/// The configured domain's registrable suffix is what counts: any subdomain
/// of it may embed, including the apex itself.
pub fn is_allowed_origin(origin: &str, allowed: &str) -> bool {
    let origin_host = match host_of(origin) {
        Some(host) => host,
        None => return false,
    };
    let allowed_host = match host_of(allowed) {
        Some(host) => host,
        None => return false,
    };

    let labels = allowed_host.split('.').collect::<Vec<&str>>();
    if labels.len() < 2 {
        return false;
    }
    let apex = labels[labels.len() - 2..].join(".");

    return origin_host == apex || origin_host.ends_with(&format!(".{apex}"));
}
