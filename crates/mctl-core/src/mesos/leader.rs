//! Master address normalization and leader discovery.
use reqwest::{Client, StatusCode, Url, header::LOCATION};
use tracing::{debug, instrument};

use crate::error::TransportError;

/// Master asked for the leader when none is configured.
pub const DEFAULT_MASTER: &str = "127.0.0.1:5050";

/// Environment variable overriding [`DEFAULT_MASTER`] for discovery.
pub const MASTER_ENV: &str = "MESOS_MASTER";

/// Turn `host:port` or a full URL into a base URL without a trailing slash.
pub fn normalize_master(raw: &str) -> String {
    let raw = raw.trim().trim_end_matches('/');
    if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    }
}

/// Leader origin named by a `/master/redirect` response.
///
/// Mesos answers with a scheme-relative location such as `//10.0.0.2:5050`.
pub fn leader_from_location(base: &str, location: &str) -> Result<String, TransportError> {
    let base = Url::parse(base).map_err(|e| TransportError::Http(format!("{base}: {e}")))?;
    let leader = base
        .join(location)
        .map_err(|e| TransportError::Http(format!("bad leader location {location:?}: {e}")))?;
    Ok(leader.origin().ascii_serialization())
}

/// Resolve the master to talk to.
///
/// A configured address is used as given. Otherwise the default master is asked who leads.
#[instrument(level = "debug", skip(client))]
pub async fn resolve_leader(client: &Client, master: &str) -> Result<String, TransportError> {
    if !master.trim().is_empty() {
        return Ok(normalize_master(master));
    }

    let seed = std::env::var(MASTER_ENV).unwrap_or_else(|_| DEFAULT_MASTER.to_string());
    let base = normalize_master(&seed);
    let resp = client
        .get(format!("{base}/master/redirect"))
        .send()
        .await?;

    match resp.status() {
        StatusCode::TEMPORARY_REDIRECT | StatusCode::FOUND => {
            let location = resp
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| TransportError::Http("leader redirect without location".into()))?;
            let leader = leader_from_location(&base, location)?;
            debug!(%leader, "discovered leading master");
            Ok(leader)
        }
        status if status.is_success() => Ok(base),
        status => Err(TransportError::Http(format!(
            "leader discovery at {base} answered {status}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_adds_scheme_and_strips_slash() {
        assert_eq!(normalize_master("10.0.0.1:5050"), "http://10.0.0.1:5050");
        assert_eq!(normalize_master(" https://mesos.local/ "), "https://mesos.local");
    }

    #[test]
    fn scheme_relative_location_keeps_base_scheme() {
        let leader = leader_from_location("http://127.0.0.1:5050", "//10.0.0.2:5050").unwrap();
        assert_eq!(leader, "http://10.0.0.2:5050");

        let leader =
            leader_from_location("http://127.0.0.1:5050", "http://10.0.0.3:5050/master/redirect")
                .unwrap();
        assert_eq!(leader, "http://10.0.0.3:5050");
    }
}
