use super::{ConnectionError, ConnectionSettings};
use crate::client::TowerClient;
use tracing::{debug, info};

/// Authenticated context for one reconciliation.
///
/// Owns the API client and the credentials it carries; both go away with the
/// session. Closing is logged on drop whatever the outcome of the work.
pub struct Session {
    host: String,
    client: TowerClient,
}

impl Session {
    /// Initialise the remote client. Fails before any request is made if the
    /// host is invalid or the HTTP/TLS stack cannot be set up.
    pub fn open(settings: &ConnectionSettings) -> Result<Self, ConnectionError> {
        let client = TowerClient::new(settings)?;
        info!(
            host = %settings.host,
            api = client.base_url(),
            verify_ssl = settings.verify_ssl,
            "Opened Tower session"
        );

        Ok(Self {
            host: settings.host.clone(),
            client,
        })
    }

    pub fn api(&self) -> &TowerClient {
        &self.client
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!(host = %self.host, "Closed Tower session");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_makes_no_request() {
        // Nothing listens here; opening must still succeed.
        let settings = ConnectionSettings {
            host: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let session = Session::open(&settings).unwrap();
        assert_eq!(session.host(), "http://127.0.0.1:9");
        assert_eq!(session.api().base_url(), "http://127.0.0.1:9/api/v2/");
    }

    #[test]
    fn test_open_rejects_invalid_host() {
        let settings = ConnectionSettings {
            host: "https://bad host".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            Session::open(&settings),
            Err(ConnectionError::InvalidHost(_, _))
        ));
    }
}
