use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::WalletError;
use crate::rpc::RpcClient;

/// Time allowed to establish the TCP (and TLS) connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total time allowed for one request/response round trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking HTTP transport for JSON-RPC.
///
/// One request per call, node URL supplied per request, so a single client
/// can serve a wallet whose node URL changes (for example after a key-store
/// load).
pub struct HttpRpcClient {
    client: Client,
}

impl HttpRpcClient {
    pub fn new() -> Result<Self, WalletError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| WalletError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

impl RpcClient for HttpRpcClient {
    fn request(&self, node_url: &str, request_body: &str) -> Result<String, WalletError> {
        let response = self
            .client
            .post(node_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(request_body.to_owned())
            .send()
            .map_err(|e| WalletError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WalletError::Rpc(format!("http status {status}")));
        }

        response
            .text()
            .map_err(|e| WalletError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds() {
        assert!(HttpRpcClient::new().is_ok());
    }

    #[test]
    fn unreachable_node_is_a_transport_error() {
        let client = HttpRpcClient::new().unwrap();
        // Nothing listens on the discard port; the connection is refused.
        let result = client.request("http://127.0.0.1:9", "{}");
        assert!(matches!(result, Err(WalletError::Transport(_))));
    }

    #[test]
    fn invalid_url_is_a_transport_error() {
        let client = HttpRpcClient::new().unwrap();
        let result = client.request("not a url", "{}");
        assert!(matches!(result, Err(WalletError::Transport(_))));
    }
}
