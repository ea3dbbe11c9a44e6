use std::sync::Arc;

use alertgate_core::{AlertGateway, AlertSource, Clock, CredentialStore, TokenIssuer};

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub tokens: Arc<TokenIssuer>,
    pub credentials: Arc<dyn CredentialStore>,
    pub gateway: Arc<AlertGateway>,
}

impl AppState {
    /// Builds the process-wide services once; handlers share them through clones.
    pub fn new(
        config: ServerConfig,
        credentials: Arc<dyn CredentialStore>,
        source: Arc<dyn AlertSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tokens = TokenIssuer::new(config.auth.jwt_secret.as_bytes(), config.token_ttl());
        let gateway = AlertGateway::new(source, config.gateway_settings(), clock);

        Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            credentials,
            gateway: Arc::new(gateway),
        }
    }
}
