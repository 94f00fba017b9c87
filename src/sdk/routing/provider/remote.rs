use crate::sdk::config::DirectionsConfig;
use crate::sdk::form::request::TripRequest;
use crate::sdk::routing::error::{ApiErrorPayload, RoutingError};
use crate::sdk::routing::service::DirectionsProvider;
use crate::sdk::routing::types::RouteResponse;
use crate::sdk::util::rate_limit::Limiter;
use reqwest::Client;

const DIRECTIONS_PATH: &str = "/maps/api/directions/json";

// --- Remote Provider Implementation ---
pub struct RemoteDirectionsProvider {
    client: Client,
    api_key: String,
    base_url: String,
    limiter: Limiter,
}

impl RemoteDirectionsProvider {
    pub fn new(config: &DirectionsConfig, limiter: Limiter) -> Result<Self, RoutingError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter,
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url, DIRECTIONS_PATH)
    }
}

impl DirectionsProvider for RemoteDirectionsProvider {
    async fn directions(&self, request: &TripRequest) -> Result<RouteResponse, RoutingError> {
        log::debug!(
            "[PROVIDER] Requesting {} directions: \"{}\" -> \"{}\"",
            request.mode.as_str(),
            request.origin,
            request.destination
        );
        self.limiter.until_ready().await;

        let mut params = request.query_params();
        params.push(("key", self.api_key.clone()));
        let response = self.client.get(self.url()).query(&params).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // The endpoint sometimes reports failures as a normal body on a non-2xx status.
            if let Ok(payload) = serde_json::from_str::<ApiErrorPayload>(&text) {
                return Err(RoutingError::Api {
                    message: payload
                        .error_message
                        .unwrap_or_else(|| payload.status.clone()),
                    status: payload.status,
                });
            }
            log::error!(
                "Directions API returned non-success status: {}. Unparseable Body: {}",
                status,
                text
            );
            return Err(RoutingError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let routes = RouteResponse::from_json(&text).map_err(|e| {
            if let RoutingError::Parse(ref parse) = e {
                log::error!(
                    "Failed to parse DirectionsResponse. URL: {}\nError: {}. Body: {}",
                    self.url(),
                    parse,
                    text
                );
            }
            e
        })?;
        log::debug!("[PROVIDER] {} alternative(s) returned", routes.len());
        Ok(routes)
    }
}
