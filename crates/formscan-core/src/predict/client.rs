//! HTTP client for the remote prediction service.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};

use super::{PredictionInput, PredictionResponse};
use crate::error::PredictError;
use crate::models::config::PredictionConfig;

/// Forwards prediction requests to the configured endpoint.
#[derive(Clone)]
pub struct PredictionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl PredictionClient {
    /// Create a client from configuration.
    pub fn new(config: &PredictionConfig) -> Result<Self, PredictError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("formscan/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PredictError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request a prediction for `input`.
    pub async fn predict(&self, input: &PredictionInput) -> Result<String, PredictError> {
        let issues = input.validate();
        if !issues.is_empty() {
            return Err(PredictError::InvalidInput(issues));
        }

        debug!("Requesting prediction from {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(input)
            .send()
            .await
            .map_err(|e| PredictError::Request(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!("Prediction service returned {}: {}", status, body);
            return Err(PredictError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: PredictionResponse = response
            .json()
            .await
            .map_err(|e| PredictError::Decode(e.to_string()))?;

        debug!("Prediction: {}", body.prediction);
        Ok(body.prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> PredictionInput {
        PredictionInput {
            pregnancies: 1,
            glucose: 85.0,
            blood_pressure: 66.0,
            skin_thickness: 29.0,
            insulin: 0.0,
            bmi: 26.6,
            diabetes_pedigree_function: 0.351,
            age: 31,
        }
    }

    fn closed_endpoint() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{}/predict", port)
    }

    #[tokio::test]
    async fn test_unreachable_service_is_a_request_error() {
        let client = PredictionClient::new(&PredictionConfig {
            endpoint: closed_endpoint(),
            timeout_secs: 5,
        })
        .unwrap();

        assert!(matches!(
            client.predict(&input()).await,
            Err(PredictError::Request(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_input_is_not_sent() {
        let client = PredictionClient::new(&PredictionConfig {
            endpoint: closed_endpoint(),
            timeout_secs: 5,
        })
        .unwrap();
        let bad = PredictionInput {
            insulin: -3.0,
            ..input()
        };

        match client.predict(&bad).await {
            Err(PredictError::InvalidInput(issues)) => assert_eq!(issues.len(), 1),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
