//! HTTP client for the dam monitoring API.
//!
//! Implements [`ObservationGateway`] and [`AuthGateway`] over reqwest.
//! Every payload is wrapped in a `{"data": ...}` envelope by the server;
//! error responses carry a message string in the same `data` slot.

use std::rc::Rc;

use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::auth::{AuthGateway, LoginRequest, TokenStore, UserInfo};
use crate::error::{DmsError, Result};
use crate::gateway::ObservationGateway;
use crate::observation::{ExtensometerRecord, HydrostaticRecord, InvertedPlumbRecord};
use crate::point::SensorPoint;
use crate::stats::SensorStats;
use crate::window::{ObservationQuery, ObservationWindow};

/// Response envelope every API route wraps its payload in.
#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// New extensometer observation (write side).
#[derive(Debug, Clone, Serialize)]
pub struct NewExtensometer {
    pub sensor_code: String,
    pub observation_time: chrono::NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservoir_level: Option<f64>,
    pub value: f64,
}

/// New hydrostatic-level observation (write side).
#[derive(Debug, Clone, Serialize)]
pub struct NewHydrostaticLevel {
    pub sensor_code: String,
    pub observation_time: chrono::NaiveDateTime,
    pub value: f64,
}

/// New inverted plumb line observation (write side).
#[derive(Debug, Clone, Serialize)]
pub struct NewInvertedPlumb {
    pub sensor_code: String,
    pub observation_time: chrono::NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservoir_level: Option<f64>,
    pub lr_value: f64,
    pub ud_value: f64,
}

/// HTTP implementation of the remote data gateway.
///
/// The bearer token is read from the shared [`TokenStore`] on every
/// request rather than baked into default headers: login and logout can
/// happen between requests, and every caller sharing the store must see
/// the change immediately.
pub struct HttpGateway {
    base_url: String,
    client: Client,
    tokens: Rc<dyn TokenStore>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, tokens: Rc<dyn TokenStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
            tokens,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a non-success response to an error, preferring the message
    /// the API put in its envelope over the bare status code.
    fn error_from(status: reqwest::StatusCode, body: &str) -> DmsError {
        if let Ok(envelope) = serde_json::from_str::<Envelope<String>>(body) {
            return DmsError::Api(envelope.data);
        }
        DmsError::Status {
            status: status.as_u16(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.endpoint(path);
        debug!("GET {}", url);
        let mut request = self.client.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.tokens.token() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Self::error_from(status, &body));
        }
        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| DmsError::ResponseParse(e.to_string()))?;
        Ok(envelope.data)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.endpoint(path);
        debug!("POST {}", url);
        let mut request = self.client.post(&url).json(body);
        if let Some(token) = self.tokens.token() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Self::error_from(status, &text));
        }
        let envelope: Envelope<T> =
            serde_json::from_str(&text).map_err(|e| DmsError::ResponseParse(e.to_string()))?;
        Ok(envelope.data)
    }

    /// Fetch a single monitoring point by code. The observation layer
    /// only ever reads the full catalog; this is for direct lookups.
    pub async fn get_point(&self, code: &str) -> Result<SensorPoint> {
        self.get_json(&format!("/points/{code}"), &[]).await
    }

    /// Record a new extensometer observation.
    pub async fn add_extensometer(&self, observation: &NewExtensometer) -> Result<()> {
        let path = format!("/data/{}/extensometer", observation.sensor_code);
        self.post_json::<_, serde_json::Value>(&path, observation)
            .await?;
        Ok(())
    }

    /// Record a new hydrostatic-level observation.
    pub async fn add_hydrostatic_level(&self, observation: &NewHydrostaticLevel) -> Result<()> {
        let path = format!("/data/{}/hydrostatic-level", observation.sensor_code);
        self.post_json::<_, serde_json::Value>(&path, observation)
            .await?;
        Ok(())
    }

    /// Record a new inverted plumb line observation.
    pub async fn add_inverted_plumb_line(&self, observation: &NewInvertedPlumb) -> Result<()> {
        let path = format!("/data/{}/inverted-plumb-line", observation.sensor_code);
        self.post_json::<_, serde_json::Value>(&path, observation)
            .await?;
        Ok(())
    }
}

impl ObservationGateway for HttpGateway {
    async fn get_points(&self, window: Option<&ObservationWindow>) -> Result<Vec<SensorPoint>> {
        let query = window.map(ObservationWindow::query_pairs).unwrap_or_default();
        self.get_json("/points", &query).await
    }

    async fn get_stats(&self, code: &str) -> Result<SensorStats> {
        self.get_json(&format!("/stats/points/{code}"), &[]).await
    }

    async fn get_extensometer(
        &self,
        query: &ObservationQuery,
    ) -> Result<Vec<ExtensometerRecord>> {
        let path = format!("/data/{}/extensometer", query.point_code);
        self.get_json(&path, &query.window.query_pairs()).await
    }

    async fn get_hydrostatic_level(
        &self,
        query: &ObservationQuery,
    ) -> Result<Vec<HydrostaticRecord>> {
        let path = format!("/data/{}/hydrostatic-level", query.point_code);
        self.get_json(&path, &query.window.query_pairs()).await
    }

    async fn get_inverted_plumb_line(
        &self,
        query: &ObservationQuery,
    ) -> Result<Vec<InvertedPlumbRecord>> {
        let path = format!("/data/{}/inverted-plumb-line", query.point_code);
        self.get_json(&path, &query.window.query_pairs()).await
    }
}

impl AuthGateway for HttpGateway {
    async fn login(&self, request: &LoginRequest) -> Result<String> {
        self.post_json("/auth/login", request).await
    }

    async fn get_me(&self) -> Result<UserInfo> {
        self.get_json("/auth/me", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_unwraps_record_arrays() {
        let body = r#"{"data":[{"sensor_code":"TC-02","ob_time":"2024-01-01T00:00:00","value":3.5}]}"#;
        let envelope: Envelope<Vec<HydrostaticRecord>> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].value, 3.5);
    }

    #[test]
    fn error_body_message_is_preferred_over_status() {
        let err = HttpGateway::error_from(
            reqwest::StatusCode::UNAUTHORIZED,
            r#"{"data":"token expired"}"#,
        );
        assert!(matches!(err, DmsError::Api(message) if message == "token expired"));
    }

    #[test]
    fn bare_status_when_body_is_not_an_envelope() {
        let err = HttpGateway::error_from(reqwest::StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert!(matches!(err, DmsError::Status { status: 502 }));
    }
}
