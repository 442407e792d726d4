use async_trait::async_trait;
use log::{error, info};
use reqwest::Client as HttpClient;
use url::Url;

use super::models::{Prediction, SegmentationRequest};
use crate::config::ReplicateConfig;
use crate::error::{truncate_body, ApiError};

const PROVIDER: &str = "Replicate";

/// Remote prediction endpoints. Implemented by [`ReplicateClient`]; mocked in tests.
#[async_trait]
pub trait PredictionApi: Send + Sync {
    async fn create_prediction(&self, request: &SegmentationRequest)
        -> Result<Prediction, ApiError>;

    async fn get_prediction(&self, prediction_id: &str) -> Result<Prediction, ApiError>;
}

#[derive(Clone)]
pub struct ReplicateClient {
    http_client: HttpClient,
    api_base: String,
    api_token: String,
}

impl ReplicateClient {
    pub fn new(http_client: HttpClient, config: &ReplicateConfig) -> Self {
        Self {
            http_client,
            api_base: config.api_base.clone(),
            api_token: config.api_token.clone(),
        }
    }

    fn predictions_endpoint(&self) -> String {
        format!("{}/predictions", self.api_base)
    }

    /// Appends the id as one encoded path segment.
    fn prediction_url(&self, prediction_id: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.predictions_endpoint())
            .map_err(|e| ApiError::SegmentationStatusFailed(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::SegmentationStatusFailed(format!(
                    "{} is not a valid API base",
                    self.api_base
                ))
            })?
            .push(prediction_id);
        Ok(url)
    }
}

#[async_trait]
impl PredictionApi for ReplicateClient {
    async fn create_prediction(
        &self,
        request: &SegmentationRequest,
    ) -> Result<Prediction, ApiError> {
        let endpoint = self.predictions_endpoint();
        info!("Creating SAM-2 prediction (version {})", request.version);

        let response = self
            .http_client
            .post(&endpoint)
            .bearer_auth(&self.api_token)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::upstream(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("SAM-2 API error ({}): {}", status, truncate_body(&error_text));
            if ApiError::is_auth_status(status) {
                return Err(ApiError::UpstreamUnavailable {
                    provider: PROVIDER,
                    reason: format!("authentication rejected ({})", status.as_u16()),
                });
            }
            return Err(ApiError::SegmentationSubmitFailed {
                status: status.as_u16(),
                body: truncate_body(&error_text),
            });
        }

        response
            .json::<Prediction>()
            .await
            .map_err(|e| ApiError::SegmentationSubmitFailed {
                status: status.as_u16(),
                body: format!("unreadable prediction payload: {}", e),
            })
    }

    async fn get_prediction(&self, prediction_id: &str) -> Result<Prediction, ApiError> {
        let url = self.prediction_url(prediction_id)?;

        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| ApiError::upstream(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "Status lookup for prediction {} failed ({}): {}",
                prediction_id,
                status,
                truncate_body(&error_text)
            );
            if ApiError::is_auth_status(status) {
                return Err(ApiError::UpstreamUnavailable {
                    provider: PROVIDER,
                    reason: format!("authentication rejected ({})", status.as_u16()),
                });
            }
            return Err(ApiError::SegmentationStatusFailed(format!(
                "Replicate returned {}: {}",
                status.as_u16(),
                truncate_body(&error_text)
            )));
        }

        response
            .json::<Prediction>()
            .await
            .map_err(|e| ApiError::SegmentationStatusFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replicate::models::SegmentationInput;
    use crate::testing::spawn_stub;
    use actix_web::http::header;
    use actix_web::{web, HttpRequest, HttpResponse};
    use landscape_shared::PredictionStatus;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    type Seen = web::Data<Mutex<Vec<String>>>;

    fn client(api_base: &str) -> ReplicateClient {
        ReplicateClient::new(
            HttpClient::new(),
            &ReplicateConfig {
                api_token: "r8_test".to_string(),
                api_base: api_base.to_string(),
                sam2_version: "v".to_string(),
            },
        )
    }

    fn request() -> SegmentationRequest {
        SegmentationRequest {
            version: "sam2-rev".to_string(),
            input: SegmentationInput::new("data:image/png;base64,AAAA".to_string()),
        }
    }

    async fn accept_prediction(
        seen: Seen,
        req: HttpRequest,
        body: web::Json<Value>,
    ) -> HttpResponse {
        let auth = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let mut seen = seen.lock().unwrap();
        seen.push(auth);
        seen.push(body["version"].as_str().unwrap_or_default().to_string());
        HttpResponse::Created().json(json!({
            "id": "p1",
            "status": "starting",
            "urls": {"get": "https://api.replicate.com/v1/predictions/p1"}
        }))
    }

    async fn reject_with_long_body() -> HttpResponse {
        HttpResponse::UnprocessableEntity().body("x".repeat(2000))
    }

    async fn reject_token() -> HttpResponse {
        HttpResponse::Unauthorized().body("Invalid token")
    }

    async fn aborted_prediction(path: web::Path<String>) -> HttpResponse {
        HttpResponse::Ok().json(json!({
            "id": path.into_inner(),
            "status": "aborted",
            "output": null,
            "error": null
        }))
    }

    async fn missing_prediction() -> HttpResponse {
        HttpResponse::NotFound().body("Not found.")
    }

    #[test]
    fn prediction_id_is_a_single_path_segment() {
        let client = client("https://api.replicate.com/v1");

        let url = client.prediction_url("abc123").unwrap();
        assert_eq!(url.as_str(), "https://api.replicate.com/v1/predictions/abc123");

        let url = client.prediction_url("../../account").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.replicate.com/v1/predictions/..%2F..%2Faccount"
        );
    }

    #[actix_web::test]
    async fn unreachable_host_is_upstream_unavailable() {
        let client = client("http://127.0.0.1:9");
        let err = client.get_prediction("abc123").await.unwrap_err();
        assert!(matches!(err, ApiError::UpstreamUnavailable { provider: "Replicate", .. }));
    }

    #[actix_web::test]
    async fn create_sends_bearer_token_and_relays_prediction() {
        let seen: Seen = web::Data::new(Mutex::new(Vec::new()));
        let stub_seen = seen.clone();
        let (base, server) = spawn_stub(move |cfg| {
            cfg.app_data(stub_seen.clone())
                .route("/v1/predictions", web::post().to(accept_prediction));
        });

        let prediction = client(&format!("{}/v1", base))
            .create_prediction(&request())
            .await
            .unwrap();

        assert_eq!(prediction.id, "p1");
        assert_eq!(prediction.status, PredictionStatus::Starting);
        assert!(prediction.urls.unwrap().contains_key("get"));
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["Bearer r8_test".to_string(), "sam2-rev".to_string()]
        );
        server.stop(false).await;
    }

    #[actix_web::test]
    async fn rejected_submission_keeps_status_and_truncated_body() {
        let (base, server) = spawn_stub(|cfg| {
            cfg.route("/v1/predictions", web::post().to(reject_with_long_body));
        });

        let err = client(&format!("{}/v1", base))
            .create_prediction(&request())
            .await
            .unwrap_err();

        match err {
            ApiError::SegmentationSubmitFailed { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body.len(), 512 + 3);
                assert!(body.ends_with("..."));
            }
            other => panic!("unexpected error {:?}", other),
        }
        server.stop(false).await;
    }

    #[actix_web::test]
    async fn auth_rejection_is_upstream_unavailable() {
        let (base, server) = spawn_stub(|cfg| {
            cfg.route("/v1/predictions", web::post().to(reject_token))
                .route("/v1/predictions/{id}", web::get().to(reject_token));
        });
        let client = client(&format!("{}/v1", base));

        let err = client.create_prediction(&request()).await.unwrap_err();
        assert!(matches!(err, ApiError::UpstreamUnavailable { provider: "Replicate", .. }));

        let err = client.get_prediction("p1").await.unwrap_err();
        assert!(matches!(err, ApiError::UpstreamUnavailable { provider: "Replicate", .. }));
        server.stop(false).await;
    }

    #[actix_web::test]
    async fn lookup_relays_unlisted_status() {
        let (base, server) = spawn_stub(|cfg| {
            cfg.route("/v1/predictions/{id}", web::get().to(aborted_prediction));
        });

        let prediction = client(&format!("{}/v1", base))
            .get_prediction("p1")
            .await
            .unwrap();

        assert_eq!(prediction.id, "p1");
        assert_eq!(prediction.status, PredictionStatus::Other("aborted".to_string()));
        server.stop(false).await;
    }

    #[actix_web::test]
    async fn unknown_prediction_is_a_status_failure() {
        let (base, server) = spawn_stub(|cfg| {
            cfg.route("/v1/predictions/{id}", web::get().to(missing_prediction));
        });

        let err = client(&format!("{}/v1", base))
            .get_prediction("missing")
            .await
            .unwrap_err();

        match err {
            ApiError::SegmentationStatusFailed(message) => assert!(message.contains("404")),
            other => panic!("unexpected error {:?}", other),
        }
        server.stop(false).await;
    }
}
