//! REST client for the hub control plane

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use slog::{debug, warn, Logger};

use crate::hub::api::{ApiError, HubApi};
use crate::resources::{DrPlacementControl, DrPolicy, Placement, PlacementDecision};

const OCM_API: &str = "apis/cluster.open-cluster-management.io/v1beta1";
const RAMEN_API: &str = "apis/ramendr.openshift.io/v1alpha1";

const KIND_PLACEMENT: &str = "placement";
const KIND_PLACEMENT_DECISION: &str = "placementdecision";
const KIND_DRPC: &str = "drplacementcontrol";
const KIND_DR_POLICY: &str = "drpolicy";

/// Hub accessor talking Kubernetes-style REST paths over HTTP.
pub struct HttpHub {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
    logger: Logger,
}

impl HttpHub {
    pub fn new(base_url: &str, token: Option<String>, logger: Logger) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
            logger,
        }
    }

    fn url(&self, api: &str, namespace: Option<&str>, plural: &str, name: Option<&str>) -> String {
        let mut url = format!("{}/{}", self.base_url, api);
        if let Some(ns) = namespace {
            url.push_str(&format!("/namespaces/{}", ns));
        }
        url.push_str(&format!("/{}", plural));
        if let Some(name) = name {
            url.push_str(&format!("/{}", name));
        }
        url
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn check_status(
        &self,
        response: reqwest::Response,
        kind: &'static str,
        name: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let reason = response.text().await.unwrap_or_default();
        warn!(self.logger, "hub request returned error status";
            "status" => status.as_u16(),
            "kind" => kind,
            "name" => name,
        );

        match status.as_u16() {
            404 => Err(ApiError::NotFound {
                kind,
                name: name.to_string(),
            }),
            409 => Err(ApiError::AlreadyExists {
                kind,
                name: name.to_string(),
            }),
            code => Err(ApiError::Status { code, reason }),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        kind: &'static str,
        name: &str,
    ) -> Result<T, ApiError> {
        debug!(self.logger, "GET"; "url" => url);

        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| ApiError::Request {
                reason: e.to_string(),
            })?;

        let response = self.check_status(response, kind, name).await?;
        response.json().await.map_err(|e| ApiError::Serialization {
            reason: e.to_string(),
        })
    }

    async fn send_json<T: Serialize>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: &T,
        kind: &'static str,
        name: &str,
    ) -> Result<(), ApiError> {
        debug!(self.logger, "write"; "method" => method.as_str(), "url" => url);

        let response = self
            .request(method, url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Request {
                reason: e.to_string(),
            })?;

        self.check_status(response, kind, name).await?;
        Ok(())
    }
}

#[async_trait]
impl HubApi for HttpHub {
    async fn get_placement(&self, namespace: &str, name: &str) -> Result<Placement, ApiError> {
        let url = self.url(OCM_API, Some(namespace), "placements", Some(name));
        self.get_json(&url, KIND_PLACEMENT, name).await
    }

    async fn update_placement(&self, placement: &Placement) -> Result<(), ApiError> {
        let url = self.url(
            OCM_API,
            Some(&placement.metadata.namespace),
            "placements",
            Some(&placement.metadata.name),
        );
        self.send_json(
            reqwest::Method::PUT,
            &url,
            placement,
            KIND_PLACEMENT,
            &placement.metadata.name,
        )
        .await
    }

    async fn get_placement_decision(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<PlacementDecision, ApiError> {
        let url = self.url(OCM_API, Some(namespace), "placementdecisions", Some(name));
        self.get_json(&url, KIND_PLACEMENT_DECISION, name).await
    }

    async fn get_drpc(&self, namespace: &str, name: &str) -> Result<DrPlacementControl, ApiError> {
        let url = self.url(RAMEN_API, Some(namespace), "drplacementcontrols", Some(name));
        self.get_json(&url, KIND_DRPC, name).await
    }

    async fn create_drpc(&self, drpc: &DrPlacementControl) -> Result<(), ApiError> {
        let url = self.url(
            RAMEN_API,
            Some(&drpc.metadata.namespace),
            "drplacementcontrols",
            None,
        );
        self.send_json(
            reqwest::Method::POST,
            &url,
            drpc,
            KIND_DRPC,
            &drpc.metadata.name,
        )
        .await
    }

    async fn update_drpc(&self, drpc: &DrPlacementControl) -> Result<(), ApiError> {
        let url = self.url(
            RAMEN_API,
            Some(&drpc.metadata.namespace),
            "drplacementcontrols",
            Some(&drpc.metadata.name),
        );
        self.send_json(
            reqwest::Method::PUT,
            &url,
            drpc,
            KIND_DRPC,
            &drpc.metadata.name,
        )
        .await
    }

    async fn delete_drpc(&self, namespace: &str, name: &str) -> Result<(), ApiError> {
        let url = self.url(RAMEN_API, Some(namespace), "drplacementcontrols", Some(name));
        debug!(self.logger, "DELETE"; "url" => &url);

        let response = self
            .request(reqwest::Method::DELETE, &url)
            .send()
            .await
            .map_err(|e| ApiError::Request {
                reason: e.to_string(),
            })?;

        self.check_status(response, KIND_DRPC, name).await?;
        Ok(())
    }

    async fn get_dr_policy(&self, name: &str) -> Result<DrPolicy, ApiError> {
        let url = self.url(RAMEN_API, None, "drpolicies", Some(name));
        self.get_json(&url, KIND_DR_POLICY, name).await
    }
}
