//! DVLA Vehicle Enquiry Service client.

use async_trait::async_trait;
use serde::Serialize;

use super::{build_http_client, SourceError, VehicleDataSource};
use crate::config::VesConfig;
use crate::models::VesVehicle;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnquiryRequest<'a> {
    registration_number: &'a str,
}

/// Vehicle Enquiry Service client
pub struct VesClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl VesClient {
    pub fn new(config: &VesConfig) -> Self {
        Self {
            client: build_http_client(config.timeout),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

#[async_trait]
impl VehicleDataSource for VesClient {
    type Record = VesVehicle;

    async fn fetch(&self, registration: &str) -> Result<VesVehicle, SourceError> {
        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(&EnquiryRequest {
                registration_number: registration,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::from_status(response.status()));
        }

        Ok(response.json::<VesVehicle>().await?)
    }
}
