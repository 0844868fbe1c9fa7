//! Ranger service definition for OpenMetadata.
//!
//! [`OpenMetadataService`] is what the policy manager talks to for one registered service
//! instance: it tests the connection, completes resource values and creates the default
//! policies.

pub mod client;
pub mod lookup;
pub mod policy;
pub mod validation;

use crate::{policy::DefaultPolicySynthesizer, validation::ValidationResponse};

use async_trait::async_trait;
use ranger_openmetadata_model::{
    config::ServiceConfig, lookup::ResourceLookupContext, policy::Policy,
};
use tracing::debug;

/// Operations the policy manager invokes on a service definition
#[async_trait]
pub trait RangerService: Send + Sync {
    fn service_name(&self) -> &str;

    /// Tests whether the stored configuration reaches the service
    async fn validate_config(&self) -> ValidationResponse;

    /// Candidate values for the resource currently being edited
    async fn lookup_resource(
        &self,
        context: &ResourceLookupContext,
    ) -> Result<Vec<String>, lookup::Error>;

    /// Turns the generic bootstrap policies into the service's default policies
    fn default_policies(&self, policies: Vec<Policy>) -> Result<Vec<Policy>, policy::Error>;
}

#[derive(Clone, Debug)]
pub struct OpenMetadataService {
    service_name: String,
    config: ServiceConfig,
}

impl OpenMetadataService {
    pub fn new(service_name: impl Into<String>, config: ServiceConfig) -> Self {
        OpenMetadataService {
            service_name: service_name.into(),
            config,
        }
    }
}

#[async_trait]
impl RangerService for OpenMetadataService {
    fn service_name(&self) -> &str {
        &self.service_name
    }

    async fn validate_config(&self) -> ValidationResponse {
        validation::validate_config(&self.service_name, &self.config).await
    }

    async fn lookup_resource(
        &self,
        context: &ResourceLookupContext,
    ) -> Result<Vec<String>, lookup::Error> {
        debug!(service_name = %self.service_name, ?context, "Looking up resource");
        let values = lookup::lookup_with_config(&self.config, context).await?;
        debug!(service_name = %self.service_name, ?values, "Looked up resource");
        Ok(values)
    }

    fn default_policies(&self, policies: Vec<Policy>) -> Result<Vec<Policy>, policy::Error> {
        debug!(
            service_name = %self.service_name,
            count = policies.len(),
            "Creating default policies"
        );
        DefaultPolicySynthesizer::new(&self.service_name, self.config.lookup_user.as_deref())
            .synthesize(policies)
    }
}
