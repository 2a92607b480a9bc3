//! MFA Provider
//!
//! Resources and data sources for an identity service's MFA configuration:
//!
//! - `mfa_policy`: device authentication policies
//! - `mfa_policies`: one-shot migration of device policies to FIDO2 policies
//! - `mfa_settings`: environment-wide MFA settings (a singleton per environment)
//! - `application_push_credential`: push credentials of a native application
//! - `mfa_fido2_policy`: FIDO2 policies
//! - `fido_policy`: legacy FIDO policies (deprecated)
//! - data sources `mfa_device_policies` and `mfa_policies`: device policy IDs
//!
//! [`MfaProvider`] resolves type names to implementations over one shared
//! [`MfaApi`] client.

mod attrs;
pub mod data_sources;
pub mod resources;
mod scoped;

use data_sources::DevicePoliciesDataSource;
use data_sources::device_policies;
use mfa_provider_client::MfaApi;
use mfa_provider_core::{DataSource, ProviderError, Resource, Result};
use resources::{
    DevicePolicyResource, Fido2PolicyResource, FidoPolicyResource, MfaSettingsResource,
    PoliciesMigrationResource, PushCredentialResource, device_policy, fido_policy, fido2_policy,
    mfa_settings, policies_migration, push_credential,
};
use std::sync::Arc;

const RESOURCE_TYPES: &[&str] = &[
    device_policy::TYPE_NAME,
    policies_migration::TYPE_NAME,
    mfa_settings::TYPE_NAME,
    push_credential::TYPE_NAME,
    fido2_policy::TYPE_NAME,
    fido_policy::TYPE_NAME,
];

const DATA_SOURCE_TYPES: &[&str] = &[
    device_policies::LEGACY_TYPE_NAME,
    device_policies::TYPE_NAME,
];

/// Registry of every resource and data source type
#[derive(Clone)]
pub struct MfaProvider {
    api: Arc<dyn MfaApi>,
}

impl MfaProvider {
    pub fn new(api: Arc<dyn MfaApi>) -> Self {
        Self { api }
    }

    pub fn resource_types(&self) -> &'static [&'static str] {
        RESOURCE_TYPES
    }

    pub fn data_source_types(&self) -> &'static [&'static str] {
        DATA_SOURCE_TYPES
    }

    pub fn resource(&self, type_name: &str) -> Result<Box<dyn Resource>> {
        let api = Arc::clone(&self.api);
        let resource: Box<dyn Resource> = match type_name {
            device_policy::TYPE_NAME => Box::new(DevicePolicyResource::new(api)),
            policies_migration::TYPE_NAME => Box::new(PoliciesMigrationResource::new(api)),
            mfa_settings::TYPE_NAME => Box::new(MfaSettingsResource::new(api)),
            push_credential::TYPE_NAME => Box::new(PushCredentialResource::new(api)),
            fido2_policy::TYPE_NAME => Box::new(Fido2PolicyResource::new(api)),
            fido_policy::TYPE_NAME => Box::new(FidoPolicyResource::new(api)),
            other => return Err(ProviderError::ResourceTypeNotFound(other.to_string())),
        };
        Ok(resource)
    }

    pub fn data_source(&self, type_name: &str) -> Result<Box<dyn DataSource>> {
        match type_name {
            device_policies::TYPE_NAME => {
                Ok(Box::new(DevicePoliciesDataSource::new(Arc::clone(&self.api))))
            }
            device_policies::LEGACY_TYPE_NAME => Ok(Box::new(DevicePoliciesDataSource::named(
                Arc::clone(&self.api),
                device_policies::LEGACY_TYPE_NAME,
            ))),
            other => Err(ProviderError::DataSourceNotFound(other.to_string())),
        }
    }
}
