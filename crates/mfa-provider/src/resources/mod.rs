//! Managed resource types

pub mod device_policy;
pub mod fido2_policy;
pub mod fido_policy;
pub mod mfa_settings;
pub mod policies_migration;
pub mod push_credential;

pub use device_policy::DevicePolicyResource;
pub use fido2_policy::Fido2PolicyResource;
pub use fido_policy::FidoPolicyResource;
pub use mfa_settings::MfaSettingsResource;
pub use policies_migration::PoliciesMigrationResource;
pub use push_credential::PushCredentialResource;
