//! Read-only data sources

pub mod device_policies;

pub use device_policies::DevicePoliciesDataSource;
