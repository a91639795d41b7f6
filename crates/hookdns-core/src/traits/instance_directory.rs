// # Instance Directory Trait
//
// Defines the interface for looking up compute instances.
//
// ## Implementations
//
// - EC2: `hookdns-aws` crate (`Ec2InstanceDirectory`)
//
// ## Usage
//
// ```rust,ignore
// use hookdns_core::InstanceDirectory;
//
// let reservations = directory
//     .describe_instances(&["i-123456789".to_string()])
//     .await?;
// ```

use async_trait::async_trait;

/// A group of instances returned together by the directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reservation {
    /// Instances in this reservation
    pub instances: Vec<InstanceDescription>,
}

/// Network attributes of a single instance, as reported by the directory
///
/// Any field may be missing. Terminating instances have usually released
/// their addresses by the time the lifecycle hook fires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceDescription {
    /// The instance ID
    pub instance_id: Option<String>,
    /// Primary private IPv4 address
    pub private_ip_address: Option<String>,
    /// Public IPv4 address
    pub public_ip_address: Option<String>,
}

/// Trait for instance directory implementations
///
/// # Trust Level: Untrusted
///
/// Directories perform exactly one API call per invocation and return the
/// raw result. Deciding what an empty result means, and whether to retry,
/// belongs to the caller.
#[async_trait]
pub trait InstanceDirectory: Send + Sync {
    /// Describe the given instances
    ///
    /// # Parameters
    ///
    /// - `instance_ids`: Instance IDs to filter on
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Reservation>)`: Matching reservations, possibly empty
    /// - `Err(Error)`: Transport or API failure
    async fn describe_instances(
        &self,
        instance_ids: &[String],
    ) -> Result<Vec<Reservation>, crate::Error>;

    /// Get the directory name (for logging/debugging)
    fn directory_name(&self) -> &'static str;
}
