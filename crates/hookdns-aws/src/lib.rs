// # AWS Adapters
//
// This crate implements the hookdns collaborator traits on top of the AWS SDK.
//
// | Trait | Adapter | Service |
// |---|---|---|
// | `InstanceDirectory` | `Ec2InstanceDirectory` | EC2 `DescribeInstances` |
// | `RecordStore` | `Route53RecordStore` | Route 53 record sets and changes |
// | `LifecycleController` | `AutoScalingLifecycleController` | Auto Scaling `CompleteLifecycleAction` |
//
// ## Architectural Constraints
//
// ### Trust Level: Untrusted
//
// - One SDK call per trait method, no retries beyond the SDK's own
// - No polling, no background tasks (the propagation driver owns polling)
// - Errors are mapped onto `hookdns_core::Error` with the SDK error context
//
// ## Dry-Run Mode
//
// The Route 53 adapter can run in dry-run mode: it performs every read,
// validates and logs the change batch, and reports a synthetic INSYNC change
// without submitting anything.
//
// ## Credentials
//
// Region and credentials come from the standard provider chain, see
// [`load_clients`].

pub mod autoscaling;
pub mod ec2;
pub mod route53;

pub use autoscaling::AutoScalingLifecycleController;
pub use ec2::Ec2InstanceDirectory;
pub use route53::Route53RecordStore;

/// SDK clients shared by every invocation of a process
#[derive(Debug, Clone)]
pub struct AwsClients {
    /// EC2 client
    pub ec2: aws_sdk_ec2::Client,
    /// Route 53 client
    pub route53: aws_sdk_route53::Client,
    /// Auto Scaling client
    pub autoscaling: aws_sdk_autoscaling::Client,
}

/// Load the shared SDK configuration and build every client from it
pub async fn load_clients() -> AwsClients {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    AwsClients {
        ec2: aws_sdk_ec2::Client::new(&config),
        route53: aws_sdk_route53::Client::new(&config),
        autoscaling: aws_sdk_autoscaling::Client::new(&config),
    }
}
