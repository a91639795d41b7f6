//! EC2 instance directory

use async_trait::async_trait;
use aws_sdk_ec2::error::DisplayErrorContext;
use hookdns_core::traits::{InstanceDescription, InstanceDirectory, Reservation};
use hookdns_core::{Error, Result};

/// Instance directory backed by EC2 `DescribeInstances`
#[derive(Debug, Clone)]
pub struct Ec2InstanceDirectory {
    client: aws_sdk_ec2::Client,
}

impl Ec2InstanceDirectory {
    /// Create a directory over an EC2 client
    pub fn new(client: aws_sdk_ec2::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InstanceDirectory for Ec2InstanceDirectory {
    async fn describe_instances(&self, instance_ids: &[String]) -> Result<Vec<Reservation>> {
        let output = self
            .client
            .describe_instances()
            .set_instance_ids(Some(instance_ids.to_vec()))
            .send()
            .await
            .map_err(|e| Error::lookup(format!("DescribeInstances failed: {}", DisplayErrorContext(&e))))?;

        Ok(output.reservations().iter().map(reservation_from_sdk).collect())
    }

    fn directory_name(&self) -> &'static str {
        "ec2"
    }
}

fn reservation_from_sdk(reservation: &aws_sdk_ec2::types::Reservation) -> Reservation {
    Reservation {
        instances: reservation
            .instances()
            .iter()
            .map(|instance| InstanceDescription {
                instance_id: instance.instance_id().map(str::to_string),
                private_ip_address: instance.private_ip_address().map(str::to_string),
                public_ip_address: instance.public_ip_address().map(str::to_string),
            })
            .collect(),
    }
}
