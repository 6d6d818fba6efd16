use async_trait::async_trait;

mod context;
mod error;
mod model;

pub use context::Ec2Context;
pub use error::ComputeError;
pub use model::{InstanceDescription, Tags};

/// Extracts instance metadata from the compute API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// All instances visible to the caller, in API order.
    async fn list_instances(&self) -> Result<Vec<InstanceDescription>, ComputeError>;

    /// Total size, in GiB, of the EBS volumes attached to the instance.
    async fn attached_volume_size_gib(&self, instance_id: &str) -> Result<u64, ComputeError>;
}
