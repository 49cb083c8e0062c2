//! Resource providers: per-kind implementations of
//! [`ResourceProvider`](crate::orchestrator::ResourceProvider)

pub mod network_interface_group;
pub mod placement_group;
pub mod volume;

pub use network_interface_group::{NetworkInterfaceGroupConfig, NetworkInterfaceGroupProvider};
pub use placement_group::{PlacementGroupConfig, PlacementGroupProvider};
pub use volume::{VolumeConfig, VolumeProvider};
