//! Scene snapshots: the byte encoding of a subtree and the record of where
//! it lived in the hierarchy.

mod blob;
mod codec;
mod topology;

pub use blob::SnapshotBlob;
pub use codec::{BlobHeader, SceneSnapshotCodec};
pub use topology::{ProxyEntry, Reattachment, TopologyProxy};
