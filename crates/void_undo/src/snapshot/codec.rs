//! Binary snapshot codec
//!
//! Turns a node (optionally with its whole subtree) into a [`SnapshotBlob`]
//! and back.
//!
//! # Wire format
//!
//! ```text
//! +-------+---------+-------+-------------+------------------------+
//! | magic | version | flags | payload len | payload                |
//! | VSNP  | u16 LE  | u8    | u32 LE      | bincode Vec<FlatNode>  |
//! +-------+---------+-------+-------------+------------------------+
//! ```
//!
//! The payload lists nodes in depth-first pre-order, each carrying its child
//! count. Encoding and decoding of the payload walk an explicit stack, and
//! every structural inconsistency is caught before any live node is created.
//! Copying nodes out of and into the live graph does recurse, which is why
//! depth and size limits are enforced on both sides: any blob the encoder
//! produces is one the decoder accepts.

use bincode::Options;
use serde::{Deserialize, Serialize};
use void_scene::{Component, NodeHandle, SceneGraph, SceneNodeData, Transform};

use crate::config::UndoConfig;
use crate::error::{Result, SnapshotError};
use crate::snapshot::SnapshotBlob;

const MAGIC: [u8; 4] = *b"VSNP";
const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = 11;
const FLAG_DEEP: u8 = 0b0000_0001;

/// Node record as it appears in the payload
#[derive(Serialize, Deserialize)]
struct FlatNode {
    name: String,
    transform: Transform,
    active: bool,
    components: Vec<Component>,
    child_count: u32,
}

/// Decoded blob header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlobHeader {
    pub version: u16,
    /// Whether the blob holds the full subtree
    pub deep: bool,
    pub payload_len: usize,
}

fn wire() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
}

fn corrupt(msg: impl Into<String>) -> SnapshotError {
    SnapshotError::CorruptBlob(msg.into())
}

/// Encoder/decoder for scene snapshots
#[derive(Clone, Debug)]
pub struct SceneSnapshotCodec {
    max_depth: usize,
    max_payload: usize,
}

impl Default for SceneSnapshotCodec {
    fn default() -> Self {
        Self::from_config(&UndoConfig::default())
    }
}

impl SceneSnapshotCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &UndoConfig) -> Self {
        Self {
            max_depth: config.max_snapshot_depth,
            max_payload: config.max_snapshot_bytes,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_payload(mut self, max_payload: usize) -> Self {
        self.max_payload = max_payload;
        self
    }

    /// Encode a live node, and its descendants when `include_descendants`.
    ///
    /// # Errors
    ///
    /// `Serialization` if the node is destroyed, one of the encoded
    /// components refuses serialization, or the snapshot would exceed the
    /// depth or size limit.
    pub fn encode(
        &self,
        graph: &SceneGraph,
        node: NodeHandle,
        include_descendants: bool,
    ) -> Result<SnapshotBlob> {
        if graph.is_destroyed(node) {
            return Err(SnapshotError::Serialization {
                node: node.to_string(),
                reason: "scene object has been destroyed".into(),
            });
        }
        // Checked on the live graph before copying it out
        if include_descendants {
            let depth = subtree_depth(graph, node);
            if depth > self.max_depth {
                return Err(SnapshotError::Serialization {
                    node: graph.get(node).map(|n| n.name.clone()).unwrap_or_default(),
                    reason: format!("subtree is {} levels deep, limit is {}", depth, self.max_depth),
                });
            }
        }
        let data = graph.snapshot_data(node, include_descendants)?;
        self.encode_data(&data, include_descendants)
    }

    /// Encode a detached tree. With `deep` unset only the root is written.
    pub fn encode_data(&self, data: &SceneNodeData, deep: bool) -> Result<SnapshotBlob> {
        let mut flat = Vec::with_capacity(if deep { data.node_count() } else { 1 });
        // (node, depth counting the root as 1)
        let mut pending = vec![(data, 1usize)];
        while let Some((node, depth)) = pending.pop() {
            if depth > self.max_depth {
                return Err(SnapshotError::Serialization {
                    node: data.name.clone(),
                    reason: format!("subtree deeper than {} levels", self.max_depth),
                });
            }
            for component in &node.components {
                component
                    .check_serializable()
                    .map_err(|e| SnapshotError::Serialization {
                        node: node.name.clone(),
                        reason: e.to_string(),
                    })?;
            }

            let children: &[SceneNodeData] = if deep { &node.children } else { &[] };
            flat.push(FlatNode {
                name: node.name.clone(),
                transform: node.transform,
                active: node.active,
                components: node.components.clone(),
                child_count: children.len() as u32,
            });
            // Reversed so the first child is written first
            pending.extend(children.iter().rev().map(|child| (child, depth + 1)));
        }

        let payload = wire()
            .serialize(&flat)
            .map_err(|e| SnapshotError::Serialization {
                node: data.name.clone(),
                reason: e.to_string(),
            })?;
        if payload.len() > self.max_payload || payload.len() > u32::MAX as usize {
            return Err(SnapshotError::Serialization {
                node: data.name.clone(),
                reason: format!(
                    "snapshot of {} bytes exceeds the {} byte limit",
                    payload.len(),
                    self.max_payload
                ),
            });
        }

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.push(if deep { FLAG_DEEP } else { 0 });
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&payload);

        log::debug!(
            "Encoded '{}' ({} node(s), {} bytes)",
            data.name,
            flat.len(),
            bytes.len()
        );
        Ok(SnapshotBlob::from_bytes(bytes))
    }

    /// Validate and parse the fixed-size header.
    pub fn read_header(&self, blob: &SnapshotBlob) -> Result<BlobHeader> {
        let bytes = blob.as_bytes();
        if bytes.len() < HEADER_LEN {
            return Err(corrupt(format!(
                "{} bytes is shorter than the {}-byte header",
                bytes.len(),
                HEADER_LEN
            )));
        }
        if bytes[0..4] != MAGIC {
            return Err(corrupt("bad magic"));
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != FORMAT_VERSION {
            return Err(corrupt(format!(
                "unsupported format version {} (expected {})",
                version, FORMAT_VERSION
            )));
        }

        let flags = bytes[6];
        if flags & !FLAG_DEEP != 0 {
            return Err(corrupt(format!("unknown flags {:#04x}", flags)));
        }

        let payload_len = u32::from_le_bytes([bytes[7], bytes[8], bytes[9], bytes[10]]) as usize;
        let actual = bytes.len() - HEADER_LEN;
        if payload_len != actual {
            return Err(corrupt(format!(
                "length header says {} payload bytes, found {}",
                payload_len, actual
            )));
        }
        if payload_len > self.max_payload {
            return Err(corrupt(format!(
                "payload of {} bytes exceeds the {} byte limit",
                payload_len, self.max_payload
            )));
        }

        Ok(BlobHeader {
            version,
            deep: flags & FLAG_DEEP != 0,
            payload_len,
        })
    }

    /// Decode a blob into a detached tree without touching any graph.
    pub fn decode_data(&self, blob: &SnapshotBlob) -> Result<SceneNodeData> {
        let header = self.read_header(blob)?;
        let payload = &blob.as_bytes()[HEADER_LEN..];

        let flat: Vec<FlatNode> = wire()
            .with_limit(header.payload_len as u64)
            .deserialize(payload)
            .map_err(|e| corrupt(format!("malformed payload: {}", e)))?;

        if !header.deep && flat.len() != 1 {
            return Err(corrupt(format!(
                "shallow snapshot holds {} nodes",
                flat.len()
            )));
        }

        self.rebuild(flat)
    }

    /// Decode a blob into a new, detached subtree of `graph`.
    ///
    /// The graph is only touched once the whole blob has been validated.
    pub fn decode(&self, graph: &mut SceneGraph, blob: &SnapshotBlob) -> Result<NodeHandle> {
        let data = self.decode_data(blob)?;
        Ok(graph.instantiate(&data))
    }

    fn rebuild(&self, flat: Vec<FlatNode>) -> Result<SceneNodeData> {
        fn unflatten(node: FlatNode) -> (SceneNodeData, u32) {
            let data = SceneNodeData {
                name: node.name,
                transform: node.transform,
                active: node.active,
                components: node.components,
                children: Vec::with_capacity(node.child_count.min(64) as usize),
            };
            (data, node.child_count)
        }

        let mut nodes = flat.into_iter();
        let first = nodes.next().ok_or_else(|| corrupt("snapshot holds no nodes"))?;

        // (node, children still to read)
        let mut stack: Vec<(SceneNodeData, u32)> = vec![unflatten(first)];
        let root = loop {
            let Some((_, remaining)) = stack.last_mut() else {
                return Err(corrupt("unbalanced node stack"));
            };

            if *remaining > 0 {
                *remaining -= 1;
                let next = nodes
                    .next()
                    .ok_or_else(|| corrupt("snapshot ends before all children were read"))?;
                if stack.len() >= self.max_depth {
                    return Err(corrupt(format!(
                        "subtree deeper than {} levels",
                        self.max_depth
                    )));
                }
                stack.push(unflatten(next));
                continue;
            }

            let Some((done, _)) = stack.pop() else {
                return Err(corrupt("unbalanced node stack"));
            };
            match stack.last_mut() {
                Some((parent, _)) => parent.children.push(done),
                None => break done,
            }
        };

        let trailing = nodes.count();
        if trailing > 0 {
            return Err(corrupt(format!("{} node(s) past the end of the tree", trailing)));
        }
        Ok(root)
    }
}

/// Height of the live subtree under `node`; a lone node has depth 1.
fn subtree_depth(graph: &SceneGraph, node: NodeHandle) -> usize {
    let mut deepest = 0;
    let mut pending = vec![(node, 1usize)];
    while let Some((handle, depth)) = pending.pop() {
        deepest = deepest.max(depth);
        pending.extend(graph.children(handle).iter().map(|&child| (child, depth + 1)));
    }
    deepest
}
