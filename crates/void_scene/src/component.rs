//! Components attached to scene nodes
//!
//! Components are a closed set of variants tagged by [`ComponentKind`].
//! Serializers dispatch on the variant instead of a type registry, and each
//! variant knows whether its current state can be serialized at all.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};

/// Capability tag for a component variant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    MeshRenderer,
    Light,
    Camera,
    Collider,
    Script,
    Tag,
}

impl ComponentKind {
    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::MeshRenderer => "MeshRenderer",
            ComponentKind::Light => "Light",
            ComponentKind::Camera => "Camera",
            ComponentKind::Collider => "Collider",
            ComponentKind::Script => "Script",
            ComponentKind::Tag => "Tag",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Light source type
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum LightKind {
    Directional,
    Point,
    Spot {
        /// Inner cone angle in radians
        inner_angle: f32,
        /// Outer cone angle in radians
        outer_angle: f32,
    },
}

/// Collision shape
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Box { half_extents: [f32; 3] },
    Sphere { radius: f32 },
    Capsule { radius: f32, half_height: f32 },
}

/// Value of an exposed script field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Vec3([f32; 3]),
    List(Vec<FieldValue>),
}

impl FieldValue {
    fn is_finite(&self) -> bool {
        match self {
            FieldValue::Float(v) => v.is_finite(),
            FieldValue::Vec3(v) => v.iter().all(|c| c.is_finite()),
            FieldValue::List(items) => items.iter().all(FieldValue::is_finite),
            FieldValue::Bool(_) | FieldValue::Int(_) | FieldValue::Text(_) => true,
        }
    }
}

/// A component attached to a scene node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Component {
    MeshRenderer {
        mesh: String,
        material: Option<String>,
        color: [f32; 4],
        cast_shadows: bool,
    },
    Light {
        kind: LightKind,
        color: [f32; 3],
        intensity: f32,
        range: f32,
    },
    Camera {
        /// Vertical field of view in radians
        fov_y: f32,
        near: f32,
        far: f32,
        primary: bool,
    },
    Collider {
        shape: ColliderShape,
        is_trigger: bool,
    },
    Script {
        class: String,
        fields: BTreeMap<String, FieldValue>,
        /// Set when the script threw during its last update
        faulted: bool,
    },
    Tag(String),
}

impl Component {
    pub fn mesh(mesh: impl Into<String>) -> Self {
        Component::MeshRenderer {
            mesh: mesh.into(),
            material: None,
            color: [0.8, 0.8, 0.8, 1.0],
            cast_shadows: true,
        }
    }

    pub fn point_light(color: [f32; 3], intensity: f32, range: f32) -> Self {
        Component::Light {
            kind: LightKind::Point,
            color,
            intensity,
            range,
        }
    }

    pub fn script(class: impl Into<String>) -> Self {
        Component::Script {
            class: class.into(),
            fields: BTreeMap::new(),
            faulted: false,
        }
    }

    /// Set a script field. No-op for other variants.
    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        if let Component::Script { fields, .. } = &mut self {
            fields.insert(name.into(), value);
        }
        self
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::MeshRenderer { .. } => ComponentKind::MeshRenderer,
            Component::Light { .. } => ComponentKind::Light,
            Component::Camera { .. } => ComponentKind::Camera,
            Component::Collider { .. } => ComponentKind::Collider,
            Component::Script { .. } => ComponentKind::Script,
            Component::Tag(_) => ComponentKind::Tag,
        }
    }

    /// Check that the component is in a state that can be serialized.
    pub fn check_serializable(&self) -> Result<()> {
        let reason = match self {
            Component::MeshRenderer { mesh, color, .. } => {
                if mesh.is_empty() {
                    Some("no mesh assigned")
                } else if !color.iter().all(|c| c.is_finite()) {
                    Some("non-finite color")
                } else {
                    None
                }
            }
            Component::Light {
                kind,
                color,
                intensity,
                range,
            } => {
                let cone_ok = match kind {
                    LightKind::Spot {
                        inner_angle,
                        outer_angle,
                    } => inner_angle.is_finite() && outer_angle.is_finite(),
                    LightKind::Directional | LightKind::Point => true,
                };
                if !cone_ok || !intensity.is_finite() || !range.is_finite() {
                    Some("non-finite light parameters")
                } else if !color.iter().all(|c| c.is_finite()) {
                    Some("non-finite color")
                } else {
                    None
                }
            }
            Component::Camera { fov_y, near, far, .. } => {
                if !(fov_y.is_finite() && near.is_finite() && far.is_finite()) {
                    Some("non-finite projection")
                } else {
                    None
                }
            }
            Component::Collider { shape, .. } => {
                let finite = match shape {
                    ColliderShape::Box { half_extents } => half_extents.iter().all(|c| c.is_finite()),
                    ColliderShape::Sphere { radius } => radius.is_finite(),
                    ColliderShape::Capsule { radius, half_height } => {
                        radius.is_finite() && half_height.is_finite()
                    }
                };
                if finite { None } else { Some("non-finite shape") }
            }
            Component::Script { class, fields, faulted } => {
                if class.is_empty() {
                    Some("script has no class")
                } else if *faulted {
                    Some("script is in a faulted state")
                } else if !fields.values().all(FieldValue::is_finite) {
                    Some("non-finite field value")
                } else {
                    None
                }
            }
            Component::Tag(_) => None,
        };

        match reason {
            Some(reason) => Err(SceneError::UnserializableComponent {
                kind: self.kind(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}
