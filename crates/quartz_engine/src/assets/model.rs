//! Model descriptors and realized models

use crate::foundation::math::{Mat4, Mat4Ext};
use crate::render::api::MeshHandle;
use crate::render::material::Material;
use crate::render::primitives::Mesh;

use serde::{Deserialize, Serialize};

/// Procedural shape a model part is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeDesc {
    /// Flat plane on the xz axes facing +y
    Plane {
        /// Extent along x
        width: f32,
        /// Extent along z
        depth: f32,
        /// Texture tiling factor
        uv_repeat: f32,
    },
    /// Axis-aligned box
    Cube {
        /// Extent along x
        width: f32,
        /// Extent along y
        height: f32,
        /// Extent along z
        depth: f32,
    },
    /// UV sphere
    Sphere {
        /// Sphere radius
        radius: f32,
        /// Longitudinal subdivisions
        slices: u32,
        /// Latitudinal subdivisions
        stacks: u32,
    },
}

impl ShapeDesc {
    /// Generate the mesh for this shape
    #[must_use]
    pub fn build(&self) -> Mesh {
        match *self {
            Self::Plane {
                width,
                depth,
                uv_repeat,
            } => Mesh::plane(width, depth, uv_repeat),
            Self::Cube {
                width,
                height,
                depth,
            } => Mesh::cube(width, height, depth),
            Self::Sphere {
                radius,
                slices,
                stacks,
            } => Mesh::sphere(radius, slices, stacks),
        }
    }
}

/// One part of a model descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartDesc {
    /// Shape to generate
    pub shape: ShapeDesc,
    /// Surface material
    #[serde(default)]
    pub material: Material,
    /// Diffuse texture identifier
    #[serde(default)]
    pub diffuse_map: Option<String>,
    /// Normal map texture identifier
    #[serde(default)]
    pub normal_map: Option<String>,
}

/// On-disk model descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDesc {
    /// Identifier the model registers under
    pub name: String,
    /// Euler axis correction in radians, for models authored with a
    /// different up axis
    #[serde(default)]
    pub axis_rotation: [f32; 3],
    /// Parts making up the model
    pub parts: Vec<PartDesc>,
}

impl ModelDesc {
    /// Axis-correction matrix from the descriptor's Euler angles
    #[must_use]
    pub fn axis_correction(&self) -> Mat4 {
        let [pitch, yaw, roll] = self.axis_rotation;
        Mat4::rotation_y(yaw) * Mat4::rotation_x(pitch) * Mat4::rotation_z(roll)
    }
}

/// One uploaded mesh with its material and texture references
///
/// Texture identifiers stay unresolved; draw code looks them up through
/// the resource manager so placeholder fallback applies per frame.
#[derive(Debug, Clone)]
pub struct ModelPart {
    /// Uploaded mesh handle
    pub mesh: MeshHandle,
    /// Surface material
    pub material: Material,
    /// Diffuse texture identifier
    pub diffuse_map: Option<String>,
    /// Normal map texture identifier
    pub normal_map: Option<String>,
}

/// A realized model: uploaded parts plus the axis correction
#[derive(Debug, Clone)]
pub struct Model {
    /// Uploaded parts
    pub parts: Vec<ModelPart>,
    /// Rotation applied between instance scale and rotation
    pub axis_correction: Mat4,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shape_desc_builds_expected_geometry() {
        let cube = ShapeDesc::Cube {
            width: 1.0,
            height: 1.0,
            depth: 1.0,
        }
        .build();
        assert_eq!(cube.triangle_count(), 12);

        let plane = ShapeDesc::Plane {
            width: 10.0,
            depth: 10.0,
            uv_repeat: 4.0,
        }
        .build();
        assert_eq!(plane.triangle_count(), 2);
        assert!(plane.vertices.iter().any(|v| v.tex_coord == [4.0, 4.0]));
    }

    #[test]
    fn test_descriptor_round_trips_through_ron() {
        let desc = ModelDesc {
            name: "paddle".to_string(),
            axis_rotation: [0.0, 0.0, 0.0],
            parts: vec![PartDesc {
                shape: ShapeDesc::Cube {
                    width: 6.0,
                    height: 2.0,
                    depth: 2.0,
                },
                material: Material::default(),
                diffuse_map: Some("paddle".to_string()),
                normal_map: None,
            }],
        };

        let text = ron::to_string(&desc).unwrap();
        let parsed: ModelDesc = ron::from_str(&text).unwrap();
        assert_eq!(parsed.name, "paddle");
        assert_eq!(parsed.parts.len(), 1);
        assert_eq!(parsed.parts[0].diffuse_map.as_deref(), Some("paddle"));
    }

    #[test]
    fn test_default_axis_correction_is_identity() {
        let desc = ModelDesc {
            name: "ball".to_string(),
            axis_rotation: [0.0; 3],
            parts: Vec::new(),
        };
        assert_relative_eq!(desc.axis_correction(), Mat4::identity(), epsilon = 1.0e-6);
    }
}
