//! Level asset: static collision mesh plus the named nodes the interaction
//! scan cares about.
//!
//! Assets are plain JSON:
//!
//! ```json
//! {
//!   "vertices": [[0, 0, 0], [1, 0, 0], [0, 0, 1]],
//!   "indices": [0, 2, 1],
//!   "nodes": [{ "name": "painting_hubris", "position": [0, 3, -5] }]
//! }
//! ```
//!
//! Without `indices`, every three consecutive vertices form a triangle.

use crate::collider::Triangle;
use crate::interaction::{Interactable, InteractionKind};
use crate::octree::Octree;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Shop listings for the known paintings. Unknown paintings link to `#`.
pub const PAINTING_CATALOG: [(&str, &str); 4] = [
    (
        "painting_hubris",
        "https://www.etsy.com/listing/4394876033/hubris",
    ),
    (
        "painting_impulse",
        "https://www.etsy.com/listing/4394851004/impulse",
    ),
    (
        "painting_persona",
        "https://www.etsy.com/listing/4394970767/persona",
    ),
    (
        "painting_sparrow",
        "https://www.etsy.com/listing/4394969920/morning-sparrow",
    ),
];

pub const PAINTING_PREFIX: &str = "painting_";
pub const MUSHROOM_PREFIX: &str = "mushroom";
const FALLBACK_URL: &str = "#";

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("Failed to read scene {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid scene JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Scene has no triangles")]
    EmptyMesh,
    #[error("Triangle index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("{count} {what} do not form whole triangles")]
    RaggedTriangles { what: &'static str, count: usize },
    #[error("{what} {index} has a non-finite coordinate")]
    NonFinite { what: &'static str, index: usize },
    #[error("Scene build task failed: {0}")]
    Build(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub position: [f32; 3],
    /// Overrides the catalog link for paintings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneAsset {
    pub vertices: Vec<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<Vec<u32>>,
    #[serde(default)]
    pub nodes: Vec<SceneNode>,
}

impl SceneAsset {
    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        let asset: SceneAsset = serde_json::from_str(text)?;
        asset.validate()?;
        Ok(asset)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        let finite = |p: &[f32; 3]| p.iter().all(|c| c.is_finite());
        if let Some(index) = self.vertices.iter().position(|v| !finite(v)) {
            return Err(SceneError::NonFinite {
                what: "vertex",
                index,
            });
        }
        if let Some(index) = self.nodes.iter().position(|n| !finite(&n.position)) {
            return Err(SceneError::NonFinite { what: "node", index });
        }

        let vertex_count = self.vertices.len();
        match &self.indices {
            Some(indices) => {
                if indices.len() % 3 != 0 {
                    return Err(SceneError::RaggedTriangles {
                        what: "indices",
                        count: indices.len(),
                    });
                }
                if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                    return Err(SceneError::IndexOutOfRange {
                        index,
                        vertex_count,
                    });
                }
                if indices.is_empty() {
                    return Err(SceneError::EmptyMesh);
                }
            }
            None => {
                if vertex_count % 3 != 0 {
                    return Err(SceneError::RaggedTriangles {
                        what: "vertices",
                        count: vertex_count,
                    });
                }
                if vertex_count == 0 {
                    return Err(SceneError::EmptyMesh);
                }
            }
        }
        Ok(())
    }

    /// Expand the mesh into a triangle soup.
    pub fn static_mesh(&self) -> Vec<Triangle> {
        let vertex = |i: u32| self.vertices.get(i as usize).map(|v| Vec3::from_array(*v));
        match &self.indices {
            Some(indices) => indices
                .chunks_exact(3)
                .filter_map(|tri| Some(Triangle::new(vertex(tri[0])?, vertex(tri[1])?, vertex(tri[2])?)))
                .collect(),
            None => self
                .vertices
                .chunks_exact(3)
                .map(|tri| {
                    Triangle::new(
                        Vec3::from_array(tri[0]),
                        Vec3::from_array(tri[1]),
                        Vec3::from_array(tri[2]),
                    )
                })
                .collect(),
        }
    }

    /// Build the interactable list. Untagged nodes are ignored.
    pub fn tag_nodes(&self) -> Vec<Interactable> {
        let mut tagged = Vec::new();
        for node in &self.nodes {
            let position = Vec3::from_array(node.position);
            if node.name.starts_with(PAINTING_PREFIX) {
                let url = node
                    .url
                    .clone()
                    .unwrap_or_else(|| catalog_url(&node.name).to_string());
                tracing::info!("Found painting {} ({})", node.name, url);
                tagged.push(Interactable {
                    kind: InteractionKind::Painting,
                    name: node.name.clone(),
                    url: Some(url),
                    position,
                });
            } else if node.name.starts_with(MUSHROOM_PREFIX) {
                tracing::info!("Found mushroom {}", node.name);
                tagged.push(Interactable {
                    kind: InteractionKind::Mushroom,
                    name: node.name.clone(),
                    url: None,
                    position,
                });
            }
        }
        tagged
    }
}

/// Shop link for a painting node name.
pub fn catalog_url(name: &str) -> &'static str {
    PAINTING_CATALOG
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, url)| *url)
        .unwrap_or(FALLBACK_URL)
}

/// A scene ready for the simulation: collision index plus interactables.
#[derive(Debug)]
pub struct LoadedScene {
    pub octree: Octree,
    pub interactables: Vec<Interactable>,
}

impl LoadedScene {
    pub fn build(asset: &SceneAsset) -> Self {
        let octree = Octree::build(asset.static_mesh());
        let interactables = asset.tag_nodes();
        tracing::info!(
            "Scene ready: {} triangles, {} octree nodes, {} interactables",
            octree.triangle_count(),
            octree.node_count(),
            interactables.len()
        );
        Self {
            octree,
            interactables,
        }
    }
}

pub async fn read_scene(path: &Path) -> Result<SceneAsset, SceneError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SceneError::Io {
            path: path.display().to_string(),
            source,
        })?;
    SceneAsset::from_json(&text)
}

/// Load the scene from `path`, or the built-in gallery when none is given.
/// Index construction runs on the blocking pool.
pub async fn load_scene(path: Option<&Path>) -> Result<LoadedScene, SceneError> {
    let asset = match path {
        Some(path) => {
            tracing::info!("Loading scene from {}", path.display());
            read_scene(path).await?
        }
        None => {
            tracing::info!("Loading built-in demo gallery");
            demo_gallery()
        }
    };

    let scene = tokio::task::spawn_blocking(move || LoadedScene::build(&asset)).await?;
    Ok(scene)
}

/// Room extents of the demo gallery. The room is off-center in z so the
/// spawn point does not sit on the floor's diagonal seam.
const ROOM_MIN: Vec3 = Vec3::new(-20.0, 0.0, -25.0);
const ROOM_MAX: Vec3 = Vec3::new(20.0, 8.0, 15.0);

/// A walled room with four paintings and a mushroom.
pub fn demo_gallery() -> SceneAsset {
    let mut builder = MeshBuilder::default();
    let (lo, hi) = (ROOM_MIN, ROOM_MAX);
    let inside = (lo + hi) * 0.5;

    // Floor
    builder.quad(
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, lo.y, hi.z),
        ],
        inside,
    );
    // North, south, east, west walls
    builder.quad(
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
        ],
        inside,
    );
    builder.quad(
        [
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
        ],
        inside,
    );
    builder.quad(
        [
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, lo.z),
        ],
        inside,
    );
    builder.quad(
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(lo.x, hi.y, lo.z),
        ],
        inside,
    );

    let mid_z = inside.z;
    let nodes = vec![
        node("painting_hubris", [0.0, 3.0, lo.z + 0.2]),
        node("painting_impulse", [hi.x - 0.2, 3.0, mid_z]),
        node("painting_persona", [0.0, 3.0, hi.z - 0.2]),
        node("painting_sparrow", [lo.x + 0.2, 3.0, mid_z]),
        node("mushroom_amanita", [5.0, 0.3, -8.0]),
        node("bench", [0.0, 0.4, 5.0]),
    ];

    SceneAsset {
        vertices: builder.vertices,
        indices: Some(builder.indices),
        nodes,
    }
}

fn node(name: &str, position: [f32; 3]) -> SceneNode {
    SceneNode {
        name: name.to_string(),
        position,
        url: None,
    }
}

#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    /// Add a planar quad as two triangles whose normals face `toward`.
    fn quad(&mut self, corners: [Vec3; 4], toward: Vec3) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(corners.iter().map(|c| c.to_array()));

        let lower = Triangle::new(corners[0], corners[2], corners[1]);
        let faces_in = lower.plane().normal.dot(toward - corners[0]) > 0.0;
        if faces_in {
            self.indices
                .extend([base, base + 2, base + 1, base, base + 3, base + 2]);
        } else {
            self.indices
                .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_indexed_asset() {
        let json = r#"{
            "vertices": [[0,0,0],[1,0,0],[0,0,1],[1,0,1]],
            "indices": [0,2,1, 1,2,3],
            "nodes": [{"name": "painting_hubris", "position": [0,3,-5]}]
        }"#;
        let asset = SceneAsset::from_json(json).unwrap();
        assert_eq!(asset.static_mesh().len(), 2);
        assert_eq!(asset.nodes.len(), 1);
    }

    #[test]
    fn non_indexed_vertices_group_in_threes() {
        let json = r#"{"vertices": [[0,0,0],[1,0,0],[0,0,1],[0,1,0],[1,1,0],[0,1,1]]}"#;
        let asset = SceneAsset::from_json(json).unwrap();
        let mesh = asset.static_mesh();
        assert_eq!(mesh.len(), 2);
        assert_eq!(mesh[1].a, Vec3::new(0.0, 1.0, 0.0));
        assert!(asset.tag_nodes().is_empty());
    }

    #[test]
    fn rejects_bad_assets() {
        assert!(matches!(
            SceneAsset::from_json("{"),
            Err(SceneError::Parse(_))
        ));
        assert!(matches!(
            SceneAsset::from_json(r#"{"vertices": []}"#),
            Err(SceneError::EmptyMesh)
        ));
        assert!(matches!(
            SceneAsset::from_json(r#"{"vertices": [[0,0,0],[1,0,0]]}"#),
            Err(SceneError::RaggedTriangles { count: 2, .. })
        ));
        assert!(matches!(
            SceneAsset::from_json(r#"{"vertices": [[0,0,0],[1,0,0],[0,0,1]], "indices": [0,1,7]}"#),
            Err(SceneError::IndexOutOfRange {
                index: 7,
                vertex_count: 3
            })
        ));
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        // 1e39 does not fit in an f32.
        assert!(SceneAsset::from_json(r#"{"vertices": [[0,0,0],[1e39,0,0],[0,0,1]]}"#).is_err());

        let mut asset = SceneAsset {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, f32::INFINITY, 1.0]],
            indices: None,
            nodes: vec![],
        };
        assert!(matches!(
            asset.validate(),
            Err(SceneError::NonFinite {
                what: "vertex",
                index: 2
            })
        ));

        asset.vertices[2] = [0.0, 0.0, 1.0];
        asset.nodes.push(node("painting_hubris", [0.0, f32::NAN, 0.0]));
        assert!(matches!(
            asset.validate(),
            Err(SceneError::NonFinite {
                what: "node",
                index: 0
            })
        ));
    }

    #[test]
    fn paintings_get_catalog_links() {
        let asset = SceneAsset {
            vertices: vec![],
            indices: None,
            nodes: vec![
                node("painting_sparrow", [0.0, 0.0, 0.0]),
                node("painting_unknown", [1.0, 0.0, 0.0]),
                SceneNode {
                    name: "painting_custom".to_string(),
                    position: [2.0, 0.0, 0.0],
                    url: Some("https://example.com/custom".to_string()),
                },
                node("mushroom_small", [3.0, 0.0, 0.0]),
                node("lamp", [4.0, 0.0, 0.0]),
                node("painting", [5.0, 0.0, 0.0]),
            ],
        };
        let tagged = asset.tag_nodes();
        assert_eq!(tagged.len(), 4);
        assert_eq!(
            tagged[0].url.as_deref(),
            Some("https://www.etsy.com/listing/4394969920/morning-sparrow")
        );
        assert_eq!(tagged[1].url.as_deref(), Some("#"));
        assert_eq!(tagged[2].url.as_deref(), Some("https://example.com/custom"));
        assert_eq!(tagged[3].kind, InteractionKind::Mushroom);
        assert_eq!(tagged[3].url, None);
    }

    #[test]
    fn demo_gallery_is_valid_and_faces_inward() {
        let asset = demo_gallery();
        asset.validate().unwrap();
        let mesh = asset.static_mesh();
        assert_eq!(mesh.len(), 10);

        let inside = (ROOM_MIN + ROOM_MAX) * 0.5;
        for triangle in &mesh {
            assert!(!triangle.is_degenerate());
            let plane = triangle.plane();
            assert!(plane.distance_to_point(inside) > 0.0);
        }

        let tagged = asset.tag_nodes();
        assert_eq!(
            tagged
                .iter()
                .filter(|i| i.kind == InteractionKind::Painting)
                .count(),
            4
        );
        assert_eq!(
            tagged
                .iter()
                .filter(|i| i.kind == InteractionKind::Mushroom)
                .count(),
            1
        );
    }

    #[test]
    fn loaded_scene_indexes_every_triangle() {
        let scene = LoadedScene::build(&demo_gallery());
        assert_eq!(scene.octree.triangle_count(), 10);
        assert_eq!(scene.interactables.len(), 5);
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let result = load_scene(Some(Path::new("/nonexistent/gallery.json"))).await;
        assert!(matches!(result, Err(SceneError::Io { .. })));
    }

    #[tokio::test]
    async fn panicked_build_task_is_a_build_error() {
        let result: Result<LoadedScene, SceneError> = async {
            let scene = tokio::task::spawn_blocking(|| -> LoadedScene {
                panic!("octree build blew up")
            })
            .await?;
            Ok(scene)
        }
        .await;
        assert!(matches!(result, Err(SceneError::Build(_))));
    }

    #[tokio::test]
    async fn default_load_uses_demo_gallery() {
        let scene = load_scene(None).await.unwrap();
        assert_eq!(scene.interactables.len(), 5);
    }
}
