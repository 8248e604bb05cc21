//! # Scene Model Boundary
//!
//! Filters decide visibility for graphics that live somewhere else: in a scene
//! tree owned by the rendering side of the application. This module defines the
//! narrow view of a graphic that filters need, and nothing more.
//!
//! ## The `Graphic` Trait
//!
//! [`Graphic`] is the seam between the filter engine and the scene. A scene
//! implementation only has to answer five questions about a graphic:
//!
//! | Question | Used by |
//! |----------|---------|
//! | `name()` | graphic name filters |
//! | `visibility_flags_set()` | visibility flags filters |
//! | `region()` | region filters |
//! | `graphic_type()` | graphic type filters |
//! | `domain_type()` | domain type filters |
//!
//! [`SceneGraphic`] is a plain-data implementation used by tests and by callers
//! that snapshot their scene before filtering.
//!
//! ## Region Paths
//!
//! Regions form a tree addressed by slash separated paths (`/`, `/heart`,
//! `/heart/left_ventricle`). A graphic belongs to a region *hierarchically*
//! when its own region is that region or any descendant of it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute path of a region in the region tree.
///
/// Paths are normalized on construction: leading, trailing and repeated
/// separators are dropped, so `"heart//left/"` and `"/heart/left"` are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RegionPath {
    segments: Vec<String>,
}

impl RegionPath {
    /// The root region (`/`).
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True if `other` is this region or lies anywhere below it.
    pub fn contains(&self, other: &RegionPath) -> bool {
        other.segments.len() >= self.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(mine, theirs)| mine == theirs)
    }
}

impl fmt::Display for RegionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl From<&str> for RegionPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

/// The kind of primitive a graphic draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphicType {
    Points,
    Lines,
    #[default]
    Surfaces,
    Contours,
    Streamlines,
}

impl GraphicType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphicType::Points => "points",
            GraphicType::Lines => "lines",
            GraphicType::Surfaces => "surfaces",
            GraphicType::Contours => "contours",
            GraphicType::Streamlines => "streamlines",
        }
    }
}

impl fmt::Display for GraphicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The part of the model a graphic is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainType {
    Point,
    Nodes,
    Data,
    Mesh1d,
    Mesh2d,
    Mesh3d,
    #[default]
    MeshHighestDimension,
}

impl DomainType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainType::Point => "point",
            DomainType::Nodes => "nodes",
            DomainType::Data => "data",
            DomainType::Mesh1d => "mesh1d",
            DomainType::Mesh2d => "mesh2d",
            DomainType::Mesh3d => "mesh3d",
            DomainType::MeshHighestDimension => "mesh_highest_dimension",
        }
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a filter may ask about a graphic.
pub trait Graphic {
    fn name(&self) -> &str;

    fn graphic_type(&self) -> GraphicType;

    fn domain_type(&self) -> DomainType;

    /// True if the graphic's own visibility flag is set and so is the flag of
    /// every scene containing it, up to the root.
    fn visibility_flags_set(&self) -> bool;

    /// The region the graphic was built in.
    fn region(&self) -> &RegionPath;
}

/// A detached, plain-data graphic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneGraphic {
    pub name: String,
    pub graphic_type: GraphicType,
    pub domain_type: DomainType,
    pub region: RegionPath,
    /// The graphic's own visibility flag.
    pub visible: bool,
    /// Visibility flags of the containing scenes, outermost first.
    pub scene_visibility: Vec<bool>,
}

impl SceneGraphic {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graphic_type: GraphicType::default(),
            domain_type: DomainType::default(),
            region: RegionPath::root(),
            visible: true,
            scene_visibility: Vec::new(),
        }
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_scene_visibility(mut self, flags: Vec<bool>) -> Self {
        self.scene_visibility = flags;
        self
    }

    pub fn with_region(mut self, region: impl Into<RegionPath>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_graphic_type(mut self, graphic_type: GraphicType) -> Self {
        self.graphic_type = graphic_type;
        self
    }

    pub fn with_domain_type(mut self, domain_type: DomainType) -> Self {
        self.domain_type = domain_type;
        self
    }
}

impl Graphic for SceneGraphic {
    fn name(&self) -> &str {
        &self.name
    }

    fn graphic_type(&self) -> GraphicType {
        self.graphic_type
    }

    fn domain_type(&self) -> DomainType {
        self.domain_type
    }

    fn visibility_flags_set(&self) -> bool {
        self.visible && self.scene_visibility.iter().all(|flag| *flag)
    }

    fn region(&self) -> &RegionPath {
        &self.region
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_path_normalizes_separators() {
        assert_eq!(RegionPath::parse("heart//left/"), RegionPath::parse("/heart/left"));
        assert_eq!(RegionPath::parse("/heart/left").to_string(), "/heart/left");
        assert_eq!(RegionPath::parse("///").to_string(), "/");
        assert!(RegionPath::parse("").is_root());
    }

    #[test]
    fn region_contains_itself_and_descendants() {
        let heart = RegionPath::parse("/heart");
        assert!(heart.contains(&heart));
        assert!(heart.contains(&RegionPath::parse("/heart/left")));
        assert!(!heart.contains(&RegionPath::parse("/lungs")));
        assert!(!heart.contains(&RegionPath::root()));
        assert!(RegionPath::root().contains(&heart));
    }

    #[test]
    fn region_prefix_is_not_sibling_match() {
        // "/heart" must not contain "/heartbeat"
        let heart = RegionPath::parse("/heart");
        assert!(!heart.contains(&RegionPath::parse("/heartbeat")));
    }

    #[test]
    fn visibility_is_hierarchical() {
        let graphic = SceneGraphic::new("mesh");
        assert!(graphic.visibility_flags_set());

        let hidden_scene = graphic.clone().with_scene_visibility(vec![true, false]);
        assert!(!hidden_scene.visibility_flags_set());

        let hidden_self = graphic.with_visibility(false).with_scene_visibility(vec![true]);
        assert!(!hidden_self.visibility_flags_set());
    }

    #[test]
    fn type_strings() {
        assert_eq!(GraphicType::Streamlines.to_string(), "streamlines");
        assert_eq!(DomainType::MeshHighestDimension.as_str(), "mesh_highest_dimension");
    }
}
