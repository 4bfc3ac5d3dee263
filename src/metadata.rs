use serde::{Deserialize, Serialize};

/// A field that may be declared as a single object or a list of objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    /// First declared entry, if any.
    pub fn first(&self) -> Option<&T> {
        match self {
            OneOrMany::Many(items) => items.first(),
            OneOrMany::One(item) => Some(item),
        }
    }
}

/// Root `.zattrs` document of an OME-Zarr group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupAttributes {
    /// One or more multiscale image declarations.
    pub multiscales: OneOrMany<Multiscale>,
    /// Per-component value ranges, passed through to the scale info verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranges: Option<Vec<[f64; 2]>>,
    /// Direction cosine matrix, passed through verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Vec<Vec<f64>>>,
    /// Unstructured attributes.
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// One multiscale image: an ordered axis declaration plus one dataset per
/// pyramid level, finest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Multiscale {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Declared axes; the declaration order is authoritative for chunk
    /// addressing at every level.
    pub axes: Vec<AxisDeclaration>,
    pub datasets: Vec<Dataset>,
    /// Group-level transforms, applied on top of each dataset's own.
    #[serde(rename = "coordinateTransformations")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<CoordinateTransformation>>,
}

/// One entry of a multiscale `axes` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisDeclaration {
    pub name: String,
    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// One pyramid level of a multiscale image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Path prefix of this level's array within the store.
    pub path: String,
    #[serde(rename = "coordinateTransformations")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<CoordinateTransformation>>,
}

/// A coordinate transform attached to a multiscale group or dataset.
///
/// Only multiplicative scale vectors are interpreted; translations are
/// carried structurally but not applied (origin is fixed at zero).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinateTransformation {
    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<Vec<f64>>,
}

/// A `.zarray` document, kept verbatim per level for chunk-path arithmetic
/// and for sizing and typing decoded buffers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayMetadata {
    /// Array shape in the declared axis order.
    pub shape: Vec<u64>,
    /// Chunk shape in the declared axis order.
    pub chunks: Vec<u64>,
    /// Element-type descriptor as declared by the store.
    pub dtype: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zarr_format: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressor: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_separator: Option<String>,
    /// Unstructured attributes.
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}
