use std::collections::HashMap;

use crate::axis::{Axis, CANONICAL_AXES};
use crate::metadata::{
    ArrayMetadata, CoordinateTransformation, Dataset, GroupAttributes, Multiscale,
};
use crate::{Error, Result};

/// Geometric and addressing metadata for one pyramid level.
///
/// The three canonical arrays are indexed by canonical (c, x, y, z, t) slot
/// and hold 1 for axes this level does not declare, so an absent axis
/// behaves as exactly one chunk trivially indexed at 0.
#[derive(Debug, Clone)]
pub struct ScaleLevelInfo {
    /// Axes as declared by the group, in declared order.
    pub axis_order: Vec<Axis>,
    /// Physical sample positions per declared axis: `i * spacing`, with the
    /// origin fixed at zero (translation transforms are not applied).
    pub coords: HashMap<Axis, Vec<f32>>,
    /// Multiscale group name, if declared.
    pub name: Option<String>,
    /// Path prefix under which this level's chunks live.
    pub pixel_array_path: String,
    /// Raw `.zarray` document, kept verbatim for chunk addressing and
    /// decoder sizing.
    pub pixel_array_metadata: ArrayMetadata,
    /// Chunks per canonical axis slot.
    pub chunk_counts: [u64; 5],
    /// Chunk extent per canonical axis slot.
    pub chunk_shape: [u64; 5],
    /// Array extent per canonical axis slot.
    pub element_counts: [u64; 5],
    /// Per-component value ranges from the group attributes, verbatim.
    pub ranges: Option<Vec<[f64; 2]>>,
    /// Direction cosine matrix from the group attributes, verbatim.
    pub direction: Option<Vec<Vec<f64>>>,
}

/// First declared scale vector, or all-ones when no transform is declared.
fn scale_transform(transforms: Option<&[CoordinateTransformation]>) -> Vec<f64> {
    transforms
        .and_then(|ts| ts.first())
        .and_then(|t| t.scale.clone())
        .unwrap_or_else(|| vec![1.0; 5])
}

impl ScaleLevelInfo {
    /// Combine the group and dataset transform metadata with one level's
    /// array metadata.
    ///
    /// The group's axis declaration is authoritative for axis identity and
    /// order; dataset metadata only contributes per-axis scale factors.
    pub fn resolve(
        zattrs: &GroupAttributes,
        multiscale: &Multiscale,
        dataset: &Dataset,
        pixel_array_metadata: ArrayMetadata,
    ) -> Result<Self> {
        let axis_order = multiscale
            .axes
            .iter()
            .map(|a| Axis::from_name(&a.name))
            .collect::<Result<Vec<_>>>()?;

        if pixel_array_metadata.shape.len() != axis_order.len() {
            return Err(Error::malformed(format!(
                "array {} has {} dimensions but the group declares {} axes",
                dataset.path,
                pixel_array_metadata.shape.len(),
                axis_order.len()
            )));
        }
        if pixel_array_metadata.chunks.len() != axis_order.len() {
            return Err(Error::malformed(format!(
                "array {} has a {}-dimensional chunk shape but the group declares {} axes",
                dataset.path,
                pixel_array_metadata.chunks.len(),
                axis_order.len()
            )));
        }

        let group_scale = scale_transform(multiscale.coordinate_transformations.as_deref());
        let dataset_scale = scale_transform(dataset.coordinate_transformations.as_deref());
        if group_scale.len() < axis_order.len() || dataset_scale.len() < axis_order.len() {
            return Err(Error::malformed(format!(
                "scale transform for {} is shorter than the axis list",
                dataset.path
            )));
        }

        let mut coords = HashMap::with_capacity(axis_order.len());
        for (idx, axis) in axis_order.iter().enumerate() {
            let spacing = group_scale[idx] * dataset_scale[idx];
            let size = pixel_array_metadata.shape[idx];
            // origin fixed at 0: translate transformations not implemented
            let samples = (0..size).map(|i| (i as f64 * spacing) as f32).collect();
            coords.insert(*axis, samples);
        }

        let mut chunk_counts = [1u64; 5];
        let mut chunk_shape = [1u64; 5];
        let mut element_counts = [1u64; 5];
        for (slot, axis) in CANONICAL_AXES.iter().enumerate() {
            let Some(idx) = axis_order.iter().position(|a| a == axis) else {
                continue;
            };
            let extent = pixel_array_metadata.shape[idx];
            let chunk = pixel_array_metadata.chunks[idx];
            if chunk == 0 {
                return Err(Error::malformed(format!(
                    "array {} declares a zero chunk extent on axis {}",
                    dataset.path,
                    axis.name()
                )));
            }
            chunk_counts[slot] = extent.div_ceil(chunk);
            chunk_shape[slot] = chunk;
            element_counts[slot] = extent;
        }

        Ok(Self {
            axis_order,
            coords,
            name: multiscale.name.clone(),
            pixel_array_path: dataset.path.clone(),
            pixel_array_metadata,
            chunk_counts,
            chunk_shape,
            element_counts,
            ranges: zattrs.ranges.clone(),
            direction: zattrs.direction.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zattrs(value: serde_json::Value) -> GroupAttributes {
        serde_json::from_value(value).unwrap()
    }

    fn zarray(value: serde_json::Value) -> ArrayMetadata {
        serde_json::from_value(value).unwrap()
    }

    /// Group axes [t, c, z, y, x] with dataset scale [1, 1, 2, 2, 2].
    fn tczyx_zattrs() -> GroupAttributes {
        zattrs(serde_json::json!({
            "multiscales": [{
                "name": "image",
                "axes": [
                    {"name": "t"}, {"name": "c"}, {"name": "z"},
                    {"name": "y"}, {"name": "x"}
                ],
                "datasets": [{
                    "path": "s0",
                    "coordinateTransformations": [
                        {"type": "scale", "scale": [1.0, 1.0, 2.0, 2.0, 2.0]}
                    ]
                }],
                "coordinateTransformations": [
                    {"type": "scale", "scale": [1.0, 1.0, 1.0, 1.0, 1.0]}
                ]
            }]
        }))
    }

    fn tczyx_zarray() -> ArrayMetadata {
        zarray(serde_json::json!({
            "shape": [1, 1, 10, 20, 20],
            "chunks": [1, 1, 5, 10, 10],
            "dtype": "<f4"
        }))
    }

    fn resolve_tczyx() -> ScaleLevelInfo {
        let attrs = tczyx_zattrs();
        let multiscale = attrs.multiscales.first().unwrap();
        ScaleLevelInfo::resolve(&attrs, multiscale, &multiscale.datasets[0], tczyx_zarray())
            .unwrap()
    }

    #[test]
    fn canonical_arrays_scatter_into_cxyzt_slots() {
        let info = resolve_tczyx();
        assert_eq!(info.element_counts, [1, 20, 20, 10, 1]);
        assert_eq!(info.chunk_shape, [1, 10, 10, 5, 1]);
        assert_eq!(info.chunk_counts, [1, 2, 2, 2, 1]);
    }

    #[test]
    fn chunk_counts_are_ceil_of_elements_over_chunk_shape() {
        let info = resolve_tczyx();
        for slot in 0..5 {
            assert_eq!(
                info.chunk_counts[slot],
                info.element_counts[slot].div_ceil(info.chunk_shape[slot])
            );
        }
    }

    #[test]
    fn coords_sample_index_times_spacing_from_zero() {
        let info = resolve_tczyx();
        for axis in &info.axis_order {
            assert_eq!(
                info.coords[axis].len() as u64,
                info.element_counts[axis.canonical_index()]
            );
        }
        let x = &info.coords[&Axis::X];
        assert_eq!(x[0], 0.0);
        assert_eq!(x[3], 6.0);
        let t = &info.coords[&Axis::Time];
        assert_eq!(t, &vec![0.0]);
    }

    #[test]
    fn absent_transforms_default_to_unit_spacing() {
        let attrs = zattrs(serde_json::json!({
            "multiscales": [{
                "axes": [{"name": "y"}, {"name": "x"}],
                "datasets": [{"path": "s0"}]
            }]
        }));
        let multiscale = attrs.multiscales.first().unwrap();
        let meta = zarray(serde_json::json!({
            "shape": [4, 6], "chunks": [2, 2], "dtype": "<u1"
        }));
        let info =
            ScaleLevelInfo::resolve(&attrs, multiscale, &multiscale.datasets[0], meta).unwrap();
        assert_eq!(info.coords[&Axis::X], vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        // absent axes keep the trivial single-chunk defaults
        assert_eq!(info.chunk_counts, [1, 3, 2, 1, 1]);
        assert_eq!(info.element_counts, [1, 6, 4, 1, 1]);
    }

    #[test]
    fn shape_axis_count_mismatch_is_malformed() {
        let attrs = tczyx_zattrs();
        let multiscale = attrs.multiscales.first().unwrap();
        let meta = zarray(serde_json::json!({
            "shape": [1, 10, 20, 20],
            "chunks": [1, 5, 10, 10],
            "dtype": "<f4"
        }));
        let result = ScaleLevelInfo::resolve(&attrs, multiscale, &multiscale.datasets[0], meta);
        assert!(matches!(result, Err(Error::MalformedMetadata(_))));
    }

    #[test]
    fn short_scale_vector_is_malformed() {
        let attrs = zattrs(serde_json::json!({
            "multiscales": [{
                "axes": [{"name": "y"}, {"name": "x"}],
                "datasets": [{
                    "path": "s0",
                    "coordinateTransformations": [{"type": "scale", "scale": [2.0]}]
                }]
            }]
        }));
        let multiscale = attrs.multiscales.first().unwrap();
        let meta = zarray(serde_json::json!({
            "shape": [4, 6], "chunks": [2, 2], "dtype": "<u1"
        }));
        let result = ScaleLevelInfo::resolve(&attrs, multiscale, &multiscale.datasets[0], meta);
        assert!(matches!(result, Err(Error::MalformedMetadata(_))));
    }

    #[test]
    fn ranges_and_direction_pass_through() {
        let attrs = zattrs(serde_json::json!({
            "multiscales": [{
                "axes": [{"name": "y"}, {"name": "x"}],
                "datasets": [{"path": "s0"}]
            }],
            "ranges": [[0.0, 255.0]],
            "direction": [[1.0, 0.0], [0.0, -1.0]]
        }));
        let multiscale = attrs.multiscales.first().unwrap();
        let meta = zarray(serde_json::json!({
            "shape": [4, 6], "chunks": [2, 2], "dtype": "<u1"
        }));
        let info =
            ScaleLevelInfo::resolve(&attrs, multiscale, &multiscale.datasets[0], meta).unwrap();
        assert_eq!(info.ranges, Some(vec![[0.0, 255.0]]));
        assert_eq!(info.direction, Some(vec![vec![1.0, 0.0], vec![0.0, -1.0]]));
    }
}
