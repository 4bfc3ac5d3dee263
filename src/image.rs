use std::fmt::Write;
use std::sync::Arc;

use futures::future::try_join_all;
use log::{debug, trace};

use crate::axis;
use crate::codec::{ChunkBuffer, ChunkDecoder, ChunkRequest, RawDecoder};
use crate::element_type::ElementType;
use crate::metadata::{ArrayMetadata, GroupAttributes};
use crate::scale::ScaleLevelInfo;
use crate::storage::{FilesystemStore, ReadableStore};
use crate::{Error, Result};

/// Pixel interpretation of one sample tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    Scalar,
    Rgb,
    Rgba,
    VariableLengthVector,
}

/// Global image type, inferred from the coarsest pyramid level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageType {
    /// Count of spatial (x, y, z) axes present.
    pub dimension: usize,
    pub pixel_type: PixelType,
    pub component_type: ElementType,
    pub components: u64,
}

/// Infer a pixel kind from a declared component count and element type.
///
/// Extension point for multi-component images: a component count of 3 or 4
/// on unsigned bytes reads as color, any other multi-component combination
/// as a variable-length vector. The extractor currently reports scalar
/// pixels unconditionally; whether color should be implied without further
/// metadata flags is an open question (see DESIGN.md), so this is not wired
/// into [extract_scale_info].
pub fn infer_pixel_type(components: u64, element_type: ElementType) -> PixelType {
    match (components, element_type) {
        (0 | 1, _) => PixelType::Scalar,
        (3, t) if t.is_unsigned_byte() => PixelType::Rgb,
        (4, t) if t.is_unsigned_byte() => PixelType::Rgba,
        _ => PixelType::VariableLengthVector,
    }
}

/// Read-only surface shared by multiscale images; the seam consumed by
/// caching and rendering layers built on top of this crate.
pub trait MultiscaleImage {
    fn name(&self) -> Option<&str>;
    fn image_type(&self) -> &ImageType;
    fn scale_info(&self) -> &[ScaleLevelInfo];

    fn scale_count(&self) -> usize {
        self.scale_info().len()
    }

    /// Index of the most downsampled level.
    fn coarsest_scale(&self) -> usize {
        self.scale_count().saturating_sub(1)
    }
}

/// Resolve every declared pyramid level of the multiscale group at the
/// store root, and infer the global image type.
///
/// Levels are fetched concurrently; the result preserves declaration order.
/// Any per-level failure aborts the whole extraction, so a partial pyramid
/// is never returned.
pub async fn extract_scale_info(
    store: &dyn ReadableStore,
) -> Result<(Vec<ScaleLevelInfo>, ImageType)> {
    let zattrs_bytes = store
        .get(".zattrs")
        .await?
        .ok_or_else(|| Error::malformed("missing .zattrs document"))?;
    let zattrs: GroupAttributes = serde_json::from_slice(&zattrs_bytes)
        .map_err(|e| Error::malformed_json(".zattrs", e))?;

    // If several multiscale groups are declared, take the first.
    let multiscale = zattrs
        .multiscales
        .first()
        .ok_or_else(|| Error::malformed("empty multiscales declaration"))?;
    let zattrs_ref = &zattrs;

    let scale_info = try_join_all(multiscale.datasets.iter().map(|dataset| async move {
        let key = format!("{}/.zarray", dataset.path);
        let bytes = store
            .get(&key)
            .await?
            .ok_or_else(|| Error::malformed(format!("missing {key} document")))?;
        let pixel_array_metadata: ArrayMetadata =
            serde_json::from_slice(&bytes).map_err(|e| Error::malformed_json(&key, e))?;
        ScaleLevelInfo::resolve(zattrs_ref, multiscale, dataset, pixel_array_metadata)
    }))
    .await?;

    // The last declared level is the coarsest, and the cheapest to reason
    // about; it fixes the image type for the whole pyramid.
    let info = scale_info
        .last()
        .ok_or_else(|| Error::malformed("multiscale group declares no datasets"))?;
    let dimension = axis::spatial_dimension_of(&info.axis_order);
    let component_type = ElementType::from_dtype(&info.pixel_array_metadata.dtype)?;
    let image_type = ImageType {
        dimension,
        pixel_type: PixelType::Scalar,
        component_type,
        components: 1,
    };
    debug!(
        "extracted {} scale levels, {}D {:?}",
        scale_info.len(),
        dimension,
        component_type
    );
    Ok((scale_info, image_type))
}

/// An opened multiscale image: immutable per-scale metadata plus the store
/// and decoder collaborators used to resolve chunk requests.
///
/// Metadata never mutates after construction, so a `ZarrMultiscaleChunkedImage`
/// can be shared freely across concurrent [retrieve_chunks](Self::retrieve_chunks)
/// calls. Decoded chunks are never cached here; overlapping requests fetch
/// and decode independently.
pub struct ZarrMultiscaleChunkedImage {
    store: Arc<dyn ReadableStore>,
    decoder: Arc<dyn ChunkDecoder>,
    scale_info: Vec<ScaleLevelInfo>,
    image_type: ImageType,
}

impl ZarrMultiscaleChunkedImage {
    /// Open an image from a store, performing the full metadata extraction
    /// before returning. Chunks decode through the [RawDecoder].
    pub async fn from_store(store: Arc<dyn ReadableStore>) -> Result<Self> {
        Self::from_store_with_decoder(store, Arc::new(RawDecoder)).await
    }

    pub async fn from_store_with_decoder(
        store: Arc<dyn ReadableStore>,
        decoder: Arc<dyn ChunkDecoder>,
    ) -> Result<Self> {
        let (scale_info, image_type) = extract_scale_info(store.as_ref()).await?;
        Ok(Self {
            store,
            decoder,
            scale_info,
            image_type,
        })
    }

    /// Open an image from a location string. `http(s)://` locations need
    /// the `http` feature; anything else is treated as a filesystem path,
    /// with an optional `file://` prefix.
    pub async fn from_location(location: &str) -> Result<Self> {
        Self::from_store(store_for_location(location)?).await
    }

    /// Fetch and decode the chunks at `tuples` for one scale level.
    ///
    /// Each tuple holds chunk-grid coordinates in canonical (c, x, y, z, t)
    /// slots; slots for axes absent at this level are expected to be 0 (a
    /// documented caller contract, not validated here). Chunks are fetched
    /// concurrently and decoded as one batch; output order always matches
    /// input order.
    pub async fn retrieve_chunks(
        &self,
        scale: usize,
        tuples: &[[u64; 5]],
    ) -> Result<Vec<ChunkBuffer>> {
        let info = self.scale_info.get(scale).ok_or(Error::InvalidScale {
            scale,
            levels: self.scale_info.len(),
        })?;

        let chunk_paths: Vec<String> = tuples
            .iter()
            .map(|tuple| chunk_path(info, tuple))
            .collect();
        trace!("fetching {} chunks at scale {scale}", chunk_paths.len());

        let compressed = try_join_all(chunk_paths.iter().map(|path| self.store.get(path))).await?;

        let batch: Vec<ChunkRequest<'_>> = compressed
            .into_iter()
            .map(|data| ChunkRequest {
                data,
                metadata: &info.pixel_array_metadata,
            })
            .collect();
        self.decoder.decode(batch).await
    }
}

impl MultiscaleImage for ZarrMultiscaleChunkedImage {
    fn name(&self) -> Option<&str> {
        self.scale_info.first().and_then(|info| info.name.as_deref())
    }

    fn image_type(&self) -> &ImageType {
        &self.image_type
    }

    fn scale_info(&self) -> &[ScaleLevelInfo] {
        &self.scale_info
    }
}

/// Storage key of one chunk: the level path followed by the grid coordinate
/// for each axis in this level's *declared* order, taken from the tuple's
/// canonical slot for that axis. On-disk segment order follows the dataset's
/// declaration and may differ per level.
fn chunk_path(info: &ScaleLevelInfo, tuple: &[u64; 5]) -> String {
    let mut path = info.pixel_array_path.clone();
    for axis in &info.axis_order {
        write!(path, "/{}", tuple[axis.canonical_index()]).expect("String write");
    }
    path
}

fn store_for_location(location: &str) -> Result<Arc<dyn ReadableStore>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        #[cfg(feature = "http")]
        return Ok(Arc::new(crate::storage::HttpStore::new(location)?));
        #[cfg(not(feature = "http"))]
        return Err(Error::Storage(crate::storage::StorageError::Unsupported(
            "http locations require the `http` feature".into(),
        )));
    }
    let path = location.strip_prefix("file://").unwrap_or(location);
    Ok(Arc::new(FilesystemStore::new(path)))
}
