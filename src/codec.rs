use async_trait::async_trait;
use bytes::Bytes;

use crate::element_type::ElementType;
use crate::metadata::ArrayMetadata;
use crate::{Error, Result};

/// One entry of a decode batch: the raw chunk bytes (or `None` for a chunk
/// the store omitted) plus the array metadata that sizes and types the
/// decoded output.
#[derive(Debug, Clone)]
pub struct ChunkRequest<'a> {
    pub data: Option<Bytes>,
    pub metadata: &'a ArrayMetadata,
}

/// A decoded chunk: little-endian sample bytes for one full chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkBuffer {
    pub element_type: ElementType,
    /// Chunk shape in the level's declared axis order.
    pub shape: Vec<u64>,
    pub data: Bytes,
}

impl ChunkBuffer {
    /// Zero-filled buffer standing in for a chunk absent from the store.
    pub fn zeroed(element_type: ElementType, shape: Vec<u64>) -> Self {
        let len = shape.iter().product::<u64>() as usize * element_type.size_of();
        Self {
            element_type,
            shape,
            data: Bytes::from(vec![0u8; len]),
        }
    }

    pub fn element_count(&self) -> u64 {
        self.shape.iter().product()
    }
}

/// Decompression collaborator: a batch of compressed chunks in, decoded
/// buffers out, preserving batch order.
#[async_trait]
pub trait ChunkDecoder: Send + Sync {
    async fn decode(&self, batch: Vec<ChunkRequest<'_>>) -> Result<Vec<ChunkBuffer>>;
}

/// Decoder for uncompressed Zarr v2 chunks (`compressor: null`).
///
/// Missing chunks decode to zero-filled buffers of the declared chunk shape.
/// Compressed codecs live behind the [ChunkDecoder] boundary in dedicated
/// implementations.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDecoder;

#[async_trait]
impl ChunkDecoder for RawDecoder {
    async fn decode(&self, batch: Vec<ChunkRequest<'_>>) -> Result<Vec<ChunkBuffer>> {
        batch
            .into_iter()
            .map(|request| {
                let element_type = ElementType::from_dtype(&request.metadata.dtype)?;
                let shape = request.metadata.chunks.clone();
                let Some(data) = request.data else {
                    return Ok(ChunkBuffer::zeroed(element_type, shape));
                };
                let expected =
                    shape.iter().product::<u64>() as usize * element_type.size_of();
                if data.len() != expected {
                    return Err(Error::Decode(format!(
                        "chunk has {} bytes, expected {expected}",
                        data.len()
                    )));
                }
                Ok(ChunkBuffer {
                    element_type,
                    shape,
                    data,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> ArrayMetadata {
        serde_json::from_value(serde_json::json!({
            "shape": [10, 10],
            "chunks": [5, 4],
            "dtype": "<u2",
            "compressor": null
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn missing_chunks_decode_to_zero_fill() {
        let meta = metadata();
        let decoded = RawDecoder
            .decode(vec![ChunkRequest {
                data: None,
                metadata: &meta,
            }])
            .await
            .unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].element_type, ElementType::UInt16);
        assert_eq!(decoded[0].shape, vec![5, 4]);
        assert_eq!(decoded[0].element_count(), 20);
        assert_eq!(decoded[0].data.len(), 40);
        assert!(decoded[0].data.iter().all(|&b| b == 0));
    }

    #[tokio::test]
    async fn present_chunks_pass_through_with_length_check() {
        let meta = metadata();
        let payload = Bytes::from(vec![1u8; 40]);
        let decoded = RawDecoder
            .decode(vec![ChunkRequest {
                data: Some(payload.clone()),
                metadata: &meta,
            }])
            .await
            .unwrap();
        assert_eq!(decoded[0].data, payload);

        let truncated = RawDecoder
            .decode(vec![ChunkRequest {
                data: Some(Bytes::from(vec![1u8; 39])),
                metadata: &meta,
            }])
            .await;
        assert!(matches!(truncated, Err(Error::Decode(_))));
    }

    #[tokio::test]
    async fn unknown_dtype_fails_the_batch() {
        let meta: ArrayMetadata = serde_json::from_value(serde_json::json!({
            "shape": [2], "chunks": [2], "dtype": "<c8"
        }))
        .unwrap();
        let result = RawDecoder
            .decode(vec![ChunkRequest {
                data: None,
                metadata: &meta,
            }])
            .await;
        assert!(matches!(result, Err(Error::UnsupportedElementType(_))));
    }
}
