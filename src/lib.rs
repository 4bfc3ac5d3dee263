pub mod axis;
pub mod codec;
pub mod element_type;
mod error;
pub mod image;
pub mod metadata;
pub mod scale;
pub mod storage;

pub use element_type::ElementType;
pub use error::{Error, Result};
pub use image::{
    ImageType, MultiscaleImage, PixelType, ZarrMultiscaleChunkedImage, extract_scale_info,
    infer_pixel_type,
};
pub use scale::ScaleLevelInfo;
pub use storage::is_zarr;
