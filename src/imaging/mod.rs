//! Image preparation — compression for upload, previews for review.

mod compress;
pub mod thumbnail;

pub use compress::{
    compress_for_upload, compress_with_limit, downscale, encode_png, EncodeError, EncodedImage,
    DOWNSCALE_RATIO, UPLOAD_SIZE_LIMIT,
};
pub use thumbnail::{fit_within, PREVIEW_MAX, THUMBNAIL_MAX};
