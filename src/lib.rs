//! # Streaming planar YCbCr to JPEG compressor
//!
//! Compresses planar YCbCr 4:2:0 image data (a full-resolution luma plane
//! plus two half-resolution chroma planes, each with independent pixel and
//! row strides) into a baseline sequential JPEG, applying an optional
//! axis-aligned crop followed by a 90-degree-multiple rotation on the fly.
//! Rows are gathered, rotated and edge-padded in fixed-height batches as the
//! encoder consumes them, so no transformed copy of the image is ever
//! materialized.
//!
//! # Usage
//!
//! For the common case, describe the three planes and call
//! [`compress_cropped`]:
//!
//! ```no_run
//! use planar_jpeg::{compress_cropped, CropRect, Plane};
//!
//! # fn main() -> Result<(), planar_jpeg::EncodingError> {
//! # let (y_data, cb_data, cr_data) = (vec![0u8; 64 * 48], vec![0u8; 32 * 24], vec![0u8; 32 * 24]);
//! let y = Plane::new(64, 48, &y_data, 1, 64)?;
//! let cb = Plane::new(32, 24, &cb_data, 1, 32)?;
//! let cr = Plane::new(32, 24, &cr_data, 1, 32)?;
//!
//! let mut jpeg = vec![0u8; 64 * 1024];
//! let len = compress_cropped(
//!     y, cb, cr,
//!     &mut jpeg,
//!     90,                          // quality
//!     CropRect::new(8, 8, 56, 40), // half-open, source coordinates
//!     1,                           // quarter turns
//! )?;
//! let jpeg = &jpeg[..len];
//! # let _ = jpeg;
//! # Ok(())
//! # }
//! ```
//!
//! Callers that want streamed output (for example into a file or socket
//! without holding the whole image) build [`RowIterator`]s themselves and
//! use [`compress`], which flushes the output buffer through a callback
//! every time it fills.
//!
//! Geometry is always made valid rather than rejected: crop rectangles may
//! extend past the image and are clamped, and edge samples are replicated
//! into the padding the encoder's block grid requires.

#![forbid(unsafe_code)]

mod compress;
mod encoder;
mod error;
mod fdct;
mod huffman;
mod marker;
mod plane;
mod quantization;
mod rowiter;
mod transform;
mod writer;

pub use compress::{compress, compress_cropped, CropRect};
pub use encoder::RawEncoder;
pub use error::{EncoderResult, EncodingError};
pub use plane::Plane;
pub use quantization::QuantizationTable;
pub use rowiter::{ChromaRowIter, LumaRowIter, RowIterator, CHROMA_ROWS, LUMA_ROWS};
pub use transform::Transform;
pub use writer::{CallbackDest, Dest, SliceDest};
