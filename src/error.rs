use core::fmt;

/// # Errors that can occur during encoding
#[derive(Debug)]
#[non_exhaustive]
pub enum EncodingError {
    /// Plane geometry addresses samples outside the backing slice
    InvalidPlane(&'static str),

    /// Output image dimensions outside `1..=65535`
    InvalidDimensions {
        width: i32,
        height: i32,
    },

    /// The crop region (after rotation) has zero area
    EmptyCropRegion,

    /// A row batch is narrower than the encoder's MCU band requires
    BadRowLength {
        required: usize,
        actual: usize,
    },

    /// The single-shot output buffer cannot hold the compressed stream
    OutputBufferFull {
        capacity: usize,
    },

    /// `finish` was called before all MCU bands were written
    ImageIncomplete {
        written_rows: u32,
        height: u16,
    },
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPlane(msg) => write!(f, "invalid plane: {}", msg),
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid output dimensions: {}x{}", width, height)
            }
            Self::EmptyCropRegion => write!(f, "crop region has zero area"),
            Self::BadRowLength { required, actual } => {
                write!(f, "row too short: need {} samples, got {}", required, actual)
            }
            Self::OutputBufferFull { capacity } => {
                write!(f, "output buffer full ({} bytes)", capacity)
            }
            Self::ImageIncomplete { written_rows, height } => {
                write!(f, "only {} of {} rows written", written_rows, height)
            }
        }
    }
}

impl std::error::Error for EncodingError {}

pub type EncoderResult<T> = Result<T, EncodingError>;
