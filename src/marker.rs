/// JFIF segment markers emitted by the writer.
///
/// Only the markers a baseline sequential stream needs are represented.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Marker {
    /// Start of image
    SOI,
    /// End of image
    EOI,
    /// Baseline DCT frame header
    SOF0,
    /// Define huffman tables
    DHT,
    /// Define quantization tables
    DQT,
    /// Start of scan
    SOS,
    /// JFIF application segment
    APP0,
}

impl Marker {
    pub(crate) fn to_byte(self) -> u8 {
        match self {
            Marker::SOI => 0xD8,
            Marker::EOI => 0xD9,
            Marker::SOF0 => 0xC0,
            Marker::DHT => 0xC4,
            Marker::DQT => 0xDB,
            Marker::SOS => 0xDA,
            Marker::APP0 => 0xE0,
        }
    }
}
