use super::Zoom;

/// A rendered page, PNG encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub page: u32,
    pub zoom: Zoom,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}
