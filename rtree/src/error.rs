use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid rectangle extent: width {width} and height {height} must be non-negative")]
    InvalidExtent { width: f64, height: f64 },
}
