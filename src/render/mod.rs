pub mod layout;
pub mod raster;
pub mod surface;
pub mod wrap;

pub use layout::*;
pub use raster::*;
pub use surface::*;
pub use wrap::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Font error: {0}")]
    Font(String),

    #[error("Image encode error: {0}")]
    Encode(String),
}
