//! Price items, manual entry and photo payloads.

pub mod form;
pub mod model;
pub mod request;

pub use form::PriceForm;
pub use model::{
    MAX_CAPTURE_QUANTITY, MIN_CAPTURE_QUANTITY, PriceItem, PriceStatus, clamp_capture_quantity,
};
pub use request::{NewPrice, PhotoUpload, PricePhoto, PriceUpdate};
