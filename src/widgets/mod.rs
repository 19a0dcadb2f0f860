mod resize_handle;

pub use resize_handle::{Corner, CropHandle, draw_corner_handle, draw_crop_handle};
