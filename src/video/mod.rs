// Sun Jan 18 2026 - Alex

pub mod frame;

pub use frame::{decode_yuv_frame, VideoFrameInfo, VI_REGISTER_BASE, VI_REGISTER_SIZE};
