// Sun Jan 18 2026 - Alex

use crate::gecko::error::GeckoResult;
use crate::gecko::session::Gecko;
use crate::video::{decode_yuv_frame, VideoFrameInfo, VI_REGISTER_BASE, VI_REGISTER_SIZE};
use image::RgbImage;

impl Gecko {
    pub fn video_frame_info(&mut self) -> GeckoResult<VideoFrameInfo> {
        let regs = self.dump_to_vec(VI_REGISTER_BASE, VI_REGISTER_BASE + VI_REGISTER_SIZE)?;
        Ok(VideoFrameInfo::from_registers(&regs))
    }

    /// Grabs the frame the video interface is currently scanning out.
    pub fn capture_screenshot(&mut self) -> GeckoResult<RgbImage> {
        let info = self.video_frame_info()?;
        log::debug!(
            "Frame buffer {}x{} at 0x{:08X}",
            info.width,
            info.height,
            info.address
        );

        let data = self.dump_to_vec(info.address, info.end())?;
        if (data.len() as u32) < info.byte_len() {
            log::warn!("Frame dump short: {} of {} bytes", data.len(), info.byte_len());
        }

        let (width, height) = info.output_size();
        Ok(decode_yuv_frame(&data, width, height))
    }
}
