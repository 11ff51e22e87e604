// Sun Jan 18 2026 - Alex

use image::{Rgb, RgbImage};

pub const VI_REGISTER_BASE: u32 = 0xCC00_2000;
pub const VI_REGISTER_SIZE: u32 = 0x80;

const PROGRESSIVE_HEIGHT: u32 = 600;

/// Geometry of the external frame buffer as programmed into the video
/// interface registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoFrameInfo {
    pub width: u32,
    pub height: u32,
    pub address: u32,
}

impl VideoFrameInfo {
    /// Reads the frame geometry out of a dump of the VI register block.
    /// Registers missing from a short dump read as zero.
    pub fn from_registers(regs: &[u8]) -> Self {
        let reg = |i: usize| regs.get(i).copied().unwrap_or(0) as u32;

        let width = reg(0x49) << 3;
        let height = ((reg(0) << 5) | (reg(1) >> 3)) & 0x7FE;

        let mut address = (reg(0x1D) << 16) | (reg(0x1E) << 8) | reg(0x1F);
        if reg(0x1C) & 0x10 != 0 {
            address <<= 5;
        }
        let address = address
            .wrapping_add(0x8000_0000)
            .wrapping_sub((reg(0x1C) & 0xF) << 3);

        Self { width, height, address }
    }

    /// Bytes of YUV data backing the frame.
    pub fn byte_len(&self) -> u32 {
        self.width * self.height * 2
    }

    pub fn end(&self) -> u32 {
        self.address.wrapping_add(self.byte_len())
    }

    pub fn is_progressive(&self) -> bool {
        self.height > PROGRESSIVE_HEIGHT
    }

    /// Dimensions of the decoded picture. Progressive modes report twice the
    /// lines, so the same bytes are laid out half as tall and twice as wide.
    pub fn output_size(&self) -> (u32, u32) {
        if self.is_progressive() {
            (self.width * 2, self.height / 2)
        } else {
            (self.width, self.height)
        }
    }
}

fn clamp_channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round() as u8
}

fn yuv_to_rgb(y: u8, u: u8, v: u8) -> Rgb<u8> {
    let y = 1.164 * (y as f64 - 16.0);
    let u = u as f64 - 128.0;
    let v = v as f64 - 128.0;

    Rgb([
        clamp_channel(y + 1.596 * v),
        clamp_channel(y - 0.392 * u - 0.813 * v),
        clamp_channel(y + 2.017 * u),
    ])
}

/// Converts packed Y/U/Y/V pairs into RGB. Each even pixel carries U in its
/// second byte and borrows V from the following pixel; odd pixels reuse both.
pub fn decode_yuv_frame(data: &[u8], width: u32, height: u32) -> RgbImage {
    let byte = |i: usize| data.get(i).copied().unwrap_or(0);
    let mut image = RgbImage::new(width, height);

    let mut u = 0;
    let mut v = 0;
    for (i, pixel) in image.pixels_mut().enumerate() {
        let pos = i * 2;
        if i % 2 == 0 {
            u = byte(pos + 1);
            v = byte(pos + 3);
        }
        *pixel = yuv_to_rgb(byte(pos), u, v);
    }

    image
}
