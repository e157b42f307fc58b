//! RGBA frame buffers.

/// An 8-bit straight-alpha RGBA image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub u8, pub u8, pub u8, pub u8);

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba(0, 0, 0, 255);

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Rgba(channel(0)?, channel(2)?, channel(4)?, 255)),
            8 => Some(Rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Same color with alpha scaled by `factor` in [0, 1].
    pub fn with_opacity(self, factor: f64) -> Self {
        let a = (self.3 as f64 * factor.clamp(0.0, 1.0)).round() as u8;
        Rgba(self.0, self.1, self.2, a)
    }
}

impl Frame {
    /// A fully transparent frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&[color.0, color.1, color.2, color.3]);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap raw RGBA bytes. Returns `None` when the length does not match.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == width as usize * height as usize * 4).then_some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some(Rgba(
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ))
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Source-over blend one pixel. Out-of-bounds coordinates are ignored.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 || color.3 == 0 {
            return;
        }
        let i = self.offset(x as u32, y as u32);
        let dst = &mut self.data[i..i + 4];

        let sa = color.3 as f64 / 255.0;
        let da = dst[3] as f64 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            dst.copy_from_slice(&[0, 0, 0, 0]);
            return;
        }
        let mix = |s: u8, d: u8| {
            ((s as f64 * sa + d as f64 * da * (1.0 - sa)) / out_a).round() as u8
        };
        dst[0] = mix(color.0, dst[0]);
        dst[1] = mix(color.1, dst[1]);
        dst[2] = mix(color.2, dst[2]);
        dst[3] = (out_a * 255.0).round() as u8;
    }

    /// Blend an axis-aligned rectangle given in pixels.
    pub fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgba) {
        let x0 = x.floor().max(0.0) as i64;
        let y0 = y.floor().max(0.0) as i64;
        let x1 = (x + width).ceil().min(self.width as f64) as i64;
        let y1 = (y + height).ceil().min(self.height as f64) as i64;
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px, py, color);
            }
        }
    }

    /// Blend a ring centered at `(cx, cy)`. `thickness >= radius` draws a disc.
    pub fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, thickness: f64, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let inner = (radius - thickness).max(0.0);
        let x0 = (cx - radius).floor() as i64;
        let x1 = (cx + radius).ceil() as i64;
        let y0 = (cy - radius).floor() as i64;
        let y1 = (cy + radius).ceil() as i64;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                if d <= radius && d >= inner {
                    self.blend_pixel(px, py, color);
                }
            }
        }
    }

    /// Nearest-neighbour resample to `width` x `height`.
    pub fn scale_to(&self, width: u32, height: u32) -> Frame {
        if width == self.width && height == self.height {
            return self.clone();
        }
        let mut out = Frame::new(width, height);
        if self.width == 0 || self.height == 0 {
            return out;
        }
        for y in 0..height {
            let sy = (y as u64 * self.height as u64 / height as u64) as u32;
            for x in 0..width {
                let sx = (x as u64 * self.width as u64 / width as u64) as u32;
                let src = self.offset(sx, sy);
                let dst = out.offset(x, y);
                out.data[dst..dst + 4].copy_from_slice(&self.data[src..src + 4]);
            }
        }
        out
    }

    /// Draw `top` over this frame, stretched to this frame's size.
    pub fn composite_over(&mut self, top: &Frame) {
        let scaled;
        let top = if top.width == self.width && top.height == self.height {
            top
        } else {
            scaled = top.scale_to(self.width, self.height);
            &scaled
        };
        for y in 0..self.height {
            for x in 0..self.width {
                let i = self.offset(x, y);
                let src = &top.data[i..i + 4];
                let color = Rgba(src[0], src[1], src[2], src[3]);
                self.blend_pixel(x as i64, y as i64, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Rgba::from_hex("#3b82f6"), Some(Rgba(0x3b, 0x82, 0xf6, 255)));
        assert_eq!(Rgba::from_hex("ff000080"), Some(Rgba(255, 0, 0, 128)));
        assert_eq!(Rgba::from_hex("#xyz"), None);
    }

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(Frame::from_rgba(2, 2, vec![0; 16]).is_some());
        assert!(Frame::from_rgba(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn test_opaque_over_replaces() {
        let mut base = Frame::filled(2, 2, Rgba::BLACK);
        base.blend_pixel(0, 0, Rgba(255, 0, 0, 255));
        assert_eq!(base.pixel(0, 0), Some(Rgba(255, 0, 0, 255)));
        assert_eq!(base.pixel(1, 1), Some(Rgba::BLACK));
    }

    #[test]
    fn test_half_alpha_over_black() {
        let mut base = Frame::filled(1, 1, Rgba::BLACK);
        base.blend_pixel(0, 0, Rgba(255, 255, 255, 128));
        let Rgba(r, _, _, a) = base.pixel(0, 0).unwrap();
        assert!((127..=129).contains(&r));
        assert_eq!(a, 255);
    }

    #[test]
    fn test_transparent_overlay_leaves_base() {
        let mut base = Frame::filled(3, 3, Rgba(10, 20, 30, 255));
        let before = base.clone();
        base.composite_over(&Frame::new(6, 6));
        assert_eq!(base, before);
    }

    #[test]
    fn test_scale_and_composite_mismatched_sizes() {
        let mut base = Frame::filled(4, 4, Rgba::BLACK);
        let mut top = Frame::new(2, 2);
        top.fill_rect(0.0, 0.0, 1.0, 1.0, Rgba(0, 255, 0, 255));
        base.composite_over(&top);
        assert_eq!(base.pixel(1, 1), Some(Rgba(0, 255, 0, 255)));
        assert_eq!(base.pixel(2, 2), Some(Rgba::BLACK));
    }

    #[test]
    fn test_fill_rect_clips_to_bounds() {
        let mut frame = Frame::new(4, 4);
        frame.fill_rect(-2.0, -2.0, 100.0, 4.0, Rgba::BLACK);
        assert_eq!(frame.pixel(3, 0), Some(Rgba::BLACK));
        assert_eq!(frame.pixel(0, 1), Some(Rgba::BLACK));
        assert_eq!(frame.pixel(0, 2), Some(Rgba::TRANSPARENT));
    }
}
