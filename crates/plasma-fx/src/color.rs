#![forbid(unsafe_code)]

//! 8-bit RGB color and the HSV conversion used by the hue sweep palette.

/// An opaque 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from wide integers, keeping the low 8 bits of each
    /// channel (the same result as an `as u8` cast).
    #[inline]
    pub const fn truncating(r: i64, g: i64, b: i64) -> Self {
        Self::new(r as u8, g as u8, b as u8)
    }

    /// Convert HSV to RGB.
    ///
    /// `h` is in degrees and wraps at 360; `s` and `v` are in `[0, 1]`.
    /// Channels are truncated, so `hsv(0.0, 1.0, 1.0)` is exactly [`Rgb::RED`].
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let sector = h.rem_euclid(360.0) / 60.0;
        let chroma = v * s;
        let mid = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
        let floor = v - chroma;

        // Sector 6 only appears when rem_euclid rounds up to 360.
        let (r, g, b) = match sector as u8 {
            0 => (chroma, mid, 0.0),
            1 => (mid, chroma, 0.0),
            2 => (0.0, chroma, mid),
            3 => (0.0, mid, chroma),
            4 => (mid, 0.0, chroma),
            _ => (chroma, 0.0, mid),
        };

        let channel = |value: f64| ((value + floor) * 255.0) as u8;
        Self::new(channel(r), channel(g), channel(b))
    }

    /// Channels as a `[r, g, b]` byte array.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hue_sweep_starts_at_pure_red() {
        assert_eq!(Rgb::from_hsv(0.0, 1.0, 1.0), Rgb::RED);
    }

    #[test]
    fn hue_sweep_quarter_points_truncate() {
        // Quarter turns of the 2048-entry sweep land between primaries, where
        // the half-intensity channel truncates 127.5 down.
        assert_eq!(Rgb::from_hsv(90.0, 1.0, 1.0), Rgb::new(127, 255, 0));
        assert_eq!(Rgb::from_hsv(180.0, 1.0, 1.0), Rgb::new(0, 255, 255));
        assert_eq!(Rgb::from_hsv(270.0, 1.0, 1.0), Rgb::new(127, 0, 255));
    }

    #[test]
    fn dimmed_value_scales_every_channel() {
        assert_eq!(Rgb::from_hsv(0.0, 1.0, 0.9), Rgb::new(229, 0, 0));
    }

    #[test]
    fn hsv_hue_wraps_at_360() {
        assert_eq!(Rgb::from_hsv(360.0, 1.0, 1.0), Rgb::from_hsv(0.0, 1.0, 1.0));
        assert_eq!(Rgb::from_hsv(-120.0, 1.0, 1.0), Rgb::BLUE);
    }

    #[test]
    fn hsv_zero_saturation_is_gray() {
        let c = Rgb::from_hsv(200.0, 0.0, 0.5);
        assert_eq!(c.r, c.g);
        assert_eq!(c.g, c.b);
    }

    #[test]
    fn hsv_zero_value_is_black() {
        assert_eq!(Rgb::from_hsv(77.0, 1.0, 0.0), Rgb::BLACK);
    }

    #[test]
    fn truncating_keeps_low_byte() {
        assert_eq!(Rgb::truncating(256, 257, -1), Rgb::new(0, 1, 255));
        assert_eq!(Rgb::truncating(12, 34, 56), Rgb::new(12, 34, 56));
    }
}
