#![forbid(unsafe_code)]

//! Pixel sinks.
//!
//! A [`Surface`] is the display the field renders into: fixed dimensions and
//! a per-pixel setter. [`Framebuffer`] is the in-memory implementation used
//! for headless runs, snapshots, and tests.

use std::io::{self, Write};

use crate::color::Rgb;
use crate::error::PlasmaError;

/// A fixed-size grid of settable RGB pixels.
///
/// Dimensions must not change while a frame loop is running.
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Set the pixel at `(x, y)`. Writes outside the surface are ignored.
    fn set_pixel(&mut self, x: u32, y: u32, color: Rgb);

    /// Publish the frame written since the last call.
    ///
    /// Surfaces that display pixels as they are set keep the default no-op.
    fn present(&mut self) -> Result<(), PlasmaError> {
        Ok(())
    }
}

impl<S: Surface + ?Sized> Surface for &mut S {
    #[inline]
    fn width(&self) -> u32 {
        (**self).width()
    }

    #[inline]
    fn height(&self) -> u32 {
        (**self).height()
    }

    #[inline]
    fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        (**self).set_pixel(x, y, color);
    }

    fn present(&mut self) -> Result<(), PlasmaError> {
        (**self).present()
    }
}

/// Row-major in-memory pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl Framebuffer {
    /// Create a black framebuffer.
    pub fn new(width: u32, height: u32) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; size],
        }
    }

    /// Pixel at `(x, y)`, or black outside the buffer.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Rgb {
        if x < self.width && y < self.height {
            self.pixels[self.offset(x, y)]
        } else {
            Rgb::BLACK
        }
    }

    /// All pixels, row-major.
    #[inline]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Write the buffer as a binary PPM (P6) image.
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for p in &self.pixels {
            bytes.extend_from_slice(&p.to_bytes());
        }
        out.write_all(&bytes)?;
        out.flush()
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl Surface for Framebuffer {
    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        if x < self.width && y < self.height {
            let idx = self.offset(x, y);
            self.pixels[idx] = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_framebuffer_is_black() {
        let fb = Framebuffer::new(10, 4);
        assert_eq!(fb.pixels().len(), 40);
        assert!(fb.pixels().iter().all(|&p| p == Rgb::BLACK));
    }

    #[test]
    fn set_get_pixel() {
        let mut fb = Framebuffer::new(10, 10);
        fb.set_pixel(5, 7, Rgb::RED);
        assert_eq!(fb.get_pixel(5, 7), Rgb::RED);
        assert_eq!(fb.get_pixel(7, 5), Rgb::BLACK);
        assert_eq!(fb.pixels()[7 * 10 + 5], Rgb::RED);
    }

    #[test]
    fn out_of_bounds_is_safe() {
        let mut fb = Framebuffer::new(10, 10);
        fb.set_pixel(100, 100, Rgb::RED);
        fb.set_pixel(10, 0, Rgb::RED);
        assert_eq!(fb.get_pixel(100, 100), Rgb::BLACK);
        assert!(fb.pixels().iter().all(|&p| p == Rgb::BLACK));
    }

    #[test]
    fn ppm_header_and_payload() {
        let mut fb = Framebuffer::new(2, 1);
        fb.set_pixel(0, 0, Rgb::new(1, 2, 3));
        fb.set_pixel(1, 0, Rgb::WHITE);
        let mut out = Vec::new();
        fb.write_ppm(&mut out).unwrap();
        let header = b"P6\n2 1\n255\n";
        assert_eq!(&out[..header.len()], header);
        assert_eq!(&out[header.len()..], &[1, 2, 3, 255, 255, 255]);
    }

    #[test]
    fn surface_through_mut_ref() {
        fn fill<S: Surface>(mut s: S) {
            for y in 0..s.height() {
                for x in 0..s.width() {
                    s.set_pixel(x, y, Rgb::BLUE);
                }
            }
            s.present().unwrap();
        }
        let mut fb = Framebuffer::new(3, 2);
        fill(&mut fb);
        assert!(fb.pixels().iter().all(|&p| p == Rgb::BLUE));
    }
}
