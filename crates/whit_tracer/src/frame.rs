//! Frame buffer with progressive accumulation.
//!
//! Each pass traces one primary ray per pixel. With accumulation enabled the
//! output is the running average of every pass since the last reset.

use crate::{Color, RayGenerator, World};
use rayon::prelude::*;
use std::time::Instant;
use whit_math::Ray;

/// Pack a linear color into `0xAABBGGRR` with opaque alpha.
///
/// Channels are clamped to [0, 1] and scaled to [0, 255] with truncation.
#[inline]
pub fn pack_abgr(color: Color) -> u32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u32;
    let r = channel(color.x);
    let g = channel(color.y);
    let b = channel(color.z);
    (0xFF << 24) | (b << 16) | (g << 8) | r
}

/// Output pixels plus the accumulation buffer behind them.
pub struct FrameBuffer {
    width: u32,
    height: u32,
    accumulation: Vec<Color>,
    pixels: Vec<u32>,
    frame_index: u32,
    accumulate: bool,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            accumulation: vec![Color::ZERO; len],
            pixels: vec![0; len],
            frame_index: 1,
            accumulate: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Index of the next pass, starting at 1.
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    pub fn is_accumulating(&self) -> bool {
        self.accumulate
    }

    /// Reallocate both buffers for a new size. Equal sizes are a no-op.
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.width && height == self.height {
            return;
        }
        log::debug!("Frame buffer resized to {}x{}", width, height);

        let len = width as usize * height as usize;
        self.width = width;
        self.height = height;
        self.accumulation = vec![Color::ZERO; len];
        self.pixels = vec![0; len];
        self.reset_accumulation();
    }

    /// Toggle accumulation. Either direction restarts the average.
    pub fn set_accumulate(&mut self, accumulate: bool) {
        self.accumulate = accumulate;
        self.reset_accumulation();
    }

    pub fn reset_accumulation(&mut self) {
        self.frame_index = 1;
    }

    /// Trace one pass over every pixel.
    pub fn render<C: RayGenerator + ?Sized>(&mut self, world: &World, camera: &C) {
        let start = Instant::now();
        if self.frame_index == 1 {
            self.accumulation.fill(Color::ZERO);
        }

        let width = self.width as usize;
        let frame = self.frame_index as f32;

        self.accumulation
            .par_chunks_mut(width)
            .zip(self.pixels.par_chunks_mut(width))
            .enumerate()
            .for_each(|(y, (acc_row, out_row))| {
                for (x, (acc, out)) in acc_row.iter_mut().zip(out_row.iter_mut()).enumerate() {
                    *acc += trace_pixel(world, camera, x as u32, y as u32);
                    *out = pack_abgr(*acc / frame);
                }
            });

        log::debug!(
            "Frame {} ({}x{}) traced in {:?}",
            self.frame_index,
            self.width,
            self.height,
            start.elapsed()
        );

        if self.accumulate {
            self.frame_index += 1;
        } else {
            self.frame_index = 1;
        }
    }

    /// Packed pixels, row-major, row 0 at the top.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// The packed pixels as bytes. On little-endian targets this is RGBA order.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Radiance for one pixel. Non-finite results become black so a bad sample
/// never reaches the accumulation buffer.
#[inline]
fn trace_pixel<C: RayGenerator + ?Sized>(world: &World, camera: &C, x: u32, y: u32) -> Color {
    let ray = Ray::new(camera.origin(), camera.ray_direction(x, y));
    let color = world.cast_ray(&ray, 0);
    if color.is_finite() {
        color
    } else {
        Color::ZERO
    }
}
