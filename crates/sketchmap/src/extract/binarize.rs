//! Adaptive binarization against a local mean.

use crate::ingest::Bitmap;

/// Ink mask of a bitmap, row-major.
#[derive(Debug, Clone)]
pub struct InkMask {
    width: u32,
    height: u32,
    ink: Vec<bool>,
}

impl InkMask {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.ink[self.index(x, y)]
    }

    pub fn ink_count(&self) -> usize {
        self.ink.iter().filter(|&&ink| ink).count()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Summed-area table with one row and column of zero padding.
struct IntegralImage {
    stride: usize,
    sums: Vec<u64>,
}

impl IntegralImage {
    fn new(bitmap: &Bitmap) -> Self {
        let width = bitmap.width() as usize;
        let height = bitmap.height() as usize;
        let stride = width + 1;
        let mut sums = vec![0u64; stride * (height + 1)];

        for y in 0..height {
            let mut row_sum = 0u64;
            for x in 0..width {
                row_sum += bitmap.pixels()[y * width + x] as u64;
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row_sum;
            }
        }

        Self { stride, sums }
    }

    /// Sum over the half-open rectangle `[x0, x1) x [y0, y1)`.
    fn sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        let at = |x: usize, y: usize| self.sums[y * self.stride + x];
        at(x1, y1) + at(x0, y0) - at(x0, y1) - at(x1, y0)
    }
}

/// Marks a pixel as ink when it is darker than its neighbourhood mean by
/// more than `offset` and darker than `background_level`.
///
/// The window is `(2 * radius + 1)` pixels square, clipped at the borders.
pub fn binarize(bitmap: &Bitmap, radius: u32, offset: f32, background_level: u8) -> InkMask {
    let width = bitmap.width() as usize;
    let height = bitmap.height() as usize;
    let radius = radius as usize;
    let integral = IntegralImage::new(bitmap);

    let mut ink = vec![false; width * height];
    for y in 0..height {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius + 1).min(height);
        for x in 0..width {
            let value = bitmap.pixels()[y * width + x];
            if value >= background_level {
                continue;
            }
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius + 1).min(width);
            let count = ((x1 - x0) * (y1 - y0)) as f32;
            let mean = integral.sum(x0, y0, x1, y1) as f32 / count;
            ink[y * width + x] = (value as f32) < mean - offset;
        }
    }

    InkMask {
        width: bitmap.width(),
        height: bitmap.height(),
        ink,
    }
}
