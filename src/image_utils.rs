use image::{GrayImage, Luma, RgbImage};
use ndarray::Array2;

/// CIE L* lightness of an sRGB image, scaled to 0..=255.
///
/// Shadow detection thresholds lightness rather than raw luma so that
/// saturated but dark surfaces still register.
pub fn lightness_channel(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut lightness = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        let r = srgb_to_linear(pixel[0] as f64 / 255.0);
        let g = srgb_to_linear(pixel[1] as f64 / 255.0);
        let b = srgb_to_linear(pixel[2] as f64 / 255.0);

        let luminance = 0.2126 * r + 0.7152 * g + 0.0722 * b;
        let l_star = 116.0 * lab_f(luminance) - 16.0;

        let value = (l_star * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8;
        lightness.put_pixel(x, y, Luma([value]));
    }

    lightness
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn lab_f(t: f64) -> f64 {
    if t > 0.008856 {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

pub fn gray_to_array(image: &GrayImage) -> Array2<f64> {
    let (width, height) = image.dimensions();
    let mut arr = Array2::zeros((height as usize, width as usize));

    for (x, y, pixel) in image.enumerate_pixels() {
        arr[[y as usize, x as usize]] = pixel[0] as f64;
    }

    arr
}

pub fn array_to_gray(arr: &Array2<f64>) -> GrayImage {
    let (height, width) = arr.dim();
    let mut image = GrayImage::new(width as u32, height as u32);

    for y in 0..height {
        for x in 0..width {
            let value = arr[[y, x]].clamp(0.0, 255.0) as u8;
            image.put_pixel(x as u32, y as u32, Luma([value]));
        }
    }

    image
}

/// Min-max normalization of a float map onto 0..=255.
pub fn normalize_to_u8(arr: &Array2<f64>) -> Array2<f64> {
    let min = arr.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = arr.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range < 1e-10 {
        Array2::zeros(arr.dim())
    } else {
        arr.mapv(|v| ((v - min) / range) * 255.0)
    }
}

/// Sigma a k×k Gaussian kernel implies when no explicit sigma is given.
///
/// Matches the derivation OpenCV applies for sigma = 0, so the fixed
/// 21×21 and 55×55 feathering kernels keep their expected softness.
pub fn gaussian_sigma_for_kernel(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}
