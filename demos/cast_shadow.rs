use image::Rgba;
use shadow_caster::{CutoutPlacement, ShadowSynthesizer, Vec2, error::Result};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let background_path = args
        .next()
        .unwrap_or_else(|| "assets/background.jpg".to_string());
    let cutout_path = args
        .next()
        .unwrap_or_else(|| "assets/person_cutout.png".to_string());

    let background = image::open(&background_path)?.to_rgb8();
    let cutout = image::open(&cutout_path)?.to_rgba8();
    let (canvas_width, canvas_height) = background.dimensions();
    let (cutout_width, cutout_height) = cutout.dimensions();

    let placement = CutoutPlacement::new(
        canvas_width.saturating_sub(cutout_width) as f64 / 2.0,
        canvas_height.saturating_sub(cutout_height) as f64 / 2.0,
        cutout_width as f64,
        cutout_height as f64,
    );
    let light_pos = Vec2::new(canvas_width as f64 * 0.25, 0.0);
    let sun_angle_degrees = 35.0;

    let synthesizer = ShadowSynthesizer::new();
    let shadow_layer = synthesizer.cast_shadow(
        &cutout,
        &placement,
        light_pos,
        sun_angle_degrees,
        canvas_width,
        canvas_height,
    );

    // Compositing is the caller's responsibility; done here to preview
    // the layer in context.
    let mut composite = image::RgbaImage::new(canvas_width, canvas_height);
    for (x, y, pixel) in composite.enumerate_pixels_mut() {
        let bg = background.get_pixel(x, y);
        let shadow = shadow_layer.get_pixel(x, y);
        let alpha = shadow[3] as f64 / 255.0;
        let blend =
            |b: u8, s: u8| ((1.0 - alpha) * b as f64 + alpha * s as f64).round() as u8;
        *pixel = Rgba([
            blend(bg[0], shadow[0]),
            blend(bg[1], shadow[1]),
            blend(bg[2], shadow[2]),
            255,
        ]);
    }

    for y in 0..cutout_height {
        for x in 0..cutout_width {
            let canvas_x = placement.x as u32 + x;
            let canvas_y = placement.y as u32 + y;
            if canvas_x >= canvas_width || canvas_y >= canvas_height {
                continue;
            }
            let fg = cutout.get_pixel(x, y);
            let alpha = fg[3] as f64 / 255.0;
            let dst = composite.get_pixel_mut(canvas_x, canvas_y);
            for channel in 0..3 {
                dst[channel] = (fg[channel] as f64 * alpha
                    + dst[channel] as f64 * (1.0 - alpha))
                    .round() as u8;
            }
        }
    }

    std::fs::create_dir_all("output")?;
    composite.save("output/final_composite.png")?;
    println!("Saved output/final_composite.png");

    Ok(())
}
