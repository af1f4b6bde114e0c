use shadow_caster::{ShadowSynthesizer, error::Result};

fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/background.jpg".to_string());
    let background = image::open(&path)?.to_rgb8();

    let synthesizer = ShadowSynthesizer::new();
    let analysis = synthesizer.analyze_background(&background)?;

    match analysis.light_direction {
        Some(vector) => println!(
            "Inferred light vector: ({:.3}, {:.3})",
            vector.x, vector.y
        ),
        None => println!("No significant shadows found; supply a light direction manually"),
    }
    println!(
        "Shadow contours detected: {}",
        analysis.shadow.contours.len()
    );
    println!("{}", analysis.summary().to_json()?);

    std::fs::create_dir_all("output")?;
    analysis.shadow.mask.save("output/shadow_mask.png")?;
    analysis.hardness.hard.save("output/hard_shadows.png")?;
    analysis.hardness.soft.save("output/soft_shadows.png")?;

    Ok(())
}
