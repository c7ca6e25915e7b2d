//! Renders a gallery of styled QR codes and checks each one scans back
//!
//! Usage: cargo run -p qrstyle-core --example render_gallery [output_dir] [font.ttf]

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use qrstyle_core::{
    verify, BorderLine, CardStyle, Color, Compositor, EncodableContent, ErrorCorrection, FrameStyle, LogoShape,
    ModuleShape, Quality, QrcodeEncoder, SocialNetwork, StyleConfig, WifiSecurity,
};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| "generated_gallery".to_string()));
    let compositor = match args.next() {
        Some(path) => {
            let bytes = fs::read(&path).with_context(|| format!("reading font {}", path))?;
            Compositor::with_font(bytes)?
        }
        None => Compositor::new(),
    };

    fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    println!("Rendering gallery into {:?}", output_dir);

    let logo = {
        let mut img = image::RgbaImage::from_pixel(96, 96, image::Rgba([255, 255, 255, 0]));
        for (x, y, px) in img.enumerate_pixels_mut() {
            let (dx, dy) = (x as f32 - 47.5, y as f32 - 47.5);
            if dx * dx + dy * dy < 40.0 * 40.0 {
                *px = image::Rgba([230, 57, 70, 255]);
            }
        }
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)?;
        qrstyle_core::load_image(buf)?
    };

    let entries = vec![
        (
            "url_square",
            EncodableContent::Url { url: "https://example.com".to_string() },
            StyleConfig::default(),
        ),
        (
            "wifi_dots",
            EncodableContent::Wifi {
                ssid: "Cafe Guest".to_string(),
                password: "espresso;42".to_string(),
                security: WifiSecurity::Wpa,
            },
            StyleConfig {
                module_shape: ModuleShape::Dots,
                eye_shape: ModuleShape::Square,
                frame: FrameStyle::Label,
                frame_text: "Free Wi-Fi".to_string(),
                ..StyleConfig::default()
            },
        ),
        (
            "social_gradient",
            EncodableContent::Social {
                network: SocialNetwork::Instagram,
                handle: "@example".to_string(),
            },
            StyleConfig {
                module_shape: ModuleShape::Rounded,
                eye_shape: ModuleShape::Rounded,
                gradient_enabled: true,
                gradient_from: Color::rgb(131, 58, 180),
                gradient_to: Color::rgb(253, 29, 29),
                frame: FrameStyle::Border,
                ..StyleConfig::default()
            },
        ),
        (
            "email_logo",
            EncodableContent::Email {
                address: "hello@example.com".to_string(),
                subject: "Hello".to_string(),
                body: String::new(),
            },
            StyleConfig {
                error_correction: ErrorCorrection::H,
                logo: Some(logo.clone()),
                logo_shape: LogoShape::Circle,
                ..StyleConfig::default()
            },
        ),
        (
            "menu_card",
            EncodableContent::Url { url: "https://example.com/menu".to_string() },
            StyleConfig {
                module_shape: ModuleShape::Rounded,
                frame_text: "Today's menu".to_string(),
                card: Some(CardStyle {
                    border_line: BorderLine::Dashed,
                    caption: true,
                    ..CardStyle::default()
                }),
                ..StyleConfig::default()
            }
            .with_quality(Quality::High),
        ),
    ];

    let mut failures = 0;
    for (name, content, style) in entries {
        let payload = match content.encode() {
            Some(payload) => payload,
            None => bail!("{} has incomplete content", name),
        };
        let composed = compositor.render(&QrcodeEncoder, &payload, &style)?;
        let path = output_dir.join(format!("{}.png", name));
        fs::write(&path, composed.png()).with_context(|| format!("writing {}", path.display()))?;

        match verify::scan(composed.image()) {
            Ok(decoded) if decoded == payload => println!("  {:<16} ok  {}", name, path.display()),
            Ok(decoded) => {
                failures += 1;
                println!("  {:<16} MISMATCH {:?}", name, decoded);
            }
            Err(e) => {
                failures += 1;
                println!("  {:<16} FAILED {}", name, e);
            }
        }
    }

    if failures > 0 {
        bail!("{} gallery entries did not scan back", failures);
    }
    println!("Done.");
    Ok(())
}
