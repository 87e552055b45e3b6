use std::io::Cursor;
use std::time::Duration;

use printpdf::{ColorBits, ColorSpace, ImageXObject, Px};
use ureq::Agent;

/// A downloaded company logo, decoded to raw RGB8 pixels.
pub struct Logo {
    pub width: u32,
    pub height: u32,
    pixels: Vec<u8>,
}

impl Logo {
    pub fn to_pdf_image(&self) -> printpdf::Image {
        printpdf::Image::from(ImageXObject {
            width: Px(self.width as usize),
            height: Px(self.height as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: self.pixels.clone(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        })
    }
}

/// Fetch and decode the logo. One retry on a failed request, then give
/// up with a warning; documents render with a placeholder instead.
pub fn fetch_logo(url: &str) -> Option<Logo> {
    let agent: Agent = Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(5)))
        .build()
        .into();

    let bytes = download(&agent, url).or_else(|| download(&agent, url));
    let Some(bytes) = bytes else {
        eprintln!("Warning: could not download logo from {url}; continuing without it");
        return None;
    };

    match decode(&bytes) {
        Some(logo) => Some(logo),
        None => {
            eprintln!("Warning: could not decode logo from {url}; continuing without it");
            None
        }
    }
}

fn download(agent: &Agent, url: &str) -> Option<Vec<u8>> {
    agent.get(url).call().ok()?.body_mut().read_to_vec().ok()
}

fn decode(bytes: &[u8]) -> Option<Logo> {
    let decoded = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .decode()
        .ok()?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    Some(Logo {
        width,
        height,
        pixels: rgb.into_raw(),
    })
}
