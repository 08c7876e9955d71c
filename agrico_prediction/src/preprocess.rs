use image::{imageops::FilterType, RgbImage};
use ndarray::{Array, Ix4};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Error reading image data: {0}")]
    Read(#[from] std::io::Error),
    #[error("Error decoding image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decodes an uploaded payload of any supported format into 8-bit RGB,
/// dropping alpha and expanding grayscale.
pub fn decode_rgb(image_data: &[u8]) -> Result<RgbImage, PreprocessError> {
    let image_reader =
        image::ImageReader::new(std::io::Cursor::new(image_data)).with_guessed_format()?;
    let img = image_reader.decode()?;
    let rgb = img.to_rgb8();

    tracing::debug!("Image size: ({}, {})", rgb.width(), rgb.height());
    Ok(rgb)
}

/// Lays the image out as a batch of one in NHWC order with raw 0-255 values.
pub fn to_batch(img: &RgbImage, image_size: Option<u32>) -> Array<f32, Ix4> {
    let resized;
    let img = match image_size {
        Some(size) if img.dimensions() != (size, size) => {
            resized = image::imageops::resize(img, size, size, FilterType::CatmullRom);
            &resized
        }
        _ => img,
    };

    let (width, height) = img.dimensions();
    let mut input = Array::zeros((1, height as usize, width as usize, 3));
    for (x, y, pixel) in img.enumerate_pixels() {
        let x = x as usize;
        let y = y as usize;
        let [r, g, b] = pixel.0;
        input[[0, y, x, 0]] = r as f32;
        input[[0, y, x, 1]] = g as f32;
        input[[0, y, x, 2]] = b as f32;
    }

    tracing::debug!("Image batch shape: {:?}", input.shape());
    input
}
