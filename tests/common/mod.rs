#![allow(dead_code)]

use std::fs;
use std::path::Path;

use image::{Rgb, RgbImage};

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

pub fn blank_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, BACKGROUND)
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    blank_image(width, height)
        .save_with_format(path, image::ImageFormat::Png)
        .expect("write png file");
}

pub fn write_text(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, contents).expect("write text file");
}

/// Number of pixels that differ from [`BACKGROUND`].
pub fn painted_pixels(image: &RgbImage) -> usize {
    image.pixels().filter(|p| **p != BACKGROUND).count()
}
