//! Fonts for label text.
//!
//! A scalable TrueType font is preferred. When it cannot be found or
//! parsed, the embedded DejaVu Sans is used instead, so label rendering
//! never fails.

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{point, Font, Scale};
use walkdir::WalkDir;

/// Preferred font file name.
pub const DEFAULT_FONT_NAME: &str = "arial.ttf";

/// Preferred font size in pixels.
pub const DEFAULT_FONT_SIZE: f32 = 24.0;

static EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Font used to render label text.
#[derive(Clone)]
pub struct LabelFont {
    font: Font<'static>,
    scale: Scale,
    builtin: bool,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelFont")
            .field("size", &self.scale.y)
            .field("builtin", &self.builtin)
            .finish_non_exhaustive()
    }
}

impl Default for LabelFont {
    fn default() -> Self {
        LabelFont::builtin()
    }
}

impl LabelFont {
    /// The embedded font at [`DEFAULT_FONT_SIZE`].
    pub fn builtin() -> Self {
        LabelFont::embedded(DEFAULT_FONT_SIZE)
    }

    /// The embedded font at `size` pixels.
    pub fn embedded(size: f32) -> Self {
        // The embedded bytes are a fixed, known-good TrueType file.
        let font = Font::try_from_bytes(EMBEDDED_FONT).expect("embedded font is valid TrueType");
        LabelFont {
            font,
            scale: Scale::uniform(size),
            builtin: true,
        }
    }

    /// Parses a TrueType/OpenType font from memory.
    pub fn from_bytes(bytes: Vec<u8>, size: f32) -> Option<Self> {
        let font = Font::try_from_vec(bytes)?;
        Some(LabelFont {
            font,
            scale: Scale::uniform(size),
            builtin: false,
        })
    }

    /// Loads `name` at `size` pixels, falling back to the embedded font.
    ///
    /// `name` is tried as a path first and then looked up by file name in
    /// the usual system font directories.
    pub fn load_or_default(name: &str, size: f32) -> Self {
        let Some(path) = find_font_file(name) else {
            tracing::debug!(font = name, "font not found, using embedded font");
            return LabelFont::embedded(size);
        };

        match fs::read(&path) {
            Ok(bytes) => LabelFont::from_bytes(bytes, size).unwrap_or_else(|| {
                tracing::debug!(path = %path.display(), "font could not be parsed, using embedded font");
                LabelFont::embedded(size)
            }),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "font could not be read, using embedded font");
                LabelFont::embedded(size)
            }
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Measures `text` as `(width, height)` in pixels.
    ///
    /// The height is the font's full line height, independent of `text`.
    pub fn text_size(&self, text: &str) -> (u32, u32) {
        let v_metrics = self.font.v_metrics(self.scale);
        let width = self
            .font
            .layout(text, self.scale, point(0.0, v_metrics.ascent))
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .fold(0.0f32, f32::max);
        let height = v_metrics.ascent - v_metrics.descent;
        (width.ceil().max(0.0) as u32, height.ceil().max(0.0) as u32)
    }

    /// Draws `text` with its top-left corner at `(x, y)`, clipped to the image.
    pub fn draw_text(&self, image: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, text: &str) {
        draw_text_mut(image, color, x, y, self.scale, &self.font, text);
    }
}

fn font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        PathBuf::from("/Library/Fonts"),
        PathBuf::from("/System/Library/Fonts"),
        PathBuf::from("C:\\Windows\\Fonts"),
    ];
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join(".fonts"));
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join("Library/Fonts"));
    }
    dirs
}

fn find_font_file(name: &str) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.is_file() {
        return Some(direct.to_path_buf());
    }

    let file_name = direct.file_name()?.to_str()?;
    font_dirs()
        .into_iter()
        .filter(|dir| dir.is_dir())
        .find_map(|dir| {
            WalkDir::new(dir)
                .max_depth(4)
                .into_iter()
                .filter_map(Result::ok)
                .find(|entry| {
                    entry.file_type().is_file()
                        && entry
                            .file_name()
                            .to_str()
                            .is_some_and(|n| n.eq_ignore_ascii_case(file_name))
                })
                .map(|entry| entry.into_path())
        })
}
