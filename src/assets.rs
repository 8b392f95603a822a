//! Optional card imagery and export font discovery.
//!
//! Images are looked up by stem (`subject`, `logo`) across candidate
//! directories and extensions; a missing image leaves its card region blank
//! and is never an error. The export font is resolved from an environment
//! override or well-known system font locations.

use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use image::DynamicImage;

use crate::config;
use crate::render::layout::CardImages;
use crate::render::RenderError;

/// Stem of the optional portrait shown on the left of a greeting header.
pub const SUBJECT_STEM: &str = "subject";
/// Stem of the optional logo shown on the right of a greeting header.
pub const LOGO_STEM: &str = "logo";

/// Environment variable overriding export font discovery with a file path.
pub const FONT_ENV: &str = "MAWID_FONT";

fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            dirs.push(parent.to_path_buf());
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    dirs.push(config::assets_dir());
    dirs.dedup();
    dirs
}

fn candidate_names(stem: &str) -> Vec<String> {
    ["png", "jpg", "jpeg", "PNG", "JPG", "JPEG"]
        .iter()
        .map(|ext| format!("{stem}.{ext}"))
        .collect()
}

/// Finds an image by stem across the candidate directories and extensions.
pub fn find_image(stem: &str) -> Option<PathBuf> {
    for dir in candidate_dirs() {
        for name in candidate_names(stem) {
            let path = dir.join(&name);
            if path.exists() {
                return Some(path);
            }
        }
    }
    None
}

fn load_image(stem: &str) -> Option<DynamicImage> {
    let path = find_image(stem)?;
    match image::open(&path) {
        Ok(img) => Some(img),
        Err(e) => {
            tracing::debug!(stem, path = %path.display(), error = %e, "Unreadable card image, leaving blank");
            None
        }
    }
}

/// Loads whatever optional card imagery is present.
pub fn load_card_images() -> CardImages {
    CardImages {
        subject: load_image(SUBJECT_STEM),
        logo: load_image(LOGO_STEM),
    }
}

/// Well-known regular/bold font locations, searched in order.
const FONT_CANDIDATES: [(&str, bool); 8] = [
    ("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf", false),
    ("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf", true),
    ("/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf", false),
    ("/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf", true),
    ("/usr/share/fonts/TTF/DejaVuSans.ttf", false),
    ("/usr/share/fonts/TTF/DejaVuSans-Bold.ttf", true),
    ("/System/Library/Fonts/Helvetica.ttc", false),
    ("C:\\Windows\\Fonts\\arial.ttf", false),
];

fn load_font_file(path: &Path) -> Result<FontArc, RenderError> {
    let bytes = std::fs::read(path)
        .map_err(|e| RenderError::Font(format!("cannot read {}: {e}", path.display())))?;
    FontArc::try_from_vec(bytes)
        .map_err(|e| RenderError::Font(format!("cannot parse {}: {e}", path.display())))
}

fn first_loadable(bold: bool) -> Option<FontArc> {
    FONT_CANDIDATES
        .iter()
        .filter(|(_, is_bold)| *is_bold == bold)
        .map(|(path, _)| Path::new(path))
        .filter(|p| p.exists())
        .find_map(|p| load_font_file(p).ok())
}

/// Resolves the export font: `MAWID_FONT` override first, then well-known
/// system locations. Rendering text without any font is not possible, so
/// exhausting the candidates is an error at export time.
pub fn load_export_font() -> Result<FontArc, RenderError> {
    if let Ok(path) = std::env::var(FONT_ENV) {
        return load_font_file(Path::new(&path));
    }
    first_loadable(false)
        .ok_or_else(|| RenderError::Font("no usable export font found; set MAWID_FONT".into()))
}

/// Resolves a matching bold face when one exists alongside the regular.
pub fn load_export_bold_font() -> Option<FontArc> {
    first_loadable(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_names_cover_both_cases() {
        let names = candidate_names("logo");
        assert!(names.contains(&"logo.png".to_string()));
        assert!(names.contains(&"logo.JPEG".to_string()));
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn missing_image_is_none() {
        assert!(find_image("definitely-not-a-card-asset").is_none());
    }

    #[test]
    fn missing_images_load_as_blank() {
        // stems unlikely to exist in a test environment; either way the
        // call must not fail
        let _ = load_card_images();
    }
}
