//! Font loading.
//!
//! Fonts are a runtime asset under `./fonts`: Arial if the family TTFs
//! were added there, Liberation Sans otherwise. The PDF builders need a
//! full genpdf family and fail without one; raster labels on the default
//! card faces only need a single face and are skipped when none is
//! available, so face rendering itself never fails.

use crate::error::CardError;
use ab_glyph::FontVec;
use genpdf::fonts::{FontData, FontFamily};
use log::warn;
use std::fs;
use std::path::Path;

const FONT_DIR: &str = "./fonts";

/// Loads the font family used for PDF text.
pub fn pdf_font_family() -> Result<FontFamily<FontData>, CardError> {
    if let Ok(family) = genpdf::fonts::from_files(FONT_DIR, "Arial", None) {
        return Ok(family);
    }
    genpdf::fonts::from_files(FONT_DIR, "LiberationSans", None)
        .map_err(|e| CardError::Font(e.to_string()))
}

/// Loads a single face for drawing labels on raster card faces.
pub fn raster_face() -> Option<FontVec> {
    for name in ["Arial-Regular.ttf", "LiberationSans-Regular.ttf"] {
        let path = Path::new(FONT_DIR).join(name);
        let Ok(bytes) = fs::read(&path) else {
            continue;
        };
        match FontVec::try_from_vec(bytes) {
            Ok(font) => return Some(font),
            Err(e) => warn!("unusable font {}: {}", path.display(), e),
        }
    }
    warn!("no raster font under {FONT_DIR}; card labels will be omitted");
    None
}
