//! Card face rendering.
//!
//! Composites template backgrounds, member photos and QR codes into the
//! front and back faces of a card. A damaged or missing template or
//! photo degrades to a programmatically drawn default; face rendering
//! itself never fails. All per-member content (photo, QR) goes on the
//! front; the back carries the template or the default title only.

use crate::fonts;
use crate::geometry::CardGeometry;
use ab_glyph::{FontVec, PxScale};
use common::model::member::Member;
use common::model::template::CardTemplate;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use log::warn;
use std::path::Path;

const FRONT_BACKGROUND: Rgb<u8> = Rgb([30, 30, 30]);
const BANNER_COLOR: Rgb<u8> = Rgb([218, 165, 32]);
const BACK_BACKGROUND: Rgb<u8> = Rgb([240, 240, 240]);
const TITLE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const NAME_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const DEPARTMENT_COLOR: Rgb<u8> = Rgb([200, 200, 200]);
const BACK_TITLE_COLOR: Rgb<u8> = Rgb([30, 30, 30]);

const FRONT_TITLE: &str = "CARTE MEMBRE";
const BACK_TITLE: &str = "CLUB DES JEUNES PROGRAMMEURS";

/// Renders the front face: template (or default) background, the member
/// photo if one is readable, and the QR code.
pub fn render_front(
    member: &Member,
    template: Option<&CardTemplate>,
    qr: &RgbImage,
    geometry: &CardGeometry,
) -> RgbImage {
    let mut card = template
        .and_then(|t| load_face(&t.front_path, geometry))
        .unwrap_or_else(|| default_front(member, geometry));

    if let Some(photo_path) = member.photo.as_deref() {
        paste_photo(&mut card, photo_path, geometry);
    }
    paste_qr(&mut card, qr, geometry);
    card
}

/// Renders the back face: template background only, or the default back.
pub fn render_back(template: Option<&CardTemplate>, geometry: &CardGeometry) -> RgbImage {
    template
        .and_then(|t| load_face(&t.back_path, geometry))
        .unwrap_or_else(|| default_back(geometry))
}

/// Loads a template background and forces it to the exact card pixel
/// dimensions. Returns `None` on any failure so callers fall back to
/// the default face; a broken template must not block card issuance.
fn load_face(path: &Path, geometry: &CardGeometry) -> Option<RgbImage> {
    match image::open(path) {
        Ok(img) => Some(
            img.resize_exact(geometry.width_px, geometry.height_px, FilterType::Lanczos3)
                .to_rgb8(),
        ),
        Err(e) => {
            warn!(
                "could not load template face {}: {}; using default face",
                path.display(),
                e
            );
            None
        }
    }
}

/// Default front: dark background, club-colored banner, labels.
fn default_front(member: &Member, geometry: &CardGeometry) -> RgbImage {
    let mut card = RgbImage::from_pixel(geometry.width_px, geometry.height_px, FRONT_BACKGROUND);

    let margin = geometry.banner_margin_px;
    let banner = Rect::at(margin as i32, margin as i32)
        .of_size(geometry.width_px - 2 * margin, geometry.banner_height_px);
    draw_filled_rect_mut(&mut card, banner, BANNER_COLOR);

    if let Some(font) = fonts::raster_face() {
        draw_label(
            &mut card,
            &font,
            geometry.title_scale_px,
            geometry.title_anchor_px,
            TITLE_COLOR,
            FRONT_TITLE,
        );
        draw_label(
            &mut card,
            &font,
            geometry.label_scale_px,
            geometry.name_anchor_px,
            NAME_COLOR,
            &member.full_name(),
        );
        draw_label(
            &mut card,
            &font,
            geometry.label_scale_px,
            geometry.department_anchor_px,
            DEPARTMENT_COLOR,
            &member.department,
        );
    }
    card
}

/// Default back: light background bearing the club title.
fn default_back(geometry: &CardGeometry) -> RgbImage {
    let mut card = RgbImage::from_pixel(geometry.width_px, geometry.height_px, BACK_BACKGROUND);
    if let Some(font) = fonts::raster_face() {
        draw_label(
            &mut card,
            &font,
            geometry.back_title_scale_px,
            geometry.back_title_anchor_px,
            BACK_TITLE_COLOR,
            BACK_TITLE,
        );
    }
    card
}

fn draw_label(
    card: &mut RgbImage,
    font: &FontVec,
    scale: f32,
    anchor: (i32, i32),
    color: Rgb<u8>,
    text: &str,
) {
    draw_text_mut(card, color, anchor.0, anchor.1, PxScale::from(scale), font, text);
}

/// Crops the member photo to a disc and pastes it at the photo anchor.
/// The circular mask becomes the paste's alpha channel, so the corners
/// of the square stay fully transparent over the background.
fn paste_photo(card: &mut RgbImage, path: &Path, geometry: &CardGeometry) {
    let photo = match image::open(path) {
        Ok(img) => img,
        Err(e) => {
            warn!("could not load member photo {}: {}", path.display(), e);
            return;
        }
    };

    let size = geometry.photo_size_px;
    let photo = photo
        .resize_exact(size, size, FilterType::Lanczos3)
        .to_rgb8();

    // Mask radius is half the square side.
    let mut mask = GrayImage::new(size, size);
    let radius = (size / 2) as i32;
    draw_filled_circle_mut(&mut mask, (radius, radius), radius, Luma([255u8]));

    let mut disc = RgbaImage::new(size, size);
    for (x, y, pixel) in disc.enumerate_pixels_mut() {
        let Rgb([r, g, b]) = *photo.get_pixel(x, y);
        let alpha = mask.get_pixel(x, y)[0];
        *pixel = Rgba([r, g, b, alpha]);
    }

    let mut canvas = DynamicImage::ImageRgb8(card.clone()).to_rgba8();
    imageops::overlay(
        &mut canvas,
        &disc,
        geometry.photo_anchor_px.0,
        geometry.photo_anchor_px.1,
    );
    *card = DynamicImage::ImageRgba8(canvas).to_rgb8();
}

/// Resizes the QR code to its placement size and anchors it a fixed
/// distance from the right edge, vertically centred plus the configured
/// signed bias.
fn paste_qr(card: &mut RgbImage, qr: &RgbImage, geometry: &CardGeometry) {
    let size = geometry.qr_size_px;
    let resized = imageops::resize(qr, size, size, FilterType::Lanczos3);
    let x = i64::from(geometry.width_px - size - geometry.qr_right_margin_px);
    let y = i64::from(geometry.height_px.saturating_sub(size) / 2) + geometry.qr_vertical_bias_px;
    imageops::replace(card, &resized, x, y);
}
