//! QR encoding for member cards.
//!
//! Builds the fixed multi-line payload for a member and renders it as a
//! high-error-correction QR image with the club logo embedded in the
//! centre. Error correction level H keeps the code scannable with the
//! logo covering a quarter of its shorter dimension.

use crate::error::CardError;
use crate::geometry::CardGeometry;
use common::model::member::Member;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Luma, RgbImage, Rgba, RgbaImage};
use log::warn;
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode};
use std::path::Path;

/// Byte capacity of a version 40 QR code at error-correction level H.
pub const QR_MAX_PAYLOAD_BYTES: usize = 1273;

/// Pixel edge of one QR module in the rendered image. Large enough that
/// the code stays sharp after downscaling to its placement size.
const MODULE_SIZE_PX: u32 = 10;

/// Builds the payload encoded into the QR code. Field order and labels
/// are fixed; external scanners parse this exact layout.
pub fn payload(member: &Member) -> String {
    format!(
        "***CLUB DES JEUNES PROGRAMMEURS***\n\
         Nom: {}\n\
         Prénom: {}\n\
         Département: {}\n\
         Email: {}\n\
         Téléphone: {}\n\
         Profession: {}\n\
         https://club-jp.com",
        member.last_name,
        member.first_name,
        member.department,
        member.email,
        member.phone,
        member.profession,
    )
}

/// Encodes the member payload as an opaque RGB image, embedding the logo
/// at `logo_path` when one is readable. A missing or broken logo is not
/// fatal; the code is simply generated without it.
pub fn encode(
    member: &Member,
    logo_path: Option<&Path>,
    geometry: &CardGeometry,
) -> Result<RgbImage, CardError> {
    let data = payload(member);
    let code =
        QrCode::with_error_correction_level(data.as_bytes(), EcLevel::H).map_err(|e| match e {
            QrError::DataTooLong => CardError::EncodingOverflow {
                len: data.len(),
                capacity: QR_MAX_PAYLOAD_BYTES,
            },
            other => CardError::Qr(other),
        })?;

    let matrix = code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_SIZE_PX, MODULE_SIZE_PX)
        .build();
    let mut qr = DynamicImage::ImageLuma8(matrix).to_rgba8();

    if let Some(path) = logo_path {
        embed_logo(&mut qr, path, geometry.logo_divisor);
    }

    Ok(DynamicImage::ImageRgba8(qr).to_rgb8())
}

/// Pastes the logo over the centre of the code: a solid backing tile
/// first, so the modules underneath cannot bleed through the logo's
/// transparent regions, then the logo with its own alpha.
fn embed_logo(qr: &mut RgbaImage, path: &Path, divisor: u32) {
    if !path.exists() {
        warn!(
            "logo not found at {}; QR generated without it",
            path.display()
        );
        return;
    }
    let logo = match image::open(path) {
        Ok(img) => img,
        Err(e) => {
            warn!("could not read logo {}: {}", path.display(), e);
            return;
        }
    };

    let (qr_w, qr_h) = qr.dimensions();
    let logo_size = qr_w.min(qr_h) / divisor.max(1);
    let logo = logo
        .resize_exact(logo_size, logo_size, FilterType::Lanczos3)
        .to_rgba8();

    let x = i64::from((qr_w - logo_size) / 2);
    let y = i64::from((qr_h - logo_size) / 2);

    let backing = RgbaImage::from_pixel(logo_size, logo_size, Rgba([0, 0, 0, 255]));
    imageops::replace(qr, &backing, x, y);
    imageops::overlay(qr, &logo, x, y);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> Member {
        Member {
            first_name: "Ana".to_string(),
            last_name: "Doe".to_string(),
            department: "IT".to_string(),
            phone: "555123456".to_string(),
            email: "a@x.com".to_string(),
            profession: "Eng".to_string(),
            photo: None,
        }
    }

    fn decode(img: RgbImage) -> String {
        let gray = DynamicImage::ImageRgb8(img).to_luma8();
        let mut prepared = rqrr::PreparedImage::prepare(gray);
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1);
        grids[0].decode().expect("QR should decode").1
    }

    #[test]
    fn payload_reproduces_the_documented_layout() {
        assert_eq!(
            payload(&member()),
            "***CLUB DES JEUNES PROGRAMMEURS***\n\
             Nom: Doe\n\
             Prénom: Ana\n\
             Département: IT\n\
             Email: a@x.com\n\
             Téléphone: 555123456\n\
             Profession: Eng\n\
             https://club-jp.com"
        );
    }

    #[test]
    fn encode_round_trips_through_a_decoder() {
        let img = encode(&member(), None, &CardGeometry::default()).unwrap();
        assert_eq!(decode(img), payload(&member()));
    }

    #[test]
    fn embedded_logo_keeps_the_code_decodable() {
        let dir = tempfile::tempdir().unwrap();
        let logo_path = dir.path().join("logo.png");
        RgbaImage::from_pixel(64, 64, Rgba([218, 165, 32, 255]))
            .save(&logo_path)
            .unwrap();

        let img = encode(&member(), Some(&logo_path), &CardGeometry::default()).unwrap();
        assert_eq!(decode(img), payload(&member()));
    }

    #[test]
    fn missing_logo_is_not_fatal() {
        let img = encode(
            &member(),
            Some(Path::new("does/not/exist.png")),
            &CardGeometry::default(),
        )
        .unwrap();
        assert_eq!(decode(img), payload(&member()));
    }

    #[test]
    fn oversized_payload_reports_overflow_instead_of_truncating() {
        let mut m = member();
        m.profession = "x".repeat(3000);
        match encode(&m, None, &CardGeometry::default()) {
            Err(CardError::EncodingOverflow { len, capacity }) => {
                assert!(len > capacity);
                assert_eq!(capacity, QR_MAX_PAYLOAD_BYTES);
            }
            other => panic!(
                "expected EncodingOverflow, got {:?}",
                other.map(|img| img.dimensions())
            ),
        }
    }

    #[test]
    fn repeated_encoding_is_deterministic() {
        let a = encode(&member(), None, &CardGeometry::default()).unwrap();
        let b = encode(&member(), None, &CardGeometry::default()).unwrap();
        assert_eq!(a.dimensions(), b.dimensions());
        assert_eq!(md5::compute(a.as_raw()), md5::compute(b.as_raw()));
    }
}
