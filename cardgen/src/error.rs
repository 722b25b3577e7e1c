//! Error taxonomy for the card pipeline.
//!
//! Only structural failures of a request cross the component boundary:
//! an oversized QR payload, a batch export with nothing to print, or an
//! unusable PDF/store backend. Problems with optional decorative assets
//! (logo, template backgrounds, member photos) are recovered locally by
//! falling back to a default appearance and never surface as errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CardError {
    /// The member payload does not fit into a QR code at the highest
    /// error-correction level. The payload is never truncated; trimming
    /// input fields is the caller's responsibility.
    #[error(
        "QR payload of {len} bytes exceeds the {capacity}-byte capacity at error-correction level H"
    )]
    EncodingOverflow { len: usize, capacity: usize },

    /// A batch export filtered down to zero usable card pairs.
    #[error("no usable card images matched the export request")]
    EmptyResultSet,

    /// No usable font family for PDF text. Fonts are a runtime asset;
    /// only the PDF builders require them.
    #[error("font family unavailable: {0}")]
    Font(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Pdf(#[from] genpdf::error::Error),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] rusqlite::Error),

    /// QR construction failed for a reason other than capacity.
    #[error("QR encoding failed: {0:?}")]
    Qr(qrcode::types::QrError),
}
