//! Card and page geometry.
//!
//! Every positional constant of the pipeline lives here, in two
//! coordinate systems: raster pixels for image composition and
//! millimetres for PDF placement. Both preserve the ID-1 card aspect
//! ratio, so layout tuning stays localized and testable.

/// Aspect ratio of a standard ID-1 card (85.60 mm / 53.98 mm).
pub const ID1_ASPECT_RATIO: f64 = 85.60 / 53.98;

/// Raster-side layout of one card face.
#[derive(Debug, Clone)]
pub struct CardGeometry {
    /// Card width in pixels (85.6 mm at the raster DPI).
    pub width_px: u32,
    /// Card height in pixels (53.98 mm at the raster DPI).
    pub height_px: u32,
    /// Resolution the pixel dimensions are expressed at.
    pub dpi: f64,
    /// Side of the square member photo.
    pub photo_size_px: u32,
    /// Top-left anchor of the photo on the front face.
    pub photo_anchor_px: (i64, i64),
    /// Edge length the QR code is resized to before pasting.
    pub qr_size_px: u32,
    /// Distance between the QR code and the right card edge.
    pub qr_right_margin_px: u32,
    /// Signed offset added to the vertically centred QR position.
    /// Negative values move the code up.
    pub qr_vertical_bias_px: i64,
    /// The embedded logo covers `shorter QR dimension / logo_divisor`.
    pub logo_divisor: u32,
    /// Inset of the banner rectangle on the default front face.
    pub banner_margin_px: u32,
    /// Height of the banner rectangle.
    pub banner_height_px: u32,
    /// Label anchors and sizes on the default faces.
    pub title_anchor_px: (i32, i32),
    pub name_anchor_px: (i32, i32),
    pub department_anchor_px: (i32, i32),
    pub back_title_anchor_px: (i32, i32),
    pub title_scale_px: f32,
    pub label_scale_px: f32,
    pub back_title_scale_px: f32,
}

impl Default for CardGeometry {
    fn default() -> Self {
        Self {
            width_px: 1011,
            height_px: 638,
            dpi: 300.0,
            photo_size_px: 150,
            photo_anchor_px: (50, 50),
            qr_size_px: 200,
            qr_right_margin_px: 80,
            qr_vertical_bias_px: -100,
            logo_divisor: 4,
            banner_margin_px: 50,
            banner_height_px: 150,
            title_anchor_px: (100, 80),
            name_anchor_px: (100, 250),
            department_anchor_px: (100, 300),
            back_title_anchor_px: (255, 30),
            title_scale_px: 50.0,
            label_scale_px: 30.0,
            back_title_scale_px: 40.0,
        }
    }
}

impl CardGeometry {
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width_px) / f64::from(self.height_px)
    }
}

/// Millimetre-side layout of the PDF products, independent of raster DPI.
#[derive(Debug, Clone)]
pub struct PageGeometry {
    /// Physical CR80 card size used on the grid export.
    pub card_width_mm: f64,
    pub card_height_mm: f64,
    /// A4 page the grid export is laid out on.
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub margin_x_mm: f64,
    pub margin_y_mm: f64,
    /// Horizontal gap between the front and back of one row.
    pub gap_x_mm: f64,
    /// Vertical gap between rows.
    pub gap_y_mm: f64,
    /// Vertical allowance reserved beneath each row for its caption.
    pub caption_mm: f64,
    /// Print width of each face on the single-card sheet.
    pub single_card_width_mm: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            card_width_mm: 85.6,
            card_height_mm: 54.0,
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_x_mm: 10.0,
            margin_y_mm: 15.0,
            gap_x_mm: 5.0,
            gap_y_mm: 5.0,
            caption_mm: 5.0,
            single_card_width_mm: 88.2,
        }
    }
}

impl PageGeometry {
    /// Vertical distance the grid cursor advances per row.
    pub fn row_advance_mm(&self) -> f64 {
        self.card_height_mm + self.gap_y_mm + self.caption_mm
    }

    pub fn card_aspect_ratio(&self) -> f64 {
        self.card_width_mm / self.card_height_mm
    }
}
