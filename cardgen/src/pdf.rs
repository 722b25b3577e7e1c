//! PDF document layout.
//!
//! Two print products: the single-card sheet (front and back side by
//! side on Letter) and the batch grid (CR80-sized card pairs stacked on
//! A4 pages). Rasters travel into the PDF by being flattened to RGB,
//! written to a temporary PNG and embedded by path with an explicit DPI
//! that fixes their physical print size; the temp files stay alive in a
//! scope-local vector until rendering finishes.

use crate::error::CardError;
use crate::fonts;
use crate::geometry::PageGeometry;
use chrono::NaiveDate;
use common::model::card::CardPair;
use common::model::member::Member;
use genpdf::elements::{Break, Image as PdfImage, LinearLayout, PageBreak, Paragraph, TableLayout};
use genpdf::style::Style;
use genpdf::{Alignment, Document, Element, Margins, PaperSize, SimplePageDecorator};
use image::RgbImage;
use log::warn;
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};
use tempfile::NamedTempFile;

const MM_PER_INCH: f64 = 25.4;
const HEADER_FONT_SIZE: u8 = 10;
const CAPTION_FONT_SIZE: u8 = 8;

/// Result of a grid export: the document plus per-item accounting.
#[derive(Debug)]
pub struct GridExport {
    pub pdf: Vec<u8>,
    /// Rows actually placed on the document.
    pub rendered: usize,
    /// Ids of the pairs skipped because their images were unusable.
    pub skipped: Vec<i64>,
}

/// Placement of one grid row as computed by the pagination planner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowSlot {
    pub page: usize,
    /// Bottom edge of the row's card images, from the page bottom.
    pub y_mm: f64,
}

/// Pure pagination planner mirroring the export cursor rule: start below
/// the top margin, advance by card height + row gap + caption allowance
/// per row, and open a new page whenever the cursor falls below the
/// bottom margin.
pub fn plan_rows(count: usize, page: &PageGeometry) -> Vec<RowSlot> {
    let top = page.page_height_mm - page.margin_y_mm - page.card_height_mm;
    let mut slots = Vec::with_capacity(count);
    let mut page_index = 0;
    let mut cursor = top;
    for _ in 0..count {
        slots.push(RowSlot {
            page: page_index,
            y_mm: cursor,
        });
        cursor -= page.row_advance_mm();
        if cursor < page.margin_y_mm {
            page_index += 1;
            cursor = top;
        }
    }
    slots
}

/// Rows that fit on one page under the planner's cursor rule.
pub fn rows_per_page(page: &PageGeometry) -> usize {
    let travel = page.page_height_mm - 2.0 * page.margin_y_mm - page.card_height_mm;
    1 + (travel / page.row_advance_mm()).floor() as usize
}

/// File name for a batch export generated on `date`.
pub fn grid_pdf_filename(date: NaiveDate) -> String {
    format!("toutes_les_cartes_{}.pdf", date.format("%Y-%m-%d"))
}

/// Builds the single-card sheet: a header naming the member, then the
/// front and back faces side by side at the fixed print width with
/// Recto/Verso captions. Same inputs always yield the same layout.
pub fn single_card_pdf(
    front: &RgbImage,
    back: &RgbImage,
    member: &Member,
    page: &PageGeometry,
) -> Result<Vec<u8>, CardError> {
    let mut doc = configure_document(PaperSize::Letter, "Carte de membre")?;
    let mut temp_files = Vec::new();

    doc.push(Paragraph::new(format!(
        "Carte générée pour: {}",
        member.full_name()
    )));
    doc.push(Paragraph::new(format!(
        "Département: {}",
        member.department
    )));
    doc.push(Break::new(2));

    let mut table = TableLayout::new(vec![1, 1]);
    let mut row = table.row();
    for (raster, label) in [(front, "Recto"), (back, "Verso")] {
        let mut image = embed_card_image(raster, page.single_card_width_mm, &mut temp_files)?;
        image.set_alignment(Alignment::Center);
        let mut cell = LinearLayout::vertical();
        cell.push(image);
        cell.push(
            Paragraph::new(label)
                .aligned(Alignment::Center)
                .styled(Style::new().with_font_size(CAPTION_FONT_SIZE)),
        );
        row = row.element(cell);
    }
    row.push()?;
    doc.push(table);

    let mut buffer = Vec::new();
    doc.render(&mut buffer)?;
    Ok(buffer)
}

/// Lays out many card pairs (front left, back right) top-to-bottom on A4
/// pages at physical card size, one caption line per row. Pairs whose
/// images are missing or unreadable are skipped and reported; an export
/// that filters down to nothing fails with `EmptyResultSet` before any
/// document work happens.
pub fn grid_pdf(pairs: &[CardPair], page: &PageGeometry) -> Result<GridExport, CardError> {
    let mut temp_files = Vec::new();
    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for pair in pairs {
        match embed_pair(pair, page, &mut temp_files) {
            Ok(images) => rows.push((pair, images)),
            Err(e) => {
                warn!("card #{} skipped from export: {}", pair.id, e);
                skipped.push(pair.id);
            }
        }
    }

    if rows.is_empty() {
        return Err(CardError::EmptyResultSet);
    }

    let mut doc = configure_document(PaperSize::A4, "Toutes les cartes")?;
    let slots = plan_rows(rows.len(), page);

    for (index, (pair, (front, back))) in rows.into_iter().enumerate() {
        if index > 0 && slots[index].page != slots[index - 1].page {
            doc.push(PageBreak::new());
        }

        let mut table = TableLayout::new(vec![1, 1]);
        table.row().element(front).element(back).push()?;

        let mut block = LinearLayout::vertical();
        block.push(table);
        block.push(
            Paragraph::new(format!("{} (#{})", pair.member_name, pair.id))
                .styled(Style::new().with_font_size(CAPTION_FONT_SIZE)),
        );
        doc.push(block.padded(Margins::trbl(0.0, 0.0, page.gap_y_mm, 0.0)));
    }

    let rendered = slots.len();
    let mut buffer = Vec::new();
    doc.render(&mut buffer)?;
    Ok(GridExport {
        pdf: buffer,
        rendered,
        skipped,
    })
}

fn configure_document(paper: PaperSize, title: &str) -> Result<Document, CardError> {
    let family = fonts::pdf_font_family()?;
    let mut doc = Document::new(family);
    doc.set_title(title);
    doc.set_paper_size(paper);
    doc.set_font_size(HEADER_FONT_SIZE);

    // 10 mm decorator margins: smaller than the planner's vertical
    // margin, so the planner is always the binding page-break rule.
    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);
    Ok(doc)
}

/// Loads both faces of a stored pair and wraps them as grid-sized PDF
/// images. Any failure skips the whole pair, not half of it.
fn embed_pair(
    pair: &CardPair,
    page: &PageGeometry,
    temp_files: &mut Vec<NamedTempFile>,
) -> Result<(PdfImage, PdfImage), CardError> {
    let front = image::open(&pair.front_path)?.to_rgb8();
    let back = image::open(&pair.back_path)?.to_rgb8();
    let front = embed_card_image(&front, page.card_width_mm, temp_files)?;
    let back = embed_card_image(&back, page.card_width_mm, temp_files)?;
    Ok((front, back))
}

/// Writes an RGB raster to a temporary PNG and wraps it in a PDF image
/// element whose DPI fixes its printed width to `width_mm`. The temp
/// file must outlive rendering; callers park it in their scope-local
/// vector.
fn embed_card_image(
    raster: &RgbImage,
    width_mm: f64,
    temp_files: &mut Vec<NamedTempFile>,
) -> Result<PdfImage, CardError> {
    let (w, h) = raster.dimensions();
    let mut tmp = NamedTempFile::new()?;
    {
        let file = tmp.as_file_mut();
        let mut encoder = PngEncoder::new(file, w, h);
        encoder.set_color(PngColorType::Rgb);
        encoder.set_depth(PngBitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(raster.as_raw())?;
    }

    let mut element = PdfImage::from_path(tmp.path())?;
    element.set_dpi(f64::from(w) / (width_mm / MM_PER_INCH));
    temp_files.push(tmp);
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose;
    use crate::geometry::CardGeometry;
    use crate::qr;
    use proptest::prelude::*;
    use std::path::{Path, PathBuf};

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

    fn fonts_available() -> bool {
        fonts::pdf_font_family().is_ok()
    }

    fn pair(id: i64, dir: &Path, with_files: bool) -> CardPair {
        let front_path = dir.join(format!("{id}_recto.png"));
        let back_path = dir.join(format!("{id}_verso.png"));
        if with_files {
            let face = RgbImage::from_pixel(101, 64, image::Rgb([80, 80, 80]));
            face.save(&front_path).unwrap();
            face.save(&back_path).unwrap();
        }
        CardPair {
            id,
            member_name: format!("Member {id}"),
            front_path,
            back_path,
        }
    }

    #[test]
    fn default_geometry_fits_four_rows_per_page() {
        assert_eq!(rows_per_page(&PageGeometry::default()), 4);
    }

    #[test]
    fn planner_mirrors_the_cursor_rule() {
        let page = PageGeometry::default();
        let slots = plan_rows(9, &page);

        // First row sits below the top margin.
        assert_eq!(slots[0].page, 0);
        assert!((slots[0].y_mm - 228.0).abs() < 1e-9);
        // Fifth row opens the second page with the cursor reset.
        assert_eq!(slots[4].page, 1);
        assert!((slots[4].y_mm - slots[0].y_mm).abs() < 1e-9);
        // Nine rows at four per page need three pages.
        assert_eq!(slots.last().unwrap().page, 2);
        // No row ever drops below the bottom margin.
        assert!(slots.iter().all(|s| s.y_mm >= page.margin_y_mm));
    }

    proptest! {
        #[test]
        fn page_count_is_ceil_of_rows_over_capacity(n in 1usize..200) {
            let page = PageGeometry::default();
            let slots = plan_rows(n, &page);
            let capacity = rows_per_page(&page);
            let pages = slots.last().unwrap().page + 1;
            prop_assert_eq!(pages, n.div_ceil(capacity));
        }
    }

    #[test]
    fn export_filename_embeds_the_generation_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(grid_pdf_filename(date), "toutes_les_cartes_2024-03-07.pdf");
    }

    #[test]
    fn empty_export_fails_with_empty_result_set() {
        let page = PageGeometry::default();
        assert!(matches!(
            grid_pdf(&[], &page),
            Err(CardError::EmptyResultSet)
        ));
    }

    #[test]
    fn export_of_only_broken_pairs_fails_with_empty_result_set() {
        let pairs = vec![CardPair {
            id: 7,
            member_name: "Ghost".to_string(),
            front_path: PathBuf::from("missing_recto.png"),
            back_path: PathBuf::from("missing_verso.png"),
        }];
        assert!(matches!(
            grid_pdf(&pairs, &PageGeometry::default()),
            Err(CardError::EmptyResultSet)
        ));
    }

    #[test]
    fn grid_skips_broken_pairs_and_keeps_the_rest() {
        let _ = env_logger::builder().is_test(true).try_init();
        if !fonts_available() {
            // The PDF builders need the ./fonts runtime asset.
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let pairs = vec![
            pair(1, dir.path(), true),
            pair(2, dir.path(), false),
            pair(3, dir.path(), true),
        ];

        let export = grid_pdf(&pairs, &PageGeometry::default()).unwrap();
        assert_eq!(export.rendered, 2);
        assert_eq!(export.skipped, vec![2]);
        assert!(!export.pdf.is_empty());
    }

    #[test]
    fn single_card_sheet_renders_for_default_faces() {
        if !fonts_available() {
            return;
        }

        let geometry = CardGeometry::default();
        let qr_img = qr::encode(&member(), None, &geometry).unwrap();
        let front = compose::render_front(&member(), None, &qr_img, &geometry);
        let back = compose::render_back(None, &geometry);

        let pdf = single_card_pdf(&front, &back, &member(), &PageGeometry::default()).unwrap();
        assert!(!pdf.is_empty());
    }
}
