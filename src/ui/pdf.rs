//! Single-page PDF output
//!
//! Serializes a [`DocumentLayout`] with the built-in Helvetica font, so no
//! font file has to be embedded. The writer adds no timestamps or random
//! identifiers: identical layouts produce identical bytes.

use pdf_writer::{Content, Name, Pdf, Rect as PdfRect, Ref, Str, TextStr};

use crate::domain::template::DOCUMENT_TITLE;
use crate::ui::layout::{DocumentLayout, DrawOp, TextAnchor, TextRun};

/// Points per millimetre
pub const MM_TO_PT: f32 = 72.0 / 25.4;

const FONT_RESOURCE: &[u8] = b"F1";
const PRODUCER: &str = "safety-plan";

/// PDF output errors
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("Invalid page dimensions: {width}x{height}mm")]
    InvalidPageSize { width: f32, height: f32 },
}

/// Writes the layout as a one-page PDF document
pub fn render_pdf(layout: &DocumentLayout) -> Result<Vec<u8>, PdfError> {
    let page = layout.page;
    if !(page.width.is_finite() && page.height.is_finite())
        || page.width <= 0.0
        || page.height <= 0.0
    {
        return Err(PdfError::InvalidPageSize {
            width: page.width,
            height: page.height,
        });
    }

    let page_width = page.width * MM_TO_PT;
    let page_height = page.height * MM_TO_PT;

    let catalog_id = Ref::new(1);
    let pages_id = Ref::new(2);
    let page_id = Ref::new(3);
    let font_id = Ref::new(4);
    let content_id = Ref::new(5);
    let info_id = Ref::new(6);

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id).kids([page_id]).count(1);

    {
        let mut pdf_page = pdf.page(page_id);
        pdf_page
            .media_box(PdfRect::new(0.0, 0.0, page_width, page_height))
            .parent(pages_id)
            .contents(content_id);
        let mut resources = pdf_page.resources();
        resources.fonts().pair(Name(FONT_RESOURCE), font_id);
    }

    pdf.type1_font(font_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    pdf.document_info(info_id)
        .title(TextStr(DOCUMENT_TITLE))
        .producer(TextStr(PRODUCER));

    let mut content = Content::new();
    for op in layout.ops() {
        match op {
            DrawOp::Band { rect, color } => {
                let (r, g, b) = color.to_unit();
                content.save_state();
                content.set_fill_rgb(r, g, b);
                content.rect(
                    rect.x * MM_TO_PT,
                    page_height - rect.bottom() * MM_TO_PT,
                    rect.w * MM_TO_PT,
                    rect.h * MM_TO_PT,
                );
                content.fill_nonzero();
                content.restore_state();
            }
            DrawOp::Text(run) => write_text(&mut content, run, page_height),
        }
    }

    let data = content.finish();
    pdf.stream(content_id, &data);

    Ok(pdf.finish())
}

fn write_text(content: &mut Content, run: &TextRun, page_height: f32) {
    let bytes = encode_win_ansi(&run.text);
    let x = match run.anchor {
        TextAnchor::Left => run.x,
        TextAnchor::Center => run.x - helvetica_width_mm(&bytes, run.size) / 2.0,
    };
    let (r, g, b) = run.color.to_unit();

    content.save_state();
    content.set_fill_rgb(r, g, b);
    content
        .begin_text()
        .set_font(Name(FONT_RESOURCE), run.size)
        .next_line(x * MM_TO_PT, page_height - run.y * MM_TO_PT)
        .show(Str(&bytes))
        .end_text();
    content.restore_state();
}

/// Encodes text for the standard WinAnsi font encoding
///
/// Characters the encoding cannot represent become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\t' => b' ',
            ' '..='~' => ch as u8,
            '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            '\u{20ac}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            _ => b'?',
        })
        .collect()
}

/// Width of WinAnsi-encoded text set in Helvetica, in millimetres
pub fn helvetica_width_mm(bytes: &[u8], size_pt: f32) -> f32 {
    let units: u32 = bytes.iter().map(|b| helvetica_advance(*b) as u32).sum();
    units as f32 / 1000.0 * size_pt / MM_TO_PT
}

/// Standard Helvetica advance widths (1/1000 em) for printable ASCII
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

fn helvetica_advance(byte: u8) -> u16 {
    match byte {
        0x20..=0x7e => HELVETICA_ASCII[(byte - 0x20) as usize],
        0xa0 => 278,
        0xa9 => 737,
        0x97 => 1000,
        0x85 => 1000,
        _ => 556,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::{PlanSection, SafetyPlan};
    use crate::ui::layout::{LayoutMetrics, PageMetrics};

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn writes_a_pdf_document() {
        let mut plan = SafetyPlan::new();
        plan.set_text(PlanSection::WarningSigns, 0, "Feeling hopeless")
            .unwrap();
        let layout = DocumentLayout::build(&plan).unwrap();
        let bytes = render_pdf(&layout).unwrap();

        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, b"%%EOF"));
        assert!(contains(&bytes, b"/Helvetica"));
        assert!(contains(&bytes, b"/WinAnsiEncoding"));
        assert!(contains(&bytes, b"1. Feeling hopeless"));
        assert!(contains(&bytes, b"STEP 5: PROFESSIONALS I CAN CONTACT"));
    }

    #[test]
    fn output_is_byte_identical_across_runs() {
        let mut plan = SafetyPlan::new();
        plan.set_text(PlanSection::SafetyMeasures, 1, "Lock away medication")
            .unwrap();
        let layout = DocumentLayout::build(&plan).unwrap();

        let first = render_pdf(&layout).unwrap();
        let second = render_pdf(&DocumentLayout::build(&plan).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_degenerate_page() {
        let page = PageMetrics {
            width: 0.0,
            height: 297.0,
        };
        let layout =
            DocumentLayout::build_with(&SafetyPlan::new(), page, LayoutMetrics::STANDARD).unwrap();
        assert!(matches!(
            render_pdf(&layout),
            Err(PdfError::InvalidPageSize { .. })
        ));
    }

    #[test]
    fn win_ansi_encoding() {
        assert_eq!(encode_win_ansi("Jane"), b"Jane".to_vec());
        assert_eq!(encode_win_ansi("\u{a9} 2024"), vec![0xa9, b' ', b'2', b'0', b'2', b'4']);
        assert_eq!(encode_win_ansi("caf\u{e9}"), vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(encode_win_ansi("\u{2014}"), vec![0x97]);
        assert_eq!(encode_win_ansi("\u{4f60}"), b"?".to_vec());
    }

    #[test]
    fn helvetica_widths() {
        // "0" is 556 units: 0.556 * 10pt = 5.56pt
        let width = helvetica_width_mm(b"0", 10.0);
        assert!((width - 5.56 / MM_TO_PT).abs() < 1e-4);
        assert!(helvetica_width_mm(b"W", 12.0) > helvetica_width_mm(b"i", 12.0));
        assert_eq!(helvetica_width_mm(b"", 12.0), 0.0);
    }
}
