//! Document layout engine
//!
//! Computes every band and text line of the exported page before anything is
//! drawn, so the PDF writer and the raster preview render the exact same
//! geometry. Vertical positions come from format-specific constants and a
//! single running cursor; text is never measured, which keeps the height of
//! a section independent of what the user typed.

use crate::domain::core::{Rect, Rgb};
use crate::domain::plan::{EntryKind, EntryRef, PlanSection, SafetyPlan};
use crate::domain::template::{
    DOCUMENT_TITLE, EntryFormat, FOOTER_NOTICE, HOTLINE_LINE, SectionTemplate, TEMPLATES,
};

/// Layout errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("{section:?} is rendered as {format:?} but holds {kind:?} entries")]
    FormatMismatch {
        section: PlanSection,
        format: EntryFormat,
        kind: EntryKind,
    },
}

/// Page size in millimetres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    pub width: f32,
    pub height: f32,
}

impl PageMetrics {
    pub const A4: PageMetrics = PageMetrics {
        width: 210.0,
        height: 297.0,
    };
}

impl Default for PageMetrics {
    fn default() -> Self {
        Self::A4
    }
}

/// Fixed offsets and font sizes used by the layout
///
/// Offsets are millimetres relative to the start of the current section
/// unless noted otherwise; font sizes are points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    /// Cursor value of the first section
    pub top_margin: f32,
    pub band_x: f32,
    /// Total horizontal inset of the band (left + right)
    pub band_inset: f32,
    pub band_height: f32,
    pub band_title_x: f32,
    pub band_title_offset: f32,
    pub text_x: f32,
    pub description_offset: f32,
    pub entry_block_offset: f32,
    /// Cursor advance after a one-line entry
    pub simple_increment: f32,
    /// Cursor advance after a two-line entry or the hotline
    pub paired_increment: f32,
    pub second_line_offset: f32,
    pub hotline_offset: f32,
    pub section_gap: f32,
    /// Absolute baseline of the document title
    pub title_baseline: f32,
    /// Distance of the footer baseline from the bottom edge
    pub footer_bottom_offset: f32,

    pub title_size: f32,
    pub band_title_size: f32,
    pub description_size: f32,
    pub entry_size: f32,
    pub footer_size: f32,
}

impl LayoutMetrics {
    pub const STANDARD: LayoutMetrics = LayoutMetrics {
        top_margin: 35.0,
        band_x: 14.0,
        band_inset: 28.0,
        band_height: 8.0,
        band_title_x: 16.0,
        band_title_offset: 6.0,
        text_x: 20.0,
        description_offset: 16.0,
        entry_block_offset: 24.0,
        simple_increment: 8.0,
        paired_increment: 12.0,
        second_line_offset: 5.0,
        hotline_offset: 5.0,
        section_gap: 8.0,
        title_baseline: 25.0,
        footer_bottom_offset: 10.0,
        title_size: 28.0,
        band_title_size: 14.0,
        description_size: 11.0,
        entry_size: 12.0,
        footer_size: 10.0,
    };

    /// Cursor advance for one entry of the given format
    pub fn entry_increment(&self, format: EntryFormat) -> f32 {
        match format {
            EntryFormat::Simple => self.simple_increment,
            EntryFormat::Contact | EntryFormat::Professional => self.paired_increment,
        }
    }

    /// Total cursor advance of a section, in closed form
    pub fn section_advance(&self, template: &SectionTemplate, entry_count: usize) -> f32 {
        let hotline = if template.hotline_footer {
            self.paired_increment
        } else {
            0.0
        };
        self.entry_block_offset
            + entry_count as f32 * self.entry_increment(template.format)
            + hotline
            + self.section_gap
    }
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Horizontal anchoring of a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    /// `x` is the left edge
    Left,
    /// `x` is the horizontal center
    Center,
}

/// One line of text; `y` is the baseline
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Rgb,
    pub anchor: TextAnchor,
}

/// Single drawing instruction in page millimetres
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Band { rect: Rect, color: Rgb },
    Text(TextRun),
}

/// Draw instructions for one section
#[derive(Debug, Clone, PartialEq)]
pub struct SectionLayout {
    pub section: PlanSection,
    pub ops: Vec<DrawOp>,
    /// Cursor value this section started at
    pub start_y: f32,
    /// Cursor value handed to the next section
    pub next_y: f32,
}

impl SectionLayout {
    /// Text lines of this section in draw order
    pub fn lines(&self) -> Vec<&str> {
        text_lines(&self.ops)
    }
}

/// Lays out one section starting at cursor `y`
///
/// Pure function of its inputs: the result depends only on the template, the
/// number of entries and `y`, plus the entry text for the drawn strings.
pub fn layout_section(
    template: &SectionTemplate,
    entries: &[EntryRef<'_>],
    y: f32,
    page: &PageMetrics,
    metrics: &LayoutMetrics,
) -> Result<SectionLayout, LayoutError> {
    let mut ops = Vec::with_capacity(2 + entries.len() * 2 + 1);

    ops.push(DrawOp::Band {
        rect: Rect::new(
            metrics.band_x,
            y,
            page.width - metrics.band_inset,
            metrics.band_height,
        ),
        color: Rgb::BRAND_BLUE,
    });
    ops.push(text(
        template.title,
        metrics.band_title_x,
        y + metrics.band_title_offset,
        metrics.band_title_size,
        Rgb::WHITE,
    ));
    ops.push(text(
        template.description,
        metrics.text_x,
        y + metrics.description_offset,
        metrics.description_size,
        Rgb::DESCRIPTION_GRAY,
    ));

    let mut cursor = y + metrics.entry_block_offset;
    for (index, entry) in entries.iter().enumerate() {
        let kind = entry.kind();
        if kind != template.format.entry_kind() {
            return Err(LayoutError::FormatMismatch {
                section: template.section,
                format: template.format,
                kind,
            });
        }

        let ordinal = index + 1;
        match (template.format.secondary_label(), entry.secondary()) {
            (Some(label), Some(secondary)) => {
                ops.push(entry_text(
                    format!("{ordinal}. Name: {}", entry.primary()),
                    cursor,
                    metrics,
                ));
                ops.push(entry_text(
                    format!("   {label}: {secondary}"),
                    cursor + metrics.second_line_offset,
                    metrics,
                ));
            }
            _ => {
                ops.push(entry_text(
                    format!("{ordinal}. {}", entry.primary()),
                    cursor,
                    metrics,
                ));
            }
        }
        cursor += metrics.entry_increment(template.format);
    }

    if template.hotline_footer {
        ops.push(entry_text(
            HOTLINE_LINE.to_string(),
            cursor + metrics.hotline_offset,
            metrics,
        ));
        cursor += metrics.paired_increment;
    }

    Ok(SectionLayout {
        section: template.section,
        ops,
        start_y: y,
        next_y: cursor + metrics.section_gap,
    })
}

/// Complete single-page layout of a safety plan
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub page: PageMetrics,
    pub metrics: LayoutMetrics,
    /// Document title drawn above the first section
    pub heading: DrawOp,
    pub sections: Vec<SectionLayout>,
    /// Notice drawn at a fixed distance from the bottom edge
    pub footer: DrawOp,
    /// Cursor value after the last section
    pub final_y: f32,
}

impl DocumentLayout {
    /// Lays out a plan with the standard A4 page and metrics
    pub fn build(plan: &SafetyPlan) -> Result<Self, LayoutError> {
        Self::build_with(plan, PageMetrics::A4, LayoutMetrics::STANDARD)
    }

    /// Lays out a plan by folding the section templates over the cursor
    pub fn build_with(
        plan: &SafetyPlan,
        page: PageMetrics,
        metrics: LayoutMetrics,
    ) -> Result<Self, LayoutError> {
        let (sections, final_y) = TEMPLATES.iter().try_fold(
            (Vec::with_capacity(TEMPLATES.len()), metrics.top_margin),
            |(mut sections, y), template| {
                let entries = plan.entries(template.section);
                let section = layout_section(template, &entries, y, &page, &metrics)?;
                let next_y = section.next_y;
                sections.push(section);
                Ok::<_, LayoutError>((sections, next_y))
            },
        )?;

        let heading = DrawOp::Text(TextRun {
            text: DOCUMENT_TITLE.to_string(),
            x: page.width / 2.0,
            y: metrics.title_baseline,
            size: metrics.title_size,
            color: Rgb::BRAND_BLUE,
            anchor: TextAnchor::Center,
        });
        let footer = DrawOp::Text(TextRun {
            text: FOOTER_NOTICE.to_string(),
            x: page.width / 2.0,
            y: page.height - metrics.footer_bottom_offset,
            size: metrics.footer_size,
            color: Rgb::FOOTER_GRAY,
            anchor: TextAnchor::Center,
        });

        Ok(Self {
            page,
            metrics,
            heading,
            sections,
            footer,
            final_y,
        })
    }

    /// All draw instructions in paint order
    pub fn ops(&self) -> impl Iterator<Item = &DrawOp> {
        std::iter::once(&self.heading)
            .chain(self.sections.iter().flat_map(|s| s.ops.iter()))
            .chain(std::iter::once(&self.footer))
    }

    /// All text lines in paint order
    pub fn lines(&self) -> Vec<&str> {
        text_lines(self.ops())
    }

    /// Layout of one section
    pub fn section(&self, section: PlanSection) -> Option<&SectionLayout> {
        self.sections.iter().find(|s| s.section == section)
    }

    /// Text lines of one section in paint order
    pub fn section_lines(&self, section: PlanSection) -> Vec<&str> {
        self.section(section).map(SectionLayout::lines).unwrap_or_default()
    }

    /// True when section content reaches into the footer notice
    ///
    /// Content past the page is not reflowed; callers may only warn.
    pub fn overflows(&self) -> bool {
        let footer_top = self.page.height
            - self.metrics.footer_bottom_offset
            - self.metrics.footer_size * POINT_TO_MM;
        self.content_bottom() > footer_top
    }

    /// Lowest point reached by any section band or text baseline
    pub fn content_bottom(&self) -> f32 {
        self.sections
            .iter()
            .flat_map(|s| s.ops.iter())
            .map(|op| match op {
                DrawOp::Band { rect, .. } => rect.bottom(),
                DrawOp::Text(run) => run.y,
            })
            .fold(self.metrics.top_margin, f32::max)
    }
}

/// Millimetres per typographic point
pub const POINT_TO_MM: f32 = 25.4 / 72.0;

fn text(content: &str, x: f32, y: f32, size: f32, color: Rgb) -> DrawOp {
    DrawOp::Text(TextRun {
        text: content.to_string(),
        x,
        y,
        size,
        color,
        anchor: TextAnchor::Left,
    })
}

fn entry_text(content: String, y: f32, metrics: &LayoutMetrics) -> DrawOp {
    DrawOp::Text(TextRun {
        text: content,
        x: metrics.text_x,
        y,
        size: metrics.entry_size,
        color: Rgb::BLACK,
        anchor: TextAnchor::Left,
    })
}

fn text_lines<'a>(ops: impl IntoIterator<Item = &'a DrawOp>) -> Vec<&'a str> {
    ops.into_iter()
        .filter_map(|op| match op {
            DrawOp::Text(run) => Some(run.text.as_str()),
            DrawOp::Band { .. } => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::{ContactField, ProfessionalField, SimpleEntry};
    use crate::domain::template::template_for;
    use approx::assert_relative_eq;

    fn sample_plan() -> SafetyPlan {
        let mut plan = SafetyPlan::new();
        plan.warning_steps = vec![SimpleEntry {
            id: "1".into(),
            value: "Feeling hopeless".into(),
        }];
        plan.coping_strategies.truncate(1);
        plan.social_settings.truncate(1);
        plan.support_contacts.truncate(1);
        plan.safety_measures.truncate(1);
        plan.set_contact_field(0, ContactField::Name, "Jane").unwrap();
        plan.set_contact_field(0, ContactField::Contact, "555-1234")
            .unwrap();
        plan.set_professional_field(0, ProfessionalField::Name, "Jane")
            .unwrap();
        plan.set_professional_field(0, ProfessionalField::Phone, "555-5678")
            .unwrap();
        plan
    }

    fn closed_form_final_y(plan: &SafetyPlan, metrics: &LayoutMetrics) -> f32 {
        metrics.top_margin
            + TEMPLATES
                .iter()
                .map(|t| metrics.section_advance(t, plan.entry_count(t.section)))
                .sum::<f32>()
    }

    #[test]
    fn renders_expected_lines() {
        let layout = DocumentLayout::build(&sample_plan()).unwrap();

        let warning = layout.section_lines(PlanSection::WarningSigns);
        assert_eq!(warning[0], "STEP 1: WARNING SIGNS");
        assert!(warning.contains(&"1. Feeling hopeless"));

        let contacts = layout.section_lines(PlanSection::SupportContacts);
        let name_at = contacts.iter().position(|l| *l == "1. Name: Jane").unwrap();
        assert_eq!(contacts[name_at + 1], "   Contact: 555-1234");

        let professionals = layout.section_lines(PlanSection::Professionals);
        assert!(professionals.contains(&"   Phone: 555-5678"));
    }

    #[test]
    fn final_cursor_matches_closed_form() {
        let metrics = LayoutMetrics::STANDARD;
        for plan in [SafetyPlan::new(), sample_plan()] {
            let layout = DocumentLayout::build(&plan).unwrap();
            assert_relative_eq!(layout.final_y, closed_form_final_y(&plan, &metrics));
        }

        // seeded plan: 35 + (24+24+8) + (24+24+8) + (24+16+8) + (24+24+8) + (24+12+12+8) + (24+16+8)
        let layout = DocumentLayout::build(&SafetyPlan::new()).unwrap();
        assert_relative_eq!(layout.final_y, 355.0);
    }

    #[test]
    fn text_length_never_changes_layout_height() {
        let short = SafetyPlan::new();
        let mut long = SafetyPlan::new();
        long.set_text(PlanSection::WarningSigns, 0, "x".repeat(500))
            .unwrap();
        long.set_professional_field(0, ProfessionalField::Name, "y".repeat(300))
            .unwrap();

        let a = DocumentLayout::build(&short).unwrap();
        let b = DocumentLayout::build(&long).unwrap();
        assert_eq!(a.final_y, b.final_y);
        for (sa, sb) in a.sections.iter().zip(&b.sections) {
            assert_eq!(sa.start_y, sb.start_y);
            assert_eq!(sa.next_y, sb.next_y);
        }
    }

    #[test]
    fn sections_chain_their_cursors() {
        let layout = DocumentLayout::build(&SafetyPlan::new()).unwrap();
        assert_eq!(layout.sections[0].start_y, LayoutMetrics::STANDARD.top_margin);
        for pair in layout.sections.windows(2) {
            assert_eq!(pair[0].next_y, pair[1].start_y);
        }
        assert_eq!(layout.sections.last().unwrap().next_y, layout.final_y);
    }

    #[test]
    fn ordinals_ignore_entry_ids() {
        let mut plan = SafetyPlan::new();
        plan.warning_steps[0].id = "7".into();
        plan.warning_steps[1].id = "a".into();
        plan.warning_steps[2].id = "7".into();
        plan.set_text(PlanSection::WarningSigns, 2, "Third").unwrap();

        let layout = DocumentLayout::build(&plan).unwrap();
        let lines = layout.section_lines(PlanSection::WarningSigns);
        assert_eq!(&lines[2..], &["1. ", "2. ", "3. Third"]);
    }

    #[test]
    fn empty_entries_still_render_numbered_lines() {
        let layout = DocumentLayout::build(&SafetyPlan::new()).unwrap();
        let lines = layout.section_lines(PlanSection::SocialSettings);
        assert_eq!(&lines[2..], &["1. ", "2. "]);

        let contacts = layout.section_lines(PlanSection::SupportContacts);
        assert_eq!(
            &contacts[2..],
            &["1. Name: ", "   Contact: ", "2. Name: ", "   Contact: "]
        );
    }

    #[test]
    fn hotline_appears_once_after_last_professional() {
        let layout = DocumentLayout::build(&sample_plan()).unwrap();
        let all = layout.lines();
        assert_eq!(all.iter().filter(|l| **l == HOTLINE_LINE).count(), 1);

        let professionals = layout.section_lines(PlanSection::Professionals);
        assert_eq!(professionals.last(), Some(&HOTLINE_LINE));
    }

    #[test]
    fn section_geometry_uses_fixed_offsets() {
        let page = PageMetrics::A4;
        let metrics = LayoutMetrics::STANDARD;
        let plan = SafetyPlan::new();
        let template = template_for(PlanSection::Professionals);
        let section =
            layout_section(template, &plan.entries(template.section), 100.0, &page, &metrics)
                .unwrap();

        assert_eq!(
            section.ops[0],
            DrawOp::Band {
                rect: Rect::new(14.0, 100.0, 182.0, 8.0),
                color: Rgb::BRAND_BLUE,
            }
        );
        let baselines: Vec<f32> = section
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(run) => Some(run.y),
                DrawOp::Band { .. } => None,
            })
            .collect();
        // title, description, name, phone, hotline
        assert_eq!(baselines, vec![106.0, 116.0, 124.0, 129.0, 141.0]);
        assert_eq!(section.next_y, 156.0);
    }

    #[test]
    fn mismatched_template_is_rejected() {
        let page = PageMetrics::A4;
        let metrics = LayoutMetrics::STANDARD;
        let plan = SafetyPlan::new();
        let template = template_for(PlanSection::SupportContacts);
        let simple_entries = plan.entries(PlanSection::WarningSigns);

        let err = layout_section(template, &simple_entries, 35.0, &page, &metrics).unwrap_err();
        assert_eq!(
            err,
            LayoutError::FormatMismatch {
                section: PlanSection::SupportContacts,
                format: EntryFormat::Contact,
                kind: EntryKind::Simple,
            }
        );
    }

    #[test]
    fn heading_and_footer_are_fixed() {
        let layout = DocumentLayout::build(&sample_plan()).unwrap();
        let lines = layout.lines();
        assert_eq!(lines.first(), Some(&DOCUMENT_TITLE));
        assert_eq!(lines.last(), Some(&FOOTER_NOTICE));

        let mut expected = vec![DOCUMENT_TITLE];
        for section in PlanSection::ALL {
            expected.extend(layout.section_lines(section));
        }
        expected.push(FOOTER_NOTICE);
        assert_eq!(lines, expected);

        match &layout.footer {
            DrawOp::Text(run) => {
                assert_eq!(run.y, 287.0);
                assert_eq!(run.anchor, TextAnchor::Center);
            }
            DrawOp::Band { .. } => panic!("footer should be text"),
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let plan = sample_plan();
        assert_eq!(
            DocumentLayout::build(&plan).unwrap(),
            DocumentLayout::build(&plan).unwrap()
        );
    }

    #[test]
    fn overflow_is_reported_not_fixed() {
        // one entry per section: last entry baseline at 279mm, footer at 287mm
        let compact = DocumentLayout::build(&sample_plan()).unwrap();
        assert_relative_eq!(compact.content_bottom(), 279.0);
        assert!(!compact.overflows());

        // seeded plan: the last section starts at 307mm, below the page

        let seeded = DocumentLayout::build(&SafetyPlan::new()).unwrap();
        assert!(seeded.overflows());
    }
}
