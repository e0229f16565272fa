//! Built-in templates, selectable by name.
//!
//! | Name | Paper | Photos | Dither |
//! |------|-------|--------|--------|
//! | Strip 58 – Classic | 58mm | 3 | Atkinson |
//! | Strip 58 – Compact QR | 58mm | 3 | Atkinson |
//! | Grid 80 – 2x2 | 80mm | 3 + logo | Atkinson |
//! | Poster 80 – XL Single | 80mm | 1 | Floyd–Steinberg |
//! | Polaroid 80 – Caption | 80mm | 1 | Atkinson |
//! | Strip 1024 – Review | 80mm | 3 | Floyd–Steinberg |
//!
//! The review strip is a large on-screen/download composite; it is printed
//! through `prepare_for_print`, which scales it to the printer's dot width.

use std::sync::LazyLock;

use super::template::{
    Canvas, CanvasHeight, Caption, FontFamily, Footer, Margins, QrSpec, Region, Slot, Template,
    TextBlock,
};
use crate::printer::PaperSize;
use crate::render::dither::DitherMethod;
use crate::render::font::Align;

static TEMPLATES: LazyLock<Vec<Template>> = LazyLock::new(|| {
    vec![
        strip_classic(),
        strip_compact(),
        grid_2x2(),
        poster_single(),
        polaroid_caption(),
        review_strip(),
    ]
});

/// All built-in templates, in display order.
pub fn list() -> &'static [Template] {
    &TEMPLATES
}

/// Exact-name lookup.
pub fn by_name(name: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.name == name)
}

/// Templates for one paper width.
pub fn by_paper(paper: PaperSize) -> Vec<&'static Template> {
    TEMPLATES.iter().filter(|t| t.paper == paper).collect()
}

/// The template used when nothing is configured.
pub fn default_template() -> &'static Template {
    &TEMPLATES[0]
}

fn qr_footer(qr_size: u32, qr_align: Align, code_size: u32, code_align: Align) -> Footer {
    Footer {
        qr: Some(QrSpec {
            size: qr_size,
            data: "{{download_url}}".to_string(),
            align: qr_align,
        }),
        code: Some(TextBlock::new("{{code}}", code_size, code_align)),
    }
}

fn booth_header() -> TextBlock {
    TextBlock::new("{{booth_name}}", 16, Align::Center)
}

fn strip_classic() -> Template {
    Template {
        name: "Strip 58 – Classic".to_string(),
        paper: PaperSize::Mm58,
        canvas: Canvas {
            width: 384,
            height: CanvasHeight::Auto,
        },
        margins: Margins::uniform(16),
        dither: DitherMethod::Atkinson,
        header: Some(booth_header()),
        slots: vec![
            Slot::new(24, 56, 336, 336),
            Slot::new(24, 416, 336, 336),
            Slot::new(24, 776, 336, 336),
        ],
        logo: None,
        caption: None,
        footer: Some(qr_footer(256, Align::Center, 18, Align::Center)),
        frame_border: None,
    }
}

fn strip_compact() -> Template {
    Template {
        name: "Strip 58 – Compact QR".to_string(),
        paper: PaperSize::Mm58,
        canvas: Canvas {
            width: 384,
            height: CanvasHeight::Auto,
        },
        margins: Margins::uniform(16),
        dither: DitherMethod::Atkinson,
        header: Some(booth_header()),
        slots: vec![
            Slot::new(24, 56, 336, 300),
            Slot::new(24, 372, 336, 300),
            Slot::new(24, 688, 336, 300),
        ],
        logo: None,
        caption: None,
        footer: Some(qr_footer(192, Align::Center, 16, Align::Center)),
        frame_border: None,
    }
}

fn grid_2x2() -> Template {
    Template {
        name: "Grid 80 – 2x2".to_string(),
        paper: PaperSize::Mm80,
        canvas: Canvas {
            width: 576,
            height: CanvasHeight::Auto,
        },
        margins: Margins::uniform(24),
        dither: DitherMethod::Atkinson,
        header: None,
        slots: vec![
            Slot::new(24, 24, 264, 264),
            Slot::new(288, 24, 264, 264),
            Slot::new(24, 288, 264, 264),
        ],
        logo: Some(Region {
            x: 288,
            y: 288,
            width: 264,
            height: 264,
        }),
        caption: None,
        footer: Some(qr_footer(256, Align::Center, 18, Align::Center)),
        frame_border: None,
    }
}

fn poster_single() -> Template {
    Template {
        name: "Poster 80 – XL Single".to_string(),
        paper: PaperSize::Mm80,
        canvas: Canvas {
            width: 576,
            height: CanvasHeight::Auto,
        },
        margins: Margins::uniform(24),
        dither: DitherMethod::FloydSteinberg,
        header: None,
        slots: vec![Slot::new(24, 24, 528, 640)],
        logo: None,
        caption: None,
        footer: Some(qr_footer(256, Align::Center, 18, Align::Center)),
        frame_border: None,
    }
}

fn polaroid_caption() -> Template {
    Template {
        name: "Polaroid 80 – Caption".to_string(),
        paper: PaperSize::Mm80,
        canvas: Canvas {
            width: 576,
            height: CanvasHeight::Auto,
        },
        margins: Margins::uniform(24),
        dither: DitherMethod::Atkinson,
        header: None,
        slots: vec![Slot::new(56, 56, 464, 464)],
        logo: None,
        caption: Some(Caption {
            text: "{{date}}".to_string(),
            x: 56,
            y: 536,
            width: 464,
            height: 80,
            font: FontFamily::Mono,
            size: 16,
            align: Align::Center,
        }),
        footer: Some(qr_footer(192, Align::Right, 16, Align::Left)),
        frame_border: Some(16),
    }
}

/// 24px margins, 976px square cells with 16px gaps, an 80px footer band.
fn review_strip() -> Template {
    let cell = 976;
    Template {
        name: "Strip 1024 – Review".to_string(),
        paper: PaperSize::Mm80,
        canvas: Canvas {
            width: 1024,
            height: CanvasHeight::Fixed(24 + cell * 3 + 16 * 2 + 80 + 24),
        },
        margins: Margins::uniform(24),
        dither: DitherMethod::FloydSteinberg,
        header: None,
        slots: (0..3)
            .map(|i| Slot::new(24, 24 + i * (cell + 16), cell, cell))
            .collect(),
        logo: None,
        caption: None,
        footer: Some(Footer {
            qr: None,
            code: Some(TextBlock::new("{{booth_name}} // {{date}}", 28, Align::Center)),
        }),
        frame_border: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_template_validates() {
        for t in list() {
            t.validate()
                .unwrap_or_else(|e| panic!("{} failed validation: {}", t.name, e));
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(list().len(), 6);
        let t = by_name("Strip 58 – Classic").unwrap();
        assert_eq!(t.photo_count(), 3);
        assert_eq!(t.resolve_height(), 1440);
        assert!(by_name("strip 58 – classic").is_none());
        assert!(by_name("Nope").is_none());
    }

    #[test]
    fn test_by_paper() {
        let narrow = by_paper(PaperSize::Mm58);
        assert_eq!(narrow.len(), 2);
        assert!(narrow.iter().all(|t| t.canvas.width == 384));
        assert_eq!(by_paper(PaperSize::Mm80).len(), 4);
    }

    #[test]
    fn test_review_strip_height() {
        let t = by_name("Strip 1024 – Review").unwrap();
        assert_eq!(t.resolve_height(), 3088);
        assert_eq!(t.slots[2].y, 2008);
    }

    #[test]
    fn test_polaroid_uses_frame_border() {
        let t = by_name("Polaroid 80 – Caption").unwrap();
        assert_eq!(t.border_for(&t.slots[0]).map(|b| b.width), Some(16));
    }

    #[test]
    fn test_default_is_classic_strip() {
        assert_eq!(default_template().name, "Strip 58 – Classic");
    }
}
