//! Plain text → PDF rendering.
//!
//! Fixed layout: US Letter, Helvetica 12pt, one source line per text line starting
//! at (50, 750). Lines are never wrapped and never flow onto a second page;
//! whatever does not fit is clipped by the page edge.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use thiserror::Error;

pub const PAGE_WIDTH_PT: f32 = 612.0;
pub const PAGE_HEIGHT_PT: f32 = 792.0;
pub const ORIGIN_X_PT: f32 = 50.0;
pub const ORIGIN_Y_PT: f32 = 750.0;
pub const FONT_SIZE_PT: f32 = 12.0;
/// 1.2 × font size.
pub const LEADING_PT: f32 = 14.4;

const FONT_RESOURCE: &str = "F1";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF rendering aborted: {0}")]
    Aborted(String),
}

/// Renders `text` onto a single page and returns the PDF bytes.
pub fn render_text_pdf(text: &str) -> Result<Vec<u8>, RenderError> {
    render_pages(&[text])
}

/// Runs [`render_text_pdf`] on the blocking pool.
pub async fn render_text_pdf_blocking(text: String) -> Result<Vec<u8>, RenderError> {
    tokio::task::spawn_blocking(move || render_text_pdf(&text))
        .await
        .map_err(|e| RenderError::Aborted(e.to_string()))?
}

/// Renders one page per entry of `pages`, each with the fixed layout.
pub(crate) fn render_pages(pages: &[&str]) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_RESOURCE => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page_text in pages {
        let content = page_content(page_text);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => media_box(),
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "MediaBox" => media_box(),
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

fn media_box() -> Vec<Object> {
    vec![
        Object::Integer(0),
        Object::Integer(0),
        PAGE_WIDTH_PT.into(),
        PAGE_HEIGHT_PT.into(),
    ]
}

fn page_content(text: &str) -> Content {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![FONT_RESOURCE.into(), FONT_SIZE_PT.into()]),
        Operation::new("TL", vec![LEADING_PT.into()]),
        Operation::new("Td", vec![ORIGIN_X_PT.into(), ORIGIN_Y_PT.into()]),
    ];
    for line in text.split('\n') {
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(line))],
        ));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

/// Encodes a line for a WinAnsiEncoding font. Unmappable characters become `?`.
fn encode_win_ansi(line: &str) -> Vec<u8> {
    line.chars()
        .filter(|c| *c != '\r')
        .map(|c| match c {
            '\t' => b' ',
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => b'?',
        })
        .collect()
}
