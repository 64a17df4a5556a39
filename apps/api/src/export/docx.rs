//! Word export. Assembles paragraphs and images from the letter's content
//! snapshot in the same order as the HTML template.

use std::io::Cursor;

use anyhow::anyhow;
use docx_rs::{AlignmentType, Docx, Paragraph, Pic, Run};

use crate::errors::AppError;
use crate::export::assets::{AssetStore, PngImage};
use crate::letters::content::{LetterContent, CLOSING_LINE, SIGN_OFF};

/// EMU per CSS pixel at 96 dpi.
const EMU_PER_PX: u32 = 9525;

const LOGO_SIZE_PX: (u32, u32) = (200, 100);
const SIGNATURE_SIZE_PX: (u32, u32) = (150, 75);
const SEAL_SIZE_PX: (u32, u32) = (80, 80);

/// Half-points, as docx expects.
const TITLE_SIZE: usize = 36;

/// Images referenced by the letter, already loaded and re-encoded.
#[derive(Debug, Default)]
pub struct LetterImages {
    pub logo: Option<PngImage>,
    pub signature: Option<PngImage>,
    pub seal: Option<PngImage>,
}

impl LetterImages {
    /// Loads every configured image. A configured image that cannot be read
    /// fails the export.
    pub async fn load(content: &LetterContent, assets: &AssetStore) -> Result<Self, AppError> {
        let company = &content.company;
        let load = |path: &Option<String>| {
            let path = path.clone();
            async move {
                match path {
                    Some(p) => assets.load_png(&p).await.map(Some),
                    None => Ok(None),
                }
            }
        };
        Ok(LetterImages {
            logo: load(&company.logo_path).await?,
            signature: load(&company.signature_path).await?,
            seal: load(&company.seal_path).await?,
        })
    }
}

/// Drops characters XML 1.0 cannot carry. Markup characters are escaped by
/// docx-rs when the text is written.
pub fn sanitize_text(input: &str) -> String {
    input
        .chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r')
                || ('\u{20}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || c >= '\u{10000}'
        })
        .collect()
}

fn text(value: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(sanitize_text(value)))
}

fn bold(value: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(sanitize_text(value)).bold())
}

fn spacer() -> Paragraph {
    Paragraph::new()
}

/// Largest size inside `max` with the image's aspect ratio, in pixels.
fn fit_within(image: &PngImage, (max_w, max_h): (u32, u32)) -> (u32, u32) {
    if image.width == 0 || image.height == 0 {
        return (max_w, max_h);
    }
    let scale = f64::min(
        f64::from(max_w) / f64::from(image.width),
        f64::from(max_h) / f64::from(image.height),
    );
    let scaled = |v: u32| ((f64::from(v) * scale).round() as u32).max(1);
    (scaled(image.width), scaled(image.height))
}

fn picture(image: &PngImage, max: (u32, u32)) -> Paragraph {
    let (width, height) = fit_within(image, max);
    let pic = Pic::new(&image.bytes).size(width * EMU_PER_PX, height * EMU_PER_PX);
    Paragraph::new().add_run(Run::new().add_image(pic))
}

/// Builds the `.docx` bytes for a letter.
pub fn build_letter_docx(content: &LetterContent, images: &LetterImages) -> Result<Vec<u8>, AppError> {
    let company = &content.company;
    let recipient = &content.recipient;

    let mut doc = Docx::new();
    if let Some(logo) = &images.logo {
        doc = doc.add_paragraph(picture(logo, LOGO_SIZE_PX).align(AlignmentType::Center));
    }
    doc = doc
        .add_paragraph(
            Paragraph::new()
                .add_run(
                    Run::new()
                        .add_text(sanitize_text(&company.name))
                        .bold()
                        .size(TITLE_SIZE),
                )
                .align(AlignmentType::Center),
        )
        .add_paragraph(text(&company.address).align(AlignmentType::Center))
        .add_paragraph(spacer())
        .add_paragraph(text(&format!("Date: {}", content.date_line())))
        .add_paragraph(text("To,"))
        .add_paragraph(text(&recipient.name))
        .add_paragraph(text(&recipient.department))
        .add_paragraph(spacer())
        .add_paragraph(bold(&format!("Subject: {}", content.subject)))
        .add_paragraph(spacer())
        .add_paragraph(text(&content.salutation()));

    for paragraph in content.body_paragraphs() {
        let mut run = Run::new();
        for (i, line) in paragraph.iter().enumerate() {
            if i > 0 {
                run = run.add_break(docx_rs::BreakType::TextWrapping);
            }
            run = run.add_text(sanitize_text(line));
        }
        doc = doc.add_paragraph(Paragraph::new().add_run(run));
    }

    doc = doc
        .add_paragraph(text(CLOSING_LINE))
        .add_paragraph(spacer())
        .add_paragraph(text(SIGN_OFF));
    if let Some(signature) = &images.signature {
        doc = doc.add_paragraph(picture(signature, SIGNATURE_SIZE_PX));
    }
    doc = doc
        .add_paragraph(bold(&company.founder_name))
        .add_paragraph(text(&content.founder_caption()));
    if let Some(seal) = &images.seal {
        doc = doc.add_paragraph(picture(seal, SEAL_SIZE_PX).align(AlignmentType::Right));
    }

    let mut buffer = Cursor::new(Vec::new());
    doc.build()
        .pack(&mut buffer)
        .map_err(|e| AppError::Internal(anyhow!("failed to pack docx: {e}")))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
pub(crate) fn document_xml(docx: &[u8]) -> String {
    use std::io::Read;

    let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::assets::write_test_png;
    use crate::letters::content::fixtures::{company, date, employee};

    fn content(subject: &str, reason: &str) -> LetterContent {
        LetterContent::new(&company(), &employee(), subject, reason, date())
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_text("ok\u{0}\u{1b}[31m\tfine"), "ok[31m\tfine");
    }

    #[test]
    fn test_fit_within_keeps_aspect_ratio() {
        let image = |width, height| PngImage {
            bytes: Vec::new(),
            width,
            height,
        };
        assert_eq!(fit_within(&image(20, 10), LOGO_SIZE_PX), (200, 100));
        assert_eq!(fit_within(&image(100, 100), LOGO_SIZE_PX), (100, 100));
        assert_eq!(fit_within(&image(600, 100), SIGNATURE_SIZE_PX), (150, 25));
        assert_eq!(fit_within(&image(0, 10), SEAL_SIZE_PX), SEAL_SIZE_PX);
    }

    #[test]
    fn test_edited_body_replaces_reason() {
        let mut letter = content("s", "original reason");
        letter.body = Some("Rewritten <i>by hand</i>".to_string());
        let xml = document_xml(&build_letter_docx(&letter, &LetterImages::default()).unwrap());
        assert!(xml.contains("Rewritten"));
        assert!(!xml.contains("original reason"));
        assert!(!xml.contains("<i>"));
    }

    #[test]
    fn test_docx_contains_letter_text_in_order() {
        let docx = build_letter_docx(
            &content("Outstanding Q3 delivery", "You shipped early."),
            &LetterImages::default(),
        )
        .unwrap();
        let xml = document_xml(&docx);

        let positions: Vec<usize> = [
            "Abhimo Technologies",
            "Date: October 4, 2026",
            "Jane Smith",
            "Quality Assurance",
            "Subject: Outstanding Q3 delivery",
            "Dear Jane Smith,",
            "You shipped early.",
            CLOSING_LINE,
            SIGN_OFF,
            "Rajesh Kumar",
            "Founder, Abhimo Technologies",
        ]
        .iter()
        .map(|needle| xml.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_docx_escapes_markup() {
        let docx = build_letter_docx(
            &content("<b>Bold</b> & more", "r"),
            &LetterImages::default(),
        )
        .unwrap();
        let xml = document_xml(&docx);
        assert!(!xml.contains("<b>"));
        assert!(xml.contains("Bold"));
        assert!(xml.contains("&amp;"));
    }

    #[tokio::test]
    async fn test_docx_embeds_configured_images() {
        let dir = tempfile::tempdir().unwrap();
        write_test_png(&dir.path().join("images/abhimo-logo.png"), 20, 10);
        write_test_png(&dir.path().join("images/founder-signature.png"), 15, 8);
        let assets = AssetStore::new(dir.path(), "http://localhost:3001");

        let letter = content("s", "r");
        let images = LetterImages::load(&letter, &assets).await.unwrap();
        assert!(images.logo.is_some());
        assert!(images.signature.is_some());
        assert!(images.seal.is_none());

        let docx = build_letter_docx(&letter, &images).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(docx.as_slice())).unwrap();
        let media = archive
            .file_names()
            .filter(|name| name.starts_with("word/media/") && !name.ends_with('/'))
            .count();
        assert_eq!(media, 2);
    }

    #[tokio::test]
    async fn test_missing_configured_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetStore::new(dir.path(), "http://localhost:3001");
        let result = LetterImages::load(&content("s", "r"), &assets).await;
        assert!(matches!(result, Err(AppError::Export(_))));
    }
}
