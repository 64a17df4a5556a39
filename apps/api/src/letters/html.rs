//! HTML rendering of a `LetterContent`. The output is stored as the letter
//! body and is what the PDF exporter prints.

use std::fmt::Write;

use crate::letters::content::{LetterContent, CLOSING_LINE, SIGN_OFF};

const STYLE: &str = r#"
      body { font-family: 'Times New Roman', serif; line-height: 1.6; padding: 50px; }
      .header { text-align: center; }
      .header img { width: 200px; }
      .header h1 { margin: 0; }
      .content { margin-top: 40px; }
      .signature-section { margin-top: 50px; display: flex; justify-content: space-between; align-items: flex-end; }
      .signature-section .seal { text-align: center; }
      .signature-section .seal img { width: 80px; height: 80px; }"#;

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Joins the asset base URL and a stored image path ("/images/logo.png").
pub fn asset_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Renders the fixed letter template. Every interpolated value is escaped.
pub fn render_letter_html(content: &LetterContent, asset_base_url: &str) -> String {
    let company = &content.company;
    let recipient = &content.recipient;
    let img = |path: &str, alt: &str, style: &str| {
        format!(
            r#"<img src="{}" alt="{}"{}>"#,
            escape_html(&asset_url(asset_base_url, path)),
            alt,
            style
        )
    };

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "    <title>{}</title>", escape_html(&content.subject));
    let _ = writeln!(html, "    <style>{STYLE}\n    </style>");
    html.push_str("  </head>\n  <body>\n");

    html.push_str("    <div class=\"header\">\n");
    if let Some(logo) = &company.logo_path {
        let _ = writeln!(html, "      {}", img(logo, "Company Logo", ""));
    }
    let _ = writeln!(html, "      <h1>{}</h1>", escape_html(&company.name));
    let _ = writeln!(html, "      <p>{}</p>", escape_html(&company.address));
    html.push_str("    </div>\n    <hr>\n");

    html.push_str("    <div class=\"content\">\n");
    let _ = writeln!(
        html,
        "      <p><strong>Date:</strong> {}</p>",
        escape_html(&content.date_line())
    );
    let _ = writeln!(
        html,
        "      <p><strong>To,</strong><br>{}<br>{}</p>",
        escape_html(&recipient.name),
        escape_html(&recipient.department)
    );
    let _ = writeln!(
        html,
        "      <p><strong>Subject:</strong> {}</p>",
        escape_html(&content.subject)
    );
    let _ = writeln!(html, "      <p>{}</p>", escape_html(&content.salutation()));
    for paragraph in content.body_paragraphs() {
        let lines: Vec<String> = paragraph.iter().map(|line| escape_html(line)).collect();
        let _ = writeln!(html, "      <p>{}</p>", lines.join("<br>"));
    }
    let _ = writeln!(html, "      <p>{CLOSING_LINE}</p>");

    html.push_str("      <div class=\"signature-section\">\n        <div class=\"signature\">\n");
    let _ = writeln!(html, "          <p>{SIGN_OFF}</p>");
    if let Some(signature) = &company.signature_path {
        let _ = writeln!(
            html,
            "          {}",
            img(signature, "Signature", r#" style="width: 150px;""#)
        );
    }
    let _ = writeln!(
        html,
        "          <p><strong>{}</strong><br>{}</p>",
        escape_html(&company.founder_name),
        escape_html(&content.founder_caption())
    );
    html.push_str("        </div>\n");
    if let Some(seal) = &company.seal_path {
        let _ = writeln!(
            html,
            "        <div class=\"seal\">\n          {}\n        </div>",
            img(seal, "Company Seal", "")
        );
    }
    html.push_str("      </div>\n    </div>\n  </body>\n</html>\n");
    html
}
