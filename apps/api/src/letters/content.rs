//! Letter content model: the structured snapshot captured when a letter is
//! generated. The HTML and DOCX renderers both read from it, so template
//! wording lives here and nowhere else.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::company::CompanyDetails;
use crate::models::employee::Employee;

pub const SIGN_OFF: &str = "Sincerely,";
pub const CLOSING_LINE: &str =
    "We are proud to have you as part of our team and look forward to your continued contributions.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyBlock {
    pub name: String,
    pub address: String,
    pub logo_path: Option<String>,
    pub founder_name: String,
    pub founder_title: String,
    pub signature_path: Option<String>,
    pub seal_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipient {
    pub name: String,
    pub department: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LetterContent {
    pub company: CompanyBlock,
    pub recipient: Recipient,
    pub date: NaiveDate,
    pub subject: String,
    pub reason: String,
    /// Plain-text body set by a manual edit. When absent the body is the
    /// reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl LetterContent {
    pub fn new(
        company: &CompanyDetails,
        employee: &Employee,
        subject: &str,
        reason: &str,
        date: NaiveDate,
    ) -> Self {
        LetterContent {
            company: CompanyBlock {
                name: company.name.clone(),
                address: company.address.clone(),
                logo_path: non_blank(company.logo_url.as_deref()),
                founder_name: company.founder_name.clone(),
                founder_title: company.founder_title.clone(),
                signature_path: non_blank(company.founder_signature_url.as_deref()),
                seal_path: non_blank(company.seal_url.as_deref()),
            },
            recipient: Recipient {
                name: employee.name.clone(),
                department: employee.department.clone(),
            },
            date,
            subject: subject.trim().to_string(),
            reason: reason.trim().to_string(),
            body: None,
        }
    }

    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or(&self.reason)
    }

    /// e.g. "October 14, 2026"
    pub fn date_line(&self) -> String {
        self.date.format("%B %-d, %Y").to_string()
    }

    pub fn salutation(&self) -> String {
        format!("Dear {},", self.recipient.name)
    }

    /// "Founder, Acme Corp"
    pub fn founder_caption(&self) -> String {
        format!("{}, {}", self.company.founder_title, self.company.name)
    }

    /// Splits the body text into paragraphs on blank lines. Each paragraph is a
    /// list of its lines, so renderers can keep single line breaks.
    pub fn body_paragraphs(&self) -> Vec<Vec<&str>> {
        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for line in self.body_text().lines() {
            let line = line.trim_end();
            if line.trim().is_empty() {
                if !current.is_empty() {
                    paragraphs.push(std::mem::take(&mut current));
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            paragraphs.push(current);
        }
        paragraphs
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
