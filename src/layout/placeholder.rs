//! `{{name}}` placeholder substitution for template text.
//!
//! | Placeholder | Value |
//! |-------------|-------|
//! | `{{booth_name}}` | Booth display name |
//! | `{{code}}` | Session download code |
//! | `{{download_url}}` | Full download URL (also the QR payload) |
//! | `{{date}}` | Session date as `YYYY.MM.DD` |
//!
//! Unknown placeholders are left as written.

use chrono::{Local, NaiveDate};

/// Values substituted into template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    pub booth_name: String,
    pub code: String,
    pub download_url: String,
    pub date: NaiveDate,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            booth_name: String::new(),
            code: String::new(),
            download_url: String::new(),
            date: Local::now().date_naive(),
        }
    }
}

impl Placeholders {
    pub fn new(booth_name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            booth_name: booth_name.into(),
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = url.into();
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Replace every known placeholder in `text`.
    pub fn substitute(&self, text: &str) -> String {
        text.replace("{{booth_name}}", &self.booth_name)
            .replace("{{code}}", &self.code)
            .replace("{{download_url}}", &self.download_url)
            .replace("{{date}}", &self.date.format("%Y.%m.%d").to_string())
    }
}
