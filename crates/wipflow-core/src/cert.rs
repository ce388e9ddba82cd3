//! Calibration certificate fields pulled from a task title.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

pub const NOT_FOUND: &str = "NOT FOUND";

struct Patterns {
    model: Regex,
    serial: Regex,
    range: Regex,
    fitting: Regex,
    connector: Regex,
    orientation: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        model: Regex::new(r"(?i):\s*([^\s]+)").unwrap(),
        serial: Regex::new(r"(?i)SN:\s*(\S+)").unwrap(),
        range: Regex::new(r"(?i)(\d*\.?\d+)\s*Torr").unwrap(),
        fitting: Regex::new(r"(?i)(\S*VCR\S*)").unwrap(),
        connector: Regex::new(r"(?i)(\S*pin\S*)").unwrap(),
        orientation: Regex::new(r"(?i)(vertical|horizontal)").unwrap(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalCert {
    pub model_number: String,
    pub serial_number: String,
    /// Includes the unit, e.g. `"100 Torr"`.
    pub range: String,
    pub fitting: String,
    pub connector: String,
    pub orientation: String,
}

fn capture(re: &Regex, title: &str) -> Option<String> {
    re.captures(title)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Extract certificate fields from a title like
/// `"W-123: 626C13TBE SN: 1A2B 100 Torr 8VCR 15pin vertical"`.
///
/// Absent fields read [`NOT_FOUND`], except orientation, which defaults to
/// vertical.
pub fn parse_cal_cert_title(title: &str) -> CalCert {
    let p = patterns();
    let field = |re: &Regex| capture(re, title).unwrap_or_else(|| NOT_FOUND.to_string());
    CalCert {
        model_number: field(&p.model),
        serial_number: field(&p.serial),
        range: capture(&p.range, title)
            .map(|r| format!("{r} Torr"))
            .unwrap_or_else(|| NOT_FOUND.to_string()),
        fitting: field(&p.fitting),
        connector: field(&p.connector),
        orientation: capture(&p.orientation, title).unwrap_or_else(|| "vertical".to_string()),
    }
}
