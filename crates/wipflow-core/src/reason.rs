use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Standard reasons an operator can pick when a device is set aside or
/// returned unrepaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    BadSensor,
    PressureOscillation,
    InternalLeak,
    Contaminated,
    PositiveReadError,
    RangeError,
    NegativeReadError,
    PhysicallyDamaged,
    Drifting,
    Other,
}

impl Reason {
    pub const ALL: [Reason; 10] = [
        Reason::BadSensor,
        Reason::PressureOscillation,
        Reason::InternalLeak,
        Reason::Contaminated,
        Reason::PositiveReadError,
        Reason::RangeError,
        Reason::NegativeReadError,
        Reason::PhysicallyDamaged,
        Reason::Drifting,
        Reason::Other,
    ];

    /// Label as operators see it. Doubles as the tag name.
    pub fn label(self) -> &'static str {
        match self {
            Reason::BadSensor => "Bad Sensor",
            Reason::PressureOscillation => "Pressure Oscillation",
            Reason::InternalLeak => "INTERNAL LEAK",
            Reason::Contaminated => "CONTAMINATED",
            Reason::PositiveReadError => "Positive Read Error",
            Reason::RangeError => "Range Error",
            Reason::NegativeReadError => "Negative ReadError",
            Reason::PhysicallyDamaged => "Physically Damaged",
            Reason::Drifting => "DRIFTING",
            Reason::Other => "OTHER",
        }
    }

    /// Tag to apply alongside the reason comment. `OTHER` has none.
    pub fn tag_name(self) -> Option<&'static str> {
        match self {
            Reason::Other => None,
            reason => Some(reason.label()),
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

impl FromStr for Reason {
    type Err = CoreError;

    /// Accepts the label in any case, with or without separators:
    /// "bad sensor", "BAD_SENSOR" and "bad-sensor" all parse.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize(s);
        Reason::ALL
            .into_iter()
            .find(|r| normalize(r.label()) == wanted)
            .ok_or_else(|| CoreError::UnknownReason {
                reason: s.to_string(),
                known: Reason::ALL.map(Reason::label).join(", "),
            })
    }
}

/// A reason plus optional free-text details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasonSelection {
    pub reason: Reason,
    pub details: Option<String>,
}

impl ReasonSelection {
    pub fn new(reason: Reason, details: Option<&str>) -> Self {
        let details = details
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        Self { reason, details }
    }

    /// Comment body, without the device signature.
    pub fn comment(&self) -> String {
        match (self.reason, &self.details) {
            (Reason::Other, Some(details)) => format!("AUTO: {details}"),
            (Reason::Other, None) => "AUTO: OTHER".to_string(),
            (reason, Some(details)) => format!("AUTO: {reason} - {details}"),
            (reason, None) => format!("AUTO: {reason}"),
        }
    }

    pub fn tag_name(&self) -> Option<&'static str> {
        self.reason.tag_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{tag_key_for, BindingSpec};

    #[test]
    fn standard_reason_comment_and_tag() {
        let plain = ReasonSelection::new(Reason::BadSensor, None);
        assert_eq!(plain.comment(), "AUTO: Bad Sensor");
        assert_eq!(plain.tag_name(), Some("Bad Sensor"));

        let detailed = ReasonSelection::new(Reason::Drifting, Some(" 3% high "));
        assert_eq!(detailed.comment(), "AUTO: DRIFTING - 3% high");
    }

    #[test]
    fn other_uses_details_and_has_no_tag() {
        assert_eq!(
            ReasonSelection::new(Reason::Other, Some("cracked housing")).comment(),
            "AUTO: cracked housing"
        );
        let bare = ReasonSelection::new(Reason::Other, Some("   "));
        assert_eq!(bare.comment(), "AUTO: OTHER");
        assert_eq!(bare.tag_name(), None);
    }

    #[test]
    fn parse_is_lenient_about_case_and_separators() {
        assert_eq!("bad sensor".parse::<Reason>().unwrap(), Reason::BadSensor);
        assert_eq!("INTERNAL_LEAK".parse::<Reason>().unwrap(), Reason::InternalLeak);
        assert_eq!(
            "negative-read-error".parse::<Reason>().unwrap(),
            Reason::NegativeReadError
        );
        assert!(matches!(
            "loose screw".parse::<Reason>(),
            Err(CoreError::UnknownReason { .. })
        ));
    }

    #[test]
    fn every_reason_tag_has_a_default_binding() {
        let spec = BindingSpec::default();
        for tag in Reason::ALL.iter().filter_map(|r| r.tag_name()) {
            let key = tag_key_for(tag);
            assert!(
                spec.tags.iter().any(|e| e.key == key && e.name == tag),
                "no binding for {key}"
            );
        }
    }
}
