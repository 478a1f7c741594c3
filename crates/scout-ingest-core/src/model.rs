use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Ip,
    Domain,
}

impl IndicatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Ip => "ip",
            IndicatorKind::Domain => "domain",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn ip_re() -> &'static Regex {
    static IP_RE: OnceLock<Regex> = OnceLock::new();
    IP_RE.get_or_init(|| {
        Regex::new(r"^(?:(?:25[0-5]|2[0-4]\d|[01]?\d\d?)\.){3}(?:25[0-5]|2[0-4]\d|[01]?\d\d?)$")
            .expect("valid ip regex")
    })
}

fn domain_re() -> &'static Regex {
    static DOMAIN_RE: OnceLock<Regex> = OnceLock::new();
    DOMAIN_RE.get_or_init(|| {
        Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$")
            .expect("valid domain regex")
    })
}

/// A single watched value. Construction validates the value against the
/// kind-specific pattern; rejected values are debug-logged and dropped
/// rather than aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    pub kind: IndicatorKind,
    pub value: String,
}

impl Indicator {
    pub fn new(kind: IndicatorKind, value: &str) -> Option<Self> {
        let value = value.trim();
        let pattern = match kind {
            IndicatorKind::Ip => ip_re(),
            IndicatorKind::Domain => domain_re(),
        };
        if value.is_empty() || !pattern.is_match(value) {
            debug!("{value} is not a valid {kind}");
            return None;
        }
        Some(Self {
            kind,
            value: value.to_string(),
        })
    }
}

/// One run's worth of records bound for a single destination table.
/// Ownership moves to the forwarder, which does not retain it.
#[derive(Debug, Clone, Default)]
pub struct IngestionBatch {
    pub records: Vec<Value>,
    pub table: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub api_calls: usize,
    pub records_forwarded: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_indicators_validate_dotted_quads() {
        assert!(Indicator::new(IndicatorKind::Ip, "1.2.3.4").is_some());
        assert!(Indicator::new(IndicatorKind::Ip, "255.255.255.255").is_some());
        assert!(Indicator::new(IndicatorKind::Ip, "256.1.1.1").is_none());
        assert!(Indicator::new(IndicatorKind::Ip, "1.2.3").is_none());
        assert!(Indicator::new(IndicatorKind::Ip, "not-an-ip").is_none());
        assert!(Indicator::new(IndicatorKind::Ip, "").is_none());
    }

    #[test]
    fn domain_indicators_require_a_dotted_name() {
        assert!(Indicator::new(IndicatorKind::Domain, "example.com").is_some());
        assert!(Indicator::new(IndicatorKind::Domain, "sub.example.co.uk").is_some());
        assert!(Indicator::new(IndicatorKind::Domain, "localhost").is_none());
        assert!(Indicator::new(IndicatorKind::Domain, "-bad.example.com").is_none());
        assert!(Indicator::new(IndicatorKind::Domain, "").is_none());
    }

    #[test]
    fn indicator_construction_trims_whitespace() {
        let indicator =
            Indicator::new(IndicatorKind::Domain, "  example.com  ").expect("valid after trim");
        assert_eq!(indicator.value, "example.com");
    }
}
