use std::fmt;
use std::str::FromStr;

use chrono::Duration;

use kwatch_types::{format_duration, parse_human_duration};

use crate::error::{Error, Result};

/// Watch session configuration, resolved from flags and environment before
/// the UI starts. Consumed read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub namespace: Option<String>,
    pub all_namespaces: bool,
    pub label_selector: Option<String>,
    pub field_selector: Option<String>,
    /// Output mode: `None` for the default column set, `Some("wide")` for
    /// priority columns too.
    pub output: Option<String>,
    pub label_columns: Vec<String>,
    pub hide_deleted: OptionalDuration,
    pub watch_kubeconfig: bool,
}

impl Options {
    pub fn validate(&self) -> Result<()> {
        const ALLOWED_FORMATS: &str = "wide";
        match self.output.as_deref() {
            None | Some("") | Some("wide") => Ok(()),
            Some(
                format @ ("custom-columns" | "custom-columns-file" | "go-template"
                | "go-template-file" | "json" | "jsonpath" | "jsonpath-as-json"
                | "jsonpath-file" | "name" | "template" | "templatefile" | "yaml"),
            ) => Err(Error::Config(format!(
                "unsupported output format: {format:?}, allowed formats are: {ALLOWED_FORMATS}"
            ))),
            Some(format) => Err(Error::Config(format!(
                "unknown output format: {format:?}, allowed formats are: {ALLOWED_FORMATS}"
            ))),
        }
    }

    pub fn wide(&self) -> bool {
        self.output.as_deref() == Some("wide")
    }

    /// Label columns as configured: comma lists split, whitespace trimmed,
    /// empties dropped.
    pub fn normalized_label_columns(&self) -> Vec<String> {
        self.label_columns
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// A duration flag that can also be switched off. "false" or an empty value
/// disable it; "0" or "true" mean a zero duration (hide immediately);
/// anything else must parse with the compact duration grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionalDuration {
    value: Option<Duration>,
}

impl OptionalDuration {
    pub fn new(duration: Duration) -> Self {
        OptionalDuration {
            value: Some(duration),
        }
    }

    pub fn off() -> Self {
        OptionalDuration { value: None }
    }

    pub fn duration(&self) -> Option<Duration> {
        self.value
    }
}

impl FromStr for OptionalDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "" | "false" | "False" | "FALSE" => Ok(OptionalDuration::off()),
            "0" | "true" => Ok(OptionalDuration::new(Duration::zero())),
            _ => match parse_human_duration(s) {
                Some(duration) => Ok(OptionalDuration::new(duration)),
                None => Err(format!(
                    "invalid duration {s:?}, must be \"false\", empty string, or a valid time duration using units: s, m, h, d, w, y"
                )),
            },
        }
    }
}

impl fmt::Display for OptionalDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            None => write!(f, "false"),
            Some(duration) => write!(f, "{}", format_duration(duration)),
        }
    }
}
