use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use kwatch_core::TableCommand;
use kwatch_types::{parse_human_duration, status_cell, CellStyle, CellValue, Fraction, Row, RowStatus};

use crate::client::ResourceMeta;
use crate::decoder::{ColumnDefinition, TabularRow, TabularUpdate};
use crate::error::{Error, Result};
use crate::event::Lifecycle;

static RESTARTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+) \((\S+) ago\)$").expect("hardcoded regex"));

/// Turns decoded tabular updates into table commands: header updates when
/// the column definitions change, one row upsert per table row. Holds the
/// column layout for the lifetime of one watch session.
#[derive(Debug)]
pub struct Translator {
    wide: bool,
    label_columns: Vec<String>,
    print_namespace: bool,
    meta: ResourceMeta,
    col_defs: Vec<ColumnDefinition>,
    headers: Vec<String>,
}

impl Translator {
    pub fn new(
        wide: bool,
        label_columns: Vec<String>,
        print_namespace: bool,
        meta: ResourceMeta,
    ) -> Self {
        Translator {
            wide,
            label_columns,
            // The namespace column only makes sense for namespaced kinds.
            print_namespace: print_namespace && meta.namespaced,
            meta,
            col_defs: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Translate one tabular update into zero or more table commands.
    pub fn translate(
        &mut self,
        table: &TabularUpdate,
        lifecycle: Lifecycle,
        now: DateTime<Utc>,
    ) -> Result<Vec<TableCommand>> {
        let mut commands = Vec::new();
        if lifecycle == Lifecycle::Bookmark {
            return Ok(commands);
        }

        if !table.column_definitions.is_empty() {
            self.col_defs = table.column_definitions.clone();
            let headers = self.visible_headers();
            if headers != self.headers {
                self.headers = headers.clone();
                commands.push(TableCommand::SetHeaders(headers));
            }
        }

        for row in &table.rows {
            commands.push(TableCommand::UpsertRow(self.build_row(row, lifecycle, now)?));
        }
        Ok(commands)
    }

    fn visible_headers(&self) -> Vec<String> {
        let mut headers = Vec::with_capacity(self.col_defs.len() + 1);
        if self.print_namespace {
            headers.push("NAMESPACE".to_string());
        }
        for def in &self.col_defs {
            if def.priority == 0 || self.wide {
                headers.push(def.name.to_uppercase());
            }
        }
        for label in &self.label_columns {
            headers.push(label_column_header(label));
        }
        headers
    }

    fn build_row(&self, row: &TabularRow, lifecycle: Lifecycle, now: DateTime<Utc>) -> Result<Row> {
        let deleted = lifecycle == Lifecycle::Deleted;
        let mut fields = Vec::with_capacity(row.cells.len() + 1);
        if self.print_namespace {
            fields.push(CellValue::text(row.namespace.clone().unwrap_or_default()));
        }

        let incomplete_job = self.meta_is("batch", "Job") && self.job_incomplete(row);

        for (i, cell) in row.cells.iter().enumerate() {
            let def = self.col_defs.get(i).ok_or_else(|| {
                Error::Decode(format!(
                    "cannot find index {} ({}) in column definitions",
                    i, cell
                ))
            })?;
            if def.priority != 0 && !self.wide {
                continue;
            }

            let cell_str = cell_to_string(cell);
            let name = def.name.to_lowercase();
            let value = match name.as_str() {
                // The server renders age as a static string; substitute the
                // parsed creation timestamp so it keeps counting.
                "age" | "created at" => CellValue::Since(row.creation_timestamp),
                "status" => {
                    if deleted {
                        CellValue::Ago {
                            value: "Deleted".to_string(),
                            anchor: now,
                        }
                    } else {
                        status_cell(&cell_str)
                    }
                }
                "last seen" if self.meta_is_event() => back_calculate(&cell_str, now),
                "last schedule" if self.meta_is("batch", "CronJob") => {
                    back_calculate(&cell_str, now)
                }
                "duration" if incomplete_job => back_calculate(&cell_str, now),
                "reason" if self.meta_is_event() => status_cell(&cell_str),
                "reclaim policy" | "reclaimpolicy"
                    if self.meta_is("storage.k8s.io", "StorageClass") =>
                {
                    status_cell(&cell_str)
                }
                "restarts" if self.meta_is("", "Pod") => restarts_cell(&cell_str, deleted, now),
                _ => {
                    if !deleted {
                        match Fraction::parse(&cell_str) {
                            Some(fraction) => CellValue::styled(
                                fraction.style(),
                                CellValue::text(cell_str),
                            ),
                            None => CellValue::text(cell_str),
                        }
                    } else {
                        CellValue::text(cell_str)
                    }
                }
            };
            fields.push(value);
        }

        for label in &self.label_columns {
            fields.push(CellValue::text(
                row.labels.get(label).cloned().unwrap_or_default(),
            ));
        }

        let mut out = Row::new(row.uid.clone());
        out.fields = fields;
        out.status = match lifecycle {
            Lifecycle::Error => RowStatus::Error,
            Lifecycle::Deleted => RowStatus::Deleted,
            _ => RowStatus::Default,
        };
        out.sort_key = self.sort_key(row);
        out.suggestion = row.name.clone();
        if deleted {
            out.deleted_at = Some(now);
        }
        Ok(out)
    }

    /// Events sort chronologically; everything else alphabetically by
    /// (namespace-qualified) name.
    fn sort_key(&self, row: &TabularRow) -> String {
        if self.meta_is_event() {
            return row.creation_timestamp.to_rfc3339();
        }
        match (&row.namespace, self.print_namespace) {
            (Some(namespace), true) => format!("{}/{}", namespace, row.name),
            _ => row.name.clone(),
        }
    }

    fn meta_is(&self, group: &str, kind: &str) -> bool {
        self.meta.group == group && self.meta.kind == kind
    }

    fn meta_is_event(&self) -> bool {
        self.meta.kind == "Event"
            && (self.meta.group.is_empty() || self.meta.group == "events.k8s.io")
    }

    /// True while a job's completions cell reads as an incomplete fraction.
    fn job_incomplete(&self, row: &TabularRow) -> bool {
        for (i, cell) in row.cells.iter().enumerate() {
            let Some(def) = self.col_defs.get(i) else {
                continue;
            };
            if def.name.eq_ignore_ascii_case("completions") {
                return Fraction::parse(&cell_to_string(cell))
                    .map(|f| !f.is_complete())
                    .unwrap_or(false);
            }
        }
        false
    }
}

/// "bar" from "foo/bar", uppercased; the label key's domain prefix is noise
/// in a column header.
pub fn label_column_header(label: &str) -> String {
    let last = label.rsplit('/').next().unwrap_or_default();
    last.to_uppercase()
}

fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parse a server-rendered duration string back into an absolute instant
/// (`now - duration`) so it keeps counting between refreshes. Unparseable
/// text ("<unknown>") passes through.
fn back_calculate(cell_str: &str, now: DateTime<Utc>) -> CellValue {
    match parse_human_duration(cell_str) {
        Some(duration) if !cell_str.is_empty() => CellValue::Since(now - duration),
        _ => CellValue::text(cell_str),
    }
}

/// Pods' restarts column: "0" passes through; "5 (10m ago)" becomes a
/// relative-duration cell; any other nonzero text keeps its warning style
/// without the duration decoration. Deleted rows skip the warning style.
fn restarts_cell(cell_str: &str, deleted: bool, now: DateTime<Utc>) -> CellValue {
    if cell_str == "0" {
        return CellValue::text(cell_str);
    }
    let inner = match RESTARTS_RE
        .captures(cell_str)
        .and_then(|caps| {
            let count = caps.get(1)?.as_str().to_string();
            let duration = parse_human_duration(caps.get(2)?.as_str())?;
            Some(CellValue::Ago {
                value: count,
                anchor: now - duration,
            })
        }) {
        Some(cell) => cell,
        None => CellValue::text(cell_str),
    };
    if deleted {
        inner
    } else {
        CellValue::styled(CellStyle::Warning, inner)
    }
}
