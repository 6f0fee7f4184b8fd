//! Plain-text rendering of an inspection.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value as JsonValue;

use crate::bounds::LatLngBounds;
use crate::layer::{LayerInfo, Samples};

const PLACEHOLDER: &str = "—";

/// Removes markup from service descriptions, which are often HTML.
pub fn strip_html(input: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"));
    let text = tags.replace_all(input, " ");
    let text = text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cell text for an attribute value: nothing for null, compact JSON for
/// objects and arrays.
pub fn format_value(value: &JsonValue) -> String {
    match *value {
        JsonValue::Null => String::new(),
        JsonValue::String(ref s) => s.clone(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(ref n) => n.to_string(),
        JsonValue::Array(_) |
        JsonValue::Object(_) => value.to_string(),
    }
}

fn write_row(f: &mut fmt::Formatter, widths: &[usize], cells: &[String]) -> fmt::Result {
    let padded: Vec<String> = widths.iter()
        .enumerate()
        .map(|(i, w)| {
                 let cell = cells.get(i).map(String::as_str).unwrap_or("");
                 format!("{:<width$}", cell, width = w)
             })
        .collect();
    writeln!(f, "  {}", padded.join(" | ").trim_end())
}

fn write_table(f: &mut fmt::Formatter, header: &[String], rows: &[Vec<String>]) -> fmt::Result {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    write_row(f, &widths, header)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(f, "  {}", rule.join("-+-"))?;
    for row in rows {
        write_row(f, &widths, row)?;
    }
    Ok(())
}

pub struct Report<'a> {
    pub layer_url: &'a str,
    pub info: &'a LayerInfo,
    pub count: Option<u64>,
    pub samples: &'a Samples,
    pub bounds: Option<&'a LatLngBounds>,
}

impl<'a> fmt::Display for Report<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let info = self.info;
        writeln!(f, "Layer:       {}", self.layer_url)?;
        writeln!(f, "Name:        {}", info.name.as_deref().unwrap_or(PLACEHOLDER))?;
        writeln!(f, "Type:        {}", info.display_type().unwrap_or(PLACEHOLDER))?;
        writeln!(f, "Owner:       {}", info.display_owner().unwrap_or(PLACEHOLDER))?;
        match info.last_edit() {
            Some(date) => writeln!(f, "Updated:     {}", date.format("%Y-%m-%d %H:%M:%S UTC"))?,
            None => writeln!(f, "Updated:     {}", PLACEHOLDER)?,
        }
        match self.count {
            Some(count) => writeln!(f, "Features:    {}", count)?,
            None => writeln!(f, "Features:    {}", PLACEHOLDER)?,
        }
        match self.bounds.filter(|b| b.is_valid()) {
            Some(b) => {
                writeln!(f,
                         "Extent:      S {:.6}  W {:.6}  N {:.6}  E {:.6}",
                         b.south,
                         b.west,
                         b.north,
                         b.east)?
            }
            None => writeln!(f, "Extent:      {} (whole-world view)", PLACEHOLDER)?,
        }
        let description = info.description.as_deref().map(strip_html).unwrap_or_default();
        if description.is_empty() {
            writeln!(f, "Description: No description available.")?;
        } else {
            writeln!(f, "Description: {}", description)?;
        }

        writeln!(f)?;
        writeln!(f, "Schema ({} field(s))", info.fields.len())?;
        if !info.fields.is_empty() {
            let header = vec!["name".to_string(), "alias".to_string(), "type".to_string()];
            let rows: Vec<Vec<String>> = info.fields
                .iter()
                .map(|field| {
                         vec![field.name.clone(),
                              field.alias.clone().unwrap_or_default(),
                              field.field_type.clone().unwrap_or_default()]
                     })
                .collect();
            write_table(f, &header, &rows)?;
        }

        writeln!(f)?;
        writeln!(f, "Samples ({} record(s))", self.samples.rows.len())?;
        if !self.samples.is_empty() {
            let rows: Vec<Vec<String>> = self.samples
                .rows
                .iter()
                .map(|attrs| {
                         self.samples
                             .columns
                             .iter()
                             .map(|c| attrs.get(c).map(format_value).unwrap_or_default())
                             .collect()
                     })
                .collect();
            write_table(f, &self.samples.columns, &rows)?;
        }
        Ok(())
    }
}
