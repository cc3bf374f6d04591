//! Functionality shared by multiple commands.

use std::io::{self, Write as _};

use anstream::stream::{AsLockedWrite, RawStream};
use anstyle::{AnsiColor, Color, Style};
use serde::Serialize as _;
use serde_json::ser::{Formatter, PrettyFormatter};

use crate::Printer;

const NULL: Style = Style::new().bold();
const BOOL: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));
const NUMBER: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
const STRING: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
const OBJECT_KEY: Style = Style::new().bold();

impl<W: RawStream + AsLockedWrite> Printer<W> {
    /// Outputs pretty-printed JSON with syntax highlighting.
    ///
    /// # Errors
    ///
    /// Proxies I/O errors.
    pub fn print_json(&mut self, json: &serde_json::Value) -> io::Result<()> {
        write_json(&mut self.writer, json)?;
        writeln!(&mut self.writer)
    }

    /// Outputs YAML with syntax highlighting. Object keys and plain scalars are highlighted.
    ///
    /// # Errors
    ///
    /// Proxies I/O errors and YAML serialization errors.
    pub fn print_yaml(&mut self, json: &serde_json::Value) -> io::Result<()> {
        write_yaml(&mut self.writer, json)
    }
}

/// Writes JSON in the same layout as `serde_json::to_string_pretty()`, but with styled scalars and keys.
pub(crate) fn write_json(writer: &mut impl io::Write, value: &serde_json::Value) -> io::Result<()> {
    let mut serializer = serde_json::Serializer::with_formatter(writer, HighlightingFormatter::default());
    value.serialize(&mut serializer)?;
    Ok(())
}

/// Pretty JSON formatter wrapping every scalar and object key into an ANSI style.
#[derive(Debug, Default)]
struct HighlightingFormatter {
    inner: PrettyFormatter<'static>,
    in_key: bool,
}

impl HighlightingFormatter {
    fn styled<W, F>(&mut self, writer: &mut W, style: Style, write: F) -> io::Result<()>
    where
        W: ?Sized + io::Write,
        F: FnOnce(&mut PrettyFormatter<'static>, &mut W) -> io::Result<()>,
    {
        write!(writer, "{style}")?;
        write(&mut self.inner, writer)?;
        write!(writer, "{style:#}")
    }
}

impl Formatter for HighlightingFormatter {
    fn write_null<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.styled(writer, NULL, |inner, w| inner.write_null(w))
    }

    fn write_bool<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: bool) -> io::Result<()> {
        self.styled(writer, BOOL, |inner, w| inner.write_bool(w, value))
    }

    fn write_i64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: i64) -> io::Result<()> {
        self.styled(writer, NUMBER, |inner, w| inner.write_i64(w, value))
    }

    fn write_u64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: u64) -> io::Result<()> {
        self.styled(writer, NUMBER, |inner, w| inner.write_u64(w, value))
    }

    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        self.styled(writer, NUMBER, |inner, w| inner.write_f64(w, value))
    }

    fn write_number_str<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        value: &str,
    ) -> io::Result<()> {
        self.styled(writer, NUMBER, |inner, w| inner.write_number_str(w, value))
    }

    fn begin_string<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        let style = if self.in_key { OBJECT_KEY } else { STRING };
        write!(writer, "{style}")?;
        self.inner.begin_string(writer)
    }

    fn end_string<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        let style = if self.in_key { OBJECT_KEY } else { STRING };
        self.inner.end_string(writer)?;
        write!(writer, "{style:#}")
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.in_key = true;
        self.inner.begin_object_key(writer, first)
    }

    fn end_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.in_key = false;
        self.inner.end_object_key(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }
}

/// Writes YAML produced by `serde_yaml`, highlighting keys and scalars line by line.
fn write_yaml(writer: &mut impl io::Write, value: &serde_json::Value) -> io::Result<()> {
    let yaml = serde_yaml::to_string(value).map_err(io::Error::other)?;
    // Indentation of the key owning a block scalar (`|`, `>`) whose lines are being output.
    let mut block_indent = None;
    for line in yaml.lines() {
        let indent = line.len() - line.trim_start_matches(' ').len();
        if let Some(owner_indent) = block_indent {
            if indent > owner_indent || line.trim().is_empty() {
                writeln!(writer, "{STRING}{line}{STRING:#}")?;
                continue;
            }
            block_indent = None;
        }

        let mut content = line;
        while let Some(rest) = content.strip_prefix(' ').or_else(|| content.strip_prefix("- ")) {
            content = rest;
        }
        let (prefix, content) = line.split_at(line.len() - content.len());
        write!(writer, "{prefix}")?;

        let scalar = match split_plain_key(content) {
            Some((key, value)) => {
                write!(writer, "{OBJECT_KEY}{key}{OBJECT_KEY:#}:")?;
                if value.is_empty() {
                    writeln!(writer)?;
                    continue;
                }
                write!(writer, " ")?;
                value
            }
            None => content,
        };
        if scalar.starts_with(['|', '>']) {
            block_indent = Some(indent);
        }
        writeln!(writer, "{style}{scalar}{style:#}", style = scalar_style(scalar))?;
    }
    Ok(())
}

/// Splits `key: value` or `key:` lines where the key is a plain scalar. Quoted keys are left as is.
fn split_plain_key(content: &str) -> Option<(&str, &str)> {
    if !content.starts_with(|ch: char| ch.is_ascii_alphanumeric() || ch == '_') {
        return None;
    }
    if let Some(key) = content.strip_suffix(':') {
        return (!key.contains(": ")).then_some((key, ""));
    }
    content.split_once(": ")
}

fn scalar_style(scalar: &str) -> Style {
    match scalar {
        "null" | "~" => NULL,
        "true" | "false" => BOOL,
        "[]" | "{}" => Style::new(),
        _ if scalar.starts_with(|ch: char| ch.is_ascii_digit() || ch == '-')
            && scalar.parse::<f64>().is_ok() =>
        {
            NUMBER
        }
        _ => STRING,
    }
}

#[cfg(test)]
mod tests {
    use anstream::AutoStream;
    use serde_json::json;

    use super::*;

    fn sample_json() -> serde_json::Value {
        json!({
            "info": { "age": 30, "kids": [{ "name": "Sam" }], "working": false },
            "name": "Peyman",
            "matrix": [[1, 2], []],
            "tags": [],
            "city": null,
        })
    }

    #[test]
    fn writing_json() {
        let json = sample_json();
        let mut buffer = vec![];
        write_json(&mut AutoStream::never(&mut buffer), &json).unwrap();
        let produced_json = String::from_utf8(buffer).unwrap();

        assert_eq!(produced_json, serde_json::to_string_pretty(&json).unwrap());
    }

    #[test]
    fn highlighting_json() {
        let mut buffer = vec![];
        write_json(&mut AutoStream::always(&mut buffer), &sample_json()).unwrap();
        let produced_json = String::from_utf8(buffer).unwrap();

        assert!(
            produced_json.contains(&format!(
                "{OBJECT_KEY}\"name\"{OBJECT_KEY:#}: {STRING}\"Peyman\"{STRING:#}"
            )),
            "{produced_json}"
        );
        assert!(produced_json.contains(&format!("{NUMBER}30{NUMBER:#}")), "{produced_json}");
        assert!(produced_json.contains(&format!("{BOOL}false{BOOL:#}")), "{produced_json}");
        assert!(produced_json.contains(&format!("{NULL}null{NULL:#}")), "{produced_json}");
    }

    #[test]
    fn writing_yaml() {
        let json = sample_json();
        let mut buffer = vec![];
        write_yaml(&mut AutoStream::never(&mut buffer), &json).unwrap();
        let produced_yaml = String::from_utf8(buffer).unwrap();

        assert_eq!(produced_yaml, serde_yaml::to_string(&json).unwrap());
        let restored: serde_json::Value = serde_yaml::from_str(&produced_yaml).unwrap();
        assert_eq!(restored, json);
    }

    #[test]
    fn highlighting_yaml() {
        let json = json!({
            "name": "Peyman",
            "nickname": "null",
            "age": -3,
            "kids": [{ "name": "Sam" }],
            "notes": "first: line\nsecond line",
        });
        let mut buffer = vec![];
        write_yaml(&mut AutoStream::always(&mut buffer), &json).unwrap();
        let produced_yaml = String::from_utf8(buffer).unwrap();

        let name_line = format!("{OBJECT_KEY}name{OBJECT_KEY:#}: {STRING}Peyman{STRING:#}");
        assert!(produced_yaml.contains(&name_line), "{produced_yaml}");
        let nickname_line = format!("{OBJECT_KEY}nickname{OBJECT_KEY:#}: {STRING}'null'{STRING:#}");
        assert!(produced_yaml.contains(&nickname_line), "{produced_yaml}");
        assert!(produced_yaml.contains(&format!("{NUMBER}-3{NUMBER:#}")), "{produced_yaml}");
        assert!(
            produced_yaml.contains(&format!("- {OBJECT_KEY}name{OBJECT_KEY:#}: {STRING}Sam{STRING:#}")),
            "{produced_yaml}"
        );
        // Lines of the multi-line string are not mistaken for keys.
        assert!(!produced_yaml.contains(&format!("{OBJECT_KEY}first{OBJECT_KEY:#}")), "{produced_yaml}");

        let plain_yaml = anstream::adapter::strip_str(&produced_yaml).to_string();
        let restored: serde_json::Value = serde_yaml::from_str(&plain_yaml).unwrap();
        assert_eq!(restored, json);
    }
}
