use std::{io, io::Write as _};

use anstream::stream::{AsLockedWrite, RawStream};
use anstyle::{AnsiColor, Color, Style};
use garlic_config::{
    field::FieldDescription,
    schema::ModelDescription,
    ModelSchema,
};

use crate::{FieldRef, Printer, FIELD_PATH};

const INDENT: &str = "  ";
const DIMMED: Style = Style::new().dimmed();
const FIELD: Style = Style::new().underline();
const DEFAULT_VAL: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));
const CONSTRAINT: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan)));

impl<W: RawStream + AsLockedWrite> Printer<W> {
    /// Prints help on fields of the model with the provided registry. Fields of nested models
    /// (including models in array elements) are printed recursively. Fields can be filtered
    /// by the supplied predicate.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors.
    pub fn print_help(
        self,
        schema: &ModelSchema,
        mut filter: impl FnMut(FieldRef<'_>) -> bool,
    ) -> io::Result<()> {
        let mut writer = self.writer;
        let description = schema.describe();
        write_model_help(&mut writer, &description, "", &mut filter)
    }
}

fn write_model_help<F: FnMut(FieldRef<'_>) -> bool>(
    writer: &mut impl io::Write,
    model: &ModelDescription,
    prefix: &str,
    filter: &mut F,
) -> io::Result<()> {
    for (id, field) in &model.fields {
        let path = if prefix.is_empty() {
            id.clone()
        } else {
            format!("{prefix}.{id}")
        };
        if let Some(nested) = &field.extra.model_info {
            write_model_help(writer, nested, &path, filter)?;
            continue;
        }

        let field_ref = FieldRef {
            path: &path,
            model_name: model.name,
            description: field,
        };
        if filter(field_ref) {
            field_ref.write_help(writer, prefix, id)?;
            writeln!(writer)?;
        }

        let element_model = field
            .extra
            .element_info
            .as_ref()
            .and_then(|element| element.extra.model_info.as_ref());
        if let Some(nested) = element_model {
            write_model_help(writer, nested, &format!("{path}.*"), filter)?;
        }
    }
    Ok(())
}

impl FieldRef<'_> {
    fn write_help(&self, writer: &mut impl io::Write, prefix: &str, id: &str) -> io::Result<()> {
        let prefix_sep = if prefix.is_empty() { "" } else { "." };
        writeln!(
            writer,
            "{DIMMED}{prefix}{prefix_sep}{DIMMED:#}{FIELD_PATH}{id}{FIELD_PATH:#} \
             {DIMMED}[{model}]{DIMMED:#}",
            model = self.model_name
        )?;

        let description = self.description;
        if description.name != id {
            writeln!(writer, "{INDENT}{FIELD}Name{FIELD:#}: {}", description.name)?;
        }
        write_type_description(writer, "Type", 2, description)?;

        let default = &description.extra.default;
        if !default.is_null() {
            writeln!(
                writer,
                "{INDENT}{FIELD}Default{FIELD:#}: {DEFAULT_VAL}{default}{DEFAULT_VAL:#}"
            )?;
        }

        if let Some(help) = &description.desc {
            for line in help.lines() {
                writeln!(writer, "{INDENT}{line}")?;
            }
        }
        Ok(())
    }
}

fn write_type_description(
    writer: &mut impl io::Write,
    relation_to_parent: &str,
    indent: usize,
    description: &FieldDescription,
) -> io::Result<()> {
    let extra = &description.extra;
    let mut details = String::new();
    if !extra.nullable {
        details.push_str("; required");
    }
    if let Some(choices) = &extra.choices {
        let choices = choices.join("', '");
        details.push_str(&format!("; choices: {CONSTRAINT}'{choices}'{CONSTRAINT:#}"));
    }
    if let Some((min, max)) = extra.domain {
        details.push_str(&format!("; domain: {CONSTRAINT}[{min}, {max}]{CONSTRAINT:#}"));
    }
    if let Some(model) = &extra.model_info {
        details.push_str(&format!("; model: {}", model.name));
    }

    writeln!(
        writer,
        "{:>indent$}{FIELD}{relation_to_parent}{FIELD:#}: {expecting} {DIMMED}[{kind}]{DIMMED:#}{details}",
        "",
        expecting = description.expecting,
        kind = description.kind
    )?;

    if let Some(element) = &extra.element_info {
        write_type_description(writer, "Array items", indent + 2, element)?;
    }
    Ok(())
}
