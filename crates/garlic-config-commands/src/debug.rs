use std::io::{self, Write as _};

use anstream::stream::{AsLockedWrite, RawStream};
use anstyle::{AnsiColor, Color, Style};
use garlic_config::{DumpOptions, ModelInstance, ValidationError, ValidationErrors};

use crate::{utils::write_json, Printer, FIELD_PATH};

const SECTION: Style = Style::new().bold();
const MODEL: Style = Style::new().dimmed();
const OK_LABEL: Style = Style::new()
    .bold()
    .bg_color(Some(Color::Ansi(AnsiColor::Green)))
    .fg_color(None);
const ERROR_LABEL: Style = Style::new()
    .bold()
    .bg_color(Some(Color::Ansi(AnsiColor::Red)))
    .fg_color(None);

impl<W: RawStream + AsLockedWrite> Printer<W> {
    /// Prints debug info for the provided model instance: its values (including null ones)
    /// and the validation outcome. If the instance fails validation, the errors are output as well.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors. Validation errors are returned in the inner `Result`.
    pub fn print_debug(
        self,
        instance: &ModelInstance,
    ) -> io::Result<Result<(), ValidationErrors>> {
        let mut writer = self.writer;
        writeln!(
            &mut writer,
            "{SECTION}Model:{SECTION:#} {MODEL}{}{MODEL:#}",
            instance.model_name()
        )?;

        writeln!(&mut writer, "{SECTION}Values:{SECTION:#}")?;
        let values = serde_json::Value::Object(DumpOptions::with_nulls().dump(instance));
        write_json(&mut writer, &values)?;
        writeln!(&mut writer)?;

        let result = instance.validate();
        match &result {
            Ok(()) => {
                writeln!(
                    &mut writer,
                    "{SECTION}Validation:{SECTION:#} {OK_LABEL}OK{OK_LABEL:#}"
                )?;
            }
            Err(errors) => {
                let label = if errors.len() == 1 { "Error" } else { "Errors" };
                writeln!(
                    &mut writer,
                    "{SECTION}Validation:{SECTION:#} {ERROR_LABEL}{count} {label}{ERROR_LABEL:#}",
                    count = errors.len()
                )?;
                for err in errors.iter() {
                    write_validation_error(&mut writer, err)?;
                }
            }
        }
        Ok(result)
    }
}

fn write_validation_error(writer: &mut impl io::Write, err: &ValidationError) -> io::Result<()> {
    writeln!(writer, "- {}", err.violation())?;
    let path = if err.path().is_empty() {
        "(root)"
    } else {
        err.path()
    };
    write!(writer, "  at {FIELD_PATH}{path}{FIELD_PATH:#}")?;
    if let Some(field) = err.field() {
        write!(writer, " (field: {field})")?;
    }
    writeln!(writer)
}
