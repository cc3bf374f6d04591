//! Command-line extensions for `garlic-config` library.
//!
//! The extensions are as follows:
//!
//! - [Printing help](Printer::print_help()) for model fields with optional filtering.
//! - [Debugging](Printer::print_debug()) model instances and their validation errors.
//! - Printing plain documents as [JSON](Printer::print_json()) or [YAML](Printer::print_yaml())
//!   with syntax highlighting.
//!
//! All extensions are encapsulated in [`Printer`].
//!
//! # Examples
//!
//! See the crate readme or the `examples` dir for captured output samples.
//!
//! ## Printing help
//!
//! ```
//! use garlic_config::{model, Field, Model};
//! use garlic_config_commands::Printer;
//!
//! model! {
//!     pub struct Settings {
//!         /// Port to bind to.
//!         port: Field::integer().with_default(8080),
//!     }
//! }
//!
//! Printer::stderr().print_help(Settings::schema(), |_| true)?;
//! # std::io::Result::Ok(())
//! ```
//!
//! ## Debugging instances
//!
//! ```
//! # use garlic_config::{model, Field, Model};
//! use garlic_config_commands::Printer;
//!
//! # model! {
//! #     pub struct Settings {
//! #         port: Field::integer().with_default(8080),
//! #     }
//! # }
//! let settings = Settings::load(&garlic_config::document!("port": 3000)).unwrap();
//! let validation_result = Printer::stderr().print_debug(&settings)?;
//! assert!(validation_result.is_ok());
//! # std::io::Result::Ok(())
//! ```

// Documentation settings
#![doc(html_root_url = "https://docs.rs/garlic-config-commands/0.1.0")]
// Linter settings
#![warn(missing_docs)]

use std::{
    io,
    io::{StderrLock, StdoutLock},
};

use anstream::{stream::RawStream, AutoStream};
use anstyle::Style;
use garlic_config::field::FieldDescription;

mod debug;
mod help;
mod utils;

const FIELD_PATH: Style = Style::new().bold();

/// Wrapper around an I/O writer. Will style the output with ANSI sequences if appropriate.
///
/// Internally, the printer is based on [`anstream`] / [`anstyle`]; see their docs to find out how styling support
/// is detected by default. (TL;DR: based on `NO_COLOR`, `CLICOLOR_FORCE` and `CLICOLOR` env vars, and whether
/// the output is a terminal.) If this detection doesn't work for you, you can always [create](Self::custom()) a fully custom `Printer`.
///
/// [`anstream`]: https://docs.rs/anstream/
/// [`anstyle`]: https://docs.rs/anstyle/
#[derive(Debug)]
pub struct Printer<W: RawStream> {
    writer: AutoStream<W>,
}

impl Printer<StdoutLock<'static>> {
    /// Creates a printer to stdout. The stdout is locked while the printer is alive!
    pub fn stdout() -> Self {
        Self {
            writer: AutoStream::auto(io::stdout()).lock(),
        }
    }
}

impl Printer<StderrLock<'static>> {
    /// Creates a printer to stderr. The stderr is locked while the printer is alive!
    pub fn stderr() -> Self {
        Self {
            writer: AutoStream::auto(io::stderr()).lock(),
        }
    }
}

impl<W: RawStream> Printer<W> {
    /// Creates a custom printer.
    pub fn custom(writer: AutoStream<W>) -> Self {
        Self { writer }
    }
}

/// Reference to a field encountered while printing help. Used to filter printed fields.
#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'a> {
    path: &'a str,
    model_name: &'static str,
    description: &'a FieldDescription,
}

impl<'a> FieldRef<'a> {
    /// Returns the dot-separated path to the field relative to the root model. Array elements
    /// are denoted by the `*` segment, e.g. `info.kids.*.name`.
    pub fn path(&self) -> &'a str {
        self.path
    }

    /// Returns the name of the model declaring this field.
    pub fn model_name(&self) -> &'static str {
        self.model_name
    }

    /// Returns the field description.
    pub fn description(&self) -> &'a FieldDescription {
        self.description
    }
}

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
