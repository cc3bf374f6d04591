use std::process;

use anstyle::{AnsiColor, Color, Style};
use clap::{Parser, ValueEnum};
use garlic_config::{codec, Model};
use garlic_config_commands::{FieldRef, Printer};

use crate::configs::{mock_document, TestConfig};

#[path = "../../tests/integration/configs.rs"]
mod configs;

#[derive(Debug, Parser)]
enum Cli {
    /// Prints configuration help.
    Print {
        /// Filter for field paths.
        filter: Option<String>,
    },
    /// Debugs configuration values.
    Debug {
        /// Whether to inject incorrect config values.
        #[arg(long)]
        bogus: bool,
    },
    /// Serializes the configuration.
    Serialize {
        /// Serialization format.
        #[arg(long, value_enum, default_value_t = SerializationFormat::Yaml)]
        format: SerializationFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SerializationFormat {
    Json,
    Yaml,
}

const ERROR: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));

fn main() {
    let cli = Cli::parse();

    match cli {
        Cli::Print { filter } => {
            let filter = |field: FieldRef<'_>| {
                filter
                    .as_ref()
                    .is_none_or(|needle| field.path().contains(needle.as_str()))
            };
            Printer::stderr()
                .print_help(TestConfig::schema(), filter)
                .unwrap();
        }
        Cli::Debug { bogus } => {
            let instance = TestConfig::load(&mock_document(bogus)).unwrap();
            let res = Printer::stderr().print_debug(&instance).unwrap();
            if let Err(err) = res {
                anstream::eprintln!(
                    "\n{ERROR}There were errors validating configuration:\n{err}{ERROR:#}"
                );
                process::exit(1);
            }
        }
        Cli::Serialize { format } => {
            let instance = TestConfig::load(&mock_document(false)).unwrap();
            let json = serde_json::Value::Object(instance.dump());
            let mut printer = Printer::stderr();
            match format {
                SerializationFormat::Json => printer.print_json(&json).unwrap(),
                SerializationFormat::Yaml => printer.print_yaml(&json).unwrap(),
            }

            // Check that the encoded configuration describes the same instance.
            let text = codec::encode(&instance, &codec::Yaml).unwrap();
            let restored = codec::decode(&text, TestConfig::schema(), &codec::Yaml).unwrap();
            assert_eq!(restored, instance);
        }
    }
}
