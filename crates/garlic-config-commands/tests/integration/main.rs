//! Integration tests for `garlic-config-commands`.

use anstream::AutoStream;
use garlic_config::{codec, Model, Violation};
use garlic_config_commands::{FieldRef, Printer};
use test_casing::test_casing;

use crate::configs::{mock_document, TestConfig};

mod configs;

fn print_help(filter: impl FnMut(FieldRef<'_>) -> bool) -> String {
    let mut buffer = vec![];
    Printer::custom(AutoStream::never(&mut buffer))
        .print_help(TestConfig::schema(), filter)
        .unwrap();
    String::from_utf8(buffer).unwrap()
}

#[test]
fn full_config_help() {
    let buffer = print_help(|_| true);
    let expected = r#"app_name [TestConfig]
  Type: string [StringField]
  Default: "app"
  Application name.

dir_paths [TestConfig]
  Type: array [ArrayField]
    Array items: string [StringField]
  Default: ["/usr/bin"]
  Directory paths.

exit_on_error [TestConfig]
  Type: Boolean [BooleanField]
  Default: true

method_limits [TestConfig]
  Type: array [ArrayField]
    Array items: object [ModelField]; model: MethodLimit
  Rate limits for RPC methods.

method_limits.*.method [MethodLimit]
  Type: string [StringField]; required

method_limits.*.rps [MethodLimit]
  Type: integer [IntegerField]; domain: [1, 1000]
  Default: 10

object_store.bucket_name [ObjectStoreConfig]
  Type: string [StringField]; required
  Bucket name.

object_store.kind [ObjectStoreConfig]
  Type: string [StringField]; choices: 'local', 'gcs', 's3'
  Default: "local"
  Store type.

port [TestConfig]
  Type: integer [IntegerField]; required; domain: [1, 65535]
  Port to bind to.

"#;
    assert_eq!(buffer, expected);
}

#[test_casing(3, [("store", 2), ("method_limits", 3), ("rps", 1)])]
#[test]
fn filtered_config_help(needle: &str, expected_count: usize) {
    let mut visited_paths = vec![];
    let buffer = print_help(|field| {
        visited_paths.push(field.path().to_owned());
        field.path().contains(needle)
    });
    assert_eq!(visited_paths.len(), 9, "{visited_paths:?}");

    let printed_paths: Vec<_> = buffer
        .split("\n\n")
        .filter_map(|block| block.lines().next())
        .filter(|line| !line.is_empty())
        .collect();
    assert_eq!(printed_paths.len(), expected_count, "{buffer}");
    for path in printed_paths {
        assert!(path.contains(needle), "{path}");
    }
}

#[test]
fn filtering_by_model() {
    let buffer = print_help(|field| field.model_name() == "ObjectStoreConfig");
    assert!(buffer.starts_with("object_store.bucket_name [ObjectStoreConfig]\n"), "{buffer}");
    assert!(!buffer.contains("[TestConfig]"), "{buffer}");
}

#[test]
fn full_config_debug() {
    let instance = TestConfig::load(&mock_document(false)).unwrap();
    let mut buffer = vec![];
    Printer::custom(AutoStream::never(&mut buffer))
        .print_debug(&instance)
        .unwrap()
        .unwrap();
    let buffer = String::from_utf8(buffer).unwrap();

    let expected = r#"Model: TestConfig
Values:
{
  "app_name": "test",
  "dir_paths": [
    "/usr/bin"
  ],
  "exit_on_error": true,
  "method_limits": [
    {
      "method": "eth_getLogs",
      "rps": 100
    }
  ],
  "object_store": {
    "bucket_name": "test-bucket",
    "kind": "local"
  },
  "port": 3000
}
Validation: OK
"#;
    assert_eq!(buffer, expected);
}

#[test]
fn erroneous_config_debug() {
    let instance = TestConfig::load(&mock_document(true)).unwrap();
    let mut buffer = vec![];
    let errors = Printer::custom(AutoStream::never(&mut buffer))
        .print_debug(&instance)
        .unwrap()
        .unwrap_err();
    let buffer = String::from_utf8(buffer).unwrap();

    assert_eq!(errors.len(), 3);
    assert!(matches!(errors.first().violation(), Violation::OutOfDomain { value: 0, .. }));
    assert!(buffer.contains("\"bucket_name\": null"), "{buffer}");

    let (_, validation) = buffer.split_once("Validation: ").unwrap();
    let expected = "3 Errors
- value 0 is outside the allowed domain [1, 1000]
  at method_limits.0.rps (field: rps)
- value is not allowed to be null
  at object_store.bucket_name (field: bucket_name)
- value 100000 is outside the allowed domain [1, 65535]
  at port (field: port)
";
    assert_eq!(validation, expected);
}

#[test_casing(2, [false, true])]
#[test]
fn printing_dumped_config(yaml: bool) {
    let instance = TestConfig::load(&mock_document(false)).unwrap();
    let json = serde_json::Value::Object(instance.dump());

    let mut buffer = vec![];
    let mut printer = Printer::custom(AutoStream::never(&mut buffer));
    if yaml {
        printer.print_yaml(&json).unwrap();
    } else {
        printer.print_json(&json).unwrap();
    }
    drop(printer);
    let buffer = String::from_utf8(buffer).unwrap();

    // The printed document must describe the same instance.
    let restored = if yaml {
        codec::decode(&buffer, TestConfig::schema(), &codec::Yaml)
    } else {
        codec::decode(&buffer, TestConfig::schema(), &codec::Json::pretty())
    };
    assert_eq!(restored.unwrap(), instance);
}
