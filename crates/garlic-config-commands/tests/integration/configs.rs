use garlic_config::{
    document,
    field::{IntegerField, StringField},
    model, Field,
};
use serde_json::json;

model! {
    /// Object store settings.
    pub(crate) struct ObjectStoreConfig {
        /// Bucket name.
        bucket_name: Field::string().required(),
        /// Store type.
        kind: Field::builder(StringField::with_choices(["local", "gcs", "s3"])).with_default("local"),
    }
}

model! {
    pub(crate) struct MethodLimit {
        method: Field::string().required(),
        rps: Field::builder(IntegerField::with_domain(1..=1_000)).with_default(10),
    }
}

model! {
    /// Configuration with fields of several kinds.
    pub(crate) struct TestConfig {
        /// Port to bind to.
        port: Field::builder(IntegerField::with_domain(1..=65_535)).required(),
        /// Application name.
        app_name: Field::string().with_default("app"),
        /// Directory paths.
        dir_paths: Field::array(Field::string()).with_default(vec!["/usr/bin"]),
        exit_on_error: Field::boolean().with_default(true),
        /// Rate limits for RPC methods.
        method_limits: Field::array(Field::model::<MethodLimit>()),
        object_store: Field::model::<ObjectStoreConfig>(),
    }
}

pub(crate) fn mock_document(bogus: bool) -> serde_json::Value {
    if bogus {
        document!(
            "port": 100_000,
            "object_store.kind": "ftp",
            "method_limits": [json!({ "method": "eth_call", "rps": 0 })],
        )
    } else {
        document!(
            "port": 3000,
            "app_name": "test",
            "object_store.bucket_name": "test-bucket",
            "method_limits": [json!({ "method": "eth_getLogs", "rps": 100 })],
        )
    }
}
