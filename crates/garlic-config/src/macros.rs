/// Defines a model type together with its [registry](crate::ModelSchema).
///
/// The macro produces a unit struct implementing [`Model`](crate::Model). Each field is declared as
/// `identifier: field_builder` where `field_builder` is an expression evaluating to a [`FieldBuilder`](crate::FieldBuilder).
/// Doc comments on the model and on fields are used as descriptions. Ancestor models are listed after a colon;
/// see the [`schema`](crate::schema#inheritance) module docs for how fields of ancestors are merged.
///
/// Field identifiers are checked in compile time: they must be non-empty, consist of lowercase ASCII
/// alphanumeric chars or underscore and not start with a digit (i.e., follow the `[a-z_][a-z0-9_]*` regex).
/// Other definition errors (e.g., an invalid default value) are detected when the registry is first accessed
/// and result in a panic.
///
/// # Examples
///
/// ```
/// use garlic_config::{field::StringField, model, Field, Model};
///
/// model! {
///     /// Base settings.
///     pub struct BaseSettings {
///         verbose: Field::boolean().with_default(false),
///     }
/// }
///
/// model! {
///     /// Service settings.
///     pub struct ServiceSettings: BaseSettings {
///         /// Deployment environment.
///         env: Field::builder(StringField::with_choices(["dev", "prod"])).with_default("dev"),
///         /// Ports to listen on.
///         ports: Field::array(Field::integer()).required(),
///     }
/// }
///
/// let settings = ServiceSettings::new_instance();
/// assert_eq!(*settings.get("env").unwrap(), "dev");
/// assert_eq!(*settings.get("verbose").unwrap(), false);
/// assert_eq!(ServiceSettings::schema().help(), "Service settings.");
/// ```
///
/// ## Compilation-time checks
///
/// ```compile_fail
/// garlic_config::model! {
///     pub struct Invalid {
///         // Compilation error: identifier `isWorking` ... is invalid
///         isWorking: garlic_config::Field::boolean(),
///     }
/// }
/// ```
#[macro_export]
macro_rules! model {
    (
        $(#[doc = $doc:literal])*
        $vis:vis struct $name:ident $(: $($parent:ty),+)? {
            $(
            $(#[doc = $field_doc:literal])*
            $field:ident : $definition:expr
            ),* $(,)?
        }
    ) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        $vis struct $name;

        const _: () = {
            $(
            $crate::schema::_private::assert_field_name(::core::stringify!($name), ::core::stringify!($field));
            )*
        };

        impl $crate::Model for $name {
            const NAME: &'static str = ::core::stringify!($name);

            fn schema() -> &'static $crate::ModelSchema {
                static SCHEMA: ::std::sync::OnceLock<$crate::ModelSchema> = ::std::sync::OnceLock::new();

                $crate::schema::_private::get_or_build::<Self>(&SCHEMA, || {
                    $crate::ModelSchema::builder::<Self>()
                        .help_lines(&[$($doc),*])
                        $($( .extends::<$parent>() )+)?
                        $(
                        .field_with_help(::core::stringify!($field), $definition, &[$($field_doc),*])
                        )*
                        .build()
                })
            }
        }
    };
}

/// Creates a plain document based on the provided list of path–value tuples.
/// This is a more specialized version of [`json!`](serde_json::json!) convenient for nested configurations.
///
/// A path must be a string literal, with segments separated by dots `.`. A value can be anything
/// implementing [`Serialize`](serde::Serialize). Paths in a macro cannot coincide or be embedded into each other.
/// The value produced by macro has [`serde_json::Value`] type; it's always an object.
///
/// # Examples
///
/// ```
/// let document = garlic_config::document!(
///     "name": "Peyman",
///     "info.age": 30,
///     "info.working": true,
///     "info.kids": [serde_json::json!({ "name": "Sam" })],
/// );
/// assert_eq!(
///     document,
///     serde_json::json!({
///         "name": "Peyman",
///         "info": { "age": 30, "working": true, "kids": [{ "name": "Sam" }] },
///     })
/// );
/// ```
///
/// ## Compilation-time checks
///
/// ```compile_fail
/// let document = garlic_config::document!(
///     "info": false,
///     "info.age": 123,
///     // Compilation error: Path #0 `info` is a prefix of path #1 `info.age`
/// );
/// ```
#[macro_export]
macro_rules! document {
    ($($path:tt : $value:expr),* $(,)?) => {
        {
            const _: () = {
                $crate::schema::_private::assert_paths(&[$($path,)*]);
            };

            #[allow(unused_mut)]
            let mut document = $crate::value::JsonObject::new();
            $(
            $crate::value::insert_serialized(&mut document, $path, $value);
            )*
            $crate::_reexports::serde_json::Value::Object(document)
        }
    };
}
