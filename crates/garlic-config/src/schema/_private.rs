//! Identifier and path validations used by the `model!` and `document!` macros. All checks are `const`
//! so that they can be performed in compile time.

use std::{fmt, sync::OnceLock};

use compile_fmt::{clip, clip_ascii, compile_args, compile_panic, Ascii, CompileArgs};

use super::{Model, ModelSchema};
use crate::error::DefinitionError;

const fn is_valid_start_name_char(ch: u8) -> bool {
    ch == b'_' || ch.is_ascii_lowercase()
}

const fn is_valid_name_char(ch: u8) -> bool {
    ch == b'_' || ch.is_ascii_lowercase() || ch.is_ascii_digit()
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum AllowedChars {
    NameStart,
    Name,
    Path,
}

impl AllowedChars {
    const fn as_str(self) -> Ascii<'static> {
        Ascii::new(match self {
            Self::NameStart => "[_a-z]",
            Self::Name => "[_a-z0-9]",
            Self::Path => "[_a-z0-9.]",
        })
    }
}

#[derive(Debug)]
pub(crate) enum NameError {
    Empty,
    NonAscii {
        pos: usize,
    },
    DisallowedChar {
        pos: usize,
        ch: char,
        allowed: AllowedChars,
    },
}

type ErrorArgs = CompileArgs<101>;

impl NameError {
    const fn to_args(&self) -> ErrorArgs {
        match *self {
            Self::Empty => compile_args!(capacity: ErrorArgs::CAPACITY, "name cannot be empty"),
            Self::NonAscii { pos } => compile_args!(
                capacity: ErrorArgs::CAPACITY,
                "name contains non-ASCII chars, first at position ",
                pos => compile_fmt::fmt::<usize>()
            ),
            Self::DisallowedChar { pos, ch, allowed } => compile_args!(
                "name contains a disallowed char '",
                ch => compile_fmt::fmt::<char>(),
                "' at position ", pos => compile_fmt::fmt::<usize>(),
                "; allowed chars are ",
                allowed.as_str() => clip_ascii(10, "")
            ),
        }
    }
}

impl fmt::Display for NameError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.to_args().as_str())
    }
}

pub(crate) const fn validate_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }

    let name_bytes = name.as_bytes();
    let mut pos = 0;
    while pos < name.len() {
        if name_bytes[pos] > 127 {
            return Err(NameError::NonAscii { pos });
        }
        let ch = name_bytes[pos];
        let is_disallowed = (pos == 0 && !is_valid_start_name_char(ch)) || !is_valid_name_char(ch);
        if is_disallowed {
            return Err(NameError::DisallowedChar {
                pos,
                ch: ch as char,
                allowed: if pos == 0 {
                    AllowedChars::NameStart
                } else {
                    AllowedChars::Name
                },
            });
        }
        pos += 1;
    }
    Ok(())
}

const fn validate_path(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }

    let name_bytes = name.as_bytes();
    let mut pos = 0;
    let mut is_segment_start = true;
    while pos < name.len() {
        if name_bytes[pos] > 127 {
            return Err(NameError::NonAscii { pos });
        }
        let ch = name_bytes[pos];

        let is_disallowed = (is_segment_start && !is_valid_start_name_char(ch))
            || (ch != b'.' && !is_valid_name_char(ch));
        if is_disallowed {
            return Err(NameError::DisallowedChar {
                pos,
                ch: ch as char,
                allowed: if is_segment_start {
                    AllowedChars::NameStart
                } else {
                    AllowedChars::Path
                },
            });
        }

        is_segment_start = ch == b'.';
        pos += 1;
    }
    Ok(())
}

const fn have_prefix_relation(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let mut i = 0;
    while i < a.len() && i < b.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }

    if a.len() == b.len() {
        true
    } else {
        (a.len() < b.len() && b[a.len()] == b'.') || (b.len() < a.len() && a[b.len()] == b'.')
    }
}

/// Checks that a field identifier declared in `model!` is valid.
#[track_caller]
pub const fn assert_field_name(model: &str, name: &str) {
    if let Err(err) = validate_name(name) {
        compile_panic!(
            "Identifier `", name => clip(32, "…"), "` of a field in model `",
            model => clip(32, "…"), "` is invalid: ",
            &err.to_args() => compile_fmt::fmt::<&ErrorArgs>()
        );
    }
}

/// Asserts document paths for the `document!` macro.
#[track_caller]
pub const fn assert_paths(paths: &[&str]) {
    let mut i = 0;
    while i < paths.len() {
        let path = paths[i];
        if let Err(err) = validate_path(path) {
            compile_panic!(
                "Path #", i => compile_fmt::fmt::<usize>(), " `", path => clip(32, "…"), "` is invalid: ",
                &err.to_args() => compile_fmt::fmt::<&ErrorArgs>()
            );
        }
        i += 1;
    }

    let mut i = 0;
    while i + 1 < paths.len() {
        let path = paths[i];
        let mut j = i + 1;
        while j < paths.len() {
            let other_path = paths[j];
            if have_prefix_relation(path, other_path) {
                let (short_i, short, long_i, long) = if path.len() < other_path.len() {
                    (i, path, j, other_path)
                } else {
                    (j, other_path, i, path)
                };

                compile_panic!(
                    "Path #", short_i => compile_fmt::fmt::<usize>(), " `", short => clip(32, "…"), "` is a prefix of path #",
                    long_i => compile_fmt::fmt::<usize>(), " `", long => clip(32, "…"), "`"
                );
            }
            j += 1;
        }
        i += 1;
    }
}

/// Returns the registry for `M`, building it on first access.
///
/// # Panics
///
/// Panics if the model definition is invalid. Such a definition is a programming error.
pub fn get_or_build<M: Model>(
    cell: &'static OnceLock<ModelSchema>,
    build: fn() -> Result<ModelSchema, DefinitionError>,
) -> &'static ModelSchema {
    cell.get_or_init(|| match build() {
        Ok(schema) => schema,
        Err(err) => panic!("model `{}` is defined incorrectly: {err}", M::NAME),
    })
}
