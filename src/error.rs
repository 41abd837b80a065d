// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Io(String),
    Config(String),
    /// A catalog source is not well-formed. Fatal to the load that read it;
    /// an already published catalog is left untouched.
    MalformedCatalog { origin: String, reason: String },
    /// No catalog source exists for the requested locale.
    LocaleNotFound(String),
}

impl Error {
    pub(crate) fn malformed(origin: impl Into<String>, reason: impl fmt::Display) -> Self {
        Error::MalformedCatalog {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::MalformedCatalog { origin, reason } => {
                write!(f, "Malformed catalog {}: {}", origin, reason)
            }
            Error::LocaleNotFound(locale) => {
                write!(f, "No catalog found for locale {}", locale)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_io_error() {
        let err = Error::Io("disk failure".to_string());
        assert_eq!(format!("{}", err), "I/O Error: disk failure");
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_error = std::io::Error::other("boom");
        let err: Error = io_error.into();
        match err {
            Error::Io(message) => assert!(message.contains("boom")),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn config_error_formats_properly() {
        let err = Error::Config("bad field".into());
        assert_eq!(format!("{}", err), "Config Error: bad field");
    }

    #[test]
    fn malformed_catalog_names_its_origin() {
        let err = Error::malformed("dde-desktop_bg.ts", "unexpected end of document");
        assert_eq!(
            format!("{}", err),
            "Malformed catalog dde-desktop_bg.ts: unexpected end of document"
        );
    }

    #[test]
    fn locale_not_found_display() {
        let err = Error::LocaleNotFound("fr_CA".to_string());
        assert!(format!("{}", err).contains("fr_CA"));
    }
}
