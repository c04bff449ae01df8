//! Permission bits written the way `chmod` reads them

use super::SyncError;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;

/// Permission bits parsed from an octal digit sequence.
///
/// The config value `644` (integer or string) means `0o644`, never decimal
/// 644. `Display` renders the digits back (`644`), which is the form the
/// sync tool's `--chmod` expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode(u32);

impl Mode {
    /// Highest value accepted: setuid/setgid/sticky plus rwx for everyone.
    pub const MAX: u32 = 0o7777;

    /// Built-in file mode
    pub const FILE: Mode = Mode(0o644);

    /// Built-in directory mode
    pub const DIR: Mode = Mode(0o755);

    /// Parse a digit sequence such as `"644"` or `"0755"` as octal.
    pub fn from_digits(digits: &str) -> Result<Self, SyncError> {
        let trimmed = digits.trim();
        let bits = u32::from_str_radix(trimmed, 8)
            .map_err(|_| SyncError::InvalidMode(digits.to_string()))?;
        if trimmed.is_empty() || trimmed.starts_with('+') || bits > Self::MAX {
            return Err(SyncError::InvalidMode(digits.to_string()));
        }
        Ok(Self(bits))
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:o}", self.0)
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ModeVisitor;

        impl Visitor<'_> for ModeVisitor {
            type Value = Mode;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("octal permission digits such as 644 or \"0755\"")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Mode, E> {
                Mode::from_digits(&value.to_string()).map_err(E::custom)
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Mode, E> {
                if value < 0 {
                    return Err(E::custom(SyncError::InvalidMode(value.to_string())));
                }
                self.visit_u64(value as u64)
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Mode, E> {
                Mode::from_digits(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(ModeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Holder {
        mode: Mode,
    }

    #[test]
    fn test_digits_are_octal() {
        assert_eq!(Mode::from_digits("644").unwrap().bits(), 0o644);
        assert_eq!(Mode::from_digits("755").unwrap().bits(), 0o755);
        assert_eq!(Mode::from_digits("0700").unwrap().bits(), 0o700);
        assert_ne!(Mode::from_digits("644").unwrap().bits(), 644);
    }

    #[test]
    fn test_display_round_trips_digits() {
        assert_eq!(Mode::FILE.to_string(), "644");
        assert_eq!(Mode::DIR.to_string(), "755");
        assert_eq!(Mode::from_digits("0600").unwrap().to_string(), "600");
    }

    #[test]
    fn test_rejects_non_octal_digits() {
        assert!(matches!(
            Mode::from_digits("648"),
            Err(SyncError::InvalidMode(_))
        ));
        assert!(Mode::from_digits("rw-r--r--").is_err());
        assert!(Mode::from_digits("").is_err());
        assert!(Mode::from_digits("+644").is_err());
        assert!(Mode::from_digits("17777").is_err());
    }

    #[test]
    fn test_deserialize_integer_as_octal_digits() {
        let holder: Holder = toml::from_str("mode = 640").unwrap();
        assert_eq!(holder.mode.bits(), 0o640);
    }

    #[test]
    fn test_deserialize_string() {
        let holder: Holder = toml::from_str("mode = \"0750\"").unwrap();
        assert_eq!(holder.mode.bits(), 0o750);
    }

    #[test]
    fn test_deserialize_rejects_bad_values() {
        assert!(toml::from_str::<Holder>("mode = 999").is_err());
        assert!(toml::from_str::<Holder>("mode = -1").is_err());
        assert!(toml::from_str::<Holder>("mode = true").is_err());
    }
}
