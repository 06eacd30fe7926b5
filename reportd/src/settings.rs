use thiserror::Error;

/// Runtime-adjustable options, mutated through the `set` console command.
#[derive(Debug, Clone, Default)]
pub struct ReportSettings {
    /// Log every broadcast record at info level.
    pub verbose: bool,
    /// Serial device of the modem AT channel. `None` disables polling
    /// entirely.
    pub gsm_dev: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("invalid value `{value}` for `{option}`, expected {expected}")]
    InvalidValue {
        option: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl ReportSettings {
    /// Apply one `set <option> <value>` mutation. `gsm_dev` accepts a device
    /// path or `none` to unset it.
    pub fn set(&mut self, option: &str, value: &str) -> Result<(), SettingsError> {
        match option {
            "verbose" => {
                self.verbose =
                    value.parse().map_err(|_| SettingsError::InvalidValue {
                        option: "verbose",
                        value: value.to_owned(),
                        expected: "true or false",
                    })?;
            }
            "gsm_dev" => {
                self.gsm_dev = if value == "none" {
                    None
                } else {
                    Some(value.to_owned())
                };
            }
            _ => return Err(SettingsError::UnknownOption(option.to_owned())),
        }
        Ok(())
    }

    /// One `name = value` line per option, for the console listing.
    pub fn render(&self) -> String {
        format!(
            "verbose = {}\ngsm_dev = {}",
            self.verbose,
            self.gsm_dev.as_deref().unwrap_or("none")
        )
    }
}
