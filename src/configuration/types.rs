use serde::{Deserialize, Serialize};
use std::fmt;

/// Which store serves persistence from startup.
///
/// `Fallback` engages the local store before any database call is made;
/// `Durable` starts on the SQLite database and drops to the local store on
/// the first failure.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    Durable,
    #[default]
    Fallback,
}

impl StoreMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreMode::Durable => "durable",
            StoreMode::Fallback => "fallback",
        }
    }
}

impl fmt::Display for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
