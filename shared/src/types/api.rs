//! Compute API selection

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A compute API a benchmark body can be run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Api {
    OpenCl,
    LevelZero,
    /// CPU reference device, always available
    Host,
}

impl Api {
    /// All APIs, in the order tests are attempted
    pub const ALL: [Api; 3] = [Api::OpenCl, Api::LevelZero, Api::Host];

    pub fn name(&self) -> &'static str {
        match self {
            Api::OpenCl => "ocl",
            Api::LevelZero => "l0",
            Api::Host => "host",
        }
    }
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Api {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ocl" | "opencl" => Ok(Api::OpenCl),
            "l0" | "levelzero" | "level_zero" => Ok(Api::LevelZero),
            "host" => Ok(Api::Host),
            _ => Err(ParseError::UnknownApi(s.to_string())),
        }
    }
}

/// Which APIs the user asked to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ApiSelection {
    #[default]
    All,
    Only(Api),
}

impl ApiSelection {
    pub fn allows(&self, api: Api) -> bool {
        match self {
            ApiSelection::All => true,
            ApiSelection::Only(selected) => *selected == api,
        }
    }
}

impl std::str::FromStr for ApiSelection {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(ApiSelection::All);
        }
        s.parse().map(ApiSelection::Only)
    }
}

impl fmt::Display for ApiSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiSelection::All => f.write_str("all"),
            ApiSelection::Only(api) => write!(f, "{}", api),
        }
    }
}

impl TryFrom<String> for ApiSelection {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ApiSelection> for String {
    fn from(value: ApiSelection) -> Self {
        value.to_string()
    }
}
