//! Device selection flags
//!
//! A selection may name several devices at once (e.g. `tile0|tile1` for a
//! context spanning two sub-devices), but queues can only live on one.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceSelection(u8);

impl DeviceSelection {
    pub const HOST: Self = Self(1 << 0);
    pub const ROOT: Self = Self(1 << 1);
    pub const TILE0: Self = Self(1 << 2);
    pub const TILE1: Self = Self(1 << 3);
    pub const TILE2: Self = Self(1 << 4);
    pub const TILE3: Self = Self(1 << 5);

    const NAMED: [(Self, &'static str); 6] = [
        (Self::HOST, "host"),
        (Self::ROOT, "root"),
        (Self::TILE0, "tile0"),
        (Self::TILE1, "tile1"),
        (Self::TILE2, "tile2"),
        (Self::TILE3, "tile3"),
    ];

    const SUB_DEVICES: [Self; 4] = [Self::TILE0, Self::TILE1, Self::TILE2, Self::TILE3];

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn has_single_device(&self) -> bool {
        self.0.count_ones() == 1
    }

    /// Index of a single sub-device selection (`tile2` -> 2)
    pub fn sub_device_index(&self) -> Option<usize> {
        Self::SUB_DEVICES.iter().position(|tile| tile == self)
    }

    /// Number of sub-devices named by this selection
    pub fn sub_device_count(&self) -> usize {
        Self::SUB_DEVICES
            .iter()
            .filter(|tile| self.contains(**tile))
            .count()
    }
}

impl BitOr for DeviceSelection {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for DeviceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            f.write_str("unknown")
        } else {
            f.write_str(&names.join("|"))
        }
    }
}

impl std::str::FromStr for DeviceSelection {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut selection = Self::default();
        for part in s.split('|') {
            let part = part.trim().to_lowercase();
            let flag = Self::NAMED
                .iter()
                .find(|(_, name)| *name == part)
                .map(|(flag, _)| *flag)
                .ok_or_else(|| ParseError::UnknownDeviceSelection(s.to_string()))?;
            selection = selection | flag;
        }
        Ok(selection)
    }
}

impl TryFrom<String> for DeviceSelection {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DeviceSelection> for String {
    fn from(value: DeviceSelection) -> Self {
        value.to_string()
    }
}
