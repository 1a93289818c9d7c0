//! Hardware engines a queue can be bound to

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Engine {
    // RenderCompute group
    Rcs,

    // Compute group
    Ccs0,
    Ccs1,
    Ccs2,
    Ccs3,

    // Copy group
    Bcs,

    // LinkCopy group
    Bcs1,
    Bcs2,
    Bcs3,
    Bcs4,
    Bcs5,
    Bcs6,
    Bcs7,
    Bcs8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineGroup {
    RenderCompute,
    Compute,
    Copy,
    LinkCopy,
}

impl EngineGroup {
    /// Parse the group name reported by a driver's queue family properties
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "rcs" | "cccs" => Some(EngineGroup::RenderCompute),
            "ccs" => Some(EngineGroup::Compute),
            "bcs" => Some(EngineGroup::Copy),
            "linked bcs" => Some(EngineGroup::LinkCopy),
            _ => None,
        }
    }
}

const COMPUTE_ENGINES: [Engine; 4] = [Engine::Ccs0, Engine::Ccs1, Engine::Ccs2, Engine::Ccs3];

const LINK_COPY_ENGINES: [Engine; 8] = [
    Engine::Bcs1,
    Engine::Bcs2,
    Engine::Bcs3,
    Engine::Bcs4,
    Engine::Bcs5,
    Engine::Bcs6,
    Engine::Bcs7,
    Engine::Bcs8,
];

/// Maximum number of blitters addressable by index (main + link engines)
pub const MAX_BLITTERS: usize = 1 + LINK_COPY_ENGINES.len();

impl Engine {
    pub fn group(&self) -> EngineGroup {
        match self {
            Engine::Rcs => EngineGroup::RenderCompute,
            Engine::Ccs0 | Engine::Ccs1 | Engine::Ccs2 | Engine::Ccs3 => EngineGroup::Compute,
            Engine::Bcs => EngineGroup::Copy,
            _ => EngineGroup::LinkCopy,
        }
    }

    pub fn index_within_group(&self) -> usize {
        match self.group() {
            EngineGroup::RenderCompute | EngineGroup::Copy => 0,
            EngineGroup::Compute => COMPUTE_ENGINES
                .iter()
                .position(|engine| engine == self)
                .unwrap_or(0),
            EngineGroup::LinkCopy => LINK_COPY_ENGINES
                .iter()
                .position(|engine| engine == self)
                .unwrap_or(0),
        }
    }

    /// Blitter number 0 is the main copy engine, 1..=8 are link copy engines.
    pub fn blitter_from_index(index: usize) -> Result<Engine, ParseError> {
        match index {
            0 => Ok(Engine::Bcs),
            i if i < MAX_BLITTERS => Ok(LINK_COPY_ENGINES[i - 1]),
            i => Err(ParseError::InvalidBlitterIndex(i)),
        }
    }

    pub fn link_copy_from_index(index: usize) -> Option<Engine> {
        LINK_COPY_ENGINES.get(index).copied()
    }

    pub fn is_main_copy_engine(&self) -> bool {
        *self == Engine::Bcs
    }

    pub fn is_copy_engine(&self) -> bool {
        matches!(self.group(), EngineGroup::Copy | EngineGroup::LinkCopy)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Engine::Rcs => "RCS",
            Engine::Ccs0 => "CCS0",
            Engine::Ccs1 => "CCS1",
            Engine::Ccs2 => "CCS2",
            Engine::Ccs3 => "CCS3",
            Engine::Bcs => "BCS",
            Engine::Bcs1 => "BCS1",
            Engine::Bcs2 => "BCS2",
            Engine::Bcs3 => "BCS3",
            Engine::Bcs4 => "BCS4",
            Engine::Bcs5 => "BCS5",
            Engine::Bcs6 => "BCS6",
            Engine::Bcs7 => "BCS7",
            Engine::Bcs8 => "BCS8",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blitter_from_index() {
        assert_eq!(Engine::blitter_from_index(0).unwrap(), Engine::Bcs);
        assert_eq!(Engine::blitter_from_index(1).unwrap(), Engine::Bcs1);
        assert_eq!(Engine::blitter_from_index(8).unwrap(), Engine::Bcs8);
        assert_eq!(
            Engine::blitter_from_index(9),
            Err(ParseError::InvalidBlitterIndex(9))
        );
    }

    #[test]
    fn test_groups_and_indices() {
        assert_eq!(Engine::Rcs.group(), EngineGroup::RenderCompute);
        assert_eq!(Engine::Ccs2.group(), EngineGroup::Compute);
        assert_eq!(Engine::Ccs2.index_within_group(), 2);
        assert_eq!(Engine::Bcs.group(), EngineGroup::Copy);
        assert_eq!(Engine::Bcs5.group(), EngineGroup::LinkCopy);
        assert_eq!(Engine::Bcs5.index_within_group(), 4);
        assert!(Engine::Bcs.is_main_copy_engine());
        assert!(!Engine::Bcs1.is_main_copy_engine());
        assert!(Engine::Bcs1.is_copy_engine());
        assert!(!Engine::Ccs0.is_copy_engine());
    }

    #[test]
    fn test_parse_group() {
        assert_eq!(EngineGroup::parse("cccs"), Some(EngineGroup::RenderCompute));
        assert_eq!(EngineGroup::parse("linked bcs"), Some(EngineGroup::LinkCopy));
        assert_eq!(EngineGroup::parse("vcs"), None);
    }

    #[test]
    fn test_engine_names() {
        assert_eq!(Engine::Bcs3.to_string(), "BCS3");
        assert_eq!(Engine::Ccs0.name(), "CCS0");
    }
}
