//! ModelCapabilities structure

use std::fmt;

use serde::{Deserialize, Serialize};

/// One declarable model capability
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    Multiturn,
    SystemRole,
    Tools,
    Media,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Multiturn => "multiturn",
            Self::SystemRole => "system role",
            Self::Tools => "tools",
            Self::Media => "media",
        })
    }
}

/// Capabilities declared once at model registration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ModelCapabilities {
    pub multiturn: bool,
    pub system_role: bool,
    pub tools: bool,
    pub media: bool,
}

impl ModelCapabilities {
    /// Nothing declared (single-turn, text-only)
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything declared
    pub fn all() -> Self {
        Self {
            multiturn: true,
            system_role: true,
            tools: true,
            media: true,
        }
    }

    pub fn with_multiturn(mut self) -> Self {
        self.multiturn = true;
        self
    }
    pub fn with_system_role(mut self) -> Self {
        self.system_role = true;
        self
    }
    pub fn with_tools(mut self) -> Self {
        self.tools = true;
        self
    }
    pub fn with_media(mut self) -> Self {
        self.media = true;
        self
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Multiturn => self.multiturn,
            Capability::SystemRole => self.system_role,
            Capability::Tools => self.tools,
            Capability::Media => self.media,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_flags() {
        let caps = ModelCapabilities::new().with_system_role().with_media();
        assert!(caps.supports(Capability::Media));
        assert!(caps.supports(Capability::SystemRole));
        assert!(!caps.supports(Capability::Multiturn));
        assert!(!caps.supports(Capability::Tools));
    }

    #[test]
    fn all_supports_everything() {
        let caps = ModelCapabilities::all();
        for c in [
            Capability::Multiturn,
            Capability::SystemRole,
            Capability::Tools,
            Capability::Media,
        ] {
            assert!(caps.supports(c));
        }
    }
}
