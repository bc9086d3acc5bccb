use std::fmt;

/// A social list identified by its owner and name, written "owner/listname"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSpec {
    pub owner: String,
    pub name: String,
}

impl ListSpec {
    /// Parse "owner/listname". Returns `None` unless there is exactly one `/`
    /// with text on both sides.
    pub fn parse(spec: &str) -> Option<Self> {
        let (owner, name) = spec.trim().split_once('/')?;
        let owner = owner.trim().trim_start_matches('@');
        let name = name.trim();

        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }

        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for ListSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
