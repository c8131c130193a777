use serde::{Deserialize, Serialize};

use super::record::{Collection, Record};

/// Visningsnamn för ägare som inte finns i teamet
pub const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
}

impl TeamMember {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: role.into(),
        }
    }

    /// Standardteamet som skrivs vid första start
    pub fn default_team() -> Vec<Self> {
        vec![
            Self::new("weston", "Weston", "PLM Lead"),
            Self::new("maria", "Maria", "Field Engineer"),
            Self::new("dev", "Dev", "Document Control"),
        ]
    }
}

impl Record for TeamMember {
    const COLLECTION: Collection = Collection::TeamMembers;

    fn key(&self) -> String {
        self.id.clone()
    }
}
