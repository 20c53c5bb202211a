//! Declared diagram entities.

use std::{fmt, str::FromStr};

use serde::Serialize;

/// The closed set of declaration kinds recognized in diagram sources.
///
/// The names match the C4-PlantUML macro keywords through [`EntityKind::keyword`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Person,
    System,
    SystemExternal,
    Container,
    ContainerDatabase,
}

impl EntityKind {
    /// All kinds, in the order the parser tries their keywords.
    ///
    /// Longer keywords come before their prefixes (`ContainerDb` before `Container`).
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Person,
        EntityKind::SystemExternal,
        EntityKind::System,
        EntityKind::ContainerDatabase,
        EntityKind::Container,
    ];

    /// Returns the source keyword for this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            EntityKind::Person => "Person",
            EntityKind::System => "System",
            EntityKind::SystemExternal => "System_Ext",
            EntityKind::Container => "Container",
            EntityKind::ContainerDatabase => "ContainerDb",
        }
    }
}

impl FromStr for EntityKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Person" => Ok(Self::Person),
            "System" => Ok(Self::System),
            "System_Ext" => Ok(Self::SystemExternal),
            "Container" => Ok(Self::Container),
            "ContainerDb" => Ok(Self::ContainerDatabase),
            _ => Err("Unsupported entity kind"),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A declared actor, system or container.
///
/// Entities are created once per declaration statement and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    id: String,
    kind: EntityKind,
    display_name: String,
    description: String,
    technology: Option<String>,
    source_type: Option<String>,
}

impl Entity {
    /// Create a new Entity.
    pub fn new(
        id: impl Into<String>,
        kind: EntityKind,
        display_name: impl Into<String>,
        description: impl Into<String>,
        technology: Option<String>,
        source_type: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            display_name: display_name.into(),
            description: description.into(),
            technology,
            source_type,
        }
    }

    /// Get the entity identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the declaration kind.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Get the description text, verbatim as written in the source.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Get the optional fourth positional argument, verbatim.
    pub fn technology(&self) -> Option<&str> {
        self.technology.as_deref()
    }

    /// Get the coarse category tag used as a classifier feature, if declared.
    pub fn source_type(&self) -> Option<&str> {
        self.source_type.as_deref()
    }
}
