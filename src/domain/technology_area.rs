use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The controlled vocabulary for technology areas.
///
/// The variant names double as the backend's canonical tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TechnologyArea {
    /// Databases.
    BancoDeDados,
    /// Linux and other Unix hosts.
    Linux,
    /// Windows hosts.
    Windows,
    /// Networking.
    Redes,
}

impl TechnologyArea {
    /// Every area, in display order.
    pub const ALL: [Self; 4] = [Self::BancoDeDados, Self::Linux, Self::Windows, Self::Redes];

    /// The canonical wire token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BancoDeDados => "BancoDeDados",
            Self::Linux => "Linux",
            Self::Windows => "Windows",
            Self::Redes => "Redes",
        }
    }

    /// The human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BancoDeDados => "Banco de Dados",
            Self::Linux => "Linux",
            Self::Windows => "Windows",
            Self::Redes => "Redes",
        }
    }

    /// Maps free text onto an area using the synonym table.
    ///
    /// Tries an exact match on the trimmed, lower-cased input first, then the
    /// first synonym contained in it (in table order).
    #[must_use]
    pub fn recognise(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        SYNONYMS
            .iter()
            .find(|(synonym, _)| *synonym == needle)
            .or_else(|| {
                SYNONYMS
                    .iter()
                    .find(|(synonym, _)| needle.contains(synonym))
            })
            .map(|(_, area)| *area)
    }
}

impl fmt::Display for TechnologyArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a canonical technology-area token.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown technology area '{0}': expected one of BancoDeDados, Linux, Windows, Redes")]
pub struct UnknownAreaError(String);

impl FromStr for TechnologyArea {
    type Err = UnknownAreaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|area| area.as_str() == s)
            .ok_or_else(|| UnknownAreaError(s.to_string()))
    }
}

// Order matters for the containment pass.
const SYNONYMS: &[(&str, TechnologyArea)] = &[
    ("banco de dados", TechnologyArea::BancoDeDados),
    ("bancodedados", TechnologyArea::BancoDeDados),
    ("banco dados", TechnologyArea::BancoDeDados),
    ("bd", TechnologyArea::BancoDeDados),
    ("database", TechnologyArea::BancoDeDados),
    ("databases", TechnologyArea::BancoDeDados),
    ("sql", TechnologyArea::BancoDeDados),
    ("oracle", TechnologyArea::BancoDeDados),
    ("mysql", TechnologyArea::BancoDeDados),
    ("postgresql", TechnologyArea::BancoDeDados),
    ("linux", TechnologyArea::Linux),
    ("unix", TechnologyArea::Linux),
    ("centos", TechnologyArea::Linux),
    ("ubuntu", TechnologyArea::Linux),
    ("debian", TechnologyArea::Linux),
    ("redhat", TechnologyArea::Linux),
    ("rhel", TechnologyArea::Linux),
    ("windows", TechnologyArea::Windows),
    ("win", TechnologyArea::Windows),
    ("window", TechnologyArea::Windows),
    ("server", TechnologyArea::Windows),
    ("redes", TechnologyArea::Redes),
    ("network", TechnologyArea::Redes),
    ("rede", TechnologyArea::Redes),
    ("networking", TechnologyArea::Redes),
    ("cisco", TechnologyArea::Redes),
    ("firewall", TechnologyArea::Redes),
    ("switch", TechnologyArea::Redes),
    ("router", TechnologyArea::Redes),
];

/// Normalises a free-text technology area to its canonical token.
///
/// Values that match nothing are returned unchanged, so this never loses
/// information and never turns a non-empty value into an empty one.
///
/// ```
/// use rdm::normalize_technology_area;
///
/// assert_eq!(normalize_technology_area("banco de dados"), "BancoDeDados");
/// assert_eq!(normalize_technology_area(" Ubuntu 22.04 "), "Linux");
/// assert_eq!(normalize_technology_area("unknown-value"), "unknown-value");
/// ```
#[must_use]
pub fn normalize_technology_area(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    if let Some(area) = TechnologyArea::recognise(raw) {
        return area.as_str().to_string();
    }
    if let Ok(area) = raw.parse::<TechnologyArea>() {
        return area.as_str().to_string();
    }
    raw.to_string()
}
