use serde::{Deserialize, Serialize};

/// A persona a prefect may speak as, e.g. "Dumbledore awards 10 points to ...".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialSubject {
    /// Matched against the first two words of a message, case-insensitively.
    pub key: String,
    pub display_name: String,
    /// Emoji appended to announcements made as this persona.
    pub marker: String,
}

impl SpecialSubject {
    pub fn new(key: &str, display_name: &str, marker: &str) -> Self {
        Self {
            key: key.to_lowercase(),
            display_name: display_name.into(),
            marker: marker.into(),
        }
    }

    pub fn defaults() -> Vec<SpecialSubject> {
        vec![
            SpecialSubject::new("dumbledore", "Albus Dumbledore", ":dumbledore:"),
            SpecialSubject::new("mcgonagall", "Minerva McGonagall", ":mcgonagall:"),
            SpecialSubject::new("filch", "Argus Filch", ":filch:"),
        ]
    }
}
