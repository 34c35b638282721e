/// What a single `award` call has to say back to the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AwardOutcome {
    /// A score line or a clamp notice. `persona` is set when a prefect
    /// addressed a special subject, and the line should be posted as them.
    GroupAnnouncement {
        text: String,
        persona: Option<String>,
    },

    /// "Dumbledore says ..." with no score change attached.
    PersonaUtterance {
        text: String,
        persona_key: String,
    },
}

impl AwardOutcome {
    pub fn text(&self) -> &str {
        match self {
            AwardOutcome::GroupAnnouncement { text, .. } => text,
            AwardOutcome::PersonaUtterance { text, .. } => text,
        }
    }

    pub fn persona(&self) -> Option<&str> {
        match self {
            AwardOutcome::GroupAnnouncement { persona, .. } => persona.as_deref(),
            AwardOutcome::PersonaUtterance { persona_key, .. } => Some(persona_key),
        }
    }

    /// Score changes are what trigger a fresh house cup chart.
    pub fn is_score_change(&self) -> bool {
        matches!(self, AwardOutcome::GroupAnnouncement { .. })
    }
}
