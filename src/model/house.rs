use std::fmt;

/// One of the four houses competing for points.
///
/// Declaration order is the canonical order used for iteration and snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum House {
    Ravenclaw,
    Hufflepuff,
    Gryffindor,
    Slytherin,
}

impl House {
    pub const ALL: [House; 4] = [
        House::Ravenclaw,
        House::Hufflepuff,
        House::Gryffindor,
        House::Slytherin,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            House::Ravenclaw => "Ravenclaw",
            House::Hufflepuff => "Hufflepuff",
            House::Gryffindor => "Gryffindor",
            House::Slytherin => "Slytherin",
        }
    }

    /// Forgiving match for a single (lowercase) token.
    /// Any token containing the house stem counts, so "ravenclaws!" and
    /// "huffies" both resolve.
    pub fn from_token(token: &str) -> Option<House> {
        let token = token.to_lowercase();
        if token.contains("raven") {
            return Some(House::Ravenclaw);
        }
        if token.contains("huff") {
            return Some(House::Hufflepuff);
        }
        if token.contains("gryf") {
            return Some(House::Gryffindor);
        }
        if token.contains("slyt") {
            return Some(House::Slytherin);
        }
        None
    }

    /// Exact, case-insensitive lookup by canonical name.
    pub fn from_name(name: &str) -> Option<House> {
        House::ALL
            .into_iter()
            .find(|h| h.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn party_emoji(&self) -> String {
        format!(":party_{}:", self.name().to_lowercase())
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
