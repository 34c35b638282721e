use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, warn};

use crate::engine::intent_parser::{parse_intent, pluralize};
use crate::model::house::House;
use crate::model::intent::ParsedIntent;
use crate::model::outcome::AwardOutcome;
use crate::model::persona::SpecialSubject;
use crate::store::points_store::{PointsRecord, PointsStore, StoreError};

pub const MAX_POINTS: i64 = 1200;

const PLACES: [&str; 4] = ["first", "second", "third", "fourth"];

pub fn clamp(value: i64, lo: i64, hi: i64) -> i64 {
    value.max(lo).min(hi)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    /// 1 is first place.
    pub ordinal: usize,
    pub house: House,
    pub score: i64,
}

/// Running house tally plus the rules for changing it.
#[derive(Debug)]
pub struct PointLedger {
    points: BTreeMap<House, i64>,
    prefects: HashSet<String>,
    subjects: Vec<SpecialSubject>,
    dirty: bool,
}

impl PointLedger {
    pub fn new(prefects: Vec<String>, subjects: Vec<SpecialSubject>) -> Self {
        Self {
            points: BTreeMap::new(),
            prefects: prefects.into_iter().collect(),
            subjects,
            dirty: false,
        }
    }

    /// Start from whatever the store holds. A store that cannot be read
    /// is not fatal: the ledger starts empty.
    pub fn load(
        store: &dyn PointsStore,
        prefects: Vec<String>,
        subjects: Vec<SpecialSubject>,
    ) -> Self {
        let mut ledger = Self::new(prefects, subjects);

        match store.load() {
            Ok(Some(record)) => ledger.restore(&record),
            Ok(None) => info!("no stored points found, starting from an empty tally"),
            Err(e) => warn!(error = %e, "failed to read points, starting from an empty tally"),
        }

        ledger
    }

    fn restore(&mut self, record: &PointsRecord) {
        let Some(scores) = record.first() else {
            warn!("stored points record is empty");
            return;
        };

        for (name, score) in scores {
            let Some(house) = House::from_name(name) else {
                warn!(house = %name, "ignoring unknown house in stored points");
                continue;
            };
            self.points.insert(house, clamp(*score, 0, MAX_POINTS));
        }

        info!(points = ?self.points, "restored points");
    }

    pub fn is_prefect(&self, sender_id: &str) -> bool {
        self.prefects.contains(sender_id)
    }

    pub fn award(&mut self, message: &str, sender_id: &str) -> Vec<AwardOutcome> {
        let intent = parse_intent(message, &self.subjects);
        let prefect = self.is_prefect(sender_id);
        debug!(?intent, sender = sender_id, prefect, "parsed message");

        // only prefects can move more than one point at a time
        let mut delta = intent.signed_amount();
        if !prefect {
            delta = clamp(delta, -1, 1);
        }

        if delta != 0 && !intent.houses.is_empty() {
            let persona = if prefect {
                intent
                    .special_subject
                    .as_deref()
                    .and_then(|key| self.subject(key))
                    .cloned()
            } else {
                None
            };
            return self.apply(&intent, delta, sender_id, persona.as_ref());
        }

        if intent.houses.is_empty() && delta == 0 && prefect {
            if let (Some(persona_key), Some(text)) = (intent.special_subject, intent.utterance) {
                return vec![AwardOutcome::PersonaUtterance { text, persona_key }];
            }
        }

        Vec::new()
    }

    fn apply(
        &mut self,
        intent: &ParsedIntent,
        delta: i64,
        sender_id: &str,
        persona: Option<&SpecialSubject>,
    ) -> Vec<AwardOutcome> {
        let mut outcomes = Vec::new();
        let tag = persona.map(|p| p.key.clone());

        for &house in &intent.houses {
            let current = self.score(house);
            let wanted = current.saturating_add(delta);
            let stored = clamp(wanted, 0, MAX_POINTS);
            self.points.insert(house, stored);
            self.dirty = true;
            info!(%house, delta, score = stored, sender = sender_id, "points changed");

            let text = match persona {
                Some(p) => persona_line(p, house, delta, intent.reason.as_deref()),
                None => mention_line(house, delta, sender_id),
            };
            outcomes.push(AwardOutcome::GroupAnnouncement {
                text,
                persona: tag.clone(),
            });

            if wanted > MAX_POINTS {
                outcomes.push(AwardOutcome::GroupAnnouncement {
                    text: format!("{} already has the maximum number of points!", house),
                    persona: tag.clone(),
                });
            } else if wanted < 0 {
                outcomes.push(AwardOutcome::GroupAnnouncement {
                    text: format!("{} already has no points left!", house),
                    persona: tag.clone(),
                });
            }
        }

        outcomes
    }

    fn subject(&self, key: &str) -> Option<&SpecialSubject> {
        self.subjects.iter().find(|s| s.key.eq_ignore_ascii_case(key))
    }

    pub fn score(&self, house: House) -> i64 {
        self.points.get(&house).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> BTreeMap<House, i64> {
        House::ALL.into_iter().map(|h| (h, self.score(h))).collect()
    }

    pub fn ranked_standings(&self) -> Vec<Standing> {
        let mut ranked: Vec<(House, i64)> = self.snapshot().into_iter().collect();
        ranked.sort_by_key(|(house, score)| (*score, Reverse(house.name())));

        let count = ranked.len();
        let mut standings: Vec<Standing> = ranked
            .into_iter()
            .enumerate()
            .map(|(index, (house, score))| Standing {
                ordinal: count - index,
                house,
                score,
            })
            .collect();
        standings.reverse();
        standings
    }

    pub fn standings_lines(&self) -> Vec<String> {
        self.ranked_standings()
            .into_iter()
            .map(|s| {
                let place = PLACES
                    .get(s.ordinal - 1)
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| format!("#{}", s.ordinal));
                format!("In {} place, {} with {}", place, s.house, pluralize(s.score))
            })
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_persisted(&mut self) {
        self.dirty = false;
    }

    /// Clears every score. Counts as a mutation so the empty tally gets flushed.
    pub fn reset(&mut self) {
        self.points.clear();
        self.dirty = true;
    }

    /// Stored as a one-element array, the shape the points dataset expects.
    pub fn to_record(&self) -> PointsRecord {
        vec![self
            .points
            .iter()
            .map(|(house, score)| (house.name().to_string(), *score))
            .collect()]
    }

    /// Saves when something changed since the last flush. Dirty stays set
    /// if the store fails, so the next flush retries.
    pub fn flush(&mut self, store: &dyn PointsStore) -> Result<bool, StoreError> {
        if !self.dirty {
            return Ok(false);
        }
        store.save(&self.to_record())?;
        self.mark_persisted();
        Ok(true)
    }
}

fn mention_line(house: House, delta: i64, sender_id: &str) -> String {
    let verb = if delta > 0 { "gets" } else { "loses" };
    let line = format!("{} {} {}", house, verb, pluralize(delta.abs()));
    if sender_id.is_empty() {
        line
    } else {
        format!("<@{}> {}", sender_id, line)
    }
}

fn persona_line(persona: &SpecialSubject, house: House, delta: i64, reason: Option<&str>) -> String {
    let (verb, direction, icons) = if delta > 0 {
        ("awards", "to", house.party_emoji())
    } else {
        let others: Vec<String> = House::ALL
            .into_iter()
            .filter(|h| *h != house)
            .map(|h| h.party_emoji())
            .collect();
        ("takes away", "from", others.join(" "))
    };

    let reason = reason
        .map(|r| format!(" for {}", r))
        .unwrap_or_default();

    format!(
        "{} {} {} {}{}! {} {}",
        verb,
        pluralize(delta.abs()),
        direction,
        house,
        reason,
        persona.marker,
        icons
    )
}
