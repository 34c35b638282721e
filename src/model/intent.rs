use std::collections::BTreeSet;

use crate::model::house::House;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Award,
    Deduct,
    None,
}

impl Polarity {
    pub fn sign(&self) -> i64 {
        match self {
            Polarity::Award => 1,
            Polarity::Deduct => -1,
            Polarity::None => 0,
        }
    }
}

/// Structured reading of one chat message. Recomputed per message, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedIntent {
    pub amount: u64,
    pub polarity: Polarity,
    pub houses: BTreeSet<House>,
    pub special_subject: Option<String>,
    pub reason: Option<String>,
    pub utterance: Option<String>,
}

impl ParsedIntent {
    /// Amount with the polarity applied, saturating at the i64 bounds.
    pub fn signed_amount(&self) -> i64 {
        let amount = i64::try_from(self.amount).unwrap_or(i64::MAX);
        amount.saturating_mul(self.polarity.sign())
    }
}
