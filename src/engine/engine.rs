use std::collections::HashSet;
use std::sync::mpsc::{Receiver, Sender};

use tracing::{debug, info, warn};

use crate::engine::cup_chart::render_cup;
use crate::engine::intent_parser::clean;
use crate::engine::ledger::PointLedger;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::model::chat_event::ChatEvent;
use crate::store::points_store::PointsStore;

const STANDINGS_REQUEST: &str = "standings";

/// Owns the ledger and applies commands strictly one at a time.
pub struct Engine {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    ledger: PointLedger,
    store: Box<dyn PointsStore>,
    channel: String,
    announcers: HashSet<String>,
    scores_moved: bool,
}

impl Engine {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        ledger: PointLedger,
        store: Box<dyn PointsStore>,
        channel: &str,
        announcers: Vec<String>,
    ) -> Self {
        Self {
            rx,
            tx,
            ledger,
            store,
            channel: channel.into(),
            announcers: announcers.into_iter().collect(),
            scores_moved: false,
        }
    }

    #[cfg(test)]
    pub fn ledger(&self) -> &PointLedger {
        &self.ledger
    }

    pub fn run(&mut self) {
        while let Ok(cmd) = self.rx.recv() {
            let stop = matches!(cmd, EngineCommand::Shutdown);

            for resp in self.handle(cmd) {
                if self.tx.send(resp).is_err() {
                    warn!("response channel closed, stopping engine");
                    return;
                }
            }

            if stop {
                info!("engine stopped");
                return;
            }
        }

        // every producer hung up without a Shutdown
        self.flush();
        info!("engine stopped");
    }

    pub fn handle(&mut self, cmd: EngineCommand) -> Vec<EngineResponse> {
        match cmd {
            EngineCommand::Chat(event) => self.on_chat(event),

            EngineCommand::Tick => {
                let mut responses = Vec::new();
                if self.scores_moved {
                    self.scores_moved = false;
                    responses.push(EngineResponse::Chart {
                        channel: self.channel.clone(),
                        chart: render_cup(&self.ledger.snapshot()),
                    });
                }
                self.flush();
                responses
            }

            EngineCommand::Shutdown => {
                self.flush();
                Vec::new()
            }
        }
    }

    fn on_chat(&mut self, event: ChatEvent) -> Vec<EngineResponse> {
        if event.channel != self.channel || event.is_bot {
            return Vec::new();
        }
        let (Some(user), Some(text)) = (event.user, event.text) else {
            return Vec::new();
        };

        if self.announcers.contains(&user) && clean(&text) == STANDINGS_REQUEST {
            return vec![EngineResponse::Standings {
                channel: event.channel,
                lines: self.ledger.standings_lines(),
            }];
        }

        let outcomes = self.ledger.award(&text, &user);
        if outcomes.iter().any(|o| o.is_score_change()) {
            self.scores_moved = true;
        }
        debug!(count = outcomes.len(), "message handled");

        outcomes
            .into_iter()
            .map(|outcome| EngineResponse::Post {
                channel: event.channel.clone(),
                outcome,
            })
            .collect()
    }

    fn flush(&mut self) {
        match self.ledger.flush(self.store.as_ref()) {
            Ok(true) => info!("points flushed"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "failed to save points, will retry"),
        }
    }
}
