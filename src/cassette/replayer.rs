//! Replays recorded interactions from a cassette.

use std::collections::HashMap;

use thiserror::Error;

use super::format::{Cassette, Interaction};

/// Key for indexing interactions by port and method.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct PortMethodKey {
    port: String,
    method: String,
}

/// The cassette cannot serve a requested call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    /// Nothing was recorded for this port and method.
    #[error("no interactions recorded for {port}::{method}; recorded: [{available}]")]
    Unrecorded {
        /// Requested port.
        port: String,
        /// Requested method.
        method: String,
        /// Recorded `port::method` pairs.
        available: String,
    },
    /// Every recorded interaction for this port and method was consumed.
    #[error("cassette exhausted: all {count} interactions for {port}::{method} consumed (last seq {last_seq})")]
    Exhausted {
        /// Requested port.
        port: String,
        /// Requested method.
        method: String,
        /// Number of recorded interactions.
        count: usize,
        /// Sequence number of the last one.
        last_seq: u64,
    },
}

/// Replays interactions from a loaded cassette, serving them sequentially
/// per port/method pair.
pub struct CassetteReplayer {
    queues: HashMap<PortMethodKey, Vec<Interaction>>,
    cursors: HashMap<PortMethodKey, usize>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<PortMethodKey, Vec<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            let key = PortMethodKey {
                port: interaction.port.clone(),
                method: interaction.method.clone(),
            };
            queues.entry(key).or_default().push(interaction.clone());
        }
        Self { queues, cursors: HashMap::new() }
    }

    /// Return the next interaction for the given port and method.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError`] when the cassette has no (more) interactions
    /// for the pair, describing what was requested and what remains.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Result<&Interaction, ReplayError> {
        let key = PortMethodKey { port: port.to_string(), method: method.to_string() };

        let Some(queue) = self.queues.get(&key) else {
            let mut available: Vec<String> =
                self.queues.keys().map(|k| format!("{}::{}", k.port, k.method)).collect();
            available.sort();
            return Err(ReplayError::Unrecorded {
                port: port.to_string(),
                method: method.to_string(),
                available: available.join(", "),
            });
        };

        let cursor = self.cursors.entry(key).or_insert(0);
        let Some(interaction) = queue.get(*cursor) else {
            return Err(ReplayError::Exhausted {
                port: port.to_string(),
                method: method.to_string(),
                count: queue.len(),
                last_seq: queue.last().map_or(0, |i| i.seq),
            });
        };
        *cursor += 1;
        Ok(interaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn interaction(seq: u64, port: &str, method: &str, output: serde_json::Value) -> Interaction {
        Interaction { seq, port: port.into(), method: method.into(), input: json!({}), output }
    }

    fn make_cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            server: "http://lab.local".into(),
            interactions,
        }
    }

    #[test]
    fn serves_each_pair_in_recorded_order() {
        let cassette = make_cassette(vec![
            interaction(0, "networks", "network", json!({"Ok": 1})),
            interaction(1, "nodes", "interface", json!({"Ok": 2})),
            interaction(2, "networks", "network", json!({"Ok": 3})),
        ]);
        let mut replayer = CassetteReplayer::new(&cassette);

        assert_eq!(replayer.next_interaction("networks", "network").unwrap().seq, 0);
        assert_eq!(replayer.next_interaction("nodes", "interface").unwrap().seq, 1);
        assert_eq!(replayer.next_interaction("networks", "network").unwrap().seq, 2);
    }

    #[test]
    fn exhausted_pair_is_an_error() {
        let cassette = make_cassette(vec![interaction(4, "topology", "topology", json!({}))]);
        let mut replayer = CassetteReplayer::new(&cassette);
        let _ = replayer.next_interaction("topology", "topology").unwrap();

        let err = replayer.next_interaction("topology", "topology").unwrap_err();

        assert!(matches!(err, ReplayError::Exhausted { count: 1, last_seq: 4, .. }));
        assert!(err.to_string().contains("cassette exhausted"));
    }

    #[test]
    fn unknown_pair_lists_what_was_recorded() {
        let cassette = make_cassette(vec![interaction(0, "nodes", "node", json!({}))]);
        let mut replayer = CassetteReplayer::new(&cassette);

        let err = replayer.next_interaction("networks", "delete_network").unwrap_err();

        assert!(err.to_string().contains("recorded: [nodes::node]"));
    }
}
