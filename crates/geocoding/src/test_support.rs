use crate::error::Result;
use crate::transport::{GeocodeTransport, Place};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::time::Instant;

pub(crate) fn place(lat: f64, lon: f64, display_name: &str) -> Place {
    Place {
        lat: lat.to_string(),
        lon: lon.to_string(),
        display_name: display_name.to_string(),
    }
}

/// Transport that replays queued replies per query; unscripted queries get no results.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Result<Vec<Place>>>>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(&self, query: &str, reply: Result<Vec<Place>>) {
        self.replies
            .lock()
            .unwrap()
            .entry(query.to_string())
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(q, _)| q.clone())
            .collect()
    }

    pub(crate) fn call_instants(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl GeocodeTransport for ScriptedTransport {
    async fn search(&self, query: &str) -> Result<Vec<Place>> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), Instant::now()));
        self.replies
            .lock()
            .unwrap()
            .get_mut(query)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
