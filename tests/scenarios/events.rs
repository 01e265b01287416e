//! NDJSON event stream of a running server

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::common::*;

use sitedeck::infrastructure::JsonEventSink;
use sitedeck::Supervisor;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn events(&self) -> Vec<Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

#[test]
fn startup_and_removal_are_reported_in_order() {
    let mut home = TestHome::new();
    home.webapp("console", SERVLET_DESCRIPTOR);
    let config = home.config();
    let buffer = SharedBuffer::default();

    let supervisor = Supervisor::new(config.server_plan(), config.host_services())
        .with_event_sink(Arc::new(JsonEventSink::with_writer(buffer.clone())));
    supervisor.start().unwrap();
    home.remove_webapp("console");
    supervisor.scan_now();

    let names: Vec<String> = buffer
        .events()
        .iter()
        .map(|e| format!("{}:{}", e["deployer"].as_str().unwrap(), e["event"].as_str().unwrap()))
        .collect();
    assert_eq!(
        names,
        vec![
            "webapps:scan_started",
            "webapps:deployed",
            "webapps:scan_completed",
            "contexts:scan_started",
            "contexts:scan_completed",
            "webapps:scan_started",
            "webapps:undeployed",
            "webapps:scan_completed",
            "contexts:scan_started",
            "contexts:scan_completed",
        ]
    );
}
