//! Recording request router

use std::sync::{Arc, Mutex};

use sitedeck::{ApplicationContext, RequestRouter};

#[derive(Default)]
pub struct RecordingRouter {
    log: Mutex<Vec<String>>,
}

impl RecordingRouter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

impl RequestRouter for RecordingRouter {
    fn install(&self, contexts: &[Arc<ApplicationContext>]) {
        let mut log = self.log.lock().unwrap();
        for context in contexts {
            log.push(format!("install {}", context.identity()));
        }
    }

    fn uninstall(&self, contexts: &[Arc<ApplicationContext>]) {
        let mut log = self.log.lock().unwrap();
        for context in contexts {
            log.push(format!("uninstall {}", context.identity()));
        }
    }
}
