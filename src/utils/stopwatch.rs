use log::info;
use std::time::Instant;

/// Logs a banner when a stage starts and its elapsed time when it stops.
#[derive(Default)]
pub struct Stopwatch {
    current: Option<(&'static str, Instant)>,
}

impl Stopwatch {
    pub fn start(&mut self, stage: &'static str) {
        self.stop();
        info!("=> {}", stage);
        self.current = Some((stage, Instant::now()));
    }

    pub fn stop(&mut self) {
        if let Some((stage, t)) = self.current.take() {
            info!("   {} took {:.2?}", stage, t.elapsed());
        }
    }
}
