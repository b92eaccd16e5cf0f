use std::time::{Duration, Instant};
use tracing::info;

/// Wall-clock timer scoped to a single measurement.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
    stopped: Option<Instant>,
}

impl Stopwatch {

    pub fn start_new() -> Stopwatch {
        Self {
            started: Instant::now(),
            stopped: None
        }
    }

    // freezes the reading, later calls to `elapsed` keep returning the same value
    pub fn stop(&mut self) {
        if self.stopped.is_none() {
            self.stopped = Some(Instant::now());
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self.stopped {
            Some(stopped) => stopped.duration_since(self.started),
            None => self.started.elapsed()
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed().as_millis()
    }

}

/// Runs `f` and returns its value with the time it took.
pub fn measure<T, F: FnOnce() -> T>(f: F) -> (T, Duration) {
    let mut sw = Stopwatch::start_new();
    let value = f();
    sw.stop();
    (value, sw.elapsed())
}

#[doc(hidden)]
pub fn log_elapsed(label: &str, sw: &Stopwatch) {
    info!("{} took {}ms", label, sw.elapsed_ms());
}

/// Evaluates an expression, logs how long it took and yields its value.
///
/// ```
/// let total = playrust_forest::time!((0..10).sum::<u32>(), "sum");
/// assert_eq!(total, 45);
/// ```
#[macro_export]
macro_rules! time {
    ($expression:expr) => {{
        let mut sw = $crate::timing::Stopwatch::start_new();
        let value = $expression;
        sw.stop();
        $crate::timing::log_elapsed(stringify!($expression), &sw);
        value
    }};
    ($expression:expr, $label:expr) => {{
        let mut sw = $crate::timing::Stopwatch::start_new();
        let value = $expression;
        sw.stop();
        $crate::timing::log_elapsed($label, &sw);
        value
    }};
}
