// Time utilities
// (c) 2024 Ross Younger

use std::{
    cmp::max,
    time::{Duration, Instant},
};

use human_repr::HumanDuration;

/// A simple named stopwatch.
/// This stopwatch does not support resuming or splits.
#[derive(Debug, Default, Clone)]
pub struct Stopwatch {
    name: String,
    start_: Option<Instant>,
    stop_: Option<Instant>,
}

impl Stopwatch {
    /// Creates a running stopwatch.
    /// If you wanted a stopped stopwatch, use `::default()`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            start_: Some(Instant::now()),
            stop_: None,
        }
    }

    /// The name this stopwatch was created with
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops this stopwatch, returning the elapsed time if it had been started.
    /// Panics: It is a logic error to call stop more than once.
    pub fn stop(&mut self) -> Option<Duration> {
        assert!(self.stop_.is_none(), "Stopwatch already stopped");
        self.stop_ = Some(Instant::now());
        self.elapsed()
    }

    /// Time between start and stop; `None` unless both have happened
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        Some(self.stop_? - self.start_?)
    }

    /// Stops this stopwatch, starts a new one where it left off
    fn chain(&mut self, new_name: &str) -> Self {
        let _ = self.stop();
        Self {
            name: new_name.to_string(),
            start_: self.stop_,
            stop_: None,
        }
    }

    /// Formatter for --profile mode
    fn fmt_ln(&self, f: &mut std::fmt::Formatter<'_>, width: usize) -> std::fmt::Result {
        match self.elapsed() {
            Some(t) => writeln!(f, "  {:width$}: {}", self.name, t.human_duration()),
            None => writeln!(f, "  {:width$}: None", self.name),
        }
    }
}

/// A chain of stopwatches, one per phase of a run
#[derive(Debug, Default, Clone)]
pub struct StopwatchChain {
    watches: Vec<Stopwatch>,
}

impl StopwatchChain {
    /// Stops the current stopwatch (if there is one), adds a new stopwatch to the chain and starts it.
    pub fn next(&mut self, name: &str) {
        let new1 = match self.watches.last_mut() {
            None => Stopwatch::new(name),
            Some(latest) => latest.chain(name),
        };
        self.watches.push(new1);
    }

    /// Stops the chain. This is final, you cannot restart or call next().
    pub fn stop(&mut self) {
        if let Some(sw) = self.watches.last_mut() {
            let _ = sw.stop();
        }
    }

    /// Extracts a single stopwatch by name, if it was present
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Stopwatch> {
        self.watches.iter().find(|&sw| sw.name == name)
    }
}

/// Simple display formatting
impl std::fmt::Display for StopwatchChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .watches
            .iter()
            .fold(0usize, |acc, sw| max(acc, sw.name.len()));
        for sw in &self.watches {
            sw.fmt_ln(f, width)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Stopwatch, StopwatchChain};

    #[test]
    fn new_stopwatch_is_running() {
        let mut a = Stopwatch::new("");
        assert!(a.elapsed().is_none());
        assert!(a.stop().is_some());
        assert!(a.elapsed().is_some());
    }
    #[test]
    fn default_stopwatch_is_not_running() {
        let mut a = Stopwatch::default();
        assert!(a.stop().is_none());
    }
    #[test]
    #[should_panic(expected = "already stopped")]
    fn cannot_stop_twice() {
        let mut a = Stopwatch::new("a");
        let _ = a.stop();
        let _ = a.stop();
    }

    #[test]
    fn empty_chain() {
        let c = StopwatchChain::default();
        assert_eq!(c.to_string(), "");
    }
    #[test]
    fn finished_chain() {
        let mut c = StopwatchChain::default();
        c.next("discover");
        c.next("merge");
        c.next("render");
        c.stop();
        assert!(c.find("merge").unwrap().elapsed().is_some());
        assert!(c.find("render").unwrap().elapsed().is_some());
        assert!(c.find("absent").is_none());
        let s = c.to_string();
        assert_eq!(s.lines().count(), 3);
        assert!(s.contains("  discover: "));
    }
    #[test]
    #[should_panic(expected = "already stopped")]
    fn cannot_restart_stopped_chain() {
        let mut c = StopwatchChain::default();
        c.next("a");
        c.stop();
        c.next("b");
    }
}
