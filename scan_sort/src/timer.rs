use std::time::{Duration, Instant};

/// Stopwatch that records laps and reports their mean and spread.
#[derive(Debug)]
pub struct LapTimer {
    start: Instant,
    laps: Vec<Duration>,
}

impl Default for LapTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl LapTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            laps: Vec::new(),
        }
    }

    /// Starts the current lap over, discarding the time since the last lap.
    pub fn restart(&mut self) {
        self.start = Instant::now();
    }

    /// Ends the current lap and starts the next one.
    pub fn next_lap(&mut self) -> Duration {
        let now = Instant::now();
        let lap = now - self.start;
        self.laps.push(lap);
        self.start = now;
        lap
    }

    pub fn laps(&self) -> &[Duration] {
        &self.laps
    }

    /// Mean lap time in seconds.
    pub fn lap_avg(&self) -> f64 {
        if self.laps.is_empty() {
            return 0.0;
        }
        self.seconds().sum::<f64>() / self.laps.len() as f64
    }

    /// Population standard deviation of the lap times in seconds.
    pub fn lap_std(&self) -> f64 {
        if self.laps.is_empty() {
            return 0.0;
        }
        let avg = self.lap_avg();
        let variance =
            self.seconds().map(|s| (s - avg) * (s - avg)).sum::<f64>() / self.laps.len() as f64;
        variance.sqrt()
    }

    fn seconds(&self) -> impl Iterator<Item = f64> + '_ {
        self.laps.iter().map(|lap| lap.as_secs_f64())
    }
}
