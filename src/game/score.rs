//! Scoreboard and match clock

use crate::ws::protocol::{MatchWinner, Side};

/// Goals per side; counters only ever grow within a match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub left: u32,
    pub right: u32,
}

impl Score {
    pub fn add_goal(&mut self, side: Side) {
        match side {
            Side::Left => self.left += 1,
            Side::Right => self.right += 1,
        }
    }

    pub fn winner(&self) -> MatchWinner {
        use std::cmp::Ordering;
        match self.left.cmp(&self.right) {
            Ordering::Greater => MatchWinner::Left,
            Ordering::Less => MatchWinner::Right,
            Ordering::Equal => MatchWinner::Tie,
        }
    }
}

/// Countdown clock advanced once per simulation tick.
///
/// Time is kept as a tick count so the final tick lands on exactly zero.
#[derive(Debug, Clone)]
pub struct MatchTimer {
    tick_rate: u32,
    total_ticks: u64,
    elapsed_ticks: u64,
    running: bool,
}

impl MatchTimer {
    pub fn new(duration_secs: u32, tick_rate: u32) -> Self {
        Self {
            tick_rate,
            total_ticks: duration_secs as u64 * tick_rate as u64,
            elapsed_ticks: 0,
            running: true,
        }
    }

    /// Advance by one tick. Returns true on the tick the clock runs out.
    pub fn advance(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed_ticks = (self.elapsed_ticks + 1).min(self.total_ticks);
        if self.elapsed_ticks == self.total_ticks {
            self.running = false;
            return true;
        }
        false
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_ticks >= self.total_ticks
    }

    /// Seconds left, never negative
    pub fn remaining_secs(&self) -> f64 {
        (self.total_ticks - self.elapsed_ticks) as f64 / self.tick_rate as f64
    }

    /// Simulation time since kickoff in milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ticks as f64 * 1000.0 / self.tick_rate as f64
    }

    /// Remaining time as `m:ss`, rounding partial seconds up
    pub fn formatted(&self) -> String {
        let secs = self.remaining_secs().ceil() as u64;
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winner_by_score() {
        let mut score = Score::default();
        assert_eq!(score.winner(), MatchWinner::Tie);
        score.add_goal(Side::Right);
        assert_eq!(score.winner(), MatchWinner::Right);
        score.add_goal(Side::Left);
        score.add_goal(Side::Left);
        assert_eq!(score.winner(), MatchWinner::Left);
        assert_eq!(score, Score { left: 2, right: 1 });
    }

    #[test]
    fn timer_reaches_exactly_zero() {
        let mut timer = MatchTimer::new(120, 60);
        let mut finished_at = None;
        let mut last = timer.remaining_secs();
        for tick in 1..=7_200u32 {
            if timer.advance() {
                finished_at = Some(tick);
            }
            let now = timer.remaining_secs();
            assert!(now <= last && now >= 0.0);
            last = now;
        }
        assert_eq!(finished_at, Some(7_200));
        assert_eq!(timer.remaining_secs(), 0.0);
        assert!(timer.is_finished());
        assert!(!timer.advance());
    }

    #[test]
    fn formatting_rounds_up() {
        let mut timer = MatchTimer::new(120, 60);
        assert_eq!(timer.formatted(), "2:00");
        timer.advance();
        assert_eq!(timer.formatted(), "2:00");
        for _ in 0..60 {
            timer.advance();
        }
        assert_eq!(timer.formatted(), "1:59");
    }
}
