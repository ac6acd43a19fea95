use std::time::{Duration, Instant};

use super::store::GameStats;

/// Round clock plus the statistics it feeds
pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub stats: GameStats,
    running: bool,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self::with_stats(GameStats::default())
    }

    pub fn with_stats(stats: GameStats) -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            stats,
            running: false,
        }
    }

    /// Refresh the clock; it stands still between rounds
    pub fn update(&mut self) {
        if self.running {
            self.elapsed_time = self.start_time.elapsed();
        }
    }

    pub fn on_game_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
        self.running = true;
    }

    /// Stop the clock without recording the round
    pub fn on_game_abandoned(&mut self) {
        self.running = false;
    }

    pub fn on_game_over(&mut self, final_score: u32) {
        self.update();
        self.running = false;
        self.stats
            .record_round(final_score, self.elapsed_time.as_secs());
    }

    pub fn best_score(&self) -> u32 {
        self.stats.best_score
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_formatting() {
        let mut metrics = GameMetrics::new();
        metrics.elapsed_time = Duration::from_secs(125);
        assert_eq!(metrics.format_time(), "02:05");

        metrics.elapsed_time = Duration::from_secs(0);
        assert_eq!(metrics.format_time(), "00:00");

        metrics.elapsed_time = Duration::from_secs(3661);
        assert_eq!(metrics.format_time(), "61:01");
    }

    #[test]
    fn test_best_score_tracking() {
        let mut metrics = GameMetrics::with_stats(GameStats {
            best_score: 8,
            games_played: 4,
            total_time: 100,
        });

        metrics.on_game_start();
        metrics.on_game_over(5);
        assert_eq!(metrics.best_score(), 8); // Should not decrease
        assert_eq!(metrics.stats.games_played, 5);

        metrics.on_game_start();
        metrics.on_game_over(15);
        assert_eq!(metrics.best_score(), 15);
        assert_eq!(metrics.stats.games_played, 6);
    }

    #[test]
    fn test_game_start_resets_time() {
        let mut metrics = GameMetrics::new();
        metrics.on_game_start();
        std::thread::sleep(Duration::from_millis(50));
        metrics.update();

        assert!(metrics.elapsed_time.as_millis() >= 50);

        metrics.on_game_start();
        metrics.update();
        assert!(metrics.elapsed_time.as_millis() < 50);
    }

    #[test]
    fn test_clock_stops_between_rounds() {
        let mut metrics = GameMetrics::new();
        metrics.on_game_start();
        metrics.on_game_abandoned();
        let frozen = metrics.elapsed_time;

        std::thread::sleep(Duration::from_millis(20));
        metrics.update();
        assert_eq!(metrics.elapsed_time, frozen);
        assert_eq!(metrics.stats.games_played, 0);
    }
}
