use std::time::{Duration, Instant};

/// Per-game tallies collected while a model plays
pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub high_score: u32,
    pub games_played: u32,
    pub total_score: u64,
    pub total_reward: f64,
    pub total_steps: u64,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            high_score: 0,
            games_played: 0,
            total_score: 0,
            total_reward: 0.0,
            total_steps: 0,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.start_time.elapsed();
    }

    pub fn on_game_over(&mut self, final_score: u32, reward: f32, steps: usize) {
        self.games_played += 1;
        self.total_score += u64::from(final_score);
        self.total_reward += f64::from(reward);
        self.total_steps += steps as u64;
        if final_score > self.high_score {
            self.high_score = final_score;
        }
        self.update();
    }

    pub fn mean_score(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.total_score as f64 / f64::from(self.games_played)
        }
    }

    pub fn mean_reward(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.total_reward / f64::from(self.games_played)
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Games: {} | High score: {} | Mean score: {:.2} | Mean reward: {:.2} | Steps: {} | Time: {}",
            self.games_played,
            self.high_score,
            self.mean_score(),
            self.mean_reward(),
            self.total_steps,
            self.format_time()
        )
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
