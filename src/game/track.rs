//! Queue of upcoming obstacles
//!
//! Obstacles are kept in spawn order, which is also depth order: every new
//! obstacle is placed at least `min_gap` behind the current tail. Only the
//! head (nearest obstacle) takes part in scoring.

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;

use super::config::{GameConfig, HeightTiers};
use super::state::{HeightTier, Obstacle};

/// The obstacles currently on the track, nearest first
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleTrack {
    obstacles: VecDeque<Obstacle>,
}

impl ObstacleTrack {
    /// Create a fresh track holding a first obstacle and its successor
    pub fn new<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Self {
        let mut track = Self {
            obstacles: VecDeque::with_capacity(config.spawn.max_obstacles),
        };
        track.seed(config, rng);
        track
    }

    /// Build a track from explicit obstacles, nearest first
    pub fn from_obstacles(obstacles: impl IntoIterator<Item = Obstacle>) -> Self {
        Self {
            obstacles: obstacles.into_iter().collect(),
        }
    }

    /// The obstacle nearest to the player
    pub fn head(&self) -> &Obstacle {
        &self.obstacles[0]
    }

    pub fn head_mut(&mut self) -> &mut Obstacle {
        &mut self.obstacles[0]
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    /// Whether depths never decrease from head to tail
    pub fn is_depth_sorted(&self) -> bool {
        self.obstacles
            .iter()
            .zip(self.obstacles.iter().skip(1))
            .all(|(near, far)| near.depth <= far.depth)
    }

    /// Produce the obstacle that follows `previous`
    ///
    /// With no previous obstacle the result is a first obstacle near the
    /// left edge of the track.
    pub fn spawn_next<R: Rng + ?Sized>(
        previous: Option<&Obstacle>,
        config: &GameConfig,
        rng: &mut R,
    ) -> Obstacle {
        let Some(previous) = previous else {
            return Self::spawn_first(config, rng);
        };
        let spawn = &config.spawn;

        let min_depth = (previous.depth + spawn.min_gap).min(spawn.depth_limit);
        let max_depth = (previous.depth + spawn.max_gap).min(spawn.depth_limit);
        let depth = draw_quantized(rng, min_depth, max_depth, spawn.depth_step);

        let (track_min, track_max) = config.obstacle_lateral_range();
        let min_x = track_min.max(previous.x - spawn.lateral_reach);
        let max_x = track_max.min(previous.x + spawn.lateral_reach);

        let x = match spawn.dead_zone {
            Some(dead_zone) => {
                let windows: Vec<(i32, i32)> = [
                    (min_x, previous.x - dead_zone),
                    (previous.x + dead_zone, max_x),
                ]
                .into_iter()
                .filter(|(lo, hi)| lo <= hi)
                .collect();

                match windows.choose(rng) {
                    Some(&(lo, hi)) => draw_quantized(rng, lo, hi, spawn.lateral_step),
                    None => draw_quantized(rng, min_x, max_x, spawn.lateral_step),
                }
            }
            None => draw_quantized(rng, min_x, max_x, spawn.lateral_step),
        };

        Obstacle::new(x, depth, config.obstacle_base, draw_tier(config, rng))
    }

    fn spawn_first<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Obstacle {
        let spawn = &config.spawn;
        let (min_x, _) = config.obstacle_lateral_range();
        let span_end = -config.track_width / 2 + config.obstacle_width / 2 + spawn.first_lateral_span;
        let x = draw_quantized(rng, min_x, span_end - 1, spawn.lateral_step);

        Obstacle::new(x, spawn.first_depth, config.obstacle_base, draw_tier(config, rng))
    }

    /// Move every obstacle `delta_depth` closer to the player
    pub fn advance(&mut self, delta_depth: i32) {
        for obstacle in &mut self.obstacles {
            obstacle.depth -= delta_depth;
        }
    }

    /// Remove obstacles that have left the track, nearest first
    ///
    /// The track may be empty afterwards; `refill` restores it.
    pub fn retire(&mut self, config: &GameConfig) -> Vec<Obstacle> {
        let mut retired = Vec::new();
        while let Some(head) = self.obstacles.front() {
            if !config.is_retired(head.depth) {
                break;
            }
            retired.extend(self.obstacles.pop_front());
        }
        retired
    }

    /// Remove the head obstacle regardless of its depth
    pub fn pop_head(&mut self) -> Option<Obstacle> {
        self.obstacles.pop_front()
    }

    /// Spawn at most one obstacle when the tail has come close enough
    ///
    /// An empty track is re-seeded with a first obstacle and its successor.
    pub fn refill<R: Rng + ?Sized>(&mut self, config: &GameConfig, rng: &mut R) {
        let Some(tail) = self.obstacles.back() else {
            self.seed(config, rng);
            return;
        };

        if self.obstacles.len() < config.spawn.max_obstacles
            && tail.depth < config.spawn.spawn_trigger_depth
        {
            let next = Self::spawn_next(Some(tail), config, rng);
            self.obstacles.push_back(next);
        }
    }

    fn seed<R: Rng + ?Sized>(&mut self, config: &GameConfig, rng: &mut R) {
        let first = Self::spawn_first(config, rng);
        let next = Self::spawn_next(Some(&first), config, rng);
        self.obstacles.push_back(first);
        self.obstacles.push_back(next);
    }
}

/// Draw `lo + k * step` uniformly over every such value not exceeding `hi`
fn draw_quantized<R: Rng + ?Sized>(rng: &mut R, lo: i32, hi: i32, step: i32) -> i32 {
    let slots = (hi - lo).max(0) / step;
    lo + step * rng.gen_range(0..=slots)
}

fn draw_tier<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> HeightTier {
    match config.height_tiers {
        HeightTiers::Single => HeightTier::Small,
        HeightTiers::SmallAndTall => {
            if rng.gen_bool(config.spawn.small_probability) {
                HeightTier::Small
            } else {
                HeightTier::Tall
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_new_track_has_two_sorted_obstacles() {
        let config = GameConfig::just_jump();
        let track = ObstacleTrack::new(&config, &mut rng());

        assert_eq!(track.len(), 2);
        assert_eq!(track.head().depth, 3400);
        assert!([-480, -460, -440].contains(&track.head().x));
        assert!(track.is_depth_sorted());
    }

    #[test]
    fn test_first_obstacle_window_pluck_stars() {
        let config = GameConfig::pluck_stars();
        let mut rng = rng();
        for _ in 0..100 {
            let first = ObstacleTrack::spawn_next(None, &config, &mut rng);
            assert!([-450, -430].contains(&first.x));
            assert_eq!(first.base, 100);
            assert_eq!(first.tier, HeightTier::Small);
        }
    }

    #[test]
    fn test_spawn_next_respects_gap_and_quantization() {
        let config = GameConfig::just_jump();
        let mut rng = rng();
        let previous = Obstacle::new(0, 1000, 0, HeightTier::Small);

        for _ in 0..500 {
            let next = ObstacleTrack::spawn_next(Some(&previous), &config, &mut rng);
            assert!(next.depth >= 1500 && next.depth <= 2500);
            assert_eq!((next.depth - 1500) % 10, 0);
            assert!(next.x >= -300 && next.x <= 300);
            assert_eq!(next.x % 20, 0);
        }
    }

    #[test]
    fn test_spawn_depth_is_clipped() {
        let config = GameConfig::just_jump();
        let mut rng = rng();
        let previous = Obstacle::new(0, 3600, 0, HeightTier::Small);

        for _ in 0..50 {
            let next = ObstacleTrack::spawn_next(Some(&previous), &config, &mut rng);
            assert_eq!(next.depth, 3900);
        }
    }

    #[test]
    fn test_dead_zone_excludes_previous_position() {
        let config = GameConfig::just_jump();
        let mut rng = rng();
        let previous = Obstacle::new(0, 1000, 0, HeightTier::Small);

        for _ in 0..500 {
            let next = ObstacleTrack::spawn_next(Some(&previous), &config, &mut rng);
            assert!(next.x.abs() >= 100, "x = {} inside dead zone", next.x);
        }
    }

    #[test]
    fn test_dead_zone_near_edge_uses_one_side() {
        let config = GameConfig::just_jump();
        let mut rng = rng();
        let previous = Obstacle::new(-480, 1000, 0, HeightTier::Small);

        for _ in 0..200 {
            let next = ObstacleTrack::spawn_next(Some(&previous), &config, &mut rng);
            assert!(next.x >= -380 && next.x <= -180);
        }
    }

    #[test]
    fn test_dead_zone_falls_back_when_both_sides_empty() {
        let mut config = GameConfig::just_jump();
        config.spawn.dead_zone = Some(400);
        let mut rng = rng();
        let previous = Obstacle::new(0, 1000, 0, HeightTier::Small);

        for _ in 0..200 {
            let next = ObstacleTrack::spawn_next(Some(&previous), &config, &mut rng);
            assert!(next.x >= -300 && next.x <= 300);
        }
    }

    #[test]
    fn test_single_tier_never_spawns_tall() {
        let config = GameConfig::pluck_stars();
        let mut rng = rng();
        let previous = Obstacle::new(0, 1000, 100, HeightTier::Small);
        for _ in 0..200 {
            let next = ObstacleTrack::spawn_next(Some(&previous), &config, &mut rng);
            assert_eq!(next.tier, HeightTier::Small);
        }
    }

    #[test]
    fn test_tier_draw_favours_small() {
        let config = GameConfig::just_jump();
        let mut rng = rng();
        let previous = Obstacle::new(0, 1000, 0, HeightTier::Small);
        let small = (0..2000)
            .map(|_| ObstacleTrack::spawn_next(Some(&previous), &config, &mut rng))
            .filter(|o| o.tier == HeightTier::Small)
            .count();
        let ratio = small as f64 / 2000.0;
        assert!((0.65..0.75).contains(&ratio), "small ratio {}", ratio);
    }

    #[test]
    fn test_retire_removes_only_passed_obstacles() {
        let config = GameConfig::just_jump();
        let mut track = ObstacleTrack::from_obstacles([
            Obstacle::new(0, -65, 0, HeightTier::Small),
            Obstacle::new(0, -60, 0, HeightTier::Small),
            Obstacle::new(0, 600, 0, HeightTier::Small),
        ]);

        let retired = track.retire(&config);
        assert_eq!(retired.len(), 1);
        assert_eq!(track.len(), 2);
        assert_eq!(track.head().depth, -60);
    }

    #[test]
    fn test_refill_reseeds_empty_track() {
        let config = GameConfig::just_jump();
        let mut track = ObstacleTrack::from_obstacles([]);
        track.refill(&config, &mut rng());
        assert_eq!(track.len(), 2);
        assert!(track.is_depth_sorted());
    }

    #[test]
    fn test_refill_waits_for_trigger_depth() {
        let config = GameConfig::just_jump();
        let mut rng = rng();
        let mut track = ObstacleTrack::from_obstacles([Obstacle::new(0, 3400, 0, HeightTier::Small)]);
        track.refill(&config, &mut rng);
        assert_eq!(track.len(), 1);

        track.advance(15);
        track.refill(&config, &mut rng);
        assert_eq!(track.len(), 2);
    }

    #[test]
    fn test_invariants_hold_over_many_ticks() {
        for config in [GameConfig::just_jump(), GameConfig::pluck_stars()] {
            let mut rng = rng();
            let mut track = ObstacleTrack::new(&config, &mut rng);

            for _ in 0..5000 {
                track.advance(config.depth_per_tick);
                track.retire(&config);
                track.refill(&config, &mut rng);

                assert!(!track.is_empty());
                assert!(track.len() <= config.spawn.max_obstacles);
                assert!(track.is_depth_sorted());
            }
        }
    }
}
