//! Model persistence for saving and loading trained agents
//!
//! A checkpoint holds the Q-table and the best score reached while training.
//! It is encoded with bincode inside a gzip stream. Training metadata goes
//! to a JSON sidecar next to it.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};

use super::agent::QLearningAgent;
use super::config::QLearningConfig;
use super::q_table::QTable;
use crate::game::GameConfig;

/// Everything needed to resume or evaluate a trained agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub q_table: QTable,
    pub best_score: Option<u32>,
}

/// Metadata saved with the model
///
/// Not needed to load the checkpoint; it records how the model was trained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Game configuration the agent was trained on
    pub game_config: GameConfig,

    /// Q-learning configuration used during training
    pub q_config: QLearningConfig,

    /// Number of visited states in the table
    pub states: usize,

    /// Best episode score at save time
    pub best_score: Option<u32>,

    /// Total replay updates completed
    pub training_steps: usize,

    /// Number of episodes trained
    pub episodes_trained: usize,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl ModelMetadata {
    /// Create metadata describing `agent`
    pub fn new(agent: &QLearningAgent, game_config: &GameConfig) -> Self {
        Self {
            game_config: game_config.clone(),
            q_config: agent.config().clone(),
            states: agent.q_table().len(),
            best_score: agent.best_score(),
            training_steps: agent.training_step(),
            episodes_trained: agent.episodes_trained(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Path of the JSON sidecar for a model path
pub fn metadata_path(path: &Path) -> PathBuf {
    path.with_extension("meta.json")
}

/// Write a checkpoint to `path`
///
/// The file is written next to its destination first and renamed into
/// place, so an interrupted save never leaves a truncated checkpoint. The
/// temporary file is removed when the save fails. Parent directories are
/// created if they don't exist.
pub fn save_checkpoint(checkpoint: &Checkpoint, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let tmp_path = path.with_extension("tmp");
    let written = write_compressed(checkpoint, &tmp_path).and_then(|()| {
        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to move checkpoint into place at {:?}", path))
    });
    if written.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }

    written
}

fn write_compressed(checkpoint: &Checkpoint, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    bincode::serialize_into(&mut encoder, checkpoint).context("Failed to encode checkpoint")?;
    encoder
        .finish()
        .context("Failed to finish compressed stream")?
        .flush()
        .with_context(|| format!("Failed to write {:?}", path))
}

/// Read a checkpoint written by [`save_checkpoint`]
///
/// Fails for missing files, files that are not gzip streams, and streams
/// that do not decode to exactly one checkpoint.
pub fn load_checkpoint(path: &Path) -> Result<Checkpoint> {
    let file = File::open(path).with_context(|| format!("Failed to open checkpoint {:?}", path))?;
    let mut decoder = GzDecoder::new(BufReader::new(file));

    let checkpoint: Checkpoint = bincode::deserialize_from(&mut decoder)
        .with_context(|| format!("Failed to decode checkpoint {:?}", path))?;

    let mut trailing = Vec::new();
    decoder
        .read_to_end(&mut trailing)
        .with_context(|| format!("Failed to read checkpoint {:?}", path))?;
    ensure!(
        trailing.is_empty(),
        "Checkpoint {:?} has {} unexpected trailing bytes",
        path,
        trailing.len()
    );

    Ok(checkpoint)
}

/// Save a trained agent to a file
///
/// The model is saved in two files:
/// - `<path>` - Q-table and best score (gzip-compressed bincode)
/// - `<path>.meta.json` - Metadata as JSON
pub fn save_model(agent: &QLearningAgent, game_config: &GameConfig, path: &Path) -> Result<()> {
    save_checkpoint(&agent.checkpoint(), path)?;

    let metadata = ModelMetadata::new(agent, game_config);
    let meta_path = metadata_path(path);
    let meta_json =
        serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata")?;
    std::fs::write(&meta_path, meta_json)
        .with_context(|| format!("Failed to write metadata to {:?}", meta_path))?;

    Ok(())
}

/// Load a trained agent's checkpoint from a file
pub fn load_model(path: &Path) -> Result<Checkpoint> {
    load_checkpoint(path)
}

/// Load the metadata sidecar of a saved model
pub fn load_metadata(path: &Path) -> Result<ModelMetadata> {
    let meta_path = metadata_path(path);
    let meta_json = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read metadata from {:?}", meta_path))?;
    serde_json::from_str(&meta_json).context("Failed to deserialize metadata")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Action;
    use crate::rl::Observation;
    use tempfile::TempDir;

    fn sample_checkpoint() -> Checkpoint {
        let mut q_table = QTable::new();
        q_table.get_or_create(&Observation::new(vec![0, 3400, 1]))[Action::Jump.index()] = 12.5;
        q_table.get_or_create(&Observation::new(vec![-20, 15, -1]))[Action::Left.index()] = -3.25;
        q_table.get_or_create(&Observation::new(vec![480, 0, 1]));
        Checkpoint {
            q_table,
            best_score: Some(7),
        }
    }

    #[test]
    fn test_checkpoint_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.bin");
        let checkpoint = sample_checkpoint();

        save_checkpoint(&checkpoint, &path).unwrap();
        let loaded = load_checkpoint(&path).unwrap();

        assert_eq!(loaded, checkpoint);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_untrained_checkpoint_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.bin");

        save_checkpoint(&Checkpoint::default(), &path).unwrap();
        let loaded = load_checkpoint(&path).unwrap();
        assert!(loaded.q_table.is_empty());
        assert_eq!(loaded.best_score, None);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("model.bin");

        save_checkpoint(&sample_checkpoint(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_overwrite_replaces_checkpoint() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.bin");

        save_checkpoint(&sample_checkpoint(), &path).unwrap();
        save_checkpoint(&Checkpoint::default(), &path).unwrap();
        assert_eq!(load_checkpoint(&path).unwrap(), Checkpoint::default());
    }

    #[test]
    fn test_failed_save_removes_temporary_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("occupied");
        std::fs::create_dir(&path).unwrap();

        assert!(save_checkpoint(&sample_checkpoint(), &path).is_err());
        assert!(!path.with_extension("tmp").exists());
        assert!(path.is_dir());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(load_checkpoint(&dir.path().join("missing.bin")).is_err());
    }

    #[test]
    fn test_load_empty_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.bin");
        std::fs::write(&path, b"").unwrap();
        assert!(load_checkpoint(&path).is_err());
    }

    #[test]
    fn test_load_uncompressed_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.bin");
        std::fs::write(&path, bincode::serialize(&sample_checkpoint()).unwrap()).unwrap();
        assert!(load_checkpoint(&path).is_err());
    }

    #[test]
    fn test_load_structurally_different_file_fails() {
        #[derive(Serialize)]
        struct Extended {
            q_table: QTable,
            best_score: Option<u32>,
            extra: Vec<u64>,
        }

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("extended.bin");
        let extended = Extended {
            q_table: sample_checkpoint().q_table,
            best_score: Some(1),
            extra: vec![1, 2, 3],
        };

        let file = File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        bincode::serialize_into(&mut encoder, &extended).unwrap();
        encoder.finish().unwrap();

        assert!(load_checkpoint(&path).is_err());
    }

    #[test]
    fn test_model_round_trip_with_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.bin");
        let game_config = GameConfig::pluck_stars();

        let mut agent = QLearningAgent::with_seed(QLearningConfig::default(), 0);
        agent.restore(sample_checkpoint());
        agent.increment_episode();

        save_model(&agent, &game_config, &path).unwrap();
        assert!(metadata_path(&path).exists());

        let checkpoint = load_model(&path).unwrap();
        assert_eq!(checkpoint, sample_checkpoint());

        let metadata = load_metadata(&path).unwrap();
        assert_eq!(metadata.states, 3);
        assert_eq!(metadata.best_score, Some(7));
        assert_eq!(metadata.episodes_trained, 1);
        assert_eq!(metadata.game_config.depth_per_tick, 10);
        assert_eq!(metadata.version, env!("CARGO_PKG_VERSION"));
    }
}
