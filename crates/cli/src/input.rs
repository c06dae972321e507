//! Reading analysis inputs from disk

use anyhow::{Context, Result};
use formcheck_lib::{Frame, Landmark, Session, TrainingHistoryDigest};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Load a session bundle (`{"pose_data": {...}, ...}`)
pub fn read_session(path: &Path) -> Result<Session> {
    Session::from_reader(open(path)?)
        .with_context(|| format!("Failed to parse session from {}", path.display()))
}

/// Load a training history array, most recent entry first
pub fn read_history(path: &Path) -> Result<TrainingHistoryDigest> {
    serde_json::from_reader(open(path)?)
        .with_context(|| format!("Failed to parse training history from {}", path.display()))
}

/// Load one frame's landmark array
pub fn read_landmarks(path: &Path) -> Result<Vec<Landmark>> {
    serde_json::from_reader(open(path)?)
        .with_context(|| format!("Failed to parse landmarks from {}", path.display()))
}

/// Load a JSON Lines file with one landmark array per line
///
/// Blank lines are skipped; frames are indexed in the order they appear.
pub fn read_frame_lines(path: &Path) -> Result<Vec<Frame>> {
    let mut frames = Vec::new();
    for (number, line) in open(path)?.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let landmarks = serde_json::from_str(&line)
            .with_context(|| format!("Invalid frame on line {} of {}", number + 1, path.display()))?;
        frames.push(Frame::new(frames.len() as u32, landmarks));
    }
    Ok(frames)
}
