use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Error, Result};

const BUILTIN: &[&str] = &[
    "The quick brown fox jumps over the lazy dog.",
    "Practice does not make perfect. Only perfect practice makes perfect.",
    "A journey of a thousand miles begins with a single step.",
    "It was the best of times, it was the worst of times.",
    "All happy families are alike; each unhappy family is unhappy in its own way.",
    "春眠不觉晓，处处闻啼鸟。夜来风雨声，花落知多少。",
    "床前明月光，疑是地上霜。举头望明月，低头思故乡。",
];

/// Where the next passage comes from
#[derive(Debug, Clone, PartialEq)]
pub enum PassageSource {
    /// Always the same text
    Fixed(String),
    /// Random picks from a pool, avoiding immediate repeats when possible
    Pool(Vec<String>),
}

impl Default for PassageSource {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PassageSource {
    pub fn builtin() -> Self {
        Self::Pool(BUILTIN.iter().map(|p| p.to_string()).collect())
    }

    /// Passages separated by blank lines; lines inside one passage keep their breaks
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let pool = parse_passages(&contents);
        if pool.is_empty() {
            return Err(Error::NoPassages(path.to_path_buf()));
        }
        tracing::info!(path = %path.display(), count = pool.len(), "passages loaded");
        Ok(Self::Pool(pool))
    }

    /// Pick the next passage, different from `current` if the pool allows it
    pub fn next_passage<R: Rng + ?Sized>(&self, rng: &mut R, current: Option<&str>) -> String {
        match self {
            Self::Fixed(text) => text.clone(),
            Self::Pool(pool) => {
                let candidates: Vec<&String> = pool
                    .iter()
                    .filter(|p| Some(p.as_str()) != current)
                    .collect();
                candidates
                    .choose(rng)
                    .map(|p| p.to_string())
                    .or_else(|| pool.first().cloned())
                    .unwrap_or_default()
            }
        }
    }
}

fn parse_passages(contents: &str) -> Vec<String> {
    let mut passages = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in contents.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            if !current.is_empty() {
                passages.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        passages.push(current.join("\n"));
    }

    passages
}
