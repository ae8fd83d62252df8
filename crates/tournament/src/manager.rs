//! Bridge between finished games and the rating store.
//!
//! Every game result is broken into pairwise outcomes between the models
//! that took part; each pair is one Elo update. The store is written to disk
//! after every game.

use std::fs;
use std::path::{Path, PathBuf};

use guess_core::GameResult;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::csv;
use crate::elo::{timestamp, EloConfig, EloRating, MatchRecord};
use crate::error::RatingError;

pub const DEFAULT_DATA_DIR: &str = "data/ratings";
pub const RATINGS_FILE: &str = "ratings.json";
pub const REPORT_FILE: &str = "ratings_report.csv";

/// Columns of an exported match history, in file order.
pub const MATCH_HISTORY_COLUMNS: [&str; 9] = [
    "timestamp",
    "model_a",
    "model_b",
    "rating_a_before",
    "rating_b_before",
    "rating_a_after",
    "rating_b_after",
    "score_a",
    "score_b",
];

/// One row of the rankings report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingRow {
    pub rank: usize,
    pub model: String,
    pub rating: i64,
}

/// Outcome of one model pair within a game.
#[derive(Debug, Clone, PartialEq)]
pub struct PairUpdate {
    pub model_a: String,
    pub model_b: String,
    pub outcome_a: f64,
    pub rating_a: i64,
    pub rating_b: i64,
}

/// Relative outcome for A given both raw scores. Equal scores, including
/// two zeros, are a draw.
pub fn relative_outcome(score_a: f64, score_b: f64) -> f64 {
    let total = score_a + score_b;
    if score_a == score_b || total <= 0.0 {
        return 0.5;
    }
    score_a / total
}

#[derive(Debug)]
pub struct RatingManager {
    data_dir: PathBuf,
    ratings_file: PathBuf,
    elo: EloRating,
}

impl RatingManager {
    /// Open the store at `<data_dir>/ratings.json`, creating the directory.
    /// `config` only applies when no store exists yet.
    pub fn new(data_dir: impl Into<PathBuf>, config: EloConfig) -> Result<Self, RatingError> {
        Self::with_ratings_file(data_dir, RATINGS_FILE, config)
    }

    pub fn with_ratings_file(
        data_dir: impl Into<PathBuf>,
        file_name: &str,
        config: EloConfig,
    ) -> Result<Self, RatingError> {
        config.validate()?;
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|e| RatingError::io(&data_dir, e))?;

        let ratings_file = data_dir.join(file_name);
        let existed = ratings_file.exists();
        let elo = EloRating::load_or(&ratings_file, config)?;
        if existed {
            info!(path = %ratings_file.display(), models = elo.models().len(), "loaded ratings");
        } else {
            info!(path = %ratings_file.display(), "starting a new rating store");
        }

        Ok(Self {
            data_dir,
            ratings_file,
            elo,
        })
    }

    pub fn elo(&self) -> &EloRating {
        &self.elo
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn ratings_file(&self) -> &Path {
        &self.ratings_file
    }

    /// Rate every pair of distinct models in `result`, then save.
    ///
    /// Pairs are taken in result order, `(0, 1), (0, 2), .., (1, 2), ..`.
    /// Nothing is applied unless every pair succeeds.
    pub fn process_game_result(
        &mut self,
        result: &GameResult,
    ) -> Result<Vec<PairUpdate>, RatingError> {
        info!(models = result.scores.len(), "processing game result");

        let mut next = self.elo.clone();
        for (model, _) in &result.scores {
            if next.add_model(model, None) {
                info!(model = %model, "added new model");
            }
        }

        let mut updates = Vec::new();
        for (i, (model_a, score_a)) in result.scores.iter().enumerate() {
            for (model_b, score_b) in &result.scores[i + 1..] {
                if model_a == model_b {
                    continue;
                }
                let outcome_a = relative_outcome(*score_a, *score_b);
                let (rating_a, rating_b) = next.update_ratings(model_a, model_b, outcome_a)?;
                info!(
                    model_a = %model_a,
                    model_b = %model_b,
                    outcome = format_args!("{outcome_a:.2}"),
                    rating_a,
                    rating_b,
                    "updated ratings"
                );
                updates.push(PairUpdate {
                    model_a: model_a.clone(),
                    model_b: model_b.clone(),
                    outcome_a,
                    rating_a,
                    rating_b,
                });
            }
        }

        next.save(&self.ratings_file)?;
        self.elo = next;
        Ok(updates)
    }

    /// `(model, rating)` in insertion order.
    pub fn ratings(&self) -> Vec<(&str, i64)> {
        self.elo.ratings()
    }

    pub fn rankings(&self) -> Vec<(String, i64)> {
        self.elo.rankings()
    }

    pub fn save(&self) -> Result<(), RatingError> {
        self.elo.save(&self.ratings_file)?;
        info!(path = %self.ratings_file.display(), "saved ratings");
        Ok(())
    }

    /// Write `ratings_report.csv` (rank, model, rating) into `output_dir`,
    /// or the data directory, and return its rows.
    pub fn generate_rating_report(
        &self,
        output_dir: Option<&Path>,
    ) -> Result<Vec<RankingRow>, RatingError> {
        let dir = output_dir.unwrap_or(&self.data_dir);
        fs::create_dir_all(dir).map_err(|e| RatingError::io(dir, e))?;

        let rows: Vec<RankingRow> = self
            .rankings()
            .into_iter()
            .enumerate()
            .map(|(i, (model, rating))| RankingRow {
                rank: i + 1,
                model,
                rating,
            })
            .collect();

        let text = csv::to_csv(
            &["rank", "model", "rating"],
            rows.iter()
                .map(|r| vec![r.rank.to_string(), r.model.clone(), r.rating.to_string()]),
        );
        let path = dir.join(REPORT_FILE);
        fs::write(&path, text).map_err(|e| RatingError::io(&path, e))?;
        info!(path = %path.display(), "generated ratings report");

        Ok(rows)
    }

    /// Export the match history as CSV. Returns the number of rows written;
    /// with no history nothing is written.
    pub fn export_to_csv(&self, path: impl AsRef<Path>) -> Result<usize, RatingError> {
        let path = path.as_ref();
        let history = self.elo.match_history();
        if history.is_empty() {
            warn!("no match history to export");
            return Ok(0);
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| RatingError::io(parent, e))?;
        }
        let text = csv::to_csv(&MATCH_HISTORY_COLUMNS, history.iter().map(history_row));
        fs::write(path, text).map_err(|e| RatingError::io(path, e))?;
        info!(path = %path.display(), rows = history.len(), "exported match history");

        Ok(history.len())
    }

    /// Rebuild the ratings by replaying an exported match history, in file
    /// order, on a fresh engine with the current config. Only `model_a`,
    /// `model_b` and `score_a` are read. The current state is replaced and
    /// saved only if every row applies.
    pub fn import_from_csv(&mut self, path: impl AsRef<Path>) -> Result<usize, RatingError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| RatingError::io(path, e))?;
        let records = csv::parse(&text)?;

        let Some((header, rows)) = records.split_first() else {
            return Err(RatingError::csv(1, "missing header row"));
        };
        let column = |name: &str| {
            header
                .fields
                .iter()
                .position(|f| f.trim() == name)
                .ok_or_else(|| RatingError::csv(header.line, format!("missing column `{name}`")))
        };
        let col_a = column("model_a")?;
        let col_b = column("model_b")?;
        let col_score = column("score_a")?;

        let mut replay = EloRating::new(*self.elo.config());
        for row in rows {
            let field = |index: usize, name: &str| {
                row.get(index)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| RatingError::csv(row.line, format!("missing `{name}`")))
            };
            let model_a = field(col_a, "model_a")?;
            let model_b = field(col_b, "model_b")?;
            let raw_score = field(col_score, "score_a")?;
            let score_a: f64 = raw_score.parse().map_err(|_| {
                RatingError::csv(row.line, format!("score_a `{raw_score}` is not a number"))
            })?;

            replay
                .update_ratings(model_a, model_b, score_a)
                .map_err(|e| RatingError::csv(row.line, e.to_string()))?;
        }

        replay.save(&self.ratings_file)?;
        self.elo = replay;
        info!(path = %path.display(), rows = rows.len(), "imported match history");

        Ok(rows.len())
    }
}

fn history_row(record: &MatchRecord) -> Vec<String> {
    vec![
        timestamp::format(&record.timestamp),
        record.model_a.clone(),
        record.model_b.clone(),
        record.rating_a_before.to_string(),
        record.rating_b_before.to_string(),
        record.rating_a_after.to_string(),
        record.rating_b_after.to_string(),
        record.score_a.to_string(),
        record.score_b.to_string(),
    ]
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod manager_tests;
