//! Elo rating calculation and tracking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RatingError;

/// Parameters of the rating model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EloConfig {
    /// Starting rating for new models
    pub initial_rating: i64,
    /// K-factor for updates (higher = more volatile)
    pub k_factor: i64,
    /// Rating difference that makes a side ten times as likely to win
    pub scale_factor: i64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            initial_rating: 1000,
            k_factor: 32,
            scale_factor: 400,
        }
    }
}

impl EloConfig {
    pub fn validate(&self) -> Result<(), RatingError> {
        if self.scale_factor <= 0 {
            return Err(RatingError::InvalidConfig(format!(
                "scale_factor must be positive, got {}",
                self.scale_factor
            )));
        }
        if self.k_factor < 0 {
            return Err(RatingError::InvalidConfig(format!(
                "k_factor must not be negative, got {}",
                self.k_factor
            )));
        }
        Ok(())
    }
}

/// One entry of a model's rating history. Serialized as `[timestamp, rating]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingPoint(#[serde(with = "timestamp")] pub DateTime<Utc>, pub i64);

impl RatingPoint {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn rating(&self) -> i64 {
        self.1
    }
}

/// Record of a single pairwise update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub model_a: String,
    pub model_b: String,
    pub rating_a_before: i64,
    pub rating_b_before: i64,
    pub rating_a_after: i64,
    pub rating_b_after: i64,
    pub score_a: f64,
    pub score_b: f64,
}

impl MatchRecord {
    pub fn involves(&self, model: &str) -> bool {
        self.model_a == model || self.model_b == model
    }
}

/// Elo rating system for tracking model strength.
///
/// Models are kept in the order they were first seen; that order breaks
/// ties in [`rankings`](Self::rankings) and survives a save/load cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RatingDocument", try_from = "RatingDocument")]
pub struct EloRating {
    config: EloConfig,
    models: Vec<String>,
    ratings: HashMap<String, i64>,
    rating_history: HashMap<String, Vec<RatingPoint>>,
    match_history: Vec<MatchRecord>,
}

impl Default for EloRating {
    fn default() -> Self {
        Self::new(EloConfig::default())
    }
}

impl EloRating {
    pub fn new(config: EloConfig) -> Self {
        Self {
            config,
            models: Vec::new(),
            ratings: HashMap::new(),
            rating_history: HashMap::new(),
            match_history: Vec::new(),
        }
    }

    pub fn config(&self) -> &EloConfig {
        &self.config
    }

    /// Register a model. Returns `false` if it was already known, in which
    /// case nothing changes.
    pub fn add_model(&mut self, model: &str, initial_rating: Option<i64>) -> bool {
        if self.ratings.contains_key(model) {
            return false;
        }
        let rating = initial_rating.unwrap_or(self.config.initial_rating);
        self.models.push(model.to_string());
        self.ratings.insert(model.to_string(), rating);
        self.rating_history
            .insert(model.to_string(), vec![RatingPoint(Utc::now(), rating)]);
        true
    }

    /// Get or initialize the rating of a model.
    pub fn rating(&mut self, model: &str) -> i64 {
        self.add_model(model, None);
        self.ratings[model]
    }

    /// Current rating without registering the model.
    pub fn current_rating(&self, model: &str) -> Option<i64> {
        self.ratings.get(model).copied()
    }

    pub fn contains(&self, model: &str) -> bool {
        self.ratings.contains_key(model)
    }

    /// Model labels in insertion order.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// `(model, rating)` in insertion order.
    pub fn ratings(&self) -> Vec<(&str, i64)> {
        self.models
            .iter()
            .map(|m| (m.as_str(), self.ratings[m]))
            .collect()
    }

    pub fn rating_history(&self, model: &str) -> &[RatingPoint] {
        self.rating_history
            .get(model)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn match_history(&self) -> &[MatchRecord] {
        &self.match_history
    }

    pub fn games_played(&self, model: &str) -> usize {
        self.match_history.iter().filter(|r| r.involves(model)).count()
    }

    /// Expected score of a player rated `rating_a` against one rated
    /// `rating_b`.
    pub fn expected_score(&self, rating_a: i64, rating_b: i64) -> f64 {
        let exponent = (rating_b - rating_a) as f64 / self.config.scale_factor as f64;
        1.0 / (1.0 + 10.0_f64.powf(exponent))
    }

    /// Apply one pairwise result. `score_a` is A's outcome in `[0, 1]`.
    ///
    /// Each side moves by `K * (actual - expected)` using its own
    /// expectation, rounded to the nearest integer. Unseen models are
    /// created first. Returns the new `(rating_a, rating_b)`.
    pub fn update_ratings(
        &mut self,
        model_a: &str,
        model_b: &str,
        score_a: f64,
    ) -> Result<(i64, i64), RatingError> {
        if !score_a.is_finite() || !(0.0..=1.0).contains(&score_a) {
            return Err(RatingError::InvalidScore(score_a));
        }
        if model_a == model_b {
            return Err(RatingError::SameModel(model_a.to_string()));
        }

        let rating_a = self.rating(model_a);
        let rating_b = self.rating(model_b);
        let expected_a = self.expected_score(rating_a, rating_b);
        let expected_b = self.expected_score(rating_b, rating_a);
        let score_b = 1.0 - score_a;

        let k = self.config.k_factor as f64;
        let new_a = (rating_a as f64 + k * (score_a - expected_a)).round_ties_even() as i64;
        let new_b = (rating_b as f64 + k * (score_b - expected_b)).round_ties_even() as i64;

        let now = Utc::now();
        self.set_rating(model_a, new_a, now);
        self.set_rating(model_b, new_b, now);

        self.match_history.push(MatchRecord {
            timestamp: now,
            model_a: model_a.to_string(),
            model_b: model_b.to_string(),
            rating_a_before: rating_a,
            rating_b_before: rating_b,
            rating_a_after: new_a,
            rating_b_after: new_b,
            score_a,
            score_b,
        });

        Ok((new_a, new_b))
    }

    fn set_rating(&mut self, model: &str, rating: i64, at: DateTime<Utc>) {
        self.ratings.insert(model.to_string(), rating);
        self.rating_history
            .entry(model.to_string())
            .or_default()
            .push(RatingPoint(at, rating));
    }

    /// All models by rating, highest first; equal ratings keep insertion
    /// order.
    pub fn rankings(&self) -> Vec<(String, i64)> {
        let mut entries: Vec<(String, i64)> = self
            .models
            .iter()
            .map(|m| (m.clone(), self.ratings[m]))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    /// `m[i][j]` is the probability that `models[i]` beats `models[j]`.
    /// Unknown models are treated as freshly rated.
    pub fn win_probability_matrix(&self, models: &[&str]) -> Vec<Vec<f64>> {
        let ratings: Vec<i64> = models
            .iter()
            .map(|m| self.current_rating(m).unwrap_or(self.config.initial_rating))
            .collect();

        ratings
            .iter()
            .enumerate()
            .map(|(i, &ra)| {
                ratings
                    .iter()
                    .enumerate()
                    .map(|(j, &rb)| if i == j { 0.5 } else { self.expected_score(ra, rb) })
                    .collect()
            })
            .collect()
    }

    pub fn format_leaderboard(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Model Leaderboard ===\n");
        out.push_str(&format!(
            "{:>4}  {:<30} {:>8} {:>8}\n",
            "Rank", "Model", "Elo", "Games"
        ));
        out.push_str(&"-".repeat(54));
        out.push('\n');
        for (rank, (model, rating)) in self.rankings().into_iter().enumerate() {
            out.push_str(&format!(
                "{:>4}  {:<30} {:>8} {:>8}\n",
                rank + 1,
                model,
                rating,
                self.games_played(&model)
            ));
        }
        out
    }

    /// Load from a JSON file; a missing file yields a fresh default engine.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RatingError> {
        Self::load_or(path, EloConfig::default())
    }

    /// Load from a JSON file; a missing file yields a fresh engine with
    /// `config`. An existing file keeps its own config.
    pub fn load_or(path: impl AsRef<Path>, config: EloConfig) -> Result<Self, RatingError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| RatingError::Json {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new(config)),
            Err(e) => Err(RatingError::io(path, e)),
        }
    }

    /// Save to a JSON file, creating parent directories. The document is
    /// written next to the target and renamed over it.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RatingError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| RatingError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|source| RatingError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let tmp = tmp_path(path);
        fs::write(&tmp, json).map_err(|e| RatingError::io(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| RatingError::io(path, e))
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

// =============================================================================
// On-disk document
// =============================================================================

#[derive(Serialize, Deserialize)]
struct RatingDocument {
    #[serde(with = "ordered_map")]
    ratings: Vec<(String, i64)>,
    #[serde(with = "ordered_map")]
    rating_history: Vec<(String, Vec<RatingPoint>)>,
    #[serde(default)]
    match_history: Vec<MatchRecord>,
    #[serde(default)]
    config: EloConfig,
}

impl From<EloRating> for RatingDocument {
    fn from(mut elo: EloRating) -> Self {
        let ratings = elo
            .models
            .iter()
            .map(|m| (m.clone(), elo.ratings[m]))
            .collect();
        let rating_history = elo
            .models
            .iter()
            .map(|m| (m.clone(), elo.rating_history.remove(m).unwrap_or_default()))
            .collect();
        Self {
            ratings,
            rating_history,
            match_history: elo.match_history,
            config: elo.config,
        }
    }
}

impl TryFrom<RatingDocument> for EloRating {
    type Error = RatingError;

    fn try_from(doc: RatingDocument) -> Result<Self, Self::Error> {
        doc.config.validate()?;

        let mut elo = EloRating::new(doc.config);
        for (model, rating) in doc.ratings {
            if elo.ratings.contains_key(&model) {
                return Err(RatingError::Inconsistent(format!(
                    "model `{model}` rated twice"
                )));
            }
            elo.models.push(model.clone());
            elo.ratings.insert(model, rating);
        }

        for (model, history) in doc.rating_history {
            let Some(&rating) = elo.ratings.get(&model) else {
                return Err(RatingError::Inconsistent(format!(
                    "history for unrated model `{model}`"
                )));
            };
            match history.last() {
                Some(last) if last.rating() == rating => {}
                Some(last) => {
                    return Err(RatingError::Inconsistent(format!(
                        "model `{model}` is rated {rating} but its history ends at {}",
                        last.rating()
                    )))
                }
                None => {
                    return Err(RatingError::Inconsistent(format!(
                        "model `{model}` has an empty history"
                    )))
                }
            }
            if elo.rating_history.insert(model.clone(), history).is_some() {
                return Err(RatingError::Inconsistent(format!(
                    "model `{model}` has two histories"
                )));
            }
        }

        if let Some(model) = elo
            .models
            .iter()
            .find(|m| !elo.rating_history.contains_key(*m))
        {
            return Err(RatingError::Inconsistent(format!(
                "model `{model}` has no history"
            )));
        }

        elo.match_history = doc.match_history;
        Ok(elo)
    }
}

/// A JSON object read and written as a list of entries, keeping key order.
mod ordered_map {
    use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
    use serde::ser::{Serialize, Serializer};
    use std::fmt;
    use std::marker::PhantomData;

    pub fn serialize<S, V>(entries: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        serializer.collect_map(entries.iter().map(|(k, v)| (k, v)))
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = Vec<(String, V)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map keyed by model label")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// RFC 3339 on write. Reads RFC 3339 as well as naive ISO-8601 stamps,
/// which are taken to be UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        let raw = raw.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(|_| format!("unrecognized timestamp `{raw}`"))
    }
}

#[cfg(test)]
#[path = "elo_tests.rs"]
mod elo_tests;
