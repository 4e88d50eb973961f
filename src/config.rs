//! Property-tree-style configuration parsing for the two processors, read
//! from a `serde_json::Value` the way the teacher crate leans on
//! `serde_json` for ad-hoc document parsing rather than a bespoke format.

use serde_json::Value as Json;

use crate::error::{Error, Result};
use crate::scorer::Heuristic;
use crate::unionizer::TagStrategy;

/// Parsed `union_*` configuration (§6).
#[derive(Debug, Clone)]
pub struct UnionizerConfig {
    pub heuristic: Heuristic,
    pub tag_strategy: TagStrategy,
    pub keep_ids_tag: Option<String>,
    pub max_iterations: usize,
    pub match_tags: Vec<String>,
    pub preserve_direction_tags: Vec<String>,
    pub angle_union_sample_ratio: f64,
}

impl Default for UnionizerConfig {
    fn default() -> Self {
        UnionizerConfig {
            heuristic: Heuristic::Greedy,
            tag_strategy: TagStrategy::Intersect,
            keep_ids_tag: None,
            max_iterations: usize::MAX,
            match_tags: Vec::new(),
            preserve_direction_tags: Vec::new(),
            angle_union_sample_ratio: 0.1,
        }
    }
}

impl UnionizerConfig {
    /// Parses a config tree such as:
    /// ```json
    /// {"union_heuristic": "obtuse", "tag_strategy": "accumulate", "match_tags": ["road"]}
    /// ```
    pub fn from_json(value: &Json) -> Result<Self> {
        let mut config = UnionizerConfig::default();

        if let Some(s) = value.get("union_heuristic").and_then(Json::as_str) {
            config.heuristic = match s {
                "greedy" => Heuristic::Greedy,
                "obtuse" => Heuristic::Obtuse,
                "acute" => Heuristic::Acute,
                other => {
                    return Err(Error::config(format!("unrecognized union_heuristic: {other}")));
                }
            };
        }

        if let Some(s) = value.get("tag_strategy").and_then(Json::as_str) {
            config.tag_strategy = match s {
                "intersect" => TagStrategy::Intersect,
                "accumulate" => TagStrategy::Accumulate,
                other => return Err(Error::config(format!("unrecognized tag_strategy: {other}"))),
            };
        }

        if let Some(s) = value.get("keep_ids_tag").and_then(Json::as_str) {
            config.keep_ids_tag = Some(s.to_string());
        }

        if let Some(n) = value.get("max_iterations").and_then(Json::as_u64) {
            config.max_iterations = n as usize;
        }

        if let Some(tags) = value.get("match_tags") {
            config.match_tags = string_list(tags, "match_tags")?;
        }

        if let Some(tags) = value.get("preserve_direction_tags") {
            config.preserve_direction_tags = string_list(tags, "preserve_direction_tags")?;
        }

        if let Some(r) = value.get("angle_union_sample_ratio").and_then(Json::as_f64) {
            if !(r > 0.0 && r <= 0.5) {
                return Err(Error::config(format!(
                    "angle_union_sample_ratio must lie in (0, 0.5], got {r}"
                )));
            }
            config.angle_union_sample_ratio = r;
        }

        Ok(config)
    }
}

/// Parsed adminizer configuration (§6). The `datasource` subtree is opaque
/// to this crate and handed to whatever datasource factory the caller wires
/// up; it is kept as a raw `Json` value here.
#[derive(Debug, Clone)]
pub struct AdminizerConfig {
    pub param_name: String,
    pub datasource: Json,
}

impl AdminizerConfig {
    pub fn from_json(value: &Json) -> Result<Self> {
        let param_name = value
            .get("param_name")
            .and_then(Json::as_str)
            .ok_or_else(|| Error::config("param_name is required"))?
            .to_string();

        let datasource = value.get("datasource").cloned().unwrap_or(Json::Null);

        Ok(AdminizerConfig { param_name, datasource })
    }
}

fn string_list(value: &Json, key: &str) -> Result<Vec<String>> {
    value
        .as_array()
        .ok_or_else(|| Error::config(format!("{key} must be a list of strings")))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| Error::config(format!("{key} must be a list of strings")))
        })
        .collect()
}
