use std::collections::HashMap;

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use startlist_entities::prelude::RankingMap;
use thiserror::Error;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RankingFileConfig {
    identifier_column: Option<usize>,
    rank_column: Option<usize>,
    delimiter: Option<u8>,
}

#[derive(Debug, Error)]
pub enum RankingImportError {
    #[error("Malformed ranking file: {source}")]
    Parse {
        #[from]
        source: csv::Error,
    },
    #[error("Could not read ranking file: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("Missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
enum RankingField {
    Identifier,
    Rank,
}

#[derive(Debug)]
pub struct RankingParseResult {
    pub ranking: RankingMap,
    pub warnings: Vec<RankingParseWarning>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RankingParseWarning {
    UnparseableRank { row: usize, value: String },
    DuplicateIdentifier { row: usize, identifier: String },
}

impl RankingFileConfig {
    /// Proposes a configuration by sniffing the delimiter and matching the
    /// header row against known column-name patterns.
    pub fn default_from_file<R>(mut reader: R) -> Result<RankingFileConfig, RankingImportError>
    where
        R: std::io::Read,
    {
        let delimiter_candidates = [b',', b';', b'\t'];
        let mut delimiter_counts = [0; 3];
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;

        let content = strip_bom(&buffer);
        for char in content.iter() {
            for (i, delimiter) in delimiter_candidates.iter().enumerate() {
                if char == delimiter {
                    delimiter_counts[i] += 1;
                }
            }
        }

        let delimiter = delimiter_counts
            .into_iter()
            .enumerate()
            .max_by_key(|(_, count)| *count)
            .map(|(i, _)| delimiter_candidates[i])
            .unwrap_or(b',');

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .from_reader(content);
        let headers = reader.headers()?;

        let mut config = Self::propose_config_from_headers(headers.into_iter());
        config.delimiter = Some(delimiter);
        Ok(config)
    }

    fn propose_config_from_headers<'a, I>(headers: I) -> RankingFileConfig
    where
        I: Iterator<Item = &'a str>,
    {
        lazy_static! {
            static ref FIELD_HEADER_PATTERNS: HashMap<RankingField, Regex> = {
                let identifier_patterns: Vec<&str> =
                    vec!["^id$", "identifier", "iof.?id", "licen[cs]e", "競技者.?id"];
                let rank_patterns: Vec<&str> = vec!["rank(ing)?", "^pos(ition)?$", "place", "順位"];

                let mut m = HashMap::new();
                m.insert(RankingField::Identifier, identifier_patterns);
                m.insert(RankingField::Rank, rank_patterns);

                m.into_iter()
                    .map(|(key, patterns)| {
                        (
                            key,
                            RegexBuilder::new(&patterns.join("|"))
                                .case_insensitive(true)
                                .build()
                                .unwrap(),
                        )
                    })
                    .collect()
            };
        }

        let mut proposed_column_assignment = HashMap::new();
        for (header_idx, header) in headers.enumerate() {
            let normalized: String = header.split_whitespace().join(" ");
            for (field, pattern) in FIELD_HEADER_PATTERNS.iter() {
                if pattern.is_match(&normalized)
                    && proposed_column_assignment.get(field) == None
                {
                    proposed_column_assignment.insert(*field, header_idx);
                }
            }
        }

        RankingFileConfig {
            identifier_column: proposed_column_assignment.remove(&RankingField::Identifier),
            rank_column: proposed_column_assignment.remove(&RankingField::Rank),
            delimiter: None,
        }
    }

    /// Parses the file into a ranking map. A missing identifier or rank
    /// column aborts with the missing set named; nothing is committed in that
    /// case. Rows whose rank cell does not parse are skipped with a warning,
    /// as are repeated identifiers (the first occurrence wins).
    pub fn parse<R>(&self, mut reader: R) -> Result<RankingParseResult, RankingImportError>
    where
        R: std::io::Read,
    {
        let mut missing = Vec::new();
        if self.identifier_column.is_none() {
            missing.push("identifier".to_string());
        }
        if self.rank_column.is_none() {
            missing.push("rank".to_string());
        }
        if !missing.is_empty() {
            return Err(RankingImportError::MissingColumns { columns: missing });
        }
        let identifier_idx = self.identifier_column.unwrap();
        let rank_idx = self.rank_column.unwrap();

        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter.unwrap_or(b','))
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(strip_bom(&buffer));

        let mut ranking = RankingMap::new();
        let mut warnings = Vec::new();

        for (row_idx, row) in reader.records().enumerate() {
            let row = row?;

            let identifier = row.get(identifier_idx).unwrap_or("").to_string();
            if identifier.is_empty() {
                continue;
            }
            if ranking.contains(&identifier) {
                warnings.push(RankingParseWarning::DuplicateIdentifier {
                    row: row_idx,
                    identifier,
                });
                continue;
            }

            let rank_cell = row.get(rank_idx).unwrap_or("");
            match rank_cell.parse::<u32>() {
                Ok(position) => ranking.insert(identifier, position),
                Err(_) => warnings.push(RankingParseWarning::UnparseableRank {
                    row: row_idx,
                    value: rank_cell.to_string(),
                }),
            }
        }

        Ok(RankingParseResult { ranking, warnings })
    }
}

fn strip_bom(buffer: &[u8]) -> &[u8] {
    buffer.strip_prefix(UTF8_BOM).unwrap_or(buffer)
}
