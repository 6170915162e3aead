//! Readers for the tab separated side inputs of a visualization (fluxes, compound pairs,
//! colors, excluded pairs, subsets)
use std::path::{Path, PathBuf};

use csv::StringRecord;
use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use crate::metabolic_model::metabolite::Compound;

/// One row of a compound pair file
#[derive(Clone, Debug, PartialEq)]
pub struct PairRow {
    pub reaction: String,
    pub first: String,
    pub second: String,
    /// Formula of the transferred group, when the file provides one
    pub formula: Option<String>,
}

fn read_rows(path: &Path) -> Result<Vec<(u64, StringRecord)>, TableError> {
    let unreadable = |source| TableError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(unreadable)?;
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(unreadable)?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        rows.push((line, record));
    }
    Ok(rows)
}

fn require_columns(
    path: &Path,
    line: u64,
    record: &StringRecord,
    count: usize,
) -> Result<(), TableError> {
    if record.len() < count {
        return Err(TableError::MalformedRow {
            path: path.to_path_buf(),
            line,
            reason: format!("expected at least {} columns, found {}", count, record.len()),
        });
    }
    Ok(())
}

/// Read a `reaction_id<TAB>flux` table
pub fn read_flux_table<P: AsRef<Path>>(path: P) -> Result<IndexMap<String, f64>, TableError> {
    let path = path.as_ref();
    let mut fluxes = IndexMap::new();
    for (line, record) in read_rows(path)? {
        require_columns(path, line, &record, 2)?;
        let flux = record[1]
            .parse::<f64>()
            .ok()
            .filter(|flux| flux.is_finite())
            .ok_or_else(|| TableError::MalformedRow {
                path: path.to_path_buf(),
                line,
                reason: format!("flux `{}` is not a finite number", &record[1]),
            })?;
        fluxes.insert(record[0].to_string(), flux);
    }
    Ok(fluxes)
}

/// Read a `reaction_id<TAB>compound1<TAB>compound2[<TAB>formula]` table
pub fn read_pair_table<P: AsRef<Path>>(path: P) -> Result<Vec<PairRow>, TableError> {
    let path = path.as_ref();
    let mut pairs = Vec::new();
    for (line, record) in read_rows(path)? {
        require_columns(path, line, &record, 3)?;
        pairs.push(PairRow {
            reaction: record[0].to_string(),
            first: record[1].to_string(),
            second: record[2].to_string(),
            formula: record
                .get(3)
                .filter(|f| !f.is_empty())
                .map(|f| f.to_string()),
        });
    }
    Ok(pairs)
}

/// Read an `id<TAB>hex_color` table
pub fn read_color_table<P: AsRef<Path>>(path: P) -> Result<IndexMap<String, String>, TableError> {
    let path = path.as_ref();
    let mut colors = IndexMap::new();
    for (line, record) in read_rows(path)? {
        require_columns(path, line, &record, 2)?;
        colors.insert(record[0].to_string(), record[1].to_string());
    }
    Ok(colors)
}

/// Read a `compound1<TAB>compound2` table of pairs to remove from every graph
///
/// Each row excludes the pair in both orientations.
pub fn read_exclude_pairs<P: AsRef<Path>>(
    path: P,
    lookup: &IndexMap<String, Compound>,
) -> Result<IndexSet<(Compound, Compound)>, TableError> {
    let path = path.as_ref();
    let mut excluded = IndexSet::new();
    for (line, record) in read_rows(path)? {
        require_columns(path, line, &record, 2)?;
        let resolve = |id: &str| {
            lookup.get(id).cloned().ok_or_else(|| TableError::UnknownCompound {
                path: path.to_path_buf(),
                line,
                compound: id.to_string(),
            })
        };
        let first = resolve(&record[0])?;
        let second = resolve(&record[1])?;
        excluded.insert((first.clone(), second.clone()));
        excluded.insert((second, first));
    }
    Ok(excluded)
}

/// Read a newline delimited list of ids
pub fn read_subset<P: AsRef<Path>>(path: P) -> Result<Vec<String>, TableError> {
    let path = path.as_ref();
    Ok(read_rows(path)?
        .into_iter()
        .map(|(_, record)| record[0].to_string())
        .collect())
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Unable to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Malformed row at {}:{line}, {reason}", .path.display())]
    MalformedRow {
        path: PathBuf,
        line: u64,
        reason: String,
    },
    #[error("Unknown compound `{compound}` at {}:{line}", .path.display())]
    UnknownCompound {
        path: PathBuf,
        line: u64,
        compound: String,
    },
}
