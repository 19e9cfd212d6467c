//! Catalog loading.
//!
//! The catalog is a JSON array of item records supplied at startup and
//! treated as read-only for the lifetime of the process. Rows missing
//! a required field are dropped with a warning, matching how the
//! ranker treats malformed candidates.

use learntwin_algo::ItemRecord;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog is not a JSON array: {0}")]
    Parse(#[from] serde_json::Error),
}

pub fn load_catalog(path: &str) -> Result<Vec<ItemRecord>, CatalogError> {
    let raw = std::fs::read_to_string(path)?;
    let rows: Vec<serde_json::Value> = serde_json::from_str(&raw)?;

    let mut items = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;
    for row in &rows {
        match ItemRecord::from_value(row) {
            Some(item) => items.push(item),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        tracing::warn!(dropped, path, "catalog rows missing itemId/skillId were skipped");
    }
    tracing::info!(items = items.len(), path, "catalog loaded");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_valid_rows_and_drops_malformed_ones() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"itemId": "i1", "skillId": "add", "difficulty": 0.4}},
                {{"skillId": "orphan"}},
                {{"itemId": "i2", "skillId": "sub"}}
            ]"#
        )
        .unwrap();

        let items = load_catalog(file.path().to_str().unwrap()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item_id, "i1");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            load_catalog("/nonexistent/catalog.json"),
            Err(CatalogError::Io(_))
        ));
    }
}
