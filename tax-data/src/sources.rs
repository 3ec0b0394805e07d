use std::path::PathBuf;

use tax_core::{Jurisdiction, TableOverrides, TaxTableStore};
use tracing::info;

use crate::bracket_csv::BracketCsvLoader;
use crate::documents::OverrideDocumentLoader;
use crate::error::TableLoadError;

/// Where to read year overrides from.
///
/// Every source is optional; with none set the built-in tables are used as is.
/// CSV brackets are applied after both documents, so they win over any
/// `brackets` field a document sets for the same year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSources {
    pub federal: Option<PathBuf>,
    pub california: Option<PathBuf>,
    pub brackets_csv: Option<PathBuf>,
}

impl TableSources {
    pub fn is_empty(&self) -> bool {
        self.federal.is_none() && self.california.is_none() && self.brackets_csv.is_none()
    }

    /// Reads every configured source into one set of overrides.
    pub fn load_overrides(&self) -> Result<TableOverrides, TableLoadError> {
        let mut overrides = TableOverrides::default();

        let documents = [
            (Jurisdiction::Federal, &self.federal),
            (Jurisdiction::California, &self.california),
        ];
        for (jurisdiction, path) in documents {
            if let Some(path) = path {
                *overrides.for_jurisdiction_mut(jurisdiction) =
                    OverrideDocumentLoader::load(jurisdiction, path)?;
            }
        }

        if let Some(path) = &self.brackets_csv {
            BracketCsvLoader::load(path, &mut overrides)?;
        }

        Ok(overrides)
    }

    /// Builds a table store from the built-in baselines plus every source.
    pub fn build_store(&self) -> Result<TaxTableStore, TableLoadError> {
        if self.is_empty() {
            info!("no table overrides configured, using built-in tables");
            return Ok(TaxTableStore::baseline());
        }
        let overrides = self.load_overrides()?;
        Ok(TaxTableStore::with_overrides(&overrides))
    }
}
