//! File helpers for declarations and corrections.

use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use vat_core::models::{CorrectionSet, Declaration};
use vat_core::{DeclarationParser, YearChain};

use crate::loader::CorrectionCsvLoader;

/// Reads and parses a declaration text file.
pub fn read_declaration(path: &Path) -> Result<Declaration> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read declaration '{}'", path.display()))?;
    let declaration = DeclarationParser::parse(&text)
        .with_context(|| format!("invalid declaration '{}'", path.display()))?;

    info!(
        path = %path.display(),
        rows = declaration.rows().len(),
        "read declaration"
    );
    Ok(declaration)
}

/// Reads a corrections CSV file and normalises it into a [`CorrectionSet`].
pub fn read_corrections(path: &Path) -> Result<CorrectionSet> {
    let file = File::open(path)
        .with_context(|| format!("cannot open corrections '{}'", path.display()))?;
    let inputs = CorrectionCsvLoader::parse(file)
        .with_context(|| format!("invalid corrections '{}'", path.display()))?;
    Ok(inputs.build())
}

/// Builds a chain from declaration files, one fiscal year per file.
///
/// Files may be given in any order; the chain orders years itself.
pub fn load_chain<P: AsRef<Path>>(paths: &[P]) -> Result<YearChain> {
    let mut chain = YearChain::new();

    for path in paths {
        let path = path.as_ref();
        let declaration = read_declaration(path)?;
        chain
            .add_year(declaration)
            .with_context(|| format!("cannot add '{}' to chain", path.display()))?;
    }

    Ok(chain)
}
