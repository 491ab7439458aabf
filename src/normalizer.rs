//! Page text normalization.
//!
//! The text decoder emits every table column as its own blank-line separated
//! block, one value per line. This module cuts the table out of a page and
//! turns those column blocks back into rows.

use crate::error::{PileError, Result};
use crate::layout::ReportLayout;
use tracing::debug;

/// Extract the pile table of one page as rows of column strings
///
/// Everything after the layout's table marker is split on blank lines, the
/// trailing footer blocks are dropped, empty blocks are discarded and the
/// remaining column blocks are transposed into rows.
pub fn normalize_page(page: &str, layout: &ReportLayout) -> Result<Vec<Vec<String>>> {
    let start = page.find(&layout.table_marker).ok_or_else(|| {
        PileError::format(format!(
            "table marker '{}' not found (layout {})",
            layout.table_marker, layout.version
        ))
    })?;
    let body = &page[start + layout.table_marker.len()..];

    let mut blocks: Vec<&str> = body.split("\n\n").collect();
    blocks.truncate(blocks.len().saturating_sub(layout.trailing_blocks));

    let columns: Vec<Vec<&str>> = blocks
        .into_iter()
        .filter(|block| !block.is_empty())
        .map(|block| block.split('\n').collect())
        .collect();

    let rows = transpose_blocks(&columns)?;
    debug!(
        "Normalized page: {} column blocks, {} rows",
        columns.len(),
        rows.len()
    );
    Ok(rows)
}

/// Zip parallel column blocks into rows
///
/// Row `i` holds line `i` of every block. All blocks must have the same
/// number of lines; a shorter or longer block means the page was decoded
/// out of alignment and is reported instead of being truncated.
pub fn transpose_blocks<S: AsRef<str>>(blocks: &[Vec<S>]) -> Result<Vec<Vec<String>>> {
    let Some(first) = blocks.first() else {
        return Ok(Vec::new());
    };
    let height = first.len();

    if let Some((index, block)) = blocks
        .iter()
        .enumerate()
        .find(|(_, block)| block.len() != height)
    {
        return Err(PileError::format(format!(
            "column block {} has {} lines, expected {}",
            index,
            block.len(),
            height
        )));
    }

    Ok((0..height)
        .map(|row| {
            blocks
                .iter()
                .map(|block| block[row].as_ref().to_string())
                .collect()
        })
        .collect())
}
