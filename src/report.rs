//! text table of score histograms, one row per query, one column per score.
//!
//! ```text
//! gene         (len)    3 8 12
//! short        (4)      . 2  .
//! longer_one   (10)    11 .  1
//! ```

use std::collections::BTreeMap;
use std::io::Write;

use crate::dna::queries::QuerySet;

/// width of the column holding query lengths
const LEN_WIDTH: usize = 8;

/// writes the table. Scores appearing in no histogram get no column.
pub fn render_histograms<W: Write>(queries: &QuerySet, out: &mut W) -> std::io::Result<()> {
    // column widths : enough for score label and every count of the column
    let mut widths = BTreeMap::<u32, usize>::new();
    for query in queries.get_queries() {
        for (score, count) in query.get_histogram() {
            let w = widths.entry(*score).or_insert(0);
            *w = (*w).max(score.to_string().len()).max(count.to_string().len());
        }
    }
    let name_width = 2 + queries
        .get_queries()
        .iter()
        .map(|q| q.get_name().chars().count())
        .max()
        .unwrap_or(0);
    let len_width = LEN_WIDTH;
    // header row
    write!(out, "{:<name_width$} {:<len_width$}", "gene", "(len)")?;
    for (score, width) in &widths {
        write!(out, "{:>width$} ", score, width = *width)?;
    }
    writeln!(out)?;
    // query rows
    for query in queries.get_queries() {
        let len_label = format!("({})", query.len());
        write!(out, "{:<name_width$} {:<len_width$}", query.get_name(), len_label)?;
        for (score, width) in &widths {
            match query.get_histogram().get(score) {
                Some(count) => write!(out, "{:>width$} ", count, width = *width)?,
                None => write!(out, "{:>width$} ", ".", width = *width)?,
            }
        }
        writeln!(out)?;
    }
    writeln!(out)?;
    //
    Ok(())
} // end of render_histograms
