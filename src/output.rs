//! Assembly of recognized cell text into rows, columns and CSV.
//!
//! Cells arrive in row-major order; the column of a cell is its index
//! modulo the column count, so one pass suffices to group values without
//! any shared accumulators.

/// Clean up one recognized cell string.
///
/// OCR tends to hallucinate punctuation at the start and end of the text,
/// so leading/trailing runs of characters outside `[A-Za-z0-9.()]` are
/// stripped. Commas are removed everywhere because the output is CSV.
pub fn clean_cell_text(raw: &str) -> String {
    let trimmed = raw.trim();
    let keep = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '(' | ')');
    let start = trimmed.find(keep);
    let cleaned = match start {
        Some(start) => {
            let end = trimmed.rfind(keep).map(|i| i + 1).unwrap_or(trimmed.len());
            &trimmed[start..end]
        }
        None => "",
    };
    cleaned.replace(',', "").trim().to_string()
}

/// Group row-major cell values by column index.
///
/// `result[j]` holds every value from column `j`, top to bottom. A trailing
/// partial row contributes to the columns it reaches.
pub fn columns_from_row_major(texts: &[String], num_columns: usize) -> Vec<Vec<String>> {
    let mut columns = vec![Vec::new(); num_columns.max(1)];
    if num_columns == 0 {
        return columns;
    }
    for (i, text) in texts.iter().enumerate() {
        columns[i % num_columns].push(text.clone());
    }
    columns
}

/// Render row-major cell values as a CSV string, one table row per line.
pub fn rows_to_csv(texts: &[String], num_columns: usize) -> String {
    if num_columns == 0 {
        return String::new();
    }
    let mut csv = String::new();
    for row in texts.chunks(num_columns) {
        csv.push_str(&row.join(","));
        csv.push('\n');
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cleanup_strips_junk_edges() {
        assert_eq!(clean_cell_text("  ~United States! "), "United States");
        assert_eq!(clean_cell_text("$12,345.67%"), "12345.67");
        assert_eq!(clean_cell_text("(USD)"), "(USD)");
        assert_eq!(clean_cell_text(" ^*~ "), "");
        assert_eq!(clean_cell_text(""), "");
    }

    #[test]
    fn cleanup_keeps_interior_punctuation() {
        assert_eq!(clean_cell_text("--U.S. Dollar--"), "U.S. Dollar");
    }

    #[test]
    fn columns_are_grouped_by_index_modulo_count() {
        let texts = strings(&["a", "b", "c", "d", "e", "f"]);
        let columns = columns_from_row_major(&texts, 3);
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0], strings(&["a", "d"]));
        assert_eq!(columns[1], strings(&["b", "e"]));
        assert_eq!(columns[2], strings(&["c", "f"]));
    }

    #[test]
    fn zero_columns_yield_nothing() {
        let texts = strings(&["a"]);
        assert!(columns_from_row_major(&texts, 0).iter().all(Vec::is_empty));
        assert_eq!(rows_to_csv(&texts, 0), "");
    }

    #[test]
    fn csv_renders_row_major() {
        let texts = strings(&["a", "b", "c", "d", "e", "f"]);
        assert_eq!(rows_to_csv(&texts, 3), "a,b,c\nd,e,f\n");
    }
}
