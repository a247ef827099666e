// src/core/html.rs
use std::sync::LazyLock;

use scraper::{ ElementRef, Html, Selector };

// Compile-time selector strings; parse() cannot fail on them.
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("tr selector"));
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").expect("cell selector"));

/// Visible text of one cell: every text node trimmed, empty ones dropped, glued together.
pub fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// One string per `<tr>` in document order: the row's non-empty cell texts joined by `sep`.
/// Cells of nested tables count towards every enclosing row.
pub fn row_texts(doc: &str, sep: &str) -> Vec<String> {
    let html = Html::parse_document(doc);
    html.select(&ROW)
        .map(|row| {
            row.select(&CELL)
                .map(cell_text)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(sep)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_non_empty_cells_in_column_order() {
        let doc = r#"
            <table>
              <tr><th>Name</th><th> </th><th>From</th></tr>
              <tr><td> LPD10 </td><td></td><td>10:00</td><td>12:00</td></tr>
            </table>
        "#;
        let rows = row_texts(doc, "|");
        assert_eq!(rows, vec!["Name|From", "LPD10|10:00|12:00"]);
    }

    #[test]
    fn cell_text_strips_each_fragment() {
        let doc = "<table><tr><td> SFC <br> / <b> 095 </b></td></tr></table>";
        let rows = row_texts(doc, "|");
        assert_eq!(rows, vec!["SFC/095"]);
    }

    #[test]
    fn entities_are_decoded() {
        let doc = "<table><tr><td>LP&#8209;R42</td><td>&nbsp;</td><td>A&amp;B</td></tr></table>";
        let rows = row_texts(doc, "|");
        assert_eq!(rows, vec!["LP\u{2011}R42|A&B"]);
    }

    #[test]
    fn no_rows_without_table() {
        assert!(row_texts("<p>nothing here</p>", "|").is_empty());
    }
}
