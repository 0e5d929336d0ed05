//! ASCII rendering of an accumulated table.
//!
//! The traversal collects a table into a flat list of header cells, a
//! matrix of body cells and a flat list of footer cells; [`render_table`]
//! lays that out as a bordered box of text:
//!
//! ```text
//! +-------------+-------------+
//! |  HEADER 1   |  HEADER 2   |
//! +-------------+-------------+
//! | Row 1 Col 1 | Row 1 Col 2 |
//! +-------------+-------------+
//! |  FOOTER 1   |  FOOTER 2   |
//! +-------------+-------------+
//! ```
//!
//! Every aspect of the drawing is controlled by a [`TableStyle`].

use regex::Regex;
use std::sync::LazyLock;
use unicode_width::UnicodeWidthStr;

static ANSI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("\x1b\\[(?:[0-9]{1,3}(?:;[0-9]{1,3})*)?[m|K]").expect("valid ANSI escape regex")
});

static DECIMAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:[0-9]{1,3}(?:,[0-9]{3})*|[0-9]+)(?:\.[0-9]+)?$").expect("valid decimal regex")
});

/// Cost added to a line which overflows the wrap limit.
const OVERFLOW_PENALTY: i64 = 100_000;

/// Horizontal alignment of cell text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Centre headers and footers; right-align numbers and left-align
    /// everything else in body cells.
    #[default]
    Default,
    /// Centre the text.
    Center,
    /// Align to the right edge.
    Right,
    /// Align to the left edge.
    Left,
}

/// Which outer edges of the table are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Borders {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Default for Borders {
    fn default() -> Self {
        Borders {
            left: true,
            right: true,
            top: true,
            bottom: true,
        }
    }
}

/// Options controlling how pretty tables are drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableStyle {
    /// Title-case header and footer text: `_` becomes a space, so does `.`
    /// unless it sits inside a number, and the result is upper-cased.
    pub auto_format_header: bool,
    /// Wrap cells wider than `col_width`.
    pub auto_wrap_text: bool,
    /// Join a cell's lines into one paragraph before wrapping it.
    pub reflow_during_auto_wrap: bool,
    /// Wrap limit for cells, in character cells.  A single longer word
    /// widens the column instead of being split.
    pub col_width: usize,
    /// Vertical line between columns.
    pub column_separator: String,
    /// Character of horizontal rules.
    pub row_separator: String,
    /// Junction of horizontal and vertical lines.
    pub center_separator: String,
    /// Alignment of header cells.
    pub header_alignment: Alignment,
    /// Alignment of footer cells.
    pub footer_alignment: Alignment,
    /// Alignment of body cells.
    pub alignment: Alignment,
    /// Per-column alignment of body cells.  Rows with more cells than
    /// this list fall back to `alignment` for every column.
    pub column_alignment: Vec<Alignment>,
    /// Line terminator.
    pub new_line: String,
    /// Draw a rule under the header.
    pub header_line: bool,
    /// Draw a rule after every body row.
    pub row_line: bool,
    /// Blank out a body cell identical to the one above it.
    pub auto_merge_cells: bool,
    /// Outer edges to draw.
    pub borders: Borders,
}

impl Default for TableStyle {
    fn default() -> Self {
        TableStyle {
            auto_format_header: true,
            auto_wrap_text: true,
            reflow_during_auto_wrap: true,
            col_width: 30,
            column_separator: "|".into(),
            row_separator: "-".into(),
            center_separator: "+".into(),
            header_alignment: Alignment::Default,
            footer_alignment: Alignment::Default,
            alignment: Alignment::Default,
            column_alignment: Vec::new(),
            new_line: "\n".into(),
            header_line: true,
            row_line: false,
            auto_merge_cells: false,
            borders: Borders::default(),
        }
    }
}

/// Width in cells, ignoring ANSI colour sequences.
fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(ANSI_RE.replace_all(s, "").as_ref())
}

fn is_num_or_space(c: char) -> bool {
    c.is_ascii_digit() || c == ' '
}

/// Format header/footer text.
fn title(name: &str) -> String {
    let mut chars: Vec<char> = name.chars().collect();
    let last = chars.len().saturating_sub(1);
    for i in 0..chars.len() {
        match chars[i] {
            '_' => chars[i] = ' ',
            // Keep the point of numbers such as 0.5
            '.' => {
                if (i != 0 && !is_num_or_space(chars[i - 1]))
                    || (i != last && !is_num_or_space(chars[i + 1]))
                {
                    chars[i] = ' ';
                }
            }
            _ => {}
        }
    }
    let formatted: String = chars.into_iter().collect();
    let trimmed = formatted.trim();
    if trimmed.is_empty() && !name.is_empty() {
        // Keep blank lines of multi-line headers.
        return " ".into();
    }
    trimmed.to_uppercase()
}

fn pad_center(s: &str, width: usize) -> String {
    let gap = width.saturating_sub(display_width(s));
    let left = gap / 2;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(gap - left))
}

fn pad_right(s: &str, width: usize) -> String {
    let gap = width.saturating_sub(display_width(s));
    format!("{}{}", s, " ".repeat(gap))
}

fn pad_left(s: &str, width: usize) -> String {
    let gap = width.saturating_sub(display_width(s));
    format!("{}{}", " ".repeat(gap), s)
}

/// The padding used for headers and footers.
fn pad_for(align: Alignment) -> fn(&str, usize) -> String {
    match align {
        Alignment::Left => pad_right,
        Alignment::Right => pad_left,
        Alignment::Default | Alignment::Center => pad_center,
    }
}

/// Break `words` into lines of at most `limit` cells, minimising the sum of
/// squared trailing gaps over all but the last line.
fn wrap_words<'w>(words: &[&'w str], limit: usize) -> Vec<Vec<&'w str>> {
    let n = words.len();
    let mut prefix = vec![0usize; n + 1];
    for (i, w) in words.iter().enumerate() {
        prefix[i + 1] = prefix[i] + display_width(w);
    }
    // Width of words[i..=j] joined by single spaces.
    let length = |i: usize, j: usize| prefix[j + 1] - prefix[i] + (j - i);

    let mut next_break = vec![n; n];
    let mut cost = vec![i64::from(i32::MAX); n];
    for i in (0..n).rev() {
        if length(i, n - 1) <= limit {
            cost[i] = 0;
            next_break[i] = n;
            continue;
        }
        for j in i + 1..n {
            let len = length(i, j - 1);
            let d = limit as i64 - len as i64;
            let mut c = d * d + cost[j];
            if len > limit {
                c += OVERFLOW_PENALTY;
            }
            if c < cost[i] {
                cost[i] = c;
                next_break[i] = j;
            }
        }
    }

    let mut lines = Vec::new();
    let mut i = 0;
    while i < n {
        let end = next_break[i].max(i + 1);
        lines.push(words[i..end].to_vec());
        i = end;
    }
    lines
}

/// Wrap `s` at `limit` cells (raised to the widest word, if wider).
fn wrap_string(s: &str, limit: usize) -> Vec<String> {
    let flat = s.replace('\n', " ");
    let words: Vec<&str> = flat.split(' ').collect();
    let limit = words
        .iter()
        .map(|w| display_width(w))
        .fold(limit, usize::max);
    wrap_words(&words, limit)
        .into_iter()
        .map(|line| line.join(" "))
        .collect()
}

/// The state of one table being laid out.
struct TableLayout<'a> {
    style: &'a TableStyle,
    out: String,
    col_widths: Vec<usize>,
    headers: Vec<Vec<String>>,
    header_height: usize,
    footers: Vec<Vec<String>>,
    footer_height: usize,
    rows: Vec<Vec<Vec<String>>>,
    row_heights: Vec<usize>,
    column_alignment: Vec<Alignment>,
}

impl<'a> TableLayout<'a> {
    fn new(style: &'a TableStyle) -> TableLayout<'a> {
        TableLayout {
            style,
            out: String::new(),
            col_widths: Vec::new(),
            headers: Vec::new(),
            header_height: 0,
            footers: Vec::new(),
            footer_height: 0,
            rows: Vec::new(),
            row_heights: Vec::new(),
            column_alignment: style.column_alignment.clone(),
        }
    }

    /// Split a cell into its display lines, widening column `col` to fit.
    fn parse_dimension(&mut self, cell: &str, col: usize) -> Vec<String> {
        let style = self.style;
        let mut raw: Vec<String> = cell.split('\n').map(String::from).collect();
        let mut max_width = raw.iter().map(|l| display_width(l)).max().unwrap_or(0);

        if style.auto_wrap_text {
            max_width = max_width.min(style.col_width);
            // A word longer than the limit widens the column again.
            let mut new_max_width = max_width;
            let paragraphs = if style.reflow_during_auto_wrap {
                vec![raw.join(" ")]
            } else {
                raw
            };
            let mut new_raw = Vec::new();
            for (i, para) in paragraphs.iter().enumerate() {
                let lines = wrap_string(para, max_width);
                for line in &lines {
                    new_max_width = new_max_width.max(display_width(line));
                }
                if i > 0 {
                    new_raw.push(" ".to_string());
                }
                new_raw.extend(lines);
            }
            raw = new_raw;
            max_width = new_max_width;
        }

        if self.col_widths.len() <= col {
            self.col_widths.resize(col + 1, 0);
        }
        self.col_widths[col] = self.col_widths[col].max(max_width);
        raw
    }

    fn set_header(&mut self, cells: &[String]) {
        for (i, cell) in cells.iter().enumerate() {
            let lines = self.parse_dimension(cell, i);
            self.header_height = self.header_height.max(lines.len());
            self.headers.push(lines);
        }
    }

    fn set_footer(&mut self, cells: &[String]) {
        for (i, cell) in cells.iter().enumerate() {
            let lines = self.parse_dimension(cell, i);
            self.footer_height = self.footer_height.max(lines.len());
            self.footers.push(lines);
        }
    }

    fn append(&mut self, row: &[String]) {
        let mut height = 0;
        let mut line = Vec::with_capacity(row.len());
        for (i, cell) in row.iter().enumerate() {
            let lines = self.parse_dimension(cell, i);
            height = height.max(lines.len());
            line.push(lines);
        }
        self.rows.push(line);
        self.row_heights.push(height);
    }

    fn render(&mut self) {
        let style = self.style;
        if style.borders.top {
            self.print_line();
        }
        self.print_heading();
        if style.auto_merge_cells {
            self.print_rows_merge_cells();
        } else {
            self.print_rows();
        }
        if !style.row_line && style.borders.bottom {
            self.print_line();
        }
        self.print_footer();
    }

    /// A full-width horizontal rule.
    fn print_line(&mut self) {
        let style = self.style;
        let sep = style.row_separator.as_str();
        self.out.push_str(&style.center_separator);
        for &w in &self.col_widths {
            self.out.push_str(sep);
            self.out.push_str(&sep.repeat(w));
            self.out.push_str(sep);
            self.out.push_str(&style.center_separator);
        }
        self.out.push_str(&style.new_line);
    }

    /// A horizontal rule with gaps under merged cells.
    fn print_line_optional_cell_separators(&mut self, display: &[bool]) {
        let style = self.style;
        let sep = style.row_separator.as_str();
        self.out.push_str(&style.center_separator);
        for (i, &w) in self.col_widths.iter().enumerate() {
            if display.get(i).copied().unwrap_or(true) {
                self.out.push_str(sep);
                self.out.push_str(&sep.repeat(w));
                self.out.push_str(sep);
            } else {
                self.out.push_str(&" ".repeat(w + 2));
            }
            self.out.push_str(&style.center_separator);
        }
        self.out.push_str(&style.new_line);
    }

    fn print_heading(&mut self) {
        if self.headers.is_empty() {
            return;
        }
        let style = self.style;
        let end = self.col_widths.len().saturating_sub(1);
        let pad = pad_for(style.header_alignment);

        for x in 0..self.header_height {
            if style.borders.left {
                self.out.push_str(&style.column_separator);
            }
            for y in 0..=end {
                let width = self.col_widths.get(y).copied().unwrap_or(0);
                let mut h = self
                    .headers
                    .get(y)
                    .and_then(|lines| lines.get(x))
                    .cloned()
                    .unwrap_or_default();
                if style.auto_format_header {
                    h = title(&h);
                }
                let edge = if y == end && !style.borders.left {
                    " "
                } else {
                    style.column_separator.as_str()
                };
                self.out.push(' ');
                self.out.push_str(&pad(&h, width));
                self.out.push(' ');
                self.out.push_str(edge);
            }
            self.out.push_str(&style.new_line);
        }
        if style.header_line {
            self.print_line();
        }
    }

    /// Pad every cell of row `idx` to the row height and make sure there is
    /// an alignment for each.
    fn prepare_row(&mut self, idx: usize) -> (usize, Vec<Vec<String>>) {
        let height = self.row_heights[idx];
        let mut columns = self.rows[idx].clone();
        for col in &mut columns {
            while col.len() < height {
                col.push("  ".to_string());
            }
        }
        if self.column_alignment.len() < columns.len() {
            self.column_alignment = vec![self.style.alignment; columns.len()];
        }
        (height, columns)
    }

    fn aligned(&self, s: &str, col: usize) -> String {
        let width = self.col_widths.get(col).copied().unwrap_or(0);
        match self.column_alignment[col] {
            Alignment::Center => pad_center(s, width),
            Alignment::Right => pad_left(s, width),
            Alignment::Left => pad_right(s, width),
            Alignment::Default => {
                if DECIMAL_RE.is_match(s.trim()) {
                    pad_left(s, width)
                } else {
                    pad_right(s, width)
                }
            }
        }
    }

    fn print_rows(&mut self) {
        for idx in 0..self.rows.len() {
            self.print_row(idx);
        }
    }

    fn print_row(&mut self, idx: usize) {
        let style = self.style;
        let (height, columns) = self.prepare_row(idx);

        for x in 0..height {
            for (y, col) in columns.iter().enumerate() {
                let edge = if !style.borders.left && y == 0 {
                    " "
                } else {
                    style.column_separator.as_str()
                };
                let cell = self.aligned(&col[x], y);
                self.out.push_str(edge);
                self.out.push(' ');
                self.out.push_str(&cell);
                self.out.push(' ');
            }
            if style.borders.left {
                self.out.push_str(&style.column_separator);
            } else {
                self.out.push(' ');
            }
            self.out.push_str(&style.new_line);
        }

        if style.row_line {
            self.print_line();
        }
    }

    fn print_rows_merge_cells(&mut self) {
        let mut previous: Vec<String> = Vec::new();
        for idx in 0..self.rows.len() {
            // The rule above a row depends on which of its cells merge.
            let (text, merged_previous, display) = self.print_row_merge_cells(idx, &previous);
            previous = merged_previous;
            if idx > 0 && self.style.row_line {
                self.print_line_optional_cell_separators(&display);
            }
            self.out.push_str(&text);
        }
        if self.style.row_line {
            self.print_line();
        }
    }

    fn print_row_merge_cells(
        &mut self,
        idx: usize,
        previous: &[String],
    ) -> (String, Vec<String>, Vec<bool>) {
        let style = self.style;
        let (height, columns) = self.prepare_row(idx);
        let full_lines: Vec<String> = columns
            .iter()
            .map(|col| col.join(" ").trim_end_matches(' ').to_string())
            .collect();

        let mut text = String::new();
        let mut display = Vec::new();
        for x in 0..height {
            for (y, col) in columns.iter().enumerate() {
                let edge = if !style.borders.left && y == 0 {
                    " "
                } else {
                    style.column_separator.as_str()
                };
                text.push_str(edge);
                text.push(' ');

                let full_line = &full_lines[y];
                let cell = if previous.get(y) == Some(full_line) && !full_line.is_empty() {
                    display.push(false);
                    self.aligned("", y)
                } else {
                    display.push(true);
                    self.aligned(&col[x], y)
                };
                text.push_str(&cell);
                text.push(' ');
            }
            if style.borders.left {
                text.push_str(&style.column_separator);
            } else {
                text.push(' ');
            }
            text.push_str(&style.new_line);
        }

        (text, full_lines, display)
    }

    fn footer_first_len(&self, col: usize) -> usize {
        self.footers
            .get(col)
            .and_then(|lines| lines.first())
            .map_or(0, |s| s.len())
    }

    fn print_footer(&mut self) {
        if self.footers.is_empty() {
            return;
        }
        let style = self.style;
        let row_sep = style.row_separator.as_str();
        let center_sep = style.center_separator.as_str();

        if !style.borders.bottom {
            self.print_line();
        }

        let end = self.col_widths.len().saturating_sub(1);
        let pad = pad_for(style.footer_alignment);

        let mut erase_edge = vec![false; end + 1];
        for x in 0..self.footer_height {
            if style.borders.bottom {
                self.out.push_str(&style.column_separator);
            } else {
                self.out.push(' ');
            }
            for y in 0..=end {
                let width = self.col_widths.get(y).copied().unwrap_or(0);
                let mut f = self
                    .footers
                    .get(y)
                    .and_then(|lines| lines.get(x))
                    .cloned()
                    .unwrap_or_default();
                if style.auto_format_header {
                    f = title(&f);
                }
                let mut edge = if y == end && !style.borders.top {
                    " "
                } else {
                    style.column_separator.as_str()
                };
                if erase_edge[y] || (x == 0 && f.is_empty()) {
                    edge = " ";
                    erase_edge[y] = true;
                }
                self.out.push(' ');
                self.out.push_str(&pad(&f, width));
                self.out.push(' ');
                self.out.push_str(edge);
            }
            self.out.push_str(&style.new_line);
        }

        // The closing rule only runs under columns which have a footer.
        let mut has_printed = false;
        for i in 0..=end {
            let width = self.col_widths.get(i).copied().unwrap_or(0);
            let mut fill = row_sep;
            let mut center = center_sep;
            let length = self.footer_first_len(i);

            if length > 0 {
                has_printed = true;
            }
            if length == 0 && !style.borders.right {
                center = " ";
            }
            if i == 0 {
                if length > 0 && !style.borders.left {
                    center = row_sep;
                }
                self.out.push_str(center);
            }
            if length == 0 {
                fill = " ";
            }
            if has_printed || style.borders.left {
                fill = row_sep;
                center = center_sep;
            }
            if center != " " && i == end && !style.borders.right {
                center = row_sep;
            }
            if center == " " && i < end && self.footer_first_len(i + 1) != 0 {
                center = if style.borders.left { center_sep } else { row_sep };
            }

            self.out.push_str(fill);
            self.out.push_str(&fill.repeat(width));
            self.out.push_str(fill);
            self.out.push_str(center);
        }
        self.out.push_str(&style.new_line);
    }
}

/// Draw a table from its header cells, body rows and footer cells.
///
/// Cells may contain newlines.  Rows may have differing numbers of cells;
/// missing header and footer cells are drawn empty.
pub fn render_table(
    style: &TableStyle,
    header: &[String],
    body: &[Vec<String>],
    footer: &[String],
) -> String {
    html_trace!(
        "render_table: {} header cells, {} rows, {} footer cells",
        header.len(),
        body.len(),
        footer.len()
    );
    let mut table = TableLayout::new(style);
    table.set_header(header);
    table.set_footer(footer);
    for row in body {
        table.append(row);
    }
    table.render();
    table.out
}

#[cfg(test)]
mod tests {
    use super::{render_table, title, wrap_string, Alignment, Borders, TableStyle};

    fn cells(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn header_body_footer() {
        let out = render_table(
            &TableStyle::default(),
            &cells(&["Header 1", "Header 2"]),
            &[
                vec![],
                cells(&["Row 1 Col 1", "Row 1 Col 2"]),
                cells(&["Row 2 Col 1", "Row 2 Col 2"]),
            ],
            &cells(&["Footer 1", "Footer 2"]),
        );
        assert_eq!(
            out,
            "\
+-------------+-------------+
|  HEADER 1   |  HEADER 2   |
+-------------+-------------+
| Row 1 Col 1 | Row 1 Col 2 |
| Row 2 Col 1 | Row 2 Col 2 |
+-------------+-------------+
|  FOOTER 1   |  FOOTER 2   |
+-------------+-------------+
"
        );
    }

    #[test]
    fn numbers_align_right() {
        let out = render_table(
            &TableStyle::default(),
            &[],
            &[cells(&["1", "apple"]), cells(&["1,000", "pear"])],
            &[],
        );
        assert_eq!(
            out,
            "\
+-------+-------+
|     1 | apple |
| 1,000 | pear  |
+-------+-------+
"
        );
    }

    #[test]
    fn empty_table() {
        assert_eq!(render_table(&TableStyle::default(), &[], &[], &[]), "+\n+\n");
    }

    #[test]
    fn custom_separators_and_alignment() {
        let style = TableStyle {
            column_separator: "!".into(),
            row_separator: "=".into(),
            center_separator: "*".into(),
            column_alignment: vec![Alignment::Right, Alignment::Center],
            header_line: false,
            ..Default::default()
        };
        let out = render_table(
            &style,
            &cells(&["a", "b"]),
            &[cells(&["x", "y"]), cells(&["long", "wide"])],
            &[],
        );
        assert_eq!(
            out,
            "\
*======*======*
!  A   !  B   !
!    x !  y   !
! long ! wide !
*======*======*
"
        );
    }

    #[test]
    fn row_lines() {
        let style = TableStyle {
            row_line: true,
            ..Default::default()
        };
        let out = render_table(&style, &[], &[cells(&["a"]), cells(&["b"])], &[]);
        assert_eq!(out, "+---+\n| a |\n+---+\n| b |\n+---+\n");
    }

    #[test]
    fn merged_cells() {
        let style = TableStyle {
            auto_merge_cells: true,
            row_line: true,
            ..Default::default()
        };
        let out = render_table(&style, &[], &[cells(&["a", "x"]), cells(&["a", "y"])], &[]);
        assert_eq!(
            out,
            "\
+---+---+
| a | x |
+   +---+
|   | y |
+---+---+
"
        );
    }

    #[test]
    fn no_borders() {
        let style = TableStyle {
            borders: Borders {
                left: false,
                right: false,
                top: false,
                bottom: false,
            },
            ..Default::default()
        };
        let out = render_table(&style, &cells(&["h"]), &[cells(&["v"])], &[]);
        assert_eq!(out, " H  \n+---+\n  v  \n");
    }

    #[test]
    fn long_cells_wrap() {
        let style = TableStyle {
            col_width: 5,
            ..Default::default()
        };
        let out = render_table(&style, &[], &[cells(&["aaa bbb ccc"])], &[]);
        assert_eq!(out, "+-----+\n| aaa |\n| bbb |\n| ccc |\n+-----+\n");
    }

    #[test]
    fn multi_line_cells_are_reflowed() {
        let out = render_table(&TableStyle::default(), &[], &[cells(&["one\ntwo", "x"])], &[]);
        // Wrapped back to the widest original line; short cells are padded
        // with two spaces per missing line.
        assert_eq!(out, "+-----+---+\n| one | x |\n| two |    |\n+-----+---+\n");

        let style = TableStyle {
            reflow_during_auto_wrap: false,
            ..Default::default()
        };
        let out = render_table(&style, &[], &[cells(&["one\ntwo", "x"])], &[]);
        assert_eq!(
            out,
            "+-----+---+\n| one | x |\n|     |    |\n| two |    |\n+-----+---+\n"
        );
    }

    #[test]
    fn ragged_input_does_not_panic() {
        let out = render_table(
            &TableStyle::default(),
            &cells(&["h"]),
            &[cells(&["a", "b"]), vec![]],
            &cells(&["f"]),
        );
        assert!(out.contains("| H |   |"));
        assert!(out.contains("| a | b |"));
        assert!(out.contains("| F |"));
    }

    #[test]
    fn title_formatting() {
        assert_eq!(title("first_name"), "FIRST NAME");
        assert_eq!(title("v1.2"), "V1.2");
        assert_eq!(title("a.b"), "A B");
        assert_eq!(title("_"), " ");
        assert_eq!(title(""), "");
    }

    #[test]
    fn wrap_keeps_long_words_whole() {
        assert_eq!(wrap_string("abcdefgh ij", 4), vec!["abcdefgh", "ij"]);
        assert_eq!(wrap_string("", 4), vec![""]);
    }
}
