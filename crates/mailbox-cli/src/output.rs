use serde::Serialize;
use std::fmt::Write as _;

const GAP: &str = "  ";

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    print!("{}", render_table(headers, &rows));
}

/// Left-aligned columns sized to their widest cell (in chars), a dashed rule
/// under the header, no trailing whitespace. Cells past the last header are
/// appended unpadded.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for (i, cell) in rows.iter().flat_map(|r| r.iter().enumerate()) {
        if let Some(w) = widths.get_mut(i) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, headers.iter().copied(), &widths);
    push_line(&mut out, widths.iter().map(|&w| "-".repeat(w)), &widths);
    for row in rows {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_line<S: AsRef<str>>(out: &mut String, cells: impl Iterator<Item = S>, widths: &[usize]) {
    let mut line = String::new();
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            line.push_str(GAP);
        }
        let width = widths.get(i).copied().unwrap_or(0);
        let _ = write!(line, "{:width$}", cell.as_ref());
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_to_widest_cell() {
        let out = render_table(
            &["KEY", "VALUE"],
            &[
                vec!["port".into(), "8080".into()],
                vec!["default_tenant".into(), "tripassist".into()],
            ],
        );
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "KEY             VALUE");
        assert_eq!(lines[1], "--------------  ----------");
        assert_eq!(lines[2], "port            8080");
        assert_eq!(lines[3], "default_tenant  tripassist");
    }

    #[test]
    fn empty_last_column_leaves_no_trailing_space() {
        let out = render_table(&["KEY", "VALUE"], &[vec!["tenant_header".into(), String::new()]]);
        assert!(out.lines().all(|l| !l.ends_with(' ')));
    }

    #[test]
    fn width_counts_chars_not_bytes() {
        let out = render_table(&["K"], &[vec!["é".into()], vec!["ab".into()]]);
        assert_eq!(out.lines().nth(1), Some("--"));
    }
}
