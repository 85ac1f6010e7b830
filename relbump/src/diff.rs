// relbump/src/diff.rs
//! Minimal line diff for operator review of a descriptor rewrite.

use colored::Colorize;

/// Pairs of differing lines, 1-based. Field substitutions never change the
/// line count; a length mismatch makes this return `None` so the caller can
/// fall back to a full listing.
pub fn changed_lines<'a>(old: &'a str, new: &'a str) -> Option<Vec<(usize, &'a str, &'a str)>> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    if old_lines.len() != new_lines.len() {
        return None;
    }
    Some(
        old_lines
            .iter()
            .zip(new_lines.iter())
            .enumerate()
            .filter(|(_, (o, n))| o != n)
            .map(|(idx, (o, n))| (idx + 1, *o, *n))
            .collect(),
    )
}

pub fn print_line_diff(old: &str, new: &str) {
    match changed_lines(old, new) {
        Some(changes) => {
            for (line_no, old_line, new_line) in changes {
                println!("{}", format!("@@ line {line_no}").dimmed());
                println!("{}", format!("-{old_line}").red());
                println!("{}", format!("+{new_line}").green());
            }
        }
        None => {
            // line counts diverged, print the whole document both ways
            for line in old.lines() {
                println!("{}", format!("-{line}").red());
            }
            for line in new.lines() {
                println!("{}", format!("+{line}").green());
            }
        }
    }
}
