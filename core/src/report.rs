use std::{
    collections::HashMap,
    io::{self, Write},
    path::Path,
};

use colored::{Color, Colorize};
use crossterm::terminal;
use strum::IntoEnumIterator;

use crate::session::Session;
use crate::storage::{StoredTest, TestPool};
use crate::style::{self, ColorTheme};
use crate::testing::{ExecutionResult, Outcome};

const BOLD_LINE: &str = "━";
const THIN_LINE: &str = "─";

pub const ALL_PASSED: &str = "All tests passed!";
pub const SOME_FAILED: &str = "Some tests are failing...";

fn term_cols() -> usize {
    let (cols, _) = terminal::size().unwrap_or((40, 40));
    cols as usize
}

fn read_lossy(path: &Path) -> Option<String> {
    fsutil::read(path)
        .ok()
        .map(|b| String::from_utf8_lossy(&b).into_owned())
}

fn write_sub_title<W: Write>(w: &mut W, s: &str, cols: usize) -> io::Result<()> {
    writeln!(
        w,
        "{}{}",
        s.cyan().bold(),
        THIN_LINE
            .repeat(cols.saturating_sub(s.len() + 1))
            .bright_black(),
    )
}

fn write_content<W: Write>(w: &mut W, content: &str) -> io::Result<()> {
    let lines: Vec<_> = content.lines().collect();
    if lines.is_empty() {
        return writeln!(w, "{}", "<EMPTY>".magenta().dimmed());
    }
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim_end();
        write!(w, "{}", trimmed)?;

        let num_trailing_whitespace = line.len() - trimmed.len();
        if num_trailing_whitespace > 0 {
            write!(
                w,
                "{}{}",
                " ".repeat(num_trailing_whitespace).on_red(),
                "(Trailing whitespace)".bright_red().bold()
            )?;
        }

        let is_last_line = i + 1 == lines.len();
        if is_last_line && !content.ends_with('\n') {
            write!(w, "{}", " Missing new line ".on_yellow().black().bold())?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn write_detail<W: Write>(
    w: &mut W,
    pool: &TestPool,
    res: &ExecutionResult,
    cols: usize,
) -> io::Result<()> {
    let t = pool.staged_test(res.id);
    let bold_bar = BOLD_LINE.repeat(cols).blue().bold();

    writeln!(
        w,
        "\n{}: {} [{:.3}s]\n{}",
        t.name().color(Color::BrightYellow).bold(),
        style::outcome_icon(res.outcome),
        res.elapsed.as_secs_f64(),
        bold_bar,
    )?;

    write_sub_title(w, "[input]", cols)?;
    write_content(w, &read_lossy(&t.input).unwrap_or_default())?;

    write_sub_title(w, "[expected]", cols)?;
    match t.answer().and_then(read_lossy) {
        Some(answer) => write_content(w, &answer)?,
        None => writeln!(w, "{}", "UNKNOWN".magenta().dimmed())?,
    }

    write_sub_title(w, "[output]", cols)?;
    write_content(w, &read_lossy(&t.output).unwrap_or_default())?;

    if let Some(detail) = &res.detail {
        write_sub_title(w, "[message]", cols)?;
        writeln!(w, "{}", detail.bright_red())?;
    }
    writeln!(w, "{}", bold_bar)
}

fn write_summary<W: Write>(w: &mut W, results: &[ExecutionResult]) -> io::Result<()> {
    writeln!(w)?;
    for r in results {
        writeln!(
            w,
            "Test #{:<3} [{:.3}s]: {} {}",
            r.id,
            r.elapsed.as_secs_f64(),
            style::outcome_icon(r.outcome),
            r.outcome.message().color(r.outcome.color()),
        )?;
    }

    let count: HashMap<Outcome, usize> = results.iter().fold(HashMap::new(), |mut count, r| {
        *count.entry(r.outcome).or_default() += 1;
        count
    });
    let num_passed = count.get(&Outcome::OK).copied().unwrap_or(0);

    let bar = "-".repeat(5);
    write!(w, "{} {}/{} passed", bar, num_passed, results.len())?;
    // Fixed order so the line is stable between runs
    for outcome in Outcome::iter().filter(|o| !o.is_ok()) {
        if let Some(&cnt) = count.get(&outcome) {
            write!(
                w,
                ", {}{}{}",
                style::outcome_icon(outcome),
                "x".dimmed(),
                cnt.to_string().bold().bright_white(),
            )?;
        }
    }
    writeln!(w, " {}", bar)?;

    if num_passed == results.len() {
        writeln!(w, "RESULT: {}", ALL_PASSED.green().bold())
    } else {
        writeln!(w, "RESULT: {}", SOME_FAILED.bright_red().bold())
    }
}

/// Writes every test's input, expected answer and actual output (re-read from the pool),
/// then the summary table and the final verdict line.
pub fn write_report<W: Write>(
    w: &mut W,
    pool: &TestPool,
    results: &[ExecutionResult],
) -> io::Result<()> {
    let cols = term_cols();
    for res in results {
        write_detail(w, pool, res, cols)?;
    }
    write_summary(w, results)
}

pub fn print_report(pool: &TestPool, results: &[ExecutionResult]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    write_report(&mut lock, pool, results)?;
    lock.flush()
}

pub fn write_listing<W: Write>(w: &mut W, session: &Session, tests: &[StoredTest]) -> io::Result<()> {
    let cols = term_cols();
    writeln!(w, "{}", session)?;
    writeln!(w, "{} test(s)", tests.len())?;
    for t in tests {
        writeln!(w, "\n{}", format!("Test #{}", t.id).color(Color::BrightYellow).bold())?;
        write_sub_title(w, "[input]", cols)?;
        write_content(w, &read_lossy(&t.input).unwrap_or_default())?;
        write_sub_title(w, "[answer]", cols)?;
        match t.answer.as_deref().and_then(read_lossy) {
            Some(answer) => write_content(w, &answer)?,
            None => writeln!(w, "{}", "UNKNOWN".magenta().dimmed())?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;
    use crate::storage::TestStore;

    fn report_of(pool: &TestPool, results: &[ExecutionResult]) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, pool, results).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn report_shows_contents_and_verdict() {
        let dir = tempfile::tempdir().unwrap();
        let store = TestStore::new(dir.path());
        store.add("2 2\n", "4\n").unwrap();
        store.add("1 1\n", "").unwrap();
        let pool = TestPool::new(dir.path());
        let staged = pool.prepare(&store).unwrap();
        fsutil::write(&staged[0].output, "4\n").unwrap();
        fsutil::write(&staged[1].output, "2\n").unwrap();

        let results = vec![
            ExecutionResult {
                id: 1,
                outcome: Outcome::OK,
                elapsed: Duration::from_millis(10),
                detail: None,
            },
            ExecutionResult {
                id: 2,
                outcome: Outcome::OK,
                elapsed: Duration::from_millis(1234),
                detail: None,
            },
        ];
        let s = dbg!(report_of(&pool, &results));
        assert!(s.contains("2 2"));
        assert!(s.contains("UNKNOWN"), "test 2 has no answer");
        assert!(s.contains("[0.010s]"));
        assert!(s.contains("[1.234s]"));
        assert!(s.contains(ALL_PASSED));
        assert!(!s.contains(SOME_FAILED));
    }

    #[test]
    fn report_with_failures() {
        let dir = tempfile::tempdir().unwrap();
        let store = TestStore::new(dir.path());
        store.add("1\n", "1\n").unwrap();
        let pool = TestPool::new(dir.path());
        pool.prepare(&store).unwrap();

        let results = vec![ExecutionResult {
            id: 1,
            outcome: Outcome::TLE,
            elapsed: Duration::from_millis(100),
            detail: None,
        }];
        let s = dbg!(report_of(&pool, &results));
        assert!(s.contains("Time Limit Exceeded"));
        assert!(s.contains("<EMPTY>"), "no output was produced");
        assert!(s.contains("0/1 passed"));
        assert!(s.contains(SOME_FAILED));
    }

    #[test]
    fn listing_shows_every_test() {
        let dir = tempfile::tempdir().unwrap();
        let store = TestStore::new(dir.path());
        store.add("first input\n", "first answer\n").unwrap();
        store.add("second input\n", "").unwrap();

        let mut buf = Vec::new();
        write_listing(&mut buf, &Session::default(), &store.list()).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.contains("2 test(s)"));
        assert!(s.contains("first input"));
        assert!(s.contains("first answer"));
        assert!(s.contains("second input"));
        assert!(s.contains("UNKNOWN"));
    }
}
