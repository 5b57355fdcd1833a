//! Two-level interactive menu: categories, then scripts.
//!
//! The menu is parameterized over its reader and writer so it can be driven
//! from tests. End of input behaves like `q`.

#![allow(missing_docs)]

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::cli::output::{
    EventPrinter, entry_line, write_failure, write_sequence_report, write_single_start,
};
use crate::cli::theme::Palette;
use crate::logger::activity::ActivityLog;
use crate::runner::ScriptRunner;
use crate::runner::sequence::Sequencer;
use crate::scanner::discovery::{LaunchEntry, Pairing, ScriptEntry, discover};
use crate::scanner::walker::{Category, list_categories};

const BANNER: &str = "HardSecNet | System Hardening | Audit | Before/After Reports";

/// What a nested menu level asks its caller to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Back,
    Quit,
}

/// Interactive launcher session.
pub struct Menu<'a, R, W> {
    reader: R,
    writer: W,
    palette: Palette,
    runner: &'a dyn ScriptRunner,
    log: &'a mut ActivityLog,
    root: PathBuf,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(
        reader: R,
        writer: W,
        palette: Palette,
        runner: &'a dyn ScriptRunner,
        log: &'a mut ActivityLog,
        root: &Path,
    ) -> Self {
        Self {
            reader,
            writer,
            palette,
            runner,
            log,
            root: root.to_path_buf(),
        }
    }

    /// Show the banner and loop over the category menu until the user quits.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.writer, "{}", self.palette.heading(BANNER))?;

        loop {
            let categories = match list_categories(&self.root) {
                Ok(categories) => categories,
                Err(err) => {
                    writeln!(self.writer, "{}", self.palette.fail(&format!("[!] {err}")))?;
                    return Ok(());
                }
            };
            if categories.is_empty() {
                writeln!(self.writer, "{}", self.palette.fail("[!] No folders found."))?;
                return Ok(());
            }

            writeln!(self.writer, "{}", self.palette.info("\nAvailable Categories:\n"))?;
            for (i, category) in categories.iter().enumerate() {
                writeln!(self.writer, "{}. {}", i + 1, category.name)?;
            }
            writeln!(self.writer, "\nq. Quit\n")?;

            let Some(choice) = self.prompt("Enter category number: ")? else {
                return Ok(());
            };
            if choice == "q" {
                return Ok(());
            }
            match parse_index(&choice, categories.len()) {
                Some(index) => {
                    if self.category_menu(&categories[index])? == Flow::Quit {
                        return Ok(());
                    }
                }
                None => self.invalid_choice()?,
            }
        }
    }

    fn category_menu(&mut self, category: &Category) -> io::Result<Flow> {
        let discovery = match discover(&category.path) {
            Ok(discovery) => discovery,
            Err(err) => {
                writeln!(self.writer, "{}", self.palette.fail(&format!("[!] {err}")))?;
                return self.pause("Press ENTER to return...");
            }
        };
        self.log.discovery(&discovery);

        if discovery.is_empty() {
            writeln!(
                self.writer,
                "{}",
                self.palette.warn("[!] No PowerShell scripts found.")
            )?;
            return self.pause("Press ENTER to return...");
        }

        let entries = discovery.entries();
        loop {
            writeln!(
                self.writer,
                "{}",
                self.palette
                    .ok(&format!("\nHardSecNet - Category: {}", category.name))
            )?;
            for (i, entry) in entries.iter().enumerate() {
                writeln!(self.writer, "{}", entry_line(i + 1, entry))?;
            }
            writeln!(self.writer, "\nb. Back to Categories")?;
            writeln!(self.writer, "q. Quit\n")?;

            let Some(choice) = self.prompt("Enter script number: ")? else {
                return Ok(Flow::Quit);
            };
            match choice.as_str() {
                "q" => return Ok(Flow::Quit),
                "b" => return Ok(Flow::Back),
                _ => {}
            }
            let flow = match parse_index(&choice, entries.len()).map(|i| &entries[i]) {
                Some(LaunchEntry::Pairing(pairing)) => self.run_pairing(pairing)?,
                Some(LaunchEntry::Single(single)) => self.run_single(single)?,
                None => {
                    self.invalid_choice()?;
                    Flow::Back
                }
            };
            if flow == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }
    }

    fn run_pairing(&mut self, pairing: &Pairing) -> io::Result<Flow> {
        let palette = self.palette;
        let log = &mut *self.log;
        let mut printer = EventPrinter::new(&mut self.writer, palette);
        let outcome = Sequencer::new(self.runner).run_for(&pairing.harden, |event| {
            log.sequence_event(&event);
            printer.print(&event);
        });
        let printed = printer.finish();

        match &outcome {
            Ok(report) => self.log.sequence_complete(report),
            Err(err) => self.log.sequence_failed(&pairing.harden, err),
        }
        self.log.flush();
        printed?;

        match outcome {
            Ok(report) => write_sequence_report(&mut self.writer, palette, &report)?,
            Err(err) => write_failure(&mut self.writer, palette, &err)?,
        }
        self.pause("\nPress ENTER to return to menu...")
    }

    fn run_single(&mut self, single: &ScriptEntry) -> io::Result<Flow> {
        write_single_start(&mut self.writer, self.palette, &single.path)?;
        self.writer.flush()?;
        match self.runner.run_script(&single.path) {
            Ok(()) => {
                self.log.single_run(&single.path, Ok(()));
                writeln!(self.writer, "{}", self.palette.ok("[✔] Done."))?;
            }
            Err(err) => {
                self.log.single_run(&single.path, Err(&err));
                write_failure(&mut self.writer, self.palette, &err)?;
            }
        }
        self.log.flush();
        self.pause("\nPress ENTER to return...")
    }

    fn invalid_choice(&mut self) -> io::Result<()> {
        writeln!(self.writer, "{}", self.palette.fail("Invalid choice. Try again."))
    }

    /// Wait for ENTER. End of input turns into a quit.
    fn pause(&mut self, message: &str) -> io::Result<Flow> {
        write!(self.writer, "{}", self.palette.info(message))?;
        self.writer.flush()?;
        Ok(match read_line(&mut self.reader)? {
            Some(_) => Flow::Back,
            None => Flow::Quit,
        })
    }

    /// Prompt and read a trimmed, lowercased answer. `None` at end of input.
    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.writer, "{}", self.palette.warn(message))?;
        self.writer.flush()?;
        Ok(read_line(&mut self.reader)?.map(|line| line.trim().to_lowercase()))
    }
}

/// 1-based menu number → 0-based index, if in range.
fn parse_index(choice: &str, len: usize) -> Option<usize> {
    if choice.is_empty() || !choice.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: usize = choice.parse().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

fn read_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::io::Cursor;

    use super::*;
    use crate::core::errors::{HsnError, Result};

    struct Recorder {
        calls: RefCell<Vec<PathBuf>>,
        fail_harden: bool,
    }

    impl Recorder {
        fn new(fail_harden: bool) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_harden,
            }
        }
    }

    impl ScriptRunner for Recorder {
        fn run_script(&self, script: &Path) -> Result<()> {
            self.calls.borrow_mut().push(script.to_path_buf());
            let name = script.file_name().unwrap().to_string_lossy().to_string();
            if name == "Audit.ps1" {
                let reports = script.parent().unwrap().join("Reports");
                fs::write(reports.join("audit.json"), b"{}").unwrap();
                return Ok(());
            }
            if self.fail_harden && name.to_lowercase().contains("harden") {
                return Err(HsnError::ProcessFailure {
                    script: script.to_path_buf(),
                    exit_code: Some(2),
                    detail: "exit code 2".to_string(),
                });
            }
            Ok(())
        }
    }

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let pair = dir.path().join("Firewall").join("inbound");
        fs::create_dir_all(&pair).unwrap();
        fs::write(pair.join("Audit.ps1"), b"").unwrap();
        fs::write(pair.join("Harden.ps1"), b"").unwrap();
        let lone = dir.path().join("Firewall").join("outbound");
        fs::create_dir_all(&lone).unwrap();
        fs::write(lone.join("Outbound_Harden.ps1"), b"").unwrap();
        fs::create_dir_all(dir.path().join("Empty")).unwrap();
        dir
    }

    fn drive(root: &Path, runner: &Recorder, input: &str) -> String {
        let mut log = ActivityLog::disabled();
        let mut out = Vec::new();
        Menu::new(
            Cursor::new(input.as_bytes().to_vec()),
            &mut out,
            Palette::plain(),
            runner,
            &mut log,
            root,
        )
        .run()
        .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parse_index_accepts_only_listed_numbers() {
        assert_eq!(parse_index("1", 3), Some(0));
        assert_eq!(parse_index("3", 3), Some(2));
        assert_eq!(parse_index("0", 3), None);
        assert_eq!(parse_index("4", 3), None);
        assert_eq!(parse_index("-1", 3), None);
        assert_eq!(parse_index("", 3), None);
        assert_eq!(parse_index("1a", 3), None);
    }

    #[test]
    fn categories_are_listed_sorted_and_quit_works() {
        let dir = tree();
        let runner = Recorder::new(false);
        let out = drive(dir.path(), &runner, "q\n");
        let empty = out.find("1. Empty").unwrap();
        let firewall = out.find("2. Firewall").unwrap();
        assert!(empty < firewall);
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn empty_category_reports_and_returns() {
        let dir = tree();
        let runner = Recorder::new(false);
        let out = drive(dir.path(), &runner, "1\n\nq\n");
        assert!(out.contains("[!] No PowerShell scripts found."));
        assert_eq!(out.matches("Available Categories:").count(), 2);
    }

    #[test]
    fn pairing_runs_full_sequence() {
        let dir = tree();
        let runner = Recorder::new(false);
        let out = drive(dir.path(), &runner, "2\n1\n\nq\n");

        assert!(out.contains("1. Inbound  [Auto Audit + Harden Sequence]"));
        assert!(out.contains("2. Outbound Harden  [Outbound_Harden.ps1]"));
        assert!(out.contains("[1/3] Running initial audit..."));
        assert!(out.contains("[✓] Sequence complete."));

        let inbound = dir.path().join("Firewall").join("inbound");
        assert_eq!(
            *runner.calls.borrow(),
            vec![
                inbound.join("Audit.ps1"),
                inbound.join("Harden.ps1"),
                inbound.join("Audit.ps1"),
            ]
        );
        let archived = fs::read_dir(inbound.join("Reports")).unwrap().count();
        assert_eq!(archived, 2);
    }

    #[test]
    fn harden_failure_is_reported_and_menu_continues() {
        let dir = tree();
        let runner = Recorder::new(true);
        let out = drive(dir.path(), &runner, "2\n1\n\nb\nq\n");
        assert!(out.contains("[✘] PowerShell failed:"));
        assert!(!out.contains("[✓] Sequence complete."));
        assert_eq!(out.matches("Available Categories:").count(), 2);
    }

    /// Accepts everything except the step progress lines.
    struct NoProgress(Vec<u8>);

    impl Write for NoProgress {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            if String::from_utf8_lossy(data).contains("Running") {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"));
            }
            self.0.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn progress_write_error_surfaces_after_sequence_finishes() {
        let dir = tree();
        let runner = Recorder::new(false);
        let mut log = ActivityLog::disabled();
        let mut out = NoProgress(Vec::new());

        let err = Menu::new(
            Cursor::new(b"2\n1\n\nq\n".to_vec()),
            &mut out,
            Palette::plain(),
            &runner,
            &mut log,
            dir.path(),
        )
        .run()
        .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(runner.calls.borrow().len(), 3);
        let reports = dir.path().join("Firewall").join("inbound").join("Reports");
        assert_eq!(fs::read_dir(reports).unwrap().count(), 2);
    }

    #[test]
    fn single_runs_without_archiving() {
        let dir = tree();
        let runner = Recorder::new(false);
        let out = drive(dir.path(), &runner, "2\n2\n\nq\n");
        assert!(out.contains("[✔] Done."));
        assert_eq!(runner.calls.borrow().len(), 1);
        assert!(!dir.path().join("Firewall").join("outbound").join("Reports").exists());
    }

    #[test]
    fn invalid_input_reprompts() {
        let dir = tree();
        let runner = Recorder::new(false);
        let out = drive(dir.path(), &runner, "9\nx\n2\n7\nq\n");
        assert_eq!(out.matches("Invalid choice. Try again.").count(), 3);
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn end_of_input_quits() {
        let dir = tree();
        let runner = Recorder::new(false);
        let out = drive(dir.path(), &runner, "2\n");
        assert!(out.contains("Enter script number: "));
    }

    #[test]
    fn root_without_folders_stops() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Recorder::new(false);
        let out = drive(dir.path(), &runner, "");
        assert!(out.contains("[!] No folders found."));
    }
}
