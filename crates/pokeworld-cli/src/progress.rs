use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use pokeworld_core::dedup::report::{CleanupReport, GroupReport, PassReport};
use pokeworld_core::storage::models::{DuplicateKey, KeyField};
use pokeworld_core::CleanupReporter;
use std::sync::Mutex;

/// Prints cleanup progress to stdout, with a bar over each pass's groups.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    /// Print a line without tearing the progress bar.
    fn line(&self, text: String) {
        let guard = self.bar.lock().unwrap();
        match guard.as_ref() {
            Some(pb) => pb.suspend(|| println!("{}", text)),
            None => println!("{}", text),
        }
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }
}

impl CleanupReporter for CliReporter {
    fn on_start(&self) {
        self.line("Starting duplicate cleanup...".to_string());
    }

    fn on_no_duplicates(&self) {
        self.line("No duplicates found!".green().to_string());
    }

    fn on_pass_start(&self, field: KeyField, groups: usize) {
        if groups == 0 {
            return;
        }
        let header = match field {
            KeyField::Name => format!("Found {} Pokémon with duplicates:", groups),
            KeyField::Slug => format!("\nFound {} Pokémon with duplicate slugs:", groups),
        };
        self.line(header);

        let pb = ProgressBar::new(groups as u64);
        pb.set_style(
            ProgressStyle::with_template("  {spinner:.cyan} [{bar:30.cyan/dim}] {pos}/{len} groups")
                .unwrap()
                .progress_chars("━╸─")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        *self.bar.lock().unwrap() = Some(pb);
    }

    fn on_group_start(&self, key: &DuplicateKey) {
        self.line(format!("  - {}: {} entries", key.value, key.count));
    }

    fn on_group_resolved(&self, group: &GroupReport) {
        let mut text = format!(
            "    → Kept ID {}, deleted {} duplicates",
            group.survivor_id, group.deleted
        );
        if group.favorites_dropped > 0 {
            text.push_str(&format!(
                " ({} redundant favorites dropped)",
                group.favorites_dropped
            ));
        }
        self.line(text);

        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.inc(1);
        }
    }

    fn on_pass_complete(&self, _pass: &PassReport) {
        self.finish_bar();
    }

    fn on_complete(&self, report: &CleanupReport) {
        self.line(
            format!("\nCleanup complete! Total Pokémon: {}", report.total_records)
                .green()
                .to_string(),
        );
        if report.verification.is_clean() {
            self.line("✓ No duplicates remain in the database".green().to_string());
        } else {
            self.line("⚠ Some duplicates may still exist".yellow().to_string());
        }
    }
}
