use crate::orchestrator::{ComparisonReport, GridEvent, ProgressSink};
use crate::ui::icons::{CHECK, CROSS, FOLDER, PROGRESS, RUNNING, SPARKLE};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Terminal UI for a comparison run, rendered via `indicatif` progress bars.
///
/// Two bars are stacked vertically:
/// - Grid bar: how many cells of the grid have finished training
/// - Cell bar: spinner naming the cell currently training
pub struct GridUI {
    multi: MultiProgress,
    grid_bar: ProgressBar,
    cell_bar: ProgressBar,
    verbose: bool,
}

impl GridUI {
    /// Create the UI sized for `total_cells` training jobs.
    pub fn new(total_cells: u64, verbose: bool) -> Self {
        let multi = MultiProgress::new();

        let grid_style = ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress bar template is a valid static string")
            .progress_chars("█▓▒░");

        let grid_bar = multi.add(ProgressBar::new(total_cells));
        grid_bar.set_style(grid_style);
        grid_bar.set_prefix(" Cells");

        let cell_style = ProgressStyle::default_spinner()
            .template("{prefix:.bold.dim} {spinner} {msg}")
            .expect("progress bar template is a valid static string");

        let cell_bar = multi.add(ProgressBar::new_spinner());
        cell_bar.set_style(cell_style);
        cell_bar.set_prefix(" Train");

        Self {
            multi,
            grid_bar,
            cell_bar,
            verbose,
        }
    }

    /// Print a line via `MultiProgress`, falling back to `eprintln!` if the rich UI fails.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    fn print_run_header(&self, run: u32, total_runs: u32) {
        self.print_line("");
        self.print_line(format!("{}", style("═".repeat(70)).cyan()));
        self.print_line(format!(
            "{} Run {}/{}",
            style("▶").green().bold(),
            style(run).yellow().bold(),
            total_runs
        ));
        self.print_line(format!("{}", style("═".repeat(70)).cyan()));
    }

    /// Print the final summary and stop both bars.
    pub fn grid_complete(&self, report: &ComparisonReport) {
        self.cell_bar.finish_and_clear();
        self.grid_bar.finish_with_message("done");
        self.print_line(format!(
            "\n{} Trained {} models",
            SPARKLE,
            style(report.cells.len()).green().bold()
        ));
        self.print_line(format!(
            "{} Stories per round: {:?} ({})",
            PROGRESS,
            report.story_counts,
            style(report.summary_path.display()).dim()
        ));
    }

    /// Stop the bars and print a failure banner.
    pub fn grid_failed(&self, reason: &str) {
        self.cell_bar.abandon();
        self.grid_bar.abandon();
        self.print_line(format!("\n{} Comparison aborted: {}\n", CROSS, style(reason).red()));
    }
}

impl ProgressSink for GridUI {
    fn on_event(&self, event: &GridEvent) {
        match event {
            GridEvent::RunStarted { run, total_runs } => {
                self.print_run_header(*run, *total_runs);
            }
            GridEvent::CellStarted {
                round,
                total_rounds,
                policy,
                percentage,
                output,
                ..
            } => {
                self.grid_bar.set_message(format!(
                    "{} round {}/{}",
                    style(policy).yellow(),
                    round,
                    total_rounds
                ));
                self.cell_bar.set_message(format!(
                    "{} {} with {}% exclusion",
                    RUNNING,
                    style(policy).yellow(),
                    style(percentage).cyan()
                ));
                self.cell_bar.enable_steady_tick(Duration::from_millis(100));
                if self.verbose {
                    self.print_line(format!(
                        "    {} {}",
                        FOLDER,
                        style(output.display()).dim()
                    ));
                }
            }
            GridEvent::CellFinished {
                round,
                policy,
                ..
            } => {
                self.grid_bar.inc(1);
                self.print_line(format!(
                    "  {} {} round {}",
                    CHECK,
                    style(policy).green(),
                    round
                ));
            }
        }
    }
}
