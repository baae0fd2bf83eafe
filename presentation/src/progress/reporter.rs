//! Progress reporting for tribunal runs

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;
use tribunal_application::ports::progress::ProgressNotifier;
use tribunal_domain::{AgentId, Judgment, Stage};

/// Reports progress with one bar per stage plus an overall problem bar
///
/// Problems running concurrently share the stage bars: a bar grows by each
/// problem's task count and finishes once every queued task is done.
pub struct ProgressReporter {
    multi: MultiProgress,
    problem_bar: ProgressBar,
    stage_bars: Mutex<HashMap<Stage, ProgressBar>>,
}

impl ProgressReporter {
    pub fn new(total_problems: usize) -> Self {
        let multi = MultiProgress::new();
        let problem_bar = multi.add(ProgressBar::new(total_problems as u64));
        problem_bar.set_style(Self::problem_style());
        problem_bar.set_prefix("Problems");
        Self {
            multi,
            problem_bar,
            stage_bars: Mutex::new(HashMap::new()),
        }
    }

    fn problem_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.magenta} [{bar:40.magenta/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn stage_label(stage: Stage) -> String {
        let number = Stage::ALL
            .iter()
            .position(|s| *s == stage)
            .map_or(0, |i| i + 1);
        format!("Stage {}: {}", number, stage.display_name())
    }

    fn task_status(agent: AgentId, fallback: bool) -> String {
        if fallback {
            format!("{} {} (fallback)", "~".yellow(), agent)
        } else {
            format!("{} {}", "v".green(), agent)
        }
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_problem_start(&self, problem_id: &str) {
        self.problem_bar.set_message(problem_id.to_string());
    }

    fn on_stage_start(&self, stage: Stage, total_tasks: usize) {
        let Ok(mut bars) = self.stage_bars.lock() else {
            return;
        };
        if let Some(pb) = bars.get(&stage) {
            pb.inc_length(total_tasks as u64);
            return;
        }

        let pb = self
            .multi
            .insert_before(&self.problem_bar, ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::stage_style());
        pb.set_prefix(Self::stage_label(stage));
        pb.set_message("Starting...");
        bars.insert(stage, pb);
    }

    fn on_task_complete(&self, stage: Stage, agent: AgentId, fallback: bool) {
        if let Ok(bars) = self.stage_bars.lock()
            && let Some(pb) = bars.get(&stage)
        {
            pb.set_message(Self::task_status(agent, fallback));
            pb.inc(1);
        }
    }

    fn on_stage_complete(&self, stage: Stage) {
        let Ok(mut bars) = self.stage_bars.lock() else {
            return;
        };
        let done = bars
            .get(&stage)
            .is_some_and(|pb| Some(pb.position()) >= pb.length());
        if done && let Some(pb) = bars.remove(&stage) {
            pb.finish_and_clear();
        }
    }

    fn on_problem_complete(&self, problem_id: &str, judgment: &Judgment) {
        self.multi
            .println(format!(
                "{} {} -> {} ({:.2})",
                "v".green(),
                problem_id.bold(),
                judgment.winner,
                judgment.confidence
            ))
            .ok();
        self.problem_bar.inc(1);
        if Some(self.problem_bar.position()) >= self.problem_bar.length() {
            self.problem_bar
                .finish_with_message(format!("{}", "complete!".green()));
        }
    }

    fn on_problem_failed(&self, problem_id: &str, error: &str) {
        self.multi
            .println(format!("{} {} {}", "x".red(), problem_id.bold(), error.red()))
            .ok();
        self.problem_bar.inc(1);
        if Some(self.problem_bar.position()) >= self.problem_bar.length() {
            self.problem_bar
                .finish_with_message(format!("{}", "complete!".green()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
///
/// Writes to stderr so that stdout stays clean for the results.
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_problem_start(&self, problem_id: &str) {
        eprintln!("{} {}", "==>".magenta().bold(), problem_id.bold());
    }

    fn on_stage_start(&self, stage: Stage, total_tasks: usize) {
        eprintln!(
            "{} {} ({} tasks)",
            "->".cyan(),
            ProgressReporter::stage_label(stage).bold(),
            total_tasks
        );
    }

    fn on_task_complete(&self, _stage: Stage, agent: AgentId, fallback: bool) {
        eprintln!("  {}", ProgressReporter::task_status(agent, fallback));
    }

    fn on_stage_complete(&self, _stage: Stage) {}

    fn on_problem_complete(&self, problem_id: &str, judgment: &Judgment) {
        eprintln!(
            "{} {} winner: {} ({:.2})\n",
            "v".green(),
            problem_id,
            judgment.winner,
            judgment.confidence
        );
    }

    fn on_problem_failed(&self, problem_id: &str, error: &str) {
        eprintln!("{} {} failed: {}\n", "x".red(), problem_id, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_label_is_numbered() {
        assert_eq!(
            ProgressReporter::stage_label(Stage::RoleAssignment),
            "Stage 1: Role Assignment"
        );
        assert_eq!(ProgressReporter::stage_label(Stage::Judging), "Stage 5: Judging");
    }

    #[test]
    fn test_shared_stage_bar_finishes_after_all_tasks() {
        let reporter = ProgressReporter::new(2);
        reporter.on_stage_start(Stage::Solving, 3);
        reporter.on_stage_start(Stage::Solving, 3);
        for n in 1..=3 {
            reporter.on_task_complete(Stage::Solving, AgentId::Solver(n), false);
        }
        reporter.on_stage_complete(Stage::Solving);
        assert!(reporter.stage_bars.lock().unwrap().contains_key(&Stage::Solving));

        for n in 1..=3 {
            reporter.on_task_complete(Stage::Solving, AgentId::Solver(n), n == 2);
        }
        reporter.on_stage_complete(Stage::Solving);
        assert!(reporter.stage_bars.lock().unwrap().is_empty());
    }
}
