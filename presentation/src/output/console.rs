//! Console output formatter for tribunal results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use tribunal_application::{BatchReport, FailedProblem};
use tribunal_domain::{FallbackStats, PipelineOutcome, Review, Solution, Stage};

/// Formats batch results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Every stage of one problem
    pub fn format_outcome(outcome: &PipelineOutcome) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!("Problem {}", outcome.problem_id)));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n\n",
            "Question:".cyan().bold(),
            outcome.question
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Agents:".cyan().bold(),
            outcome
                .agents
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));

        output.push_str(&Self::section_header("Stage 1: Role Assignment"));
        for role in &outcome.roles {
            let preferred = role.assessment["preferred_role"]
                .as_str()
                .unwrap_or("(unspecified)");
            output.push_str(&format!("  {} prefers {}\n", role.agent_id, preferred.bold()));
        }

        output.push_str(&Self::section_header("Stage 2: Initial Solutions"));
        for solution in &outcome.solutions {
            output.push_str(&Self::solution_block(solution));
        }

        output.push_str(&Self::section_header("Stage 3: Peer Reviews"));
        for review in &outcome.reviews {
            output.push_str(&Self::review_block(review));
        }

        output.push_str(&Self::section_header("Stage 4: Refined Solutions"));
        for solution in &outcome.refined_solutions {
            output.push_str(&Self::solution_block(solution));
        }

        output.push_str(&Self::section_header("Stage 5: Verdict"));
        output.push_str(&Self::verdict_lines(outcome));

        if outcome.fallbacks.total() > 0 {
            output.push_str(&format!(
                "\n{} {}\n",
                "Fallbacks:".yellow().bold(),
                Self::fallback_summary(&outcome.fallbacks)
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    /// The verdict of one problem (concise output)
    pub fn format_verdict(outcome: &PipelineOutcome) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} {}\n",
            format!("[{}]", outcome.problem_id).cyan().bold(),
            outcome.question
        ));
        output.push_str(&Self::verdict_lines(outcome));
        output
    }

    /// One line per aborted problem
    pub fn format_failures(failed: &[FailedProblem]) -> String {
        failed
            .iter()
            .map(|f| {
                let stage = f.stage.as_deref().unwrap_or("setup");
                format!(
                    "{} {} ({}): {}\n",
                    "x".red().bold(),
                    f.problem_id.bold(),
                    stage,
                    f.error
                )
            })
            .collect()
    }

    /// Totals for the whole batch
    pub fn format_summary(report: &BatchReport) -> String {
        let fallbacks: usize = report.completed.iter().map(|o| o.fallbacks.total()).sum();
        let elapsed = report.finished_at - report.started_at;
        let status = if report.all_succeeded() {
            "all problems judged".green().bold()
        } else {
            format!("{} failed", report.failed.len()).red().bold()
        };
        format!(
            "{} {}/{} judged, {} fallbacks, {:.1}s ({})\n",
            "Summary:".cyan().bold(),
            report.completed.len(),
            report.total(),
            fallbacks,
            elapsed.num_milliseconds() as f64 / 1000.0,
            status
        )
    }

    /// Format as JSON
    pub fn format_json(report: &BatchReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    fn verdict_lines(outcome: &PipelineOutcome) -> String {
        let judgment = &outcome.judgment;
        let mut output = format!(
            "{} {} {}\n",
            "Winner:".green().bold(),
            judgment.winner.to_string().bold(),
            format!("(confidence {:.2})", judgment.confidence).dimmed()
        );
        if let Some(winning) = outcome.winning_solution() {
            output.push_str(&format!(
                "{} {}\n",
                "Answer:".green().bold(),
                winning.final_answer
            ));
        }
        output.push_str(&format!(
            "{}\n",
            Self::indent(&judgment.reasoning, "  ")
        ));
        output
    }

    fn solution_block(solution: &Solution) -> String {
        let mut output = format!(
            "\n{}\n",
            format!("── {} ({:.2}) ──", solution.agent_id, solution.confidence)
                .yellow()
                .bold()
        );
        for step in &solution.steps {
            output.push_str(&format!(
                "  {}. {} => {}\n",
                step.step, step.reasoning, step.answer
            ));
        }
        if solution.final_answer.is_empty() {
            output.push_str(&format!("  {}\n", "(no answer)".dimmed()));
        } else {
            output.push_str(&format!("  {} {}\n", "=".bold(), solution.final_answer));
        }
        output
    }

    fn review_block(review: &Review) -> String {
        let evaluation = &review.evaluation;
        let mut output = format!(
            "\n{}\n",
            format!("── {} reviewed {} ──", review.reviewer_id, review.solution_id)
                .yellow()
                .bold()
        );
        if !evaluation.scores.is_empty() {
            let scores = evaluation
                .scores
                .iter()
                .map(|(name, score)| format!("{name}={score:.2}"))
                .collect::<Vec<_>>()
                .join(" ");
            output.push_str(&format!("  {} {}\n", "scores:".dimmed(), scores));
        }
        for strength in &evaluation.strengths {
            output.push_str(&format!("  {} {}\n", "+".green(), strength));
        }
        for weakness in &evaluation.weaknesses {
            output.push_str(&format!("  {} {}\n", "-".red(), weakness));
        }
        for change in &evaluation.suggested_changes {
            output.push_str(&format!("  {} {}\n", "*".cyan(), change));
        }
        output
    }

    fn fallback_summary(stats: &FallbackStats) -> String {
        Stage::ALL
            .iter()
            .filter(|stage| stats.get(**stage) > 0)
            .map(|stage| format!("{}={}", stage.as_str(), stats.get(*stage)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_full(&self, report: &BatchReport) -> String {
        let mut output: String = report.completed.iter().map(Self::format_outcome).collect();
        output.push_str(&Self::format_failures(&report.failed));
        output.push_str(&Self::format_summary(report));
        output
    }

    fn format_verdicts(&self, report: &BatchReport) -> String {
        let mut output = report
            .completed
            .iter()
            .map(Self::format_verdict)
            .collect::<Vec<_>>()
            .join("\n");
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&Self::format_failures(&report.failed));
        output.push_str(&Self::format_summary(report));
        output
    }

    fn format_json(&self, report: &BatchReport) -> String {
        Self::format_json(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::{Value, json};
    use tribunal_domain::{AgentId, Judgment, OutputFormat, RoleAssessment};

    fn outcome() -> PipelineOutcome {
        let agents = AgentId::solvers(2);
        let mut refined = Solution::empty(AgentId::Solver(2));
        refined.final_answer = "4".to_string();
        PipelineOutcome {
            problem_id: "p1".to_string(),
            question: "2+2".to_string(),
            roles: agents.iter().map(|a| RoleAssessment::default_for(*a)).collect(),
            solutions: agents.iter().map(|a| Solution::empty(*a)).collect(),
            reviews: vec![Review::neutral(AgentId::Solver(1), AgentId::Solver(2))],
            refined_solutions: vec![Solution::empty(AgentId::Solver(1)), refined],
            judgment: Judgment {
                winner: AgentId::Solver(2),
                confidence: 0.9,
                reasoning: "correct\narithmetic".to_string(),
            },
            fallbacks: FallbackStats {
                peer_review: 1,
                ..FallbackStats::default()
            },
            agents,
        }
    }

    fn report() -> BatchReport {
        BatchReport {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            completed: vec![outcome()],
            failed: vec![FailedProblem {
                problem_id: "p2".to_string(),
                stage: Some("solving".to_string()),
                error: "connection refused".to_string(),
            }],
        }
    }

    #[test]
    fn test_full_output_covers_every_stage() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_outcome(&outcome());

        assert!(text.contains("Question: 2+2"));
        assert!(text.contains("solver_1 prefers Solver"));
        assert!(text.contains("solver_1 reviewed solver_2"));
        assert!(text.contains("Stage 5: Verdict"));
        assert!(text.contains("Answer: 4"));
        assert!(text.contains("  correct\n  arithmetic"));
        assert!(text.contains("Fallbacks: peer_review=1"));
    }

    #[test]
    fn test_verdicts_list_failures_and_summary() {
        colored::control::set_override(false);
        let text = ConsoleFormatter.render(&report(), OutputFormat::Verdict);

        assert!(text.contains("[p1] 2+2"));
        assert!(text.contains("Winner: solver_2"));
        assert!(text.contains("p2 (solving): connection refused"));
        assert!(text.contains("1/2 judged, 1 fallbacks"));
        assert!(!text.contains("Stage 3"));
    }

    #[test]
    fn test_json_output() {
        let text = ConsoleFormatter.render(&report(), OutputFormat::Json);
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["completed"][0]["judgment"]["winner"], json!("solver_2"));
        assert_eq!(value["failed"][0]["problem_id"], json!("p2"));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
