//! Pipeline domain entities

use super::value_objects::{Judgment, Review, RoleAssessment, Solution};
use crate::core::agent::AgentId;
use crate::core::error::DomainError;
use crate::core::problem::Problem;
use serde::{Deserialize, Serialize};

/// Stage of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Each agent self-reports a preferred role (advisory)
    RoleAssignment,
    /// Each agent produces a solution
    Solving,
    /// Every agent reviews every other agent's solution
    PeerReview,
    /// Each agent refines its solution using the reviews it received
    Refinement,
    /// The judge picks a winner
    Judging,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::RoleAssignment,
        Stage::Solving,
        Stage::PeerReview,
        Stage::Refinement,
        Stage::Judging,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::RoleAssignment => "role_assignment",
            Stage::Solving => "solving",
            Stage::PeerReview => "peer_review",
            Stage::Refinement => "refinement",
            Stage::Judging => "judging",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::RoleAssignment => "Role Assignment",
            Stage::Solving => "Solving",
            Stage::PeerReview => "Peer Review",
            Stage::Refinement => "Refinement",
            Stage::Judging => "Judging",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Progress of a single pipeline run
///
/// `Init -> RolesAssigned -> Solved -> Reviewed -> Refined -> Judged`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Init,
    RolesAssigned,
    Solved,
    Reviewed,
    Refined,
    Judged,
}

impl RunState {
    /// The stage whose completion leaves the run in this state
    pub fn completed_by(&self) -> Option<Stage> {
        match self {
            RunState::Init => None,
            RunState::RolesAssigned => Some(Stage::RoleAssignment),
            RunState::Solved => Some(Stage::Solving),
            RunState::Reviewed => Some(Stage::PeerReview),
            RunState::Refined => Some(Stage::Refinement),
            RunState::Judged => Some(Stage::Judging),
        }
    }

    /// The stage that may run next, if any
    pub fn next_stage(&self) -> Option<Stage> {
        match self {
            RunState::Init => Some(Stage::RoleAssignment),
            RunState::RolesAssigned => Some(Stage::Solving),
            RunState::Solved => Some(Stage::PeerReview),
            RunState::Reviewed => Some(Stage::Refinement),
            RunState::Refined => Some(Stage::Judging),
            RunState::Judged => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Judged)
    }
}

/// Number of invocations per stage that fell back to a default value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackStats {
    pub role_assignment: usize,
    pub solving: usize,
    pub peer_review: usize,
    pub refinement: usize,
    pub judging: usize,
}

impl FallbackStats {
    pub fn get(&self, stage: Stage) -> usize {
        match stage {
            Stage::RoleAssignment => self.role_assignment,
            Stage::Solving => self.solving,
            Stage::PeerReview => self.peer_review,
            Stage::Refinement => self.refinement,
            Stage::Judging => self.judging,
        }
    }

    fn set(&mut self, stage: Stage, count: usize) {
        match stage {
            Stage::RoleAssignment => self.role_assignment = count,
            Stage::Solving => self.solving = count,
            Stage::PeerReview => self.peer_review = count,
            Stage::Refinement => self.refinement = count,
            Stage::Judging => self.judging = count,
        }
    }

    pub fn total(&self) -> usize {
        Stage::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

/// A single pipeline run for one problem (Entity)
///
/// Stage outputs can only be recorded in pipeline order; recording out of
/// order is an invariant violation. Once judged, the run is consumed into a
/// [`PipelineOutcome`].
#[derive(Debug, Clone)]
pub struct PipelineRun {
    problem: Problem,
    agents: Vec<AgentId>,
    state: RunState,
    roles: Vec<RoleAssessment>,
    solutions: Vec<Solution>,
    reviews: Vec<Review>,
    refined: Vec<Solution>,
    judgment: Option<Judgment>,
    fallbacks: FallbackStats,
}

impl PipelineRun {
    pub fn new(problem: Problem, agents: Vec<AgentId>) -> Result<Self, DomainError> {
        if agents.is_empty() {
            return Err(DomainError::NoAgents);
        }
        Ok(Self {
            problem,
            agents,
            state: RunState::Init,
            roles: Vec::new(),
            solutions: Vec::new(),
            reviews: Vec::new(),
            refined: Vec::new(),
            judgment: None,
            fallbacks: FallbackStats::default(),
        })
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn agents(&self) -> &[AgentId] {
        &self.agents
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn fallbacks(&self) -> FallbackStats {
        self.fallbacks
    }

    pub fn solutions(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    pub fn refined(&self) -> &[Solution] {
        &self.refined
    }

    fn advance(&mut self, stage: Stage, fallbacks: usize) -> Result<(), DomainError> {
        if self.state.next_stage() != Some(stage) {
            return Err(DomainError::InvariantViolation(format!(
                "cannot complete {} while run is {:?}",
                stage.as_str(),
                self.state
            )));
        }
        self.fallbacks.set(stage, fallbacks);
        self.state = match stage {
            Stage::RoleAssignment => RunState::RolesAssigned,
            Stage::Solving => RunState::Solved,
            Stage::PeerReview => RunState::Reviewed,
            Stage::Refinement => RunState::Refined,
            Stage::Judging => RunState::Judged,
        };
        Ok(())
    }

    pub fn record_roles(
        &mut self,
        roles: Vec<RoleAssessment>,
        fallbacks: usize,
    ) -> Result<(), DomainError> {
        self.advance(Stage::RoleAssignment, fallbacks)?;
        self.roles = roles;
        Ok(())
    }

    /// Record the raw solutions; there must be exactly one per agent.
    pub fn record_solutions(
        &mut self,
        solutions: Vec<Solution>,
        fallbacks: usize,
    ) -> Result<(), DomainError> {
        self.check_one_per_agent(&solutions, "solutions")?;
        self.advance(Stage::Solving, fallbacks)?;
        self.solutions = solutions;
        Ok(())
    }

    /// Record the peer reviews; self-reviews are rejected.
    pub fn record_reviews(
        &mut self,
        reviews: Vec<Review>,
        fallbacks: usize,
    ) -> Result<(), DomainError> {
        if let Some(r) = reviews.iter().find(|r| r.reviewer_id == r.solution_id) {
            return Err(DomainError::InvariantViolation(format!(
                "{} reviewed its own solution",
                r.reviewer_id
            )));
        }
        self.advance(Stage::PeerReview, fallbacks)?;
        self.reviews = reviews;
        Ok(())
    }

    pub fn record_refined(
        &mut self,
        refined: Vec<Solution>,
        fallbacks: usize,
    ) -> Result<(), DomainError> {
        self.check_one_per_agent(&refined, "refined solutions")?;
        self.advance(Stage::Refinement, fallbacks)?;
        self.refined = refined;
        Ok(())
    }

    /// Record the verdict; the winner must be one of the refined solutions.
    pub fn record_judgment(
        &mut self,
        judgment: Judgment,
        fallbacks: usize,
    ) -> Result<(), DomainError> {
        if !self.refined.iter().any(|s| s.agent_id == judgment.winner) {
            return Err(DomainError::UnknownWinner {
                winner: judgment.winner.to_string(),
            });
        }
        self.advance(Stage::Judging, fallbacks)?;
        self.judgment = Some(judgment);
        Ok(())
    }

    /// Consume a judged run into its outcome.
    pub fn finish(self) -> Result<PipelineOutcome, DomainError> {
        let judgment = match (self.state, self.judgment) {
            (RunState::Judged, Some(judgment)) => judgment,
            (state, _) => {
                return Err(DomainError::InvariantViolation(format!(
                    "run finished in state {:?}",
                    state
                )));
            }
        };

        Ok(PipelineOutcome {
            problem_id: self.problem.id().to_string(),
            question: self.problem.question().to_string(),
            agents: self.agents,
            roles: self.roles,
            solutions: self.solutions,
            reviews: self.reviews,
            refined_solutions: self.refined,
            judgment,
            fallbacks: self.fallbacks,
        })
    }

    fn check_one_per_agent(&self, solutions: &[Solution], what: &str) -> Result<(), DomainError> {
        let ids: Vec<AgentId> = solutions.iter().map(|s| s.agent_id).collect();
        if ids != self.agents {
            return Err(DomainError::InvariantViolation(format!(
                "{} do not match agents: expected {:?}, got {:?}",
                what, self.agents, ids
            )));
        }
        Ok(())
    }
}

/// Complete result of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub problem_id: String,
    pub question: String,
    pub agents: Vec<AgentId>,
    pub roles: Vec<RoleAssessment>,
    pub solutions: Vec<Solution>,
    pub reviews: Vec<Review>,
    pub refined_solutions: Vec<Solution>,
    pub judgment: Judgment,
    pub fallbacks: FallbackStats,
}

impl PipelineOutcome {
    /// The refined solution that won
    pub fn winning_solution(&self) -> Option<&Solution> {
        self.refined_solutions
            .iter()
            .find(|s| s.agent_id == self.judgment.winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(n: usize) -> PipelineRun {
        PipelineRun::new(Problem::try_new("p1", "2+2").unwrap(), AgentId::solvers(n)).unwrap()
    }

    fn solutions(n: usize) -> Vec<Solution> {
        AgentId::solvers(n).into_iter().map(Solution::empty).collect()
    }

    #[test]
    fn test_no_agents_rejected() {
        let err = PipelineRun::new(Problem::try_new("p1", "2+2").unwrap(), vec![]).unwrap_err();
        assert_eq!(err, DomainError::NoAgents);
    }

    #[test]
    fn test_full_sequence() {
        let mut r = run(2);
        assert_eq!(r.state(), RunState::Init);
        r.record_roles(vec![], 2).unwrap();
        r.record_solutions(solutions(2), 1).unwrap();
        r.record_reviews(
            vec![
                Review::neutral(AgentId::Solver(1), AgentId::Solver(2)),
                Review::neutral(AgentId::Solver(2), AgentId::Solver(1)),
            ],
            2,
        )
        .unwrap();
        r.record_refined(solutions(2), 0).unwrap();
        let judgment = Judgment::default_for(r.refined()).unwrap();
        r.record_judgment(judgment, 1).unwrap();
        assert!(r.state().is_terminal());
        assert_eq!(r.fallbacks().total(), 6);

        let outcome = r.finish().unwrap();
        assert_eq!(outcome.judgment.winner, AgentId::Solver(1));
        assert_eq!(outcome.winning_solution().unwrap().agent_id, AgentId::Solver(1));
    }

    #[test]
    fn test_out_of_order_rejected() {
        let mut r = run(2);
        let err = r.record_solutions(solutions(2), 0).unwrap_err();
        assert!(err.is_invariant_violation());
        assert_eq!(r.state(), RunState::Init);
    }

    #[test]
    fn test_solutions_must_match_agents() {
        let mut r = run(3);
        r.record_roles(vec![], 0).unwrap();
        let err = r.record_solutions(solutions(2), 0).unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_self_review_rejected() {
        let mut r = run(2);
        r.record_roles(vec![], 0).unwrap();
        r.record_solutions(solutions(2), 0).unwrap();
        let err = r
            .record_reviews(vec![Review::neutral(AgentId::Solver(1), AgentId::Solver(1))], 0)
            .unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_unknown_winner_rejected() {
        let mut r = run(1);
        r.record_roles(vec![], 0).unwrap();
        r.record_solutions(solutions(1), 0).unwrap();
        r.record_reviews(vec![], 0).unwrap();
        r.record_refined(solutions(1), 0).unwrap();
        let err = r
            .record_judgment(
                Judgment {
                    winner: AgentId::Solver(5),
                    confidence: 0.9,
                    reasoning: String::new(),
                },
                0,
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::UnknownWinner { .. }));
    }

    #[test]
    fn test_finish_before_judged_fails() {
        let r = run(1);
        assert!(r.finish().is_err());
    }

    #[test]
    fn test_state_transitions() {
        assert_eq!(RunState::Init.next_stage(), Some(Stage::RoleAssignment));
        assert_eq!(RunState::Refined.next_stage(), Some(Stage::Judging));
        assert_eq!(RunState::Judged.next_stage(), None);
        assert_eq!(RunState::Reviewed.completed_by(), Some(Stage::PeerReview));
    }
}
