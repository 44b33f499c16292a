//! Built-in template definitions.

use super::{ReasoningTemplate, TemplateCategory, TemplateStep};
use crate::thinking::ThoughtType as T;

pub(super) fn templates() -> Vec<ReasoningTemplate> {
    vec![
        problem_solving(),
        debugging(),
        decision_making(),
        creative_exploration(),
        research_analysis(),
    ]
}

fn problem_solving() -> ReasoningTemplate {
    ReasoningTemplate::new(
        "problem-solving",
        "Define the problem, analyze causes, propose and test a solution",
        TemplateCategory::ProblemSolving,
        vec![
            TemplateStep::new(
                1,
                T::Observation,
                "Restate the problem precisely. List the facts given and the constraints that any solution must respect.",
            ),
            TemplateStep::new(
                2,
                T::Analysis,
                "Break the problem into its parts and identify the one most likely to be the root cause.",
            ),
            TemplateStep::new(
                3,
                T::Hypothesis,
                "Propose a concrete solution that addresses the root cause you identified.",
            )
            .with_min_confidence(55),
            TemplateStep::new(
                4,
                T::Evidence,
                "Test the proposed solution against the constraints. What supports it and what contradicts it?",
            ),
            TemplateStep::new(
                5,
                T::Conclusion,
                "State the recommended solution, its main risk, and the first step to carry it out.",
            )
            .with_min_confidence(70),
        ],
    )
}

fn debugging() -> ReasoningTemplate {
    ReasoningTemplate::new(
        "debugging",
        "Reproduce, isolate, and explain a fault before fixing it",
        TemplateCategory::Debugging,
        vec![
            TemplateStep::new(
                1,
                T::Observation,
                "Describe the observed symptom, the expected behavior, and the conditions under which it occurs.",
            ),
            TemplateStep::new(
                2,
                T::Hypothesis,
                "List the most plausible causes, ordered by likelihood, and pick the leading one.",
            ),
            TemplateStep::new(
                3,
                T::Evidence,
                "Name the observation or experiment that would confirm or rule out the leading cause, and what it shows.",
            )
            .with_min_confidence(60),
            TemplateStep::new(
                4,
                T::Analysis,
                "Explain the mechanism by which the confirmed cause produces the symptom.",
            ),
            TemplateStep::new(
                5,
                T::Conclusion,
                "Describe the fix and how to verify that the symptom is gone without regressions.",
            )
            .with_min_confidence(75),
        ],
    )
}

fn decision_making() -> ReasoningTemplate {
    ReasoningTemplate::new(
        "decision-making",
        "Frame a decision, weigh options against criteria, and commit",
        TemplateCategory::Decision,
        vec![
            TemplateStep::new(
                1,
                T::Question,
                "State the decision to be made and the criteria that matter, with their relative weight.",
            ),
            TemplateStep::new(
                2,
                T::Alternative,
                "Lay out the realistic options, including doing nothing.",
            ),
            TemplateStep::new(
                3,
                T::Analysis,
                "Score each option against each criterion and note where the scores are uncertain.",
            )
            .with_min_confidence(55),
            TemplateStep::new(
                4,
                T::Critique,
                "Challenge the leading option: which assumption, if wrong, would change the ranking?",
            ),
            TemplateStep::new(
                5,
                T::Conclusion,
                "Commit to one option and state the condition under which you would revisit it.",
            )
            .with_min_confidence(70),
        ],
    )
}

fn creative_exploration() -> ReasoningTemplate {
    ReasoningTemplate::new(
        "creative-exploration",
        "Diverge widely, then converge on the most promising idea",
        TemplateCategory::Creative,
        vec![
            TemplateStep::new(
                1,
                T::Question,
                "Reframe the prompt as an open question. What would an unusual answer look like?",
            ),
            TemplateStep::new(
                2,
                T::Alternative,
                "Propose an idea that deliberately breaks a convention of the domain.",
            )
            .with_min_confidence(40),
            TemplateStep::new(
                3,
                T::Synthesis,
                "Combine the strongest elements of the ideas so far into one concept.",
            ),
            TemplateStep::new(
                4,
                T::Conclusion,
                "Describe the concept concretely enough that someone could prototype it.",
            ),
        ],
    )
}

fn research_analysis() -> ReasoningTemplate {
    ReasoningTemplate::new(
        "research-analysis",
        "Scope a research question, weigh sources, and synthesize findings",
        TemplateCategory::Research,
        vec![
            TemplateStep::new(
                1,
                T::Question,
                "Sharpen the research question and say what a satisfying answer would contain.",
            ),
            TemplateStep::new(
                2,
                T::Observation,
                "Summarize what is already known and where the main gaps or disagreements are.",
            ),
            TemplateStep::new(
                3,
                T::Evidence,
                "Weigh the strongest evidence on each side, noting source quality and possible bias.",
            )
            .with_min_confidence(60),
            TemplateStep::new(
                4,
                T::Analysis,
                "Reconcile the conflicting evidence. Which explanation accounts for most of it?",
            ),
            TemplateStep::new(
                5,
                T::Synthesis,
                "Integrate the findings into a single account, marking which parts are well supported.",
            ),
            TemplateStep::new(
                6,
                T::Conclusion,
                "Answer the research question and list the open questions that remain.",
            )
            .with_min_confidence(70),
        ],
    )
}
