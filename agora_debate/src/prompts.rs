//! Role prompt builders.
//!
//! Pure functions from a topic, the prior message log and [`PromptSettings`]
//! to instruction text. Word budgets are written into the prompt and are not
//! checked against the model's answer.

use std::fmt::Write as _;

use agora_core::util::truncate_chars;
use agora_core::{Message, Role};

use crate::segmenter::{CON_MARKER, MODERATOR_MARKER, PRO_MARKER};
use crate::settings::PromptSettings;

/// One of the two debating sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Pro,
    Con,
}

impl Side {
    #[must_use]
    pub const fn role(self) -> Role {
        match self {
            Self::Pro => Role::Pro,
            Self::Con => Role::Con,
        }
    }

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Pro => Self::Con,
            Self::Con => Self::Pro,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Pro => "PRO",
            Self::Con => "CON",
        }
    }

    const fn stance(self) -> &'static str {
        match self {
            Self::Pro => "FOR",
            Self::Con => "AGAINST",
        }
    }

    const fn direction(self) -> &'static str {
        match self {
            Self::Pro => "supporting",
            Self::Con => "opposing",
        }
    }
}

/// Newest message written by `role`, scanning from the end of the log.
#[must_use]
pub fn latest_by_role(history: &[Message], role: Role) -> Option<&Message> {
    history.iter().rev().find(|m| m.role == role)
}

/// What a debater is asked to do this turn.
enum Task {
    Opening,
    Rebuttal { quote: String },
}

fn debater_task(side: Side, history: &[Message], settings: &PromptSettings) -> Task {
    latest_by_role(history, side.opponent().role()).map_or(Task::Opening, |msg| {
        Task::Rebuttal {
            quote: truncate_chars(&msg.content, settings.quote_chars),
        }
    })
}

/// Numbered task list for a debater, shared by the per-role and combined prompts.
fn debater_instructions(side: Side, task: &Task, settings: &PromptSettings) -> String {
    match task {
        Task::Opening => format!(
            "YOUR TASK:\n\
             1. Present 2-3 clear, strong reasons {direction} this position\n\
             2. Use concrete examples or evidence\n\
             3. Keep it concise ({budget})\n\
             4. Write in clear paragraphs with complete sentences; use bullet points only if you cannot otherwise stay within the word budget\n\
             5. Be persuasive but not preachy",
            direction = side.direction(),
            budget = settings.opening_words,
        ),
        Task::Rebuttal { quote } => format!(
            "The {opponent} side just argued:\n\
             \"{quote}\"\n\n\
             YOUR TASK:\n\
             1. Address their main objection directly (why they're wrong or missing the point)\n\
             2. Present 1-2 NEW strong points {direction} your position\n\
             3. Keep it focused and concise ({budget})\n\
             4. Use clear, complete sentences\n\
             5. Make your argument flow naturally - don't use bullet points",
            opponent = side.opponent().label(),
            direction = side.direction(),
            budget = settings.continuation_words,
        ),
    }
}

fn moderator_instructions(settings: &PromptSettings) -> String {
    format!(
        "1. Identify the common ground both sides share\n\
         2. Name the main point of disagreement\n\
         3. State the core tension the debate turns on\n\
         4. Stay neutral and do not declare a winner\n\
         5. Keep it concise ({budget})",
        budget = settings.moderator_words,
    )
}

/// Prompt for one debater. Uses the opening variant when the log holds no
/// message from the opposing side, otherwise a rebuttal of its latest message.
#[must_use]
pub fn debater_prompt(
    side: Side,
    topic: &str,
    history: &[Message],
    settings: &PromptSettings,
) -> String {
    let task = debater_task(side, history, settings);
    let instructions = debater_instructions(side, &task, settings);

    match task {
        Task::Opening => format!(
            "You are the {label} side arguing {stance}: \"{topic}\"\n\n\
             {instructions}\n\n\
             Make a strong opening argument:",
            label = side.label(),
            stance = side.stance(),
        ),
        Task::Rebuttal { .. } => format!(
            "You are the {label} side in a debate about: \"{topic}\"\n\n\
             {instructions}\n\n\
             Write a compelling response that builds on the debate:",
            label = side.label(),
        ),
    }
}

/// Prompt asking the moderator to synthesize this round's two arguments.
#[must_use]
pub fn moderator_prompt(topic: &str, pro: &str, con: &str, settings: &PromptSettings) -> String {
    format!(
        "You are a neutral debate moderator.\n\n\
         DEBATE TOPIC: \"{topic}\"\n\n\
         PRO ARGUMENT:\n\"{pro}\"\n\n\
         CON ARGUMENT:\n\"{con}\"\n\n\
         YOUR TASK:\n{instructions}\n\n\
         Write your synthesis:",
        pro = truncate_chars(pro, settings.moderator_quote_chars),
        con = truncate_chars(con, settings.moderator_quote_chars),
        instructions = moderator_instructions(settings),
    )
}

/// Single prompt asking for all three contributions of `round`, separated by
/// the segmenter's markers.
#[must_use]
pub fn combined_prompt(
    topic: &str,
    round: u32,
    history: &[Message],
    settings: &PromptSettings,
) -> String {
    let mut prompt = format!(
        "You are running a structured debate about: \"{topic}\"\n\
         This is round {round}. Write three contributions, one for each participant.\n"
    );

    for side in [Side::Pro, Side::Con] {
        let task = debater_task(side, history, settings);
        let _ = write!(
            prompt,
            "\n{label} AGENT (argues {stance} the proposition):\n{instructions}\n",
            label = side.label(),
            stance = side.stance(),
            instructions = debater_instructions(side, &task, settings),
        );
    }

    let _ = write!(
        prompt,
        "\nMODERATOR (neutral), responding to the PRO and CON contributions above:\n\
         {instructions}\n\n\
         Respond using exactly this format, each marker on its own line and nothing before the first marker:\n\
         {PRO_MARKER}\n<PRO contribution>\n\
         {CON_MARKER}\n<CON contribution>\n\
         {MODERATOR_MARKER}\n<MODERATOR contribution>",
        instructions = moderator_instructions(settings),
    );

    prompt
}
