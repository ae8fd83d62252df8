//! Prompt text for each phase of a turn.

use guess_core::{ChoiceRequest, TurnPhase};

/// System prompt describing the game. Scoring weights are not shown, only
/// their shape.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are playing a repeated guessing game against other AI players.

Every turn has two steps:
1. Public bet: announce which action you expect the most players to pick.
   Everyone sees every bet.
2. Private action: after reading all bets, secretly pick your own action.

Your action earns more points the more players pick the same action.
Your bet earns a smaller bonus for every player whose action matches it.

Always end your reply with a single line of the form `BET: <number>` or
`ACTION: <number>`, as asked.";

/// User message for `request`.
pub fn render(request: &ChoiceRequest) -> String {
    let max = request.num_actions.saturating_sub(1);
    match &request.phase {
        TurnPhase::Bet {
            score,
            previous_actions,
        } => {
            let history = if previous_actions.is_empty() {
                "This is the first turn.".to_string()
            } else {
                format!("Last turn's private actions were {}.", list(previous_actions))
            };
            format!(
                "Turn {turn}. Your score so far is {score:.1}.\n{history}\n\
                 Place your public bet: the action from 0 to {max} you expect most players to choose.\n\
                 Reply with `BET: <number>`.",
                turn = request.turn + 1,
            )
        }
        TurnPhase::Action { public_bets } => format!(
            "Turn {turn}. The public bets are {bets}.\n\
             Choose your private action from 0 to {max}.\n\
             Reply with `ACTION: <number>`.",
            turn = request.turn + 1,
            bets = list(public_bets),
        ),
    }
}

fn list(values: &[usize]) -> String {
    let items: Vec<String> = values.iter().map(usize::to_string).collect();
    format!("[{}]", items.join(", "))
}
