use crate::engine::llm_client::ChatMessage;
use crate::model::game_state::GameState;
use crate::model::message::Role;

/// Builds the message list sent to the narrator.
/// Only formats text: no parsing, no networking.
pub struct PromptBuilder;

impl PromptBuilder {
    /// System prompt with the directive grammar, a party status block, then
    /// the last `history_window` turns.
    pub fn build(state: &GameState, history_window: usize) -> Vec<ChatMessage> {
        let mut system = String::new();
        system.push_str(&state.system_prompt);
        system.push_str("\n\n");
        push_directive_rules(&mut system);

        let mut messages = vec![
            ChatMessage::new(Role::System.as_str(), system),
            ChatMessage::new(Role::System.as_str(), status_block(state)),
        ];

        let start = state.history.len().saturating_sub(history_window);
        messages.extend(
            state.history[start..]
                .iter()
                .map(|turn| ChatMessage::new(turn.role.as_str(), turn.prompt_content())),
        );

        messages
    }
}

fn push_directive_rules(prompt: &mut String) {
    prompt.push_str(
        "State Tags:\n\
Whenever the story changes game state, append the matching tag to your reply. \
Players never see the tags.\n\
- [MONSTER: Name, HP: 50] a new monster appears with 50 HP\n\
- [MONSTER_HP: -10] the current monster loses (or with +, regains) HP\n\
- [HP: PlayerName, -2] a player loses (or with +, regains) HP; players have 0-10 HP\n\
- [GOLD: PlayerName, +15] a player gains or spends gold\n\
- [ITEM: PlayerName, Item Name] a player receives an item\n\
Use exact player names from the party list. Never invent other tags.",
    );
}

fn status_block(state: &GameState) -> String {
    let mut block = String::from("CURRENT PARTY STATUS\n");

    if state.players.is_empty() {
        block.push_str("- No adventurers have joined yet.\n");
    }
    for player in &state.players {
        block.push_str("- ");
        block.push_str(&player.status_line());
        if player.is_down() {
            block.push_str(" [FALLEN]");
        }
        block.push('\n');
    }

    match state.active_monster() {
        Some(m) => block.push_str(&format!("Monster: {} HP {}/{}", m.name, m.hp, m.max_hp)),
        None => block.push_str("Monster: no active monster"),
    }

    block
}
