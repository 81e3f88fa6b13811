use tracing::warn;

use crate::model::directive::Directive;
use crate::model::event_result::{DirectiveApplication, DirectiveOutcome, DirectiveReport};
use crate::model::game_state::{GameState, Monster};

/// Apply a Directive to the GameState, returning the outcome.
/// State changes are narrated into the battle log.
pub fn apply_directive(state: &mut GameState, directive: &Directive) -> DirectiveOutcome {
    match directive {
        Directive::SpawnMonster { name, hp } => {
            if *hp <= 0 {
                return DirectiveOutcome::Rejected {
                    reason: format!("Monster '{}' needs positive HP, got {}", name, hp),
                };
            }

            let driven_off = state
                .active_monster()
                .map(|old| format!("{} is driven off.", old.name));
            if let Some(line) = driven_off {
                state.log(line);
            }

            let monster = Monster::spawn(name.clone(), *hp);
            state.log(format!(
                "A {} appears! (HP {}/{})",
                monster.name, monster.hp, monster.max_hp
            ));
            state.monster = Some(monster);

            DirectiveOutcome::Applied
        }

        Directive::MonsterHp { delta } => {
            let Some(monster) = state.monster.as_mut().filter(|m| m.active) else {
                return DirectiveOutcome::Rejected {
                    reason: "No active monster".to_string(),
                };
            };

            monster.adjust_hp(*delta);
            let line = if *delta < 0 {
                format!(
                    "{} takes {} damage (HP {}/{})",
                    monster.name,
                    delta.unsigned_abs(),
                    monster.hp,
                    monster.max_hp
                )
            } else {
                format!(
                    "{} recovers {} HP (HP {}/{})",
                    monster.name, delta, monster.hp, monster.max_hp
                )
            };
            let defeated = (!monster.active).then(|| format!("{} has been defeated!", monster.name));

            state.log(line);
            if let Some(defeated) = defeated {
                state.log(defeated);
            }

            DirectiveOutcome::Applied
        }

        Directive::PlayerHp { player, delta } => {
            let Some(p) = state.player_mut(player) else {
                return unknown_player(player);
            };

            let was_up = !p.is_down();
            p.adjust_hp(*delta);
            let line = format!("{} HP {:+} (now {})", p.name, delta, p.hp);
            let fallen = (was_up && p.is_down()).then(|| format!("{} has fallen!", p.name));

            state.log(line);
            if let Some(fallen) = fallen {
                state.log(fallen);
            }

            DirectiveOutcome::Applied
        }

        Directive::Gold { player, delta } => {
            let Some(p) = state.player_mut(player) else {
                return unknown_player(player);
            };

            p.adjust_gold(*delta);
            let line = format!("{} gold {:+} (now {})", p.name, delta, p.gold);
            state.log(line);

            DirectiveOutcome::Applied
        }

        Directive::GrantItem { player, item } => {
            if item.trim().is_empty() {
                return DirectiveOutcome::Rejected {
                    reason: "Item name is empty".to_string(),
                };
            }

            let Some(p) = state.player_mut(player) else {
                return unknown_player(player);
            };

            p.inventory.push(item.trim().to_string());
            let line = format!("{} receives {}", p.name, item.trim());
            state.log(line);

            DirectiveOutcome::Applied
        }

        Directive::Malformed { raw } => DirectiveOutcome::Rejected {
            reason: format!("Malformed directive {}", raw),
        },
    }
}

/// Apply every directive in order. Directives that do not apply are logged too.
pub fn apply_directives(state: &mut GameState, directives: &[Directive]) -> DirectiveReport {
    let mut applications = Vec::with_capacity(directives.len());

    for directive in directives {
        let outcome = apply_directive(state, directive);

        match &outcome {
            DirectiveOutcome::Applied => {}
            DirectiveOutcome::Rejected { reason } | DirectiveOutcome::Deferred { reason } => {
                warn!(directive = directive.short_name(), %reason, "directive not applied");
                state.log(format!("Ignored {}: {}", directive.short_name(), reason));
            }
        }

        applications.push(DirectiveApplication {
            directive: directive.clone(),
            outcome,
        });
    }

    DirectiveReport { applications }
}

fn unknown_player(player: &str) -> DirectiveOutcome {
    DirectiveOutcome::Deferred {
        reason: format!("Unknown player '{}'", player),
    }
}
