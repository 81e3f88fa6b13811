use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::directive::Directive;

/// Any bracketed tag that starts with a known directive keyword.
static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[\s*(MONSTER_HP|MONSTER_DMG|MONSTER|HP|GOLD|ITEM)\s*:\s*([^\]\[]*)\]")
        .expect("directive tag regex")
});

/// `Goblin King, HP: 50`
static SPAWN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.+?)\s*,\s*(?:HP\s*:?\s*)?([+-]?\d+)$").expect("spawn body regex")
});

/// `Ana, -2`
static TARGET_DELTA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*,\s*([+-]?\s*\d+)$").expect("delta body regex"));

/// `Ana, Rusty Key`
static TARGET_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*,\s*(.+)$").expect("item body regex"));

/// Narrator text split into machine directives and what players should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNarration {
    /// In order of appearance
    pub directives: Vec<Directive>,
    pub display_text: String,
}

pub fn parse_directives(narration: &str) -> ParsedNarration {
    let mut directives = Vec::new();
    let mut out = String::with_capacity(narration.len());
    let mut last = 0;

    for caps in TAG_RE.captures_iter(narration) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let keyword = caps.get(1).map_or("", |m| m.as_str());
        let body = caps.get(2).map_or("", |m| m.as_str()).trim();

        directives.push(parse_body(keyword, body, whole.as_str()));

        out.push_str(&narration[last..whole.start()]);
        last = whole.end();

        let line_start = out.rfind('\n').map_or(0, |i| i + 1);
        let line_is_blank = out[line_start..].trim_matches([' ', '\t']).is_empty();
        let rest_of_line = narration[last..].split('\n').next().unwrap_or("");

        if line_is_blank && rest_of_line.trim().is_empty() {
            // The tag was the whole line: drop it with its newline.
            out.truncate(line_start);
            last += rest_of_line.len();
            if narration[last..].starts_with('\n') {
                last += 1;
            }
        } else if line_is_blank {
            let leading = rest_of_line.len() - rest_of_line.trim_start_matches([' ', '\t']).len();
            last += leading;
        } else {
            // Drop the gap the tag leaves before whitespace, punctuation or the end.
            let next = narration[last..].chars().next();
            if next.map_or(true, |c| c.is_whitespace() || ",.!?;:".contains(c)) {
                let trimmed = out.trim_end_matches([' ', '\t']).len();
                out.truncate(trimmed);
            }
        }
    }
    out.push_str(&narration[last..]);

    ParsedNarration {
        directives,
        display_text: out.trim().to_string(),
    }
}

fn parse_body(keyword: &str, body: &str, raw: &str) -> Directive {
    let malformed = || Directive::Malformed {
        raw: raw.to_string(),
    };

    match keyword.to_ascii_uppercase().as_str() {
        "MONSTER" => match SPAWN_RE.captures(body) {
            Some(c) => match parse_delta(&c[2]) {
                Some(hp) => Directive::SpawnMonster {
                    name: c[1].trim().to_string(),
                    hp,
                },
                None => malformed(),
            },
            None => malformed(),
        },

        "MONSTER_HP" => match parse_delta(body) {
            Some(delta) => Directive::MonsterHp { delta },
            None => malformed(),
        },

        // Damage is written as a positive amount.
        "MONSTER_DMG" => match parse_delta(body) {
            Some(amount) => Directive::MonsterHp {
                delta: amount.saturating_abs().saturating_neg(),
            },
            None => malformed(),
        },

        "HP" | "GOLD" => match TARGET_DELTA_RE.captures(body) {
            Some(c) => match parse_delta(&c[2]) {
                Some(delta) => {
                    let player = c[1].trim().to_string();
                    if keyword.eq_ignore_ascii_case("HP") {
                        Directive::PlayerHp { player, delta }
                    } else {
                        Directive::Gold { player, delta }
                    }
                }
                None => malformed(),
            },
            None => malformed(),
        },

        "ITEM" => match TARGET_ITEM_RE.captures(body) {
            Some(c) => Directive::GrantItem {
                player: c[1].trim().to_string(),
                item: c[2].trim().to_string(),
            },
            None => malformed(),
        },

        _ => malformed(),
    }
}

/// Parses `-10`, `+15`, `- 3` or `7`. Out-of-range numbers are rejected.
fn parse_delta(raw: &str) -> Option<i32> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    compact.parse().ok()
}
