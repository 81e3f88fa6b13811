use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollQuality {
    CriticalFailure,
    Normal,
    CriticalSuccess,
}

/// Anything under a d2 is treated as a d2.
pub fn die_sides(sides: u32) -> u32 {
    sides.max(2)
}

pub fn roll<R: Rng + ?Sized>(rng: &mut R, sides: u32) -> u32 {
    rng.gen_range(1..=die_sides(sides))
}

pub fn quality(value: u32, sides: u32) -> RollQuality {
    if value <= 1 {
        RollQuality::CriticalFailure
    } else if value >= die_sides(sides) {
        RollQuality::CriticalSuccess
    } else {
        RollQuality::Normal
    }
}

/// The history line the narrator reacts to, e.g. `🎲 Ana (Rogue) rolled a 17!`
pub fn roll_line(player: &str, class: &str, value: u32, sides: u32) -> String {
    let sides = die_sides(sides);
    let die = if sides == 20 {
        String::new()
    } else {
        format!(" on a d{}", sides)
    };
    let flourish = match quality(value, sides) {
        RollQuality::CriticalFailure => " (critical failure)",
        RollQuality::CriticalSuccess => " (critical success)",
        RollQuality::Normal => "",
    };
    format!("🎲 {} ({}) rolled a {}{}!{}", player, class, value, die, flourish)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn rolls_stay_on_the_die() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = roll(&mut rng, 20);
            assert!((1..=20).contains(&v));
        }
    }

    #[test]
    fn degenerate_die_is_a_coin() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert!((1..=2).contains(&roll(&mut rng, 0)));
        }
    }

    #[test]
    fn roll_line_formats() {
        assert_eq!(roll_line("Ana", "Rogue", 17, 20), "🎲 Ana (Rogue) rolled a 17!");
        assert_eq!(
            roll_line("Ana", "Rogue", 1, 20),
            "🎲 Ana (Rogue) rolled a 1! (critical failure)"
        );
        assert_eq!(
            roll_line("Bram", "Paladin", 6, 6),
            "🎲 Bram (Paladin) rolled a 6 on a d6! (critical success)"
        );
    }

    #[test]
    fn roll_line_names_the_die_that_was_rolled() {
        assert_eq!(
            roll_line("Ana", "Rogue", 2, 0),
            "🎲 Ana (Rogue) rolled a 2 on a d2! (critical success)"
        );
        assert_eq!(die_sides(1), 2);
        assert_eq!(die_sides(12), 12);
    }
}
