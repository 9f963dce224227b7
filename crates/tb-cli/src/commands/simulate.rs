use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use tb_engine::catalog::SkillCatalog;
use tb_engine::rng::pick_index;
use tb_engine::{
    BattleConfig, BattleSession, Combatant, InMemoryCatalog, RandomSource, SeededRandom, Side,
    TypingResult,
};

pub struct SimulateArgs<'a> {
    pub catalog: &'a Path,
    pub player: &'a Path,
    pub enemy: &'a Path,
    pub seed: u64,
    pub world_level: u32,
    pub typing: Option<TypingResult>,
    pub max_turns: u32,
}

pub fn run(args: &SimulateArgs<'_>) -> Result<(), String> {
    let catalog = super::load_catalog(args.catalog)?;
    let player = super::load_combatant(args.player, &catalog)?;
    let enemy = super::load_combatant(args.enemy, &catalog)?;

    let config = BattleConfig::default()
        .with_seed(args.seed)
        .with_world_level(args.world_level)
        .with_max_turns(args.max_turns);
    let max_turns = config.max_turns;
    let mut rng = SeededRandom::new(config.seed);
    let mut battle = BattleSession::new(player, enemy, config);

    let first = battle.start(&mut rng).map_err(|e| e.to_string())?;
    println!(
        "  {} {} vs {} {}",
        "Battle".bold(),
        battle.player().name(),
        battle.enemy().name(),
        format!("(seed={}, world level={})", args.seed, battle.config().world_level).dimmed()
    );
    println!("  {} acts first", side_name(&battle, first));
    println!();

    let mut finished = false;
    loop {
        let result = match battle.current_actor().map_err(|e| e.to_string())? {
            Side::Player => {
                let skill_id = choose_player_skill(&battle, &catalog, &mut rng);
                battle
                    .player_action(&skill_id, args.typing.clone(), &mut rng)
                    .map_err(|e| e.to_string())?
            }
            Side::Enemy => battle.enemy_action(&mut rng).map_err(|e| e.to_string())?,
        };

        let turn = battle.turn().map_err(|e| e.to_string())?;
        let label = format!("[turn {turn:>3}]").dimmed();
        for message in &result.messages {
            println!("  {label} {}", colorize_message(message));
        }

        if battle.check_battle_end().map_err(|e| e.to_string())? {
            finished = true;
            break;
        }
        if turn >= max_turns {
            break;
        }
        battle.next_turn().map_err(|e| e.to_string())?;
    }
    println!();

    print_status_table(&battle);

    if !finished {
        println!(
            "  {} no winner after {max_turns} turns",
            "TIMEOUT".yellow().bold()
        );
        return Ok(());
    }

    let Some(outcome) = battle.outcome().cloned() else {
        return Err("battle ended without an outcome".into());
    };
    match outcome.winner {
        Side::Player => println!("  {} {}", "WIN".green().bold(), outcome.message),
        Side::Enemy => println!("  {} {}", "LOSS".red().bold(), outcome.message),
    }
    println!("  Turns: {}", outcome.turns);

    if outcome.winner == Side::Player {
        let drops = battle.calculate_drops(&mut rng).map_err(|e| e.to_string())?;
        if drops.is_empty() {
            println!("  Drops: {}", "none".dimmed());
        } else {
            println!("  Drops: {}", drops.join(", "));
        }
    }

    Ok(())
}

/// Uniform pick among skills the player can afford with live combo
/// boosts applied; the fallback skill (or the first skill) otherwise.
fn choose_player_skill(
    battle: &BattleSession,
    catalog: &InMemoryCatalog,
    rng: &mut dyn RandomSource,
) -> String {
    let player = battle.player();
    let affordable: Vec<_> = player
        .skills()
        .iter()
        .filter(|s| player.can_afford(battle.combo().apply_to_skill(s).resource_cost()))
        .collect();

    if let Some(skill) = pick_index(rng, affordable.len()).and_then(|i| affordable.get(i)) {
        return skill.id().to_string();
    }
    player
        .skill(catalog.fallback_skill_id())
        .or_else(|| player.skills().first())
        .map(|s| s.id().to_string())
        .unwrap_or_default()
}

fn side_name(battle: &BattleSession, side: Side) -> &str {
    match side {
        Side::Player => battle.player().name(),
        Side::Enemy => battle.enemy().name(),
    }
}

fn colorize_message(message: &str) -> String {
    if message.starts_with("Critical") {
        message.yellow().bold().to_string()
    } else if message.ends_with("is defeated!") {
        message.red().bold().to_string()
    } else if message.ends_with("missed!") || message.contains("evaded") {
        message.dimmed().to_string()
    } else if message.contains("recovers") || message.contains("charges") {
        message.green().to_string()
    } else {
        message.to_string()
    }
}

fn print_status_table(battle: &BattleSession) {
    println!("  {}", "Final Status".bold().underline());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Combatant", "Health", "Resource", "Statuses", "Next Skill"]);

    for combatant in [battle.player(), battle.enemy()] {
        table.add_row(status_row(combatant));
    }

    println!("{table}");
    println!();
}

fn status_row(combatant: &Combatant) -> Vec<String> {
    let statuses = if combatant.statuses().is_empty() {
        "--".to_string()
    } else {
        combatant
            .statuses()
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };
    vec![
        combatant.name().to_string(),
        combatant.health().to_string(),
        combatant
            .resource()
            .map_or_else(|| "--".to_string(), ToString::to_string),
        statuses,
        combatant.next_skill_id().unwrap_or("--").to_string(),
    ]
}
