//! Scene Linter: validates a scene file before it ships.
//!
//! Usage: scene_linter <scenes.ron> [--rules <rules.ron>]

use rpg_adventure::core::rules::GameRules;
use rpg_adventure::core::scene_graph::SceneGraph;
use rpg_adventure::schema::scene::ExitAction;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: scene_linter <scenes.ron> [--rules <rules.ron>]");
        process::exit(0);
    }

    let scenes_path = &args[1];
    let mut rules_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--rules" && i + 1 < args.len() {
            i += 1;
            rules_path = Some(args[i].clone());
        }
        i += 1;
    }

    let graph = match SceneGraph::load_from_ron(Path::new(scenes_path)) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("ERROR: Failed to load scene file: {}", e);
            process::exit(1);
        }
    };

    let rules = match rules_path {
        Some(ref path) => match GameRules::load_from_ron(Path::new(path)) {
            Ok(rules) => rules,
            Err(e) => {
                eprintln!("ERROR: Failed to load rules file: {}", e);
                process::exit(1);
            }
        },
        None => GameRules::default(),
    };

    println!("Loaded {} scenes (start: {})", graph.len(), graph.start());

    let (errors, warnings) = lint_scenes(&graph, &rules);

    println!("\n=== Scene Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint_scenes(graph: &SceneGraph, rules: &GameRules) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for dangling in graph.unresolved_references() {
        errors.push(format!(
            "Scene {} choice {} points at missing scene {}",
            dangling.scene,
            dangling.choice_index + 1,
            dangling.target
        ));
    }

    for id in graph.unreachable_scenes() {
        warnings.push(format!("Scene {} cannot be reached from the start", id));
    }

    let mut battle_exits = 0;
    for node in graph.iter() {
        if node.choices.is_empty() {
            errors.push(format!(
                "Scene {} has no choices; the player would be stuck",
                node.id
            ));
        }

        for (index, choice) in node.choices.iter().enumerate() {
            if choice.text.trim().is_empty() {
                errors.push(format!("Scene {} choice {} has no text", node.id, index + 1));
            }

            if !choice.is_exit() {
                if choice.action.is_some() {
                    warnings.push(format!(
                        "Scene {} choice {} has an exit action but does not exit",
                        node.id,
                        index + 1
                    ));
                }
                continue;
            }

            let enters_battle = match choice.action {
                Some(action) => action == ExitAction::StartBattle,
                None => choice.text == rules.battle_trigger,
            };
            if enters_battle {
                battle_exits += 1;
            }

            // Close to the trigger but not equal: almost certainly a typo.
            if choice.action.is_none()
                && choice.text != rules.battle_trigger
                && choice.text.trim().eq_ignore_ascii_case(&rules.battle_trigger)
            {
                warnings.push(format!(
                    "Scene {} choice {} reads '{}' but only '{}' starts a battle",
                    node.id,
                    index + 1,
                    choice.text,
                    rules.battle_trigger
                ));
            }
        }
    }

    if battle_exits == 0 {
        warnings.push("No choice leads into a battle".to_string());
    }

    (errors, warnings)
}
