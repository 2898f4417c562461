//! Play: a terminal front end for the adventure.
//!
//! Usage: play [--scenes <path>] [--rules <path>] [--saves <dir>] [--seed <n>]
//!
//! Commands:
//!   new          start a new game
//!   continue     resume the dialogue where you left it
//!   <n>          pick choice n in a dialogue
//!   attack       strike the enemy
//!   heal         use a bandage
//!   flee         leave the battle
//!   inv          open the inventory
//!   menu         back to the menu
//!   save / load  write or restore the save
//!   help         list commands
//!   quit         exit

use rpg_adventure::core::game::{Game, GameError, GameMode, GameView};
use rpg_adventure::core::persistence::FileStore;
use std::io::{self, BufRead, Write};
use std::process;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && (args[1] == "--help" || args[1] == "-h") {
        print_usage();
        return;
    }

    let mut scenes_path = None;
    let mut rules_path = None;
    let mut saves_dir = "saves".to_string();
    let mut seed = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--scenes" if i + 1 < args.len() => {
                i += 1;
                scenes_path = Some(args[i].clone());
            }
            "--rules" if i + 1 < args.len() => {
                i += 1;
                rules_path = Some(args[i].clone());
            }
            "--saves" if i + 1 < args.len() => {
                i += 1;
                saves_dir = args[i].clone();
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                match args[i].parse::<u64>() {
                    Ok(s) => seed = Some(s),
                    Err(_) => {
                        eprintln!("Invalid seed: {}", args[i]);
                        process::exit(1);
                    }
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let mut builder = Game::builder()
        .with_store(FileStore::new(&saves_dir))
        .autoload(true);
    if let Some(ref path) = scenes_path {
        builder = builder.scenes_path(path);
    }
    if let Some(ref path) = rules_path {
        builder = builder.rules_path(path);
    }
    if let Some(s) = seed {
        builder = builder.seed(s);
    }

    let mut game = match builder.build() {
        Ok(game) => game,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    println!("=== RPG ADVENTURE ===");
    println!(
        "{} scenes loaded. Saving to {}/{}.json",
        game.scenes().len(),
        saves_dir,
        game.rules().save_key
    );
    println!("Type 'help' for commands.\n");
    render(&game.view());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let cmd = line.trim().to_lowercase();
        if cmd.is_empty() {
            continue;
        }

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => print_help(),
            "new" => game.start_new_game(),
            "continue" | "c" => game.continue_game(),
            "attack" | "a" => {
                if game.attack().is_none() {
                    println!("You can't attack right now.");
                }
            }
            "heal" => {
                if game.heal().is_none() {
                    println!("You can't heal right now.");
                }
            }
            "flee" => game.flee(),
            "inv" | "inventory" => game.open_inventory(),
            "menu" | "m" => game.return_to_menu(),
            "save" => match game.save_game() {
                Ok(()) => println!("Game saved!"),
                Err(e) => println!("ERROR: {}", e),
            },
            "load" => match game.load_game() {
                Ok(()) => println!("Game loaded!"),
                Err(GameError::NoSaveFound) => println!("No save found!"),
                Err(e) => println!("Save corrupted, starting fresh. ({})", e),
            },
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 => {
                    if let Err(e) = game.select_choice(n - 1) {
                        println!("{}", e);
                    }
                }
                _ => {
                    println!("Unknown command: '{}'. Type 'help' for available commands.", other);
                    continue;
                }
            },
        }

        render(&game.view());

        // Play out the enemy's turn and any battle teardown.
        while let Some(delay) = game.pending_delay() {
            std::thread::sleep(delay);
            game.advance();
            render(&game.view());
        }
    }
}

fn render(view: &GameView<'_>) {
    let session = view.session;
    match view.mode {
        GameMode::Menu => {
            println!("--- MENU ---");
            println!("  new | continue | load | inv | quit");
            println!("Level: {} | Gold: {}", session.level, session.gold);
        }
        GameMode::Dialogue => {
            println!("HP {}/{}", session.hp, session.max_hp);
            if let Some(scene) = view.scene {
                println!("[{}]", scene.speaker);
                println!("{}", scene.text);
                for (i, choice) in scene.choices.iter().enumerate() {
                    println!("  {}. {}", i + 1, choice.text);
                }
            }
            println!("Alignment: {}", session.alignment);
        }
        GameMode::Battle => {
            if let Some(battle) = view.battle {
                println!(
                    "HP {}/{}    Enemy: {}/{}",
                    session.hp, session.max_hp, battle.enemy_hp, battle.enemy_max_hp
                );
                for line in battle.log {
                    println!("  {}", line);
                }
                if battle.is_player_turn {
                    println!("  attack | heal | flee");
                }
            }
        }
        GameMode::Inventory => {
            println!("--- INVENTORY ---");
            println!("Level: {}    Gold: {}", session.level, session.gold);
            println!("HP: {}/{}    Path: {}", session.hp, session.max_hp, session.alignment);
            println!("Items:");
            if session.inventory.is_empty() {
                println!("  (empty)");
            }
            for item in &session.inventory {
                println!("  - {}", item);
            }
            println!("  save | menu");
        }
    }
}

fn print_usage() {
    println!("Play: a terminal front end for the adventure.");
    println!();
    println!("Usage: play [--scenes <path>] [--rules <path>] [--saves <dir>] [--seed <n>]");
    println!();
    println!("  --scenes <path>  Scene file (default: bundled adventure)");
    println!("  --rules <path>   Rules file (default: built-in rules)");
    println!("  --saves <dir>    Save directory (default: ./saves)");
    println!("  --seed <n>       RNG seed for reproducible battles");
}

fn print_help() {
    println!("Commands:");
    println!("  new          Start a new game");
    println!("  continue     Resume the dialogue");
    println!("  <n>          Pick choice n");
    println!("  attack       Strike the enemy");
    println!("  heal         Use a bandage");
    println!("  flee         Leave the battle");
    println!("  inv          Open the inventory");
    println!("  menu         Back to the menu");
    println!("  save | load  Write or restore the save");
    println!("  help         Show this help");
    println!("  quit         Exit");
}
