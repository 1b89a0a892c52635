use std::{env, fs, path::Path, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use engine::config::{StoreConfig, DATA_DIR_ENV};
use engine::session::{Notice, Session, SheetEvent};
use engine::sheet::render_sheet;
use engine::stats::recompute_derived;
use engine::{
    Ability, Action, AdMode, Character, CharacterField, CharacterStore, Dice, Entry, FileStorage, Item,
    ProficiencyTier, Section, Skill,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, ValueEnum)]
enum Adv {
    Normal,
    Advantage,
    Disadvantage,
}

#[derive(Subcommand)]
enum Cmd {
    /// List saved characters
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a saved character's sheet with derived stats
    Show {
        #[arg(long, allow_hyphen_values = true)]
        index: isize,
        /// Print character and derived stats as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save a character from a JSON file (replaces a saved character with the same name)
    Save {
        #[arg(long)]
        file: PathBuf,
    },
    /// Set one field on a saved character and save it
    Set {
        #[arg(long, allow_hyphen_values = true)]
        index: isize,
        /// name, class, race, level, hp, ac, initiative, notes, or an ability (strength, ...)
        #[arg(long)]
        field: String,
        #[arg(long, allow_hyphen_values = true)]
        value: String,
    },
    /// Set a skill's proficiency tier (none, half, proficient, expertise)
    Skill {
        #[arg(long, allow_hyphen_values = true)]
        index: isize,
        #[arg(long)]
        skill: String,
        #[arg(long)]
        tier: String,
    },
    /// Mark a saving throw proficient or not
    SaveProf {
        #[arg(long, allow_hyphen_values = true)]
        index: isize,
        #[arg(long)]
        ability: String,
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        proficient: bool,
    },
    /// Add an ability, feat, action or inventory item to a saved character
    Add {
        #[arg(long, allow_hyphen_values = true)]
        index: isize,
        /// abilities, feats, actions or inventory
        #[arg(long)]
        section: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Action or item type
        #[arg(long = "type", default_value = "")]
        kind: String,
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        to_hit: String,
        #[arg(long, default_value = "")]
        damage: String,
        #[arg(long, default_value_t = 0)]
        charges: u32,
    },
    /// Delete a saved character
    Delete {
        #[arg(long, allow_hyphen_values = true)]
        index: isize,
    },
    /// Print a saved character as JSON
    Export {
        #[arg(long, allow_hyphen_values = true)]
        index: isize,
        /// Pretty-print JSON
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        pretty: bool,
    },
    /// Compute derived stats for a character file without saving it
    Derive {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Roll a d20 and add a modifier
    Roll {
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        modifier: i32,
        /// RNG seed for determinism
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value_t = Adv::Normal)]
        adv: Adv,
    },
    /// Save one of the bundled sample characters (aria, borin)
    Sample { id: String },
}

#[derive(Parser)]
#[command(name = "charsheet")]
#[command(about = "Character sheet manager")]
struct Cli {
    /// Directory holding the saved character list
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// YAML config file (default: ./charsheet.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Serialize)]
struct ShowOutput<'a> {
    character: &'a Character,
    derived: &'a engine::DerivedStats,
}

fn to_mode(a: Adv) -> AdMode {
    match a {
        Adv::Normal => AdMode::Normal,
        Adv::Advantage => AdMode::Advantage,
        Adv::Disadvantage => AdMode::Disadvantage,
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(cli: &Cli) -> Result<StoreConfig> {
    let cwd = env::current_dir().context("failed to read working directory")?;
    let mut cfg = StoreConfig::discover(cli.config.as_deref(), &cwd)?
        .with_env_override(env::var(DATA_DIR_ENV).ok());
    if let Some(dir) = &cli.data_dir {
        cfg.data_dir = dir.clone();
    }
    Ok(cfg)
}

/// Read a text file as UTF-8, honouring a byte-order mark.
fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(&bytes);
    if had_errors {
        bail!("{} is not valid UTF-8 text", path.display());
    }
    Ok(text.into_owned())
}

fn read_character(path: &Path) -> Result<Character> {
    let text = read_text(path)?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse character JSON: {}", path.display()))
}

/// Print a notice; failures become the command's error.
fn report(notice: Notice) -> Result<()> {
    if notice.is_error() {
        bail!("{}", notice);
    }
    println!("{}", notice);
    Ok(())
}

/// Write `character` back over the record at `index`.
fn save_in_place(
    store: &mut CharacterStore<FileStorage>,
    index: isize,
    character: Character,
) -> Result<()> {
    let notice = match store.replace(index, character) {
        Ok(index) => Notice::Saved { index },
        Err(err) => err.into(),
    };
    report(notice)
}

/// Load the character at `index`, apply `events`, and save it back in place.
fn update_saved(
    store: CharacterStore<FileStorage>,
    index: isize,
    events: Vec<SheetEvent>,
) -> Result<()> {
    let mut session = Session::new(store);
    let loaded = session.handle(SheetEvent::LoadRequested(index));
    if loaded.is_error() {
        bail!("{}", loaded);
    }
    for event in events {
        let notice = session.handle(event);
        if notice.is_error() {
            bail!("{}", notice);
        }
    }
    let character = session.current().clone();
    save_in_place(&mut session.into_store(), index, character)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = resolve_config(&cli)?;
    init_tracing(&cfg.log_level);
    let mut store = cfg.open_store();

    match cli.cmd {
        Cmd::List { json } => {
            let entries = store.list();
            if json {
                println!("{}", serde_json::to_string(&entries)?);
            } else if entries.is_empty() {
                println!("No saved characters.");
            } else {
                for e in entries {
                    println!("{}: {}", e.index, e.display_name);
                }
            }
        }
        Cmd::Show { index, json } => {
            let character = store.get(index)?;
            let derived = recompute_derived(character);
            if json {
                let out = ShowOutput {
                    character,
                    derived: &derived,
                };
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print!("{}", render_sheet(character, &derived));
            }
        }
        Cmd::Save { file } => {
            let character = read_character(&file)?;
            let index = store.upsert(character)?;
            println!("{} (index {})", Notice::Saved { index }, index);
        }
        Cmd::Set {
            index,
            field,
            value,
        } => {
            let field: CharacterField = field.parse()?;
            update_saved(store, index, vec![SheetEvent::Edit { field, value }])?;
        }
        Cmd::Skill { index, skill, tier } => {
            let skill: Skill = skill.parse().map_err(anyhow::Error::msg)?;
            let tier = ProficiencyTier::parse_lenient(&tier);
            update_saved(store, index, vec![SheetEvent::SetSkillTier { skill, tier }])?;
        }
        Cmd::SaveProf {
            index,
            ability,
            proficient,
        } => {
            let ability: Ability = ability.parse().map_err(anyhow::Error::msg)?;
            update_saved(
                store,
                index,
                vec![SheetEvent::SetSaveProficiency {
                    ability,
                    proficient,
                }],
            )?;
        }
        Cmd::Add {
            index,
            section,
            name,
            description,
            kind,
            to_hit,
            damage,
            charges,
        } => {
            let section: Section = section.parse()?;
            let mut character = store.get(index)?.clone();
            match section {
                Section::Abilities => character.add_ability(Entry::new(name, description))?,
                Section::Feats => character.add_feat(Entry::new(name, description))?,
                Section::Actions => character.add_action(Action {
                    name,
                    description,
                    kind,
                    charges,
                })?,
                Section::Inventory => character.add_item(Item {
                    name,
                    kind,
                    to_hit,
                    damage,
                    charges,
                    attuned: false,
                })?,
            }
            save_in_place(&mut store, index, character)?;
        }
        Cmd::Delete { index } => {
            let mut session = Session::new(store);
            report(session.handle(SheetEvent::DeleteRequested(index)))?;
        }
        Cmd::Export { index, pretty } => {
            let character = store.get(index)?;
            if pretty {
                println!("{}", serde_json::to_string_pretty(character)?);
            } else {
                println!("{}", serde_json::to_string(character)?);
            }
        }
        Cmd::Derive { file, json } => {
            let character = read_character(&file)?;
            let derived = recompute_derived(&character);
            if json {
                println!("{}", serde_json::to_string_pretty(&derived)?);
            } else {
                print!("{}", render_sheet(&character, &derived));
            }
        }
        Cmd::Roll {
            modifier,
            seed,
            adv,
        } => {
            let mut dice = match seed {
                Some(seed) => Dice::from_seed(seed),
                None => Dice::from_entropy(),
            };
            println!("{}", engine::roll_d20(&mut dice, modifier, to_mode(adv)));
        }
        Cmd::Sample { id } => {
            let character = engine::content::builtin_character(&id)?;
            let index = store.upsert(character)?;
            println!("{} (index {})", Notice::Saved { index }, index);
        }
    }
    Ok(())
}
