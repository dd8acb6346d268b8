// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use anyhow::{anyhow, bail, Result};
use songscreen::config::{ConfigEvent, ConfigWatcher};
use songscreen::{EngineConfig, ScreenBlock, Song, SongStatus};
use std::env;
use std::path::PathBuf;
use tracing::Level;

fn print_usage() {
    println!("songscreen - Lyrics block engine");
    println!();
    println!("Usage: songscreen [--config <FILE>] [--verbose] <COMMAND> [ARGS]");
    println!();
    println!("Commands:");
    println!("  --show <SONG>             Print every block with its font size");
    println!("  --fit <SONG>              Print stored and computed font sizes");
    println!("  --split <SONG>            Split oversized blocks and save");
    println!("  --undo-split <SONG> [N]   Merge split block N (or all) and save");
    println!("  --refrain <SONG>          Insert refrain after each verse and save");
    println!("  --convert <SONG> <OUT>    Write the song in the tagged format");
    println!("  --watch-config <FILE> [SONG]");
    println!("                            Print settings reloads (and refits) until interrupted");
    println!("  --help                    Show this help message");
    println!();
    println!("Numeric song names are padded to four digits (7 -> 0007.txt).");
}

/// Command-line options that apply to every command
struct Options {
    config: EngineConfig,
    args: Vec<String>,
}

fn parse_options(raw: Vec<String>) -> Result<Options> {
    let mut config_path: Option<PathBuf> = None;
    let mut verbose = false;
    let mut args = Vec::new();

    let mut iter = raw.into_iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                config_path = Some(PathBuf::from(path));
            }
            "--verbose" | "-v" => verbose = true,
            _ => args.push(arg),
        }
    }

    tracing_subscriber::fmt()
        .with_max_level(if verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let config = match config_path {
        Some(path) => EngineConfig::load(&path)?,
        None => EngineConfig::discover(env::current_dir()?),
    };
    Ok(Options { config, args })
}

/// Pad purely numeric names to four digits
fn song_name(name: &str) -> String {
    if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) && name.len() < 4 {
        format!("{:0>4}", name)
    } else {
        name.to_string()
    }
}

fn open_song(name: &str, config: &EngineConfig) -> Result<Song> {
    let song = Song::open(&song_name(name), config);
    match song.status() {
        SongStatus::Ready => Ok(song),
        SongStatus::Empty => bail!("Song {} is empty", name),
        _ => match song.load_error() {
            Some(e) => bail!("{}", e),
            None => bail!("Song {} could not be loaded", name),
        },
    }
}

fn print_screen(number: usize, screen: &ScreenBlock) {
    println!("[{}] font {}", number, screen.font_size);
    for line in &screen.lines {
        println!("    {}", line);
    }
}

fn show_song(name: &str, config: &EngineConfig) -> Result<()> {
    let mut song = open_song(name, config)?;
    if let Some(path) = song.path() {
        println!("{}", path.display());
    }
    println!(
        "{:?} dialect, {} encoding, {} blocks",
        song.mode(),
        song.encoding().map_or("unknown", |e| e.name()),
        song.block_count()
    );
    println!();

    song.first();
    while !song.is_end() {
        let number = song.current_block_number();
        print_screen(number, &song.main_screen());
        song.next();
    }
    Ok(())
}

fn fit_song(name: &str, config: &EngineConfig) -> Result<()> {
    let song = open_song(name, config)?;
    let solver = song.solver();
    println!(
        "{:>5} {:>7} {:>8} {:>9} {:>8}",
        "block", "stored", "fit", "estimate", "preview"
    );
    for (index, block) in song.blocks().iter().enumerate() {
        let stored = block
            .font_size()
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        println!(
            "{:>5} {:>7} {:>8} {:>9} {:>8}",
            index + 1,
            stored,
            solver.fit(block.text()),
            solver.estimate(block.text()),
            solver.preview(block.text())
        );
    }
    Ok(())
}

fn save_song(song: &mut Song) -> Result<()> {
    song.save()?;
    if let Some(path) = song.path() {
        println!("Saved {} blocks to {}", song.block_count(), path.display());
    }
    Ok(())
}

fn split_song(name: &str, config: &EngineConfig) -> Result<()> {
    let mut song = open_song(name, config)?;
    let split = song.split_large_blocks_if_needed();
    println!(
        "Split {} blocks below font {}",
        split,
        song.font_size_for_split()
    );
    if song.is_dirty() {
        save_song(&mut song)?;
    }
    Ok(())
}

fn undo_split(name: &str, block: Option<usize>, config: &EngineConfig) -> Result<()> {
    let mut song = open_song(name, config)?;
    let merged = match block {
        Some(number) => usize::from(song.undo_split_for_block(number)),
        None => song.undo_split_blocks(),
    };
    println!("Merged {} split pairs", merged);
    if song.is_dirty() {
        save_song(&mut song)?;
    }
    Ok(())
}

fn insert_refrain(name: &str, config: &EngineConfig) -> Result<()> {
    let mut song = open_song(name, config)?;
    let before = song.block_count();
    if !song.insert_refrain() {
        bail!("Song {} has fewer than two blocks", name);
    }
    println!("Blocks: {} -> {}", before, song.block_count());
    if song.is_dirty() {
        save_song(&mut song)?;
    }
    Ok(())
}

fn convert_song(name: &str, output: &str, config: &EngineConfig) -> Result<()> {
    let mut song = open_song(name, config)?;
    song.save_as(output)?;
    println!("Wrote {} blocks to {}", song.block_count(), output);
    Ok(())
}

fn watch_config(path: &str, song: Option<&str>, config: &EngineConfig) -> Result<()> {
    let mut song = song.map(|name| open_song(name, config)).transpose()?;
    let watcher = ConfigWatcher::new(path, None)?;
    println!(
        "Watching {} (press Ctrl+C to stop)...",
        watcher.watched_path().display()
    );

    while let Some(event) = watcher.recv() {
        match event {
            ConfigEvent::Reloaded { path, config } => {
                println!(
                    "Reloaded {}: {}x{}, split below {}, step {}",
                    path.display(),
                    config.viewport.width,
                    config.viewport.height,
                    config.viewport.font_size_for_split,
                    config.font_size_step
                );
                if let Some(song) = song.as_mut() {
                    song.reconfigure(&config);
                    let sizes: Vec<String> = song
                        .blocks()
                        .iter()
                        .map(|b| song.solver().fit(b.text()).to_string())
                        .collect();
                    println!("  fit per block: {}", sizes.join(" "));
                }
            }
            ConfigEvent::Invalid { path, message } => {
                eprintln!("Error: {} rejected: {}", path.display(), message)
            }
        }
    }
    Ok(())
}

fn require<'a>(args: &'a [String], index: usize, what: &str) -> &'a str {
    match args.get(index) {
        Some(arg) => arg,
        None => {
            eprintln!("Error: {} requires {}", args[0], what);
            std::process::exit(1);
        }
    }
}

fn main() -> Result<()> {
    let options = parse_options(env::args().collect())?;
    let args = &options.args;
    let config = &options.config;

    if args.is_empty() {
        println!("songscreen - Lyrics block engine");
        println!("Run with --help for usage information");
        return Ok(());
    }

    match args[0].as_str() {
        "--show" => show_song(require(args, 1, "a song name"), config)?,
        "--fit" => fit_song(require(args, 1, "a song name"), config)?,
        "--split" => split_song(require(args, 1, "a song name"), config)?,
        "--undo-split" => {
            let name = require(args, 1, "a song name");
            let block = match args.get(2) {
                Some(n) => Some(
                    n.parse::<usize>()
                        .map_err(|_| anyhow!("Invalid block number: {}", n))?,
                ),
                None => None,
            };
            undo_split(name, block, config)?;
        }
        "--refrain" => insert_refrain(require(args, 1, "a song name"), config)?,
        "--convert" => {
            let name = require(args, 1, "a song name and an output file");
            let output = require(args, 2, "an output file");
            convert_song(name, output, config)?;
        }
        "--watch-config" => {
            let path = require(args, 1, "a settings file");
            watch_config(path, args.get(2).map(String::as_str), config)?;
        }
        "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown option: {}", args[0]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
