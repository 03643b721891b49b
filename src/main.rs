use anyhow::{Context, Result};
use clap::Parser;
use std::rc::Rc;

use chair_loader::cli::{Cli, Command, LoadArgs};
use chair_loader::core::{AssetBinding, AssetCache, AssetLoader, CacheSnapshot, LoadState};
use chair_loader::loaders::{obfuscate_file, FileFetcher, GltfParser, HttpFetcher, XorFetcher};
use chair_loader::models::{available_models, find_model, load_catalog, ModelConfig};
use chair_loader::traits::AssetFetcher;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let catalog = match &cli.catalog {
        Some(path) => load_catalog(path)?,
        None => available_models(),
    };

    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Command::Load(LoadArgs::default()));

    match command {
        Command::Load(args) => run_load(&cli, &catalog, &args),
        Command::Obfuscate { input } => {
            let output = obfuscate_file(&input)?;
            println!("Obfuscated asset saved to: {}", output.display());
            Ok(())
        }
        Command::Models => {
            for model in &catalog {
                println!("{:<10} {:<12} {}", model.id, model.name, model.url);
            }
            Ok(())
        }
    }
}

/// Sessions share `Rc` state, so everything runs on one thread
fn run_load(cli: &Cli, catalog: &[ModelConfig], args: &LoadArgs) -> Result<()> {
    let model = find_model(catalog, &args.model).with_context(|| {
        format!("Unknown model '{}' (see `chair-loader models`)", args.model)
    })?;

    let key = if args.obfuscated {
        model.obfuscated_url.clone().with_context(|| {
            format!("Model '{}' has no obfuscated variant", model.id)
        })?
    } else {
        model.url.clone()
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let local = tokio::task::LocalSet::new();

    local.block_on(&runtime, run_rounds(cli, model, &key, args))
}

async fn run_rounds(cli: &Cli, model: &ModelConfig, key: &str, args: &LoadArgs) -> Result<()> {
    let cache = AssetCache::new();
    cache.set_enabled(!args.no_cache);

    let observed = Rc::downgrade(&cache);
    let _subscription = cache.subscribe(move || {
        if let Some(cache) = observed.upgrade() {
            log::info!("Cache changed: {} entries", cache.len());
        }
    });

    let loader = AssetLoader::new(
        Rc::clone(&cache),
        build_fetcher(cli, args.obfuscated)?,
        Rc::new(GltfParser::new()),
    );

    println!(
        "Loading {} ({}) with {} instance(s) over {} round(s)",
        model.name, key, args.instances, args.rounds
    );

    let mut failures = 0;
    for round in 1..=args.rounds {
        let bindings: Vec<AssetBinding> = (0..args.instances)
            .map(|_| loader.bind(key))
            .collect();
        let states = futures::future::join_all(bindings.iter().map(|b| b.settled())).await;

        println!("Round {}:", round);
        for (index, state) in states.iter().enumerate() {
            match state {
                LoadState::Ready(scene) => {
                    let summary = scene.summary();
                    println!(
                        "  {} #{}: loaded ({} objects, {} meshes, {} vertices)",
                        model.name,
                        index + 1,
                        summary.nodes,
                        summary.meshes,
                        summary.vertices
                    );
                    if let Some(bounds) = summary.bounds {
                        let (size, center) = (bounds.size(), bounds.center());
                        println!(
                            "    extent {:.2} x {:.2} x {:.2} around ({:.2}, {:.2}, {:.2})",
                            size.x, size.y, size.z, center.x, center.y, center.z
                        );
                    }
                }
                LoadState::Failed(err) => {
                    failures += 1;
                    println!("  {} #{}: {} error: {}", model.name, index + 1, err.kind(), err);
                }
                LoadState::Pending => println!("  {} #{}: pending", model.name, index + 1),
            }
        }

        // Unmount every consumer before the next round
        drop(bindings);

        if args.clear_between && round < args.rounds {
            cache.clear();
        }
    }

    print_snapshot(&cache.snapshot(), args.json)?;

    if failures > 0 {
        anyhow::bail!("{} load(s) failed", failures);
    }
    Ok(())
}

fn build_fetcher(cli: &Cli, obfuscated: bool) -> Result<Rc<dyn AssetFetcher>> {
    let fetcher: Rc<dyn AssetFetcher> = match (&cli.base_url, obfuscated) {
        (Some(url), false) => Rc::new(HttpFetcher::new(url)?),
        (Some(url), true) => Rc::new(XorFetcher::new(HttpFetcher::new(url)?)),
        (None, false) => Rc::new(FileFetcher::new(&cli.asset_dir)),
        (None, true) => Rc::new(XorFetcher::new(FileFetcher::new(&cli.asset_dir))),
    };
    Ok(fetcher)
}

fn print_snapshot(snapshot: &CacheSnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
        return Ok(());
    }

    println!(
        "Cache {} ({} entries)",
        if snapshot.enabled { "enabled" } else { "disabled" },
        snapshot.len()
    );
    for entry in &snapshot.entries {
        println!(
            "  {}: {} objects, {} meshes, cached at {}",
            entry.key,
            entry.nodes,
            entry.meshes,
            entry.cached_at.format("%H:%M:%S")
        );
    }
    Ok(())
}
