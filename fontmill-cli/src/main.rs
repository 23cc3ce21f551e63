use std::{collections::BTreeMap, path::PathBuf, process::ExitCode};

use fontmill::{
    DirectoryCache, Font, InstanceAssembler, InstanceOptions, KerningTable, KerningValue,
    Location, Space, Tag,
};

#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Print the variation axes of a font as `tag min default max`
    Axes {
        /// The font file
        font: PathBuf,
    },
    /// Print the flattened GPOS kerning of a font
    Kern {
        /// The font file
        font: PathBuf,
        /// Write JSON instead of one `/left /right value` line per pair
        #[arg(long)]
        json: bool,
    },
    /// Build a static instance of a variable font and print its path
    Instance {
        /// The variable font file
        font: PathBuf,
        /// An axis value such as `wght=650`; axes not given stay at their default
        #[arg(long = "axis", value_name = "TAG=VALUE", value_parser = parse_axis_value)]
        axes: Vec<(Tag, f64)>,
        /// The values are normalized, with the default at 0
        #[arg(long, conflicts_with = "scaled")]
        normalized: bool,
        /// The values are scaled, -1 for the minimum and 1 for the maximum
        #[arg(long)]
        scaled: bool,
        /// Where instances are stored [default: `_instances` next to the font]
        #[arg(long)]
        cache_dir: Option<PathBuf>,
        /// Build the instance even if it is already stored
        #[arg(long)]
        no_cache: bool,
    },
}

fn parse_axis_value(arg: &str) -> Result<(Tag, f64), String> {
    let (tag, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected TAG=VALUE, found '{arg}'"))?;
    let tag = tag.parse::<Tag>().map_err(|e| format!("bad axis tag: {e}"))?;
    let value = value
        .parse::<f64>()
        .map_err(|e| format!("bad axis value '{value}': {e}"))?;
    Ok((tag, value))
}

fn main() -> ExitCode {
    env_logger::init();
    use clap::Parser as _;
    let args = Args::parse();
    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Axes { font } => {
            let font = Font::open(font)?;
            for axis in font.axes().iter() {
                println!(
                    "{} {} {} {}",
                    axis.tag(),
                    axis.min(),
                    axis.default(),
                    axis.max()
                );
            }
        }
        Command::Kern { font, json } => {
            let font = Font::open(font)?;
            let kerning = font.kerning()?;
            if json {
                let output = KerningJson::new(kerning);
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for (left, right, value) in kerning.iter() {
                    println!("/{left} /{right} {value}");
                }
                println!("{} pairs", kerning.len());
            }
        }
        Command::Instance {
            font,
            axes,
            normalized,
            scaled,
            cache_dir,
            no_cache,
        } => {
            let space = match (normalized, scaled) {
                (true, _) => Space::Normalized,
                (_, true) => Space::Scaled,
                _ => Space::Raw,
            };
            let location = Location::with_values(space, axes);
            let options = InstanceOptions {
                cached: !no_cache,
                ..Default::default()
            };
            let source = Font::open(&font)?;
            let store = match cache_dir {
                Some(dir) => DirectoryCache::new(dir),
                None => DirectoryCache::beside(&font),
            };
            let instance =
                InstanceAssembler::new(store).make_instance(&source, &location, &options)?;
            if let Some(path) = instance.path() {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct KerningJson<'a> {
    pairs: Vec<PairJson<'a>>,
    left_classes: &'a BTreeMap<String, Vec<String>>,
    right_classes: &'a BTreeMap<String, Vec<String>>,
    diagnostics: Vec<String>,
}

#[derive(serde::Serialize)]
struct PairJson<'a> {
    left: &'a str,
    right: &'a str,
    value: KerningValue,
}

impl<'a> KerningJson<'a> {
    fn new(kerning: &'a KerningTable) -> Self {
        KerningJson {
            pairs: kerning
                .iter()
                .map(|(left, right, value)| PairJson { left, right, value })
                .collect(),
            left_classes: kerning.left_classes(),
            right_classes: kerning.right_classes(),
            diagnostics: kerning
                .diagnostics()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}
