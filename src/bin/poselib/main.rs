//! poselib CLI - inspect transfer files, capture from and restore onto scene snapshots.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use poselib::config::Config;
use poselib::core::{FrameRange, SceneAccess};
use poselib::mirror::{MirrorOption, MirrorTable};
use poselib::naming::{group_objects, namespaces_of};
use poselib::scene::{AttributeFilter, MemoryScene, Node};
use poselib::transfer::{AnimationOptions, PasteOption, RestoreOptions, TransferKind, TransferObject};

/// Environment variable overriding the log filter.
const LOG_ENV: &str = "POSELIB_LOG";

/// Pose, animation and selection-set transfer toolkit
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v: debug, -vv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbosity: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", global = true)]
    quiet: bool,

    /// Config file (default: $POSELIB_CONFIG, then the platform config dir)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show kind, metadata and object counts of a transfer file
    #[command(alias = "i")]
    Info { file: PathBuf },

    /// Print stored values (filter objects by substring)
    #[command(alias = "d")]
    Dump {
        file: PathBuf,
        pattern: Option<String>,
        /// Print the file as JSON instead
        #[arg(short = 'j', long)]
        json: bool,
    },

    /// List stored objects grouped by namespace
    #[command(alias = "ns")]
    Namespaces { file: PathBuf },

    /// Show mirrored names and sides for object paths
    #[command(alias = "m")]
    Mirror {
        /// Mirror table file
        table: PathBuf,
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Capture from a scene snapshot into a transfer file
    #[command(alias = "c")]
    Capture(CaptureArgs),

    /// Restore a transfer file onto a scene snapshot
    #[command(alias = "r")]
    Restore(RestoreArgs),
}

#[derive(Args, Debug)]
struct CaptureArgs {
    /// Scene snapshot (JSON)
    scene: PathBuf,
    /// Output transfer file
    output: PathBuf,

    #[arg(short = 'k', long, value_enum, default_value = "pose")]
    kind: KindArg,

    /// Objects to capture (default: the scene selection)
    #[arg(short = 'o', long = "object", value_name = "PATH")]
    objects: Vec<String>,

    /// Attributes to capture (default: config, then all)
    #[arg(short = 'a', long = "attr", value_name = "NAME")]
    attributes: Vec<String>,

    /// Capture range for animation (default: scene range)
    #[arg(long, value_names = ["START", "END"], num_args = 2)]
    range: Option<Vec<f64>>,

    /// Description stored in the metadata
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args, Debug)]
struct RestoreArgs {
    /// Transfer file
    file: PathBuf,
    /// Scene snapshot (JSON), rewritten in place unless --output is given
    scene: PathBuf,

    /// Write the resulting scene here
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Stored namespace (repeatable, paired with --to)
    #[arg(long = "from", value_name = "NS")]
    from: Vec<String>,

    /// Destination namespace (repeatable)
    #[arg(long = "to", value_name = "NS")]
    to: Vec<String>,

    /// Explicit STORED=DEST object mapping (repeatable)
    #[arg(long = "rename", value_name = "STORED=DEST")]
    rename: Vec<String>,

    /// Destination candidates (repeatable)
    #[arg(short = 'o', long = "object", value_name = "PATH")]
    objects: Vec<String>,

    /// Use the scene selection as destination candidates
    #[arg(short = 's', long)]
    selection: bool,

    /// Restore only these attributes
    #[arg(short = 'a', long = "attr", value_name = "NAME")]
    attributes: Vec<String>,

    /// Mirror with this table (or the configured one with --mirror-side)
    #[arg(long, value_name = "FILE")]
    mirror: Option<PathBuf>,

    #[arg(long, value_enum)]
    mirror_side: Option<SideArg>,

    /// Fail on the first unresolved object
    #[arg(long)]
    strict: bool,

    /// Pose blend percentage
    #[arg(long, value_name = "PERCENT")]
    blend: Option<f64>,

    #[arg(long, value_enum)]
    paste: Option<PasteArg>,

    /// Captured frames to paste
    #[arg(long, value_names = ["START", "END"], num_args = 2)]
    source_range: Option<Vec<f64>>,

    /// Destination frame for the first pasted frame
    #[arg(long, value_name = "FRAME")]
    start_frame: Option<f64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Pose,
    Animation,
    Selection,
}

impl From<KindArg> for TransferKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Pose => TransferKind::Pose,
            KindArg::Animation => TransferKind::Animation,
            KindArg::Selection => TransferKind::SelectionSet,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SideArg {
    Both,
    LeftToRight,
    RightToLeft,
}

impl From<SideArg> for MirrorOption {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Both => MirrorOption::Both,
            SideArg::LeftToRight => MirrorOption::LeftToRight,
            SideArg::RightToLeft => MirrorOption::RightToLeft,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PasteArg {
    Replace,
    Insert,
    ReplaceAll,
}

impl From<PasteArg> for PasteOption {
    fn from(paste: PasteArg) -> Self {
        match paste {
            PasteArg::Replace => PasteOption::Replace,
            PasteArg::Insert => PasteOption::Insert,
            PasteArg::ReplaceAll => PasteOption::ReplaceAll,
        }
    }
}

fn init_logging(verbosity: u8, quiet: bool) {
    let level = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity, cli.quiet);

    let config = Config::locate(cli.config.as_deref()).context("loading config")?;
    debug!("Config: {:?}", config);

    match cli.command {
        Command::Info { file } => cmd_info(&file),
        Command::Dump { file, pattern, json } => cmd_dump(&file, pattern.as_deref(), json),
        Command::Namespaces { file } => cmd_namespaces(&file),
        Command::Mirror { table, paths } => cmd_mirror(&table, &paths),
        Command::Capture(args) => cmd_capture(&config, args),
        Command::Restore(args) => cmd_restore(&config, args),
    }
}

fn load(path: &Path) -> anyhow::Result<TransferObject> {
    TransferObject::load(path).with_context(|| format!("reading {}", path.display()))
}

fn frame_range(values: Option<Vec<f64>>) -> anyhow::Result<Option<FrameRange>> {
    match values.as_deref() {
        None => Ok(None),
        Some([start, end]) => Ok(Some(FrameRange::new(*start, *end)?)),
        Some(other) => bail!("expected START END, got {} values", other.len()),
    }
}

fn cmd_info(path: &Path) -> anyhow::Result<()> {
    let transfer = load(path)?;

    println!("File: {}", path.display());
    println!("Kind: {}", transfer.kind());
    if let Some(range) = transfer.captured_range() {
        println!("Range: {} - {}", range.start(), range.end());
    }
    println!();

    println!("Metadata:");
    for (key, value) in transfer.metadata().iter() {
        println!("  {}: {}", key, value);
    }
    println!();

    let values: usize = transfer.objects().values().map(|attrs| attrs.len()).sum();
    let curves = transfer
        .objects()
        .values()
        .flat_map(|attrs| attrs.values())
        .filter(|value| value.is_curve())
        .count();
    println!("Objects:    {}", transfer.len());
    println!("Values:     {} ({} curves)", values, curves);
    let namespaces = namespaces_of(transfer.paths());
    println!("Namespaces: {}", namespaces.len());
    for ns in &namespaces {
        println!("  {}", if ns.is_empty() { "<root>" } else { ns.as_str() });
    }
    Ok(())
}

fn cmd_dump(path: &Path, pattern: Option<&str>, json: bool) -> anyhow::Result<()> {
    let transfer = load(path)?;
    if json {
        println!("{}", transfer.to_json(true)?);
        return Ok(());
    }

    for (object, attrs) in transfer.objects() {
        if pattern.is_some_and(|p| !object.contains(p)) {
            continue;
        }
        println!("{}", object);
        for (name, value) in attrs {
            println!("  {:<20} {}", name, value);
        }
    }
    Ok(())
}

fn cmd_namespaces(path: &Path) -> anyhow::Result<()> {
    let transfer = load(path)?;
    let paths: Vec<&str> = transfer.paths().collect();
    for (ns, objects) in group_objects(&paths) {
        println!("{} ({})", if ns.is_empty() { "<root>" } else { ns.as_str() }, objects.len());
        for object in objects {
            println!("  {}", object);
        }
    }
    Ok(())
}

fn cmd_mirror(table: &Path, paths: &[String]) -> anyhow::Result<()> {
    let table = MirrorTable::from_file(table)
        .with_context(|| format!("reading mirror table {}", table.display()))?;
    info!("Mirror mode: {:?}", table.mode());
    for path in paths {
        println!("{:<40} {:<8} {}", path, format!("{:?}", table.side_of(path)), table.match_object(path));
    }
    Ok(())
}

fn cmd_capture(config: &Config, args: CaptureArgs) -> anyhow::Result<()> {
    let scene = MemoryScene::load(&args.scene)
        .with_context(|| format!("reading scene {}", args.scene.display()))?;
    let kind = TransferKind::from(args.kind);

    let filter = if args.attributes.is_empty() {
        config.attribute_filter()
    } else {
        AttributeFilter::Names(args.attributes)
    };
    let paths = if args.objects.is_empty() {
        scene.list_selected()
    } else {
        args.objects
    };
    if paths.is_empty() {
        bail!("nothing to capture: no --object given and the scene has no selection");
    }

    let nodes: Vec<Node<'_>> = paths.iter().map(|path| Node::new(&scene, path.as_str())).collect();
    let (mut transfer, warnings) =
        TransferObject::capture_with_warnings(kind, &nodes, &filter, frame_range(args.range)?)?;
    for warning in &warnings {
        warn!("{}", warning);
    }
    if let Some(description) = &args.description {
        transfer.metadata_mut().set_description(description);
    }

    transfer
        .save_with(&args.output, config.pretty)
        .with_context(|| format!("writing {}", args.output.display()))?;
    println!("Captured {} objects to {}", transfer.len(), args.output.display());
    Ok(())
}

fn cmd_restore(config: &Config, args: RestoreArgs) -> anyhow::Result<()> {
    let transfer = load(&args.file)?;
    let scene = MemoryScene::load(&args.scene)
        .with_context(|| format!("reading scene {}", args.scene.display()))?;

    let mut options = RestoreOptions::from_config(config)
        .namespaces(&args.from, &args.to)
        .use_selection(args.selection);
    options.strict |= args.strict;
    options.blend = args.blend;
    if !args.objects.is_empty() {
        options = options.objects(&args.objects);
    }
    if !args.attributes.is_empty() {
        options = options.attributes(&args.attributes);
    }
    for entry in &args.rename {
        let Some((stored, dest)) = entry.split_once('=') else {
            bail!("--rename expects STORED=DEST, got {}", entry);
        };
        options = options.rename(stored, dest);
    }

    let table = match (&args.mirror, args.mirror_side) {
        (Some(path), _) => Some(MirrorTable::from_file(path)?),
        (None, Some(_)) => match config.mirror_table()? {
            Some(table) => Some(table),
            None => bail!("--mirror-side needs --mirror or a configured mirror table"),
        },
        (None, None) => None,
    };
    if let Some(table) = table {
        let side = args.mirror_side.map(MirrorOption::from).unwrap_or_default();
        options = options.mirror(table, side);
    }

    options.animation = AnimationOptions {
        source_range: frame_range(args.source_range)?,
        start_frame: args.start_frame,
        paste: args.paste.map(PasteOption::from).unwrap_or(config.paste),
    };

    let report = transfer.restore(&scene, &options)?;
    for warning in &report.warnings {
        warn!("{}", warning);
    }
    for failed in &report.failed {
        warn!("{}: {}", failed.attribute, failed.error);
    }

    if transfer.kind() == TransferKind::SelectionSet {
        scene.select(&report.resolved());
    }

    let output = args.output.as_deref().unwrap_or(&args.scene);
    scene
        .save(output)
        .with_context(|| format!("writing scene {}", output.display()))?;

    println!("{}", report);
    if !report.is_complete() {
        info!("Restore incomplete, see warnings above");
    }
    Ok(())
}
