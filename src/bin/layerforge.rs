use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use layerforge::gif::{NamedImage, assemble, decode, estimate_size};
use layerforge::{AnimationSpec, EditOptions, EditorConfig, ImageEditor, ImageSource, ParamValues};

#[derive(Parser, Debug)]
#[command(name = "layerforge", version)]
struct Cli {
    /// Editor config JSON; missing fields use defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a JSON layer stack to an image and write the composite.
    Apply(ApplyArgs),
    /// Print the frames and delays of a GIF.
    GifInfo(GifInfoArgs),
    /// Combine still images into an animated GIF, in natural file name order.
    GifAssemble(GifAssembleArgs),
    /// Sweep one layer parameter into an animated GIF.
    Animate(AnimateArgs),
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Layer stack JSON: an array of `{ "effect", "name", "opacity", "visible", "params" }`.
    #[arg(long)]
    stack: PathBuf,

    /// Output path; the format follows the extension.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct GifInfoArgs {
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct GifAssembleArgs {
    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    /// NeuQuant sample factor, 1 (best) to 30 (fastest).
    #[arg(long)]
    quality: Option<u32>,

    /// Input images.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Layer stack JSON, as for `apply`.
    #[arg(long)]
    stack: PathBuf,

    /// Animation JSON (`layerIndex`, `parameter`, `start`, `end`, `frameCount`, `easing`, ...).
    #[arg(long)]
    spec: PathBuf,

    #[arg(long)]
    out: PathBuf,
}

/// One entry of a layer stack file.
#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct LayerSpec {
    effect: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default = "default_opacity")]
    opacity: f32,
    #[serde(default = "default_visible")]
    visible: bool,
    #[serde(default)]
    params: ParamValues,
}

fn default_opacity() -> f32 {
    1.0
}

fn default_visible() -> bool {
    true
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => EditorConfig::from_path(path)?,
        None => EditorConfig::default(),
    };
    match cli.cmd {
        Command::Apply(args) => cmd_apply(config, args),
        Command::GifInfo(args) => cmd_gif_info(args),
        Command::GifAssemble(args) => cmd_gif_assemble(config, args),
        Command::Animate(args) => cmd_animate(config, args),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read {what} '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse {what} JSON '{}'", path.display()))
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// Load `in_path` into a synchronous editor and build the stack from `stack_path`.
fn open_editor(
    config: EditorConfig,
    in_path: &Path,
    stack_path: &Path,
) -> anyhow::Result<ImageEditor> {
    let mut editor = ImageEditor::with_config(EditorConfig {
        render_worker: false,
        ..config
    })?;
    let bytes =
        std::fs::read(in_path).with_context(|| format!("read image '{}'", in_path.display()))?;
    editor
        .load_image(ImageSource::encoded(bytes, None))
        .with_context(|| format!("decode image '{}'", in_path.display()))?;
    if let Some(stem) = in_path.file_stem().and_then(|s| s.to_str()) {
        editor.set_name(stem)?;
    }

    let stack: Vec<LayerSpec> = read_json(stack_path, "layer stack")?;
    for (i, layer) in stack.iter().enumerate() {
        let index = editor
            .add_effect_layer(
                layer.name.as_deref(),
                &layer.effect,
                Some(&layer.params),
                EditOptions::COMMIT,
            )
            .with_context(|| format!("layer {i} ('{}')", layer.effect))?;
        editor.set_opacity(index, layer.opacity, EditOptions::COMMIT)?;
        if !layer.visible {
            editor.toggle_visibility(index, EditOptions::COMMIT)?;
        }
    }
    Ok(editor)
}

fn cmd_apply(config: EditorConfig, args: ApplyArgs) -> anyhow::Result<()> {
    let mut editor = open_editor(config, &args.in_path, &args.stack)?;
    let format = image::ImageFormat::from_path(&args.out)
        .with_context(|| format!("output format of '{}'", args.out.display()))?;
    let bytes = editor.export_display(format)?;
    write_output(&args.out, &bytes)
}

fn cmd_gif_info(args: GifInfoArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read gif '{}'", args.in_path.display()))?;
    let gif = decode(&bytes).with_context(|| format!("decode gif '{}'", args.in_path.display()))?;
    println!(
        "{}x{}, {} frame(s), {} bytes (estimate for re-encode: {})",
        gif.width,
        gif.height,
        gif.frames.len(),
        bytes.len(),
        estimate_size(gif.width, gif.height, gif.frames.len()),
    );
    for (i, frame) in gif.frames.iter().enumerate() {
        println!("  frame {i}: {} ms", frame.delay_ms);
    }
    Ok(())
}

fn cmd_gif_assemble(config: EditorConfig, args: GifAssembleArgs) -> anyhow::Result<()> {
    let images = args
        .inputs
        .iter()
        .map(|path| {
            let bytes =
                std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_owned();
            Ok(NamedImage::decode(name, &bytes)?)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut editor = ImageEditor::with_config(EditorConfig {
        render_worker: false,
        ..config
    })?;
    *editor.gif_frames_mut() = assemble(images)?;
    let bytes = editor.export_gif(args.quality)?;
    write_output(&args.out, &bytes)
}

fn cmd_animate(config: EditorConfig, args: AnimateArgs) -> anyhow::Result<()> {
    let spec: AnimationSpec = read_json(&args.spec, "animation spec")?;
    let mut editor = open_editor(config, &args.in_path, &args.stack)?;
    let mut last = -1;
    let bytes = editor.generate_animation(&spec, |pct| {
        let step = (pct / 10.0) as i32;
        if step != last {
            last = step;
            tracing::info!("animating: {pct:.0}%");
        }
    })?;
    write_output(&args.out, &bytes)
}
