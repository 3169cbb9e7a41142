//! CLI for Backdrop - AI background editing for photos.

use backdrop::{
    EditMode, EditRequest, GeminiEditor, GeminiModel, ImageEditor, ImageEditorExt,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "backdrop")]
#[command(about = "Edit photo backgrounds with the Gemini image API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit the background of a photo
    Edit(EditArgs),

    /// List the available background-editing modes
    Modes,

    /// Serve the browser UI
    Serve(ServeArgs),
}

#[derive(Args)]
struct EditArgs {
    /// Path to the source photo (PNG, JPEG, or WebP)
    input: PathBuf,

    /// Background-editing mode
    #[arg(short, long, value_enum)]
    mode: ModeArg,

    /// Description of the new backdrop (replace mode only)
    #[arg(short, long)]
    prompt: Option<String>,

    /// Path to the backdrop image (composite mode only)
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    /// Model variant to use
    #[arg(long, value_enum, default_value = "flash")]
    model: ModelArg,

    /// Retries on transient errors (rate limits, network)
    #[arg(long, default_value_t = 0)]
    retries: u32,
}

#[derive(Args)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind
    #[arg(long, default_value_t = 8787)]
    port: u16,

    /// Model variant to use
    #[arg(long, value_enum, default_value = "flash")]
    model: ModelArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Remove,
    Replace,
    Composite,
}

impl From<ModeArg> for EditMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Remove => EditMode::Remove,
            ModeArg::Replace => EditMode::Replace,
            ModeArg::Composite => EditMode::Composite,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    /// Gemini 2.5 Flash Image (fast, economical)
    Flash,
    /// Gemini 3 Pro Image (highest quality)
    Pro,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Flash => GeminiModel::Flash,
            ModelArg::Pro => GeminiModel::Pro,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("backdrop=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Edit(args) => {
            edit_photo(args, cli.json).await?;
        }
        Commands::Modes => {
            list_modes(cli.json)?;
        }
        Commands::Serve(args) => {
            serve_ui(args).await?;
        }
    }

    Ok(())
}

fn validate_edit_args(args: &EditArgs) -> anyhow::Result<()> {
    match args.mode {
        ModeArg::Remove => {
            if args.prompt.is_some() {
                anyhow::bail!("--prompt is only used with --mode replace");
            }
            if args.reference.is_some() {
                anyhow::bail!("--reference is only used with --mode composite");
            }
        }
        ModeArg::Replace => {
            if args.prompt.is_none() {
                anyhow::bail!("--mode replace requires --prompt");
            }
            if args.reference.is_some() {
                anyhow::bail!("--reference is only used with --mode composite");
            }
        }
        ModeArg::Composite => {
            if args.reference.is_none() {
                anyhow::bail!("--mode composite requires --reference");
            }
            if args.prompt.is_some() {
                anyhow::bail!("--prompt is only used with --mode replace");
            }
        }
    }
    Ok(())
}

async fn edit_photo(args: EditArgs, json_output: bool) -> anyhow::Result<()> {
    // Catch flag mismatches before touching the network
    validate_edit_args(&args)?;

    let image = std::fs::read(&args.input)?;
    let mut request = EditRequest::new(image, args.mode.into());

    if let Some(ref prompt) = args.prompt {
        request = request.with_backdrop_prompt(prompt);
    }
    if let Some(ref reference_path) = args.reference {
        let reference = std::fs::read(reference_path)?;
        request = request.with_reference_image(reference);
    }

    let editor = GeminiEditor::builder().model(args.model.into()).build()?;

    let edited = if args.retries > 0 {
        editor.edit_with_retries(&request, args.retries).await?
    } else {
        editor.edit(&request).await?
    };

    edited.save(&args.output)?;

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "output": args.output.display().to_string(),
            "size_bytes": edited.size(),
            "format": edited.format.extension(),
            "mode": request.mode.as_str(),
            "model": edited.metadata.model,
            "duration_ms": edited.metadata.duration_ms,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Edited image: {} ({} bytes) via {}",
            args.output.display(),
            edited.size(),
            edited.provider
        );
        if let Some(duration) = edited.metadata.duration_ms {
            println!("Duration: {}ms", duration);
        }
    }

    Ok(())
}

fn list_modes(json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ModeInfo {
        mode: &'static str,
        description: &'static str,
        requires: &'static str,
    }

    let modes: Vec<ModeInfo> = EditMode::all()
        .into_iter()
        .map(|mode| ModeInfo {
            mode: mode.as_str(),
            description: mode.describe(),
            requires: match mode {
                EditMode::Remove => "nothing",
                EditMode::Replace => "--prompt",
                EditMode::Composite => "--reference",
            },
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&modes)?);
    } else {
        println!("Background-editing modes:\n");
        for info in &modes {
            println!("  {:<10} {}", info.mode, info.description);
            println!("  {:<10} requires: {}\n", "", info.requires);
        }
    }

    Ok(())
}

async fn serve_ui(args: ServeArgs) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let editor = GeminiEditor::builder().model(args.model.into()).build()?;

    tracing::info!(model = ?args.model, "starting Backdrop UI on {addr}");
    backdrop::web::serve(addr, Arc::new(editor)).await?;

    Ok(())
}
