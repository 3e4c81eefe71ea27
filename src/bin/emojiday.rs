use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::Parser;

use emojiday::{Config, Glyph, RenderMode, RenderRequest, output_file_name};

#[derive(Parser, Debug)]
#[command(name = "emojiday", version, about = "Render the daily emoji card image")]
struct Cli {
    /// Daily data JSON produced by the upstream pipeline.
    #[arg(long, default_value = "public/data/today.json")]
    input: PathBuf,

    /// Explicit output file; overrides --out-dir and derived naming.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory for derived output names.
    #[arg(long, default_value = "public/images/daily")]
    out_dir: PathBuf,

    /// Render a fixed sample request instead of reading --input.
    #[arg(long)]
    test: bool,

    /// Skip all glyph-asset network fetches.
    #[arg(long)]
    offline: bool,

    /// Write the browser backend's generated document next to the output.
    #[arg(long)]
    debug_html: bool,
}

/// The document the upstream pipeline writes; only the fields the renderer
/// needs are modeled here.
#[derive(Debug, serde::Deserialize)]
struct DailyData {
    date: NaiveDate,
    #[serde(default)]
    timestamp: Option<String>,
    emojis: Vec<Glyph>,
    #[serde(default)]
    post_type: Option<String>,
    #[serde(default)]
    essence: Option<EssenceData>,
}

#[derive(Debug, serde::Deserialize)]
struct EssenceData {
    #[serde(default)]
    emoji: Option<String>,
    #[serde(default)]
    emotion_label: Option<String>,
}

impl DailyData {
    fn into_request(self) -> anyhow::Result<RenderRequest> {
        if self.post_type.as_deref() == Some("essence") {
            let essence = self.essence.unwrap_or(EssenceData {
                emoji: None,
                emotion_label: None,
            });
            let char = essence
                .emoji
                .or_else(|| self.emojis.first().map(|g| g.char.clone()))
                .context("essence post has no emoji to render")?;
            return Ok(RenderRequest {
                glyphs: vec![Glyph {
                    char,
                    label: essence.emotion_label,
                }],
                date: self.date,
                timestamp: self.timestamp,
                mode: RenderMode::Essence,
            });
        }

        Ok(RenderRequest {
            glyphs: self.emojis,
            date: self.date,
            timestamp: self.timestamp,
            mode: RenderMode::Normal,
        })
    }
}

fn read_daily_data(path: &Path) -> anyhow::Result<DailyData> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("open daily data '{}'", path.display()))?;
    let reader = std::io::BufReader::new(file);
    let data: DailyData =
        serde_json::from_reader(reader).with_context(|| "parse daily data JSON")?;
    Ok(data)
}

fn sample_request() -> RenderRequest {
    RenderRequest {
        glyphs: vec![
            Glyph::with_label("🌍", "world"),
            Glyph::with_label("💡", "idea"),
            Glyph::with_label("🚀", "launch"),
            Glyph::with_label("🎯", "target"),
            Glyph::with_label("✨", "sparkle"),
        ],
        date: chrono::Utc::now().date_naive(),
        timestamp: None,
        mode: RenderMode::Normal,
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if cli.offline {
        config.offline = true;
    }
    if cli.debug_html {
        config.debug_html = true;
    }

    let request = if cli.test {
        sample_request()
    } else {
        read_daily_data(&cli.input)?.into_request()?
    };
    request.validate()?;

    let out = match (&cli.output, cli.test) {
        (Some(path), _) => path.clone(),
        (None, true) => cli.out_dir.join("test.png"),
        (None, false) => cli
            .out_dir
            .join(output_file_name(request.timestamp.as_deref(), request.date)),
    };

    let outcome = emojiday::render_request(&request, &config, &out)?;

    eprintln!(
        "wrote {} ({} backend)",
        outcome.output_path.display(),
        outcome.backend
    );
    println!("OUTPUT_PATH={}", outcome.output_path.display());
    Ok(())
}
