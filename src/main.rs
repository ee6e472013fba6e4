use anyhow::Context;
use geoedit::{init_logging, EditorSettings, Script, SettingsPersistence, BUILD_DATE, VERSION};

const USAGE: &str = "usage: geoedit <script.json> [settings.json|settings.toml]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let mut args = std::env::args().skip(1);
    let script_path = args.next().context(USAGE)?;
    let settings = match args.next() {
        Some(path) => SettingsPersistence::load_or_default(&path)
            .with_context(|| format!("loading settings from {}", path))?
            .settings()
            .clone(),
        None => EditorSettings::default(),
    };

    tracing::info!("geoedit {} (built {})", VERSION, BUILD_DATE);

    let text = std::fs::read_to_string(&script_path)
        .with_context(|| format!("reading {}", script_path))?;
    let script: Script =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", script_path))?;

    let report = script.run(settings).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
