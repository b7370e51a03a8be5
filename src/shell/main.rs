use extension_background::modules::background::adapters::inbound::message_channel::message_channel;
use extension_background::shared::infrastructure::config::BackgroundConfig;
use extension_background::shell::state::BackgroundState;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = BackgroundConfig::from_env()?;
    let runtime = Handle::current();
    let state = BackgroundState::in_memory(config, &runtime);
    let (messenger, inbox) = message_channel(state.config.inbox_capacity);

    let runner = state.runner(runtime);
    let session = runner.start(inbox).await?;
    tracing::info!(
        session_id = %session.session_id,
        "background ready, reading messages from stdin"
    );

    // One payload per line; an empty line is a message without payload.
    let stdin = messenger.with_origin("stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let payload = (!line.trim().is_empty()).then(|| Value::String(line));
        match stdin.send_message(payload).await {
            Ok(reply) => println!("{reply}"),
            Err(err) => tracing::warn!(error = %err, "no reply"),
        }
    }
    Ok(())
}
