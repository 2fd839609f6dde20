#[tokio::main]
async fn main() -> anyhow::Result<()> {
    checkbot_server::start().await
}
