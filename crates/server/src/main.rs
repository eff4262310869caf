#[tokio::main]
async fn main() -> anyhow::Result<()> {
    newsletter_server::start().await
}
