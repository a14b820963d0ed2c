#[tokio::main]
async fn main() -> anyhow::Result<()> {
    soulbrowser_actor::cli::run().await
}
