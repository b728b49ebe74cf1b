#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wg_gateway::run().await
}
