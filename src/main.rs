#[tokio::main]
async fn main() -> anyhow::Result<()> {
    addicted::bootstrapper::run().await
}
