mod backend;
mod client;
mod cycle;
mod error;
mod host;
#[cfg(test)]
mod testing;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    host::run().await
}
