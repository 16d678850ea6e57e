use anyhow::Context;

use relatoria::config::Config;
use relatoria::processor;
use relatoria::queue::{QueueConsumer, QueueError};

enum LoopEvent {
    Shutdown,
    Popped(Result<String, QueueError>),
}

/// Races the blocking pop against the shutdown signal. Polled in
/// order: a reply the broker has already dequeued beats a concurrent
/// shutdown, so that task is processed instead of silently lost.
async fn next_event<P, S>(pop: P, shutdown: S) -> LoopEvent
where
    P: std::future::Future<Output = Result<String, QueueError>>,
    S: std::future::Future<Output = ()>,
{
    tokio::select! {
        biased;
        popped = pop => LoopEvent::Popped(popped),
        _ = shutdown => LoopEvent::Shutdown,
    }
}

/// Dispatcher: owns the process lifetime, the one queue connection and
/// the one database handle. Exactly one task is ever in flight; the
/// blocking pop is the sole suspension point.
///
/// Exit status: 0 on a shutdown signal, 1 on fatal startup failure or
/// when a lost queue connection cannot be re-established within the
/// retry budget. Task-level failures never terminate the loop.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::from_env()?;

    println!(
        "relatoria worker starting... broker={} queue={} database={} export_dir={}",
        cfg.redis_url,
        cfg.queue,
        cfg.database_path.display(),
        cfg.export_dir.display()
    );

    let mut queue =
        QueueConsumer::connect(&cfg.redis_url, cfg.connect_attempts, cfg.connect_backoff)
            .await
            .context("queue broker unreachable at startup")?;

    let db = relatoria::db::open_read_only(&cfg.database_path).await?;
    println!(
        "opened database (read-only): {}",
        cfg.database_path.display()
    );

    loop {
        println!("awaiting tasks on queue '{}' (BRPOP)...", cfg.queue);

        // The pop future borrows the consumer, so the select only maps
        // its outcome into an event; reconnection happens outside.
        let event = next_event(queue.blocking_pop(&cfg.queue), async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

        let payload = match event {
            LoopEvent::Shutdown => {
                println!("shutdown signal received, stopping worker");
                break;
            }
            LoopEvent::Popped(Ok(payload)) => payload,
            LoopEvent::Popped(Err(QueueError::UnexpectedReply(detail))) => {
                // Protocol surprise, not a broken transport.
                eprintln!("ignoring unexpected queue reply: {detail}");
                continue;
            }
            LoopEvent::Popped(Err(err)) => {
                eprintln!(
                    "queue transport failure: {err}; reconnecting in {}s",
                    cfg.reconnect_delay.as_secs()
                );
                tokio::time::sleep(cfg.reconnect_delay).await;
                // The broken consumer is dropped on reassignment.
                queue = QueueConsumer::connect(
                    &cfg.redis_url,
                    cfg.connect_attempts,
                    cfg.connect_backoff,
                )
                .await
                .context("failed to re-establish queue connection")?;
                continue;
            }
        };

        match processor::process_task(&payload, &db, &cfg.export_dir).await {
            Ok(rows) => println!("task completed, {rows} rows exported"),
            Err(err) => eprintln!("task dropped: {err}"),
        }
    }

    db.close().await;
    Ok(())
}
