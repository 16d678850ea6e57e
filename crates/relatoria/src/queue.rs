use std::time::Duration;

use redis::aio::MultiplexedConnection;
use redis::Value;

/// Failure kinds the dispatcher must tell apart: exhausting the
/// connect budget is fatal, a lost transport triggers one reconnect
/// cycle, and a malformed reply is logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue broker unreachable after {attempts} attempts: {source}")]
    Unreachable {
        attempts: u32,
        #[source]
        source: redis::RedisError,
    },
    #[error("queue connection lost: {0}")]
    ConnectionLost(#[source] redis::RedisError),
    #[error("unexpected BRPOP reply: {0}")]
    UnexpectedReply(String),
}

/// Holds the one live broker connection. Torn down and recreated by
/// the dispatcher when the transport breaks; the database handle has
/// no such lifecycle.
#[derive(Debug)]
pub struct QueueConsumer {
    conn: MultiplexedConnection,
}

impl QueueConsumer {
    /// Connects with a bounded retry budget and fixed backoff between
    /// attempts. Every failed attempt is logged; only exhaustion is an
    /// error.
    pub async fn connect(
        url: &str,
        attempts: u32,
        backoff: Duration,
    ) -> Result<Self, QueueError> {
        let attempts = attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match try_connect(url).await {
                Ok(conn) => {
                    println!("connected to queue broker at {url}");
                    return Ok(Self { conn });
                }
                Err(err) => {
                    eprintln!("queue connect attempt {attempt}/{attempts} failed: {err}");
                    if attempt >= attempts {
                        return Err(QueueError::Unreachable {
                            attempts,
                            source: err,
                        });
                    }
                    println!("retrying in {}s...", backoff.as_secs());
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    /// Blocking right-pop with no timeout; suspends until a task
    /// arrives or the transport breaks. BRPOP never legitimately
    /// returns "empty" at timeout 0, so any transport error here is
    /// classified as connection loss.
    pub async fn blocking_pop(&mut self, queue: &str) -> Result<String, QueueError> {
        let reply: Value = redis::cmd("BRPOP")
            .arg(queue)
            .arg(0)
            .query_async(&mut self.conn)
            .await
            .map_err(QueueError::ConnectionLost)?;

        parse_pop_reply(reply)
    }
}

async fn try_connect(url: &str) -> Result<MultiplexedConnection, redis::RedisError> {
    let client = redis::Client::open(url)?;
    client.get_multiplexed_async_connection().await
}

/// BRPOP replies with a two-element array of (queue name, payload).
/// Anything else is a protocol surprise, not a connection loss.
fn parse_pop_reply(reply: Value) -> Result<String, QueueError> {
    match reply {
        Value::Bulk(items) if items.len() == 2 => redis::from_redis_value(&items[1])
            .map_err(|err| QueueError::UnexpectedReply(format!("non-text payload: {err}"))),
        other => Err(QueueError::UnexpectedReply(format!("{other:?}"))),
    }
}
