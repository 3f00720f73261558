//! Broadcast dispatcher
//!
//! Entry point for everything a connection does: open, message, close.
//! Accepted transfers are stamped by the [`RecordFormatter`] and fanned out
//! to the whole open-set, sender included. Rejected frames get a unicast
//! error reply and change nothing.

use std::sync::Arc;

use super::connection::{ConnectionManager, WsSender};
use super::error::RelayError;
use super::messages::{ClientMessage, ServerMessage};
use crate::core_types::ConnectionId;
use crate::record::{Record, RecordFormatter};

pub struct Broadcaster {
    manager: Arc<ConnectionManager>,
    formatter: RecordFormatter,
}

impl Broadcaster {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self {
            manager,
            formatter: RecordFormatter::new(),
        }
    }

    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    /// Number of transfers accepted so far
    pub fn accepted(&self) -> u64 {
        self.formatter.issued()
    }

    /// Connection reached OPEN
    pub fn on_open(&self, tx: WsSender) -> ConnectionId {
        self.manager.add_connection(tx)
    }

    /// Connection reached CLOSED. Safe to call more than once.
    pub fn on_close(&self, conn_id: ConnectionId) {
        self.manager.remove_connection(conn_id);
    }

    /// Handle one inbound text frame from `conn_id`.
    ///
    /// Accepted transfers are broadcast and returned; rejections are
    /// answered on `conn_id` alone and yield `None`.
    pub fn on_message(&self, conn_id: ConnectionId, raw: &str) -> Option<Record> {
        match self.accept(raw) {
            Ok(record) => {
                let delivered = self.manager.broadcast(&ServerMessage::from(&record));
                tracing::info!(
                    conn_id,
                    transaction_id = %record.transaction_id,
                    recipients = delivered,
                    "Transfer broadcast"
                );
                Some(record)
            }
            Err(err) => {
                tracing::debug!(conn_id, error = err.kind(), "Rejected inbound message");
                self.manager.send_to(conn_id, ServerMessage::from(err));
                None
            }
        }
    }

    /// Decode, validate and stamp without sending anything.
    /// The counter only moves on success.
    pub fn accept(&self, raw: &str) -> Result<Record, RelayError> {
        let request = match ClientMessage::decode(raw)? {
            ClientMessage::Tx(payload) => payload.validate()?,
        };
        Ok(self.formatter.make_record(&request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn setup(n: usize) -> (Broadcaster, Vec<(ConnectionId, UnboundedReceiver<ServerMessage>)>) {
        let broadcaster = Broadcaster::new(Arc::new(ConnectionManager::new()));
        let conns = (0..n)
            .map(|_| {
                let (tx, rx) = mpsc::unbounded_channel();
                (broadcaster.on_open(tx), rx)
            })
            .collect();
        (broadcaster, conns)
    }

    fn seq_of(record: &Record) -> u64 {
        record
            .transaction_id
            .rsplit('_')
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap()
    }

    #[test]
    fn test_fan_out_includes_sender() {
        let (broadcaster, mut conns) = setup(3);
        let sender = conns[0].0;

        let record = broadcaster
            .on_message(sender, r#"{"type":"tx","from":"alice","to":"bob","amount":5}"#)
            .unwrap();

        let expected = ServerMessage::Csv { row: record.row() };
        for (_, rx) in conns.iter_mut() {
            assert_eq!(rx.try_recv().unwrap(), expected);
            assert!(rx.try_recv().is_err());
        }
        assert_eq!(record.amount, "5.00");
    }

    #[test]
    fn test_error_is_unicast() {
        let (broadcaster, mut conns) = setup(3);
        let offender = conns[1].0;

        assert!(broadcaster.on_message(offender, "{oops").is_none());

        assert_eq!(
            conns[1].1.try_recv().unwrap(),
            ServerMessage::Error {
                message: "Invalid JSON".to_string()
            }
        );
        assert!(conns[0].1.try_recv().is_err());
        assert!(conns[2].1.try_recv().is_err());
    }

    #[test]
    fn test_rejections_do_not_consume_sequence() {
        let (broadcaster, mut conns) = setup(1);
        let id = conns[0].0;

        let cases = [
            ("not json", "Invalid JSON"),
            (r#"{"type":"hello"}"#, "Unknown message type"),
            (r#"{"type":"tx","from":"A","to":"A","amount":1}"#, "Invalid from/to"),
            (r#"{"type":"tx","from":"","to":"B","amount":1}"#, "Invalid from/to"),
            (r#"{"type":"tx","from":"A","to":"B","amount":"ten"}"#, "Invalid amount"),
            (r#"{"type":"tx","from":"A","to":"B","amount":1e30}"#, "Amount out of range"),
        ];
        for (raw, message) in cases {
            assert!(broadcaster.on_message(id, raw).is_none());
            assert_eq!(
                conns[0].1.try_recv().unwrap(),
                ServerMessage::Error {
                    message: message.to_string()
                }
            );
        }
        assert_eq!(broadcaster.accepted(), 0);

        let record = broadcaster
            .on_message(id, r#"{"type":"tx","from":"A","to":"B","amount":"10"}"#)
            .unwrap();
        assert_eq!(seq_of(&record), 1);
        assert_eq!(record.amount, "10.00");
    }

    #[test]
    fn test_accept_reports_error_without_reply() {
        let (broadcaster, mut conns) = setup(1);

        assert_eq!(broadcaster.accept("{oops").unwrap_err(), RelayError::MalformedInput);
        assert_eq!(
            broadcaster
                .accept(r#"{"type":"tx","from":"A","to":"B","amount":"1e29"}"#)
                .unwrap_err(),
            RelayError::AmountOutOfRange
        );
        assert!(conns[0].1.try_recv().is_err());

        let record = broadcaster
            .accept(r#"{"type":"tx","from":"A","to":"B","amount":1e-30}"#)
            .unwrap();
        assert_eq!(record.amount, "0.00");
        // Stamped but not broadcast
        assert!(conns[0].1.try_recv().is_err());
        assert_eq!(broadcaster.accepted(), 1);
    }

    #[test]
    fn test_sequence_strictly_increases() {
        let (broadcaster, conns) = setup(1);
        let id = conns[0].0;

        let payloads = [
            r#"{"type":"tx","from":"a","to":"b","amount":1}"#,
            r#"{"type":"tx","from":"z","to":"y","amount":"999.999"}"#,
            r#"{"type":"tx","from":"b","to":"a"}"#,
            r#"{"type":"tx","from":"q","to":"r","amount":-2}"#,
        ];
        let seqs: Vec<u64> = payloads
            .iter()
            .map(|raw| seq_of(&broadcaster.on_message(id, raw).unwrap()))
            .collect();

        assert!(seqs.windows(2).all(|w| w[0] < w[1]), "seqs = {:?}", seqs);
        assert_eq!(broadcaster.accepted(), 4);
    }

    #[test]
    fn test_closed_connection_is_not_delivered() {
        let (broadcaster, mut conns) = setup(3);
        let (closed_id, _) = conns.remove(2);
        broadcaster.on_close(closed_id);
        broadcaster.on_close(closed_id);

        broadcaster
            .on_message(conns[0].0, r#"{"type":"tx","from":"a","to":"b","amount":1}"#)
            .unwrap();

        assert_eq!(broadcaster.manager().len(), 2);
        for (_, rx) in conns.iter_mut() {
            assert!(matches!(rx.try_recv().unwrap(), ServerMessage::Csv { .. }));
        }
    }
}
