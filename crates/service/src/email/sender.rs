use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::warn;

use super::errors::EmailError;

/// A plain HTML email ready for dispatch.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Transport abstraction over whatever actually delivers mail.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError>;

    async fn send_templated(
        &self,
        to: &str,
        subject: &str,
        template_id: &str,
        data: &HashMap<String, String>,
    ) -> Result<(), EmailError>;
}

/// Dispatch without blocking the caller. The returned receiver resolves with
/// the delivery outcome; dropping it is fine, failures still hit the log.
pub fn send_detached(sender: Arc<dyn EmailSender>, msg: OutgoingEmail) -> oneshot::Receiver<Result<(), EmailError>> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let res = sender.send(&msg.to, &msg.subject, &msg.html_body).await;
        if let Err(e) = &res {
            warn!(error = %e, to = %msg.to, subject = %msg.subject, "email delivery failed");
        }
        let _ = tx.send(res);
    });
    rx
}

/// In-memory sender that records every message, for tests and doc examples
pub mod mock {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone)]
    pub struct SentEmail {
        pub to: String,
        pub subject: String,
        pub template_id: Option<String>,
        pub html_body: Option<String>,
        pub data: HashMap<String, String>,
    }

    #[derive(Default)]
    pub struct RecordingEmailSender {
        sent: Mutex<Vec<SentEmail>>,
        fail: AtomicBool,
    }

    impl RecordingEmailSender {
        /// Make every subsequent send fail with a transport error.
        pub fn fail_deliveries(&self) {
            self.fail.store(true, Ordering::SeqCst);
        }

        pub fn sent(&self) -> Vec<SentEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EmailSender for RecordingEmailSender {
        async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(EmailError::Transport("mock transport down".into()));
            }
            self.sent.lock().unwrap().push(SentEmail {
                to: to.to_string(),
                subject: subject.to_string(),
                template_id: None,
                html_body: Some(html_body.to_string()),
                data: HashMap::new(),
            });
            Ok(())
        }

        async fn send_templated(
            &self,
            to: &str,
            subject: &str,
            template_id: &str,
            data: &HashMap<String, String>,
        ) -> Result<(), EmailError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(EmailError::Transport("mock transport down".into()));
            }
            self.sent.lock().unwrap().push(SentEmail {
                to: to.to_string(),
                subject: subject.to_string(),
                template_id: Some(template_id.to_string()),
                html_body: None,
                data: data.clone(),
            });
            Ok(())
        }
    }
}
