use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::warn;

use super::errors::EmailError;
use super::sender::EmailSender;
use crate::schedule;

/// Provider-side template for the account email sent after enrollment.
pub const NEW_STUDENT_CREDENTIALS_TEMPLATE: &str = "new-student-credentials";

const NEW_STUDENT_SUBJECT: &str = "Thông tin tài khoản học viên";

/// Substitute `{{key}}` placeholders. Unknown placeholders are left intact so
/// a missing data entry is visible in the delivered mail instead of silently
/// vanishing.
pub fn render_template(template: &str, data: &HashMap<String, String>) -> String {
    let mut out = template.to_string();
    for (key, value) in data {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    out
}

/// Everything the credentials email needs about a freshly enrolled student.
#[derive(Debug, Clone)]
pub struct NewStudentCredentials {
    pub to: String,
    pub student_name: String,
    pub student_code: String,
    pub email: String,
    pub temp_password: String,
    pub branch_name: String,
    pub schedule_display: Option<String>,
}

/// Build the data map for [`NEW_STUDENT_CREDENTIALS_TEMPLATE`]. A student
/// without an assigned class gets the no-schedule sentinel.
pub fn credentials_data(msg: &NewStudentCredentials) -> HashMap<String, String> {
    let mut data = HashMap::new();
    data.insert("student_name".into(), msg.student_name.clone());
    data.insert("student_code".into(), msg.student_code.clone());
    data.insert("email".into(), msg.email.clone());
    data.insert("temp_password".into(), msg.temp_password.clone());
    data.insert("branch_name".into(), msg.branch_name.clone());
    data.insert(
        "schedule".into(),
        msg.schedule_display.clone().unwrap_or_else(|| schedule::NO_SCHEDULE_FALLBACK.to_string()),
    );
    data
}

/// Send the new-student credentials email through the given transport.
pub async fn send_new_student_credentials(
    sender: &dyn EmailSender,
    msg: &NewStudentCredentials,
) -> Result<(), EmailError> {
    if msg.to.trim().is_empty() {
        return Err(EmailError::Template("credentials email has no recipient".into()));
    }
    let data = credentials_data(msg);
    sender
        .send_templated(&msg.to, NEW_STUDENT_SUBJECT, NEW_STUDENT_CREDENTIALS_TEMPLATE, &data)
        .await
}

/// Detached variant used by enrollment: failures never propagate to the
/// caller, only to the log and the completion channel.
pub fn dispatch_new_student_credentials(
    sender: Arc<dyn EmailSender>,
    msg: NewStudentCredentials,
) -> oneshot::Receiver<Result<(), EmailError>> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let res = send_new_student_credentials(sender.as_ref(), &msg).await;
        if let Err(e) = &res {
            warn!(error = %e, student_code = %msg.student_code, "credentials email failed");
        }
        let _ = tx.send(res);
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::sender::mock::RecordingEmailSender;

    fn sample() -> NewStudentCredentials {
        NewStudentCredentials {
            to: "hocvien@example.com".into(),
            student_name: "Nguyen Van A".into(),
            student_code: "HS24000123".into(),
            email: "hocvien@example.com".into(),
            temp_password: "Tmp123456".into(),
            branch_name: "Cơ sở 1".into(),
            schedule_display: Some("T2, T4, T6".into()),
        }
    }

    #[test]
    fn render_substitutes_known_keys() {
        let mut data = HashMap::new();
        data.insert("name".to_string(), "A".to_string());
        let out = render_template("Chào {{name}}, mã của bạn: {{code}}", &data);
        assert_eq!(out, "Chào A, mã của bạn: {{code}}");
    }

    #[test]
    fn data_map_includes_schedule() {
        let data = credentials_data(&sample());
        assert_eq!(data.get("schedule").map(String::as_str), Some("T2, T4, T6"));
        assert_eq!(data.get("student_code").map(String::as_str), Some("HS24000123"));
    }

    #[test]
    fn data_map_falls_back_when_no_class_assigned() {
        let mut msg = sample();
        msg.schedule_display = None;
        let data = credentials_data(&msg);
        assert_eq!(data.get("schedule").map(String::as_str), Some(schedule::NO_SCHEDULE_FALLBACK));
    }

    #[tokio::test]
    async fn sends_through_the_template_channel() {
        let sender = RecordingEmailSender::default();
        send_new_student_credentials(&sender, &sample()).await.expect("send");
        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].template_id.as_deref(), Some(NEW_STUDENT_CREDENTIALS_TEMPLATE));
        assert_eq!(sent[0].data.get("branch_name").map(String::as_str), Some("Cơ sở 1"));
    }

    #[tokio::test]
    async fn rejects_empty_recipient() {
        let sender = RecordingEmailSender::default();
        let mut msg = sample();
        msg.to = "  ".into();
        let err = send_new_student_credentials(&sender, &msg).await.expect_err("no recipient");
        assert!(matches!(err, EmailError::Template(_)));
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn detached_dispatch_reports_failure() {
        let sender = Arc::new(RecordingEmailSender::default());
        sender.fail_deliveries();
        let rx = dispatch_new_student_credentials(sender, sample());
        let outcome = rx.await.expect("completion");
        assert!(outcome.is_err());
    }
}
