/// Format a hyperlink in Slack's mrkdwn syntax.
pub fn slack_link(url: &str, text: &str) -> String {
    format!("<{}|{}>", url, text)
}
