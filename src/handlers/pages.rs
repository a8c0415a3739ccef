// HTML for each screen of the login flow
use crate::chat::{ChatMessage, ChatRole};
use crate::models::{AppError, UserProfile};
use crate::session::{Notice, NoticeLevel};
use crate::utils::response_builder::escape_html;

const STYLE: &str = r"
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background: #f4f5fb;
            margin: 0;
            padding: 40px 0;
            color: #333;
        }
        .container {
            background: white;
            max-width: 720px;
            margin: 0 auto;
            padding: 32px 40px;
            border-radius: 12px;
            box-shadow: 0 15px 35px rgba(0, 0, 0, 0.1);
        }
        .notice { padding: 10px 14px; border-radius: 6px; margin-bottom: 16px; }
        .notice-success { background: #e6f6ea; color: #1e6b32; }
        .notice-info { background: #e8f0fe; color: #1a4fa0; }
        .notice-error { background: #fdecea; color: #a12622; }
        .login-btn {
            display: inline-block;
            padding: 12px 24px;
            background: #4285f4;
            color: white;
            text-decoration: none;
            border-radius: 6px;
        }
        label { display: block; margin-top: 12px; }
        input[type=text], input[type=password] {
            width: 100%;
            padding: 8px;
            box-sizing: border-box;
        }
        button { margin-top: 16px; padding: 8px 20px; }
        pre { background: #f6f8fa; padding: 12px; overflow-x: auto; }
        .msg { padding: 8px 12px; margin: 6px 0; border-radius: 6px; }
        .msg-user { background: #eef2ff; }
        .msg-assistant { background: #f3f3f3; }
        .footer { margin-top: 24px; font-size: 0.9em; }
";

fn layout(title: &str, notices: &[Notice], content: &str) -> String {
    let notices_html = notices.iter().map(render_notice).collect::<String>();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    <div class="container">
        <h1>{title}</h1>
        {notices_html}
        {content}
    </div>
</body>
</html>"#,
        title = escape_html(title),
    )
}

fn render_notice(notice: &Notice) -> String {
    let class = match notice.level {
        NoticeLevel::Success => "notice-success",
        NoticeLevel::Info => "notice-info",
        NoticeLevel::Error => "notice-error",
    };
    format!(
        r#"<div class="notice {class}">{}</div>"#,
        escape_html(&notice.message)
    )
}

fn profile_header(profile: &UserProfile) -> String {
    let claims = serde_json::to_string_pretty(&profile.claims).unwrap_or_default();
    format!(
        r#"<p>Logged in as <strong>{email}</strong></p>
        <details>
            <summary>User information</summary>
            <pre>{claims}</pre>
        </details>"#,
        email = escape_html(&profile.email),
        claims = escape_html(&claims),
    )
}

const SIGN_OUT_FOOTER: &str = r#"<p class="footer"><a href="/sign_out">Sign out</a></p>"#;

/// Not logged in yet: a single link to the provider
#[must_use]
pub fn login_page(authorization_url: &str, notices: &[Notice]) -> String {
    let content = format!(
        r#"<p>Sign in with your Google account to continue.</p>
        <a class="login-btn" href="{}">Login with Google</a>"#,
        escape_html(authorization_url)
    );
    layout("Login", notices, &content)
}

/// Authenticated, but the profile lookup failed
#[must_use]
pub fn profile_unavailable_page(notices: &[Notice]) -> String {
    let content = format!(
        r#"<p>You are signed in, but your user information could not be loaded.</p>
        <p><a href="/profile">Try again</a></p>
        {SIGN_OUT_FOOTER}"#
    );
    layout("Login", notices, &content)
}

/// Logged in, no integration secrets saved yet
#[must_use]
pub fn integration_page(profile: &UserProfile, notices: &[Notice]) -> String {
    let content = format!(
        r#"{header}
        <h2>Integration credentials</h2>
        <form method="post" action="/integration">
            <label for="secret_a">Integration secret</label>
            <input type="password" id="secret_a" name="secret_a">
            <label for="secret_b">Page ID</label>
            <input type="text" id="secret_b" name="secret_b">
            <button type="submit">Save credentials</button>
        </form>
        {SIGN_OUT_FOOTER}"#,
        header = profile_header(profile),
    );
    layout("Login", notices, &content)
}

/// Logged in with saved secrets: the chat screen
#[must_use]
pub fn chat_page(profile: &UserProfile, transcript: &[ChatMessage], notices: &[Notice]) -> String {
    let messages = transcript
        .iter()
        .map(|message| {
            let (class, speaker) = match message.role {
                ChatRole::User => ("msg-user", "You"),
                ChatRole::Assistant => ("msg-assistant", "Assistant"),
                ChatRole::System => ("msg-assistant", "System"),
            };
            format!(
                r#"<div class="msg {class}"><strong>{speaker}:</strong> {}</div>"#,
                escape_html(&message.content)
            )
        })
        .collect::<String>();

    let content = format!(
        r#"{header}
        <h2>Chat</h2>
        <div class="transcript">{messages}</div>
        <form method="post" action="/chat">
            <label for="message">Your message</label>
            <input type="text" id="message" name="message" autofocus>
            <button type="submit">Send</button>
        </form>
        {SIGN_OUT_FOOTER}"#,
        header = profile_header(profile),
    );
    layout("Chat", notices, &content)
}

/// A session could not start
#[must_use]
pub fn fatal_page(err: &AppError) -> String {
    let content = format!(
        r"<p>{}</p>
        <p>Check the client secrets file and restart the application.</p>",
        escape_html(&err.to_string())
    );
    layout("Configuration error", &[], &content)
}
