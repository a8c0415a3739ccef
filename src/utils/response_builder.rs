use actix_web::{cookie::Cookie, HttpResponse};

pub struct ResponseBuilder;

impl ResponseBuilder {
    /// Create a redirect response with optional cookies
    #[must_use]
    pub fn redirect(location: &str, cookies: Option<Vec<Cookie<'static>>>) -> HttpResponse {
        // 303 so a redirect after a form POST is followed with GET
        let mut builder = HttpResponse::SeeOther();

        if let Some(cookies_vec) = cookies {
            for cookie in cookies_vec {
                builder.cookie(cookie);
            }
        }

        builder.append_header(("Location", location)).finish()
    }

    /// Create a redirect response with a single cookie
    #[must_use]
    pub fn redirect_with_cookie(location: &str, cookie: Option<Cookie<'static>>) -> HttpResponse {
        Self::redirect(location, cookie.map(|c| vec![c]))
    }

    /// Create an HTML page response, optionally setting a cookie
    #[must_use]
    pub fn html(body: String, cookie: Option<Cookie<'static>>) -> HttpResponse {
        let mut builder = HttpResponse::Ok();
        if let Some(cookie) = cookie {
            builder.cookie(cookie);
        }
        builder.content_type("text/html; charset=utf-8").body(body)
    }

    /// Create an error page response for a session that could not start
    #[must_use]
    pub fn fatal_html(body: String) -> HttpResponse {
        HttpResponse::InternalServerError()
            .content_type("text/html; charset=utf-8")
            .body(body)
    }
}

/// Escape text for inclusion in HTML element content or quoted attributes
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
