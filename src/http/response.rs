use std::io;

/// A complete HTTP/1.1 response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// Add `Cache-Control: no-cache`
    pub no_cache: bool,
}

impl Response {
    /// Successful file response; never cached so edits show up immediately
    pub fn file(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            body,
            no_cache: true,
        }
    }

    pub fn text(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
            no_cache: false,
        }
    }

    /// 404 page naming the requested URL
    pub fn not_found(url: &str) -> Self {
        let body = format!(
            r#"<html>
    <head><title>404 - Not Found</title></head>
    <body style="font-family: Arial, sans-serif; text-align: center; margin: 50px;">
        <h1>404 - File Not Found</h1>
        <p>The requested file "{}" was not found.</p>
        <p><a href="/">&larr; Back to Yeti Games</a></p>
    </body>
</html>
"#,
            escape_html(url)
        );
        Self::text(404, "text/html", body)
    }

    pub fn server_error(error: &io::Error) -> Self {
        Self::text(500, "text/plain", format!("Server Error: {:?}", error.kind()))
    }

    pub fn bad_request() -> Self {
        Self::text(400, "text/plain", "Bad Request")
    }

    pub fn method_not_allowed() -> Self {
        Self::text(405, "text/plain", "Method Not Allowed")
    }

    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }

    /// Serialize head and (unless `head_only`) body
    pub fn to_bytes(&self, head_only: bool) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len()
        );
        if self.status == 405 {
            head.push_str("Allow: GET, HEAD\r\n");
        }
        if self.no_cache {
            head.push_str("Cache-Control: no-cache\r\n");
        }
        head.push_str("Connection: close\r\n\r\n");

        let mut out = head.into_bytes();
        if !head_only {
            out.extend_from_slice(&self.body);
        }
        out
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
