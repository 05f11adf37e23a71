//! Server-rendered HTML pages.

use crate::models::ImageRecord;
use crate::services::operations::OperationRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A one-shot message shown above the page content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    /// Optional `(href, text)` appended to the message
    pub link: Option<(String, String)>,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            link: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            link: None,
        }
    }

    pub fn with_link(mut self, href: impl Into<String>, text: impl Into<String>) -> Self {
        self.link = Some((href.into(), text.into()));
        self
    }

    fn render(&self) -> String {
        let class = match self.kind {
            NoticeKind::Success => "notice success",
            NoticeKind::Error => "notice error",
        };
        let link = match &self.link {
            Some((href, text)) => format!(
                " <a href=\"{}\" target=\"_blank\">{}</a>",
                escape_html(href),
                escape_html(text)
            ),
            None => String::new(),
        };
        format!(
            "<div class=\"{}\" role=\"alert\">{}{}</div>",
            class,
            escape_html(&self.message),
            link
        )
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "body{font-family:sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem}\
nav a{margin-right:1rem}\
.notice{padding:.6rem 1rem;margin:1rem 0;border-radius:4px}\
.success{background:#e6f4ea;color:#1e4620}\
.error{background:#fdecea;color:#611a15}\
table{border-collapse:collapse;width:100%}\
td,th{border-bottom:1px solid #ddd;padding:.4rem;text-align:left}\
img.preview{max-width:100%}";

fn layout(title: &str, notices: &[Notice], body: &str) -> String {
    let notices: String = notices.iter().map(Notice::render).collect();
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title>{title} | Image Editor</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
<nav><a href=\"/\">Home</a><a href=\"/images\">Images</a><a href=\"/about\">About</a></nav>\n\
{notices}\n<main>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

/// Upload form, optionally topped with notices from the last submission
pub fn index_page(registry: &OperationRegistry, notices: &[Notice]) -> String {
    let options: String = registry
        .iter()
        .map(|op| {
            format!(
                "<option value=\"{}\">{}</option>",
                escape_html(op.id),
                escape_html(op.label)
            )
        })
        .collect();

    let body = format!(
        "<h1>Edit an image</h1>\n\
<form action=\"/edit\" method=\"post\" enctype=\"multipart/form-data\">\n\
<p><input type=\"file\" name=\"file\" accept=\"image/*\"></p>\n\
<p><select name=\"operation\"><option value=\"\" selected>Choose an operation</option>{options}</select></p>\n\
<p><button type=\"submit\">Process</button></p>\n\
</form>"
    );
    layout("Home", notices, &body)
}

pub fn about_page() -> String {
    layout(
        "About",
        &[],
        "<h1>About</h1>\n<p>Upload a PNG, WebP, JPEG or GIF image and apply one operation: \
grayscale, format conversion, blur, threshold, half-size resize or smoothing. \
Processed images are kept and listed on the Images page.</p>",
    )
}

pub fn images_page(records: &[ImageRecord], notices: &[Notice]) -> String {
    let body = if records.is_empty() {
        "<h1>Processed images</h1>\n<p>No images processed yet.</p>".to_string()
    } else {
        let rows: String = records
            .iter()
            .map(|r| {
                format!(
                    "<tr><td><a href=\"/images/{id}\">{name}</a></td><td>{op}</td><td>{at}</td></tr>\n",
                    id = escape_html(&r.id),
                    name = escape_html(&r.original_filename),
                    op = escape_html(&r.operation),
                    at = r.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                )
            })
            .collect();
        format!(
            "<h1>Processed images</h1>\n<table>\n\
<tr><th>Original</th><th>Operation</th><th>Processed at</th></tr>\n{rows}</table>"
        )
    };
    layout("Images", notices, &body)
}

pub fn image_page(record: &ImageRecord) -> String {
    let src = format!("/{}", record.processed_filename);
    let body = format!(
        "<h1>{name}</h1>\n<dl>\n<dt>Operation</dt><dd>{op}</dd>\n\
<dt>Output</dt><dd><a href=\"{src}\" target=\"_blank\">{processed}</a></dd>\n</dl>\n\
<img class=\"preview\" src=\"{src}\" alt=\"{name}\">\n<p><a href=\"/images\">Back to all images</a></p>",
        name = escape_html(&record.original_filename),
        op = escape_html(&record.operation),
        processed = escape_html(&record.processed_filename),
        src = escape_html(&src),
    );
    layout(&record.original_filename, &[], &body)
}
